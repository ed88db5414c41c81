//! GeoTIFF tag parsing.

use crate::{Affine, GeoTileError, TileCrs, C};
use std::io::{Read, Seek};
use tiff::{
    decoder::{Decoder, DecodingResult, Limits},
    tags::Tag,
};

pub(crate) const MODEL_PIXEL_SCALE: u16 = 33550;
pub(crate) const MODEL_TIEPOINT: u16 = 33922;
pub(crate) const MODEL_TRANSFORMATION: u16 = 34264;
pub(crate) const GEO_KEY_DIRECTORY: u16 = 34735;
pub(crate) const GDAL_NODATA: u16 = 42113;

const GT_RASTER_TYPE_GEO_KEY: u16 = 1025;
const GEOGRAPHIC_TYPE_GEO_KEY: u16 = 2048;
const PROJECTED_CS_TYPE_GEO_KEY: u16 = 3072;

const RASTER_PIXEL_IS_POINT: u16 = 2;
const USER_DEFINED: u16 = 32767;

/// Everything we need from a GeoTIFF file.
pub(crate) struct Decoded {
    pub dimensions: (usize, usize),
    pub transform: Affine,
    pub crs: TileCrs,
    pub nodata: Option<C>,
    pub bands: Vec<Box<[C]>>,
}

/// Returns the tag for `code`, using the named variant if the `tiff`
/// crate knows about it.
pub(crate) fn tag(code: u16) -> Tag {
    Tag::from_u16_exhaustive(code)
}

pub(crate) fn decode<R: Read + Seek>(reader: R) -> Result<Decoded, GeoTileError> {
    let mut decoder = Decoder::new(reader)?.with_limits(limits());

    let (width, height) = decoder.dimensions()?;
    let (rows, cols) = (height as usize, width as usize);
    let samples_per_pixel = decoder.get_tag_u32(Tag::SamplesPerPixel).unwrap_or(1) as usize;

    let keys = GeoKeys::read(&mut decoder);
    let transform = read_transform(&mut decoder, &keys)?;
    let nodata = read_nodata(&mut decoder);
    let samples = to_f64(decoder.read_image()?);

    let expected = rows * cols * samples_per_pixel;
    if samples.len() != expected {
        return Err(GeoTileError::Size {
            expected,
            actual: samples.len(),
        });
    }

    let bands = if samples_per_pixel == 1 {
        vec![samples.into_boxed_slice()]
    } else {
        (0..samples_per_pixel)
            .map(|band| {
                samples
                    .iter()
                    .skip(band)
                    .step_by(samples_per_pixel)
                    .copied()
                    .collect()
            })
            .collect()
    };

    Ok(Decoded {
        dimensions: (rows, cols),
        transform,
        crs: keys.crs(),
        nodata,
        bands,
    })
}

fn limits() -> Limits {
    // DGM1 tiles are 1000 x 1000 f32, but allow for much larger
    // mosaics.
    let mut limits = Limits::default();
    limits.decoding_buffer_size = 1024 * 1024 * 1024;
    limits.intermediate_buffer_size = 1024 * 1024 * 1024;
    limits.ifd_value_size = 1024 * 1024 * 1024;
    limits
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct GeoKeys {
    raster_type: Option<u16>,
    geographic_type: Option<u16>,
    projected_type: Option<u16>,
}

impl GeoKeys {
    fn read<R: Read + Seek>(decoder: &mut Decoder<R>) -> Self {
        decoder
            .get_tag_u16_vec(tag(GEO_KEY_DIRECTORY))
            .map(|directory| Self::parse(&directory))
            .unwrap_or_default()
    }

    /// Parses a `GeoKeyDirectoryTag`.
    ///
    /// Only keys stored inline (TIFFTagLocation 0) are considered, which
    /// is where every key we care about lives.
    pub(crate) fn parse(directory: &[u16]) -> Self {
        let mut keys = Self::default();
        for entry in directory.chunks_exact(4).skip(1) {
            let (key, location, value) = (entry[0], entry[1], entry[3]);
            if location != 0 {
                continue;
            }
            match key {
                GT_RASTER_TYPE_GEO_KEY => keys.raster_type = Some(value),
                GEOGRAPHIC_TYPE_GEO_KEY => keys.geographic_type = Some(value),
                PROJECTED_CS_TYPE_GEO_KEY => keys.projected_type = Some(value),
                _ => {}
            }
        }
        keys
    }

    /// A projected key takes precedence over a geographic one, even
    /// when it cannot be resolved to an EPSG code.
    pub(crate) fn crs(&self) -> TileCrs {
        let resolve = |code: u16| match code {
            0 | USER_DEFINED => TileCrs::UserDefined,
            code => TileCrs::Epsg(code),
        };
        match (self.projected_type, self.geographic_type) {
            (Some(code), _) | (None, Some(code)) => resolve(code),
            (None, None) => TileCrs::Absent,
        }
    }

    fn pixel_is_point(&self) -> bool {
        self.raster_type == Some(RASTER_PIXEL_IS_POINT)
    }
}

fn read_transform<R: Read + Seek>(
    decoder: &mut Decoder<R>,
    keys: &GeoKeys,
) -> Result<Affine, GeoTileError> {
    let transform = if let Some(m) = decoder
        .get_tag_f64_vec(tag(MODEL_TRANSFORMATION))
        .ok()
        .filter(|m| m.len() >= 8)
    {
        Affine::new(m[0], m[1], m[3], m[4], m[5], m[7])
    } else {
        let tiepoint = decoder.get_tag_f64_vec(tag(MODEL_TIEPOINT));
        let scale = decoder.get_tag_f64_vec(tag(MODEL_PIXEL_SCALE));
        match (tiepoint, scale) {
            (Ok(tie), Ok(scale)) if tie.len() >= 6 && scale.len() >= 2 => {
                // Tiepoint is [i, j, k, x, y, z]: pixel (i, j) sits at
                // world (x, y).
                let (sx, sy) = (scale[0], scale[1]);
                Affine::new(sx, 0.0, tie[3] - tie[0] * sx, 0.0, -sy, tie[4] + tie[1] * sy)
            }
            _ => return Err(GeoTileError::Georeference),
        }
    };

    // Normalize to pixel-is-area, i.e., integer pixel coordinates
    // address the top-left corner of a cell.
    Ok(if keys.pixel_is_point() {
        transform.shifted(-0.5, -0.5)
    } else {
        transform
    })
}

fn read_nodata<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<C> {
    decoder
        .get_tag_ascii_string(tag(GDAL_NODATA))
        .ok()?
        .trim_matches(|c: char| c == '\0' || c.is_whitespace())
        .parse()
        .ok()
}

#[allow(clippy::cast_precision_loss)]
fn to_f64(result: DecodingResult) -> Vec<C> {
    match result {
        DecodingResult::F64(data) => data,
        DecodingResult::F32(data) => data.into_iter().map(C::from).collect(),
        DecodingResult::I8(data) => data.into_iter().map(C::from).collect(),
        DecodingResult::I16(data) => data.into_iter().map(C::from).collect(),
        DecodingResult::I32(data) => data.into_iter().map(C::from).collect(),
        DecodingResult::I64(data) => data.into_iter().map(|v| v as C).collect(),
        DecodingResult::U8(data) => data.into_iter().map(C::from).collect(),
        DecodingResult::U16(data) => data.into_iter().map(C::from).collect(),
        DecodingResult::U32(data) => data.into_iter().map(C::from).collect(),
        DecodingResult::U64(data) => data.into_iter().map(|v| v as C).collect(),
    }
}

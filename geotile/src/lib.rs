//! GeoTIFF elevation tile format.
//!
//! A [Tile] is a single-file DEM raster: one or more bands of
//! row-major samples (origin top-left), the affine transform placing
//! them in the world, the tile's CRS and its no-data sentinel.
//!
//! # References
//!
//! 1. [OGC GeoTIFF Standard](https://docs.ogc.org/is/19-008r4/19-008r4.html)
//! 1. [GDAL GTiff driver](https://gdal.org/drivers/raster/gtiff.html)

mod affine;
mod error;
mod geotiff;

pub use crate::{affine::Affine, error::GeoTileError};
use memmap2::Mmap;
use std::{
    borrow::Cow,
    fs::File,
    io::{BufReader, Cursor},
    path::Path,
};

/// Base floating point type used for all coordinates and samples.
pub type C = f64;

/// CRS a tile declares in its GeoKeys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileCrs {
    /// No CRS keys at all.
    Absent,

    /// A CRS identified by EPSG code.
    Epsg(u16),

    /// CRS keys are present but carry no EPSG code (user-defined or
    /// undefined), so the CRS cannot be resolved.
    UserDefined,
}

impl TileCrs {
    pub fn epsg(self) -> Option<u16> {
        match self {
            Self::Epsg(code) => Some(code),
            Self::Absent | Self::UserDefined => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    /// Number of (rows, columns) in this tile.
    dimensions: (usize, usize),

    /// Pixel (col, row) to world (x, y).
    transform: Affine,

    /// World (x, y) to pixel (col, row).
    inverse: Affine,

    /// CRS declared by the file.
    crs: TileCrs,

    /// Sentinel value marking cells without a measurement.
    nodata: Option<C>,

    /// Elevation samples, one row-major buffer per band.
    bands: Vec<Box<[C]>>,

    /// Validity mask shared by all bands, attached with
    /// [Tile::with_mask].
    ///
    /// When absent, validity is derived from `nodata`.
    mask: Option<Box<[bool]>>,
}

impl Tile {
    /// Returns a Tile decoded from the GeoTIFF at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GeoTileError> {
        let file = BufReader::new(File::open(path)?);
        Self::from_decoded(geotiff::decode(file)?)
    }

    /// Returns a Tile decoded from a memory map of the GeoTIFF at
    /// `path`.
    ///
    /// The map is released before returning; only the decoded samples
    /// outlive this call.
    pub fn memmap<P: AsRef<Path>>(path: P) -> Result<Self, GeoTileError> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        Self::from_decoded(geotiff::decode(Cursor::new(&mmap[..]))?)
    }

    /// Returns a single band Tile built from in-memory samples.
    pub fn from_parts(
        dimensions: (usize, usize),
        transform: Affine,
        crs: TileCrs,
        nodata: Option<C>,
        samples: Vec<C>,
    ) -> Result<Self, GeoTileError> {
        let expected = dimensions.0 * dimensions.1;
        if samples.len() != expected {
            return Err(GeoTileError::Size {
                expected,
                actual: samples.len(),
            });
        }
        let inverse = transform
            .inverse()
            .ok_or(GeoTileError::SingularTransform(transform))?;
        Ok(Self {
            dimensions,
            transform,
            inverse,
            crs,
            nodata,
            bands: vec![samples.into_boxed_slice()],
            mask: None,
        })
    }

    /// Attaches an explicit validity mask (`true` is valid).
    pub fn with_mask(mut self, mask: Vec<bool>) -> Result<Self, GeoTileError> {
        if mask.len() != self.len() {
            return Err(GeoTileError::Size {
                expected: self.len(),
                actual: mask.len(),
            });
        }
        self.mask = Some(mask.into_boxed_slice());
        Ok(self)
    }

    /// Returns the number of samples per band.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        let (rows, cols) = self.dimensions;
        rows * cols
    }

    /// Returns (rows, columns).
    pub fn dimensions(&self) -> (usize, usize) {
        self.dimensions
    }

    /// Returns the pixel to world transform.
    pub fn transform(&self) -> &Affine {
        &self.transform
    }

    /// Returns the world to pixel transform.
    pub fn inverse_transform(&self) -> &Affine {
        &self.inverse
    }

    /// Returns the CRS declared by this tile.
    pub fn crs(&self) -> TileCrs {
        self.crs
    }

    /// Returns the EPSG code of this tile's CRS, if it declares one.
    pub fn epsg(&self) -> Option<u16> {
        self.crs.epsg()
    }

    /// Returns the no-data sentinel, if any.
    pub fn nodata(&self) -> Option<C> {
        self.nodata
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    /// Returns band `index`, counting from 1.
    pub fn read_band(&self, index: usize) -> Result<&[C], GeoTileError> {
        index
            .checked_sub(1)
            .and_then(|idx| self.bands.get(idx))
            .map(|band| &**band)
            .ok_or(GeoTileError::Band {
                index,
                count: self.bands.len(),
            })
    }

    /// Returns the validity mask for band `index`, counting from 1.
    ///
    /// An explicit mask from [Tile::with_mask] wins. Otherwise a cell
    /// is valid unless it is NaN or equals the no-data sentinel.
    /// Internal GDAL mask IFDs (`NewSubfileType` 4) are not decoded;
    /// files relying on them alone report every non-NaN cell as valid.
    pub fn read_mask(&self, index: usize) -> Result<Cow<'_, [bool]>, GeoTileError> {
        let band = self.read_band(index)?;
        Ok(match (&self.mask, self.nodata) {
            (Some(mask), _) => Cow::Borrowed(&**mask),
            (None, Some(nodata)) => band
                .iter()
                .map(|&v| !v.is_nan() && v != nodata)
                .collect(),
            (None, None) => band.iter().map(|v| !v.is_nan()).collect(),
        })
    }

    /// Returns the band 1 sample at (row, col), if in bounds.
    pub fn get(&self, (row, col): (usize, usize)) -> Option<C> {
        let (rows, cols) = self.dimensions;
        if row < rows && col < cols {
            Some(self.bands[0][row * cols + col])
        } else {
            None
        }
    }
}

/// Private API
impl Tile {
    fn from_decoded(decoded: geotiff::Decoded) -> Result<Self, GeoTileError> {
        let geotiff::Decoded {
            dimensions,
            transform,
            crs,
            nodata,
            bands,
        } = decoded;
        let inverse = transform
            .inverse()
            .ok_or(GeoTileError::SingularTransform(transform))?;
        Ok(Self {
            dimensions,
            transform,
            inverse,
            crs,
            nodata,
            bands,
            mask: None,
        })
    }
}

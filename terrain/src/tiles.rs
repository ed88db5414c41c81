//! DEM tile stores.

use crate::{TerrainError, TileId};
use geotile::Tile;
use log::debug;
use std::{
    collections::HashMap,
    ffi::OsStr,
    hash::BuildHasher,
    path::{Path, PathBuf},
};

/// File name layout of the DGM1 tiles this crate was first built for.
pub const DEFAULT_TEMPLATE: &str = "dgm1_32_{x}_{y}_1_nw_2021.tif";

/// Resolves tile identifiers to decoded tiles.
///
/// Every call returns a freshly owned [Tile]; stores don't cache on
/// behalf of callers.
pub trait TileStore {
    fn open(&self, id: TileId) -> Result<Tile, TerrainError>;
}

/// In-memory store, mostly useful for synthetic rasters.
impl<S: BuildHasher> TileStore for HashMap<TileId, Tile, S> {
    fn open(&self, id: TileId) -> Result<Tile, TerrainError> {
        self.get(&id).cloned().ok_or(TerrainError::MissingTile(id))
    }
}

/// A directory of GeoTIFF tiles named after their [TileId].
#[derive(Debug, Clone)]
pub struct TileDir {
    /// Directory containing GeoTIFF tile files.
    tile_dir: PathBuf,

    /// File name with `{x}` and `{y}` placeholders.
    template: String,

    /// How to load tiles (in-memory or mapped).
    tile_mode: TileMode,
}

impl TileDir {
    pub fn new(tile_dir: PathBuf, tile_mode: TileMode) -> Result<Self, TerrainError> {
        let mut has_tiff_files = false;

        // Let's try to fail early be checking that tile_dir has at
        // least one GeoTIFF.
        for entry in std::fs::read_dir(&tile_dir)? {
            let path = entry?.path();
            if path
                .extension()
                .and_then(OsStr::to_str)
                .is_some_and(|ext| ext.eq_ignore_ascii_case("tif") || ext.eq_ignore_ascii_case("tiff"))
            {
                has_tiff_files = true;
                break;
            }
        }

        if has_tiff_files {
            Ok(Self {
                tile_dir,
                template: DEFAULT_TEMPLATE.to_string(),
                tile_mode,
            })
        } else {
            Err(TerrainError::Path(tile_dir))
        }
    }

    /// Replaces the file name template.
    #[must_use]
    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    /// Returns the expected path of tile `id`.
    pub fn path(&self, id: TileId) -> PathBuf {
        let file_name = file_name(&self.template, id);
        [&self.tile_dir, Path::new(&file_name)].iter().collect()
    }
}

impl TileStore for TileDir {
    fn open(&self, id: TileId) -> Result<Tile, TerrainError> {
        let tile_path = self.path(id);
        debug!("loading {tile_path:?}");
        match self.tile_mode {
            TileMode::InMem => Ok(Tile::load(tile_path)?),
            TileMode::MemMap => Ok(Tile::memmap(tile_path)?),
        }
    }
}

/// How to handle tile.
///
/// The trade off between loading tile data into memory versus memory
/// mapping is not obvious, and you should measure both before
/// deciding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileMode {
    /// Decode tile straight from the file.
    InMem,

    /// Decode tile from a memory map of the file.
    MemMap,
}

fn file_name(template: &str, TileId { x, y }: TileId) -> String {
    template
        .replace("{x}", &x.to_string())
        .replace("{y}", &y.to_string())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{file_name, TileDir, TileId, TileMode, TileStore, DEFAULT_TEMPLATE};
    use crate::TerrainError;
    use geotile::{Affine, GeoTileError, Tile, TileCrs};
    use std::{collections::HashMap, fs::File, path::Path};
    use tiff::{
        encoder::{colortype, TiffEncoder},
        tags::Tag,
    };

    /// Writes a `side` x `side` f32 GeoTIFF of 1 m cells in EPSG:25832
    /// whose top-left corner is the top-left corner of tile `id`
    /// (1 km grid).
    pub(crate) fn write_tile(path: &Path, id: TileId, side: u32, value: f32) {
        #[allow(clippy::cast_precision_loss)]
        let (x0, y0) = ((id.x * 1000) as f64, ((id.y + 1) * 1000) as f64);
        let samples = vec![value; (side * side) as usize];
        let mut encoder = TiffEncoder::new(File::create(path).unwrap()).unwrap();
        let mut image = encoder
            .new_image::<colortype::Gray32Float>(side, side)
            .unwrap();
        let scale = 1000.0 / f64::from(side);
        image
            .encoder()
            .write_tag(Tag::Unknown(33550), &[scale, scale, 0.0][..])
            .unwrap();
        image
            .encoder()
            .write_tag(Tag::Unknown(33922), &[0.0, 0.0, 0.0, x0, y0, 0.0][..])
            .unwrap();
        image
            .encoder()
            .write_tag(
                Tag::Unknown(34735),
                &[1_u16, 1, 0, 1, 3072, 0, 1, 25832][..],
            )
            .unwrap();
        image.write_data(&samples).unwrap();
    }

    #[test]
    fn test_file_name() {
        assert_eq!(
            file_name(DEFAULT_TEMPLATE, TileId::new(350, 5700)),
            "dgm1_32_350_5700_1_nw_2021.tif"
        );
        assert_eq!(file_name("{y}/{x}.tif", TileId::new(-1, 2)), "2/-1.tif");
    }

    #[test]
    fn test_empty_dir_fails_early() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("README"), b"no tiles here").unwrap();
        assert!(matches!(
            TileDir::new(dir.path().to_path_buf(), TileMode::InMem),
            Err(TerrainError::Path(_))
        ));
    }

    #[test]
    fn test_open() {
        let dir = tempfile::tempdir().unwrap();
        let id = TileId::new(350, 5700);
        write_tile(&dir.path().join("dgm1_32_350_5700_1_nw_2021.tif"), id, 10, 42.0);

        for mode in [TileMode::InMem, TileMode::MemMap] {
            let tiles = TileDir::new(dir.path().to_path_buf(), mode).unwrap();
            let tile = tiles.open(id).unwrap();
            assert_eq!(tile.dimensions(), (10, 10));
            assert_eq!(tile.epsg(), Some(25832));
            assert_eq!(tile.get((9, 9)), Some(42.0));
        }
    }

    #[test]
    fn test_custom_template() {
        let dir = tempfile::tempdir().unwrap();
        let id = TileId::new(1, 2);
        write_tile(&dir.path().join("tile_1_2.TIFF"), id, 4, 1.0);
        let tiles = TileDir::new(dir.path().to_path_buf(), TileMode::InMem)
            .unwrap()
            .template("tile_{x}_{y}.TIFF");
        assert!(tiles.open(id).is_ok());
    }

    #[test]
    fn test_missing_tile_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        write_tile(&dir.path().join("other.tif"), TileId::new(0, 0), 2, 0.0);
        let tiles = TileDir::new(dir.path().to_path_buf(), TileMode::MemMap).unwrap();
        assert!(matches!(
            tiles.open(TileId::new(350, 5700)),
            Err(TerrainError::GeoTile(GeoTileError::Io(_)))
        ));
    }

    #[test]
    fn test_in_memory_store() {
        let transform = Affine::north_up(geo::geometry::Coord { x: 0.0, y: 1.0 }, 1.0, 1.0);
        let tile = Tile::from_parts((1, 1), transform, TileCrs::Absent, None, vec![7.0]).unwrap();
        let store = HashMap::from([(TileId::new(0, 0), tile.clone())]);
        assert_eq!(store.open(TileId::new(0, 0)).unwrap(), tile);
        assert!(matches!(
            store.open(TileId::new(0, 1)),
            Err(TerrainError::MissingTile(id)) if id == TileId::new(0, 1)
        ));
    }
}

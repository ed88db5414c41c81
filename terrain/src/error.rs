use crate::TileId;
use geo::geometry::Coord;
use geotile::GeoTileError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TerrainError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("invalid interpolation method {0:?}, expected 'nearest' or 'bilinear'")]
    InvalidMethod(String),

    #[error("invalid CRS {0:?}")]
    InvalidCrs(String),

    #[error("can not transform {coord:?} from {from} to {to}")]
    Transform {
        coord: Coord<f64>,
        from: String,
        to: String,
    },

    #[error("no tile {0} in store")]
    MissingTile(TileId),

    #[error("tile {tile} unavailable: {source}")]
    TileUnavailable {
        tile: TileId,
        source: Box<TerrainError>,
    },

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("no GeoTIFF files in {0}")]
    Path(PathBuf),

    #[error("{0}")]
    GeoTile(#[from] GeoTileError),
}

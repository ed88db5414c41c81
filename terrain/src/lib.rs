//! Elevation profiles sampled from tiled DEM rasters.
//!
//! ```no_run
//! use geo::geometry::Coord;
//! use terrain::{Method, Profile, TileDir, TileMode};
//!
//! # fn main() -> Result<(), terrain::TerrainError> {
//! let tiles = TileDir::new("/data/dgm1".into(), TileMode::MemMap)?;
//! let profile = Profile::builder()
//!     .start(Coord { x: 7.0921, y: 51.1402 })
//!     .end(Coord { x: 7.1012, y: 51.1455 })
//!     .spacing(10.0)
//!     .method(Method::Bilinear)
//!     .build(&tiles)?;
//! for (distance, elevation) in profile.distances_m().zip(profile.elevations_m()) {
//!     println!("{distance},{elevation}");
//! }
//! # Ok(())
//! # }
//! ```

mod crs;
mod distance;
mod error;
mod locator;
mod math;
mod planner;
mod profile;
mod sampler;
mod tiles;

pub use crate::{
    crs::{Crs, Position, WGS84},
    distance::accumulate,
    error::TerrainError,
    locator::{locate, TileId},
    planner::{plan, points, SampleMode, MAX_SAMPLES},
    profile::{
        ElevationSample, Profile, ProfileBuilder, DEFAULT_REFERENCE_EPSG, DEFAULT_TILE_EDGE_KM,
    },
    sampler::{Method, Raster},
    tiles::{TileDir, TileMode, TileStore, DEFAULT_TEMPLATE},
};
pub use geo;
pub use geotile::{self, Tile};

/// Base floating point type used for all coordinates.
pub type C = f64;

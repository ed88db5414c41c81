//! Tile lookup for a path.

use crate::{Crs, Position, TerrainError, C};
use std::{collections::HashSet, fmt};

/// Integer index of a tile in a fixed-size grid over the reference CRS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileId {
    pub x: i64,
    pub y: i64,
}

impl TileId {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.x, self.y)
    }
}

/// Returns the tiles covering the bounding box of `start` and `end`.
///
/// Order is the start tile, the end tile, then every tile of the
/// inclusive box between them (x outer, y inner), skipping repeats.
pub fn locate(
    start: &Position,
    end: &Position,
    reference: &Crs,
    tile_edge_km: C,
) -> Result<Vec<TileId>, TerrainError> {
    if !(tile_edge_km.is_finite() && tile_edge_km > 0.0) {
        return Err(TerrainError::InvalidParameter(format!(
            "tile edge must be a positive number of km, got {tile_edge_km}"
        )));
    }
    let edge_m = tile_edge_km * 1000.0;
    let first = tile_of(start.to_crs(reference)?.coord(), edge_m);
    let last = tile_of(end.to_crs(reference)?.coord(), edge_m);

    let (x_min, x_max) = (first.x.min(last.x), first.x.max(last.x));
    let (y_min, y_max) = (first.y.min(last.y), first.y.max(last.y));
    let sweep = (x_min..=x_max).flat_map(|x| (y_min..=y_max).map(move |y| TileId { x, y }));

    let mut seen = HashSet::new();
    Ok([first, last]
        .into_iter()
        .chain(sweep)
        .filter(|id| seen.insert(*id))
        .collect())
}

/// Grid cell of `coord`, truncated toward zero.
#[allow(clippy::cast_possible_truncation)]
fn tile_of(coord: geo::geometry::Coord<C>, edge_m: C) -> TileId {
    TileId {
        x: (coord.x / edge_m).trunc() as i64,
        y: (coord.y / edge_m).trunc() as i64,
    }
}

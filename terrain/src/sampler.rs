//! Elevation interpolation from a raster band.

use crate::{TerrainError, C};
use geo::geometry::Coord;
use geotile::{Affine, Tile};
use std::{fmt, str::FromStr};

/// Interpolation method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    /// Value of the closest cell.
    Nearest,

    /// Weighted mean of the four surrounding cells.
    #[default]
    Bilinear,
}

impl FromStr for Method {
    type Err = TerrainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nearest" => Ok(Method::Nearest),
            "bilinear" => Ok(Method::Bilinear),
            other => Err(TerrainError::InvalidMethod(other.to_string())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Nearest => "nearest",
            Method::Bilinear => "bilinear",
        })
    }
}

/// A single band prepared for sampling.
///
/// Cells without a valid measurement hold NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    rows: usize,
    cols: usize,
    cells: Vec<C>,
}

impl Raster {
    /// Returns band `band` (counting from 1) of `tile` with no-data
    /// and masked cells replaced by NaN.
    pub fn from_tile(tile: &Tile, band: usize) -> Result<Self, TerrainError> {
        let values = tile.read_band(band)?;
        let mask = tile.read_mask(band)?;
        Ok(Self::new(tile.dimensions(), values, &mask, tile.nodata()))
    }

    /// Returns a raster of `values` where every cell equal to
    /// `nodata` or not valid in `mask` is NaN.
    pub fn new(
        (rows, cols): (usize, usize),
        values: &[C],
        mask: &[bool],
        nodata: Option<C>,
    ) -> Self {
        let cells = values
            .iter()
            .zip(mask.iter())
            .map(|(&value, &valid)| {
                if !valid || Some(value) == nodata {
                    C::NAN
                } else {
                    value
                }
            })
            .collect();
        Self { rows, cols, cells }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Returns one elevation per world coordinate in `points`, NaN
    /// where no value can be interpolated.
    ///
    /// `inverse` maps world coordinates to pixel (col, row).
    pub fn sample(&self, inverse: &Affine, points: &[Coord<C>], method: Method) -> Vec<C> {
        points
            .iter()
            .map(|&point| {
                let Coord { x: col, y: row } = inverse.apply(point);
                match method {
                    Method::Nearest => self.nearest(row, col),
                    Method::Bilinear => self.bilinear(row, col),
                }
            })
            .collect()
    }
}

/// Private API
impl Raster {
    fn cell(&self, row: usize, col: usize) -> C {
        self.cells
            .get(row * self.cols + col)
            .copied()
            .unwrap_or(C::NAN)
    }

    #[allow(clippy::cast_precision_loss)]
    fn contains(&self, row: C, col: C) -> bool {
        (0.0..self.rows as C).contains(&row) && (0.0..self.cols as C).contains(&col)
    }

    /// Rounds half to even, like `rint`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn nearest(&self, row: C, col: C) -> C {
        if !self.contains(row, col) {
            return C::NAN;
        }
        let (r, c) = (row.round_ties_even() as usize, col.round_ties_even() as usize);
        if r < self.rows && c < self.cols {
            self.cell(r, c)
        } else {
            C::NAN
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn bilinear(&self, row: C, col: C) -> C {
        let (row0, col0) = (row.floor(), col.floor());
        if !(row0 >= 0.0 && col0 >= 0.0) {
            return C::NAN;
        }
        let (r0, c0) = (row0 as usize, col0 as usize);
        let (r1, c1) = (r0 + 1, c0 + 1);
        if r1 >= self.rows || c1 >= self.cols {
            return C::NAN;
        }

        let (q00, q01, q10, q11) = (
            self.cell(r0, c0),
            self.cell(r0, c1),
            self.cell(r1, c0),
            self.cell(r1, c1),
        );
        if q00.is_nan() || q01.is_nan() || q10.is_nan() || q11.is_nan() {
            return C::NAN;
        }

        let (di, dj) = (row - row0, col - col0);
        q00 * (1.0 - dj) * (1.0 - di) + q01 * dj * (1.0 - di) + q10 * (1.0 - dj) * di + q11 * dj * di
    }
}

use crate::C;
use geo::geometry::Coord;

/// Pixel to world mapping.
///
/// Uses the same coefficient layout as GDAL/rasterio:
///
/// ```text
/// x = a * col + b * row + c
/// y = d * col + e * row + f
/// ```
///
/// Pixel coordinates are passed around as `Coord { x: col, y: row }`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: C,
    pub b: C,
    pub c: C,
    pub d: C,
    pub e: C,
    pub f: C,
}

impl Affine {
    pub const fn new(a: C, b: C, c: C, d: C, e: C, f: C) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// Returns a north-up transform with its top-left corner at
    /// `origin` and square-ish pixels `res_x` wide and `res_y` tall.
    pub fn north_up(origin: Coord<C>, res_x: C, res_y: C) -> Self {
        Self::new(res_x, 0.0, origin.x, 0.0, -res_y, origin.y)
    }

    /// Maps `coord` through this transform.
    pub fn apply(&self, Coord { x, y }: Coord<C>) -> Coord<C> {
        Coord {
            x: self.a * x + self.b * y + self.c,
            y: self.d * x + self.e * y + self.f,
        }
    }

    /// Returns the inverse transform, or `None` if this transform is
    /// singular.
    pub fn inverse(&self) -> Option<Self> {
        let det = self.a * self.e - self.b * self.d;
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let idet = 1.0 / det;
        let ra = self.e * idet;
        let rb = -self.b * idet;
        let rd = -self.d * idet;
        let re = self.a * idet;
        Some(Self {
            a: ra,
            b: rb,
            c: -self.c * ra - self.f * rb,
            d: rd,
            e: re,
            f: -self.c * rd - self.f * re,
        })
    }

    /// Returns this transform composed with a pixel-space shift of
    /// `(cols, rows)`.
    pub fn shifted(&self, cols: C, rows: C) -> Self {
        Self {
            c: self.c + self.a * cols + self.b * rows,
            f: self.f + self.d * cols + self.e * rows,
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Affine, Coord};
    use approx::assert_relative_eq;

    #[test]
    fn test_north_up_corners() {
        let t = Affine::north_up(Coord { x: 350_000.0, y: 5_701_000.0 }, 10.0, 10.0);
        assert_eq!(t.apply(Coord { x: 0.0, y: 0.0 }), Coord { x: 350_000.0, y: 5_701_000.0 });
        assert_eq!(
            t.apply(Coord { x: 100.0, y: 100.0 }),
            Coord { x: 351_000.0, y: 5_700_000.0 }
        );
    }

    #[test]
    fn test_inverse_roundtrip() {
        let t = Affine::new(2.0, 0.5, 100.0, -0.25, -3.0, 900.0);
        let inv = t.inverse().unwrap();
        let pixel = Coord { x: 12.25, y: 7.5 };
        let back = inv.apply(t.apply(pixel));
        assert_relative_eq!(back.x, pixel.x, epsilon = 1e-12);
        assert_relative_eq!(back.y, pixel.y, epsilon = 1e-12);
    }

    #[test]
    fn test_singular_has_no_inverse() {
        assert!(Affine::new(1.0, 2.0, 0.0, 2.0, 4.0, 0.0).inverse().is_none());
    }

    #[test]
    fn test_shift_by_half_pixel() {
        let t = Affine::north_up(Coord { x: 0.0, y: 100.0 }, 2.0, 2.0).shifted(-0.5, -0.5);
        assert_eq!(t.c, -1.0);
        assert_eq!(t.f, 101.0);
    }
}

//! Sample placement along a segment.

use crate::{
    math::{geodesic_distance, linspace, planar_distance},
    Crs, TerrainError, C,
};
use geo::geometry::Coord;

/// Upper bound on the number of samples taken per tile.
///
/// Every sample costs a point, an elevation and a distance, so this
/// caps a single tile's working set at a few tens of MB.
pub const MAX_SAMPLES: usize = 1_000_000;

/// How densely to sample a segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleMode {
    /// Target distance between consecutive samples, in meters.
    Spacing(C),

    /// Total number of samples, endpoints included.
    Count(usize),
}

impl SampleMode {
    /// Returns `self` if usable, else [TerrainError::InvalidParameter].
    pub fn validate(self) -> Result<Self, TerrainError> {
        match self {
            SampleMode::Spacing(m) if !(m.is_finite() && m > 0.0) => Err(
                TerrainError::InvalidParameter(format!("spacing must be > 0 m, got {m}")),
            ),
            SampleMode::Count(n) if n < 2 => Err(TerrainError::InvalidParameter(format!(
                "need at least 2 samples, got {n}"
            ))),
            SampleMode::Count(n) if n > MAX_SAMPLES => Err(TerrainError::InvalidParameter(
                format!("at most {MAX_SAMPLES} samples are supported, got {n}"),
            )),
            mode => Ok(mode),
        }
    }
}

/// Returns the number of samples to take between `p0` and `p1`.
///
/// Segment length is planar for projected CRSs and geodesic
/// otherwise. The result is never less than 2, and a spacing which
/// would need more than [MAX_SAMPLES] samples is rejected.
pub fn plan(p0: Coord<C>, p1: Coord<C>, crs: &Crs, mode: SampleMode) -> Result<usize, TerrainError> {
    Ok(match mode.validate()? {
        SampleMode::Count(n) => n,
        SampleMode::Spacing(spacing) => {
            let length = segment_length(p0, p1, crs)?;
            if length > 0.0 {
                let steps = (length / spacing).floor();
                #[allow(clippy::cast_precision_loss)]
                let ceiling = MAX_SAMPLES as C;
                if !steps.is_finite() || steps >= ceiling {
                    return Err(TerrainError::InvalidParameter(format!(
                        "spacing {spacing} m needs more than {MAX_SAMPLES} samples over {length} m"
                    )));
                }
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let steps = steps as usize;
                (steps + 1).max(2)
            } else {
                2
            }
        }
    })
}

/// Returns `n` points evenly spaced from `p0` to `p1`, both
/// included.
pub fn points(p0: Coord<C>, p1: Coord<C>, n: usize) -> Vec<Coord<C>> {
    linspace(p0.x, p1.x, n)
        .zip(linspace(p0.y, p1.y, n))
        .map(|(x, y)| Coord { x, y })
        .collect()
}

fn segment_length(p0: Coord<C>, p1: Coord<C>, crs: &Crs) -> Result<C, TerrainError> {
    if crs.is_projected() {
        Ok(planar_distance(p0, p1))
    } else {
        let wgs84 = Crs::wgs84()?;
        Ok(geodesic_distance(
            crs.transform(p0, &wgs84)?,
            crs.transform(p1, &wgs84)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::{plan, points, Coord, Crs, SampleMode, MAX_SAMPLES};
    use crate::TerrainError;

    fn utm() -> Crs {
        Crs::from_epsg(25832).unwrap()
    }

    #[test]
    fn test_spacing() {
        let p0 = Coord { x: 0.0, y: 0.0 };
        let p1 = Coord { x: 300.0, y: 400.0 };
        assert_eq!(plan(p0, p1, &utm(), SampleMode::Spacing(100.0)).unwrap(), 6);
        assert_eq!(plan(p0, p1, &utm(), SampleMode::Spacing(30.0)).unwrap(), 17);
        // Longer than the segment.
        assert_eq!(plan(p0, p1, &utm(), SampleMode::Spacing(1e6)).unwrap(), 2);
        // Zero length.
        assert_eq!(plan(p0, p0, &utm(), SampleMode::Spacing(10.0)).unwrap(), 2);
    }

    #[test]
    fn test_spacing_geographic() {
        let wgs84 = Crs::wgs84().unwrap();
        // ~111.3 km along the equator.
        let n = plan(
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 1.0, y: 0.0 },
            &wgs84,
            SampleMode::Spacing(1000.0),
        )
        .unwrap();
        assert_eq!(n, 112);
    }

    #[test]
    fn test_count() {
        let p0 = Coord { x: 0.0, y: 0.0 };
        let p1 = Coord { x: 10.0, y: 0.0 };
        assert_eq!(plan(p0, p1, &utm(), SampleMode::Count(2)).unwrap(), 2);
        assert_eq!(plan(p0, p1, &utm(), SampleMode::Count(800)).unwrap(), 800);
    }

    #[test]
    fn test_invalid_modes() {
        let p = Coord { x: 0.0, y: 0.0 };
        for mode in [
            SampleMode::Spacing(0.0),
            SampleMode::Spacing(-5.0),
            SampleMode::Spacing(f64::NAN),
            SampleMode::Spacing(f64::INFINITY),
            SampleMode::Count(0),
            SampleMode::Count(1),
            SampleMode::Count(MAX_SAMPLES + 1),
            SampleMode::Count(usize::MAX),
        ] {
            assert!(
                matches!(plan(p, p, &utm(), mode), Err(TerrainError::InvalidParameter(_))),
                "{mode:?}"
            );
        }
    }

    #[test]
    fn test_spacing_too_fine_for_segment() {
        let p0 = Coord { x: 0.0, y: 0.0 };
        let p1 = Coord { x: 300.0, y: 400.0 };
        for spacing in [1e-300, f64::MIN_POSITIVE, 1e-6, 500.0 / (2 * MAX_SAMPLES) as f64] {
            assert!(
                matches!(
                    plan(p0, p1, &utm(), SampleMode::Spacing(spacing)),
                    Err(TerrainError::InvalidParameter(_))
                ),
                "{spacing}"
            );
        }
        // Just under the ceiling.
        let spacing = 500.0 / (MAX_SAMPLES - 2) as f64;
        let n = plan(p0, p1, &utm(), SampleMode::Spacing(spacing)).unwrap();
        assert!(n <= MAX_SAMPLES, "{n}");

        let wgs84 = Crs::wgs84().unwrap();
        assert!(plan(
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 1.0, y: 0.0 },
            &wgs84,
            SampleMode::Spacing(1e-6),
        )
        .is_err());
    }

    #[test]
    fn test_points_include_endpoints() {
        let p0 = Coord { x: 350_100.0, y: 5_700_500.0 };
        let p1 = Coord { x: 350_600.0, y: 5_701_000.0 };
        let pts = points(p0, p1, 6);
        assert_eq!(pts.len(), 6);
        assert_eq!(pts[0], p0);
        assert_eq!(pts[5], p1);
        assert_eq!(pts[2], Coord { x: 350_300.0, y: 5_700_700.0 });
    }
}

use crate::{
    math::{geodesic_distance, planar_distance},
    Crs, TerrainError, C,
};
use geo::geometry::Coord;

/// Returns the distance in meters from `points[0]` to every point,
/// following the path through the preceding points.
///
/// Projected CRSs accumulate planar lengths; geographic CRSs
/// accumulate geodesic lengths on the WGS84 ellipsoid.
pub fn accumulate(points: &[Coord<C>], crs: &Crs) -> Result<Vec<C>, TerrainError> {
    let (points, step): (_, fn(Coord<C>, Coord<C>) -> C) = if crs.is_projected() {
        (points.to_vec(), planar_distance)
    } else {
        (crs.transform_all(points, &Crs::wgs84()?)?, geodesic_distance)
    };

    let mut total = 0.0;
    let mut distances = Vec::with_capacity(points.len());
    if let Some(&first) = points.first() {
        distances.push(total);
        let mut prev = first;
        for &point in &points[1..] {
            total += step(prev, point);
            distances.push(total);
            prev = point;
        }
    }
    Ok(distances)
}

#[cfg(test)]
mod tests {
    use super::accumulate;
    use crate::{math::geodesic_distance, planner::points, Crs};
    use approx::assert_relative_eq;
    use geo::geometry::Coord;

    #[test]
    fn test_projected() {
        let crs = Crs::from_epsg(25832).unwrap();
        let p0 = Coord { x: 350_000.0, y: 5_700_000.0 };
        let p1 = Coord { x: 350_300.0, y: 5_700_400.0 };
        let d = accumulate(&points(p0, p1, 11), &crs).unwrap();
        assert_eq!(d.len(), 11);
        assert_eq!(d[0], 0.0);
        assert!(d.windows(2).all(|w| w[0] <= w[1]));
        assert_relative_eq!(d[10], 500.0, epsilon = 1e-9);
        assert_relative_eq!(d[5], 250.0, epsilon = 1e-9);
    }

    #[test]
    fn test_geographic_matches_direct_geodesic() {
        let crs = Crs::wgs84().unwrap();
        let p0 = Coord { x: 9.0, y: 50.0 };
        let p1 = Coord { x: 9.2, y: 50.1 };
        let d = accumulate(&points(p0, p1, 50), &crs).unwrap();
        assert_eq!(d[0], 0.0);
        assert!(d.windows(2).all(|w| w[0] <= w[1]));
        assert_relative_eq!(d[49], geodesic_distance(p0, p1), max_relative = 1e-5);
    }

    #[test]
    fn test_projected_and_geographic_agree_on_short_segments() {
        let wgs84 = Crs::wgs84().unwrap();
        let utm = Crs::from_epsg(32632).unwrap();
        let p0 = Coord { x: 9.0, y: 0.0 };
        let p1 = Coord { x: 9.0, y: 0.001 };
        let geographic = accumulate(&[p0, p1], &wgs84).unwrap();
        let projected =
            accumulate(&wgs84.transform_all(&[p0, p1], &utm).unwrap(), &utm).unwrap();
        // UTM scales the central meridian by 0.9996.
        assert_relative_eq!(projected[1] / 0.9996, geographic[1], max_relative = 1e-6);
    }

    #[test]
    fn test_empty() {
        let crs = Crs::from_epsg(25832).unwrap();
        assert!(accumulate(&[], &crs).unwrap().is_empty());
    }
}

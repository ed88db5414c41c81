//! Distances between coordinates.

use geo::{algorithm::GeodesicDistance, geometry::Coord, Point};

/// Euclidean distance between two planar coordinates.
pub fn planar_distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

/// Length in meters of the shortest path on the WGS84 ellipsoid
/// between two (lon, lat) coordinates in degrees.
pub fn geodesic_distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    Point::from(a).geodesic_distance(&Point::from(b))
}

#[cfg(test)]
mod tests {
    use super::{geodesic_distance, planar_distance, Coord};
    use approx::assert_relative_eq;

    #[test]
    fn test_planar() {
        let d = planar_distance(Coord { x: 0.0, y: 0.0 }, Coord { x: 3.0, y: -4.0 });
        assert_eq!(d, 5.0);
    }

    #[test]
    fn test_geodesic_one_degree_of_equator() {
        let d = geodesic_distance(Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 0.0 });
        assert_relative_eq!(d, 111_319.490_793_273_57, epsilon = 1e-6);
    }

    #[test]
    fn test_geodesic_coincident() {
        let p = Coord { x: 9.5, y: 51.2 };
        assert_eq!(geodesic_distance(p, p), 0.0);
    }
}

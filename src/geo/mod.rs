use crate::models::delivery::GeoPoint;

const EARTH_RADIUS_KM: f64 = 6_371.0;

pub fn haversine_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lng = (b.longitude - a.longitude).to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lng = (delta_lng / 2.0).sin();

    let haversine = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lng * sin_lng;
    let central_angle = 2.0 * haversine.sqrt().asin();

    EARTH_RADIUS_KM * central_angle
}

/// Sum of the legs between consecutive points.
pub fn path_length_km(points: &[GeoPoint]) -> f64 {
    points
        .windows(2)
        .map(|leg| haversine_km(&leg[0], &leg[1]))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::{haversine_km, path_length_km};
    use crate::models::delivery::GeoPoint;

    fn point(latitude: f64, longitude: f64) -> GeoPoint {
        GeoPoint {
            latitude,
            longitude,
        }
    }

    #[test]
    fn zero_distance_for_same_point() {
        let p = point(19.0760, 72.8777);
        let distance = haversine_km(&p, &p);
        assert!(distance < 1e-9);
    }

    #[test]
    fn mumbai_to_pune_is_around_120_km() {
        let mumbai = point(19.0760, 72.8777);
        let pune = point(18.5204, 73.8567);
        let distance = haversine_km(&mumbai, &pune);
        assert!((distance - 120.0).abs() < 5.0);
    }

    #[test]
    fn path_length_adds_legs() {
        let a = point(19.0, 72.0);
        let b = point(19.1, 72.0);
        let c = point(19.2, 72.0);

        let total = path_length_km(&[a, b, c]);
        let direct = haversine_km(&a, &c);
        assert!((total - direct).abs() < 1e-6);
        assert_eq!(path_length_km(&[a]), 0.0);
    }
}

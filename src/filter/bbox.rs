//! Bounding-extent precision filter.

use rand::seq::SliceRandom;

use crate::models::AddressCandidate;

/// Meters per degree of latitude (and of longitude at the equator)
const METERS_PER_DEGREE: f64 = 111_000.0;

/// Default maximum extent area, in square meters
pub const DEFAULT_MAX_AREA: f64 = 100.0;

/// Approximate ground area of `[min_lon, min_lat, max_lon, max_lat]` in square
/// meters (equirectangular). A missing or malformed extent is infinitely large.
pub fn bounding_area(extent: Option<&[f64]>) -> f64 {
    let [min_lon, min_lat, max_lon, max_lat] = match extent {
        Some(&[a, b, c, d]) => [a, b, c, d],
        _ => return f64::INFINITY,
    };

    let lat_meters = (max_lat - min_lat).abs() * METERS_PER_DEGREE;
    let avg_lat = (min_lat + max_lat) / 2.0;
    let lon_meters = (max_lon - min_lon).abs() * METERS_PER_DEGREE * avg_lat.to_radians().cos();

    lat_meters * lon_meters
}

/// Keep candidates whose extent area is at most `max_area`, in random order.
pub fn filter_by_bbox(candidates: Vec<AddressCandidate>, max_area: f64) -> Vec<AddressCandidate> {
    let mut kept: Vec<AddressCandidate> = candidates
        .into_iter()
        .filter(|c| bounding_area(c.extent()) <= max_area)
        .collect();

    kept.shuffle(&mut rand::thread_rng());
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degenerate_extent_has_zero_area() {
        assert_eq!(bounding_area(Some(&[10.0, 50.0, 10.0, 50.001])), 0.0);
        assert_eq!(bounding_area(Some(&[10.0, 50.0, 10.001, 50.0])), 0.0);
    }

    #[test]
    fn test_missing_or_malformed_extent_is_infinite() {
        assert_eq!(bounding_area(None), f64::INFINITY);
        assert_eq!(bounding_area(Some(&[1.0, 2.0, 3.0])), f64::INFINITY);
        assert_eq!(bounding_area(Some(&[1.0, 2.0, 3.0, 4.0, 5.0])), f64::INFINITY);
        assert_eq!(bounding_area(Some(&[])), f64::INFINITY);
    }

    #[test]
    fn test_area_at_equator() {
        // 0.0001 degrees square at the equator is ~11.1m x 11.1m
        let area = bounding_area(Some(&[0.0, -0.00005, 0.0001, 0.00005]));
        assert!((area - 123.21).abs() < 0.01, "area was {area}");
    }

    #[test]
    fn test_area_shrinks_with_latitude() {
        let equator = bounding_area(Some(&[0.0, 0.0, 0.0001, 0.0001]));
        let north = bounding_area(Some(&[0.0, 60.0, 0.0001, 60.0001]));
        assert!(north < equator);
        assert!((north / equator - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_corner_order_does_not_matter() {
        let a = bounding_area(Some(&[2.35, 48.85, 2.3501, 48.8501]));
        let b = bounding_area(Some(&[2.3501, 48.8501, 2.35, 48.85]));
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn test_filter_by_bbox() {
        let tight = AddressCandidate::new(Some(vec![0.0, 0.0, 0.00005, 0.00005])).with("id", "tight");
        let wide = AddressCandidate::new(Some(vec![0.0, 0.0, 0.01, 0.01])).with("id", "wide");
        let point = AddressCandidate::new(Some(vec![5.0, 5.0, 5.0, 5.0])).with("id", "point");
        let none = AddressCandidate::new(None).with("id", "none");

        let kept = filter_by_bbox(vec![tight, wide, point, none], DEFAULT_MAX_AREA);
        let mut ids: Vec<&str> = kept.iter().filter_map(|c| c.field("id")).collect();
        ids.sort();
        assert_eq!(ids, vec!["point", "tight"]);
    }
}

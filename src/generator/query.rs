//! City selection and query phrasing.

use rand::seq::SliceRandom;
use rand::Rng;

/// Building-type prefixes. Photon ranks by keyword as much as by geography,
/// so each prefix surfaces a different slice of results for the same city.
pub const BUILDING_KEYWORDS: &[&str] = &[
    "house",
    "apartment",
    "residential",
    "home",
    "building",
    "unit",
    "flat",
    "condo",
    "townhouse",
    "villa",
    "duplex",
    "studio",
    "loft",
    "cottage",
];

/// Shuffle `cities` and optionally cap the result. A cap of `None` or zero
/// keeps every city.
pub fn select_cities<R: Rng + ?Sized>(
    cities: &[String],
    max_cities: Option<usize>,
    rng: &mut R,
) -> Vec<String> {
    let mut selected = cities.to_vec();
    selected.shuffle(rng);

    if let Some(max) = max_cities.filter(|&m| m > 0) {
        selected.truncate(max);
    }
    selected
}

/// Query variants for one city: the bare "city, country" phrase first, then
/// one per building keyword.
pub fn query_variants(city: &str, country: &str) -> Vec<String> {
    let base = format!("{}, {}", city, country);

    std::iter::once(base.clone())
        .chain(BUILDING_KEYWORDS.iter().map(|kw| format!("{} {}", kw, base)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn cities() -> Vec<String> {
        ["Leeds", "York", "Bath", "Derby", "Hull"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_query_variants() {
        let variants = query_variants("Leeds", "United Kingdom");
        assert_eq!(variants.len(), 15);
        assert_eq!(variants[0], "Leeds, United Kingdom");
        assert_eq!(variants[1], "house Leeds, United Kingdom");
        assert_eq!(variants[14], "cottage Leeds, United Kingdom");
    }

    #[test]
    fn test_select_keeps_all_cities() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut selected = select_cities(&cities(), None, &mut rng);
        selected.sort();

        let mut expected = cities();
        expected.sort();
        assert_eq!(selected, expected);
    }

    #[test]
    fn test_select_caps() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(select_cities(&cities(), Some(2), &mut rng).len(), 2);
        assert_eq!(select_cities(&cities(), Some(0), &mut rng).len(), 5);
        assert_eq!(select_cities(&cities(), Some(50), &mut rng).len(), 5);
    }

    #[test]
    fn test_select_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(select_cities(&[], None, &mut rng).is_empty());
    }
}

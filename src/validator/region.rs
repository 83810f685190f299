//! Region matching between a generated address and its seed.

use std::sync::Arc;
use tracing::debug;

use super::extract::extract_city_country;
use crate::reference::{CountryMapping, Gazetteer};

/// Cities accepted for a Western Sahara seed, which the gazetteer lacks as a country.
pub const WESTERN_SAHARA_CITIES: &[&str] = &[
    "laayoune",
    "dakhla",
    "boujdour",
    "es semara",
    "sahrawi",
    "tifariti",
    "aousserd",
];

const WESTERN_SAHARA_SEEDS: &[&str] = &["west sahara", "western sahara"];

/// Disputed regions matched by name alone.
pub const SPECIAL_REGIONS: &[&str] = &["luhansk", "crimea", "donetsk"];

/// Whether any Western Sahara city name occurs in `generated`.
pub fn contains_western_sahara_city(generated: &str) -> bool {
    if generated.is_empty() {
        return false;
    }
    let lower = generated.to_lowercase();
    WESTERN_SAHARA_CITIES.iter().any(|city| lower.contains(city))
}

/// Decide whether `generated` lies in the region named by `seed`.
///
/// Disputed regions are matched textually. Otherwise the generated address
/// must yield both a city and a country, and either the city equals the seed,
/// or the country equals the seed or its normalized alias.
pub fn validate_address_region(
    generated: &str,
    seed: &str,
    mapping: &CountryMapping,
    gazetteer: &Gazetteer,
) -> bool {
    if generated.is_empty() || seed.is_empty() {
        return false;
    }

    let seed_lower = seed.to_lowercase();

    if WESTERN_SAHARA_SEEDS.contains(&seed_lower.trim()) {
        return contains_western_sahara_city(generated);
    }
    if SPECIAL_REGIONS.contains(&seed_lower.trim()) {
        return generated.to_lowercase().contains(seed_lower.trim());
    }

    let (city, country) = extract_city_country(generated, seed.contains(','), mapping, gazetteer);
    if city.is_empty() {
        debug!("No city extracted from '{}'", generated);
        return false;
    }
    if country.is_empty() {
        debug!("No country extracted from '{}'", generated);
        return false;
    }

    let seed_mapped = mapping.normalize(seed);
    city == seed_lower || country == seed_lower || country == seed_mapped
}

/// Shared reference data bundled for repeated region checks.
#[derive(Debug, Clone)]
pub struct RegionValidator {
    mapping: Arc<CountryMapping>,
    gazetteer: Arc<Gazetteer>,
}

impl RegionValidator {
    pub fn new(mapping: Arc<CountryMapping>, gazetteer: Arc<Gazetteer>) -> Self {
        Self { mapping, gazetteer }
    }

    /// Extract `(city, country)` from `address`
    pub fn extract(&self, address: &str, two_parts: bool) -> (String, String) {
        extract_city_country(address, two_parts, &self.mapping, &self.gazetteer)
    }

    /// Check `generated` against the seed region
    pub fn matches(&self, generated: &str, seed: &str) -> bool {
        validate_address_region(generated, seed, &self.mapping, &self.gazetteer)
    }
}

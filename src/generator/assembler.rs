//! Turns validated candidates into address documents, once per full address.

use chrono::Utc;
use hashbrown::HashSet;
use thiserror::Error;

use crate::filter::looks_like_address;
use crate::models::{AddressCandidate, AddressDocument};
use crate::sink::ErrorKind;

/// Property order used to build the full address
pub const ADDRESS_FIELDS: [&str; 9] = [
    "name",
    "housenumber",
    "street",
    "locality",
    "district",
    "city",
    "state",
    "postcode",
    "country",
];

const MIN_FULL_ADDRESS_LEN: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Rejection {
    #[error("Missing required fields (country: {country:?}, city: {city:?}, street: {street:?})")]
    MissingFields {
        country: Option<String>,
        city: Option<String>,
        street: Option<String>,
    },

    #[error("Missing OSM type or ID")]
    MissingOsm,

    #[error("full address is too short")]
    TooShort,

    #[error("full address does not look like an address")]
    Implausible,

    #[error("full address already produced in this run")]
    Duplicate,
}

impl Rejection {
    /// Sink category for rejections worth recording; the rest are dropped silently
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Rejection::MissingFields { .. } => Some(ErrorKind::MissingFields),
            Rejection::MissingOsm => Some(ErrorKind::MissingOsm),
            _ => None,
        }
    }
}

/// Join every present address field, in [`ADDRESS_FIELDS`] order, with ", ".
pub fn full_address(candidate: &AddressCandidate) -> String {
    ADDRESS_FIELDS
        .iter()
        .filter_map(|field| candidate.field(field))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Stateful assembler holding the set of full addresses accepted this run
pub struct Assembler {
    worker_id: i64,
    processed: HashSet<String>,
}

impl Assembler {
    pub fn new(worker_id: i64) -> Self {
        Self {
            worker_id,
            processed: HashSet::new(),
        }
    }

    /// Validate `candidate` and turn it into a document
    pub fn assemble(&mut self, candidate: &AddressCandidate) -> Result<AddressDocument, Rejection> {
        let (Some(country), Some(city), Some(street)) = (
            candidate.field("country"),
            candidate.field("city"),
            candidate.field("street"),
        ) else {
            return Err(Rejection::MissingFields {
                country: candidate.field("country").map(str::to_string),
                city: candidate.field("city").map(str::to_string),
                street: candidate.field("street").map(str::to_string),
            });
        };

        let (Some(osm_type), Some(osm_id)) = (candidate.field("osm_type"), candidate.field("osm_id"))
        else {
            return Err(Rejection::MissingOsm);
        };

        let fulladdress = full_address(candidate);
        if fulladdress.trim().chars().count() < MIN_FULL_ADDRESS_LEN {
            return Err(Rejection::TooShort);
        }
        if !looks_like_address(&fulladdress) {
            return Err(Rejection::Implausible);
        }
        if self.processed.contains(&fulladdress) {
            return Err(Rejection::Duplicate);
        }
        self.processed.insert(fulladdress.clone());

        Ok(AddressDocument {
            osm: format!("{} {}", osm_type, osm_id),
            country: candidate.field("countrycode").unwrap_or("Unknown").to_string(),
            country_name: country.to_string(),
            city: city.to_string(),
            street_name: street.to_string(),
            status: 0,
            worker_id: self.worker_id,
            fulladdress,
            created_at: Utc::now(),
        })
    }

    /// Number of distinct full addresses accepted so far
    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baker_street() -> AddressCandidate {
        AddressCandidate::new(Some(vec![-0.1586, 51.5237, -0.1585, 51.5238]))
            .with("osm_type", "W")
            .with("osm_id", "12345")
            .with("housenumber", "221B")
            .with("street", "Baker Street")
            .with("district", "Marylebone")
            .with("city", "London")
            .with("postcode", "NW1 6XE")
            .with("country", "United Kingdom")
            .with("countrycode", "GB")
    }

    #[test]
    fn test_full_address_order() {
        assert_eq!(
            full_address(&baker_street()),
            "221B, Baker Street, Marylebone, London, NW1 6XE, United Kingdom"
        );
    }

    #[test]
    fn test_assemble_document() {
        let mut assembler = Assembler::new(11);
        let doc = assembler.assemble(&baker_street()).unwrap();

        assert_eq!(doc.osm, "W 12345");
        assert_eq!(doc.country, "GB");
        assert_eq!(doc.country_name, "United Kingdom");
        assert_eq!(doc.city, "London");
        assert_eq!(doc.street_name, "Baker Street");
        assert_eq!(doc.status, 0);
        assert_eq!(doc.worker_id, 11);
        assert_eq!(assembler.processed_count(), 1);
    }

    #[test]
    fn test_same_address_twice_yields_one_document() {
        let mut assembler = Assembler::new(11);
        assert!(assembler.assemble(&baker_street()).is_ok());

        let again = baker_street().with("osm_id", "99999");
        assert_eq!(assembler.assemble(&again), Err(Rejection::Duplicate));
        assert_eq!(assembler.processed_count(), 1);
    }

    #[test]
    fn test_missing_required_fields() {
        let mut assembler = Assembler::new(1);
        let candidate = baker_street().with("street", "");
        let err = assembler.assemble(&candidate).unwrap_err();
        assert!(matches!(err, Rejection::MissingFields { street: None, .. }));
        assert_eq!(err.error_kind(), Some(ErrorKind::MissingFields));
    }

    #[test]
    fn test_missing_osm() {
        let mut assembler = Assembler::new(1);
        let candidate = baker_street().with("osm_type", "");
        assert_eq!(assembler.assemble(&candidate), Err(Rejection::MissingOsm));
    }

    #[test]
    fn test_unknown_country_code() {
        let mut assembler = Assembler::new(1);
        let doc = assembler
            .assemble(&baker_street().with("countrycode", ""))
            .unwrap();
        assert_eq!(doc.country, "Unknown");
    }

    #[test]
    fn test_implausible_address() {
        let mut assembler = Assembler::new(1);
        let candidate = AddressCandidate::new(None)
            .with("osm_type", "N")
            .with("osm_id", "1")
            .with("street", "Rue X")
            .with("city", "Lyon")
            .with("country", "France");
        assert_eq!(assembler.assemble(&candidate), Err(Rejection::Implausible));
        assert_eq!(Rejection::Implausible.error_kind(), None);
        assert_eq!(assembler.processed_count(), 0);
    }
}

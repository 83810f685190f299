//! Static country -> cities table used to drive generation.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::error::ReferenceError;

#[derive(Debug, Clone, Deserialize)]
struct RawCountryEntry {
    country_name: String,
    #[serde(default)]
    cities: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CountryEntry {
    pub code: String,
    pub name: String,
    pub cities: Vec<String>,
}

/// Read-only mapping from country name to its code and city list.
#[derive(Debug, Clone, Default)]
pub struct CountryCityTable {
    entries: Vec<CountryEntry>,
}

impl CountryCityTable {
    pub fn new(entries: Vec<CountryEntry>) -> Self {
        Self { entries }
    }

    /// Load `{ "<CODE>": { "country_name": "...", "cities": [...] } }`.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ReferenceError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ReferenceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_json(&content).map_err(|source| ReferenceError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        info!(
            "Loaded {} countries from {}",
            table.entries.len(),
            path.display()
        );
        Ok(table)
    }

    /// Like [`load_from_file`](Self::load_from_file), but a missing or broken
    /// file degrades to an empty table instead of failing.
    pub fn load_or_empty<P: AsRef<Path>>(path: P) -> (Self, Option<ReferenceError>) {
        match Self::load_from_file(path) {
            Ok(table) => (table, None),
            Err(e) => {
                warn!("Country/city table unavailable, continuing empty: {}", e);
                (Self::default(), Some(e))
            }
        }
    }

    /// Parse the table from its JSON text
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        let raw: BTreeMap<String, RawCountryEntry> = serde_json::from_str(content)?;
        let entries = raw
            .into_iter()
            .map(|(code, entry)| CountryEntry {
                code,
                name: entry.country_name,
                cities: entry.cities,
            })
            .collect();
        Ok(Self { entries })
    }

    /// Find a country by case-insensitive name
    pub fn get(&self, country_name: &str) -> Option<&CountryEntry> {
        let wanted = country_name.to_lowercase();
        self.entries
            .iter()
            .find(|entry| entry.name.to_lowercase() == wanted)
    }

    /// City list for a country, if the country is known
    pub fn cities_for(&self, country_name: &str) -> Option<&[String]> {
        self.get(country_name).map(|entry| entry.cities.as_slice())
    }

    /// Number of countries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table has no countries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

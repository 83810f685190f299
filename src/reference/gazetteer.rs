//! City/country authority data used to confirm extracted city names.
//!
//! The gazetteer is loaded once, explicitly, and then shared read-only
//! (typically behind an `Arc`). It is never used to generate addresses.

use flate2::read::GzDecoder;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::info;

use crate::error::ReferenceError;

#[derive(Debug, Deserialize)]
struct RawCity {
    name: String,
    #[serde(default)]
    countrycode: String,
}

#[derive(Debug, Deserialize)]
struct RawCountry {
    name: String,
}

#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    /// Lowercased country name -> country code
    country_codes: HashMap<String, String>,
    /// Country code -> lowercased city names
    cities: HashMap<String, Vec<String>>,
    city_count: usize,
}

impl Gazetteer {
    /// Build from in-memory `(city name, country code)` and
    /// `(country code, country name)` records.
    pub fn from_records<C, K, S1, S2, S3, S4>(cities: C, countries: K) -> Self
    where
        C: IntoIterator<Item = (S1, S2)>,
        K: IntoIterator<Item = (S3, S4)>,
        S1: AsRef<str>,
        S2: AsRef<str>,
        S3: AsRef<str>,
        S4: AsRef<str>,
    {
        let mut gazetteer = Self::default();

        for (code, name) in countries {
            let key = name.as_ref().trim().to_lowercase();
            // Keep the first country registered under a name
            gazetteer
                .country_codes
                .entry(key)
                .or_insert_with(|| code.as_ref().to_string());
        }

        for (name, code) in cities {
            gazetteer
                .cities
                .entry(code.as_ref().to_string())
                .or_default()
                .push(name.as_ref().to_lowercase());
            gazetteer.city_count += 1;
        }

        gazetteer
    }

    /// Load geonames-cache style JSON files (optionally gzipped):
    /// cities as `{ "<id>": { "name": ..., "countrycode": ... } }` and
    /// countries as `{ "<code>": { "name": ... } }`.
    pub fn load(cities_path: &Path, countries_path: &Path) -> Result<Self, ReferenceError> {
        let start = std::time::Instant::now();

        let cities: HashMap<String, RawCity> = read_json(cities_path)?;
        let countries: HashMap<String, RawCountry> = read_json(countries_path)?;

        let gazetteer = Self::from_records(
            cities.into_values().map(|c| (c.name, c.countrycode)),
            countries.into_iter().map(|(code, c)| (code, c.name)),
        );

        info!(
            "Gazetteer loaded in {:.2}s: {} countries, {} cities",
            start.elapsed().as_secs_f64(),
            gazetteer.country_count(),
            gazetteer.city_count()
        );
        Ok(gazetteer)
    }

    /// Resolve a country name to its code (exact, case-insensitive)
    pub fn country_code(&self, country_name: &str) -> Option<&str> {
        self.country_codes
            .get(&country_name.trim().to_lowercase())
            .map(String::as_str)
    }

    /// Check whether `city_name` is a known city of `country_name`.
    ///
    /// A gazetteer city matches when its name equals the candidate, or, for
    /// candidates of two or more words, when it starts with the first word or
    /// contains the second word.
    pub fn city_in_country(&self, city_name: &str, country_name: &str) -> bool {
        if city_name.is_empty() || country_name.is_empty() {
            return false;
        }

        let Some(code) = self.country_code(country_name) else {
            return false;
        };
        let Some(cities) = self.cities.get(code) else {
            return false;
        };

        let candidate = city_name.to_lowercase();
        let candidate = candidate.trim();
        let words: Vec<&str> = candidate.split_whitespace().collect();

        cities.iter().any(|name| {
            if name.trim() == candidate {
                return true;
            }
            if words.len() >= 2 {
                return name.starts_with(words[0]) || name.contains(words[1]);
            }
            false
        })
    }

    /// Number of known country names
    pub fn country_count(&self) -> usize {
        self.country_codes.len()
    }

    /// Number of city records loaded
    pub fn city_count(&self) -> usize {
        self.city_count
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ReferenceError> {
    let file = File::open(path).map_err(|source| ReferenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader: Box<dyn Read> = if path.extension().map_or(false, |e| e == "gz") {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };

    serde_json::from_reader(BufReader::new(reader)).map_err(|source| ReferenceError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn sample() -> Gazetteer {
        Gazetteer::from_records(
            [
                ("London", "GB"),
                ("Leeds", "GB"),
                ("Cape Town", "ZA"),
                ("Paris", "FR"),
            ],
            [
                ("GB", "United Kingdom"),
                ("ZA", "South Africa"),
                ("FR", "France"),
            ],
        )
    }

    #[test]
    fn test_exact_match() {
        let g = sample();
        assert!(g.city_in_country("london", "united kingdom"));
        assert!(g.city_in_country("London", "UNITED KINGDOM "));
        assert!(!g.city_in_country("paris", "united kingdom"));
    }

    #[test]
    fn test_two_word_rules() {
        let g = sample();
        // second word contained in a city name
        assert!(g.city_in_country("cape town", "south africa"));
        assert!(g.city_in_country("old town", "south africa"));
        // first word is a prefix of a city name
        assert!(g.city_in_country("lee side", "united kingdom"));
        // single words get no fuzzy treatment
        assert!(!g.city_in_country("lee", "united kingdom"));
    }

    #[test]
    fn test_unknown_country_or_empty_input() {
        let g = sample();
        assert!(!g.city_in_country("london", "england"));
        assert!(!g.city_in_country("", "united kingdom"));
        assert!(!g.city_in_country("london", ""));
        assert_eq!(g.country_code("France"), Some("FR"));
    }

    #[test]
    fn test_load_plain_and_gzipped() {
        let dir = tempfile::tempdir().unwrap();
        let cities = dir.path().join("cities.json.gz");
        let countries = dir.path().join("countries.json");

        let mut gz = GzEncoder::new(File::create(&cities).unwrap(), Compression::default());
        gz.write_all(
            br#"{"2643743": {"geonameid": 2643743, "name": "London", "countrycode": "GB", "population": 7556900}}"#,
        )
        .unwrap();
        gz.finish().unwrap();

        std::fs::write(
            &countries,
            r#"{"GB": {"geonameid": 2635167, "name": "United Kingdom", "iso": "GB"}}"#,
        )
        .unwrap();

        let g = Gazetteer::load(&cities, &countries).unwrap();
        assert_eq!(g.city_count(), 1);
        assert!(g.city_in_country("london", "united kingdom"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        let err = Gazetteer::load(&missing, &missing).unwrap_err();
        assert!(matches!(err, ReferenceError::Io { .. }));
    }
}

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Generator worker settings. Every field has a default so an empty (or
/// missing) config file is valid.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GeneratorConfig {
    pub photon_url: String,
    pub es_url: String,
    pub index: String,
    pub worker_id: i64,
    /// Largest accepted bounding extent, in square meters.
    pub max_bbox_area: f64,
    pub result_limit: usize,
    pub addresses_per_city: usize,
    pub max_attempts_per_city: usize,
    pub max_cities: Option<usize>,
    pub variant_delay_ms: u64,
    pub city_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub country_city_file: PathBuf,
    pub country_mapping_file: Option<PathBuf>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            photon_url: "https://photon.komoot.io/api/".to_string(),
            es_url: "http://localhost:9200".to_string(),
            index: "address".to_string(),
            worker_id: 11,
            max_bbox_area: 100.0,
            result_limit: 50,
            addresses_per_city: 10,
            max_attempts_per_city: 3,
            max_cities: None,
            variant_delay_ms: 1000,
            city_delay_ms: 2000,
            request_timeout_secs: 20,
            country_city_file: PathBuf::from("country_city_list.json"),
            country_mapping_file: None,
        }
    }
}

impl GeneratorConfig {
    /// Load settings from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: GeneratorConfig =
            toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Pause after a phrase variant that saved nothing
    pub fn variant_delay(&self) -> Duration {
        Duration::from_millis(self.variant_delay_ms)
    }

    /// Pause between cities
    pub fn city_delay(&self) -> Duration {
        Duration::from_millis(self.city_delay_ms)
    }

    /// Per-request timeout for the geocoding API
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

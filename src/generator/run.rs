//! Per-country generation loop.

use indicatif::ProgressBar;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::assembler::Assembler;
use super::query::{query_variants, select_cities};
use crate::config::GeneratorConfig;
use crate::error::{ApiError, GenerateError};
use crate::filter::filter_by_bbox;
use crate::geocoder::GeocodingApi;
use crate::reference::CountryCityTable;
use crate::sink::{ErrorKind, ErrorReporter};
use crate::store::{save_documents, AddressStore};

/// Documents assembled per variant, relative to what is still needed.
/// Over-generation absorbs store-level duplicates.
const OVERGENERATION_FACTOR: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CityTally {
    pub saved: usize,
    pub duplicates: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub country: String,
    pub target_count: usize,
    pub processed_cities: usize,
    pub total_generated: usize,
    pub total_saved: usize,
    pub total_duplicates: usize,
    pub total_errors: usize,
    pub worker_id: i64,
    pub city_breakdown: BTreeMap<String, CityTally>,
}

impl GenerationReport {
    fn new(country: &str, target_count: usize, worker_id: i64) -> Self {
        Self {
            country: country.to_string(),
            target_count,
            processed_cities: 0,
            total_generated: 0,
            total_saved: 0,
            total_duplicates: 0,
            total_errors: 0,
            worker_id,
            city_breakdown: BTreeMap::new(),
        }
    }
}

/// Sequential address generator: one city and one query at a time.
pub struct Generator {
    api: Arc<dyn GeocodingApi>,
    store: Arc<dyn AddressStore>,
    table: Arc<CountryCityTable>,
    config: GeneratorConfig,
    reporter: ErrorReporter,
    assembler: Assembler,
    progress: Option<ProgressBar>,
}

impl Generator {
    pub fn new(
        api: Arc<dyn GeocodingApi>,
        store: Arc<dyn AddressStore>,
        table: Arc<CountryCityTable>,
        config: GeneratorConfig,
        reporter: ErrorReporter,
    ) -> Self {
        let assembler = Assembler::new(config.worker_id);
        Self {
            api,
            store,
            table,
            config,
            reporter,
            assembler,
            progress: None,
        }
    }

    /// Advance `progress` once per processed city
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Shuffled cities for `country`, reporting unknown countries to the sink
    pub fn cities_for(&self, country: &str) -> Vec<String> {
        match self.table.cities_for(country) {
            Some(cities) => select_cities(cities, self.config.max_cities, &mut rand::thread_rng()),
            None => {
                self.reporter.report(
                    ErrorKind::CountryNotFound,
                    format!("Country '{}' not found in data", country),
                );
                Vec::new()
            }
        }
    }

    /// Generate up to `count` new addresses for `country`, walking its cities
    /// in random order until the target is met or the cities run out.
    pub async fn generate_addresses(
        &mut self,
        country: &str,
        count: usize,
    ) -> Result<GenerationReport, GenerateError> {
        let cities = self.cities_for(country);
        if cities.is_empty() {
            return Err(GenerateError::NoCities(country.to_string()));
        }
        info!("Selected {} random cities from {}", cities.len(), country);

        if let Some(pb) = &self.progress {
            pb.set_length(cities.len() as u64);
        }

        let mut report = GenerationReport::new(country, count, self.config.worker_id);

        for city in &cities {
            if report.total_saved >= count {
                info!(
                    "Target reached! Found {} addresses from {} cities",
                    report.total_saved, report.processed_cities
                );
                break;
            }

            info!("Processing {}, {}", city, country);
            let tally = self.process_city(city, country, count, &mut report).await;

            report.city_breakdown.insert(city.clone(), tally);
            report.processed_cities += 1;
            info!(
                "Completed {}: {} addresses saved, {} duplicates. Total: {}/{}",
                city, tally.saved, tally.duplicates, report.total_saved, count
            );

            if let Some(pb) = &self.progress {
                pb.inc(1);
            }
            pause(self.config.city_delay()).await;
        }

        if let Some(pb) = &self.progress {
            pb.finish_with_message("Generation complete");
        }
        Ok(report)
    }

    async fn process_city(
        &mut self,
        city: &str,
        country: &str,
        count: usize,
        report: &mut GenerationReport,
    ) -> CityTally {
        let per_city = self.config.addresses_per_city;
        let max_attempts = self.config.max_attempts_per_city;
        let variants = query_variants(city, country);

        let mut tally = CityTally::default();
        let mut attempts = 0;

        while tally.saved < per_city && report.total_saved < count && attempts < max_attempts {
            attempts += 1;
            debug!("City attempt {}/{} for {}", attempts, max_attempts, city);
            let saved_before = tally.saved;

            for query in &variants {
                if tally.saved >= per_city || report.total_saved >= count {
                    break;
                }

                let saved = self
                    .run_variant(query, count, per_city, &mut tally, report)
                    .await;

                // Keep going immediately while a city is productive
                if saved == 0 {
                    pause(self.config.variant_delay()).await;
                }
            }

            if tally.saved == saved_before {
                info!(
                    "No new addresses found for {} in attempt {}, moving to next city",
                    city, attempts
                );
                break;
            }
        }

        tally
    }

    /// Query one phrase variant and save what survives. Returns the number of
    /// newly saved documents.
    async fn run_variant(
        &mut self,
        query: &str,
        count: usize,
        per_city: usize,
        tally: &mut CityTally,
        report: &mut GenerationReport,
    ) -> usize {
        let candidates = match self.api.search(query, self.config.result_limit).await {
            Ok(candidates) => candidates,
            Err(e) => {
                self.reporter.report(api_error_kind(&e), e.to_string());
                return 0;
            }
        };

        let received = candidates.len();
        let filtered = filter_by_bbox(candidates, self.config.max_bbox_area);
        debug!(
            "'{}': received {} candidates, {} after bbox filter",
            query,
            received,
            filtered.len()
        );

        let remaining = (count - report.total_saved).min(per_city - tally.saved);
        let target_docs = remaining * OVERGENERATION_FACTOR;

        let mut documents = Vec::new();
        for candidate in &filtered {
            if documents.len() >= target_docs {
                break;
            }
            match self.assembler.assemble(candidate) {
                Ok(doc) => documents.push(doc),
                Err(rejection) => {
                    if let Some(kind) = rejection.error_kind() {
                        self.reporter.report(kind, rejection.to_string());
                    }
                }
            }
        }

        if documents.is_empty() {
            return 0;
        }

        let saved = save_documents(self.store.as_ref(), &documents, &self.reporter).await;

        tally.saved += saved.saved;
        tally.duplicates += saved.duplicates;
        report.total_saved += saved.saved;
        report.total_duplicates += saved.duplicates;
        report.total_errors += saved.errors;
        report.total_generated += documents.len();

        info!(
            "Saved {} addresses, {} duplicates (city total: {})",
            saved.saved, saved.duplicates, tally.saved
        );
        saved.saved
    }
}

fn api_error_kind(error: &ApiError) -> ErrorKind {
    match error {
        ApiError::Forbidden { .. } => ErrorKind::ApiForbidden,
        ApiError::Status { .. } => ErrorKind::ApiError,
        ApiError::Network { .. } | ApiError::Decode { .. } => ErrorKind::ApiException,
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

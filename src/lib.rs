//! Streetseed - synthetic address generation from a public geocoder
//!
//! This library provides the generator pipeline, the address store and the
//! region validator shared by the `generate` and `validate` binaries.

pub mod config;
pub mod elasticsearch;
pub mod error;
pub mod filter;
pub mod generator;
pub mod geocoder;
pub mod models;
pub mod reference;
pub mod sink;
pub mod store;
pub mod validator;

pub use config::GeneratorConfig;
pub use error::{ApiError, GenerateError, ReferenceError, StoreError};
pub use generator::{GenerationReport, Generator};
pub use models::{AddressCandidate, AddressDocument};
pub use validator::{extract_city_country, validate_address_region, RegionValidator};

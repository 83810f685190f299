//! Read-only reference data: the country/city table, the country alias map
//! and the gazetteer.

mod country_cities;
mod country_mapping;
mod gazetteer;

pub use country_cities::{CountryCityTable, CountryEntry};
pub use country_mapping::{CountryMapping, CountrySpan};
pub use gazetteer::Gazetteer;

//! Address generation pipeline: city selection, query phrasing, filtering,
//! assembly and persistence.

mod assembler;
mod query;
mod run;

pub use assembler::{full_address, Assembler, Rejection, ADDRESS_FIELDS};
pub use query::{query_variants, select_cities, BUILDING_KEYWORDS};
pub use run::{CityTally, GenerationReport, Generator};

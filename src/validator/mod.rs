//! Address region validation against seed locations.

mod extract;
mod region;

pub use extract::extract_city_country;
pub use region::{
    contains_western_sahara_city, validate_address_region, RegionValidator, SPECIAL_REGIONS,
    WESTERN_SAHARA_CITIES,
};

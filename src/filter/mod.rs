//! Candidate filters: geographic tightness and address plausibility.

mod bbox;
mod plausibility;

pub use bbox::{bounding_area, filter_by_bbox, DEFAULT_MAX_AREA};
pub use plausibility::looks_like_address;

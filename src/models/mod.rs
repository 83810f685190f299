//! Core data models shared by the generator and validator.

pub mod candidate;
pub mod document;

pub use candidate::{AddressCandidate, PhotonFeature, PhotonResponse};
pub use document::AddressDocument;

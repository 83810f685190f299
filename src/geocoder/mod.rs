//! Geocoding API boundary.

mod photon;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::models::AddressCandidate;

pub use photon::PhotonClient;

/// Free-text search returning address candidates.
#[async_trait]
pub trait GeocodingApi: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<AddressCandidate>, ApiError>;
}

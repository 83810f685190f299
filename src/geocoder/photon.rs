//! Photon (komoot) search client.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::GeocodingApi;
use crate::error::ApiError;
use crate::models::{AddressCandidate, PhotonResponse};

const USER_AGENT: &str = "streetseed/0.1 (synthetic address generator)";

/// Only building features carry house-level addresses
const OSM_TAG_FILTER: &str = "building";

pub struct PhotonClient {
    client: Client,
    endpoint: Url,
}

impl PhotonClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(endpoint).context("Invalid Photon URL")?;

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        if let Ok(referer) = HeaderValue::from_str(endpoint.origin().ascii_serialization().as_str())
        {
            headers.insert(REFERER, referer);
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, endpoint })
    }

    fn request_url(&self, query: &str, limit: usize) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("osm_tag", OSM_TAG_FILTER)
            .append_pair("limit", &limit.to_string());
        url
    }
}

#[async_trait]
impl GeocodingApi for PhotonClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<AddressCandidate>, ApiError> {
        let url = self.request_url(query, limit);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| ApiError::Network {
                query: query.to_string(),
                source,
            })?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::FORBIDDEN => {
                return Err(ApiError::Forbidden {
                    query: query.to_string(),
                })
            }
            status => {
                return Err(ApiError::Status {
                    status: status.as_u16(),
                    query: query.to_string(),
                })
            }
        }

        let data: PhotonResponse = response.json().await.map_err(|e| ApiError::Decode {
            query: query.to_string(),
            message: e.to_string(),
        })?;

        debug!("Photon returned {} features for '{}'", data.features.len(), query);
        Ok(data.features.into_iter().map(AddressCandidate::from).collect())
    }
}

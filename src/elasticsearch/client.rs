//! Elasticsearch connection for the address index.

use anyhow::{Context, Result};
use elasticsearch::{
    cluster::ClusterHealthParts,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    CountParts, Elasticsearch,
};
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;

/// Elasticsearch client bound to one address index
#[derive(Clone)]
pub struct EsClient {
    client: Elasticsearch,
    pub index_name: String,
}

impl EsClient {
    /// Create a client for `index_name` on the cluster at `es_url`
    pub fn new(es_url: &str, index_name: &str) -> Result<Self> {
        let url = Url::parse(es_url).with_context(|| format!("Invalid Elasticsearch URL {}", es_url))?;
        let conn_pool = SingleNodeConnectionPool::new(url);
        let transport = TransportBuilder::new(conn_pool).disable_proxy().build()?;

        Ok(Self {
            client: Elasticsearch::new(transport),
            index_name: index_name.to_string(),
        })
    }

    /// Get the underlying Elasticsearch client
    pub fn client(&self) -> &Elasticsearch {
        &self.client
    }

    /// True unless the cluster is unreachable or reports `red`
    pub async fn health_check(&self) -> Result<bool> {
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await?;

        if !response.status_code().is_success() {
            return Ok(false);
        }

        let body = response.json::<Value>().await?;
        let status = body["status"].as_str().unwrap_or("unknown");
        debug!("Cluster status: {}", status);
        if status == "yellow" {
            warn!("Elasticsearch cluster status is yellow");
        }
        Ok(status != "red")
    }

    /// Addresses stored in the index, optionally only those from `worker_id`
    pub async fn doc_count(&self, worker_id: Option<i64>) -> Result<u64> {
        let query = match worker_id {
            Some(id) => json!({ "query": { "term": { "worker_id": id } } }),
            None => json!({ "query": { "match_all": {} } }),
        };

        let response = self
            .client
            .count(CountParts::Index(&[&self.index_name]))
            .body(query)
            .send()
            .await?;

        let body = response.json::<Value>().await?;
        Ok(body["count"].as_u64().unwrap_or(0))
    }
}

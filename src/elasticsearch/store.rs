//! Address store backed by an Elasticsearch index.
//!
//! Every document is written with the `create` action under an id derived
//! from its full address, so a second write of the same address is refused
//! with a 409 conflict. That conflict is the duplicate-key signal.

use async_trait::async_trait;
use elasticsearch::http::request::JsonBody;
use elasticsearch::{BulkParts, CreateParts};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::{create_dynamic_index, create_index, EsClient};
use crate::error::StoreError;
use crate::models::AddressDocument;
use crate::sink::{ErrorKind, ErrorReporter};
use crate::store::{AddressStore, IndexMode};

const CONFLICT: u16 = 409;

pub struct EsAddressStore {
    client: EsClient,
}

impl EsAddressStore {
    /// Create a store writing to the client's index
    pub fn new(client: EsClient) -> Self {
        Self { client }
    }

    /// Get the wrapped index client
    pub fn client(&self) -> &EsClient {
        &self.client
    }
}

/// Action and source lines for a bulk request. Every document is a `create`
/// under its full-address id, whatever mapping the index was created with.
fn bulk_lines(docs: &[AddressDocument]) -> Result<Vec<Value>, StoreError> {
    let mut lines = Vec::with_capacity(docs.len() * 2);

    for doc in docs {
        // Action line
        lines.push(json!({ "create": { "_id": doc.doc_id() } }));
        // Document line
        let source = serde_json::to_value(doc).map_err(|e| StoreError::Backend(e.to_string()))?;
        lines.push(source);
    }

    Ok(lines)
}

fn bulk_body(docs: &[AddressDocument]) -> Result<Vec<JsonBody<Value>>, StoreError> {
    Ok(bulk_lines(docs)?.into_iter().map(JsonBody::from).collect())
}

/// Positions of the items a bulk response reports as failed
fn rejected_items(response: &Value) -> Vec<usize> {
    if !response["errors"].as_bool().unwrap_or(false) {
        return Vec::new();
    }

    response["items"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .enumerate()
                .filter(|(_, item)| item["create"]["error"].is_object())
                .map(|(i, _)| i)
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl AddressStore for EsAddressStore {
    async fn ensure_index(&self, reporter: &ErrorReporter) -> IndexMode {
        match create_index(&self.client).await {
            Ok(()) => {
                info!("Address index ready with keyword fulladdress");
                IndexMode::Unique
            }
            Err(e) => {
                reporter.report(ErrorKind::IndexCreation, e.to_string());
                if let Err(e2) = create_dynamic_index(&self.client).await {
                    reporter.report(ErrorKind::IndexCreationFallback, e2.to_string());
                }
                IndexMode::NonUnique
            }
        }
    }

    async fn insert_many(&self, docs: &[AddressDocument]) -> Result<usize, StoreError> {
        if docs.is_empty() {
            return Ok(0);
        }

        debug!("Bulk creating {} address documents", docs.len());

        let response = self
            .client
            .client()
            .bulk(BulkParts::Index(&self.client.index_name))
            .body(bulk_body(docs)?)
            .send()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        if !response.status_code().is_success() {
            let status = response.status_code().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(StoreError::Backend(format!(
                "bulk request returned {}: {}",
                status, text
            )));
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let rejected = rejected_items(&body);
        if rejected.is_empty() {
            return Ok(docs.len());
        }

        warn!(
            "Bulk request had {} errors out of {} documents",
            rejected.len(),
            docs.len()
        );
        Err(StoreError::Bulk {
            inserted: docs.len() - rejected.len(),
            rejected,
        })
    }

    async fn insert_one(&self, doc: &AddressDocument) -> Result<(), StoreError> {
        let id = doc.doc_id();
        let response = self
            .client
            .client()
            .create(CreateParts::IndexId(&self.client.index_name, &id))
            .body(doc)
            .send()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let status = response.status_code().as_u16();
        if status == CONFLICT {
            return Err(StoreError::Duplicate(doc.fulladdress.clone()));
        }
        if !response.status_code().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(StoreError::Backend(format!(
                "create returned {}: {}",
                status, text
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_rejected_items() {
        let response = json!({
            "took": 3,
            "errors": true,
            "items": [
                { "create": { "_id": "a", "status": 201 } },
                { "create": { "_id": "b", "status": 409,
                    "error": { "type": "version_conflict_engine_exception" } } },
                { "create": { "_id": "c", "status": 201 } },
                { "create": { "_id": "d", "status": 400,
                    "error": { "type": "mapper_parsing_exception" } } }
            ]
        });
        assert_eq!(rejected_items(&response), vec![1, 3]);
    }

    #[test]
    fn test_no_errors() {
        let response = json!({ "errors": false, "items": [ { "create": { "status": 201 } } ] });
        assert!(rejected_items(&response).is_empty());
    }

    #[test]
    fn test_bulk_body_pairs_action_and_source() {
        let doc = AddressDocument {
            osm: "N 7".to_string(),
            country: "FR".to_string(),
            country_name: "France".to_string(),
            city: "Paris".to_string(),
            street_name: "Rue de Rivoli".to_string(),
            status: 0,
            worker_id: 3,
            fulladdress: "12, Rue de Rivoli, Paris, 75001, France".to_string(),
            created_at: Utc::now(),
        };

        let body = bulk_body(std::slice::from_ref(&doc)).unwrap();
        assert_eq!(body.len(), 2);

        let lines = bulk_lines(&[doc.clone(), doc.clone()]).unwrap();
        assert_eq!(lines.len(), 4);
        // Repeats share one id under `create`, so the index refuses the second
        assert_eq!(lines[0], json!({ "create": { "_id": doc.doc_id() } }));
        assert_eq!(lines[2], lines[0]);
        assert!(lines[0].get("index").is_none());
        assert_eq!(lines[1]["fulladdress"], doc.fulladdress.as_str());
    }
}

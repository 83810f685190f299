//! Address index schema management.

use anyhow::{Context, Result};
use elasticsearch::indices::{IndicesCreateParts, IndicesExistsParts};
use tracing::info;

use super::EsClient;

/// Schema JSON embedded at compile time
const ADDRESS_MAPPING: &str = include_str!("../../schema/address_mapping.json");

async fn index_exists(client: &EsClient) -> Result<bool> {
    Ok(client
        .client()
        .indices()
        .exists(IndicesExistsParts::Index(&[&client.index_name]))
        .send()
        .await?
        .status_code()
        .is_success())
}

/// Create the address index with `fulladdress` mapped as a keyword.
/// An existing index is left untouched.
pub async fn create_index(client: &EsClient) -> Result<()> {
    let index_name = &client.index_name;

    if index_exists(client).await? {
        info!("Index {} already exists, skipping creation", index_name);
        return Ok(());
    }

    let mapping: serde_json::Value =
        serde_json::from_str(ADDRESS_MAPPING).context("Failed to parse address_mapping.json")?;

    info!("Creating index: {}", index_name);
    let response = client
        .client()
        .indices()
        .create(IndicesCreateParts::Index(index_name))
        .body(mapping)
        .send()
        .await
        .context("Failed to create index")?;

    if !response.status_code().is_success() {
        let error_body = response.text().await?;
        anyhow::bail!("Failed to create index: {}", error_body);
    }

    info!("Index {} created successfully", index_name);
    Ok(())
}

/// Create the address index with dynamic mapping (no explicit schema).
pub async fn create_dynamic_index(client: &EsClient) -> Result<()> {
    if index_exists(client).await? {
        return Ok(());
    }

    let response = client
        .client()
        .indices()
        .create(IndicesCreateParts::Index(&client.index_name))
        .send()
        .await
        .context("Failed to create dynamic index")?;

    if !response.status_code().is_success() {
        let error_body = response.text().await?;
        anyhow::bail!("Failed to create dynamic index: {}", error_body);
    }
    Ok(())
}

//! Elasticsearch client and address store.

mod client;
mod schema;
mod store;

pub use client::EsClient;
pub use schema::{create_dynamic_index, create_index};
pub use store::EsAddressStore;

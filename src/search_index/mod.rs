//! OpenSearch integration: the sink for enriched result records.

pub mod client;
pub mod records;
pub mod types;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

pub use client::OpenSearchService;
pub use records::{
    GeneratedIds, RecordContext, compute_record_id, current_timestamp_rfc3339, enrich_record,
};
pub use types::{IndexOutcome, IndexStatus, SearchIndexError};

/// Operations the processing layer needs from a search index.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Store `document` in `collection`, under `id` when given or a generated id otherwise.
    async fn index_document(
        &self,
        collection: &str,
        id: Option<&str>,
        document: &Value,
    ) -> Result<IndexOutcome, SearchIndexError>;

    /// Map every visible collection to its document count.
    async fn list_collections(&self) -> Result<BTreeMap<String, u64>, SearchIndexError>;

    /// Drop a collection. Returns `false` when it did not exist or was not acknowledged.
    async fn delete_collection(&self, collection: &str) -> Result<bool, SearchIndexError>;
}

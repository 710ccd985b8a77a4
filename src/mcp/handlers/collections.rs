//! Handler for collection discovery.

use std::sync::Arc;

use crate::processing::AnalyticsApi;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use serde_json::json;

use super::processing_error;

/// Handle the `get-collections` tool, returning collections with their document counts.
pub(crate) async fn handle_list_collections(
    service: &Arc<dyn AnalyticsApi>,
) -> Result<CallToolResult, McpError> {
    let collections = service
        .list_collections()
        .await
        .map_err(processing_error)?;
    Ok(CallToolResult::structured(
        json!({ "collections": collections }),
    ))
}

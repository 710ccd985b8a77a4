//! Handler for the metrics tool.

use std::sync::Arc;

use crate::processing::AnalyticsApi;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use serde_json::json;

/// Handle the `metrics` tool, returning the current analytics counters.
pub(crate) async fn handle_metrics(
    service: &Arc<dyn AnalyticsApi>,
) -> Result<CallToolResult, McpError> {
    let snapshot = service.metrics_snapshot();
    Ok(CallToolResult::structured(json!({
        "requestsServed": snapshot.requests_served,
        "documentsAnalyzed": snapshot.documents_analyzed,
        "recordsIndexed": snapshot.records_indexed,
        "lastBatchSize": snapshot.last_batch_size,
    })))
}

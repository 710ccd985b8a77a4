//! Handlers for the analytic tools. Each parses its arguments into the matching service request.

use std::sync::Arc;

use crate::processing::{
    AnalyticsApi, AnonymizeRequest, ClusteringRequest, DocumentsRequest, KeywordsRequest,
    StatisticsRequest, SummarizeRequest, TrendRequest,
};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, JsonObject},
};

use super::{parse_arguments, structured_result};

/// Handle the `keywords` tool.
pub(crate) async fn handle_keywords(
    service: &Arc<dyn AnalyticsApi>,
    arguments: Option<JsonObject>,
) -> Result<CallToolResult, McpError> {
    let request: KeywordsRequest = parse_arguments(arguments)?;
    structured_result(service.extract_keywords(request).await)
}

/// Handle the `summarize` tool.
pub(crate) async fn handle_summarize(
    service: &Arc<dyn AnalyticsApi>,
    arguments: Option<JsonObject>,
) -> Result<CallToolResult, McpError> {
    let request: SummarizeRequest = parse_arguments(arguments)?;
    structured_result(service.summarize(request).await)
}

/// Handle the `statistics` tool.
pub(crate) async fn handle_statistics(
    service: &Arc<dyn AnalyticsApi>,
    arguments: Option<JsonObject>,
) -> Result<CallToolResult, McpError> {
    let request: StatisticsRequest = parse_arguments(arguments)?;
    structured_result(service.describe_dataset(request).await)
}

/// Handle the `trend` tool.
pub(crate) async fn handle_trend(
    service: &Arc<dyn AnalyticsApi>,
    arguments: Option<JsonObject>,
) -> Result<CallToolResult, McpError> {
    let request: TrendRequest = parse_arguments(arguments)?;
    structured_result(service.predict_trend(request).await)
}

/// Handle the `clustering` tool.
pub(crate) async fn handle_clustering(
    service: &Arc<dyn AnalyticsApi>,
    arguments: Option<JsonObject>,
) -> Result<CallToolResult, McpError> {
    let request: ClusteringRequest = parse_arguments(arguments)?;
    structured_result(service.cluster_documents(request).await)
}

/// Handle the `segmentation` tool.
pub(crate) async fn handle_segmentation(
    service: &Arc<dyn AnalyticsApi>,
    arguments: Option<JsonObject>,
) -> Result<CallToolResult, McpError> {
    let request: DocumentsRequest = parse_arguments(arguments)?;
    structured_result(service.segment_documents(request).await)
}

/// Handle the `anonymize` tool.
pub(crate) async fn handle_anonymize(
    service: &Arc<dyn AnalyticsApi>,
    arguments: Option<JsonObject>,
) -> Result<CallToolResult, McpError> {
    let request: AnonymizeRequest = parse_arguments(arguments)?;
    structured_result(service.anonymize_documents(request).await)
}

/// Handle the `sentiment` tool.
pub(crate) async fn handle_sentiment(
    service: &Arc<dyn AnalyticsApi>,
    arguments: Option<JsonObject>,
) -> Result<CallToolResult, McpError> {
    let request: DocumentsRequest = parse_arguments(arguments)?;
    structured_result(service.analyze_sentiment(request).await)
}

/// Handle the `entities` tool.
pub(crate) async fn handle_entities(
    service: &Arc<dyn AnalyticsApi>,
    arguments: Option<JsonObject>,
) -> Result<CallToolResult, McpError> {
    let request: DocumentsRequest = parse_arguments(arguments)?;
    structured_result(service.recognize_entities(request).await)
}

/// Handle the `triples` tool.
pub(crate) async fn handle_triples(
    service: &Arc<dyn AnalyticsApi>,
    arguments: Option<JsonObject>,
) -> Result<CallToolResult, McpError> {
    let request: DocumentsRequest = parse_arguments(arguments)?;
    structured_result(service.extract_triples(request).await)
}

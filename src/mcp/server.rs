//! MCP server bootstrap and request dispatch.

use std::{borrow::Cow, sync::Arc};

use crate::{
    config::get_config,
    mcp::{
        format::{SettingsSnapshot, health_payload, json_resource_contents, serialize_json},
        handlers::{
            analytics::{
                handle_anonymize, handle_clustering, handle_entities, handle_keywords,
                handle_segmentation, handle_sentiment, handle_statistics, handle_summarize,
                handle_trend, handle_triples,
            },
            collections::handle_list_collections,
            metrics::handle_metrics,
        },
        registry, schemas,
    },
    processing::AnalyticsApi,
};
use rmcp::{
    ErrorData as McpError,
    handler::server::ServerHandler,
    model::{
        AnnotateAble, CallToolRequestParam, CallToolResult, JsonObject, ListResourcesResult,
        ListToolsResult, RawResource, ReadResourceRequestParam, ReadResourceResult, Resource,
        ServerCapabilities, ServerInfo, Tool, ToolAnnotations,
    },
};

const HEALTH_URI: &str = "mcp://health";
const SETTINGS_URI: &str = "mcp://settings";

/// MCP server implementation exposing the document analytics operations.
#[derive(Clone)]
pub struct DocAnalyticsMcpServer {
    service: Arc<dyn AnalyticsApi>,
    registry: Arc<registry::Registry>,
}

impl DocAnalyticsMcpServer {
    /// Create a new MCP server on top of the supplied analytics service.
    pub fn new(service: Arc<dyn AnalyticsApi>) -> Self {
        let mut registry = registry::Registry::default();
        registry.register_resource(HEALTH_URI, resource_health);
        registry.register_resource(SETTINGS_URI, resource_settings);

        registry.register_tool("keywords", tool_keywords);
        registry.register_tool("summarize", tool_summarize);
        registry.register_tool("statistics", tool_statistics);
        registry.register_tool("trend", tool_trend);
        registry.register_tool("clustering", tool_clustering);
        registry.register_tool("segmentation", tool_segmentation);
        registry.register_tool("anonymize", tool_anonymize);
        registry.register_tool("sentiment", tool_sentiment);
        registry.register_tool("entities", tool_entities);
        registry.register_tool("triples", tool_triples);
        registry.register_tool("get-collections", tool_get_collections);
        registry.register_tool("metrics", tool_metrics);

        Self {
            service,
            registry: Arc::new(registry),
        }
    }

    fn describe_tools(&self) -> Vec<Tool> {
        let documents_schema = Arc::new(schemas::documents_input_schema());
        let empty_schema = Arc::new(schemas::empty_object_schema());
        vec![
            analytic_tool(
                "keywords",
                "Extract Keywords",
                "Rank the most frequent meaningful terms of each document; set `lemmatize` to rank lemmas from the annotation provider.",
                Arc::new(schemas::keywords_input_schema()),
            ),
            analytic_tool(
                "summarize",
                "Summarize Documents",
                "Produce extractive (`first_n`, `by_score`) or abstractive summaries of each document.",
                Arc::new(schemas::summarize_input_schema()),
            ),
            analytic_tool(
                "statistics",
                "Describe Dataset",
                "Count, mean, standard deviation, min and max of each numeric column of a CSV or JSON dataset.",
                Arc::new(schemas::statistics_input_schema()),
            ),
            analytic_tool(
                "trend",
                "Predict Trend",
                "Fit a least-squares line to a numeric column and predict its next value.",
                Arc::new(schemas::trend_input_schema()),
            ),
            analytic_tool(
                "clustering",
                "Cluster Documents",
                "Group documents with seeded k-means over term-frequency vectors.",
                Arc::new(schemas::clustering_input_schema()),
            ),
            analytic_tool(
                "segmentation",
                "Segment Clinical Text",
                "Assign sentences to symptoms, history, recommendations and treatment sections.",
                documents_schema.clone(),
            ),
            analytic_tool(
                "anonymize",
                "Anonymize Documents",
                "Replace professionals, names, medical centers and dates with placeholders before sharing text.",
                Arc::new(schemas::anonymize_input_schema()),
            ),
            analytic_tool(
                "sentiment",
                "Analyze Sentiment",
                "Aggregate per-sentence sentiment from the annotation provider.",
                documents_schema.clone(),
            ),
            analytic_tool(
                "entities",
                "Recognize Entities",
                "Group named entities reported by the annotation provider by label.",
                documents_schema.clone(),
            ),
            analytic_tool(
                "triples",
                "Extract Triples",
                "List subject, relation and object triples reported by the annotation provider.",
                documents_schema,
            ),
            Tool {
                name: Cow::Borrowed("get-collections"),
                title: Some("List Collections".to_string()),
                description: Some(Cow::Borrowed(
                    "See which search index collections exist and how many records they hold.",
                )),
                input_schema: empty_schema.clone(),
                output_schema: None,
                annotations: Some(
                    ToolAnnotations::with_title("List Collections")
                        .read_only(true)
                        .idempotent(true)
                        .open_world(false),
                ),
                icons: None,
            },
            Tool {
                name: Cow::Borrowed("metrics"),
                title: Some("Metrics Snapshot".to_string()),
                description: Some(Cow::Borrowed(
                    "Check request volume, analyzed documents and indexed records at a glance.",
                )),
                input_schema: empty_schema,
                output_schema: None,
                annotations: Some(
                    ToolAnnotations::with_title("Metrics Snapshot")
                        .read_only(true)
                        .idempotent(true)
                        .open_world(false),
                ),
                icons: None,
            },
        ]
    }

    fn describe_resources(&self) -> Vec<Resource> {
        let mut health = RawResource::new(HEALTH_URI, "health");
        health.description =
            Some("Search index reachability and wired annotation/summarization providers".into());

        let mut settings = RawResource::new(SETTINGS_URI, "settings");
        settings.description = Some("Effective analytics defaults".into());

        vec![health.no_annotation(), settings.no_annotation()]
    }
}

/// Analytic tools may write records when `index` is set, so they are not read-only.
fn analytic_tool(
    name: &'static str,
    title: &'static str,
    description: &'static str,
    input_schema: Arc<JsonObject>,
) -> Tool {
    Tool {
        name: Cow::Borrowed(name),
        title: Some(title.to_string()),
        description: Some(Cow::Borrowed(description)),
        input_schema,
        output_schema: None,
        annotations: Some(
            ToolAnnotations::with_title(title)
                .destructive(false)
                .idempotent(true)
                .open_world(false),
        ),
        icons: None,
    }
}

fn resource_health(
    server: &DocAnalyticsMcpServer,
    _request: ReadResourceRequestParam,
) -> registry::ResourceFuture {
    let service = server.service.clone();
    Box::pin(async move {
        let capabilities = service.capabilities();
        let collections = service.list_collections().await;
        let payload = health_payload(&get_config().opensearch_url, &capabilities, collections);
        Ok(ReadResourceResult {
            contents: vec![json_resource_contents(
                HEALTH_URI,
                serialize_json(&payload, HEALTH_URI),
            )],
        })
    })
}

fn resource_settings(
    server: &DocAnalyticsMcpServer,
    _request: ReadResourceRequestParam,
) -> registry::ResourceFuture {
    let payload = SettingsSnapshot::from(&server.service.capabilities());
    Box::pin(async move {
        Ok(ReadResourceResult {
            contents: vec![json_resource_contents(
                SETTINGS_URI,
                serialize_json(&payload, SETTINGS_URI),
            )],
        })
    })
}

fn tool_keywords(
    server: &DocAnalyticsMcpServer,
    request: CallToolRequestParam,
) -> registry::ToolFuture {
    let service = server.service.clone();
    Box::pin(async move { handle_keywords(&service, request.arguments).await })
}

fn tool_summarize(
    server: &DocAnalyticsMcpServer,
    request: CallToolRequestParam,
) -> registry::ToolFuture {
    let service = server.service.clone();
    Box::pin(async move { handle_summarize(&service, request.arguments).await })
}

fn tool_statistics(
    server: &DocAnalyticsMcpServer,
    request: CallToolRequestParam,
) -> registry::ToolFuture {
    let service = server.service.clone();
    Box::pin(async move { handle_statistics(&service, request.arguments).await })
}

fn tool_trend(server: &DocAnalyticsMcpServer, request: CallToolRequestParam) -> registry::ToolFuture {
    let service = server.service.clone();
    Box::pin(async move { handle_trend(&service, request.arguments).await })
}

fn tool_clustering(
    server: &DocAnalyticsMcpServer,
    request: CallToolRequestParam,
) -> registry::ToolFuture {
    let service = server.service.clone();
    Box::pin(async move { handle_clustering(&service, request.arguments).await })
}

fn tool_segmentation(
    server: &DocAnalyticsMcpServer,
    request: CallToolRequestParam,
) -> registry::ToolFuture {
    let service = server.service.clone();
    Box::pin(async move { handle_segmentation(&service, request.arguments).await })
}

fn tool_anonymize(
    server: &DocAnalyticsMcpServer,
    request: CallToolRequestParam,
) -> registry::ToolFuture {
    let service = server.service.clone();
    Box::pin(async move { handle_anonymize(&service, request.arguments).await })
}

fn tool_sentiment(
    server: &DocAnalyticsMcpServer,
    request: CallToolRequestParam,
) -> registry::ToolFuture {
    let service = server.service.clone();
    Box::pin(async move { handle_sentiment(&service, request.arguments).await })
}

fn tool_entities(
    server: &DocAnalyticsMcpServer,
    request: CallToolRequestParam,
) -> registry::ToolFuture {
    let service = server.service.clone();
    Box::pin(async move { handle_entities(&service, request.arguments).await })
}

fn tool_triples(
    server: &DocAnalyticsMcpServer,
    request: CallToolRequestParam,
) -> registry::ToolFuture {
    let service = server.service.clone();
    Box::pin(async move { handle_triples(&service, request.arguments).await })
}

fn tool_get_collections(
    server: &DocAnalyticsMcpServer,
    _request: CallToolRequestParam,
) -> registry::ToolFuture {
    let service = server.service.clone();
    Box::pin(async move { handle_list_collections(&service).await })
}

fn tool_metrics(
    server: &DocAnalyticsMcpServer,
    _request: CallToolRequestParam,
) -> registry::ToolFuture {
    let service = server.service.clone();
    Box::pin(async move { handle_metrics(&service).await })
}

impl ServerHandler for DocAnalyticsMcpServer {
    fn get_info(&self) -> ServerInfo {
        let mut implementation = rmcp::model::Implementation::from_build_env();
        implementation.name = "docanalytics".to_string();
        implementation.title = Some("Document Analytics MCP".to_string());
        implementation.version = env!("CARGO_PKG_VERSION").to_string();

        ServerInfo {
            capabilities: ServerCapabilities::builder()
                .enable_resources()
                .enable_tools()
                .build(),
            server_info: implementation,
            instructions: Some(
                "Use this server to analyze Spanish clinical documents: keywords, summaries, statistics, trends, clustering, segmentation, anonymization and annotation-backed sentiment, entities and triples. Name input as a stored `file` or inline `text`/`documents`/`table`; set `index` to persist results.".into(),
            ),
            ..ServerInfo::default()
        }
    }

    fn list_resources(
        &self,
        _request: Option<rmcp::model::PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListResourcesResult, McpError>> + Send + '_ {
        let resources = self.describe_resources();
        std::future::ready(Ok(ListResourcesResult::with_all_items(resources)))
    }

    fn list_tools(
        &self,
        _request: Option<rmcp::model::PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        let tools = self.describe_tools();
        std::future::ready(Ok(ListToolsResult::with_all_items(tools)))
    }

    #[allow(clippy::manual_async_fn)]
    fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ReadResourceResult, McpError>> + Send + '_ {
        async move {
            if let Some(handler) = self.registry.resources.get(request.uri.as_str()) {
                return handler(self, request).await;
            }

            Err(McpError::invalid_params(
                format!("Unknown resource URI: {}", request.uri),
                None,
            ))
        }
    }

    #[allow(clippy::manual_async_fn)]
    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        async move {
            if let Some(handler) = self.registry.tools.get(request.name.as_ref()) {
                return handler(self, request).await;
            }

            Err(McpError::invalid_params(
                format!("Unknown tool: {}", request.name),
                None,
            ))
        }
    }
}

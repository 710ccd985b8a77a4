//! MCP server entrypoint (stdio transport).
//!
//! Launches an MCP server that exposes the analytics tools and resources over stdio for editor
//! and agent integrations. It shares all runtime configuration with the HTTP binary. Console logs
//! go to stderr so they never interleave with protocol frames.
use anyhow::{Context, Result};
use docanalytics::{config, logging, mcp::DocAnalyticsMcpServer, processing::AnalyticsService};
use rmcp::{service::ServiceExt, transport::stdio};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    config::init_config();
    logging::init_tracing_stderr();

    let service = AnalyticsService::new(config::get_config())
        .context("failed to build analytics service")?;
    let server = DocAnalyticsMcpServer::new(Arc::new(service));

    let service = server
        .serve(stdio())
        .await
        .context("failed to start MCP server over stdio")?;

    service
        .waiting()
        .await
        .context("MCP server terminated unexpectedly")?;

    Ok(())
}

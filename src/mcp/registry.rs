//! Name-keyed dispatch tables for MCP tools and resources.

use std::{collections::BTreeMap, future::Future, pin::Pin};

use rmcp::ErrorData as McpError;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, ReadResourceRequestParam, ReadResourceResult,
};

use super::server::DocAnalyticsMcpServer;

pub(crate) type ResourceFuture =
    Pin<Box<dyn Future<Output = Result<ReadResourceResult, McpError>> + Send>>;
pub(crate) type ToolFuture =
    Pin<Box<dyn Future<Output = Result<CallToolResult, McpError>> + Send>>;

pub(crate) type ResourceHandler =
    fn(&DocAnalyticsMcpServer, ReadResourceRequestParam) -> ResourceFuture;
pub(crate) type ToolHandler = fn(&DocAnalyticsMcpServer, CallToolRequestParam) -> ToolFuture;

/// Registry mapping resource URIs and tool names to handler functions.
#[derive(Default)]
pub(crate) struct Registry {
    pub(crate) resources: BTreeMap<&'static str, ResourceHandler>,
    pub(crate) tools: BTreeMap<&'static str, ToolHandler>,
}

impl Registry {
    pub(crate) fn register_resource(&mut self, uri: &'static str, handler: ResourceHandler) {
        self.resources.insert(uri, handler);
    }

    pub(crate) fn register_tool(&mut self, name: &'static str, handler: ToolHandler) {
        self.tools.insert(name, handler);
    }
}

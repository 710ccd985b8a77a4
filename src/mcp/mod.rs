//! Model Context Protocol (MCP) integration for the analytics service.
//!
//! This module wires the analytics pipeline into an MCP server so editors and agent hosts can run
//! document analytics over stdio. The surface area consists of:
//!
//! - Tools: one per analytic (`keywords`, `summarize`, `statistics`, `trend`, `clustering`,
//!   `segmentation`, `anonymize`, `sentiment`, `entities`, `triples`), plus `get-collections`
//!   and `metrics`.
//! - Resources: `mcp://health` and `mcp://settings`.
//!
//! Handlers, schemas, and formatting helpers are kept in focused submodules to make tests and
//! reviews small and targeted.

mod format;
pub mod handlers;
mod registry;
mod schemas;
mod server;

pub use server::DocAnalyticsMcpServer;

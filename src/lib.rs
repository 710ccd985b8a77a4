#![deny(missing_docs)]

//! Core library for the document analytics service.

/// Pure analytics over in-memory document batches.
pub mod analytics;
/// Annotation provider client and derived reports.
pub mod annotation;
/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Structured logging and tracing setup.
pub mod logging;
/// Model Context Protocol server implementation.
pub mod mcp;
/// Request and document counters.
pub mod metrics;
/// Analytics pipeline orchestration.
pub mod processing;
/// OpenSearch result sink.
pub mod search_index;
/// Uploaded file store and format parsers.
pub mod storage;
/// Abstractive summarization providers.
pub mod summarization;

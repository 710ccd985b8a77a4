//! Tool handlers for the MCP server.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, JsonObject},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::processing::ProcessingError;
use crate::storage::StorageError;

pub mod analytics;
pub mod collections;
pub mod metrics;

/// Parse structured arguments supplied to a tool invocation.
pub(crate) fn parse_arguments<T: DeserializeOwned>(
    arguments: Option<JsonObject>,
) -> Result<T, McpError> {
    let value = arguments
        .map(Value::Object)
        .unwrap_or_else(|| Value::Object(JsonObject::new()));
    parse_arguments_value(value)
}

/// Deserialize arguments represented as a JSON value into the target type.
pub(crate) fn parse_arguments_value<T: DeserializeOwned>(value: Value) -> Result<T, McpError> {
    serde_json::from_value(value)
        .map_err(|err| McpError::invalid_params(format!("Invalid arguments: {err}"), None))
}

/// Turn a service result into a structured tool result.
pub(crate) fn structured_result<T: Serialize>(
    result: Result<T, ProcessingError>,
) -> Result<CallToolResult, McpError> {
    let value = result.map_err(processing_error)?;
    let payload = serde_json::to_value(value)
        .map_err(|err| McpError::internal_error(err.to_string(), None))?;
    Ok(CallToolResult::structured(payload))
}

/// Caller mistakes become `invalid_params`; collaborator failures become `internal_error`.
pub(crate) fn processing_error(error: ProcessingError) -> McpError {
    match &error {
        ProcessingError::Analytics(_)
        | ProcessingError::InvalidRequest(_)
        | ProcessingError::Storage(
            StorageError::NotFound(_)
            | StorageError::InvalidName(_)
            | StorageError::UnsupportedFormat(_)
            | StorageError::Malformed { .. },
        ) => McpError::invalid_params(error.to_string(), None),
        _ => McpError::internal_error(error.to_string(), None),
    }
}

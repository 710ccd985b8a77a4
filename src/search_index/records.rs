//! Helpers for turning analytic results into index records.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;

/// Document ids assigned by the service rather than the caller, mapped to batch position.
pub type GeneratedIds = BTreeMap<String, usize>;

/// Provenance stamped onto every record produced by one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordContext {
    /// Operation that produced the records, e.g. `keywords`.
    pub source_endpoint: String,
    /// Stored file the input came from, when any.
    pub file: Option<String>,
    /// RFC 3339 creation time shared by the whole batch.
    pub timestamp: String,
    /// Generated document ids; record ids hash their batch position instead.
    pub generated_ids: GeneratedIds,
}

impl RecordContext {
    /// Context stamped with the current time.
    pub fn new(source_endpoint: impl Into<String>, file: Option<String>) -> Self {
        Self {
            source_endpoint: source_endpoint.into(),
            file,
            timestamp: current_timestamp_rfc3339(),
            generated_ids: GeneratedIds::new(),
        }
    }

    /// Attach the ids generated for this batch.
    pub fn with_generated_ids(mut self, generated_ids: GeneratedIds) -> Self {
        self.generated_ids = generated_ids;
        self
    }

    /// Payload as hashed for its record id: a generated `id` is replaced by `#<position>`.
    fn hashed_payload<'a>(&self, payload: &'a Value) -> Cow<'a, Value> {
        let position = payload
            .get("id")
            .and_then(Value::as_str)
            .and_then(|id| self.generated_ids.get(id));
        match position {
            Some(position) => {
                let mut stable = payload.clone();
                stable["id"] = Value::String(format!("#{position}"));
                Cow::Owned(stable)
            }
            None => Cow::Borrowed(payload),
        }
    }
}

/// Deterministic SHA-256 identifier for a record.
///
/// Equal endpoint, file and payload always hash to the same id, so re-running a request
/// overwrites its earlier records instead of duplicating them. [`enrich_record`] hashes
/// generated document ids by position, which keeps this true for inputs without ids.
pub fn compute_record_id(source_endpoint: &str, file: Option<&str>, payload: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source_endpoint.as_bytes());
    hasher.update([0]);
    hasher.update(file.unwrap_or_default().as_bytes());
    hasher.update([0]);
    hasher.update(payload.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// Attach provenance fields to a result and return it with its record id.
///
/// Non-object results are wrapped as `{"result": …}` first.
pub fn enrich_record(payload: Value, context: &RecordContext) -> (String, Value) {
    let record_id = compute_record_id(
        &context.source_endpoint,
        context.file.as_deref(),
        &context.hashed_payload(&payload),
    );

    let mut record = match payload {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("result".into(), other);
            map
        }
    };
    record.insert("record_id".into(), Value::String(record_id.clone()));
    record.insert(
        "source_endpoint".into(),
        Value::String(context.source_endpoint.clone()),
    );
    record.insert(
        "timestamp".into(),
        Value::String(context.timestamp.clone()),
    );
    if let Some(file) = context.file.as_ref().filter(|file| !file.is_empty()) {
        record.insert("file".into(), Value::String(file.clone()));
    }

    (record_id, Value::Object(record))
}

/// Current timestamp formatted for record storage.
pub fn current_timestamp_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

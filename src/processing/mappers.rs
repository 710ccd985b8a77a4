//! Mapping helpers between inputs, analytic results and index records.

use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::analytics::{DatasetSummary, Document, DocumentClustering, TrendPrediction};
use crate::processing::types::ProcessingError;
use crate::search_index::GeneratedIds;
use crate::storage::formats::parse_csv;
use crate::storage::{FileFormat, StorageError};

/// Give every document without an id a fresh UUID v4.
///
/// The generated ids are returned with their batch position so record ids can ignore them.
pub(crate) fn fill_missing_ids(documents: Vec<Document>) -> (Vec<Document>, GeneratedIds) {
    let mut generated = GeneratedIds::new();
    let documents = documents
        .into_iter()
        .enumerate()
        .map(|(position, mut document)| {
            if document.id.trim().is_empty() {
                document.id = Uuid::new_v4().to_string();
                generated.insert(document.id.clone(), position);
            }
            document
        })
        .collect();
    (documents, generated)
}

/// Ensure exactly one input source was named.
pub(crate) fn require_single_source(sources: &[bool]) -> Result<(), ProcessingError> {
    match sources.iter().filter(|present| **present).count() {
        1 => Ok(()),
        0 => Err(ProcessingError::InvalidRequest(
            "no input given; set one of file, documents, text or table".into(),
        )),
        _ => Err(ProcessingError::InvalidRequest(
            "several inputs given; set exactly one".into(),
        )),
    }
}

/// Serialize each per-document result as a record payload.
pub(crate) fn item_records<T: Serialize>(items: &[T]) -> Result<Vec<Value>, ProcessingError> {
    items
        .iter()
        .map(|item| serde_json::to_value(item).map_err(ProcessingError::from))
        .collect()
}

/// One record per described column.
pub(crate) fn statistics_records(summary: &DatasetSummary) -> Result<Vec<Value>, ProcessingError> {
    item_records(&summary.columns)
}

/// A single record holding the prediction.
pub(crate) fn trend_records(prediction: &TrendPrediction) -> Result<Vec<Value>, ProcessingError> {
    item_records(std::slice::from_ref(prediction))
}

/// One record per document assignment, carrying its cluster's top terms.
pub(crate) fn clustering_records(clustering: &DocumentClustering) -> Vec<Value> {
    clustering
        .assignments
        .iter()
        .map(|assignment| {
            let top_terms = clustering
                .clusters
                .get(assignment.cluster_id)
                .map(|cluster| cluster.top_terms.clone())
                .unwrap_or_default();
            serde_json::json!({
                "id": assignment.document_id,
                "cluster_id": assignment.cluster_id,
                "top_terms": top_terms,
            })
        })
        .collect()
}

/// Split a stored file into raw index documents.
///
/// A JSON array gives one document per object element, a JSON object one document, and a CSV
/// file one document per row keyed by header.
pub(crate) fn ingest_documents(name: &str, bytes: &[u8]) -> Result<Vec<Value>, ProcessingError> {
    let format = FileFormat::from_name(name);
    let malformed = |reason: String| StorageError::Malformed {
        name: name.to_string(),
        format,
        reason,
    };
    let content = std::str::from_utf8(bytes).map_err(|err| malformed(err.to_string()))?;

    match format {
        FileFormat::Json => {
            let value: Value =
                serde_json::from_str(content).map_err(|err| malformed(err.to_string()))?;
            Ok(match value {
                Value::Array(items) => items.into_iter().filter(Value::is_object).collect(),
                object @ Value::Object(_) => vec![object],
                _ => Vec::new(),
            })
        }
        FileFormat::Csv => {
            let table = parse_csv(content).map_err(malformed)?;
            Ok(table
                .rows
                .iter()
                .map(|row| {
                    let object: Map<String, Value> = table
                        .headers
                        .iter()
                        .zip(row.iter())
                        .map(|(header, cell)| (header.clone(), Value::String(cell.clone())))
                        .collect();
                    Value::Object(object)
                })
                .collect())
        }
        FileFormat::Text => Err(StorageError::UnsupportedFormat(format!(
            "{name}: only JSON and CSV files can be ingested"
        ))
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_ids_are_generated_and_reported() {
        let (documents, generated) = fill_missing_ids(vec![
            Document::new("x", "a"),
            Document::new("", "b"),
            Document::new("  ", "c"),
        ]);
        assert_eq!(documents[0].id, "x");
        assert!(Uuid::parse_str(&documents[1].id).is_ok());
        assert_eq!(generated.len(), 2);
        assert_eq!(generated[&documents[1].id], 1);
        assert_eq!(generated[&documents[2].id], 2);
        assert!(!generated.contains_key("x"));
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("broken result"))
        }
    }

    #[test]
    fn serialization_failures_abort_record_building() {
        let error = item_records(&[Unserializable]).expect_err("serialization fails");
        assert!(matches!(error, ProcessingError::Serialization(_)));
        assert!(error.to_string().contains("broken result"));
    }

    #[test]
    fn single_source_is_enforced() {
        assert!(require_single_source(&[false, true, false]).is_ok());
        assert!(matches!(
            require_single_source(&[false, false]),
            Err(ProcessingError::InvalidRequest(_))
        ));
        assert!(matches!(
            require_single_source(&[true, true]),
            Err(ProcessingError::InvalidRequest(_))
        ));
    }

    #[test]
    fn ingest_splits_json_and_csv() {
        let json_docs =
            ingest_documents("a.json", br#"[{"id": 1}, 5, {"id": 2}]"#).expect("json");
        assert_eq!(json_docs, vec![json!({"id": 1}), json!({"id": 2})]);

        let single = ingest_documents("b.json", br#"{"text": "uno"}"#).expect("json");
        assert_eq!(single.len(), 1);

        let csv_docs = ingest_documents("c.csv", b"edad,sexo\n65,F\n72,M\n").expect("csv");
        assert_eq!(csv_docs[1], json!({"edad": "72", "sexo": "M"}));

        assert!(matches!(
            ingest_documents("e.csv", b"edad,nota\n65,\"abierta\n"),
            Err(ProcessingError::Storage(StorageError::Malformed { .. }))
        ));
        assert!(matches!(
            ingest_documents("d.txt", b"texto"),
            Err(ProcessingError::Storage(StorageError::UnsupportedFormat(_)))
        ));
    }
}

//! JSON schema builders for MCP tools.

use crate::config::get_config;
use serde_json::{Map, Value, json};

/// Schema of tools that read documents (`keywords`, `segmentation`, `sentiment`, ...).
pub(crate) fn documents_input_schema() -> Map<String, Value> {
    finalize_object_schema(document_input_properties(), &[])
}

/// Build the schema describing the `keywords` tool input.
pub(crate) fn keywords_input_schema() -> Map<String, Value> {
    let mut properties = document_input_properties();
    properties.insert(
        "limit".into(),
        integer_schema(
            "Keywords per document",
            1,
            Some(get_config().keyword_limit as u64),
        ),
    );

    let mut lemmatize_schema = Map::new();
    lemmatize_schema.insert("type".into(), Value::String("boolean".into()));
    lemmatize_schema.insert(
        "description".into(),
        Value::String("Rank lemmas from the annotation provider instead of surface tokens".into()),
    );
    lemmatize_schema.insert("default".into(), Value::Bool(false));
    properties.insert("lemmatize".into(), Value::Object(lemmatize_schema));

    finalize_object_schema(properties, &[])
}

/// Build the schema describing the `summarize` tool input.
pub(crate) fn summarize_input_schema() -> Map<String, Value> {
    let mut properties = document_input_properties();
    properties.insert(
        "strategy".into(),
        enum_schema(
            "Summary flavour",
            &["first_n", "by_score", "abstractive"],
            "by_score",
        ),
    );
    properties.insert(
        "sentences".into(),
        integer_schema(
            "Sentences kept by extractive strategies",
            1,
            Some(get_config().summary_sentences as u64),
        ),
    );
    properties.insert(
        "order".into(),
        enum_schema(
            "Order of score-ranked sentences",
            &["document", "score"],
            "document",
        ),
    );
    finalize_object_schema(properties, &[])
}

/// Build the schema describing the `statistics` tool input.
pub(crate) fn statistics_input_schema() -> Map<String, Value> {
    finalize_object_schema(table_input_properties(), &[])
}

/// Build the schema describing the `trend` tool input.
pub(crate) fn trend_input_schema() -> Map<String, Value> {
    let mut properties = table_input_properties();
    properties.insert(
        "column".into(),
        string_schema("Numeric column to extrapolate; the first numeric column when omitted"),
    );
    finalize_object_schema(properties, &[])
}

/// Build the schema describing the `clustering` tool input.
pub(crate) fn clustering_input_schema() -> Map<String, Value> {
    let config = get_config();
    let mut properties = document_input_properties();
    properties.insert(
        "k".into(),
        integer_schema("Number of clusters", 1, Some(config.cluster_count as u64)),
    );
    properties.insert(
        "max_iterations".into(),
        integer_schema(
            "Iteration cap",
            1,
            Some(config.cluster_max_iterations as u64),
        ),
    );
    properties.insert(
        "seed".into(),
        integer_schema("Seed for centroid initialisation", 0, Some(config.cluster_seed)),
    );
    finalize_object_schema(properties, &[])
}

/// Build the schema describing the `anonymize` tool input.
pub(crate) fn anonymize_input_schema() -> Map<String, Value> {
    let mut properties = document_input_properties();
    properties.insert(
        "strategy".into(),
        enum_schema(
            "`regex` patterns or `entities` from the annotation provider",
            &["regex", "entities"],
            "regex",
        ),
    );
    finalize_object_schema(properties, &[])
}

/// Schema for tools without arguments.
pub(crate) fn empty_object_schema() -> Map<String, Value> {
    finalize_object_schema(Map::new(), &[])
}

fn document_input_properties() -> Map<String, Value> {
    let mut properties = Map::new();
    properties.insert(
        "file".into(),
        string_schema("Stored file name (.json, .csv or plain text)"),
    );
    properties.insert(
        "text".into(),
        string_schema("Inline raw text analyzed as one document"),
    );

    let mut document_schema = Map::new();
    document_schema.insert("type".into(), Value::String("object".into()));
    document_schema.insert(
        "properties".into(),
        json!({
            "id": { "type": "string" },
            "text": { "type": "string" },
            "timestamp": { "type": "string" },
            "source": { "type": "string" }
        }),
    );
    document_schema.insert("required".into(), json!(["text"]));

    let mut documents_schema = Map::new();
    documents_schema.insert("type".into(), Value::String("array".into()));
    documents_schema.insert(
        "description".into(),
        Value::String("Inline documents; ids are generated when missing".into()),
    );
    documents_schema.insert("items".into(), Value::Object(document_schema));
    properties.insert("documents".into(), Value::Object(documents_schema));

    properties.insert("index".into(), index_schema());
    properties
}

fn table_input_properties() -> Map<String, Value> {
    let mut properties = Map::new();
    properties.insert("file".into(), string_schema("Stored CSV or JSON file name"));

    let mut table_schema = Map::new();
    table_schema.insert("type".into(), Value::String("object".into()));
    table_schema.insert(
        "description".into(),
        Value::String("Inline table of string cells".into()),
    );
    table_schema.insert(
        "properties".into(),
        json!({
            "headers": { "type": "array", "items": { "type": "string" } },
            "rows": {
                "type": "array",
                "items": { "type": "array", "items": { "type": "string" } }
            }
        }),
    );
    table_schema.insert("required".into(), json!(["headers", "rows"]));
    properties.insert("table".into(), Value::Object(table_schema));

    properties.insert("index".into(), index_schema());
    properties
}

fn index_schema() -> Value {
    string_schema("Optional collection that receives enriched result records")
}

fn string_schema(description: &str) -> Value {
    let mut schema = Map::new();
    schema.insert("type".into(), Value::String("string".into()));
    schema.insert("description".into(), Value::String(description.into()));
    Value::Object(schema)
}

fn integer_schema(description: &str, minimum: u64, default: Option<u64>) -> Value {
    let mut schema = Map::new();
    schema.insert("type".into(), Value::String("integer".into()));
    schema.insert("description".into(), Value::String(description.into()));
    schema.insert("minimum".into(), Value::Number(minimum.into()));
    if let Some(default) = default {
        schema.insert("default".into(), Value::Number(default.into()));
    }
    Value::Object(schema)
}

fn enum_schema(description: &str, variants: &[&str], default: &str) -> Value {
    let mut schema = Map::new();
    schema.insert("type".into(), Value::String("string".into()));
    schema.insert("description".into(), Value::String(description.into()));
    schema.insert(
        "enum".into(),
        Value::Array(
            variants
                .iter()
                .map(|variant| Value::String((*variant).into()))
                .collect(),
        ),
    );
    schema.insert("default".into(), Value::String(default.into()));
    Value::Object(schema)
}

fn finalize_object_schema(properties: Map<String, Value>, required: &[&str]) -> Map<String, Value> {
    let mut schema = Map::new();
    schema.insert("type".into(), Value::String("object".into()));
    schema.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert(
            "required".into(),
            Value::Array(
                required
                    .iter()
                    .map(|&key| Value::String(key.into()))
                    .collect(),
            ),
        );
    }
    schema.insert("additionalProperties".into(), Value::Bool(false));
    schema
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_tools_do_not_accept_free_text() {
        let schema = finalize_object_schema(table_input_properties(), &[]);
        let properties = schema["properties"].as_object().expect("properties");
        assert!(properties.contains_key("table"));
        assert!(!properties.contains_key("text"));
        assert_eq!(schema["additionalProperties"], false);
    }

    #[test]
    fn enum_schema_lists_variants_and_default() {
        let schema = enum_schema("strategy", &["regex", "entities"], "regex");
        assert_eq!(schema["enum"], json!(["regex", "entities"]));
        assert_eq!(schema["default"], "regex");
    }
}

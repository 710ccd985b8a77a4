//! Decoding of stored files into documents or tables.
//!
//! Format is chosen by extension: `.json`, `.csv`, anything else is UTF-8 text.

use std::fmt;

use serde_json::{Map, Value};

use crate::analytics::{Document, Table};
use crate::storage::StorageError;

const TEXT_FIELDS: [&str; 3] = ["text", "description", "content"];

/// Recognized file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// JSON object or array.
    Json,
    /// Comma-separated values with a header row.
    Csv,
    /// Plain UTF-8 text.
    Text,
}

impl FileFormat {
    /// Detect the format from a file name.
    pub fn from_name(name: &str) -> Self {
        let extension = name
            .rsplit_once('.')
            .map(|(_, extension)| extension.to_ascii_lowercase());
        match extension.as_deref() {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Text,
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "JSON",
            Self::Csv => "CSV",
            Self::Text => "text",
        })
    }
}

/// How plain-text files are split into documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextLayout {
    /// The whole file is one document.
    #[default]
    Whole,
    /// Every non-empty line is a document.
    Lines,
}

fn malformed(name: &str, format: FileFormat, reason: impl ToString) -> StorageError {
    StorageError::Malformed {
        name: name.to_string(),
        format,
        reason: reason.to_string(),
    }
}

fn decode_utf8<'a>(name: &str, format: FileFormat, bytes: &'a [u8]) -> Result<&'a str, StorageError> {
    std::str::from_utf8(bytes).map_err(|err| malformed(name, format, err))
}

/// Decode a stored file into documents.
///
/// JSON objects contribute their `text`, `description` or `content` field, CSV rows their `text`
/// column or, lacking one, all cells joined by spaces. Entries without text are skipped. JSON
/// objects without an `id` keep an empty one for the caller to assign.
pub fn parse_documents(
    name: &str,
    bytes: &[u8],
    layout: TextLayout,
) -> Result<Vec<Document>, StorageError> {
    let format = FileFormat::from_name(name);
    let content = decode_utf8(name, format, bytes)?;

    let documents = match format {
        FileFormat::Json => {
            let value: Value =
                serde_json::from_str(content).map_err(|err| malformed(name, format, err))?;
            json_documents(name, value)
        }
        FileFormat::Csv => {
            let table = parse_csv(content).map_err(|reason| malformed(name, format, reason))?;
            csv_documents(name, &table)
        }
        FileFormat::Text => match layout {
            TextLayout::Whole => vec![Document::new(name, content)],
            TextLayout::Lines => content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .enumerate()
                .map(|(index, line)| Document::new(format!("{name}#{}", index + 1), line))
                .collect(),
        },
    };

    tracing::debug!(file = name, %format, documents = documents.len(), "Decoded documents");
    Ok(documents)
}

/// Decode a stored CSV or JSON file into a table.
///
/// JSON arrays of objects become one row per object. Headers are the union of keys in
/// first-seen order, so a dataset keeps its declared column order.
pub fn parse_table(name: &str, bytes: &[u8]) -> Result<Table, StorageError> {
    let format = FileFormat::from_name(name);
    let content = decode_utf8(name, format, bytes)?;
    match format {
        FileFormat::Csv => parse_csv(content).map_err(|reason| malformed(name, format, reason)),
        FileFormat::Json => {
            let value: Value =
                serde_json::from_str(content).map_err(|err| malformed(name, format, err))?;
            Ok(json_table(value))
        }
        FileFormat::Text => Err(StorageError::UnsupportedFormat(format!(
            "{name}: statistics need a CSV or JSON file"
        ))),
    }
}

fn json_documents(name: &str, value: Value) -> Vec<Document> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| match item {
                Value::Object(map) => object_document(map),
                Value::String(text) if !text.trim().is_empty() => {
                    Some(Document::new(format!("{name}#{}", index + 1), text))
                }
                _ => None,
            })
            .collect(),
        Value::Object(map) => object_document(map).into_iter().collect(),
        Value::String(text) => vec![Document::new(name, text)],
        _ => Vec::new(),
    }
}

fn object_document(map: Map<String, Value>) -> Option<Document> {
    let text = TEXT_FIELDS
        .iter()
        .find_map(|field| map.get(*field).and_then(Value::as_str))
        .filter(|text| !text.trim().is_empty())?
        .to_string();
    let id = map
        .get("id")
        .and_then(scalar_to_string)
        .unwrap_or_default();
    let timestamp = map.get("timestamp").and_then(scalar_to_string);
    let source = ["source_endpoint", "source"]
        .iter()
        .find_map(|field| map.get(*field).and_then(scalar_to_string));

    Some(Document {
        id,
        text,
        timestamp,
        source,
    })
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn json_table(value: Value) -> Table {
    let objects: Vec<Map<String, Value>> = match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect(),
        Value::Object(map) => vec![map],
        _ => Vec::new(),
    };

    let mut headers: Vec<String> = Vec::new();
    for key in objects.iter().flat_map(Map::keys) {
        if !headers.contains(key) {
            headers.push(key.clone());
        }
    }
    let rows = objects
        .iter()
        .map(|object| {
            headers
                .iter()
                .map(|header| object.get(header).and_then(scalar_to_string).unwrap_or_default())
                .collect()
        })
        .collect();

    Table { headers, rows }
}

fn csv_documents(name: &str, table: &Table) -> Vec<Document> {
    let column = |wanted: &str| {
        table
            .headers
            .iter()
            .position(|header| header.eq_ignore_ascii_case(wanted))
    };
    let text_column = column("text");
    let id_column = column("id");

    table
        .rows
        .iter()
        .enumerate()
        .filter_map(|(index, row)| {
            let text = match text_column {
                Some(position) => row.get(position).cloned().unwrap_or_default(),
                None => row.join(" "),
            };
            if text.trim().is_empty() {
                return None;
            }
            let id = id_column
                .and_then(|position| row.get(position))
                .filter(|id| !id.is_empty())
                .cloned()
                .unwrap_or_else(|| format!("{name}#{}", index + 1));
            Some(Document::new(id, text))
        })
        .collect()
}

/// Parse CSV with a header row. Double-quoted cells may contain commas, line breaks and `""`
/// escapes. Blank lines are skipped. Errors carry the reason for [`StorageError::Malformed`].
pub(crate) fn parse_csv(content: &str) -> Result<Table, String> {
    let mut records = csv_records(content)?.into_iter();
    let headers = records.next().unwrap_or_default();
    Ok(Table {
        headers,
        rows: records.collect(),
    })
}

fn csv_records(content: &str) -> Result<Vec<Vec<String>>, String> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut cell = String::new();
    let mut quoted_since: Option<usize> = None;
    let mut line = 1;
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if quoted_since.is_some() && chars.peek() == Some(&'"') => {
                cell.push('"');
                chars.next();
            }
            '"' if quoted_since.is_some() => quoted_since = None,
            '"' => quoted_since = Some(line),
            ',' if quoted_since.is_none() => record.push(take_cell(&mut cell)),
            '\r' if quoted_since.is_none() => {}
            '\n' if quoted_since.is_none() => {
                line += 1;
                finish_record(&mut records, &mut record, &mut cell);
            }
            _ => {
                if ch == '\n' {
                    line += 1;
                }
                cell.push(ch);
            }
        }
    }

    if let Some(opened) = quoted_since {
        return Err(format!("unterminated quoted cell opened on line {opened}"));
    }
    finish_record(&mut records, &mut record, &mut cell);
    Ok(records)
}

fn take_cell(cell: &mut String) -> String {
    std::mem::take(cell).trim().to_string()
}

fn finish_record(records: &mut Vec<Vec<String>>, record: &mut Vec<String>, cell: &mut String) {
    record.push(take_cell(cell));
    let blank = record.len() == 1 && record[0].is_empty();
    let record = std::mem::take(record);
    if !blank {
        records.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension() {
        assert_eq!(FileFormat::from_name("a.JSON"), FileFormat::Json);
        assert_eq!(FileFormat::from_name("datos.csv"), FileFormat::Csv);
        assert_eq!(FileFormat::from_name("notas"), FileFormat::Text);
    }

    #[test]
    fn json_arrays_yield_one_document_per_entry() {
        let content = br#"[
            {"id": "1", "timestamp": "2025-04-12", "source_endpoint": "/capture", "text": "Fiebre alta."},
            {"id": 2, "description": "Dolor lumbar."},
            {"id": "3", "other": "sin texto"},
            "Texto suelto."
        ]"#;
        let documents = parse_documents("notas.json", content, TextLayout::Whole).expect("docs");
        assert_eq!(documents.len(), 3);
        assert_eq!(documents[0].timestamp.as_deref(), Some("2025-04-12"));
        assert_eq!(documents[0].source.as_deref(), Some("/capture"));
        assert_eq!(documents[1].id, "2");
        assert_eq!(documents[1].text, "Dolor lumbar.");
        assert_eq!(documents[2].id, "notas.json#4");
    }

    #[test]
    fn json_objects_without_id_leave_it_empty() {
        let documents =
            parse_documents("uno.json", br#"{"content": "Reposo."}"#, TextLayout::Whole).expect("docs");
        assert_eq!(documents.len(), 1);
        assert!(documents[0].id.is_empty());
    }

    #[test]
    fn csv_rows_use_text_column_or_joined_cells() {
        let with_text = parse_documents(
            "a.csv",
            b"id,text\n7,\"Tos, fiebre\"\n8,Reposo\n",
            TextLayout::Whole,
        )
        .expect("docs");
        assert_eq!(with_text[0].id, "7");
        assert_eq!(with_text[0].text, "Tos, fiebre");

        let joined = parse_documents("b.csv", b"nombre,sintoma\nAna,tos\n", TextLayout::Whole)
            .expect("docs");
        assert_eq!(joined[0].text, "Ana tos");
        assert_eq!(joined[0].id, "b.csv#1");
    }

    #[test]
    fn text_layout_controls_splitting() {
        let content = b"Primera nota.\n\n  Segunda nota.  \n";
        let whole = parse_documents("n.txt", content, TextLayout::Whole).expect("docs");
        assert_eq!(whole.len(), 1);
        let lines = parse_documents("n.txt", content, TextLayout::Lines).expect("docs");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].text, "Segunda nota.");
        assert_eq!(lines[1].id, "n.txt#2");
    }

    #[test]
    fn tables_from_csv_and_json() {
        let csv = parse_table("t.csv", b"edad,peso\r\n65,70\r\n72,\"80\"\r\n").expect("table");
        assert_eq!(csv.headers, vec!["edad", "peso"]);
        assert_eq!(csv.rows[1], vec!["72", "80"]);

        let json = parse_table("t.json", br#"[{"edad": 65}, {"edad": 72, "peso": 80.5}]"#)
            .expect("table");
        assert_eq!(json.headers, vec!["edad", "peso"]);
        assert_eq!(json.rows[0], vec!["65", ""]);
        assert_eq!(json.rows[1], vec!["72", "80.5"]);

        assert!(matches!(
            parse_table("t.txt", b"1,2"),
            Err(StorageError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn malformed_json_is_reported() {
        let error = parse_documents("x.json", b"{nope", TextLayout::Whole).expect_err("malformed");
        assert!(matches!(error, StorageError::Malformed { format: FileFormat::Json, .. }));
    }

    #[test]
    fn quoted_cells_keep_escaped_quotes() {
        let table = parse_csv("a,b,c\na,\"dijo \"\"hola\"\"\",c\n").expect("csv");
        assert_eq!(table.rows, vec![vec!["a", r#"dijo "hola""#, "c"]]);
    }

    #[test]
    fn quoted_cells_may_span_lines() {
        let content = b"id,text\r\n1,\"Fiebre alta.\r\nSe prescribe reposo.\"\r\n2,Tos\r\n";
        let documents = parse_documents("notas.csv", content, TextLayout::Whole).expect("docs");
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].text, "Fiebre alta.\r\nSe prescribe reposo.");
        assert_eq!(documents[1].id, "2");
    }

    #[test]
    fn unterminated_quote_is_malformed() {
        let error = parse_table("t.csv", b"edad,nota\n65,\"sin cerrar\n72,ok\n").expect_err("quote");
        match error {
            StorageError::Malformed { format, reason, .. } => {
                assert_eq!(format, FileFormat::Csv);
                assert!(reason.contains("line 2"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn json_tables_keep_declared_column_order() {
        let table = parse_table(
            "v.json",
            br#"[{"visitas": 10, "mes": 1}, {"visitas": 12, "mes": 2, "altas": 3}]"#,
        )
        .expect("table");
        assert_eq!(table.headers, vec!["visitas", "mes", "altas"]);
        assert_eq!(table.rows[0], vec!["10", "1", ""]);

        let prediction =
            crate::analytics::predict_from_table(&table.headers, &table.rows, None).expect("trend");
        assert_eq!(prediction.series, "visitas");
    }
}

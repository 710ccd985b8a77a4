use docanalytics::analytics::{
    self, Document, KMeansOptions, SegmentCategory, TokenizerConfig, cluster, cluster_documents,
    describe, predict, vectorize,
};

fn notes() -> Vec<Document> {
    vec![
        Document::new("n1", "Paciente con fiebre alta y tos persistente desde ayer."),
        Document::new("n2", "Fiebre intensa, tos seca y malestar general."),
        Document::new("n3", "Control de glucosa y ajuste de insulina basal."),
        Document::new("n4", "Glucosa elevada; se aumenta la dosis de insulina."),
        Document::new("n5", "Tos nocturna con fiebre moderada."),
    ]
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}

#[test]
fn term_vectors_share_the_batch_vocabulary() {
    let config = TokenizerConfig::default();
    let batch = notes();
    let (vocabulary, vectors) = vectorize(&batch, &config).expect("vectorize");

    assert_eq!(vectors.len(), batch.len());
    for (document, vector) in batch.iter().zip(&vectors) {
        assert_eq!(vector.len(), vocabulary.len());
        let tokens = analytics::tokenize(&document.text, &config);
        assert_eq!(vector.total(), tokens.len() as f64);
    }
    assert!(vocabulary.position("fiebre").is_some());
    assert!(vocabulary.position("con").is_none());
}

#[test]
fn seeded_clustering_is_reproducible_and_partitions_the_batch() {
    let (_, vectors) = vectorize(&notes(), &TokenizerConfig::default()).expect("vectorize");
    let options = KMeansOptions {
        k: 2,
        max_iterations: 50,
        seed: 7,
    };

    let first = cluster(&vectors, &options).expect("cluster");
    let second = cluster(&vectors, &options).expect("cluster");
    assert_eq!(first.assignments, second.assignments);
    assert_eq!(first.sizes().iter().sum::<usize>(), vectors.len());
    assert!(first.assignments.iter().all(|&label| label < options.k));
}

#[test]
fn document_clustering_lists_every_document_once() {
    let batch = notes();
    let result = cluster_documents(&batch, &TokenizerConfig::default(), &KMeansOptions::default())
        .expect("cluster documents");

    assert_eq!(result.assignments.len(), batch.len());
    assert_eq!(result.clusters.len(), result.k);
    let mut members: Vec<&str> = result
        .clusters
        .iter()
        .flat_map(|cluster| cluster.document_ids.iter().map(String::as_str))
        .collect();
    members.sort_unstable();
    assert_eq!(members, vec!["n1", "n2", "n3", "n4", "n5"]);
}

#[test]
fn column_statistics_skip_non_numeric_cells() {
    let headers = strings(&["paciente", "frecuencia"]);
    let rows: Vec<Vec<String>> = [
        ("a", "65"),
        ("b", "72"),
        ("c", "58"),
        ("d", "80"),
        ("e", "n/d"),
        ("f", "67"),
        ("g", "75"),
        ("h", "69"),
    ]
    .iter()
    .map(|(patient, value)| strings(&[patient, value]))
    .collect();

    let summary = describe(&headers, &rows).expect("describe");
    assert_eq!(summary.rows, 8);
    assert!(summary.column("paciente").is_none());

    let stats = summary.column("frecuencia").expect("numeric column");
    assert_eq!(stats.count, 7);
    assert!((stats.mean - 486.0 / 7.0).abs() < 1e-9);
    assert_eq!(stats.min, 58.0);
    assert_eq!(stats.max, 80.0);
    assert!(stats.std_dev > 0.0);
}

#[test]
fn linear_series_extrapolates_one_step() {
    let prediction = predict("visitas", &[80.0, 100.0, 120.0, 140.0, 160.0]).expect("predict");
    assert_eq!(prediction.series, "visitas");
    assert_eq!(prediction.points, 5);
    assert_eq!(prediction.x_next, 6);
    assert_eq!(prediction.last_value, 160.0);
    assert!((prediction.slope - 20.0).abs() < 1e-9);
    assert!((prediction.predicted_value - 180.0).abs() < 1e-9);
}

#[test]
fn anonymized_note_keeps_clinical_content() {
    let output = analytics::anonymize(
        "El paciente Juan Pérez fue atendido el 12/04/2025 por la Dra. García en el Hospital Central.",
    );
    for identifier in ["Juan", "Pérez", "12/04/2025", "García", "Central"] {
        assert!(!output.contains(identifier), "{identifier} leaked: {output}");
    }
    for placeholder in ["[NOMBRE]", "[FECHA]", "[PROFESIONAL]", "[CENTRO_MEDICO]"] {
        assert!(output.contains(placeholder), "{placeholder} missing: {output}");
    }
    assert!(output.contains("fue atendido"));
}

#[test]
fn segmentation_keeps_the_last_sentence_per_category() {
    let segments = analytics::segment(
        "Refiere fiebre desde hace dos días. Se prescribe ibuprofeno. Refiere dolor torácico.",
    );
    assert_eq!(
        segments[&SegmentCategory::Symptoms],
        "Refiere dolor torácico."
    );
    assert_eq!(
        segments[&SegmentCategory::Treatment],
        "Se prescribe ibuprofeno."
    );
}

#[test]
fn keywords_ignore_short_tokens_and_stop_words() {
    let keywords = analytics::extract_keywords(
        "La tos y la fiebre persisten. La tos empeora por la noche con fiebre.",
        &TokenizerConfig::default(),
        5,
    );
    assert!(keywords.len() <= 5);
    assert!(
        keywords
            .iter()
            .all(|keyword| keyword.term.chars().count() > 3)
    );
    assert!(keywords.iter().all(|keyword| keyword.term != "tos"));
    assert_eq!(keywords[0].term, "fiebre");
    assert_eq!(keywords[0].frequency, 2);
}

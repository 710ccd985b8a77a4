//! Analytics service coordinating file input, the analytic core and index persistence.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    analytics::{
        self, AnalyticsError, AnalyticsSettings, AnonymizationStrategy, Document, KMeansOptions,
        SummaryOrder, Table, describe, predict_from_table, summarize_by_score, summarize_first_n,
    },
    annotation::{
        AnnotationProvider, HttpAnnotationClient, anonymize_with_entities, group_entities,
        lemma_keywords, sentiment_report,
    },
    config::Config,
    metrics::{AnalyticsMetrics, MetricsSnapshot},
    processing::{
        mappers::{
            clustering_records, fill_missing_ids, ingest_documents, item_records,
            require_single_source, statistics_records, trend_records,
        },
        types::{
            AnonymizeRequest, AnonymizeResponse, AnonymizedDocument, AnalyticsResponse,
            ClusteringRequest, ClusteringResponse, DocumentEntities, DocumentInput,
            DocumentKeywords, DocumentSegments, DocumentSentiment, DocumentSummary,
            DocumentTriples, DocumentsRequest, EntitiesResponse, IndexDocumentRequest,
            IngestOutcome, IngestRequest, KeywordsRequest, KeywordsResponse, ProcessingError,
            SegmentationResponse, SentimentResponse, ServiceCapabilities, StatisticsRequest,
            StatisticsResponse, SummarizeRequest, SummarizeResponse, SummaryStrategy, TableInput,
            TrendRequest, TrendResponse, TriplesResponse,
        },
    },
    search_index::{
        GeneratedIds, IndexOutcome, OpenSearchService, RecordContext, SearchIndex, enrich_record,
    },
    storage::{FileStore, LocalFileStore, TextLayout, parse_documents, parse_table},
    summarization::{SummarizationClient, build_summarization_client},
};

/// Runs analytic requests end to end: resolve the input, run the core transform, optionally
/// persist enriched records to the search index, and update metrics.
///
/// Collaborators other than the file store are optional. Operations that need a missing one
/// fail with [`ProcessingError::Unavailable`]. Build the service once and share it via `Arc`.
pub struct AnalyticsService {
    settings: AnalyticsSettings,
    files: Arc<dyn FileStore>,
    search_index: Option<Arc<dyn SearchIndex>>,
    annotator: Option<Arc<dyn AnnotationProvider>>,
    summarizer: Option<Arc<dyn SummarizationClient>>,
    metrics: Arc<AnalyticsMetrics>,
}

/// Abstraction over the analytics service used by external surfaces (HTTP, MCP).
#[async_trait]
pub trait AnalyticsApi: Send + Sync {
    /// Rank the most frequent qualifying terms of each document.
    async fn extract_keywords(
        &self,
        request: KeywordsRequest,
    ) -> Result<KeywordsResponse, ProcessingError>;

    /// Summarize each document with the requested strategy.
    async fn summarize(&self, request: SummarizeRequest)
    -> Result<SummarizeResponse, ProcessingError>;

    /// Describe the numeric columns of a dataset.
    async fn describe_dataset(
        &self,
        request: StatisticsRequest,
    ) -> Result<StatisticsResponse, ProcessingError>;

    /// Extrapolate the next value of a numeric column.
    async fn predict_trend(&self, request: TrendRequest) -> Result<TrendResponse, ProcessingError>;

    /// Group documents with k-means over term-frequency vectors.
    async fn cluster_documents(
        &self,
        request: ClusteringRequest,
    ) -> Result<ClusteringResponse, ProcessingError>;

    /// Assign each document's sentences to clinical sections.
    async fn segment_documents(
        &self,
        request: DocumentsRequest,
    ) -> Result<SegmentationResponse, ProcessingError>;

    /// Replace personal identifiers with placeholders.
    async fn anonymize_documents(
        &self,
        request: AnonymizeRequest,
    ) -> Result<AnonymizeResponse, ProcessingError>;

    /// Aggregate sentence sentiment per document.
    async fn analyze_sentiment(
        &self,
        request: DocumentsRequest,
    ) -> Result<SentimentResponse, ProcessingError>;

    /// Group named entities per document.
    async fn recognize_entities(
        &self,
        request: DocumentsRequest,
    ) -> Result<EntitiesResponse, ProcessingError>;

    /// Extract subject–relation–object triples per document.
    async fn extract_triples(
        &self,
        request: DocumentsRequest,
    ) -> Result<TriplesResponse, ProcessingError>;

    /// Write one document into a collection.
    async fn index_document(
        &self,
        request: IndexDocumentRequest,
    ) -> Result<IndexOutcome, ProcessingError>;

    /// Map each collection to its document count.
    async fn list_collections(&self) -> Result<BTreeMap<String, u64>, ProcessingError>;

    /// Drop a collection.
    async fn delete_collection(&self, collection: &str) -> Result<bool, ProcessingError>;

    /// Load every entry of a stored JSON or CSV file into a collection.
    async fn ingest_file(&self, request: IngestRequest) -> Result<IngestOutcome, ProcessingError>;

    /// Names of stored files.
    async fn list_files(&self) -> Result<Vec<String>, ProcessingError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;

    /// Report wired collaborators and analytics defaults.
    fn capabilities(&self) -> ServiceCapabilities;
}

impl AnalyticsService {
    /// Build the service and its collaborators from configuration.
    pub fn new(config: &Config) -> Result<Self, ProcessingError> {
        let files = Arc::new(LocalFileStore::new(&config.upload_dir));
        let search_index: Arc<dyn SearchIndex> = Arc::new(OpenSearchService::new(config)?);
        let annotator = config
            .annotation_url
            .as_deref()
            .map(HttpAnnotationClient::new)
            .transpose()?
            .map(|client| Arc::new(client) as Arc<dyn AnnotationProvider>);
        let summarizer = build_summarization_client(config);

        tracing::info!(
            upload_dir = %config.upload_dir,
            annotation = annotator.is_some(),
            summarization = ?summarizer.as_ref().map(|client| client.model()),
            "Analytics service initialized"
        );

        Ok(Self::with_file_store(config.analytics_settings(), files)
            .with_search_index(search_index)
            .with_annotator_opt(annotator)
            .with_summarizer_opt(summarizer))
    }

    /// Service with only a file store; attach collaborators with the `with_*` methods.
    pub fn with_file_store(settings: AnalyticsSettings, files: Arc<dyn FileStore>) -> Self {
        Self {
            settings,
            files,
            search_index: None,
            annotator: None,
            summarizer: None,
            metrics: Arc::new(AnalyticsMetrics::new()),
        }
    }

    /// Attach a search index.
    pub fn with_search_index(mut self, index: Arc<dyn SearchIndex>) -> Self {
        self.search_index = Some(index);
        self
    }

    /// Attach an annotation provider.
    pub fn with_annotator(self, annotator: Arc<dyn AnnotationProvider>) -> Self {
        self.with_annotator_opt(Some(annotator))
    }

    /// Attach a summarization provider.
    pub fn with_summarizer(self, summarizer: Arc<dyn SummarizationClient>) -> Self {
        self.with_summarizer_opt(Some(summarizer))
    }

    fn with_annotator_opt(mut self, annotator: Option<Arc<dyn AnnotationProvider>>) -> Self {
        self.annotator = annotator;
        self
    }

    fn with_summarizer_opt(mut self, summarizer: Option<Arc<dyn SummarizationClient>>) -> Self {
        self.summarizer = summarizer;
        self
    }

    /// Read-only analytics parameters in force.
    pub fn settings(&self) -> &AnalyticsSettings {
        &self.settings
    }

    async fn load_documents(
        &self,
        input: &DocumentInput,
        layout: TextLayout,
    ) -> Result<(Vec<Document>, GeneratedIds), ProcessingError> {
        require_single_source(&[
            input.file.is_some(),
            input.documents.is_some(),
            input.text.is_some(),
        ])?;

        let documents = if let Some(file) = &input.file {
            let bytes = self.files.read(file).await?;
            parse_documents(file, &bytes, layout)?
        } else if let Some(documents) = &input.documents {
            documents.clone()
        } else if let Some(text) = &input.text {
            match layout {
                TextLayout::Whole => vec![Document::new("", text.clone())],
                TextLayout::Lines => text
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(|line| Document::new("", line))
                    .collect(),
            }
        } else {
            Vec::new()
        };

        if documents.is_empty() {
            return Err(AnalyticsError::EmptyInput.into());
        }
        self.metrics.record_batch(documents.len() as u64);
        Ok(fill_missing_ids(documents))
    }

    async fn load_table(&self, input: &TableInput) -> Result<Table, ProcessingError> {
        require_single_source(&[input.file.is_some(), input.table.is_some()])?;
        let table = match (&input.file, &input.table) {
            (Some(file), _) => {
                let bytes = self.files.read(file).await?;
                parse_table(file, &bytes)?
            }
            (None, Some(table)) => table.clone(),
            (None, None) => Table::default(),
        };
        self.metrics.record_batch(table.rows.len() as u64);
        Ok(table)
    }

    fn annotator(&self) -> Result<&Arc<dyn AnnotationProvider>, ProcessingError> {
        self.annotator
            .as_ref()
            .ok_or(ProcessingError::Unavailable("annotation service"))
    }

    fn search_index(&self) -> Result<&Arc<dyn SearchIndex>, ProcessingError> {
        self.search_index
            .as_ref()
            .ok_or(ProcessingError::Unavailable("search index"))
    }

    /// Enrich and write records when the request named a collection. Returns the number written.
    async fn persist(
        &self,
        index: Option<&str>,
        source_endpoint: &str,
        file: Option<&str>,
        records: Vec<Value>,
        generated_ids: GeneratedIds,
    ) -> Result<usize, ProcessingError> {
        let Some(collection) = index.filter(|name| !name.trim().is_empty()) else {
            return Ok(0);
        };
        let search_index = self.search_index()?;
        let context = RecordContext::new(source_endpoint, file.map(str::to_string))
            .with_generated_ids(generated_ids);

        let mut written = 0;
        for record in records {
            let (record_id, record) = enrich_record(record, &context);
            search_index
                .index_document(collection, Some(&record_id), &record)
                .await?;
            written += 1;
        }

        self.metrics.record_indexed(written as u64);
        tracing::info!(
            collection,
            source_endpoint,
            records = written,
            "Result records indexed"
        );
        Ok(written)
    }

    async fn respond<T>(
        &self,
        results: T,
        records: Vec<Value>,
        generated_ids: GeneratedIds,
        documents_analyzed: usize,
        index: Option<&str>,
        source_endpoint: &str,
        file: Option<&str>,
    ) -> Result<AnalyticsResponse<T>, ProcessingError> {
        let documents_indexed = self
            .persist(index, source_endpoint, file, records, generated_ids)
            .await?;
        Ok(AnalyticsResponse {
            results,
            documents_analyzed,
            documents_indexed,
        })
    }

    async fn summarize_document(
        &self,
        document: &Document,
        strategy: SummaryStrategy,
        sentences: usize,
        order: SummaryOrder,
    ) -> Result<DocumentSummary, ProcessingError> {
        let (summary, selected, model) = match strategy {
            SummaryStrategy::FirstN => {
                let selected = summarize_first_n(&document.text, sentences);
                (selected.join(" "), selected, None)
            }
            SummaryStrategy::ByScore => {
                let selected: Vec<String> =
                    summarize_by_score(&document.text, &self.settings.tokenizer, sentences, order)
                        .into_iter()
                        .map(|sentence| sentence.text)
                        .collect();
                (selected.join(" "), selected, None)
            }
            SummaryStrategy::Abstractive => {
                let summarizer = self
                    .summarizer
                    .as_ref()
                    .ok_or(ProcessingError::Unavailable("summarization provider"))?;
                let summary = summarizer.summarize(&document.text).await?;
                (summary, Vec::new(), Some(summarizer.model().to_string()))
            }
        };

        Ok(DocumentSummary {
            id: document.id.clone(),
            strategy,
            summary,
            sentences: selected,
            model,
        })
    }
}

#[async_trait]
impl AnalyticsApi for AnalyticsService {
    async fn extract_keywords(
        &self,
        request: KeywordsRequest,
    ) -> Result<KeywordsResponse, ProcessingError> {
        let (documents, generated_ids) = self
            .load_documents(&request.input, TextLayout::Whole)
            .await?;
        let limit = request.limit.unwrap_or(self.settings.keyword_limit);

        let mut results = Vec::with_capacity(documents.len());
        for document in &documents {
            let keywords = if request.lemmatize {
                let annotation = self.annotator()?.annotate(&document.text).await?;
                lemma_keywords(&annotation.tokens, &self.settings.tokenizer, limit)
            } else {
                analytics::extract_keywords(&document.text, &self.settings.tokenizer, limit)
            };
            results.push(DocumentKeywords {
                id: document.id.clone(),
                keywords,
            });
        }
        tracing::debug!(documents = documents.len(), limit, "Keywords extracted");

        let records = item_records(&results)?;
        self.respond(
            results,
            records,
            generated_ids,
            documents.len(),
            request.index.as_deref(),
            "keywords",
            request.input.file.as_deref(),
        )
        .await
    }

    async fn summarize(
        &self,
        request: SummarizeRequest,
    ) -> Result<SummarizeResponse, ProcessingError> {
        let (documents, generated_ids) = self
            .load_documents(&request.input, TextLayout::Whole)
            .await?;
        let sentences = request.sentences.unwrap_or(self.settings.summary_sentences);

        let mut results = Vec::with_capacity(documents.len());
        for document in &documents {
            results.push(
                self.summarize_document(document, request.strategy, sentences, request.order)
                    .await?,
            );
        }

        let records = item_records(&results)?;
        self.respond(
            results,
            records,
            generated_ids,
            documents.len(),
            request.index.as_deref(),
            "summarize",
            request.input.file.as_deref(),
        )
        .await
    }

    async fn describe_dataset(
        &self,
        request: StatisticsRequest,
    ) -> Result<StatisticsResponse, ProcessingError> {
        let table = self.load_table(&request.input).await?;
        let summary = describe(&table.headers, &table.rows)?;
        let records = statistics_records(&summary)?;
        self.respond(
            summary,
            records,
            GeneratedIds::new(),
            table.rows.len(),
            request.index.as_deref(),
            "statistics",
            request.input.file.as_deref(),
        )
        .await
    }

    async fn predict_trend(&self, request: TrendRequest) -> Result<TrendResponse, ProcessingError> {
        let table = self.load_table(&request.input).await?;
        let prediction = predict_from_table(&table.headers, &table.rows, request.column.as_deref())?;
        tracing::debug!(
            series = %prediction.series,
            predicted = prediction.predicted_value,
            "Trend predicted"
        );
        let records = trend_records(&prediction)?;
        self.respond(
            prediction,
            records,
            GeneratedIds::new(),
            table.rows.len(),
            request.index.as_deref(),
            "trend",
            request.input.file.as_deref(),
        )
        .await
    }

    async fn cluster_documents(
        &self,
        request: ClusteringRequest,
    ) -> Result<ClusteringResponse, ProcessingError> {
        let (documents, generated_ids) = self
            .load_documents(&request.input, TextLayout::Lines)
            .await?;
        let defaults = KMeansOptions::from_settings(&self.settings);
        let options = KMeansOptions {
            k: request.k.unwrap_or(defaults.k),
            max_iterations: request.max_iterations.unwrap_or(defaults.max_iterations),
            seed: request.seed.unwrap_or(defaults.seed),
        };
        let clustering =
            analytics::cluster_documents(&documents, &self.settings.tokenizer, &options)?;
        tracing::debug!(
            documents = documents.len(),
            k = options.k,
            iterations = clustering.iterations,
            converged = clustering.converged,
            "Documents clustered"
        );

        let records = clustering_records(&clustering);
        self.respond(
            clustering,
            records,
            generated_ids,
            documents.len(),
            request.index.as_deref(),
            "clustering",
            request.input.file.as_deref(),
        )
        .await
    }

    async fn segment_documents(
        &self,
        request: DocumentsRequest,
    ) -> Result<SegmentationResponse, ProcessingError> {
        let (documents, generated_ids) = self
            .load_documents(&request.input, TextLayout::Whole)
            .await?;
        let results: Vec<DocumentSegments> = documents
            .iter()
            .map(|document| DocumentSegments {
                id: document.id.clone(),
                segments: analytics::segment(&document.text),
            })
            .collect();

        let records = item_records(&results)?;
        self.respond(
            results,
            records,
            generated_ids,
            documents.len(),
            request.index.as_deref(),
            "segmentation",
            request.input.file.as_deref(),
        )
        .await
    }

    async fn anonymize_documents(
        &self,
        request: AnonymizeRequest,
    ) -> Result<AnonymizeResponse, ProcessingError> {
        let (documents, generated_ids) = self
            .load_documents(&request.input, TextLayout::Whole)
            .await?;

        let mut results = Vec::with_capacity(documents.len());
        for document in &documents {
            let anonymized_text = match request.strategy {
                AnonymizationStrategy::Regex => analytics::anonymize(&document.text),
                AnonymizationStrategy::Entities => {
                    let annotation = self.annotator()?.annotate(&document.text).await?;
                    anonymize_with_entities(&annotation.tokens)
                }
            };
            results.push(AnonymizedDocument {
                id: document.id.clone(),
                strategy: request.strategy,
                anonymized_text,
            });
        }

        let records = item_records(&results)?;
        self.respond(
            results,
            records,
            generated_ids,
            documents.len(),
            request.index.as_deref(),
            "anonymize",
            request.input.file.as_deref(),
        )
        .await
    }

    async fn analyze_sentiment(
        &self,
        request: DocumentsRequest,
    ) -> Result<SentimentResponse, ProcessingError> {
        let (documents, generated_ids) = self
            .load_documents(&request.input, TextLayout::Whole)
            .await?;
        let annotator = self.annotator()?;

        let mut results = Vec::with_capacity(documents.len());
        for document in &documents {
            let annotation = annotator.annotate(&document.text).await?;
            results.push(DocumentSentiment {
                id: document.id.clone(),
                report: sentiment_report(&annotation.sentences)?,
            });
        }

        let records = item_records(&results)?;
        self.respond(
            results,
            records,
            generated_ids,
            documents.len(),
            request.index.as_deref(),
            "sentiment",
            request.input.file.as_deref(),
        )
        .await
    }

    async fn recognize_entities(
        &self,
        request: DocumentsRequest,
    ) -> Result<EntitiesResponse, ProcessingError> {
        let (documents, generated_ids) = self
            .load_documents(&request.input, TextLayout::Whole)
            .await?;
        let annotator = self.annotator()?;

        let mut results = Vec::with_capacity(documents.len());
        for document in &documents {
            let annotation = annotator.annotate(&document.text).await?;
            results.push(DocumentEntities {
                id: document.id.clone(),
                entities: group_entities(&annotation.entities),
            });
        }

        let records = item_records(&results)?;
        self.respond(
            results,
            records,
            generated_ids,
            documents.len(),
            request.index.as_deref(),
            "entities",
            request.input.file.as_deref(),
        )
        .await
    }

    async fn extract_triples(
        &self,
        request: DocumentsRequest,
    ) -> Result<TriplesResponse, ProcessingError> {
        let (documents, generated_ids) = self
            .load_documents(&request.input, TextLayout::Whole)
            .await?;
        let annotator = self.annotator()?;

        let mut results = Vec::with_capacity(documents.len());
        for document in &documents {
            let annotation = annotator.annotate(&document.text).await?;
            results.push(DocumentTriples {
                id: document.id.clone(),
                triples: annotation.triples,
            });
        }

        let records = item_records(&results)?;
        self.respond(
            results,
            records,
            generated_ids,
            documents.len(),
            request.index.as_deref(),
            "triples",
            request.input.file.as_deref(),
        )
        .await
    }

    async fn index_document(
        &self,
        request: IndexDocumentRequest,
    ) -> Result<IndexOutcome, ProcessingError> {
        let outcome = self
            .search_index()?
            .index_document(&request.index, request.id.as_deref(), &request.document)
            .await?;
        self.metrics.record_indexed(1);
        Ok(outcome)
    }

    async fn list_collections(&self) -> Result<BTreeMap<String, u64>, ProcessingError> {
        Ok(self.search_index()?.list_collections().await?)
    }

    async fn delete_collection(&self, collection: &str) -> Result<bool, ProcessingError> {
        Ok(self.search_index()?.delete_collection(collection).await?)
    }

    async fn ingest_file(&self, request: IngestRequest) -> Result<IngestOutcome, ProcessingError> {
        let search_index = self.search_index()?;
        let bytes = self.files.read(&request.file).await?;
        let documents = ingest_documents(&request.file, &bytes)?;
        self.metrics.record_batch(documents.len() as u64);

        for document in &documents {
            search_index
                .index_document(&request.index, None, document)
                .await?;
        }
        self.metrics.record_indexed(documents.len() as u64);
        tracing::info!(
            file = %request.file,
            collection = %request.index,
            documents = documents.len(),
            "File ingested"
        );

        Ok(IngestOutcome {
            file: request.file,
            index: request.index,
            documents_indexed: documents.len(),
        })
    }

    async fn list_files(&self) -> Result<Vec<String>, ProcessingError> {
        Ok(self.files.list().await?)
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    fn capabilities(&self) -> ServiceCapabilities {
        ServiceCapabilities {
            search_index: self.search_index.is_some(),
            annotation: self.annotator.is_some(),
            summarization_model: self
                .summarizer
                .as_ref()
                .map(|client| client.model().to_string()),
            token_length_threshold: self.settings.tokenizer.length_threshold(),
            keyword_limit: self.settings.keyword_limit,
            summary_sentences: self.settings.summary_sentences,
            cluster_count: self.settings.cluster_count,
            cluster_max_iterations: self.settings.cluster_max_iterations,
            cluster_seed: self.settings.cluster_seed,
        }
    }
}

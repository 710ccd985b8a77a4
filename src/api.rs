//! HTTP surface for the analytics service.
//!
//! Every analytic lives under `POST /api/v1/analytics/<name>` and takes a JSON body naming its
//! input as a stored `file` or inline `documents` / `text` / `table`, plus an optional `index`
//! collection that receives the enriched result records:
//!
//! - `keywords`, `summarize`, `segmentation`, `anonymize`, `clustering`: text analytics.
//! - `statistics`, `trend`: tabular analytics over CSV or JSON datasets.
//! - `sentiment`, `entities`, `triples`: backed by the annotation provider.
//!
//! Search index plumbing sits next to them: `POST /api/v1/index`, `GET /api/v1/collections`,
//! `DELETE /api/v1/collections/:name`, `POST /api/v1/ingest`. `GET /api/v1/files` lists stored
//! files. `GET /metrics` and `GET /commands` serve diagnostics and discovery.
//!
//! The HTTP surface shares the [`AnalyticsApi`] seam with the MCP server, so behavior is
//! identical across interfaces.

use crate::processing::{
    AnalyticsApi, AnonymizeRequest, ClusteringRequest, DocumentsRequest, IndexDocumentRequest,
    IngestOutcome, IngestRequest, KeywordsRequest, ProcessingError, StatisticsRequest,
    SummarizeRequest, TrendRequest,
    types::{
        AnonymizeResponse, ClusteringResponse, EntitiesResponse, KeywordsResponse,
        SegmentationResponse, SentimentResponse, StatisticsResponse, SummarizeResponse,
        TrendResponse, TriplesResponse,
    },
};
use crate::metrics::MetricsSnapshot;
use crate::search_index::IndexOutcome;
use crate::storage::StorageError;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Build the HTTP router exposing the analytics API surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: AnalyticsApi + 'static,
{
    Router::new()
        .route("/api/v1/isAlive", get(is_alive))
        .route("/api/v1/analytics/keywords", post(keywords::<S>))
        .route("/api/v1/analytics/summarize", post(summarize::<S>))
        .route("/api/v1/analytics/statistics", post(statistics::<S>))
        .route("/api/v1/analytics/trend", post(trend::<S>))
        .route("/api/v1/analytics/clustering", post(clustering::<S>))
        .route("/api/v1/analytics/segmentation", post(segmentation::<S>))
        .route("/api/v1/analytics/anonymize", post(anonymize::<S>))
        .route("/api/v1/analytics/sentiment", post(sentiment::<S>))
        .route("/api/v1/analytics/entities", post(entities::<S>))
        .route("/api/v1/analytics/triples", post(triples::<S>))
        .route("/api/v1/index", post(index_document::<S>))
        .route("/api/v1/collections", get(list_collections::<S>))
        .route("/api/v1/collections/:name", delete(delete_collection::<S>))
        .route("/api/v1/ingest", post(ingest_file::<S>))
        .route("/api/v1/files", get(list_files::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .route("/commands", get(get_commands))
        .with_state(service)
}

async fn is_alive() -> &'static str {
    "Service is running"
}

async fn keywords<S: AnalyticsApi>(
    State(service): State<Arc<S>>,
    Json(request): Json<KeywordsRequest>,
) -> Result<Json<KeywordsResponse>, AppError> {
    Ok(Json(service.extract_keywords(request).await?))
}

async fn summarize<S: AnalyticsApi>(
    State(service): State<Arc<S>>,
    Json(request): Json<SummarizeRequest>,
) -> Result<Json<SummarizeResponse>, AppError> {
    Ok(Json(service.summarize(request).await?))
}

async fn statistics<S: AnalyticsApi>(
    State(service): State<Arc<S>>,
    Json(request): Json<StatisticsRequest>,
) -> Result<Json<StatisticsResponse>, AppError> {
    Ok(Json(service.describe_dataset(request).await?))
}

async fn trend<S: AnalyticsApi>(
    State(service): State<Arc<S>>,
    Json(request): Json<TrendRequest>,
) -> Result<Json<TrendResponse>, AppError> {
    Ok(Json(service.predict_trend(request).await?))
}

async fn clustering<S: AnalyticsApi>(
    State(service): State<Arc<S>>,
    Json(request): Json<ClusteringRequest>,
) -> Result<Json<ClusteringResponse>, AppError> {
    Ok(Json(service.cluster_documents(request).await?))
}

async fn segmentation<S: AnalyticsApi>(
    State(service): State<Arc<S>>,
    Json(request): Json<DocumentsRequest>,
) -> Result<Json<SegmentationResponse>, AppError> {
    Ok(Json(service.segment_documents(request).await?))
}

async fn anonymize<S: AnalyticsApi>(
    State(service): State<Arc<S>>,
    Json(request): Json<AnonymizeRequest>,
) -> Result<Json<AnonymizeResponse>, AppError> {
    Ok(Json(service.anonymize_documents(request).await?))
}

async fn sentiment<S: AnalyticsApi>(
    State(service): State<Arc<S>>,
    Json(request): Json<DocumentsRequest>,
) -> Result<Json<SentimentResponse>, AppError> {
    Ok(Json(service.analyze_sentiment(request).await?))
}

async fn entities<S: AnalyticsApi>(
    State(service): State<Arc<S>>,
    Json(request): Json<DocumentsRequest>,
) -> Result<Json<EntitiesResponse>, AppError> {
    Ok(Json(service.recognize_entities(request).await?))
}

async fn triples<S: AnalyticsApi>(
    State(service): State<Arc<S>>,
    Json(request): Json<DocumentsRequest>,
) -> Result<Json<TriplesResponse>, AppError> {
    Ok(Json(service.extract_triples(request).await?))
}

/// Write a single JSON document into a collection.
async fn index_document<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<IndexDocumentRequest>,
) -> Result<Json<IndexOutcome>, AppError>
where
    S: AnalyticsApi,
{
    let collection = request.index.clone();
    let outcome = service.index_document(request).await?;
    tracing::info!(
        collection,
        id = %outcome.id,
        status = %outcome.status,
        "Index request completed"
    );
    Ok(Json(outcome))
}

/// Response body for `GET /api/v1/collections`.
#[derive(Serialize)]
struct CollectionsResponse {
    collections: BTreeMap<String, u64>,
}

/// List collections with their document counts.
async fn list_collections<S>(
    State(service): State<Arc<S>>,
) -> Result<Json<CollectionsResponse>, AppError>
where
    S: AnalyticsApi,
{
    let collections = service.list_collections().await?;
    Ok(Json(CollectionsResponse { collections }))
}

/// Response body for `DELETE /api/v1/collections/:name`.
#[derive(Serialize)]
struct DeleteCollectionResponse {
    collection: String,
    deleted: bool,
}

/// Drop a collection. Unknown collections answer 404.
async fn delete_collection<S>(
    State(service): State<Arc<S>>,
    Path(name): Path<String>,
) -> Result<Response, AppError>
where
    S: AnalyticsApi,
{
    let deleted = service.delete_collection(&name).await?;
    let status = if deleted {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };
    Ok((
        status,
        Json(DeleteCollectionResponse {
            collection: name,
            deleted,
        }),
    )
        .into_response())
}

/// Load a stored JSON or CSV file into a collection.
async fn ingest_file<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<IngestRequest>,
) -> Result<Json<IngestOutcome>, AppError>
where
    S: AnalyticsApi,
{
    Ok(Json(service.ingest_file(request).await?))
}

/// Response body for `GET /api/v1/files`.
#[derive(Serialize)]
struct FilesResponse {
    files: Vec<String>,
}

async fn list_files<S>(State(service): State<Arc<S>>) -> Result<Json<FilesResponse>, AppError>
where
    S: AnalyticsApi,
{
    let files = service.list_files().await?;
    Ok(Json(FilesResponse { files }))
}

/// Return the request and document counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsSnapshot>
where
    S: AnalyticsApi,
{
    Json(service.metrics_snapshot())
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

fn analytic(
    name: &'static str,
    path: &'static str,
    description: &'static str,
    request_example: serde_json::Value,
) -> CommandDescriptor {
    CommandDescriptor {
        name,
        method: "POST",
        path,
        description,
        request_example: Some(request_example),
    }
}

/// Enumerate supported HTTP commands for discovery in hosts and tools.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            analytic(
                "keywords",
                "/api/v1/analytics/keywords",
                "Rank the most frequent qualifying terms of each document. Set `lemmatize` to rank lemmas from the annotation provider.",
                json!({ "file": "notas.json", "limit": 10, "index": "keywords" }),
            ),
            analytic(
                "summarize",
                "/api/v1/analytics/summarize",
                "Summarize each document: `first_n`, `by_score` (default) or `abstractive` via the configured LLM provider.",
                json!({ "text": "El paciente presenta disnea. ...", "strategy": "by_score", "sentences": 3 }),
            ),
            analytic(
                "statistics",
                "/api/v1/analytics/statistics",
                "Count, mean, standard deviation, min and max of each numeric column.",
                json!({ "file": "pacientes.csv" }),
            ),
            analytic(
                "trend",
                "/api/v1/analytics/trend",
                "Fit a least-squares line to a numeric column and predict the next value.",
                json!({ "file": "visitas.csv", "column": "visitas" }),
            ),
            analytic(
                "clustering",
                "/api/v1/analytics/clustering",
                "Group documents with k-means over term-frequency vectors. Text files contribute one document per line.",
                json!({ "file": "notas.txt", "k": 2, "seed": 42 }),
            ),
            analytic(
                "segmentation",
                "/api/v1/analytics/segmentation",
                "Assign sentences to symptoms, history, recommendations and treatment sections.",
                json!({ "file": "informe.txt" }),
            ),
            analytic(
                "anonymize",
                "/api/v1/analytics/anonymize",
                "Replace professionals, names, medical centers and dates with placeholders.",
                json!({ "text": "El paciente Juan Pérez fue atendido el 12/03/2024.", "strategy": "regex" }),
            ),
            analytic(
                "sentiment",
                "/api/v1/analytics/sentiment",
                "Aggregate sentence sentiment reported by the annotation provider.",
                json!({ "file": "opiniones.json" }),
            ),
            analytic(
                "entities",
                "/api/v1/analytics/entities",
                "Group named entities by label.",
                json!({ "file": "informe.txt" }),
            ),
            analytic(
                "triples",
                "/api/v1/analytics/triples",
                "Extract subject, relation and object triples.",
                json!({ "file": "informe.txt" }),
            ),
            analytic(
                "index",
                "/api/v1/index",
                "Write one JSON document into a collection.",
                json!({ "index": "pacientes", "id": "p-1", "document": { "edad": 65 } }),
            ),
            analytic(
                "ingest",
                "/api/v1/ingest",
                "Load every entry of a stored JSON or CSV file into a collection.",
                json!({ "file": "pacientes.csv", "index": "pacientes" }),
            ),
            CommandDescriptor {
                name: "list_collections",
                method: "GET",
                path: "/api/v1/collections",
                description: "Return collections with their document counts.",
                request_example: None,
            },
            CommandDescriptor {
                name: "delete_collection",
                method: "DELETE",
                path: "/api/v1/collections/:name",
                description: "Drop a collection.",
                request_example: None,
            },
            CommandDescriptor {
                name: "list_files",
                method: "GET",
                path: "/api/v1/files",
                description: "Return the names of stored files.",
                request_example: None,
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return request, document and index counters.",
                request_example: None,
            },
        ],
    })
}

struct AppError(ProcessingError);

impl AppError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            ProcessingError::Analytics(_) | ProcessingError::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ProcessingError::Storage(StorageError::NotFound(_)) => StatusCode::NOT_FOUND,
            ProcessingError::Storage(StorageError::Io(_)) | ProcessingError::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ProcessingError::Storage(_) => StatusCode::BAD_REQUEST,
            ProcessingError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ProcessingError::SearchIndex(_)
            | ProcessingError::Annotation(_)
            | ProcessingError::Summarization(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

impl From<ProcessingError> for AppError {
    fn from(inner: ProcessingError) -> Self {
        Self(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::{create_router, get_commands};
    use crate::analytics::{AnalyticsError, KeywordScore};
    use crate::metrics::MetricsSnapshot;
    use crate::processing::types::{
        AnonymizeResponse, ClusteringResponse, DocumentKeywords, EntitiesResponse,
        KeywordsResponse, SegmentationResponse, SentimentResponse, StatisticsResponse,
        SummarizeResponse, TrendResponse, TriplesResponse,
    };
    use crate::processing::{
        AnalyticsApi, AnalyticsResponse, AnonymizeRequest, ClusteringRequest, DocumentsRequest,
        IndexDocumentRequest, IngestOutcome, IngestRequest, KeywordsRequest, ProcessingError,
        ServiceCapabilities, StatisticsRequest, SummarizeRequest, TrendRequest,
    };
    use crate::search_index::{IndexOutcome, IndexStatus};
    use crate::storage::StorageError;
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode},
    };
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    #[tokio::test]
    async fn commands_catalog_exposes_analytics() {
        let response = get_commands().await;
        let commands = response.0.commands;
        let keywords = commands
            .iter()
            .find(|cmd| cmd.name == "keywords")
            .expect("keywords command present");

        assert_eq!(keywords.method, "POST");
        assert_eq!(keywords.path, "/api/v1/analytics/keywords");
        assert!(commands.iter().any(|cmd| cmd.method == "DELETE"));
        assert!(commands.len() >= 10);
    }

    #[tokio::test]
    async fn is_alive_answers_plain_text() {
        let app = create_router(Arc::new(StubAnalyticsService::default()));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/isAlive")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        assert_eq!(&body[..], b"Service is running");
    }

    #[tokio::test]
    async fn keywords_route_forwards_request() {
        let service = Arc::new(StubAnalyticsService::default());
        let app = create_router(service.clone());

        let payload = json!({
            "file": "notas.json",
            "limit": 5,
            "index": "keywords"
        });
        let (status, json) = send(app, Method::POST, "/api/v1/analytics/keywords", payload).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["results"][0]["keywords"][0]["term"], "fiebre");
        assert_eq!(json["documents_indexed"], 1);

        let calls = service.keyword_calls.lock().await.clone();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].input.file.as_deref(), Some("notas.json"));
        assert_eq!(calls[0].limit, Some(5));
        assert_eq!(calls[0].index.as_deref(), Some("keywords"));
    }

    #[tokio::test]
    async fn errors_map_to_status_codes() {
        let cases = [
            ("empty", StatusCode::BAD_REQUEST),
            ("missing", StatusCode::NOT_FOUND),
            ("unavailable", StatusCode::SERVICE_UNAVAILABLE),
        ];
        for (mode, expected) in cases {
            let app = create_router(Arc::new(StubAnalyticsService::default()));
            let (status, json) = send(
                app,
                Method::POST,
                "/api/v1/analytics/segmentation",
                json!({ "text": mode }),
            )
            .await;
            assert_eq!(status, expected, "mode {mode}");
            assert!(json["error"].is_string());
        }
    }

    #[tokio::test]
    async fn delete_unknown_collection_is_not_found() {
        let app = create_router(Arc::new(StubAnalyticsService::default()));
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri("/api/v1/collections/desconocida")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn metrics_route_returns_snapshot() {
        let app = create_router(Arc::new(StubAnalyticsService::default()));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(json["requests_served"], 7);
    }

    async fn send(
        app: axum::Router,
        method: Method,
        uri: &str,
        payload: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .expect("request"),
            )
            .await
            .expect("router response");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        (status, serde_json::from_slice(&body).expect("json body"))
    }

    #[derive(Default)]
    struct StubAnalyticsService {
        keyword_calls: Mutex<Vec<KeywordsRequest>>,
    }

    fn unused<T>() -> Result<T, ProcessingError> {
        Err(ProcessingError::InvalidRequest("not stubbed".into()))
    }

    #[async_trait]
    impl AnalyticsApi for StubAnalyticsService {
        async fn extract_keywords(
            &self,
            request: KeywordsRequest,
        ) -> Result<KeywordsResponse, ProcessingError> {
            self.keyword_calls.lock().await.push(request);
            Ok(AnalyticsResponse {
                results: vec![DocumentKeywords {
                    id: "n1".into(),
                    keywords: vec![KeywordScore {
                        term: "fiebre".into(),
                        frequency: 2,
                    }],
                }],
                documents_analyzed: 1,
                documents_indexed: 1,
            })
        }

        async fn summarize(
            &self,
            _request: SummarizeRequest,
        ) -> Result<SummarizeResponse, ProcessingError> {
            unused()
        }

        async fn describe_dataset(
            &self,
            _request: StatisticsRequest,
        ) -> Result<StatisticsResponse, ProcessingError> {
            unused()
        }

        async fn predict_trend(
            &self,
            _request: TrendRequest,
        ) -> Result<TrendResponse, ProcessingError> {
            unused()
        }

        async fn cluster_documents(
            &self,
            _request: ClusteringRequest,
        ) -> Result<ClusteringResponse, ProcessingError> {
            unused()
        }

        async fn segment_documents(
            &self,
            request: DocumentsRequest,
        ) -> Result<SegmentationResponse, ProcessingError> {
            match request.input.text.as_deref() {
                Some("empty") => Err(AnalyticsError::EmptyInput.into()),
                Some("missing") => Err(StorageError::NotFound("x.txt".into()).into()),
                Some("unavailable") => Err(ProcessingError::Unavailable("search index")),
                _ => unused(),
            }
        }

        async fn anonymize_documents(
            &self,
            _request: AnonymizeRequest,
        ) -> Result<AnonymizeResponse, ProcessingError> {
            unused()
        }

        async fn analyze_sentiment(
            &self,
            _request: DocumentsRequest,
        ) -> Result<SentimentResponse, ProcessingError> {
            unused()
        }

        async fn recognize_entities(
            &self,
            _request: DocumentsRequest,
        ) -> Result<EntitiesResponse, ProcessingError> {
            unused()
        }

        async fn extract_triples(
            &self,
            _request: DocumentsRequest,
        ) -> Result<TriplesResponse, ProcessingError> {
            unused()
        }

        async fn index_document(
            &self,
            request: IndexDocumentRequest,
        ) -> Result<IndexOutcome, ProcessingError> {
            Ok(IndexOutcome {
                id: request.id.unwrap_or_default(),
                status: IndexStatus::Created,
            })
        }

        async fn list_collections(&self) -> Result<BTreeMap<String, u64>, ProcessingError> {
            Ok(BTreeMap::new())
        }

        async fn delete_collection(&self, _collection: &str) -> Result<bool, ProcessingError> {
            Ok(false)
        }

        async fn ingest_file(
            &self,
            request: IngestRequest,
        ) -> Result<IngestOutcome, ProcessingError> {
            Ok(IngestOutcome {
                file: request.file,
                index: request.index,
                documents_indexed: 0,
            })
        }

        async fn list_files(&self) -> Result<Vec<String>, ProcessingError> {
            Ok(Vec::new())
        }

        fn metrics_snapshot(&self) -> MetricsSnapshot {
            MetricsSnapshot {
                requests_served: 7,
                ..MetricsSnapshot::default()
            }
        }

        fn capabilities(&self) -> ServiceCapabilities {
            ServiceCapabilities {
                search_index: false,
                annotation: false,
                summarization_model: None,
                token_length_threshold: 3,
                keyword_limit: 10,
                summary_sentences: 3,
                cluster_count: 2,
                cluster_max_iterations: 100,
                cluster_seed: 42,
            }
        }
    }
}

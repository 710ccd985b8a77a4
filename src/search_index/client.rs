//! HTTP client wrapper for interacting with OpenSearch.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url};
use serde_json::Value;

use crate::config::Config;
use crate::search_index::SearchIndex;
use crate::search_index::types::{
    AcknowledgedResponse, CatIndexRow, IndexOutcome, IndexResponse, IndexStatus, SearchIndexError,
};

/// Lightweight HTTP client for OpenSearch operations.
pub struct OpenSearchService {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) credentials: Option<(String, String)>,
}

impl OpenSearchService {
    /// Construct a client from the loaded configuration.
    pub fn new(config: &Config) -> Result<Self, SearchIndexError> {
        let client = Client::builder().user_agent("docanalytics/0.1").build()?;
        let base_url =
            normalize_base_url(&config.opensearch_url).map_err(SearchIndexError::InvalidUrl)?;
        let credentials = config
            .opensearch_username
            .clone()
            .map(|user| (user, config.opensearch_password.clone().unwrap_or_default()));

        tracing::debug!(
            url = %base_url,
            basic_auth = credentials.is_some(),
            "Initialized OpenSearch HTTP client"
        );

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    /// Build a request for the given path segments, each percent-encoded on its own.
    fn request(
        &self,
        method: Method,
        segments: &[&str],
    ) -> Result<reqwest::RequestBuilder, SearchIndexError> {
        let url = endpoint_url(&self.base_url, segments)?;
        let req = self.client.request(method, url);
        Ok(match &self.credentials {
            Some((user, password)) => req.basic_auth(user, Some(password)),
            None => req,
        })
    }

    async fn unexpected(response: reqwest::Response) -> SearchIndexError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        SearchIndexError::UnexpectedStatus { status, body }
    }
}

#[async_trait]
impl SearchIndex for OpenSearchService {
    async fn index_document(
        &self,
        collection: &str,
        id: Option<&str>,
        document: &Value,
    ) -> Result<IndexOutcome, SearchIndexError> {
        validate_collection(collection)?;
        let builder = match id {
            Some(id) => self.request(Method::PUT, &[collection, "_doc", id])?,
            None => self.request(Method::POST, &[collection, "_doc"])?,
        };
        let response = builder.json(document).send().await?;

        if !response.status().is_success() {
            let error = Self::unexpected(response).await;
            tracing::error!(collection, error = %error, "Failed to index document");
            return Err(error);
        }

        let IndexResponse { id, result } = response.json().await?;
        let status = IndexStatus::from_result(&result);
        tracing::debug!(collection, id = %id, status = %status, "Document indexed");
        Ok(IndexOutcome { id, status })
    }

    async fn list_collections(&self) -> Result<BTreeMap<String, u64>, SearchIndexError> {
        let response = self
            .request(Method::GET, &["_cat", "indices"])?
            .query(&[("format", "json"), ("h", "index,docs.count")])
            .send()
            .await?;

        if !response.status().is_success() {
            let error = Self::unexpected(response).await;
            tracing::error!(error = %error, "Failed to list collections");
            return Err(error);
        }

        let rows: Vec<CatIndexRow> = response.json().await?;
        Ok(rows
            .into_iter()
            .filter(|row| !row.index.starts_with('.'))
            .map(|row| {
                // Closed or initializing indices report no count.
                let count = row
                    .docs_count
                    .and_then(|value| value.trim().parse().ok())
                    .unwrap_or(0);
                (row.index, count)
            })
            .collect())
    }

    async fn delete_collection(&self, collection: &str) -> Result<bool, SearchIndexError> {
        validate_collection(collection)?;
        let response = self
            .request(Method::DELETE, &[collection])?
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                tracing::debug!(collection, "Collection already absent");
                Ok(false)
            }
            status if status.is_success() => {
                let AcknowledgedResponse { acknowledged } = response.json().await?;
                tracing::info!(collection, acknowledged, "Collection deleted");
                Ok(acknowledged)
            }
            _ => {
                let error = Self::unexpected(response).await;
                tracing::error!(collection, error = %error, "Failed to delete collection");
                Err(error)
            }
        }
    }
}

fn validate_collection(name: &str) -> Result<(), SearchIndexError> {
    let forbidden = |c: char| c.is_whitespace() || "/\\*?\"<>|,#:".contains(c);
    if name.is_empty() || name.starts_with(['_', '-', '+', '.']) || name.contains(forbidden) {
        return Err(SearchIndexError::InvalidCollection(name.to_string()));
    }
    Ok(())
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

fn endpoint_url(base: &str, segments: &[&str]) -> Result<Url, SearchIndexError> {
    let mut url = Url::parse(base).map_err(|err| SearchIndexError::InvalidUrl(err.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| SearchIndexError::InvalidUrl(format!("{base} cannot carry a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::{DELETE, GET, POST, PUT};
    use httpmock::MockServer;
    use serde_json::json;

    fn service(server: &MockServer) -> OpenSearchService {
        OpenSearchService {
            client: Client::builder()
                .user_agent("docanalytics-test")
                .build()
                .expect("client"),
            base_url: server.base_url(),
            credentials: None,
        }
    }

    #[tokio::test]
    async fn index_with_id_uses_put() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/notas/_doc/abc")
                    .json_body(json!({ "text": "fiebre" }));
                then.status(201).json_body(json!({
                    "_index": "notas",
                    "_id": "abc",
                    "result": "created"
                }));
            })
            .await;

        let outcome = service(&server)
            .index_document("notas", Some("abc"), &json!({ "text": "fiebre" }))
            .await
            .expect("indexed");

        mock.assert_async().await;
        assert_eq!(outcome.id, "abc");
        assert_eq!(outcome.status, IndexStatus::Created);
        assert_eq!(outcome.status.to_string(), "CREATED");
    }

    #[tokio::test]
    async fn reserved_characters_in_ids_stay_in_the_id_segment() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT).path("/notas/_doc/p%231");
                then.status(200).json_body(json!({
                    "_id": "p#1",
                    "result": "updated"
                }));
            })
            .await;

        let outcome = service(&server)
            .index_document("notas", Some("p#1"), &json!({ "text": "tos" }))
            .await
            .expect("indexed");

        mock.assert_async().await;
        assert_eq!(outcome.id, "p#1");
        assert_eq!(outcome.status, IndexStatus::Updated);
    }

    #[tokio::test]
    async fn index_without_id_uses_post() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/notas/_doc");
                then.status(201).json_body(json!({
                    "_id": "generated-1",
                    "result": "created"
                }));
            })
            .await;

        let outcome = service(&server)
            .index_document("notas", None, &json!({ "text": "tos" }))
            .await
            .expect("indexed");

        mock.assert_async().await;
        assert_eq!(outcome.id, "generated-1");
    }

    #[tokio::test]
    async fn list_collections_skips_hidden_and_tolerates_missing_counts() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/_cat/indices")
                    .query_param("format", "json");
                then.status(200).json_body(json!([
                    { "index": "notas", "docs.count": "12" },
                    { "index": ".kibana", "docs.count": "3" },
                    { "index": "cerrado", "docs.count": null }
                ]));
            })
            .await;

        let collections = service(&server).list_collections().await.expect("list");
        assert_eq!(collections.len(), 2);
        assert_eq!(collections["notas"], 12);
        assert_eq!(collections["cerrado"], 0);
    }

    #[tokio::test]
    async fn delete_reports_acknowledgement_and_absence() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(DELETE).path("/notas");
                then.status(200).json_body(json!({ "acknowledged": true }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(DELETE).path("/missing");
                then.status(404).json_body(json!({ "error": "index_not_found_exception" }));
            })
            .await;

        let service = service(&server);
        assert!(service.delete_collection("notas").await.expect("delete"));
        assert!(!service.delete_collection("missing").await.expect("delete"));
    }

    #[tokio::test]
    async fn server_errors_surface_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/notas/_doc");
                then.status(500).body("boom");
            })
            .await;

        let error = service(&server)
            .index_document("notas", None, &json!({}))
            .await
            .expect_err("failure");
        assert!(matches!(
            error,
            SearchIndexError::UnexpectedStatus { status, .. } if status == StatusCode::INTERNAL_SERVER_ERROR
        ));
    }

    #[test]
    fn collection_names_are_validated() {
        assert!(validate_collection("notas-clinicas").is_ok());
        for name in ["", "_hidden", "con espacio", "a/b"] {
            assert!(validate_collection(name).is_err(), "{name:?} accepted");
        }
    }

    #[test]
    fn base_url_is_normalized() {
        assert_eq!(
            normalize_base_url("http://localhost:9200/").expect("url"),
            "http://localhost:9200/"
        );
    }

    #[test]
    fn endpoint_segments_are_percent_encoded() {
        let url = endpoint_url("http://h:9200/", &["notas", "_doc", "p#1/a?b"]).expect("url");
        assert_eq!(url.as_str(), "http://h:9200/notas/_doc/p%231%2Fa%3Fb");
        let nested = endpoint_url("http://h:9200/os", &["_cat", "indices"]).expect("url");
        assert_eq!(nested.as_str(), "http://h:9200/os/_cat/indices");
    }
}

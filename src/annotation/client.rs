//! HTTP client for the annotation provider.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::annotation::AnnotationProvider;
use crate::annotation::types::{Annotation, AnnotationClientError};

/// Calls `POST {base_url}/annotate` with `{"text": …}` and decodes an [`Annotation`].
pub struct HttpAnnotationClient {
    pub(crate) client: Client,
    pub(crate) base_url: String,
}

impl HttpAnnotationClient {
    /// Build a client for the provider at `base_url`.
    pub fn new(base_url: &str) -> Result<Self, AnnotationClientError> {
        let parsed = reqwest::Url::parse(base_url)
            .map_err(|err| AnnotationClientError::InvalidUrl(err.to_string()))?;
        let client = Client::builder()
            .user_agent("docanalytics/annotation")
            .build()?;
        tracing::debug!(url = %parsed, "Initialized annotation client");
        Ok(Self {
            client,
            base_url: parsed.to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/annotate", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl AnnotationProvider for HttpAnnotationClient {
    async fn annotate(&self, text: &str) -> Result<Annotation, AnnotationClientError> {
        let response = self
            .client
            .post(self.endpoint())
            .json(&json!({ "text": text }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = AnnotationClientError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "Annotation request failed");
            return Err(error);
        }

        let annotation: Annotation = response.json().await?;
        tracing::debug!(
            tokens = annotation.tokens.len(),
            entities = annotation.entities.len(),
            sentences = annotation.sentences.len(),
            triples = annotation.triples.len(),
            "Annotation received"
        );
        Ok(annotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};

    fn client(server: &MockServer) -> HttpAnnotationClient {
        HttpAnnotationClient::new(&server.base_url()).expect("client")
    }

    #[tokio::test]
    async fn decodes_partial_annotations() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/annotate")
                    .json_body(json!({ "text": "Juan tiene fiebre." }));
                then.status(200).json_body(json!({
                    "tokens": [
                        { "word": "Juan", "lemma": "juan", "pos": "PROPN", "ner": "PERSON" },
                        { "word": "tiene", "lemma": "tener", "pos": "VERB" }
                    ],
                    "sentences": [ { "text": "Juan tiene fiebre.", "score": 1 } ]
                }));
            })
            .await;

        let annotation = client(&server)
            .annotate("Juan tiene fiebre.")
            .await
            .expect("annotation");

        mock.assert_async().await;
        assert_eq!(annotation.tokens.len(), 2);
        assert_eq!(annotation.tokens[0].entity_label(), Some("PERSON"));
        assert_eq!(annotation.tokens[1].entity_label(), None);
        assert!(annotation.entities.is_empty());
        assert_eq!(annotation.sentences[0].score, 1);
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/annotate");
                then.status(503).body("loading models");
            })
            .await;

        let error = client(&server).annotate("x").await.expect_err("failure");
        assert!(matches!(
            error,
            AnnotationClientError::UnexpectedStatus { body, .. } if body == "loading models"
        ));
    }

    #[test]
    fn rejects_malformed_url() {
        assert!(matches!(
            HttpAnnotationClient::new("not a url"),
            Err(AnnotationClientError::InvalidUrl(_))
        ));
    }
}

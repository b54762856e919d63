//! OpenAiProvider -- concrete [`EmbeddingProvider`] implementation for
//! OpenAI-compatible APIs.
//!
//! Covers the synchronous embeddings endpoint plus the file and batch
//! surfaces the asynchronous path needs: `POST /embeddings`, `POST /files`
//! (multipart, `purpose=batch`), `POST /batches`, `GET /batches/{id}`, and
//! `GET /files/{id}/content`.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is never logged
//! or included in `Debug` output.

pub mod types;

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use embatch_core::provider::EmbeddingProvider;
use embatch_types::batch::BatchJob;
use embatch_types::error::EmbedError;
use embatch_types::wire::{EMBEDDINGS_ENDPOINT, EmbeddingsBody, EmbeddingsResponseBody};

use types::{CreateBatchRequest, FileObject};

/// OpenAI-compatible embedding provider.
///
/// Implements [`EmbeddingProvider`] against `{base_url}` (default
/// `https://api.openai.com/v1`) with bearer authentication. One provider
/// value serves one model against one account.
///
/// # API Key Security
///
/// The API key is stored as a [`SecretString`] and is only exposed when
/// constructing request headers. It never appears in Debug output, Display
/// output, or tracing logs.
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

impl OpenAiProvider {
    /// Create a new provider for one model.
    pub fn new(api_key: SecretString, model: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            api_key,
            base_url: "https://api.openai.com/v1".to_string(),
            model,
        }
    }

    /// Override the base URL (useful for testing, proxies, or compatible
    /// third-party endpoints).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Build the full API URL for a given path.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.api_key.expose_secret())
    }

    /// Map a non-success response to the error taxonomy, folding the
    /// response body into the message where there is one.
    async fn error_for_status(response: reqwest::Response) -> EmbedError {
        let status = response.status();
        let error_body = response.text().await.unwrap_or_default();
        match status.as_u16() {
            401 => EmbedError::AuthenticationFailed,
            429 => EmbedError::RateLimited {
                retry_after_ms: None,
            },
            _ => EmbedError::Provider {
                message: format!("HTTP {status}: {error_body}"),
            },
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, EmbedError> {
        let response = request
            .header("authorization", self.bearer())
            .send()
            .await
            .map_err(|e| EmbedError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(Self::error_for_status(response).await);
        }
        Ok(response)
    }
}

// OpenAiProvider intentionally does NOT derive Debug so the api_key field
// can never leak through formatting, even by accident.

impl EmbeddingProvider for OpenAiProvider {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed_sync(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let body = EmbeddingsBody {
            model: &self.model,
            input: texts,
        };
        let response = self
            .send(self.client.post(self.url("/embeddings")).json(&body))
            .await?;

        // Unknown response fields (object, usage, ...) are ignored.
        let parsed: EmbeddingsResponseBody = response
            .json()
            .await
            .map_err(|e| EmbedError::Deserialization(format!("embeddings response: {e}")))?;

        if parsed.data.len() != texts.len() {
            return Err(EmbedError::CountMismatch {
                expected: texts.len(),
                actual: parsed.data.len(),
            });
        }
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }

    async fn upload(&self, name: &str, content: String) -> Result<String, EmbedError> {
        let part = reqwest::multipart::Part::text(content).file_name(name.to_string());
        let form = reqwest::multipart::Form::new()
            .text("purpose", "batch")
            .part("file", part);

        let response = self
            .send(self.client.post(self.url("/files")).multipart(form))
            .await?;

        let file: FileObject = response
            .json()
            .await
            .map_err(|e| EmbedError::Deserialization(format!("file object: {e}")))?;
        tracing::debug!(file_id = %file.id, name, "Uploaded batch input file");
        Ok(file.id)
    }

    async fn create_job(
        &self,
        input_file_id: &str,
        completion_window: &str,
    ) -> Result<String, EmbedError> {
        let body = CreateBatchRequest {
            input_file_id,
            endpoint: EMBEDDINGS_ENDPOINT,
            completion_window,
        };
        let response = self
            .send(self.client.post(self.url("/batches")).json(&body))
            .await?;

        let job: BatchJob = response
            .json()
            .await
            .map_err(|e| EmbedError::Deserialization(format!("batch object: {e}")))?;
        Ok(job.id)
    }

    async fn job_status(&self, job_id: &str) -> Result<BatchJob, EmbedError> {
        let response = self
            .send(self.client.get(self.url(&format!("/batches/{job_id}"))))
            .await?;

        response
            .json()
            .await
            .map_err(|e| EmbedError::Deserialization(format!("batch object: {e}")))
    }

    async fn fetch_content(&self, file_id: &str) -> Result<String, EmbedError> {
        let response = self
            .send(
                self.client
                    .get(self.url(&format!("/files/{file_id}/content"))),
            )
            .await?;

        response.text().await.map_err(|e| EmbedError::Provider {
            message: format!("failed to read file content: {e}"),
        })
    }
}

//! EmbeddingProvider trait definition.
//!
//! This is the core abstraction the pipeline drives. Uses native async fn
//! in traits (RPITIT, Rust 2024 edition) for all operations.
//!
//! Implementations live in embatch-infra (e.g., `OpenAiProvider`).

use embatch_types::batch::BatchJob;
use embatch_types::error::EmbedError;

/// Trait for embedding provider backends.
///
/// Covers both paths the pipeline takes: the synchronous embeddings
/// endpoint (`embed_sync`) and the file-backed batch surface
/// (`upload` / `create_job` / `job_status` / `fetch_content`).
///
/// Model and credentials are bound at construction, so one provider value
/// serves one model against one account.
pub trait EmbeddingProvider: Send + Sync {
    /// Model identifier requests are issued against.
    fn model(&self) -> &str;

    /// Embed all texts in one synchronous request, preserving input order.
    fn embed_sync(
        &self,
        texts: &[String],
    ) -> impl std::future::Future<Output = Result<Vec<Vec<f32>>, EmbedError>> + Send;

    /// Upload a batch input file; returns the provider file id.
    fn upload(
        &self,
        name: &str,
        content: String,
    ) -> impl std::future::Future<Output = Result<String, EmbedError>> + Send;

    /// Create a batch job over an uploaded input file; returns the job id.
    fn create_job(
        &self,
        input_file_id: &str,
        completion_window: &str,
    ) -> impl std::future::Future<Output = Result<String, EmbedError>> + Send;

    /// Fetch the current status snapshot of a batch job.
    fn job_status(
        &self,
        job_id: &str,
    ) -> impl std::future::Future<Output = Result<BatchJob, EmbedError>> + Send;

    /// Download the content of a provider file (e.g., batch output).
    fn fetch_content(
        &self,
        file_id: &str,
    ) -> impl std::future::Future<Output = Result<String, EmbedError>> + Send;
}

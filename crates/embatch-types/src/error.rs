//! Error taxonomy for the embedding pipeline.

use crate::batch::BatchStatus;

/// Errors from embedding operations.
///
/// Transient transport and rate-limit errors are eligible for retry; terminal
/// job outcomes and malformed provider output are final. [`EmbedError::is_transient`]
/// is the single classification point the retry policy consults.
#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("batch job {job_id} ended as {status}")]
    JobFailed { job_id: String, status: BatchStatus },

    #[error("batch job {job_id} completed without an output file")]
    MissingOutput { job_id: String },

    #[error("malformed batch output line {line}: {reason}")]
    MalformedOutput { line: usize, reason: String },

    #[error("unrecognized custom id '{0}' in batch output")]
    UnknownCustomId(String),

    #[error("duplicate custom id '{0}' in batch output")]
    DuplicateCustomId(String),

    #[error("batch output missing {missing} of {expected} request chunks")]
    IncompleteOutput { missing: usize, expected: usize },

    #[error("expected {expected} embeddings, got {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("failed to encode batch payload: {0}")]
    Encode(String),
}

impl EmbedError {
    /// Whether retrying the same operation could plausibly succeed.
    ///
    /// Transient (retried): Provider, RateLimited.
    /// Final (surfaced immediately): auth failures, terminal job outcomes,
    /// malformed or incomplete output, encoding failures.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            EmbedError::Provider { .. } | EmbedError::RateLimited { .. }
        )
    }
}

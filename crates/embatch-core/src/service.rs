//! EmbeddingService -- the pipeline front door.
//!
//! Chooses the synchronous or batch path by total input size, drives batches
//! strictly sequentially, and concatenates per-batch results in plan order.
//! Failures are logged here and surface as `Err`; partial results are never
//! returned.

use embatch_types::config::EmbedConfig;
use embatch_types::error::EmbedError;

use crate::assembler::assemble;
use crate::counter::TokenCounter;
use crate::job::run_batch_job;
use crate::planner::plan;
use crate::provider::EmbeddingProvider;
use crate::retry::RetryPolicy;

/// Embeds arbitrarily large text collections against one provider.
///
/// Holds the provider (model and credentials bound at construction), the
/// token counter used for planning, and the pipeline configuration.
pub struct EmbeddingService<P, C> {
    provider: P,
    counter: C,
    config: EmbedConfig,
    retry: RetryPolicy,
}

impl<P: EmbeddingProvider, C: TokenCounter> EmbeddingService<P, C> {
    pub fn new(provider: P, counter: C, config: EmbedConfig) -> Self {
        let retry = RetryPolicy::new(&config.retry);
        Self {
            provider,
            counter,
            config,
            retry,
        }
    }

    /// Embed every text, returning one vector per input in input order.
    ///
    /// Inputs whose total size stays under the sync threshold go through the
    /// synchronous endpoint in a single request; larger inputs take the
    /// file-backed batch path. Either way the returned vector count equals
    /// the input count, or the call fails as a whole.
    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let total_bytes: usize = texts.iter().map(|t| t.len()).sum();
        tracing::info!(
            texts = texts.len(),
            total_bytes,
            model = self.provider.model(),
            "Embedding request received"
        );

        let result = if total_bytes < self.config.sync_threshold_bytes {
            tracing::debug!(total_bytes, "Below sync threshold, using synchronous endpoint");
            self.embed_via_sync(texts).await
        } else {
            tracing::debug!(total_bytes, "At or above sync threshold, using batch path");
            self.embed_via_batches(texts).await
        };

        match result {
            Ok(embeddings) => {
                if embeddings.len() != texts.len() {
                    let err = EmbedError::CountMismatch {
                        expected: texts.len(),
                        actual: embeddings.len(),
                    };
                    tracing::error!(error = %err, "Embedding pipeline failed");
                    return Err(err);
                }
                Ok(embeddings)
            }
            Err(err) => {
                tracing::error!(error = %err, "Embedding pipeline failed");
                Err(err)
            }
        }
    }

    async fn embed_via_sync(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        self.retry
            .run("sync embedding request", || self.provider.embed_sync(texts))
            .await
    }

    async fn embed_via_batches(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        // Fresh run id per invocation keeps custom ids from colliding across
        // concurrent runs against the same provider account.
        let run_id = uuid::Uuid::now_v7().simple().to_string();
        let batches = plan(texts, &self.counter, &run_id, &self.config);
        tracing::info!(%run_id, batches = batches.len(), "Planned batch run");

        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in &batches {
            let raw = self
                .retry
                .run("batch job", || {
                    run_batch_job(&self.provider, batch, &run_id, &self.config)
                })
                .await?;
            let batch_embeddings = assemble(&raw, &batch.chunks)?;
            tracing::debug!(
                batch_idx = batch.batch_idx,
                vectors = batch_embeddings.len(),
                "Assembled batch output"
            );
            embeddings.extend(batch_embeddings);
        }
        Ok(embeddings)
    }
}

//! One batch, submit through fetch.
//!
//! Serializes a planned batch to its line-delimited payload, uploads it,
//! creates the provider job, polls until a terminal status, and downloads
//! the raw output. The caller wraps the whole sequence in the retry policy;
//! parsing happens afterwards in the assembler, so malformed output never
//! triggers a resubmission.

use std::time::Duration;

use embatch_types::batch::{Batch, BatchJob, BatchStatus};
use embatch_types::config::EmbedConfig;
use embatch_types::error::EmbedError;
use embatch_types::wire::{BATCH_METHOD, BatchRequestLine, EMBEDDINGS_ENDPOINT, EmbeddingsBody};

use crate::provider::EmbeddingProvider;

// ---------------------------------------------------------------------------
// JobDisposition
// ---------------------------------------------------------------------------

/// What to do with a job after one status poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobDisposition {
    /// Job completed and produced output; fetch it.
    Ready { output_file_id: String },
    /// Job still moving through the provider pipeline; sleep and poll again.
    Wait,
    /// Job reached a terminal state with nothing to fetch.
    Fatal,
}

/// Classify one polled job snapshot.
///
/// `completed` without an output file is terminal too: the status will never
/// change again, so waiting on it would spin forever.
pub fn disposition(job: &BatchJob) -> JobDisposition {
    match job.status {
        BatchStatus::Completed => match &job.output_file_id {
            Some(id) => JobDisposition::Ready {
                output_file_id: id.clone(),
            },
            None => JobDisposition::Fatal,
        },
        BatchStatus::Failed | BatchStatus::Expired | BatchStatus::Cancelled => JobDisposition::Fatal,
        BatchStatus::Validating
        | BatchStatus::InProgress
        | BatchStatus::Finalizing
        | BatchStatus::Cancelling => JobDisposition::Wait,
    }
}

// ---------------------------------------------------------------------------
// Payload encoding + job driving
// ---------------------------------------------------------------------------

/// Serialize a batch's chunks to the line-delimited request payload.
pub fn encode_batch_payload(batch: &Batch, model: &str) -> Result<String, EmbedError> {
    let mut lines = Vec::with_capacity(batch.chunks.len());
    for chunk in &batch.chunks {
        let line = BatchRequestLine {
            custom_id: chunk.custom_id.to_string(),
            method: BATCH_METHOD,
            url: EMBEDDINGS_ENDPOINT,
            body: EmbeddingsBody {
                model,
                input: &chunk.texts,
            },
        };
        lines.push(serde_json::to_string(&line).map_err(|e| EmbedError::Encode(e.to_string()))?);
    }
    Ok(lines.join("\n"))
}

/// Drive one batch from upload to raw output content.
///
/// Suspends between status polls; returns only once the job is terminal.
/// Terminal outcomes other than `completed`-with-output become errors that
/// the retry policy will not re-enter on.
pub async fn run_batch_job<P: EmbeddingProvider>(
    provider: &P,
    batch: &Batch,
    run_id: &str,
    config: &EmbedConfig,
) -> Result<String, EmbedError> {
    let payload = encode_batch_payload(batch, provider.model())?;
    let file_name = format!("embed-{}-{:06}.jsonl", run_id, batch.batch_idx);

    let input_file_id = provider.upload(&file_name, payload).await?;
    tracing::debug!(
        batch_idx = batch.batch_idx,
        %input_file_id,
        "Uploaded batch input file"
    );

    let job_id = provider
        .create_job(&input_file_id, &config.completion_window)
        .await?;
    tracing::info!(
        batch_idx = batch.batch_idx,
        %job_id,
        texts = batch.text_count(),
        tokens = batch.token_count,
        "Created batch job"
    );

    let interval = Duration::from_secs(config.poll_interval_secs);
    loop {
        let job = provider.job_status(&job_id).await?;
        match disposition(&job) {
            JobDisposition::Ready { output_file_id } => {
                tracing::info!(batch_idx = batch.batch_idx, %job_id, "Batch job completed");
                return provider.fetch_content(&output_file_id).await;
            }
            JobDisposition::Wait => {
                tracing::info!(
                    batch_idx = batch.batch_idx,
                    %job_id,
                    status = %job.status,
                    "Batch job not finished, waiting"
                );
                tokio::time::sleep(interval).await;
            }
            JobDisposition::Fatal => {
                return Err(match job.status {
                    BatchStatus::Completed => EmbedError::MissingOutput { job_id: job.id },
                    status => EmbedError::JobFailed {
                        job_id: job.id,
                        status,
                    },
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embatch_types::batch::{CustomId, RequestChunk};
    use std::collections::VecDeque;
    use std::future::Future;
    use std::sync::Mutex;

    // --- Mock provider with a scripted status sequence ---

    struct MockProvider {
        statuses: Mutex<VecDeque<BatchStatus>>,
        /// What a completed job reports as its output file.
        output_file_id: Option<String>,
        output: String,
        uploads: Mutex<Vec<(String, String)>>,
    }

    impl MockProvider {
        fn scripted(statuses: &[BatchStatus]) -> Self {
            Self {
                statuses: Mutex::new(statuses.iter().copied().collect()),
                output_file_id: Some("out-1".to_string()),
                output: "raw output".to_string(),
                uploads: Mutex::new(Vec::new()),
            }
        }
    }

    impl EmbeddingProvider for MockProvider {
        fn model(&self) -> &str {
            "text-embedding-3-small"
        }

        fn embed_sync(
            &self,
            _texts: &[String],
        ) -> impl Future<Output = Result<Vec<Vec<f32>>, EmbedError>> + Send {
            async {
                Err(EmbedError::Provider {
                    message: "sync endpoint not expected here".to_string(),
                })
            }
        }

        fn upload(
            &self,
            name: &str,
            content: String,
        ) -> impl Future<Output = Result<String, EmbedError>> + Send {
            self.uploads.lock().unwrap().push((name.to_string(), content));
            async { Ok("file-1".to_string()) }
        }

        fn create_job(
            &self,
            input_file_id: &str,
            _completion_window: &str,
        ) -> impl Future<Output = Result<String, EmbedError>> + Send {
            assert_eq!(input_file_id, "file-1");
            async { Ok("job-1".to_string()) }
        }

        fn job_status(
            &self,
            job_id: &str,
        ) -> impl Future<Output = Result<BatchJob, EmbedError>> + Send {
            let status = self
                .statuses
                .lock()
                .unwrap()
                .pop_front()
                .expect("status script exhausted");
            let output_file_id = if status == BatchStatus::Completed {
                self.output_file_id.clone()
            } else {
                None
            };
            let job = BatchJob {
                id: job_id.to_string(),
                status,
                output_file_id,
            };
            async move { Ok(job) }
        }

        fn fetch_content(
            &self,
            file_id: &str,
        ) -> impl Future<Output = Result<String, EmbedError>> + Send {
            assert_eq!(file_id, "out-1");
            let output = self.output.clone();
            async move { Ok(output) }
        }
    }

    fn make_batch() -> Batch {
        Batch {
            batch_idx: 0,
            token_count: 3,
            chunks: vec![
                RequestChunk {
                    custom_id: CustomId::new("run", 0, 0),
                    texts: vec!["alpha".to_string(), "bravo".to_string()],
                },
                RequestChunk {
                    custom_id: CustomId::new("run", 0, 2),
                    texts: vec!["charlie".to_string()],
                },
            ],
        }
    }

    // --- disposition ---

    #[test]
    fn test_disposition_completed_with_output_is_ready() {
        let job = BatchJob {
            id: "job-1".to_string(),
            status: BatchStatus::Completed,
            output_file_id: Some("out-1".to_string()),
        };
        assert_eq!(
            disposition(&job),
            JobDisposition::Ready {
                output_file_id: "out-1".to_string()
            }
        );
    }

    #[test]
    fn test_disposition_completed_without_output_is_fatal() {
        let job = BatchJob {
            id: "job-1".to_string(),
            status: BatchStatus::Completed,
            output_file_id: None,
        };
        assert_eq!(disposition(&job), JobDisposition::Fatal);
    }

    #[test]
    fn test_disposition_terminal_failures_are_fatal() {
        for status in [BatchStatus::Failed, BatchStatus::Expired, BatchStatus::Cancelled] {
            let job = BatchJob {
                id: "job-1".to_string(),
                status,
                output_file_id: None,
            };
            assert_eq!(disposition(&job), JobDisposition::Fatal, "{status}");
        }
    }

    #[test]
    fn test_disposition_non_terminal_statuses_wait() {
        for status in [
            BatchStatus::Validating,
            BatchStatus::InProgress,
            BatchStatus::Finalizing,
            BatchStatus::Cancelling,
        ] {
            let job = BatchJob {
                id: "job-1".to_string(),
                status,
                output_file_id: None,
            };
            assert_eq!(disposition(&job), JobDisposition::Wait, "{status}");
        }
    }

    // --- encode_batch_payload ---

    #[test]
    fn test_encode_batch_payload_one_line_per_chunk() {
        let payload = encode_batch_payload(&make_batch(), "text-embedding-3-small").unwrap();
        let lines: Vec<&str> = payload.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["custom_id"], "embed-run-000000-00000000");
        assert_eq!(first["method"], "POST");
        assert_eq!(first["url"], "/v1/embeddings");
        assert_eq!(first["body"]["model"], "text-embedding-3-small");
        assert_eq!(first["body"]["input"][0], "alpha");

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["custom_id"], "embed-run-000000-00000002");
        assert_eq!(second["body"]["input"][0], "charlie");
    }

    // --- run_batch_job ---

    #[tokio::test(start_paused = true)]
    async fn test_run_batch_job_polls_to_completion() {
        let provider = MockProvider::scripted(&[
            BatchStatus::Validating,
            BatchStatus::InProgress,
            BatchStatus::Completed,
        ]);
        let batch = make_batch();
        let config = EmbedConfig::default();

        let raw = run_batch_job(&provider, &batch, "run", &config).await.unwrap();
        assert_eq!(raw, "raw output");

        let uploads = provider.uploads.lock().unwrap();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].0, "embed-run-000000.jsonl");
        assert!(uploads[0].1.contains("embed-run-000000-00000000"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_batch_job_surfaces_expired_as_job_failed() {
        let provider =
            MockProvider::scripted(&[BatchStatus::Validating, BatchStatus::Expired]);
        let batch = make_batch();
        let config = EmbedConfig::default();

        let err = run_batch_job(&provider, &batch, "run", &config).await.unwrap_err();
        match err {
            EmbedError::JobFailed { job_id, status } => {
                assert_eq!(job_id, "job-1");
                assert_eq!(status, BatchStatus::Expired);
            }
            other => panic!("expected JobFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_run_batch_job_fails_immediately_on_failed_status() {
        let provider = MockProvider::scripted(&[BatchStatus::Failed]);
        let batch = make_batch();
        let config = EmbedConfig::default();

        let err = run_batch_job(&provider, &batch, "run", &config).await.unwrap_err();
        assert!(matches!(
            err,
            EmbedError::JobFailed {
                status: BatchStatus::Failed,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_run_batch_job_completed_without_output_is_missing_output() {
        let mut provider = MockProvider::scripted(&[BatchStatus::Completed]);
        provider.output_file_id = None;
        let batch = make_batch();
        let config = EmbedConfig::default();

        let err = run_batch_job(&provider, &batch, "run", &config).await.unwrap_err();
        assert!(matches!(err, EmbedError::MissingOutput { .. }));
    }
}

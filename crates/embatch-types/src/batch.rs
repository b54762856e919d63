//! Batch plan and job entities for embatch.
//!
//! These types model the shapes of a planned embedding run: texts grouped
//! into request chunks, chunks grouped into token-bounded batches, and the
//! provider-side job each batch becomes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier tying one batch output line back to its place in the plan.
///
/// Rendered as `embed-{run_id}-{batch_idx}-{chunk_offset}` with the numeric
/// fields zero-padded to fixed widths (6 and 8 digits), so sorting rendered
/// ids as plain strings reproduces `(batch_idx, chunk_offset)` order. The
/// string sort is the only reassembly mechanism; the padding is what keeps
/// it correct past single digits.
///
/// `run_id` scopes ids to one pipeline invocation so concurrent runs against
/// the same provider account cannot collide.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CustomId {
    pub run_id: String,
    pub batch_idx: usize,
    /// Starting text offset of the chunk within its batch.
    pub chunk_offset: usize,
}

impl CustomId {
    pub fn new(run_id: impl Into<String>, batch_idx: usize, chunk_offset: usize) -> Self {
        Self {
            run_id: run_id.into(),
            batch_idx,
            chunk_offset,
        }
    }
}

impl fmt::Display for CustomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "embed-{}-{:06}-{:08}",
            self.run_id, self.batch_idx, self.chunk_offset
        )
    }
}

impl FromStr for CustomId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Split from the right so run ids containing '-' still parse.
        let mut tail = s.rsplitn(3, '-');
        let offset = tail.next().ok_or_else(|| invalid_custom_id(s))?;
        let batch = tail.next().ok_or_else(|| invalid_custom_id(s))?;
        let head = tail.next().ok_or_else(|| invalid_custom_id(s))?;

        let run_id = head.strip_prefix("embed-").ok_or_else(|| invalid_custom_id(s))?;
        if run_id.is_empty() {
            return Err(invalid_custom_id(s));
        }

        let batch_idx = batch.parse::<usize>().map_err(|_| invalid_custom_id(s))?;
        let chunk_offset = offset.parse::<usize>().map_err(|_| invalid_custom_id(s))?;

        Ok(CustomId {
            run_id: run_id.to_string(),
            batch_idx,
            chunk_offset,
        })
    }
}

fn invalid_custom_id(s: &str) -> String {
    format!("invalid custom id: '{s}'")
}

/// Up to `chunk_size` texts packaged as one request line within a batch.
#[derive(Debug, Clone)]
pub struct RequestChunk {
    pub custom_id: CustomId,
    pub texts: Vec<String>,
}

/// An ordered run of request chunks submitted to the provider as one job.
///
/// The summed token estimate stays within the configured limit except when a
/// single text alone exceeds it, in which case that text is the batch's only
/// content (texts are never split).
#[derive(Debug, Clone)]
pub struct Batch {
    pub batch_idx: usize,
    /// Summed token estimate across all texts in this batch.
    pub token_count: usize,
    pub chunks: Vec<RequestChunk>,
}

impl Batch {
    /// Number of texts across all chunks.
    pub fn text_count(&self) -> usize {
        self.chunks.iter().map(|c| c.texts.len()).sum()
    }
}

/// Lifecycle status of a provider batch job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Validating,
    InProgress,
    Finalizing,
    Completed,
    Failed,
    Expired,
    Cancelling,
    Cancelled,
}

impl BatchStatus {
    /// Whether the job has reached a state it will never leave.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BatchStatus::Completed | BatchStatus::Failed | BatchStatus::Expired | BatchStatus::Cancelled
        )
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchStatus::Validating => write!(f, "validating"),
            BatchStatus::InProgress => write!(f, "in_progress"),
            BatchStatus::Finalizing => write!(f, "finalizing"),
            BatchStatus::Completed => write!(f, "completed"),
            BatchStatus::Failed => write!(f, "failed"),
            BatchStatus::Expired => write!(f, "expired"),
            BatchStatus::Cancelling => write!(f, "cancelling"),
            BatchStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for BatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "validating" => Ok(BatchStatus::Validating),
            "in_progress" => Ok(BatchStatus::InProgress),
            "finalizing" => Ok(BatchStatus::Finalizing),
            "completed" => Ok(BatchStatus::Completed),
            "failed" => Ok(BatchStatus::Failed),
            "expired" => Ok(BatchStatus::Expired),
            "cancelling" => Ok(BatchStatus::Cancelling),
            "cancelled" => Ok(BatchStatus::Cancelled),
            other => Err(format!("invalid batch status: '{other}'")),
        }
    }
}

/// Provider-side view of a batch job, as returned by job creation and polling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchJob {
    pub id: String,
    pub status: BatchStatus,
    /// Present once the job has completed and produced output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_file_id: Option<String>,
}

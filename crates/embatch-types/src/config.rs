//! Pipeline configuration with serde defaults.

use serde::{Deserialize, Serialize};

/// Tunables for the embedding pipeline.
///
/// Defaults mirror the provider's batch constraints: one million estimated
/// tokens per job, 2048 inputs per embeddings request, and a 500 KB
/// total-input cutover from the synchronous endpoint to the batch path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedConfig {
    /// Maximum summed token estimate per batch job.
    #[serde(default = "default_token_limit")]
    pub token_limit: usize,
    /// Maximum number of texts per request chunk.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Total input bytes below which the synchronous endpoint is used.
    #[serde(default = "default_sync_threshold_bytes")]
    pub sync_threshold_bytes: usize,
    /// Seconds between job status polls.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Completion window requested at job creation. Advisory; jobs may
    /// finish earlier or expire at the provider's discretion.
    #[serde(default = "default_completion_window")]
    pub completion_window: String,
    /// Retry policy for transient provider errors.
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            token_limit: default_token_limit(),
            chunk_size: default_chunk_size(),
            sync_threshold_bytes: default_sync_threshold_bytes(),
            poll_interval_secs: default_poll_interval_secs(),
            completion_window: default_completion_window(),
            retry: RetryConfig::default(),
        }
    }
}

fn default_token_limit() -> usize {
    1_000_000
}

fn default_chunk_size() -> usize {
    2048
}

fn default_sync_threshold_bytes() -> usize {
    500_000
}

fn default_poll_interval_secs() -> u64 {
    60
}

fn default_completion_window() -> String {
    "24h".to_string()
}

/// Bounded exponential backoff parameters for transient errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// First backoff delay in seconds; doubles on each further retry.
    #[serde(default = "default_base_delay_secs")]
    pub base_delay_secs: u64,
    /// Ceiling on any single backoff delay in seconds.
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_secs: default_base_delay_secs(),
            max_delay_secs: default_max_delay_secs(),
        }
    }
}

fn default_max_attempts() -> u32 {
    5
}

fn default_base_delay_secs() -> u64 {
    4
}

fn default_max_delay_secs() -> u64 {
    10
}

//! CLI command definitions and dispatch for the `embatch` binary.
//!
//! Uses clap derive macros for argument parsing. Two subcommands:
//! `embatch embed` runs the full pipeline against a provider, and
//! `embatch plan` is an offline dry-run of the batch partition.

pub mod embed;
pub mod plan;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Compute embeddings for large text collections via the Batch API.
#[derive(Parser)]
#[command(name = "embatch", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of plain text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Embed every line of a text file, writing one vector per line.
    Embed {
        /// File of newline-delimited input texts; blank lines are skipped.
        input: PathBuf,

        #[command(flatten)]
        pipeline: PipelineArgs,

        /// API key for the provider.
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        api_key: String,

        /// Override the provider base URL.
        #[arg(long)]
        base_url: Option<String>,

        /// Write the embeddings (JSON array of float arrays) to this file
        /// instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Show how an input file would partition into batches, without any
    /// network access.
    Plan {
        /// File of newline-delimited input texts; blank lines are skipped.
        input: PathBuf,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },
}

/// Pipeline tunables shared by `embed` and `plan`. Unset flags fall back to
/// the `EmbedConfig` defaults.
#[derive(Debug, clap::Args)]
pub struct PipelineArgs {
    /// Embedding model to plan and request against.
    #[arg(long, default_value = "text-embedding-3-small")]
    pub model: String,

    /// Maximum summed token estimate per batch job.
    #[arg(long)]
    pub token_limit: Option<usize>,

    /// Maximum number of texts per request chunk.
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Total input bytes below which the synchronous endpoint is used.
    #[arg(long)]
    pub sync_threshold_bytes: Option<usize>,

    /// Seconds between job status polls.
    #[arg(long)]
    pub poll_interval_secs: Option<u64>,
}

impl PipelineArgs {
    /// Overlay the set flags onto the default configuration.
    pub fn to_config(&self) -> embatch_types::config::EmbedConfig {
        let mut config = embatch_types::config::EmbedConfig::default();
        if let Some(token_limit) = self.token_limit {
            config.token_limit = token_limit;
        }
        if let Some(chunk_size) = self.chunk_size {
            config.chunk_size = chunk_size;
        }
        if let Some(threshold) = self.sync_threshold_bytes {
            config.sync_threshold_bytes = threshold;
        }
        if let Some(interval) = self.poll_interval_secs {
            config.poll_interval_secs = interval;
        }
        config
    }
}

/// Read newline-delimited input texts, skipping blank lines.
pub async fn read_texts(path: &std::path::Path) -> anyhow::Result<Vec<String>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let texts: Vec<String> = content
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    tracing::debug!(path = %path.display(), texts = texts.len(), "Read input file");
    Ok(texts)
}

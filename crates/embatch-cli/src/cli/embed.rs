//! `embatch embed` -- run the full pipeline over an input file.

use std::path::{Path, PathBuf};

use anyhow::Result;
use secrecy::SecretString;

use embatch_core::service::EmbeddingService;
use embatch_infra::openai::OpenAiProvider;
use embatch_infra::tokenizer::TiktokenCounter;
use embatch_types::config::EmbedConfig;

pub struct EmbedArgs {
    pub input: PathBuf,
    pub model: String,
    pub api_key: SecretString,
    pub base_url: Option<String>,
    pub output: Option<PathBuf>,
    pub config: EmbedConfig,
}

pub async fn run(args: EmbedArgs, json: bool, quiet: bool) -> Result<()> {
    let texts = super::read_texts(&args.input).await?;
    if texts.is_empty() {
        anyhow::bail!("no input texts in {}", args.input.display());
    }

    let mut provider = OpenAiProvider::new(args.api_key, args.model.clone());
    if let Some(base_url) = args.base_url {
        provider = provider.with_base_url(base_url);
    }
    let counter = TiktokenCounter::for_model(&args.model);
    let service = EmbeddingService::new(provider, counter, args.config);

    let embeddings = service.embed(&texts).await?;
    let dimension = embeddings.first().map(Vec::len).unwrap_or(0);

    match &args.output {
        Some(path) => {
            write_embeddings(path, &embeddings).await?;
            tracing::info!(path = %path.display(), vectors = embeddings.len(), "Wrote embeddings");
            if json {
                let summary = serde_json::json!({
                    "texts": texts.len(),
                    "dimension": dimension,
                    "output": path,
                });
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else if !quiet {
                println!(
                    "Embedded {} texts (dimension {}) -> {}",
                    texts.len(),
                    dimension,
                    path.display()
                );
            }
        }
        None => {
            // No output file: the vectors themselves go to stdout.
            println!("{}", serde_json::to_string(&embeddings)?);
        }
    }
    Ok(())
}

async fn write_embeddings(path: &Path, embeddings: &[Vec<f32>]) -> Result<()> {
    let serialized = serde_json::to_string(embeddings)?;
    tokio::fs::write(path, serialized)
        .await
        .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", path.display()))
}

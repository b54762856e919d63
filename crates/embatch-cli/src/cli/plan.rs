//! `embatch plan` -- offline dry-run of the batch partition.

use std::path::PathBuf;

use anyhow::Result;

use embatch_core::planner::plan;
use embatch_infra::tokenizer::TiktokenCounter;
use embatch_types::batch::Batch;
use embatch_types::config::EmbedConfig;

pub struct PlanArgs {
    pub input: PathBuf,
    pub model: String,
    pub config: EmbedConfig,
}

pub async fn run(args: PlanArgs, json: bool, quiet: bool) -> Result<()> {
    let texts = super::read_texts(&args.input).await?;
    let counter = TiktokenCounter::for_model(&args.model);
    let run_id = uuid::Uuid::now_v7().simple().to_string();
    let batches = plan(&texts, &counter, &run_id, &args.config);

    let total_bytes: usize = texts.iter().map(|t| t.len()).sum();
    let path = if total_bytes < args.config.sync_threshold_bytes {
        "sync"
    } else {
        "batch"
    };

    if json {
        let summary = serde_json::json!({
            "texts": texts.len(),
            "total_bytes": total_bytes,
            "path": path,
            "batches": batches.iter().map(batch_summary).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else if !quiet {
        println!(
            "{} texts, {} bytes total -> {} path, {} batch(es)",
            texts.len(),
            total_bytes,
            path,
            batches.len()
        );
        for batch in &batches {
            println!(
                "  batch {:>3}: {:>6} texts in {:>3} chunk(s), ~{} tokens",
                batch.batch_idx,
                batch.text_count(),
                batch.chunks.len(),
                batch.token_count
            );
        }
    }
    Ok(())
}

fn batch_summary(batch: &Batch) -> serde_json::Value {
    serde_json::json!({
        "batch_idx": batch.batch_idx,
        "texts": batch.text_count(),
        "chunks": batch.chunks.len(),
        "tokens": batch.token_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use embatch_types::batch::{CustomId, RequestChunk};

    #[test]
    fn test_batch_summary_fields() {
        let batch = Batch {
            batch_idx: 2,
            token_count: 840,
            chunks: vec![RequestChunk {
                custom_id: CustomId::new("run", 2, 0),
                texts: vec!["a".to_string(), "b".to_string()],
            }],
        };

        let summary = batch_summary(&batch);
        assert_eq!(summary["batch_idx"], 2);
        assert_eq!(summary["texts"], 2);
        assert_eq!(summary["chunks"], 1);
        assert_eq!(summary["tokens"], 840);
    }
}

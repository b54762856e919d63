//! Batch planning: partition texts into token-bounded batches of chunks.
//!
//! Planning is a pure function of its inputs. It allocates the full plan up
//! front rather than yielding batches lazily, so a retried submission can
//! re-read the same `Batch` without re-walking the source texts.

use embatch_types::batch::{Batch, CustomId, RequestChunk};
use embatch_types::config::EmbedConfig;

use crate::counter::TokenCounter;

/// Partition `texts` into token-bounded batches of request chunks.
///
/// Walks the texts once with a running token sum. A batch closes when it is
/// non-empty and the next text would push the sum past `config.token_limit`;
/// a text whose own estimate exceeds the limit therefore sits alone in its
/// own batch. Texts are never split or reordered, every produced batch holds
/// at least one text, and empty input yields no batches.
pub fn plan<C: TokenCounter>(
    texts: &[String],
    counter: &C,
    run_id: &str,
    config: &EmbedConfig,
) -> Vec<Batch> {
    // A zero chunk size would make chunking spin; treat it as one text per chunk.
    let chunk_size = config.chunk_size.max(1);

    let mut batches = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut current_tokens = 0usize;

    for text in texts {
        let tokens = counter.count(text);
        if !current.is_empty() && current_tokens + tokens > config.token_limit {
            let batch_idx = batches.len();
            batches.push(build_batch(batch_idx, current, current_tokens, run_id, chunk_size));
            current = Vec::new();
            current_tokens = 0;
        }
        current.push(text.clone());
        current_tokens += tokens;
    }

    if !current.is_empty() {
        let batch_idx = batches.len();
        batches.push(build_batch(batch_idx, current, current_tokens, run_id, chunk_size));
    }

    tracing::debug!(
        batches = batches.len(),
        texts = texts.len(),
        token_limit = config.token_limit,
        "Planned batch partition"
    );

    batches
}

/// Split one closed batch's texts into request chunks of at most
/// `chunk_size` texts, numbered by their starting offset within the batch.
fn build_batch(
    batch_idx: usize,
    texts: Vec<String>,
    token_count: usize,
    run_id: &str,
    chunk_size: usize,
) -> Batch {
    let mut chunks = Vec::with_capacity(texts.len().div_ceil(chunk_size));
    let mut offset = 0usize;
    let mut remaining = texts;

    while !remaining.is_empty() {
        let take = remaining.len().min(chunk_size);
        let rest = remaining.split_off(take);
        chunks.push(RequestChunk {
            custom_id: CustomId::new(run_id, batch_idx, offset),
            texts: remaining,
        });
        offset += take;
        remaining = rest;
    }

    Batch {
        batch_idx,
        token_count,
        chunks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One token per byte keeps the arithmetic in tests exact.
    struct ByteCounter;

    impl TokenCounter for ByteCounter {
        fn count(&self, text: &str) -> usize {
            text.len()
        }
    }

    fn make_config(token_limit: usize, chunk_size: usize) -> EmbedConfig {
        EmbedConfig {
            token_limit,
            chunk_size,
            ..EmbedConfig::default()
        }
    }

    fn text_of_len(len: usize) -> String {
        "x".repeat(len)
    }

    /// All texts of a plan, flattened back in chunk order.
    fn flatten(batches: &[Batch]) -> Vec<String> {
        batches
            .iter()
            .flat_map(|b| b.chunks.iter().flat_map(|c| c.texts.iter().cloned()))
            .collect()
    }

    #[test]
    fn test_empty_input_yields_no_batches() {
        let batches = plan(&[], &ByteCounter, "run", &make_config(100, 10));
        assert!(batches.is_empty());
    }

    #[test]
    fn test_everything_fits_in_one_batch() {
        let texts = vec![text_of_len(10), text_of_len(10), text_of_len(10)];
        let batches = plan(&texts, &ByteCounter, "run", &make_config(100, 10));

        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].batch_idx, 0);
        assert_eq!(batches[0].token_count, 30);
        assert_eq!(batches[0].chunks.len(), 1);
        assert_eq!(batches[0].chunks[0].custom_id, CustomId::new("run", 0, 0));
        assert_eq!(flatten(&batches), texts);
    }

    #[test]
    fn test_batch_closes_when_limit_would_be_exceeded() {
        let texts = vec![text_of_len(10), text_of_len(10), text_of_len(10)];
        let batches = plan(&texts, &ByteCounter, "run", &make_config(25, 10));

        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].text_count(), 2);
        assert_eq!(batches[0].token_count, 20);
        assert_eq!(batches[1].text_count(), 1);
        assert_eq!(batches[1].token_count, 10);
        assert_eq!(flatten(&batches), texts);
    }

    #[test]
    fn test_exact_fit_does_not_close_early() {
        // 10 + 10 + 10 == limit exactly; "would exceed" means strictly greater.
        let texts = vec![text_of_len(10), text_of_len(10), text_of_len(10)];
        let batches = plan(&texts, &ByteCounter, "run", &make_config(30, 10));

        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].token_count, 30);
    }

    #[test]
    fn test_oversized_text_gets_its_own_batch() {
        let texts = vec![text_of_len(5), text_of_len(100), text_of_len(5)];
        let batches = plan(&texts, &ByteCounter, "run", &make_config(50, 10));

        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].text_count(), 1);
        assert_eq!(batches[1].text_count(), 1);
        assert_eq!(batches[1].token_count, 100);
        assert_eq!(batches[2].text_count(), 1);
        assert_eq!(flatten(&batches), texts);
    }

    #[test]
    fn test_oversized_first_text_does_not_produce_empty_batch() {
        let texts = vec![text_of_len(100), text_of_len(5)];
        let batches = plan(&texts, &ByteCounter, "run", &make_config(50, 10));

        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].text_count(), 1);
        assert_eq!(batches[0].token_count, 100);
        assert_eq!(batches[1].text_count(), 1);
        for batch in &batches {
            assert!(batch.text_count() > 0);
        }
    }

    #[test]
    fn test_chunks_split_by_size_and_numbered_by_offset() {
        let texts: Vec<String> = (0..5).map(|_| text_of_len(2)).collect();
        let batches = plan(&texts, &ByteCounter, "run", &make_config(100, 2));

        assert_eq!(batches.len(), 1);
        let chunks = &batches[0].chunks;
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].custom_id.chunk_offset, 0);
        assert_eq!(chunks[0].texts.len(), 2);
        assert_eq!(chunks[1].custom_id.chunk_offset, 2);
        assert_eq!(chunks[1].texts.len(), 2);
        assert_eq!(chunks[2].custom_id.chunk_offset, 4);
        assert_eq!(chunks[2].texts.len(), 1);
    }

    #[test]
    fn test_no_batch_exceeds_limit_except_oversized_singletons() {
        let sizes = [30usize, 30, 30, 30, 90, 10, 10];
        let texts: Vec<String> = sizes.iter().map(|&s| text_of_len(s)).collect();
        let limit = 60;
        let batches = plan(&texts, &ByteCounter, "run", &make_config(limit, 10));

        for batch in &batches {
            if batch.token_count > limit {
                assert_eq!(batch.text_count(), 1, "only a lone oversized text may exceed the limit");
            }
        }
        assert_eq!(flatten(&batches), texts);
    }

    #[test]
    fn test_custom_ids_sort_in_plan_order() {
        // Enough texts to push batch indices and offsets past one digit.
        let texts: Vec<String> = (0..30).map(|_| text_of_len(4)).collect();
        let batches = plan(&texts, &ByteCounter, "run", &make_config(8, 1));

        let in_plan_order: Vec<String> = batches
            .iter()
            .flat_map(|b| b.chunks.iter().map(|c| c.custom_id.to_string()))
            .collect();

        let mut sorted = in_plan_order.clone();
        sorted.sort();
        assert_eq!(sorted, in_plan_order);
    }

    #[test]
    fn test_batch_indices_ascend_from_zero() {
        let texts: Vec<String> = (0..4).map(|_| text_of_len(10)).collect();
        let batches = plan(&texts, &ByteCounter, "run", &make_config(10, 10));

        assert_eq!(batches.len(), 4);
        for (i, batch) in batches.iter().enumerate() {
            assert_eq!(batch.batch_idx, i);
        }
    }

    #[test]
    fn test_zero_token_texts_share_a_batch() {
        // Texts under four bytes estimate to zero tokens with the heuristic;
        // they must still all be planned.
        let counter = crate::counter::HeuristicCounter;
        let texts = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let batches = plan(&texts, &counter, "run", &make_config(1_000_000, 2048));

        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].token_count, 0);
        assert_eq!(batches[0].text_count(), 3);
    }
}

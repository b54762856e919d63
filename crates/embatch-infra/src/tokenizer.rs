//! Tiktoken-backed token counter with graceful degradation.
//!
//! Construction tries the model-specific encoding first, then the generic
//! `cl100k_base` encoding, and finally gives up on BPE entirely, in which
//! case counting falls back to the length heuristic. Counting itself never
//! fails; each degradation is logged once, at construction.

use embatch_core::counter::{HeuristicCounter, TokenCounter};
use tiktoken_rs::{CoreBPE, cl100k_base, get_bpe_from_model};

/// BPE token counter for one model.
pub struct TiktokenCounter {
    bpe: Option<CoreBPE>,
}

impl TiktokenCounter {
    /// Build the best available counter for `model`.
    pub fn for_model(model: &str) -> Self {
        let bpe = match get_bpe_from_model(model) {
            Ok(bpe) => Some(bpe),
            Err(err) => {
                tracing::warn!(
                    model,
                    error = %err,
                    "No tokenizer for model, falling back to cl100k_base"
                );
                match cl100k_base() {
                    Ok(bpe) => Some(bpe),
                    Err(err) => {
                        tracing::warn!(
                            error = %err,
                            "cl100k_base unavailable, falling back to length heuristic"
                        );
                        None
                    }
                }
            }
        };
        Self { bpe }
    }
}

impl TokenCounter for TiktokenCounter {
    fn count(&self, text: &str) -> usize {
        match &self.bpe {
            Some(bpe) => bpe.encode_with_special_tokens(text).len(),
            None => HeuristicCounter.count(text),
        }
    }
}

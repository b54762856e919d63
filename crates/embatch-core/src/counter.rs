//! Token counting abstraction for batch planning.

/// Estimates token counts for batch sizing.
///
/// Counting never fails: implementations degrade to cruder estimates
/// rather than erroring, since an estimate only has to keep batches under
/// the provider's token ceiling, not bill-accurately.
pub trait TokenCounter: Send + Sync {
    /// Estimated token count for one text.
    fn count(&self, text: &str) -> usize;
}

/// Length-based estimate: one token per four bytes, rounded down.
///
/// The last tier of the counting chain (used when no tokenizer data is
/// available), and the counter planning unit tests run against.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicCounter;

impl TokenCounter for HeuristicCounter {
    fn count(&self, text: &str) -> usize {
        text.len() / 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heuristic_rounds_down() {
        let counter = HeuristicCounter;
        assert_eq!(counter.count(""), 0);
        assert_eq!(counter.count("abc"), 0);
        assert_eq!(counter.count("abcd"), 1);
        assert_eq!(counter.count("abcdefghi"), 2);
    }
}

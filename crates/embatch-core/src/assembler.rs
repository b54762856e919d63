//! Reassembly of batch output into input-ordered embeddings.
//!
//! Output lines come back in whatever order the provider finished them.
//! Sorting by the fixed-width `custom_id` string restores plan order; that
//! string sort is the sole ordering mechanism, which is why the ids are
//! zero-padded.

use std::collections::HashMap;

use embatch_types::batch::{CustomId, RequestChunk};
use embatch_types::error::EmbedError;
use embatch_types::wire::BatchOutputLine;

/// Parse a batch output file and flatten it back to the batch's text order.
///
/// Every returned id must parse as a [`CustomId`], and every expected chunk
/// must appear exactly once with exactly as many embeddings as it had texts.
/// Anything else (malformed line, unparseable, unknown, or duplicate id,
/// short or missing record) fails the whole batch; there is no partial
/// credit.
pub fn assemble(raw: &str, chunks: &[RequestChunk]) -> Result<Vec<Vec<f32>>, EmbedError> {
    let mut records: Vec<(String, Vec<Vec<f32>>)> = Vec::with_capacity(chunks.len());

    for (idx, line) in raw.lines().map(str::trim).enumerate() {
        if line.is_empty() {
            continue;
        }
        let parsed: BatchOutputLine =
            serde_json::from_str(line).map_err(|e| EmbedError::MalformedOutput {
                line: idx + 1,
                reason: e.to_string(),
            })?;
        // Ids the planner could never have generated fail with the line
        // number; syntactically valid ids from some other run fall through
        // to the UnknownCustomId check below.
        parsed
            .custom_id
            .parse::<CustomId>()
            .map_err(|reason| EmbedError::MalformedOutput {
                line: idx + 1,
                reason,
            })?;
        let embeddings = parsed
            .response
            .body
            .data
            .into_iter()
            .map(|d| d.embedding)
            .collect();
        records.push((parsed.custom_id, embeddings));
    }

    records.sort_by(|a, b| a.0.cmp(&b.0));

    // Sorted, so duplicates are adjacent.
    for pair in records.windows(2) {
        if pair[0].0 == pair[1].0 {
            return Err(EmbedError::DuplicateCustomId(pair[0].0.clone()));
        }
    }

    let mut expected: HashMap<String, usize> = chunks
        .iter()
        .map(|c| (c.custom_id.to_string(), c.texts.len()))
        .collect();

    let mut flattened = Vec::new();
    for (custom_id, embeddings) in records {
        let Some(text_count) = expected.remove(&custom_id) else {
            return Err(EmbedError::UnknownCustomId(custom_id));
        };
        if embeddings.len() != text_count {
            return Err(EmbedError::CountMismatch {
                expected: text_count,
                actual: embeddings.len(),
            });
        }
        flattened.extend(embeddings);
    }

    if !expected.is_empty() {
        return Err(EmbedError::IncompleteOutput {
            missing: expected.len(),
            expected: chunks.len(),
        });
    }

    Ok(flattened)
}

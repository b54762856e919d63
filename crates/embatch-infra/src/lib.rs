//! Infrastructure implementations for embatch.
//!
//! Concrete backends for the ports defined in `embatch-core`: the
//! OpenAI-compatible HTTP provider and the tiktoken-backed token counter.

pub mod openai;
pub mod tokenizer;

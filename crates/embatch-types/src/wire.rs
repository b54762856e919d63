//! Line-delimited wire shapes for the batch endpoint.
//!
//! One [`BatchRequestLine`] per request chunk goes up in the input file; one
//! [`BatchOutputLine`] per chunk comes back in the output file. The inner
//! request body and `data[].embedding` response shape are the same ones the
//! synchronous embeddings endpoint uses, so both paths share these types.

use serde::{Deserialize, Serialize};

/// Method recorded on every batch request line.
pub const BATCH_METHOD: &str = "POST";

/// Relative endpoint every batch request line targets. Also the `endpoint`
/// field of the job-creation call.
pub const EMBEDDINGS_ENDPOINT: &str = "/v1/embeddings";

/// One line of the uploaded batch input file.
#[derive(Debug, Clone, Serialize)]
pub struct BatchRequestLine<'a> {
    pub custom_id: String,
    pub method: &'a str,
    pub url: &'a str,
    pub body: EmbeddingsBody<'a>,
}

/// Body of an embeddings request.
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingsBody<'a> {
    pub model: &'a str,
    pub input: &'a [String],
}

/// One line of the downloaded batch output file.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchOutputLine {
    pub custom_id: String,
    pub response: BatchOutputResponse,
}

/// Per-line response envelope in the batch output file.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchOutputResponse {
    pub body: EmbeddingsResponseBody,
}

/// Response body of an embeddings request, one `data` entry per input text.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingsResponseBody {
    pub data: Vec<EmbeddingObject>,
}

/// A single embedding vector in a response `data` array.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingObject {
    pub embedding: Vec<f32>,
}

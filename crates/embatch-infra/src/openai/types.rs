//! OpenAI-compatible API types for the file and batch surfaces.
//!
//! These are provider-specific request/response structures used for HTTP
//! communication only. The shared wire-line shapes (request lines, output
//! lines, embedding objects) live in `embatch_types::wire`; job snapshots
//! deserialize straight into `embatch_types::batch::BatchJob`.

use serde::{Deserialize, Serialize};

/// Response body of `POST /files`. Only the id matters to the pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct FileObject {
    pub id: String,
}

/// Request body of `POST /batches`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateBatchRequest<'a> {
    pub input_file_id: &'a str,
    pub endpoint: &'a str,
    pub completion_window: &'a str,
}

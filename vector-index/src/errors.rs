//! Unified error types for the crate.

use reqwest::StatusCode;
use thiserror::Error;

/// Top-level error for vector index operations.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Invalid or missing configuration.
    #[error("config error: {0}")]
    Config(String),

    /// HTTP transport errors (connect, TLS, client timeout).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Upstream answered with a non-success status.
    #[error("HTTP {status} from {url}: {snippet}")]
    HttpStatus {
        status: StatusCode,
        url: String,
        snippet: String,
    },

    /// Response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// A match came back without the expected `text` metadata.
    #[error("match '{id}' has no text metadata")]
    MissingText { id: String },

    /// Qdrant client errors (wrapped).
    #[error("qdrant error: {0}")]
    Qdrant(String),
}

impl IndexError {
    /// `true` when the index answered, but the payload lacked the expected structure.
    pub fn is_malformed(&self) -> bool {
        matches!(self, IndexError::Decode(_) | IndexError::MissingText { .. })
    }
}

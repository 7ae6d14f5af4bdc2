//! Typed errors for the rag-pipeline crate.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Error reported by a collaborator behind one of the port traits.
#[derive(Debug, Clone, Error)]
pub enum PortError {
    /// The collaborator could not be reached or answered with an error.
    #[error("{0}")]
    Upstream(String),

    /// The collaborator answered, but the payload lacked the expected structure.
    #[error("{0}")]
    Malformed(String),
}

impl From<ai_llm_service::AiLlmError> for PortError {
    fn from(e: ai_llm_service::AiLlmError) -> Self {
        if e.is_malformed() {
            PortError::Malformed(e.to_string())
        } else {
            PortError::Upstream(e.to_string())
        }
    }
}

impl From<vector_index::IndexError> for PortError {
    fn from(e: vector_index::IndexError) -> Self {
        if e.is_malformed() {
            PortError::Malformed(e.to_string())
        } else {
            PortError::Upstream(e.to_string())
        }
    }
}

/// Pipeline stage that talks to an external collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Embedding,
    Retrieval,
    Generation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Embedding => f.write_str("embedding"),
            Stage::Retrieval => f.write_str("retrieval"),
            Stage::Generation => f.write_str("generation"),
        }
    }
}

/// Single consolidated failure of a query run.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PipelineError {
    #[error("embedding failed: {0}")]
    Embedding(String),

    #[error("retrieval failed: {0}")]
    Retrieval(String),

    #[error("generation failed: {0}")]
    Generation(String),

    /// A collaborator answered without the fields the pipeline needs.
    #[error("malformed {stage} response: {detail}")]
    Malformed { stage: Stage, detail: String },
}

impl PipelineError {
    /// Maps a port failure to the taxonomy of the stage it happened in.
    pub fn from_port(stage: Stage, err: PortError) -> Self {
        match err {
            PortError::Malformed(detail) => PipelineError::Malformed { stage, detail },
            PortError::Upstream(msg) => Self::stage_failure(stage, msg),
        }
    }

    /// Stage timed out; reported as that stage's failure kind.
    pub fn timeout(stage: Stage, limit: Duration) -> Self {
        Self::stage_failure(stage, format!("timed out after {limit:?}"))
    }

    fn stage_failure(stage: Stage, msg: String) -> Self {
        match stage {
            Stage::Embedding => PipelineError::Embedding(msg),
            Stage::Retrieval => PipelineError::Retrieval(msg),
            Stage::Generation => PipelineError::Generation(msg),
        }
    }

    /// Machine-readable code returned to HTTP callers.
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::Embedding(_) => "EMBEDDING_FAILURE",
            PipelineError::Retrieval(_) => "RETRIEVAL_FAILURE",
            PipelineError::Generation(_) => "GENERATION_FAILURE",
            PipelineError::Malformed { .. } => "MALFORMED_RESPONSE",
        }
    }
}

/// Invalid pipeline settings (startup).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid number in {var}: {value:?}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{var} must be at least 1")]
    Zero { var: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_errors_map_by_stage() {
        let e = PipelineError::from_port(Stage::Retrieval, PortError::Upstream("503".into()));
        assert_eq!(e, PipelineError::Retrieval("503".into()));
        assert_eq!(e.code(), "RETRIEVAL_FAILURE");

        let e = PipelineError::from_port(Stage::Generation, PortError::Malformed("no content".into()));
        assert_eq!(e.code(), "MALFORMED_RESPONSE");
        assert_eq!(e.to_string(), "malformed generation response: no content");
    }

    #[test]
    fn timeouts_keep_stage_kind() {
        let e = PipelineError::timeout(Stage::Embedding, Duration::from_secs(30));
        assert_eq!(e.code(), "EMBEDDING_FAILURE");
        assert!(e.to_string().contains("timed out after 30s"));
    }
}

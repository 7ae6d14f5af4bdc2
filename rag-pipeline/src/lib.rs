//! RAG question answering over injected collaborators.
//!
//! Public API: [`QueryPipeline::run`]. It embeds the question, retrieves the
//! top-K passages, builds a QA prompt, asks the chat model with
//! log-probabilities enabled, and returns the answer with a confidence score.

pub mod cfg;
pub mod confidence;
pub mod prompt;
pub mod ports;

mod api_types;
mod error;
mod pipeline;

pub use api_types::QueryAnswer;
pub use cfg::PipelineConfig;
pub use error::{ConfigError, PipelineError, PortError, Stage};
pub use pipeline::QueryPipeline;
pub use ports::{Embedder, Generator, PortFuture, Retriever};

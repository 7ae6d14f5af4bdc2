//! Collaborator interfaces used by the pipeline, plus adapters for the
//! production clients.

use std::{future::Future, pin::Pin};

use ai_llm_service::{ChatCompletion, ChatMessage, LlmServiceProfiles};
use vector_index::{RetrievedPassage, VectorIndexClient};

use crate::error::PortError;

pub type PortFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, PortError>> + Send + 'a>>;

/// Turns query text into an embedding vector.
pub trait Embedder: Send + Sync {
    fn embed<'a>(&'a self, text: &'a str) -> PortFuture<'a, Vec<f32>>;
}

/// Nearest-neighbor lookup returning passages best first.
pub trait Retriever: Send + Sync {
    fn retrieve<'a>(&'a self, vector: &'a [f32], top_k: u64) -> PortFuture<'a, Vec<RetrievedPassage>>;
}

/// Chat completion with optional per-token log-probabilities.
pub trait Generator: Send + Sync {
    fn generate<'a>(
        &'a self,
        messages: &'a [ChatMessage],
        logprobs: bool,
    ) -> PortFuture<'a, ChatCompletion>;
}

impl Embedder for LlmServiceProfiles {
    fn embed<'a>(&'a self, text: &'a str) -> PortFuture<'a, Vec<f32>> {
        Box::pin(async move { Ok(LlmServiceProfiles::embed(self, text).await?) })
    }
}

impl Generator for LlmServiceProfiles {
    fn generate<'a>(
        &'a self,
        messages: &'a [ChatMessage],
        logprobs: bool,
    ) -> PortFuture<'a, ChatCompletion> {
        Box::pin(async move { Ok(self.chat(messages, logprobs).await?) })
    }
}

impl Retriever for VectorIndexClient {
    fn retrieve<'a>(&'a self, vector: &'a [f32], top_k: u64) -> PortFuture<'a, Vec<RetrievedPassage>> {
        Box::pin(async move { Ok(self.query(vector, top_k).await?) })
    }
}

//! In-crate fakes for handler tests.

use std::{
    future::Future,
    pin::Pin,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use ai_llm_service::{ChatCompletion, ChatMessage, TokenLogProb, health_service::HealthStatus};
use rag_pipeline::{
    Embedder, Generator, PipelineConfig, PortError, PortFuture, QueryPipeline, Retriever,
};
use vector_index::RetrievedPassage;

use crate::core::app_state::{AppState, UpstreamHealth};

pub struct FakeUpstream(pub Vec<HealthStatus>);

impl UpstreamHealth for FakeUpstream {
    fn probe(&self) -> Pin<Box<dyn Future<Output = Vec<HealthStatus>> + Send + '_>> {
        Box::pin(async move { self.0.clone() })
    }
}

/// Embedder, index and chat model in one fake with call counters.
pub struct FakeCollaborators {
    embeds: AtomicUsize,
    chats: AtomicUsize,
    index_fails: bool,
    logprobs: Option<Vec<f64>>,
}

impl FakeCollaborators {
    pub fn answering(logprobs: Option<Vec<f64>>) -> Arc<Self> {
        Arc::new(Self {
            embeds: AtomicUsize::new(0),
            chats: AtomicUsize::new(0),
            index_fails: false,
            logprobs,
        })
    }

    pub fn failing_index() -> Arc<Self> {
        Arc::new(Self {
            embeds: AtomicUsize::new(0),
            chats: AtomicUsize::new(0),
            index_fails: true,
            logprobs: None,
        })
    }

    pub fn embed_calls(&self) -> usize {
        self.embeds.load(Ordering::SeqCst)
    }

    pub fn chat_calls(&self) -> usize {
        self.chats.load(Ordering::SeqCst)
    }
}

impl Embedder for FakeCollaborators {
    fn embed<'a>(&'a self, _text: &'a str) -> PortFuture<'a, Vec<f32>> {
        Box::pin(async move {
            self.embeds.fetch_add(1, Ordering::SeqCst);
            Ok(vec![0.1, 0.2, 0.3])
        })
    }
}

impl Retriever for FakeCollaborators {
    fn retrieve<'a>(&'a self, _vector: &'a [f32], _top_k: u64) -> PortFuture<'a, Vec<RetrievedPassage>> {
        Box::pin(async move {
            if self.index_fails {
                return Err(PortError::Upstream("HTTP 503 from index".into()));
            }
            Ok(vec![RetrievedPassage {
                text: "GDPR grants the right to erasure.".into(),
                score: 0.9,
            }])
        })
    }
}

impl Generator for FakeCollaborators {
    fn generate<'a>(
        &'a self,
        _messages: &'a [ChatMessage],
        _logprobs: bool,
    ) -> PortFuture<'a, ChatCompletion> {
        Box::pin(async move {
            self.chats.fetch_add(1, Ordering::SeqCst);
            Ok(ChatCompletion {
                text: "The right to erasure.".into(),
                logprobs: self.logprobs.as_ref().map(|lps| {
                    lps.iter()
                        .map(|lp| TokenLogProb {
                            token: "t".into(),
                            logprob: *lp,
                        })
                        .collect()
                }),
            })
        })
    }
}

pub fn state_with(upstream: FakeUpstream) -> Arc<AppState> {
    let fakes = FakeCollaborators::answering(None);
    Arc::new(AppState {
        pipeline: pipeline_over(&fakes),
        upstream: Arc::new(upstream),
    })
}

pub fn state_with_pipeline(fakes: &Arc<FakeCollaborators>) -> Arc<AppState> {
    Arc::new(AppState {
        pipeline: pipeline_over(fakes),
        upstream: Arc::new(FakeUpstream(Vec::new())),
    })
}

fn pipeline_over(fakes: &Arc<FakeCollaborators>) -> QueryPipeline {
    QueryPipeline::new(
        fakes.clone(),
        fakes.clone(),
        fakes.clone(),
        PipelineConfig::default(),
    )
}

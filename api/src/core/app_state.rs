use std::{future::Future, pin::Pin, sync::Arc, time::Instant};

use ai_llm_service::{
    LlmServiceProfiles,
    config::default_config::{config_chat, config_embedding},
    health_service::HealthStatus,
};
use rag_pipeline::{PipelineConfig, QueryPipeline};
use tracing::info;
use vector_index::{IndexConfig, VectorIndexClient};

use crate::error_handler::AppError;

/// Timeout for each upstream health probe.
const HEALTH_TIMEOUT_SECS: u64 = 5;

/// Snapshot of every external dependency.
pub trait UpstreamHealth: Send + Sync {
    fn probe(&self) -> Pin<Box<dyn Future<Output = Vec<HealthStatus>> + Send + '_>>;
}

/// Production probes: LLM/embedding providers plus the vector index.
pub struct Upstreams {
    llm: Arc<LlmServiceProfiles>,
    index: Arc<VectorIndexClient>,
}

impl UpstreamHealth for Upstreams {
    fn probe(&self) -> Pin<Box<dyn Future<Output = Vec<HealthStatus>> + Send + '_>> {
        Box::pin(async move {
            let mut statuses = self.llm.health_all().await;
            statuses.push(index_status(&self.index).await);
            statuses
        })
    }
}

async fn index_status(index: &VectorIndexClient) -> HealthStatus {
    let (provider, endpoint) = index.describe();
    let start = Instant::now();
    let res = index.ping().await;
    let latency_ms = start.elapsed().as_millis();
    let (ok, message) = match res {
        Ok(()) => (true, "index reachable".to_string()),
        Err(e) => (false, e.to_string()),
    };
    HealthStatus {
        provider: format!("{provider:?}"),
        endpoint,
        model: Some(index.config().index_name.clone()),
        ok,
        latency_ms,
        message,
    }
}

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: QueryPipeline,
    pub upstream: Arc<dyn UpstreamHealth>,
}

impl AppState {
    /// Builds every client once from environment variables.
    ///
    /// # Errors
    /// Any invalid or missing setting, or a failed index host lookup.
    pub async fn from_env() -> Result<Self, AppError> {
        let llm = Arc::new(LlmServiceProfiles::new(
            config_chat()?,
            config_embedding()?,
            Some(HEALTH_TIMEOUT_SECS),
        )?);
        let index = Arc::new(VectorIndexClient::connect(IndexConfig::from_env()?).await?);
        let pipeline_cfg = PipelineConfig::from_env()?;

        let (chat, embedding) = llm.profiles();
        info!(
            chat_provider = ?chat.provider,
            chat_model = %chat.model,
            embedding_provider = ?embedding.provider,
            embedding_model = %embedding.model,
            index = %index.config().index_name,
            top_k = pipeline_cfg.top_k,
            "clients ready"
        );

        let pipeline = QueryPipeline::new(llm.clone(), index.clone(), llm.clone(), pipeline_cfg);
        Ok(Self {
            pipeline,
            upstream: Arc::new(Upstreams { llm, index }),
        })
    }
}

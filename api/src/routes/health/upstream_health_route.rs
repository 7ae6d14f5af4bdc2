//! GET /api/health/upstream — probes providers and the vector index.

use std::sync::Arc;

use axum::{Json, extract::State};
use tracing::warn;

use crate::{
    core::app_state::AppState, routes::health::health_response::UpstreamHealthResponse,
};

/// Handler: GET /api/health/upstream
///
/// Always answers 200; failing probes only flip `status` to `degraded`.
pub async fn upstream_health(State(state): State<Arc<AppState>>) -> Json<UpstreamHealthResponse> {
    let statuses = state.upstream.probe().await;
    for s in statuses.iter().filter(|s| !s.ok) {
        warn!(provider = %s.provider, endpoint = %s.endpoint, message = %s.message, "upstream unhealthy");
    }
    Json(UpstreamHealthResponse::from_statuses(statuses))
}

#[cfg(test)]
mod tests {
    use ai_llm_service::health_service::HealthStatus;

    use super::*;
    use crate::test_support::{FakeUpstream, state_with};

    fn status(provider: &str, ok: bool) -> HealthStatus {
        HealthStatus {
            provider: provider.into(),
            endpoint: "http://localhost".into(),
            model: None,
            ok,
            latency_ms: 1,
            message: if ok { "ok".into() } else { "connection refused".into() },
        }
    }

    #[tokio::test]
    async fn all_ok_is_healthy() {
        let state = state_with(FakeUpstream(vec![status("OpenAI", true), status("Pinecone", true)]));
        let Json(body) = upstream_health(State(state)).await;
        assert_eq!(body.status, "healthy");
        assert_eq!(body.providers.len(), 2);
    }

    #[tokio::test]
    async fn any_failure_is_degraded() {
        let state = state_with(FakeUpstream(vec![status("OpenAI", true), status("Pinecone", false)]));
        let Json(body) = upstream_health(State(state)).await;
        assert_eq!(body.status, "degraded");
    }
}

use ai_llm_service::health_service::HealthStatus;
use serde::Serialize;

/// Response payload for GET /api/health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// Response payload for GET /api/health/upstream.
#[derive(Debug, Serialize)]
pub struct UpstreamHealthResponse {
    /// `healthy` when every probe succeeded, otherwise `degraded`.
    pub status: &'static str,
    pub providers: Vec<HealthStatus>,
}

impl UpstreamHealthResponse {
    pub fn from_statuses(providers: Vec<HealthStatus>) -> Self {
        let status = if providers.iter().all(|p| p.ok) {
            "healthy"
        } else {
            "degraded"
        };
        Self { status, providers }
    }
}

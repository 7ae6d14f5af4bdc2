//! GET /api/health — liveness probe.

use axum::Json;

use crate::routes::health::health_response::HealthResponse;

/// Handler: GET /api/health
///
/// # Example
/// ```bash
/// curl http://127.0.0.1:8000/api/health
/// ```
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        message: "API is healthy and ready to serve requests",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_healthy() {
        let Json(body) = health().await;
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "status": "healthy",
                "message": "API is healthy and ready to serve requests"
            })
        );
    }
}

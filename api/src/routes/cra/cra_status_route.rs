//! GET /cra/status — static service descriptor.

use axum::Json;

use crate::routes::cra::cra_request::CraStatusResponse;

pub const SERVICE_VERSION: &str = "1.0.0";

/// Handler: GET /cra/status
pub async fn cra_status() -> Json<CraStatusResponse> {
    Json(CraStatusResponse {
        status: "operational",
        version: SERVICE_VERSION,
        features: [
            "query_processing",
            "context_analysis",
            "response_generation",
        ],
    })
}

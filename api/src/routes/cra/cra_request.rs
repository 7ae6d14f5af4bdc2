use serde::{Deserialize, Serialize};

/// Request payload for /cra/query.
#[derive(Debug, Deserialize)]
pub struct CraQueryRequest {
    /// Natural language question about the regulation.
    pub query: String,
}

/// Response payload for /cra/status.
#[derive(Debug, Serialize)]
pub struct CraStatusResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub features: [&'static str; 3],
}

//! HTTP surface of the CRA assistant.

use std::{env, sync::Arc};

mod core;
mod error_handler;
mod middleware_layer;
mod routes;

#[cfg(test)]
mod test_support;

pub use error_handler::AppError;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tokio::signal;
use tracing::{error, info};

use crate::{
    core::app_state::AppState,
    middleware_layer::{json_error_mapper::json_error_mapper, request_context::request_context},
    routes::{
        cra::{cra_query_route::cra_query, cra_status_route::cra_status},
        health::{health_route::health, upstream_health_route::upstream_health},
        landing_route::landing,
    },
};

pub const DEFAULT_API_ADDRESS: &str = "0.0.0.0:8000";

/// Builds every client from the environment and serves until Ctrl+C / SIGTERM.
///
/// # Errors
/// Configuration errors, bind failures, or a server I/O error.
pub async fn start() -> Result<(), AppError> {
    let host_url = env::var("API_ADDRESS")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_ADDRESS.to_string());

    let state = Arc::new(AppState::from_env().await?);
    let app = router(state);

    // Bind to address
    let listener = tokio::net::TcpListener::bind(&host_url)
        .await
        .map_err(AppError::Bind)?;
    info!(address = %host_url, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("server stopped");
    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(landing))
        .route("/api/health", get(health))
        .route("/api/health/upstream", get(upstream_health))
        .route("/cra/query", post(cra_query))
        .route("/cra/status", get(cra_status))
        .layer(middleware::from_fn(json_error_mapper))
        .layer(middleware::from_fn(request_context))
        .with_state(state)
}

/// Resolves on Ctrl+C or SIGTERM; in-flight requests are drained by axum.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}

//! Health check endpoints for Kubernetes-style probes.
//!
//! - `/livez` - Basic liveness probe (immediate 200, no checks)
//! - `/readyz` - Readiness probe (one-item scan against the store)

use axum::{extract::State, http::StatusCode};
use singletable_core::storage::PageRequest;

use crate::state::AppState;

/// GET /livez - Basic liveness probe.
#[axum::debug_handler]
pub async fn livez() -> StatusCode {
    StatusCode::OK
}

/// GET /readyz - 200 when the store answers, 503 otherwise.
#[axum::debug_handler]
pub async fn readyz(State(state): State<AppState>) -> StatusCode {
    let probe = PageRequest::new(Some(1), None).unwrap_or_default();
    match state.store.scan(&probe).await {
        Ok(_) => StatusCode::OK,
        Err(err) => {
            tracing::warn!(error = %err, "Store is not ready");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

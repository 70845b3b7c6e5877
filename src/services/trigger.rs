//! Trigger HTTP surface.
//!
//! The orchestrator is poked from outside: an upstream price feed calls
//! `/price_update` whenever fresh market data lands, and the handler kicks
//! off a run in the background without holding the caller's connection open.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{Result, TransactorError};
use crate::services::Orchestrator;

pub fn trigger_router(orchestrator: Arc<Orchestrator>) -> Router {
    Router::new()
        .route("/price_update", get(price_update).post(price_update))
        .route("/health", get(health))
        .with_state(orchestrator)
}

/// Serve the trigger endpoints until the process is stopped.
pub async fn serve(orchestrator: Arc<Orchestrator>, port: u16) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "Trigger server listening");
    axum::serve(listener, trigger_router(orchestrator))
        .await
        .map_err(TransactorError::Io)?;
    Ok(())
}

/// Fire-and-forget: the run proceeds in the background and its outcome is
/// visible only in the logs. An overlapping trigger is absorbed here, not
/// surfaced to the caller.
async fn price_update(State(orchestrator): State<Arc<Orchestrator>>) -> impl IntoResponse {
    tokio::spawn(async move {
        match orchestrator.run().await {
            Ok(_) => {}
            Err(TransactorError::RunInProgress) => {
                info!("Price update ignored; a run is already in progress");
            }
            Err(e) => warn!("Triggered run failed: {e}"),
        }
    });

    (StatusCode::ACCEPTED, Json(json!({ "status": "accepted" })))
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

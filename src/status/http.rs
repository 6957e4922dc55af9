//! HTTP surface of the status probes
//!
//! `GET /controller/status` and `GET /replica/status` answer `200 OK` or
//! `503` with a plaintext reason.

use crate::common::tracing_middleware::request_tracing_middleware;
use crate::common::Result;
use crate::status::health::{controller_health, Health, ReplicaHealthCheck};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct StatusState {
    /// Installed in the replica role only
    pub replica: Option<Arc<ReplicaHealthCheck>>,
}

impl IntoResponse for Health {
    fn into_response(self) -> Response {
        match self {
            Health::Healthy => {
                tracing::debug!("Reporting OK.");
                (StatusCode::OK, "OK").into_response()
            }
            Health::Unhealthy(reason) => {
                tracing::info!("Reporting unhealthy status: {}", reason);
                (StatusCode::SERVICE_UNAVAILABLE, reason).into_response()
            }
        }
    }
}

async fn controller_status() -> Health {
    controller_health()
}

async fn replica_status(State(state): State<StatusState>) -> Health {
    match &state.replica {
        Some(check) => check.check().await,
        None => Health::Healthy,
    }
}

pub fn create_router(state: StatusState) -> Router {
    Router::new()
        .route("/controller/status", get(controller_status))
        .route("/replica/status", get(replica_status))
        .layer(axum::middleware::from_fn(request_tracing_middleware))
        .with_state(state)
}

/// Serve the status endpoints until the listener fails
pub async fn serve(listen: SocketAddr, state: StatusState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(listen).await?;
    tracing::info!("Listening on {}", listen);
    axum::serve(listener, create_router(state)).await?;
    Ok(())
}

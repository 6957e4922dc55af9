//! Probe tracing for the status endpoints
//!
//! Orchestrators hit the status endpoints every few seconds, so a probe is
//! tagged with an `X-Request-ID` (the caller's, or a fresh v4 uuid) and
//! logged at `debug` once answered. Unhealthy answers are reported at
//! `info` by the status handlers themselves, with their reason.

use axum::{
    body::Body,
    http::{HeaderMap, HeaderValue, Request, Response, StatusCode},
    middleware::Next,
};
use std::time::{Duration, Instant};
use tracing::Instrument;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Caller-supplied probe id, if it is usable as a header value
fn probe_id(headers: &HeaderMap) -> Option<String> {
    let id = headers.get(REQUEST_ID_HEADER)?.to_str().ok()?.trim();
    (!id.is_empty()).then(|| id.to_owned())
}

fn log_probe(probe: &str, path: &str, status: StatusCode, took: Duration) {
    let took_ms = took.as_millis() as u64;
    tracing::debug!(probe, path, status = status.as_u16(), took_ms, "Probe answered");
}

pub async fn request_tracing_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let started = Instant::now();
    let probe = probe_id(request.headers()).unwrap_or_else(|| Uuid::new_v4().to_string());
    let path = request.uri().path().to_owned();

    let span = tracing::debug_span!("probe", id = %probe, method = %request.method(), path = %path);
    let mut response = next.run(request).instrument(span).await;

    log_probe(&probe, &path, response.status(), started.elapsed());
    if let Ok(value) = HeaderValue::from_str(&probe) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

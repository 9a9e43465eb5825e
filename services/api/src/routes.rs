use crate::infra::{AppState, StubBackend};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use facescan_enroll::enrollment::{
    SubmissionPayload, DEVICE_KEY_HEADER, ENROLLMENT_PATH, USER_AGENT_HEADER,
};
use serde_json::{json, Value};
use tracing::{info, warn};

pub(crate) fn with_stub_routes(stub: StubBackend) -> Router {
    Router::new()
        .route(ENROLLMENT_PATH, post(enrollment_endpoint))
        .with_state(stub)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

fn rejection(reason: String) -> (StatusCode, Json<Value>) {
    warn!(%reason, "enrollment rejected");
    (
        StatusCode::OK,
        Json(json!({
            "wasProcessed": false,
            "error": true,
            "errorMessage": reason,
        })),
    )
}

/// Verdicts always travel in the body; the HTTP status stays 200.
pub(crate) async fn enrollment_endpoint(
    State(stub): State<StubBackend>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let device_key = headers
        .get(DEVICE_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if !stub.accepts_device_key(device_key) {
        return rejection(format!("{DEVICE_KEY_HEADER} missing or not recognized"));
    }

    let user_agent = headers
        .get(USER_AGENT_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if user_agent.trim().is_empty() {
        return rejection(format!("{USER_AGENT_HEADER} is required"));
    }

    let payload: SubmissionPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(err) => return rejection(format!("request body is not a submission: {err}")),
    };

    let empty = payload.empty_fields();
    if !empty.is_empty() {
        return rejection(format!("empty fields: {}", empty.join(", ")));
    }

    let scan_result_blob = stub.mint_scan_result_blob();
    info!(
        session_id = %payload.session_id,
        group = %payload.group_name,
        processed = stub.processed(),
        "enrollment processed"
    );

    (
        StatusCode::OK,
        Json(json!({
            "wasProcessed": true,
            "error": false,
            "scanResultBlob": scan_result_blob,
        })),
    )
}

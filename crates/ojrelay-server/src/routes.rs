//! axum routes for the ojrelay gateway.
//!
//! Error bodies keep the JSON shape the browser frontend already parses:
//! `{"error": ...}` with an optional `message` carrying the fault text.

use std::collections::HashMap;

use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use ojrelay_core::cookie;
use ojrelay_core::relay::{self, RelayRequest};

use crate::github::{DispatchError, WorkflowDispatcher};
use crate::session::SessionStore;
use crate::upstream::{UpstreamClient, UpstreamReply};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub upstream: UpstreamClient,
    pub sessions: SessionStore,
    pub dispatcher: WorkflowDispatcher,
}

/// Build the gateway router with wildcard CORS.
///
/// The CORS layer also answers `OPTIONS` preflights with `200` and an empty
/// body, which is what the frontend probes for.
pub fn build_router(state: AppState) -> axum::Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    axum::Router::new()
        .route("/api/health", get(health))
        .route("/api/proxy", post(proxy))
        .route("/api/captcha", post(captcha))
        .route("/api/workflow", post(trigger_workflow))
        .layer(cors)
        .with_state(state)
}

/// `GET /api/health` — liveness probe.
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

/// `POST /api/proxy` — forward a client-described request upstream.
async fn proxy(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<RelayRequest>,
) -> Response {
    if let Err(e) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, &e.to_string(), None);
    }
    let session = req.session_key(forwarded_for(&headers));
    relay_upstream(&state, &req, &session).await
}

/// Captcha request: session correlation only; the upstream path is fixed.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptchaRequest {
    /// Session key correlating cookie state across requests.
    pub session_id: Option<String>,

    /// Caller headers overlaid on the spoofed defaults.
    pub headers: Option<HashMap<String, String>>,

    /// Cookie fallback used when the store has nothing for the session key.
    pub client_cookies: Option<String>,
}

/// `POST /api/captcha` — relay the upstream captcha image.
///
/// The same forwarding path as `/api/proxy` pinned to the captcha endpoint,
/// so the captcha cookie and the login cookie land in the same store entry.
async fn captcha(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CaptchaRequest>,
) -> Response {
    let relay_req = RelayRequest {
        path: relay::CAPTCHA_PATH.to_string(),
        headers: req.headers,
        session_id: req.session_id,
        client_cookies: req.client_cookies,
        ..RelayRequest::default()
    };
    let session = relay_req.session_key(forwarded_for(&headers));
    relay_upstream(&state, &relay_req, &session).await
}

/// Workflow trigger request body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WorkflowRequest {
    /// Symbolic workflow name, e.g. `daily-stats`.
    pub workflow: Option<String>,
}

/// `POST /api/workflow` — dispatch a GitHub Actions workflow by name.
async fn trigger_workflow(
    State(state): State<AppState>,
    Json(req): Json<WorkflowRequest>,
) -> Response {
    let Some(name) = req.workflow.filter(|w| !w.is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "Workflow name is required", None);
    };

    match state.dispatcher.dispatch(&name).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": format!("{name} workflow triggered"),
                "workflow": name,
            })),
        )
            .into_response(),
        Err(DispatchError::UnknownWorkflow(_)) => {
            error_response(StatusCode::BAD_REQUEST, "Invalid workflow name", None)
        }
        Err(DispatchError::MissingToken) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "GitHub token not configured",
            None,
        ),
        Err(DispatchError::ApiError { status, body }) => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            (
                status,
                Json(json!({ "error": "Failed to trigger workflow", "details": body })),
            )
                .into_response()
        }
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
            Some(&e.to_string()),
        ),
    }
}

/// Forward `req` for `session`: prefer the stored cookie, fall back to the
/// caller-supplied one, capture any `Set-Cookie` from the reply, and relay
/// the reply verbatim.
async fn relay_upstream(state: &AppState, req: &RelayRequest, session: &str) -> Response {
    let cookie = match state.sessions.get(session).await {
        Some(stored) => Some(stored),
        None => req.client_cookies.clone(),
    };

    match state.upstream.forward(req, cookie.as_deref()).await {
        Ok(reply) => {
            if let Some(reduced) = cookie::reduce_set_cookies(&reply.set_cookies) {
                state.sessions.store(session, reduced).await;
            }
            upstream_response(reply)
        }
        Err(e) => {
            warn!(path = %req.path, error = %e, "Forwarding failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                Some(&e.to_string()),
            )
        }
    }
}

/// Relay an upstream reply: its status, content type, and body verbatim.
fn upstream_response(reply: UpstreamReply) -> Response {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
    (
        status,
        [(header::CONTENT_TYPE, reply.content_type)],
        reply.body,
    )
        .into_response()
}

/// First `X-Forwarded-For` value, used as the session-key fallback.
fn forwarded_for(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
}

/// JSON error body in the shape the frontend expects.
fn error_response(status: StatusCode, error: &str, message: Option<&str>) -> Response {
    let mut body = json!({ "error": error });
    if let Some(message) = message {
        body["message"] = json!(message);
    }
    (status, Json(body)).into_response()
}

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Json, Response},
};

use super::AppState;
use crate::generate::GenerationRequest;
use crate::report::{self, EventRecord};

/// GET /health — always public
pub(super) async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

/// POST /generate — generation proxy.
///
/// Order matters: the bearer check runs before the body is even parsed, so
/// an unauthenticated caller pays nothing past the auth check and can never
/// trigger upstream traffic.
pub(super) async fn handle_generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    // ── Bearer token auth ──
    if !is_authorized(&headers, &state.api_tokens) {
        tracing::warn!("rejected /generate request with missing or invalid bearer token");
        let err = serde_json::json!({"error": "Missing or invalid authorization token"});
        return (StatusCode::UNAUTHORIZED, Json(err));
    }

    // ── Parse body ──
    let request: GenerationRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            let err = serde_json::json!({
                "error": format!(
                    "Invalid JSON: {e}. Expected: {{\"title\": ..., \"objective\": ..., \"description\": ...}}"
                )
            });
            return (StatusCode::BAD_REQUEST, Json(err));
        }
    };

    // ── Required fields ──
    if let Some(field) = request.missing_field() {
        tracing::warn!(field, "rejected /generate request with missing field");
        let err = serde_json::json!({"error": format!("Missing required field: {field}")});
        return (StatusCode::BAD_REQUEST, Json(err));
    }

    // ── One upstream call ──
    match state.client.generate(&request).await {
        Ok(text) => {
            tracing::info!(chars = text.len(), "generated overview paragraph");
            let body = serde_json::json!({"objective": text});
            (StatusCode::OK, Json(body))
        }
        Err(e) => {
            tracing::error!(error = %e, "generation failed");
            let err = serde_json::json!({"error": e.to_string()});
            (e.status(), Json(err))
        }
    }
}

/// POST /report — render an event record into the printable HTML document.
///
/// The record arrives in the request body; this service never talks to the
/// backing store itself. Assembly cannot fail on data — only a template
/// bug produces a 500.
pub(super) async fn handle_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !is_authorized(&headers, &state.api_tokens) {
        tracing::warn!("rejected /report request with missing or invalid bearer token");
        let err = serde_json::json!({"error": "Missing or invalid authorization token"});
        return (StatusCode::UNAUTHORIZED, Json(err)).into_response();
    }

    let record: EventRecord = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            let err = serde_json::json!({"error": format!("Invalid JSON: {e}")});
            return (StatusCode::BAD_REQUEST, Json(err)).into_response();
        }
    };

    let assembled = report::assemble_now(&record);
    match report::render_html(&assembled) {
        Ok(html) => (StatusCode::OK, Html(html)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "report template render failed");
            let err = serde_json::json!({"error": "Report rendering failed"});
            (StatusCode::INTERNAL_SERVER_ERROR, Json(err)).into_response()
        }
    }
}

/// Check the `Authorization: Bearer <token>` header against the configured
/// token list. Comparison is constant-time per token.
fn is_authorized(headers: &HeaderMap, api_tokens: &[String]) -> bool {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let Some(token) = auth.strip_prefix("Bearer ") else {
        return false;
    };
    if token.is_empty() {
        return false;
    }
    api_tokens.iter().any(|t| constant_time_eq(token, t))
}

/// Constant-time equality comparison for secret strings.
fn constant_time_eq(a: &str, b: &str) -> bool {
    use subtle::ConstantTimeEq;
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

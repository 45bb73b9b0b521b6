//! Axum-based HTTP gateway for the generation proxy and report rendering.
//!
//! Axum/hyper give us HTTP/1.1 compliance, Content-Length validation, and
//! header sanitization; on top of that the router applies:
//! - request body size limit (64KB max)
//! - request timeouts (30s) to prevent slow-loris attacks
//! - a permissive CORS layer so browser preflights succeed

mod handlers;

use handlers::{handle_generate, handle_health, handle_report};

use crate::config::Config;
use crate::error::{ConfigError, EventDeskError, Result};
use crate::generate::GeminiClient;
use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tracing::info;

/// Maximum request body size (64KB) — prevents memory exhaustion
pub const MAX_BODY_SIZE: usize = 65_536;
/// Request timeout (30s) — prevents slow-loris attacks
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Shared state for all axum handlers
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<GeminiClient>,
    /// Accepted bearer tokens. Empty means every authenticated route
    /// answers 401.
    pub api_tokens: Arc<Vec<String>>,
}

/// Run the HTTP gateway on the configured bind address.
pub async fn run_gateway(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.gateway.host, config.gateway.port)
        .parse()
        .map_err(|e| {
            EventDeskError::Config(ConfigError::Validation(format!("invalid bind address: {e}")))
        })?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| EventDeskError::Config(ConfigError::Io(e)))?;

    run_gateway_with_listener(listener, config).await
}

/// Run the HTTP gateway from a pre-bound listener.
///
/// Integration tests bind an ephemeral port themselves and hand the
/// listener in, so the server under test never races on a fixed port.
pub async fn run_gateway_with_listener(
    listener: tokio::net::TcpListener,
    config: Config,
) -> Result<()> {
    let client = Arc::new(GeminiClient::new(&config.generation));

    if !client.has_api_key() {
        tracing::warn!(
            "no Gemini API key configured — /generate will answer 500 until one is set"
        );
    }
    if config.gateway.api_tokens.is_empty() {
        tracing::warn!("no API tokens configured — all authenticated routes will answer 401");
    }

    let state = AppState {
        client,
        api_tokens: Arc::new(config.gateway.api_tokens.clone()),
    };

    let addr = listener
        .local_addr()
        .map_err(|e| EventDeskError::Config(ConfigError::Io(e)))?;
    info!(%addr, model = %config.generation.model, "gateway listening");

    let app = build_router(state);

    axum::serve(listener, app)
        .await
        .map_err(|e| EventDeskError::Config(ConfigError::Io(e)))?;

    Ok(())
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/generate", post(handle_generate))
        .route("/report", post(handle_report))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        ))
}

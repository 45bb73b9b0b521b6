use axum::http::StatusCode;
use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `EventDesk`.
///
/// Each subsystem defines its own error variant. Library callers can match on
/// these to decide how to respond; internal code continues to use
/// `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum EventDeskError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Generation proxy ─────────────────────────────────────────────────
    #[error("generate: {0}")]
    Generate(#[from] GenerateError),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Generation proxy errors ─────────────────────────────────────────────────

/// Failure taxonomy for the generation proxy.
///
/// Auth (401) and field-validation (400) failures are produced directly by
/// the gateway handler before the client is involved; everything that can go
/// wrong from the client onward lands here and maps to a 500.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Gemini API key is not configured")]
    MissingApiKey,

    #[error("Gemini API error ({status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("could not extract text from the model response")]
    Extraction,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl GenerateError {
    /// HTTP status the gateway reports for this failure. Every variant is a
    /// server-side problem from the caller's point of view.
    pub fn status(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

pub type Result<T> = std::result::Result<T, EventDeskError>;

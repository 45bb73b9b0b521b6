//! Generation proxy core: prompt assembly and the single outbound call to
//! the Gemini `generateContent` endpoint.
//!
//! Each call is independent and stateless — no retries, no caching, no rate
//! limiting. Auth and field validation happen in the gateway before the
//! client is invoked.

mod types;

use reqwest::Client;
use serde::Deserialize;

use crate::config::GenerationConfig;
use crate::error::GenerateError;
use types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig as WireConfig,
    Part, SAFETY_SETTINGS,
};

/// The three user-supplied fields an overview is generated from.
/// All are required; the gateway rejects requests missing any of them.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub objective: String,
    #[serde(default)]
    pub description: String,
}

impl GenerationRequest {
    /// Name of the first missing (empty after trimming) required field,
    /// if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.title.trim().is_empty() {
            Some("title")
        } else if self.objective.trim().is_empty() {
            Some("objective")
        } else if self.description.trim().is_empty() {
            Some("description")
        } else {
            None
        }
    }
}

/// Build the formal-register instruction sent upstream: one plain paragraph,
/// no markup, synthesizing title, objective, and description.
pub fn build_prompt(request: &GenerationRequest) -> String {
    format!(
        "Write a single paragraph in a formal register describing the objective of an \
         academic event. Use plain text only, with no markdown or other markup. \
         Synthesize the following details into one cohesive paragraph.\n\n\
         Event title: {}\n\
         Stated objective: {}\n\
         Event description: {}",
        request.title.trim(),
        request.objective.trim(),
        request.description.trim()
    )
}

/// Client for the Gemini `generateContent` API.
///
/// Carries everything the proxy needs up front — key, endpoint, model,
/// sampling settings — so nothing is read from the process environment at
/// request time and tests can point `base_url` at a mock server.
pub struct GeminiClient {
    api_key: Option<String>,
    model: String,
    base_url: String,
    temperature: f64,
    max_output_tokens: u32,
    client: Client,
}

impl GeminiClient {
    /// Create a client from config. Environment-variable overrides for the
    /// API key are applied when the config is loaded, not here, so the
    /// client is deterministic given its config.
    pub fn new(config: &GenerationConfig) -> Self {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty());

        Self {
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            client: Client::new(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// One outbound call: build the prompt, POST it upstream, extract the
    /// first candidate's first text part.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerateError> {
        let api_key = self.api_key.as_deref().ok_or(GenerateError::MissingApiKey)?;

        let body = self.build_request(request);
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, api_key
        );

        let response = self.client.post(url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(GenerateError::Upstream { status, message });
        }

        let result: GenerateContentResponse = response.json().await?;
        Self::extract_text(&result)
    }

    fn build_request(&self, request: &GenerationRequest) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(build_prompt(request)),
                }],
            }],
            safety_settings: SAFETY_SETTINGS.into(),
            generation_config: WireConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        }
    }

    fn extract_text(result: &GenerateContentResponse) -> Result<String, GenerateError> {
        let text = result
            .candidates
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|candidate| candidate.content.as_ref())
            .and_then(|content| content.parts.first())
            .and_then(|part| part.text.as_deref())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(GenerateError::Extraction);
        }

        Ok(text.to_string())
    }
}

/// One-shot generation for CLI and library use: build a client from config,
/// make the single upstream call, and surface failures through the
/// crate-level error hierarchy.
pub async fn generate_overview(
    config: &GenerationConfig,
    request: &GenerationRequest,
) -> crate::error::Result<String> {
    let client = GeminiClient::new(config);
    Ok(client.generate(request).await?)
}

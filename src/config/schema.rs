use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

// ── Top-level config ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed at load time, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub generation: GenerationConfig,
}

// ── Gateway ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway host (default: 127.0.0.1)
    #[serde(default = "default_gateway_host")]
    pub host: String,
    /// Gateway port (default: 8787)
    #[serde(default = "default_gateway_port")]
    pub port: u16,
    /// Bearer tokens accepted on /generate and /report. Empty list means
    /// every authenticated route answers 401.
    #[serde(default)]
    pub api_tokens: Vec<String>,
}

fn default_gateway_host() -> String {
    "127.0.0.1".into()
}

fn default_gateway_port() -> u16 {
    8787
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
            api_tokens: Vec::new(),
        }
    }
}

// ── Generation (Gemini upstream) ──────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Gemini API key. Environment variables (GEMINI_API_KEY, then
    /// GOOGLE_API_KEY) take precedence over this value.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model name (default: gemini-2.0-flash)
    #[serde(default = "default_generation_model")]
    pub model: String,
    /// API base URL. Overridable so tests can point the client at a
    /// local mock server.
    #[serde(default = "default_generation_base_url")]
    pub base_url: String,
    #[serde(default = "default_generation_temperature")]
    pub temperature: f64,
    #[serde(default = "default_generation_max_output_tokens")]
    pub max_output_tokens: u32,
}

fn default_generation_model() -> String {
    "gemini-2.0-flash".into()
}

fn default_generation_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}

fn default_generation_temperature() -> f64 {
    0.7
}

fn default_generation_max_output_tokens() -> u32 {
    1024
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_generation_model(),
            base_url: default_generation_base_url(),
            temperature: default_generation_temperature(),
            max_output_tokens: default_generation_max_output_tokens(),
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────

impl Config {
    /// Default config location: `~/.eventdesk/config.toml`.
    pub fn default_path() -> PathBuf {
        UserDirs::new()
            .map(|u| u.home_dir().join(".eventdesk").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Load the config from `path`, falling back to defaults when the file
    /// does not exist. A file that exists but does not parse is an error —
    /// silently ignoring a typo'd config is worse than refusing to start.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let raw = fs::read_to_string(path)
                .map_err(|e| ConfigError::Load(format!("reading {}: {e}", path.display())))?;
            toml::from_str::<Self>(&raw)
                .map_err(|e| ConfigError::Load(format!("parsing {}: {e}", path.display())))?
        } else {
            Self::default()
        };
        config.config_path = path.to_path_buf();
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from the default location.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        Self::load(&Self::default_path())
    }

    /// Environment variables take precedence over the config file for the
    /// upstream credential: `GEMINI_API_KEY`, then `GOOGLE_API_KEY`.
    fn apply_env_overrides(&mut self) {
        let env_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| {
                std::env::var("GOOGLE_API_KEY")
                    .ok()
                    .filter(|k| !k.trim().is_empty())
            });
        if env_key.is_some() {
            self.generation.api_key = env_key;
        }
    }
}

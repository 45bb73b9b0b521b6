use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(super) struct GenerateContentRequest {
    pub(super) contents: Vec<Content>,
    #[serde(rename = "safetySettings")]
    pub(super) safety_settings: Vec<SafetySetting>,
    #[serde(rename = "generationConfig")]
    pub(super) generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
pub(super) struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) role: Option<String>,
    pub(super) parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct Part {
    pub(super) text: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct SafetySetting {
    pub(super) category: &'static str,
    pub(super) threshold: &'static str,
}

/// Fixed content-safety policy: the four standard harm categories, each
/// blocking only high-severity matches. Not caller-configurable.
pub(super) const SAFETY_SETTINGS: [SafetySetting; 4] = [
    SafetySetting {
        category: "HARM_CATEGORY_HARASSMENT",
        threshold: "BLOCK_ONLY_HIGH",
    },
    SafetySetting {
        category: "HARM_CATEGORY_HATE_SPEECH",
        threshold: "BLOCK_ONLY_HIGH",
    },
    SafetySetting {
        category: "HARM_CATEGORY_SEXUALLY_EXPLICIT",
        threshold: "BLOCK_ONLY_HIGH",
    },
    SafetySetting {
        category: "HARM_CATEGORY_DANGEROUS_CONTENT",
        threshold: "BLOCK_ONLY_HIGH",
    },
];

#[derive(Debug, Serialize)]
pub(super) struct GenerationConfig {
    pub(super) temperature: f64,
    #[serde(rename = "maxOutputTokens")]
    pub(super) max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub(super) struct GenerateContentResponse {
    pub(super) candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Candidate {
    pub(super) content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CandidateContent {
    #[serde(default)]
    pub(super) parts: Vec<Part>,
}

impl SafetySetting {
    /// `true` when the serialized policy matches the fixed uniform policy.
    #[cfg(test)]
    pub(super) fn blocks_only_high(&self) -> bool {
        self.threshold == "BLOCK_ONLY_HIGH"
    }
}

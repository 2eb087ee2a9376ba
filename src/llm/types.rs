use serde::{Deserialize, Serialize};

/// Which remote text-completion service to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterType {
    Gemini,
    OpenRouter,
}

impl AdapterType {
    /// Environment variable holding this provider's API credential
    pub fn api_key_env_var(&self) -> &'static str {
        match self {
            AdapterType::Gemini => "GEMINI_API_KEY",
            AdapterType::OpenRouter => "OPENROUTER_API_KEY",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            AdapterType::Gemini => "gemini-3-flash-preview",
            AdapterType::OpenRouter => "google/gemini-2.5-flash",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "gemini" | "google" => Some(AdapterType::Gemini),
            "openrouter" => Some(AdapterType::OpenRouter),
            _ => None,
        }
    }
}

/// A single stateless completion call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub prompt: String,
    /// Ask the service to constrain its output to a JSON document
    pub json_response: bool,
}

impl CompletionRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            json_response: false,
        }
    }

    pub fn json(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            json_response: true,
        }
    }
}

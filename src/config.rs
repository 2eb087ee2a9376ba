// Environment configuration
//
// Secrets come from environment variables (optionally via .env.local / .env).
// A missing credential is not an error: the host still starts and every remote
// feature falls back to its offline path.

use crate::error::{FinishError, Result};
use crate::llm::AdapterType;
use crate::modal::ModalConfig;
use std::time::Duration;

pub const DEFAULT_DEBOUNCE_MS: u64 = 1200;
pub const DEFAULT_MIN_QUERY_CHARS: usize = 6;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    pub provider: AdapterType,
    /// None when no credential is configured
    pub api_key: Option<String>,
    pub model: String,
    pub debounce: Duration,
    pub min_query_chars: usize,
    pub request_timeout: Duration,
}

impl SiteConfig {
    /// Load from the process environment
    ///
    /// Reads `.env.local` and then `.env` first; missing files are ignored and
    /// variables already set in the environment win.
    ///
    /// # Errors
    /// `ConfigError` for an unknown provider or an unparsable number.
    pub fn load() -> Result<Self> {
        dotenvy::from_filename(".env.local").ok();
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider = match get("FINISH_PROVIDER") {
            Some(name) => AdapterType::parse(&name).ok_or_else(|| {
                FinishError::ConfigError(format!("Unknown FINISH_PROVIDER '{}'", name))
            })?,
            None => AdapterType::Gemini,
        };

        let api_key = match provider {
            AdapterType::Gemini => get("GEMINI_API_KEY").or_else(|| get("API_KEY")),
            AdapterType::OpenRouter => get("OPENROUTER_API_KEY"),
        };
        if api_key.is_none() {
            tracing::warn!(
                "{} not set; AI features will use offline fallbacks",
                provider.api_key_env_var()
            );
        }

        let model = get("FINISH_MODEL").unwrap_or_else(|| provider.default_model().to_string());

        let debounce_ms: u64 = parse_number(
            get("FINISH_DEBOUNCE_MS"),
            "FINISH_DEBOUNCE_MS",
            DEFAULT_DEBOUNCE_MS,
        )?;
        let min_query_chars: usize = parse_number(
            get("FINISH_MIN_QUERY_CHARS"),
            "FINISH_MIN_QUERY_CHARS",
            DEFAULT_MIN_QUERY_CHARS,
        )?;
        let timeout_secs: u64 = parse_number(
            get("FINISH_REQUEST_TIMEOUT_SECS"),
            "FINISH_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;

        Ok(Self {
            provider,
            api_key,
            model,
            debounce: Duration::from_millis(debounce_ms),
            min_query_chars,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn modal_config(&self) -> ModalConfig {
        ModalConfig {
            debounce: self.debounce,
            min_query_chars: self.min_query_chars,
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            provider: AdapterType::Gemini,
            api_key: None,
            model: AdapterType::Gemini.default_model().to_string(),
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            min_query_chars: DEFAULT_MIN_QUERY_CHARS,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

fn parse_number<T: std::str::FromStr>(value: Option<String>, key: &str, default: T) -> Result<T> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| {
                FinishError::ConfigError(format!("{} must be a number, got '{}'", key, raw))
            }),
        None => Ok(default),
    }
}

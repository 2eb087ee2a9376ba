mod gemini;
mod offline;
mod openrouter;
mod types;

pub use gemini::{GeminiAdapter, GeminiChat};
pub use offline::OfflineCompletion;
pub use openrouter::{OpenRouterAdapter, OpenRouterChat};
pub use types::*;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

#[cfg(test)]
use mockall::automock;

/// Unified interface over the remote text-completion services
///
/// Two call shapes: a stateless `complete` (optionally JSON constrained) and a
/// chat session created once with a persona that then remembers its own turns.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TextCompletion: Send + Sync {
    /// One independent completion; no state is kept between calls
    async fn complete(&self, request: CompletionRequest) -> Result<String>;

    /// Create a chat session carrying `system_instruction`
    ///
    /// No I/O happens here; the first request goes out with the first message.
    fn start_chat(&self, system_instruction: &str) -> Arc<dyn ChatConnection>;

    /// Adapter name for logging
    fn name(&self) -> &'static str;
}

/// A live chat session with a remote service
///
/// The connection owns the transcript it sends upstream, so callers pass only
/// the new user text on each turn.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ChatConnection: Send + Sync {
    async fn send_message(&self, text: &str) -> Result<String>;
}

/// Factory function to create the configured adapter
pub fn create_adapter(
    adapter_type: AdapterType,
    api_key: String,
    model: Option<String>,
) -> Arc<dyn TextCompletion> {
    let model = model.unwrap_or_else(|| adapter_type.default_model().to_string());
    match adapter_type {
        AdapterType::Gemini => Arc::new(GeminiAdapter::new(api_key, model)),
        AdapterType::OpenRouter => Arc::new(OpenRouterAdapter::new(api_key, model)),
    }
}

use super::types::CompletionRequest;
use super::{ChatConnection, TextCompletion};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Stand-in used when no API credential is configured
///
/// Every call fails, so the diagnosis panel stays empty and the chat widget
/// answers with its connection fallback.
pub struct OfflineCompletion {
    reason: String,
}

impl OfflineCompletion {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl TextCompletion for OfflineCompletion {
    async fn complete(&self, _request: CompletionRequest) -> Result<String> {
        anyhow::bail!("{}", self.reason)
    }

    fn start_chat(&self, _system_instruction: &str) -> Arc<dyn ChatConnection> {
        Arc::new(OfflineChat {
            reason: self.reason.clone(),
        })
    }

    fn name(&self) -> &'static str {
        "Offline"
    }
}

struct OfflineChat {
    reason: String,
}

#[async_trait]
impl ChatConnection for OfflineChat {
    async fn send_message(&self, _text: &str) -> Result<String> {
        anyhow::bail!("{}", self.reason)
    }
}

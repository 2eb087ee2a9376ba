// AppBuilder: wires configuration into the completion adapter and controllers
//
// The production path reads `SiteConfig` and builds the configured adapter, or
// an offline stand-in when no credential is present. Tests inject their own
// completion implementation and skip the runtime.
//
// Usage:
//     let deps = AppBuilder::new()
//         .with_config(SiteConfig::load()?)
//         .with_runtime(runtime)
//         .build()?;
//     let modal = deps.search_modal();
//     let widget = deps.chat_widget();

use crate::chat::ChatWidget;
use crate::config::SiteConfig;
use crate::diagnosis::DiagnosisClient;
use crate::error::{FinishError, Result};
use crate::llm::{create_adapter, OfflineCompletion, TextCompletion};
use crate::modal::SearchModal;
use std::sync::Arc;

/// Builder for the application's shared dependencies
pub struct AppBuilder {
    config: Option<SiteConfig>,
    completion: Option<Arc<dyn TextCompletion>>,
    runtime: Option<Arc<tokio::runtime::Runtime>>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            completion: None,
            runtime: None,
        }
    }

    pub fn with_config(mut self, config: SiteConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Override the completion service (for testing)
    pub fn with_completion(mut self, completion: Arc<dyn TextCompletion>) -> Self {
        self.completion = Some(completion);
        self
    }

    /// Runtime that executes remote calls for the host
    pub fn with_runtime(mut self, runtime: Arc<tokio::runtime::Runtime>) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Build the configured dependencies
    ///
    /// # Errors
    /// `ConfigError` if no configuration was supplied.
    pub fn build(self) -> Result<AppDependencies> {
        let config = self
            .config
            .ok_or_else(|| FinishError::ConfigError("Site config not configured".to_string()))?;

        let completion = match self.completion {
            Some(completion) => completion,
            None => completion_for(&config),
        };
        tracing::info!("Using {} completion service ({})", completion.name(), config.model);

        let diagnosis = DiagnosisClient::new(Arc::clone(&completion))
            .with_timeout(config.request_timeout);

        Ok(AppDependencies {
            config,
            completion,
            diagnosis,
            runtime: self.runtime,
        })
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn completion_for(config: &SiteConfig) -> Arc<dyn TextCompletion> {
    match &config.api_key {
        Some(key) => create_adapter(config.provider, key.clone(), Some(config.model.clone())),
        None => Arc::new(OfflineCompletion::new(format!(
            "{} not set",
            config.provider.api_key_env_var()
        ))),
    }
}

/// Shared services for the host
///
/// The runtime is optional; tests run inside `#[tokio::test]` instead.
pub struct AppDependencies {
    pub config: SiteConfig,
    pub completion: Arc<dyn TextCompletion>,
    pub diagnosis: DiagnosisClient,
    pub runtime: Option<Arc<tokio::runtime::Runtime>>,
}

impl AppDependencies {
    pub fn search_modal(&self) -> SearchModal {
        SearchModal::new(self.config.modal_config())
    }

    /// A fresh widget; each one owns its own conversation
    pub fn chat_widget(&self) -> ChatWidget {
        ChatWidget::new(Arc::clone(&self.completion), self.config.request_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockTextCompletion;
    use std::time::Duration;

    fn mock_completion() -> Arc<dyn TextCompletion> {
        let mut completion = MockTextCompletion::new();
        completion.expect_name().return_const("mock");
        Arc::new(completion)
    }

    #[test]
    fn test_build_requires_config() {
        match AppBuilder::new().build() {
            Err(FinishError::ConfigError(msg)) => assert!(msg.contains("not configured")),
            _ => panic!("Expected ConfigError for incomplete build"),
        }
    }

    #[test]
    fn test_missing_key_uses_offline_completion() {
        let deps = AppBuilder::new()
            .with_config(SiteConfig::default())
            .build()
            .unwrap();
        assert_eq!(deps.completion.name(), "Offline");
        assert!(deps.runtime.is_none());
    }

    #[test]
    fn test_configured_key_builds_provider_adapter() {
        let config = SiteConfig {
            api_key: Some("k".to_string()),
            ..SiteConfig::default()
        };
        let deps = AppBuilder::new().with_config(config).build().unwrap();
        assert_eq!(deps.completion.name(), "Gemini");
    }

    #[test]
    fn test_completion_override_and_controller_settings() {
        let completion = mock_completion();
        let config = SiteConfig {
            min_query_chars: 3,
            debounce: Duration::from_millis(50),
            ..SiteConfig::default()
        };
        let deps = AppBuilder::default()
            .with_config(config)
            .with_completion(Arc::clone(&completion))
            .build()
            .unwrap();

        assert!(Arc::ptr_eq(&deps.completion, &completion));

        let mut modal = deps.search_modal();
        modal.open();
        let t0 = std::time::Instant::now();
        modal.set_query("abc", t0);
        assert_eq!(modal.next_deadline(), Some(t0 + Duration::from_millis(50)));

        let widget = deps.chat_widget();
        assert_eq!(widget.messages().len(), 1);
    }
}

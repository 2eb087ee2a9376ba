// Centralized error handling using thiserror for type-safe error management
//
// The remote-call layer (llm adapters) speaks anyhow; the component boundaries
// (diagnosis client, conversation session) convert into the variants below so
// callers can match on the failure mode and degrade the feature locally.

use thiserror::Error;

/// Main error type for the FINISH site core
///
/// None of these are fatal to the host. Diagnosis errors mean "no diagnosis
/// shown", chat errors become a fallback assistant message, and navigation
/// errors are logged and ignored.
#[derive(Debug, Error)]
pub enum FinishError {
    /// Network/transport failure (or timeout) during a stateless diagnosis call
    #[error("Diagnosis transport error: {0}")]
    DiagnosisTransport(String),

    /// Diagnosis response was received but is not valid or complete JSON
    #[error("Diagnosis parse error: {0}")]
    DiagnosisParse(String),

    /// Network/transport failure (or timeout) during a conversational turn
    #[error("Chat transport error: {0}")]
    ChatTransport(String),

    /// Network/transport failure (or timeout) during an advisory completion
    #[error("Completion transport error: {0}")]
    CompletionTransport(String),

    /// A directive or record referenced a page outside the known enumeration
    #[error("Invalid navigation target: {0}")]
    InvalidNavigationTarget(String),

    /// Configuration value present but unusable
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Environment variable missing or invalid
    #[error("Environment error: {0}")]
    EnvError(String),

    /// IO operation failed
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    /// HTTP request failed
    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),
}

impl FinishError {
    /// True for the variants that represent a failed remote call
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            FinishError::DiagnosisTransport(_)
                | FinishError::ChatTransport(_)
                | FinishError::CompletionTransport(_)
                | FinishError::ReqwestError(_)
        )
    }
}

/// Type alias for Result with FinishError
pub type Result<T> = std::result::Result<T, FinishError>;

// Adapter code uses anyhow; anything that escapes unconverted is treated as a
// transport failure of an unspecified call.
impl From<anyhow::Error> for FinishError {
    fn from(err: anyhow::Error) -> Self {
        FinishError::DiagnosisTransport(format!("{:#}", err))
    }
}

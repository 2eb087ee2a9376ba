// Library interface for the FINISH site core
//
// Controllers for the search/diagnosis modal and the chat widget, the page
// catalogue and directory they navigate over, the rich-text renderer for
// assistant replies, and the remote completion adapters behind them. The
// egui host in main.rs is a thin layer over this crate.

pub mod app_builder;
pub mod chat;
pub mod config;
pub mod debounce;
pub mod diagnosis;
pub mod directory;
pub mod error;
pub mod intake;
pub mod llm;
pub mod modal;
pub mod pages;
pub mod rich_text;
pub mod session;
pub mod version;

// Re-export commonly used types for convenience
pub use app_builder::{AppBuilder, AppDependencies};
pub use chat::{ChatWidget, WidgetState};
pub use config::SiteConfig;
pub use diagnosis::{DiagnosisClient, DiagnosisResult, ServiceOffering};
pub use directory::{DirectoryEntry, EntryKind};
pub use error::{FinishError, Result};
pub use llm::{ChatConnection, CompletionRequest, TextCompletion};
pub use modal::{DiagnosisRequest, ModalConfig, ModalState, ModalTab, SearchModal};
pub use pages::{Navigator, PageId, Router};
pub use rich_text::{Block, Span};
pub use session::{ConversationSession, Message, PendingReply, Role};

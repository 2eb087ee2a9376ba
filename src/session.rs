// Conversational session manager
//
// Owns the transcript and the lazily created chat connection. A turn is split
// into `begin_send` (validate, append the user message, mark waiting) and
// `finish_send` (append the reply or the fallback, clear waiting) so a host
// event loop can run the remote call elsewhere and keep rendering meanwhile.
// `send` runs both halves in place.

use crate::error::{FinishError, Result};
use crate::llm::{ChatConnection, TextCompletion};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Persona handed to the remote chat session when it is created
pub const ASSISTANT_PERSONA: &str = r#"You are the FINISH Inc Assistant.
Your goal is to help users navigate our engineering service lifecycle.

Critical Guidelines:
- ALWAYS use interactive paths to suggest pages.
- Format paths on their own line as "Route to: /page-id".
- Valid pages: /home, /how-it-works, /pricing, /why-finish, /faq, /diagnostic, /partner, /stories, /idea-stage.
- Use Markdown: **bold** for emphasis, *italic* for notes.
- Use bullet points (* Item) for service lists.
- Tone: Professional, high-trust, technical, and concise.

Logic:
- New Ideas -> /idea-stage
- Broken Apps -> /diagnostic
- Agencies/VCs -> /partner
- Success Proof -> /stories"#;

/// Seeded first assistant message
pub const GREETING: &str = "Hi! I'm the FINISH Assistant. We help builders navigate the engineering lifecycle, from the first blueprint to scaling a production-ready product.\n\nHow can I help you today?\n\n* **Have an idea?** Let's talk about **The Blueprint** or MVP sprints (**FINISH Start**).\n* **Stuck mid-build?** We can unblock you using AI tools or custom surgical engineering.\n* **Ready to ship?** We handle the \"last mile\": auth, payments, and deployment.\n\nRoute to: /diagnostic";

/// Reply shown when the service answers with no text
pub const EMPTY_REPLY_FALLBACK: &str = "I'm sorry, I couldn't process that request right now.";

/// Reply shown when the turn fails
pub const CONNECTION_FALLBACK: &str =
    "Connection error. Please try again or contact hello@finishlab.app directly.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub sent_at: DateTime<Local>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            sent_at: Local::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// An accepted turn whose remote call has not run yet
///
/// Holds its own handle on the connection so it can be resolved on another
/// task while the session keeps serving reads.
pub struct PendingReply {
    connection: Arc<dyn ChatConnection>,
    text: String,
    timeout: Duration,
}

impl PendingReply {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Issue the remote call
    ///
    /// # Errors
    /// `ChatTransport` when the call fails or exceeds the timeout.
    pub async fn resolve(self) -> Result<String> {
        match tokio::time::timeout(self.timeout, self.connection.send_message(&self.text)).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(e)) => Err(FinishError::ChatTransport(format!("{:#}", e))),
            Err(_) => Err(FinishError::ChatTransport(format!(
                "no reply within {:?}",
                self.timeout
            ))),
        }
    }
}

pub struct ConversationSession {
    completion: Arc<dyn TextCompletion>,
    system_instruction: String,
    connection: Option<Arc<dyn ChatConnection>>,
    messages: Vec<Message>,
    waiting: bool,
    timeout: Duration,
}

impl ConversationSession {
    pub fn new(completion: Arc<dyn TextCompletion>, system_instruction: impl Into<String>) -> Self {
        Self {
            completion,
            system_instruction: system_instruction.into(),
            connection: None,
            messages: Vec::new(),
            waiting: false,
            timeout: crate::diagnosis::DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Seed the transcript with an assistant message shown before any input
    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.messages.push(Message::assistant(greeting));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_waiting(&self) -> bool {
        self.waiting
    }

    pub fn is_started(&self) -> bool {
        self.connection.is_some()
    }

    /// Create the remote chat connection on first use; later calls return it
    pub fn start(&mut self) -> Arc<dyn ChatConnection> {
        if let Some(connection) = &self.connection {
            return Arc::clone(connection);
        }

        tracing::debug!("Opening chat session via {}", self.completion.name());
        let connection = self.completion.start_chat(&self.system_instruction);
        self.connection = Some(Arc::clone(&connection));
        connection
    }

    /// Accept a user turn
    ///
    /// Returns None (and changes nothing) for blank text or while a reply is
    /// outstanding. Otherwise the user message is appended immediately and the
    /// session waits until `finish_send`.
    pub fn begin_send(&mut self, user_text: &str) -> Option<PendingReply> {
        let text = user_text.trim();
        if text.is_empty() {
            return None;
        }
        if self.waiting {
            tracing::debug!("Ignoring send while a reply is outstanding");
            return None;
        }

        let connection = self.start();
        self.messages.push(Message::user(text));
        self.waiting = true;

        Some(PendingReply {
            connection,
            text: text.to_string(),
            timeout: self.timeout,
        })
    }

    /// Complete the outstanding turn with the remote outcome
    ///
    /// Always appends exactly one assistant message and clears the waiting
    /// flag. Returns None if no turn was outstanding.
    pub fn finish_send(&mut self, outcome: Result<String>) -> Option<&Message> {
        if !self.waiting {
            tracing::warn!("Reply arrived with no outstanding turn; dropped");
            return None;
        }

        let content = match outcome {
            Ok(reply) if reply.trim().is_empty() => EMPTY_REPLY_FALLBACK.to_string(),
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!("Chat error: {}", e);
                CONNECTION_FALLBACK.to_string()
            }
        };

        self.messages.push(Message::assistant(content));
        self.waiting = false;
        self.messages.last()
    }

    /// Run a whole turn: append the user message, await the reply, append it
    ///
    /// Returns the assistant text appended, or None if the send was rejected.
    /// If this future is dropped mid-call the turn is closed with the
    /// connection fallback.
    pub async fn send(&mut self, user_text: &str) -> Option<String> {
        let pending = self.begin_send(user_text)?;
        let mut turn = TurnGuard {
            session: self,
            closed: false,
        };

        let outcome = pending.resolve().await;
        turn.closed = true;
        let reply = turn
            .session
            .finish_send(outcome)
            .map(|message| message.content.clone());
        reply
    }
}

// Closes an abandoned turn so the session never stays stuck waiting.
struct TurnGuard<'a> {
    session: &'a mut ConversationSession,
    closed: bool,
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        if !self.closed {
            self.session.finish_send(Err(FinishError::ChatTransport(
                "turn abandoned".to_string(),
            )));
        }
    }
}

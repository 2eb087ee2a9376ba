// Chat widget controller
//
// Owns the conversation session for one widget instance, the draft input, the
// collapsed/expanded state, and the auto-scroll bookkeeping.

use crate::error::Result;
use crate::llm::TextCompletion;
use crate::rich_text::{self, Block};
use crate::session::{
    ConversationSession, Message, PendingReply, Role, ASSISTANT_PERSONA, GREETING,
};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetState {
    Collapsed,
    Expanded,
}

pub struct ChatWidget {
    state: WidgetState,
    session: ConversationSession,
    input: String,
    /// Transcript length and waiting flag at the last scroll
    scrolled_at: Option<(usize, bool)>,
}

impl ChatWidget {
    /// Widget with the studio persona and greeting
    pub fn new(completion: Arc<dyn TextCompletion>, timeout: Duration) -> Self {
        let session = ConversationSession::new(completion, ASSISTANT_PERSONA)
            .with_greeting(GREETING)
            .with_timeout(timeout);
        Self::with_session(session)
    }

    pub fn with_session(session: ConversationSession) -> Self {
        Self {
            state: WidgetState::Collapsed,
            session,
            input: String::new(),
            scrolled_at: None,
        }
    }

    pub fn state(&self) -> WidgetState {
        self.state
    }

    pub fn is_expanded(&self) -> bool {
        self.state == WidgetState::Expanded
    }

    /// Flip collapsed/expanded; expanding opens the chat session if needed
    pub fn toggle(&mut self) {
        match self.state {
            WidgetState::Collapsed => self.expand(),
            WidgetState::Expanded => self.collapse(),
        }
    }

    pub fn expand(&mut self) {
        self.state = WidgetState::Expanded;
        self.session.start();
    }

    pub fn collapse(&mut self) {
        self.state = WidgetState::Collapsed;
    }

    pub fn messages(&self) -> &[Message] {
        self.session.messages()
    }

    pub fn is_waiting(&self) -> bool {
        self.session.is_waiting()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Draft buffer for the host's text field
    pub fn input_mut(&mut self) -> &mut String {
        &mut self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Whether the send control should be enabled
    pub fn can_submit(&self) -> bool {
        !self.input.trim().is_empty() && !self.session.is_waiting()
    }

    /// Submit the draft
    ///
    /// Rejected drafts stay in the input box. Accepted drafts are cleared and
    /// the returned reply must be resolved and handed back to `complete`.
    pub fn submit(&mut self) -> Option<PendingReply> {
        if !self.can_submit() {
            return None;
        }
        let pending = self.session.begin_send(&self.input)?;
        self.input.clear();
        Some(pending)
    }

    pub fn complete(&mut self, outcome: Result<String>) {
        self.session.finish_send(outcome);
    }

    /// Submit the draft and wait for the reply in place
    pub async fn submit_and_wait(&mut self) -> Option<String> {
        if !self.can_submit() {
            return None;
        }
        let draft = std::mem::take(&mut self.input);
        self.session.send(&draft).await
    }

    /// True when the transcript or typing indicator changed since the last call
    pub fn take_scroll_request(&mut self) -> bool {
        let current = (self.session.messages().len(), self.session.is_waiting());
        if self.scrolled_at == Some(current) {
            return false;
        }
        self.scrolled_at = Some(current);
        true
    }
}

/// Display form of a transcript entry
///
/// Assistant text goes through the rich-text renderer; user text is shown
/// verbatim as a single paragraph.
pub fn render_message(message: &Message) -> Vec<Block> {
    match message.role {
        Role::Assistant => rich_text::render(&message.content),
        Role::User => vec![Block::Paragraph(vec![rich_text::Span::Plain(
            message.content.clone(),
        )])],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ChatConnection, MockChatConnection, MockTextCompletion};

    fn widget_with(chat: MockChatConnection, starts: usize) -> ChatWidget {
        let chat: Arc<dyn ChatConnection> = Arc::new(chat);
        let mut completion = MockTextCompletion::new();
        completion
            .expect_start_chat()
            .times(starts)
            .returning(move |_| Arc::clone(&chat));
        completion.expect_name().return_const("mock");
        ChatWidget::new(Arc::new(completion), Duration::from_secs(5))
    }

    #[test]
    fn test_greeting_present_before_interaction() {
        let widget = widget_with(MockChatConnection::new(), 0);
        assert_eq!(widget.state(), WidgetState::Collapsed);
        assert_eq!(widget.messages().len(), 1);
        assert_eq!(widget.messages()[0].role, Role::Assistant);

        let blocks = render_message(&widget.messages()[0]);
        assert_eq!(rich_text::route_targets(&blocks), vec!["diagnostic"]);
    }

    #[test]
    fn test_expanding_starts_session_once() {
        let mut widget = widget_with(MockChatConnection::new(), 1);
        widget.toggle();
        assert!(widget.is_expanded());
        widget.toggle();
        assert!(!widget.is_expanded());
        widget.toggle();
        assert!(widget.is_expanded());
    }

    #[test]
    fn test_submit_rejects_blank_and_while_waiting() {
        let mut widget = widget_with(MockChatConnection::new(), 1);

        widget.set_input("   ");
        assert!(!widget.can_submit());
        assert!(widget.submit().is_none());
        assert_eq!(widget.input(), "   ");

        widget.set_input("Need help with Stripe");
        let pending = widget.submit();
        assert!(pending.is_some());
        assert!(widget.input().is_empty());
        assert!(widget.is_waiting());

        widget.set_input("And also auth");
        assert!(widget.submit().is_none());
        assert_eq!(widget.input(), "And also auth");
        assert_eq!(widget.messages().len(), 2);

        widget.complete(Ok("Route to: /diagnostic".to_string()));
        assert!(!widget.is_waiting());
        assert_eq!(widget.messages().len(), 3);
        assert!(widget.can_submit());
    }

    #[tokio::test]
    async fn test_submit_and_wait() {
        let mut chat = MockChatConnection::new();
        chat.expect_send_message()
            .times(1)
            .returning(|_| Ok("We can help. *Typical turnaround is 24h.*".to_string()));

        let mut widget = widget_with(chat, 1);
        widget.set_input("How fast?");
        let reply = widget.submit_and_wait().await.unwrap();
        assert!(reply.contains("24h"));
        assert!(widget.input().is_empty());
        assert_eq!(widget.messages().last().unwrap().role, Role::Assistant);
    }

    #[test]
    fn test_scroll_requested_on_transcript_and_typing_changes() {
        let mut widget = widget_with(MockChatConnection::new(), 1);

        assert!(widget.take_scroll_request());
        assert!(!widget.take_scroll_request());

        widget.set_input("hello");
        let _pending = widget.submit();
        // user message appended and waiting flag raised
        assert!(widget.take_scroll_request());
        assert!(!widget.take_scroll_request());

        widget.complete(Err(crate::error::FinishError::ChatTransport("down".into())));
        assert!(widget.take_scroll_request());
        assert_eq!(
            widget.messages().last().unwrap().content,
            crate::session::CONNECTION_FALLBACK
        );
    }

    #[test]
    fn test_user_messages_are_not_marked_up() {
        let blocks = render_message(&Message::user("/pricing **now**"));
        assert_eq!(
            blocks,
            vec![Block::Paragraph(vec![rich_text::Span::Plain(
                "/pricing **now**".to_string()
            )])]
        );
    }
}

// In-process fakes for the completion service
#![allow(dead_code)]

use async_trait::async_trait;
use finishlab::llm::{ChatConnection, CompletionRequest, TextCompletion};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

pub const STRIPE_DIAGNOSIS: &str = r#"{"problemSummary":"Webhook signature mismatch","technicalPath":"Verify signing secret and raw body parsing","recommendedService":"Surgical Call","logic":"...","targetPage":"diagnostic","suggestions":["Fix signature verification","Check raw body","Rotate secret"]}"#;

pub const AUTH_DIAGNOSIS: &str = r#"{"problemSummary":"Auth redirect loop","technicalPath":"Check session cookie domain","recommendedService":"Stabilize & Ship","logic":"...","targetPage":"pricing","suggestions":[]}"#;

/// Replies handed out in call order; every call records its request
#[derive(Default)]
pub struct ScriptedCompletion {
    replies: Mutex<VecDeque<anyhow::Result<String>>>,
    chat_replies: Arc<Mutex<VecDeque<anyhow::Result<String>>>>,
    pub requests: Mutex<Vec<CompletionRequest>>,
    pub chats_started: AtomicUsize,
    pub chat_messages: Arc<AtomicUsize>,
}

impl ScriptedCompletion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, text: &str) -> Self {
        self.replies.lock().unwrap().push_back(Ok(text.to_string()));
        self
    }

    pub fn fail(self, message: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(anyhow::anyhow!(message.to_string())));
        self
    }

    pub fn chat_reply(self, text: &str) -> Self {
        self.chat_replies
            .lock()
            .unwrap()
            .push_back(Ok(text.to_string()));
        self
    }

    pub fn chat_fail(self, message: &str) -> Self {
        self.chat_replies
            .lock()
            .unwrap()
            .push_back(Err(anyhow::anyhow!(message.to_string())));
        self
    }
}

#[async_trait]
impl TextCompletion for ScriptedCompletion {
    async fn complete(&self, request: CompletionRequest) -> anyhow::Result<String> {
        self.requests.lock().unwrap().push(request);
        let next = self.replies.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(anyhow::anyhow!("script exhausted")))
    }

    fn start_chat(&self, _system_instruction: &str) -> Arc<dyn ChatConnection> {
        self.chats_started.fetch_add(1, Ordering::SeqCst);
        Arc::new(ScriptedChat {
            replies: Arc::clone(&self.chat_replies),
            sent: Arc::clone(&self.chat_messages),
        })
    }

    fn name(&self) -> &'static str {
        "Scripted"
    }
}

struct ScriptedChat {
    replies: Arc<Mutex<VecDeque<anyhow::Result<String>>>>,
    sent: Arc<AtomicUsize>,
}

#[async_trait]
impl ChatConnection for ScriptedChat {
    async fn send_message(&self, _text: &str) -> anyhow::Result<String> {
        self.sent.fetch_add(1, Ordering::SeqCst);
        let next = self.replies.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(anyhow::anyhow!("script exhausted")))
    }
}

/// Every call blocks until the test releases the matching gate
///
/// Gates are consumed in call order, for both `complete` and chat turns.
pub struct GatedCompletion {
    gates: Arc<Mutex<VecDeque<oneshot::Receiver<anyhow::Result<String>>>>>,
    pub calls: Arc<AtomicUsize>,
}

impl GatedCompletion {
    /// A completion with `n` gates plus the senders that release them
    pub fn with_gates(n: usize) -> (Self, Vec<oneshot::Sender<anyhow::Result<String>>>) {
        let mut senders = Vec::with_capacity(n);
        let mut receivers = VecDeque::with_capacity(n);
        for _ in 0..n {
            let (tx, rx) = oneshot::channel();
            senders.push(tx);
            receivers.push_back(rx);
        }
        let completion = Self {
            gates: Arc::new(Mutex::new(receivers)),
            calls: Arc::new(AtomicUsize::new(0)),
        };
        (completion, senders)
    }
}

async fn wait_on_gate(
    gates: &Mutex<VecDeque<oneshot::Receiver<anyhow::Result<String>>>>,
    calls: &AtomicUsize,
) -> anyhow::Result<String> {
    calls.fetch_add(1, Ordering::SeqCst);
    let gate = gates.lock().unwrap().pop_front();
    match gate {
        Some(rx) => rx.await.unwrap_or_else(|_| Err(anyhow::anyhow!("gate dropped"))),
        None => Err(anyhow::anyhow!("no gate left")),
    }
}

#[async_trait]
impl TextCompletion for GatedCompletion {
    async fn complete(&self, _request: CompletionRequest) -> anyhow::Result<String> {
        wait_on_gate(&self.gates, &self.calls).await
    }

    fn start_chat(&self, _system_instruction: &str) -> Arc<dyn ChatConnection> {
        Arc::new(GatedChat {
            gates: Arc::clone(&self.gates),
            calls: Arc::clone(&self.calls),
        })
    }

    fn name(&self) -> &'static str {
        "Gated"
    }
}

struct GatedChat {
    gates: Arc<Mutex<VecDeque<oneshot::Receiver<anyhow::Result<String>>>>>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ChatConnection for GatedChat {
    async fn send_message(&self, _text: &str) -> anyhow::Result<String> {
        wait_on_gate(&self.gates, &self.calls).await
    }
}

/// Yield until `calls` reaches `n` so gated tasks are known to be parked
pub async fn wait_for_calls(calls: &AtomicUsize, n: usize) {
    while calls.load(Ordering::SeqCst) < n {
        tokio::task::yield_now().await;
    }
}

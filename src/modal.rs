// Search/diagnosis modal controller
//
// Local search runs synchronously on every keystroke. Remote diagnosis is
// debounced and issued as numbered requests; only the response to the most
// recently issued request is applied, so slow responses for older queries can
// never overwrite a newer one.

use crate::debounce::Debouncer;
use crate::diagnosis::DiagnosisResult;
use crate::directory::{self, DirectoryEntry};
use crate::error::Result;
use crate::pages::{Navigator, PageId};
use std::time::{Duration, Instant};

/// Starter queries offered before the user types anything
pub const QUICK_PROMPTS: [&str; 4] = [
    "Fixing hydration loop in Next.js",
    "Wiring Stripe webhook state sync",
    "Production deployment failing on AWS",
    "Refactoring messy AI prototype code",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModalConfig {
    /// Quiet period after the last keystroke before diagnosis is requested
    pub debounce: Duration,
    /// Queries shorter than this never reach the remote service
    pub min_query_chars: usize,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(1200),
            min_query_chars: 6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalState {
    Closed,
    /// Open with no query; the full directory is listed
    OpenEmpty,
    /// Query present, local results listed
    OpenFiltered,
    /// Remote diagnosis in flight for the latest query
    OpenDiagnosing,
    /// A diagnosis is available
    OpenDiagnosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalTab {
    Directory,
    Ai,
}

/// A diagnosis the host should run and report back through `apply_diagnosis`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosisRequest {
    pub id: u64,
    pub query: String,
}

pub struct SearchModal {
    config: ModalConfig,
    open: bool,
    query: String,
    results: Vec<&'static DirectoryEntry>,
    diagnosis: Option<DiagnosisResult>,
    tab: ModalTab,
    debouncer: Debouncer,
    next_request_id: u64,
    awaiting: Option<u64>,
}

impl SearchModal {
    pub fn new(config: ModalConfig) -> Self {
        Self {
            config,
            open: false,
            query: String::new(),
            results: directory::search(""),
            diagnosis: None,
            tab: ModalTab::Directory,
            debouncer: Debouncer::new(config.debounce),
            next_request_id: 0,
            awaiting: None,
        }
    }

    pub fn state(&self) -> ModalState {
        if !self.open {
            ModalState::Closed
        } else if self.awaiting.is_some() {
            ModalState::OpenDiagnosing
        } else if self.diagnosis.is_some() {
            ModalState::OpenDiagnosed
        } else if self.query.trim().is_empty() {
            ModalState::OpenEmpty
        } else {
            ModalState::OpenFiltered
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Open with a clean slate
    pub fn open(&mut self) {
        self.reset();
        self.open = true;
        tracing::debug!("Search modal opened");
    }

    /// Close; anything still pending or in flight is abandoned
    pub fn close(&mut self) {
        self.open = false;
        self.debouncer.cancel();
        self.awaiting = None;
        tracing::debug!("Search modal closed");
    }

    fn reset(&mut self) {
        self.query.clear();
        self.results = directory::search("");
        self.diagnosis = None;
        self.tab = ModalTab::Directory;
        self.debouncer.cancel();
        self.awaiting = None;
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[&'static DirectoryEntry] {
        &self.results
    }

    pub fn diagnosis(&self) -> Option<&DiagnosisResult> {
        self.diagnosis.as_ref()
    }

    pub fn tab(&self) -> ModalTab {
        self.tab
    }

    pub fn set_tab(&mut self, tab: ModalTab) {
        self.tab = tab;
    }

    /// Directory tab caption, including the current result count
    pub fn directory_tab_label(&self) -> String {
        format!("Directory ({})", self.results.len())
    }

    /// A diagnosis request is in flight; a merely scheduled one does not count
    pub fn is_thinking(&self) -> bool {
        self.awaiting.is_some()
    }

    /// When the host should call `poll` next, if anything is scheduled
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Handle a keystroke (the full new query text)
    pub fn set_query(&mut self, query: impl Into<String>, now: Instant) {
        self.query = query.into();
        self.results = directory::search(&self.query);

        if self.query.trim().is_empty() {
            self.diagnosis = None;
            self.tab = ModalTab::Directory;
            self.debouncer.cancel();
            self.awaiting = None;
            return;
        }

        if self.query.chars().count() >= self.config.min_query_chars {
            self.debouncer.schedule(now);
        } else {
            self.debouncer.cancel();
        }
    }

    /// Issue a diagnosis request if the quiet period has elapsed
    pub fn poll(&mut self, now: Instant) -> Option<DiagnosisRequest> {
        if !self.open || !self.debouncer.fire(now) {
            return None;
        }

        self.next_request_id += 1;
        let id = self.next_request_id;
        self.awaiting = Some(id);
        tracing::debug!("Diagnosis request {} for {:?}", id, self.query);

        Some(DiagnosisRequest {
            id,
            query: self.query.clone(),
        })
    }

    /// Report the outcome of a diagnosis request
    ///
    /// Returns false when the response is stale (a newer request was issued,
    /// the query was cleared, or the modal closed) and was discarded.
    pub fn apply_diagnosis(&mut self, request_id: u64, outcome: Result<DiagnosisResult>) -> bool {
        if self.awaiting != Some(request_id) {
            tracing::warn!("Discarding stale diagnosis response {}", request_id);
            return false;
        }
        self.awaiting = None;

        match outcome {
            Ok(result) => {
                self.diagnosis = Some(result);
            }
            Err(e) => {
                tracing::error!("AI architect connection error: {}", e);
                self.diagnosis = None;
            }
        }
        true
    }

    /// Navigate to a directory entry and close
    pub fn select_entry(&mut self, page: PageId, navigator: &mut dyn Navigator) {
        navigator.navigate(page.as_str());
        self.close();
    }

    /// Accept the diagnosis recommendation: navigate to its target and close
    ///
    /// Returns false if there is no diagnosis to accept.
    pub fn accept_recommendation(&mut self, navigator: &mut dyn Navigator) -> bool {
        let Some(target) = self.diagnosis.as_ref().map(|d| d.target_page.clone()) else {
            return false;
        };
        navigator.navigate(&target);
        self.close();
        true
    }

    /// Replace the query with a suggested follow-up
    pub fn apply_suggestion(&mut self, suggestion: &str, now: Instant) {
        self.set_query(suggestion, now);
    }

    /// Replace the query with a starter prompt and show the AI tab
    pub fn apply_quick_prompt(&mut self, prompt: &str, now: Instant) {
        self.set_query(prompt, now);
        self.tab = ModalTab::Ai;
    }
}

impl Default for SearchModal {
    fn default() -> Self {
        Self::new(ModalConfig::default())
    }
}

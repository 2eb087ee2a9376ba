// Intake forms and the partner tip advisor
//
// Submissions never leave the process: a submit waits out a fixed simulated
// latency and then shows a success notice that expires on its own.

use crate::debounce::Debouncer;
use crate::error::{FinishError, Result};
use crate::llm::{CompletionRequest, TextCompletion};
use crate::pages::PageId;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How long the success notice stays up before the form resets
pub const NOTICE_WINDOW: Duration = Duration::from_secs(8);

/// Quiet period before a partner tip is requested
pub const TIP_DEBOUNCE: Duration = Duration::from_millis(1500);

/// A partner field must be longer than this before tips are requested
pub const TIP_MIN_FIELD_CHARS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Diagnostic,
    Blueprint,
    Partner,
}

impl FormKind {
    /// The form hosted on `page`, if it is an intake page
    pub fn for_page(page: PageId) -> Option<Self> {
        match page {
            PageId::Diagnostic => Some(FormKind::Diagnostic),
            PageId::BlueprintIntake => Some(FormKind::Blueprint),
            PageId::PartnerIntake => Some(FormKind::Partner),
            _ => None,
        }
    }

    pub fn simulated_latency(&self) -> Duration {
        match self {
            FormKind::Diagnostic => Duration::from_secs(2),
            FormKind::Blueprint => Duration::from_millis(1500),
            FormKind::Partner => Duration::from_secs(2),
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match self {
            FormKind::Diagnostic => "Submit Diagnostic",
            FormKind::Blueprint => "Request My Blueprint",
            FormKind::Partner => "Establish Partnership",
        }
    }

    pub fn submitting_label(&self) -> &'static str {
        match self {
            FormKind::Diagnostic => "Analyzing...",
            FormKind::Blueprint => "Submitting Vision...",
            FormKind::Partner => "Linking...",
        }
    }

    pub fn success_notice(&self) -> &'static str {
        match self {
            FormKind::Diagnostic => {
                "Diagnostic received. A senior engineer will review it within 24 hours."
            }
            FormKind::Blueprint => "Vision received. Your blueprint session is being scheduled.",
            FormKind::Partner => "strategic link established. we'll reach out within 24 hours.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStatus {
    Idle,
    Submitting,
    Success,
}

#[derive(Debug, Clone)]
pub struct IntakeForm {
    kind: FormKind,
    status: FormStatus,
    latency: Duration,
    succeeded_at: Option<Instant>,
}

impl IntakeForm {
    pub fn new(kind: FormKind) -> Self {
        Self {
            kind,
            status: FormStatus::Idle,
            latency: kind.simulated_latency(),
            succeeded_at: None,
        }
    }

    /// Override the simulated latency
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn kind(&self) -> FormKind {
        self.kind
    }

    pub fn status(&self) -> FormStatus {
        self.status
    }

    pub fn is_submitting(&self) -> bool {
        self.status == FormStatus::Submitting
    }

    /// Start a submission; returns the latency to wait before `complete_submit`
    ///
    /// Returns None while a submission is already running.
    pub fn begin_submit(&mut self) -> Option<Duration> {
        if self.status == FormStatus::Submitting {
            return None;
        }
        self.status = FormStatus::Submitting;
        self.succeeded_at = None;
        tracing::debug!("{:?} intake submitting", self.kind);
        Some(self.latency)
    }

    pub fn complete_submit(&mut self, now: Instant) {
        if self.status != FormStatus::Submitting {
            return;
        }
        self.status = FormStatus::Success;
        self.succeeded_at = Some(now);
        tracing::info!("{:?} intake submitted", self.kind);
    }

    /// Run a whole submission in place; false if one was already running
    pub async fn submit(&mut self) -> bool {
        let Some(latency) = self.begin_submit() else {
            return false;
        };
        tokio::time::sleep(latency).await;
        self.complete_submit(Instant::now());
        true
    }

    /// Reset to Idle once the success notice has been up for its window
    pub fn expire_notice(&mut self, now: Instant) -> bool {
        match self.succeeded_at {
            Some(at) if self.status == FormStatus::Success && now >= at + NOTICE_WINDOW => {
                self.status = FormStatus::Idle;
                self.succeeded_at = None;
                true
            }
            _ => false,
        }
    }

    /// When the success notice will expire, if one is showing
    pub fn notice_deadline(&self) -> Option<Instant> {
        self.succeeded_at.map(|at| at + NOTICE_WINDOW)
    }
}

/// Fields of the partner intake form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartnerProfile {
    pub org_name: String,
    pub partner_type: String,
    pub contact_name: String,
    pub contact_email: String,
    pub client_profile: String,
    pub tech_capabilities: String,
    pub collaboration_goals: String,
    pub interests: Vec<String>,
}

impl PartnerProfile {
    pub fn toggle_interest(&mut self, interest: &str) {
        if let Some(pos) = self.interests.iter().position(|i| i == interest) {
            self.interests.remove(pos);
        } else {
            self.interests.push(interest.to_string());
        }
    }

    /// Enough detail has been written to ask for a tip
    pub fn wants_tip(&self) -> bool {
        self.collaboration_goals.chars().count() > TIP_MIN_FIELD_CHARS
            || self.tech_capabilities.chars().count() > TIP_MIN_FIELD_CHARS
    }
}

pub fn build_tip_prompt(profile: &PartnerProfile) -> String {
    format!(
        "Act as the Partnerships Director at FINISH Inc.\n\
         A potential partner is filling out our intake form.\n\
         Type: {}\n\
         Capabilities: {}\n\
         Goals: {}\n\n\
         Provide a 2-sentence \"Strategic Alignment Tip\" in lowercase.\n\
         Focus on how FINISH Inc can specifically unblock their model (e.g., handling their technical overflow or providing 24/7 engineering reserve).\n\
         Avoid fluff. Be technical and professional.",
        profile.partner_type, profile.tech_capabilities, profile.collaboration_goals
    )
}

/// A tip the host should fetch and report back through `apply_tip`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TipRequest {
    pub id: u64,
    pub prompt: String,
}

pub struct PartnerTipAdvisor {
    debouncer: Debouncer,
    next_request_id: u64,
    awaiting: Option<u64>,
    tip: String,
}

impl PartnerTipAdvisor {
    pub fn new() -> Self {
        Self {
            debouncer: Debouncer::new(TIP_DEBOUNCE),
            next_request_id: 0,
            awaiting: None,
            tip: String::new(),
        }
    }

    /// Latest tip; empty until one arrives
    pub fn tip(&self) -> &str {
        &self.tip
    }

    pub fn is_thinking(&self) -> bool {
        self.awaiting.is_some()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Call after any edit to the goals or capabilities fields
    pub fn profile_changed(&mut self, profile: &PartnerProfile, now: Instant) {
        if profile.wants_tip() {
            self.debouncer.schedule(now);
        }
    }

    pub fn poll(&mut self, profile: &PartnerProfile, now: Instant) -> Option<TipRequest> {
        if !self.debouncer.fire(now) {
            return None;
        }
        self.next_request_id += 1;
        self.awaiting = Some(self.next_request_id);
        Some(TipRequest {
            id: self.next_request_id,
            prompt: build_tip_prompt(profile),
        })
    }

    /// Returns false for a stale response
    pub fn apply_tip(&mut self, request_id: u64, outcome: Result<String>) -> bool {
        if self.awaiting != Some(request_id) {
            tracing::warn!("Discarding stale partner tip {}", request_id);
            return false;
        }
        self.awaiting = None;
        match outcome {
            Ok(tip) => self.tip = tip.trim().to_string(),
            Err(e) => tracing::error!("ai tip failed: {}", e),
        }
        true
    }
}

impl Default for PartnerTipAdvisor {
    fn default() -> Self {
        Self::new()
    }
}

/// Run a tip request against the completion service
///
/// # Errors
/// `CompletionTransport` when the call fails or exceeds `timeout`.
pub async fn fetch_tip(
    completion: Arc<dyn TextCompletion>,
    prompt: String,
    timeout: Duration,
) -> Result<String> {
    let call = completion.complete(CompletionRequest::text(prompt));
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(FinishError::CompletionTransport(format!("{:#}", e))),
        Err(_) => Err(FinishError::CompletionTransport(format!(
            "no tip within {:?}",
            timeout
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockTextCompletion;

    fn detailed_profile() -> PartnerProfile {
        PartnerProfile {
            partner_type: "Agency".into(),
            collaboration_goals: "Overflow capacity for client launches".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_submit_lifecycle() {
        let mut form = IntakeForm::new(FormKind::Diagnostic);
        let t0 = Instant::now();

        assert_eq!(form.begin_submit(), Some(Duration::from_secs(2)));
        assert!(form.is_submitting());
        assert_eq!(form.begin_submit(), None);

        form.complete_submit(t0);
        assert_eq!(form.status(), FormStatus::Success);
        assert!(!form.expire_notice(t0 + Duration::from_secs(7)));
        assert!(form.expire_notice(t0 + NOTICE_WINDOW));
        assert_eq!(form.status(), FormStatus::Idle);
    }

    #[test]
    fn test_latencies() {
        assert_eq!(
            IntakeForm::new(FormKind::Blueprint).begin_submit(),
            Some(Duration::from_millis(1500))
        );
        assert_eq!(
            IntakeForm::new(FormKind::Partner).begin_submit(),
            Some(Duration::from_secs(2))
        );
    }

    #[tokio::test]
    async fn test_async_submit() {
        let mut form = IntakeForm::new(FormKind::Partner).with_latency(Duration::ZERO);
        assert!(form.submit().await);
        assert_eq!(form.status(), FormStatus::Success);
        assert!(form.notice_deadline().is_some());
    }

    #[test]
    fn test_intake_pages() {
        assert_eq!(FormKind::for_page(PageId::Diagnostic), Some(FormKind::Diagnostic));
        assert_eq!(FormKind::for_page(PageId::PartnerIntake), Some(FormKind::Partner));
        assert_eq!(FormKind::for_page(PageId::Pricing), None);
    }

    #[test]
    fn test_toggle_interest() {
        let mut profile = PartnerProfile::default();
        profile.toggle_interest("White-label");
        profile.toggle_interest("Referral");
        profile.toggle_interest("White-label");
        assert_eq!(profile.interests, vec!["Referral".to_string()]);
    }

    #[test]
    fn test_short_fields_do_not_schedule() {
        let mut advisor = PartnerTipAdvisor::new();
        let profile = PartnerProfile {
            tech_capabilities: "exactly twenty chars".into(),
            ..Default::default()
        };
        let t0 = Instant::now();
        advisor.profile_changed(&profile, t0);
        assert!(advisor.poll(&profile, t0 + Duration::from_secs(5)).is_none());
    }

    #[test]
    fn test_tip_request_after_quiet_period() {
        let mut advisor = PartnerTipAdvisor::new();
        let profile = detailed_profile();
        let t0 = Instant::now();

        advisor.profile_changed(&profile, t0);
        assert!(advisor.poll(&profile, t0 + Duration::from_millis(1000)).is_none());
        let request = advisor.poll(&profile, t0 + TIP_DEBOUNCE).unwrap();
        assert!(request.prompt.contains("Type: Agency"));
        assert!(request.prompt.contains("Goals: Overflow capacity"));
        assert!(advisor.is_thinking());

        assert!(advisor.apply_tip(request.id, Ok(" handle their overflow. ".into())));
        assert_eq!(advisor.tip(), "handle their overflow.");
    }

    #[test]
    fn test_failure_keeps_previous_tip_and_stale_is_dropped() {
        let mut advisor = PartnerTipAdvisor::new();
        let profile = detailed_profile();
        let t0 = Instant::now();

        advisor.profile_changed(&profile, t0);
        let first = advisor.poll(&profile, t0 + TIP_DEBOUNCE).unwrap();
        advisor.apply_tip(first.id, Ok("first tip".into()));

        advisor.profile_changed(&profile, t0 + Duration::from_secs(3));
        let second = advisor.poll(&profile, t0 + Duration::from_secs(5)).unwrap();
        advisor.profile_changed(&profile, t0 + Duration::from_secs(6));
        let third = advisor.poll(&profile, t0 + Duration::from_secs(8)).unwrap();

        assert!(!advisor.apply_tip(second.id, Ok("stale".into())));
        assert!(advisor.apply_tip(
            third.id,
            Err(FinishError::CompletionTransport("down".into()))
        ));
        assert_eq!(advisor.tip(), "first tip");
        assert!(!advisor.is_thinking());
    }

    #[tokio::test]
    async fn test_fetch_tip_maps_errors() {
        let mut completion = MockTextCompletion::new();
        completion
            .expect_complete()
            .withf(|request| !request.json_response)
            .returning(|_| Err(anyhow::anyhow!("quota exceeded")));

        let err = fetch_tip(Arc::new(completion), "p".into(), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, FinishError::CompletionTransport(ref m) if m.contains("quota")));
    }
}

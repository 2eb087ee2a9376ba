// UI-side types shared by the host and its views

use finishlab::diagnosis::DiagnosisResult;
use finishlab::intake::FormKind;

/// Outcome of a background task, delivered to the UI thread over the event channel
#[derive(Debug)]
pub enum RemoteEvent {
    Diagnosis {
        id: u64,
        outcome: finishlab::Result<DiagnosisResult>,
    },
    ChatReply(finishlab::Result<String>),
    PartnerTip {
        id: u64,
        outcome: finishlab::Result<String>,
    },
    IntakeSubmitted(FormKind),
}

/// Interests offered on the partner intake form
pub const PARTNER_INTERESTS: [&str; 4] = [
    "White-label delivery",
    "Overflow engineering",
    "Technical due diligence",
    "Referral partnership",
];

// Remote diagnosis client
//
// One stateless, JSON-constrained completion per query. The response is parsed
// into a DiagnosisResult or rejected outright; a half-parsed diagnosis is never
// handed to the caller.

use crate::directory;
use crate::error::{FinishError, Result};
use crate::llm::{CompletionRequest, TextCompletion};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default upper bound on a single remote call
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The studio's fixed set of offerings a diagnosis can recommend
///
/// Deserialization ignores case, accepts the catalogue names (such as
/// "Surgical Debug Call") and drops a trailing price like "($299)".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ServiceOffering {
    #[serde(rename = "Surgical Call")]
    SurgicalCall,
    #[serde(rename = "Stabilize & Ship")]
    StabilizeAndShip,
    #[serde(rename = "Production Refactor")]
    ProductionRefactor,
    #[serde(rename = "FINISH Start")]
    FinishStart,
}

impl ServiceOffering {
    pub const ALL: [ServiceOffering; 4] = [
        ServiceOffering::SurgicalCall,
        ServiceOffering::StabilizeAndShip,
        ServiceOffering::ProductionRefactor,
        ServiceOffering::FinishStart,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ServiceOffering::SurgicalCall => "Surgical Call",
            ServiceOffering::StabilizeAndShip => "Stabilize & Ship",
            ServiceOffering::ProductionRefactor => "Production Refactor",
            ServiceOffering::FinishStart => "FINISH Start",
        }
    }

    /// Resolve a model-written offering name
    pub fn from_label(raw: &str) -> Option<Self> {
        let mut name = raw.trim();
        if let Some((head, price)) = name.rsplit_once('(') {
            if price.trim_end().ends_with(')') {
                name = head.trim_end();
            }
        }
        let name = name.to_lowercase();

        match name.as_str() {
            "surgical call" | "surgical debug call" => Some(ServiceOffering::SurgicalCall),
            "stabilize & ship" | "stabilize and ship" => Some(ServiceOffering::StabilizeAndShip),
            "production refactor" => Some(ServiceOffering::ProductionRefactor),
            "finish start" => Some(ServiceOffering::FinishStart),
            _ => None,
        }
    }

    /// Catalogue line used in the diagnosis prompt
    fn catalogue_entry(&self) -> &'static str {
        match self {
            ServiceOffering::SurgicalCall => {
                "Surgical Debug Call ($299): 1-hour live session for single blockers."
            }
            ServiceOffering::StabilizeAndShip => {
                "Stabilize & Ship ($995): Bridge for AI-built apps (Cursor/Lovable/Bolt) to Production."
            }
            ServiceOffering::ProductionRefactor => {
                "Production Refactor ($2,995): Full debt clearing and scaling prep."
            }
            ServiceOffering::FinishStart => "FINISH Start: Pre-code blueprints for new ideas.",
        }
    }
}

impl<'de> Deserialize<'de> for ServiceOffering {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        ServiceOffering::from_label(&raw)
            .ok_or_else(|| de::Error::custom(format!("unknown offering: {}", raw)))
    }
}

impl fmt::Display for ServiceOffering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Structured triage of a free-text technical blocker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisResult {
    pub problem_summary: String,
    pub technical_path: String,
    pub recommended_service: ServiceOffering,
    pub logic: String,
    /// Page the recommendation leads to; kept raw so navigation can fail open
    pub target_page: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub suggestions: Vec<String>,
}

impl DiagnosisResult {
    /// Label for the call-to-action that accepts the recommendation
    pub fn cta_label(&self) -> String {
        format!("Explore {}", self.recommended_service)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Build the instructional prompt for one diagnosis
pub fn build_diagnosis_prompt(query: &str, target_ids: &[&str]) -> String {
    let catalogue: String = ServiceOffering::ALL
        .iter()
        .map(|s| format!("- {}\n", s.catalogue_entry()))
        .collect();
    let services: Vec<&str> = ServiceOffering::ALL.iter().map(|s| s.label()).collect();

    format!(
        r#"Act as the Lead Solutions Architect at FINISH Inc.
Your specialty is resolving high-friction technical blockers for modern web apps (Next.js, Node, Stripe, Supabase, AWS).

Analyze the following user query for signals of:
1. AUTH LOOPS: Hydration mismatches, JWT persistence, Clerk/Auth0 custom wiring.
2. PAYMENTS: Stripe webhook sync, multi-tier plan gating, subscription state recovery.
3. DATA DEBT: Messy Prisma schemas, circular relations, slow PostgreSQL queries.
4. INFRA: Vercel deployment loops, DNS/SSL failures, CI/CD pipeline breakage.

FINISH Inc Model:
{catalogue}
Query: "{query}"

Respond with a JSON object ONLY:
{{
  "problemSummary": "1-sentence senior technical summary",
  "technicalPath": "The specific engineering execution steps needed to fix this",
  "recommendedService": "{services}",
  "logic": "Architectural reasoning for this recommendation",
  "targetPage": "One of: {targets}",
  "suggestions": ["3 short technical follow-ups like 'Fix hydration error' or 'Scale DB'"]
}}"#,
        catalogue = catalogue,
        query = query,
        services = services.join(" | "),
        targets = target_ids.join(", "),
    )
}

/// Parse a diagnosis response body
///
/// Tolerates a surrounding Markdown code fence. Missing required fields, an
/// unknown offering, or a blank summary/target are all parse errors.
pub fn parse_diagnosis(text: &str) -> Result<DiagnosisResult> {
    let body = strip_code_fence(text);

    let result: DiagnosisResult = serde_json::from_str(body)
        .map_err(|e| FinishError::DiagnosisParse(e.to_string()))?;

    if result.problem_summary.trim().is_empty() {
        return Err(FinishError::DiagnosisParse(
            "problemSummary is empty".to_string(),
        ));
    }
    if result.target_page.trim().is_empty() {
        return Err(FinishError::DiagnosisParse("targetPage is empty".to_string()));
    }

    Ok(result)
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // drop an optional language tag on the opening fence line
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or(rest);
    rest.trim_end().trim_end_matches("```").trim()
}

/// Client for the stateless structured diagnosis call
#[derive(Clone)]
pub struct DiagnosisClient {
    completion: Arc<dyn TextCompletion>,
    timeout: Duration,
}

impl DiagnosisClient {
    pub fn new(completion: Arc<dyn TextCompletion>) -> Self {
        Self {
            completion,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Diagnose a free-text blocker with a single remote call
    ///
    /// # Errors
    /// - `DiagnosisTransport`: the call failed or exceeded the timeout
    /// - `DiagnosisParse`: the response was not a complete diagnosis
    pub async fn diagnose(&self, free_text: &str) -> Result<DiagnosisResult> {
        let prompt = build_diagnosis_prompt(free_text, &directory::target_ids());
        let request = CompletionRequest::json(prompt);

        let text = match tokio::time::timeout(self.timeout, self.completion.complete(request)).await
        {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => return Err(FinishError::DiagnosisTransport(format!("{:#}", e))),
            Err(_) => {
                return Err(FinishError::DiagnosisTransport(format!(
                    "no response within {:?}",
                    self.timeout
                )))
            }
        };

        let result = parse_diagnosis(&text)?;
        tracing::info!(
            "Diagnosis ready: {} -> {}",
            result.recommended_service,
            result.target_page
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockTextCompletion;

    const SAMPLE: &str = r#"{"problemSummary":"Webhook signature mismatch","technicalPath":"Verify signing secret and raw body parsing","recommendedService":"Surgical Call","logic":"...","targetPage":"diagnostic","suggestions":["Fix signature verification","Check raw body","Rotate secret"]}"#;

    #[test]
    fn test_parse_complete_response() {
        let result = parse_diagnosis(SAMPLE).unwrap();
        assert_eq!(result.problem_summary, "Webhook signature mismatch");
        assert_eq!(result.recommended_service, ServiceOffering::SurgicalCall);
        assert_eq!(result.target_page, "diagnostic");
        assert_eq!(result.suggestions.len(), 3);
        assert_eq!(result.cta_label(), "Explore Surgical Call");
    }

    #[test]
    fn test_parse_fenced_response() {
        let fenced = format!("```json\n{}\n```", SAMPLE);
        assert_eq!(parse_diagnosis(&fenced).unwrap(), parse_diagnosis(SAMPLE).unwrap());
    }

    #[test]
    fn test_parse_tolerates_suggestion_count() {
        let none = r#"{"problemSummary":"s","technicalPath":"t","recommendedService":"FINISH Start","logic":"l","targetPage":"idea-stage"}"#;
        assert!(parse_diagnosis(none).unwrap().suggestions.is_empty());

        let many = r#"{"problemSummary":"s","technicalPath":"t","recommendedService":"Production Refactor","logic":"l","targetPage":"for-developers","suggestions":["a","b","c","d","e"]}"#;
        assert_eq!(parse_diagnosis(many).unwrap().suggestions.len(), 5);
    }

    fn with_service(service: &str) -> String {
        format!(
            r#"{{"problemSummary":"s","technicalPath":"t","recommendedService":"{}","logic":"l","targetPage":"pricing"}}"#,
            service
        )
    }

    #[test]
    fn test_parse_accepts_offering_aliases() {
        let cases = [
            ("Surgical Debug Call", ServiceOffering::SurgicalCall),
            ("Surgical Debug Call ($299)", ServiceOffering::SurgicalCall),
            ("Stabilize and Ship", ServiceOffering::StabilizeAndShip),
            ("Production Refactor ($2,995)", ServiceOffering::ProductionRefactor),
            ("FINISH START", ServiceOffering::FinishStart),
            ("  finish start ", ServiceOffering::FinishStart),
        ];
        for (service, expected) in cases {
            let parsed = parse_diagnosis(&with_service(service)).unwrap();
            assert_eq!(parsed.recommended_service, expected, "for {:?}", service);
        }
    }

    #[test]
    fn test_parse_rejects_unknown_offering_even_with_price() {
        for service in ["Retainer ($5,000)", "Surgical", "($299)"] {
            assert!(matches!(
                parse_diagnosis(&with_service(service)),
                Err(FinishError::DiagnosisParse(_))
            ));
        }
    }

    #[test]
    fn test_parse_treats_null_suggestions_as_empty() {
        let body = r#"{"problemSummary":"s","technicalPath":"t","recommendedService":"Surgical Call","logic":"l","targetPage":"faq","suggestions":null}"#;
        assert!(parse_diagnosis(body).unwrap().suggestions.is_empty());
    }

    #[test]
    fn test_offering_serializes_canonical_label() {
        let json = serde_json::to_value(ServiceOffering::StabilizeAndShip).unwrap();
        assert_eq!(json, "Stabilize & Ship");
    }

    #[test]
    fn test_parse_rejects_incomplete_or_garbage() {
        let missing_logic = r#"{"problemSummary":"s","technicalPath":"t","recommendedService":"Surgical Call","targetPage":"faq"}"#;
        let unknown_service = r#"{"problemSummary":"s","technicalPath":"t","recommendedService":"Retainer","logic":"l","targetPage":"faq"}"#;
        let blank_summary = r#"{"problemSummary":"  ","technicalPath":"t","recommendedService":"Surgical Call","logic":"l","targetPage":"faq"}"#;

        for body in [missing_logic, unknown_service, blank_summary, "", "Sure! Here is", "[]"] {
            match parse_diagnosis(body) {
                Err(FinishError::DiagnosisParse(_)) => {}
                other => panic!("Expected DiagnosisParse for {:?}, got {:?}", body, other),
            }
        }
    }

    #[test]
    fn test_parse_keeps_unknown_target_page() {
        let body = r#"{"problemSummary":"s","technicalPath":"t","recommendedService":"Surgical Call","logic":"l","targetPage":"careers"}"#;
        assert_eq!(parse_diagnosis(body).unwrap().target_page, "careers");
    }

    #[test]
    fn test_prompt_contains_query_and_targets() {
        let prompt = build_diagnosis_prompt("auth loop bug", &["home", "diagnostic"]);
        assert!(prompt.contains("Query: \"auth loop bug\""));
        assert!(prompt.contains("\"targetPage\": \"One of: home, diagnostic\""));
        assert!(prompt
            .contains("Surgical Call | Stabilize & Ship | Production Refactor | FINISH Start"));
        assert!(prompt.contains("Surgical Debug Call ($299)"));
    }

    #[tokio::test]
    async fn test_diagnose_sends_json_request() {
        let mut mock = MockTextCompletion::new();
        mock.expect_complete()
            .withf(|req| req.json_response && req.prompt.contains("stripe webhook"))
            .times(1)
            .returning(|_| Ok(SAMPLE.to_string()));

        let client = DiagnosisClient::new(Arc::new(mock));
        let result = client.diagnose("stripe webhook failing").await.unwrap();
        assert_eq!(result.target_page, "diagnostic");
    }

    #[tokio::test]
    async fn test_diagnose_maps_transport_failure() {
        let mut mock = MockTextCompletion::new();
        mock.expect_complete()
            .returning(|_| Err(anyhow::anyhow!("connection reset")));

        let client = DiagnosisClient::new(Arc::new(mock));
        match client.diagnose("anything at all").await {
            Err(FinishError::DiagnosisTransport(msg)) => assert!(msg.contains("connection reset")),
            other => panic!("Expected DiagnosisTransport, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_diagnose_maps_bad_json() {
        let mut mock = MockTextCompletion::new();
        mock.expect_complete()
            .returning(|_| Ok("{\"problemSummary\": \"half".to_string()));

        let client = DiagnosisClient::new(Arc::new(mock));
        assert!(matches!(
            client.diagnose("anything at all").await,
            Err(FinishError::DiagnosisParse(_))
        ));
    }
}

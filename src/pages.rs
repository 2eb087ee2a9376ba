// Page catalogue and navigation
//
// PageId is the closed enumeration every navigation target is checked against.
// Navigator is the seam the modal, the chat widget and the rich-text route
// controls call through; Router is the host-side implementation that owns the
// visible page, the location fragment, and the document metadata.

use crate::error::FinishError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[cfg(test)]
use mockall::automock;

/// Every page of the site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageId {
    Home,
    HowItWorks,
    Portfolio,
    Pricing,
    WhyFinish,
    Faq,
    Diagnostic,
    Partner,
    PartnerIntake,
    Stories,
    ForFounders,
    ForStartups,
    ForDevelopers,
    IdeaStage,
    BlueprintWorkflow,
    BlueprintIntake,
    PrivacyPolicy,
    TermsOfService,
}

impl PageId {
    pub const ALL: [PageId; 18] = [
        PageId::Home,
        PageId::HowItWorks,
        PageId::Portfolio,
        PageId::Pricing,
        PageId::WhyFinish,
        PageId::Faq,
        PageId::Diagnostic,
        PageId::Partner,
        PageId::PartnerIntake,
        PageId::Stories,
        PageId::ForFounders,
        PageId::ForStartups,
        PageId::ForDevelopers,
        PageId::IdeaStage,
        PageId::BlueprintWorkflow,
        PageId::BlueprintIntake,
        PageId::PrivacyPolicy,
        PageId::TermsOfService,
    ];

    /// The identifier as it appears in routes and location fragments
    pub fn as_str(&self) -> &'static str {
        match self {
            PageId::Home => "home",
            PageId::HowItWorks => "how-it-works",
            PageId::Portfolio => "portfolio",
            PageId::Pricing => "pricing",
            PageId::WhyFinish => "why-finish",
            PageId::Faq => "faq",
            PageId::Diagnostic => "diagnostic",
            PageId::Partner => "partner",
            PageId::PartnerIntake => "partner-intake",
            PageId::Stories => "stories",
            PageId::ForFounders => "for-founders",
            PageId::ForStartups => "for-startups",
            PageId::ForDevelopers => "for-developers",
            PageId::IdeaStage => "idea-stage",
            PageId::BlueprintWorkflow => "blueprint-workflow",
            PageId::BlueprintIntake => "blueprint-intake",
            PageId::PrivacyPolicy => "privacy-policy",
            PageId::TermsOfService => "terms-of-service",
        }
    }

    /// Document title and meta description shown while this page is active
    pub fn metadata(&self) -> PageMetadata {
        let (title, description) = match self {
            PageId::Home => (
                "FINISH | Your App. Actually Finished.",
                "Take your AI-built or prototype app to production with FINISH Inc.",
            ),
            PageId::HowItWorks => (
                "How It Works | FINISH Process",
                "Our 3-step engineering pipeline to stabilize, wire, and ship your application.",
            ),
            PageId::Portfolio => (
                "Portfolio | Shipped by FINISH",
                "Explore the high-fidelity projects we have bridged from prototype to production.",
            ),
            PageId::Pricing => (
                "Pricing & Packages | FINISH Inc",
                "Transparent pricing for software finishing.",
            ),
            PageId::WhyFinish => (
                "Why FINISH? | The Last Mile Engineering",
                "Learn why AI apps fail at 80% and how our human engineers bridge the gap.",
            ),
            PageId::Faq => (
                "Technical FAQ | FINISH Inc Support",
                "Frequently asked questions about IP ownership and process.",
            ),
            PageId::Diagnostic => (
                "Fix My App | Diagnostic Intake Form",
                "Submit your project details for a 24-hour fixed-price project quote.",
            ),
            PageId::Partner => (
                "Startup Partnerships & VC Technical Due Diligence | FINISH Inc",
                "Powering VCs with expert technical due diligence and agencies with premium white-label software services.",
            ),
            PageId::PartnerIntake => (
                "Partner Onboarding | FINISH Inc",
                "Apply to join our partner ecosystem as a VC, Agency, or Individual.",
            ),
            PageId::Stories => (
                "Founder Stories | Shipped by FINISH",
                "Real-world case studies of apps that were stuck.",
            ),
            PageId::ForFounders => (
                "For Founders | FINISH Inc",
                "Specialized support for solo founders and visionaries.",
            ),
            PageId::ForStartups => (
                "For Startups | FINISH Inc",
                "Augmented engineering teams for scaling startups.",
            ),
            PageId::ForDevelopers => (
                "For Developers | FINISH Inc",
                "Technical refactoring and infrastructure support.",
            ),
            PageId::IdeaStage => (
                "FINISH Start | Idea to Product",
                "Turn your concept into a production-grade MVP and architecture.",
            ),
            PageId::BlueprintWorkflow => (
                "Blueprint Workflow | FINISH Start",
                "Our 7-day technical blueprint sprint for new ideas.",
            ),
            PageId::BlueprintIntake => (
                "Apply for Blueprint | FINISH Start",
                "Start your technical roadmap journey with FINISH.",
            ),
            PageId::PrivacyPolicy => (
                "Privacy Policy | FINISH Inc",
                "How we handle your project data and intellectual property.",
            ),
            PageId::TermsOfService => (
                "Terms of Service | FINISH Inc",
                "Our commercial terms and fixed-price guarantees.",
            ),
        };
        PageMetadata { title, description }
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageId {
    type Err = FinishError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PageId::ALL
            .iter()
            .copied()
            .find(|page| page.as_str() == s)
            .ok_or_else(|| FinishError::InvalidNavigationTarget(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: &'static str,
    pub description: &'static str,
}

impl PageMetadata {
    /// Title up to the first ` | ` separator, for link captions
    pub fn short_title(&self) -> &'static str {
        self.title.split(" | ").next().unwrap_or(self.title)
    }
}

/// The navigation collaborator
///
/// Targets arrive as raw identifiers because route directives in assistant
/// text and diagnosis records may name pages that do not exist. Implementations
/// must ignore unknown identifiers instead of failing.
#[cfg_attr(test, automock)]
pub trait Navigator {
    fn navigate(&mut self, target: &str);
}

/// Host-side navigation state: the visible page plus its location fragment and
/// document metadata
#[derive(Debug, Clone)]
pub struct Router {
    current: PageId,
    location_hash: String,
    document_title: String,
    meta_description: String,
    scroll_to_top: bool,
}

impl Router {
    pub fn new() -> Self {
        let mut router = Self {
            current: PageId::Home,
            location_hash: String::new(),
            document_title: String::new(),
            meta_description: String::new(),
            scroll_to_top: false,
        };
        router.apply_metadata();
        router
    }

    pub fn current(&self) -> PageId {
        self.current
    }

    pub fn location_hash(&self) -> &str {
        &self.location_hash
    }

    pub fn document_title(&self) -> &str {
        &self.document_title
    }

    pub fn meta_description(&self) -> &str {
        &self.meta_description
    }

    /// Navigate to a known page
    pub fn go(&mut self, page: PageId) {
        tracing::info!("Navigating to {}", page);
        self.current = page;
        self.location_hash = format!("#{}", page.as_str());
        self.scroll_to_top = true;
        self.apply_metadata();
    }

    /// React to an externally changed location fragment (`#pricing` or `pricing`)
    ///
    /// Empty or unknown fragments leave the current page alone.
    pub fn handle_hash_change(&mut self, hash: &str) {
        let id = hash.trim_start_matches('#');
        if id.is_empty() {
            return;
        }
        match id.parse::<PageId>() {
            Ok(page) => {
                self.current = page;
                self.location_hash = format!("#{}", id);
                self.apply_metadata();
            }
            Err(e) => tracing::debug!("Ignoring location fragment: {}", e),
        }
    }

    /// Returns true once after each navigation so the host can reset its scroll offset
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_to_top)
    }

    fn apply_metadata(&mut self) {
        let meta = self.current.metadata();
        self.document_title = meta.title.to_string();
        self.meta_description = meta.description.to_string();
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator for Router {
    fn navigate(&mut self, target: &str) {
        match target.parse::<PageId>() {
            Ok(page) => self.go(page),
            Err(e) => tracing::warn!("{} (navigation ignored)", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_ids_round_trip_through_str() {
        for page in PageId::ALL {
            assert_eq!(page.as_str().parse::<PageId>().unwrap(), page);
        }
    }

    #[test]
    fn test_serde_uses_route_identifiers() {
        let json = serde_json::to_string(&PageId::HowItWorks).unwrap();
        assert_eq!(json, "\"how-it-works\"");
        let page: PageId = serde_json::from_str("\"terms-of-service\"").unwrap();
        assert_eq!(page, PageId::TermsOfService);
    }

    #[test]
    fn test_unknown_identifier_is_invalid_target() {
        match "blog".parse::<PageId>() {
            Err(FinishError::InvalidNavigationTarget(id)) => assert_eq!(id, "blog"),
            other => panic!("Expected InvalidNavigationTarget, got {:?}", other),
        }
    }

    #[test]
    fn test_short_title() {
        assert_eq!(PageId::Diagnostic.metadata().short_title(), "Fix My App");
        assert_eq!(PageId::Home.metadata().short_title(), "FINISH");
    }

    #[test]
    fn test_router_starts_home() {
        let router = Router::new();
        assert_eq!(router.current(), PageId::Home);
        assert_eq!(router.document_title(), "FINISH | Your App. Actually Finished.");
        assert!(router.location_hash().is_empty());
    }

    #[test]
    fn test_navigate_updates_hash_and_metadata() {
        let mut router = Router::new();
        router.navigate("pricing");

        assert_eq!(router.current(), PageId::Pricing);
        assert_eq!(router.location_hash(), "#pricing");
        assert_eq!(router.document_title(), "Pricing & Packages | FINISH Inc");
        assert_eq!(
            router.meta_description(),
            "Transparent pricing for software finishing."
        );
        assert!(router.take_scroll_request());
        assert!(!router.take_scroll_request());
    }

    #[test]
    fn test_navigate_unknown_target_is_noop() {
        let mut router = Router::new();
        router.navigate("faq");
        router.navigate("careers");

        assert_eq!(router.current(), PageId::Faq);
        assert_eq!(router.location_hash(), "#faq");
    }

    #[test]
    fn test_hash_change() {
        let mut router = Router::new();
        router.handle_hash_change("#stories");
        assert_eq!(router.current(), PageId::Stories);

        router.handle_hash_change("");
        router.handle_hash_change("#nope");
        assert_eq!(router.current(), PageId::Stories);

        router.handle_hash_change("idea-stage");
        assert_eq!(router.current(), PageId::IdeaStage);
        assert_eq!(router.document_title(), "FINISH Start | Idea to Product");
    }
}

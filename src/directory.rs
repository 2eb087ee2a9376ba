// Static content directory and local search over it
//
// The directory is compiled in and never mutated, so it is shared by reference
// everywhere. Search is a stable substring filter, cheap enough to run on every
// keystroke.

use crate::pages::PageId;

/// What a directory entry leads to; only changes the icon and label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    NavigablePage,
    Action,
}

impl EntryKind {
    pub fn label(&self) -> &'static str {
        match self {
            EntryKind::NavigablePage => "Page",
            EntryKind::Action => "Action",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub id: PageId,
    pub title: &'static str,
    pub description: &'static str,
    pub keywords: &'static [&'static str],
    pub kind: EntryKind,
    pub category: &'static str,
}

impl DirectoryEntry {
    /// Case-insensitive substring match against title, description or any keyword
    ///
    /// `needle` must already be lowercased.
    fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self
                .keywords
                .iter()
                .any(|k| k.to_lowercase().contains(needle))
    }
}

static DIRECTORY: [DirectoryEntry; 9] = [
    DirectoryEntry {
        id: PageId::Home,
        title: "Studio Home",
        description: "Core studio overview, engineering speed metrics, and trust signals.",
        keywords: &["start", "main", "landing", "finish"],
        kind: EntryKind::NavigablePage,
        category: "Overview",
    },
    DirectoryEntry {
        id: PageId::HowItWorks,
        title: "The Process",
        description: "Our 3-step engineering pipeline: Audit, Stabilize, and Ship.",
        keywords: &["process", "steps", "timeline", "methodology"],
        kind: EntryKind::NavigablePage,
        category: "Operations",
    },
    DirectoryEntry {
        id: PageId::Pricing,
        title: "Pricing & Tiers",
        description: "Transparent engineering rates from $299 to $2,995+.",
        keywords: &["cost", "price", "packages", "billing", "stripe"],
        kind: EntryKind::NavigablePage,
        category: "Commercials",
    },
    DirectoryEntry {
        id: PageId::IdeaStage,
        title: "Idea Stage (FINISH Start)",
        description: "Technical blueprints and MVP design for pre-code projects.",
        keywords: &["idea", "concept", "blueprint", "design", "start"],
        kind: EntryKind::NavigablePage,
        category: "Launch",
    },
    DirectoryEntry {
        id: PageId::ForFounders,
        title: "For Solo Founders",
        description: "Unblocking solo builders with CTO-on-demand support.",
        keywords: &["founder", "solo", "entrepreneur"],
        kind: EntryKind::NavigablePage,
        category: "Solutions",
    },
    DirectoryEntry {
        id: PageId::ForStartups,
        title: "For Scaling Startups",
        description: "Augmented engineering reserve teams for growth-stage companies.",
        keywords: &["startup", "scale", "team", "reserve"],
        kind: EntryKind::NavigablePage,
        category: "Solutions",
    },
    DirectoryEntry {
        id: PageId::ForDevelopers,
        title: "For Technical Leads",
        description: "Surgical refactoring and technical debt elimination.",
        keywords: &["developer", "code", "refactor", "debt", "tech"],
        kind: EntryKind::NavigablePage,
        category: "Solutions",
    },
    DirectoryEntry {
        id: PageId::Faq,
        title: "Technical FAQ",
        description: "IP ownership, security audits, and delivery guarantees.",
        keywords: &["help", "questions", "support", "ip"],
        kind: EntryKind::NavigablePage,
        category: "Support",
    },
    DirectoryEntry {
        id: PageId::Diagnostic,
        title: "Fix My App",
        description: "Priority engineering intake for a 24h project quote.",
        keywords: &["start", "quote", "apply", "intake", "bug", "broken"],
        kind: EntryKind::Action,
        category: "Action",
    },
];

/// The full directory in declared order
pub fn entries() -> &'static [DirectoryEntry] {
    &DIRECTORY
}

/// Lookup by page identifier
pub fn find(id: PageId) -> Option<&'static DirectoryEntry> {
    DIRECTORY.iter().find(|entry| entry.id == id)
}

/// Identifiers a diagnosis is allowed to target
pub fn target_ids() -> Vec<&'static str> {
    DIRECTORY.iter().map(|entry| entry.id.as_str()).collect()
}

/// Filter the directory by a free-text query
///
/// A blank query returns everything. Matches keep directory order; there is no
/// relevance ranking.
pub fn search(query: &str) -> Vec<&'static DirectoryEntry> {
    if query.trim().is_empty() {
        return DIRECTORY.iter().collect();
    }

    let needle = query.to_lowercase();
    DIRECTORY
        .iter()
        .filter(|entry| entry.matches(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn ids(results: &[&DirectoryEntry]) -> Vec<PageId> {
        results.iter().map(|e| e.id).collect()
    }

    #[test]
    fn test_ids_are_unique() {
        let unique: HashSet<_> = entries().iter().map(|e| e.id).collect();
        assert_eq!(unique.len(), entries().len());
    }

    #[test]
    fn test_blank_query_returns_everything_in_order() {
        let all = ids(&search(""));
        let spaced = ids(&search("   \t"));
        let declared: Vec<_> = entries().iter().map(|e| e.id).collect();

        assert_eq!(all, declared);
        assert_eq!(spaced, declared);
    }

    #[test]
    fn test_matches_title_description_and_keywords() {
        assert_eq!(ids(&search("process")), vec![PageId::HowItWorks]);
        assert_eq!(ids(&search("$299")), vec![PageId::Pricing]);
        assert_eq!(ids(&search("entrepreneur")), vec![PageId::ForFounders]);
    }

    #[test]
    fn test_keyword_substring_matches_preserve_order() {
        // "start" is a keyword for home, idea-stage and diagnostic, and a
        // substring of "Startups"
        assert_eq!(
            ids(&search("start")),
            vec![
                PageId::Home,
                PageId::IdeaStage,
                PageId::ForStartups,
                PageId::Diagnostic
            ]
        );
    }

    #[test]
    fn test_search_is_case_insensitive() {
        assert_eq!(ids(&search("STRIPE")), ids(&search("stripe")));
        assert_eq!(ids(&search("stripe")), vec![PageId::Pricing]);
        assert_eq!(ids(&search("fAq")), vec![PageId::Faq]);
    }

    #[test]
    fn test_results_are_ordered_subset_of_directory() {
        let all = ids(&search(""));
        for query in ["a", "se", "tech", "zzz", "Ship", "the"] {
            let found = ids(&search(query));
            let mut cursor = all.iter();
            for id in &found {
                assert!(
                    cursor.any(|candidate| candidate == id),
                    "{:?} out of order or missing for query {:?}",
                    id,
                    query
                );
            }
        }
    }

    #[test]
    fn test_no_match_is_empty() {
        assert!(search("kubernetes operator").is_empty());
    }

    #[test]
    fn test_find_and_target_ids() {
        assert_eq!(find(PageId::Diagnostic).unwrap().kind, EntryKind::Action);
        assert!(find(PageId::Portfolio).is_none());
        assert!(target_ids().contains(&"diagnostic"));
        assert_eq!(target_ids().len(), entries().len());
    }
}

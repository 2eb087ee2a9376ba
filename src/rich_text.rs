// Rich-text rendering for assistant replies
//
// Line oriented: each line goes through an ordered set of classifiers
// (blank, route directive, bullet, paragraph) and the text-bearing kinds are
// then split into inline spans. Pure functions only; no state survives a call.

use crate::pages::PageId;
use regex::Regex;
use std::sync::LazyLock;

/// Inline emphasis span
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Plain(String),
    Bold(String),
    Italic(String),
}

impl Span {
    pub fn text(&self) -> &str {
        match self {
            Span::Plain(s) | Span::Bold(s) | Span::Italic(s) => s,
        }
    }
}

/// One rendered line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Vertical spacing for an empty line
    Spacer,
    /// Actionable control that navigates to `target` when activated
    ///
    /// `target` is whatever the directive named after cleanup; it is not
    /// checked against the page catalogue here.
    Route { target: String },
    Bullet(Vec<Span>),
    Paragraph(Vec<Span>),
}

impl Block {
    /// The catalogued page a route control points at, if the target is known
    pub fn route_page(&self) -> Option<PageId> {
        match self {
            Block::Route { target } => target.parse().ok(),
            _ => None,
        }
    }
}

const ROUTE_PREFIX: &str = "route to: /";

/// Render a block of assistant text into display blocks
pub fn render(text: &str) -> Vec<Block> {
    text.split('\n')
        .map(|line| render_line(line.trim_end_matches('\r')))
        .collect()
}

/// Classify and render a single line
pub fn render_line(line: &str) -> Block {
    let trimmed = line.trim();

    if trimmed.is_empty() {
        return Block::Spacer;
    }
    if let Some(target) = parse_route_directive(trimmed) {
        return Block::Route { target };
    }
    if let Some(rest) = strip_bullet_marker(trimmed) {
        return Block::Bullet(tokenize_inline(rest));
    }
    Block::Paragraph(tokenize_inline(line))
}

/// Extract the page identifier from a `Route to: /id` or `/id` line
///
/// Takes the first path-looking token (from the first `/` up to whitespace) and
/// keeps only ASCII letters and hyphens.
pub fn parse_route_directive(trimmed: &str) -> Option<String> {
    let is_directive =
        trimmed.to_lowercase().starts_with(ROUTE_PREFIX) || trimmed.starts_with('/');
    if !is_directive {
        return None;
    }

    let path = trimmed
        .find('/')
        .map(|idx| &trimmed[idx..])
        .and_then(|rest| rest.split_whitespace().next())
        .unwrap_or("");

    Some(
        path.chars()
            .filter(|c| c.is_ascii_alphabetic() || *c == '-')
            .collect(),
    )
}

/// Remove a leading `* ` or `- ` bullet marker
pub fn strip_bullet_marker(trimmed: &str) -> Option<&str> {
    trimmed
        .strip_prefix("* ")
        .or_else(|| trimmed.strip_prefix("- "))
}

static EMPHASIS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*.*?\*\*|\*.*?\*").expect("emphasis pattern is valid"));

/// Split text into plain, bold (`**x**`) and italic (`*x*`) spans
///
/// Matching is non-greedy and leftmost. Markers that enclose nothing (a bare
/// `**`) stay literal, so unmatched emphasis never disappears from the output.
pub fn tokenize_inline(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut last = 0;

    for m in EMPHASIS_PATTERN.find_iter(text) {
        push_plain(&mut spans, &text[last..m.start()]);

        let token = m.as_str();
        if token.len() >= 4 && token.starts_with("**") && token.ends_with("**") {
            spans.push(Span::Bold(token[2..token.len() - 2].to_string()));
        } else if token.len() >= 3 {
            spans.push(Span::Italic(token[1..token.len() - 1].to_string()));
        } else {
            push_plain(&mut spans, token);
        }

        last = m.end();
    }
    push_plain(&mut spans, &text[last..]);

    spans
}

// Adjacent plain text is merged so literal markers do not fragment a run.
fn push_plain(spans: &mut Vec<Span>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Span::Plain(prev)) = spans.last_mut() {
        prev.push_str(text);
    } else {
        spans.push(Span::Plain(text.to_string()));
    }
}

/// Every route target mentioned in a rendered reply, in order
pub fn route_targets(blocks: &[Block]) -> Vec<&str> {
    blocks
        .iter()
        .filter_map(|block| match block {
            Block::Route { target } => Some(target.as_str()),
            _ => None,
        })
        .collect()
}

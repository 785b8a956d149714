//! Redaction of prompt-injection phrases from untrusted repository fields.

use regex::{NoExpand, Regex, RegexBuilder};
use std::sync::LazyLock;
use tracing::warn;

use super::matcher::PatternMatcher;
use crate::core::models::RepositorySummaryRequest;

/// Placeholder substituted for every redacted phrase.
pub const REDACTION_MARKER: &str = "[REDACTED]";

/// Server-side cap on README length, in characters.
pub const MAX_README_CHARS: usize = 20_000;

/// Phrases treated as instruction-override or exfiltration attempts.
/// Lower case; internal whitespace matches any whitespace run.
pub const FORBIDDEN_PATTERNS: &[&str] = &[
    "ignore previous",
    "ignore all previous",
    "ignore the above",
    "disregard previous",
    "disregard all prior",
    "forget previous instructions",
    "forget your instructions",
    "system prompt",
    "reveal your instructions",
    "jailbreak",
    "developer mode",
    "do anything now",
    "you are now",
    "pretend to be",
    "execute",
    "rm -rf",
];

static MATCHER: LazyLock<PatternMatcher> = LazyLock::new(|| {
    PatternMatcher::new(FORBIDDEN_PATTERNS.iter().copied()).expect("static pattern set compile")
});

// One replacement rule per pattern, indexed like FORBIDDEN_PATTERNS.
static RULES: LazyLock<Vec<Regex>> =
    LazyLock::new(|| FORBIDDEN_PATTERNS.iter().map(|p| replacement_rule(p)).collect());

fn replacement_rule(pattern: &str) -> Regex {
    let body = pattern
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");

    RegexBuilder::new(&body)
        .case_insensitive(true)
        .build()
        .expect("static pattern rule compile")
}

/// Replaces every forbidden phrase in `text` with [`REDACTION_MARKER`].
///
/// Matching ignores case and tolerates any whitespace between the words of a
/// phrase. Text outside the redacted spans keeps its original casing.
#[must_use]
pub fn sanitize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let matched = MATCHER.matched_patterns(text);
    if matched.is_empty() {
        return text.to_string();
    }

    let mut redacted = text.to_string();
    for idx in &matched {
        redacted = RULES[*idx]
            .replace_all(&redacted, NoExpand(REDACTION_MARKER))
            .into_owned();
    }

    let names: Vec<&str> = matched.iter().map(|idx| FORBIDDEN_PATTERNS[*idx]).collect();
    warn!(patterns = ?names, "Redacted forbidden patterns from untrusted input");

    redacted
}

/// [`sanitize`] for optional fields; absent input becomes an empty string.
#[must_use]
pub fn sanitize_opt(text: Option<&str>) -> String {
    text.map(sanitize).unwrap_or_default()
}

/// Drops control characters other than newline and tab.
#[must_use]
pub fn strip_control(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t'))
        .collect()
}

/// Redacted copies of the untrusted text fields of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedFields {
    pub full_name: String,
    pub description: String,
    pub language: String,
    pub readme: String,
}

impl SanitizedFields {
    #[must_use]
    pub fn from_request(request: &RepositorySummaryRequest) -> Self {
        let clean = |field: Option<&str>| sanitize_opt(field.map(strip_control).as_deref());

        let readme = request
            .readme
            .as_deref()
            .map(|r| r.chars().take(MAX_README_CHARS).collect::<String>());

        Self {
            full_name: clean(request.full_name.as_deref()),
            description: clean(request.description.as_deref()),
            language: clean(request.language.as_deref()),
            readme: clean(readme.as_deref()),
        }
    }
}

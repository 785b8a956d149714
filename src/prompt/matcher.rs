//! Single-pass multi-pattern matcher.
//!
//! Wraps an Aho-Corasick automaton built once over a fixed, lower-case
//! pattern set. Every occurrence of every pattern is found in one
//! left-to-right scan of the haystack, regardless of how many patterns the
//! set holds.

use aho_corasick::{AhoCorasick, BuildError};
use std::collections::BTreeSet;

/// One occurrence of a pattern inside a scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternMatch {
    /// Index of the pattern in the set the matcher was built from.
    pub pattern: usize,
    /// Byte offset of the occurrence within the scanned haystack.
    pub start: usize,
}

#[derive(Debug, Clone)]
pub struct PatternMatcher {
    automaton: AhoCorasick,
    patterns: Vec<String>,
}

impl PatternMatcher {
    /// Builds the automaton. Patterns are stored lower-cased.
    ///
    /// # Errors
    ///
    /// Returns an error if the automaton exceeds the builder's size limits.
    pub fn new<I, P>(patterns: I) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        let patterns: Vec<String> = patterns
            .into_iter()
            .map(|p| p.as_ref().to_lowercase())
            .collect();
        let automaton = AhoCorasick::new(&patterns)?;

        Ok(Self {
            automaton,
            patterns,
        })
    }

    #[must_use]
    pub fn pattern(&self, index: usize) -> Option<&str> {
        self.patterns.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Finds every occurrence, overlapping ones included, of any pattern in
    /// `haystack`. The haystack is matched literally; callers that want
    /// case-insensitive matching pass a lower-cased copy.
    #[must_use]
    pub fn find_all(&self, haystack: &str) -> Vec<PatternMatch> {
        if haystack.is_empty() {
            return Vec::new();
        }

        self.automaton
            .find_overlapping_iter(haystack)
            .map(|m| PatternMatch {
                pattern: m.pattern().as_usize(),
                start: m.start(),
            })
            .collect()
    }

    /// Distinct patterns occurring anywhere in `text`.
    ///
    /// The text is lower-cased and every whitespace run collapsed to a single
    /// space before scanning, so casing and irregular spacing do not hide an
    /// occurrence.
    #[must_use]
    pub fn matched_patterns(&self, text: &str) -> BTreeSet<usize> {
        self.find_all(&normalize(text))
            .into_iter()
            .map(|m| m.pattern)
            .collect()
    }
}

/// Lower-cases `text` and collapses each whitespace run into one space.
#[must_use]
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_whitespace = false;

    for c in text.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push(' ');
            }
            in_whitespace = true;
        } else {
            out.extend(c.to_lowercase());
            in_whitespace = false;
        }
    }

    out
}

//! Untrusted-input defenses and prompt assembly for repository summaries.

pub mod builder;
pub mod matcher;
pub mod sanitizer;

pub use builder::{SYSTEM_PREAMBLE, build_prompt};
pub use matcher::{PatternMatch, PatternMatcher};
pub use sanitizer::{
    FORBIDDEN_PATTERNS, REDACTION_MARKER, SanitizedFields, sanitize, sanitize_opt,
};

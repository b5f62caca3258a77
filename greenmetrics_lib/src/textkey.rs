//! Text canonicalization helpers for indicator-label reconciliation.
//!
//! Labels for the same indicator are authored independently in Portuguese
//! and English, with inconsistent accents, case, and punctuation. This
//! module provides the normalization key used for comparison and the
//! parenthetical abbreviation extractor used by the mapping tiers.

use regex::Regex;
use std::sync::OnceLock;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

fn paren_group_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(([^)]+)\)").unwrap())
}

/// Normalize a label into a canonical comparison key.
///
/// Steps:
/// 1. NFKD decomposition, dropping combining marks (strips accents)
/// 2. Lowercase
/// 3. Replace every run of non-alphanumeric characters with one space
/// 4. Trim
///
/// Idempotent: normalizing an already-normalized key is a no-op.
pub fn normalize_key(raw: &str) -> String {
    let stripped: String = raw
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();

    let mut out = String::with_capacity(stripped.len());
    let mut pending_space = false;
    for c in stripped.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        } else {
            pending_space = true;
        }
    }
    out
}

/// Extract an abbreviation token from a parenthesized group, e.g.
/// `"Return on Investment (ROI)"` → `Some("ROI")`.
///
/// Only the first parenthesized group is considered; its content is cut at
/// the first space or slash. Tokens shorter than two characters are
/// rejected. Case is preserved.
pub fn extract_abbrev_token(label: &str) -> Option<String> {
    let caps = paren_group_re().captures(label)?;
    let content = caps.get(1)?.as_str().trim();
    let token = content
        .split([' ', '/'])
        .next()
        .unwrap_or("")
        .trim();
    if token.chars().count() >= 2 {
        Some(token.to_string())
    } else {
        None
    }
}

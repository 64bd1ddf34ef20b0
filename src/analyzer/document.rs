//! Extracted study text and its normalized form used for keyword matching

use crate::DocumentStats;
use regex::Regex;
use std::sync::OnceLock;

/// Words split by a hyphen and whitespace, as PDF layout leaves them
/// ("cyto-\ntoxicity", "cyto- toxicity")
fn split_word_hyphen() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"([a-z0-9])-\s+([a-z])").expect("hyphenation pattern is valid")
    })
}

/// Micro sign and Greek mu both mean "micro" in study text; deunicode would
/// render the Greek letter as "m".
fn fold_micro(c: char) -> char {
    match c {
        '\u{b5}' | '\u{3bc}' => 'u',
        other => other,
    }
}

/// Normalize text for phrase matching.
///
/// Folds micro signs to `u`, transliterates to ASCII, lowercases, rejoins
/// words split by a hyphen followed by whitespace, turns every character
/// outside `[a-z0-9]` into a space and collapses runs of whitespace. Keywords
/// go through the same function, so a keyword and the text it should match
/// always agree on punctuation and spacing.
pub fn normalize(text: &str) -> String {
    let folded: String = text.chars().map(fold_micro).collect();
    let ascii = deunicode::deunicode(&folded).to_lowercase();
    let joined = split_word_hyphen().replace_all(&ascii, "${1}${2}");
    let cleaned: String = joined
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A study document: raw extracted text plus its normalized form
#[derive(Debug, Clone)]
pub struct Document {
    raw: String,
    /// Normalized text padded with one space on each side so that every word,
    /// including the first and last, is delimited by spaces
    padded: String,
}

impl Document {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let padded = format!(" {} ", normalize(&raw));
        Self { raw, padded }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn normalized(&self) -> &str {
        self.padded.trim()
    }

    pub fn is_empty(&self) -> bool {
        self.normalized().is_empty()
    }

    /// Whole-word phrase containment. `needle` must be a normalized phrase
    /// padded with single spaces, as produced by `Keyword`.
    pub(crate) fn contains_phrase(&self, needle: &str) -> bool {
        self.padded.contains(needle)
    }

    pub fn stats(&self) -> DocumentStats {
        DocumentStats {
            characters: self.raw.chars().count(),
            words: self.normalized().split_whitespace().count(),
        }
    }
}

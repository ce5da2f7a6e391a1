//! # Greek Text Processing Module
//!
//! ## Purpose
//! Canonical normalization and word extraction for polytonic Greek text, the
//! comparison layer every other component builds on.
//!
//! ## Input/Output Specification
//! - **Input**: Raw text fragments (possibly empty, mixed Greek/Latin)
//! - **Output**: Normalized comparison forms, ordered Greek word tokens
//! - **Guarantees**: Normalization is idempotent; extraction never yields an
//!   empty token and preserves original casing and diacritics
//!
//! ## Key Features
//! - Diacritic stripping via Unicode decomposition (accents, breathings, iota
//!   subscript) with case folding
//! - Maximal-run tokenization over the Greek letter ranges, combining marks
//!   kept inside a run
//! - Stopword table for frequency analytics

use crate::errors::{CorpusError, Result};
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Maximal runs starting on a Greek letter (basic and extended blocks),
/// continuing through Greek letters and combining marks.
const GREEK_WORD_PATTERN: &str =
    r"[\x{0370}-\x{03FF}\x{1F00}-\x{1FFF}][\x{0300}-\x{036F}\x{0370}-\x{03FF}\x{1F00}-\x{1FFF}]*";

/// Function words excluded from vocabulary frequency rankings. Stored in
/// normalized (diacritic-free, lowercased) form.
pub const GREEK_STOPWORDS: &[&str] = &[
    "ο", "η", "το", "οι", "αι", "τα", "του", "των", "τη", "της", "τοις", "τους", "τας", "τον",
    "την", "τω", "τῳ", "τῃ", "και", "δε", "γαρ", "μεν", "εν", "εις", "εκ", "εξ", "ως", "ησαν",
    "ην", "εστι", "εστιν", "ου", "ουκ", "μη", "ουδε", "ουτε", "μητε", "αλλα", "αλλ",
];

/// Canonicalize a Greek fragment to its comparison form: decompose, drop all
/// combining marks, recompose, lowercase. Non-Greek characters keep their
/// identity apart from case folding. `normalize_greek("")` is `""`.
pub fn normalize_greek(text: &str) -> String {
    text.nfd()
        .filter(|&c| !is_combining_mark(c))
        .nfc()
        .collect::<String>()
        .to_lowercase()
}

/// Whether a normalized word is a Greek function word
pub fn is_stopword(word: &str) -> bool {
    GREEK_STOPWORDS.contains(&word)
}

/// Greek word extractor holding its compiled token pattern
#[derive(Debug)]
pub struct GreekTokenizer {
    word_regex: Regex,
}

impl GreekTokenizer {
    /// Create a new tokenizer
    pub fn new() -> Result<Self> {
        let word_regex = Regex::new(GREEK_WORD_PATTERN).map_err(|e| CorpusError::TokenizerPattern {
            details: e.to_string(),
        })?;
        Ok(Self { word_regex })
    }

    /// Iterate the Greek words of `text` in left-to-right order, skipping
    /// Latin text, digits, punctuation, and whitespace entirely. Tokens keep
    /// their original casing and diacritics; normalization happens at the
    /// point of comparison.
    pub fn words<'t>(&'t self, text: &'t str) -> impl Iterator<Item = &'t str> + 't {
        self.word_regex.find_iter(text).map(|m| m.as_str())
    }
}

//! # Lemmatization Module
//!
//! ## Purpose
//! Rule-based candidate lemma generation for Greek words and construction of
//! the per-entry inverted lemma index.
//!
//! ## Input/Output Specification
//! - **Input**: Extracted Greek words, entry body text
//! - **Output**: Candidate lemma sets, lemma → ordered position lists
//! - **Serialization**: The index round-trips through JSON as a flat
//!   `{"lemma": [positions]}` object
//!
//! ## Design
//! The rule table is a deliberately approximate, over-generating scheme that
//! favors recall over precision: every applicable suffix rewrite contributes a
//! candidate, alongside the normalized form itself, and no attempt is made to
//! rank or disambiguate to a single "correct" lemma. The table is evaluated as
//! independent rules, not a priority chain, and is preserved literally from
//! the edition this engine is compatible with — including overlapping and
//! self-referential entries.

use crate::errors::Result;
use crate::text_processing::{normalize_greek, GreekTokenizer};
use crate::Entry;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Suffix rewrite rules over normalized forms. Rules are independent and
/// non-exclusive; a word may satisfy several and contribute several candidates.
const LEMMA_RULES: &[(&str, &str)] = &[
    // Nouns - genitive to nominative
    ("ου", "ος"),
    ("ης", "η"),
    ("ας", "α"),
    ("ων", "ος"),
    // Verbs - common inflections to infinitive
    ("ει", "ειν"),
    ("ουσι", "ειν"),
    ("εται", "εσθαι"),
    ("ονται", "εσθαι"),
    // Participles
    ("ων", "ων"),
    ("ουσα", "ων"),
    ("ον", "ων"),
    // Adjectives
    ("ου", "ος"),
    ("ῳ", "ος"),
    ("ον", "ος"),
];

/// Inverted index from lemma to the ascending token positions where the lemma
/// (or a form it was derived from) occurs within one entry's body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LemmaIndex(BTreeMap<String, Vec<usize>>);

impl LemmaIndex {
    /// Whether the index has a position list for `lemma`
    pub fn contains(&self, lemma: &str) -> bool {
        self.0.contains_key(lemma)
    }

    /// Position list for `lemma`, if present
    pub fn positions(&self, lemma: &str) -> Option<&[usize]> {
        self.0.get(lemma).map(Vec::as_slice)
    }

    /// Number of distinct lemmas
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate lemmas in sorted order
    pub fn lemmas(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Serialize as a flat JSON object
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a serialized index, treating absent or malformed input as "no
    /// index" rather than an error. Used by search, where a bad index means
    /// the entry simply never matches.
    pub fn parse_lenient(raw: Option<&str>) -> Option<Self> {
        serde_json::from_str(raw?).ok()
    }
}

/// Rule-table lemmatizer and index builder
#[derive(Debug)]
pub struct Lemmatizer {
    tokenizer: GreekTokenizer,
}

impl Lemmatizer {
    /// Create a new lemmatizer
    pub fn new() -> Result<Self> {
        Ok(Self {
            tokenizer: GreekTokenizer::new()?,
        })
    }

    /// Iterate the Greek words of `text` (extraction order, original forms)
    pub fn words<'t>(&'t self, text: &'t str) -> impl Iterator<Item = &'t str> + 't {
        self.tokenizer.words(text)
    }

    /// Candidate lemma set for one word: the normalized form plus every
    /// applicable suffix rewrite. Never empty; sorted for determinism.
    pub fn lemmas(&self, word: &str) -> BTreeSet<String> {
        let normalized = normalize_greek(word);
        let mut lemmas = BTreeSet::new();
        for (suffix, replacement) in LEMMA_RULES {
            if let Some(stem) = normalized.strip_suffix(suffix) {
                lemmas.insert(format!("{stem}{replacement}"));
            }
        }
        lemmas.insert(normalized);
        lemmas
    }

    /// Build the lemma index for a body text: each word contributes its
    /// zero-based extraction position to every candidate lemma's list.
    pub fn build_index(&self, text: &str) -> LemmaIndex {
        let mut index: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (position, word) in self.words(text).enumerate() {
            for lemma in self.lemmas(word) {
                index.entry(lemma).or_default().push(position);
            }
        }
        LemmaIndex(index)
    }

    /// Recompute the derived fields of an entry from its body text. Must be
    /// invoked after every body mutation; the engine keeps no cache beyond
    /// this recompute-on-demand contract. Returns whether a body was present.
    pub fn reindex_entry(&self, entry: &mut Entry) -> Result<bool> {
        match entry.body_greek.as_deref() {
            Some(body) if !body.is_empty() => {
                // Word count deliberately counts whitespace-delimited tokens,
                // not Greek tokens, matching the external contract.
                entry.word_count = body.split_whitespace().count() as u64;
                entry.lemma_index = Some(self.build_index(body).to_json()?);
                Ok(true)
            }
            _ => {
                entry.word_count = 0;
                entry.lemma_index = None;
                Ok(false)
            }
        }
    }

    /// Recompute derived fields across a whole corpus. Entries are independent,
    /// so the pass runs in parallel. Returns the number of entries with a body.
    pub fn reindex_all(&self, entries: &mut [Entry]) -> Result<usize> {
        let reindexed = entries
            .par_iter_mut()
            .map(|entry| -> Result<usize> { Ok(usize::from(self.reindex_entry(entry)?)) })
            .try_reduce(|| 0, |a, b| Ok(a + b))?;
        tracing::debug!("Reindexed {} of {} entries", reindexed, entries.len());
        Ok(reindexed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lemmatizer() -> Lemmatizer {
        Lemmatizer::new().unwrap()
    }

    #[test]
    fn test_lemmas_always_include_normalized_form() {
        let lem = lemmatizer();
        for word in ["λόγος", "λόγου", "ἀνθρώπων", "καὶ", "x"] {
            let lemmas = lem.lemmas(word);
            assert!(lemmas.contains(&normalize_greek(word)), "missing seed for {word}");
            assert!(!lemmas.is_empty());
        }
    }

    #[test]
    fn test_genitive_rewrites_to_nominative() {
        let lem = lemmatizer();
        let lemmas = lem.lemmas("λόγου");
        assert!(lemmas.contains("λογου"));
        assert!(lemmas.contains("λογος"));
    }

    #[test]
    fn test_overlapping_rules_all_contribute() {
        let lem = lemmatizer();
        // -ων matches the genitive-plural rule and the self-referential
        // participle rule; both outputs belong to the set.
        let lemmas = lem.lemmas("ἀνθρώπων");
        assert!(lemmas.contains("ανθρωπων"));
        assert!(lemmas.contains("ανθρωπος"));
        // -ον matches both the participle and adjective rules
        let lemmas = lem.lemmas("καλόν");
        assert!(lemmas.contains("καλον"));
        assert!(lemmas.contains("καλων"));
        assert!(lemmas.contains("καλος"));
    }

    #[test]
    fn test_build_index_positions_ascending_and_complete() {
        let lem = lemmatizer();
        let index = lem.build_index("λόγος καὶ λόγου");
        // Determinism: rebuilding yields identical output
        assert_eq!(index, lem.build_index("λόγος καὶ λόγου"));
        // Every token position appears in at least one lemma's list
        for position in 0..3 {
            assert!(
                index.lemmas().any(|l| index.positions(l).unwrap().contains(&position)),
                "position {position} missing"
            );
        }
        // Both inflections of λογος land in the shared lemma bucket
        assert_eq!(index.positions("λογος"), Some(&[0, 2][..]));
        for lemma in index.lemmas() {
            let positions = index.positions(lemma).unwrap();
            assert!(positions.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn test_index_json_round_trip() {
        let lem = lemmatizer();
        let index = lem.build_index("ὕδωρ ψυχρόν");
        let json = index.to_json().unwrap();
        assert_eq!(LemmaIndex::parse_lenient(Some(&json)), Some(index));
    }

    #[test]
    fn test_parse_lenient_swallows_garbage() {
        assert_eq!(LemmaIndex::parse_lenient(None), None);
        assert_eq!(LemmaIndex::parse_lenient(Some("not json")), None);
        assert_eq!(LemmaIndex::parse_lenient(Some("[1,2,3]")), None);
    }

    #[test]
    fn test_reindex_entry_refreshes_derived_fields() {
        let lem = lemmatizer();
        let mut entry = Entry {
            body_greek: Some("λόγος καὶ λόγου".to_string()),
            ..Entry::default()
        };
        assert!(lem.reindex_entry(&mut entry).unwrap());
        assert_eq!(entry.word_count, 3);
        assert!(entry.lemma_index.is_some());

        entry.body_greek = None;
        assert!(!lem.reindex_entry(&mut entry).unwrap());
        assert_eq!(entry.word_count, 0);
        assert!(entry.lemma_index.is_none());
    }

    #[test]
    fn test_reindex_all_counts_bodies() {
        let lem = lemmatizer();
        let mut entries = vec![
            Entry {
                body_greek: Some("λόγος".to_string()),
                ..Entry::default()
            },
            Entry::default(),
            Entry {
                body_greek: Some("ὕδωρ".to_string()),
                ..Entry::default()
            },
        ];
        assert_eq!(lem.reindex_all(&mut entries).unwrap(), 2);
        assert!(entries[0].lemma_index.is_some());
        assert!(entries[1].lemma_index.is_none());
    }
}

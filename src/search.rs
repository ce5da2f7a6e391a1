//! # Lemma Search Module
//!
//! ## Purpose
//! Query expansion and boolean matching of corpus entries against their stored
//! lemma indices.
//!
//! ## Input/Output Specification
//! - **Input**: Query text, a collection of entries carrying serialized indices
//! - **Output**: The matching subset of entries, input order preserved
//! - **Matching**: Boolean only — no scoring, no ranking
//!
//! ## Key Features
//! - A query is expanded into the union of candidate lemmas over all of its
//!   Greek words, so inflected and normalized forms find each other
//! - Entries with absent or malformed indices are skipped silently
//! - A query with no extractable Greek words yields an empty match set

use crate::errors::Result;
use crate::lemma::{LemmaIndex, Lemmatizer};
use crate::Entry;
use std::collections::BTreeSet;

/// Lemma-expansion searcher over a corpus of indexed entries
#[derive(Debug)]
pub struct LemmaSearcher {
    lemmatizer: Lemmatizer,
}

impl LemmaSearcher {
    /// Create a new searcher
    pub fn new() -> Result<Self> {
        Ok(Self {
            lemmatizer: Lemmatizer::new()?,
        })
    }

    /// Union of candidate lemmas across all Greek words of the query
    pub fn expand_query(&self, query: &str) -> BTreeSet<String> {
        let mut expansion = BTreeSet::new();
        for word in self.lemmatizer.words(query) {
            expansion.extend(self.lemmatizer.lemmas(word));
        }
        expansion
    }

    /// Select the entries whose index contains any lemma of the query
    /// expansion, preserving input order.
    pub fn search<'e>(&self, query: &str, entries: &'e [Entry]) -> Vec<&'e Entry> {
        let expansion = self.expand_query(query);
        tracing::debug!("Query expanded to {} candidate lemmas", expansion.len());
        if expansion.is_empty() {
            return Vec::new();
        }
        entries
            .iter()
            .filter(|entry| Self::entry_matches(&expansion, entry))
            .collect()
    }

    fn entry_matches(expansion: &BTreeSet<String>, entry: &Entry) -> bool {
        match LemmaIndex::parse_lenient(entry.lemma_index.as_deref()) {
            Some(index) => expansion.iter().any(|lemma| index.contains(lemma)),
            None => false,
        }
    }
}

//! # Greek Corpus Engine
//!
//! ## Overview
//! This library implements the text analysis core of a scholarly database of
//! ancient Greek passages: diacritic-insensitive normalization, rule-based
//! lemmatization, inverted-index search, and classification of every passage
//! onto a hand-authored thematic hierarchy with recursive statistics.
//!
//! ## Architecture
//! The system is composed of several key modules:
//! - `text_processing`: Greek normalization, word extraction, stopwords
//! - `lemma`: Rule-table lemmatizer and per-entry lemma index construction
//! - `search`: Query expansion and lemma-index matching over a corpus
//! - `classify`: Thematic division forest, leaf resolution, tree aggregation
//! - `analytics`: Flat word-count roll-ups by author, sect, book, and chapter
//! - `color`: Deterministic color assignment for visualization groups
//! - `config`: Configuration management and settings
//! - `errors`: Centralized error handling and types
//!
//! ## Input/Output Specification
//! - **Input**: Corpus entries (Greek text + location metadata), division records
//! - **Output**: Lemma indices, search-match subsets, annotated classification
//!   trees, group-aggregate tables with colors
//! - **Guarantees**: Pure synchronous computations, deterministic output for
//!   deterministic input ordering
//!
//! ## Usage
//! ```rust,no_run
//! use greek_corpus_engine::{Entry, Lemmatizer, LemmaSearcher};
//!
//! fn main() -> greek_corpus_engine::Result<()> {
//!     let lemmatizer = Lemmatizer::new()?;
//!     let mut entries: Vec<Entry> = Vec::new();
//!     lemmatizer.reindex_all(&mut entries)?;
//!     let searcher = LemmaSearcher::new()?;
//!     let hits = searcher.search("λόγος", &entries);
//!     println!("Found {} matches", hits.len());
//!     Ok(())
//! }
//! ```

// Core modules
pub mod analytics;
pub mod classify;
pub mod color;
pub mod config;
pub mod errors;
pub mod lemma;
pub mod search;
pub mod text_processing;

// Re-exports for convenience
pub use config::Config;
pub use errors::{CorpusError, Result};
pub use lemma::{LemmaIndex, Lemmatizer};
pub use search::LemmaSearcher;

use serde::{Deserialize, Serialize};

/// Unique identifier for corpus entries
pub type EntryId = u32;

/// Unique identifier for thematic divisions
pub type DivisionId = u32;

/// Sect labels recognized by school-mode grouping; anything else maps to "Other"
pub const RECOGNIZED_SECTS: [&str; 4] = ["Pneumatist", "Methodist", "Empiricist", "Dogmatist"];

/// An author cited in the corpus, resolved against the external author registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceAuthor {
    /// Display name
    pub name: String,
    /// Medical sect/school label, when known
    #[serde(default)]
    pub sect: Option<String>,
    /// Whether the sect attribution is certain
    #[serde(default = "default_true")]
    pub sect_certain: bool,
}

fn default_true() -> bool {
    true
}

/// A corpus passage. Owned externally; the engine consumes it read-only except
/// for the derived `word_count` and `lemma_index` fields, which
/// [`Lemmatizer::reindex_entry`] refreshes whenever the body text changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Entry {
    /// Stable identifier
    pub id: EntryId,
    /// Book number within the compilation
    #[serde(default)]
    pub book: Option<u32>,
    /// Chapter number within the book
    #[serde(default)]
    pub chapter: Option<u32>,
    /// Section number within the chapter
    #[serde(default)]
    pub section: Option<u32>,
    /// Greek title
    #[serde(default)]
    pub title_greek: Option<String>,
    /// Greek body text
    #[serde(default)]
    pub body_greek: Option<String>,
    /// Editorial chapter title
    #[serde(default)]
    pub chapter_title: Option<String>,
    /// Translated title
    #[serde(default)]
    pub translation_title: Option<String>,
    /// Legacy free-text author attribution
    #[serde(default)]
    pub author: Option<String>,
    /// Legacy author grouping label
    #[serde(default)]
    pub author_group: Option<String>,
    /// Resolved author reference
    #[serde(default)]
    pub source_author: Option<SourceAuthor>,
    /// Word count, maintained consistent with `body_greek`
    #[serde(default)]
    pub word_count: u64,
    /// Serialized lemma index (`{"lemma": [positions]}`), absent until computed
    #[serde(default)]
    pub lemma_index: Option<String>,
}

impl Entry {
    /// Author display label: resolved author name, else the legacy free-text
    /// field, else "Unknown".
    pub fn author_label(&self) -> &str {
        if let Some(author) = &self.source_author {
            return &author.name;
        }
        self.author
            .as_deref()
            .filter(|a| !a.is_empty())
            .unwrap_or("Unknown")
    }

    /// School label: a distinguished "Galen" bucket when the resolved author's
    /// name carries that marker, else the author's sect if recognized, else
    /// "Other".
    pub fn school_label(&self) -> &str {
        if let Some(author) = &self.source_author {
            if author.name.contains("Galen") {
                return "Galen";
            }
            if let Some(sect) = &author.sect {
                if RECOGNIZED_SECTS.contains(&sect.as_str()) {
                    return sect;
                }
            }
        }
        "Other"
    }
}

/// Grouping mode for classification and analytics views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupMode {
    /// Group by medical school (Galen / recognized sects / Other)
    School,
    /// Group by individual author
    Author,
}

impl GroupMode {
    /// Group label for an entry under this mode
    pub fn label<'e>(&self, entry: &'e Entry) -> &'e str {
        match self {
            GroupMode::School => entry.school_label(),
            GroupMode::Author => entry.author_label(),
        }
    }
}

impl Default for GroupMode {
    fn default() -> Self {
        GroupMode::School
    }
}

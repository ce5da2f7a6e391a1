//! # Group Analytics Module
//!
//! ## Purpose
//! Flat, non-hierarchical word-count roll-ups over the full entry collection:
//! per-author, per-group, per-sect, and per-book tables, plus the book×chapter
//! map with dominant-group coloring and a stopword-filtered vocabulary
//! frequency ranking.
//!
//! ## Input/Output Specification
//! - **Input**: The entry collection, a grouping mode, an author-share threshold
//! - **Output**: Bucket tables keyed by label, the decorated book map,
//!   ranked lemma frequencies
//! - **Missing values**: The absence of a label is itself a first-class bucket
//!   ("Unknown" / "Unclassified")
//!
//! ## Design
//! These roll-ups are independent of the thematic hierarchy: they sum every
//! entry into its bucket with no double-counting-avoidance semantics, so they
//! deliberately stay a separate component from `classify`. Dominant-label ties
//! are broken lexicographically on the label, an explicit and documented order.

use crate::color::{author_colors, school_colors, FALLBACK_COLOR};
use crate::lemma::Lemmatizer;
use crate::text_processing::is_stopword;
use crate::{Entry, GroupMode};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Corpus-wide aggregate tables
#[derive(Debug, Clone, Serialize)]
pub struct CorpusAnalytics {
    pub total_words: u64,
    pub total_entries: u64,
    /// Legacy author attribution → words
    pub words_by_author: BTreeMap<String, u64>,
    /// Author group → words
    pub words_by_group: BTreeMap<String, u64>,
    /// Resolved-author sect (with `?` when uncertain) → words
    pub words_by_sect: BTreeMap<String, u64>,
    /// Book display label → words
    pub words_by_book: BTreeMap<String, u64>,
    /// Book display label → entries
    pub entries_by_book: BTreeMap<String, u64>,
}

/// One chapter bucket of the book map
#[derive(Debug, Clone, Serialize)]
pub struct ChapterBucket {
    pub chapter: Option<u32>,
    pub title: Option<String>,
    pub translation_title: Option<String>,
    pub entries: u64,
    pub word_count: u64,
    /// Group with the maximum accumulated weight; ties break to the
    /// lexicographically least label
    pub dominant_group: String,
    pub group_breakdown: BTreeMap<String, u64>,
    pub color: String,
}

/// All chapter buckets of one book
#[derive(Debug, Clone, Serialize)]
pub struct BookBuckets {
    pub book: Option<u32>,
    pub chapters: Vec<ChapterBucket>,
}

/// Chapter-level distribution of the corpus with dominant-group coloring
#[derive(Debug, Clone, Serialize)]
pub struct BookMap {
    pub books: Vec<BookBuckets>,
    pub colors: BTreeMap<String, String>,
    pub mode: GroupMode,
    pub threshold: f64,
}

fn book_key(book: Option<u32>) -> String {
    match book {
        Some(book) => format!("Book {book}"),
        None => "Unknown".to_string(),
    }
}

/// Compute the flat aggregate tables over the whole corpus
pub fn corpus_analytics(entries: &[Entry]) -> CorpusAnalytics {
    let mut words_by_author = BTreeMap::new();
    let mut words_by_group = BTreeMap::new();
    let mut words_by_sect = BTreeMap::new();
    let mut words_by_book = BTreeMap::new();
    let mut entries_by_book = BTreeMap::new();
    let mut total_words = 0;

    for entry in entries {
        let words = entry.word_count;
        total_words += words;

        let author = entry
            .author
            .as_deref()
            .filter(|a| !a.is_empty())
            .unwrap_or("Unknown");
        *words_by_author.entry(author.to_string()).or_insert(0) += words;

        let group = entry
            .author_group
            .as_deref()
            .filter(|g| !g.is_empty())
            .unwrap_or("Unknown");
        *words_by_group.entry(group.to_string()).or_insert(0) += words;

        let sect_label = match &entry.source_author {
            Some(author) => {
                let sect = author.sect.as_deref().filter(|s| !s.is_empty()).unwrap_or("Unknown");
                if author.sect_certain {
                    sect.to_string()
                } else {
                    format!("{sect}?")
                }
            }
            None => "Unclassified".to_string(),
        };
        *words_by_sect.entry(sect_label).or_insert(0) += words;

        let book = book_key(entry.book);
        *words_by_book.entry(book.clone()).or_insert(0) += words;
        *entries_by_book.entry(book).or_insert(0) += 1;
    }

    CorpusAnalytics {
        total_words,
        total_entries: entries.len() as u64,
        words_by_author,
        words_by_group,
        words_by_sect,
        words_by_book,
        entries_by_book,
    }
}

/// Label an entry for the book map: school labels pass through, author labels
/// below the corpus share threshold collapse into "Other".
fn map_label<'e>(entry: &'e Entry, mode: GroupMode, major_authors: &BTreeSet<&str>) -> &'e str {
    match mode {
        GroupMode::School => entry.school_label(),
        GroupMode::Author => {
            let label = entry.author_label();
            if major_authors.contains(label) {
                label
            } else {
                "Other"
            }
        }
    }
}

/// Build the chapter-level book map. Each entry contributes its word count
/// (at least 1, so zero-word entries still register) to its group's weight
/// within the book×chapter bucket; the heaviest group colors the bucket.
pub fn book_map(entries: &[Entry], mode: GroupMode, threshold: f64) -> BookMap {
    let total_words: u64 = entries.iter().map(|e| e.word_count).sum();

    let mut author_words: BTreeMap<&str, u64> = BTreeMap::new();
    for entry in entries {
        *author_words.entry(entry.author_label()).or_insert(0) += entry.word_count;
    }
    let major_authors: BTreeSet<&str> = author_words
        .iter()
        .filter(|(_, &words)| total_words > 0 && words as f64 / total_words as f64 >= threshold)
        .map(|(&label, _)| label)
        .collect();

    struct Bucket {
        entries: u64,
        word_count: u64,
        group_counts: BTreeMap<String, u64>,
        title: Option<String>,
        translation_title: Option<String>,
    }

    let mut buckets: BTreeMap<(Option<u32>, Option<u32>), Bucket> = BTreeMap::new();
    for entry in entries {
        let bucket = buckets
            .entry((entry.book, entry.chapter))
            .or_insert_with(|| Bucket {
                entries: 0,
                word_count: 0,
                group_counts: BTreeMap::new(),
                title: None,
                translation_title: None,
            });
        bucket.entries += 1;
        bucket.word_count += entry.word_count;
        if bucket.title.is_none() {
            bucket.title = entry
                .chapter_title
                .clone()
                .or_else(|| entry.title_greek.clone());
        }
        if bucket.translation_title.is_none() {
            bucket.translation_title = entry.translation_title.clone();
        }
        let label = map_label(entry, mode, &major_authors);
        *bucket.group_counts.entry(label.to_string()).or_insert(0) += entry.word_count.max(1);
    }

    let colors = match mode {
        GroupMode::School => school_colors(),
        GroupMode::Author => {
            let mut colors = author_colors(author_words.keys().copied());
            colors
                .entry("Other".to_string())
                .or_insert_with(|| FALLBACK_COLOR.to_string());
            colors
        }
    };

    let mut books: BTreeMap<Option<u32>, Vec<ChapterBucket>> = BTreeMap::new();
    for ((book, chapter), bucket) in buckets {
        let dominant = dominant_label(&bucket.group_counts);
        let color = colors
            .get(&dominant)
            .cloned()
            .unwrap_or_else(|| FALLBACK_COLOR.to_string());
        books.entry(book).or_default().push(ChapterBucket {
            chapter,
            title: bucket.title,
            translation_title: bucket.translation_title,
            entries: bucket.entries,
            word_count: bucket.word_count,
            dominant_group: dominant,
            group_breakdown: bucket.group_counts,
            color,
        });
    }

    let mut books: Vec<BookBuckets> = books
        .into_iter()
        .map(|(book, mut chapters)| {
            chapters.sort_by_key(|c| (c.chapter.is_none(), c.chapter));
            BookBuckets { book, chapters }
        })
        .collect();
    books.sort_by_key(|b| (b.book.is_none(), b.book));

    BookMap {
        books,
        colors,
        mode,
        threshold,
    }
}

/// The label with the maximum accumulated weight, ties broken to the
/// lexicographically least label. "Other" for an empty bucket.
fn dominant_label(group_counts: &BTreeMap<String, u64>) -> String {
    let mut best: Option<(&str, u64)> = None;
    for (label, &count) in group_counts {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((label, count)),
        }
    }
    best.map(|(label, _)| label.to_string())
        .unwrap_or_else(|| "Other".to_string())
}

/// Rank the corpus vocabulary by lemma frequency, stopwords excluded. Each
/// word counts toward its lexicographically first candidate lemma, so all
/// inflections of a word accumulate under one stable key.
pub fn lemma_frequency(
    lemmatizer: &Lemmatizer,
    entries: &[Entry],
    top_n: usize,
) -> Vec<(String, u64)> {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for entry in entries {
        let Some(body) = entry.body_greek.as_deref() else {
            continue;
        };
        for word in lemmatizer.words(body) {
            let lemmas = lemmatizer.lemmas(word);
            let Some(base) = lemmas.iter().next() else {
                continue;
            };
            if is_stopword(base) {
                continue;
            }
            *counts.entry(base.clone()).or_insert(0) += 1;
        }
    }
    let mut ranked: Vec<(String, u64)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(top_n);
    ranked
}

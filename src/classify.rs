//! # Thematic Classification Module
//!
//! ## Purpose
//! Maps every corpus entry onto the single most specific node of the
//! hand-authored thematic hierarchy and rolls word/entry counts up through the
//! tree.
//!
//! ## Input/Output Specification
//! - **Input**: Flat division records (book/chapter coverage ranges, parent
//!   links), the entry collection, a grouping mode
//! - **Output**: Per-division entry assignments, an annotated report tree with
//!   recursively aggregated counts
//! - **Invariant**: No entry is assigned to more than one division; counts
//!   propagate upward only through aggregation
//!
//! ## Leaf resolution
//! Candidates are the divisions whose declared ranges cover the entry's
//! location, ranked by an explicit specificity order: chapter-qualified
//! divisions outrank book-only ones, then narrower book span, narrower chapter
//! span, declared sort order, and finally node id. The first candidate with no
//! directly matching child is the assignment. Consumers depend on this exact
//! tie-break order; do not substitute a different best-match heuristic.

use crate::errors::{CorpusError, Result};
use crate::{DivisionId, Entry, GroupMode};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Level tags used by the hierarchy, from coarsest to finest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DivisionLevel {
    Part,
    Division,
    Subdivision,
    Section,
}

/// A flat division record as authored in the external store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThematicDivision {
    /// Stable identifier
    pub id: DivisionId,
    /// Hierarchy level tag
    pub level: DivisionLevel,
    /// Parent division; roots have none
    #[serde(default)]
    pub parent_id: Option<DivisionId>,
    /// Display numeral (e.g. "I", "A")
    #[serde(default)]
    pub numeral: Option<String>,
    /// Unique code (e.g. "I.1.A")
    pub code: String,
    #[serde(default)]
    pub title_latin: Option<String>,
    #[serde(default)]
    pub title_english: Option<String>,
    #[serde(default)]
    pub definition: Option<String>,
    /// Inclusive covered book range; absence means no book filter
    #[serde(default)]
    pub books_start: Option<u32>,
    #[serde(default)]
    pub books_end: Option<u32>,
    /// Inclusive covered chapter range, independent of the book range
    #[serde(default)]
    pub chapter_start: Option<u32>,
    #[serde(default)]
    pub chapter_end: Option<u32>,
    /// Display color
    #[serde(default)]
    pub color: Option<String>,
    /// Ordering among siblings
    #[serde(default)]
    pub sort_order: Option<i32>,
}

impl ThematicDivision {
    fn has_chapter_range(&self) -> bool {
        self.chapter_start.is_some() && self.chapter_end.is_some()
    }

    /// Whether the declared ranges cover a location. A partially declared
    /// range (one endpoint only) counts as undeclared. A division requiring a
    /// chapter never covers an entry without one.
    fn covers(&self, book: u32, chapter: Option<u32>) -> bool {
        if let (Some(start), Some(end)) = (self.books_start, self.books_end) {
            if book < start || book > end {
                return false;
            }
        }
        if let (Some(start), Some(end)) = (self.chapter_start, self.chapter_end) {
            match chapter {
                Some(ch) if start <= ch && ch <= end => {}
                _ => return false,
            }
        }
        true
    }

    fn book_span(&self) -> u64 {
        match (self.books_start, self.books_end) {
            (Some(start), Some(end)) if end >= start => u64::from(end - start),
            _ => u64::MAX,
        }
    }

    fn chapter_span(&self) -> u64 {
        match (self.chapter_start, self.chapter_end) {
            (Some(start), Some(end)) if end >= start => u64::from(end - start),
            _ => u64::MAX,
        }
    }

    /// Specificity key: lower sorts more specific. Total order — no ties
    /// survive the final id component.
    fn specificity_key(&self) -> (bool, u64, u64, i64, DivisionId) {
        (
            !self.has_chapter_range(),
            self.book_span(),
            self.chapter_span(),
            self.sort_order.map(i64::from).unwrap_or(i64::MAX),
            self.id,
        )
    }

    /// Display form of the covered books, e.g. "Book 3" or "Books 1-5"
    fn books_display(&self) -> Option<String> {
        let start = self.books_start?;
        match self.books_end {
            Some(end) if end != start => Some(format!("Books {start}-{end}")),
            _ => Some(format!("Book {start}")),
        }
    }
}

/// Classification node annotated with recursively aggregated statistics
#[derive(Debug, Clone, Serialize)]
pub struct DivisionReport {
    pub id: DivisionId,
    pub level: DivisionLevel,
    pub code: String,
    pub numeral: Option<String>,
    pub title_latin: Option<String>,
    pub title_english: Option<String>,
    pub definition: Option<String>,
    pub books: Option<String>,
    pub books_start: Option<u32>,
    pub books_end: Option<u32>,
    pub color: Option<String>,
    /// Words in this division's own entries plus all descendants'
    pub word_count: u64,
    /// Entries assigned here plus all descendants'
    pub entry_count: u64,
    /// Group label → accumulated word count, merged from descendants
    pub group_counts: BTreeMap<String, u64>,
    pub children: Vec<DivisionReport>,
}

/// Validated division forest, loaded once per computation
#[derive(Debug)]
pub struct DivisionForest {
    divisions: Vec<ThematicDivision>,
    children: HashMap<DivisionId, Vec<usize>>,
    roots: Vec<usize>,
}

impl DivisionForest {
    /// Build a forest from flat records, rejecting duplicate ids, dangling
    /// parent references, and parent-link cycles. The source data is
    /// hand-authored, so a cycle is an editing mistake that must fail loudly
    /// rather than send the tree walk unbounded.
    pub fn new(divisions: Vec<ThematicDivision>) -> Result<Self> {
        let mut by_id: HashMap<DivisionId, usize> = HashMap::with_capacity(divisions.len());
        for (idx, division) in divisions.iter().enumerate() {
            if by_id.insert(division.id, idx).is_some() {
                return Err(CorpusError::DuplicateDivision {
                    division_id: division.id,
                });
            }
        }

        let mut children: HashMap<DivisionId, Vec<usize>> = HashMap::new();
        let mut roots = Vec::new();
        for (idx, division) in divisions.iter().enumerate() {
            match division.parent_id {
                Some(parent_id) => {
                    if !by_id.contains_key(&parent_id) {
                        return Err(CorpusError::UnknownParent {
                            division_id: division.id,
                            parent_id,
                        });
                    }
                    children.entry(parent_id).or_default().push(idx);
                }
                None => roots.push(idx),
            }
        }

        // A node whose parent chain never reaches a root is on a cycle
        for division in &divisions {
            let mut steps = 0;
            let mut current = division.parent_id;
            while let Some(parent_id) = current {
                steps += 1;
                if steps > divisions.len() {
                    return Err(CorpusError::CyclicForest {
                        division_id: division.id,
                    });
                }
                current = divisions[by_id[&parent_id]].parent_id;
            }
        }

        for child_indices in children.values_mut() {
            child_indices.sort_by_key(|&idx| {
                let d = &divisions[idx];
                (d.sort_order.map(i64::from).unwrap_or(i64::MAX), d.id)
            });
        }
        roots.sort_by_key(|&idx| {
            let d = &divisions[idx];
            (d.sort_order.map(i64::from).unwrap_or(i64::MAX), d.id)
        });

        Ok(Self {
            divisions,
            children,
            roots,
        })
    }

    /// Number of divisions in the forest
    pub fn len(&self) -> usize {
        self.divisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.divisions.is_empty()
    }

    fn child_covers(&self, id: DivisionId, book: u32, chapter: Option<u32>) -> bool {
        self.children
            .get(&id)
            .is_some_and(|kids| kids.iter().any(|&idx| self.divisions[idx].covers(book, chapter)))
    }

    /// Resolve an entry to its unique most specific covering division, if any.
    /// Entries without a book number are unassigned. A candidate is accepted
    /// only if none of its direct children also cover the entry, which keeps
    /// the entry from being counted at both a parent and a descendant.
    pub fn resolve(&self, entry: &Entry) -> Option<DivisionId> {
        let book = entry.book?;
        let chapter = entry.chapter;
        let mut candidates: Vec<&ThematicDivision> = self
            .divisions
            .iter()
            .filter(|d| d.covers(book, chapter))
            .collect();
        candidates.sort_by_key(|d| d.specificity_key());
        candidates
            .into_iter()
            .find(|d| !self.child_covers(d.id, book, chapter))
            .map(|d| d.id)
    }

    /// Assign every entry to at most one division. Returns division id →
    /// indices into `entries`, in input order.
    pub fn classify(&self, entries: &[Entry]) -> BTreeMap<DivisionId, Vec<usize>> {
        let mut assigned: BTreeMap<DivisionId, Vec<usize>> = BTreeMap::new();
        for (idx, entry) in entries.iter().enumerate() {
            if let Some(division_id) = self.resolve(entry) {
                assigned.entry(division_id).or_default().push(idx);
            }
        }
        tracing::debug!(
            "Classified {} of {} entries into {} divisions",
            assigned.values().map(Vec::len).sum::<usize>(),
            entries.len(),
            assigned.len()
        );
        assigned
    }

    /// Build the annotated report tree: per node, the word count, entry
    /// count, and group breakdown of its own entries plus all descendants'.
    pub fn aggregate(&self, entries: &[Entry], mode: GroupMode) -> Vec<DivisionReport> {
        let assigned = self.classify(entries);
        self.roots
            .iter()
            .map(|&idx| self.build_report(idx, entries, &assigned, mode))
            .collect()
    }

    fn build_report(
        &self,
        idx: usize,
        entries: &[Entry],
        assigned: &BTreeMap<DivisionId, Vec<usize>>,
        mode: GroupMode,
    ) -> DivisionReport {
        let division = &self.divisions[idx];
        let mut word_count = 0;
        let mut entry_count = 0;
        let mut group_counts: BTreeMap<String, u64> = BTreeMap::new();

        if let Some(own) = assigned.get(&division.id) {
            for &entry_idx in own {
                let entry = &entries[entry_idx];
                word_count += entry.word_count;
                entry_count += 1;
                *group_counts.entry(mode.label(entry).to_string()).or_insert(0) +=
                    entry.word_count;
            }
        }

        let children: Vec<DivisionReport> = self
            .children
            .get(&division.id)
            .map(|kids| {
                kids.iter()
                    .map(|&child_idx| self.build_report(child_idx, entries, assigned, mode))
                    .collect()
            })
            .unwrap_or_default();

        for child in &children {
            word_count += child.word_count;
            entry_count += child.entry_count;
            for (label, count) in &child.group_counts {
                *group_counts.entry(label.clone()).or_insert(0) += count;
            }
        }

        DivisionReport {
            id: division.id,
            level: division.level,
            code: division.code.clone(),
            numeral: division.numeral.clone(),
            title_latin: division.title_latin.clone(),
            title_english: division.title_english.clone(),
            definition: division.definition.clone(),
            books: division.books_display(),
            books_start: division.books_start,
            books_end: division.books_end,
            color: division.color.clone(),
            word_count,
            entry_count,
            group_counts,
            children,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SourceAuthor;

    fn division(
        id: DivisionId,
        parent_id: Option<DivisionId>,
        books: Option<(u32, u32)>,
        chapters: Option<(u32, u32)>,
    ) -> ThematicDivision {
        ThematicDivision {
            id,
            level: if parent_id.is_none() {
                DivisionLevel::Division
            } else {
                DivisionLevel::Section
            },
            parent_id,
            numeral: None,
            code: format!("D{id}"),
            title_latin: None,
            title_english: None,
            definition: None,
            books_start: books.map(|(s, _)| s),
            books_end: books.map(|(_, e)| e),
            chapter_start: chapters.map(|(s, _)| s),
            chapter_end: chapters.map(|(_, e)| e),
            color: None,
            sort_order: Some(id as i32),
        }
    }

    fn located_entry(id: u32, book: Option<u32>, chapter: Option<u32>, words: u64) -> Entry {
        Entry {
            id,
            book,
            chapter,
            word_count: words,
            ..Entry::default()
        }
    }

    #[test]
    fn test_forest_rejects_cycles() {
        let a = division(1, Some(2), None, None);
        let b = division(2, Some(1), None, None);
        let err = DivisionForest::new(vec![a, b]).unwrap_err();
        assert!(matches!(err, CorpusError::CyclicForest { .. }));
    }

    #[test]
    fn test_forest_rejects_unknown_parent_and_duplicates() {
        let err = DivisionForest::new(vec![division(1, Some(99), None, None)]).unwrap_err();
        assert!(matches!(
            err,
            CorpusError::UnknownParent {
                division_id: 1,
                parent_id: 99
            }
        ));

        let err = DivisionForest::new(vec![
            division(1, None, None, None),
            division(1, None, None, None),
        ])
        .unwrap_err();
        assert!(matches!(err, CorpusError::DuplicateDivision { division_id: 1 }));
    }

    #[test]
    fn test_resolve_prefers_chapter_qualified_child() {
        // Division A covers books 1-2; child B covers book 1, chapters 1-10
        let forest = DivisionForest::new(vec![
            division(1, None, Some((1, 2)), None),
            division(2, Some(1), Some((1, 1)), Some((1, 10))),
        ])
        .unwrap();

        let in_child = located_entry(1, Some(1), Some(5), 100);
        let outside_child = located_entry(2, Some(1), Some(20), 50);
        assert_eq!(forest.resolve(&in_child), Some(2));
        assert_eq!(forest.resolve(&outside_child), Some(1));
    }

    #[test]
    fn test_resolve_requires_book_number() {
        let forest = DivisionForest::new(vec![division(1, None, Some((1, 10)), None)]).unwrap();
        assert_eq!(forest.resolve(&located_entry(1, None, Some(3), 10)), None);
    }

    #[test]
    fn test_resolve_chapter_range_excludes_chapterless_entry() {
        let forest = DivisionForest::new(vec![
            division(1, None, Some((1, 2)), None),
            division(2, Some(1), Some((1, 1)), Some((1, 10))),
        ])
        .unwrap();
        // Entry has a book but no chapter: the chapter-qualified child is not
        // a candidate, so the entry lands at the coarser parent.
        assert_eq!(forest.resolve(&located_entry(1, Some(1), None, 10)), Some(1));
    }

    #[test]
    fn test_resolve_unassigned_outside_all_ranges() {
        let forest = DivisionForest::new(vec![division(1, None, Some((1, 2)), None)]).unwrap();
        assert_eq!(forest.resolve(&located_entry(1, Some(9), None, 10)), None);
    }

    #[test]
    fn test_resolve_narrower_book_span_outranks() {
        let forest = DivisionForest::new(vec![
            division(1, None, Some((1, 10)), None),
            division(2, None, Some((3, 4)), None),
        ])
        .unwrap();
        assert_eq!(forest.resolve(&located_entry(1, Some(3), None, 10)), Some(2));
    }

    #[test]
    fn test_classify_assigns_each_entry_at_most_once() {
        let forest = DivisionForest::new(vec![
            division(1, None, Some((1, 2)), None),
            division(2, Some(1), Some((1, 1)), Some((1, 10))),
        ])
        .unwrap();
        let entries = vec![
            located_entry(1, Some(1), Some(5), 100),
            located_entry(2, Some(1), Some(20), 50),
            located_entry(3, None, None, 30),
        ];
        let assigned = forest.classify(&entries);
        let total: usize = assigned.values().map(Vec::len).sum();
        assert_eq!(total, 2);
        assert_eq!(assigned.get(&2), Some(&vec![0]));
        assert_eq!(assigned.get(&1), Some(&vec![1]));
    }

    #[test]
    fn test_aggregate_rolls_counts_up_to_ancestors() {
        let forest = DivisionForest::new(vec![
            division(1, None, Some((1, 2)), None),
            division(2, Some(1), Some((1, 1)), Some((1, 10))),
        ])
        .unwrap();
        let entries = vec![
            located_entry(1, Some(1), Some(5), 100),
            located_entry(2, Some(1), Some(20), 50),
        ];
        let reports = forest.aggregate(&entries, GroupMode::School);
        assert_eq!(reports.len(), 1);
        let root = &reports[0];
        assert_eq!(root.word_count, 150);
        assert_eq!(root.entry_count, 2);
        let child = &root.children[0];
        assert_eq!(child.id, 2);
        assert_eq!(child.word_count, 100);
        assert_eq!(child.entry_count, 1);
    }

    #[test]
    fn test_aggregate_merges_group_counts() {
        let forest = DivisionForest::new(vec![
            division(1, None, Some((1, 2)), None),
            division(2, Some(1), Some((1, 1)), Some((1, 10))),
        ])
        .unwrap();
        let galen = SourceAuthor {
            name: "Galen".to_string(),
            sect: None,
            sect_certain: true,
        };
        let mut inner = located_entry(1, Some(1), Some(5), 100);
        inner.source_author = Some(galen.clone());
        let mut outer = located_entry(2, Some(1), Some(20), 50);
        outer.source_author = Some(SourceAuthor {
            name: "Antyllus".to_string(),
            sect: Some("Pneumatist".to_string()),
            sect_certain: true,
        });
        let reports = forest.aggregate(&[inner, outer], GroupMode::School);
        let root = &reports[0];
        assert_eq!(root.group_counts.get("Galen"), Some(&100));
        assert_eq!(root.group_counts.get("Pneumatist"), Some(&50));
        assert_eq!(root.children[0].group_counts.get("Galen"), Some(&100));
    }

    #[test]
    fn test_aggregate_empty_leaf_reports_zero() {
        let forest = DivisionForest::new(vec![division(1, None, Some((5, 6)), None)]).unwrap();
        let reports = forest.aggregate(&[], GroupMode::Author);
        assert_eq!(reports[0].word_count, 0);
        assert_eq!(reports[0].entry_count, 0);
        assert!(reports[0].group_counts.is_empty());
    }
}

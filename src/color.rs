//! # Color Assignment Module
//!
//! ## Purpose
//! Deterministic, order-stable mapping from group labels to display colors for
//! corpus visualizations.
//!
//! ## Input/Output Specification
//! - **Input**: A set of group labels (authors or schools)
//! - **Output**: Label → hex color mappings
//! - **Stability**: For a fixed label set the mapping is identical across
//!   repeated computations; inserting a new author can shift the colors of
//!   labels that sort after it

use std::collections::{BTreeMap, BTreeSet};

/// Shared palette for author-based visualizations, assigned cyclically by
/// alphabetical rank.
pub const AUTHOR_PALETTE: [&str; 25] = [
    "#e41a1c", // Bright red
    "#377eb8", // Strong blue
    "#4daf4a", // Green
    "#984ea3", // Purple
    "#ff7f00", // Orange
    "#ffff33", // Yellow
    "#a65628", // Brown
    "#f781bf", // Pink
    "#999999", // Gray
    "#66c2a5", // Teal
    "#fc8d62", // Salmon
    "#8da0cb", // Lavender
    "#e78ac3", // Rose
    "#a6d854", // Lime
    "#ffd92f", // Gold
    "#e5c494", // Tan
    "#b3b3b3", // Light gray
    "#8dd3c7", // Aqua
    "#bebada", // Periwinkle
    "#fb8072", // Coral
    "#80b1d3", // Sky blue
    "#fdb462", // Peach
    "#b3de69", // Yellow-green
    "#fccde5", // Light pink
    "#d9d9d9", // Pale gray
];

/// Fixed colors for school-mode groups
pub const SCHOOL_COLORS: [(&str, &str); 6] = [
    ("Galen", "#e41a1c"),
    ("Pneumatist", "#377eb8"),
    ("Methodist", "#4daf4a"),
    ("Empiricist", "#984ea3"),
    ("Dogmatist", "#ff7f00"),
    ("Other", "#999999"),
];

/// Color used for labels outside every table
pub const FALLBACK_COLOR: &str = "#999999";

/// Consistent author color mapping: distinct labels are sorted alphabetically
/// and palette entries assigned cyclically by rank.
pub fn author_colors<I, S>(labels: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let sorted: BTreeSet<String> = labels.into_iter().map(Into::into).collect();
    sorted
        .into_iter()
        .enumerate()
        .map(|(rank, label)| {
            let color = AUTHOR_PALETTE[rank % AUTHOR_PALETTE.len()];
            (label, color.to_string())
        })
        .collect()
}

/// Color for a school-mode label, gray for unrecognized labels
pub fn school_color(label: &str) -> &'static str {
    SCHOOL_COLORS
        .iter()
        .find(|(school, _)| *school == label)
        .map(|(_, color)| *color)
        .unwrap_or(FALLBACK_COLOR)
}

/// The full school color table as an owned map
pub fn school_colors() -> BTreeMap<String, String> {
    SCHOOL_COLORS
        .iter()
        .map(|(school, color)| (school.to_string(), color.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_colors_stable_across_calls() {
        let labels = ["Rufus", "Galen", "Antyllus"];
        assert_eq!(author_colors(labels), author_colors(labels));
    }

    #[test]
    fn test_author_colors_assigned_by_sorted_rank() {
        let colors = author_colors(["Rufus", "Galen", "Antyllus"]);
        assert_eq!(colors["Antyllus"], AUTHOR_PALETTE[0]);
        assert_eq!(colors["Galen"], AUTHOR_PALETTE[1]);
        assert_eq!(colors["Rufus"], AUTHOR_PALETTE[2]);
    }

    #[test]
    fn test_author_colors_wrap_around_palette() {
        let labels: Vec<String> = (0..30).map(|i| format!("Author{i:02}")).collect();
        let colors = author_colors(labels);
        assert_eq!(colors["Author25"], AUTHOR_PALETTE[0]);
        assert_eq!(colors["Author29"], AUTHOR_PALETTE[4]);
    }

    #[test]
    fn test_author_colors_shift_when_label_set_changes() {
        let before = author_colors(["B", "C"]);
        let after = author_colors(["A", "B", "C"]);
        assert_eq!(before["B"], AUTHOR_PALETTE[0]);
        assert_eq!(after["B"], AUTHOR_PALETTE[1]);
    }

    #[test]
    fn test_school_color_table() {
        assert_eq!(school_color("Galen"), "#e41a1c");
        assert_eq!(school_color("Methodist"), "#4daf4a");
        assert_eq!(school_color("Nonexistent"), FALLBACK_COLOR);
    }
}

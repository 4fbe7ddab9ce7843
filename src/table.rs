// Modemstat - Residential gateway status scraping
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! HTML table tokenizer
//!
//! The gateway renders every statistic as a table row whose first cell is a
//! label and whose following cells hold one value per column (per line, per
//! port). This module turns a page into a [`StatsTree`]: section name (the
//! table's `summary` attribute) to label to positional values.

use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Section key used for tables without a `summary` attribute
pub const ROOT_SECTION: &str = "";

static TABLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("table").expect("Failed to parse table selector - this is a bug")
});
static ROW_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("Failed to parse row selector - this is a bug"));
static CELL_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("td, th").expect("Failed to parse cell selector - this is a bug")
});

/// Label to values mapping for one section; values are positional (column index)
pub type Section = BTreeMap<String, Vec<String>>;

/// One labelled row of a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// First cell, trimmed and never empty
    pub label: String,
    /// Remaining cells in column order, at least one
    pub values: Vec<String>,
}

/// One `<table>` element of a page
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawTable {
    /// `summary` attribute, if present and non-blank
    pub summary: Option<String>,
    /// Rows that carry a label and at least one value
    pub rows: Vec<RawRow>,
}

/// Tokenizer output: section name to label to values
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatsTree {
    sections: BTreeMap<String, Section>,
}

impl StatsTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the page produced no rows at all
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Number of sections
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Look up a section by name
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    /// Rows of tables that had no summary
    pub fn root(&self) -> Option<&Section> {
        self.section(ROOT_SECTION)
    }

    /// Iterate over sections in name order
    pub fn sections(&self) -> impl Iterator<Item = (&str, &Section)> {
        self.sections.iter().map(|(name, section)| (name.as_str(), section))
    }

    /// Insert a row, returning the values it replaced
    pub fn insert(
        &mut self,
        section: &str,
        label: impl Into<String>,
        values: Vec<String>,
    ) -> Option<Vec<String>> {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(label.into(), values)
    }
}

/// Text of a cell: every text fragment trimmed, empty ones dropped, the rest
/// concatenated without separator.
fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text()
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect()
}

fn parse_row(row: ElementRef<'_>) -> Option<RawRow> {
    let mut cells = row.select(&CELL_SELECTOR).map(cell_text);
    let label = cells.next()?;
    if label.is_empty() {
        return None;
    }
    let values: Vec<String> = cells.collect();
    if values.is_empty() {
        return None;
    }
    Some(RawRow { label, values })
}

/// Parse every table of a page, in document order
pub fn parse_tables(markup: &str) -> Vec<RawTable> {
    let document = Html::parse_document(markup);
    document
        .select(&TABLE_SELECTOR)
        .map(|table| {
            let summary = table
                .value()
                .attr("summary")
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string);
            let rows = table.select(&ROW_SELECTOR).filter_map(parse_row).collect();
            RawTable { summary, rows }
        })
        .collect()
}

/// Tokenize a page into a [`StatsTree`].
///
/// Never fails: a page without tables yields an empty tree. A label seen twice
/// in the same section keeps the later values and logs a warning.
pub fn tokenize(markup: &str) -> StatsTree {
    let mut tree = StatsTree::new();
    for table in parse_tables(markup) {
        let section = table.summary.as_deref().unwrap_or(ROOT_SECTION);
        debug!(section, rows = table.rows.len(), "Parsing table");
        for RawRow { label, values } in table.rows {
            debug!(section, label = %label, ?values, "Found row");
            if tree.insert(section, label.as_str(), values).is_some() {
                warn!(
                    section,
                    label = %label,
                    "Duplicate label found, overwriting previous values"
                );
            }
        }
    }
    tree
}

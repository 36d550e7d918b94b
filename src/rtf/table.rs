//! Table column layout.
//!
//! Column widths are derived from text statistics: for every column the
//! longest single word and the longest full cell, across all rows.

use serde::{Deserialize, Serialize};

use crate::model::Element;

/// Cell padding on each side, in twips.
pub const MARGIN_WIDTH: u32 = 196;

/// Width of one character used when fitting a table to an absolute width.
pub const MULTIPLY_WIDTH: u32 = 192;

/// Which statistic drives a column width, and whether widths accumulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidthMode {
    /// Width of one column from its longest word
    MaxByColumn,
    /// Width of one column from its longest cell
    TotalByColumn,
    /// Right edge of a column: sum of longest-word widths up to it
    #[default]
    CumulativeMax,
    /// Right edge of a column: sum of longest-cell widths up to it
    CumulativeTotal,
}

impl WidthMode {
    /// Mode from its numeric code (0-3).
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(WidthMode::MaxByColumn),
            1 => Some(WidthMode::TotalByColumn),
            2 => Some(WidthMode::CumulativeMax),
            3 => Some(WidthMode::CumulativeTotal),
            _ => None,
        }
    }

    /// Whether this mode yields cumulative right edges.
    pub fn is_cumulative(self) -> bool {
        matches!(self, WidthMode::CumulativeMax | WidthMode::CumulativeTotal)
    }

    /// The matching cumulative mode.
    pub fn cumulative(self) -> Self {
        match self {
            WidthMode::MaxByColumn | WidthMode::CumulativeMax => WidthMode::CumulativeMax,
            WidthMode::TotalByColumn | WidthMode::CumulativeTotal => WidthMode::CumulativeTotal,
        }
    }

    fn uses_max_word(self) -> bool {
        matches!(self, WidthMode::MaxByColumn | WidthMode::CumulativeMax)
    }
}

/// Per-column text statistics of the most recently measured table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnStats {
    max_word_len: Vec<u32>,
    total_len: Vec<u32>,
}

impl ColumnStats {
    /// Create empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Measure a table, replacing any previous statistics.
    ///
    /// Every `tr` below the table is a row; every `td`/`th` below a row is a
    /// cell, numbered from 0 within its row. Rows with fewer cells leave the
    /// remaining columns as they were.
    pub fn compute(&mut self, table: &Element) {
        self.max_word_len.clear();
        self.total_len.clear();

        for row in table.elements_by_tag("tr") {
            let cells = row.descendants().filter(|e| e.is("td") || e.is("th"));
            for (col, cell) in cells.enumerate() {
                let text = cell.text_content();
                let total = text.chars().count() as u32;
                let longest_word = text
                    .split(char::is_whitespace)
                    .map(|w| w.chars().count() as u32)
                    .max()
                    .unwrap_or(0);

                if col == self.total_len.len() {
                    self.total_len.push(total);
                    self.max_word_len.push(longest_word + 1);
                } else {
                    self.total_len[col] = self.total_len[col].max(total);
                    self.max_word_len[col] = self.max_word_len[col].max(longest_word + 1);
                }
            }
        }

        log::debug!(
            "table layout: {} column(s), max word {:?}, total {:?}",
            self.column_count(),
            self.max_word_len,
            self.total_len
        );
    }

    /// Measure a table and scale the longest-word statistics to an absolute
    /// table width in twips. A width of 0 leaves the statistics unscaled.
    pub fn compute_with_width(&mut self, table: &Element, table_width: u32) {
        self.compute(table);
        self.fit_to_width(table_width);
    }

    /// Scale longest-word statistics so the table spans `table_width` twips.
    pub fn fit_to_width(&mut self, table_width: u32) {
        if table_width == 0 || self.total_len.is_empty() {
            return;
        }
        let padded = |stat: u32| u64::from(stat) * u64::from(MULTIPLY_WIDTH) + 2 * u64::from(MARGIN_WIDTH);
        let total_width: u64 = self.total_len.iter().map(|&s| padded(s)).sum();

        for stat in &mut self.max_word_len {
            let scaled = padded(*stat) * u64::from(table_width) / total_width / u64::from(MULTIPLY_WIDTH);
            *stat = u32::try_from(scaled).unwrap_or(u32::MAX);
        }
    }

    /// Width (or right edge, for cumulative modes) of a 1-based column in
    /// twips. Columns outside the measured table yield 0.
    pub fn column_width(&self, column: usize, mode: WidthMode, font_size: u32) -> u32 {
        if column == 0 || column > self.column_count() {
            return 0;
        }
        let index = column - 1;
        let multiplier = font_size.saturating_mul(8);
        let stats = if mode.uses_max_word() {
            &self.max_word_len
        } else {
            &self.total_len
        };
        let width = |stat: u32| (2 * MARGIN_WIDTH).saturating_add(stat.saturating_mul(multiplier));

        if mode.is_cumulative() {
            stats[..=index]
                .iter()
                .map(|&s| width(s))
                .fold(0, u32::saturating_add)
        } else {
            width(stats[index])
        }
    }

    /// Number of measured columns.
    pub fn column_count(&self) -> usize {
        self.max_word_len.len()
    }

    /// Longest word plus one, per column.
    pub fn max_word_lengths(&self) -> &[u32] {
        &self.max_word_len
    }

    /// Longest cell text, per column.
    pub fn total_lengths(&self) -> &[u32] {
        &self.total_len
    }
}

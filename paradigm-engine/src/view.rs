//! Paradigm view - the renderable output of a composition.

use serde::{Deserialize, Serialize};

/// One cross-tabulated table: composite y-keys down the side, composite
/// x-keys across the top, forms in the cells.
///
/// A composed view carries both the flattened labels and the raw
/// per-parameter values behind them; a view read back from a file has
/// only the labels (the parts are empty until it is decomposed).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParadigmView {
    /// Composite depth key this table belongs to; empty for the implicit
    /// single group.
    pub title: String,

    /// The x parameter names joined with the category joiner.
    pub x_title: String,

    /// The y parameter names joined with the category joiner.
    pub y_title: String,

    /// Raw parameter values behind each row label, in display order.
    pub row_parts: Vec<Vec<String>>,

    /// Raw parameter values behind each column label, in display order.
    pub col_parts: Vec<Vec<String>>,

    /// Flattened row labels, in display order.
    pub rows: Vec<String>,

    /// Flattened column labels, in display order.
    pub cols: Vec<String>,

    /// Dense cell grid indexed `[row][col]`; an empty string is an empty
    /// cell.
    pub cells: Vec<Vec<String>>,
}

impl ParadigmView {
    /// Builds a label-only view from a raw grid, as read from a file.
    pub fn from_grid(
        title: String,
        cols: Vec<String>,
        rows: Vec<String>,
        cells: Vec<Vec<String>>,
    ) -> Self {
        ParadigmView {
            title,
            x_title: String::new(),
            y_title: String::new(),
            row_parts: Vec::new(),
            col_parts: Vec::new(),
            rows,
            cols,
            cells,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.cols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.cols.is_empty()
    }

    /// Cell content by position; empty string for an empty cell.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.cells
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn row_position(&self, label: &str) -> Option<usize> {
        self.rows.iter().position(|r| r == label)
    }

    pub fn col_position(&self, label: &str) -> Option<usize> {
        self.cols.iter().position(|c| c == label)
    }

    /// Cell content by flattened labels.
    pub fn cell_by_labels(&self, row: &str, col: &str) -> Option<&str> {
        let r = self.row_position(row)?;
        let c = self.col_position(col)?;
        Some(self.cell(r, c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ParadigmView {
        ParadigmView::from_grid(
            "aestus".to_string(),
            vec!["NOM".to_string(), "ACC".to_string()],
            vec!["SG".to_string(), "PL".to_string()],
            vec![
                vec!["ajstus".to_string(), "ajstum".to_string()],
                vec!["ajstuːs".to_string(), String::new()],
            ],
        )
    }

    #[test]
    fn test_lookup_by_labels() {
        let view = sample();
        assert_eq!(view.cell_by_labels("SG", "ACC"), Some("ajstum"));
        assert_eq!(view.cell_by_labels("PL", "ACC"), Some(""));
        assert_eq!(view.cell_by_labels("DU", "ACC"), None);
    }

    #[test]
    fn test_out_of_range_cell_is_empty() {
        let view = sample();
        assert_eq!(view.cell(7, 7), "");
    }
}

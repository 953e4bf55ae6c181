//! Pipe-table rendering of the three layouts. Pure string output; used
//! for docs, terminals and anything else that speaks markdown.

use paradigm_engine::{EntryTable, ParadigmError, ParadigmView};

/// Renders a padded markdown pipe table.
fn render_pipe_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let col_count = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (col, cell) in row.iter().enumerate().take(col_count) {
            let len = cell.chars().count();
            if len > widths[col] {
                widths[col] = len;
            }
        }
    }

    let format_row = |cells: &[String]| -> String {
        let mut line = String::new();
        for (col, width) in widths.iter().enumerate() {
            let cell = cells.get(col).map(String::as_str).unwrap_or("");
            line.push_str("| ");
            line.push_str(cell);
            for _ in cell.chars().count()..*width {
                line.push(' ');
            }
            line.push(' ');
        }
        line.push('|');
        line
    };

    let mut out = String::new();
    out.push_str(&format_row(headers));
    out.push('\n');
    for width in &widths {
        out.push_str("|:");
        out.push_str(&"-".repeat(width + 1));
    }
    out.push_str("|\n");
    for row in rows {
        out.push_str(&format_row(row));
        out.push('\n');
    }
    out
}

/// Renders one paradigm view; the top-left header cell names the depth
/// key.
pub fn paradigm_to_markdown(view: &ParadigmView) -> String {
    let mut headers = vec![view.title.clone()];
    headers.extend(view.cols.iter().cloned());
    let rows: Vec<Vec<String>> = view
        .rows
        .iter()
        .enumerate()
        .map(|(row, label)| {
            let mut cells = vec![label.clone()];
            cells.extend((0..view.col_count()).map(|col| view.cell(row, col).to_string()));
            cells
        })
        .collect();
    render_pipe_table(&headers, &rows)
}

/// Renders an entry table (wide or long layout alike).
pub fn entries_to_markdown(table: &EntryTable) -> String {
    let rows: Vec<Vec<String>> = table.rows().map(<[String]>::to_vec).collect();
    render_pipe_table(table.columns(), &rows)
}

/// Melts a wide table and renders the long layout.
pub fn long_to_markdown(
    table: &EntryTable,
    content_column: &str,
) -> Result<String, ParadigmError> {
    Ok(entries_to_markdown(&table.to_long(content_column)?))
}

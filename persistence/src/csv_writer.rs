//! FILENAME: persistence/src/csv_writer.rs
//! Writes entry tables and paradigm views as delimited text.
//!
//! Everything is rendered to memory first and written to disk in one go,
//! so an error mid-render never leaves a partial file behind.

use std::fs;
use std::path::{Path, PathBuf};

use paradigm_engine::{ComposedTables, EntryTable, ParadigmDefinition, ParadigmView};

use crate::error::PersistenceError;

/// File name used for the implicit single group in folder output.
pub const SINGLE_PARADIGM_FILENAME: &str = "generated_paradigm.csv";

/// Renders an entry table (wide or long layout alike) as CSV bytes.
pub fn render_entries(table: &EntryTable) -> Result<Vec<u8>, PersistenceError> {
    let mut buf = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut buf);
        writer.write_record(table.columns())?;
        for row in table.rows() {
            writer.write_record(row)?;
        }
        writer.flush()?;
    }
    Ok(buf)
}

/// Renders a paradigm view as CSV bytes. The top-left cell names the
/// depth key; it stays empty for the implicit single group.
pub fn render_paradigm(view: &ParadigmView) -> Result<Vec<u8>, PersistenceError> {
    let mut buf = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut buf);
        let mut header = vec![view.title.clone()];
        header.extend(view.cols.iter().cloned());
        writer.write_record(&header)?;
        for (row, label) in view.rows.iter().enumerate() {
            let mut record = vec![label.clone()];
            record.extend((0..view.col_count()).map(|col| view.cell(row, col).to_string()));
            writer.write_record(&record)?;
        }
        writer.flush()?;
    }
    Ok(buf)
}

pub fn write_wide_csv(table: &EntryTable, path: &Path) -> Result<(), PersistenceError> {
    let bytes = render_entries(table)?;
    log::debug!("writing {}", path.display());
    fs::write(path, bytes)?;
    Ok(())
}

pub fn write_long_csv(
    table: &EntryTable,
    content_column: &str,
    path: &Path,
) -> Result<(), PersistenceError> {
    let long = table.to_long(content_column)?;
    let bytes = render_entries(&long)?;
    log::debug!("writing {}", path.display());
    fs::write(path, bytes)?;
    Ok(())
}

pub fn write_paradigm_csv(view: &ParadigmView, path: &Path) -> Result<(), PersistenceError> {
    let bytes = render_paradigm(view)?;
    log::debug!("writing {}", path.display());
    fs::write(path, bytes)?;
    Ok(())
}

/// Writes all tables of a composition into one file. Active filters are
/// named on a leading header line; tables are separated by blank lines.
pub fn write_combined_csv(
    tables: &ComposedTables,
    definition: &ParadigmDefinition,
    path: &Path,
) -> Result<(), PersistenceError> {
    let mut output: Vec<u8> = Vec::new();

    if !definition.filters.is_empty() {
        let description: Vec<String> = definition
            .filters
            .iter()
            .map(|(parameter, values)| format!("{}: {}", parameter, values.join(", ")))
            .collect();
        let mut buf = Vec::new();
        {
            let mut writer = csv::Writer::from_writer(&mut buf);
            writer.write_record([description.join("; ").as_str()])?;
            writer.flush()?;
        }
        output.extend(buf);
        output.push(b'\n');
    }

    for (i, (_, view)) in tables.views().into_iter().enumerate() {
        if i > 0 {
            output.push(b'\n');
        }
        output.extend(render_paradigm(view)?);
    }

    log::debug!("writing {}", path.display());
    fs::write(path, output)?;
    Ok(())
}

/// Writes one file per depth key into `folder` and returns the paths
/// written. The implicit single group falls back to
/// [`SINGLE_PARADIGM_FILENAME`].
pub fn write_paradigm_folder(
    tables: &ComposedTables,
    folder: &Path,
) -> Result<Vec<PathBuf>, PersistenceError> {
    let mut written = Vec::new();
    for (key, view) in tables.views() {
        let filename = if key.is_empty() {
            SINGLE_PARADIGM_FILENAME.to_string()
        } else {
            format!("{key}.csv")
        };
        let path = folder.join(filename);
        log::debug!("writing {}", path.display());
        fs::write(&path, render_paradigm(view)?)?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_view() -> ParadigmView {
        ParadigmView::from_grid(
            "aqua".to_string(),
            vec!["NOM".to_string(), "ACC".to_string()],
            vec!["SG".to_string(), "PL".to_string()],
            vec![
                vec!["akwa".to_string(), "akwam".to_string()],
                vec!["akwaj".to_string(), "akwaːs".to_string()],
            ],
        )
    }

    #[test]
    fn test_render_paradigm_puts_title_in_corner() {
        let bytes = render_paradigm(&sample_view()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "aqua,NOM,ACC\nSG,akwa,akwam\nPL,akwaj,akwaːs\n");
    }

    #[test]
    fn test_render_entries_quotes_when_needed() {
        let mut table = paradigm_engine::EntryTable::new(vec!["Form", "Gloss"]).unwrap();
        table
            .push_row(vec!["akwa".to_string(), "water, sea".to_string()])
            .unwrap();
        let text = String::from_utf8(render_entries(&table).unwrap()).unwrap();
        assert_eq!(text, "Form,Gloss\nakwa,\"water, sea\"\n");
    }
}

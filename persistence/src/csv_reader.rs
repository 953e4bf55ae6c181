//! FILENAME: persistence/src/csv_reader.rs
//! Reads delimited text in the three supported layouts.
//!
//! All values are read as raw strings; empty cells stay empty strings
//! rather than turning into missing-value markers.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use paradigm_engine::{
    decompose_paradigm, ComposeWarning, EntryTable, ParadigmDefinition, ParadigmView,
};

use crate::error::PersistenceError;

/// The three interchangeable table layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    /// One row per form, one column per parameter plus the content column.
    Wide,
    /// ID, Parameter, Value triples.
    Long,
    /// Cross-tabulation; first row and column are the axis labels.
    Paradigm,
}

impl FromStr for DataFormat {
    type Err = PersistenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wide" => Ok(DataFormat::Wide),
            "long" => Ok(DataFormat::Long),
            "paradigm" => Ok(DataFormat::Paradigm),
            other => Err(PersistenceError::InvalidFormat(other.to_string())),
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataFormat::Wide => write!(f, "wide"),
            DataFormat::Long => write!(f, "long"),
            DataFormat::Paradigm => write!(f, "paradigm"),
        }
    }
}

pub fn read_wide_csv(path: &Path) -> Result<EntryTable, PersistenceError> {
    read_wide(File::open(path)?)
}

pub fn read_wide_str(text: &str) -> Result<EntryTable, PersistenceError> {
    read_wide(text.as_bytes())
}

fn read_wide<R: Read>(input: R) -> Result<EntryTable, PersistenceError> {
    let mut reader = csv::Reader::from_reader(input);
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut table = EntryTable::new(headers)?;
    for record in reader.records() {
        let record = record?;
        table.push_row(record.iter().map(str::to_string).collect())?;
    }
    Ok(table)
}

/// Reads a long-layout file and pivots it into a wide entry table.
pub fn read_long_csv(path: &Path) -> Result<EntryTable, PersistenceError> {
    let long = read_wide(File::open(path)?)?;
    Ok(EntryTable::from_long(&long)?)
}

pub fn read_long_str(text: &str) -> Result<EntryTable, PersistenceError> {
    let long = read_wide(text.as_bytes())?;
    Ok(EntryTable::from_long(&long)?)
}

pub fn read_paradigm_csv(path: &Path) -> Result<ParadigmView, PersistenceError> {
    read_paradigm(File::open(path)?)
}

pub fn read_paradigm_str(text: &str) -> Result<ParadigmView, PersistenceError> {
    read_paradigm(text.as_bytes())
}

/// Reads a cross-tabulation. The top-left cell names the depth key (it
/// may be empty), the rest of the first row holds the column labels and
/// the first field of every following row holds the row label.
fn read_paradigm<R: Read>(input: R) -> Result<ParadigmView, PersistenceError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(input);
    let mut records = reader.records();

    let header = match records.next() {
        Some(record) => record?,
        None => {
            return Err(PersistenceError::InvalidFormat(
                "paradigm table has no header row".to_string(),
            ))
        }
    };
    let mut fields = header.iter();
    let title = fields.next().unwrap_or("").to_string();
    let cols: Vec<String> = fields.map(str::to_string).collect();

    let mut rows = Vec::new();
    let mut cells = Vec::new();
    for record in records {
        let record = record?;
        let mut fields = record.iter();
        rows.push(fields.next().unwrap_or("").to_string());
        cells.push(fields.map(str::to_string).collect());
    }
    Ok(ParadigmView::from_grid(title, cols, rows, cells))
}

/// Reads entries from any of the three layouts. Paradigm input is
/// decomposed on the spot using the given definition; the other layouts
/// never produce warnings.
pub fn read_entries_csv(
    path: &Path,
    format: DataFormat,
    definition: &ParadigmDefinition,
) -> Result<(EntryTable, Vec<ComposeWarning>), PersistenceError> {
    match format {
        DataFormat::Wide => Ok((read_wide_csv(path)?, Vec::new())),
        DataFormat::Long => Ok((read_long_csv(path)?, Vec::new())),
        DataFormat::Paradigm => {
            let view = read_paradigm_csv(path)?;
            let decomposition = decompose_paradigm(&view, definition, None)?;
            Ok((decomposition.entries, decomposition.warnings))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_names() {
        assert_eq!("wide".parse::<DataFormat>().unwrap(), DataFormat::Wide);
        assert_eq!("long".parse::<DataFormat>().unwrap(), DataFormat::Long);
        assert_eq!(
            "paradigm".parse::<DataFormat>().unwrap(),
            DataFormat::Paradigm
        );
        let err = "nonsense".parse::<DataFormat>().unwrap_err();
        assert!(matches!(err, PersistenceError::InvalidFormat(name) if name == "nonsense"));
    }

    #[test]
    fn test_read_wide() {
        let table = read_wide_str("Form,Case,Number\najstus,NOM,SG\najstum,ACC,SG\n").unwrap();
        assert_eq!(table.columns(), &["Form", "Case", "Number"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.value(1, "Form"), Some("ajstum"));
    }

    #[test]
    fn test_read_wide_keeps_empty_cells() {
        let table = read_wide_str("Form,Case\najstus,\n").unwrap();
        assert_eq!(table.value(0, "Case"), Some(""));
    }

    #[test]
    fn test_read_long_pivots_to_wide() {
        let text = "ID,Parameter,Value\n\
                    a,Form,akwa\n\
                    a,Case,NOM\n\
                    b,Form,akwam\n\
                    b,Case,ACC\n";
        let table = read_long_str(text).unwrap();
        assert_eq!(table.columns(), &["ID", "Form", "Case"]);
        assert_eq!(table.value(0, "Case"), Some("NOM"));
        assert_eq!(table.value(1, "Form"), Some("akwam"));
    }

    #[test]
    fn test_read_paradigm() {
        let text = "aqua,NOM,ACC\nSG,akwa,akwam\nPL,akwaj,akwaːs\n";
        let view = read_paradigm_str(text).unwrap();
        assert_eq!(view.title, "aqua");
        assert_eq!(view.cols, vec!["NOM", "ACC"]);
        assert_eq!(view.rows, vec!["SG", "PL"]);
        assert_eq!(view.cell_by_labels("PL", "ACC"), Some("akwaːs"));
    }

    #[test]
    fn test_read_paradigm_rejects_empty_input() {
        let err = read_paradigm_str("").unwrap_err();
        assert!(matches!(err, PersistenceError::InvalidFormat(_)));
    }

    #[test]
    fn test_read_entries_from_paradigm_layout() {
        let text = ",NOM,ACC\nSG,akwa,akwam\n";
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), text).unwrap();

        let def = ParadigmDefinition::with_axes(vec!["Case"], vec!["Number"], vec![]);
        let (entries, warnings) =
            read_entries_csv(file.path(), DataFormat::Paradigm, &def).unwrap();

        assert!(warnings.is_empty());
        assert_eq!(entries.len(), 2);
        assert_eq!(entries.value(0, "Form"), Some("akwa"));
        assert_eq!(entries.value(1, "Case"), Some("ACC"));
    }
}

//! FILENAME: paradigm-engine/src/table.rs
//! Entry table - the canonical flat representation of the data.
//!
//! An `EntryTable` is an explicit schema (ordered column list) plus rows
//! of string values. Row order is the order the data was read in, which
//! doubles as the tie-break for inferred sort orders downstream.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::ParadigmError;

/// Column names of the long layout.
pub const LONG_ID: &str = "ID";
pub const LONG_PARAMETER: &str = "Parameter";
pub const LONG_VALUE: &str = "Value";

/// A flat table of entries: one row per form, one column per parameter
/// plus the content column. All values are raw strings; an empty string
/// marks an unset value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryTable {
    columns: Vec<String>,
    index: FxHashMap<String, usize>,
    rows: Vec<Vec<String>>,
}

impl EntryTable {
    /// Creates an empty table with the given schema.
    pub fn new<S: Into<String>>(columns: Vec<S>) -> Result<Self, ParadigmError> {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let mut index = FxHashMap::default();
        for (i, name) in columns.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(ParadigmError::DuplicateColumn(name.clone()));
            }
        }
        Ok(EntryTable {
            columns,
            index,
            rows: Vec::new(),
        })
    }

    /// Appends one entry. The row must match the schema width.
    pub fn push_row(&mut self, values: Vec<String>) -> Result<(), ParadigmError> {
        if values.len() != self.columns.len() {
            return Err(ParadigmError::RowWidth {
                expected: self.columns.len(),
                found: values.len(),
            });
        }
        self.rows.push(values);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> &[String] {
        &self.rows[index]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Value of `column` in row `row`, or `None` for an unknown column.
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column_index(column)?;
        self.rows.get(row).map(|r| r[col].as_str())
    }

    /// Builds a wide table from a long one (`ID`, `Parameter`, `Value`
    /// triples). The `ID` column is kept as the first wide column; the
    /// remaining columns are the distinct parameters in first-occurrence
    /// order.
    pub fn from_long(long: &EntryTable) -> Result<EntryTable, ParadigmError> {
        for required in [LONG_ID, LONG_PARAMETER, LONG_VALUE] {
            if !long.has_column(required) {
                return Err(ParadigmError::UnknownColumn(required.to_string()));
            }
        }

        let mut parameters: Vec<String> = Vec::new();
        let mut by_id: Vec<(String, FxHashMap<String, String>)> = Vec::new();
        let mut id_index: FxHashMap<String, usize> = FxHashMap::default();

        for row in 0..long.len() {
            let id = long.value(row, LONG_ID).unwrap_or_default().to_string();
            let parameter = long
                .value(row, LONG_PARAMETER)
                .unwrap_or_default()
                .to_string();
            let value = long.value(row, LONG_VALUE).unwrap_or_default().to_string();

            if !parameters.contains(&parameter) {
                parameters.push(parameter.clone());
            }
            let slot = match id_index.get(&id) {
                Some(&i) => i,
                None => {
                    id_index.insert(id.clone(), by_id.len());
                    by_id.push((id, FxHashMap::default()));
                    by_id.len() - 1
                }
            };
            by_id[slot].1.insert(parameter, value);
        }

        let mut columns = vec![LONG_ID.to_string()];
        columns.extend(parameters.iter().cloned());
        let mut wide = EntryTable::new(columns)?;
        for (id, values) in by_id {
            let mut row = vec![id];
            for parameter in &parameters {
                row.push(values.get(parameter).cloned().unwrap_or_default());
            }
            wide.push_row(row)?;
        }
        Ok(wide)
    }

    /// Melts this wide table into the long layout. An existing `ID`
    /// column is reused; otherwise IDs are synthesized as
    /// `"{row}-{form}"` from the row position and the content value.
    pub fn to_long(&self, content_column: &str) -> Result<EntryTable, ParadigmError> {
        let content = self
            .column_index(content_column)
            .ok_or_else(|| ParadigmError::MissingContentColumn(content_column.to_string()))?;

        let ids: Vec<String> = match self.column_index(LONG_ID) {
            Some(id_col) => self.rows.iter().map(|r| r[id_col].clone()).collect(),
            None => self
                .rows
                .iter()
                .enumerate()
                .map(|(i, r)| format!("{}-{}", i, r[content]))
                .collect(),
        };

        let mut long = EntryTable::new(vec![LONG_ID, LONG_PARAMETER, LONG_VALUE])?;
        for (row, id) in ids.iter().enumerate() {
            for (col, name) in self.columns.iter().enumerate() {
                if name == LONG_ID {
                    continue;
                }
                long.push_row(vec![
                    id.clone(),
                    name.clone(),
                    self.rows[row][col].clone(),
                ])?;
            }
        }
        Ok(long)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EntryTable {
        let mut table = EntryTable::new(vec!["Form", "Case", "Number"]).unwrap();
        table
            .push_row(vec![
                "ajstus".to_string(),
                "NOM".to_string(),
                "SG".to_string(),
            ])
            .unwrap();
        table
            .push_row(vec![
                "ajstum".to_string(),
                "ACC".to_string(),
                "SG".to_string(),
            ])
            .unwrap();
        table
    }

    #[test]
    fn test_schema_and_lookup() {
        let table = sample();
        assert_eq!(table.len(), 2);
        assert_eq!(table.column_index("Case"), Some(1));
        assert_eq!(table.value(1, "Form"), Some("ajstum"));
        assert_eq!(table.value(0, "Gender"), None);
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let err = EntryTable::new(vec!["Form", "Form"]).unwrap_err();
        assert_eq!(err, ParadigmError::DuplicateColumn("Form".to_string()));
    }

    #[test]
    fn test_row_width_checked() {
        let mut table = sample();
        let err = table.push_row(vec!["x".to_string()]).unwrap_err();
        assert_eq!(
            err,
            ParadigmError::RowWidth {
                expected: 3,
                found: 1
            }
        );
    }

    #[test]
    fn test_to_long_synthesizes_ids() {
        let table = sample();
        let long = table.to_long("Form").unwrap();
        assert_eq!(long.columns(), &["ID", "Parameter", "Value"]);
        // 2 rows x 3 columns
        assert_eq!(long.len(), 6);
        assert_eq!(long.value(0, "ID"), Some("0-ajstus"));
        assert_eq!(long.value(0, "Parameter"), Some("Form"));
        assert_eq!(long.value(0, "Value"), Some("ajstus"));
    }

    #[test]
    fn test_long_wide_roundtrip() {
        let table = sample();
        let long = table.to_long("Form").unwrap();
        let wide = EntryTable::from_long(&long).unwrap();

        // ID column is added in front; the parameter columns keep their
        // first-occurrence order.
        assert_eq!(wide.columns(), &["ID", "Form", "Case", "Number"]);
        assert_eq!(wide.len(), 2);
        assert_eq!(wide.value(0, "Case"), Some("NOM"));
        assert_eq!(wide.value(1, "Form"), Some("ajstum"));
    }

    #[test]
    fn test_from_long_requires_long_columns() {
        let table = sample();
        let err = EntryTable::from_long(&table).unwrap_err();
        assert_eq!(err, ParadigmError::UnknownColumn("ID".to_string()));
    }

    #[test]
    fn test_from_long_missing_values_are_empty() {
        let mut long = EntryTable::new(vec!["ID", "Parameter", "Value"]).unwrap();
        for (id, parameter, value) in [
            ("a", "Form", "akwa"),
            ("a", "Case", "NOM"),
            ("b", "Form", "akwam"),
        ] {
            long.push_row(vec![
                id.to_string(),
                parameter.to_string(),
                value.to_string(),
            ])
            .unwrap();
        }
        let wide = EntryTable::from_long(&long).unwrap();
        assert_eq!(wide.value(1, "Case"), Some(""));
    }
}

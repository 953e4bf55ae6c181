//! FILENAME: paradigm-engine/src/error.rs

use thiserror::Error;

use crate::definition::AxisRole;

/// Fatal conditions. Each one halts the operation before any output is
/// produced; callers decide whether to terminate the host process.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParadigmError {
    #[error("{axis} axis contains inexistent parameter(s): {}", .parameters.join(", "))]
    UnknownAxisParameter {
        axis: AxisRole,
        parameters: Vec<String>,
    },

    #[error("filter references inexistent parameter: {0}")]
    UnknownFilterParameter(String),

    #[error("content column '{0}' not found in entry table")]
    MissingContentColumn(String),

    #[error("more values than specified: expected {expected:?}, parsed {values:?}")]
    TooManyValues {
        expected: Vec<String>,
        values: Vec<String>,
    },

    #[error("duplicate column '{0}' in entry table")]
    DuplicateColumn(String),

    #[error("column '{0}' not found in entry table")]
    UnknownColumn(String),

    #[error("row has {found} values but the table has {expected} columns")]
    RowWidth { expected: usize, found: usize },
}

/// Recoverable conditions. The operation continues with a defined
/// fallback; these are logged and returned alongside the result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComposeWarning {
    /// A supplied sort order misses values observed in the data. The
    /// inferred order is used for that parameter instead.
    #[error("specified order {supplied:?} for parameter '{parameter}' does not cover all values: {observed:?}")]
    SortOrderGap {
        parameter: String,
        supplied: Vec<String>,
        observed: Vec<String>,
    },

    /// A composite key parsed into fewer values than declared parameters.
    /// Missing trailing parameters are treated as unset.
    #[error("fewer values ({values:?}) than specified: {expected:?}")]
    FewerValues {
        expected: Vec<String>,
        values: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_offenders() {
        let err = ParadigmError::UnknownAxisParameter {
            axis: AxisRole::Y,
            parameters: vec!["Birds aren't real".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("y axis"));
        assert!(msg.contains("Birds aren't real"));

        let err = ParadigmError::TooManyValues {
            expected: vec!["P1".to_string(), "P2".to_string()],
            values: vec!["A".to_string(), "B".to_string(), "C".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("P1"));
        assert!(msg.contains("\"C\""));
    }

    #[test]
    fn test_warning_messages() {
        let warning = ComposeWarning::SortOrderGap {
            parameter: "Number".to_string(),
            supplied: vec!["SG".to_string()],
            observed: vec!["SG".to_string(), "PL".to_string()],
        };
        assert!(warning.to_string().contains("does not cover all values"));
    }
}

//! FILENAME: paradigm-engine/src/definition.rs
//! Paradigm definition - the serializable configuration.
//!
//! This module contains the types that DESCRIBE a composition: which
//! parameters go on which axis, how rows are filtered, which separators
//! and joiners are in play, and any explicit sort orders. A definition is
//! an immutable snapshot of caller intent; composing never mutates it.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The role a parameter plays within one composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisRole {
    /// Columns of the paradigm table.
    X,
    /// Rows of the paradigm table.
    Y,
    /// Depth: one table per composite value.
    Z,
}

impl fmt::Display for AxisRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisRole::X => write!(f, "x"),
            AxisRole::Y => write!(f, "y"),
            AxisRole::Z => write!(f, "z"),
        }
    }
}

/// Pure string transform applied to cell contents or flattened axis
/// labels during composition.
pub type Decoration = fn(&str) -> String;

fn default_separators() -> Vec<String> {
    vec![".".to_string()]
}

fn default_value_joiner() -> String {
    ".".to_string()
}

fn default_category_joiner() -> String {
    " / ".to_string()
}

fn default_content_column() -> String {
    "Form".to_string()
}

/// The complete configuration for composing or decomposing a paradigm.
///
/// All fields are optional in the serialized form and fall back to the
/// documented defaults. The same definition value can be reused across
/// calls; per-call variations are made by cloning and adjusting fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParadigmDefinition {
    /// Parameters spread across the columns of the paradigm.
    #[serde(default)]
    pub x: Vec<String>,

    /// Parameters spread across the rows of the paradigm.
    #[serde(default)]
    pub y: Vec<String>,

    /// Parameters selecting one table per composite value.
    #[serde(default)]
    pub z: Vec<String>,

    /// Row filters: parameter name to the values kept in the output.
    #[serde(default)]
    pub filters: IndexMap<String, Vec<String>>,

    /// Columns removed from consideration entirely.
    #[serde(default)]
    pub ignore: Vec<String>,

    /// Separator strings recognized when parsing composite keys. The
    /// first entry is the one used when composing keys.
    #[serde(default = "default_separators")]
    pub separators: Vec<String>,

    /// Joiner placed between parameter values in flattened axis labels.
    #[serde(default = "default_value_joiner")]
    pub value_joiner: String,

    /// Joiner placed between forms that collide in one cell, and between
    /// parameter names in axis titles.
    #[serde(default = "default_category_joiner")]
    pub category_joiner: String,

    /// Name of the column holding the surface forms.
    #[serde(default = "default_content_column")]
    pub content_column: String,

    /// Explicit per-parameter sort orders. Parameters without one get an
    /// order inferred from first occurrence in the filtered data.
    #[serde(default)]
    pub sort_orders: IndexMap<String, Vec<String>>,

    /// Transform applied to each cell value as it is placed.
    #[serde(skip)]
    pub cell_decoration: Option<Decoration>,

    /// Transform applied to each flattened axis label.
    #[serde(skip)]
    pub label_decoration: Option<Decoration>,
}

impl Default for ParadigmDefinition {
    fn default() -> Self {
        ParadigmDefinition {
            x: Vec::new(),
            y: Vec::new(),
            z: Vec::new(),
            filters: IndexMap::new(),
            ignore: Vec::new(),
            separators: default_separators(),
            value_joiner: default_value_joiner(),
            category_joiner: default_category_joiner(),
            content_column: default_content_column(),
            sort_orders: IndexMap::new(),
            cell_decoration: None,
            label_decoration: None,
        }
    }
}

impl ParadigmDefinition {
    /// Creates a definition with all defaults and no axis assignments.
    pub fn new() -> Self {
        ParadigmDefinition::default()
    }

    /// Creates a definition with the given axis assignments and all other
    /// settings at their defaults.
    pub fn with_axes<S: Into<String>>(
        x: Vec<S>,
        y: Vec<S>,
        z: Vec<S>,
    ) -> Self {
        ParadigmDefinition {
            x: x.into_iter().map(Into::into).collect(),
            y: y.into_iter().map(Into::into).collect(),
            z: z.into_iter().map(Into::into).collect(),
            ..ParadigmDefinition::default()
        }
    }

    /// The separator used when composing keys (the first configured one).
    pub fn primary_separator(&self) -> &str {
        self.separators
            .first()
            .map(String::as_str)
            .unwrap_or(".")
    }
}

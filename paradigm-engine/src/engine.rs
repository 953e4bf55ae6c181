//! FILENAME: paradigm-engine/src/engine.rs
//! Paradigm engine - composition and decomposition.
//!
//! This module takes a ParadigmDefinition (configuration) and an
//! EntryTable (data) and produces ParadigmView tables, or walks a view
//! and reconstructs the flat entries.
//!
//! Composition pipeline:
//! 1. Validate axis, filter and content configuration against the schema
//! 2. Report columns with no assigned role
//! 3. Filter rows, group by the composite depth key
//! 4. Cross-tabulate each group, aggregating colliding cells
//! 5. Prune empty rows/columns, resolve sort orders, order both axes
//! 6. Flatten the axis labels

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::hash_map::Entry;

use crate::definition::{AxisRole, ParadigmDefinition};
use crate::error::{ComposeWarning, ParadigmError};
use crate::key::{collapse_person_joins, compose_key, split_key};
use crate::table::EntryTable;
use crate::view::ParadigmView;

/// The raw per-parameter values behind one axis label.
type KeyParts = SmallVec<[String; 4]>;

// ============================================================================
// OUTPUT TYPES
// ============================================================================

/// The tables produced by one composition: a single view when there is
/// exactly one depth group, otherwise one view per composite depth key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ComposedTables {
    Single(ParadigmView),
    PerKey(IndexMap<String, ParadigmView>),
}

impl ComposedTables {
    pub fn len(&self) -> usize {
        match self {
            ComposedTables::Single(_) => 1,
            ComposedTables::PerKey(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The one table of a single-group composition.
    pub fn single(&self) -> Option<&ParadigmView> {
        match self {
            ComposedTables::Single(view) => Some(view),
            ComposedTables::PerKey(_) => None,
        }
    }

    /// Looks a table up by its depth key.
    pub fn get(&self, key: &str) -> Option<&ParadigmView> {
        match self {
            ComposedTables::Single(view) => (view.title == key).then_some(view),
            ComposedTables::PerKey(map) => map.get(key),
        }
    }

    /// All tables with their depth keys, in depth-key order.
    pub fn views(&self) -> Vec<(&str, &ParadigmView)> {
        match self {
            ComposedTables::Single(view) => vec![(view.title.as_str(), view)],
            ComposedTables::PerKey(map) => {
                map.iter().map(|(k, v)| (k.as_str(), v)).collect()
            }
        }
    }
}

/// Everything one composition produces.
#[derive(Debug, Clone)]
pub struct Composition {
    pub tables: ComposedTables,
    /// Recoverable conditions encountered along the way.
    pub warnings: Vec<ComposeWarning>,
    /// Columns present in the data but assigned to no role; they are
    /// excluded from the output.
    pub unhandled_columns: Vec<String>,
}

impl Composition {
    pub fn single(&self) -> Option<&ParadigmView> {
        self.tables.single()
    }
}

/// The entries reconstructed from one paradigm table.
#[derive(Debug, Clone)]
pub struct Decomposition {
    pub entries: EntryTable,
    pub warnings: Vec<ComposeWarning>,
}

// ============================================================================
// COMPOSITION
// ============================================================================

/// Cross-tabulates the entries into one paradigm per composite depth key.
pub fn compose_paradigm(
    entries: &EntryTable,
    definition: &ParadigmDefinition,
) -> Result<Composition, ParadigmError> {
    let mut composer = Composer::validate(entries, definition)?;
    Ok(composer.run())
}

struct Composer<'a> {
    entries: &'a EntryTable,
    def: &'a ParadigmDefinition,
    x_idx: Vec<usize>,
    y_idx: Vec<usize>,
    z_idx: Vec<usize>,
    content_idx: usize,
    filter_idx: Vec<(usize, &'a [String])>,
    /// Resolved per-parameter value ranks, for ordering both axes.
    rank_maps: FxHashMap<String, FxHashMap<String, usize>>,
    warnings: Vec<ComposeWarning>,
}

impl<'a> Composer<'a> {
    /// Checks the configuration against the table schema. Any mismatch
    /// here is a configuration error, so nothing is produced.
    fn validate(
        entries: &'a EntryTable,
        def: &'a ParadigmDefinition,
    ) -> Result<Self, ParadigmError> {
        let x_idx = axis_indices(entries, AxisRole::X, &def.x)?;
        let y_idx = axis_indices(entries, AxisRole::Y, &def.y)?;
        let z_idx = axis_indices(entries, AxisRole::Z, &def.z)?;

        let content_idx = entries
            .column_index(&def.content_column)
            .ok_or_else(|| ParadigmError::MissingContentColumn(def.content_column.clone()))?;

        let mut filter_idx = Vec::new();
        for (parameter, allowed) in &def.filters {
            let col = entries
                .column_index(parameter)
                .ok_or_else(|| ParadigmError::UnknownFilterParameter(parameter.clone()))?;
            filter_idx.push((col, allowed.as_slice()));
        }

        Ok(Composer {
            entries,
            def,
            x_idx,
            y_idx,
            z_idx,
            content_idx,
            filter_idx,
            rank_maps: FxHashMap::default(),
            warnings: Vec::new(),
        })
    }

    fn run(&mut self) -> Composition {
        log::debug!(
            "composing a new paradigm from {} entries",
            self.entries.len()
        );

        let unhandled = self.unhandled_columns();
        let kept = self.filter_rows();
        self.resolve_sort_orders(&kept);
        let groups = self.group_by_depth(&kept);

        let mut tables: IndexMap<String, ParadigmView> = IndexMap::new();
        for (key, rows) in &groups {
            log::debug!(
                "cross-tabulating '{}' for x={:?}, y={:?}, cell values: {}",
                key,
                self.def.x,
                self.def.y,
                self.def.content_column
            );
            tables.insert(key.clone(), self.build_view(key, rows));
        }

        let tables = if tables.len() == 1 {
            let view = tables.into_iter().next().map(|(_, v)| v).unwrap_or_default();
            ComposedTables::Single(view)
        } else {
            ComposedTables::PerKey(tables)
        };

        Composition {
            tables,
            warnings: std::mem::take(&mut self.warnings),
            unhandled_columns: unhandled,
        }
    }

    /// Columns the caller gave no directions for. They are excluded from
    /// the output but surfaced so the exclusion is a choice, not an
    /// accident.
    fn unhandled_columns(&self) -> Vec<String> {
        let assigned = |name: &String| {
            *name == self.def.content_column
                || self.def.x.contains(name)
                || self.def.y.contains(name)
                || self.def.z.contains(name)
                || self.def.ignore.contains(name)
        };
        let unhandled: Vec<String> = self
            .entries
            .columns()
            .iter()
            .filter(|name| !assigned(name))
            .cloned()
            .collect();
        if !unhandled.is_empty() {
            log::info!(
                "no role assigned to the following columns, leaving them out: {}",
                unhandled.join(", ")
            );
        }
        unhandled
    }

    /// Indices of the rows that pass every filter, in table order.
    fn filter_rows(&self) -> Vec<usize> {
        if !self.def.filters.is_empty() {
            let description: Vec<String> = self
                .def
                .filters
                .iter()
                .map(|(parameter, values)| format!("{}: {}", parameter, values.join(", ")))
                .collect();
            log::debug!("filtering parameters: {}", description.join("; "));
        }

        let kept: Vec<usize> = (0..self.entries.len())
            .filter(|&row| {
                self.filter_idx
                    .iter()
                    .all(|&(col, allowed)| allowed.contains(&self.entries.row(row)[col]))
            })
            .collect();
        log::debug!("{} of {} entries kept", kept.len(), self.entries.len());
        kept
    }

    /// Resolves one value order per axis parameter: the supplied order
    /// when it covers everything observed, the inferred first-occurrence
    /// order otherwise.
    fn resolve_sort_orders(&mut self, kept: &[usize]) {
        let pairs: Vec<(String, usize)> = self
            .def
            .x
            .iter()
            .cloned()
            .zip(self.x_idx.iter().copied())
            .chain(self.def.y.iter().cloned().zip(self.y_idx.iter().copied()))
            .collect();

        for (parameter, col) in pairs {
            let mut observed: Vec<String> = Vec::new();
            for &row in kept {
                let value = &self.entries.row(row)[col];
                if !observed.contains(value) {
                    observed.push(value.clone());
                }
            }

            let order = match self.def.sort_orders.get(&parameter) {
                Some(supplied) => {
                    let covered = observed
                        .iter()
                        .all(|value| supplied.contains(value));
                    if covered {
                        supplied.clone()
                    } else {
                        log::warn!(
                            "specified order {:?} for parameter '{}' does not cover all values: {:?}",
                            supplied,
                            parameter,
                            observed
                        );
                        self.warnings.push(ComposeWarning::SortOrderGap {
                            parameter: parameter.clone(),
                            supplied: supplied.clone(),
                            observed: observed.clone(),
                        });
                        observed
                    }
                }
                None => {
                    log::debug!("inferred sort order for {}: {:?}", parameter, observed);
                    observed
                }
            };

            let ranks: FxHashMap<String, usize> = order
                .into_iter()
                .enumerate()
                .map(|(rank, value)| (value, rank))
                .collect();
            self.rank_maps.insert(parameter, ranks);
        }
    }

    /// Groups the kept rows by their composite depth key, in
    /// first-occurrence order. An empty z axis forms a single implicit
    /// group.
    fn group_by_depth(&self, kept: &[usize]) -> IndexMap<String, Vec<usize>> {
        let mut groups: IndexMap<String, Vec<usize>> = IndexMap::new();
        if self.z_idx.is_empty() {
            groups.insert(String::new(), kept.to_vec());
            return groups;
        }
        for &row in kept {
            let key = compose_key(
                self.z_idx
                    .iter()
                    .map(|&col| self.entries.row(row)[col].as_str()),
                self.def.primary_separator(),
            );
            groups.entry(key).or_insert_with(Vec::new).push(row);
        }
        groups
    }

    /// Cross-tabulates one depth group into a view.
    fn build_view(&self, title: &str, rows: &[usize]) -> ParadigmView {
        let mut row_keys: IndexMap<KeyParts, usize> = IndexMap::new();
        let mut col_keys: IndexMap<KeyParts, usize> = IndexMap::new();
        let mut cells: FxHashMap<(usize, usize), String> = FxHashMap::default();

        for &row in rows {
            let y_parts: KeyParts = self
                .y_idx
                .iter()
                .map(|&col| self.entries.row(row)[col].clone())
                .collect();
            let x_parts: KeyParts = self
                .x_idx
                .iter()
                .map(|&col| self.entries.row(row)[col].clone())
                .collect();

            let next = row_keys.len();
            let y_pos = *row_keys.entry(y_parts).or_insert(next);
            let next = col_keys.len();
            let x_pos = *col_keys.entry(x_parts).or_insert(next);

            let mut content = self.entries.row(row)[self.content_idx].clone();
            if let Some(decorate) = self.def.cell_decoration {
                content = decorate(&content);
            }

            // Colliding entries aggregate in encounter order; nothing is
            // deduplicated.
            match cells.entry((y_pos, x_pos)) {
                Entry::Occupied(slot) => {
                    let joined = slot.into_mut();
                    joined.push_str(&self.def.category_joiner);
                    joined.push_str(&content);
                }
                Entry::Vacant(slot) => {
                    slot.insert(content);
                }
            }
        }

        // A row or column only exists if at least one of its cells holds
        // something.
        let mut row_alive = vec![false; row_keys.len()];
        let mut col_alive = vec![false; col_keys.len()];
        for (&(r, c), joined) in &cells {
            if !joined.is_empty() {
                row_alive[r] = true;
                col_alive[c] = true;
            }
        }

        let live_rows = self.order_axis(&row_keys, &row_alive, &self.def.y);
        let live_cols = self.order_axis(&col_keys, &col_alive, &self.def.x);

        let mut row_remap = vec![usize::MAX; row_keys.len()];
        for (new, (_, old)) in live_rows.iter().enumerate() {
            row_remap[*old] = new;
        }
        let mut col_remap = vec![usize::MAX; col_keys.len()];
        for (new, (_, old)) in live_cols.iter().enumerate() {
            col_remap[*old] = new;
        }

        let mut grid = vec![vec![String::new(); live_cols.len()]; live_rows.len()];
        for ((r, c), joined) in cells {
            if row_remap[r] != usize::MAX && col_remap[c] != usize::MAX {
                grid[row_remap[r]][col_remap[c]] = joined;
            }
        }

        ParadigmView {
            title: title.to_string(),
            x_title: self.def.x.join(&self.def.category_joiner),
            y_title: self.def.y.join(&self.def.category_joiner),
            row_parts: live_rows
                .iter()
                .map(|(parts, _)| parts.to_vec())
                .collect(),
            col_parts: live_cols
                .iter()
                .map(|(parts, _)| parts.to_vec())
                .collect(),
            rows: live_rows
                .iter()
                .map(|(parts, _)| self.flatten_label(parts))
                .collect(),
            cols: live_cols
                .iter()
                .map(|(parts, _)| self.flatten_label(parts))
                .collect(),
            cells: grid,
        }
    }

    /// Orders the surviving keys of one axis by nested per-parameter
    /// ranks, outer parameter first; ties keep first-occurrence order.
    fn order_axis<'k>(
        &self,
        keys: &'k IndexMap<KeyParts, usize>,
        alive: &[bool],
        parameters: &[String],
    ) -> Vec<(&'k KeyParts, usize)> {
        let mut live: Vec<(&KeyParts, usize)> = keys
            .iter()
            .filter(|(_, &pos)| alive[pos])
            .map(|(parts, &pos)| (parts, pos))
            .collect();
        live.sort_by_key(|(parts, _)| {
            let ranks: SmallVec<[usize; 4]> = parameters
                .iter()
                .zip(parts.iter())
                .map(|(parameter, value)| {
                    self.rank_maps
                        .get(parameter)
                        .and_then(|ranks| ranks.get(value))
                        .copied()
                        .unwrap_or(usize::MAX)
                })
                .collect();
            ranks
        });
        live
    }

    /// Joins the parts of one axis key into its display label: the key
    /// composition rules, then the person-run collapse over the whole
    /// label, then the caller's decoration.
    fn flatten_label(&self, parts: &KeyParts) -> String {
        let joined = compose_key(
            parts.iter().map(String::as_str),
            &self.def.value_joiner,
        );
        let label = collapse_person_joins(&joined, &self.def.value_joiner);
        match self.def.label_decoration {
            Some(decorate) => decorate(&label),
            None => label,
        }
    }
}

fn axis_indices(
    entries: &EntryTable,
    axis: AxisRole,
    parameters: &[String],
) -> Result<Vec<usize>, ParadigmError> {
    let missing: Vec<String> = parameters
        .iter()
        .filter(|p| !entries.has_column(p))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(ParadigmError::UnknownAxisParameter {
            axis,
            parameters: missing,
        });
    }
    Ok(parameters
        .iter()
        .filter_map(|p| entries.column_index(p))
        .collect())
}

// ============================================================================
// DECOMPOSITION
// ============================================================================

/// Walks a paradigm table and reconstructs the flat entries.
///
/// Column order of the result is z + x + y + content. The depth value
/// (`z_value`, defaulting to the view title) is parsed into the declared
/// z parameters with the same rules as the axis labels. Blank cells never
/// produce entries.
pub fn decompose_paradigm(
    view: &ParadigmView,
    definition: &ParadigmDefinition,
    z_value: Option<&str>,
) -> Result<Decomposition, ParadigmError> {
    let def = definition;
    let mut warnings = Vec::new();

    let mut columns: Vec<String> = def.z.clone();
    columns.extend(def.x.iter().cloned());
    columns.extend(def.y.iter().cloned());
    columns.push(def.content_column.clone());
    let mut entries = EntryTable::new(columns)?;

    let z_values: Vec<String> = if def.z.is_empty() {
        Vec::new()
    } else {
        let label = z_value.unwrap_or(view.title.as_str());
        parse_axis_label(label, &def.z, &def.separators, &mut warnings)?
    };

    // Labels are parsed once, not once per cell.
    let col_values: Vec<Vec<String>> = view
        .cols
        .iter()
        .map(|label| parse_axis_label(label, &def.x, &def.separators, &mut warnings))
        .collect::<Result<_, _>>()?;
    let row_values: Vec<Vec<String>> = view
        .rows
        .iter()
        .map(|label| parse_axis_label(label, &def.y, &def.separators, &mut warnings))
        .collect::<Result<_, _>>()?;

    for row in 0..view.row_count() {
        for col in 0..view.col_count() {
            let form = view.cell(row, col);
            if form.is_empty() {
                continue;
            }
            let mut values = z_values.clone();
            values.extend(col_values[col].iter().cloned());
            values.extend(row_values[row].iter().cloned());
            values.push(form.to_string());
            entries.push_row(values)?;
        }
    }

    log::debug!(
        "decomposed '{}' into {} entries",
        view.title,
        entries.len()
    );
    Ok(Decomposition { entries, warnings })
}

/// Parses one axis label into per-parameter values; missing trailing
/// values become empty strings with a recoverable warning.
fn parse_axis_label(
    label: &str,
    parameters: &[String],
    separators: &[String],
    warnings: &mut Vec<ComposeWarning>,
) -> Result<Vec<String>, ParadigmError> {
    let parsed = split_key(label, parameters, separators)?;
    if parsed.padded > 0 {
        warnings.push(ComposeWarning::FewerValues {
            expected: parameters.to_vec(),
            values: parsed.present(),
        });
    }
    Ok(parsed
        .values
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect())
}

// ============================================================================
// TESTS
// ============================================================================

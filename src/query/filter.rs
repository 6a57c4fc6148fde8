//! Filter store and bulk filter parsing
//!
//! A [`FilterStore`] maps column names to the ordered list of filter entries
//! recorded for them. Columns are kept in sorted order and each column's
//! entries in insertion order, so folding a store into a criterion is
//! deterministic.
//!
//! Bulk filter input has one of three shapes per column:
//!
//! ```text
//! {
//!     "airport": "sfo",                                  // bare value, implies "=="
//!     "flight_number": {"value": ["UA12", "UA456"], "op": "in"},
//!     "price": [{"value": 100, "op": ">"}, {"value": 900, "op": "<="}]
//! }
//! ```

use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::criterion::{operator_to_criterion, Criterion, Field};
use super::error::QueryResult;
use super::value::FilterValue;

/// One `{op, value}` filter recorded against a column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterEntry {
    /// Operator token, e.g. `==`, `in`, `between`
    pub op: String,
    pub value: FilterValue,
}

impl FilterEntry {
    pub fn new(op: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self {
            op: op.into(),
            value: value.into(),
        }
    }

    /// Entry with the implied `==` operator
    pub fn equals(value: impl Into<FilterValue>) -> Self {
        Self::new("==", value)
    }
}

/// Per-table mapping from column name to its filter entries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterStore {
    columns: BTreeMap<String, Vec<FilterEntry>>,
}

impl FilterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry to a column's list. No catalogue validation happens here.
    pub fn add(&mut self, column: impl Into<String>, entry: FilterEntry) {
        self.columns.entry(column.into()).or_default().push(entry);
    }

    /// Entries recorded for a column
    pub fn get(&self, column: &str) -> Option<&[FilterEntry]> {
        self.columns.get(column).map(Vec::as_slice)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    /// Columns in sorted order with their entries in insertion order
    pub fn iter(&self) -> btree_map::Iter<'_, String, Vec<FilterEntry>> {
        self.columns.iter()
    }

    /// Number of filtered columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn clear(&mut self) {
        self.columns.clear();
    }
}

impl FromIterator<(String, Vec<FilterEntry>)> for FilterStore {
    fn from_iter<I: IntoIterator<Item = (String, Vec<FilterEntry>)>>(iter: I) -> Self {
        let mut store = FilterStore::new();
        for (column, entries) in iter {
            store.columns.entry(column).or_default().extend(entries);
        }
        store
    }
}

impl<'a> IntoIterator for &'a FilterStore {
    type Item = (&'a String, &'a Vec<FilterEntry>);
    type IntoIter = btree_map::Iter<'a, String, Vec<FilterEntry>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// How folded criteria are joined
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Conjunction {
    #[default]
    And,
    Or,
}

/// Fold a filter store into one criterion.
///
/// Columns are visited in sorted order and entries in insertion order. Entries
/// with an unrecognised operator are skipped. Returns `Ok(None)` when nothing
/// is left to fold.
pub fn build_criterion_for_filter(
    filters: &FilterStore,
    conjunction: Conjunction,
) -> QueryResult<Option<Criterion>> {
    let mut combined: Option<Criterion> = None;

    for (column, entries) in filters {
        let field = Field::new(column.as_str());
        for entry in entries {
            let Some(criterion) = operator_to_criterion(&entry.op, &field, &entry.value)? else {
                tracing::debug!(column = %column, op = %entry.op, "Dropping filter with unknown operator");
                continue;
            };

            combined = Some(match combined {
                None => criterion,
                Some(acc) => match conjunction {
                    Conjunction::And => acc.and(criterion),
                    Conjunction::Or => acc.or(criterion),
                },
            });
        }
    }

    Ok(combined)
}

/// Bulk filter input for a single column
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum BulkFilter {
    /// Several `{value, op}` objects
    Many(Vec<FilterEntry>),
    /// One `{value, op}` object
    One(FilterEntry),
    /// A bare value compared with `==`
    Value(FilterValue),
}

/// Bulk filter input keyed by column
pub type BulkFilterSpec = BTreeMap<String, BulkFilter>;

/// A parsed `(column, value, op)` filter
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFilter {
    pub column: String,
    pub value: FilterValue,
    pub op: String,
}

impl ParsedFilter {
    fn new(column: &str, value: FilterValue, op: impl Into<String>) -> Self {
        Self {
            column: column.to_string(),
            value,
            op: op.into(),
        }
    }
}

/// Flatten bulk filter input into `(column, value, op)` filters.
///
/// Pure: nothing is validated against a catalogue. Pass the output through
/// `filter_column_by_value` to apply it to a table.
pub fn parse_bulk_filters(spec: &BulkFilterSpec) -> Vec<ParsedFilter> {
    let mut parsed = Vec::new();
    for (column, filter) in spec {
        match filter {
            BulkFilter::Many(entries) => {
                for entry in entries {
                    parsed.push(ParsedFilter::new(column, entry.value.clone(), entry.op.as_str()));
                }
            }
            BulkFilter::One(entry) => {
                parsed.push(ParsedFilter::new(column, entry.value.clone(), entry.op.as_str()));
            }
            BulkFilter::Value(value) => {
                parsed.push(ParsedFilter::new(column, value.clone(), "=="));
            }
        }
    }
    parsed
}

/// Decode bulk filter input from a JSON document and flatten it
pub fn parse_bulk_filters_json(json: &str) -> QueryResult<Vec<ParsedFilter>> {
    let spec: BulkFilterSpec = serde_json::from_str(json)?;
    Ok(parse_bulk_filters(&spec))
}

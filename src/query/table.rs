//! Table query builder
//!
//! A [`Table`] owns the query state for one table: selected tokens, filters,
//! custom criteria, grouping, ordering and limit. Mutators take `&mut self`
//! and return `&mut Self` for chaining; compiling never mutates, so the same
//! state always yields the same SQL.
//!
//! The builder methods live on the [`QueryTable`] trait so that specialised
//! tables (see `MetricsTable`) can override how the selection is rendered
//! while reusing everything else.
//!
//! ```rust
//! use sommelier::query::{Order, QueryTable, Table};
//! use sommelier::schema::{Catalogue, DataType};
//!
//! let columns = Catalogue::new()
//!     .column("flight_number", DataType::String)
//!     .column("airport", DataType::String);
//!
//! let mut table = Table::new("fake_table", columns);
//! table
//!     .select("Count(*)")
//!     .group_by("flight_number")
//!     .order_by(["Count(*)"], Some(Order::Desc));
//!
//! assert_eq!(
//!     table.get_sql_query().unwrap(),
//!     "SELECT COUNT(*) FROM fake_table GROUP BY flight_number ORDER BY COUNT(*) DESC"
//! );
//! ```

use std::collections::BTreeSet;

use crate::schema::Catalogue;

use super::criterion::{Criterion, Field};
use super::error::QueryResult;
use super::filter::{
    build_criterion_for_filter, parse_bulk_filters, BulkFilterSpec, Conjunction, FilterEntry,
    FilterStore,
};
use super::format::SqlFormat;
use super::term::{generate_term, Term};
use super::value::FilterValue;

/// ORDER BY direction, shared by every ORDER BY term
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    /// Parse from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Asc => write!(f, "ASC"),
            Self::Desc => write!(f, "DESC"),
        }
    }
}

/// Mutable query state owned by one builder
#[derive(Debug, Clone, Default)]
pub struct QueryState {
    selected: BTreeSet<String>,
    filters: FilterStore,
    custom_filters: Vec<Criterion>,
    group_by: Vec<String>,
    order_by: Vec<String>,
    order: Option<Order>,
    limit: Option<usize>,
}

impl QueryState {
    /// Selected tokens, sorted
    pub fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn filters(&self) -> &FilterStore {
        &self.filters
    }

    /// Custom criteria in insertion order
    pub fn custom_filters(&self) -> &[Criterion] {
        &self.custom_filters
    }

    /// GROUP BY columns, sorted
    pub fn group_by(&self) -> &[String] {
        &self.group_by
    }

    pub fn order_by(&self) -> &[String] {
        &self.order_by
    }

    pub fn order(&self) -> Option<Order> {
        self.order
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}

/// A compiled SELECT statement
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub table: String,
    pub terms: Vec<Term>,
    pub criterion: Option<Criterion>,
    pub group_by: Vec<String>,
    pub order_by: Vec<Term>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl SelectStatement {
    /// Render as SQL. Clauses always appear in SQL order.
    pub fn to_sql(&self, format: &SqlFormat) -> String {
        let terms: Vec<String> = self.terms.iter().map(|t| t.to_sql(format)).collect();
        let mut sql = format!(
            "SELECT {} FROM {}",
            terms.join(","),
            format.identifier(&self.table)
        );

        if let Some(criterion) = &self.criterion {
            sql.push_str(" WHERE ");
            sql.push_str(&criterion.to_sql(format));
        }

        if !self.group_by.is_empty() {
            let columns: Vec<String> = self.group_by.iter().map(|c| format.identifier(c)).collect();
            sql.push_str(" GROUP BY ");
            sql.push_str(&columns.join(","));
        }

        if !self.order_by.is_empty() {
            let keys: Vec<String> = self
                .order_by
                .iter()
                .map(|t| match self.order {
                    Some(order) => format!("{} {}", t.to_sql(format), order),
                    None => t.to_sql(format),
                })
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&keys.join(","));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        sql
    }
}

/// A table and the query being built against it
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    columns: Catalogue,
    format: SqlFormat,
    state: QueryState,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Catalogue) -> Self {
        Self {
            name: name.into(),
            columns,
            format: SqlFormat::default(),
            state: QueryState::default(),
        }
    }

    /// Builder method: set rendering options
    pub fn with_format(mut self, format: SqlFormat) -> Self {
        self.format = format;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &Catalogue {
        &self.columns
    }

    pub fn format(&self) -> &SqlFormat {
        &self.format
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    /// Direct access to the filter store, bypassing catalogue validation
    pub fn filters_mut(&mut self) -> &mut FilterStore {
        &mut self.state.filters
    }

    /// Column handle for building custom criteria
    pub fn column(&self, name: &str) -> Field {
        Field::new(name)
    }

    /// Compile the current state with an explicit selection.
    ///
    /// Returns `Ok(None)` when the selection is empty.
    pub fn compile(&self, selected: Vec<String>) -> QueryResult<Option<SelectStatement>> {
        if selected.is_empty() {
            return Ok(None);
        }

        let mut fields = selected;
        fields.sort();
        fields.dedup();
        let terms = fields.iter().map(|f| generate_term(f)).collect();

        let mut criterion = build_criterion_for_filter(&self.state.filters, Conjunction::And)?;
        for custom in &self.state.custom_filters {
            criterion = Some(match criterion {
                None => custom.clone(),
                Some(existing) => existing.and(custom.clone()),
            });
        }

        let order_by = self.state.order_by.iter().map(|f| generate_term(f)).collect();

        Ok(Some(SelectStatement {
            table: self.name.clone(),
            terms,
            criterion,
            group_by: self.state.group_by.clone(),
            order_by,
            order: self.state.order,
            limit: self.state.limit,
        }))
    }
}

impl QueryTable for Table {
    fn table(&self) -> &Table {
        self
    }

    fn table_mut(&mut self) -> &mut Table {
        self
    }
}

/// Fluent query-building operations shared by every table type.
///
/// Implementors provide access to their underlying [`Table`]; everything else
/// has a default. Override [`QueryTable::selected_column_strings`] to change how
/// the selection is rendered.
///
/// A builder is not meant to be mutated from several threads at once; compiling
/// a builder that is not being mutated is safe from any number of readers.
pub trait QueryTable {
    fn table(&self) -> &Table;

    fn table_mut(&mut self) -> &mut Table;

    /// Tokens to render in the SELECT list
    fn selected_column_strings(&self) -> Vec<String> {
        self.table().state.selected.iter().cloned().collect()
    }

    /// Compile the current state. `Ok(None)` when nothing is selected.
    fn get_query(&self) -> QueryResult<Option<SelectStatement>> {
        self.table().compile(self.selected_column_strings())
    }

    /// Compile the current state to SQL. An empty selection yields `""`.
    fn get_sql_query(&self) -> QueryResult<String> {
        let table = self.table();
        let sql = match self.get_query()? {
            Some(statement) => statement.to_sql(&table.format),
            None => String::new(),
        };
        tracing::trace!(table = %table.name, sql = %sql, "Compiled query");
        Ok(sql)
    }

    /// Add one token to the selection
    fn select(&mut self, column: impl Into<String>) -> &mut Self
    where
        Self: Sized,
    {
        self.table_mut().state.selected.insert(column.into());
        self
    }

    fn select_columns<I, S>(&mut self, columns: I) -> &mut Self
    where
        Self: Sized,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for column in columns {
            self.select(column);
        }
        self
    }

    /// Select every catalogue column
    fn select_all_columns(&mut self) -> &mut Self
    where
        Self: Sized,
    {
        let names: Vec<String> = self.table().columns.names().map(str::to_string).collect();
        self.select_columns(names)
    }

    /// Append a GROUP BY column, keeping the list sorted and free of duplicates
    fn group_by(&mut self, column: impl Into<String>) -> &mut Self
    where
        Self: Sized,
    {
        let column = column.into();
        let group_by = &mut self.table_mut().state.group_by;
        if !group_by.contains(&column) {
            group_by.push(column);
            group_by.sort();
        }
        self
    }

    /// Replace the GROUP BY columns
    fn group_by_columns<I, S>(&mut self, columns: I) -> &mut Self
    where
        Self: Sized,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut group_by: Vec<String> = columns.into_iter().map(Into::into).collect();
        group_by.sort();
        group_by.dedup();
        self.table_mut().state.group_by = group_by;
        self
    }

    /// Append ORDER BY tokens and set the direction shared by all of them
    fn order_by<I, S>(&mut self, fields: I, order: Option<Order>) -> &mut Self
    where
        Self: Sized,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let state = &mut self.table_mut().state;
        for field in fields {
            let field = field.into();
            if !state.order_by.contains(&field) {
                state.order_by.push(field);
            }
        }
        state.order = order;
        self
    }

    fn limit(&mut self, limit: usize) -> &mut Self
    where
        Self: Sized,
    {
        self.table_mut().state.limit = Some(limit);
        self
    }

    /// Append a pre-built criterion, ANDed after the filter store's criterion
    fn add_custom_filter(&mut self, criterion: Criterion) -> &mut Self
    where
        Self: Sized,
    {
        self.table_mut().state.custom_filters.push(criterion);
        self
    }

    /// Record a filter if `column` is in the catalogue; otherwise do nothing
    fn filter_column_by_value(
        &mut self,
        column: &str,
        value: impl Into<FilterValue>,
        operator: &str,
    ) -> &mut Self
    where
        Self: Sized,
    {
        let table = self.table_mut();
        if table.columns.contains(column) {
            table.state.filters.add(column, FilterEntry::new(operator, value));
        } else {
            tracing::debug!(table = %table.name, column, "Ignoring filter on unknown column");
        }
        self
    }

    /// `filter_column_by_value` with the `==` operator
    fn filter_column(&mut self, column: &str, value: impl Into<FilterValue>) -> &mut Self
    where
        Self: Sized,
    {
        self.filter_column_by_value(column, value, "==")
    }

    /// Parse bulk filter input and record each filter through
    /// `filter_column_by_value`
    fn apply_bulk_filters(&mut self, spec: &BulkFilterSpec) -> &mut Self
    where
        Self: Sized,
    {
        for parsed in parse_bulk_filters(spec) {
            self.filter_column_by_value(&parsed.column, parsed.value, &parsed.op);
        }
        self
    }

    /// Fold an arbitrary filter store into one criterion
    fn build_criterion_for_filter(
        &self,
        filters: &FilterStore,
        conjunction: Conjunction,
    ) -> QueryResult<Option<Criterion>> {
        build_criterion_for_filter(filters, conjunction)
    }

    /// Discard all query state, keeping the table definition
    fn reset(&mut self) -> &mut Self
    where
        Self: Sized,
    {
        self.table_mut().state = QueryState::default();
        self
    }
}

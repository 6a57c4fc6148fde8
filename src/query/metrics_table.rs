//! Dimension / metric / date table
//!
//! A [`MetricsTable`] partitions its catalogue into dimensions, metrics and
//! date columns. Selecting every dimension and metric collapses the SELECT
//! list to `*`, and date ranges can be filtered against the first declared
//! date column.

use chrono::NaiveDate;

use crate::schema::{Catalogue, DataType, DateField, DateType, SchemaError, SchemaResult, TableSchema};

use super::format::SqlFormat;
use super::table::{QueryTable, Table};
use super::value::FilterValue;

#[derive(Debug, Clone)]
pub struct MetricsTable {
    table: Table,
    dimensions: Catalogue,
    metrics: Catalogue,
    date_columns: Vec<DateField>,
}

impl MetricsTable {
    /// Build a table from its partitions. A column name may appear in only one
    /// partition.
    pub fn new(
        name: impl Into<String>,
        dimensions: Catalogue,
        metrics: Catalogue,
        date_columns: Vec<DateField>,
    ) -> SchemaResult<Self> {
        let mut columns = Catalogue::new();
        let partitioned = dimensions
            .iter()
            .chain(metrics.iter())
            .chain(date_columns.iter().map(|d| (d.name.as_str(), d.data_type)));
        for (column, data_type) in partitioned {
            if columns.contains(column) {
                return Err(SchemaError::DuplicateColumn(column.to_string()));
            }
            columns.insert(column, data_type);
        }

        Ok(Self {
            table: Table::new(name, columns),
            dimensions,
            metrics,
            date_columns,
        })
    }

    pub fn from_schema(schema: &TableSchema) -> SchemaResult<Self> {
        Self::new(
            schema.name.as_str(),
            schema.dimensions.clone(),
            schema.metrics.clone(),
            schema.date_columns.clone(),
        )
    }

    /// Builder method: set rendering options
    pub fn with_format(mut self, format: SqlFormat) -> Self {
        self.table = self.table.with_format(format);
        self
    }

    pub fn dimensions(&self) -> &Catalogue {
        &self.dimensions
    }

    pub fn metrics(&self) -> &Catalogue {
        &self.metrics
    }

    pub fn date_columns(&self) -> &[DateField] {
        &self.date_columns
    }

    /// The first declared date column
    pub fn default_date_column(&self) -> Option<&DateField> {
        self.date_columns.first()
    }

    pub fn select_all_dimensions(&mut self) -> &mut Self {
        let names: Vec<String> = self.dimensions.names().map(str::to_string).collect();
        self.select_columns(names)
    }

    pub fn select_all_metrics(&mut self) -> &mut Self {
        let names: Vec<String> = self.metrics.names().map(str::to_string).collect();
        self.select_columns(names)
    }

    fn resolve_date_column(&self, date_column_override: Option<&str>) -> Option<String> {
        date_column_override
            .map(str::to_string)
            .or_else(|| self.default_date_column().map(|d| d.name.clone()))
    }

    /// Filter the date column to `[start, end]`.
    ///
    /// Uses `date_column_override` when given, otherwise the first declared
    /// date column. Both bounds give one `between` filter, a single bound a
    /// `>=` or `<=` filter, and no bounds nothing. An empty string bound counts
    /// as no bound.
    pub fn filter_dates_between(
        &mut self,
        start: Option<FilterValue>,
        end: Option<FilterValue>,
        date_column_override: Option<&str>,
    ) -> &mut Self {
        let Some(column) = self.resolve_date_column(date_column_override) else {
            tracing::debug!(table = %self.table.name(), "No date column to filter on");
            return self;
        };

        match (start.filter(is_bound), end.filter(is_bound)) {
            (Some(start), Some(end)) => {
                self.filter_column_by_value(&column, vec![start, end], "between");
            }
            (Some(start), None) => {
                self.filter_column_by_value(&column, start, ">=");
            }
            (None, Some(end)) => {
                self.filter_column_by_value(&column, end, "<=");
            }
            (None, None) => {}
        }
        self
    }

    /// [`MetricsTable::filter_dates_between`] with calendar-date bounds,
    /// expressed in the unit the date column is stored in
    pub fn filter_dates_between_days(
        &mut self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        date_column_override: Option<&str>,
    ) -> &mut Self {
        let field = self
            .resolve_date_column(date_column_override)
            .and_then(|name| self.date_columns.iter().find(|d| d.name == name).cloned());

        let to_value = |date: NaiveDate| date_filter_value(field.as_ref(), date);
        let start = start.map(to_value);
        let end = end.map(to_value);
        self.filter_dates_between(start, end, date_column_override)
    }
}

fn is_bound(value: &FilterValue) -> bool {
    !matches!(value, FilterValue::String(s) if s.is_empty())
}

// Date bound in the column's storage unit. Unknown formats get `YYYYMMDD`
// strings.
fn date_filter_value(field: Option<&DateField>, date: NaiveDate) -> FilterValue {
    let date_type = field.and_then(DateField::date_type);
    match (date_type, field.map(|f| f.data_type)) {
        (Some(DateType::Yyyymmdd), Some(DataType::String)) => {
            FilterValue::String(DateType::Yyyymmdd.date_value(date).to_string())
        }
        (Some(date_type), _) => FilterValue::Integer(date_type.date_value(date)),
        (None, _) => FilterValue::String(date.format("%Y%m%d").to_string()),
    }
}

impl QueryTable for MetricsTable {
    fn table(&self) -> &Table {
        &self.table
    }

    fn table_mut(&mut self) -> &mut Table {
        &mut self.table
    }

    /// `["*"]` once every dimension and metric is selected, otherwise the
    /// selection as is
    fn selected_column_strings(&self) -> Vec<String> {
        let selected = self.table.state().selected();
        let business_columns: Vec<&str> = self
            .dimensions
            .names()
            .chain(self.metrics.names())
            .collect();

        if !business_columns.is_empty() && business_columns.iter().all(|c| selected.contains(*c)) {
            return vec!["*".to_string()];
        }

        selected.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::parse_schema;

    fn mock_table_query() -> MetricsTable {
        let dimensions = Catalogue::new()
            .column("flight_number", DataType::String)
            .column("airport", DataType::String)
            .column("model", DataType::String);
        let metrics = Catalogue::new()
            .column("price", DataType::Integer)
            .column("distance", DataType::Integer);
        let dates = vec![DateField::new(
            "date",
            DataType::String,
            "1:DAYS:SIMPLE_DATE_FORMAT:yyyyMMdd",
            "1:DAYS",
        )];
        MetricsTable::new("fake_table", dimensions, metrics, dates).unwrap()
    }

    fn value(s: &str) -> Option<FilterValue> {
        Some(FilterValue::from(s))
    }

    #[test]
    fn test_select_all_dimensions_and_metrics() {
        let mut query = mock_table_query();
        query.select_all_dimensions().select_all_metrics();
        assert_eq!(query.selected_column_strings(), vec!["*"]);
        assert_eq!(query.get_sql_query().unwrap(), "SELECT * FROM fake_table");

        let mut query = mock_table_query();
        query.select_all_dimensions();
        assert_ne!(query.selected_column_strings(), vec!["*"]);
    }

    #[test]
    fn test_wildcard_ignores_selection_order_and_extras() {
        let mut query = mock_table_query();
        query
            .select("SUM(price)")
            .select_columns(["distance", "model", "price", "airport", "flight_number"]);
        assert_eq!(query.selected_column_strings(), vec!["*"]);
    }

    #[test]
    fn test_select_all_dimensions() {
        let mut query = mock_table_query();
        query.select_all_dimensions();

        let selected = query.table().state().selected();
        assert_eq!(selected.len(), 3);
        assert!(selected.contains("flight_number"));
        assert!(selected.contains("airport"));
        assert!(selected.contains("model"));
    }

    #[test]
    fn test_select_all_metrics() {
        let mut query = mock_table_query();
        query.select_all_metrics();

        let selected = query.table().state().selected();
        assert_eq!(selected.len(), 2);
        assert!(selected.contains("price"));
        assert!(selected.contains("distance"));
    }

    #[test]
    fn test_filter_date_between() {
        let mut query = mock_table_query();
        query.select_all_dimensions().filter_dates_between(value("20180101"), None, None);
        let filters = query.table().state().filters();
        assert!(filters.contains("date"));
        assert_eq!(filters.get("date").unwrap()[0].op, ">=");

        let mut query = mock_table_query();
        query.select_all_dimensions().filter_dates_between(None, value("20180101"), None);
        assert_eq!(query.table().state().filters().get("date").unwrap()[0].op, "<=");

        let mut query = mock_table_query();
        query
            .select_all_dimensions()
            .filter_dates_between(value("20180101"), value("20180106"), None);
        assert_eq!(query.table().state().filters().get("date").unwrap()[0].op, "between");
        let sql = query.get_sql_query().unwrap();
        assert!(sql.contains("date>='20180101'"));
        assert!(sql.contains("date<='20180106'"));
    }

    #[test]
    fn test_filter_date_between_quoted() {
        let mut query = mock_table_query().with_format(SqlFormat::new().quote_char('"'));
        query
            .select_all_dimensions()
            .filter_dates_between(value("20180101"), value("20180106"), None);
        let sql = query.get_sql_query().unwrap();
        assert!(sql.contains(r#""date">='20180101'"#));
        assert!(sql.contains(r#""date"<='20180106'"#));
    }

    #[test]
    fn test_filter_date_between_no_bounds() {
        let mut query = mock_table_query();
        query.filter_dates_between(None, None, None);
        assert!(query.table().state().filters().is_empty());
    }

    #[test]
    fn test_filter_date_between_empty_bounds() {
        let mut query = mock_table_query();
        query.filter_dates_between(value(""), value("20180106"), None);
        let entries = query.table().state().filters().get("date").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].op, "<=");

        let mut query = mock_table_query();
        query.filter_dates_between(value(""), value(""), None);
        assert!(query.table().state().filters().is_empty());
    }

    #[test]
    fn test_filter_date_override() {
        let dimensions = Catalogue::new().column("airport", DataType::String);
        let dates = vec![
            DateField::new("day", DataType::Integer, "1:DAYS:SIMPLE_DATE_FORMAT:yyyyMMdd", "1:DAYS"),
            DateField::new("ts", DataType::Integer, "1:MILLISECONDS:EPOCH", "1:MILLISECONDS"),
        ];
        let mut query = MetricsTable::new("t", dimensions, Catalogue::new(), dates).unwrap();

        query.filter_dates_between(Some(5.into()), None, Some("ts"));
        let filters = query.table().state().filters();
        assert!(filters.contains("ts"));
        assert!(!filters.contains("day"));
    }

    #[test]
    fn test_filter_dates_without_date_column() {
        let dimensions = Catalogue::new().column("airport", DataType::String);
        let mut query = MetricsTable::new("t", dimensions, Catalogue::new(), Vec::new()).unwrap();
        query.filter_dates_between(value("20180101"), None, None);
        assert!(query.table().state().filters().is_empty());
    }

    #[test]
    fn test_filter_dates_between_days() {
        let start = NaiveDate::from_ymd_opt(2020, 3, 3).unwrap();
        let end = NaiveDate::from_ymd_opt(2020, 3, 4).unwrap();

        let mut query = mock_table_query();
        query.select("airport").filter_dates_between_days(Some(start), Some(end), None);
        assert!(query
            .get_sql_query()
            .unwrap()
            .ends_with("WHERE date>='20200303' AND date<='20200304'"));

        let json = r#"{
            "schemaName": "flights",
            "dimensionFieldSpecs": [{"name": "airport", "dataType": "STRING"}],
            "dateTimeFieldSpecs": [
                {"name": "minutes", "dataType": "LONG", "format": "1:MINUTES:EPOCH", "granularity": "1:MINUTES"}
            ]
        }"#;
        let mut query = MetricsTable::from_schema(&parse_schema(json).unwrap()).unwrap();
        query.select("airport").filter_dates_between_days(Some(start), None, None);
        assert!(query.get_sql_query().unwrap().ends_with("WHERE minutes>=26386560"));
    }

    #[test]
    fn test_duplicate_partition_column() {
        let dimensions = Catalogue::new().column("price", DataType::String);
        let metrics = Catalogue::new().column("price", DataType::Integer);
        let result = MetricsTable::new("t", dimensions, metrics, Vec::new());
        assert!(matches!(result, Err(SchemaError::DuplicateColumn(_))));
    }

    #[test]
    fn test_date_columns_are_filterable() {
        let mut query = mock_table_query();
        query.select("price").filter_column("date", "20180101");
        assert_eq!(
            query.get_sql_query().unwrap(),
            "SELECT price FROM fake_table WHERE date='20180101'"
        );
    }
}

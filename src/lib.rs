//! # Sommelier
//!
//! A fluent SQL query builder for Apache Pinot tables. Builder state
//! (selection, filters, grouping, ordering, limit) compiles deterministically
//! into a single SQL string.
//!
//! ## Modules
//!
//! - [`query`]: criteria, filters, terms and the table query builders
//! - [`schema`]: column catalogues, Pinot schema parsing and date units
//! - [`config`]: rendering and logging configuration
//!
//! ## Quick Start
//!
//! ```rust
//! use sommelier::query::{MetricsTable, QueryTable};
//! use sommelier::schema::parse_schema;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let schema = parse_schema(r#"{
//!         "schemaName": "flights",
//!         "dimensionFieldSpecs": [{"name": "airport", "dataType": "STRING"}],
//!         "metricFieldSpecs": [{"name": "price", "dataType": "LONG"}],
//!         "dateTimeFieldSpecs": [{
//!             "name": "date", "dataType": "STRING",
//!             "format": "1:DAYS:SIMPLE_DATE_FORMAT:yyyyMMdd", "granularity": "1:DAYS"
//!         }]
//!     }"#)?;
//!
//!     let mut table = MetricsTable::from_schema(&schema)?;
//!     table
//!         .select_columns(["airport", "SUM(price)"])
//!         .filter_column("airport", "sfo")
//!         .filter_dates_between(Some("20180101".into()), None, None)
//!         .group_by("airport");
//!
//!     assert_eq!(
//!         table.get_sql_query()?,
//!         "SELECT SUM(price),airport FROM flights WHERE airport='sfo' AND date>='20180101' GROUP BY airport"
//!     );
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod query;
pub mod schema;

// Re-export top-level types for convenience
pub use query::{
    Criterion, FilterValue, MetricsTable, Order, QueryError, QueryResult, QueryTable, SqlFormat,
    Table,
};

pub use schema::{parse_schema, parse_schema_file, Catalogue, DataType, SchemaError, TableSchema};

pub use config::{generate_default_config, Config, ConfigError, LoggingConfig, SqlConfig};

//! Sommelier Query Builder
//!
//! Compiles fluent builder state into Pinot SQL:
//!
//! - **Criterion**: WHERE expressions and the operator table
//! - **Filter**: per-column filter store and bulk filter parsing
//! - **Term**: SELECT / ORDER BY tokens, including aggregate calls
//! - **Table**: the `QueryTable` builder and its dimension/metric specialisation
//!
//! # Examples
//!
//! ## Building a query
//!
//! ```rust
//! use sommelier::query::{MetricsTable, Order, QueryTable};
//! use sommelier::schema::{Catalogue, DataType};
//!
//! let dimensions = Catalogue::new().column("airport", DataType::String);
//! let metrics = Catalogue::new().column("price", DataType::Integer);
//! let mut table = MetricsTable::new("flights", dimensions, metrics, Vec::new()).unwrap();
//!
//! table
//!     .select_columns(["airport", "AVG(price)"])
//!     .filter_column_by_value("price", 100, ">")
//!     .group_by("airport")
//!     .order_by(["AVG(price)"], Some(Order::Desc))
//!     .limit(10);
//!
//! assert_eq!(
//!     table.get_sql_query().unwrap(),
//!     "SELECT AVG(price),airport FROM flights WHERE price>100 GROUP BY airport ORDER BY AVG(price) DESC LIMIT 10"
//! );
//! ```
//!
//! ## Bulk filters
//!
//! ```rust
//! use sommelier::query::parse_bulk_filters_json;
//!
//! let parsed = parse_bulk_filters_json(
//!     r#"{"airport": "sfo", "flight_number": {"value": ["UA12", "UA456"], "op": "in"}}"#,
//! ).unwrap();
//! assert_eq!(parsed[0].op, "==");
//! assert_eq!(parsed[1].op, "in");
//! ```

mod criterion;
mod error;
mod filter;
mod format;
mod metrics_table;
mod table;
mod term;
mod value;

pub use criterion::{operator_to_criterion, Comparison, Criterion, Field, Operator};
pub use error::{QueryError, QueryResult};
pub use filter::{
    build_criterion_for_filter, parse_bulk_filters, parse_bulk_filters_json, BulkFilter,
    BulkFilterSpec, Conjunction, FilterEntry, FilterStore, ParsedFilter,
};
pub use format::{quote_string, SqlFormat};
pub use metrics_table::MetricsTable;
pub use table::{Order, QueryState, QueryTable, SelectStatement, Table};
pub use term::{generate_term, AggregateFunction, Term};
pub use value::FilterValue;

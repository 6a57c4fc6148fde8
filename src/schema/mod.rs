//! Table schemas
//!
//! The typed column catalogue the query builder consults:
//!
//! - **Types**: `DataType`, `Catalogue`, `DateField`, `TableSchema`
//! - **Parser**: Pinot schema JSON into a `TableSchema`
//! - **Date types**: unit conversion for date column values

mod date_types;
mod error;
mod parser;
mod types;

pub use date_types::{convert_date_to_type, DateType};
pub use error::{SchemaError, SchemaResult};
pub use parser::{parse_schema, parse_schema_file};
pub use types::{Catalogue, DataType, DateField, TableSchema};

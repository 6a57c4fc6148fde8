//! Pinot schema parser
//!
//! Maps a Pinot schema document (`dimensionFieldSpecs`, `metricFieldSpecs`,
//! `dateTimeFieldSpecs`) into a [`TableSchema`]. Field spec keys other than
//! name, data type, format and granularity are ignored.

use std::path::Path;

use serde::Deserialize;

use super::error::{SchemaError, SchemaResult};
use super::types::{Catalogue, DataType, DateField, TableSchema};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PinotSchema {
    schema_name: String,
    #[serde(default)]
    dimension_field_specs: Vec<FieldSpec>,
    #[serde(default)]
    metric_field_specs: Vec<FieldSpec>,
    #[serde(default)]
    date_time_field_specs: Vec<DateTimeFieldSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldSpec {
    name: String,
    data_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DateTimeFieldSpec {
    name: String,
    data_type: String,
    format: String,
    granularity: String,
}

fn data_type(column: &str, token: &str) -> SchemaResult<DataType> {
    DataType::from_pinot(token).ok_or_else(|| SchemaError::UnknownDataType {
        column: column.to_string(),
        data_type: token.to_string(),
    })
}

fn catalogue(specs: &[FieldSpec]) -> SchemaResult<Catalogue> {
    let mut catalogue = Catalogue::new();
    for spec in specs {
        if catalogue.contains(&spec.name) {
            return Err(SchemaError::DuplicateColumn(spec.name.clone()));
        }
        catalogue.insert(spec.name.as_str(), data_type(&spec.name, &spec.data_type)?);
    }
    Ok(catalogue)
}

/// Parse a Pinot schema from a JSON string
pub fn parse_schema(json: &str) -> SchemaResult<TableSchema> {
    let schema: PinotSchema = serde_json::from_str(json)?;

    let dimensions = catalogue(&schema.dimension_field_specs)?;
    let metrics = catalogue(&schema.metric_field_specs)?;
    let date_columns = schema
        .date_time_field_specs
        .iter()
        .map(|spec| {
            Ok(DateField::new(
                spec.name.as_str(),
                data_type(&spec.name, &spec.data_type)?,
                spec.format.as_str(),
                spec.granularity.as_str(),
            ))
        })
        .collect::<SchemaResult<Vec<_>>>()?;

    tracing::debug!(
        schema = %schema.schema_name,
        dimensions = dimensions.len(),
        metrics = metrics.len(),
        date_columns = date_columns.len(),
        "Parsed Pinot schema"
    );

    Ok(TableSchema {
        name: schema.schema_name,
        dimensions,
        metrics,
        date_columns,
    })
}

/// Parse a Pinot schema from a JSON file
pub fn parse_schema_file(path: &Path) -> SchemaResult<TableSchema> {
    let content = std::fs::read_to_string(path).map_err(|e| SchemaError::Io {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;
    parse_schema(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FLIGHTS_SCHEMA: &str = r#"{
        "schemaName": "flights",
        "dimensionFieldSpecs": [
            {"name": "flightNumber", "dataType": "LONG"},
            {"name": "tags", "dataType": "STRING", "singleValueField": false, "defaultNullValue": "null"}
        ],
        "metricFieldSpecs": [
            {"name": "price", "dataType": "DOUBLE", "defaultNullValue": 0}
        ],
        "dateTimeFieldSpecs": [
            {"name": "millisSinceEpoch", "dataType": "LONG", "format": "1:MILLISECONDS:EPOCH", "granularity": "15:MINUTES"},
            {"name": "hoursSinceEpoch", "dataType": "INT", "format": "1:HOURS:EPOCH", "granularity": "1:HOURS"},
            {"name": "dateString", "dataType": "STRING", "format": "1:DAYS:SIMPLE_DATE_FORMAT:yyyy-MM-dd", "granularity": "1:DAYS"}
        ]
    }"#;

    #[test]
    fn test_parse_schema() {
        let schema = parse_schema(FLIGHTS_SCHEMA).unwrap();

        assert_eq!(schema.name, "flights");
        assert_eq!(schema.dimensions.len(), 2);
        assert_eq!(schema.metrics.len(), 1);
        assert_eq!(schema.date_columns.len(), 3);

        assert_eq!(schema.metrics.get("price"), Some(DataType::Float));
        assert_eq!(schema.dimensions.get("flightNumber"), Some(DataType::Integer));
        assert_eq!(schema.date_columns[0].name, "millisSinceEpoch");
        assert_eq!(schema.date_columns[2].granularity, "1:DAYS");
    }

    #[test]
    fn test_unknown_data_type() {
        let json = r#"{"schemaName": "t", "dimensionFieldSpecs": [{"name": "m", "dataType": "MAP"}]}"#;
        let err = parse_schema(json).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownDataType { .. }));
    }

    #[test]
    fn test_duplicate_dimension() {
        let json = r#"{"schemaName": "t", "dimensionFieldSpecs": [
            {"name": "a", "dataType": "STRING"},
            {"name": "a", "dataType": "INT"}
        ]}"#;
        assert!(matches!(parse_schema(json), Err(SchemaError::DuplicateColumn(_))));
    }

    #[test]
    fn test_parse_schema_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FLIGHTS_SCHEMA.as_bytes()).unwrap();

        let schema = parse_schema_file(file.path()).unwrap();
        assert_eq!(schema.name, "flights");

        let missing = parse_schema_file(Path::new("/nonexistent/schema.json"));
        assert!(matches!(missing, Err(SchemaError::Io { .. })));
    }
}

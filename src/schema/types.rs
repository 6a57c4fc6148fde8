//! Column catalogue types
//!
//! - `DataType`: semantic value type of a column
//! - `Catalogue`: column name → type, in declaration order
//! - `DateField`: a date column and its Pinot format/granularity tokens
//! - `TableSchema`: the dimension/metric/date partitions of one table

use serde::{Deserialize, Serialize};

use crate::query::{quote_string, SqlFormat};

use super::date_types::DateType;

/// Semantic value type of a column
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Integer,
    Float,
    Boolean,
    String,
    Binary,
}

impl DataType {
    /// Map a Pinot `dataType` token
    pub fn from_pinot(token: &str) -> Option<Self> {
        match token {
            "INT" | "LONG" => Some(Self::Integer),
            "FLOAT" | "DOUBLE" | "BIG_DECIMAL" => Some(Self::Float),
            "BOOLEAN" => Some(Self::Boolean),
            "TIMESTAMP" | "STRING" | "JSON" => Some(Self::String),
            "BYTES" => Some(Self::Binary),
            _ => None,
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Binary => "binary",
        })
    }
}

/// Column name → data type, in declaration order. Names are unique; inserting
/// an existing name replaces its type in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Catalogue {
    columns: Vec<(String, DataType)>,
}

impl Catalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: add a column
    pub fn column(mut self, name: impl Into<String>, data_type: DataType) -> Self {
        self.insert(name, data_type);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, data_type: DataType) {
        let name = name.into();
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some(existing) => existing.1 = data_type,
            None => self.columns.push((name, data_type)),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|(n, _)| n == name)
    }

    pub fn get(&self, name: &str) -> Option<DataType> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, t)| *t)
    }

    /// Column names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, DataType)> {
        self.columns.iter().map(|(n, t)| (n.as_str(), *t))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, DataType)> for Catalogue {
    fn from_iter<I: IntoIterator<Item = (S, DataType)>>(iter: I) -> Self {
        let mut catalogue = Catalogue::new();
        for (name, data_type) in iter {
            catalogue.insert(name, data_type);
        }
        catalogue
    }
}

/// A date column with its time-bucketing metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateField {
    pub name: String,
    pub data_type: DataType,
    /// Pinot format token, e.g. `1:MILLISECONDS:EPOCH`
    pub format: String,
    /// Pinot granularity token, e.g. `1:DAYS`
    pub granularity: String,
}

impl DateField {
    pub fn new(
        name: impl Into<String>,
        data_type: DataType,
        format: impl Into<String>,
        granularity: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            data_type,
            format: format.into(),
            granularity: granularity.into(),
        }
    }

    /// Unit the column's values are stored in, when the format is one we can
    /// convert to.
    ///
    /// Accepts both `1:MILLISECONDS:EPOCH` / `1:DAYS:SIMPLE_DATE_FORMAT:yyyyMMdd`
    /// and the pipe-delimited `EPOCH|MILLISECONDS|1` / `SIMPLE_DATE_FORMAT|yyyyMMdd`
    /// spellings.
    pub fn date_type(&self) -> Option<DateType> {
        if self.format.contains('|') {
            let parts: Vec<&str> = self.format.split('|').collect();
            return match parts.as_slice() {
                ["EPOCH", unit] | ["EPOCH", unit, "1"] => epoch_unit(unit),
                ["SIMPLE_DATE_FORMAT", "yyyyMMdd", ..] => Some(DateType::Yyyymmdd),
                _ => None,
            };
        }

        let parts: Vec<&str> = self.format.split(':').collect();
        match parts.as_slice() {
            ["1", unit, "EPOCH"] => epoch_unit(unit),
            [_, "DAYS", "SIMPLE_DATE_FORMAT", "yyyyMMdd"] => Some(DateType::Yyyymmdd),
            _ => None,
        }
    }

    /// A `DATETIMECONVERT` select token that buckets this column into
    /// `output_format` at `granularity`. Format tokens are string literals and
    /// may contain quotes (`yyyy-MM-dd'T'HH:mm:ss`).
    pub fn bucket_expression(
        &self,
        sql_format: &SqlFormat,
        output_format: &str,
        granularity: &str,
    ) -> String {
        format!(
            "DATETIMECONVERT({},{},{},{})",
            sql_format.identifier(&self.name),
            quote_string(&self.format),
            quote_string(output_format),
            quote_string(granularity)
        )
    }
}

fn epoch_unit(unit: &str) -> Option<DateType> {
    match unit {
        "MILLISECONDS" => Some(DateType::MillisecondsSinceEpoch),
        "SECONDS" => Some(DateType::SecondsSinceEpoch),
        "MINUTES" => Some(DateType::MinutesSinceEpoch),
        "HOURS" => Some(DateType::HoursSinceEpoch),
        _ => None,
    }
}

/// Dimension, metric and date partitions of one table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    pub name: String,
    pub dimensions: Catalogue,
    pub metrics: Catalogue,
    /// In declaration order; the first one is the default date column
    pub date_columns: Vec<DateField>,
}

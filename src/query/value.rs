//! Filter values
//!
//! The literal side of a filter: a scalar or a list of scalars, decoded from
//! JSON bulk filter input or built from Rust values.

use serde::{Deserialize, Serialize};

use super::format::quote_string;

/// Values used in filter comparisons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Boolean value
    Boolean(bool),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// String value
    String(String),
    /// Sequence of values (for `in`, `notin` and `between`)
    List(Vec<FilterValue>),
}

impl FilterValue {
    /// Render as a SQL literal.
    ///
    /// NaN and infinite floats have no SQL literal; filters carrying them are
    /// rejected by `operator_to_criterion`. Hand-built criteria should not
    /// contain them.
    pub fn to_sql(&self) -> String {
        match self {
            Self::Boolean(b) => b.to_string(),
            Self::Integer(i) => i.to_string(),
            Self::Float(f) => format_float(*f),
            Self::String(s) => quote_string(s),
            Self::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_sql()).collect();
                format!("({})", parts.join(","))
            }
        }
    }

    /// Items of a list, or the scalar itself as a one-element list
    pub fn to_list(&self) -> Vec<FilterValue> {
        match self {
            Self::List(items) => items.clone(),
            other => vec![other.clone()],
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// False for NaN or infinite floats, including inside lists
    pub fn is_finite(&self) -> bool {
        match self {
            Self::Float(f) => f.is_finite(),
            Self::List(items) => items.iter().all(FilterValue::is_finite),
            _ => true,
        }
    }
}

// Floats keep a fractional digit so `1.0` never collapses into the integer `1`.
fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{:.1}", f)
    } else {
        f.to_string()
    }
}

impl std::fmt::Display for FilterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_sql())
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&String> for FilterValue {
    fn from(s: &String) -> Self {
        Self::String(s.clone())
    }
}

impl From<i64> for FilterValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for FilterValue {
    fn from(i: i32) -> Self {
        Self::Integer(i as i64)
    }
}

impl From<u32> for FilterValue {
    fn from(i: u32) -> Self {
        Self::Integer(i as i64)
    }
}

impl From<f64> for FilterValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl<T: Into<FilterValue>> From<Vec<T>> for FilterValue {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FilterValue>, const N: usize> From<[T; N]> for FilterValue {
    fn from(items: [T; N]) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

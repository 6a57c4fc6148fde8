//! Criterion algebra
//!
//! Boolean expression nodes for WHERE clauses. A [`Criterion`] is immutable;
//! combining two criteria with [`Criterion::and`] / [`Criterion::or`] (or the
//! `&` / `|` operators) produces a new node.
//!
//! ```rust
//! use sommelier::query::Field;
//!
//! let criterion = Field::new("airport").eq("sfo") | Field::new("model").isin(["B777", "B787"]);
//! assert_eq!(criterion.to_string(), "airport='sfo' OR model IN ('B777','B787')");
//! ```

use std::ops::{BitAnd, BitOr};

use super::error::{QueryError, QueryResult};
use super::format::{quote_string, SqlFormat};
use super::value::FilterValue;

/// Binary comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl std::fmt::Display for Comparison {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Eq => write!(f, "="),
            Self::Ne => write!(f, "<>"),
            Self::Gt => write!(f, ">"),
            Self::Gte => write!(f, ">="),
            Self::Lt => write!(f, "<"),
            Self::Lte => write!(f, "<="),
        }
    }
}

/// Filter operators accepted by the filter store and bulk filter input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Equal to
    Eq,
    /// Not equal to
    Ne,
    /// Greater than
    Gt,
    /// Greater than or equal to
    Gte,
    /// Less than
    Lt,
    /// Less than or equal to
    Lte,
    /// Value is one of a list
    In,
    /// Value is none of a list
    NotIn,
    /// Inclusive range `[low, high]`
    Between,
    /// Native regex match
    Regex,
}

impl Operator {
    /// Parse an operator token. Unknown tokens yield `None`.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "==" => Some(Self::Eq),
            "!=" => Some(Self::Ne),
            ">" => Some(Self::Gt),
            ">=" => Some(Self::Gte),
            "<" => Some(Self::Lt),
            "<=" => Some(Self::Lte),
            "in" | "isin" => Some(Self::In),
            "notin" | "nin" => Some(Self::NotIn),
            "between" => Some(Self::Between),
            "regex" => Some(Self::Regex),
            _ => None,
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Eq => write!(f, "=="),
            Self::Ne => write!(f, "!="),
            Self::Gt => write!(f, ">"),
            Self::Gte => write!(f, ">="),
            Self::Lt => write!(f, "<"),
            Self::Lte => write!(f, "<="),
            Self::In => write!(f, "in"),
            Self::NotIn => write!(f, "notin"),
            Self::Between => write!(f, "between"),
            Self::Regex => write!(f, "regex"),
        }
    }
}

/// A boolean expression usable in a WHERE clause
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    /// `column <op> value`
    Compare {
        column: String,
        op: Comparison,
        value: FilterValue,
    },
    /// `column [NOT] IN (values)`
    In {
        column: String,
        values: Vec<FilterValue>,
        negated: bool,
    },
    /// `regexp_like(column, 'pattern')`
    RegexLike { column: String, pattern: String },
    And(Box<Criterion>, Box<Criterion>),
    Or(Box<Criterion>, Box<Criterion>),
}

impl Criterion {
    /// Combine with AND
    pub fn and(self, other: Criterion) -> Criterion {
        Criterion::And(Box::new(self), Box::new(other))
    }

    /// Combine with OR
    pub fn or(self, other: Criterion) -> Criterion {
        Criterion::Or(Box::new(self), Box::new(other))
    }

    /// Render with the given formatting options
    pub fn to_sql(&self, format: &SqlFormat) -> String {
        match self {
            Self::Compare { column, op, value } => {
                format!("{}{}{}", format.identifier(column), op, value.to_sql())
            }
            Self::In {
                column,
                values,
                negated,
            } => {
                let items: Vec<String> = values.iter().map(|v| v.to_sql()).collect();
                let keyword = if *negated { "NOT IN" } else { "IN" };
                format!(
                    "{} {} ({})",
                    format.identifier(column),
                    keyword,
                    items.join(",")
                )
            }
            Self::RegexLike { column, pattern } => {
                format!(
                    "regexp_like({}, {})",
                    format.identifier(column),
                    quote_string(pattern)
                )
            }
            Self::And(left, right) => self.render_connective("AND", left, right, format),
            Self::Or(left, right) => self.render_connective("OR", left, right, format),
        }
    }

    fn render_connective(
        &self,
        keyword: &str,
        left: &Criterion,
        right: &Criterion,
        format: &SqlFormat,
    ) -> String {
        format!(
            "{} {} {}",
            self.render_child(left, format),
            keyword,
            self.render_child(right, format)
        )
    }

    // A child connective only needs brackets when it differs from its parent.
    fn render_child(&self, child: &Criterion, format: &SqlFormat) -> String {
        let needs_brackets = matches!(
            (self, child),
            (Self::And(..), Self::Or(..)) | (Self::Or(..), Self::And(..))
        );
        let sql = child.to_sql(format);
        if needs_brackets {
            format!("({})", sql)
        } else {
            sql
        }
    }
}

impl std::fmt::Display for Criterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_sql(&SqlFormat::default()))
    }
}

impl BitAnd for Criterion {
    type Output = Criterion;

    fn bitand(self, rhs: Criterion) -> Criterion {
        self.and(rhs)
    }
}

impl BitOr for Criterion {
    type Output = Criterion;

    fn bitor(self, rhs: Criterion) -> Criterion {
        self.or(rhs)
    }
}

/// A column reference used to build criteria by hand
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
}

impl Field {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn compare(&self, op: Comparison, value: impl Into<FilterValue>) -> Criterion {
        Criterion::Compare {
            column: self.name.clone(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(&self, value: impl Into<FilterValue>) -> Criterion {
        self.compare(Comparison::Eq, value)
    }

    pub fn ne(&self, value: impl Into<FilterValue>) -> Criterion {
        self.compare(Comparison::Ne, value)
    }

    pub fn gt(&self, value: impl Into<FilterValue>) -> Criterion {
        self.compare(Comparison::Gt, value)
    }

    pub fn gte(&self, value: impl Into<FilterValue>) -> Criterion {
        self.compare(Comparison::Gte, value)
    }

    pub fn lt(&self, value: impl Into<FilterValue>) -> Criterion {
        self.compare(Comparison::Lt, value)
    }

    pub fn lte(&self, value: impl Into<FilterValue>) -> Criterion {
        self.compare(Comparison::Lte, value)
    }

    /// Set membership; a scalar is treated as a one-element list
    pub fn isin(&self, values: impl Into<FilterValue>) -> Criterion {
        Criterion::In {
            column: self.name.clone(),
            values: values.into().to_list(),
            negated: false,
        }
    }

    /// Negated set membership
    pub fn notin(&self, values: impl Into<FilterValue>) -> Criterion {
        Criterion::In {
            column: self.name.clone(),
            values: values.into().to_list(),
            negated: true,
        }
    }

    /// `column >= low AND column <= high`. Bounds are not swapped.
    pub fn between(&self, low: impl Into<FilterValue>, high: impl Into<FilterValue>) -> Criterion {
        self.gte(low).and(self.lte(high))
    }

    pub fn regex_like(&self, pattern: impl Into<String>) -> Criterion {
        Criterion::RegexLike {
            column: self.name.clone(),
            pattern: pattern.into(),
        }
    }
}

/// Convert an (operator, column, value) triple into a criterion.
///
/// Returns `Ok(None)` for an unrecognised operator; callers skip it. `between`
/// requires a list of at least two values (low bound first). NaN and infinite
/// floats are rejected.
pub fn operator_to_criterion(
    operator: &str,
    column: &Field,
    value: &FilterValue,
) -> QueryResult<Option<Criterion>> {
    let Some(op) = Operator::parse(operator) else {
        return Ok(None);
    };
    if !value.is_finite() {
        return Err(QueryError::invalid_filter(
            column.name(),
            format!("{op} value must be a finite number"),
        ));
    }

    let criterion = match op {
        Operator::Eq => column.eq(value.clone()),
        Operator::Ne => column.ne(value.clone()),
        Operator::Gt => column.gt(value.clone()),
        Operator::Gte => column.gte(value.clone()),
        Operator::Lt => column.lt(value.clone()),
        Operator::Lte => column.lte(value.clone()),
        Operator::In => column.isin(value.clone()),
        Operator::NotIn => column.notin(value.clone()),
        Operator::Between => match value {
            FilterValue::List(bounds) if bounds.len() >= 2 => {
                column.between(bounds[0].clone(), bounds[1].clone())
            }
            FilterValue::List(bounds) => {
                return Err(QueryError::invalid_filter(
                    column.name(),
                    format!("between requires 2 values, got {}", bounds.len()),
                ));
            }
            _ => {
                return Err(QueryError::invalid_filter(
                    column.name(),
                    "between requires a list of [low, high]",
                ));
            }
        },
        Operator::Regex => {
            let pattern = match value {
                FilterValue::String(s) => s.clone(),
                other => other.to_string(),
            };
            column.regex_like(pattern)
        }
    };

    Ok(Some(criterion))
}

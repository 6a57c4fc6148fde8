//! Term generator
//!
//! Turns a SELECT / ORDER BY token such as `price`, `*` or `SUM(price)` into a
//! typed [`Term`]. Aggregate names come from a closed registry; anything that
//! looks like a call but is not in the registry stays a verbatim field.

use std::sync::OnceLock;

use regex::Regex;

use super::format::SqlFormat;

fn field_aggregation_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\A(.+)\((.+)\)\z").expect("valid aggregation pattern"))
}

fn percentile_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\A(\D+)(\d+)\z").expect("valid percentile pattern"))
}

/// Aggregation functions known to the dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunction {
    Sum,
    Avg,
    Count,
    Min,
    Max,
    /// `DISTINCTCOUNT(col)`, Pinot's spelling of `COUNT(DISTINCT col)`
    DistinctCount,
    /// `PERCENTILE{N}(col)`
    Percentile(u32),
    /// `PercentileTDigest{N}(col)`
    PercentileTDigest(u32),
    /// `PERCENTILEEST{N}(col)`
    PercentileEst(u32),
}

impl AggregateFunction {
    /// Resolve a function name, case-insensitively.
    ///
    /// Percentile variants need a numeric suffix (`percentile90`); a missing or
    /// malformed suffix resolves to nothing.
    pub fn resolve(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        match name.as_str() {
            "sum" => return Some(Self::Sum),
            "avg" => return Some(Self::Avg),
            "count" => return Some(Self::Count),
            "min" => return Some(Self::Min),
            "max" => return Some(Self::Max),
            "distinctcount" => return Some(Self::DistinctCount),
            _ => {}
        }

        if !name.starts_with("percentile") {
            return None;
        }

        let captures = percentile_pattern().captures(&name)?;
        let percentile: u32 = captures[2].parse().ok()?;
        match &captures[1] {
            "percentile" => Some(Self::Percentile(percentile)),
            "percentiletdigest" => Some(Self::PercentileTDigest(percentile)),
            "percentileest" => Some(Self::PercentileEst(percentile)),
            _ => None,
        }
    }

    /// Function name as emitted in SQL
    pub fn sql_name(&self) -> String {
        match self {
            Self::Sum => "SUM".to_string(),
            Self::Avg => "AVG".to_string(),
            Self::Count => "COUNT".to_string(),
            Self::Min => "MIN".to_string(),
            Self::Max => "MAX".to_string(),
            Self::DistinctCount => "DISTINCTCOUNT".to_string(),
            Self::Percentile(p) => format!("PERCENTILE{}", p),
            // The only mixed-case aggregate name in the dialect
            Self::PercentileTDigest(p) => format!("PercentileTDigest{}", p),
            Self::PercentileEst(p) => format!("PERCENTILEEST{}", p),
        }
    }
}

/// A compiled SELECT / ORDER BY expression
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    /// Plain field reference
    Field(String),
    /// `*`
    Star,
    /// Aggregate call over a field or `*`
    Aggregate {
        function: AggregateFunction,
        argument: Box<Term>,
        /// The token the call was parsed from
        token: String,
    },
}

impl Term {
    /// Render with the given formatting options
    pub fn to_sql(&self, format: &SqlFormat) -> String {
        match self {
            Self::Field(name) => format.identifier(name),
            Self::Star => "*".to_string(),
            Self::Aggregate { token, .. } if format.verbatim_function_terms => {
                format.identifier(token)
            }
            Self::Aggregate {
                function, argument, ..
            } => format!("{}({})", function.sql_name(), argument.to_sql(format)),
        }
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_sql(&SqlFormat::default()))
    }
}

/// Parse a column-or-aggregation token into a term
pub fn generate_term(token: &str) -> Term {
    if let Some(captures) = field_aggregation_pattern().captures(token) {
        let argument = match &captures[2] {
            "*" => Term::Star,
            column => Term::Field(column.to_string()),
        };

        return match AggregateFunction::resolve(&captures[1]) {
            Some(function) => Term::Aggregate {
                function,
                argument: Box::new(argument),
                token: token.to_string(),
            },
            None => {
                tracing::trace!(token, "Unrecognised function token, rendering verbatim");
                Term::Field(token.to_string())
            }
        };
    }

    if token == "*" {
        Term::Star
    } else {
        Term::Field(token.to_string())
    }
}

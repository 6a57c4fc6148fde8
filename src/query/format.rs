//! SQL rendering options
//!
//! Every compiled fragment (terms, criteria, table names, GROUP BY and ORDER BY
//! items) goes through one [`SqlFormat`] so that identifier quoting is a single
//! convention for the whole statement.

/// Options controlling how builder state is rendered to text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SqlFormat {
    /// Character used to quote identifiers. `None` leaves them bare.
    pub quote_char: Option<char>,
    /// Render recognised aggregate tokens verbatim instead of as compiled calls
    pub verbatim_function_terms: bool,
}

impl SqlFormat {
    /// Unquoted identifiers, compiled aggregate calls
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: quote identifiers with `quote`
    pub fn quote_char(mut self, quote: char) -> Self {
        self.quote_char = Some(quote);
        self
    }

    /// Builder method: keep function tokens exactly as the caller wrote them
    pub fn verbatim_function_terms(mut self, verbatim: bool) -> Self {
        self.verbatim_function_terms = verbatim;
        self
    }

    /// Render an identifier according to the quoting convention
    pub fn identifier(&self, name: &str) -> String {
        match self.quote_char {
            Some(q) => {
                let doubled: String = [q, q].iter().collect();
                format!("{q}{}{q}", name.replace(q, &doubled))
            }
            None => name.to_string(),
        }
    }
}

/// Wrap a string in single quotes, doubling embedded quotes
pub fn quote_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_unquoted_by_default() {
        assert_eq!(SqlFormat::new().identifier("flight_number"), "flight_number");
    }

    #[test]
    fn test_identifier_quoted() {
        let format = SqlFormat::new().quote_char('"');
        assert_eq!(format.identifier("date"), "\"date\"");
        assert_eq!(format.identifier("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_quote_string_escapes() {
        assert_eq!(quote_string("sfo"), "'sfo'");
        assert_eq!(quote_string("O'Hare"), "'O''Hare'");
    }
}

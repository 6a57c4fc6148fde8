//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::query::SqlFormat;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sql: SqlConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// SQL rendering configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SqlConfig {
    /// Identifier quote character; unset renders identifiers bare
    #[serde(default)]
    pub quote_char: Option<char>,

    /// Render aggregate tokens exactly as written instead of compiling them
    #[serde(default)]
    pub verbatim_function_terms: bool,
}

impl SqlConfig {
    pub fn format(&self) -> SqlFormat {
        let format = SqlFormat::new().verbatim_function_terms(self.verbatim_function_terms);
        match self.quote_char {
            Some(quote) => format.quote_char(quote),
            None => format,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("sommelier").join("config.toml")),
            Some(PathBuf::from("./sommelier.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// SQL rendering options for query builders
    pub fn sql_format(&self) -> SqlFormat {
        self.sql.format()
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // SQL overrides; an empty quote char turns quoting off
        if let Some(quote) = lookup("SOMMELIER_QUOTE_CHAR") {
            let mut chars = quote.chars();
            match (chars.next(), chars.next()) {
                (None, _) => self.sql.quote_char = None,
                (Some(c), None) => self.sql.quote_char = Some(c),
                _ => tracing::warn!(value = %quote, "Ignoring SOMMELIER_QUOTE_CHAR, expected one character"),
            }
        }
        if let Some(verbatim) = lookup("SOMMELIER_VERBATIM_FUNCTIONS") {
            match verbatim.parse() {
                Ok(v) => self.sql.verbatim_function_terms = v,
                Err(_) => tracing::warn!(value = %verbatim, "Ignoring SOMMELIER_VERBATIM_FUNCTIONS, expected true or false"),
            }
        }

        // Logging overrides
        if let Some(level) = lookup("SOMMELIER_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("SOMMELIER_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Sommelier Configuration
#
# Environment variables override these settings:
# - SOMMELIER_QUOTE_CHAR
# - SOMMELIER_VERBATIM_FUNCTIONS
# - SOMMELIER_LOG_LEVEL
# - SOMMELIER_LOG_FORMAT

[sql]
# Identifier quote character, e.g. "\"". Leave unset for bare identifiers.
# quote_char = "\""

# Render aggregate tokens such as sum(price) exactly as written
verbatim_function_terms = false

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.sql.quote_char, None);
        assert!(!config.sql.verbatim_function_terms);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.sql_format(), SqlFormat::default());
    }

    #[test]
    fn test_generated_config_parses() {
        let file = write_config(&generate_default_config());
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.sql.quote_char, None);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_partial_file() {
        let file = write_config("[sql]\nquote_char = \"\\\"\"\n");
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.sql.quote_char, Some('"'));
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.sql_format().identifier("date"), "\"date\"");
    }

    #[test]
    fn test_load_errors() {
        let missing = Config::load(Path::new("/nonexistent/sommelier.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));

        let file = write_config("[sql]\nverbatim_function_terms = \"maybe\"\n");
        assert!(matches!(Config::load(file.path()), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("SOMMELIER_QUOTE_CHAR", "`"),
            ("SOMMELIER_VERBATIM_FUNCTIONS", "true"),
            ("SOMMELIER_LOG_LEVEL", "debug"),
            ("SOMMELIER_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.sql.quote_char, Some('`'));
        assert!(config.sql.verbatim_function_terms);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_invalid_overrides_are_ignored() {
        let mut config = Config::default();
        config.sql.quote_char = Some('"');
        config.apply_overrides(|key| match key {
            "SOMMELIER_QUOTE_CHAR" => Some("''".to_string()),
            "SOMMELIER_VERBATIM_FUNCTIONS" => Some("yes".to_string()),
            _ => None,
        });
        assert_eq!(config.sql.quote_char, Some('"'));
        assert!(!config.sql.verbatim_function_terms);

        config.apply_overrides(|key| (key == "SOMMELIER_QUOTE_CHAR").then(String::new));
        assert_eq!(config.sql.quote_char, None);
    }
}

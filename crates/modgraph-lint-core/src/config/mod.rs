//! Rule configuration driven by TOML.
//!
//! # Architecture
//!
//! ```text
//! TOML text
//!   ↓ serde (DTO layer)
//! config_dto types  +  preset DTOs
//!   ↓ merge, validate, convert (loader)
//! RuleSet (pure domain model)
//! ```
//!
//! Every problem is reported before any graph work begins; a run never
//! produces a partial report on a bad configuration.

use miette::Diagnostic;
use std::path::{Path, PathBuf};

pub mod config_dto;
pub mod loader;
pub mod model;
pub mod presets;

pub use loader::LoadError;
pub use model::RuleSet;
pub use presets::Preset;

/// Fatal configuration errors.
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum ConfigError {
    /// IO error reading the config file.
    #[error("failed to read config file {path}: {source}")]
    #[diagnostic(code(modgraph_lint::config::io))]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// TOML syntax or schema error.
    #[error("failed to parse config: {message}")]
    #[diagnostic(
        code(modgraph_lint::config::parse),
        help("check the TOML syntax and field names")
    )]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// A pattern, severity or cross-reference is invalid.
    #[error("invalid config: {0}")]
    #[diagnostic(
        code(modgraph_lint::config::invalid),
        help("fix the named rule or pattern; no analysis was run")
    )]
    Load(#[from] LoadError),
}

impl RuleSet {
    /// Loads a rule set from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses and validates a rule set from a TOML string.
    ///
    /// An empty string yields the `recommended` preset.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or fails validation.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let dto: config_dto::ConfigDto = toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        Ok(loader::load(dto)?)
    }

    /// The rule set used when no configuration file exists.
    ///
    /// # Errors
    ///
    /// Only fails if a built-in preset is malformed.
    pub fn recommended() -> Result<Self, ConfigError> {
        Self::parse("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recommended_loads() {
        let rules = RuleSet::recommended().unwrap();
        assert_eq!(rules.forbidden().len(), 5);
    }

    #[test]
    fn parse_error_is_reported_as_parse() {
        let err = RuleSet::parse("[[elements]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = RuleSet::from_file(Path::new("/nonexistent/modgraph-lint.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/modgraph-lint.toml"));
    }

    #[test]
    fn load_errors_carry_diagnostic_code() {
        let err = RuleSet::parse(
            r#"
[[elements]]
type = "app"
pattern = "("
"#,
        )
        .unwrap_err();
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("modgraph_lint::config::invalid"));
        assert!(err.to_string().contains("elements[0].pattern"));
    }
}

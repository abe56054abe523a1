//! Error taxonomy for the configuration service.
//!
//! # Propagation
//! - Primary-source and parse errors are fatal at startup, recovered at reload
//! - Circular references fail only the read that hit them
//! - Coercion errors fall back to a caller default when one is supplied

use std::path::PathBuf;
use thiserror::Error;

use crate::settings::validation::ValidationError;

/// Errors produced while loading, resolving or coercing properties.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The primary configuration file does not exist.
    #[error("configuration source not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    /// No candidate home directory contained the primary source.
    #[error("no valid configuration home found (tried: {})", display_paths(tried))]
    HomeNotFound { tried: Vec<PathBuf> },

    /// A `${...}` placeholder chain loops back on itself.
    #[error("circular reference while resolving '{key}': {}", chain.join(" -> "))]
    CircularReference { key: String, chain: Vec<String> },

    /// A source line could not be parsed.
    #[error("parse error in {} line {line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// A stored string could not be converted to the requested type.
    #[error("cannot read '{key}' = '{value}' as {target}")]
    TypeCoercion {
        key: String,
        value: String,
        target: &'static str,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Service settings failed validation.
    #[error("invalid settings: {}", display_errors(.0))]
    Settings(Vec<ValidationError>),

    #[error("settings file is not valid TOML: {0}")]
    SettingsFormat(#[from] toml::de::Error),
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn display_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

//! FLK-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, FlakeError>;

/// Top-level error type for the flaky-test categorizer.
#[derive(Debug, Error)]
pub enum FlakeError {
    #[error("[FLK-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[FLK-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[FLK-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error(
        "[FLK-2001] invalid line {line}: {record} (test must match format TestClass#method and status must be pass or fail)"
    )]
    MalformedRecord { line: usize, record: String },

    #[error("[FLK-2002] invalid line {line}: expected {expected} fields, found {found}: {record}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
        record: String,
    },

    #[error("[FLK-2003] unterminated quoted field starting on line {line}")]
    UnterminatedQuote { line: usize },

    #[error("[FLK-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[FLK-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FlakeError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "FLK-1001",
            Self::MissingConfig { .. } => "FLK-1002",
            Self::ConfigParse { .. } => "FLK-1003",
            Self::MalformedRecord { .. } => "FLK-2001",
            Self::FieldCount { .. } => "FLK-2002",
            Self::UnterminatedQuote { .. } => "FLK-2003",
            Self::Serialization { .. } => "FLK-2101",
            Self::Io { .. } => "FLK-3002",
        }
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<serde_json::Error> for FlakeError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for FlakeError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}

//! Error types for dataset loading and query evaluation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors while loading a dataset from disk or the network.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("{dataset} dataset does not match its expected shape ({} error(s))", errors.len())]
    InvalidShape {
        dataset: &'static str,
        errors: Vec<ShapeError>,
    },

    #[error("internal shape definition for {dataset} is invalid: {message}")]
    BadShapeDefinition {
        dataset: &'static str,
        message: String,
    },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            _ => 2,
        }
    }

    /// True when the source simply has no such file: a missing local path
    /// or an HTTP 404.
    pub fn is_missing(&self) -> bool {
        match self {
            LoadError::FileNotFound { .. } => true,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { source, .. } => {
                source.status() == Some(reqwest::StatusCode::NOT_FOUND)
            }
            _ => false,
        }
    }
}

/// Single dataset shape violation with path context.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ShapeError {
    /// JSON Pointer (RFC 6901) to the offending value.
    pub path: String,
    /// Human-readable error message.
    pub message: String,
}

impl std::fmt::Display for ShapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Errors returned by query operations.
///
/// `UnknownCode` and `NoData` are both "not found" to a caller, but they are
/// different facts: the first means the identifier maps to nothing, the
/// second means the identifier is valid and the requested relation is absent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("unknown code: {code}")]
    UnknownCode { code: String },

    #[error("no {relation} data for {key}")]
    NoData { key: String, relation: &'static str },

    #[error("missing required argument: {name}")]
    EmptyArgument { name: String },
}

impl QueryError {
    /// HTTP-equivalent status for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            QueryError::UnknownCode { .. } | QueryError::NoData { .. } => 404,
            QueryError::EmptyArgument { .. } => 400,
        }
    }

    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            QueryError::UnknownCode { .. } | QueryError::NoData { .. } => 1,
            QueryError::EmptyArgument { .. } => 2,
        }
    }

    pub(crate) fn unknown(code: &str) -> Self {
        QueryError::UnknownCode {
            code: code.to_string(),
        }
    }

    pub(crate) fn empty(name: &str) -> Self {
        QueryError::EmptyArgument {
            name: name.to_string(),
        }
    }
}

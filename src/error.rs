//! Error taxonomy shared by every stage of the discover pipeline.

use serde::Serialize;
use thiserror::Error;

/// Errors that can surface from the discover pipeline.
///
/// `Lookup` is the only recoverable kind: the search engine and the seed
/// expander log it and carry on with an empty contribution. Every other kind
/// halts the pipeline and is reported to the caller as a single failure.
#[derive(Debug, Error)]
pub enum DiscoverError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Lookup error: {0}")]
    Lookup(String),

    #[error("Oracle error: {0}")]
    Oracle(String),
}

/// Machine-readable error kind, used in the result envelope and in metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Auth,
    Validation,
    Parse,
    Lookup,
    Oracle,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Auth => "auth",
            ErrorKind::Validation => "validation",
            ErrorKind::Parse => "parse",
            ErrorKind::Lookup => "lookup",
            ErrorKind::Oracle => "oracle",
        }
    }
}

impl DiscoverError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DiscoverError::Auth(_) => ErrorKind::Auth,
            DiscoverError::Validation(_) => ErrorKind::Validation,
            DiscoverError::Parse(_) => ErrorKind::Parse,
            DiscoverError::Lookup(_) => ErrorKind::Lookup,
            DiscoverError::Oracle(_) => ErrorKind::Oracle,
        }
    }
}

impl From<serde_json::Error> for DiscoverError {
    fn from(err: serde_json::Error) -> Self {
        DiscoverError::Parse(err.to_string())
    }
}

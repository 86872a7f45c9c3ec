//! Crate-wide error type.
//!
//! Parse failures carry the offending line or file path so the message alone
//! is enough to locate bad input. Lookup failures are a separate variant so
//! callers can distinguish "malformed input" from "no such entity".

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input at any parse stage. The whole line or file parse is
    /// abandoned; the caller decides whether to skip or abort.
    #[error("{0}")]
    Parsing(String),

    /// A named entity does not exist in the catalog.
    #[error("{entity} not found: {name:?}")]
    NotFound { entity: &'static str, name: String },

    /// A query that cannot be answered (e.g. no unambiguous default project).
    #[error("{0}")]
    Query(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl Error {
    pub fn parsing(message: impl Into<String>) -> Self {
        Self::Parsing(message.into())
    }

    pub fn not_found(entity: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            name: name.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

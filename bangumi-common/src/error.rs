//! Common error types for the Bangumi graph tools

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for Bangumi graph operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the ingest and sync crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A line of a `.jsonlines` file could not be decoded into its record type
    #[error("Decode error in {} line {line}: {source}", path.display())]
    Decode {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// A code that is not a member of its closed set
    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested graph element not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Natural key already present under a uniqueness constraint
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Unknown code in one of the fixed code domains or taxonomy tables
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("unknown subject category {0}")]
    Category(u8),

    #[error("unknown person type {0}")]
    PersonType(u8),

    #[error("unknown career '{0}'")]
    Career(String),

    #[error("unknown character role {0}")]
    CharacterRole(u8),

    #[error("unknown subject-character type {0}")]
    SubjectCharacterType(u8),

    #[error("no relation table for category {0}")]
    RelationCategory(u8),

    #[error("no staff table for category {0}")]
    StaffCategory(u8),

    #[error("unknown staff position {position} for category {category}")]
    StaffPosition { category: u8, position: u32 },
}

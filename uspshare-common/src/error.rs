//! Common error types for USPShare

use thiserror::Error;

/// Common result type for USPShare operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the persistence gateway and the services above it
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested entity not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Authenticated caller may not act on the target
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Unique key already taken (e.g. signup email)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Persistence call exceeded its deadline
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Missing, malformed or expired credentials
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True when a sqlx error is a UNIQUE constraint violation
    pub fn is_unique_violation(err: &sqlx::Error) -> bool {
        match err {
            sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
            _ => false,
        }
    }
}

//! Store Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A store error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The store can't be reached at all: the pool is closed or exhausted,
    /// or the connection itself failed. Nothing else will work either.
    #[display("reference store unavailable")]
    Unavailable,
    /// A query failed.
    #[display("database error")]
    Database,
    #[display("database migration error")]
    Migration,
    /// A row (or a value headed for a row) doesn't fit the schema.
    #[display("invalid store data: {_0}")]
    InvalidData(#[error(not(source))] &'static str),
}

impl ErrorKind {
    /// Wrap a driver error, keeping it as a child in the error tree.
    #[track_caller]
    pub(crate) fn database(err: sqlx::Error) -> Error {
        let kind = match &err {
            sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut | sqlx::Error::WorkerCrashed | sqlx::Error::Io(_) => {
                Self::Unavailable
            },
            _ => Self::Database,
        };
        exn::Exn::new(err).raise(kind)
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable | Self::Database)
    }
}

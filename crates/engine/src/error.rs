//! Engine Error Types
//!
//! Only failures that stop a whole batch (or a whole merge) surface here.
//! Anything scoped to one record or one report file is logged and absorbed
//! where it happens.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// An engine error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The reference store failed.
    #[display("reference store error")]
    Store,
    /// Reading, writing or listing report files failed.
    #[display("report storage error")]
    Storage,
    #[display("could not encode report")]
    Encode,
    #[display("could not decode report: {}", _0.display())]
    Decode(#[error(not(source))] PathBuf),
    /// A classification worker panicked or was cancelled.
    #[display("classification worker failed")]
    Worker,
    /// The host identity can't be used to namespace reports.
    #[display("invalid host identity: {_0:?}")]
    InvalidHost(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store | Self::Storage)
    }
}

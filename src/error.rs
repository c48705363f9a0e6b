use derive_more::{Display, Error};
use std::path::PathBuf;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Configuration couldn't be loaded or is invalid.
    #[display("configuration error")]
    Config,
    /// The reference store couldn't be reached (or set up) at startup.
    #[display("could not connect to the reference store")]
    Connect,
    /// The report root couldn't be used.
    #[display("report storage unavailable")]
    Reports,
    /// A batch file given on the command line couldn't be read or decoded.
    #[display("unusable batch file: {}", _0.display())]
    Input(#[error(not(source))] PathBuf),
    /// Classification or aggregation failed. `retryable` says whether the
    /// same batch might go through later (the store or report storage was
    /// unavailable) or will fail the same way again.
    #[display("pipeline failed (retryable: {retryable})")]
    Pipeline { retryable: bool },
    #[display("server error")]
    Serve,
    #[display("could not write to the error log")]
    ErrorLog,
}

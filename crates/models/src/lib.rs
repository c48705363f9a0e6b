//! Canonical wire schema for syscheck.
//!
//! The scanner, the ingress dispatcher, the classification engine and the
//! report aggregator all speak these types. There is exactly one encoding for
//! each of them: `size` is always an integer, the per-file status is always
//! `fileStatus`, and empty digest strings always mean "unknown".

mod batch;
pub mod error;
mod file;
mod host;
mod report;
mod status;

pub use crate::batch::{Phase, ScanBatch};
pub use crate::file::{Algorithm, Digests, ScannedFile};
pub use crate::host::HostMetadata;
pub use crate::report::{ConsolidatedReport, Report};
pub use crate::status::{FileStatus, ReferenceStatus};

//! Classification engine and report aggregator.
//!
//! A batch goes through [`Engine::process`]: records matching the injection
//! filter are quarantined, the rest are classified against the reference
//! store by a set of workers (one per chunk), and the outcome is written as a
//! per-batch report in the host's directory. [`Aggregator::finalize`] later
//! merges every per-batch report of a host into one consolidated report.

mod aggregate;
mod classify;
mod consts;
mod engine;
pub mod error;
mod report;
mod validate;

pub use crate::aggregate::{Aggregator, Finalized};
pub use crate::classify::Classifier;
pub use crate::engine::{Engine, Processed};
pub use crate::report::{ReportStore, host_dir, is_batch_report};
pub use crate::validate::{Validated, is_suspicious, validate};

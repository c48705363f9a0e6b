//! Where reports live.
//!
//! Per-batch and consolidated reports are plain files under a configured
//! root, namespaced by host. Everything above this crate talks to a
//! [`StorageBackend`] so that the aggregator can be exercised against an
//! in-memory backend in tests.

pub mod backend;
pub mod error;
mod models;
mod path;

pub use crate::backend::StorageBackend;
pub use crate::models::FileInfo;
pub use crate::path::{validate as validate_path, validate_component};
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;

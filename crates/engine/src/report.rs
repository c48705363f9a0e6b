//! Report files: where they go, what they're called, how they're encoded.
//!
//! Layout under the storage root:
//!
//! ```text
//! <hostname>-<ipv4>/
//!     report-<unix nanos>-<sequence>.json    one per processed batch
//!     final-report-<unix nanos>.json         one per "final" signal
//! ```

use crate::consts::{CONSOLIDATED_PREFIX, REPORT_EXTENSION, REPORT_PREFIX};
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use syscheck_models::{HostMetadata, Report};
use syscheck_storage::{BackendHandle, validate_component};
use time::OffsetDateTime;

/// Directory (relative to the storage root) holding every report of `host`.
pub fn host_dir(host: &HostMetadata) -> Result<PathBuf> {
    let key = host.key();
    validate_component(&key).or_raise(|| ErrorKind::InvalidHost(key.clone()))?;
    Ok(PathBuf::from(key))
}

/// Whether `name` is a per-batch report (as opposed to a consolidated one,
/// a partially written file, or anything else that ended up there).
pub fn is_batch_report(name: &str) -> bool {
    name.starts_with(REPORT_PREFIX) && name.ends_with(REPORT_EXTENSION)
}

fn unix_nanos() -> i128 {
    OffsetDateTime::now_utc().unix_timestamp_nanos()
}

/// Reads and writes reports through a storage backend.
///
/// Clones share the backend and the sequence counter, so names handed out by
/// any clone are distinct even when two batches finish within the same
/// clock tick.
#[derive(Clone)]
pub struct ReportStore {
    backend: BackendHandle,
    sequence: Arc<AtomicU64>,
}
impl ReportStore {
    pub fn new(backend: BackendHandle) -> Self {
        Self { backend, sequence: Arc::new(AtomicU64::new(0)) }
    }

    fn batch_report_path(&self, dir: &Path) -> PathBuf {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        dir.join(format!("{REPORT_PREFIX}{}-{sequence}{REPORT_EXTENSION}", unix_nanos()))
    }

    fn consolidated_report_path(dir: &Path) -> PathBuf {
        dir.join(format!("{CONSOLIDATED_PREFIX}{}{REPORT_EXTENSION}", unix_nanos()))
    }

    /// Write a per-batch report into its host's directory.
    pub async fn write_batch_report(&self, report: &Report) -> Result<PathBuf> {
        let dir = host_dir(&report.metadata)?;
        let path = self.batch_report_path(&dir);
        self.write(path, report).await
    }

    /// Write a consolidated report into its host's directory.
    pub async fn write_consolidated_report(&self, report: &Report) -> Result<PathBuf> {
        let dir = host_dir(&report.metadata)?;
        self.write(Self::consolidated_report_path(&dir), report).await
    }

    async fn write(&self, path: PathBuf, report: &Report) -> Result<PathBuf> {
        let data = serde_json::to_vec_pretty(report).or_raise(|| ErrorKind::Encode)?;
        self.backend.write(&path, &data).await.or_raise(|| ErrorKind::Storage)?;
        tracing::debug!(backend = self.backend.name(), path = %path.display(), files = report.file_count(), "report written");
        Ok(path)
    }

    pub async fn read(&self, path: &Path) -> Result<Report> {
        let data = self.backend.read(path).await.or_raise(|| ErrorKind::Storage)?;
        serde_json::from_slice(&data).or_raise(|| ErrorKind::Decode(path.to_path_buf()))
    }

    /// Per-batch reports currently in `dir`, sorted by name.
    ///
    /// Only direct children count; a missing directory has no reports.
    pub async fn batch_reports(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let listing = self.backend.list(Some(dir)).await.or_raise(|| ErrorKind::Storage)?;
        let mut reports: Vec<PathBuf> = listing
            .into_iter()
            .filter(|info| info.parent() == Some(dir) && info.file_name().is_some_and(is_batch_report))
            .map(|info| info.path)
            .collect();
        reports.sort();
        Ok(reports)
    }

    pub async fn delete(&self, path: &Path) -> Result<()> {
        self.backend.delete(path).await.or_raise(|| ErrorKind::Storage)
    }
}

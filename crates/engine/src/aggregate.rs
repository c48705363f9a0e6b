use crate::error::Result;
use crate::report::{ReportStore, host_dir};
use std::path::PathBuf;
use syscheck_models::{HostMetadata, Report};
use tracing::instrument;

/// What a call to [`Aggregator::finalize`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finalized {
    /// The consolidated report.
    pub path: PathBuf,
    /// Per-batch reports that were merged (and then removed).
    pub merged: Vec<PathBuf>,
    /// Per-batch reports that couldn't be read; left in place.
    pub skipped: Vec<PathBuf>,
    /// Files in the consolidated report, across all three partitions.
    pub files: usize,
}

/// Merges every per-batch report of a host into one consolidated report.
#[derive(Clone)]
pub struct Aggregator {
    reports: ReportStore,
}
impl Aggregator {
    pub fn new(reports: ReportStore) -> Self {
        Self { reports }
    }

    /// Consolidate everything reported for `host` so far.
    ///
    /// Reports are merged in name order, which is the order they were
    /// written in. A report that can't be read or decoded is skipped and left
    /// where it is; the rest are removed once the consolidated report has been
    /// written. With no reports at all, an empty consolidated report is still
    /// written.
    #[instrument(skip(self), fields(host = %host))]
    pub async fn finalize(&self, host: &HostMetadata) -> Result<Finalized> {
        let dir = host_dir(host)?;
        let candidates = self.reports.batch_reports(&dir).await?;

        let mut reports = Vec::with_capacity(candidates.len());
        let mut merged = Vec::with_capacity(candidates.len());
        let mut skipped = Vec::new();
        for path in candidates {
            match self.reports.read(&path).await {
                Ok(report) => {
                    reports.push(report);
                    merged.push(path);
                },
                Err(err) => {
                    tracing::warn!(path = %path.display(), retryable = err.is_retryable(), error = ?err, "skipping unreadable report");
                    skipped.push(path);
                },
            }
        }

        let consolidated = Report::merge(host.clone(), reports);
        let path = self.reports.write_consolidated_report(&consolidated).await?;

        // Only now that the merge is safely on disk.
        for source in &merged {
            if let Err(err) = self.reports.delete(source).await {
                tracing::warn!(path = %source.display(), retryable = err.is_retryable(), error = ?err, "could not remove merged report");
            }
        }

        tracing::info!(
            path = %path.display(),
            merged = merged.len(),
            skipped = skipped.len(),
            files = consolidated.file_count(),
            "consolidated report written"
        );
        Ok(Finalized { path, merged, skipped, files: consolidated.file_count() })
    }
}

use crate::classify::Classifier;
use crate::error::{ErrorKind, Result};
use crate::report::{ReportStore, host_dir};
use crate::validate::{Validated, validate};
use exn::ResultExt;
use std::path::PathBuf;
use std::sync::Arc;
use syscheck_config::EngineConfig;
use syscheck_models::{Report, ScanBatch, ScannedFile};
use syscheck_store::Repository;
use tokio::sync::Semaphore;
use tracing::{Instrument, instrument};

/// A processed batch: the report that was written, and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Processed {
    pub path: PathBuf,
    pub report: Report,
}

/// Runs batches through validate → classify → report.
#[derive(Clone)]
pub struct Engine {
    classifier: Classifier,
    reports: ReportStore,
    chunk_size: usize,
    limiter: Option<Arc<Semaphore>>,
}
impl Engine {
    pub fn new(repo: Repository, reports: ReportStore, config: &EngineConfig) -> Self {
        Self {
            classifier: Classifier::new(repo),
            reports,
            chunk_size: config.chunk_size.max(1),
            limiter: config.max_workers.map(|workers| Arc::new(Semaphore::new(workers.max(1)))),
        }
    }

    /// Process one batch and write its report.
    ///
    /// A failure scoped to one record never fails the batch (see
    /// [`Classifier::classify`]). The batch as a whole fails, without writing
    /// a report, if its host identity is unusable, the store can't be
    /// reached, or a worker dies. It also fails if the report can't be
    /// written.
    #[instrument(skip_all, fields(host = %batch.metadata, records = batch.files.len()))]
    pub async fn process(&self, batch: ScanBatch) -> Result<Processed> {
        let ScanBatch { files, metadata, .. } = batch;
        // Before anything touches the store.
        host_dir(&metadata)?;

        let Validated { files, flagged, rejected } = validate(files);
        if !rejected.is_empty() {
            tracing::warn!(rejected = rejected.len(), values = flagged.len(), "records quarantined by injection filter");
        }

        let mut report = Report::new(metadata);
        report.flagged_variables = flagged;
        for file in self.classify(files).await? {
            if let Some(file) = report.push(file) {
                tracing::warn!(path = %file.path, status = ?file.status, "record has no report partition");
            }
        }

        let path = self.reports.write_batch_report(&report).await?;
        tracing::info!(
            path = %path.display(),
            verified = report.verified_files.len(),
            candidate = report.candidate_files.len(),
            malicious = report.malicious_files.len(),
            "batch processed"
        );
        Ok(Processed { path, report })
    }

    /// Classify `files`, one worker per chunk, and wait for all of them.
    ///
    /// The result is in input order regardless of which worker finished first.
    pub async fn classify(&self, files: Vec<ScannedFile>) -> Result<Vec<ScannedFile>> {
        let total = files.len();
        let handles: Vec<_> = into_chunks(files, self.chunk_size)
            .into_iter()
            .enumerate()
            .map(|(index, chunk)| {
                let classifier = self.classifier.clone();
                let limiter = self.limiter.clone();
                let span = tracing::debug_span!("chunk", index, records = chunk.len());
                tokio::spawn(
                    async move {
                        // Held until the chunk is done.
                        let _permit = match limiter {
                            Some(limiter) => limiter.acquire_owned().await.ok(),
                            None => None,
                        };
                        classifier.classify_all(chunk).await
                    }
                    .instrument(span),
                )
            })
            .collect();

        // Join every worker before looking at any result, so an early failure
        // never leaves the others running unobserved.
        let results = futures::future::join_all(handles).await;
        let mut classified = Vec::with_capacity(total);
        for result in results {
            classified.extend(result.or_raise(|| ErrorKind::Worker)??);
        }
        Ok(classified)
    }
}

fn into_chunks<T>(mut items: Vec<T>, size: usize) -> Vec<Vec<T>> {
    let mut chunks = Vec::with_capacity(items.len().div_ceil(size));
    while items.len() > size {
        let rest = items.split_off(size);
        chunks.push(std::mem::replace(&mut items, rest));
    }
    if !items.is_empty() {
        chunks.push(items);
    }
    chunks
}

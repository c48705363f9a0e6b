//! Per-record classification against the reference store.

use crate::error::{ErrorKind, Result};
use syscheck_models::{Digests, FileStatus, ReferenceStatus, ScannedFile};
use syscheck_store::error::{ErrorKind as StoreErrorKind, Result as StoreResult};
use syscheck_store::{NewRecord, ReferenceRecord, Repository};

/// Resolves the status of individual records. Cheap to clone; every clone
/// shares the store's connection pool and nothing else.
#[derive(Debug, Clone)]
pub struct Classifier {
    repo: Repository,
}
impl Classifier {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Classify one record.
    ///
    /// A store failure scoped to this record is logged and the record falls
    /// back to candidate. An unreachable store fails the call instead: every
    /// record after this one would fail the same way, and a report of nothing
    /// but candidates would look complete when it isn't.
    pub async fn classify(&self, file: ScannedFile) -> Result<ScannedFile> {
        let digests = file.digests();
        if digests.is_empty() {
            // Nothing to match on, and nothing a record could be found by later.
            tracing::debug!(path = %file.path, "record has no digests");
            return Ok(file.with_status(FileStatus::Candidate));
        }
        let status = match self.resolve(&file, &digests).await {
            Ok(status) => status,
            Err(err) if matches!(&*err, StoreErrorKind::Unavailable) => {
                return Err(err.raise(ErrorKind::Store));
            },
            Err(err) => {
                tracing::warn!(
                    path = %file.path,
                    retryable = err.is_retryable(),
                    error = ?err,
                    "classification failed, treating record as candidate"
                );
                ReferenceStatus::Candidate
            },
        };
        Ok(file.with_status(status.into()))
    }

    /// Classify records one after another, preserving their order. Stops at
    /// the first record that fails.
    pub async fn classify_all(&self, files: Vec<ScannedFile>) -> Result<Vec<ScannedFile>> {
        let mut classified = Vec::with_capacity(files.len());
        for file in files {
            classified.push(self.classify(file).await?);
        }
        Ok(classified)
    }

    async fn resolve(&self, file: &ScannedFile, digests: &Digests) -> StoreResult<ReferenceStatus> {
        if let Some(existing) = self.repo.find_by_digests(digests).await? {
            return self.adopt(existing, digests).await;
        }
        if self.repo.insert_if_absent(&NewRecord::candidate(file)).await? {
            tracing::debug!(path = %file.path, "new candidate record");
            return Ok(ReferenceStatus::Candidate);
        }
        // Another worker inserted a record sharing one of these digests
        // between our lookup and our insert. Theirs stands.
        match self.repo.find_by_digests(digests).await? {
            Some(winner) => self.adopt(winner, digests).await,
            // Records are never deleted, so a conflict without a match means
            // the store is not behaving.
            None => exn::bail!(StoreErrorKind::InvalidData("conflicting record not found")),
        }
    }

    /// Fill the record's empty digest slots from `incoming` and take its status.
    async fn adopt(&self, record: ReferenceRecord, incoming: &Digests) -> StoreResult<ReferenceStatus> {
        let gaps = record.digests.gaps_filled_by(incoming);
        if !gaps.is_empty() {
            let filled = self.repo.fill_missing_digests(record.id, &gaps).await?;
            tracing::debug!(record = record.id, filled, "reconciled digests");
        }
        Ok(record.status)
    }
}

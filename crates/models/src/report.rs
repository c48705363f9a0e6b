use serde::{Deserialize, Serialize};

use crate::{FileStatus, HostMetadata, ScannedFile};

/// Classification result for one batch.
///
/// Files are partitioned by their resolved status. Files that failed input
/// validation never appear in any partition; only their offending field
/// values are kept, in `flagged_variables`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub metadata: HostMetadata,
    #[serde(default)]
    pub verified_files: Vec<ScannedFile>,
    #[serde(default)]
    pub candidate_files: Vec<ScannedFile>,
    #[serde(default)]
    pub malicious_files: Vec<ScannedFile>,
    #[serde(default, alias = "maliciousVariables")]
    pub flagged_variables: Vec<String>,
}

/// Host-scoped merge of every per-batch [`Report`]. Same shape, different
/// lifecycle: written once per "final" signal and never consumed again.
pub type ConsolidatedReport = Report;

impl Report {
    pub fn new(metadata: HostMetadata) -> Self {
        Self {
            metadata,
            verified_files: Vec::new(),
            candidate_files: Vec::new(),
            malicious_files: Vec::new(),
            flagged_variables: Vec::new(),
        }
    }

    /// File a classified file under the partition matching its status. Files
    /// without a status are treated as candidates.
    ///
    /// Rejected files have no partition and are handed back; only their
    /// offending values belong in a report, in `flagged_variables`.
    pub fn push(&mut self, file: ScannedFile) -> Option<ScannedFile> {
        match file.status.unwrap_or(FileStatus::Candidate) {
            FileStatus::Verified => self.verified_files.push(file),
            FileStatus::Malicious => self.malicious_files.push(file),
            FileStatus::Candidate => self.candidate_files.push(file),
            FileStatus::Rejected => return Some(file),
        }
        None
    }

    /// Append every list of `other` onto the end of the matching list here.
    /// The metadata of `other` is ignored.
    pub fn append(&mut self, other: Report) {
        self.verified_files.extend(other.verified_files);
        self.candidate_files.extend(other.candidate_files);
        self.malicious_files.extend(other.malicious_files);
        self.flagged_variables.extend(other.flagged_variables);
    }

    /// Concatenate `reports` in iteration order under `metadata`. Duplicate
    /// files across reports are kept.
    pub fn merge(metadata: HostMetadata, reports: impl IntoIterator<Item = Report>) -> ConsolidatedReport {
        reports.into_iter().fold(Self::new(metadata), |mut merged, report| {
            merged.append(report);
            merged
        })
    }

    /// Number of classified files (flagged variables aren't files).
    pub fn file_count(&self) -> usize {
        self.verified_files.len() + self.candidate_files.len() + self.malicious_files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.file_count() == 0 && self.flagged_variables.is_empty()
    }
}

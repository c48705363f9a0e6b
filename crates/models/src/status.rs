use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use crate::error::{Error, ErrorKind};

/// Tier of a record in the reference store.
///
/// Verified and malicious are sticky: nothing in this system ever demotes
/// them. Candidate is provisional, and only an external curation process
/// promotes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceStatus {
    /// Known-good.
    Verified,
    /// Known-bad.
    Malicious,
    /// Seen for the first time on some host, not yet curated.
    Candidate,
}
impl ReferenceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verified => "verified",
            Self::Malicious => "malicious",
            Self::Candidate => "candidate",
        }
    }
}
impl Display for ReferenceStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
impl FromStr for ReferenceStatus {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "verified" => Self::Verified,
            "malicious" => Self::Malicious,
            "candidate" | "candidates" => Self::Candidate,
            _ => exn::bail!(ErrorKind::UnknownStatus(s.to_string())),
        })
    }
}

/// Resolved status of a single scanned file.
///
/// The three reference tiers, plus `Rejected` for files that never made it
/// past input validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Verified,
    Malicious,
    Candidate,
    Rejected,
}
impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verified => "verified",
            Self::Malicious => "malicious",
            Self::Candidate => "candidate",
            Self::Rejected => "rejected",
        }
    }
}
impl From<ReferenceStatus> for FileStatus {
    fn from(status: ReferenceStatus) -> Self {
        match status {
            ReferenceStatus::Verified => Self::Verified,
            ReferenceStatus::Malicious => Self::Malicious,
            ReferenceStatus::Candidate => Self::Candidate,
        }
    }
}
impl Display for FileStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

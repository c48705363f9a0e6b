use crate::error::{Error, ErrorKind};
use exn::ResultExt;
use syscheck_models::{Digests, ReferenceStatus, ScannedFile};

/// A hash tuple as stored in the reference store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceRecord {
    pub id: i64,
    pub digests: Digests,
    /// Size in bytes of the file the record was created from.
    pub size: u64,
    /// Path of the file the record was created from.
    pub path: String,
    pub status: ReferenceStatus,
}

/// A record that doesn't exist (yet).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub digests: Digests,
    pub size: u64,
    pub path: String,
    pub status: ReferenceStatus,
}
impl NewRecord {
    /// A provisional record for a file nobody has seen before.
    pub fn candidate(file: &ScannedFile) -> Self {
        Self {
            digests: file.digests(),
            size: file.size,
            path: file.path.clone(),
            status: ReferenceStatus::Candidate,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct RecordRow {
    id: i64,
    md5: Option<String>,
    sha1: Option<String>,
    sha256: Option<String>,
    sha512: Option<String>,
    file_size: i64,
    file_path: String,
    status: String,
}
impl TryFrom<RecordRow> for ReferenceRecord {
    type Error = Error;
    fn try_from(row: RecordRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            digests: Digests {
                md5: known(row.md5),
                sha1: known(row.sha1),
                sha256: known(row.sha256),
                sha512: known(row.sha512),
            },
            size: u64::try_from(row.file_size).or_raise(|| ErrorKind::InvalidData("file size"))?,
            path: row.file_path,
            status: row.status.parse::<ReferenceStatus>().or_raise(|| ErrorKind::InvalidData("status"))?,
        })
    }
}

/// Rows written by other tools may hold `''` for an unknown digest.
fn known(digest: Option<String>) -> Option<String> {
    digest.filter(|digest| !digest.trim().is_empty())
}

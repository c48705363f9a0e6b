use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::FileStatus;

/// One of the four digest algorithms the scanner computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Md5,
    Sha1,
    Sha256,
    Sha512,
}
impl Algorithm {
    pub const ALL: [Algorithm; 4] = [Self::Md5, Self::Sha1, Self::Sha256, Self::Sha512];

    /// Name as it appears on the wire (and in the scanner's output).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Md5 => "MD5",
            Self::Sha1 => "SHA1",
            Self::Sha256 => "SHA256",
            Self::Sha512 => "SHA512",
        }
    }
}
impl Display for Algorithm {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// The known digests of a file. `None` means the digest is unknown (the
/// scanner couldn't compute it, or the reference dataset never had it).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Digests {
    pub md5: Option<String>,
    pub sha1: Option<String>,
    pub sha256: Option<String>,
    pub sha512: Option<String>,
}
impl Digests {
    pub fn get(&self, algorithm: Algorithm) -> Option<&str> {
        match algorithm {
            Algorithm::Md5 => self.md5.as_deref(),
            Algorithm::Sha1 => self.sha1.as_deref(),
            Algorithm::Sha256 => self.sha256.as_deref(),
            Algorithm::Sha512 => self.sha512.as_deref(),
        }
    }

    fn slot_mut(&mut self, algorithm: Algorithm) -> &mut Option<String> {
        match algorithm {
            Algorithm::Md5 => &mut self.md5,
            Algorithm::Sha1 => &mut self.sha1,
            Algorithm::Sha256 => &mut self.sha256,
            Algorithm::Sha512 => &mut self.sha512,
        }
    }

    /// Builder-style setter; empty values are treated as unknown.
    pub fn with(mut self, algorithm: Algorithm, value: impl AsRef<str>) -> Self {
        *self.slot_mut(algorithm) = non_empty(value.as_ref());
        self
    }

    /// Known digests only, in [`Algorithm::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Algorithm, &str)> + '_ {
        Algorithm::ALL.into_iter().filter_map(|algorithm| self.get(algorithm).map(|value| (algorithm, value)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// The subset of `incoming` that would fill a slot that is empty here.
    ///
    /// Populated slots are never part of the result, whatever `incoming`
    /// says about them.
    pub fn gaps_filled_by(&self, incoming: &Digests) -> Digests {
        let mut fill = Digests::default();
        for (algorithm, value) in incoming.iter() {
            if self.get(algorithm).is_none() {
                *fill.slot_mut(algorithm) = Some(value.to_string());
            }
        }
        fill
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// A single file as reported by the host-side scanner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannedFile {
    pub name: String,
    pub path: String,
    /// Size in bytes.
    pub size: u64,
    pub owner: String,
    pub group: String,
    #[serde(rename = "perm")]
    pub permissions: String,
    pub accessed: String,
    pub created: String,
    pub modified: String,
    #[serde(rename = "MD5")]
    pub md5: String,
    #[serde(rename = "SHA1")]
    pub sha1: String,
    #[serde(rename = "SHA256")]
    pub sha256: String,
    #[serde(rename = "SHA512")]
    pub sha512: String,
    /// Set by the classification engine; the scanner leaves it out.
    #[serde(rename = "fileStatus", skip_serializing_if = "Option::is_none")]
    pub status: Option<FileStatus>,
}
impl ScannedFile {
    pub fn digests(&self) -> Digests {
        Digests {
            md5: non_empty(&self.md5),
            sha1: non_empty(&self.sha1),
            sha256: non_empty(&self.sha256),
            sha512: non_empty(&self.sha512),
        }
    }

    pub fn digest(&self, algorithm: Algorithm) -> &str {
        match algorithm {
            Algorithm::Md5 => &self.md5,
            Algorithm::Sha1 => &self.sha1,
            Algorithm::Sha256 => &self.sha256,
            Algorithm::Sha512 => &self.sha512,
        }
    }

    pub fn with_status(mut self, status: FileStatus) -> Self {
        self.status = Some(status);
        self
    }
}

//! Injection filter applied to every record before it goes anywhere near the
//! reference store.

use crate::consts::INJECTION_REGEX;
use syscheck_models::{Algorithm, FileStatus, ScannedFile};

/// Outcome of filtering a batch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Validated {
    /// Records that passed, in their original order.
    pub files: Vec<ScannedFile>,
    /// Every offending field value of every rejected record.
    pub flagged: Vec<String>,
    /// Records removed from the batch, marked [`FileStatus::Rejected`].
    pub rejected: Vec<ScannedFile>,
}

/// Split `files` into records that may be classified and the offending
/// values of those that may not.
///
/// A record is rejected as a whole if any of its four digests, its path or
/// its size (as text) contains the injection pattern. Survivors are moved into
/// a fresh vector; the input is never edited while it is being scanned.
pub fn validate(files: Vec<ScannedFile>) -> Validated {
    let mut validated = Validated { files: Vec::with_capacity(files.len()), ..Default::default() };
    for file in files {
        let offending = offending_values(&file);
        if offending.is_empty() {
            validated.files.push(file);
        } else {
            tracing::debug!(path = %file.path, fields = offending.len(), "record rejected by injection filter");
            validated.flagged.extend(offending);
            validated.rejected.push(file.with_status(FileStatus::Rejected));
        }
    }
    validated
}

fn offending_values(file: &ScannedFile) -> Vec<String> {
    let size = file.size.to_string();
    Algorithm::ALL
        .iter()
        .map(|algorithm| file.digest(*algorithm))
        .chain([file.path.as_str(), size.as_str()])
        .filter(|value| is_suspicious(value))
        .map(str::to_string)
        .collect()
}

pub fn is_suspicious(value: &str) -> bool {
    INJECTION_REGEX.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn file(path: &str) -> ScannedFile {
        ScannedFile {
            path: path.to_string(),
            size: 1024,
            sha256: "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824".to_string(),
            ..Default::default()
        }
    }

    #[rstest]
    #[case("/usr/bin/python3", false)]
    #[case("/home/alice/.config/app.toml", false)]
    #[case("with space/and-hyphen", false)]
    #[case("5d41402abc4b2a76b9719d911017c592", false)]
    #[case("'; DROP TABLE reference_files; --", true)]
    #[case("x' OR 1=1--", true)]
    #[case("a);--", true)]
    #[case("../../etc/passwd", true)]
    #[case("/*comment*/", true)]
    #[case("\"\"", true)]
    #[case("ünïcödé/pfad", false)]
    fn test_is_suspicious(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(is_suspicious(value), expected, "{value:?}");
    }

    #[test]
    fn test_survivors_keep_their_order() {
        let validated = validate(vec![file("/a"), file("x';--"), file("/b"), file("/c")]);
        let paths: Vec<_> = validated.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, ["/a", "/b", "/c"]);
        assert_eq!(validated.rejected.len(), 1);
        assert_eq!(validated.rejected[0].path, "x';--");
        assert_eq!(validated.rejected[0].status, Some(FileStatus::Rejected));
        assert_eq!(validated.flagged, ["x';--"]);
    }

    #[test]
    fn test_adjacent_rejections_are_all_removed() {
        // Removing while iterating would skip the second of two neighbours.
        let validated = validate(vec![file("a';"), file("b';"), file("/ok")]);
        assert_eq!(validated.files.len(), 1);
        assert!(validated.rejected.iter().all(|f| f.status == Some(FileStatus::Rejected)));
        assert_eq!(validated.rejected.len(), 2);
        assert_eq!(validated.flagged, ["a';", "b';"]);
    }

    #[test]
    fn test_every_offending_field_is_recorded() {
        let mut bad = file("/tmp/x';");
        bad.md5 = "abc\";".to_string();
        bad.sha512 = "--;".to_string();
        let validated = validate(vec![bad]);
        assert!(validated.files.is_empty());
        assert_eq!(validated.flagged, ["abc\";", "--;", "/tmp/x';"]);
    }

    #[test]
    fn test_empty_batch() {
        assert_eq!(validate(Vec::new()), Validated::default());
    }
}

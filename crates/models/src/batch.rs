use serde::{Deserialize, Serialize};

use crate::{HostMetadata, ScannedFile};

/// Where a batch is in the scan lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// More files to classify.
    Processing,
    /// The scanner is done with this host; merge everything it sent.
    Final,
}

/// A group of scanned files submitted together by one host.
///
/// A batch is consumed exactly once by the pipeline and never persisted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanBatch {
    #[serde(default)]
    pub files: Vec<ScannedFile>,
    pub metadata: HostMetadata,
    #[serde(rename = "status", alias = "phase")]
    pub phase: Phase,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_decode_processing_batch() {
        let json = r#"{
            "files": [{"path": "/etc/hosts", "size": 220, "SHA256": "abc"}],
            "metadata": {"hostname": "db-02", "ipv4": "10.1.2.3"},
            "status": "processing"
        }"#;
        let batch: ScanBatch = serde_json::from_str(json).unwrap();
        assert_eq!(batch.phase, Phase::Processing);
        assert_eq!(batch.files.len(), 1);
        assert_eq!(batch.metadata, HostMetadata::new("db-02", Ipv4Addr::new(10, 1, 2, 3)));
    }

    #[test]
    fn test_decode_final_batch_without_files() {
        let json = r#"{"metadata": {"ip_address": "10.1.2.3"}, "phase": "final"}"#;
        let batch: ScanBatch = serde_json::from_str(json).unwrap();
        assert_eq!(batch.phase, Phase::Final);
        assert!(batch.files.is_empty());
    }

    #[test]
    fn test_unknown_phase_is_rejected() {
        let json = r#"{"metadata": {"ipv4": "10.1.2.3"}, "status": "paused"}"#;
        assert!(serde_json::from_str::<ScanBatch>(json).is_err());
    }

    #[test]
    fn test_size_must_be_an_integer() {
        let json = r#"{"files": [{"size": "220"}], "metadata": {"ipv4": "10.1.2.3"}, "status": "processing"}"#;
        assert!(serde_json::from_str::<ScanBatch>(json).is_err());
    }
}

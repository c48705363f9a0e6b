use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Append-only log of failed requests, one line per failure:
/// `<RFC 3339 UTC timestamp> <detail>`.
#[derive(Clone)]
pub struct ErrorLog {
    path: Arc<PathBuf>,
    // Lines from concurrent requests must not interleave.
    lock: Arc<Mutex<()>>,
}
impl ErrorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: Arc::new(path.into()), lock: Arc::new(Mutex::new(())) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, detail: &str) -> Result<()> {
        let timestamp = OffsetDateTime::now_utc().format(&Rfc3339).or_raise(|| ErrorKind::ErrorLog)?;
        // One failure, one line.
        let line = format!("{timestamp} {}\n", detail.replace(['\r', '\n'], " "));

        let _guard = self.lock.lock().await;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.or_raise(|| ErrorKind::ErrorLog)?;
        }
        let mut file =
            OpenOptions::new().create(true).append(true).open(self.path.as_path()).await.or_raise(|| ErrorKind::ErrorLog)?;
        file.write_all(line.as_bytes()).await.or_raise(|| ErrorKind::ErrorLog)?;
        file.flush().await.or_raise(|| ErrorKind::ErrorLog)
    }
}

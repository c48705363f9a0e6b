//! The one seam between the entry points (HTTP, CLI) and the pipeline.

use crate::error::{Error, ErrorKind, Result};
use async_trait::async_trait;
use exn::ResultExt;
use std::sync::Arc;
use syscheck_config::{Config, EngineConfig};
use syscheck_engine::{Aggregator, Engine, ReportStore};
use syscheck_models::{HostMetadata, Phase, ScanBatch};
use syscheck_storage::BackendHandle;
use syscheck_storage::backend::LocalBackend;
use syscheck_store::{Database, Repository};

#[async_trait]
pub trait Pipeline: Send + Sync + 'static {
    /// Classify a "processing" batch and write its report.
    async fn analyze(&self, batch: ScanBatch) -> Result<()>;

    /// Consolidate every report written for `host` so far.
    async fn finalize(&self, host: HostMetadata) -> Result<()>;
}

/// Route a batch by its phase. Exactly one pipeline call per batch.
pub async fn dispatch(pipeline: &dyn Pipeline, batch: ScanBatch) -> Result<()> {
    match batch.phase {
        Phase::Processing => pipeline.analyze(batch).await,
        Phase::Final => pipeline.finalize(batch.metadata).await,
    }
}

/// The production pipeline: engine and aggregator over a shared store and
/// report root.
#[derive(Clone)]
pub struct Services {
    db: Database,
    engine: Engine,
    aggregator: Aggregator,
}
impl Services {
    pub fn new(db: Database, reports: ReportStore, config: &EngineConfig) -> Self {
        Self {
            engine: Engine::new(Repository::from(&db), reports.clone(), config),
            aggregator: Aggregator::new(reports),
            db,
        }
    }

    /// Open the reference store and the report root described by `config`.
    pub async fn connect(config: &Config) -> Result<Self> {
        if let Some(parent) = config.database.path.parent() {
            tokio::fs::create_dir_all(parent).await.or_raise(|| ErrorKind::Connect)?;
        }
        let db = Database::connect(&config.database.path, Some(config.database.max_connections))
            .await
            .or_raise(|| ErrorKind::Connect)?;
        let backend: BackendHandle =
            Arc::new(LocalBackend::new("reports", &config.reports.root).or_raise(|| ErrorKind::Reports)?);
        tracing::info!(
            database = %config.database.path.display(),
            reports = %config.reports.root.display(),
            "pipeline ready"
        );
        Ok(Self::new(db, ReportStore::new(backend), &config.engine))
    }

    pub async fn close(&self) {
        self.db.close().await;
    }
}

#[async_trait]
impl Pipeline for Services {
    async fn analyze(&self, batch: ScanBatch) -> Result<()> {
        self.engine.process(batch).await.map_err(pipeline_error)?;
        Ok(())
    }

    async fn finalize(&self, host: HostMetadata) -> Result<()> {
        self.aggregator.finalize(&host).await.map_err(pipeline_error)?;
        Ok(())
    }
}

fn pipeline_error(err: syscheck_engine::error::Error) -> Error {
    let retryable = err.is_retryable();
    err.raise(ErrorKind::Pipeline { retryable })
}

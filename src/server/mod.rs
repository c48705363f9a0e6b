//! HTTP ingress: one POST endpoint taking a [`ScanBatch`] as JSON.
//!
//! The response is a bare status code. Failure details go to the error log,
//! never to the caller.

mod error_log;

pub use self::error_log::ErrorLog;

use crate::error::{ErrorKind, Result};
use crate::pipeline::{Pipeline, dispatch};
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use exn::ResultExt;
use std::sync::Arc;
use syscheck_config::ServerConfig;
use syscheck_models::ScanBatch;
use tokio::net::TcpListener;

#[derive(Clone)]
struct AppState {
    pipeline: Arc<dyn Pipeline>,
    error_log: ErrorLog,
}
impl AppState {
    async fn fail(&self, detail: String) -> StatusCode {
        tracing::error!(%detail, "request failed");
        if let Err(err) = self.error_log.append(&detail).await {
            tracing::error!(path = %self.error_log.path().display(), error = ?err, "could not record failure");
        }
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Any method other than POST gets a 405 from the router itself.
pub fn router(pipeline: Arc<dyn Pipeline>, error_log: ErrorLog) -> Router {
    Router::new().route("/", post(ingest)).with_state(AppState { pipeline, error_log })
}

async fn ingest(State(state): State<AppState>, body: Bytes) -> StatusCode {
    let batch: ScanBatch = match serde_json::from_slice(&body) {
        Ok(batch) => batch,
        Err(err) => return state.fail(format!("could not decode batch: {err}")).await,
    };
    let host = batch.metadata.key();
    tracing::debug!(%host, phase = ?batch.phase, files = batch.files.len(), "batch received");

    // A panic inside the pipeline surfaces as a JoinError instead of taking
    // the server down.
    let pipeline = state.pipeline.clone();
    let outcome = tokio::spawn(async move { dispatch(pipeline.as_ref(), batch).await }).await;
    match outcome {
        Ok(Ok(())) => StatusCode::OK,
        Ok(Err(err)) => state.fail(format!("{host}: {err:?}")).await,
        Err(err) if err.is_panic() => state.fail(format!("{host}: pipeline panicked")).await,
        Err(err) => state.fail(format!("{host}: {err}")).await,
    }
}

/// Serve until Ctrl-C, then let in-flight requests finish.
pub async fn serve(config: &ServerConfig, pipeline: Arc<dyn Pipeline>) -> Result<()> {
    let listener = TcpListener::bind(config.address).await.or_raise(|| ErrorKind::Serve)?;
    tracing::info!(address = %config.address, error_log = %config.error_log.display(), "listening");
    axum::serve(listener, router(pipeline, ErrorLog::new(&config.error_log)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .or_raise(|| ErrorKind::Serve)?;
    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "could not listen for Ctrl-C; only an external kill will stop the server");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Services;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use std::net::Ipv4Addr;
    use std::sync::Mutex;
    use syscheck_config::EngineConfig;
    use syscheck_engine::ReportStore;
    use syscheck_models::HostMetadata;
    use syscheck_storage::backend::{MockBackend, StorageBackend};
    use syscheck_store::Database;
    use tower::ServiceExt;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Analyze(usize),
        Finalize(HostMetadata),
    }

    #[derive(Default)]
    enum Behaviour {
        #[default]
        Succeed,
        Fail,
        Panic,
    }

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<Call>>,
        behaviour: Behaviour,
    }
    impl Recorder {
        fn new(behaviour: Behaviour) -> Arc<Self> {
            Arc::new(Self { behaviour, ..Default::default() })
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: Call) -> Result<()> {
            self.calls.lock().unwrap().push(call);
            match self.behaviour {
                Behaviour::Succeed => Ok(()),
                Behaviour::Fail => exn::bail!(ErrorKind::Pipeline { retryable: false }),
                Behaviour::Panic => panic!("worker blew up"),
            }
        }
    }

    #[async_trait]
    impl Pipeline for Recorder {
        async fn analyze(&self, batch: ScanBatch) -> Result<()> {
            self.record(Call::Analyze(batch.files.len()))
        }

        async fn finalize(&self, host: HostMetadata) -> Result<()> {
            self.record(Call::Finalize(host))
        }
    }

    const PROCESSING: &str = r#"{
        "files": [{"path": "/etc/hosts", "size": 220, "SHA1": "356a192b7913b04c54574d18c28d46e6395428ab"}],
        "metadata": {"hostname": "web-01", "ipv4": "10.0.0.5"},
        "status": "processing"
    }"#;
    const FINAL: &str = r#"{"metadata": {"hostname": "web-01", "ipv4": "10.0.0.5"}, "status": "final"}"#;

    fn request(method: Method, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn error_log_lines(log: &ErrorLog) -> Vec<String> {
        match std::fs::read_to_string(log.path()) {
            Ok(contents) => contents.lines().map(str::to_string).collect(),
            Err(_) => Vec::new(),
        }
    }

    async fn send(pipeline: Arc<dyn Pipeline>, log: &ErrorLog, method: Method, body: &str) -> (StatusCode, Bytes) {
        let response = router(pipeline, log.clone()).oneshot(request(method, body)).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn test_wrong_method_is_405_without_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        let log = ErrorLog::new(dir.path().join("error.log"));
        let recorder = Recorder::new(Behaviour::Succeed);
        let (status, _) = send(recorder.clone(), &log, Method::GET, "").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert!(recorder.calls().is_empty());
    }

    #[tokio::test]
    async fn test_undecodable_body_is_500_and_logged() {
        let dir = tempfile::tempdir().unwrap();
        let log = ErrorLog::new(dir.path().join("error.log"));
        let recorder = Recorder::new(Behaviour::Succeed);
        let (status, body) = send(recorder.clone(), &log, Method::POST, r#"{"files": "#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.is_empty());
        assert!(recorder.calls().is_empty());
        let lines = error_log_lines(&log);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("could not decode batch"), "{}", lines[0]);
    }

    #[tokio::test]
    async fn test_processing_batch_is_analyzed_once() {
        let dir = tempfile::tempdir().unwrap();
        let log = ErrorLog::new(dir.path().join("error.log"));
        let recorder = Recorder::new(Behaviour::Succeed);
        let (status, body) = send(recorder.clone(), &log, Method::POST, PROCESSING).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
        assert_eq!(recorder.calls(), [Call::Analyze(1)]);
        assert!(error_log_lines(&log).is_empty());
    }

    #[tokio::test]
    async fn test_final_batch_is_finalized_once() {
        let dir = tempfile::tempdir().unwrap();
        let log = ErrorLog::new(dir.path().join("error.log"));
        let recorder = Recorder::new(Behaviour::Succeed);
        let (status, _) = send(recorder.clone(), &log, Method::POST, FINAL).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(recorder.calls(), [Call::Finalize(HostMetadata::new("web-01", Ipv4Addr::new(10, 0, 0, 5)))]);
    }

    #[tokio::test]
    async fn test_pipeline_failure_is_500_with_empty_body() {
        let dir = tempfile::tempdir().unwrap();
        let log = ErrorLog::new(dir.path().join("error.log"));
        let recorder = Recorder::new(Behaviour::Fail);
        let (status, body) = send(recorder.clone(), &log, Method::POST, PROCESSING).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.is_empty());
        assert_eq!(recorder.calls().len(), 1);
        let lines = error_log_lines(&log);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("web-01-10.0.0.5"), "{}", lines[0]);
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let dir = tempfile::tempdir().unwrap();
        let log = ErrorLog::new(dir.path().join("error.log"));
        let recorder = Recorder::new(Behaviour::Panic);
        let app = router(recorder.clone(), log.clone());

        let response = app.clone().oneshot(request(Method::POST, PROCESSING)).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(error_log_lines(&log)[0].contains("panicked"));

        // The router is still usable afterwards.
        let response = app.oneshot(request(Method::GET, "")).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_processing_then_final_with_real_services() {
        let dir = tempfile::tempdir().unwrap();
        let log = ErrorLog::new(dir.path().join("error.log"));
        let db = Database::connect_in_memory().await.unwrap();
        let backend = Arc::new(MockBackend::default());
        let services = Arc::new(Services::new(db, ReportStore::new(backend.clone()), &EngineConfig::default()));

        let (status, _) = send(services.clone(), &log, Method::POST, PROCESSING).await;
        assert_eq!(status, StatusCode::OK);
        let written = backend.paths().await;
        assert_eq!(written.len(), 1);
        assert!(written[0].file_name().unwrap().to_string_lossy().starts_with("report-"));

        let (status, _) = send(services.clone(), &log, Method::POST, FINAL).await;
        assert_eq!(status, StatusCode::OK);
        let remaining = backend.paths().await;
        assert_eq!(remaining.len(), 1);
        assert!(remaining[0].starts_with("web-01-10.0.0.5"));
        assert!(remaining[0].file_name().unwrap().to_string_lossy().starts_with("final-report-"));
        let data = backend.read(&remaining[0]).await.unwrap();
        let consolidated: syscheck_models::Report = serde_json::from_slice(&data).unwrap();
        assert_eq!(consolidated.candidate_files.len(), 1);
        assert!(error_log_lines(&log).is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_store_is_500_without_a_report() {
        let dir = tempfile::tempdir().unwrap();
        let log = ErrorLog::new(dir.path().join("error.log"));
        let db = Database::connect_in_memory().await.unwrap();
        let backend = Arc::new(MockBackend::default());
        let services = Arc::new(Services::new(db.clone(), ReportStore::new(backend.clone()), &EngineConfig::default()));
        db.close().await;

        let (status, body) = send(services, &log, Method::POST, PROCESSING).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.is_empty());
        assert!(backend.paths().await.is_empty());
        let lines = error_log_lines(&log);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("web-01-10.0.0.5"), "{}", lines[0]);
        assert!(lines[0].contains("retryable: true"), "{}", lines[0]);
    }
}

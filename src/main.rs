mod cli;
mod error;
mod logging;
mod pipeline;
mod server;

use crate::cli::{Cli, Command};
use crate::error::{ErrorKind, Result};
use crate::pipeline::{Pipeline, Services, dispatch};
use clap::Parser;
use exn::ResultExt;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use syscheck_config::Config;
use syscheck_models::{HostMetadata, ScanBatch};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = ?err, "{err}");
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    let services = Services::connect(&config).await?;
    let outcome = match cli.command {
        Command::Serve => server::serve(&config.server, Arc::new(services.clone())).await,
        Command::Analyze { batch } => analyze(&services, &batch).await,
        Command::Finalize { hostname, ipv4 } => services.finalize(HostMetadata::new(hostname, ipv4)).await,
    };
    services.close().await;
    outcome
}

/// A batch file is handled exactly as if it had been posted, so a "final"
/// batch file finalizes.
async fn analyze(services: &Services, path: &Path) -> Result<()> {
    let data = tokio::fs::read(path).await.or_raise(|| ErrorKind::Input(path.to_path_buf()))?;
    let batch: ScanBatch = serde_json::from_slice(&data).or_raise(|| ErrorKind::Input(path.to_path_buf()))?;
    dispatch(services, batch).await
}

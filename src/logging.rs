use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_FILTER: &str = "syscheck=info,syscheck_engine=info,syscheck_store=info";
const VERBOSE_FILTER: &str = "syscheck=debug,syscheck_engine=debug,syscheck_store=debug,syscheck_storage=debug";

/// Log to stderr. `RUST_LOG` wins over both defaults.
pub fn init(verbose: bool) {
    let default = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_filter(filter))
        .init();
}

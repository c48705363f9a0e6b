use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::{Path, PathBuf};

/// Every setting the binary needs, built once at startup and handed to each
/// component's constructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub reports: ReportsConfig,
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the ingress endpoint listens on.
    pub address: SocketAddr,
    /// Append-only log of request failures.
    pub error_log: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file holding the reference store. Created if missing.
    pub path: PathBuf,
    pub max_connections: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportsConfig {
    /// Absolute directory under which each host gets its own report directory.
    pub root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Records per worker.
    pub chunk_size: usize,
    /// Upper bound on concurrently running workers; one per chunk when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_workers: Option<usize>,
}
impl EngineConfig {
    pub const DEFAULT_CHUNK_SIZE: usize = 1000;
}
impl Default for EngineConfig {
    fn default() -> Self {
        Self { chunk_size: Self::DEFAULT_CHUNK_SIZE, max_workers: None }
    }
}

impl Config {
    /// Defaults with every path placed under `data_dir`.
    pub fn rooted_at(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        Self {
            server: ServerConfig {
                address: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 8080)),
                error_log: data_dir.join("error.log"),
            },
            database: DatabaseConfig { path: data_dir.join("reference.db"), max_connections: 5 },
            reports: ReportsConfig { root: data_dir.join("reports") },
            engine: EngineConfig::default(),
        }
    }
}
impl Default for Config {
    fn default() -> Self {
        Self::rooted_at(crate::data_dir())
    }
}

//! Layered configuration for syscheck.
//!
//! Layers, lowest priority first:
//! 1. built-in defaults (paths under the platform data directory),
//! 2. a TOML, YAML or JSON file,
//! 3. `SYSCHECK_`-prefixed environment variables, with `__` separating
//!    nested keys (`SYSCHECK_ENGINE__CHUNK_SIZE=500`).
//!
//! Nothing else in the workspace reads the environment for settings; the
//! binary loads a [`Config`] once and passes the pieces down.

pub mod error;
mod model;

pub use crate::model::{Config, DatabaseConfig, EngineConfig, ReportsConfig, ServerConfig};
use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "SYSCHECK_";
const APPLICATION: &str = "syscheck";
const CONFIG_FILE_NAME: &str = "syscheck.toml";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", APPLICATION)
}

/// Platform data directory, or a directory under the system temp dir when
/// there is no home directory to derive one from.
pub fn data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join(APPLICATION))
}

/// Where the configuration file is looked for when none is given explicitly.
pub fn default_config_file() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

impl Config {
    /// Load and validate the configuration.
    ///
    /// An explicitly given `file` must exist. Without one, the default
    /// configuration file is used if present.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let file = match file {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => default_config_file().filter(|path| path.is_file()),
        };
        let figment = Self::figment(file.as_deref())?;
        let config = Self::from_figment(&figment)?;
        tracing::debug!(file = ?file, "configuration loaded");
        Ok(config)
    }

    /// The merged layers, before extraction.
    pub fn figment(file: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = file {
            figment = match path.extension().and_then(|ext| ext.to_str()) {
                Some("toml") => figment.merge(Toml::file(path)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
                Some("json") => figment.merge(Json::file(path)),
                _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    pub fn from_figment(figment: &Figment) -> Result<Self> {
        let config: Self = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.engine.chunk_size == 0 {
            exn::bail!(ErrorKind::Invalid("engine.chunk_size must be at least 1".to_string()));
        }
        if self.engine.max_workers == Some(0) {
            exn::bail!(ErrorKind::Invalid("engine.max_workers must be at least 1 when set".to_string()));
        }
        if self.database.max_connections == 0 {
            exn::bail!(ErrorKind::Invalid("database.max_connections must be at least 1".to_string()));
        }
        if !self.reports.root.is_absolute() {
            exn::bail!(ErrorKind::Invalid(format!(
                "reports.root must be absolute, got {}",
                self.reports.root.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;
    use std::net::SocketAddr;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.engine.chunk_size, 1000);
        assert_eq!(config.engine.max_workers, None);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.server.address, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn test_rooted_at() {
        let config = Config::rooted_at("/srv/syscheck");
        assert_eq!(config.database.path, Path::new("/srv/syscheck/reference.db"));
        assert_eq!(config.reports.root, Path::new("/srv/syscheck/reports"));
        assert_eq!(config.server.error_log, Path::new("/srv/syscheck/error.log"));
    }

    #[test]
    fn test_file_then_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "syscheck.toml",
                r#"
                    [server]
                    address = "0.0.0.0:9000"

                    [engine]
                    chunk_size = 250
                    max_workers = 4
                "#,
            )?;
            jail.set_env("SYSCHECK_ENGINE__CHUNK_SIZE", "50");
            jail.set_env("SYSCHECK_REPORTS__ROOT", "/var/lib/syscheck/reports");
            let config = Config::load(Some(Path::new("syscheck.toml"))).unwrap();
            assert_eq!(config.server.address, "0.0.0.0:9000".parse::<SocketAddr>().unwrap());
            assert_eq!(config.engine.chunk_size, 50, "environment wins over the file");
            assert_eq!(config.engine.max_workers, Some(4));
            assert_eq!(config.reports.root, Path::new("/var/lib/syscheck/reports"));
            Ok(())
        });
    }

    #[test]
    fn test_yaml_file() {
        Jail::expect_with(|jail| {
            jail.create_file("syscheck.yaml", "database:\n  max_connections: 2\n")?;
            let config = Config::load(Some(Path::new("syscheck.yaml"))).unwrap();
            assert_eq!(config.database.max_connections, 2);
            Ok(())
        });
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[test]
    fn test_unsupported_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("syscheck.ini");
        std::fs::write(&path, "chunk_size=1").unwrap();
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(&*err, ErrorKind::UnsupportedFormat(_)));
    }

    #[test]
    fn test_malformed_file() {
        Jail::expect_with(|jail| {
            jail.create_file("syscheck.toml", "[engine]\nchunk_size = \"lots\"\n")?;
            let err = Config::load(Some(Path::new("syscheck.toml"))).unwrap_err();
            assert!(matches!(&*err, ErrorKind::Load));
            Ok(())
        });
    }

    #[rstest]
    #[case::zero_chunk(|c: &mut Config| c.engine.chunk_size = 0)]
    #[case::zero_workers(|c: &mut Config| c.engine.max_workers = Some(0))]
    #[case::zero_connections(|c: &mut Config| c.database.max_connections = 0)]
    #[case::relative_root(|c: &mut Config| c.reports.root = PathBuf::from("reports"))]
    fn test_validate_rejects(#[case] tweak: fn(&mut Config)) {
        let mut config = Config::rooted_at("/srv/syscheck");
        tweak(&mut config);
        let err = config.validate().unwrap_err();
        assert!(matches!(&*err, ErrorKind::Invalid(_)));
    }
}

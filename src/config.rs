//! Viewer configuration, persisted as TOML.
//!
//! Resolution order: built-in defaults, then the config file (explicit path or
//! `$XDG_CONFIG_HOME/isgci-why/config.toml` if present), then `WHY_*`
//! environment variables. Command-line flags are applied last by the binaries.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::explain::DEFAULT_MAX_DEPTH;
use crate::paths::WhyPaths;

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Runtime configuration shared by the CLI and the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhyConfig {
    /// Trace database. Defaults to `$XDG_DATA_HOME/isgci-why/trace.redb`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
    /// Deducer log shown on the index page.
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,
    /// Server bind address.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Server port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Deepest proof level that is expanded.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Per-request deadline for the server.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_log_path() -> PathBuf {
    PathBuf::from("log.txt")
}
fn default_bind() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    8300
}
fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}
fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for WhyConfig {
    fn default() -> Self {
        Self {
            store_path: None,
            log_path: default_log_path(),
            bind: default_bind(),
            port: default_port(),
            max_depth: default_max_depth(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl WhyConfig {
    /// Load the effective configuration.
    ///
    /// `explicit` must exist when given; the default file is optional. Without
    /// `paths` (no home directory) the store path stays unset unless the file or
    /// environment provides one.
    pub fn load(explicit: Option<&Path>, paths: Option<&WhyPaths>) -> ConfigResult<Self> {
        let mut config = match (explicit, paths) {
            (Some(path), _) => Self::load_from(path)?,
            (None, Some(paths)) if paths.config_file().is_file() => {
                Self::load_from(&paths.config_file())?
            }
            _ => Self::default(),
        };
        config.apply_env_overrides()?;
        if config.store_path.is_none() {
            config.store_path = paths.map(WhyPaths::default_store);
        }
        Ok(config)
    }

    /// Read and parse a TOML config file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml(&content, &path.display().to_string())?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parse TOML text. `origin` names the source in error messages.
    pub fn from_toml(content: &str, origin: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }

    /// Serialize the effective configuration.
    pub fn to_toml(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize {
            message: e.to_string(),
        })
    }

    /// Apply `WHY_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> ConfigResult<()> {
        self.apply_overrides_with(|key| std::env::var(key).ok())
    }

    /// Apply `WHY_*` overrides from an arbitrary variable lookup.
    pub fn apply_overrides_with(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ConfigResult<()> {
        if let Some(v) = lookup("WHY_STORE") {
            self.store_path = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("WHY_LOG") {
            self.log_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("WHY_SERVER_BIND") {
            self.bind = v;
        }
        if let Some(v) = lookup("WHY_SERVER_PORT") {
            self.port = parse_override("WHY_SERVER_PORT", &v)?;
        }
        if let Some(v) = lookup("WHY_MAX_DEPTH") {
            self.max_depth = parse_override("WHY_MAX_DEPTH", &v)?;
        }
        Ok(())
    }

    /// The configured trace database path.
    pub fn store_path(&self) -> ConfigResult<&Path> {
        self.store_path.as_deref().ok_or(ConfigError::NoHome)
    }

    /// `bind:port` for the server listener.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_override<T: std::str::FromStr>(key: &str, value: &str) -> ConfigResult<T> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

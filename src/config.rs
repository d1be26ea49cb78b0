use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Top-level configuration, read from `config.toml`.
///
/// Every field has a default, so an empty file (or no file at all) gives a
/// working setup pointed at a Blazegraph on the Docker bridge address.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub blazegraph: BlazegraphConfig,
    pub ingest: IngestConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest accepted request body, uploads included
    pub max_upload_bytes: usize,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
            max_upload_bytes: 50 * 1024 * 1024,
            request_timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlazegraphConfig {
    /// Base URL of the Blazegraph server, without the `/blazegraph` path
    pub url: String,
    pub request_timeout_secs: u64,
    /// Bound on the namespace listing used by `GET /active-database`
    pub list_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for BlazegraphConfig {
    fn default() -> Self {
        Self {
            url: "http://172.17.0.1:9999".into(),
            request_timeout_secs: 30,
            list_timeout_secs: 10,
            connect_timeout_secs: 10,
        }
    }
}

impl BlazegraphConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn list_timeout(&self) -> Duration {
        Duration::from_secs(self.list_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IngestConfig {
    /// Endpoint that receives uploaded Turtle files
    pub url: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8000/api/".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// SQLite file holding upload metadata; `~` is expanded
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: "~/.blazegate/files.db".into(),
        }
    }
}

impl StorageConfig {
    pub fn resolved_database_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.database_path).to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Filter directive, overridden by `RUST_LOG`
    pub level: String,
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            ansi: true,
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from the per-user config file when
    /// none is given. Falls back to defaults if neither exists.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => default_config_path().filter(|p| p.exists()),
        };

        let config = match path {
            Some(p) => {
                let raw = std::fs::read_to_string(&p)
                    .with_context(|| format!("Failed to read config file {}", p.display()))?;
                Self::from_toml(&raw)
                    .with_context(|| format!("Invalid config file {}", p.display()))?
            }
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("Failed to parse TOML")
    }

    pub fn validate(&self) -> Result<()> {
        validate_http_url("blazegraph.url", &self.blazegraph.url)?;
        validate_http_url("ingest.url", &self.ingest.url)?;
        if self.server.max_upload_bytes == 0 {
            bail!("server.max_upload_bytes must be greater than zero");
        }
        Ok(())
    }
}

fn validate_http_url(field: &str, raw: &str) -> Result<()> {
    let url = Url::parse(raw).with_context(|| format!("{field} is not a valid URL: {raw}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("{field} must use http or https, got {}", url.scheme());
    }
    Ok(())
}

/// `<config dir>/blazegate/config.toml` for the current user.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "blazegate").map(|dirs| dirs.config_dir().join("config.toml"))
}

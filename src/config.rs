//! Configuration loading and management.
//!
//! Settings resolve from built-in defaults, then a YAML file, then
//! environment variables. CLI flags are applied on top by the binary.
//!
//! ## Environment Variables
//! The binary loads a `.env` file first; variables already set win.
//! - `DATABASE_URL` - `sqlite:///path/to/tasks.db` or a bare path
//! - `TASK_TRACKER_DB_PATH` - Database path (wins over `DATABASE_URL`)
//! - `TASK_TRACKER_HOST` - Listen address
//! - `TASK_TRACKER_PORT` - Listen port

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Project-local config file name.
pub const LOCAL_CONFIG_FILE: &str = "task-tracker.yaml";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
}

/// Server-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Address to listen on.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            db_path: default_db_path(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_port() -> u16 {
    5000
}

fn default_db_path() -> PathBuf {
    PathBuf::from("tasks.db")
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Strip a `sqlite://` scheme from a database URL, leaving the file path.
///
/// `sqlite:///tasks.db` names `tasks.db` relative to the working directory,
/// `sqlite:////var/lib/tasks.db` is absolute. URLs with any other scheme
/// (e.g. `postgresql://`) return `None`.
pub fn db_path_from_url(url: &str) -> Option<PathBuf> {
    let path = url
        .strip_prefix("sqlite:///")
        .or_else(|| url.strip_prefix("sqlite://"))
        .or_else(|| url.strip_prefix("sqlite:"));
    match path {
        Some(path) => Some(PathBuf::from(path)),
        None if url.contains("://") => None,
        None => Some(PathBuf::from(url)),
    }
}

impl Config {
    /// Load configuration from file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Load from an explicit file, or from the first default location that
    /// exists, then apply environment overrides.
    pub fn load_with_env(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => match Self::default_locations().into_iter().find(|p| p.is_file()) {
                Some(path) => {
                    debug!(path = %path.display(), "Loading config");
                    Self::load(path)?
                }
                None => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Candidate config files, highest priority first.
    pub fn default_locations() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("task-tracker").join("config.yaml"));
        }
        paths
    }

    /// Apply environment overrides. `lookup` returns the value of a variable.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            match db_path_from_url(&url) {
                Some(path) => self.server.db_path = path,
                None => warn!("Ignoring DATABASE_URL with unsupported scheme: {}", url),
            }
        }

        if let Some(db_path) = lookup("TASK_TRACKER_DB_PATH") {
            self.server.db_path = PathBuf::from(db_path);
        }

        if let Some(host) = lookup("TASK_TRACKER_HOST") {
            match host.parse() {
                Ok(host) => self.server.host = host,
                Err(_) => warn!("Ignoring invalid TASK_TRACKER_HOST: {}", host),
            }
        }

        if let Some(port) = lookup("TASK_TRACKER_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!("Ignoring invalid TASK_TRACKER_PORT: {}", port),
            }
        }
    }

    /// Ensure the database directory exists.
    pub fn ensure_db_dir(&self) -> Result<()> {
        if let Some(parent) = self.server.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

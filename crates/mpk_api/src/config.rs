//! Server configuration.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_DB_FILE_NAME: &str = "mpk.sqlite3";

/// Runtime configuration for the API server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Socket address to listen on.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
    /// SQLite database file.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    /// Allowed CORS origins; empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// `trace|debug|info|warn|error`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Absolute directory for rotating log files; stderr when unset.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            db_path: default_db_path(),
            cors_origins: Vec::new(),
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl ApiConfig {
    /// Splits a comma separated origin list (as in `CORS_ORIGIN`).
    pub fn parse_origins(value: &str) -> Vec<String> {
        value
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect()
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

fn default_db_path() -> PathBuf {
    PathBuf::from(DEFAULT_DB_FILE_NAME)
}

fn default_log_level() -> String {
    mpk_core::default_log_level().to_string()
}

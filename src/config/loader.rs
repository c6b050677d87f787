//! Configuration structures and loading logic.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub queue: QueueConfig,

    #[serde(default)]
    pub options: OptionsConfig,
}

/// HTTP transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Browser user agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Total time allowed for a single request, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Time allowed to establish a connection, in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,

    /// Base URL that chapter fragments are served from.
    /// Fragments are fetched from `{fragment_base_url}/{document_id}/{chapter_id}`.
    #[serde(default = "default_fragment_base_url")]
    pub fragment_base_url: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
            fragment_base_url: default_fragment_base_url(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

/// Background worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// How long the worker waits for a new job before re-checking for shutdown.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Pause after an empty wait.
    #[serde(default = "default_idle")]
    pub idle_ms: u64,

    /// How long `stop` waits for the worker to exit.
    #[serde(default = "default_stop_timeout")]
    pub stop_timeout_seconds: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            idle_ms: default_idle(),
            stop_timeout_seconds: default_stop_timeout(),
        }
    }
}

impl QueueConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn idle_interval(&self) -> Duration {
        Duration::from_millis(self.idle_ms)
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_secs(self.stop_timeout_seconds)
    }
}

/// Download options configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// Directory merged documents are written to.
    #[serde(default)]
    pub download_directory: Option<PathBuf>,

    /// Working directory for chapter fragments.
    #[serde(default)]
    pub temp_directory: Option<PathBuf>,

    /// Lower bound of the random pause between chapter downloads.
    #[serde(default)]
    pub chapter_delay_min_ms: u64,

    /// Upper bound (exclusive) of the random pause between chapter downloads.
    /// Equal bounds disable the pause.
    #[serde(default)]
    pub chapter_delay_max_ms: u64,
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/144.0.0.0 Safari/537.36".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_connect_timeout() -> u64 {
    15
}

fn default_fragment_base_url() -> String {
    "https://content-select.com/media/display".to_string()
}

fn default_poll_interval() -> u64 {
    1000
}

fn default_idle() -> u64 {
    500
}

fn default_stop_timeout() -> u64 {
    2
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!(
                    "Configuration file not found: {}",
                    path.display()
                ))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the effective download directory.
    pub fn download_directory(&self) -> PathBuf {
        self.options
            .download_directory
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    /// Get the effective fragment working directory.
    pub fn temp_directory(&self) -> PathBuf {
        self.options
            .temp_directory
            .clone()
            .unwrap_or_else(crate::fs::default_temp_directory)
    }
}

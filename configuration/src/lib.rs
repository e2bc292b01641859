use std::env;
use std::fs;
use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_VAR: &str = "PRESCREEN_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "prescreen.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read configuration file: {0}")]
    Io(#[from] io::Error),

    #[error("malformed configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid override for {key}: {message}")]
    Override { key: String, message: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub watcher: WatcherConfig,
    #[serde(default)]
    pub triage: TriageConfig,
    #[serde(default)]
    pub aligner: AlignerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    #[serde(default = "default_queue_dir")]
    pub queue_dir: String,
    #[serde(default = "default_error_dir")]
    pub error_dir: String,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: f64,
    #[serde(default = "default_poll_size_limit")]
    pub poll_size_limit: usize,
    #[serde(default = "default_file_types")]
    pub file_types: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageConfig {
    #[serde(default = "default_min_accuracy")]
    pub min_accuracy: f64,
    #[serde(default = "default_true")]
    pub check_unknown_token: bool,
    #[serde(default = "default_unknown_token")]
    pub unknown_token: String,
    #[serde(default = "default_char_speak_rate")]
    pub char_speak_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignerConfig {
    #[serde(default = "default_aligner_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_blob_dir")]
    pub blob_dir: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            queue_dir: default_queue_dir(),
            error_dir: default_error_dir(),
            poll_interval_secs: default_poll_interval_secs(),
            poll_size_limit: default_poll_size_limit(),
            file_types: default_file_types(),
        }
    }
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            min_accuracy: default_min_accuracy(),
            check_unknown_token: default_true(),
            unknown_token: default_unknown_token(),
            char_speak_rate: default_char_speak_rate(),
        }
    }
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            endpoint: default_aligner_endpoint(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            blob_dir: default_blob_dir(),
        }
    }
}

impl AppConfig {
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(value) = env::var("PRESCREEN_LOG_FILTER") {
            self.logging.filter = value;
        }
        if let Ok(value) = env::var("PRESCREEN_QUEUE_DIR") {
            self.watcher.queue_dir = value;
        }
        if let Ok(value) = env::var("PRESCREEN_ERROR_DIR") {
            self.watcher.error_dir = value;
        }
        if let Ok(value) = env::var("PRESCREEN_BLOB_DIR") {
            self.storage.blob_dir = value;
        }
        if let Ok(value) = env::var("PRESCREEN_ALIGNER_ENDPOINT") {
            self.aligner.endpoint = value;
        }
        if let Ok(value) = env::var("PRESCREEN_MIN_ACCURACY") {
            self.triage.min_accuracy = parse_override("PRESCREEN_MIN_ACCURACY", &value)?;
        }
        if let Ok(value) = env::var("PRESCREEN_POLL_SIZE_LIMIT") {
            self.watcher.poll_size_limit = parse_override("PRESCREEN_POLL_SIZE_LIMIT", &value)?;
        }
        Ok(())
    }
}

fn parse_override<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|error: T::Err| ConfigError::Override {
        key: key.to_string(),
        message: error.to_string(),
    })
}

/// Loads the configuration file named by `PRESCREEN_CONFIG` (default
/// `prescreen.toml`), falling back to defaults when the file does not
/// exist, then applies scalar environment overrides.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let path = env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut config = match fs::read_to_string(&path) {
        Ok(raw) => toml::from_str(&raw)?,
        Err(error) if error.kind() == io::ErrorKind::NotFound => AppConfig::default(),
        Err(error) => return Err(ConfigError::Io(error)),
    };
    config.apply_env_overrides()?;
    Ok(config)
}

/// Initializes the global tracing subscriber. Safe to call more than once;
/// later calls are no-ops.
pub fn setup_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new(default_log_filter()));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_queue_dir() -> String {
    "storage/queue".to_string()
}

fn default_error_dir() -> String {
    "storage/errors".to_string()
}

fn default_poll_interval_secs() -> f64 {
    2.0
}

fn default_poll_size_limit() -> usize {
    32
}

fn default_file_types() -> Vec<String> {
    vec!["wav".to_string(), "json".to_string()]
}

fn default_min_accuracy() -> f64 {
    0.5
}

fn default_true() -> bool {
    true
}

fn default_unknown_token() -> String {
    "<unk>".to_string()
}

fn default_char_speak_rate() -> f64 {
    0.075
}

fn default_aligner_endpoint() -> String {
    "http://127.0.0.1:8765".to_string()
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_blob_dir() -> String {
    "storage/blobs".to_string()
}

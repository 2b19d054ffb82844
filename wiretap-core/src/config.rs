use crate::error::WiretapError;
use figment::{Figment, providers::{Env, Format, Yaml}};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub access_log: AccessLogConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub addr: String,
}

/// Access-log settings — shared read-only by every in-flight request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessLogConfig {
    /// When false, the access-log layer is not installed at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Record the response body alongside the request metadata.
    #[serde(default)]
    pub include_response: bool,
    /// Cap on the *recorded* body copy. The bytes returned to the client
    /// are never truncated.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    #[serde(default)]
    pub file: FileSinkConfig,
    #[serde(default)]
    pub push: PushSinkConfig,
}

/// Rotating JSON-lines file sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSinkConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_file_path")]
    pub path: String,
    /// Maximum file size in bytes before forced rotation.
    /// 0 = size-based rotation disabled (daily rotation only).
    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: u64,
    /// Maximum number of rotated files to keep. 0 = unlimited.
    #[serde(default = "default_max_rotated_files")]
    pub max_rotated_files: usize,
}

/// Batched HTTP push sink (newline-delimited JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushSinkConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_push_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_flush_interval")]
    pub flush_interval_secs: u64,
}

// ── Defaults ──────────────────────────────────────────────────

fn default_listen_addr() -> String { "0.0.0.0:8080".into() }
fn default_true() -> bool { true }
fn default_max_body_bytes() -> usize { 64 * 1024 }
fn default_file_path() -> String { "access.log".into() }
fn default_max_file_size() -> u64 { 100 * 1024 * 1024 }
fn default_max_rotated_files() -> usize { 30 }
fn default_push_endpoint() -> String { "http://localhost:9428/insert/jsonline".into() }
fn default_batch_size() -> usize { 1000 }
fn default_flush_interval() -> u64 { 5 }

// ── Impls ─────────────────────────────────────────────────────

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            access_log: AccessLogConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_listen_addr(),
        }
    }
}

impl Default for AccessLogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            include_response: false,
            max_body_bytes: default_max_body_bytes(),
            file: FileSinkConfig::default(),
            push: PushSinkConfig::default(),
        }
    }
}

impl Default for FileSinkConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_file_path(),
            max_file_size_bytes: default_max_file_size(),
            max_rotated_files: default_max_rotated_files(),
        }
    }
}

impl Default for PushSinkConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_push_endpoint(),
            batch_size: default_batch_size(),
            flush_interval_secs: default_flush_interval(),
        }
    }
}

impl AppConfig {
    /// Load configuration from YAML file + env overrides.
    pub fn load(path: &Path) -> Result<Self, WiretapError> {
        let config: AppConfig = Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed("WIRETAP_").split("_"))
            .extract()
            .map_err(|e| WiretapError::ConfigError(e.to_string()))?;
        Ok(config)
    }
}

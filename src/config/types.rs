// Configuration types module
// Defines all configuration-related data structures

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;

/// Extensions treated as static files in regex route mode
pub const DEFAULT_STATIC_EXTENSIONS: &[&str] = &[
    "ico", "css", "js", "svg", "gif", "jpg", "jpeg", "png", "html", "htm",
];

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub performance: PerformanceConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    /// Listen address, `host:port`
    pub addr: String,
    /// How long clients may cache responses, e.g. `720h`
    pub cache_duration: String,
    /// Gzip compressible files for clients that accept it
    #[serde(default)]
    pub compress: bool,
    pub static_dir: PathBuf,
    /// Index document, relative to `static_dir`
    pub index_file: String,
    #[serde(default)]
    pub route_mode: RouteMode,
    #[serde(default = "default_static_extensions")]
    pub static_extensions: Vec<String>,
    /// Full regular expression replacing `static_extensions`
    #[serde(default)]
    pub static_pattern: Option<String>,
    #[serde(default)]
    pub weak_etag: bool,
    #[serde(default)]
    pub cert_file: Option<PathBuf>,
    #[serde(default)]
    pub key_file: Option<PathBuf>,
    #[serde(default)]
    pub workers: Option<usize>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_static_extensions() -> Vec<String> {
    DEFAULT_STATIC_EXTENSIONS
        .iter()
        .map(ToString::to_string)
        .collect()
}

/// Certificate and key locations for TLS mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert_file: PathBuf,
    pub key_file: PathBuf,
}

impl ServerConfig {
    /// Configuration with defaults for everything but the served directory
    pub fn new(static_dir: impl Into<PathBuf>) -> Self {
        Self {
            addr: "localhost:80".to_string(),
            cache_duration: "720h".to_string(),
            compress: false,
            static_dir: static_dir.into(),
            index_file: "index.html".to_string(),
            route_mode: RouteMode::default(),
            static_extensions: default_static_extensions(),
            static_pattern: None,
            weak_etag: false,
            cert_file: None,
            key_file: None,
            workers: None,
        }
    }

    /// TLS material, if configured
    ///
    /// Both paths set enables TLS, neither set means plain HTTP.
    /// Empty paths count as unset. A one-sided pairing is an error.
    pub fn tls(&self) -> Result<Option<TlsPaths>, ConfigError> {
        let non_empty = |p: &Option<PathBuf>| p.clone().filter(|p| !p.as_os_str().is_empty());
        match (non_empty(&self.cert_file), non_empty(&self.key_file)) {
            (Some(cert_file), Some(key_file)) => Ok(Some(TlsPaths {
                cert_file,
                key_file,
            })),
            (None, None) => Ok(None),
            (cert, key) => Err(ConfigError::IncompleteTls { cert, key }),
        }
    }
}

/// Strategy deciding whether a request path names a static file or an app route
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteMode {
    /// Match the path against the static extension pattern, no disk access
    #[default]
    Regex,
    /// Serve the file only if it exists on disk
    Stat,
    /// Serve every path as a file, no SPA fallback
    Static,
}

impl RouteMode {
    /// Parse a mode name; empty, unknown or differently cased names fall back to `Regex`
    pub fn from_name(name: &str) -> Self {
        match name {
            "stat" => Self::Stat,
            "static" => Self::Static,
            _ => Self::Regex,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Regex => "regex",
            Self::Stat => "stat",
            Self::Static => "static",
        }
    }
}

impl fmt::Display for RouteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RouteMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = Option::<String>::deserialize(deserializer)?;
        Ok(name.as_deref().map_or_else(Self::default, Self::from_name))
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Minimum level: info, warning, error or fatal
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_access_log")]
    pub access_log: bool,
    /// Access log format (default, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_log_level() -> String {
    "info".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log() -> bool {
    true
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "default".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            access_log: default_access_log(),
            access_log_format: default_access_log_format(),
            access_log_file: None,
            error_log_file: None,
        }
    }
}

/// Connection handling configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PerformanceConfig {
    #[serde(default = "default_keep_alive")]
    pub keep_alive: bool,
    /// Whole-connection timeout in seconds, 0 disables it
    #[serde(default)]
    pub connection_timeout: u64,
}

#[allow(clippy::missing_const_for_fn)]
fn default_keep_alive() -> bool {
    true
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            keep_alive: default_keep_alive(),
            connection_timeout: 0,
        }
    }
}

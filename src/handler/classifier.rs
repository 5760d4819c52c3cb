//! Path classification
//!
//! Decides whether a request path names a static file or an application route
//! that should fall back to the index document.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::config::{RouteMode, ServerConfig};
use crate::error::ConfigError;
use crate::logger::Logger;

/// Compiled static file pattern
#[derive(Debug, Clone)]
pub struct StaticFileMatcher {
    pattern: Regex,
}

impl StaticFileMatcher {
    /// Build `^.*\.(ext|ext|...)$` from an extension allowlist
    ///
    /// Extensions are matched literally and case-sensitively.
    ///
    /// # Examples
    /// ```
    /// use spahost::handler::classifier::StaticFileMatcher;
    /// let matcher = StaticFileMatcher::from_extensions(&["js", "css"]).unwrap();
    /// assert!(matcher.is_match("/app.js"));
    /// assert!(!matcher.is_match("/app.JS"));
    /// assert!(!matcher.is_match("/users/42"));
    /// ```
    pub fn from_extensions<S: AsRef<str>>(extensions: &[S]) -> Result<Self, ConfigError> {
        let alternatives: Vec<String> = extensions
            .iter()
            .map(|ext| ext.as_ref().trim().trim_start_matches('.'))
            .filter(|ext| !ext.is_empty())
            .map(regex::escape)
            .collect();
        if alternatives.is_empty() {
            return Err(ConfigError::NoStaticExtensions);
        }
        Self::from_pattern(&format!(r"^.*\.({})$", alternatives.join("|")))
    }

    /// Use a full regular expression as-is
    pub fn from_pattern(pattern: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    /// Build from the server configuration; `static_pattern` wins over `static_extensions`
    pub fn from_config(config: &ServerConfig) -> Result<Self, ConfigError> {
        match config.static_pattern.as_deref() {
            Some(pattern) if !pattern.trim().is_empty() => Self::from_pattern(pattern),
            _ => Self::from_extensions(&config.static_extensions),
        }
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.pattern.is_match(path)
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}

/// Route mode strategy, fixed at construction
#[derive(Debug, Clone)]
pub enum PathClassifier {
    /// Extension pattern match, no filesystem access
    Regex(StaticFileMatcher),
    /// Static iff a non-directory entry exists under `root`
    Stat { root: PathBuf },
    /// Everything is static
    AlwaysStatic,
}

impl PathClassifier {
    pub fn from_config(config: &ServerConfig) -> Result<Self, ConfigError> {
        Ok(match config.route_mode {
            RouteMode::Regex => Self::Regex(StaticFileMatcher::from_config(config)?),
            RouteMode::Stat => Self::Stat {
                root: config.static_dir.clone(),
            },
            RouteMode::Static => Self::AlwaysStatic,
        })
    }

    pub const fn mode(&self) -> RouteMode {
        match self {
            Self::Regex(_) => RouteMode::Regex,
            Self::Stat { .. } => RouteMode::Stat,
            Self::AlwaysStatic => RouteMode::Static,
        }
    }

    /// Check if `path` names a static file
    ///
    /// Never fails: inconclusive filesystem errors are logged and the path is
    /// treated as an application route.
    pub async fn is_static(&self, path: &str, logger: &dyn Logger) -> bool {
        match self {
            Self::AlwaysStatic => true,
            Self::Regex(matcher) => matcher.is_match(path),
            Self::Stat { root } => stat_is_file(root, path, logger).await,
        }
    }
}

async fn stat_is_file(root: &Path, path: &str, logger: &dyn Logger) -> bool {
    let target = root.join(path.trim_start_matches('/'));
    match tokio::fs::metadata(&target).await {
        Ok(metadata) => !metadata.is_dir(),
        Err(e) if e.kind() == ErrorKind::NotFound => false,
        Err(e) => {
            logger.error(&format!("stat {}: {e}", target.display()));
            false
        }
    }
}

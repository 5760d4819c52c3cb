// Configuration module entry point
// Layers defaults, an optional config file, environment variables and command-line overrides

mod duration;
mod types;

pub use duration::{parse_duration, ParseDurationError};
pub use types::{
    Config, LoggingConfig, PerformanceConfig, RouteMode, ServerConfig, TlsPaths,
    DEFAULT_STATIC_EXTENSIONS,
};

use crate::error::ConfigError;

/// Default config file location (without extension)
pub const DEFAULT_CONFIG_PATH: &str = "/etc/spahost/config";

/// Environment variable prefix, e.g. `SPAHOST_SERVER__ADDR`
pub const ENV_PREFIX: &str = "SPAHOST";

/// Values given on the command line, highest precedence
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub addr: Option<String>,
    pub cache_duration: Option<String>,
    pub cert_file: Option<String>,
    pub key_file: Option<String>,
    /// Only `Some(true)` is meaningful; an absent flag never disables compression
    pub compress: Option<bool>,
    pub index_file: Option<String>,
    pub static_dir: Option<String>,
    pub route_mode: Option<String>,
}

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// Precedence, lowest first: built-in defaults, config file, environment, overrides.
    /// A missing config file is not an error.
    pub fn load_from(config_path: &str, overrides: &Overrides) -> Result<Self, ConfigError> {
        let settings = ::config::Config::builder()
            .set_default("server.addr", "localhost:80")?
            .set_default("server.cache_duration", "720h")?
            .set_default("server.compress", false)?
            .set_default("server.static_dir", "web")?
            .set_default("server.index_file", "index.html")?
            .set_default("server.route_mode", "regex")?
            .set_default("server.weak_etag", false)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "default")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.connection_timeout", 0)?
            .add_source(::config::File::with_name(config_path).required(false))
            .add_source(environment())
            .set_override_option("server.addr", overrides.addr.clone())?
            .set_override_option("server.cache_duration", overrides.cache_duration.clone())?
            .set_override_option("server.cert_file", overrides.cert_file.clone())?
            .set_override_option("server.key_file", overrides.key_file.clone())?
            .set_override_option("server.compress", overrides.compress.filter(|c| *c))?
            .set_override_option("server.index_file", overrides.index_file.clone())?
            .set_override_option("server.static_dir", overrides.static_dir.clone())?
            .set_override_option("server.route_mode", overrides.route_mode.clone())?
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

/// `SPAHOST_SECTION__KEY` variables; list keys take comma-separated values
fn environment() -> ::config::Environment {
    ::config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("server.static_extensions")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn write_config(dir: &tempfile::TempDir, contents: &str) -> String {
        let path = dir.path().join("spahost.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        // File::with_name resolves the extension itself
        dir.path().join("spahost").to_string_lossy().into_owned()
    }

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope").to_string_lossy().into_owned();
        let cfg = Config::load_from(&missing, &Overrides::default()).unwrap();

        assert_eq!(cfg.server.addr, "localhost:80");
        assert_eq!(cfg.server.cache_duration, "720h");
        assert_eq!(cfg.server.static_dir, PathBuf::from("web"));
        assert_eq!(cfg.server.index_file, "index.html");
        assert_eq!(cfg.server.route_mode, RouteMode::Regex);
        assert!(!cfg.server.compress);
        assert!(cfg.logging.access_log);
        assert_eq!(cfg.logging.access_log_format, "default");
        assert!(cfg.performance.keep_alive);
    }

    #[test]
    fn test_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
[server]
addr = "0.0.0.0:8080"
cache_duration = "1h"
route_mode = "stat"
static_dir = "/srv/app"
static_extensions = ["js", "css"]

[logging]
access_log_format = "json"
"#,
        );
        let cfg = Config::load_from(&path, &Overrides::default()).unwrap();

        assert_eq!(cfg.server.addr, "0.0.0.0:8080");
        assert_eq!(cfg.server.cache_duration, "1h");
        assert_eq!(cfg.server.route_mode, RouteMode::Stat);
        assert_eq!(cfg.server.static_dir, PathBuf::from("/srv/app"));
        assert_eq!(cfg.server.static_extensions, vec!["js", "css"]);
        assert_eq!(cfg.logging.access_log_format, "json");
        // Untouched keys keep their defaults
        assert_eq!(cfg.server.index_file, "index.html");
    }

    #[test]
    fn test_overrides_win() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
[server]
addr = "0.0.0.0:8080"
compress = true
"#,
        );
        let overrides = Overrides {
            addr: Some("127.0.0.1:9000".to_string()),
            route_mode: Some("static".to_string()),
            compress: Some(false),
            ..Overrides::default()
        };
        let cfg = Config::load_from(&path, &overrides).unwrap();

        assert_eq!(cfg.server.addr, "127.0.0.1:9000");
        assert_eq!(cfg.server.route_mode, RouteMode::Static);
        // An unset flag does not switch compression off
        assert!(cfg.server.compress);
    }

    #[test]
    fn test_unknown_route_mode_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "[server]\nroute_mode = \"whatever\"\n");
        let cfg = Config::load_from(&path, &Overrides::default()).unwrap();
        assert_eq!(cfg.server.route_mode, RouteMode::Regex);
    }

    #[test]
    fn test_uppercase_route_mode_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "[server]\nroute_mode = \"STAT\"\n");
        let cfg = Config::load_from(&path, &Overrides::default()).unwrap();
        assert_eq!(cfg.server.route_mode, RouteMode::Regex);
    }

    #[test]
    fn test_environment_lists_and_scalars() {
        let vars = [
            ("SPAHOST_SERVER__STATIC_EXTENSIONS", "js,css,map"),
            ("SPAHOST_SERVER__COMPRESS", "true"),
            ("SPAHOST_SERVER__INDEX_FILE", "app.html"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect::<::config::Map<String, String>>();

        let server: ServerConfig = ::config::Config::builder()
            .set_default("server.addr", "localhost:80")
            .unwrap()
            .set_default("server.cache_duration", "720h")
            .unwrap()
            .set_default("server.static_dir", "web")
            .unwrap()
            .add_source(environment().source(Some(vars)))
            .build()
            .unwrap()
            .get("server")
            .unwrap();

        assert_eq!(server.static_extensions, vec!["js", "css", "map"]);
        assert!(server.compress);
        assert_eq!(server.index_file, "app.html");
    }
}

//! Logger module
//!
//! The server reports through the [`Logger`] trait. [`NopLogger`] is used until a
//! real logger is injected, so call sites never check whether logging is set up.
//! [`WriterLogger`] is the stock implementation on top of [`writer::LogWriter`].

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use std::fmt;
use std::str::FromStr;

use chrono::Local;

use crate::config::LoggingConfig;
use crate::error::ConfigError;
use writer::LogWriter;

/// Leveled message sink
pub trait Logger: Send + Sync {
    fn info(&self, message: &str);
    fn warning(&self, message: &str);
    fn error(&self, message: &str);
    /// Unrecoverable condition; terminating the process is left to the caller
    fn fatal(&self, message: &str);
}

/// Logger discarding everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NopLogger;

impl Logger for NopLogger {
    fn info(&self, _message: &str) {}
    fn warning(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
    fn fatal(&self, _message: &str) {}
}

/// Message severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Info,
    Warning,
    Error,
    Fatal,
}

impl Level {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARN",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            "fatal" => Ok(Self::Fatal),
            _ => Err(ConfigError::LogLevel(s.to_string())),
        }
    }
}

/// Logger writing timestamped lines: info to the access sink, everything else to the error sink
pub struct WriterLogger {
    writer: LogWriter,
    min_level: Level,
}

impl WriterLogger {
    pub const fn new(writer: LogWriter, min_level: Level) -> Self {
        Self { writer, min_level }
    }

    /// Build from the logging section of the configuration
    ///
    /// Fails on an unknown level name or a log file that cannot be opened.
    pub fn from_config(config: &LoggingConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let level = config.level.parse::<Level>()?;
        let writer = LogWriter::new(
            config.access_log_file.as_deref(),
            config.error_log_file.as_deref(),
        )?;
        Ok(Self::new(writer, level))
    }

    fn write(&self, level: Level, message: &str) {
        if level < self.min_level {
            return;
        }
        let line = format_line(level, message);
        if level == Level::Info {
            self.writer.write_access(&line);
        } else {
            self.writer.write_error(&line);
        }
    }
}

fn format_line(level: Level, message: &str) -> String {
    format!(
        "{} [{level}] {message}",
        Local::now().format("%Y/%m/%d %H:%M:%S")
    )
}

impl Logger for WriterLogger {
    fn info(&self, message: &str) {
        self.write(Level::Info, message);
    }

    fn warning(&self, message: &str) {
        self.write(Level::Warning, message);
    }

    fn error(&self, message: &str) {
        self.write(Level::Error, message);
    }

    fn fatal(&self, message: &str) {
        self.write(Level::Fatal, message);
    }
}

/// Logger recording messages in memory, for assertions in tests
#[cfg(test)]
#[derive(Default)]
pub struct MemoryLogger {
    pub entries: std::sync::Mutex<Vec<(Level, String)>>,
}

#[cfg(test)]
impl MemoryLogger {
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    fn push(&self, level: Level, message: &str) {
        self.entries
            .lock()
            .unwrap()
            .push((level, message.to_string()));
    }
}

#[cfg(test)]
impl Logger for MemoryLogger {
    fn info(&self, message: &str) {
        self.push(Level::Info, message);
    }
    fn warning(&self, message: &str) {
        self.push(Level::Warning, message);
    }
    fn error(&self, message: &str) {
        self.push(Level::Error, message);
    }
    fn fatal(&self, message: &str) {
        self.push(Level::Fatal, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parse() {
        assert_eq!("info".parse::<Level>().unwrap(), Level::Info);
        assert_eq!("WARN".parse::<Level>().unwrap(), Level::Warning);
        assert_eq!("warning".parse::<Level>().unwrap(), Level::Warning);
        assert_eq!("error".parse::<Level>().unwrap(), Level::Error);
        assert_eq!("fatal".parse::<Level>().unwrap(), Level::Fatal);
        assert!(matches!(
            "verbose".parse::<Level>(),
            Err(ConfigError::LogLevel(_))
        ));
    }

    #[test]
    fn test_level_order() {
        assert!(Level::Info < Level::Warning);
        assert!(Level::Warning < Level::Error);
        assert!(Level::Error < Level::Fatal);
    }

    #[test]
    fn test_nop_logger_is_silent() {
        let logger: &dyn Logger = &NopLogger;
        logger.info("ignored");
        logger.fatal("ignored");
    }

    #[test]
    fn test_writer_logger_routing_and_filter() {
        let dir = tempfile::tempdir().unwrap();
        let access = dir.path().join("access.log");
        let error = dir.path().join("error.log");
        let config = LoggingConfig {
            level: "info".to_string(),
            access_log_file: Some(access.to_string_lossy().into_owned()),
            error_log_file: Some(error.to_string_lossy().into_owned()),
            ..LoggingConfig::default()
        };
        let logger = WriterLogger::from_config(&config).unwrap();
        logger.info("request served");
        logger.warning("slow disk");
        logger.error("stat failed");

        let access_log = std::fs::read_to_string(&access).unwrap();
        let error_log = std::fs::read_to_string(&error).unwrap();
        assert!(access_log.contains("[INFO] request served"));
        assert!(!access_log.contains("stat failed"));
        assert!(error_log.contains("[WARN] slow disk"));
        assert!(error_log.contains("[ERROR] stat failed"));
    }

    #[test]
    fn test_writer_logger_min_level() {
        let dir = tempfile::tempdir().unwrap();
        let error = dir.path().join("error.log");
        let writer = LogWriter::new(None, Some(error.to_str().unwrap())).unwrap();
        let logger = WriterLogger::new(writer, Level::Error);
        logger.warning("dropped");
        logger.fatal("kept");

        let error_log = std::fs::read_to_string(&error).unwrap();
        assert!(!error_log.contains("dropped"));
        assert!(error_log.contains("[FATAL] kept"));
    }

    #[test]
    fn test_unknown_level_rejected() {
        let config = LoggingConfig {
            level: "loud".to_string(),
            ..LoggingConfig::default()
        };
        assert!(WriterLogger::from_config(&config).is_err());
    }
}

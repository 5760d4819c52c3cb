//! Access log format module
//!
//! Supports multiple log formats:
//! - `default` (`REQ [remote] /path -> root/target [status]`)
//! - `common` (Common Log Format - CLF)
//! - `json` (JSON structured logging)
//! - Custom patterns with variables

use chrono::Local;
use serde::Serialize;

/// Access log entry describing one dispatched request
#[derive(Debug, Clone, Serialize)]
pub struct AccessLogEntry {
    /// Client address
    pub remote_addr: String,
    /// Request timestamp
    #[serde(serialize_with = "serialize_time")]
    pub time: chrono::DateTime<Local>,
    /// HTTP method (GET, HEAD, ...)
    pub method: String,
    /// Request path as classified
    pub path: String,
    /// Root directory of the file server
    pub serve_root: String,
    /// Asset path or index file that produced the body
    pub serve_target: String,
    /// Response status code
    pub status: u16,
    /// Response body size in bytes
    pub body_bytes: usize,
    /// Request processing time in microseconds
    pub request_time_us: u64,
}

fn serialize_time<S: serde::Serializer>(
    time: &chrono::DateTime<Local>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&time.to_rfc3339())
}

impl AccessLogEntry {
    /// Create a new access log entry with current timestamp
    pub fn new(remote_addr: String, method: String, path: String) -> Self {
        Self {
            remote_addr,
            time: Local::now(),
            method,
            path,
            serve_root: String::new(),
            serve_target: String::new(),
            status: 200,
            body_bytes: 0,
            request_time_us: 0,
        }
    }

    /// Format the log entry according to the specified format
    pub fn format(&self, format: &str) -> String {
        match format {
            "default" => self.format_default(),
            "common" => self.format_common(),
            "json" => self.format_json(),
            custom => self.format_custom(custom),
        }
    }

    /// Root and target joined the way they are looked up on disk
    fn served_file(&self) -> String {
        let root = self.serve_root.trim_end_matches('/');
        let target = self.serve_target.trim_start_matches('/');
        format!("{root}/{target}")
    }

    fn format_default(&self) -> String {
        format!(
            "REQ [{}] {} -> {} [{}]",
            self.remote_addr,
            self.path,
            self.served_file(),
            self.status,
        )
    }

    /// Common Log Format (CLF)
    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent`
    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{} {}\" {} {}",
            self.remote_addr,
            self.time.format("%d/%b/%Y:%H:%M:%S %z"),
            self.method,
            self.path,
            self.status,
            self.body_bytes,
        )
    }

    fn format_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| format!(r#"{{"error":"{e}"}}"#))
    }

    /// Custom format with variable substitution
    ///
    /// Supported variables:
    /// - `$remote_addr` - Client address
    /// - `$time_local` - Local time in Common Log Format
    /// - `$time_iso8601` - ISO 8601 timestamp
    /// - `$request_method` - HTTP method
    /// - `$request_time` - Request processing time in seconds (3 decimal places)
    /// - `$path` - Request path
    /// - `$serve_root` - File server root
    /// - `$serve_target` - Served asset or index file
    /// - `$status` - Response status code
    /// - `$body_bytes_sent` - Response body size
    ///
    /// The pattern is scanned once. A `$` followed by a name that is not listed
    /// above is kept as written, and substituted values are never rescanned.
    fn format_custom(&self, pattern: &str) -> String {
        let mut result = String::with_capacity(pattern.len() + 64);
        let mut rest = pattern;

        while let Some(dollar) = rest.find('$') {
            result.push_str(&rest[..dollar]);
            let after = &rest[dollar + 1..];
            let name_len = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            let name = &after[..name_len];
            match self.variable(name) {
                Some(value) => result.push_str(&value),
                None => {
                    result.push('$');
                    result.push_str(name);
                }
            }
            rest = &after[name_len..];
        }
        result.push_str(rest);

        result
    }

    fn variable(&self, name: &str) -> Option<String> {
        let value = match name {
            "remote_addr" => self.remote_addr.clone(),
            "time_local" => self.time.format("%d/%b/%Y:%H:%M:%S %z").to_string(),
            "time_iso8601" => self.time.to_rfc3339(),
            "request_method" => self.method.clone(),
            "request_time" => {
                #[allow(clippy::cast_precision_loss)]
                let seconds = self.request_time_us as f64 / 1_000_000.0;
                format!("{seconds:.3}")
            }
            "path" => self.path.clone(),
            "serve_root" => self.serve_root.clone(),
            "serve_target" => self.serve_target.clone(),
            "status" => self.status.to_string(),
            "body_bytes_sent" => self.body_bytes.to_string(),
            _ => return None,
        };
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_entry() -> AccessLogEntry {
        let mut entry = AccessLogEntry::new(
            "192.168.1.1:51234".to_string(),
            "GET".to_string(),
            "/dashboard".to_string(),
        );
        entry.serve_root = "web".to_string();
        entry.serve_target = "index.html".to_string();
        entry.status = 200;
        entry.body_bytes = 1234;
        entry.request_time_us = 12_000;
        entry
    }

    #[test]
    fn test_format_default() {
        let entry = create_test_entry();
        assert_eq!(
            entry.format("default"),
            "REQ [192.168.1.1:51234] /dashboard -> web/index.html [200]"
        );
    }

    #[test]
    fn test_format_default_asset_path() {
        let mut entry = create_test_entry();
        entry.path = "/app.js".to_string();
        entry.serve_root = "web/".to_string();
        entry.serve_target = "/app.js".to_string();
        entry.status = 404;
        assert_eq!(
            entry.format("default"),
            "REQ [192.168.1.1:51234] /app.js -> web/app.js [404]"
        );
    }

    #[test]
    fn test_format_common() {
        let entry = create_test_entry();
        let log = entry.format("common");
        assert!(log.starts_with("192.168.1.1:51234 - - ["));
        assert!(log.contains("\"GET /dashboard\""));
        assert!(log.ends_with("200 1234"));
    }

    #[test]
    fn test_format_json() {
        let entry = create_test_entry();
        let log = entry.format("json");
        let value: serde_json::Value = serde_json::from_str(&log).unwrap();
        assert_eq!(value["remote_addr"], "192.168.1.1:51234");
        assert_eq!(value["method"], "GET");
        assert_eq!(value["serve_target"], "index.html");
        assert_eq!(value["status"], 200);
        assert_eq!(value["body_bytes"], 1234);
        assert!(value["time"].is_string());
    }

    #[test]
    fn test_format_custom() {
        let entry = create_test_entry();
        let log = entry.format("$remote_addr $path $serve_root/$serve_target $status $request_time");
        assert_eq!(log, "192.168.1.1:51234 /dashboard web/index.html 200 0.012");
    }

    #[test]
    fn test_format_custom_keeps_request_values_literal() {
        let mut entry = create_test_entry();
        entry.path = "/a$status/$remote_addr".to_string();
        assert_eq!(
            entry.format("$path $status"),
            "/a$status/$remote_addr 200"
        );
    }

    #[test]
    fn test_format_custom_unknown_variables() {
        let entry = create_test_entry();
        assert_eq!(
            entry.format("$request_method $bogus $ $status_code"),
            "GET $bogus $ $status_code"
        );
        assert_eq!(entry.format("cost=$request_time"), "cost=0.012");
    }
}

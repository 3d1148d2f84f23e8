//! Access log format module
//!
//! Supported formats:
//! - `combined` (Apache/Nginx combined format plus cache status)
//! - `common` (Common Log Format - CLF)
//! - `json`
//! - Custom patterns with `$variables`

use chrono::{DateTime, Local};
use std::time::Instant;

const CLF_TIME: &str = "%d/%b/%Y:%H:%M:%S %z";

/// How the cache took part in answering a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
    /// Request did not read the cache (PUT, DELETE, rejected requests)
    Bypass,
}

impl CacheStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "HIT",
            Self::Miss => "MISS",
            Self::Bypass => "-",
        }
    }
}

/// One line of the access log
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    pub remote_addr: String,
    pub time: DateTime<Local>,
    pub method: String,
    /// Path with query string, as sent by the client
    pub uri: String,
    pub http_version: String,
    pub status: u16,
    pub body_bytes: usize,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    pub cache: CacheStatus,
    /// Processing time in microseconds
    pub request_time_us: u64,
}

impl AccessLogEntry {
    /// Start an entry; status and sizes are filled in by [`Self::finish`]
    pub fn new(remote_addr: String, method: String, uri: String) -> Self {
        Self {
            remote_addr,
            time: Local::now(),
            method,
            uri,
            http_version: "1.1".to_string(),
            status: 0,
            body_bytes: 0,
            referer: None,
            user_agent: None,
            cache: CacheStatus::Bypass,
            request_time_us: 0,
        }
    }

    pub fn finish(&mut self, status: u16, body_bytes: usize, started: Instant) {
        self.status = status;
        self.body_bytes = body_bytes;
        self.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    }

    pub fn format(&self, format: &str) -> String {
        match format {
            "combined" => self.format_combined(),
            "common" => self.format_common(),
            "json" => self.format_json(),
            custom => self.format_custom(custom),
        }
    }

    fn request_line(&self) -> String {
        format!("{} {} HTTP/{}", self.method, self.uri, self.http_version)
    }

    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{}\" {} {}",
            self.remote_addr,
            self.time.format(CLF_TIME),
            self.request_line(),
            self.status,
            self.body_bytes,
        )
    }

    fn format_combined(&self) -> String {
        format!(
            "{} \"{}\" \"{}\" {}",
            self.format_common(),
            self.referer.as_deref().unwrap_or("-"),
            self.user_agent.as_deref().unwrap_or("-"),
            self.cache.as_str(),
        )
    }

    fn format_json(&self) -> String {
        let opt = |v: Option<&String>| {
            v.map_or_else(|| "null".to_string(), |s| format!("\"{}\"", escape_json(s)))
        };

        format!(
            r#"{{"remote_addr":"{}","time":"{}","method":"{}","uri":"{}","http_version":"{}","status":{},"body_bytes":{},"referer":{},"user_agent":{},"cache":"{}","request_time_us":{}}}"#,
            escape_json(&self.remote_addr),
            self.time.to_rfc3339(),
            escape_json(&self.method),
            escape_json(&self.uri),
            escape_json(&self.http_version),
            self.status,
            self.body_bytes,
            opt(self.referer.as_ref()),
            opt(self.user_agent.as_ref()),
            self.cache.as_str(),
            self.request_time_us,
        )
    }

    /// Custom pattern
    ///
    /// Variables: `$remote_addr`, `$time_local`, `$time_iso8601`, `$request`,
    /// `$request_method`, `$request_uri`, `$request_time`, `$status`,
    /// `$body_bytes_sent`, `$http_referer`, `$http_user_agent`, `$cache_status`.
    fn format_custom(&self, pattern: &str) -> String {
        #[allow(clippy::cast_precision_loss)]
        let request_time = self.request_time_us as f64 / 1_000_000.0;

        // Longer names first: $request_* before $request
        let vars: [(&str, String); 12] = [
            ("$remote_addr", self.remote_addr.clone()),
            ("$time_local", self.time.format(CLF_TIME).to_string()),
            ("$time_iso8601", self.time.to_rfc3339()),
            ("$request_time", format!("{request_time:.3}")),
            ("$request_method", self.method.clone()),
            ("$request_uri", self.uri.clone()),
            ("$request", self.request_line()),
            ("$status", self.status.to_string()),
            ("$body_bytes_sent", self.body_bytes.to_string()),
            ("$http_referer", self.referer.clone().unwrap_or_else(|| "-".into())),
            ("$http_user_agent", self.user_agent.clone().unwrap_or_else(|| "-".into())),
            ("$cache_status", self.cache.as_str().to_string()),
        ];

        vars.iter()
            .fold(pattern.to_string(), |acc, (name, value)| acc.replace(name, value))
    }
}

fn escape_json(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry() -> AccessLogEntry {
        let mut entry = AccessLogEntry::new(
            "10.0.0.7".to_string(),
            "GET".to_string(),
            "/404".to_string(),
        );
        entry.status = 200;
        entry.body_bytes = 5120;
        entry.user_agent = Some("curl/8.5".to_string());
        entry.cache = CacheStatus::Miss;
        entry.request_time_us = 12_345;
        entry
    }

    #[test]
    fn test_format_common() {
        let log = sample_entry().format("common");
        assert!(log.starts_with("10.0.0.7 - - ["));
        assert!(log.contains("\"GET /404 HTTP/1.1\" 200 5120"));
        assert!(!log.contains("curl"));
    }

    #[test]
    fn test_format_combined() {
        let log = sample_entry().format("combined");
        assert!(log.contains("\"GET /404 HTTP/1.1\" 200 5120"));
        assert!(log.contains("\"-\" \"curl/8.5\""));
        assert!(log.ends_with("MISS"));
    }

    #[test]
    fn test_format_json() {
        let log = sample_entry().format("json");
        assert!(log.contains(r#""uri":"/404""#));
        assert!(log.contains(r#""status":200"#));
        assert!(log.contains(r#""referer":null"#));
        assert!(log.contains(r#""cache":"MISS""#));
    }

    #[test]
    fn test_format_custom() {
        let log = sample_entry().format("$request_method $request_uri $status $cache_status $request_time");
        assert_eq!(log, "GET /404 200 MISS 0.012");
    }

    #[test]
    fn test_escape_json() {
        assert_eq!(escape_json("a\"b\\c\n"), "a\\\"b\\\\c\\n");
    }
}

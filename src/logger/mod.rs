//! Logger module
//!
//! Provides logging utilities for the cache server including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Cache hit/miss and origin/storage failure logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::{AccessLogEntry, CacheStatus};

use crate::cache::{ResourceCode, StoreError};
use crate::config::{Config, LoggingConfig};
use crate::origin::OriginError;
use std::net::SocketAddr;
use std::str::FromStr;

/// Severity filter, ordered from most to least severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" | "trace" => Ok(Self::Debug),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &LoggingConfig) -> std::io::Result<()> {
    let level = config.level.parse::<LogLevel>().map_err(|e| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;
    writer::init(
        level,
        config.access_log_file.as_deref(),
        config.error_log_file.as_deref(),
    )
}

fn enabled(level: LogLevel) -> bool {
    writer::get().map_or(LogLevel::Info, writer::LogWriter::level) >= level
}

fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info(&format!("Server is running on http://{addr}"));
    write_info(&format!("Host: {}", config.server.host));
    write_info(&format!("Port: {}", config.server.port));
    write_info(&format!("Cache: {}", config.cache.dir));
    write_info(&format!("Origin: {}", config.origin.base_url));
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(limit) = config.http.max_body_size {
        write_info(&format!("Max upload size: {limit} bytes"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================");
}

pub fn log_shutdown(reason: &str) {
    write_info(&format!("[Shutdown] {reason}, no longer accepting connections"));
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    if enabled(LogLevel::Debug) {
        write_info(&format!("[Connection] Accepted from: {peer_addr}"));
    }
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    if enabled(LogLevel::Error) {
        write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
    }
}

pub fn log_error(message: &str) {
    if enabled(LogLevel::Error) {
        write_error(&format!("[ERROR] {message}"));
    }
}

pub fn log_warning(message: &str) {
    if enabled(LogLevel::Warn) {
        write_error(&format!("[WARN] {message}"));
    }
}

pub fn log_cache_hit(code: ResourceCode, bytes: usize) {
    if enabled(LogLevel::Debug) {
        write_info(&format!("[Cache] HIT {code} ({bytes} bytes)"));
    }
}

pub fn log_cache_miss(code: ResourceCode) {
    if enabled(LogLevel::Debug) {
        write_info(&format!("[Cache] MISS {code}, fetching from origin"));
    }
}

pub fn log_cache_populated(code: ResourceCode, bytes: usize) {
    if enabled(LogLevel::Info) {
        write_info(&format!("[Cache] Stored {code} from origin ({bytes} bytes)"));
    }
}

pub fn log_origin_failure(code: ResourceCode, err: &OriginError) {
    log_warning(&format!("[Origin] Fetch for {code} failed: {err}"));
}

pub fn log_storage_error(err: &StoreError) {
    log_error(&format!("[Storage] {err} (kind: {:?})", err.kind));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!("info".parse::<LogLevel>(), Ok(LogLevel::Info));
        assert_eq!("WARN".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!("debug".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Debug > LogLevel::Info);
        assert!(LogLevel::Info > LogLevel::Warn);
        assert!(LogLevel::Warn > LogLevel::Error);
    }
}

// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub origin: OriginConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Cache directory configuration
#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// Existing directory holding `<code>.jpg` entries
    pub dir: String,
}

/// Origin service configuration
#[derive(Debug, Deserialize, Clone)]
pub struct OriginConfig {
    /// Images are fetched from `<base_url>/<code>`
    pub base_url: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
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
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    /// Upper bound for PUT bodies; no limit when unset
    #[serde(default)]
    pub max_body_size: Option<u64>,
}

#[cfg(test)]
impl Config {
    /// Loopback configuration over an existing cache directory
    pub(crate) fn for_cache_dir(dir: &std::path::Path) -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                workers: None,
            },
            cache: CacheConfig {
                dir: dir.display().to_string(),
            },
            origin: OriginConfig {
                base_url: "http://127.0.0.1:9".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                access_log: true,
                access_log_format: default_access_log_format(),
                access_log_file: None,
                error_log_file: None,
            },
            performance: PerformanceConfig {
                keep_alive: true,
                max_connections: None,
            },
            http: HttpConfig {
                server_name: "imgcache".to_string(),
                max_body_size: None,
            },
        }
    }
}

// Configuration module entry point
// Layers defaults, config file, environment and command line into one Config

mod state;
mod types;

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::Path;
use thiserror::Error;

use crate::cli::Cli;

// Re-export public types
pub use state::AppState;
pub use types::{Config, LoggingConfig};

const DEFAULT_CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "IMGCACHE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Load(#[from] config::ConfigError),
    #[error("missing required option '{flag}' (or '{key}' in the config file)")]
    Missing { key: &'static str, flag: &'static str },
    #[error("Cache directory does not exist: {0}")]
    CacheDirMissing(String),
    #[error("Cache path is not a directory: {0}")]
    CacheDirNotDirectory(String),
    #[error("Invalid address '{addr}': {reason}")]
    InvalidAddress { addr: String, reason: String },
}

impl Config {
    /// Load configuration: defaults < config file < `IMGCACHE_*` env < CLI flags
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let file = cli
            .config
            .as_deref()
            .map_or_else(|| DEFAULT_CONFIG_FILE.to_string(), |p| p.display().to_string());
        // An explicitly named file must exist
        let required = cli.config.is_some();

        let settings = config::Config::builder()
            .add_source(config::File::with_name(&file).required(required))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .set_default("origin.base_url", "https://http.cat")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive", true)?
            .set_default("http.server_name", "imgcache")?
            .set_override_option("server.host", cli.host.clone())?
            .set_override_option("server.port", cli.port.map(i64::from))?
            .set_override_option(
                "cache.dir",
                cli.cache.as_deref().map(|p| p.display().to_string()),
            )?
            .build()?;

        require(&settings, "server.host", "--host")?;
        require(&settings, "server.port", "--port")?;
        require(&settings, "cache.dir", "--cache")?;

        Ok(settings.try_deserialize()?)
    }

    /// Resolve the bind address; host may be an IP literal or a name
    pub fn get_socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let host = self.server.host.as_str();
        let invalid = |reason: String| ConfigError::InvalidAddress {
            addr: format!("{host}:{}", self.server.port),
            reason,
        };

        (host, self.server.port)
            .to_socket_addrs()
            .map_err(|e| invalid(e.to_string()))?
            .next()
            .ok_or_else(|| invalid("host resolved to no addresses".to_string()))
    }

    pub fn validate_cache_dir(&self) -> Result<(), ConfigError> {
        validate_cache_dir(Path::new(&self.cache.dir))
    }
}

fn require(
    settings: &config::Config,
    key: &'static str,
    flag: &'static str,
) -> Result<(), ConfigError> {
    match settings.get::<config::Value>(key) {
        Ok(_) => Ok(()),
        Err(config::ConfigError::NotFound(_)) => Err(ConfigError::Missing { key, flag }),
        Err(e) => Err(e.into()),
    }
}

/// The cache directory must already exist; it is never created
pub fn validate_cache_dir(path: &Path) -> Result<(), ConfigError> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(ConfigError::CacheDirNotDirectory(path.display().to_string())),
        Err(_) => Err(ConfigError::CacheDirMissing(path.display().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn cli_for(dir: &TempDir) -> Cli {
        Cli {
            host: Some("127.0.0.1".to_string()),
            port: Some(0),
            cache: Some(dir.path().to_path_buf()),
            config: None,
            help: None,
        }
    }

    #[test]
    fn test_load_from_cli_with_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::load(&cli_for(&dir)).unwrap();

        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 0);
        assert_eq!(cfg.cache.dir, dir.path().display().to_string());
        assert_eq!(cfg.origin.base_url, "https://http.cat");
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert_eq!(cfg.http.max_body_size, None);
        assert!(cfg.performance.keep_alive);
    }

    #[test]
    fn test_config_file_and_cli_override() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("imgcache.toml");
        std::fs::write(
            &file,
            r#"
[server]
host = "0.0.0.0"
port = 9000

[cache]
dir = "/srv/cache"

[origin]
base_url = "http://images.internal"

[http]
server_name = "edge"
max_body_size = 1024
"#,
        )
        .unwrap();

        let cli = Cli {
            port: Some(9100),
            config: Some(file),
            ..Cli::default()
        };
        let cfg = Config::load(&cli).unwrap();

        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 9100);
        assert_eq!(cfg.cache.dir, "/srv/cache");
        assert_eq!(cfg.origin.base_url, "http://images.internal");
        assert_eq!(cfg.http.server_name, "edge");
        assert_eq!(cfg.http.max_body_size, Some(1024));
    }

    #[test]
    fn test_missing_cache_option() {
        let cli = Cli {
            host: Some("127.0.0.1".to_string()),
            port: Some(8080),
            config: Some(PathBuf::from("/nonexistent/imgcache-test.toml")),
            ..Cli::default()
        };
        // Named config file is required, so this fails before the option check
        assert!(matches!(Config::load(&cli), Err(ConfigError::Load(_))));

        let dir = TempDir::new().unwrap();
        let empty = dir.path().join("empty.toml");
        std::fs::write(&empty, "").unwrap();
        let cli = Cli {
            host: Some("127.0.0.1".to_string()),
            port: Some(8080),
            config: Some(empty),
            ..Cli::default()
        };
        assert!(matches!(
            Config::load(&cli),
            Err(ConfigError::Missing { flag: "--cache", .. })
        ));
    }

    #[test]
    fn test_validate_cache_dir() {
        let dir = TempDir::new().unwrap();
        assert!(validate_cache_dir(dir.path()).is_ok());

        let file = dir.path().join("plain.txt");
        std::fs::write(&file, "x").unwrap();
        assert!(matches!(
            validate_cache_dir(&file),
            Err(ConfigError::CacheDirNotDirectory(_))
        ));
        assert!(matches!(
            validate_cache_dir(&dir.path().join("missing")),
            Err(ConfigError::CacheDirMissing(_))
        ));
    }

    #[test]
    fn test_socket_addr() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::load(&cli_for(&dir)).unwrap();
        cfg.server.port = 8080;
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "127.0.0.1:8080".parse::<SocketAddr>().unwrap()
        );

        cfg.server.host = "::1".to_string();
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "[::1]:8080".parse::<SocketAddr>().unwrap()
        );
    }
}

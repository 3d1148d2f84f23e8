use std::path::PathBuf;

use clap::{ArgAction, Parser};

/// Command line options
///
/// `-h` is taken by `--host`, so help is only available as `--help`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "imgcache",
    version,
    about = "Write-through HTTP cache for images addressed by numeric code",
    disable_help_flag = true
)]
pub struct Cli {
    /// Server host
    #[arg(short = 'h', long)]
    pub host: Option<String>,

    /// Server port
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Cache directory path (must already exist)
    #[arg(short = 'c', long = "cache")]
    pub cache: Option<PathBuf>,

    /// Configuration file (defaults to ./config.toml if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print help
    #[allow(dead_code)]
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_flags() {
        let cli = Cli::try_parse_from(["imgcache", "-h", "0.0.0.0", "-p", "3000", "-c", "./cache"])
            .unwrap();
        assert_eq!(cli.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(cli.port, Some(3000));
        assert_eq!(cli.cache, Some(PathBuf::from("./cache")));
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_long_flags() {
        let cli = Cli::try_parse_from([
            "imgcache",
            "--host",
            "localhost",
            "--port",
            "8081",
            "--cache",
            "/tmp/img",
            "--config",
            "prod.toml",
        ])
        .unwrap();
        assert_eq!(cli.host.as_deref(), Some("localhost"));
        assert_eq!(cli.config, Some(PathBuf::from("prod.toml")));
    }

    #[test]
    fn test_rejects_bad_port() {
        assert!(Cli::try_parse_from(["imgcache", "-p", "http"]).is_err());
        assert!(Cli::try_parse_from(["imgcache", "-p", "70000"]).is_err());
    }

    #[test]
    fn test_help_is_long_only() {
        let err = Cli::try_parse_from(["imgcache", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}

// Modemstat Exporter - Command line and environment configuration
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

use clap::Parser;
use modemstat::client::{DEFAULT_MODEM_ID, DEFAULT_MODEM_URL};
use modemstat::ModemConfig;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// Modemstat Prometheus Exporter
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Identifier reported in the modem_id label
    #[arg(long, env = "MODEM_ID", default_value = DEFAULT_MODEM_ID)]
    pub modem_id: String,

    /// Base URL of the device's web interface
    #[arg(long, env = "MODEM_URL", default_value = DEFAULT_MODEM_URL)]
    pub modem_url: String,

    /// Device access code
    #[arg(long, env = "MODEM_ACCESS_CODE")]
    pub modem_access_code: Option<String>,

    /// Host to listen on
    #[arg(long, env = "SERVER_HOSTNAME", default_value = "localhost")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "SERVER_PORT", default_value = "8666")]
    pub port: u16,

    /// Seconds a scraped page stays cached
    #[arg(long, env = "CACHE_SECONDS", default_value = "300")]
    pub cache_seconds: u64,

    /// Read saved device pages from this directory instead of the network
    #[arg(long, env = "PAGES_DIR")]
    pub pages_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    pub fn modem_config(&self) -> modemstat::Result<ModemConfig> {
        ModemConfig::new(
            self.modem_id.clone(),
            self.modem_url.clone(),
            self.modem_access_code.clone(),
        )
    }

    pub fn cache_duration(&self) -> Duration {
        Duration::from_secs(self.cache_seconds)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Map a `--log-level` value to a tracing level, defaulting to INFO
pub fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modemstat::ModemError;

    fn parse(args: &[&str]) -> Args {
        let mut argv = vec!["modemstat-exporter"];
        argv.extend_from_slice(args);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_explicit_flags() {
        let args = parse(&[
            "--modem-id",
            "upstairs",
            "--modem-url",
            "http://10.0.0.1",
            "--host",
            "0.0.0.0",
            "--port",
            "9100",
            "--cache-seconds",
            "30",
            "--pages-dir",
            "/var/lib/modemstat",
        ]);

        assert_eq!(args.bind_address(), "0.0.0.0:9100");
        assert_eq!(args.cache_duration(), Duration::from_secs(30));
        assert_eq!(args.pages_dir, Some(PathBuf::from("/var/lib/modemstat")));

        let config = args.modem_config().unwrap();
        assert_eq!(config.id, "upstairs");
        assert_eq!(config.url, "http://10.0.0.1");
    }

    #[test]
    fn test_empty_modem_id_is_rejected() {
        let args = parse(&["--modem-id", ""]);
        assert_eq!(
            args.modem_config(),
            Err(ModemError::Config("id is required".to_string()))
        );
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        assert!(Args::try_parse_from(["modemstat-exporter", "--port", "not-a-port"]).is_err());
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Level::DEBUG);
        assert_eq!(parse_level("WARN"), Level::WARN);
        assert_eq!(parse_level("verbose"), Level::INFO);
    }
}

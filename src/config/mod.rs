// Configuration module entry point
// Layers defaults, an optional config file, environment variables and the CLI port

mod types;

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::StartupError;

pub use types::{Config, FilesConfig, LoggingConfig, PerformanceConfig, ServerConfig};

/// Config file used when `OTA_CONFIG` is not set (extension optional)
pub const DEFAULT_CONFIG_PATH: &str = "ota-server";

/// Port used when neither the CLI nor the config sets one
pub const DEFAULT_PORT: u16 = 8080;

/// Root directory used when the config does not set one
pub const DEFAULT_ROOT: &str = "ota_files";

impl Config {
    /// Load configuration from `OTA_CONFIG` or the default file path
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::var("OTA_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path)
    }

    /// Load configuration from specified file path (without extension)
    /// A missing file is not an error, defaults and environment still apply
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("OTA")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", i64::from(DEFAULT_PORT))?
            .set_default("files.root", DEFAULT_ROOT)?
            .set_default("files.index_files", vec!["index.html", "index.htm"])?
            .set_default("files.directory_listing", true)?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "ota")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.header_read_timeout", 30)?
            .build()?;

        settings.try_deserialize()
    }

    /// Apply `program [port]` arguments (program name already skipped)
    pub fn apply_args<I>(&mut self, args: I) -> Result<(), StartupError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        if let Some(port) = args.next() {
            self.server.port = parse_port(&port)?;
        }
        if let Some(extra) = args.next() {
            return Err(StartupError::UnexpectedArgument(extra));
        }
        Ok(())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        let host = self.server.host.trim_start_matches('[').trim_end_matches(']');
        let ip: std::net::IpAddr = host
            .parse()
            .map_err(|e| format!("Invalid address '{}': {e}", self.server.host))?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    pub fn root_dir(&self) -> PathBuf {
        PathBuf::from(&self.files.root)
    }
}

fn parse_port(raw: &str) -> Result<u16, StartupError> {
    raw.trim()
        .parse::<u16>()
        .map_err(|_| StartupError::InvalidPort(raw.to_string()))
}

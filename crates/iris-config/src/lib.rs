use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Error
// ─────────────────────────────────────────────────────────────────────────────

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid port in {var}: {value}")]
    InvalidPort { var: &'static str, value: String },

    #[error("Invalid address in {var}: {value}")]
    InvalidAddress { var: &'static str, value: String },
}

// ─────────────────────────────────────────────────────────────────────────────
// Server Config
// ─────────────────────────────────────────────────────────────────────────────

pub const HOST_VAR: &str = "IRIS_HOST";
pub const PORT_VAR: &str = "IRIS_PORT";
pub const MODEL_PATH_VAR: &str = "IRIS_MODEL_PATH";
pub const LOG_VAR: &str = "IRIS_LOG";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MODEL_PATH: &str = "models/iris.json";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub model_path: PathBuf,
    pub log_filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: DEFAULT_PORT,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl ServerConfig {
    /// Reads the config from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable lookup. Unset or blank
    /// variables fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let host_str = get(HOST_VAR).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let host: IpAddr = host_str
            .parse()
            .map_err(|_| ConfigError::InvalidAddress { var: HOST_VAR, value: host_str.clone() })?;

        let port = match get(PORT_VAR) {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidPort { var: PORT_VAR, value })?,
            None => DEFAULT_PORT,
        };

        let model_path = get(MODEL_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH));

        let log_filter = get(LOG_VAR).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(Self { host, port, model_path, log_filter })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

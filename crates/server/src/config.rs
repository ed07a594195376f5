//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `PUNCHCARD_HOST` - Bind address (default: 127.0.0.1)
//! - `PUNCHCARD_PORT` - Listen port (default: 3000)
//! - `PUNCHCARD_SEED_PATH` - JSON seed file for the customer store;
//!   the built-in sample set is used when unset

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

const DEFAULT_PORT: u16 = 3000;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// IP address to bind the server to.
    pub host: IpAddr,
    /// Port to listen on.
    pub port: u16,
    /// Optional JSON seed file replacing the built-in sample customers.
    pub seed_path: Option<PathBuf>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnvVar`] if `PUNCHCARD_HOST` or
    /// `PUNCHCARD_PORT` cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = match std::env::var("PUNCHCARD_HOST") {
            Ok(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidEnvVar("PUNCHCARD_HOST".into(), value))?,
            Err(_) => IpAddr::V4(Ipv4Addr::LOCALHOST),
        };

        let port = match std::env::var("PUNCHCARD_PORT") {
            Ok(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidEnvVar("PUNCHCARD_PORT".into(), value))?,
            Err(_) => DEFAULT_PORT,
        };

        let seed_path = std::env::var("PUNCHCARD_SEED_PATH").ok().map(PathBuf::from);

        Ok(Self {
            host,
            port,
            seed_path,
        })
    }

    /// The socket address to bind.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            seed_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_socket_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
    }
}

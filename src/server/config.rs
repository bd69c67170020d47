//! Server configuration.

use std::fs;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;

use serde::Deserialize;

use crate::server::error::Error;
use crate::server::routes::{RouteEntry, RouteTable};

/// Server configuration.
///
/// Every field has a default, so a JSON file only needs the keys it changes:
///
/// ```json
/// { "addr": "0.0.0.0:4444", "routes": [{ "method": "GET", "path": "/" }] }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// The address to bind to.
    pub addr: SocketAddr,
    /// The maximum number of concurrent connections.
    pub max_connections: usize,
    /// Bytes requested from the socket per read.
    pub read_buffer_size: usize,
    /// Upper bound on the bytes buffered before the header block ends.
    pub max_request_size: usize,
    /// The routes requests are verified against.
    pub routes: Vec<RouteEntry>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 4444)),
            max_connections: 1024,
            read_buffer_size: 1024,
            max_request_size: 8192,
            routes: RouteTable::default_routes(),
        }
    }
}

impl ServerConfig {
    /// Parse and validate a configuration from JSON text.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: ServerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Reject settings the connection loop cannot work with.
    pub fn validate(&self) -> Result<(), Error> {
        if self.max_connections == 0 {
            return Err(Error::Config("max_connections must be at least 1".to_string()));
        }
        if self.read_buffer_size == 0 {
            return Err(Error::Config("read_buffer_size must be at least 1".to_string()));
        }
        if self.max_request_size < self.read_buffer_size {
            return Err(Error::Config(format!(
                "max_request_size ({}) is smaller than read_buffer_size ({})",
                self.max_request_size, self.read_buffer_size
            )));
        }
        if let Some(route) = self.routes.iter().find(|r| !r.path.starts_with('/')) {
            return Err(Error::Config(format!("route path must start with '/': {:?}", route.path)));
        }
        Ok(())
    }

    /// The route table described by this configuration.
    pub fn route_table(&self) -> RouteTable {
        RouteTable::new(self.routes.clone())
    }
}

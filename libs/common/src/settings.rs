//! HTTP server settings
//!
//! Layered with the `config` crate: built-in defaults first, then
//! `<PREFIX>_HOST` / `<PREFIX>_PORT` environment variables.

use anyhow::Result;
use config::{Config, Environment};
use serde::Deserialize;

/// Listener settings for one service
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    /// Load the settings for the service using `prefix` for its variables
    pub fn load(prefix: &str, default_port: u16) -> Result<Self> {
        let settings = Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", i64::from(default_port))?
            .add_source(Environment::with_prefix(prefix).try_parsing(true))
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }

    /// Address to bind the listener to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

//! Server configuration

use crate::cli::Cli;
use jobrec_classifiers::ModelConfig;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::Path;

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Classification model settings
    #[serde(default)]
    pub model: ModelConfig,
}

impl AppConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: &str, cli: &Cli) -> anyhow::Result<Self> {
        // Try to load from file, or use defaults
        let mut config = if Path::new(config_path).exists() {
            Self::from_file(config_path)?
        } else {
            tracing::debug!("No config file at {}, using defaults", config_path);
            Self::default()
        };

        config.apply_overrides(cli);
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply CLI overrides
    pub fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(model) = &cli.model {
            let overridden = ModelConfig::from_model_arg(model);
            self.model.source = overridden.source;
            self.model.name.clear();
        }

        if let Some(device) = cli.device {
            self.model.device = device;
        }

        if let Some(max_length) = cli.max_length {
            self.model.max_length = max_length;
        }

        if let Some(listen) = &cli.listen {
            self.server.listen = listen.clone();
        }

        if let Some(port) = cli.port {
            self.server.port = port;
        }
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest accepted request body
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let ip: IpAddr = self
            .listen
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid listen address '{}': {}", self.listen, e))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

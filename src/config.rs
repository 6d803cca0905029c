//! Configuration management for token-tool
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (tokens.toml)
//! - Environment variables (TOKENS__*)
//!
//! ## Example config file (tokens.toml):
//! ```toml
//! [registry]
//! snapshot = "./registry.json"
//! verify_checksum = true
//!
//! [client]
//! floor = "1.2.0"
//!
//! [output]
//! format = "pretty"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::version::SemanticVersion;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Registry snapshot settings
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Client floor used by `check`
    #[serde(default)]
    pub client: ClientConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Path to a registry snapshot (JSON)
    #[serde(default)]
    pub snapshot: Option<PathBuf>,

    /// Reject snapshots whose checksum does not match their content
    #[serde(default = "default_true")]
    pub verify_checksum: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Compatibility floor the client declares
    #[serde(default = "default_floor")]
    pub floor: SemanticVersion,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

impl OutputFormat {
    pub fn render(&self, value: &serde_json::Value) -> serde_json::Result<String> {
        match self {
            OutputFormat::Pretty => serde_json::to_string_pretty(value),
            OutputFormat::Compact => serde_json::to_string(value),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_floor() -> SemanticVersion {
    SemanticVersion::INITIAL
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            snapshot: None,
            verify_checksum: true,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { floor: default_floor() }
    }
}

impl TokenConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, with an explicit file layered over the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["tokens.toml", ".tokens.toml", "config/tokens.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "tokens", "token-schemas") {
            let xdg_config = config_dir.config_dir().join("tokens.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // TOKENS__CLIENT__FLOOR=1.2.0
        builder = builder.add_source(
            Environment::with_prefix("TOKENS")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Snapshot path, resolved against the current directory
    pub fn snapshot_path(&self) -> Option<PathBuf> {
        self.registry.snapshot.as_ref().map(|p| {
            if p.is_absolute() {
                p.clone()
            } else {
                std::env::current_dir().unwrap_or_default().join(p)
            }
        })
    }
}

//! Configuration management for `livemd.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── hub        # [hub]
//! │   └── serve      # [serve]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError
//! │   └── handle     # Global config handle
//! └── mod.rs         # AppConfig (this file)
//! ```
//!
//! The file is optional: without one every field takes its default.
//! CLI flags override file values.

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{DEFAULT_WS_PORT, HubConfig, ServeConfig};
pub use types::{ConfigDiagnostics, ConfigError, cfg, init_config};

use crate::{cli::Cli, log};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing livemd.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Absolute path to the config file, if one was found (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// HTTP and websocket servers
    #[serde(default)]
    pub serve: ServeConfig,

    /// Client queues and log replay
    #[serde(default)]
    pub hub: HubConfig,
}

impl AppConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd for the config file. A missing file
    /// means defaults; an unreadable or invalid one is an error.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = match find_config_file(&cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.config_path = Some(crate::utils::path::normalize_path(&path));
                config
            }
            None => {
                crate::debug!("config"; "no {} found, using defaults", cli.config.display());
                Self::default()
            }
        };

        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring: {}", display_path, fields.join(", "));
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply CLI overrides.
    fn apply_cli(&mut self, cli: &Cli) {
        Self::update_option(&mut self.serve.interface, cli.interface.as_ref());
        Self::update_option(&mut self.serve.port, cli.port.as_ref());
        Self::update_option(&mut self.serve.ws_port, cli.ws_port.as_ref());
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Collect every validation error and return them at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        if self.serve.port == 0 {
            diag.error("serve.port", "port must not be 0");
        }
        if self.serve.ws_port == 0 {
            diag.error("serve.ws_port", "port must not be 0");
        }
        if self.serve.port == self.serve.ws_port {
            diag.error_with_hint(
                "serve.ws_port",
                format!("same as serve.port ({})", self.serve.port),
                "the websocket server needs its own port",
            );
        }
        // The bootstrap alone is two messages
        if self.hub.client_queue < 2 {
            diag.error("hub.client_queue", "must be at least 2");
        }
        if self.hub.log_capacity == 0 {
            diag.error("hub.log_capacity", "must be at least 1");
        }
        if self.hub.write_timeout_ms == 0 {
            diag.error("hub.write_timeout_ms", "must be greater than 0");
        }

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

/// Parse a config snippet in tests, failing on unknown fields.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> AppConfig {
    let (parsed, ignored) = AppConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_from_str_invalid_toml() {
        // Invalid TOML syntax - unclosed bracket
        let result = AppConfig::parse_with_ignored("[serve\nport = 1");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.config_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[serve]\nport = 4000\nwatch = true\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = AppConfig::parse_with_ignored(content).unwrap();

        // Config should parse successfully
        assert_eq!(config.serve.port, 4000);

        // Unknown fields should be collected
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
        assert!(ignored.iter().any(|f| f.contains("watch")));
    }

    #[test]
    fn test_no_unknown_fields() {
        let (_, ignored) = AppConfig::parse_with_ignored("[hub]\nclient_queue = 8").unwrap();
        assert!(ignored.is_empty());
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut config = test_parse_config("[serve]\nport = 4000\nws_port = 4001");
        let cli = Cli::parse_from(["livemd", "--port", "5000", "-i", "0.0.0.0"]);
        config.apply_cli(&cli);

        assert_eq!(config.serve.port, 5000);
        assert_eq!(config.serve.ws_port, 4001);
        assert_eq!(config.serve.interface.to_string(), "0.0.0.0");
    }

    #[test]
    fn test_validation_collects_errors() {
        let config = test_parse_config(
            "[serve]\nport = 4000\nws_port = 4000\n[hub]\nclient_queue = 1\nwrite_timeout_ms = 0",
        );
        let err = config.validate().unwrap_err();
        match err.downcast_ref::<ConfigError>() {
            Some(ConfigError::Diagnostics(diag)) => {
                let fields: Vec<_> = diag.errors().iter().map(|d| d.field).collect();
                assert_eq!(
                    fields,
                    ["serve.ws_port", "hub.client_queue", "hub.write_timeout_ms"]
                );
            }
            other => panic!("expected diagnostics, got {other:?}"),
        }
    }

    #[test]
    fn test_load_from_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("livemd.toml");
        fs::write(&path, "[hub]\nlog_capacity = 50\n").unwrap();

        let config = AppConfig::from_path(&path).unwrap();
        assert_eq!(config.hub.log_capacity, 50);
        assert_eq!(config.serve.port, 3000);
    }

    #[test]
    fn test_load_unreadable_file() {
        let temp = tempfile::TempDir::new().unwrap();
        // A directory cannot be read as a file
        let err = AppConfig::from_path(temp.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Io(..))
        ));
    }
}

//! Configuration management for VLCBKit nodes
//!
//! Provides configuration file handling and validation.
//! Supports JSON and TOML file formats stored in platform-specific directories.
//!
//! Configuration is organized into logical sections:
//! - Node identity and module parameters
//! - Event table shape
//! - Persisted storage image location

use crate::error::{ConfigError, SettingsError, SettingsResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Largest number of event variables a slot may carry.
pub const MAX_EVS_PER_EVENT: u8 = 20;

/// Length of the module name reported by NAME.
pub const MODULE_NAME_LEN: usize = 7;

/// Node identity and module parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeSettings {
    /// Node number (0 while uninitialised)
    pub node_number: u16,
    /// CAN identifier, 1..=99
    pub can_id: u8,
    /// Module name without the "CAN" prefix, at most 7 ASCII characters
    pub module_name: String,
    /// Manufacturer id
    pub manufacturer_id: u8,
    /// Module type id
    pub module_id: u8,
    /// Major code version
    pub major_version: u8,
    /// Minor code version, conventionally a lower-case letter
    pub minor_version: char,
    /// Send heartbeats in normal mode
    pub heartbeat: bool,
}

impl Default for NodeSettings {
    fn default() -> Self {
        Self {
            node_number: 0,
            can_id: 1,
            module_name: "VLCBKIT".to_string(),
            manufacturer_id: 250,
            module_id: 1,
            major_version: 1,
            minor_version: 'a',
            heartbeat: true,
        }
    }
}

/// Event table shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventSettings {
    /// Number of event slots
    pub max_events: u8,
    /// Event variables per event
    pub num_evs: u8,
}

impl Default for EventSettings {
    fn default() -> Self {
        Self {
            max_events: 64,
            num_evs: 4,
        }
    }
}

/// Persisted storage settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Storage image file; events are kept in memory only when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_path: Option<PathBuf>,
    /// Address of the first event slot within the image
    pub base_address: usize,
}

/// Complete node configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Node identity
    pub node: NodeSettings,
    /// Event table
    pub events: EventSettings,
    /// Persisted storage
    pub storage: StorageSettings,
}

impl NodeConfig {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform configuration directory for VLCBKit
    pub fn config_dir() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("vlcbkit"))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no configuration directory on this platform".into())
            })
    }

    /// Default configuration file path
    pub fn default_path() -> SettingsResult<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("{}: {}", path.display(), e))
        })?;

        let config: Self = match Self::format_of(path)? {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("Loaded node configuration from {}", path.display());
        Ok(config)
    }

    /// Load config from `path` when it exists, otherwise use defaults
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::info!(
                "No configuration at {}, using defaults",
                path.display()
            );
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Self::format_of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        let node = &self.node;

        if !(1..=99).contains(&node.can_id) {
            return Err(ConfigError::ValueOutOfRange {
                key: "node.can_id".to_string(),
                value: node.can_id.to_string(),
            }
            .into());
        }

        if node.module_name.is_empty()
            || node.module_name.len() > MODULE_NAME_LEN
            || !node.module_name.is_ascii()
        {
            return Err(SettingsError::InvalidSetting {
                key: "node.module_name".to_string(),
                reason: format!("must be 1 to {} ASCII characters", MODULE_NAME_LEN),
            });
        }

        if !node.minor_version.is_ascii() {
            return Err(SettingsError::InvalidSetting {
                key: "node.minor_version".to_string(),
                reason: "must be an ASCII character".to_string(),
            });
        }

        if self.events.max_events == 0 {
            return Err(ConfigError::ValueOutOfRange {
                key: "events.max_events".to_string(),
                value: "0".to_string(),
            }
            .into());
        }

        if !(1..=MAX_EVS_PER_EVENT).contains(&self.events.num_evs) {
            return Err(ConfigError::ValueOutOfRange {
                key: "events.num_evs".to_string(),
                value: self.events.num_evs.to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Module name padded with spaces to the NAME frame width
    pub fn module_name_bytes(&self) -> [u8; MODULE_NAME_LEN] {
        let mut name = [b' '; MODULE_NAME_LEN];
        for (dst, src) in name.iter_mut().zip(self.node.module_name.bytes()) {
            *dst = src;
        }
        name
    }

    fn format_of(path: &Path) -> SettingsResult<Format> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Format::Json),
            Some("toml") => Ok(Format::Toml),
            other => Err(ConfigError::UnsupportedFormat(other.unwrap_or("").to_string()).into()),
        }
    }
}

enum Format {
    Json,
    Toml,
}

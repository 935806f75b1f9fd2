//! VLCBKit Settings Crate
//!
//! Handles node configuration files and their validation.

pub mod config;
pub mod error;

pub use config::{
    EventSettings, NodeConfig, NodeSettings, StorageSettings, MAX_EVS_PER_EVENT, MODULE_NAME_LEN,
};
pub use error::{ConfigError, SettingsError, SettingsResult};

//! Configuration management

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// HID device configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HidConfig {
    /// USB Vendor ID
    #[serde(default = "default_vendor_id")]
    pub vendor_id: u16,
    /// USB Product ID
    #[serde(default = "default_product_id")]
    pub product_id: u16,
    /// Number of physical buttons on the pad
    #[serde(default = "default_button_count")]
    pub button_count: u8,
    /// Initial reconnect attempt interval in milliseconds
    #[serde(default = "default_reconnect_interval")]
    pub reconnect_interval_ms: u64,
    /// Read timeout per poll in milliseconds
    #[serde(default = "default_read_timeout")]
    pub read_timeout_ms: i32,
}

fn default_vendor_id() -> u16 {
    0xF055
}
fn default_product_id() -> u16 {
    0xCAFE
}
fn default_button_count() -> u8 {
    12
}
fn default_reconnect_interval() -> u64 {
    500
}
fn default_read_timeout() -> i32 {
    200
}

impl Default for HidConfig {
    fn default() -> Self {
        Self {
            vendor_id: default_vendor_id(),
            product_id: default_product_id(),
            button_count: default_button_count(),
            reconnect_interval_ms: default_reconnect_interval(),
            read_timeout_ms: default_read_timeout(),
        }
    }
}

/// Panel WebSocket channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelConfig {
    /// TCP port the broadcast server listens on (loopback only)
    #[serde(default = "default_panel_port")]
    pub port: u16,
}

fn default_panel_port() -> u16 {
    9234
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            port: default_panel_port(),
        }
    }
}

/// Focus tracker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusConfig {
    /// Active-window poll interval in milliseconds
    #[serde(default = "default_focus_poll_interval")]
    pub poll_interval_ms: u64,
}

fn default_focus_poll_interval() -> u64 {
    1000
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_focus_poll_interval(),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HID device configuration
    #[serde(default)]
    pub hid: HidConfig,
    /// Panel channel configuration
    #[serde(default)]
    pub panel: PanelConfig,
    /// Focus tracker configuration
    #[serde(default)]
    pub focus: FocusConfig,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a specific file, falling back to defaults
    /// when the file does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "keydeck", "Keydeck")
            .context("Failed to determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.hid.vendor_id, 0xF055);
        assert_eq!(config.hid.product_id, 0xCAFE);
        assert_eq!(config.hid.button_count, 12);
        assert_eq!(config.panel.port, 9234);
        assert_eq!(config.focus.poll_interval_ms, 1000);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.hid.vendor_id, config.hid.vendor_id);
        assert_eq!(parsed.panel.port, config.panel.port);
    }

    #[test]
    fn test_config_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.panel.port = 9999;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.panel.port, 9999);
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.hid.vendor_id, 0xF055);
    }
}

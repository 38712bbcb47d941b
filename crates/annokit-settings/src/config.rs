//! Configuration for annokit
//!
//! Supports JSON and TOML file formats, chosen by file extension, stored in
//! the platform configuration directory by default.
//!
//! Configuration is organized into logical sections:
//! - Polygon tool tuning (radii, debounce, default style)
//! - Logging (level filter, JSON output)
//! - Event bus (channel capacity, history)

use annokit_core::EventBusConfig;
use annokit_polygon::{DrawingStyle, MachineOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{SettingsError, SettingsResult};

/// Polygon tool settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolygonSettings {
    /// Distance from the start point that closes a path, in screen pixels
    pub closable_radius: f64,
    /// Eraser reach, in screen pixels
    pub eraser_radius: f64,
    /// Quiet period before a magnetic-lasso trace, in milliseconds
    pub magnetic_debounce_ms: u64,
    /// Simplification tolerance of the final polygon, in image pixels
    pub optimize_tolerance: f64,
    /// Style of new paths
    pub default_style: DrawingStyle,
}

impl Default for PolygonSettings {
    fn default() -> Self {
        Self {
            closable_radius: 6.0,
            eraser_radius: 5.0,
            magnetic_debounce_ms: 250,
            optimize_tolerance: 1.0,
            default_style: DrawingStyle::Polygon,
        }
    }
}

impl PolygonSettings {
    /// Options for a polygon tool built from these settings
    pub fn machine_options(&self) -> MachineOptions {
        MachineOptions {
            closable_radius: self.closable_radius,
            eraser_radius: self.eraser_radius,
            debounce: Duration::from_millis(self.magnetic_debounce_ms),
            style: self.default_style,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is not set
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Event bus settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventSettings {
    pub channel_capacity: usize,
    pub enable_history: bool,
    pub max_history_size: usize,
}

impl Default for EventSettings {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
            enable_history: false,
            max_history_size: 1000,
        }
    }
}

impl EventSettings {
    /// Event bus configuration for these settings
    pub fn bus_config(&self) -> EventBusConfig {
        EventBusConfig {
            channel_capacity: self.channel_capacity,
            enable_history: self.enable_history,
            max_history_size: self.max_history_size,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Polygon tool tuning
    pub polygon: PolygonSettings,
    /// Logging preferences
    pub logging: LoggingSettings,
    /// Event bus sizing
    pub events: EventSettings,
}

enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> SettingsResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(SettingsError::UnsupportedFormat(
            other.unwrap_or("<none>").to_string(),
        )),
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path).map_err(SettingsError::read(path))?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("Loaded settings from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match format_of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(SettingsError::write(parent))?;
        }
        std::fs::write(path, content).map_err(SettingsError::write(path))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        let positive = |key: &str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(SettingsError::invalid(key, format!("must be > 0, got {}", value)))
            }
        };

        positive("polygon.closable_radius", self.polygon.closable_radius)?;
        positive("polygon.eraser_radius", self.polygon.eraser_radius)?;
        positive("polygon.optimize_tolerance", self.polygon.optimize_tolerance)?;

        if self.polygon.magnetic_debounce_ms == 0 {
            return Err(SettingsError::invalid(
                "polygon.magnetic_debounce_ms",
                "must be > 0",
            ));
        }

        if self.logging.level.trim().is_empty() {
            return Err(SettingsError::invalid("logging.level", "must not be empty"));
        }

        if self.events.channel_capacity == 0 {
            return Err(SettingsError::invalid("events.channel_capacity", "must be > 0"));
        }

        if self.events.max_history_size == 0 {
            return Err(SettingsError::invalid("events.max_history_size", "must be > 0"));
        }

        Ok(())
    }

    /// Default config file location: `<config dir>/annokit/config.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("annokit").join("config.toml"))
            .ok_or(SettingsError::NoConfigDirectory)
    }

    /// Load `path`, or the default location if `None`
    ///
    /// A missing file yields the defaults. An unreadable or invalid file is
    /// an error.
    pub fn load_or_default(path: Option<&Path>) -> SettingsResult<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Ok(path) => path,
                Err(error) => {
                    tracing::debug!("Using default settings: {}", error);
                    return Ok(Self::default());
                }
            },
        };

        if !path.exists() {
            tracing::debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from_file(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::new();
        assert!(config.validate().is_ok());
        assert_eq!(config.polygon.closable_radius, 6.0);
        assert_eq!(config.polygon.eraser_radius, 5.0);
        assert_eq!(config.polygon.magnetic_debounce_ms, 250);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.events.channel_capacity, 1024);
    }

    #[test]
    fn test_validate_rejects_bad_radius() {
        let mut config = Config::new();
        config.polygon.closable_radius = 0.0;
        assert!(matches!(
            config.validate(),
            Err(SettingsError::InvalidSetting { key, .. }) if key == "polygon.closable_radius"
        ));

        config.polygon.closable_radius = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let mut config = Config::new();
        config.events.channel_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_machine_options() {
        let mut settings = PolygonSettings::default();
        settings.default_style = DrawingStyle::MagneticLasso;
        settings.magnetic_debounce_ms = 100;

        let options = settings.machine_options();
        assert_eq!(options.style, DrawingStyle::MagneticLasso);
        assert_eq!(options.debounce, Duration::from_millis(100));
        assert_eq!(options.closable_radius, 6.0);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[polygon]\nclosable_radius = 8.0\n").unwrap();
        assert_eq!(config.polygon.closable_radius, 8.0);
        assert_eq!(config.polygon.eraser_radius, 5.0);
        assert_eq!(config.logging, LoggingSettings::default());
    }
}

//! annokit Settings Crate
//!
//! Handles application configuration: drawing tool tuning, logging and the
//! event bus, persisted as JSON or TOML.

pub mod config;
pub mod error;

pub use config::{Config, EventSettings, LoggingSettings, PolygonSettings};
pub use error::{SettingsError, SettingsResult};

//! Configuration Data Structures for Mobicomp Core.
//!
//! These structs are populated by deserializing `config.toml`. Every field has
//! a default from [`super::defaults`], and unknown fields are rejected via
//! `#[serde(deny_unknown_fields)]`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use super::defaults;

/// Configuration settings for the logging subsystem.
///
/// ```
/// use mobicomp_core::config::LoggingConfig;
/// use std::path::PathBuf;
///
/// let default_log_config = LoggingConfig::default();
/// assert_eq!(default_log_config.level, "info");
/// assert_eq!(default_log_config.file_path, None);
/// assert_eq!(default_log_config.format, "text");
///
/// let toml_str = r#"
/// level = "debug"
/// file_path = "/var/log/mobicomp.log"
/// format = "json"
/// "#;
/// let log_config: LoggingConfig = toml::from_str(toml_str).unwrap();
/// assert_eq!(log_config.level, "debug");
/// assert_eq!(log_config.file_path, Some(PathBuf::from("/var/log/mobicomp.log")));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Minimum log level: "trace", "debug", "info", "warn" or "error"
    /// (case-insensitive).
    #[serde(default = "defaults::default_log_level")]
    pub level: String,
    /// Optional log file. Relative paths are resolved against the application's
    /// state directory.
    #[serde(default = "defaults::default_log_file_path")]
    pub file_path: Option<PathBuf>,
    /// "text" or "json".
    #[serde(default = "defaults::default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        defaults::default_logging_config()
    }
}

/// Raster compositing settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RasterConfig {
    /// Bits per pixel of window backing stores: 16 (RGB565) or 32
    /// (premultiplied ARGB32).
    #[serde(default = "defaults::default_image_depth")]
    pub image_depth: u32,
}

impl Default for RasterConfig {
    fn default() -> Self {
        defaults::default_raster_config()
    }
}

/// The display registered at startup, before the platform reports metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DisplayConfig {
    #[serde(default = "defaults::default_display_id")]
    pub id: i32,
    #[serde(default = "defaults::default_display_name")]
    pub name: String,
    #[serde(default = "defaults::default_physical_width_mm")]
    pub physical_width_mm: f64,
    #[serde(default = "defaults::default_physical_height_mm")]
    pub physical_height_mm: f64,
    #[serde(default = "defaults::default_scaled_density")]
    pub scaled_density: f64,
    #[serde(default = "defaults::default_density")]
    pub density: f64,
    /// Logical width in pixels.
    #[serde(default = "defaults::default_display_width")]
    pub width: u32,
    /// Logical height in pixels.
    #[serde(default = "defaults::default_display_height")]
    pub height: u32,
    #[serde(default = "defaults::default_display_width")]
    pub available_width: u32,
    #[serde(default = "defaults::default_display_height")]
    pub available_height: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        defaults::default_display_config()
    }
}

/// Root configuration structure.
///
/// ```
/// use mobicomp_core::config::CoreConfig;
///
/// let toml_str = r#"
/// [logging]
/// level = "warn"
///
/// [raster]
/// image_depth = 16
/// "#;
/// let loaded: CoreConfig = toml::from_str(toml_str).unwrap();
/// assert_eq!(loaded.logging.level, "warn");
/// assert_eq!(loaded.raster.image_depth, 16);
/// assert_eq!(loaded.display.name, "INTERNAL");
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoreConfig {
    #[serde(default = "defaults::default_logging_config")]
    pub logging: LoggingConfig,
    #[serde(default = "defaults::default_raster_config")]
    pub raster: RasterConfig,
    #[serde(default = "defaults::default_display_config")]
    pub display: DisplayConfig,
}

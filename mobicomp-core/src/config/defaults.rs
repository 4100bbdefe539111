//! Default configuration values for Mobicomp Core.
//!
//! These functions are used by `serde`'s `default` attribute in the configuration
//! structures to provide sensible default values when they are not specified in
//! the configuration file.

use crate::config::{DisplayConfig, LoggingConfig, RasterConfig};
use std::path::PathBuf;

/// Returns the default `LoggingConfig`.
///
/// Used by `CoreConfig` if the `logging` section is missing from `config.toml`.
pub(crate) fn default_logging_config() -> LoggingConfig {
    LoggingConfig {
        level: default_log_level(),
        file_path: default_log_file_path(),
        format: default_log_format(),
    }
}

/// Returns the default log level string (`"info"`).
pub(crate) fn default_log_level() -> String {
    "info".to_string()
}

/// Returns the default log file path (`None`, no log file).
pub(crate) fn default_log_file_path() -> Option<PathBuf> {
    None
}

/// Returns the default log format string (`"text"`).
pub(crate) fn default_log_format() -> String {
    "text".to_string()
}

pub(crate) fn default_raster_config() -> RasterConfig {
    RasterConfig {
        image_depth: default_image_depth(),
    }
}

/// 32 bits per pixel: premultiplied ARGB32 backing stores.
pub(crate) fn default_image_depth() -> u32 {
    32
}

/// Returns the default `DisplayConfig`, the built-in display assumed until the
/// platform reports real metrics.
pub(crate) fn default_display_config() -> DisplayConfig {
    DisplayConfig {
        id: default_display_id(),
        name: default_display_name(),
        physical_width_mm: default_physical_width_mm(),
        physical_height_mm: default_physical_height_mm(),
        scaled_density: default_scaled_density(),
        density: default_density(),
        width: default_display_width(),
        height: default_display_height(),
        available_width: default_display_width(),
        available_height: default_display_height(),
    }
}

pub(crate) fn default_display_id() -> i32 {
    0
}

pub(crate) fn default_display_name() -> String {
    "INTERNAL".to_string()
}

pub(crate) fn default_physical_width_mm() -> f64 {
    50.0
}

pub(crate) fn default_physical_height_mm() -> f64 {
    71.0
}

pub(crate) fn default_scaled_density() -> f64 {
    0.0
}

pub(crate) fn default_density() -> f64 {
    1.0
}

pub(crate) fn default_display_width() -> u32 {
    320
}

pub(crate) fn default_display_height() -> u32 {
    455
}

//! Configuration Loading for Mobicomp Core.
//!
//! [`ConfigLoader`] locates `config.toml`, deserializes it, applies environment
//! overrides and validates the result.
//!
//! ## Validation
//!
//! - Log level and format are normalized to lower case and checked.
//! - Relative log file paths are resolved against the application state
//!   directory, and the parent directory of the log file is created.
//! - The raster image depth must be 16 or 32.
//! - The startup display's available geometry must fit inside its logical size.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::CoreConfig;
use crate::error::{ConfigError, CoreError};
use crate::utils::fs as mobi_fs;
use crate::utils::paths::{get_app_config_dir, get_app_state_dir};

/// Overrides the location of `config.toml`.
pub const CONFIG_PATH_ENV: &str = "MOBICOMP_CONFIG";
/// Overrides `raster.image_depth` when it holds `16` or `32`.
pub const RASTER_IMAGE_DEPTH_ENV: &str = "MOBICOMP_RASTER_IMAGE_DEPTH";

const CONFIG_FILE_NAME: &str = "config.toml";

/// Namespace for the configuration loading logic.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads and validates the `CoreConfig` for the application.
    ///
    /// The file is `$MOBICOMP_CONFIG` when set, otherwise `config.toml` in
    /// the application config directory. A missing file yields the default
    /// configuration; any other read error is a [`ConfigError::ReadError`].
    pub fn load() -> Result<CoreConfig, CoreError> {
        let path = match env::var_os(CONFIG_PATH_ENV) {
            Some(p) => PathBuf::from(p),
            None => get_app_config_dir()?.join(CONFIG_FILE_NAME),
        };
        Self::load_from_path(&path)
    }

    /// Loads and validates the configuration stored at `path`.
    pub fn load_from_path(path: &Path) -> Result<CoreConfig, CoreError> {
        let mut config = match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No configuration file, using defaults");
                CoreConfig::default()
            }
            Err(e) => {
                return Err(CoreError::Config(ConfigError::ReadError {
                    path: path.to_path_buf(),
                    source: e,
                }));
            }
        };

        Self::apply_depth_override(&mut config, env::var(RASTER_IMAGE_DEPTH_ENV).ok().as_deref());
        Self::validate_config(&mut config)?;
        Ok(config)
    }

    /// Parses and validates TOML text. Environment overrides are not applied.
    pub fn load_from_str(content: &str) -> Result<CoreConfig, CoreError> {
        let mut config = Self::parse(content)?;
        Self::validate_config(&mut config)?;
        Ok(config)
    }

    fn parse(content: &str) -> Result<CoreConfig, CoreError> {
        if content.trim().is_empty() {
            return Ok(CoreConfig::default());
        }
        toml::from_str(content).map_err(|e| CoreError::Config(ConfigError::ParseError(e)))
    }

    /// Applies a raster depth override. Only `16` and `32` are honored; other
    /// values are ignored with a warning.
    pub fn apply_depth_override(config: &mut CoreConfig, value: Option<&str>) {
        let Some(raw) = value else { return };
        match raw.trim().parse::<u32>() {
            Ok(depth @ (16 | 32)) => config.raster.image_depth = depth,
            _ => tracing::warn!(value = raw, "Ignoring {}: expected 16 or 32", RASTER_IMAGE_DEPTH_ENV),
        }
    }

    fn validate_config(config: &mut CoreConfig) -> Result<(), CoreError> {
        let level_lower = config.logging.level.to_lowercase();
        match level_lower.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {
                config.logging.level = level_lower;
            }
            _ => {
                return Err(CoreError::Config(ConfigError::ValidationError(format!(
                    "Invalid log level: '{}'. Must be one of trace, debug, info, warn, error.",
                    config.logging.level
                ))));
            }
        }

        let format_lower = config.logging.format.to_lowercase();
        match format_lower.as_str() {
            "text" | "json" => {
                config.logging.format = format_lower;
            }
            _ => {
                return Err(CoreError::Config(ConfigError::ValidationError(format!(
                    "Invalid log format: '{}'. Must be one of text, json.",
                    config.logging.format
                ))));
            }
        }

        if let Some(file_path) = &config.logging.file_path {
            let absolute_path = if file_path.is_absolute() {
                file_path.clone()
            } else {
                get_app_state_dir()?.join(file_path)
            };
            if let Some(parent_dir) = absolute_path.parent() {
                if !parent_dir.exists() {
                    mobi_fs::ensure_directory_exists(parent_dir)?;
                }
            }
            config.logging.file_path = Some(absolute_path);
        }

        if !matches!(config.raster.image_depth, 16 | 32) {
            return Err(CoreError::Config(ConfigError::ValidationError(format!(
                "Invalid raster image_depth: {}. Must be 16 or 32.",
                config.raster.image_depth
            ))));
        }

        let display = &config.display;
        if display.available_width > display.width || display.available_height > display.height {
            return Err(CoreError::Config(ConfigError::ValidationError(format!(
                "Display {} available geometry {}x{} exceeds its size {}x{}.",
                display.id, display.available_width, display.available_height, display.width, display.height
            ))));
        }

        Ok(())
    }
}

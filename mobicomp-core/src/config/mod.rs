//! Configuration Management for Mobicomp Core.
//!
//! - [`types`]: the configuration schema ([`CoreConfig`] and its sections).
//! - [`defaults`]: default values referenced by the serde attributes.
//! - [`loader`]: [`ConfigLoader`], which locates, parses and validates
//!   `config.toml`.
//!
//! ## Loading
//!
//! 1. `ConfigLoader::load()` resolves the file: `$MOBICOMP_CONFIG` if set,
//!    otherwise `config.toml` in the application config directory.
//! 2. A missing file yields `CoreConfig::default()`.
//! 3. TOML content is parsed; errors become [`crate::error::ConfigError::ParseError`].
//! 4. Environment overrides are applied (`MOBICOMP_RASTER_IMAGE_DEPTH`).
//! 5. Validation normalizes and checks values; failures become
//!    [`crate::error::ConfigError::ValidationError`].
//!
//! ```rust,ignore
//! use mobicomp_core::config::ConfigLoader;
//!
//! match ConfigLoader::load() {
//!     Ok(config) => println!("Raster depth: {}", config.raster.image_depth),
//!     Err(e) => {
//!         mobicomp_core::logging::init_minimal_logging();
//!         tracing::error!("Configuration loading failed: {}", e);
//!     }
//! }
//! ```

pub mod defaults;
pub mod types;
pub mod loader;

pub use types::{CoreConfig, DisplayConfig, LoggingConfig, RasterConfig};
pub use loader::{ConfigLoader, CONFIG_PATH_ENV, RASTER_IMAGE_DEPTH_ENV};

//! # Mobicomp Core Library (`mobicomp-core`)
//!
//! `mobicomp-core` is the foundational library of the Mobicomp raster compositor.
//! It provides the data types and ambient services every other crate in the
//! workspace builds on.
//!
//! ## Purpose
//!
//! - **Error Handling**: A unified error system through the `CoreError` enum and its
//!   associated specific error types like `ConfigError` and `LoggingError`.
//! - **Core Data Types**: Integer geometry (`PointInt`, `SizeInt`, `RectInt`), the
//!   generic `Size<T>` used for physical measurements, the per-display
//!   `DisplayDescriptor` and its `DisplayRegistry`, screen orientation and
//!   application state.
//! - **Configuration Management**: TOML-based loading and validation of `CoreConfig`
//!   through `ConfigLoader`.
//! - **Logging**: A logging setup built on top of the `tracing` crate, configurable
//!   for console and file output in text or JSON format.
//! - **Utility Functions**: Filesystem and XDG path helpers.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mobicomp_core::config::ConfigLoader;
//! use mobicomp_core::logging::initialize_logging;
//! use mobicomp_core::error::CoreError;
//!
//! fn main() -> Result<(), CoreError> {
//!     let core_config = ConfigLoader::load()?;
//!     initialize_logging(&core_config.logging, false)?;
//!     tracing::info!("Mobicomp core initialized.");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod types;
pub mod config;
pub mod logging;
pub mod utils;

// Re-export key types for convenience
pub use error::{CoreError, ConfigError, LoggingError};
pub use types::{
    ApplicationState, DisplayDescriptor, DisplayId, DisplayRegistry, PointInt, RectInt,
    ScreenOrientation, Size, SizeInt,
};
pub use config::{ConfigLoader, CoreConfig, DisplayConfig, LoggingConfig, RasterConfig};
pub use logging::{init_minimal_logging, initialize_logging, shutdown_logging};

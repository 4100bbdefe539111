//! Error type of the compositor layer.
//!
//! Per-frame failures (surface not ready, lock or post failure) are not errors
//! here: they are reported as [`crate::compositor::RedrawOutcome`] values and
//! retried on the next damage event.

use mobicomp_buffer_manager::NativeError;
use mobicomp_core::error::CoreError;
use mobicomp_core::types::DisplayId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompositorError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Native(#[from] NativeError),

    /// No rendering is possible at all; callers are expected to exit.
    #[error("Display initialization failed: {0}")]
    DisplayInit(String),

    #[error("No compositor for display {0}")]
    UnknownDisplay(DisplayId),
}

pub type Result<T, E = CompositorError> = std::result::Result<T, E>;

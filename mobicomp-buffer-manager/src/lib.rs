//! # Mobicomp Buffer Manager
//!
//! Pixel-level building blocks of the compositor: pixel formats and their
//! native format codes, owned raster [`Image`]s with source-replace blits, and
//! the reference-counted [`NativeSurfaceHandle`] through which composited
//! frames reach the display.

pub mod format;
pub mod image;
pub mod native;

pub use format::PixelFormat;
pub use image::{Image, ImageError, SharedImage, TRANSPARENT};
pub use native::{NativeBuffer, NativeError, NativeRect, NativeSurfaceHandle, NativeWindow, SurfaceId};

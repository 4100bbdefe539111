//! Native surface handles.
//!
//! A native window is the platform-provided pixel target a compositor presents
//! into. It is reached through a reference-counted [`NativeSurfaceHandle`]:
//! cloning the handle acquires a reference, dropping it releases one.

use std::fmt;
use std::sync::Arc;

use mobicomp_core::types::RectInt;
use thiserror::Error;

use crate::format::PixelFormat;
use crate::image::{Image, ImageError};

/// Provider-assigned id of a native surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub i32);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error)]
pub enum NativeError {
    #[error("Failed to lock native window: {0}")]
    LockFailed(String),
    #[error("Failed to post native buffer: {0}")]
    PostFailed(String),
    #[error("Native buffer layout is invalid: {0}")]
    InvalidBuffer(#[from] ImageError),
}

/// Edge rectangle in native window coordinates. `right` and `bottom` are
/// exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NativeRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl NativeRect {
    pub fn width(&self) -> u32 {
        (self.right - self.left).max(0) as u32
    }

    pub fn height(&self) -> u32 {
        (self.bottom - self.top).max(0) as u32
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

impl From<RectInt> for NativeRect {
    fn from(rect: RectInt) -> Self {
        NativeRect {
            left: rect.left(),
            top: rect.top(),
            right: rect.right(),
            bottom: rect.bottom(),
        }
    }
}

impl From<NativeRect> for RectInt {
    fn from(rect: NativeRect) -> Self {
        RectInt::from_edges(rect.left, rect.top, rect.right, rect.bottom)
    }
}

/// A locked native buffer covering the whole window.
///
/// `bounds` is the area the caller must repaint. A native window may enlarge
/// the requested area, never shrink it. Pixels outside `bounds` hold the
/// previous frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeBuffer {
    pub width: u32,
    pub height: u32,
    /// Row length in pixels.
    pub stride: u32,
    /// Raw native format code, see [`crate::format`].
    pub format: i32,
    pub bounds: NativeRect,
    pub bits: Vec<u8>,
}

impl NativeBuffer {
    pub fn pixel_format(&self) -> PixelFormat {
        PixelFormat::from_native_code(self.format)
    }

    /// Moves the pixels into an [`Image`] for painting. Hand them back with
    /// [`NativeBuffer::restore`].
    pub fn take_image(&mut self) -> Result<Image, ImageError> {
        let format = self.pixel_format();
        let stride = self.stride as usize * format.bytes_per_pixel();
        Image::wrap(self.width, self.height, stride, format, std::mem::take(&mut self.bits))
    }

    pub fn restore(&mut self, image: Image) {
        self.bits = image.into_bytes();
    }
}

/// The platform's native drawing target.
pub trait NativeWindow: Send + Sync {
    /// Locks the buffer for `bounds`, which must not be empty.
    fn lock(&self, bounds: &NativeRect) -> Result<NativeBuffer, NativeError>;

    /// Unlocks the buffer and queues it for display.
    fn unlock_and_post(&self, buffer: NativeBuffer) -> Result<(), NativeError>;

    /// Unlocks the buffer without presenting it. The window keeps showing
    /// its previous frame.
    fn unlock(&self, buffer: NativeBuffer);
}

/// Reference-counted handle to a native window.
#[derive(Clone)]
pub struct NativeSurfaceHandle {
    window: Arc<dyn NativeWindow>,
}

impl NativeSurfaceHandle {
    pub fn new(window: Arc<dyn NativeWindow>) -> Self {
        Self { window }
    }

    pub fn window(&self) -> &dyn NativeWindow {
        self.window.as_ref()
    }

    /// Live references to the underlying window, this handle included.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.window)
    }

    /// True when both handles refer to the same native window.
    pub fn same_window(&self, other: &NativeSurfaceHandle) -> bool {
        Arc::ptr_eq(&self.window, &other.window)
    }
}

impl fmt::Debug for NativeSurfaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeSurfaceHandle")
            .field("window", &Arc::as_ptr(&self.window))
            .field("ref_count", &self.ref_count())
            .finish()
    }
}

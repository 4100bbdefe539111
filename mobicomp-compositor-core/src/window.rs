//! Windows as seen by the compositor, and the outer windowing system.
//!
//! Windows are owned by the windowing toolkit. The compositor only queries
//! them through [`PlatformWindow`] and reports stacking and geometry changes
//! back through [`WindowSystem`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bitflags::bitflags;
use mobicomp_buffer_manager::SharedImage;
use mobicomp_core::types::{ApplicationState, DisplayId, RectInt};

/// Process-unique window identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(u64);

impl WindowId {
    /// Creates a new, unique `WindowId`.
    pub fn new_unique() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        WindowId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowKind {
    Normal,
    Popup,
    Dialog,
    Tool,
    /// A window created by another process and embedded here.
    Foreign,
    Other,
}

impl WindowKind {
    /// Kinds that can become the top window and receive activation.
    pub fn is_top_candidate(&self) -> bool {
        matches!(self, WindowKind::Normal | WindowKind::Popup | WindowKind::Dialog)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WindowFlags: u32 {
        /// Contents are drawn by the CPU into a backing store.
        const RASTER = 1 << 0;
        /// The window is a child of another window.
        const HAS_PARENT = 1 << 1;
        /// Rendering is delegated to the accelerated composer; the raster
        /// pass skips the window.
        const COMPOSITING = 1 << 2;
    }
}

/// A window owned by the outer windowing toolkit.
pub trait PlatformWindow: Send + Sync {
    fn id(&self) -> WindowId;
    fn kind(&self) -> WindowKind;
    fn flags(&self) -> WindowFlags;
    /// Screen-space geometry.
    fn geometry(&self) -> RectInt;
    fn is_visible(&self) -> bool;
    /// The raster backing store, sized like the window, if one exists.
    fn backing_store(&self) -> Option<SharedImage>;
    fn application_state_changed(&self, state: ApplicationState);
    /// Re-applies the window's status bar policy after it became the top window.
    fn update_status_bar_visibility(&self);

    fn is_raster(&self) -> bool {
        self.flags().contains(WindowFlags::RASTER)
    }

    fn has_parent(&self) -> bool {
        self.flags().contains(WindowFlags::HAS_PARENT)
    }

    fn is_compositing(&self) -> bool {
        self.flags().contains(WindowFlags::COMPOSITING)
    }
}

pub type WindowHandle = Arc<dyn PlatformWindow>;

/// The windowing toolkit the compositor reports to.
pub trait WindowSystem: Send + Sync {
    /// Every live top-level window, on any display.
    fn all_windows(&self) -> Vec<WindowHandle>;
    fn handle_window_activated(&self, window: Option<WindowId>);
    /// Tells the menu integration which window owns the menu bar.
    fn set_active_top_level_window(&self, window: Option<WindowId>);
    fn handle_screen_geometry_change(&self, display: DisplayId, geometry: RectInt, available: RectInt);
    /// `exposed` is in window-local coordinates.
    fn handle_expose_event(&self, window: WindowId, exposed: RectInt);
    fn resize_maximized_windows(&self, display: DisplayId);
}

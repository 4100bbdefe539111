//! The per-display window stack.
//!
//! Entries are ordered front to back. The stack never holds a duplicate and
//! never holds a raster window that has a parent; such windows are painted
//! through their parent's backing store.

use std::sync::atomic::{AtomicUsize, Ordering};

use mobicomp_core::types::PointInt;

use crate::window::{PlatformWindow, WindowHandle, WindowId};

/// Whether `window` may live in a window stack at all.
pub fn accepts(window: &dyn PlatformWindow) -> bool {
    !(window.has_parent() && window.is_raster())
}

#[derive(Default)]
pub struct WindowStack {
    entries: Vec<WindowHandle>,
    raster_surfaces: AtomicUsize,
}

impl WindowStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Front-to-back iteration.
    pub fn iter(&self) -> impl Iterator<Item = &WindowHandle> {
        self.entries.iter()
    }

    pub fn ids(&self) -> Vec<WindowId> {
        self.entries.iter().map(|w| w.id()).collect()
    }

    pub fn position(&self, id: WindowId) -> Option<usize> {
        self.entries.iter().position(|w| w.id() == id)
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.position(id).is_some()
    }

    /// Number of raster windows in the stack.
    pub fn raster_surfaces(&self) -> usize {
        self.raster_surfaces.load(Ordering::Acquire)
    }

    /// Inserts at the front. Returns false, leaving the stack unchanged, for
    /// windows the stack does not accept or already holds.
    pub fn push_front(&mut self, window: WindowHandle) -> bool {
        if !accepts(window.as_ref()) || self.contains(window.id()) {
            return false;
        }
        if window.is_raster() {
            self.raster_surfaces.fetch_add(1, Ordering::AcqRel);
        }
        self.entries.insert(0, window);
        true
    }

    pub fn remove(&mut self, id: WindowId) -> Option<WindowHandle> {
        let index = self.position(id)?;
        let window = self.entries.remove(index);
        if window.is_raster() {
            self.raster_surfaces.fetch_sub(1, Ordering::AcqRel);
        }
        Some(window)
    }

    /// Moves the window to the front. No-op if absent or already in front.
    pub fn raise(&mut self, id: WindowId) -> bool {
        match self.position(id) {
            Some(index) if index > 0 => {
                let window = self.entries.remove(index);
                self.entries.insert(0, window);
                true
            }
            _ => false,
        }
    }

    /// Moves the window to the back. No-op if absent or already last.
    pub fn lower(&mut self, id: WindowId) -> bool {
        match self.position(id) {
            Some(index) if index + 1 < self.entries.len() => {
                let window = self.entries.remove(index);
                self.entries.push(window);
                true
            }
            _ => false,
        }
    }

    /// The front-most window whose kind can take activation.
    pub fn top_window(&self) -> Option<&WindowHandle> {
        self.entries.iter().find(|w| w.kind().is_top_candidate())
    }

    /// The front-most visible window containing `point`.
    pub fn top_level_at(&self, point: PointInt) -> Option<&WindowHandle> {
        self.entries
            .iter()
            .find(|w| w.is_visible() && w.geometry().contains_point(point))
    }

    /// Whether the raster pass has anything to paint.
    pub fn has_visible_raster_windows(&self) -> bool {
        self.entries.iter().any(|w| Self::is_painted(w.as_ref()))
    }

    /// Windows the raster pass paints: visible, raster-backed, not delegated
    /// to the accelerated composer.
    pub fn is_painted(window: &dyn PlatformWindow) -> bool {
        window.is_visible() && window.is_raster() && !window.is_compositing()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessWindow;
    use crate::window::{WindowFlags, WindowKind};
    use mobicomp_core::types::RectInt;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn window(kind: WindowKind, flags: WindowFlags, geometry: RectInt) -> Arc<HeadlessWindow> {
        Arc::new(HeadlessWindow::new(kind, flags, geometry))
    }

    fn raster(geometry: RectInt) -> Arc<HeadlessWindow> {
        window(WindowKind::Normal, WindowFlags::RASTER, geometry)
    }

    #[test]
    fn test_push_front_orders_front_to_back() {
        let mut stack = WindowStack::new();
        let a = raster(RectInt::from_coords(0, 0, 10, 10));
        let b = raster(RectInt::from_coords(0, 0, 10, 10));
        assert!(stack.push_front(a.clone()));
        assert!(stack.push_front(b.clone()));
        assert_eq!(stack.ids(), vec![b.id(), a.id()]);
        assert_eq!(stack.raster_surfaces(), 2);
    }

    #[test]
    fn test_rejects_duplicates_and_parented_raster() {
        let mut stack = WindowStack::new();
        let a = raster(RectInt::from_coords(0, 0, 10, 10));
        let child = window(
            WindowKind::Normal,
            WindowFlags::RASTER | WindowFlags::HAS_PARENT,
            RectInt::from_coords(0, 0, 5, 5),
        );
        let gl_child = window(WindowKind::Normal, WindowFlags::HAS_PARENT, RectInt::from_coords(0, 0, 5, 5));
        assert!(stack.push_front(a.clone()));
        assert!(!stack.push_front(a.clone()));
        assert!(!stack.push_front(child.clone()));
        assert!(stack.push_front(gl_child.clone()));
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.raster_surfaces(), 1);
    }

    #[test]
    fn test_remove_updates_counter() {
        let mut stack = WindowStack::new();
        let a = raster(RectInt::from_coords(0, 0, 10, 10));
        let gl = window(WindowKind::Normal, WindowFlags::empty(), RectInt::from_coords(0, 0, 10, 10));
        stack.push_front(a.clone());
        stack.push_front(gl.clone());
        assert!(stack.remove(gl.id()).is_some());
        assert_eq!(stack.raster_surfaces(), 1);
        assert!(stack.remove(a.id()).is_some());
        assert_eq!(stack.raster_surfaces(), 0);
        assert!(stack.remove(a.id()).is_none());
        assert_eq!(stack.raster_surfaces(), 0);
    }

    #[test]
    fn test_raise_and_lower_edges_are_noops() {
        let mut stack = WindowStack::new();
        let a = raster(RectInt::from_coords(0, 0, 10, 10));
        let b = raster(RectInt::from_coords(0, 0, 10, 10));
        let c = raster(RectInt::from_coords(0, 0, 10, 10));
        for w in [&a, &b, &c] {
            stack.push_front(w.clone());
        }
        // [c, b, a]
        assert!(!stack.raise(c.id()));
        assert!(!stack.lower(a.id()));
        assert_eq!(stack.ids(), vec![c.id(), b.id(), a.id()]);

        assert!(stack.raise(a.id()));
        assert_eq!(stack.ids(), vec![a.id(), c.id(), b.id()]);
        assert!(stack.lower(a.id()));
        assert_eq!(stack.ids(), vec![c.id(), b.id(), a.id()]);

        let stranger = WindowId::new_unique();
        assert!(!stack.raise(stranger));
        assert!(!stack.lower(stranger));
    }

    #[test]
    fn test_top_window_skips_non_candidates() {
        let mut stack = WindowStack::new();
        assert!(stack.top_window().is_none());
        let normal = raster(RectInt::from_coords(0, 0, 10, 10));
        let tool = window(WindowKind::Tool, WindowFlags::RASTER, RectInt::from_coords(0, 0, 10, 10));
        stack.push_front(normal.clone());
        stack.push_front(tool.clone());
        assert_eq!(stack.top_window().map(|w| w.id()), Some(normal.id()));
        stack.remove(normal.id());
        assert!(stack.top_window().is_none());
    }

    #[test]
    fn test_top_level_at_respects_visibility() {
        let mut stack = WindowStack::new();
        let back = raster(RectInt::from_coords(0, 0, 100, 100));
        let front = raster(RectInt::from_coords(10, 10, 20, 20));
        stack.push_front(back.clone());
        stack.push_front(front.clone());
        let p = PointInt::new(15, 15);
        assert_eq!(stack.top_level_at(p).map(|w| w.id()), Some(front.id()));
        front.set_visible(false);
        assert_eq!(stack.top_level_at(p).map(|w| w.id()), Some(back.id()));
        assert!(stack.top_level_at(PointInt::new(100, 100)).is_none());
    }

    #[test]
    fn test_has_visible_raster_windows() {
        let mut stack = WindowStack::new();
        let gl = window(WindowKind::Normal, WindowFlags::RASTER | WindowFlags::COMPOSITING, RectInt::from_coords(0, 0, 10, 10));
        stack.push_front(gl.clone());
        assert!(!stack.has_visible_raster_windows());
        let a = raster(RectInt::from_coords(0, 0, 10, 10));
        stack.push_front(a.clone());
        assert!(stack.has_visible_raster_windows());
        a.set_visible(false);
        assert!(!stack.has_visible_raster_windows());
    }
}

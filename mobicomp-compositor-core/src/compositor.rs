//! The per-display raster compositor.
//!
//! A [`Compositor`] owns the window stack, the damage and the native surface
//! of one display. Damage coalesces into a single zero-delay tick on the UI
//! loop; the tick locks the native buffer, paints every visible raster window
//! front to back, clears what no window covers, and posts the frame.

use std::sync::{Arc, PoisonError};

use calloop::timer::{TimeoutAction, Timer};
use calloop::LoopHandle;
use mobicomp_buffer_manager::{NativeError, NativeRect, NativeWindow, PixelFormat, SurfaceId, TRANSPARENT};
use mobicomp_core::types::{ApplicationState, DisplayDescriptor, DisplayId, PointInt, RectInt, Size, SizeInt};
use tracing::{debug, info, trace, warn};

use crate::damage::DamageTracker;
use crate::protector::DeadlockProtector;
use crate::region::Region;
use crate::scheduler::UiSender;
use crate::screens::ScreenManager;
use crate::stack::{self, WindowStack};
use crate::surface::{AcquireRequest, Acquired, SurfaceClient, SurfacePhase, SurfaceProvider, SurfaceShared};
use crate::window::{WindowHandle, WindowId, WindowSystem};

/// What a compositing pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedrawOutcome {
    /// A frame covering `area` was posted and the damage cleared.
    Presented { area: RectInt },
    /// Nothing to do: no damage, or the platform has no surface host.
    Idle,
    /// No visible raster window; any surface was released.
    NoRasterWindows,
    /// No surface after acquisition; retried on the next damage.
    SurfaceUnavailable,
    /// The surface wait was refused by the deadlock protector.
    WaitSkipped,
    LockFailed,
    /// The locked buffer's layout was unusable; it was unlocked unposted.
    InvalidBuffer,
    PostFailed,
}

/// Collaborators shared by every compositor of a screen manager.
#[derive(Clone)]
pub struct CompositorContext {
    pub provider: Arc<dyn SurfaceProvider>,
    pub window_system: Arc<dyn WindowSystem>,
    pub protector: DeadlockProtector,
    pub ui: UiSender,
    /// Configured raster image depth, 16 or 32.
    pub depth: u32,
}

pub struct Compositor {
    descriptor: DisplayDescriptor,
    stack: WindowStack,
    damage: DamageTracker,
    surface: Arc<SurfaceShared>,
    provider: Arc<dyn SurfaceProvider>,
    window_system: Arc<dyn WindowSystem>,
    protector: DeadlockProtector,
    ui: UiSender,
    depth: u32,
    format: PixelFormat,
    loop_handle: Option<LoopHandle<'static, ScreenManager>>,
    update_pending: bool,
    last_outcome: Option<RedrawOutcome>,
    frames_presented: u64,
}

impl Compositor {
    pub fn new(descriptor: DisplayDescriptor, context: CompositorContext) -> Self {
        Self {
            descriptor,
            stack: WindowStack::new(),
            damage: DamageTracker::new(),
            surface: SurfaceShared::new(),
            provider: context.provider,
            window_system: context.window_system,
            protector: context.protector,
            ui: context.ui,
            depth: context.depth,
            format: PixelFormat::for_depth(context.depth),
            loop_handle: None,
            update_pending: false,
            last_outcome: None,
            frames_presented: 0,
        }
    }

    /// Wires the compositor to the UI loop. Stacking and damage require it.
    pub fn connect(&mut self, handle: LoopHandle<'static, ScreenManager>) {
        debug!(display = %self.descriptor.id, "Compositor connected");
        self.loop_handle = Some(handle);
    }

    pub fn is_connected(&self) -> bool {
        self.loop_handle.is_some()
    }

    pub fn display_id(&self) -> DisplayId {
        self.descriptor.id
    }

    pub fn descriptor(&self) -> &DisplayDescriptor {
        &self.descriptor
    }

    // Window stack

    /// Puts `window` on top of the stack.
    pub fn add_window(&mut self, window: WindowHandle) {
        debug_assert!(self.is_connected(), "add_window on an unconnected compositor");
        if !stack::accepts(window.as_ref()) {
            return;
        }
        debug_assert!(!self.stack.contains(window.id()), "window {:?} added twice", window.id());

        let raster = window.is_raster();
        let geometry = window.geometry();
        if !self.stack.push_front(window) {
            return;
        }
        if raster {
            self.set_dirty(geometry);
        }
        self.top_window_changed();
    }

    pub fn remove_window(&mut self, id: WindowId) {
        debug_assert!(self.is_connected(), "remove_window on an unconnected compositor");
        let Some(window) = self.stack.remove(id) else {
            return;
        };
        if window.is_raster() {
            self.set_dirty(window.geometry());
        }
        self.top_window_changed();
    }

    pub fn raise(&mut self, id: WindowId) {
        debug_assert!(self.is_connected(), "raise on an unconnected compositor");
        if self.stack.raise(id) {
            self.restacked(id);
        }
    }

    pub fn lower(&mut self, id: WindowId) {
        debug_assert!(self.is_connected(), "lower on an unconnected compositor");
        if self.stack.lower(id) {
            self.restacked(id);
        }
    }

    fn restacked(&mut self, id: WindowId) {
        let damage = self
            .stack
            .iter()
            .find(|w| w.id() == id)
            .filter(|w| w.is_raster())
            .map(|w| w.geometry());
        if let Some(geometry) = damage {
            self.set_dirty(geometry);
        }
        self.top_window_changed();
    }

    fn top_window_changed(&self) {
        let top = self.stack.top_window().cloned();
        let id = top.as_ref().map(|w| w.id());
        trace!(display = %self.descriptor.id, top = ?id, "Top window changed");
        self.window_system.handle_window_activated(id);
        self.window_system.set_active_top_level_window(id);
        if let Some(top) = top {
            top.update_status_bar_visibility();
        }
    }

    pub fn window_stack(&self) -> &WindowStack {
        &self.stack
    }

    pub fn top_window(&self) -> Option<WindowHandle> {
        self.stack.top_window().cloned()
    }

    pub fn top_level_at(&self, point: PointInt) -> Option<WindowHandle> {
        self.stack.top_level_at(point).cloned()
    }

    pub fn raster_surfaces(&self) -> usize {
        self.stack.raster_surfaces()
    }

    // Damage and scheduling

    /// Adds `rect`, clipped to the available geometry, to the damage and
    /// schedules a pass.
    pub fn set_dirty(&mut self, rect: RectInt) {
        self.damage.add(rect, &self.descriptor.available_geometry);
        self.schedule_update();
    }

    /// Arms the redraw tick unless one is already pending.
    pub fn schedule_update(&mut self) {
        debug_assert!(self.is_connected(), "schedule_update on an unconnected compositor");
        if self.update_pending {
            return;
        }
        let Some(handle) = self.loop_handle.as_ref() else {
            return;
        };
        let display_id = self.descriptor.id;
        let inserted = handle.insert_source(Timer::immediate(), move |_, _, manager: &mut ScreenManager| {
            manager.run_redraw(display_id);
            TimeoutAction::Drop
        });
        match inserted {
            Ok(_) => self.update_pending = true,
            Err(e) => warn!(display = %display_id, "Failed to schedule redraw: {}", e.error),
        }
    }

    pub fn damage(&self) -> RectInt {
        self.damage.dirty()
    }

    pub fn update_pending(&self) -> bool {
        self.update_pending
    }

    /// Runs the pass for an expired tick.
    pub(crate) fn tick(&mut self) -> RedrawOutcome {
        self.update_pending = false;
        self.do_redraw()
    }

    /// Composites the damage into the native surface and posts it.
    pub fn do_redraw(&mut self) -> RedrawOutcome {
        let outcome = self.redraw();
        trace!(display = %self.descriptor.id, ?outcome, "Redraw finished");
        self.last_outcome = Some(outcome);
        outcome
    }

    fn redraw(&mut self) -> RedrawOutcome {
        if !self.provider.is_available() || self.damage.is_empty() {
            return RedrawOutcome::Idle;
        }

        if !self.stack.has_visible_raster_windows() {
            self.discard_surface();
            return RedrawOutcome::NoRasterWindows;
        }

        let surface = Arc::clone(&self.surface);
        let request = AcquireRequest {
            provider: self.provider.as_ref(),
            client: self.surface_client(),
            display: self.descriptor.id,
            geometry: self.descriptor.available_geometry,
            depth: self.depth,
            raster_surfaces: self.stack.raster_surfaces(),
        };
        let slot = match surface.acquire(request, &self.protector) {
            Acquired::Ready(slot) => slot,
            Acquired::Unavailable => return RedrawOutcome::SurfaceUnavailable,
            Acquired::WaitSkipped => return RedrawOutcome::WaitSkipped,
        };
        let Some(handle) = slot.handle() else {
            return RedrawOutcome::SurfaceUnavailable;
        };

        let dirty = self.damage.dirty();
        match composite(handle.window(), dirty, &self.stack) {
            Ok(()) => {
                self.damage.clear();
                self.frames_presented += 1;
                RedrawOutcome::Presented { area: dirty }
            }
            Err(NativeError::PostFailed(reason)) => {
                warn!(display = %self.descriptor.id, "Failed to post native buffer: {}", reason);
                RedrawOutcome::PostFailed
            }
            Err(NativeError::InvalidBuffer(e)) => {
                warn!(display = %self.descriptor.id, "Native buffer layout is unusable: {}", e);
                RedrawOutcome::InvalidBuffer
            }
            Err(NativeError::LockFailed(reason)) => {
                warn!(display = %self.descriptor.id, "Failed to lock native window: {}", reason);
                RedrawOutcome::LockFailed
            }
        }
    }

    pub fn last_outcome(&self) -> Option<RedrawOutcome> {
        self.last_outcome
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    // Surface

    pub fn surface_client(&self) -> SurfaceClient {
        SurfaceClient::new(self.descriptor.id, Arc::clone(&self.surface), self.ui.clone())
    }

    pub fn surface_phase(&self) -> SurfacePhase {
        self.surface.phase()
    }

    pub fn surface_id(&self) -> Option<SurfaceId> {
        self.surface.surface_id()
    }

    pub fn has_surface(&self) -> bool {
        self.surface.handle().is_some()
    }

    /// Destroys the provider surface and drops the handle.
    fn discard_surface(&mut self) {
        if let Some(id) = self.surface.discard() {
            info!(display = %self.descriptor.id, surface = %id, "Releasing native surface");
            self.provider.destroy_surface(id, self.descriptor.id);
        }
    }

    // Display and application state

    /// Forwards `state` to every stacked window; a backgrounded application
    /// gives up its surface.
    pub fn application_state_changed(&mut self, state: ApplicationState) {
        for window in self.stack.iter() {
            window.application_state_changed(state);
        }
        if state.is_backgrounded() {
            self.discard_surface();
        }
    }

    /// Returns false if `rect` equals the current available geometry.
    pub fn set_available_geometry(&mut self, rect: RectInt) -> bool {
        if self.descriptor.available_geometry == rect {
            return false;
        }
        let display_id = self.descriptor.id;
        let old = self.descriptor.available_geometry;
        self.descriptor.available_geometry = rect;
        info!(display = %display_id, ?old, new = ?rect, "Available geometry changed");

        self.window_system
            .handle_screen_geometry_change(display_id, self.geometry(), rect);
        self.window_system.resize_maximized_windows(display_id);

        if old.width() == 0 && old.height() == 0 && rect.width() > 0 && rect.height() > 0 {
            for window in self.window_system.all_windows() {
                let geometry = window.geometry();
                if geometry.width() > 0 && geometry.height() > 0 {
                    self.window_system
                        .handle_expose_event(window.id(), RectInt::from_size(geometry.size));
                }
            }
        }

        if let Some(id) = self.surface.release_for_resize() {
            debug!(display = %display_id, surface = %id, "Resizing native surface");
            self.provider.set_surface_geometry(id, display_id, rect);
        }
        true
    }

    pub fn set_size(&mut self, size: SizeInt) {
        self.descriptor.size = size;
        self.window_system.handle_screen_geometry_change(
            self.descriptor.id,
            self.geometry(),
            self.descriptor.available_geometry,
        );
    }

    pub fn set_physical_size(&mut self, size_mm: Size<f64>, scaled_density: f64, density: f64) {
        self.descriptor.physical_size = size_mm;
        self.descriptor.scaled_density = scaled_density;
        self.descriptor.density = density;
    }

    pub fn geometry(&self) -> RectInt {
        self.descriptor.geometry()
    }

    pub fn available_geometry(&self) -> RectInt {
        self.descriptor.available_geometry
    }

    pub fn physical_size(&self) -> Size<f64> {
        self.descriptor.physical_size
    }

    pub fn logical_dpi(&self) -> (f64, f64) {
        self.descriptor.logical_dpi()
    }

    pub fn pixel_density(&self) -> f64 {
        self.descriptor.pixel_density()
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Backing-store format for this display's depth.
    pub fn format(&self) -> PixelFormat {
        self.format
    }
}

impl Drop for Compositor {
    fn drop(&mut self) {
        let (handle, id) = self.surface.close();
        drop(handle);
        if let Some(id) = id {
            debug!(display = %self.descriptor.id, surface = %id, "Destroying native surface on teardown");
            self.provider.destroy_surface(id, self.descriptor.id);
        }
    }
}

/// Paints `dirty` from the visible raster windows of `stack` into `window`
/// and posts the buffer.
///
/// Windows are visited front to back. Each window only paints the part of the
/// damage no window in front of it has claimed; whatever is left at the end
/// is cleared to transparent. When the window enlarges the locked bounds the
/// whole enlarged area is repainted.
pub fn composite(window: &dyn NativeWindow, dirty: RectInt, stack: &WindowStack) -> Result<(), NativeError> {
    let mut buffer = window.lock(&NativeRect::from(dirty))?;
    let mut target = match buffer.take_image() {
        Ok(image) => image,
        Err(e) => {
            window.unlock(buffer);
            return Err(e.into());
        }
    };
    let area = RectInt::from(buffer.bounds)
        .union(&dirty)
        .intersected(&target.rect());
    trace!(format = ?target.format(), ?dirty, ?area, "Compositing");

    let mut uncovered = Region::from_rect(area);
    for entry in stack.iter().filter(|w| WindowStack::is_painted(w.as_ref())) {
        if uncovered.is_empty() {
            break;
        }
        let geometry = entry.geometry();
        let backing = entry.backing_store();
        for piece in uncovered.intersections(&geometry) {
            uncovered.subtract(piece);
            if let Some(store) = &backing {
                let store = store.read().unwrap_or_else(PoisonError::into_inner);
                target.blit(piece.top_left(), &store, piece.translate(-geometry.x(), -geometry.y()));
            }
        }
    }

    for rect in uncovered.rects() {
        target.fill_rect(*rect, TRANSPARENT);
    }

    buffer.restore(target);
    window.unlock_and_post(buffer)
}

//! Process-wide screen state.
//!
//! The [`ScreenManager`] owns the display registry, one [`Compositor`] per
//! display and the screen orientation. It is the data of the UI event loop:
//! queued [`UiTask`]s and redraw ticks are executed against it.
//!
//! Displays are registered from configuration, and through
//! [`ScreenManager::create_screen`], before [`ScreenManager::start`] builds the
//! compositors. [`ScreenManager::shutdown`] drops every compositor and clears
//! the registry.

use std::collections::BTreeMap;
use std::sync::Arc;

use calloop::LoopHandle;
use mobicomp_core::config::CoreConfig;
use mobicomp_core::types::{
    ApplicationState, DisplayDescriptor, DisplayId, DisplayRegistry, ScreenOrientation, SizeInt,
};
use tracing::{debug, info, warn};

use crate::compositor::{Compositor, CompositorContext, RedrawOutcome};
use crate::error::{CompositorError, Result};
use crate::protector::DeadlockProtector;
use crate::scheduler::{UiSender, UiTask};
use crate::surface::SurfaceProvider;
use crate::window::WindowSystem;

pub struct ScreenManager {
    registry: DisplayRegistry,
    compositors: BTreeMap<DisplayId, Compositor>,
    context: CompositorContext,
    loop_handle: Option<LoopHandle<'static, ScreenManager>>,
    orientation: ScreenOrientation,
    native_orientation: ScreenOrientation,
    application_state: ApplicationState,
}

impl ScreenManager {
    pub fn new(
        config: &CoreConfig,
        provider: Arc<dyn SurfaceProvider>,
        window_system: Arc<dyn WindowSystem>,
        ui: UiSender,
    ) -> Self {
        Self {
            registry: DisplayRegistry::from_config(&config.display),
            compositors: BTreeMap::new(),
            context: CompositorContext {
                provider,
                window_system,
                protector: DeadlockProtector::new(),
                ui,
                depth: config.raster.image_depth,
            },
            loop_handle: None,
            orientation: ScreenOrientation::default(),
            native_orientation: ScreenOrientation::default(),
            application_state: ApplicationState::default(),
        }
    }

    /// Registers a display. After [`start`](Self::start) its compositor is
    /// created and connected immediately.
    #[allow(clippy::too_many_arguments)]
    pub fn create_screen(
        &mut self,
        id: DisplayId,
        name: &str,
        available: SizeInt,
        physical_mm: SizeInt,
        size: SizeInt,
        scaled_density: f64,
        density: f64,
    ) {
        self.registry
            .create_screen(id, name, available, physical_mm, size, scaled_density, density);
        if let Some(handle) = self.loop_handle.clone() {
            if let Some(descriptor) = self.registry.get(id).cloned() {
                self.build_compositor(descriptor, handle);
            }
        }
    }

    /// Builds and connects a compositor for every registered display.
    pub fn start(&mut self, handle: LoopHandle<'static, ScreenManager>) -> Result<()> {
        if self.registry.is_empty() {
            return Err(CompositorError::DisplayInit("no display registered".to_string()));
        }
        let descriptors: Vec<DisplayDescriptor> = self.registry.iter().cloned().collect();
        for descriptor in descriptors {
            self.build_compositor(descriptor, handle.clone());
        }
        self.loop_handle = Some(handle);
        Ok(())
    }

    fn build_compositor(&mut self, descriptor: DisplayDescriptor, handle: LoopHandle<'static, ScreenManager>) {
        let id = descriptor.id;
        info!(display = %id, name = %descriptor.name, size = ?descriptor.size, "Creating compositor");
        let mut compositor = Compositor::new(descriptor, self.context.clone());
        compositor.connect(handle);
        self.compositors.insert(id, compositor);
    }

    pub fn compositor(&self, id: DisplayId) -> Option<&Compositor> {
        self.compositors.get(&id)
    }

    pub fn compositor_mut(&mut self, id: DisplayId) -> Option<&mut Compositor> {
        self.compositors.get_mut(&id)
    }

    /// Like [`compositor_mut`](Self::compositor_mut), but an unknown display
    /// is an error.
    pub fn require_compositor(&mut self, id: DisplayId) -> Result<&mut Compositor> {
        self.compositors
            .get_mut(&id)
            .ok_or(CompositorError::UnknownDisplay(id))
    }

    pub fn compositor_count(&self) -> usize {
        self.compositors.len()
    }

    pub fn compositors(&self) -> impl Iterator<Item = &Compositor> {
        self.compositors.values()
    }

    /// Current metrics of `id`.
    pub fn display(&self, id: DisplayId) -> Option<&DisplayDescriptor> {
        self.registry.get(id)
    }

    pub fn registry(&self) -> &DisplayRegistry {
        &self.registry
    }

    pub fn has_pending_updates(&self) -> bool {
        self.compositors.values().any(Compositor::update_pending)
    }

    /// Runs the compositing pass of `display` for an expired tick.
    pub fn run_redraw(&mut self, display_id: DisplayId) -> Option<RedrawOutcome> {
        let outcome = self.compositors.get_mut(&display_id).map(Compositor::tick);
        if outcome.is_none() {
            debug!(display = %display_id, "Redraw tick for a display without compositor");
        }
        outcome
    }

    /// Executes a task queued to the UI thread.
    pub fn handle_task(&mut self, task: UiTask) {
        match task {
            UiTask::ApplicationStateChanged(state) => self.application_state_changed(state),
            UiTask::SetOrientation { current, native } => self.set_orientation(current, native),
            UiTask::SetDirty { display, rect } => {
                if let Some(compositor) = self.compositor_for_task(display) {
                    compositor.set_dirty(rect);
                }
            }
            UiTask::SetAvailableGeometry { display, rect } => {
                if let Some(compositor) = self.compositor_for_task(display) {
                    compositor.set_available_geometry(rect);
                }
                self.sync_descriptor(display);
            }
            UiTask::SetSize { display, size } => {
                if let Some(compositor) = self.compositor_for_task(display) {
                    compositor.set_size(size);
                }
                self.sync_descriptor(display);
            }
            UiTask::SetPhysicalSize { display, size_mm, scaled_density, density } => {
                if let Some(compositor) = self.compositor_for_task(display) {
                    compositor.set_physical_size(size_mm, scaled_density, density);
                }
                self.sync_descriptor(display);
            }
        }
    }

    fn compositor_for_task(&mut self, display_id: DisplayId) -> Option<&mut Compositor> {
        let compositor = self.compositors.get_mut(&display_id);
        if compositor.is_none() {
            warn!(display = %display_id, "Dropping task for unknown display");
        }
        compositor
    }

    /// Copies a compositor's metrics back into the registry.
    fn sync_descriptor(&mut self, display: DisplayId) {
        let Some(compositor) = self.compositors.get(&display) else {
            return;
        };
        if let Some(entry) = self.registry.get_mut(display) {
            *entry = compositor.descriptor().clone();
        }
    }

    pub fn application_state_changed(&mut self, state: ApplicationState) {
        debug!(?state, "Application state changed");
        self.application_state = state;
        for compositor in self.compositors.values_mut() {
            compositor.application_state_changed(state);
        }
    }

    pub fn application_state(&self) -> ApplicationState {
        self.application_state
    }

    pub fn set_orientation(&mut self, current: ScreenOrientation, native: ScreenOrientation) {
        self.orientation = current;
        self.native_orientation = native;
        debug!(%current, %native, rotation = self.rotation(), "Screen orientation changed");
    }

    /// Clockwise rotation of the current orientation relative to the native
    /// one, in degrees.
    pub fn rotation(&self) -> u32 {
        self.orientation.angle_from(self.native_orientation)
    }

    pub fn orientation(&self) -> ScreenOrientation {
        self.orientation
    }

    pub fn native_orientation(&self) -> ScreenOrientation {
        self.native_orientation
    }

    /// Pixel density of the primary display, 1.0 when none is registered.
    pub fn default_display_pixel_density(&self) -> f64 {
        self.registry.default_pixel_density().unwrap_or(1.0)
    }

    pub fn protector(&self) -> &DeadlockProtector {
        &self.context.protector
    }

    pub fn depth(&self) -> u32 {
        self.context.depth
    }

    /// Drops every compositor, releasing their surfaces, and clears the
    /// registry.
    pub fn shutdown(&mut self) {
        info!(displays = self.compositors.len(), "Shutting down screens");
        self.compositors.clear();
        self.registry.clear();
        self.loop_handle = None;
    }
}

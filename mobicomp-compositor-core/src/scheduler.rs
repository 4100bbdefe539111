//! The UI-thread event loop.
//!
//! Everything that touches window stacks or damage runs on the thread driving
//! [`UiLoop`]. Other threads hand work over as [`UiTask`]s through a
//! [`UiSender`]; redraw ticks are single-shot, zero-delay calloop timers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use calloop::channel::{self, Channel, Sender};
use calloop::EventLoop;
use mobicomp_core::config::CoreConfig;
use mobicomp_core::types::{ApplicationState, DisplayId, RectInt, ScreenOrientation, Size, SizeInt};
use tracing::{debug, info, trace, warn};

use crate::error::{CompositorError, Result};
use crate::screens::ScreenManager;
use crate::surface::SurfaceProvider;
use crate::window::WindowSystem;

/// Upper bound on loop iterations in [`UiLoop::run_until_idle`].
const MAX_IDLE_ITERATIONS: usize = 64;

/// Work queued to the UI thread.
#[derive(Debug, Clone, PartialEq)]
pub enum UiTask {
    SetDirty { display: DisplayId, rect: RectInt },
    SetAvailableGeometry { display: DisplayId, rect: RectInt },
    SetSize { display: DisplayId, size: SizeInt },
    SetPhysicalSize {
        display: DisplayId,
        size_mm: Size<f64>,
        scaled_density: f64,
        density: f64,
    },
    ApplicationStateChanged(ApplicationState),
    SetOrientation {
        current: ScreenOrientation,
        native: ScreenOrientation,
    },
}

/// Cloneable handle for posting [`UiTask`]s from any thread.
#[derive(Clone)]
pub struct UiSender {
    sender: Sender<UiTask>,
    pending: Arc<AtomicUsize>,
}

impl UiSender {
    fn new(sender: Sender<UiTask>) -> Self {
        Self { sender, pending: Arc::new(AtomicUsize::new(0)) }
    }

    /// A sender with no loop behind it; every post fails.
    pub fn detached() -> Self {
        let (sender, _channel) = channel::channel();
        Self::new(sender)
    }

    /// Queues `task`. Returns false if the loop is gone.
    pub fn post(&self, task: UiTask) -> bool {
        self.pending.fetch_add(1, Ordering::AcqRel);
        match self.sender.send(task) {
            Ok(()) => true,
            Err(err) => {
                self.pending.fetch_sub(1, Ordering::AcqRel);
                debug!("Dropping UI task, loop closed: {:?}", err.0);
                false
            }
        }
    }

    /// Tasks posted but not yet executed.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    fn task_done(&self) {
        self.pending.fetch_sub(1, Ordering::AcqRel);
    }

    /// The usable desktop area of `display` changed to `(0, 0, width, height)`.
    pub fn set_desktop_size(&self, display: DisplayId, width: u32, height: u32) -> bool {
        self.post(UiTask::SetAvailableGeometry {
            display,
            rect: RectInt::from_coords(0, 0, width, height),
        })
    }

    /// New physical metrics for `display`. The display name is informational.
    pub fn set_display_metrics(
        &self,
        display_id: DisplayId,
        name: &str,
        width_mm: f64,
        height_mm: f64,
        scaled_density: f64,
        density: f64,
    ) -> bool {
        trace!(display = %display_id, name, "Display metrics changed");
        self.post(UiTask::SetPhysicalSize {
            display: display_id,
            size_mm: Size::new(width_mm, height_mm),
            scaled_density,
            density,
        })
    }

    pub fn set_screen_size(&self, display: DisplayId, width: u32, height: u32) -> bool {
        self.post(UiTask::SetSize { display, size: SizeInt::new(width, height) })
    }

    pub fn set_application_state(&self, state: ApplicationState) -> bool {
        self.post(UiTask::ApplicationStateChanged(state))
    }

    pub fn set_screen_orientation(&self, current: ScreenOrientation, native: ScreenOrientation) -> bool {
        self.post(UiTask::SetOrientation { current, native })
    }
}

/// Owns the calloop event loop and the [`ScreenManager`] it drives.
pub struct UiLoop {
    event_loop: EventLoop<'static, ScreenManager>,
    manager: ScreenManager,
    sender: UiSender,
}

impl UiLoop {
    /// Creates the loop and a screen manager for the displays in `config`.
    /// Compositors are built by [`UiLoop::start`].
    pub fn new(
        config: &CoreConfig,
        provider: Arc<dyn SurfaceProvider>,
        window_system: Arc<dyn WindowSystem>,
    ) -> Result<Self> {
        let event_loop: EventLoop<'static, ScreenManager> = EventLoop::try_new()
            .map_err(|e| CompositorError::DisplayInit(format!("Failed to create event loop: {}", e)))?;

        let (sender, tasks): (Sender<UiTask>, Channel<UiTask>) = channel::channel();
        let sender = UiSender::new(sender);

        let done = sender.clone();
        event_loop
            .handle()
            .insert_source(tasks, move |event, _, manager: &mut ScreenManager| {
                if let channel::Event::Msg(task) = event {
                    done.task_done();
                    manager.handle_task(task);
                }
            })
            .map_err(|e| CompositorError::DisplayInit(format!("Failed to register task channel: {}", e.error)))?;

        let manager = ScreenManager::new(config, provider, window_system, sender.clone());
        Ok(Self { event_loop, manager, sender })
    }

    /// Builds and connects one compositor per registered display.
    pub fn start(&mut self) -> Result<()> {
        let handle = self.event_loop.handle();
        self.manager.start(handle)?;
        info!(displays = self.manager.compositor_count(), "UI loop started");
        Ok(())
    }

    pub fn sender(&self) -> UiSender {
        self.sender.clone()
    }

    pub fn manager(&self) -> &ScreenManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut ScreenManager {
        &mut self.manager
    }

    /// Runs one loop iteration, waiting at most `timeout` for events.
    pub fn dispatch(&mut self, timeout: Option<Duration>) -> Result<()> {
        self.event_loop
            .dispatch(timeout, &mut self.manager)
            .map_err(|e| CompositorError::DisplayInit(format!("Event loop dispatch failed: {}", e)))
    }

    /// True when no task is queued and no redraw tick is armed.
    pub fn is_idle(&self) -> bool {
        self.sender.pending() == 0 && !self.manager.has_pending_updates()
    }

    /// Dispatches until [`is_idle`](Self::is_idle), for a bounded number of
    /// iterations. Returns the number of iterations run.
    pub fn run_until_idle(&mut self) -> Result<usize> {
        for iteration in 0..MAX_IDLE_ITERATIONS {
            if self.is_idle() {
                return Ok(iteration);
            }
            self.dispatch(Some(Duration::ZERO))?;
        }
        warn!(
            pending = self.sender.pending(),
            "UI loop still busy after {} iterations", MAX_IDLE_ITERATIONS
        );
        Ok(MAX_IDLE_ITERATIONS)
    }

    /// Tears down every compositor and clears the display registry.
    pub fn shutdown(&mut self) {
        self.manager.shutdown();
    }
}

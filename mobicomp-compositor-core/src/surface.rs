//! Native surface lifecycle.
//!
//! A compositor's native surface moves through `Absent -> Acquiring -> Ready`
//! and back to `Absent` when it is released. Acquisition is asynchronous: the
//! UI thread asks the [`SurfaceProvider`] for a surface and then waits on a
//! condition variable until the provider thread answers through the
//! [`SurfaceClient`] it was handed.
//!
//! The slot mutex is never held across a provider call. Providers are free to
//! answer synchronously from inside `create_surface`.
//!
//! Every surface request gets a new generation, and the client handed to the
//! provider carries it. Discarding a surface moves the generation on, so an
//! answer for a surface that is already gone is dropped. Only a slot in
//! `Acquiring` accepts answers.

use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use mobicomp_buffer_manager::{NativeSurfaceHandle, SurfaceId};
use mobicomp_core::types::{DisplayId, RectInt};
use tracing::{debug, info, trace, warn};

use crate::protector::DeadlockProtector;
use crate::scheduler::{UiSender, UiTask};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SurfacePhase {
    #[default]
    Absent,
    /// A surface was requested and its callback has not arrived yet.
    Acquiring,
    Ready,
}

/// The platform component that creates native surfaces.
///
/// Answers to `create_surface` and `set_surface_geometry` arrive later, on
/// the provider's own thread, through [`SurfaceClient::surface_changed`].
pub trait SurfaceProvider: Send + Sync {
    /// Whether the platform activity hosting surfaces exists.
    fn is_available(&self) -> bool;

    fn create_surface(
        &self,
        client: SurfaceClient,
        display: DisplayId,
        geometry: RectInt,
        on_top: bool,
        depth: u32,
    ) -> SurfaceId;

    fn set_surface_geometry(&self, id: SurfaceId, display: DisplayId, geometry: RectInt);

    fn destroy_surface(&self, id: SurfaceId, display: DisplayId);
}

/// State shared between the UI thread and the provider thread.
#[derive(Debug, Default)]
pub struct SurfaceSlot {
    pub(crate) phase: SurfacePhase,
    pub(crate) handle: Option<NativeSurfaceHandle>,
    pub(crate) surface_id: Option<SurfaceId>,
    /// Generation of the surface currently requested or held.
    pub(crate) generation: u64,
    /// Set when the owning compositor is dropped; later callbacks are ignored.
    pub(crate) closed: bool,
}

impl SurfaceSlot {
    pub fn phase(&self) -> SurfacePhase {
        self.phase
    }

    pub fn handle(&self) -> Option<&NativeSurfaceHandle> {
        self.handle.as_ref()
    }
}

#[derive(Debug, Default)]
pub struct SurfaceShared {
    slot: Mutex<SurfaceSlot>,
    ready: Condvar,
}

/// Result of [`SurfaceShared::acquire`].
pub(crate) enum Acquired<'a> {
    /// The surface is ready. The slot stays locked while the guard lives.
    Ready(MutexGuard<'a, SurfaceSlot>),
    /// No surface after the wait; the pass must be skipped.
    Unavailable,
    /// Waiting was refused because the protector was already held.
    WaitSkipped,
}

/// Everything needed to request a surface from the provider.
pub(crate) struct AcquireRequest<'a> {
    pub provider: &'a dyn SurfaceProvider,
    pub client: SurfaceClient,
    pub display: DisplayId,
    pub geometry: RectInt,
    pub depth: u32,
    pub raster_surfaces: usize,
}

impl SurfaceShared {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, SurfaceSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn phase(&self) -> SurfacePhase {
        self.lock().phase
    }

    pub fn surface_id(&self) -> Option<SurfaceId> {
        self.lock().surface_id
    }

    pub fn handle(&self) -> Option<NativeSurfaceHandle> {
        self.lock().handle.clone()
    }

    /// Makes sure a surface is ready, requesting one and blocking until the
    /// provider answers if needed.
    pub(crate) fn acquire(&self, request: AcquireRequest<'_>, protector: &DeadlockProtector) -> Acquired<'_> {
        let mut slot = self.lock();
        if slot.closed {
            return Acquired::Unavailable;
        }

        if slot.handle.is_none() && slot.phase == SurfacePhase::Absent && request.raster_surfaces > 0 {
            let stale = slot.surface_id.take();
            slot.phase = SurfacePhase::Acquiring;
            slot.generation += 1;
            let client = SurfaceClient { generation: slot.generation, ..request.client };
            drop(slot);

            if let Some(id) = stale {
                debug!(display = %request.display, surface = %id, "Destroying stale surface before reacquiring");
                request.provider.destroy_surface(id, request.display);
            }
            let id = request.provider.create_surface(
                client,
                request.display,
                request.geometry,
                true,
                request.depth,
            );
            info!(display = %request.display, surface = %id, geometry = ?request.geometry, "Requested native surface");

            slot = self.lock();
            slot.surface_id = Some(id);
        }

        if slot.phase == SurfacePhase::Acquiring {
            let Some(_guard) = protector.acquire() else {
                debug!(display = %request.display, "Surface wait would re-enter a blocked caller; skipping");
                return Acquired::WaitSkipped;
            };
            trace!(display = %request.display, "Waiting for surface callback");
            slot = self
                .ready
                .wait_while(slot, |s| s.phase == SurfacePhase::Acquiring && !s.closed)
                .unwrap_or_else(PoisonError::into_inner);
        }

        if slot.handle.is_none() {
            return Acquired::Unavailable;
        }
        Acquired::Ready(slot)
    }

    /// Drops the handle and forgets the surface id, returning the id so the
    /// caller can destroy it outside the lock. Answers still in flight for
    /// that surface are ignored.
    pub(crate) fn discard(&self) -> Option<SurfaceId> {
        let mut slot = self.lock();
        slot.phase = SurfacePhase::Absent;
        slot.handle = None;
        slot.generation += 1;
        slot.surface_id.take()
    }

    /// Drops the handle ahead of a provider-side resize. Returns the id to
    /// resize, or `None` when no surface exists. The next pass waits for the
    /// provider's answer.
    pub(crate) fn release_for_resize(&self) -> Option<SurfaceId> {
        let mut slot = self.lock();
        let id = slot.surface_id?;
        slot.handle = None;
        slot.phase = SurfacePhase::Acquiring;
        Some(id)
    }

    /// Marks the slot closed and wakes every waiter.
    pub(crate) fn close(&self) -> (Option<NativeSurfaceHandle>, Option<SurfaceId>) {
        let mut slot = self.lock();
        slot.closed = true;
        slot.phase = SurfacePhase::Absent;
        let released = (slot.handle.take(), slot.surface_id.take());
        self.ready.notify_all();
        released
    }
}

/// Callback endpoint handed to a [`SurfaceProvider`] for one display.
#[derive(Clone)]
pub struct SurfaceClient {
    display: DisplayId,
    shared: Arc<SurfaceShared>,
    ui: UiSender,
    generation: u64,
}

impl SurfaceClient {
    /// A client for the slot's current generation. Acquisition rebinds it to
    /// the surface it requests.
    pub fn new(display: DisplayId, shared: Arc<SurfaceShared>, ui: UiSender) -> Self {
        let generation = shared.lock().generation;
        Self { display, shared, ui, generation }
    }

    pub fn display(&self) -> DisplayId {
        self.display
    }

    /// Called by the provider, on its own thread, when a surface became
    /// ready (`Some(handle)` with a non-zero size) or could not be created.
    /// Answers for a discarded surface, or arriving while nothing is being
    /// acquired, are dropped.
    pub fn surface_changed(&self, handle: Option<NativeSurfaceHandle>, width: i32, height: i32) {
        let mut slot = self.shared.lock();
        if slot.closed {
            self.shared.ready.notify_all();
            return;
        }
        if slot.generation != self.generation || slot.phase != SurfacePhase::Acquiring {
            let (phase, current) = (slot.phase, slot.generation);
            drop(slot);
            debug!(
                display = %self.display,
                generation = self.generation,
                current,
                ?phase,
                "Ignoring surface answer for a released surface"
            );
            return;
        }

        let ready = match handle {
            Some(handle) if width > 0 && height > 0 => {
                slot.handle = Some(handle);
                slot.phase = SurfacePhase::Ready;
                true
            }
            _ => {
                slot.handle = None;
                slot.phase = SurfacePhase::Absent;
                false
            }
        };
        self.shared.ready.notify_all();
        drop(slot);

        if ready {
            info!(display = %self.display, width, height, "Native surface ready");
            let rect = RectInt::from_coords(0, 0, width as u32, height as u32);
            if !self.ui.post(UiTask::SetDirty { display: self.display, rect }) {
                warn!(display = %self.display, "UI loop is gone; dropping surface damage");
            }
        } else {
            warn!(display = %self.display, width, height, "Native surface creation failed");
        }
    }
}

impl fmt::Debug for SurfaceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceClient")
            .field("display", &self.display)
            .field("generation", &self.generation)
            .finish()
    }
}

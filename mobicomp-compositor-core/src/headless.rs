//! An in-memory platform.
//!
//! [`HeadlessSurfaceProvider`] answers surface requests from its own worker
//! thread, like a real platform does, with [`MemoryNativeWindow`]s that keep
//! the posted frame in memory. [`HeadlessWindow`] and [`HeadlessWindowSystem`]
//! stand in for the windowing toolkit and record what the compositor told
//! them. The demo binary and the tests run on top of these.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use mobicomp_buffer_manager::{
    Image, NativeBuffer, NativeError, NativeRect, NativeSurfaceHandle, NativeWindow, PixelFormat, SharedImage,
    SurfaceId,
};
use mobicomp_core::types::{ApplicationState, DisplayId, RectInt, SizeInt};
use tracing::{debug, trace, warn};

use crate::surface::{SurfaceClient, SurfaceProvider};
use crate::window::{PlatformWindow, WindowFlags, WindowHandle, WindowId, WindowKind, WindowSystem};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// Native window

/// A native window whose frame lives in memory.
#[derive(Debug)]
pub struct MemoryNativeWindow {
    frame: Mutex<Image>,
    fail_locks: AtomicUsize,
    fail_posts: AtomicUsize,
    corrupt_locks: AtomicUsize,
    /// Locks report the whole window as the area to repaint.
    full_repaint: AtomicBool,
    locked: AtomicBool,
    frames_posted: AtomicU64,
    last_bounds: Mutex<Option<NativeRect>>,
}

impl MemoryNativeWindow {
    /// A transparent window. Formats are normalized to what a native buffer
    /// can report, so ARGB32 becomes premultiplied RGBA.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        let format = PixelFormat::from_native_code(format.native_code());
        Self {
            frame: Mutex::new(Image::new(width, height, format)),
            fail_locks: AtomicUsize::new(0),
            fail_posts: AtomicUsize::new(0),
            corrupt_locks: AtomicUsize::new(0),
            full_repaint: AtomicBool::new(false),
            locked: AtomicBool::new(false),
            frames_posted: AtomicU64::new(0),
            last_bounds: Mutex::new(None),
        }
    }

    pub fn size(&self) -> SizeInt {
        lock(&self.frame).size()
    }

    pub fn format(&self) -> PixelFormat {
        lock(&self.frame).format()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        lock(&self.frame).pixel(x, y)
    }

    pub fn fill(&self, rgba: [u8; 4]) {
        lock(&self.frame).fill(rgba);
    }

    pub fn frames_posted(&self) -> u64 {
        self.frames_posted.load(Ordering::Acquire)
    }

    /// Bounds of the most recent lock.
    pub fn last_bounds(&self) -> Option<NativeRect> {
        *lock(&self.last_bounds)
    }

    /// Makes the next lock fail.
    pub fn fail_next_lock(&self) {
        self.fail_locks.fetch_add(1, Ordering::AcqRel);
    }

    /// Makes the next post fail.
    pub fn fail_next_post(&self) {
        self.fail_posts.fetch_add(1, Ordering::AcqRel);
    }

    /// Makes the next lock hand out a buffer whose stride is too short.
    pub fn corrupt_next_lock(&self) {
        self.corrupt_locks.fetch_add(1, Ordering::AcqRel);
    }

    /// When set, every lock asks for the whole window to be repainted.
    pub fn set_full_repaint(&self, full: bool) {
        self.full_repaint.store(full, Ordering::Release);
    }

    /// Whether a buffer is locked and not yet unlocked.
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }

    fn take_failure(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl NativeWindow for MemoryNativeWindow {
    fn lock(&self, bounds: &NativeRect) -> Result<NativeBuffer, NativeError> {
        if bounds.is_empty() {
            return Err(NativeError::LockFailed(format!("empty bounds {:?}", bounds)));
        }
        if Self::take_failure(&self.fail_locks) {
            return Err(NativeError::LockFailed("window is busy".to_string()));
        }
        if self.locked.swap(true, Ordering::AcqRel) {
            return Err(NativeError::LockFailed("buffer is already locked".to_string()));
        }
        let frame = lock(&self.frame);
        let bounds = if self.full_repaint.load(Ordering::Acquire) {
            NativeRect::from(frame.rect())
        } else {
            *bounds
        };
        *lock(&self.last_bounds) = Some(bounds);
        let mut stride = (frame.stride() / frame.format().bytes_per_pixel()) as u32;
        if Self::take_failure(&self.corrupt_locks) {
            stride = frame.width().saturating_sub(1);
        }
        Ok(NativeBuffer {
            width: frame.width(),
            height: frame.height(),
            stride,
            format: frame.format().native_code(),
            bounds,
            bits: frame.bytes().to_vec(),
        })
    }

    fn unlock_and_post(&self, buffer: NativeBuffer) -> Result<(), NativeError> {
        self.locked.store(false, Ordering::Release);
        if Self::take_failure(&self.fail_posts) {
            return Err(NativeError::PostFailed("queue rejected buffer".to_string()));
        }
        let format = buffer.pixel_format();
        let stride = buffer.stride as usize * format.bytes_per_pixel();
        let image = Image::wrap(buffer.width, buffer.height, stride, format, buffer.bits)?;
        *lock(&self.frame) = image;
        self.frames_posted.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    fn unlock(&self, _buffer: NativeBuffer) {
        self.locked.store(false, Ordering::Release);
    }
}

// Surface provider

type Job = Box<dyn FnOnce() + Send>;

struct SurfaceRecord {
    client: SurfaceClient,
    display: DisplayId,
    format: PixelFormat,
    window: Option<Arc<MemoryNativeWindow>>,
}

#[derive(Default)]
struct ProviderState {
    next_id: i32,
    surfaces: HashMap<SurfaceId, SurfaceRecord>,
    created: Vec<(SurfaceId, DisplayId, RectInt)>,
    destroyed: Vec<SurfaceId>,
    geometry_requests: Vec<(SurfaceId, RectInt)>,
    failures_pending: usize,
    /// Callbacks held back while paused.
    held: Option<Vec<Job>>,
    last_window: Option<Arc<MemoryNativeWindow>>,
}

/// Creates [`MemoryNativeWindow`] surfaces and answers on a worker thread.
pub struct HeadlessSurfaceProvider {
    state: Mutex<ProviderState>,
    available: AtomicBool,
    jobs: Mutex<Option<mpsc::Sender<Job>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Default for HeadlessSurfaceProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessSurfaceProvider {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel::<Job>();
        let worker = thread::Builder::new()
            .name("surface-provider".to_string())
            .spawn(move || {
                for job in receiver {
                    job();
                }
            });
        let (jobs, worker) = match worker {
            Ok(handle) => (Some(sender), Some(handle)),
            Err(e) => {
                warn!("Failed to start surface provider thread, answering inline: {}", e);
                (None, None)
            }
        };
        Self {
            state: Mutex::new(ProviderState::default()),
            available: AtomicBool::new(true),
            jobs: Mutex::new(jobs),
            worker: Mutex::new(worker),
        }
    }

    fn dispatch(&self, job: Job) {
        {
            let mut state = lock(&self.state);
            if let Some(held) = state.held.as_mut() {
                held.push(job);
                return;
            }
        }
        let job = match lock(&self.jobs).as_ref() {
            Some(sender) => match sender.send(job) {
                Ok(()) => return,
                Err(mpsc::SendError(job)) => job,
            },
            None => job,
        };
        job();
    }

    /// Blocks until every callback sent so far has run.
    pub fn flush(&self) {
        let (done, finished) = mpsc::channel::<()>();
        let job: Job = Box::new(move || {
            let _ = done.send(());
        });
        let sent = lock(&self.jobs)
            .as_ref()
            .map(|sender| sender.send(job).is_ok())
            .unwrap_or(false);
        if sent {
            let _ = finished.recv();
        }
    }

    /// Holds callbacks back until [`resume_callbacks`](Self::resume_callbacks).
    pub fn pause_callbacks(&self) {
        let mut state = lock(&self.state);
        if state.held.is_none() {
            state.held = Some(Vec::new());
        }
    }

    pub fn resume_callbacks(&self) {
        let held = lock(&self.state).held.take().unwrap_or_default();
        for job in held {
            self.dispatch(job);
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Release);
    }

    /// Makes the next `count` surface creations fail.
    pub fn fail_next_create(&self, count: usize) {
        lock(&self.state).failures_pending += count;
    }

    pub fn created(&self) -> Vec<(SurfaceId, DisplayId, RectInt)> {
        lock(&self.state).created.clone()
    }

    pub fn destroyed(&self) -> Vec<SurfaceId> {
        lock(&self.state).destroyed.clone()
    }

    pub fn geometry_requests(&self) -> Vec<(SurfaceId, RectInt)> {
        lock(&self.state).geometry_requests.clone()
    }

    pub fn live_surfaces(&self) -> usize {
        lock(&self.state).surfaces.len()
    }

    /// The most recently created native window.
    pub fn last_window(&self) -> Option<Arc<MemoryNativeWindow>> {
        lock(&self.state).last_window.clone()
    }

    pub fn window(&self, id: SurfaceId) -> Option<Arc<MemoryNativeWindow>> {
        lock(&self.state).surfaces.get(&id).and_then(|r| r.window.clone())
    }

    /// Builds the answer for a surface of `geometry`, updating `record`.
    fn answer(state: &mut ProviderState, id: SurfaceId, geometry: RectInt) -> Option<Job> {
        let fail = state.failures_pending > 0 || geometry.is_empty();
        if state.failures_pending > 0 {
            state.failures_pending -= 1;
        }
        let record = state.surfaces.get_mut(&id)?;
        let client = record.client.clone();
        if fail {
            record.window = None;
            return Some(Box::new(move || client.surface_changed(None, 0, 0)));
        }

        let window = Arc::new(MemoryNativeWindow::new(geometry.width(), geometry.height(), record.format));
        record.window = Some(window.clone());
        state.last_window = Some(window.clone());
        let (width, height) = (geometry.width() as i32, geometry.height() as i32);
        Some(Box::new(move || {
            client.surface_changed(Some(NativeSurfaceHandle::new(window)), width, height)
        }))
    }
}

impl SurfaceProvider for HeadlessSurfaceProvider {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::Acquire)
    }

    fn create_surface(
        &self,
        client: SurfaceClient,
        display_id: DisplayId,
        geometry: RectInt,
        on_top: bool,
        depth: u32,
    ) -> SurfaceId {
        let job = {
            let mut state = lock(&self.state);
            state.next_id += 1;
            let id = SurfaceId(state.next_id);
            debug!(display = %display_id, surface = %id, ?geometry, on_top, depth, "Creating headless surface");
            state.created.push((id, display_id, geometry));
            state.surfaces.insert(
                id,
                SurfaceRecord { client, display: display_id, format: PixelFormat::for_depth(depth), window: None },
            );
            Self::answer(&mut state, id, geometry).map(|job| (id, job))
        };
        match job {
            Some((id, job)) => {
                self.dispatch(job);
                id
            }
            None => SurfaceId(-1),
        }
    }

    fn set_surface_geometry(&self, id: SurfaceId, display_id: DisplayId, geometry: RectInt) {
        let job = {
            let mut state = lock(&self.state);
            state.geometry_requests.push((id, geometry));
            match state.surfaces.get(&id) {
                Some(record) if record.display == display_id => {}
                _ => {
                    warn!(display = %display_id, surface = %id, "Resize request for unknown surface");
                    return;
                }
            }
            trace!(display = %display_id, surface = %id, ?geometry, "Resizing headless surface");
            Self::answer(&mut state, id, geometry)
        };
        if let Some(job) = job {
            self.dispatch(job);
        }
    }

    fn destroy_surface(&self, id: SurfaceId, display_id: DisplayId) {
        let mut state = lock(&self.state);
        if state.surfaces.remove(&id).is_none() {
            debug!(display = %display_id, surface = %id, "Destroying unknown surface");
        }
        state.destroyed.push(id);
    }
}

impl Drop for HeadlessSurfaceProvider {
    fn drop(&mut self) {
        lock(&self.jobs).take();
        if let Some(worker) = lock(&self.worker).take() {
            if worker.join().is_err() {
                warn!("Surface provider thread panicked");
            }
        }
    }
}

// Windows

/// A toolkit window with an in-memory backing store.
#[derive(Debug)]
pub struct HeadlessWindow {
    id: WindowId,
    kind: WindowKind,
    flags: WindowFlags,
    geometry: Mutex<RectInt>,
    visible: AtomicBool,
    backing: Mutex<Option<SharedImage>>,
    states: Mutex<Vec<ApplicationState>>,
    status_bar_updates: AtomicUsize,
}

impl HeadlessWindow {
    /// A visible window without backing store.
    pub fn new(kind: WindowKind, flags: WindowFlags, geometry: RectInt) -> Self {
        Self {
            id: WindowId::new_unique(),
            kind,
            flags,
            geometry: Mutex::new(geometry),
            visible: AtomicBool::new(true),
            backing: Mutex::new(None),
            states: Mutex::new(Vec::new()),
            status_bar_updates: AtomicUsize::new(0),
        }
    }

    /// A normal raster window painted in a single color.
    pub fn filled(geometry: RectInt, format: PixelFormat, rgba: [u8; 4]) -> Self {
        let window = Self::new(WindowKind::Normal, WindowFlags::RASTER, geometry);
        window.set_backing_store(Some(
            Image::filled(geometry.width(), geometry.height(), format, rgba).into_shared(),
        ));
        window
    }

    pub fn set_geometry(&self, geometry: RectInt) {
        *lock(&self.geometry) = geometry;
    }

    pub fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::Release);
    }

    pub fn set_backing_store(&self, store: Option<SharedImage>) {
        *lock(&self.backing) = store;
    }

    /// Every state forwarded to the window, oldest first.
    pub fn application_states(&self) -> Vec<ApplicationState> {
        lock(&self.states).clone()
    }

    pub fn status_bar_updates(&self) -> usize {
        self.status_bar_updates.load(Ordering::Acquire)
    }
}

impl PlatformWindow for HeadlessWindow {
    fn id(&self) -> WindowId {
        self.id
    }

    fn kind(&self) -> WindowKind {
        self.kind
    }

    fn flags(&self) -> WindowFlags {
        self.flags
    }

    fn geometry(&self) -> RectInt {
        *lock(&self.geometry)
    }

    fn is_visible(&self) -> bool {
        self.visible.load(Ordering::Acquire)
    }

    fn backing_store(&self) -> Option<SharedImage> {
        lock(&self.backing).clone()
    }

    fn application_state_changed(&self, state: ApplicationState) {
        lock(&self.states).push(state);
    }

    fn update_status_bar_visibility(&self) {
        self.status_bar_updates.fetch_add(1, Ordering::AcqRel);
    }
}

/// What the compositor reported to the window system.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowSystemEvent {
    Activated(Option<WindowId>),
    ActiveTopLevel(Option<WindowId>),
    ScreenGeometryChanged {
        display: DisplayId,
        geometry: RectInt,
        available: RectInt,
    },
    Exposed { window: WindowId, rect: RectInt },
    MaximizedResized(DisplayId),
}

/// Records window-system notifications and lists registered windows.
#[derive(Default)]
pub struct HeadlessWindowSystem {
    windows: Mutex<Vec<WindowHandle>>,
    events: Mutex<Vec<WindowSystemEvent>>,
}

impl HeadlessWindowSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `window` to the live window list.
    pub fn register(&self, window: WindowHandle) {
        lock(&self.windows).push(window);
    }

    pub fn unregister(&self, id: WindowId) {
        lock(&self.windows).retain(|w| w.id() != id);
    }

    pub fn events(&self) -> Vec<WindowSystemEvent> {
        lock(&self.events).clone()
    }

    /// Returns and forgets the recorded events.
    pub fn take_events(&self) -> Vec<WindowSystemEvent> {
        std::mem::take(&mut *lock(&self.events))
    }

    fn record(&self, event: WindowSystemEvent) {
        lock(&self.events).push(event);
    }
}

impl WindowSystem for HeadlessWindowSystem {
    fn all_windows(&self) -> Vec<WindowHandle> {
        lock(&self.windows).clone()
    }

    fn handle_window_activated(&self, window: Option<WindowId>) {
        self.record(WindowSystemEvent::Activated(window));
    }

    fn set_active_top_level_window(&self, window: Option<WindowId>) {
        self.record(WindowSystemEvent::ActiveTopLevel(window));
    }

    fn handle_screen_geometry_change(&self, display: DisplayId, geometry: RectInt, available: RectInt) {
        self.record(WindowSystemEvent::ScreenGeometryChanged { display, geometry, available });
    }

    fn handle_expose_event(&self, window: WindowId, exposed: RectInt) {
        self.record(WindowSystemEvent::Exposed { window, rect: exposed });
    }

    fn resize_maximized_windows(&self, display: DisplayId) {
        self.record(WindowSystemEvent::MaximizedResized(display));
    }
}

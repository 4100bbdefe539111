//! End-to-end behavior of the compositor on the headless platform.
//!
//! Surface callbacks arrive on the provider's worker thread, so every test
//! drives the UI loop the way the platform would: run until idle, wait for the
//! provider, run again.

use std::sync::Arc;

use mobicomp_buffer_manager::{PixelFormat, TRANSPARENT};
use mobicomp_compositor_core::headless::{
    HeadlessSurfaceProvider, HeadlessWindow, HeadlessWindowSystem, WindowSystemEvent,
};
use mobicomp_compositor_core::{
    Compositor, CompositorContext, DeadlockProtector, PlatformWindow, RedrawOutcome, SurfacePhase, UiLoop,
    UiSender, WindowFlags, WindowHandle, WindowKind,
};
use mobicomp_core::types::{ApplicationState, DisplayDescriptor, DisplayId, PointInt, RectInt, SizeInt};
use mobicomp_core::CoreConfig;
use pretty_assertions::assert_eq;
use rstest::rstest;

const RED: [u8; 4] = [0xff, 0, 0, 0xff];
const BLUE: [u8; 4] = [0, 0, 0xff, 0xff];
const PRIMARY: DisplayId = DisplayId::PRIMARY;
const FULL: RectInt = RectInt::from_coords(0, 0, 100, 100);

fn config(size: (u32, u32), available: (u32, u32), depth: u32) -> CoreConfig {
    let mut config = CoreConfig::default();
    config.display.width = size.0;
    config.display.height = size.1;
    config.display.available_width = available.0;
    config.display.available_height = available.1;
    config.raster.image_depth = depth;
    config
}

struct Harness {
    ui: UiLoop,
    provider: Arc<HeadlessSurfaceProvider>,
    system: Arc<HeadlessWindowSystem>,
}

impl Harness {
    fn new() -> Self {
        Self::with_config(config((100, 100), (100, 100), 32))
    }

    fn with_config(config: CoreConfig) -> Self {
        mobicomp_core::init_minimal_logging();
        let provider = Arc::new(HeadlessSurfaceProvider::new());
        let system = Arc::new(HeadlessWindowSystem::new());
        let mut ui = UiLoop::new(&config, provider.clone(), system.clone()).unwrap();
        ui.start().unwrap();
        Self { ui, provider, system }
    }

    fn compositor(&self) -> &Compositor {
        self.ui.manager().compositor(PRIMARY).unwrap()
    }

    fn compositor_mut(&mut self) -> &mut Compositor {
        self.ui.manager_mut().compositor_mut(PRIMARY).unwrap()
    }

    /// Runs the loop until both the UI thread and the provider are quiet.
    fn settle(&mut self) {
        self.ui.run_until_idle().unwrap();
        self.provider.flush();
        self.ui.run_until_idle().unwrap();
    }

    fn add(&mut self, window: &Arc<HeadlessWindow>) {
        let handle: WindowHandle = window.clone();
        self.system.register(handle.clone());
        self.compositor_mut().add_window(handle);
    }

    fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.provider.last_window().and_then(|w| w.pixel(x, y))
    }

    fn last_outcome(&self) -> Option<RedrawOutcome> {
        self.compositor().last_outcome()
    }
}

fn raster(geometry: RectInt, color: [u8; 4]) -> Arc<HeadlessWindow> {
    Arc::new(HeadlessWindow::filled(geometry, PixelFormat::Argb32Premultiplied, color))
}

#[test]
fn single_window_is_painted_and_rest_is_transparent() {
    let mut h = Harness::new();
    let a = raster(RectInt::from_coords(0, 0, 50, 50), RED);
    h.add(&a);
    h.compositor_mut().set_dirty(FULL);
    h.settle();

    assert_eq!(h.pixel(0, 0), Some(RED));
    assert_eq!(h.pixel(49, 49), Some(RED));
    assert_eq!(h.pixel(50, 49), Some(TRANSPARENT));
    assert_eq!(h.pixel(99, 99), Some(TRANSPARENT));
    assert!(h.compositor().damage().is_empty());
}

#[test]
fn front_window_covers_back_window() {
    let mut h = Harness::new();
    let back = raster(RectInt::from_coords(25, 25, 50, 50), BLUE);
    let front = raster(RectInt::from_coords(0, 0, 50, 50), RED);
    h.add(&back);
    h.add(&front);
    h.settle();

    assert_eq!(h.pixel(30, 30), Some(RED));
    assert_eq!(h.pixel(49, 30), Some(RED));
    assert_eq!(h.pixel(60, 60), Some(BLUE));
    assert_eq!(h.pixel(30, 60), Some(BLUE));
    assert_eq!(h.pixel(90, 10), Some(TRANSPARENT));
    assert_eq!(h.pixel(10, 90), Some(TRANSPARENT));
}

#[test]
fn surface_is_acquired_through_cross_thread_callback() {
    let mut h = Harness::new();
    assert_eq!(h.compositor().surface_phase(), SurfacePhase::Absent);
    h.add(&raster(RectInt::from_coords(10, 10, 20, 20), RED));
    assert!(h.compositor().update_pending());
    h.settle();

    let created = h.provider.created();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].1, PRIMARY);
    assert_eq!(created[0].2, FULL);
    assert_eq!(h.compositor().surface_phase(), SurfacePhase::Ready);
    assert_eq!(h.compositor().surface_id(), Some(created[0].0));
    // The ready callback damages the whole display.
    assert_eq!(h.last_outcome(), Some(RedrawOutcome::Presented { area: FULL }));
    assert!(h.compositor().frames_presented() >= 1);
    assert!(!h.compositor().update_pending());
}

#[test]
fn damage_bursts_coalesce_into_one_pass() {
    let mut h = Harness::new();
    h.add(&raster(FULL, RED));
    h.settle();
    let frames = h.compositor().frames_presented();

    let c = h.compositor_mut();
    c.set_dirty(RectInt::from_coords(0, 0, 10, 10));
    c.set_dirty(RectInt::from_coords(50, 50, 10, 10));
    c.schedule_update();
    assert_eq!(c.damage(), RectInt::from_coords(0, 0, 60, 60));
    h.settle();

    assert_eq!(h.compositor().frames_presented(), frames + 1);
    assert_eq!(
        h.last_outcome(),
        Some(RedrawOutcome::Presented { area: RectInt::from_coords(0, 0, 60, 60) })
    );
}

#[test]
fn damage_is_clipped_and_outside_damage_is_ignored() {
    let mut h = Harness::new();
    let c = h.compositor_mut();
    c.set_dirty(RectInt::from_coords(200, 200, 10, 10));
    assert!(c.damage().is_empty());
    c.set_dirty(RectInt::from_coords(90, -10, 50, 50));
    assert_eq!(c.damage(), RectInt::from_coords(90, 0, 10, 40));
}

#[test]
fn lock_failure_keeps_damage() {
    let mut h = Harness::new();
    h.add(&raster(FULL, RED));
    h.settle();

    let dirty = RectInt::from_coords(10, 10, 5, 5);
    h.provider.last_window().unwrap().fail_next_lock();
    h.compositor_mut().set_dirty(dirty);
    h.settle();
    assert_eq!(h.last_outcome(), Some(RedrawOutcome::LockFailed));
    assert_eq!(h.compositor().damage(), dirty);

    // The next damage event retries the same area.
    h.compositor_mut().set_dirty(dirty);
    h.settle();
    assert_eq!(h.last_outcome(), Some(RedrawOutcome::Presented { area: dirty }));
    assert!(h.compositor().damage().is_empty());
}

#[test]
fn post_failure_keeps_damage() {
    let mut h = Harness::new();
    h.add(&raster(FULL, RED));
    h.settle();

    let dirty = RectInt::from_coords(0, 0, 30, 30);
    let screen = h.provider.last_window().unwrap();
    let frames = screen.frames_posted();
    screen.fail_next_post();
    h.compositor_mut().set_dirty(dirty);
    h.settle();
    assert_eq!(h.last_outcome(), Some(RedrawOutcome::PostFailed));
    assert_eq!(h.compositor().damage(), dirty);
    assert_eq!(screen.frames_posted(), frames);
}

#[test]
fn unusable_buffer_is_released_and_damage_kept() {
    let mut h = Harness::new();
    h.add(&raster(FULL, RED));
    h.settle();

    let dirty = RectInt::from_coords(0, 0, 20, 20);
    let screen = h.provider.last_window().unwrap();
    let frames = screen.frames_posted();
    screen.corrupt_next_lock();
    h.compositor_mut().set_dirty(dirty);
    h.settle();
    assert_eq!(h.last_outcome(), Some(RedrawOutcome::InvalidBuffer));
    assert_eq!(h.compositor().damage(), dirty);
    assert_eq!(screen.frames_posted(), frames);
    assert!(!screen.is_locked());

    h.compositor_mut().set_dirty(dirty);
    h.settle();
    assert_eq!(h.last_outcome(), Some(RedrawOutcome::Presented { area: dirty }));
}

#[test]
fn failed_surface_creation_is_retried_on_next_damage() {
    let mut h = Harness::new();
    h.provider.fail_next_create(1);
    h.add(&raster(FULL, RED));
    h.settle();

    assert_eq!(h.last_outcome(), Some(RedrawOutcome::SurfaceUnavailable));
    assert_eq!(h.compositor().surface_phase(), SurfacePhase::Absent);
    let stale = h.compositor().surface_id().unwrap();
    assert!(!h.compositor().damage().is_empty());

    h.compositor_mut().set_dirty(FULL);
    h.settle();
    assert_eq!(h.provider.destroyed(), vec![stale]);
    assert_eq!(h.provider.created().len(), 2);
    assert!(matches!(h.last_outcome(), Some(RedrawOutcome::Presented { .. })));
    assert_eq!(h.pixel(5, 5), Some(RED));
}

#[test]
fn wait_is_skipped_while_protector_is_held() {
    let mut h = Harness::new();
    h.provider.pause_callbacks();
    let guard = h.ui.manager().protector().acquire().unwrap();
    h.add(&raster(FULL, RED));
    h.settle();

    assert_eq!(h.last_outcome(), Some(RedrawOutcome::WaitSkipped));
    assert_eq!(h.compositor().surface_phase(), SurfacePhase::Acquiring);
    assert_eq!(h.compositor().damage(), FULL);

    drop(guard);
    h.provider.resume_callbacks();
    h.settle();
    assert_eq!(h.last_outcome(), Some(RedrawOutcome::Presented { area: FULL }));
    assert!(!h.ui.manager().protector().is_held());
}

#[test]
fn backgrounding_releases_surface_until_next_damage() {
    let mut h = Harness::new();
    let a = raster(FULL, RED);
    h.add(&a);
    h.settle();
    let first = h.compositor().surface_id().unwrap();

    assert!(h.ui.sender().set_application_state(ApplicationState::Hidden));
    h.settle();
    assert_eq!(h.compositor().surface_phase(), SurfacePhase::Absent);
    assert_eq!(h.compositor().surface_id(), None);
    assert!(!h.compositor().has_surface());
    assert_eq!(h.provider.destroyed(), vec![first]);
    assert_eq!(a.application_states(), vec![ApplicationState::Hidden]);
    assert_eq!(h.ui.manager().application_state(), ApplicationState::Hidden);

    h.compositor_mut().set_dirty(RectInt::from_coords(0, 0, 10, 10));
    h.settle();
    let second = h.compositor().surface_id().unwrap();
    assert_ne!(first, second);
    assert!(matches!(h.last_outcome(), Some(RedrawOutcome::Presented { .. })));
}

#[test]
fn late_resize_answer_does_not_revive_released_surface() {
    let mut h = Harness::new();
    h.add(&raster(FULL, RED));
    h.settle();
    let first = h.compositor().surface_id().unwrap();

    h.provider.pause_callbacks();
    h.ui.sender().set_desktop_size(PRIMARY, 90, 90);
    h.ui.run_until_idle().unwrap();
    assert_eq!(h.compositor().surface_phase(), SurfacePhase::Acquiring);

    h.ui.sender().set_application_state(ApplicationState::Hidden);
    h.ui.run_until_idle().unwrap();
    assert_eq!(h.compositor().surface_id(), None);
    assert_eq!(h.provider.destroyed(), vec![first]);

    // The resize answer for the destroyed surface arrives now.
    h.provider.resume_callbacks();
    h.settle();
    assert_eq!(h.compositor().surface_phase(), SurfacePhase::Absent);
    assert!(!h.compositor().has_surface());
    assert_eq!(h.compositor().surface_id(), None);

    h.compositor_mut().set_dirty(RectInt::from_coords(0, 0, 90, 90));
    h.settle();
    let created = h.provider.created();
    assert_eq!(created.len(), 2);
    assert_eq!(h.compositor().surface_id(), Some(created[1].0));
    assert_ne!(created[1].0, first);
    assert_eq!(
        h.last_outcome(),
        Some(RedrawOutcome::Presented { area: RectInt::from_coords(0, 0, 90, 90) })
    );
}

#[test]
fn inactive_state_keeps_surface() {
    let mut h = Harness::new();
    let a = raster(FULL, RED);
    h.add(&a);
    h.settle();

    h.ui.sender().set_application_state(ApplicationState::Inactive);
    h.settle();
    assert!(h.compositor().has_surface());
    assert_eq!(a.application_states(), vec![ApplicationState::Inactive]);
}

#[test]
fn available_geometry_from_zero_exposes_windows_and_resizes_surface() {
    let mut h = Harness::with_config(config((200, 300), (100, 100), 32));
    let a = raster(RectInt::from_coords(0, 0, 50, 60), RED);
    h.add(&a);
    let hidden_size: WindowHandle = Arc::new(HeadlessWindow::new(
        WindowKind::Normal,
        WindowFlags::RASTER,
        RectInt::from_coords(5, 5, 0, 0),
    ));
    h.system.register(hidden_size);
    h.settle();
    let id = h.compositor().surface_id().unwrap();

    let sender = h.ui.sender();
    sender.set_desktop_size(PRIMARY, 0, 0);
    h.settle();
    assert_eq!(h.compositor().available_geometry(), RectInt::EMPTY);
    assert_eq!(h.compositor().surface_phase(), SurfacePhase::Absent);
    h.system.take_events();

    let target = RectInt::from_coords(0, 0, 200, 300);
    sender.set_desktop_size(PRIMARY, 200, 300);
    h.settle();

    let events = h.system.take_events();
    let exposed: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, WindowSystemEvent::Exposed { .. }))
        .cloned()
        .collect();
    assert_eq!(
        exposed,
        vec![WindowSystemEvent::Exposed { window: a.id(), rect: RectInt::from_coords(0, 0, 50, 60) }]
    );
    assert!(events.contains(&WindowSystemEvent::ScreenGeometryChanged {
        display: PRIMARY,
        geometry: target,
        available: target,
    }));
    assert!(events.contains(&WindowSystemEvent::MaximizedResized(PRIMARY)));

    assert_eq!(h.provider.geometry_requests().last(), Some(&(id, target)));
    assert_eq!(h.compositor().surface_id(), Some(id));
    assert_eq!(h.provider.last_window().unwrap().size(), SizeInt::new(200, 300));
    assert_eq!(h.last_outcome(), Some(RedrawOutcome::Presented { area: target }));
    assert_eq!(h.ui.manager().display(PRIMARY).unwrap().available_geometry, target);
}

#[test]
fn unchanged_available_geometry_is_ignored() {
    let mut h = Harness::new();
    assert!(!h.compositor_mut().set_available_geometry(FULL));
    assert!(h.system.events().is_empty());
}

#[test]
fn removing_last_raster_window_releases_surface() {
    let mut h = Harness::new();
    let a = raster(FULL, RED);
    h.add(&a);
    h.settle();
    let id = h.compositor().surface_id().unwrap();

    h.compositor_mut().remove_window(a.id());
    assert_eq!(h.compositor().raster_surfaces(), 0);
    h.settle();
    assert_eq!(h.last_outcome(), Some(RedrawOutcome::NoRasterWindows));
    assert_eq!(h.provider.destroyed(), vec![id]);
    assert_eq!(h.compositor().surface_phase(), SurfacePhase::Absent);
}

#[test]
fn compositing_windows_do_not_keep_a_surface() {
    let mut h = Harness::new();
    let accelerated = Arc::new(HeadlessWindow::new(
        WindowKind::Normal,
        WindowFlags::RASTER | WindowFlags::COMPOSITING,
        FULL,
    ));
    h.add(&accelerated);
    h.settle();
    assert_eq!(h.compositor().raster_surfaces(), 1);
    assert_eq!(h.last_outcome(), Some(RedrawOutcome::NoRasterWindows));
    assert!(h.provider.created().is_empty());
}

#[test]
fn unavailable_provider_leaves_damage_pending() {
    let mut h = Harness::new();
    h.provider.set_available(false);
    h.add(&raster(FULL, RED));
    h.settle();
    assert_eq!(h.last_outcome(), Some(RedrawOutcome::Idle));
    assert_eq!(h.compositor().damage(), FULL);
    assert!(h.provider.created().is_empty());
}

#[test]
fn stacking_reports_top_window() {
    let mut h = Harness::new();
    let normal = raster(RectInt::from_coords(0, 0, 10, 10), RED);
    let tool = Arc::new(HeadlessWindow::new(WindowKind::Tool, WindowFlags::RASTER, FULL));
    h.add(&normal);
    h.add(&tool);

    let events = h.system.take_events();
    assert_eq!(
        events,
        vec![
            WindowSystemEvent::Activated(Some(normal.id())),
            WindowSystemEvent::ActiveTopLevel(Some(normal.id())),
            WindowSystemEvent::Activated(Some(normal.id())),
            WindowSystemEvent::ActiveTopLevel(Some(normal.id())),
        ]
    );
    assert_eq!(normal.status_bar_updates(), 2);
    assert_eq!(tool.status_bar_updates(), 0);

    // tool is on top already; normal is already last.
    h.compositor_mut().raise(tool.id());
    h.compositor_mut().lower(normal.id());
    assert!(h.system.take_events().is_empty());

    h.compositor_mut().remove_window(normal.id());
    assert_eq!(
        h.system.take_events(),
        vec![WindowSystemEvent::Activated(None), WindowSystemEvent::ActiveTopLevel(None)]
    );
    assert!(h.compositor().top_window().is_none());
}

#[test]
fn raise_and_lower_restack_and_damage() {
    let mut h = Harness::new();
    let a = raster(RectInt::from_coords(0, 0, 40, 40), RED);
    let b = raster(RectInt::from_coords(20, 20, 40, 40), BLUE);
    h.add(&a);
    h.add(&b);
    h.settle();
    assert_eq!(h.pixel(30, 30), Some(BLUE));

    h.compositor_mut().raise(a.id());
    assert_eq!(h.compositor().window_stack().ids(), vec![a.id(), b.id()]);
    assert_eq!(h.compositor().damage(), RectInt::from_coords(0, 0, 40, 40));
    h.settle();
    assert_eq!(h.pixel(30, 30), Some(RED));

    h.compositor_mut().lower(a.id());
    assert_eq!(h.compositor().window_stack().ids(), vec![b.id(), a.id()]);
    h.settle();
    assert_eq!(h.pixel(30, 30), Some(BLUE));
    assert_eq!(h.compositor().top_window().map(|w| w.id()), Some(b.id()));
}

#[test]
fn raster_counter_tracks_stack_contents() {
    let mut h = Harness::new();
    let windows: Vec<Arc<HeadlessWindow>> = vec![
        raster(RectInt::from_coords(0, 0, 10, 10), RED),
        Arc::new(HeadlessWindow::new(WindowKind::Normal, WindowFlags::empty(), FULL)),
        Arc::new(HeadlessWindow::new(
            WindowKind::Popup,
            WindowFlags::RASTER | WindowFlags::HAS_PARENT,
            FULL,
        )),
        Arc::new(HeadlessWindow::new(WindowKind::Dialog, WindowFlags::HAS_PARENT, FULL)),
        raster(RectInt::from_coords(5, 5, 10, 10), BLUE),
    ];

    let check = |c: &Compositor| {
        let stack = c.window_stack();
        let raster_count = stack.iter().filter(|w| w.is_raster()).count();
        assert_eq!(c.raster_surfaces(), raster_count);
        assert!(stack.iter().all(|w| !(w.has_parent() && w.is_raster())));
        let mut ids = stack.ids();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), stack.len());
    };

    for w in &windows {
        h.add(w);
        check(h.compositor());
    }
    assert_eq!(h.compositor().window_stack().len(), 4);
    assert_eq!(h.compositor().raster_surfaces(), 2);

    let ops: [(usize, &str); 8] = [
        (0, "raise"),
        (4, "lower"),
        (1, "remove"),
        (2, "remove"),
        (0, "lower"),
        (0, "remove"),
        (4, "raise"),
        (4, "remove"),
    ];
    for (index, op) in ops {
        let id = windows[index].id();
        let c = h.compositor_mut();
        match op {
            "raise" => c.raise(id),
            "lower" => c.lower(id),
            _ => c.remove_window(id),
        }
        check(h.compositor());
    }
    assert_eq!(h.compositor().raster_surfaces(), 0);
    assert_eq!(h.compositor().window_stack().ids(), vec![windows[3].id()]);
}

#[test]
fn top_level_at_finds_front_visible_window() {
    let mut h = Harness::new();
    let back = raster(FULL, BLUE);
    let front = raster(RectInt::from_coords(40, 40, 20, 20), RED);
    h.add(&back);
    h.add(&front);

    let at = |h: &Harness, x, y| h.compositor().top_level_at(PointInt::new(x, y)).map(|w| w.id());
    assert_eq!(at(&h, 50, 50), Some(front.id()));
    assert_eq!(at(&h, 10, 10), Some(back.id()));
    front.set_visible(false);
    assert_eq!(at(&h, 50, 50), Some(back.id()));
    assert_eq!(at(&h, 150, 10), None);
}

#[test]
fn metrics_and_size_updates_are_queued() {
    let mut h = Harness::new();
    let sender = h.ui.sender();
    sender.set_display_metrics(PRIMARY, "INTERNAL", 60.0, 80.0, 2.0, 3.0);
    sender.set_screen_size(PRIMARY, 120, 160);
    // Nothing happens before the UI thread runs.
    assert_eq!(h.compositor().pixel_density(), 1.0);
    h.settle();

    let c = h.compositor();
    assert_eq!(c.logical_dpi(), (144.0, 144.0));
    assert_eq!(c.pixel_density(), 3.0);
    assert_eq!(c.physical_size().width, 60.0);
    assert_eq!(c.geometry(), RectInt::from_coords(0, 0, 120, 160));
    assert_eq!(h.ui.manager().default_display_pixel_density(), 3.0);
    assert_eq!(h.ui.manager().display(PRIMARY).unwrap().size, SizeInt::new(120, 160));
    assert!(h.system.events().contains(&WindowSystemEvent::ScreenGeometryChanged {
        display: PRIMARY,
        geometry: RectInt::from_coords(0, 0, 120, 160),
        available: FULL,
    }));
}

#[rstest]
#[case(16, PixelFormat::Rgb565)]
#[case(32, PixelFormat::Argb32Premultiplied)]
fn depth_selects_formats(#[case] depth: u32, #[case] format: PixelFormat) {
    let mut h = Harness::with_config(config((100, 100), (100, 100), depth));
    assert_eq!(h.compositor().depth(), depth);
    assert_eq!(h.compositor().format(), format);

    h.add(&raster(FULL, RED));
    h.settle();
    let screen = h.provider.last_window().unwrap();
    let expected = if depth == 16 { PixelFormat::Rgb565 } else { PixelFormat::Rgba8888Premultiplied };
    assert_eq!(screen.format(), expected);
    assert_eq!(screen.pixel(10, 10), Some(RED));
}

#[test]
fn displays_created_after_start_get_a_compositor() {
    let mut h = Harness::new();
    h.ui.manager_mut().create_screen(
        DisplayId(1),
        "EXTERNAL",
        SizeInt::new(64, 48),
        SizeInt::new(120, 90),
        SizeInt::new(64, 48),
        1.0,
        1.0,
    );
    let c = h.ui.manager().compositor(DisplayId(1)).unwrap();
    assert!(c.is_connected());
    assert_eq!(c.available_geometry(), RectInt::from_coords(0, 0, 64, 48));
    assert_eq!(h.ui.manager().compositor_count(), 2);
}

#[test]
fn shutdown_destroys_surfaces() {
    let mut h = Harness::new();
    h.add(&raster(FULL, RED));
    h.settle();
    let id = h.compositor().surface_id().unwrap();

    h.ui.shutdown();
    assert_eq!(h.provider.destroyed(), vec![id]);
    assert_eq!(h.ui.manager().compositor_count(), 0);
    assert!(h.ui.manager().registry().is_empty());
}

fn unconnected() -> Compositor {
    Compositor::new(
        DisplayDescriptor::default(),
        CompositorContext {
            provider: Arc::new(HeadlessSurfaceProvider::new()),
            window_system: Arc::new(HeadlessWindowSystem::new()),
            protector: DeadlockProtector::new(),
            ui: UiSender::detached(),
            depth: 32,
        },
    )
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "unconnected")]
fn stacking_before_connect_is_a_programming_error() {
    let mut c = unconnected();
    c.add_window(raster(FULL, RED));
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "added twice")]
fn adding_a_window_twice_is_a_programming_error() {
    let mut h = Harness::new();
    let a = raster(FULL, RED);
    h.add(&a);
    h.compositor_mut().add_window(a);
}

#[test]
fn unconnected_compositor_reports_metrics() {
    let c = unconnected();
    assert!(!c.is_connected());
    assert_eq!(c.geometry(), RectInt::from_coords(0, 0, 320, 455));
    assert_eq!(c.surface_phase(), SurfacePhase::Absent);
    assert_eq!(c.raster_surfaces(), 0);
}

//! Headless compositor demo.
//!
//! Loads the configuration, initializes logging, composes two overlapping
//! windows on the in-memory platform and reports the presented frame.

use std::sync::Arc;

use mobicomp_buffer_manager::PixelFormat;
use mobicomp_compositor_core::headless::{HeadlessSurfaceProvider, HeadlessWindow, HeadlessWindowSystem};
use mobicomp_compositor_core::{CompositorError, PlatformWindow, RedrawOutcome, UiLoop, WindowHandle};
use mobicomp_core::logging::{init_minimal_logging, initialize_logging, shutdown_logging};
use mobicomp_core::types::{DisplayId, RectInt};
use mobicomp_core::{ConfigLoader, CoreConfig};

const RED: [u8; 4] = [0xff, 0, 0, 0xff];
const BLUE: [u8; 4] = [0, 0, 0xff, 0xff];

/// Installs the subscriber described by `config`. Falls back to stderr
/// logging when it cannot be installed; returns whether the configured one
/// is active.
fn start_logging(config: &CoreConfig) -> bool {
    match initialize_logging(&config.logging, false) {
        Ok(()) => true,
        Err(e) => {
            init_minimal_logging();
            tracing::warn!("Configured logging unavailable, using stderr: {}", e);
            false
        }
    }
}

fn run(config: &CoreConfig) -> Result<(), CompositorError> {
    tracing::info!(display = %config.display.name, depth = config.raster.image_depth, "Starting headless compositor");

    let provider = Arc::new(HeadlessSurfaceProvider::new());
    let window_system = Arc::new(HeadlessWindowSystem::new());
    let mut ui = UiLoop::new(config, provider.clone(), window_system.clone())?;
    ui.start()?;

    let display = DisplayId(config.display.id);
    let available = ui
        .manager()
        .compositor(display)
        .map(|c| c.available_geometry())
        .ok_or(CompositorError::UnknownDisplay(display))?;
    let format = PixelFormat::for_depth(config.raster.image_depth);

    let back = RectInt::from_coords(0, 0, available.width() / 2 + 20, available.height() / 2 + 20);
    let front = RectInt::from_coords(
        available.width() as i32 / 2 - 20,
        available.height() as i32 / 2 - 20,
        available.width() / 2 + 20,
        available.height() / 2 + 20,
    );
    let windows: Vec<WindowHandle> = vec![
        Arc::new(HeadlessWindow::filled(back, format, BLUE)),
        Arc::new(HeadlessWindow::filled(front, format, RED)),
    ];

    let compositor = ui.manager_mut().require_compositor(display)?;
    for window in &windows {
        window_system.register(window.clone());
        compositor.add_window(window.clone());
    }

    // The first tick requests the surface; its callback damages the whole
    // display and a second tick presents everything.
    let iterations = ui.run_until_idle()?;
    provider.flush();
    ui.run_until_idle()?;

    let Some(compositor) = ui.manager().compositor(display) else {
        return Err(CompositorError::UnknownDisplay(display));
    };
    let outcome = compositor.last_outcome();
    tracing::info!(?outcome, iterations, frames = compositor.frames_presented(), "Compositing finished");

    match (outcome, provider.last_window()) {
        (Some(RedrawOutcome::Presented { area }), Some(screen)) => {
            let probe = |x: i32, y: i32| screen.pixel(x as u32, y as u32);
            println!("presented {:?} on display {}", area, display);
            println!("  back window at {:?}: {:?}", back.top_left(), probe(back.x(), back.y()));
            println!("  front window at {:?}: {:?}", front.top_left(), probe(front.x(), front.y()));
            println!("  top window: {:?}", compositor.top_window().map(|w| w.id()));
        }
        (outcome, _) => {
            tracing::warn!(?outcome, "No frame was presented");
        }
    }

    ui.shutdown();
    Ok(())
}

fn main() {
    let config = match ConfigLoader::load() {
        Ok(config) => config,
        Err(e) => {
            init_minimal_logging();
            tracing::error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    start_logging(&config);

    let code = match run(&config) {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!("Headless compositor failed: {}", e);
            1
        }
    };
    shutdown_logging();
    std::process::exit(code);
}

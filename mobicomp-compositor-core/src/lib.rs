//! # Mobicomp Compositor Core
//!
//! The per-display software raster compositor.
//!
//! - [`window`]: how the compositor sees toolkit windows and reports back to
//!   the windowing system.
//! - [`stack`], [`damage`], [`region`]: the window stack and damage bookkeeping.
//! - [`surface`], [`protector`]: the native surface lifecycle and the
//!   cross-thread handshake with the surface provider.
//! - [`compositor`]: stacking operations, redraw scheduling and the
//!   compositing pass.
//! - [`screens`], [`scheduler`]: the process-wide screen manager and the UI
//!   event loop that drives it.
//! - [`headless`]: an in-memory platform for the demo binary and tests.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use mobicomp_compositor_core::headless::{HeadlessSurfaceProvider, HeadlessWindowSystem};
//! use mobicomp_compositor_core::UiLoop;
//!
//! let config = mobicomp_core::ConfigLoader::load()?;
//! let mut ui = UiLoop::new(&config, Arc::new(HeadlessSurfaceProvider::new()), Arc::new(HeadlessWindowSystem::new()))?;
//! ui.start()?;
//! ui.run_until_idle()?;
//! ```

pub mod compositor;
pub mod damage;
pub mod error;
pub mod headless;
pub mod protector;
pub mod region;
pub mod scheduler;
pub mod screens;
pub mod stack;
pub mod surface;
pub mod window;

pub use compositor::{composite, Compositor, CompositorContext, RedrawOutcome};
pub use damage::DamageTracker;
pub use error::{CompositorError, Result};
pub use protector::{DeadlockProtector, ProtectorGuard};
pub use region::Region;
pub use scheduler::{UiLoop, UiSender, UiTask};
pub use screens::ScreenManager;
pub use stack::WindowStack;
pub use surface::{SurfaceClient, SurfacePhase, SurfaceProvider, SurfaceShared};
pub use window::{PlatformWindow, WindowFlags, WindowHandle, WindowId, WindowKind, WindowSystem};

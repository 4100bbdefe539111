//! Core data types used throughout Mobicomp.
//!
//! - **Geometry**: [`PointInt`], [`SizeInt`], [`RectInt`] and the generic [`Size`].
//! - **Display**: the per-display [`DisplayDescriptor`] and the [`DisplayRegistry`]
//!   that owns one descriptor per display id.
//! - **Orientation**: [`ScreenOrientation`] and the application lifecycle
//!   [`ApplicationState`].

pub mod display;
pub mod geometry;
pub mod orientation;

pub use display::{DisplayDescriptor, DisplayId, DisplayRegistry};
pub use geometry::{PointInt, RectInt, Size, SizeInt};
pub use orientation::{ApplicationState, ScreenOrientation};

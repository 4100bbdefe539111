//! Per-display identity and metrics.
//!
//! A [`DisplayDescriptor`] carries everything a compositor needs to know about
//! the display it drives: identity, physical size, densities, the logical size
//! in pixels and the available geometry (the area not reserved for system bars).
//! The [`DisplayRegistry`] is populated at startup, before the first window is
//! created, and cleared at shutdown.

use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::config::DisplayConfig;
use crate::error::CoreError;
use crate::types::geometry::{RectInt, Size, SizeInt};

/// Points per inch used to turn a scaled density into a logical DPI.
pub const POINTS_PER_INCH: f64 = 72.0;

/// Integer display id, unique and stable for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct DisplayId(pub i32);

impl DisplayId {
    /// The built-in display.
    pub const PRIMARY: DisplayId = DisplayId(0);
}

impl fmt::Display for DisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity and metrics of one logical display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayDescriptor {
    pub id: DisplayId,
    pub name: String,
    /// Physical size in millimetres.
    pub physical_size: Size<f64>,
    pub scaled_density: f64,
    pub density: f64,
    /// Logical size in pixels.
    pub size: SizeInt,
    /// Usable area, origin at `(0, 0)`, never larger than `size`.
    pub available_geometry: RectInt,
}

impl DisplayDescriptor {
    /// Creates a descriptor with an explicit set of metrics.
    pub fn new(
        id: DisplayId,
        name: impl Into<String>,
        physical_size: Size<f64>,
        scaled_density: f64,
        density: f64,
        size: SizeInt,
        available_geometry: RectInt,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            physical_size,
            scaled_density,
            density,
            size,
            available_geometry,
        }
    }

    /// Builds the descriptor described by a `[display]` configuration section.
    pub fn from_config(config: &DisplayConfig) -> Self {
        Self::new(
            DisplayId(config.id),
            config.name.clone(),
            Size::new(config.physical_width_mm, config.physical_height_mm),
            config.scaled_density,
            config.density,
            SizeInt::new(config.width, config.height),
            RectInt::from_coords(0, 0, config.available_width, config.available_height),
        )
    }

    /// Full logical geometry, `(0, 0, size)`.
    pub fn geometry(&self) -> RectInt {
        RectInt::from_size(self.size)
    }

    /// Logical DPI on both axes: `scaled_density * 72`.
    pub fn logical_dpi(&self) -> (f64, f64) {
        let dpi = self.scaled_density * POINTS_PER_INCH;
        (dpi, dpi)
    }

    pub fn pixel_density(&self) -> f64 {
        self.density
    }
}

impl Default for DisplayDescriptor {
    fn default() -> Self {
        Self::from_config(&DisplayConfig::default())
    }
}

/// Display id → descriptor map owned by the platform integration.
#[derive(Debug, Clone, Default)]
pub struct DisplayRegistry {
    displays: BTreeMap<DisplayId, DisplayDescriptor>,
}

impl DisplayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the single startup display from configuration.
    pub fn from_config(config: &DisplayConfig) -> Self {
        let mut registry = Self::new();
        registry.register(DisplayDescriptor::from_config(config));
        registry
    }

    /// Adds a display, replacing and returning any descriptor already
    /// registered under the same id.
    pub fn register(&mut self, descriptor: DisplayDescriptor) -> Option<DisplayDescriptor> {
        tracing::debug!(display = %descriptor.id, name = %descriptor.name, "Registering display");
        self.displays.insert(descriptor.id, descriptor)
    }

    /// Registers a display from the raw values the platform reports at
    /// startup: available size, physical size in millimetres, logical size and
    /// the two densities.
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
        self.register(DisplayDescriptor::new(
            id,
            name,
            Size::new(physical_mm.width as f64, physical_mm.height as f64),
            scaled_density,
            density,
            size,
            RectInt::from_size(available),
        ));
    }

    pub fn get(&self, id: DisplayId) -> Option<&DisplayDescriptor> {
        self.displays.get(&id)
    }

    pub fn get_mut(&mut self, id: DisplayId) -> Option<&mut DisplayDescriptor> {
        self.displays.get_mut(&id)
    }

    /// Like [`get`](Self::get), but an unknown id is an error.
    pub fn require(&self, id: DisplayId) -> Result<&DisplayDescriptor, CoreError> {
        self.get(id).ok_or(CoreError::UnknownDisplay(id.0))
    }

    /// Pixel density of the primary display, if it is registered.
    pub fn default_pixel_density(&self) -> Option<f64> {
        self.get(DisplayId::PRIMARY).map(DisplayDescriptor::pixel_density)
    }

    pub fn ids(&self) -> impl Iterator<Item = DisplayId> + '_ {
        self.displays.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DisplayDescriptor> {
        self.displays.values()
    }

    pub fn len(&self) -> usize {
        self.displays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.displays.is_empty()
    }

    /// Drops every descriptor. Called on shutdown.
    pub fn clear(&mut self) {
        self.displays.clear();
    }
}

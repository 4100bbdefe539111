//! Damage accumulation.
//!
//! The damage of a display is a single rectangle: the bounding box of every
//! area invalidated since the last successful present, clipped to the
//! available geometry.

use mobicomp_core::types::RectInt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DamageTracker {
    dirty: RectInt,
}

impl DamageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clips `rect` to `available` and unions the result into the damage.
    /// Returns true if the damage grew.
    pub fn add(&mut self, rect: RectInt, available: &RectInt) -> bool {
        let Some(clipped) = rect.intersection(available) else {
            return false;
        };
        let grown = self.dirty.union(&clipped);
        let changed = grown != self.dirty;
        self.dirty = grown;
        changed
    }

    pub fn dirty(&self) -> RectInt {
        self.dirty
    }

    pub fn is_empty(&self) -> bool {
        self.dirty.is_empty()
    }

    /// Forgets all damage; called only after a successful present.
    pub fn clear(&mut self) {
        self.dirty = RectInt::EMPTY;
    }
}

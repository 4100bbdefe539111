//! Regions: sets of pixels stored as disjoint rectangles.
//!
//! The compositing pass uses a region to track the part of the damage that
//! no window has claimed yet.

use mobicomp_core::types::{PointInt, RectInt};

/// A set of pixels represented by non-overlapping, non-empty rectangles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Region {
    rectangles: Vec<RectInt>,
}

/// Splits `a - b` into up to four disjoint rectangles: full-width bands above
/// and below `b`, then the left and right parts of the middle band.
fn subtract_rect(a: RectInt, b: &RectInt) -> Vec<RectInt> {
    let Some(overlap) = a.intersection(b) else {
        return vec![a];
    };

    let mut pieces = Vec::with_capacity(4);
    if a.top() < overlap.top() {
        pieces.push(RectInt::from_edges(a.left(), a.top(), a.right(), overlap.top()));
    }
    if overlap.bottom() < a.bottom() {
        pieces.push(RectInt::from_edges(a.left(), overlap.bottom(), a.right(), a.bottom()));
    }
    if a.left() < overlap.left() {
        pieces.push(RectInt::from_edges(a.left(), overlap.top(), overlap.left(), overlap.bottom()));
    }
    if overlap.right() < a.right() {
        pieces.push(RectInt::from_edges(overlap.right(), overlap.top(), a.right(), overlap.bottom()));
    }
    pieces
}

impl Region {
    /// Creates a new, empty `Region`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rect(rect: RectInt) -> Self {
        let mut region = Self::new();
        region.add(rect);
        region
    }

    pub fn is_empty(&self) -> bool {
        self.rectangles.is_empty()
    }

    pub fn clear(&mut self) {
        self.rectangles.clear();
    }

    /// The disjoint rectangles making up the region.
    pub fn rects(&self) -> &[RectInt] {
        &self.rectangles
    }

    /// Number of pixels in the region.
    pub fn area(&self) -> u64 {
        self.rectangles
            .iter()
            .map(|r| r.width() as u64 * r.height() as u64)
            .sum()
    }

    pub fn bounding_rect(&self) -> RectInt {
        self.rectangles
            .iter()
            .fold(RectInt::EMPTY, |acc, r| acc.union(r))
    }

    pub fn contains_point(&self, point: PointInt) -> bool {
        self.rectangles.iter().any(|r| r.contains_point(point))
    }

    /// Adds `rect` to the region. Only the parts not already covered are
    /// stored, so the rectangles stay disjoint.
    pub fn add(&mut self, rect: RectInt) {
        if rect.is_empty() {
            return;
        }
        let mut fresh = vec![rect];
        for existing in &self.rectangles {
            fresh = fresh
                .into_iter()
                .flat_map(|piece| subtract_rect(piece, existing))
                .collect();
            if fresh.is_empty() {
                return;
            }
        }
        self.rectangles.extend(fresh);
    }

    /// Removes `rect` from the region, fragmenting rectangles it overlaps.
    pub fn subtract(&mut self, rect: RectInt) {
        if rect.is_empty() || self.rectangles.is_empty() {
            return;
        }
        self.rectangles = self
            .rectangles
            .iter()
            .flat_map(|existing| subtract_rect(*existing, &rect))
            .collect();
    }

    /// The parts of the region that fall inside `rect`, as disjoint rectangles.
    pub fn intersections(&self, rect: &RectInt) -> Vec<RectInt> {
        self.rectangles
            .iter()
            .filter_map(|r| r.intersection(rect))
            .collect()
    }
}

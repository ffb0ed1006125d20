//! Viewport Module - Intersection observation behind a port
//!
//! Trackers never talk to a windowing system directly. They register with an
//! [`ObservabilityPort`] and receive [`IntersectionEntry`] notifications.
//!
//! - [`GeometryViewport`] - computes ratios from layout bounds and scroll offset
//! - [`ManualViewport`] - delivers synthetic ratios (tests, scripted demos)

mod geometry;
mod manual;

pub use geometry::*;
pub use manual::*;

use std::rc::Rc;

use crate::types::{ElementId, ObserverId, RootMargin};

// =============================================================================
// TYPES
// =============================================================================

/// One visibility notification for an observed element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub element: ElementId,
    /// Fraction of the element's area inside the margin-adjusted viewport
    pub ratio: f32,
    pub is_intersecting: bool,
}

impl IntersectionEntry {
    /// Whether this entry satisfies `threshold`.
    pub fn qualifies(&self, threshold: f32) -> bool {
        self.is_intersecting && self.ratio >= threshold
    }
}

/// Options passed along with each observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserveOptions {
    pub threshold: f32,
    pub root_margin: RootMargin,
}

impl Default for ObserveOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin: RootMargin::default(),
        }
    }
}

pub type IntersectionCallback = Rc<dyn Fn(IntersectionEntry)>;

// =============================================================================
// PORT
// =============================================================================

/// Host capability for viewport intersection observation.
pub trait ObservabilityPort {
    /// Start delivering intersection entries for `element` to `callback`.
    fn observe(
        &self,
        element: ElementId,
        options: ObserveOptions,
        callback: IntersectionCallback,
    ) -> ObserverId;

    /// Stop an observation. Unknown or already removed ids are ignored.
    fn unobserve(&self, observer: ObserverId);

    /// Number of children `element` currently has.
    fn child_count(&self, element: ElementId) -> usize;
}

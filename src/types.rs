//! Core types - element handles, layout bounds, root margins
//!
//! Elements are opaque handles owned by the host layout layer. The motion
//! controllers never look inside them; they only pass them to an
//! [`ObservabilityPort`](crate::viewport::ObservabilityPort).

use std::fmt;
use std::str::FromStr;

use taffy::{Point, Rect, Size};

use crate::error::ConfigError;

// =============================================================================
// HANDLES
// =============================================================================

/// Opaque handle to a renderable node (component index in the host layout).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u32);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to a single observation registered with a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(pub u64);

// =============================================================================
// BOUNDS
// =============================================================================

/// Axis-aligned layout box in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub location: Point<f32>,
    pub size: Size<f32>,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            location: Point { x, y },
            size: Size {
                width: width.max(0.0),
                height: height.max(0.0),
            },
        }
    }

    pub fn right(&self) -> f32 {
        self.location.x + self.size.width
    }

    pub fn bottom(&self) -> f32 {
        self.location.y + self.size.height
    }

    pub fn area(&self) -> f32 {
        self.size.width * self.size.height
    }

    /// Area shared with `other` (0.0 when disjoint).
    pub fn intersection_area(&self, other: &Bounds) -> f32 {
        let w = self.right().min(other.right()) - self.location.x.max(other.location.x);
        let h = self.bottom().min(other.bottom()) - self.location.y.max(other.location.y);
        if w <= 0.0 || h <= 0.0 {
            0.0
        } else {
            w * h
        }
    }

    /// Inclusive point containment.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.location.x && x <= self.right() && y >= self.location.y && y <= self.bottom()
    }

    /// Fraction of this box's area visible inside `viewport`.
    ///
    /// Zero-area boxes count as fully visible when their origin lies inside.
    pub fn visible_ratio(&self, viewport: &Bounds) -> f32 {
        let area = self.area();
        if area <= 0.0 {
            return if viewport.contains(self.location.x, self.location.y) {
                1.0
            } else {
                0.0
            };
        }
        (self.intersection_area(viewport) / area).clamp(0.0, 1.0)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}

// =============================================================================
// ROOT MARGIN
// =============================================================================

/// Inset applied to the viewport before intersection testing, in pixels.
///
/// Positive values grow the viewport, negative values shrink it. The default
/// (`-50px` bottom) makes elements count as visible slightly after their top
/// edge crosses the bottom of the screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootMargin(pub Rect<f32>);

impl RootMargin {
    pub const ZERO: RootMargin = RootMargin(Rect {
        left: 0.0,
        right: 0.0,
        top: 0.0,
        bottom: 0.0,
    });

    /// Build from CSS order: top, right, bottom, left.
    pub fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self(Rect {
            left,
            right,
            top,
            bottom,
        })
    }

    pub fn top(&self) -> f32 {
        self.0.top
    }

    pub fn right(&self) -> f32 {
        self.0.right
    }

    pub fn bottom(&self) -> f32 {
        self.0.bottom
    }

    pub fn left(&self) -> f32 {
        self.0.left
    }

    /// Grow (or shrink) `viewport` by this margin.
    pub fn apply(&self, viewport: &Bounds) -> Bounds {
        Bounds::new(
            viewport.location.x - self.left(),
            viewport.location.y - self.top(),
            viewport.size.width + self.left() + self.right(),
            viewport.size.height + self.top() + self.bottom(),
        )
    }
}

impl Default for RootMargin {
    fn default() -> Self {
        Self::new(0.0, 0.0, -50.0, 0.0)
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}px {}px {}px {}px",
            self.top(),
            self.right(),
            self.bottom(),
            self.left()
        )
    }
}

fn parse_length(token: &str) -> Option<f32> {
    let number = token.strip_suffix("px").unwrap_or(token);
    let value: f32 = number.parse().ok()?;
    // Bare numbers are only valid CSS for zero
    if !token.ends_with("px") && value != 0.0 {
        return None;
    }
    value.is_finite().then_some(value)
}

impl FromStr for RootMargin {
    type Err = ConfigError;

    /// Parse CSS margin shorthand: `"10px"`, `"10px 0"`, `"0 0 -50px 0"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidRootMargin(s.to_string());

        let values = s
            .split_whitespace()
            .map(parse_length)
            .collect::<Option<Vec<f32>>>()
            .ok_or_else(invalid)?;

        match values.as_slice() {
            [all] => Ok(Self::new(*all, *all, *all, *all)),
            [vertical, horizontal] => Ok(Self::new(*vertical, *horizontal, *vertical, *horizontal)),
            [top, horizontal, bottom] => Ok(Self::new(*top, *horizontal, *bottom, *horizontal)),
            [top, right, bottom, left] => Ok(Self::new(*top, *right, *bottom, *left)),
            _ => Err(invalid()),
        }
    }
}

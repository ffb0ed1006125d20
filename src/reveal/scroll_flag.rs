//! Scroll flag - boolean derived from the page scroll offset
//!
//! Drives "has the page scrolled" styling (compact navbar, shadow).
//! Bidirectional and immediate: no delay, no one-shot.

use spark_signals::{signal, Signal};
use tracing::trace;

use crate::error::ConfigError;

/// Scroll offset past which the page counts as scrolled.
pub const DEFAULT_SCROLL_THRESHOLD: f32 = 20.0;

/// Tracks whether the scroll offset has passed a threshold.
pub struct ScrollFlag {
    threshold: f32,
    scrolled: Signal<bool>,
}

impl ScrollFlag {
    pub fn new(threshold: f32) -> Result<Self, ConfigError> {
        if !threshold.is_finite() {
            return Err(ConfigError::InvalidThreshold(threshold));
        }
        Ok(Self {
            threshold,
            scrolled: signal(false),
        })
    }

    /// Feed the current vertical scroll offset.
    pub fn update(&self, scroll_y: f32) {
        let scrolled = scroll_y > self.threshold;
        if scrolled != self.scrolled.get() {
            trace!(scroll_y, scrolled, "scroll flag changed");
            self.scrolled.set(scrolled);
        }
    }

    pub fn is_scrolled(&self) -> bool {
        self.scrolled.get()
    }

    pub fn signal(&self) -> Signal<bool> {
        self.scrolled.clone()
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}

impl Default for ScrollFlag {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_SCROLL_THRESHOLD,
            scrolled: signal(false),
        }
    }
}

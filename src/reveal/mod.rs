//! Reveal Module - Viewport-driven entrance state
//!
//! - **RevealTracker** - one element, `is_in_view` with optional delay
//! - **StaggerTracker** - a container's children, revealed one by one
//! - **ScrollFlag** - page scrolled past a pixel threshold
//!
//! Trackers own their observation and timers. Dropping a tracker (or calling
//! `detach`) cancels every pending reveal and removes the observation.

mod scroll_flag;
mod stagger;
mod tracker;

pub use scroll_flag::*;
pub use stagger::*;
pub use tracker::*;

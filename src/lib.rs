//! # spark-motion
//!
//! Viewport-driven reveal, staggered entrances and carousel navigation for
//! Rust UIs.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for
//! fine-grained reactivity: every observable output is a `Signal` that
//! components read inside effects and deriveds.
//!
//! ## Architecture
//!
//! Controllers are leaves. They talk to the host through two small ports and
//! own nothing else:
//!
//! ```text
//! ObservabilityPort ──► RevealTracker / StaggerTracker ──► Signal<bool> / Signal<Vec<usize>>
//! Scheduler         ──► CarouselController             ──► Signal<usize> / Signal<bool>
//! ```
//!
//! Everything is single-threaded. Timers and observations are owned per
//! instance and released when the instance is dropped.
//!
//! ## Modules
//!
//! - [`types`] - Element handles, bounds, root margins
//! - [`scheduler`] - Timer abstraction, deterministic queue, frame clock
//! - [`viewport`] - Intersection port, geometry and manual implementations
//! - [`reveal`] - Reveal, stagger and scroll-flag trackers
//! - [`carousel`] - Carousel state machine, swipes, controls
//! - [`tilt`] - Seeded tilt angles for scrapbook cards
//! - [`lightbox`] - Gallery item selection
//! - [`input`] - crossterm events to motion actions

pub mod carousel;
pub mod error;
pub mod input;
pub mod lightbox;
pub mod reveal;
pub mod scheduler;
pub mod tilt;
pub mod types;
pub mod viewport;

// Re-export commonly used items
pub use types::*;

pub use error::ConfigError;

pub use scheduler::{noop_cancel, Cancel, FrameClock, Scheduler, TimerQueue};

pub use viewport::{
    GeometryViewport, IntersectionCallback, IntersectionEntry, ManualViewport,
    ObservabilityPort, ObserveOptions,
};

pub use reveal::{
    RevealOptions, RevealTracker, ScrollFlag, StaggerOptions, StaggerTracker,
    DEFAULT_SCROLL_THRESHOLD,
};

pub use carousel::{
    classify_swipe, progress_fraction, CarouselController, CarouselControls, CarouselOptions,
    ReadingDirection, SwipeGesture, SwipeTracker, DEFAULT_SWIPE_THRESHOLD,
};

pub use tilt::{assign_angles, try_assign_angles, TiltAngles, DEFAULT_TILT_RANGE};

pub use lightbox::Lightbox;

pub use input::{apply_to_carousel, convert_event, MotionInput, TerminalInput};

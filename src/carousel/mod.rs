//! Carousel Module - Navigation state for a bounded sequence of items
//!
//! - **CarouselController** - active index, transition lock, autoplay, touch
//! - **SwipeTracker** - touch samples to [`SwipeGesture`]
//! - **CarouselControls** - which chrome (arrows, dots, progress) to render
//!
//! The controller owns no rendering. Consumers read `active_index_signal()`
//! and `transitioning_signal()` and draw accordingly.

mod controller;
mod controls;
mod swipe;

pub use controller::*;
pub use controls::*;
pub use swipe::*;

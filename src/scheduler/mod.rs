//! Scheduler Module - Per-instance timers for delayed reveals and autoplay
//!
//! Every tracker and controller receives its own scheduler handle instead of
//! touching global timers. Two implementations ship:
//!
//! - [`TimerQueue`] - deterministic queue advanced explicitly (tests, replay)
//! - [`FrameClock`] - pumps a `TimerQueue` from wall-clock time once per frame
//!
//! # Example
//!
//! ```ignore
//! use spark_motion::scheduler::{Scheduler, TimerQueue};
//!
//! let queue = TimerQueue::new();
//! let cancel = queue.after(300, Box::new(|| println!("fired")));
//!
//! queue.advance_by(299); // nothing yet
//! queue.advance_by(1);   // "fired"
//! cancel();              // already fired, no-op
//! ```

mod timer_queue;

pub use timer_queue::*;

use std::rc::Rc;

/// Cancels a scheduled task. Safe to call after the task has fired.
pub type Cancel = Box<dyn FnOnce()>;

/// Source of one-shot and repeating timers.
pub trait Scheduler {
    /// Current time in milliseconds on this scheduler's clock.
    fn now_ms(&self) -> u64;

    /// Run `task` once, `delay_ms` from now.
    fn after(&self, delay_ms: u64, task: Box<dyn FnOnce()>) -> Cancel;

    /// Run `task` every `interval_ms` until cancelled.
    fn every(&self, interval_ms: u64, task: Rc<dyn Fn()>) -> Cancel;
}

/// A cancel handle that does nothing.
pub fn noop_cancel() -> Cancel {
    Box::new(|| {})
}

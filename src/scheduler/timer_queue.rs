//! Deterministic timer queue and its wall-clock driver.
//!
//! Timers are keyed by `(due_ms, sequence)` so timers due at the same instant
//! run in the order they were scheduled.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::{Rc, Weak};
use std::time::Instant;

use tracing::trace;

use super::{Cancel, Scheduler};

// =============================================================================
// QUEUE STATE
// =============================================================================

enum Task {
    Once(Box<dyn FnOnce()>),
    Repeat { interval_ms: u64, task: Rc<dyn Fn()> },
}

type TimerKey = (u64, u64);

#[derive(Default)]
struct QueueState {
    now_ms: u64,
    next_seq: u64,
    next_id: u64,
    /// Pending timers in firing order
    timers: BTreeMap<TimerKey, (u64, Task)>,
    /// Timer id -> current key (repeating timers move on every fire)
    keys: HashMap<u64, TimerKey>,
}

impl QueueState {
    fn insert(&mut self, id: u64, due_ms: u64, task: Task) {
        let key = (due_ms, self.next_seq);
        self.next_seq += 1;
        self.timers.insert(key, (id, task));
        self.keys.insert(id, key);
    }

    fn remove(&mut self, id: u64) -> bool {
        match self.keys.remove(&id) {
            Some(key) => self.timers.remove(&key).is_some(),
            None => false,
        }
    }

    /// Pop the earliest timer due at or before `target_ms`.
    fn pop_due(&mut self, target_ms: u64) -> Option<(u64, u64, Task)> {
        let (&key, _) = self.timers.iter().next()?;
        if key.0 > target_ms {
            return None;
        }
        let (id, task) = self.timers.remove(&key)?;
        self.keys.remove(&id);
        Some((key.0, id, task))
    }
}

// =============================================================================
// TIMER QUEUE
// =============================================================================

/// Single-threaded timer queue with a manually advanced clock.
///
/// Clones share the same queue. Tasks run on the thread that advances the
/// queue and may freely schedule or cancel timers, including themselves.
#[derive(Clone, Default)]
pub struct TimerQueue {
    state: Rc<RefCell<QueueState>>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (scheduled, not cancelled) timers.
    pub fn pending(&self) -> usize {
        self.state.borrow().timers.len()
    }

    /// Due time of the next timer, if any.
    pub fn next_due_ms(&self) -> Option<u64> {
        self.state.borrow().timers.keys().next().map(|key| key.0)
    }

    /// Advance the clock by `delta_ms`, running every timer that comes due.
    pub fn advance_by(&self, delta_ms: u64) {
        let target = self.now_ms().saturating_add(delta_ms);
        self.advance_to(target);
    }

    /// Advance the clock to `target_ms`, running every timer that comes due.
    ///
    /// Moving backwards is ignored.
    pub fn advance_to(&self, target_ms: u64) {
        loop {
            // Release the borrow before running the task
            let next = {
                let mut state = self.state.borrow_mut();
                let popped = state.pop_due(target_ms);
                if let Some((due_ms, _, _)) = &popped {
                    state.now_ms = state.now_ms.max(*due_ms);
                }
                popped
            };

            let Some((due_ms, id, task)) = next else {
                break;
            };

            trace!(timer = id, due_ms, "timer fired");
            match task {
                Task::Once(task) => task(),
                Task::Repeat { interval_ms, task } => {
                    // Re-arm first so the task can cancel itself
                    self.state.borrow_mut().insert(
                        id,
                        due_ms + interval_ms,
                        Task::Repeat {
                            interval_ms,
                            task: task.clone(),
                        },
                    );
                    task();
                }
            }
        }

        let mut state = self.state.borrow_mut();
        state.now_ms = state.now_ms.max(target_ms);
    }

    /// Run timers until the queue is empty or `limit_ms` is reached.
    pub fn run_until_idle(&self, limit_ms: u64) {
        while let Some(due) = self.next_due_ms() {
            if due > limit_ms {
                break;
            }
            self.advance_to(due);
        }
    }

    fn schedule(&self, delay_ms: u64, task: Task) -> Cancel {
        let id = {
            let mut state = self.state.borrow_mut();
            let id = state.next_id;
            state.next_id += 1;
            let due = state.now_ms.saturating_add(delay_ms);
            state.insert(id, due, task);
            id
        };

        let weak: Weak<RefCell<QueueState>> = Rc::downgrade(&self.state);
        Box::new(move || {
            if let Some(state) = weak.upgrade() {
                if state.borrow_mut().remove(id) {
                    trace!(timer = id, "timer cancelled");
                }
            }
        })
    }
}

impl Scheduler for TimerQueue {
    fn now_ms(&self) -> u64 {
        self.state.borrow().now_ms
    }

    fn after(&self, delay_ms: u64, task: Box<dyn FnOnce()>) -> Cancel {
        self.schedule(delay_ms, Task::Once(task))
    }

    fn every(&self, interval_ms: u64, task: Rc<dyn Fn()>) -> Cancel {
        // A zero interval would spin forever inside advance_to
        let interval_ms = interval_ms.max(1);
        self.schedule(interval_ms, Task::Repeat { interval_ms, task })
    }
}

// =============================================================================
// FRAME CLOCK
// =============================================================================

/// Drives a [`TimerQueue`] from wall-clock time.
///
/// Call [`pump`](FrameClock::pump) once per frame from the event loop.
#[derive(Clone)]
pub struct FrameClock {
    queue: TimerQueue,
    origin: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            queue: TimerQueue::new(),
            origin: Instant::now(),
        }
    }

    /// The queue trackers should schedule on.
    pub fn queue(&self) -> &TimerQueue {
        &self.queue
    }

    /// Milliseconds elapsed since this clock was created.
    pub fn elapsed_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    /// Run every timer due by now.
    pub fn pump(&self) {
        self.queue.advance_to(self.elapsed_ms());
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for FrameClock {
    fn now_ms(&self) -> u64 {
        self.queue.now_ms()
    }

    fn after(&self, delay_ms: u64, task: Box<dyn FnOnce()>) -> Cancel {
        self.queue.after(delay_ms, task)
    }

    fn every(&self, interval_ms: u64, task: Rc<dyn Fn()>) -> Cancel {
        self.queue.every(interval_ms, task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    #[test]
    fn test_after_fires_at_due_time() {
        let queue = TimerQueue::new();
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();

        let _cancel = queue.after(100, Box::new(move || flag.set(true)));

        queue.advance_by(99);
        assert!(!fired.get());
        queue.advance_by(1);
        assert!(fired.get());
        assert_eq!(queue.now_ms(), 100);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn test_cancel_before_fire() {
        let queue = TimerQueue::new();
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();

        let cancel = queue.after(50, Box::new(move || flag.set(true)));
        cancel();
        queue.advance_by(100);

        assert!(!fired.get());
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn test_equal_due_runs_fifo() {
        let queue = TimerQueue::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for i in 0..5 {
            let order = order.clone();
            let _ = queue.after(10, Box::new(move || order.borrow_mut().push(i)));
        }
        queue.advance_by(10);

        assert_eq!(*order.borrow(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_now_is_due_time_inside_task() {
        let queue = TimerQueue::new();
        let seen = Rc::new(Cell::new(0));
        let seen_clone = seen.clone();
        let inner = queue.clone();

        let _ = queue.after(40, Box::new(move || seen_clone.set(inner.now_ms())));
        queue.advance_by(1000);

        assert_eq!(seen.get(), 40);
        assert_eq!(queue.now_ms(), 1000);
    }

    #[test]
    fn test_every_repeats_until_cancelled() {
        let queue = TimerQueue::new();
        let count = Rc::new(Cell::new(0));
        let counter = count.clone();

        let cancel = queue.every(100, Rc::new(move || counter.set(counter.get() + 1)));

        queue.advance_by(350);
        assert_eq!(count.get(), 3);

        cancel();
        queue.advance_by(1000);
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn test_every_can_cancel_itself() {
        let queue = TimerQueue::new();
        let count = Rc::new(Cell::new(0));
        let slot: Rc<RefCell<Option<Cancel>>> = Rc::new(RefCell::new(None));

        let counter = count.clone();
        let slot_clone = slot.clone();
        let cancel = queue.every(
            10,
            Rc::new(move || {
                counter.set(counter.get() + 1);
                if counter.get() == 2 {
                    if let Some(cancel) = slot_clone.borrow_mut().take() {
                        cancel();
                    }
                }
            }),
        );
        *slot.borrow_mut() = Some(cancel);

        queue.advance_by(100);
        assert_eq!(count.get(), 2);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn test_task_can_schedule_followup() {
        let queue = TimerQueue::new();
        let fired_at = Rc::new(Cell::new(0));

        let inner = queue.clone();
        let fired = fired_at.clone();
        let _ = queue.after(
            10,
            Box::new(move || {
                let at = inner.clone();
                let _ = inner.after(5, Box::new(move || fired.set(at.now_ms())));
            }),
        );

        queue.advance_by(20);
        assert_eq!(fired_at.get(), 15);
    }

    #[test]
    fn test_zero_interval_does_not_spin() {
        let queue = TimerQueue::new();
        let count = Rc::new(Cell::new(0));
        let counter = count.clone();

        let _cancel = queue.every(0, Rc::new(move || counter.set(counter.get() + 1)));
        queue.advance_by(5);

        assert_eq!(count.get(), 5);
    }

    #[test]
    fn test_double_cancel_is_safe() {
        let queue = TimerQueue::new();
        let a = queue.after(10, Box::new(|| {}));
        let b = queue.after(10, Box::new(|| {}));

        a();
        assert_eq!(queue.pending(), 1);
        drop(queue);
        // Queue is gone, cancelling must still be safe
        b();
    }

    #[test]
    fn test_run_until_idle_respects_limit() {
        let queue = TimerQueue::new();
        let _ = queue.after(10, Box::new(|| {}));
        let _ = queue.after(500, Box::new(|| {}));

        queue.run_until_idle(100);
        assert_eq!(queue.now_ms(), 10);
        assert_eq!(queue.pending(), 1);
    }

    #[test]
    fn test_frame_clock_pump_runs_due_timers() {
        let clock = FrameClock::new();
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();

        let _ = clock.after(0, Box::new(move || flag.set(true)));
        clock.pump();

        assert!(fired.get());
    }
}

//! Stagger tracker - reveal a container's children one by one
//!
//! The container is observed as a whole. When it qualifies, child `i` is
//! scheduled at `initial_delay_ms + i * stagger_delay_ms`, for every child
//! present at that moment. Each firing appends `i` to `revealed_indices`,
//! so the list only ever grows in ascending index order.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use spark_signals::{signal, Signal};
use tracing::{debug, trace};

use crate::error::{check_threshold, ConfigError};
use crate::scheduler::{Cancel, Scheduler};
use crate::types::{ElementId, ObserverId, RootMargin};
use crate::viewport::{IntersectionEntry, ObservabilityPort, ObserveOptions};

/// Configuration for a [`StaggerTracker`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaggerOptions {
    pub threshold: f32,
    pub root_margin: RootMargin,
    pub trigger_once: bool,
    /// Interval between successive child reveals
    pub stagger_delay_ms: u64,
    /// Delay before the first child reveal
    pub initial_delay_ms: u64,
}

impl Default for StaggerOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin: RootMargin::default(),
            trigger_once: true,
            stagger_delay_ms: 100,
            initial_delay_ms: 0,
        }
    }
}

impl StaggerOptions {
    /// Due offset of child `index`, relative to the triggering intersection.
    pub fn offset_for(&self, index: usize) -> u64 {
        self.initial_delay_ms
            .saturating_add((index as u64).saturating_mul(self.stagger_delay_ms))
    }
}

struct Inner {
    options: StaggerOptions,
    port: Rc<dyn ObservabilityPort>,
    scheduler: Rc<dyn Scheduler>,
    revealed: Signal<Vec<usize>>,
    /// Container is currently inside a reveal cycle
    active: Cell<bool>,
    container: Cell<Option<ElementId>>,
    observer: Cell<Option<ObserverId>>,
    pending: RefCell<Vec<Cancel>>,
}

impl Inner {
    fn on_entry(self: &Rc<Self>, entry: IntersectionEntry) {
        if entry.qualifies(self.options.threshold) {
            if self.active.get() {
                trace!(container = %entry.element, "stagger already triggered");
                return;
            }
            self.trigger(entry.element);
        } else if !self.options.trigger_once && self.active.get() {
            debug!(container = %entry.element, "container left view, clearing reveals");
            self.cancel_pending();
            self.active.set(false);
            self.revealed.set(Vec::new());
        }
    }

    fn trigger(self: &Rc<Self>, container: ElementId) {
        self.active.set(true);
        let count = self.port.child_count(container);
        debug!(%container, children = count, "stagger triggered");

        let mut pending = Vec::with_capacity(count);
        for index in 0..count {
            let weak: Weak<Inner> = Rc::downgrade(self);
            pending.push(self.scheduler.after(
                self.options.offset_for(index),
                Box::new(move || {
                    if let Some(inner) = weak.upgrade() {
                        inner.reveal_child(index);
                    }
                }),
            ));
        }
        self.pending.borrow_mut().extend(pending);

        if self.options.trigger_once {
            // Already-scheduled reveals keep running
            self.disconnect();
        }
    }

    fn reveal_child(&self, index: usize) {
        let mut revealed = self.revealed.get();
        if revealed.last().is_some_and(|&last| last >= index) {
            return;
        }
        trace!(index, "child revealed");
        revealed.push(index);
        self.revealed.set(revealed);
    }

    fn disconnect(&self) {
        if let Some(observer) = self.observer.take() {
            self.port.unobserve(observer);
        }
    }

    fn cancel_pending(&self) {
        let pending: Vec<Cancel> = self.pending.borrow_mut().drain(..).collect();
        for cancel in pending {
            cancel();
        }
    }
}

/// Progressively reveals a container's children in index order.
///
/// # Example
///
/// ```ignore
/// let cards = StaggerTracker::new(StaggerOptions {
///     stagger_delay_ms: 150,
///     initial_delay_ms: 200,
///     ..Default::default()
/// }, port, scheduler)?;
/// cards.attach(Some(grid));
///
/// // per card
/// let visible = cards.is_child_revealed(i);
/// ```
pub struct StaggerTracker {
    inner: Rc<Inner>,
}

impl StaggerTracker {
    pub fn new(
        options: StaggerOptions,
        port: Rc<dyn ObservabilityPort>,
        scheduler: Rc<dyn Scheduler>,
    ) -> Result<Self, ConfigError> {
        check_threshold(options.threshold)?;
        Ok(Self {
            inner: Rc::new(Inner {
                options,
                port,
                scheduler,
                revealed: signal(Vec::new()),
                active: Cell::new(false),
                container: Cell::new(None),
                observer: Cell::new(None),
                pending: RefCell::new(Vec::new()),
            }),
        })
    }

    /// Start observing `container`. `None` is a no-op.
    pub fn attach(&self, container: Option<ElementId>) {
        let Some(container) = container else {
            trace!("attach without container ignored");
            return;
        };
        let inner = &self.inner;
        if inner.options.trigger_once && inner.active.get() {
            return;
        }

        inner.disconnect();
        inner.container.set(Some(container));

        let weak: Weak<Inner> = Rc::downgrade(inner);
        let observer = inner.port.observe(
            container,
            ObserveOptions {
                threshold: inner.options.threshold,
                root_margin: inner.options.root_margin,
            },
            Rc::new(move |entry| {
                if let Some(inner) = weak.upgrade() {
                    inner.on_entry(entry);
                }
            }),
        );

        if inner.options.trigger_once && inner.active.get() {
            // Triggered synchronously during observe
            inner.port.unobserve(observer);
        } else {
            inner.observer.set(Some(observer));
        }
        debug!(%container, "stagger tracker attached");
    }

    /// Stop observing and cancel every reveal that has not fired. Idempotent.
    pub fn detach(&self) {
        self.inner.disconnect();
        self.inner.cancel_pending();
    }

    /// Indices revealed so far, in reveal order.
    pub fn revealed_indices(&self) -> Vec<usize> {
        self.inner.revealed.get()
    }

    pub fn is_child_revealed(&self, index: usize) -> bool {
        self.inner.revealed.get().contains(&index)
    }

    /// Reactive view of `revealed_indices`.
    pub fn revealed_signal(&self) -> Signal<Vec<usize>> {
        self.inner.revealed.clone()
    }

    pub fn is_observing(&self) -> bool {
        self.inner.observer.get().is_some()
    }

    /// Container passed to the last successful attach.
    pub fn container(&self) -> Option<ElementId> {
        self.inner.container.get()
    }

    pub fn options(&self) -> &StaggerOptions {
        &self.inner.options
    }
}

impl Drop for StaggerTracker {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::TimerQueue;
    use crate::viewport::ManualViewport;
    use proptest::prelude::*;

    const GRID: ElementId = ElementId(7);

    fn setup(
        options: StaggerOptions,
        children: usize,
    ) -> (StaggerTracker, Rc<ManualViewport>, TimerQueue) {
        let port = Rc::new(ManualViewport::new());
        port.set_child_count(GRID, children);
        let queue = TimerQueue::new();
        let tracker = StaggerTracker::new(options, port.clone(), Rc::new(queue.clone()))
            .expect("valid options");
        tracker.attach(Some(GRID));
        (tracker, port, queue)
    }

    #[test]
    fn test_children_revealed_in_order() {
        let (tracker, port, queue) = setup(StaggerOptions::default(), 3);

        port.emit(GRID, 1.0);
        assert!(tracker.revealed_indices().is_empty());

        queue.advance_by(0);
        assert_eq!(tracker.revealed_indices(), vec![0]);

        queue.advance_by(100);
        assert_eq!(tracker.revealed_indices(), vec![0, 1]);

        queue.advance_by(100);
        assert_eq!(tracker.revealed_indices(), vec![0, 1, 2]);
        assert_eq!(tracker.container(), Some(GRID));
        assert!(tracker.is_child_revealed(2));
        assert!(!tracker.is_child_revealed(3));
    }

    #[test]
    fn test_initial_delay_before_first_child() {
        let (tracker, port, queue) = setup(
            StaggerOptions {
                initial_delay_ms: 400,
                ..Default::default()
            },
            2,
        );

        port.emit(GRID, 1.0);
        queue.advance_by(399);
        assert!(tracker.revealed_indices().is_empty());

        queue.advance_by(1);
        assert_eq!(tracker.revealed_indices(), vec![0]);
    }

    #[test]
    fn test_trigger_once_disconnects_but_timers_run() {
        let (tracker, port, queue) = setup(StaggerOptions::default(), 4);

        port.emit(GRID, 1.0);
        assert!(!tracker.is_observing());
        assert_eq!(port.observer_count(GRID), 0);

        queue.advance_by(1_000);
        assert_eq!(tracker.revealed_indices(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_children_added_later_not_scheduled() {
        let (tracker, port, queue) = setup(StaggerOptions::default(), 2);

        port.emit(GRID, 1.0);
        port.set_child_count(GRID, 5);
        queue.advance_by(1_000);

        assert_eq!(tracker.revealed_indices(), vec![0, 1]);
    }

    #[test]
    fn test_detach_stops_growth() {
        let (tracker, port, queue) = setup(StaggerOptions::default(), 5);

        port.emit(GRID, 1.0);
        queue.advance_by(150);
        assert_eq!(tracker.revealed_indices(), vec![0, 1]);

        tracker.detach();
        tracker.detach();
        queue.advance_by(1_000);

        assert_eq!(tracker.revealed_indices(), vec![0, 1]);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn test_exit_clears_when_not_trigger_once() {
        let (tracker, port, queue) = setup(
            StaggerOptions {
                trigger_once: false,
                ..Default::default()
            },
            3,
        );

        port.emit(GRID, 1.0);
        queue.advance_by(100);
        assert_eq!(tracker.revealed_indices(), vec![0, 1]);

        port.emit(GRID, 0.0);
        assert!(tracker.revealed_indices().is_empty());

        // Pending reveal from the first cycle was cancelled
        queue.advance_by(1_000);
        assert!(tracker.revealed_indices().is_empty());

        // Rebuilt on next entry
        port.emit(GRID, 1.0);
        queue.advance_by(1_000);
        assert_eq!(tracker.revealed_indices(), vec![0, 1, 2]);
    }

    #[test]
    fn test_repeated_entry_does_not_duplicate() {
        let (tracker, port, queue) = setup(
            StaggerOptions {
                trigger_once: false,
                ..Default::default()
            },
            3,
        );

        port.emit(GRID, 0.5);
        port.emit(GRID, 0.9);
        queue.advance_by(1_000);

        assert_eq!(tracker.revealed_indices(), vec![0, 1, 2]);
    }

    #[test]
    fn test_below_threshold_does_not_trigger() {
        let (tracker, port, queue) = setup(
            StaggerOptions {
                threshold: 0.5,
                ..Default::default()
            },
            3,
        );

        port.emit(GRID, 0.2);
        queue.advance_by(1_000);

        assert!(tracker.revealed_indices().is_empty());
        assert!(tracker.is_observing());
    }

    #[test]
    fn test_empty_container() {
        let (tracker, port, queue) = setup(StaggerOptions::default(), 0);

        port.emit(GRID, 1.0);
        queue.advance_by(1_000);

        assert!(tracker.revealed_indices().is_empty());
    }

    proptest! {
        #[test]
        fn prop_stagger_timing(
            children in 0usize..12,
            stagger in 1u64..300,
            initial in 0u64..500,
            start in 0u64..1_000,
        ) {
            let (tracker, port, queue) = setup(
                StaggerOptions {
                    stagger_delay_ms: stagger,
                    initial_delay_ms: initial,
                    ..Default::default()
                },
                children,
            );

            queue.advance_by(start);
            port.emit(GRID, 1.0);

            for i in 0..children {
                let due = initial + i as u64 * stagger;
                queue.advance_to(start + due);
                let revealed = tracker.revealed_indices();
                prop_assert_eq!(revealed, (0..=i).collect::<Vec<_>>());
            }
        }
    }
}

//! Reveal tracker - one element, one boolean
//!
//! `is_in_view` flips to true once the element's visible ratio reaches the
//! threshold, optionally after a delay. With `trigger_once` (the default) the
//! flag never reverts and the observation is dropped as soon as it fires.
//!
//! A delayed reveal is not re-validated when its timer fires: an element that
//! scrolled away during the delay still becomes revealed.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use spark_signals::{signal, Signal};
use tracing::{debug, trace};

use crate::error::{check_threshold, ConfigError};
use crate::scheduler::{Cancel, Scheduler};
use crate::types::{ElementId, ObserverId, RootMargin};
use crate::viewport::{IntersectionEntry, ObservabilityPort, ObserveOptions};

// =============================================================================
// OPTIONS
// =============================================================================

/// Configuration for a [`RevealTracker`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealOptions {
    /// Fraction of the element that must be visible (0.0 - 1.0)
    pub threshold: f32,
    pub root_margin: RootMargin,
    /// Reveal at most once, then stop observing
    pub trigger_once: bool,
    /// Delay between the qualifying intersection and the reveal
    pub delay_ms: u64,
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin: RootMargin::default(),
            trigger_once: true,
            delay_ms: 0,
        }
    }
}

impl RevealOptions {
    pub fn with_delay(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            ..Default::default()
        }
    }

    fn observe_options(&self) -> ObserveOptions {
        ObserveOptions {
            threshold: self.threshold,
            root_margin: self.root_margin,
        }
    }
}

// =============================================================================
// TRACKER
// =============================================================================

struct Inner {
    options: RevealOptions,
    port: Rc<dyn ObservabilityPort>,
    scheduler: Rc<dyn Scheduler>,
    is_in_view: Signal<bool>,
    /// Reveal applied under trigger_once
    has_fired: Cell<bool>,
    element: Cell<Option<ElementId>>,
    observer: Cell<Option<ObserverId>>,
    pending: RefCell<Option<Cancel>>,
}

impl Inner {
    fn on_entry(self: &Rc<Self>, entry: IntersectionEntry) {
        let qualifies = entry.qualifies(self.options.threshold);

        if qualifies {
            if self.has_fired.get() {
                trace!(element = %entry.element, "reveal already fired");
                return;
            }
            if self.pending.borrow().is_some() {
                trace!(element = %entry.element, "reveal already scheduled");
                return;
            }

            if self.options.delay_ms == 0 {
                self.reveal();
            } else {
                let weak = Rc::downgrade(self);
                let cancel = self.scheduler.after(
                    self.options.delay_ms,
                    Box::new(move || {
                        if let Some(inner) = weak.upgrade() {
                            inner.pending.borrow_mut().take();
                            inner.reveal();
                        }
                    }),
                );
                *self.pending.borrow_mut() = Some(cancel);
            }
        } else if !self.options.trigger_once && self.is_in_view.get() {
            // Exit reverts immediately, without delay
            debug!(element = %entry.element, "element left view");
            self.is_in_view.set(false);
        }
    }

    fn reveal(&self) {
        debug!(element = ?self.element.get(), "element revealed");
        self.is_in_view.set(true);
        if self.options.trigger_once {
            self.has_fired.set(true);
            self.disconnect();
        }
    }

    fn disconnect(&self) {
        if let Some(observer) = self.observer.take() {
            self.port.unobserve(observer);
        }
    }

    fn detach(&self) {
        self.disconnect();
        if let Some(cancel) = self.pending.borrow_mut().take() {
            cancel();
        }
    }
}

/// Tracks whether a single element has entered the viewport.
///
/// # Example
///
/// ```ignore
/// let title = RevealTracker::new(RevealOptions::default(), port.clone(), scheduler.clone())?;
/// title.attach(Some(title_element));
///
/// let visible = title.in_view_signal();
/// effect(move || set_opacity(if visible.get() { 1.0 } else { 0.0 }));
/// ```
pub struct RevealTracker {
    inner: Rc<Inner>,
}

impl RevealTracker {
    pub fn new(
        options: RevealOptions,
        port: Rc<dyn ObservabilityPort>,
        scheduler: Rc<dyn Scheduler>,
    ) -> Result<Self, ConfigError> {
        check_threshold(options.threshold)?;
        Ok(Self {
            inner: Rc::new(Inner {
                options,
                port,
                scheduler,
                is_in_view: signal(false),
                has_fired: Cell::new(false),
                element: Cell::new(None),
                observer: Cell::new(None),
                pending: RefCell::new(None),
            }),
        })
    }

    /// Start observing `element`. `None` is a no-op.
    ///
    /// Attaching again replaces the previous observation. Once a
    /// trigger-once reveal has fired, further attaches are ignored.
    pub fn attach(&self, element: Option<ElementId>) {
        let Some(element) = element else {
            trace!("attach without element ignored");
            return;
        };
        let inner = &self.inner;
        if inner.options.trigger_once && inner.has_fired.get() {
            return;
        }

        inner.disconnect();
        inner.element.set(Some(element));

        let weak: Weak<Inner> = Rc::downgrade(inner);
        let observer = inner.port.observe(
            element,
            inner.options.observe_options(),
            Rc::new(move |entry| {
                if let Some(inner) = weak.upgrade() {
                    inner.on_entry(entry);
                }
            }),
        );

        // A port may deliver (and fire a trigger-once reveal) synchronously
        if inner.options.trigger_once && inner.has_fired.get() && inner.pending.borrow().is_none() {
            inner.port.unobserve(observer);
        } else {
            inner.observer.set(Some(observer));
        }
        debug!(%element, "reveal tracker attached");
    }

    /// Stop observing and cancel a pending delayed reveal. Idempotent.
    pub fn detach(&self) {
        self.inner.detach();
    }

    pub fn is_in_view(&self) -> bool {
        self.inner.is_in_view.get()
    }

    /// Reactive view of `is_in_view`.
    pub fn in_view_signal(&self) -> Signal<bool> {
        self.inner.is_in_view.clone()
    }

    pub fn is_observing(&self) -> bool {
        self.inner.observer.get().is_some()
    }

    pub fn options(&self) -> &RevealOptions {
        &self.inner.options
    }
}

impl Drop for RevealTracker {
    fn drop(&mut self) {
        self.inner.detach();
    }
}

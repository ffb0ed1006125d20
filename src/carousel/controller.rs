//! Carousel controller - active index, transition lock, autoplay, swipe
//!
//! States are `Idle` and `Transitioning`. A navigation accepted in `Idle`
//! moves the active index immediately, notifies `on_item_change`, and holds
//! the lock for `transition_duration_ms`. Requests arriving while locked are
//! dropped, never queued.
//!
//! Autoplay is re-armed on every change of index, lock, item count, autoplay
//! flag, interval or pause state, so a tick can never land mid-transition.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use spark_signals::{signal, Signal};
use tracing::{debug, trace};

use super::controls::{progress_fraction, CarouselControls};
use super::swipe::{ReadingDirection, SwipeGesture, SwipeTracker, DEFAULT_SWIPE_THRESHOLD};
use crate::error::ConfigError;
use crate::scheduler::{Cancel, Scheduler};

// =============================================================================
// OPTIONS
// =============================================================================

/// Configuration for a [`CarouselController`].
#[derive(Clone)]
pub struct CarouselOptions {
    pub autoplay: bool,
    pub autoplay_interval_ms: u64,
    pub show_arrows: bool,
    pub show_dots: bool,
    /// Clamped into range on construction
    pub initial_index: usize,
    /// Wrap past either end instead of stopping
    pub looping: bool,
    pub transition_duration_ms: u64,
    pub reading_direction: ReadingDirection,
    pub swipe_threshold: f32,
    /// Called with the new index whenever a navigation is accepted
    pub on_item_change: Option<Rc<dyn Fn(usize)>>,
}

impl Default for CarouselOptions {
    fn default() -> Self {
        Self {
            autoplay: false,
            autoplay_interval_ms: 5000,
            show_arrows: true,
            show_dots: true,
            initial_index: 0,
            looping: true,
            transition_duration_ms: 500,
            reading_direction: ReadingDirection::default(),
            swipe_threshold: DEFAULT_SWIPE_THRESHOLD,
            on_item_change: None,
        }
    }
}

impl CarouselOptions {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.autoplay_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval { name: "autoplay" });
        }
        if self.swipe_threshold.is_nan() || self.swipe_threshold < 0.0 {
            return Err(ConfigError::InvalidSwipeThreshold(self.swipe_threshold));
        }
        Ok(())
    }
}

// =============================================================================
// STATE
// =============================================================================

struct Inner<T> {
    items: RefCell<Vec<T>>,
    options: RefCell<CarouselOptions>,
    scheduler: Rc<dyn Scheduler>,
    active_index: Signal<usize>,
    transitioning: Signal<bool>,
    paused: Cell<bool>,
    autoplay_timer: RefCell<Option<Cancel>>,
    unlock_timer: RefCell<Option<Cancel>>,
    swipe: RefCell<SwipeTracker>,
}

impl<T: 'static> Inner<T> {
    fn len(&self) -> usize {
        self.items.borrow().len()
    }

    fn next_target(&self) -> Option<usize> {
        let len = self.len();
        if len == 0 {
            return None;
        }
        let active = self.active_index.get();
        Some(if self.options.borrow().looping {
            (active + 1) % len
        } else {
            (active + 1).min(len - 1)
        })
    }

    fn previous_target(&self) -> Option<usize> {
        let len = self.len();
        if len == 0 {
            return None;
        }
        let active = self.active_index.get();
        Some(if self.options.borrow().looping {
            (active + len - 1) % len
        } else {
            active.saturating_sub(1)
        })
    }

    /// `Idle --navigate--> Transitioning`. Returns whether it was accepted.
    fn navigate(self: &Rc<Self>, target: usize) -> bool {
        let len = self.len();
        if len == 0 {
            trace!(target, "navigation on empty carousel ignored");
            return false;
        }
        if self.transitioning.get() {
            trace!(target, "navigation dropped: transition in flight");
            return false;
        }
        if target >= len {
            trace!(target, len, "navigation out of range ignored");
            return false;
        }
        let from = self.active_index.get();

        debug!(from, to = target, "carousel navigating");
        self.transitioning.set(true);
        self.active_index.set(target);

        // Clone out so the callback may call back into the controller
        let (callback, duration) = {
            let options = self.options.borrow();
            (options.on_item_change.clone(), options.transition_duration_ms)
        };
        if let Some(callback) = callback {
            callback(target);
        }

        let weak: Weak<Inner<T>> = Rc::downgrade(self);
        let cancel = self.scheduler.after(
            duration,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.finish_transition();
                }
            }),
        );
        if let Some(previous) = self.unlock_timer.borrow_mut().replace(cancel) {
            previous();
        }

        self.rearm_autoplay();
        true
    }

    /// `Transitioning --timer--> Idle`.
    fn finish_transition(self: &Rc<Self>) {
        self.unlock_timer.borrow_mut().take();
        self.transitioning.set(false);
        trace!("carousel idle");
        self.rearm_autoplay();
    }

    fn next(self: &Rc<Self>) -> bool {
        match self.next_target() {
            Some(target) => self.navigate(target),
            None => false,
        }
    }

    fn previous(self: &Rc<Self>) -> bool {
        match self.previous_target() {
            Some(target) => self.navigate(target),
            None => false,
        }
    }

    fn apply(self: &Rc<Self>, gesture: SwipeGesture) -> bool {
        match gesture {
            SwipeGesture::Next => self.next(),
            SwipeGesture::Previous => self.previous(),
        }
    }

    fn cancel_autoplay(&self) {
        if let Some(cancel) = self.autoplay_timer.borrow_mut().take() {
            cancel();
        }
    }

    /// Tear down the autoplay interval and recreate it if it should run.
    fn rearm_autoplay(self: &Rc<Self>) {
        self.cancel_autoplay();

        let (autoplay, interval) = {
            let options = self.options.borrow();
            (options.autoplay, options.autoplay_interval_ms)
        };
        if !autoplay || self.len() <= 1 || self.transitioning.get() || self.paused.get() {
            return;
        }

        let weak: Weak<Inner<T>> = Rc::downgrade(self);
        let cancel = self.scheduler.every(
            interval,
            Rc::new(move || {
                if let Some(inner) = weak.upgrade() {
                    trace!("autoplay tick");
                    inner.next();
                }
            }),
        );
        *self.autoplay_timer.borrow_mut() = Some(cancel);
    }

    fn teardown(&self) {
        self.cancel_autoplay();
        if let Some(cancel) = self.unlock_timer.borrow_mut().take() {
            cancel();
        }
    }
}

// =============================================================================
// CONTROLLER
// =============================================================================

/// Active position within a bounded sequence of items.
///
/// # Example
///
/// ```ignore
/// let carousel = CarouselController::new(testimonials, CarouselOptions {
///     autoplay: true,
///     on_item_change: Some(Rc::new(|index| println!("now showing {index}"))),
///     ..Default::default()
/// }, scheduler)?;
///
/// carousel.next();
/// carousel.on_touch_start(120.0);
/// carousel.on_touch_move(30.0);
/// carousel.on_touch_end(); // swipe
/// ```
pub struct CarouselController<T: 'static> {
    inner: Rc<Inner<T>>,
}

impl<T: 'static> CarouselController<T> {
    pub fn new(
        items: Vec<T>,
        options: CarouselOptions,
        scheduler: Rc<dyn Scheduler>,
    ) -> Result<Self, ConfigError> {
        options.validate()?;

        let initial = options.initial_index.min(items.len().saturating_sub(1));
        let controller = Self {
            inner: Rc::new(Inner {
                items: RefCell::new(items),
                options: RefCell::new(options),
                scheduler,
                active_index: signal(initial),
                transitioning: signal(false),
                paused: Cell::new(false),
                autoplay_timer: RefCell::new(None),
                unlock_timer: RefCell::new(None),
                swipe: RefCell::new(SwipeTracker::new()),
            }),
        };
        controller.inner.rearm_autoplay();
        Ok(controller)
    }

    // -------------------------------------------------------------------------
    // State
    // -------------------------------------------------------------------------

    /// Active index, `None` for an empty carousel.
    pub fn active_index(&self) -> Option<usize> {
        if self.is_empty() {
            None
        } else {
            Some(self.inner.active_index.get())
        }
    }

    /// Reactive active index. Meaningless while the carousel is empty.
    pub fn active_index_signal(&self) -> Signal<usize> {
        self.inner.active_index.clone()
    }

    pub fn is_transitioning(&self) -> bool {
        self.inner.transitioning.get()
    }

    pub fn transitioning_signal(&self) -> Signal<bool> {
        self.inner.transitioning.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_item_active(&self, index: usize) -> bool {
        self.active_index() == Some(index)
    }

    /// Run `f` against the active item.
    pub fn with_active_item<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let index = self.active_index()?;
        self.inner.items.borrow().get(index).map(f)
    }

    pub fn active_item(&self) -> Option<T>
    where
        T: Clone,
    {
        self.with_active_item(T::clone)
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    /// Advance one item. Returns whether the navigation was accepted.
    pub fn next(&self) -> bool {
        self.inner.next()
    }

    /// Go back one item. Returns whether the navigation was accepted.
    pub fn previous(&self) -> bool {
        self.inner.previous()
    }

    /// Jump to `index`. No-op for the current index or out of range.
    ///
    /// `next`/`previous` at a non-looping edge still run a transition
    /// onto the same item; only `goto` skips the current one.
    pub fn goto(&self, index: usize) -> bool {
        if self.is_item_active(index) {
            trace!(index, "goto current item ignored");
            return false;
        }
        self.inner.navigate(index)
    }

    /// Apply a gesture from a swipe, arrow key or button.
    pub fn apply(&self, gesture: SwipeGesture) -> bool {
        self.inner.apply(gesture)
    }

    // -------------------------------------------------------------------------
    // Touch
    // -------------------------------------------------------------------------

    pub fn on_touch_start(&self, x: f32) {
        self.inner.swipe.borrow_mut().start(x);
    }

    pub fn on_touch_move(&self, x: f32) {
        self.inner.swipe.borrow_mut().move_to(x);
    }

    /// Finish the gesture. Returns the navigation it triggered, if accepted.
    pub fn on_touch_end(&self) -> Option<SwipeGesture> {
        let (threshold, direction) = {
            let options = self.inner.options.borrow();
            (options.swipe_threshold, options.reading_direction)
        };
        let gesture = self.inner.swipe.borrow_mut().finish(threshold, direction)?;
        trace!(?gesture, "swipe recognised");
        self.inner.apply(gesture).then_some(gesture)
    }

    // -------------------------------------------------------------------------
    // Autoplay and reconfiguration
    // -------------------------------------------------------------------------

    pub fn set_autoplay(&self, enabled: bool) {
        self.inner.options.borrow_mut().autoplay = enabled;
        self.inner.rearm_autoplay();
    }

    pub fn set_autoplay_interval(&self, interval_ms: u64) -> Result<(), ConfigError> {
        if interval_ms == 0 {
            return Err(ConfigError::ZeroInterval { name: "autoplay" });
        }
        self.inner.options.borrow_mut().autoplay_interval_ms = interval_ms;
        self.inner.rearm_autoplay();
        Ok(())
    }

    pub fn is_autoplay(&self) -> bool {
        self.inner.options.borrow().autoplay
    }

    /// Hold autoplay (e.g. while an item is expanded). Manual navigation still works.
    pub fn pause(&self) {
        self.inner.paused.set(true);
        self.inner.rearm_autoplay();
    }

    pub fn resume(&self) {
        self.inner.paused.set(false);
        self.inner.rearm_autoplay();
    }

    pub fn is_paused(&self) -> bool {
        self.inner.paused.get()
    }

    /// Replace the items. The active index is clamped into the new range
    /// without notifying `on_item_change`.
    pub fn set_items(&self, items: Vec<T>) {
        let len = items.len();
        *self.inner.items.borrow_mut() = items;

        let active = self.inner.active_index.get();
        let clamped = active.min(len.saturating_sub(1));
        if clamped != active {
            self.inner.active_index.set(clamped);
        }
        self.inner.rearm_autoplay();
    }

    // -------------------------------------------------------------------------
    // Chrome
    // -------------------------------------------------------------------------

    /// Controls to render for the current item count and options.
    pub fn controls(&self) -> CarouselControls {
        let options = self.inner.options.borrow();
        CarouselControls::for_carousel(
            self.len(),
            options.show_arrows,
            options.show_dots,
            options.autoplay,
        )
    }

    /// Buttons and dots are disabled during a transition.
    pub fn controls_enabled(&self) -> bool {
        !self.is_transitioning()
    }

    pub fn is_dot_active(&self, index: usize) -> bool {
        self.is_item_active(index)
    }

    /// Progress bar fill, `(active + 1) / len`.
    pub fn progress(&self) -> f32 {
        match self.active_index() {
            Some(active) => progress_fraction(active, self.len()),
            None => 0.0,
        }
    }

    pub fn reading_direction(&self) -> ReadingDirection {
        self.inner.options.borrow().reading_direction
    }
}

impl<T: 'static> Drop for CarouselController<T> {
    fn drop(&mut self) {
        self.inner.teardown();
    }
}

//! Geometry viewport - intersection ratios from layout bounds
//!
//! Holds the layout box of every known element (document coordinates, as
//! produced by a layout pass), the viewport size and the scroll offset.
//! Whenever one of them changes, every observation is re-evaluated and the
//! observers whose qualifying state flipped are notified.
//!
//! # Example
//!
//! ```ignore
//! let viewport = GeometryViewport::new(80.0, 24.0);
//! viewport.set_bounds(ElementId(1), Bounds::new(0.0, 40.0, 80.0, 10.0));
//!
//! let tracker = RevealTracker::new(options, Rc::new(viewport.clone()), scheduler)?;
//! tracker.attach(Some(ElementId(1)));
//!
//! viewport.scroll_by(0.0, 30.0); // element scrolls into view
//! ```

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use taffy::{Point, Size};
use tracing::trace;

use super::{IntersectionCallback, IntersectionEntry, ObservabilityPort, ObserveOptions};
use crate::types::{Bounds, ElementId, ObserverId};

struct Observation {
    element: ElementId,
    options: ObserveOptions,
    callback: IntersectionCallback,
    /// Qualifying state last delivered to the callback
    last_qualifies: Option<bool>,
}

struct GeometryState {
    next_id: u64,
    viewport: Size<f32>,
    scroll: Point<f32>,
    bounds: HashMap<ElementId, Bounds>,
    children: HashMap<ElementId, usize>,
    observations: BTreeMap<ObserverId, Observation>,
}

impl GeometryState {
    fn viewport_bounds(&self) -> Bounds {
        Bounds::new(
            self.scroll.x,
            self.scroll.y,
            self.viewport.width,
            self.viewport.height,
        )
    }

    fn entry_for(&self, element: ElementId, options: &ObserveOptions) -> IntersectionEntry {
        let ratio = match self.bounds.get(&element) {
            Some(bounds) => {
                let root = options.root_margin.apply(&self.viewport_bounds());
                bounds.visible_ratio(&root)
            }
            None => 0.0,
        };
        IntersectionEntry {
            element,
            ratio,
            is_intersecting: ratio > 0.0,
        }
    }
}

/// Port computing intersection ratios from element bounds.
///
/// Clones share the same geometry.
#[derive(Clone)]
pub struct GeometryViewport {
    state: Rc<RefCell<GeometryState>>,
    /// Guards against refreshes triggered from inside a callback
    refreshing: Rc<Cell<bool>>,
}

impl GeometryViewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            state: Rc::new(RefCell::new(GeometryState {
                next_id: 0,
                viewport: Size {
                    width: width.max(0.0),
                    height: height.max(0.0),
                },
                scroll: Point { x: 0.0, y: 0.0 },
                bounds: HashMap::new(),
                children: HashMap::new(),
                observations: BTreeMap::new(),
            })),
            refreshing: Rc::new(Cell::new(false)),
        }
    }

    // -------------------------------------------------------------------------
    // Geometry updates
    // -------------------------------------------------------------------------

    /// Set the layout box of `element` and re-evaluate observations.
    pub fn set_bounds(&self, element: ElementId, bounds: Bounds) {
        self.state.borrow_mut().bounds.insert(element, bounds);
        self.refresh();
    }

    /// Replace the layout boxes of many elements at once (one re-evaluation).
    pub fn set_layout(&self, layout: impl IntoIterator<Item = (ElementId, Bounds)>) {
        self.state.borrow_mut().bounds.extend(layout);
        self.refresh();
    }

    /// Forget an element. Its observers see ratio 0.
    pub fn remove_element(&self, element: ElementId) {
        {
            let mut state = self.state.borrow_mut();
            state.bounds.remove(&element);
            state.children.remove(&element);
        }
        self.refresh();
    }

    pub fn set_child_count(&self, element: ElementId, count: usize) {
        self.state.borrow_mut().children.insert(element, count);
    }

    pub fn set_viewport_size(&self, width: f32, height: f32) {
        self.state.borrow_mut().viewport = Size {
            width: width.max(0.0),
            height: height.max(0.0),
        };
        self.refresh();
    }

    pub fn set_scroll(&self, x: f32, y: f32) {
        self.state.borrow_mut().scroll = Point { x, y };
        self.refresh();
    }

    pub fn scroll_by(&self, dx: f32, dy: f32) {
        let (x, y) = self.scroll();
        self.set_scroll(x + dx, y + dy);
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Current scroll offset as (x, y).
    pub fn scroll(&self) -> (f32, f32) {
        let state = self.state.borrow();
        (state.scroll.x, state.scroll.y)
    }

    /// Visible document rectangle, before any root margin.
    pub fn viewport_bounds(&self) -> Bounds {
        self.state.borrow().viewport_bounds()
    }

    /// Current ratio of `element` under `options`.
    pub fn ratio_of(&self, element: ElementId, options: &ObserveOptions) -> f32 {
        self.state.borrow().entry_for(element, options).ratio
    }

    pub fn observer_count(&self) -> usize {
        self.state.borrow().observations.len()
    }

    // -------------------------------------------------------------------------
    // Notification
    // -------------------------------------------------------------------------

    /// Re-evaluate every observation, notifying those whose state changed.
    pub fn refresh(&self) {
        if self.refreshing.replace(true) {
            return;
        }

        let pending: Vec<(ObserverId, IntersectionCallback, IntersectionEntry)> = {
            let mut state = self.state.borrow_mut();
            let entries: Vec<(ObserverId, IntersectionEntry)> = state
                .observations
                .iter()
                .map(|(id, obs)| (*id, state.entry_for(obs.element, &obs.options)))
                .collect();

            let mut pending = Vec::new();
            for (id, entry) in entries {
                if let Some(obs) = state.observations.get_mut(&id) {
                    let qualifies = entry.qualifies(obs.options.threshold);
                    if obs.last_qualifies != Some(qualifies) {
                        obs.last_qualifies = Some(qualifies);
                        pending.push((id, obs.callback.clone(), entry));
                    }
                }
            }
            pending
        };

        for (id, callback, entry) in pending {
            if self.state.borrow().observations.contains_key(&id) {
                trace!(element = %entry.element, ratio = entry.ratio, "intersection changed");
                callback(entry);
            }
        }

        self.refreshing.set(false);
    }
}

impl ObservabilityPort for GeometryViewport {
    fn observe(
        &self,
        element: ElementId,
        options: ObserveOptions,
        callback: IntersectionCallback,
    ) -> ObserverId {
        let (id, entry) = {
            let mut state = self.state.borrow_mut();
            let id = ObserverId(state.next_id);
            state.next_id += 1;
            let entry = state.entry_for(element, &options);
            state.observations.insert(
                id,
                Observation {
                    element,
                    options,
                    callback: callback.clone(),
                    last_qualifies: Some(entry.qualifies(options.threshold)),
                },
            );
            (id, entry)
        };

        // Initial notification, like a browser observer's first callback
        callback(entry);
        id
    }

    fn unobserve(&self, observer: ObserverId) {
        self.state.borrow_mut().observations.remove(&observer);
    }

    fn child_count(&self, element: ElementId) -> usize {
        self.state.borrow().children.get(&element).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RootMargin;

    fn no_margin(threshold: f32) -> ObserveOptions {
        ObserveOptions {
            threshold,
            root_margin: RootMargin::ZERO,
        }
    }

    fn recorder() -> (Rc<RefCell<Vec<IntersectionEntry>>>, IntersectionCallback) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        (log, Rc::new(move |entry| sink.borrow_mut().push(entry)))
    }

    #[test]
    fn test_initial_notification_on_observe() {
        let viewport = GeometryViewport::new(100.0, 100.0);
        viewport.set_bounds(ElementId(1), Bounds::new(0.0, 0.0, 10.0, 10.0));

        let (log, callback) = recorder();
        viewport.observe(ElementId(1), no_margin(0.1), callback);

        let log = log.borrow();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].ratio, 1.0);
        assert!(log[0].is_intersecting);
    }

    #[test]
    fn test_scroll_notifies_on_crossing_only() {
        let viewport = GeometryViewport::new(100.0, 100.0);
        viewport.set_bounds(ElementId(1), Bounds::new(0.0, 150.0, 100.0, 100.0));

        let (log, callback) = recorder();
        viewport.observe(ElementId(1), no_margin(0.5), callback);
        assert!(!log.borrow()[0].is_intersecting);

        // 25% visible: still below threshold, no new notification
        viewport.set_scroll(0.0, 75.0);
        assert_eq!(log.borrow().len(), 1);

        // 50% visible: crosses
        viewport.set_scroll(0.0, 100.0);
        assert_eq!(log.borrow().len(), 2);
        assert_eq!(log.borrow()[1].ratio, 0.5);

        // Back out
        viewport.scroll_by(0.0, -100.0);
        assert_eq!(log.borrow().len(), 3);
        assert_eq!(log.borrow()[2].ratio, 0.0);
    }

    #[test]
    fn test_root_margin_delays_visibility() {
        let viewport = GeometryViewport::new(100.0, 100.0);
        // Element occupies the last 40px of the viewport
        viewport.set_bounds(ElementId(1), Bounds::new(0.0, 60.0, 100.0, 40.0));

        let options = ObserveOptions {
            threshold: 0.1,
            root_margin: RootMargin::default(),
        };
        // Bottom 50px are trimmed away: nothing left of the element
        assert_eq!(viewport.ratio_of(ElementId(1), &options), 0.0);
        assert_eq!(viewport.ratio_of(ElementId(1), &no_margin(0.1)), 1.0);
    }

    #[test]
    fn test_unknown_element_has_zero_ratio() {
        let viewport = GeometryViewport::new(100.0, 100.0);
        assert_eq!(viewport.ratio_of(ElementId(42), &no_margin(0.1)), 0.0);
    }

    #[test]
    fn test_unobserve_stops_notifications() {
        let viewport = GeometryViewport::new(100.0, 100.0);
        viewport.set_bounds(ElementId(1), Bounds::new(0.0, 200.0, 10.0, 10.0));

        let (log, callback) = recorder();
        let id = viewport.observe(ElementId(1), no_margin(0.1), callback);
        viewport.unobserve(id);
        viewport.unobserve(id);

        viewport.set_scroll(0.0, 200.0);
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(viewport.observer_count(), 0);
    }

    #[test]
    fn test_callback_may_unobserve_during_refresh() {
        let viewport = GeometryViewport::new(100.0, 100.0);
        viewport.set_bounds(ElementId(1), Bounds::new(0.0, 200.0, 10.0, 10.0));

        let id_slot: Rc<Cell<Option<ObserverId>>> = Rc::new(Cell::new(None));
        let count = Rc::new(Cell::new(0));

        let port = viewport.clone();
        let slot = id_slot.clone();
        let counter = count.clone();
        let id = viewport.observe(
            ElementId(1),
            no_margin(0.1),
            Rc::new(move |entry: IntersectionEntry| {
                counter.set(counter.get() + 1);
                if entry.is_intersecting {
                    if let Some(id) = slot.get() {
                        port.unobserve(id);
                    }
                }
            }),
        );
        id_slot.set(Some(id));

        viewport.set_scroll(0.0, 200.0);
        viewport.set_scroll(0.0, 0.0);
        viewport.set_scroll(0.0, 200.0);

        // initial + entering; detached afterwards
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_set_layout_batches_bounds() {
        let viewport = GeometryViewport::new(100.0, 100.0);
        viewport.set_layout([
            (ElementId(1), Bounds::new(0.0, 0.0, 10.0, 10.0)),
            (ElementId(2), Bounds::new(0.0, 500.0, 10.0, 10.0)),
        ]);

        assert_eq!(viewport.ratio_of(ElementId(1), &no_margin(0.0)), 1.0);
        assert_eq!(viewport.ratio_of(ElementId(2), &no_margin(0.0)), 0.0);
    }
}

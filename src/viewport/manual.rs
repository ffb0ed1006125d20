//! Manual viewport - synthetic intersection ratios
//!
//! Nothing is computed: callers push ratios with [`ManualViewport::emit`] and
//! every live observer of that element is notified synchronously.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};

use super::{IntersectionCallback, IntersectionEntry, ObservabilityPort, ObserveOptions};
use crate::types::{ElementId, ObserverId};

struct Observation {
    element: ElementId,
    options: ObserveOptions,
    callback: IntersectionCallback,
}

/// Port whose intersection ratios are scripted by the caller.
#[derive(Default)]
pub struct ManualViewport {
    next_id: Cell<u64>,
    observations: RefCell<BTreeMap<ObserverId, Observation>>,
    children: RefCell<HashMap<ElementId, usize>>,
}

impl ManualViewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `ratio` for `element` to every live observer.
    ///
    /// `is_intersecting` is `ratio > 0`.
    pub fn emit(&self, element: ElementId, ratio: f32) {
        self.emit_entry(IntersectionEntry {
            element,
            ratio,
            is_intersecting: ratio > 0.0,
        });
    }

    /// Deliver a fully specified entry.
    pub fn emit_entry(&self, entry: IntersectionEntry) {
        // Snapshot first: callbacks may unobserve while we deliver
        let targets: Vec<(ObserverId, IntersectionCallback)> = self
            .observations
            .borrow()
            .iter()
            .filter(|(_, obs)| obs.element == entry.element)
            .map(|(id, obs)| (*id, obs.callback.clone()))
            .collect();

        for (id, callback) in targets {
            if self.observations.borrow().contains_key(&id) {
                callback(entry);
            }
        }
    }

    pub fn set_child_count(&self, element: ElementId, count: usize) {
        self.children.borrow_mut().insert(element, count);
    }

    /// Live observations of `element`.
    pub fn observer_count(&self, element: ElementId) -> usize {
        self.observations
            .borrow()
            .values()
            .filter(|obs| obs.element == element)
            .count()
    }

    /// Options the most recent live observation of `element` was registered with.
    pub fn options_for(&self, element: ElementId) -> Option<ObserveOptions> {
        self.observations
            .borrow()
            .values()
            .filter(|obs| obs.element == element)
            .last()
            .map(|obs| obs.options)
    }
}

impl ObservabilityPort for ManualViewport {
    fn observe(
        &self,
        element: ElementId,
        options: ObserveOptions,
        callback: IntersectionCallback,
    ) -> ObserverId {
        let id = ObserverId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.observations.borrow_mut().insert(
            id,
            Observation {
                element,
                options,
                callback,
            },
        );
        id
    }

    fn unobserve(&self, observer: ObserverId) {
        self.observations.borrow_mut().remove(&observer);
    }

    fn child_count(&self, element: ElementId) -> usize {
        self.children.borrow().get(&element).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_emit_reaches_only_matching_element() {
        let port = ManualViewport::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let log = seen.clone();
        port.observe(
            ElementId(1),
            ObserveOptions::default(),
            Rc::new(move |entry| log.borrow_mut().push(entry.ratio)),
        );

        port.emit(ElementId(2), 1.0);
        port.emit(ElementId(1), 0.5);

        assert_eq!(*seen.borrow(), vec![0.5]);
    }

    #[test]
    fn test_unobserve_stops_delivery() {
        let port = ManualViewport::new();
        let count = Rc::new(Cell::new(0));

        let counter = count.clone();
        let id = port.observe(
            ElementId(1),
            ObserveOptions::default(),
            Rc::new(move |_| counter.set(counter.get() + 1)),
        );

        port.emit(ElementId(1), 1.0);
        port.unobserve(id);
        port.unobserve(id);
        port.emit(ElementId(1), 1.0);

        assert_eq!(count.get(), 1);
        assert_eq!(port.observer_count(ElementId(1)), 0);
    }

    #[test]
    fn test_child_count_defaults_to_zero() {
        let port = ManualViewport::new();
        assert_eq!(port.child_count(ElementId(9)), 0);

        port.set_child_count(ElementId(9), 4);
        assert_eq!(port.child_count(ElementId(9)), 4);
    }

    #[test]
    fn test_emit_zero_is_not_intersecting() {
        let port = ManualViewport::new();
        let last = Rc::new(Cell::new(None));

        let slot = last.clone();
        port.observe(
            ElementId(1),
            ObserveOptions::default(),
            Rc::new(move |entry: IntersectionEntry| slot.set(Some(entry.is_intersecting))),
        );

        port.emit(ElementId(1), 0.0);
        assert_eq!(last.get(), Some(false));
    }
}

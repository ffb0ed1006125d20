//! Lightbox - single-item selection over a gallery

use spark_signals::{signal, Signal};
use tracing::debug;

/// Which gallery item, if any, is shown enlarged.
pub struct Lightbox {
    len: usize,
    selected: Signal<Option<usize>>,
}

impl Lightbox {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            selected: signal(None),
        }
    }

    /// Show item `index`. Out-of-range indices are ignored.
    pub fn open(&self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        debug!(index, "lightbox opened");
        self.selected.set(Some(index));
        true
    }

    pub fn close(&self) {
        if self.selected.get().is_some() {
            debug!("lightbox closed");
            self.selected.set(None);
        }
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected.get()
    }

    pub fn is_open(&self) -> bool {
        self.selected().is_some()
    }

    pub fn signal(&self) -> Signal<Option<usize>> {
        self.selected.clone()
    }

    /// Change the gallery size, closing the lightbox if its item is gone.
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        if self.selected().is_some_and(|index| index >= len) {
            self.close();
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

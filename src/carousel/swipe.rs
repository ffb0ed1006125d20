//! Swipe recognition - horizontal touch gestures to navigation
//!
//! A gesture is one touch-start, any number of moves, one touch-end.
//! `distance = start_x - end_x`; past the threshold in either direction it
//! becomes a [`SwipeGesture`], mapped through the [`ReadingDirection`].

/// Minimum horizontal travel, in pixels, for a swipe.
pub const DEFAULT_SWIPE_THRESHOLD: f32 = 50.0;

/// Layout direction of the carousel track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadingDirection {
    /// Finger moving left (positive distance) advances
    #[default]
    RightToLeft,
    /// Finger moving left goes back
    LeftToRight,
}

/// Navigation requested by a gesture or key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeGesture {
    Next,
    Previous,
}

impl ReadingDirection {
    /// Gesture for a finger moving left (`true`) or right (`false`).
    pub fn gesture_for_leftward(self, leftward: bool) -> SwipeGesture {
        match (self, leftward) {
            (ReadingDirection::RightToLeft, true) | (ReadingDirection::LeftToRight, false) => {
                SwipeGesture::Next
            }
            _ => SwipeGesture::Previous,
        }
    }

    /// Gesture for the left arrow key.
    ///
    /// In a right-to-left track the next item sits on the left.
    pub fn left_arrow(self) -> SwipeGesture {
        match self {
            ReadingDirection::RightToLeft => SwipeGesture::Next,
            ReadingDirection::LeftToRight => SwipeGesture::Previous,
        }
    }

    /// Gesture for the right arrow key.
    pub fn right_arrow(self) -> SwipeGesture {
        match self.left_arrow() {
            SwipeGesture::Next => SwipeGesture::Previous,
            SwipeGesture::Previous => SwipeGesture::Next,
        }
    }
}

/// Classify a horizontal travel distance (`start_x - end_x`).
pub fn classify_swipe(
    distance: f32,
    threshold: f32,
    direction: ReadingDirection,
) -> Option<SwipeGesture> {
    if distance > threshold {
        Some(direction.gesture_for_leftward(true))
    } else if distance < -threshold {
        Some(direction.gesture_for_leftward(false))
    } else {
        None
    }
}

/// Records one touch gesture at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SwipeTracker {
    start_x: Option<f32>,
    end_x: Option<f32>,
}

impl SwipeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new gesture, discarding any previous samples.
    pub fn start(&mut self, x: f32) {
        self.start_x = Some(x);
        self.end_x = None;
    }

    /// Record the latest position. Ignored outside a gesture.
    pub fn move_to(&mut self, x: f32) {
        if self.start_x.is_some() {
            self.end_x = Some(x);
        }
    }

    /// Travel so far, if the gesture has moved.
    pub fn distance(&self) -> Option<f32> {
        Some(self.start_x? - self.end_x?)
    }

    /// End the gesture and classify it.
    ///
    /// A gesture without any move sample (a tap) never navigates.
    pub fn finish(&mut self, threshold: f32, direction: ReadingDirection) -> Option<SwipeGesture> {
        let distance = self.distance();
        self.start_x = None;
        self.end_x = None;
        classify_swipe(distance?, threshold, direction)
    }

    pub fn is_active(&self) -> bool {
        self.start_x.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn swipe(start: f32, end: f32) -> Option<SwipeGesture> {
        let mut tracker = SwipeTracker::new();
        tracker.start(start);
        tracker.move_to(end);
        tracker.finish(DEFAULT_SWIPE_THRESHOLD, ReadingDirection::default())
    }

    #[test]
    fn test_leftward_swipe_is_next() {
        assert_eq!(swipe(100.0, 20.0), Some(SwipeGesture::Next));
    }

    #[test]
    fn test_rightward_swipe_is_previous() {
        assert_eq!(swipe(20.0, 100.0), Some(SwipeGesture::Previous));
    }

    #[test]
    fn test_short_swipe_ignored() {
        assert_eq!(swipe(50.0, 40.0), None);
        // Exactly at the threshold is not a swipe
        assert_eq!(swipe(100.0, 50.0), None);
    }

    #[test]
    fn test_tap_without_move_ignored() {
        let mut tracker = SwipeTracker::new();
        tracker.start(100.0);
        assert_eq!(tracker.finish(50.0, ReadingDirection::RightToLeft), None);
        assert!(!tracker.is_active());
    }

    #[test]
    fn test_start_resets_previous_sample() {
        let mut tracker = SwipeTracker::new();
        tracker.start(200.0);
        tracker.move_to(0.0);
        tracker.start(100.0);
        assert_eq!(tracker.distance(), None);
    }

    #[test]
    fn test_move_outside_gesture_ignored() {
        let mut tracker = SwipeTracker::new();
        tracker.move_to(10.0);
        assert_eq!(tracker.distance(), None);
    }

    #[test]
    fn test_left_to_right_inverts_mapping() {
        let dir = ReadingDirection::LeftToRight;
        assert_eq!(classify_swipe(80.0, 50.0, dir), Some(SwipeGesture::Previous));
        assert_eq!(classify_swipe(-80.0, 50.0, dir), Some(SwipeGesture::Next));
    }

    #[test]
    fn test_arrow_keys_follow_direction() {
        assert_eq!(ReadingDirection::RightToLeft.left_arrow(), SwipeGesture::Next);
        assert_eq!(ReadingDirection::RightToLeft.right_arrow(), SwipeGesture::Previous);
        assert_eq!(ReadingDirection::LeftToRight.right_arrow(), SwipeGesture::Next);
    }
}

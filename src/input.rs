//! Input Module - Terminal events to motion actions
//!
//! Bridges crossterm's event system with the carousel, lightbox and geometry
//! viewport. Mouse drags stand in for touch gestures; columns are scaled to
//! pixels so the usual swipe threshold still applies.
//!
//! # API
//!
//! - `TerminalInput::convert` - Convert a crossterm Event to a [`MotionInput`]
//! - `convert_event` - Same, with default cell metrics
//! - `apply_to_carousel` - Feed a [`MotionInput`] to a carousel
//! - `poll_event` - Non-blocking event check with timeout
//! - `enable_mouse` / `disable_mouse` - Control mouse capture
//!
//! # Example
//!
//! ```ignore
//! use spark_motion::input::{apply_to_carousel, convert_event, poll_event, TerminalInput};
//! use std::time::Duration;
//!
//! let input = TerminalInput::default();
//! loop {
//!     clock.pump();
//!     if let Ok(Some(event)) = poll_event(Duration::from_millis(16)) {
//!         let action = input.convert(event, carousel.reading_direction());
//!         apply_to_carousel(&carousel, action);
//!     }
//! }
//! ```

use std::io::stdout;
use std::time::Duration;

use crossterm::event::{
    poll, read, DisableMouseCapture, EnableMouseCapture, Event as CrosstermEvent, KeyCode,
    KeyEvent as CrosstermKeyEvent, KeyEventKind, MouseButton, MouseEvent as CrosstermMouseEvent,
    MouseEventKind,
};
use crossterm::execute;

use crate::carousel::{CarouselController, ReadingDirection, SwipeGesture};

// =============================================================================
// MOTION INPUT
// =============================================================================

/// Action derived from one terminal event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionInput {
    /// Arrow key navigation
    Navigate(SwipeGesture),
    /// Digit key or Home (0-based index)
    Goto(usize),
    /// End key: last item
    GotoLast,
    /// Mouse button pressed at x (pixels)
    TouchStart(f32),
    /// Mouse dragged to x (pixels)
    TouchMove(f32),
    /// Mouse button released
    TouchEnd,
    /// Vertical scroll in pixels (positive = down)
    Scroll(f32),
    /// Escape
    Dismiss,
    /// Quit request (q / Ctrl-C handled by caller)
    Quit,
    /// Terminal resize (new width, height)
    Resize(u16, u16),
    /// Nothing actionable
    None,
}

/// Conversion settings for terminal events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerminalInput {
    /// Pixels per terminal column, for swipe distances
    pub cell_width: f32,
    /// Pixels per terminal row, for wheel scrolling
    pub cell_height: f32,
    /// Rows scrolled per wheel notch
    pub wheel_rows: u16,
}

impl Default for TerminalInput {
    fn default() -> Self {
        Self {
            cell_width: 8.0,
            cell_height: 16.0,
            wheel_rows: 3,
        }
    }
}

impl TerminalInput {
    /// Convert a crossterm event.
    pub fn convert(&self, event: CrosstermEvent, direction: ReadingDirection) -> MotionInput {
        match event {
            CrosstermEvent::Key(key) => self.convert_key_event(key, direction),
            CrosstermEvent::Mouse(mouse) => self.convert_mouse_event(mouse),
            CrosstermEvent::Resize(w, h) => MotionInput::Resize(w, h),
            _ => MotionInput::None,
        }
    }

    /// Convert a crossterm KeyEvent. Only presses count.
    pub fn convert_key_event(
        &self,
        event: CrosstermKeyEvent,
        direction: ReadingDirection,
    ) -> MotionInput {
        if event.kind == KeyEventKind::Release {
            return MotionInput::None;
        }
        match event.code {
            KeyCode::Left => MotionInput::Navigate(direction.left_arrow()),
            KeyCode::Right => MotionInput::Navigate(direction.right_arrow()),
            KeyCode::Home => MotionInput::Goto(0),
            KeyCode::End => MotionInput::GotoLast,
            KeyCode::Char(c @ '1'..='9') => MotionInput::Goto(c as usize - '1' as usize),
            KeyCode::Char('q') => MotionInput::Quit,
            KeyCode::Esc => MotionInput::Dismiss,
            KeyCode::Down | KeyCode::PageDown => MotionInput::Scroll(self.cell_height),
            KeyCode::Up | KeyCode::PageUp => MotionInput::Scroll(-self.cell_height),
            _ => MotionInput::None,
        }
    }

    /// Convert a crossterm MouseEvent
    pub fn convert_mouse_event(&self, event: CrosstermMouseEvent) -> MotionInput {
        let x = event.column as f32 * self.cell_width;
        let wheel = self.wheel_rows as f32 * self.cell_height;
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => MotionInput::TouchStart(x),
            MouseEventKind::Drag(MouseButton::Left) => MotionInput::TouchMove(x),
            MouseEventKind::Up(MouseButton::Left) => MotionInput::TouchEnd,
            MouseEventKind::ScrollDown => MotionInput::Scroll(wheel),
            MouseEventKind::ScrollUp => MotionInput::Scroll(-wheel),
            _ => MotionInput::None,
        }
    }
}

/// Convert with default settings.
pub fn convert_event(event: CrosstermEvent, direction: ReadingDirection) -> MotionInput {
    TerminalInput::default().convert(event, direction)
}

// =============================================================================
// ROUTING
// =============================================================================

/// Feed an input to a carousel. Returns true if it navigated.
pub fn apply_to_carousel<T: 'static>(carousel: &CarouselController<T>, input: MotionInput) -> bool {
    match input {
        MotionInput::Navigate(gesture) => carousel.apply(gesture),
        MotionInput::Goto(index) => carousel.goto(index),
        MotionInput::GotoLast => carousel.goto(carousel.len().saturating_sub(1)),
        MotionInput::TouchStart(x) => {
            carousel.on_touch_start(x);
            false
        }
        MotionInput::TouchMove(x) => {
            carousel.on_touch_move(x);
            false
        }
        MotionInput::TouchEnd => carousel.on_touch_end().is_some(),
        _ => false,
    }
}

// =============================================================================
// EVENT POLLING
// =============================================================================

/// Poll for an event with timeout.
/// Returns None if no event within timeout.
pub fn poll_event(timeout: Duration) -> std::io::Result<Option<CrosstermEvent>> {
    if poll(timeout)? {
        Ok(Some(read()?))
    } else {
        Ok(None)
    }
}

/// Enable mouse capture (needed for drag gestures).
pub fn enable_mouse() -> std::io::Result<()> {
    execute!(stdout(), EnableMouseCapture)
}

/// Disable mouse capture.
pub fn disable_mouse() -> std::io::Result<()> {
    execute!(stdout(), DisableMouseCapture)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carousel::CarouselOptions;
    use crate::scheduler::TimerQueue;
    use crossterm::event::{KeyEventState, KeyModifiers};
    use std::rc::Rc;

    fn key(code: KeyCode) -> CrosstermEvent {
        CrosstermEvent::Key(CrosstermKeyEvent {
            code,
            modifiers: KeyModifiers::empty(),
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn mouse(kind: MouseEventKind, column: u16) -> CrosstermEvent {
        CrosstermEvent::Mouse(CrosstermMouseEvent {
            kind,
            column,
            row: 0,
            modifiers: KeyModifiers::empty(),
        })
    }

    #[test]
    fn test_arrow_keys_follow_reading_direction() {
        let rtl = ReadingDirection::RightToLeft;
        assert_eq!(
            convert_event(key(KeyCode::Left), rtl),
            MotionInput::Navigate(SwipeGesture::Next)
        );
        assert_eq!(
            convert_event(key(KeyCode::Left), ReadingDirection::LeftToRight),
            MotionInput::Navigate(SwipeGesture::Previous)
        );
    }

    #[test]
    fn test_digit_keys_goto() {
        let rtl = ReadingDirection::RightToLeft;
        assert_eq!(convert_event(key(KeyCode::Char('1')), rtl), MotionInput::Goto(0));
        assert_eq!(convert_event(key(KeyCode::Char('9')), rtl), MotionInput::Goto(8));
        assert_eq!(convert_event(key(KeyCode::Char('0')), rtl), MotionInput::None);
    }

    #[test]
    fn test_key_release_ignored() {
        let event = CrosstermKeyEvent {
            code: KeyCode::Left,
            modifiers: KeyModifiers::empty(),
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(
            TerminalInput::default().convert_key_event(event, ReadingDirection::RightToLeft),
            MotionInput::None
        );
    }

    #[test]
    fn test_mouse_columns_scaled_to_pixels() {
        let input = TerminalInput::default();
        let rtl = ReadingDirection::RightToLeft;
        assert_eq!(
            input.convert(mouse(MouseEventKind::Down(MouseButton::Left), 10), rtl),
            MotionInput::TouchStart(80.0)
        );
        assert_eq!(
            input.convert(mouse(MouseEventKind::ScrollDown, 0), rtl),
            MotionInput::Scroll(48.0)
        );
    }

    #[test]
    fn test_mouse_drag_swipes_carousel() {
        let queue = TimerQueue::new();
        let carousel =
            CarouselController::new(vec!['a', 'b', 'c'], CarouselOptions::default(), Rc::new(queue))
                .expect("valid options");
        let input = TerminalInput::default();
        let rtl = carousel.reading_direction();

        for event in [
            mouse(MouseEventKind::Down(MouseButton::Left), 20),
            mouse(MouseEventKind::Drag(MouseButton::Left), 5),
        ] {
            assert!(!apply_to_carousel(&carousel, input.convert(event, rtl)));
        }
        let released = input.convert(mouse(MouseEventKind::Up(MouseButton::Left), 5), rtl);
        assert!(apply_to_carousel(&carousel, released));
        assert_eq!(carousel.active_item(), Some('b'));
    }

    #[test]
    fn test_goto_last() {
        let carousel = CarouselController::new(
            vec![1, 2, 3],
            CarouselOptions::default(),
            Rc::new(TimerQueue::new()),
        )
        .expect("valid options");

        assert!(apply_to_carousel(&carousel, MotionInput::GotoLast));
        assert_eq!(carousel.active_index(), Some(2));
    }
}

//! Frame-coherent mouse state.
//!
//! The first cursor position ever received only seeds the last-known
//! position and produces no delta.

use glam::Vec2;
use winit::event::MouseScrollDelta;
use winit::window::{CursorGrabMode, Window};

/// Pixels of a trackpad pixel-delta scroll that count as one wheel line.
pub const PIXELS_PER_LINE: f64 = 40.0;

/// Convert a wheel delta to lines (positive = away from the user).
pub fn scroll_lines(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_x, y) => y,
        MouseScrollDelta::PixelDelta(pos) => (pos.y / PIXELS_PER_LINE) as f32,
    }
}

/// Cursor position, per-frame motion delta, and per-frame scroll.
#[derive(Debug, Clone, Default)]
pub struct MouseState {
    position: Option<Vec2>,
    delta: Vec2,
    scroll: f32,
    captured: bool,
    cursor_in_window: bool,
}

impl MouseState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a `CursorMoved` position.
    ///
    /// Ignored for look purposes while captured, where raw motion is used.
    pub fn on_cursor_moved(&mut self, x: f64, y: f64) {
        let new_pos = Vec2::new(x as f32, y as f32);
        if let Some(last) = self.position
            && !self.captured
        {
            self.delta += new_pos - last;
        }
        self.position = Some(new_pos);
    }

    /// Process a raw `DeviceEvent::MouseMotion` delta. Used only while captured.
    pub fn on_raw_motion(&mut self, dx: f64, dy: f64) {
        if self.captured {
            self.delta += Vec2::new(dx as f32, dy as f32);
        }
    }

    /// Accumulate a scroll already expressed in lines.
    pub fn on_scroll_lines(&mut self, lines: f32) {
        self.scroll += lines;
    }

    pub fn on_cursor_entered(&mut self) {
        self.cursor_in_window = true;
    }

    pub fn on_cursor_left(&mut self) {
        self.cursor_in_window = false;
    }

    /// Grab and hide the cursor (or release it) and switch between raw
    /// motion and cursor positions as the delta source.
    pub fn set_captured(&mut self, window: &Window, captured: bool) {
        self.captured = captured;
        if captured {
            if window.set_cursor_grab(CursorGrabMode::Locked).is_err()
                && let Err(e) = window.set_cursor_grab(CursorGrabMode::Confined)
            {
                tracing::warn!("Cursor grab unavailable: {e}");
            }
            window.set_cursor_visible(false);
        } else {
            if let Err(e) = window.set_cursor_grab(CursorGrabMode::None) {
                tracing::warn!("Cursor release failed: {e}");
            }
            window.set_cursor_visible(true);
        }
    }

    /// Clears delta and scroll. Call at the end of each frame.
    pub fn clear_transients(&mut self) {
        self.delta = Vec2::ZERO;
        self.scroll = 0.0;
    }

    /// Last cursor position, `None` until the first event arrives.
    #[must_use]
    pub fn position(&self) -> Option<Vec2> {
        self.position
    }

    /// Motion since the last clear, in pixels (+y is down the screen).
    #[must_use]
    pub fn delta(&self) -> Vec2 {
        self.delta
    }

    /// Scroll since the last clear, in lines.
    #[must_use]
    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    #[must_use]
    pub fn is_captured(&self) -> bool {
        self.captured
    }

    #[must_use]
    pub fn is_cursor_in_window(&self) -> bool {
        self.cursor_in_window
    }
}

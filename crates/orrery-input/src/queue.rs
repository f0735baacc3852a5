//! Per-frame input event queue.
//!
//! Window callbacks only record events. The frame loop drains the queue at a
//! single point per frame, so input state never changes mid-update.

use std::collections::VecDeque;

use tracing::trace;
use winit::event::{DeviceEvent, WindowEvent};

use crate::keyboard::{KeyboardState, RawKeyEvent};
use crate::mouse::{MouseState, scroll_lines};

/// An input event recorded between frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Key(RawKeyEvent),
    CursorMoved { x: f64, y: f64 },
    RawMotion { dx: f64, dy: f64 },
    /// Wheel movement in lines.
    Scroll(f32),
    CursorEntered,
    CursorLeft,
    /// Window focus lost; held keys are released.
    FocusLost,
}

impl InputEvent {
    /// Translate a window event, or `None` if it carries no input.
    pub fn from_window_event(event: &WindowEvent) -> Option<Self> {
        match event {
            WindowEvent::KeyboardInput { event, .. } => Some(Self::Key(RawKeyEvent::from(event))),
            WindowEvent::CursorMoved { position, .. } => Some(Self::CursorMoved {
                x: position.x,
                y: position.y,
            }),
            WindowEvent::MouseWheel { delta, .. } => Some(Self::Scroll(scroll_lines(*delta))),
            WindowEvent::CursorEntered { .. } => Some(Self::CursorEntered),
            WindowEvent::CursorLeft { .. } => Some(Self::CursorLeft),
            WindowEvent::Focused(false) => Some(Self::FocusLost),
            _ => None,
        }
    }

    /// Translate a device event, or `None` if it carries no input.
    pub fn from_device_event(event: &DeviceEvent) -> Option<Self> {
        match event {
            DeviceEvent::MouseMotion { delta } => Some(Self::RawMotion {
                dx: delta.0,
                dy: delta.1,
            }),
            _ => None,
        }
    }
}

/// Counts of what one drain applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainSummary {
    pub events: usize,
    pub key_events: usize,
    pub motion_events: usize,
    pub scroll_events: usize,
}

/// FIFO of input events waiting for the next frame.
#[derive(Debug, Default)]
pub struct InputQueue {
    events: VecDeque<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    /// Record a window event if it carries input. Returns whether it did.
    pub fn push_window_event(&mut self, event: &WindowEvent) -> bool {
        match InputEvent::from_window_event(event) {
            Some(input) => {
                self.push(input);
                true
            }
            None => false,
        }
    }

    /// Record a device event if it carries input. Returns whether it did.
    pub fn push_device_event(&mut self, event: &DeviceEvent) -> bool {
        match InputEvent::from_device_event(event) {
            Some(input) => {
                self.push(input);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Apply every queued event in arrival order and empty the queue.
    ///
    /// Cursor positions telescope, so the frame's motion is the last
    /// position minus the one before the frame; scroll deltas add up.
    pub fn drain_into(
        &mut self,
        keyboard: &mut KeyboardState,
        mouse: &mut MouseState,
    ) -> DrainSummary {
        let mut summary = DrainSummary::default();
        for event in self.events.drain(..) {
            summary.events += 1;
            match event {
                InputEvent::Key(key) => {
                    summary.key_events += 1;
                    keyboard.process_raw(key);
                }
                InputEvent::CursorMoved { x, y } => {
                    summary.motion_events += 1;
                    mouse.on_cursor_moved(x, y);
                }
                InputEvent::RawMotion { dx, dy } => {
                    summary.motion_events += 1;
                    mouse.on_raw_motion(dx, dy);
                }
                InputEvent::Scroll(lines) => {
                    summary.scroll_events += 1;
                    mouse.on_scroll_lines(lines);
                }
                InputEvent::CursorEntered => mouse.on_cursor_entered(),
                InputEvent::CursorLeft => mouse.on_cursor_left(),
                InputEvent::FocusLost => keyboard.release_all(),
            }
        }
        if summary.events > 0 {
            trace!(?summary, "Drained input events");
        }
        summary
    }
}

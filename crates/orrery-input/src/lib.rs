//! Input collection for orrery.
//!
//! Window callbacks push [`InputEvent`]s into an [`InputQueue`]; the frame
//! loop drains the queue once per frame into [`KeyboardState`] and
//! [`MouseState`] and reads the result.

pub mod keyboard;
pub mod mouse;
pub mod queue;

pub use keyboard::{KeyboardState, RawKeyEvent};
pub use mouse::MouseState;
pub use queue::{DrainSummary, InputEvent, InputQueue};

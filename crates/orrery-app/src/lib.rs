//! orrery application: window, input wiring and the frame loop.

pub mod controls;
pub mod error;
pub mod frame_clock;
pub mod platform;
pub mod viewer;
pub mod window;

pub use error::AppError;

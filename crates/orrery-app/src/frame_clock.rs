//! Variable-rate frame timing.
//!
//! Each frame gets two clocks: the delta since the previous frame, which
//! drives self-rotation and camera movement, and the absolute time since
//! start, which drives orbit angles.

use std::time::Instant;
use tracing::warn;

/// Largest delta handed to the simulation, in seconds.
///
/// A stall (window drag, breakpoint) otherwise lands as one huge step of
/// camera motion and spin. Elapsed time is not clamped.
pub const MAX_FRAME_DELTA: f64 = 0.25;

/// Timing for one frame, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    pub delta: f64,
    pub elapsed: f64,
}

/// Measures frame deltas against a start instant.
pub struct FrameClock {
    previous_time: Instant,
    elapsed: f64,
    frame_count: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            previous_time: Instant::now(),
            elapsed: 0.0,
            frame_count: 0,
        }
    }

    /// Measure the wall-clock time since the previous tick.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let frame_time = now.duration_since(self.previous_time).as_secs_f64();
        self.previous_time = now;
        self.advance(frame_time)
    }

    /// Advance by an explicit frame time.
    pub fn advance(&mut self, frame_time: f64) -> FrameTime {
        let frame_time = frame_time.max(0.0);
        self.elapsed += frame_time;
        self.frame_count += 1;

        let delta = if frame_time > MAX_FRAME_DELTA {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                frame_time * 1000.0,
                MAX_FRAME_DELTA * 1000.0
            );
            MAX_FRAME_DELTA
        } else {
            frame_time
        };

        FrameTime {
            delta,
            elapsed: self.elapsed,
        }
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

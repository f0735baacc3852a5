//! Celestial bodies and their per-frame model transforms.
//!
//! Orbit angles are recomputed from absolute elapsed time every frame, while
//! self-rotation phases accumulate frame deltas. A [`SolarSystem`] owns the
//! bodies in draw order: the star first, then planets, then moons.

mod body;
mod descriptor;
mod error;
mod system;

pub use body::{BodyKind, CelestialBody, OrbitTerm};
pub use descriptor::{BodyDescriptor, SystemDescriptor};
pub use error::SceneError;
pub use system::{BodyInstance, SolarSystem};

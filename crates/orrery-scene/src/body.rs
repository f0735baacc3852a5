//! A single celestial body and its model transform.

use std::f32::consts::TAU;
use std::path::PathBuf;

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Draw-order class of a body. Variants are ordered the way they are drawn.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum BodyKind {
    Star,
    #[default]
    Planet,
    Moon,
}

/// One circular orbit around a point.
///
/// `transform(t) = Translate(center) * RotateY(t * angular_speed) * Translate(radius, 0, 0)`.
/// A term with zero center, radius and speed is exactly the identity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitTerm {
    /// Point orbited, relative to the previous term.
    pub center: Vec3,
    /// Distance from `center` along the rotated +X axis.
    pub radius: f32,
    /// Radians per second about +Y.
    pub angular_speed: f32,
}

impl OrbitTerm {
    /// Orbit of `radius` around the parent origin.
    pub fn new(radius: f32, angular_speed: f32) -> Self {
        Self {
            center: Vec3::ZERO,
            radius,
            angular_speed,
        }
    }

    /// The same orbit around a point offset from the parent origin.
    pub fn with_center(mut self, center: Vec3) -> Self {
        self.center = center;
        self
    }

    /// Orbit angle at absolute time `time`, in radians.
    pub fn angle_at(&self, time: f64) -> f32 {
        (time * f64::from(self.angular_speed)) as f32
    }

    pub fn transform(&self, time: f64) -> Mat4 {
        Mat4::from_translation(self.center)
            * Mat4::from_rotation_y(self.angle_at(time))
            * Mat4::from_translation(Vec3::new(self.radius, 0.0, 0.0))
    }
}

/// A textured sphere that orbits and spins.
#[derive(Debug, Clone, PartialEq)]
pub struct CelestialBody {
    pub name: String,
    pub kind: BodyKind,
    /// Texture path, relative to the asset root.
    pub texture: PathBuf,
    /// Uniform scale applied to the unit sphere.
    pub scale: f32,
    /// Radians per second about the body's own Y axis.
    pub self_rotation_speed: f32,
    /// Orbit chain, outermost first. A moon carries its planet's terms
    /// followed by its own.
    pub orbit: Vec<OrbitTerm>,
    self_rotation_phase: f32,
}

impl CelestialBody {
    /// Creates a body with zero self-rotation phase.
    pub fn new(
        name: impl Into<String>,
        kind: BodyKind,
        texture: impl Into<PathBuf>,
        scale: f32,
        self_rotation_speed: f32,
        orbit: Vec<OrbitTerm>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            texture: texture.into(),
            scale,
            self_rotation_speed,
            orbit,
            self_rotation_phase: 0.0,
        }
    }

    /// Current self-rotation angle in radians, in `[0, 2π)`.
    pub fn self_rotation_phase(&self) -> f32 {
        self.self_rotation_phase
    }

    /// Accumulate `dt` seconds of self-rotation.
    pub fn advance(&mut self, dt: f64) {
        let step = dt as f32 * self.self_rotation_speed;
        self.self_rotation_phase = (self.self_rotation_phase + step).rem_euclid(TAU);
    }

    /// Model matrix at absolute time `time`:
    /// `Π orbit[k](time) * RotateY(phase) * Scale(scale)`, outermost orbit leftmost.
    pub fn model_matrix(&self, time: f64) -> Mat4 {
        let orbit = self
            .orbit
            .iter()
            .fold(Mat4::IDENTITY, |acc, term| acc * term.transform(time));

        orbit
            * Mat4::from_rotation_y(self.self_rotation_phase)
            * Mat4::from_scale(Vec3::splat(self.scale))
    }

    /// World-space center at absolute time `time`.
    pub fn position(&self, time: f64) -> Vec3 {
        self.model_matrix(time).w_axis.truncate()
    }
}

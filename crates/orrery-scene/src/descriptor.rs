//! Serializable scene description and the built-in solar system.
//!
//! Speeds are written in degrees per second so scene files stay readable;
//! they are converted to radians when the scene is resolved.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::body::BodyKind;

fn default_scale() -> f32 {
    1.0
}

/// One body as written in a scene file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyDescriptor {
    /// Unique name, also used by children to reference their parent.
    pub name: String,
    /// Draw-order class.
    #[serde(default)]
    pub kind: BodyKind,
    /// Texture path relative to the asset root.
    pub texture: PathBuf,
    /// Uniform scale of the unit sphere.
    #[serde(default = "default_scale")]
    pub scale: f32,
    /// Spin about the body's own Y axis.
    #[serde(default)]
    pub self_rotation_deg_per_sec: f32,
    /// Distance from the orbited point.
    #[serde(default)]
    pub orbit_radius: f32,
    /// Angular speed around the orbited point.
    #[serde(default)]
    pub orbit_deg_per_sec: f32,
    /// Orbited point relative to the parent (or the origin).
    #[serde(default)]
    pub offset: [f32; 3],
    /// Body whose orbit this one is carried along, declared earlier.
    #[serde(default)]
    pub parent: Option<String>,
}

impl BodyDescriptor {
    /// Body with unit scale and no motion.
    pub fn new(name: impl Into<String>, kind: BodyKind, texture: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            kind,
            texture: texture.into(),
            scale: 1.0,
            self_rotation_deg_per_sec: 0.0,
            orbit_radius: 0.0,
            orbit_deg_per_sec: 0.0,
            offset: [0.0; 3],
            parent: None,
        }
    }

    pub fn scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn spin(mut self, deg_per_sec: f32) -> Self {
        self.self_rotation_deg_per_sec = deg_per_sec;
        self
    }

    pub fn orbit(mut self, radius: f32, deg_per_sec: f32) -> Self {
        self.orbit_radius = radius;
        self.orbit_deg_per_sec = deg_per_sec;
        self
    }

    pub fn offset(mut self, offset: [f32; 3]) -> Self {
        self.offset = offset;
        self
    }

    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }
}

/// A whole scene as written in a RON file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemDescriptor {
    pub bodies: Vec<BodyDescriptor>,
}

impl SystemDescriptor {
    /// The built-in solar system: the Sun, eight planets, Ceres orbiting a
    /// point offset from the Sun, and the Moon around Earth.
    pub fn solar_system() -> Self {
        use BodyKind::{Moon, Planet, Star};

        let bodies = vec![
            BodyDescriptor::new("Sun", Star, "textures/sun.jpg")
                .scale(2.5)
                .spin(10.0),
            BodyDescriptor::new("Mercury", Planet, "textures/mercury.jpg")
                .scale(0.3)
                .spin(20.0)
                .orbit(4.0, 47.0),
            BodyDescriptor::new("Venus", Planet, "textures/venus.jpg")
                .scale(0.5)
                .spin(-15.0)
                .orbit(6.0, 35.0),
            BodyDescriptor::new("Earth", Planet, "textures/earth.jpg")
                .scale(0.55)
                .spin(60.0)
                .orbit(8.5, 30.0),
            BodyDescriptor::new("Mars", Planet, "textures/mars.jpg")
                .scale(0.4)
                .spin(58.0)
                .orbit(11.0, 24.0),
            BodyDescriptor::new("Ceres", Planet, "textures/ceres.jpg")
                .scale(0.2)
                .spin(90.0)
                .orbit(13.0, 18.0)
                .offset([1.0, 0.0, 0.5]),
            BodyDescriptor::new("Jupiter", Planet, "textures/jupiter.jpg")
                .scale(1.3)
                .spin(120.0)
                .orbit(16.0, 13.0),
            BodyDescriptor::new("Saturn", Planet, "textures/saturn.jpg")
                .scale(1.1)
                .spin(110.0)
                .orbit(20.0, 9.7),
            BodyDescriptor::new("Uranus", Planet, "textures/uranus.jpg")
                .scale(0.8)
                .spin(-80.0)
                .orbit(24.0, 6.8),
            BodyDescriptor::new("Neptune", Planet, "textures/neptune.jpg")
                .scale(0.8)
                .spin(75.0)
                .orbit(27.0, 5.4),
            BodyDescriptor::new("Moon", Moon, "textures/moon.jpg")
                .scale(0.15)
                .spin(15.0)
                .orbit(1.0, 120.0)
                .parent("Earth"),
        ];

        Self { bodies }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_body_uses_defaults() {
        let body: BodyDescriptor =
            ron::from_str("(name: \"Io\", texture: \"textures/io.jpg\")").unwrap();
        assert_eq!(body.kind, BodyKind::Planet);
        assert_eq!(body.scale, 1.0);
        assert_eq!(body.orbit_radius, 0.0);
        assert_eq!(body.offset, [0.0; 3]);
        assert!(body.parent.is_none());
    }

    #[test]
    fn test_full_body_parses() {
        let src = r#"(
            name: "Moon",
            kind: Moon,
            texture: "textures/moon.jpg",
            scale: 0.2,
            self_rotation_deg_per_sec: 15.0,
            orbit_radius: 1.0,
            orbit_deg_per_sec: 120.0,
            offset: (0.0, 0.5, 0.0),
            parent: Some("Earth"),
        )"#;
        let body: BodyDescriptor = ron::from_str(src).unwrap();
        assert_eq!(body.kind, BodyKind::Moon);
        assert_eq!(body.offset, [0.0, 0.5, 0.0]);
        assert_eq!(body.parent.as_deref(), Some("Earth"));
    }

    #[test]
    fn test_solar_system_starts_with_sun() {
        let system = SystemDescriptor::solar_system();
        assert_eq!(system.bodies[0].name, "Sun");
        assert_eq!(system.bodies[0].kind, BodyKind::Star);
        assert_eq!(system.bodies[0].orbit_radius, 0.0);
        assert_eq!(system.bodies[0].orbit_deg_per_sec, 0.0);
        assert_eq!(system.bodies.len(), 11);
    }

    #[test]
    fn test_ceres_orbits_offset_point() {
        let system = SystemDescriptor::solar_system();
        let ceres = system.bodies.iter().find(|b| b.name == "Ceres").unwrap();
        assert_ne!(ceres.offset, [0.0; 3]);
        assert!(ceres.parent.is_none());
    }

    #[test]
    fn test_descriptor_survives_ron() {
        let system = SystemDescriptor::solar_system();
        let text = ron::ser::to_string_pretty(&system, ron::ser::PrettyConfig::new()).unwrap();
        let parsed: SystemDescriptor = ron::from_str(&text).unwrap();
        assert_eq!(parsed, system);
    }
}

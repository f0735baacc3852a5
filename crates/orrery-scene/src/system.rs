//! A resolved set of bodies in draw order.

use std::collections::HashMap;
use std::path::Path;

use glam::{Mat4, Vec3};

use crate::body::{CelestialBody, OrbitTerm};
use crate::descriptor::SystemDescriptor;
use crate::error::SceneError;

/// A body paired with its model matrix for one frame.
#[derive(Debug, Clone, Copy)]
pub struct BodyInstance<'a> {
    pub body: &'a CelestialBody,
    pub model: Mat4,
}

/// Celestial bodies sorted star, planets, moons; declaration order is kept
/// within each kind.
#[derive(Debug, Clone, Default)]
pub struct SolarSystem {
    bodies: Vec<CelestialBody>,
}

impl SolarSystem {
    /// The built-in solar system.
    pub fn default_system() -> Self {
        Self::from_descriptor(&SystemDescriptor::solar_system()).unwrap_or_else(|e| {
            log::error!("Built-in solar system failed to resolve: {e}");
            Self::default()
        })
    }

    /// Resolve parents and build the draw-ordered body list.
    pub fn from_descriptor(descriptor: &SystemDescriptor) -> Result<Self, SceneError> {
        let mut chains: HashMap<&str, Vec<OrbitTerm>> = HashMap::new();
        let mut bodies = Vec::with_capacity(descriptor.bodies.len());

        for desc in &descriptor.bodies {
            if chains.contains_key(desc.name.as_str()) {
                return Err(SceneError::DuplicateName {
                    name: desc.name.clone(),
                });
            }
            if !desc.scale.is_finite() || desc.scale <= 0.0 {
                return Err(SceneError::InvalidScale {
                    body: desc.name.clone(),
                    scale: desc.scale,
                });
            }

            let mut orbit = match &desc.parent {
                Some(parent) => chains
                    .get(parent.as_str())
                    .cloned()
                    .ok_or_else(|| SceneError::UnknownParent {
                        body: desc.name.clone(),
                        parent: parent.clone(),
                    })?,
                None => Vec::new(),
            };
            orbit.push(
                OrbitTerm::new(desc.orbit_radius, desc.orbit_deg_per_sec.to_radians())
                    .with_center(Vec3::from(desc.offset)),
            );
            chains.insert(desc.name.as_str(), orbit.clone());

            bodies.push(CelestialBody::new(
                desc.name.clone(),
                desc.kind,
                desc.texture.clone(),
                desc.scale,
                desc.self_rotation_deg_per_sec.to_radians(),
                orbit,
            ));
        }

        // Stable: bodies of the same kind keep their declared order.
        bodies.sort_by_key(|body| body.kind);

        log::debug!("Resolved scene with {} bodies", bodies.len());
        Ok(Self { bodies })
    }

    /// Parse a RON scene description.
    pub fn from_ron_str(source: &str) -> Result<Self, SceneError> {
        let descriptor: SystemDescriptor = ron::from_str(source).map_err(SceneError::Parse)?;
        Self::from_descriptor(&descriptor)
    }

    /// Load a RON scene description from disk.
    pub fn load_ron(path: &Path) -> Result<Self, SceneError> {
        let source = std::fs::read_to_string(path).map_err(|source| SceneError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let system = Self::from_ron_str(&source)?;
        log::info!(
            "Loaded scene with {} bodies from {}",
            system.len(),
            path.display()
        );
        Ok(system)
    }

    /// Advance every body's self-rotation by `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        for body in &mut self.bodies {
            body.advance(dt);
        }
    }

    /// Bodies in draw order.
    pub fn bodies(&self) -> &[CelestialBody] {
        &self.bodies
    }

    pub fn body(&self, name: &str) -> Option<&CelestialBody> {
        self.bodies.iter().find(|body| body.name == name)
    }

    /// Model matrices for absolute time `time`, in draw order.
    pub fn instances(&self, time: f64) -> Vec<BodyInstance<'_>> {
        self.bodies
            .iter()
            .map(|body| BodyInstance {
                body,
                model: body.model_matrix(time),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyKind;
    use crate::descriptor::BodyDescriptor;

    #[test]
    fn test_builtin_catalogue_resolves() {
        let system = SolarSystem::from_descriptor(&SystemDescriptor::solar_system()).unwrap();
        assert_eq!(system.len(), SystemDescriptor::solar_system().bodies.len());
        assert_eq!(system.len(), SolarSystem::default_system().len());
    }

    #[test]
    fn test_default_system_draw_order() {
        let system = SolarSystem::default_system();
        assert_eq!(system.len(), 11);
        let kinds: Vec<BodyKind> = system.bodies().iter().map(|b| b.kind).collect();
        let mut sorted = kinds.clone();
        sorted.sort();
        assert_eq!(kinds, sorted);
        assert_eq!(system.bodies()[0].name, "Sun");
        assert_eq!(system.bodies().last().unwrap().name, "Moon");
    }

    #[test]
    fn test_moon_declared_first_is_drawn_last() {
        let descriptor = SystemDescriptor {
            bodies: vec![
                BodyDescriptor::new("Earth", BodyKind::Planet, "earth.jpg").orbit(8.0, 30.0),
                BodyDescriptor::new("Moon", BodyKind::Moon, "moon.jpg")
                    .orbit(1.0, 90.0)
                    .parent("Earth"),
                BodyDescriptor::new("Mars", BodyKind::Planet, "mars.jpg").orbit(11.0, 20.0),
                BodyDescriptor::new("Sun", BodyKind::Star, "sun.jpg"),
            ],
        };
        let system = SolarSystem::from_descriptor(&descriptor).unwrap();
        let names: Vec<&str> = system.bodies().iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["Sun", "Earth", "Mars", "Moon"]);
    }

    #[test]
    fn test_moon_inherits_parent_chain() {
        let system = SolarSystem::default_system();
        let earth = system.body("Earth").unwrap();
        let moon = system.body("Moon").unwrap();
        assert_eq!(moon.orbit.len(), 2);
        assert_eq!(moon.orbit[0], earth.orbit[0]);
        assert_eq!(moon.orbit[1].radius, 1.0);

        for t in [0.0, 3.0, 17.25] {
            let d = (moon.position(t) - earth.position(t)).length();
            assert!((d - 1.0).abs() < 1e-4, "moon drifted to {d} at t={t}");
        }
    }

    #[test]
    fn test_sun_stays_at_origin() {
        let mut system = SolarSystem::default_system();
        system.advance(3.0);
        let sun = system.body("Sun").unwrap();
        assert!(sun.position(42.0).length() < 1e-6);
    }

    #[test]
    fn test_speeds_convert_to_radians() {
        let system = SolarSystem::default_system();
        let earth = system.body("Earth").unwrap();
        assert!((earth.orbit[0].angular_speed - 30f32.to_radians()).abs() < 1e-7);
        assert!((earth.self_rotation_speed - 60f32.to_radians()).abs() < 1e-7);
    }

    #[test]
    fn test_advance_applies_delta_sequence() {
        let descriptor = SystemDescriptor {
            bodies: vec![BodyDescriptor::new("Sun", BodyKind::Star, "sun.jpg").spin(45.0)],
        };
        let mut system = SolarSystem::from_descriptor(&descriptor).unwrap();
        for dt in [0.0, 1.0] {
            system.advance(dt);
        }
        let phase = system.bodies()[0].self_rotation_phase();
        assert!((phase - 45f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn test_instances_follow_draw_order() {
        let system = SolarSystem::default_system();
        let instances = system.instances(2.0);
        assert_eq!(instances.len(), system.len());
        for (instance, body) in instances.iter().zip(system.bodies()) {
            assert_eq!(instance.body.name, body.name);
            assert_eq!(instance.model, body.model_matrix(2.0));
        }
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let descriptor = SystemDescriptor {
            bodies: vec![
                BodyDescriptor::new("Moon", BodyKind::Moon, "moon.jpg").parent("Earth"),
                BodyDescriptor::new("Earth", BodyKind::Planet, "earth.jpg"),
            ],
        };
        let err = SolarSystem::from_descriptor(&descriptor).unwrap_err();
        assert!(matches!(err, SceneError::UnknownParent { ref parent, .. } if parent == "Earth"));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let descriptor = SystemDescriptor {
            bodies: vec![
                BodyDescriptor::new("Sun", BodyKind::Star, "a.jpg"),
                BodyDescriptor::new("Sun", BodyKind::Star, "b.jpg"),
            ],
        };
        assert!(matches!(
            SolarSystem::from_descriptor(&descriptor),
            Err(SceneError::DuplicateName { .. })
        ));
    }

    #[test]
    fn test_invalid_scale_rejected() {
        let descriptor = SystemDescriptor {
            bodies: vec![BodyDescriptor::new("Sun", BodyKind::Star, "a.jpg").scale(0.0)],
        };
        assert!(matches!(
            SolarSystem::from_descriptor(&descriptor),
            Err(SceneError::InvalidScale { .. })
        ));
    }

    #[test]
    fn test_load_ron_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.ron");
        std::fs::write(
            &path,
            r#"(bodies: [
                (name: "Sun", kind: Star, texture: "textures/sun.jpg", scale: 2.0),
                (name: "Earth", texture: "textures/earth.jpg", orbit_radius: 5.0, orbit_deg_per_sec: 10.0),
            ])"#,
        )
        .unwrap();
        let system = SolarSystem::load_ron(&path).unwrap();
        assert_eq!(system.len(), 2);
        assert_eq!(system.body("Earth").unwrap().orbit[0].radius, 5.0);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = SolarSystem::load_ron(Path::new("/nonexistent/scene.ron")).unwrap_err();
        assert!(matches!(err, SceneError::Read { .. }));
    }

    #[test]
    fn test_bad_ron_is_parse_error() {
        assert!(matches!(
            SolarSystem::from_ron_str("(bodies: [("),
            Err(SceneError::Parse(_))
        ));
    }
}

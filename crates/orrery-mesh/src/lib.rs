//! Procedural meshes for orrery. Currently a single UV sphere shared by every
//! celestial body.

mod sphere;

pub use sphere::{MeshError, SphereMesh, SphereParams, SphereVertex, VERTEX_COLOR, generate_sphere};

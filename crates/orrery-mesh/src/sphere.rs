//! UV sphere generation.
//!
//! Vertices are laid out stack by stack from the north pole (+Z) to the south
//! pole, each stack holding `sectors + 1` vertices. The first and last vertex
//! of a stack coincide in position but carry `u = 0` and `u = 1`, so a texture
//! wraps without a seam.

use std::f32::consts::PI;

use bytemuck::{Pod, Zeroable};

/// Per-vertex color baked into every sphere vertex (yellow).
pub const VERTEX_COLOR: [f32; 3] = [1.0, 1.0, 0.0];

/// A sphere vertex: position, color, and texture coordinates.
///
/// Matches shader locations 0, 1 and 2.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SphereVertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Vertex color, always [`VERTEX_COLOR`].
    pub color: [f32; 3],
    /// Texture coordinates: `u` along sectors, `v` along stacks.
    pub uv: [f32; 2],
}

static_assertions::assert_eq_size!(SphereVertex, [u8; 32]);

/// Errors for sphere parameters that cannot produce a closed mesh.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    /// Fewer than three sectors.
    #[error("sphere needs at least 3 sectors, got {sectors}")]
    TooFewSectors { sectors: u32 },

    /// Fewer than two stacks.
    #[error("sphere needs at least 2 stacks, got {stacks}")]
    TooFewStacks { stacks: u32 },

    /// Radius is zero, negative, or not finite.
    #[error("sphere radius must be positive and finite, got {radius}")]
    InvalidRadius { radius: f32 },
}

/// Subdivision and size of a UV sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereParams {
    /// Longitude subdivisions (S).
    pub sectors: u32,
    /// Latitude subdivisions (C).
    pub stacks: u32,
    /// Distance of every vertex from the origin.
    pub radius: f32,
}

impl Default for SphereParams {
    fn default() -> Self {
        Self {
            sectors: 36,
            stacks: 18,
            radius: 1.0,
        }
    }
}

impl SphereParams {
    /// Unit sphere with the given subdivisions.
    pub fn new(sectors: u32, stacks: u32) -> Self {
        Self {
            sectors,
            stacks,
            radius: 1.0,
        }
    }

    /// `(C + 1) * (S + 1)`.
    pub fn expected_vertex_count(&self) -> usize {
        (self.stacks as usize + 1) * (self.sectors as usize + 1)
    }

    /// `6 * C * S`.
    pub fn expected_index_count(&self) -> usize {
        6 * self.stacks as usize * self.sectors as usize
    }

    fn validate(&self) -> Result<(), MeshError> {
        if self.sectors < 3 {
            return Err(MeshError::TooFewSectors {
                sectors: self.sectors,
            });
        }
        if self.stacks < 2 {
            return Err(MeshError::TooFewStacks {
                stacks: self.stacks,
            });
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(MeshError::InvalidRadius {
                radius: self.radius,
            });
        }
        Ok(())
    }
}

/// Vertex and index data of a generated sphere.
#[derive(Debug, Clone, PartialEq)]
pub struct SphereMesh {
    /// Vertices in stack-major order.
    pub vertices: Vec<SphereVertex>,
    /// Triangle list, three indices per triangle.
    pub indices: Vec<u32>,
}

impl SphereMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Generate a UV sphere.
///
/// For stack `i` in `0..=C` and sector `j` in `0..=S`:
/// `stack = π/2 - i·π/C`, `sector = j·2π/S`, position
/// `(r·cos(stack)·cos(sector), r·cos(stack)·sin(sector), r·sin(stack))` and
/// uv `(j/S, i/C)`. Each cell emits `(first, second, first+1)` and
/// `(second, second+1, first+1)` with `first = i·(S+1)+j` and
/// `second = first+S+1`. Cells touching a pole keep their degenerate
/// triangle so the index count is always `6·C·S`.
pub fn generate_sphere(params: SphereParams) -> Result<SphereMesh, MeshError> {
    params.validate()?;

    let SphereParams {
        sectors,
        stacks,
        radius,
    } = params;

    let mut vertices = Vec::with_capacity(params.expected_vertex_count());
    for i in 0..=stacks {
        let stack_angle = PI / 2.0 - i as f32 * PI / stacks as f32;
        let xy = radius * stack_angle.cos();
        let z = radius * stack_angle.sin();

        for j in 0..=sectors {
            let sector_angle = j as f32 * 2.0 * PI / sectors as f32;
            vertices.push(SphereVertex {
                position: [xy * sector_angle.cos(), xy * sector_angle.sin(), z],
                color: VERTEX_COLOR,
                uv: [j as f32 / sectors as f32, i as f32 / stacks as f32],
            });
        }
    }

    let mut indices = Vec::with_capacity(params.expected_index_count());
    for i in 0..stacks {
        for j in 0..sectors {
            let first = i * (sectors + 1) + j;
            let second = first + sectors + 1;
            indices.extend_from_slice(&[first, second, first + 1]);
            indices.extend_from_slice(&[second, second + 1, first + 1]);
        }
    }

    Ok(SphereMesh { vertices, indices })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_default_counts() {
        let mesh = generate_sphere(SphereParams::default()).unwrap();
        assert_eq!(mesh.vertex_count(), 19 * 37);
        assert_eq!(mesh.index_count(), 6 * 18 * 36);
        assert_eq!(mesh.triangle_count(), 2 * 18 * 36);
    }

    #[test]
    fn test_counts_for_various_subdivisions() {
        for (sectors, stacks) in [(3, 2), (4, 3), (8, 5), (36, 18), (64, 31)] {
            let params = SphereParams::new(sectors, stacks);
            let mesh = generate_sphere(params).unwrap();
            assert_eq!(mesh.vertex_count(), params.expected_vertex_count());
            assert_eq!(mesh.index_count(), params.expected_index_count());
        }
    }

    #[test]
    fn test_vertices_lie_on_sphere() {
        for radius in [1.0_f32, 0.25, 7.5] {
            let params = SphereParams {
                radius,
                ..SphereParams::default()
            };
            let mesh = generate_sphere(params).unwrap();
            for v in &mesh.vertices {
                let len = Vec3::from(v.position).length();
                assert!(
                    (len - radius).abs() < 1e-5 * radius.max(1.0),
                    "vertex at distance {len}, expected {radius}"
                );
            }
        }
    }

    #[test]
    fn test_poles_and_seam() {
        let params = SphereParams::new(8, 4);
        let mesh = generate_sphere(params).unwrap();

        let north = mesh.vertices[0].position;
        assert!(north[0].abs() < 1e-6 && north[1].abs() < 1e-6);
        assert!((north[2] - 1.0).abs() < 1e-6);

        let south = mesh.vertices.last().unwrap().position;
        assert!((south[2] + 1.0).abs() < 1e-6);

        // First and last vertex of a stack share a position but not u.
        let row = 2 * 9;
        let start = mesh.vertices[row];
        let end = mesh.vertices[row + 8];
        assert!((Vec3::from(start.position) - Vec3::from(end.position)).length() < 1e-5);
        assert_eq!(start.uv[0], 0.0);
        assert_eq!(end.uv[0], 1.0);
    }

    #[test]
    fn test_uvs_and_color() {
        let params = SphereParams::new(4, 2);
        let mesh = generate_sphere(params).unwrap();
        // Stack 1, sector 3.
        let v = mesh.vertices[5 + 3];
        assert_eq!(v.uv, [0.75, 0.5]);
        assert!(mesh.vertices.iter().all(|v| v.color == VERTEX_COLOR));
    }

    #[test]
    fn test_first_cell_indices() {
        let mesh = generate_sphere(SphereParams::new(36, 18)).unwrap();
        assert_eq!(&mesh.indices[..6], &[0, 37, 1, 37, 38, 1]);
        // Second cell of the second stack.
        let cell = (36 + 1) * 6;
        assert_eq!(&mesh.indices[cell..cell + 6], &[38, 75, 39, 75, 76, 39]);
    }

    #[test]
    fn test_indices_in_range() {
        let mesh = generate_sphere(SphereParams::new(12, 7)).unwrap();
        let count = mesh.vertex_count() as u32;
        assert!(mesh.indices.iter().all(|&i| i < count));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let params = SphereParams {
            sectors: 20,
            stacks: 9,
            radius: 2.5,
        };
        let a = generate_sphere(params).unwrap();
        let b = generate_sphere(params).unwrap();
        assert_eq!(
            bytemuck::cast_slice::<_, u8>(a.vertices.as_slice()),
            bytemuck::cast_slice::<_, u8>(b.vertices.as_slice())
        );
        assert_eq!(a.indices, b.indices);
    }

    #[test]
    fn test_rejects_degenerate_params() {
        assert_eq!(
            generate_sphere(SphereParams::new(2, 18)),
            Err(MeshError::TooFewSectors { sectors: 2 })
        );
        assert_eq!(
            generate_sphere(SphereParams::new(36, 1)),
            Err(MeshError::TooFewStacks { stacks: 1 })
        );
        assert!(matches!(
            generate_sphere(SphereParams {
                radius: 0.0,
                ..SphereParams::default()
            }),
            Err(MeshError::InvalidRadius { .. })
        ));
        assert!(matches!(
            generate_sphere(SphereParams {
                radius: f32::NAN,
                ..SphereParams::default()
            }),
            Err(MeshError::InvalidRadius { .. })
        ));
    }
}

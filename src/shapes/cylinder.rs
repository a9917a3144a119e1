//! Truncated cone / cylinder generator with three texture regions.

use serde::Deserialize;
use std::f32::consts::PI;
use tracing::debug;

use crate::shapes::normals::smooth_lateral_normals;
use crate::shapes::{MeshData, RegionCuts, Vertex};

/// Shape parameters for a frustum centred on the origin, axis along +Y.
///
/// `top_radius` and `base_radius` may differ (cone, frustum) or match
/// (cylinder). `stack_count` must be at least 1 and `sector_count` at least 1;
/// fewer than 3 sectors gives a zero-area shape.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CylinderParams {
    pub top_radius: f32,
    pub base_radius: f32,
    pub height: f32,
    pub stack_count: u32,
    pub sector_count: u32,
}

impl Default for CylinderParams {
    fn default() -> Self {
        Self {
            top_radius: 1.0,
            base_radius: 1.0,
            height: 2.0,
            stack_count: 4,
            sector_count: 36,
        }
    }
}

impl CylinderParams {
    pub fn new(
        top_radius: f32,
        base_radius: f32,
        height: f32,
        stack_count: u32,
        sector_count: u32,
    ) -> Self {
        Self {
            top_radius,
            base_radius,
            height,
            stack_count,
            sector_count,
        }
    }

    /// Vertices in one ring, including the duplicated seam column
    pub fn ring_len(&self) -> u32 {
        self.sector_count + 1
    }

    pub fn lateral_vertex_count(&self) -> u32 {
        (self.stack_count + 1) * self.ring_len()
    }

    pub fn vertex_count(&self) -> u32 {
        self.lateral_vertex_count() + 2 * self.ring_len() + 2
    }

    pub fn index_count(&self) -> u32 {
        6 * self.stack_count * self.sector_count + 2 * 3 * self.sector_count
    }

    // Block layout after the lateral rings: top ring, base ring, two centres
    fn top_cap_start(&self) -> u32 {
        self.lateral_vertex_count()
    }

    fn base_cap_start(&self) -> u32 {
        self.top_cap_start() + self.ring_len()
    }

    fn top_center(&self) -> u32 {
        self.base_cap_start() + self.ring_len()
    }

    fn base_center(&self) -> u32 {
        self.top_center() + 1
    }
}

/// Generate the frustum mesh.
///
/// Vertex order:
/// 1. `stack_count + 1` lateral rings from top to bottom, `sector_count + 1`
///    vertices each (first and last column share a position to close the UV
///    seam)
/// 2. the top cap ring (copy of ring 0, normal +Y, planar UV)
/// 3. the base cap ring (copy of the last ring, normal -Y, planar UV)
/// 4. the top centre, then the base centre
///
/// Index order is lateral band, top cap fan, base cap fan; the boundaries are
/// returned in [`MeshData::cuts`].
///
/// Zero stack or sector counts are a caller error and are not checked in
/// release builds.
pub fn generate(params: &CylinderParams) -> MeshData {
    debug_assert!(params.stack_count >= 1, "stack_count must be >= 1");
    debug_assert!(params.sector_count >= 1, "sector_count must be >= 1");

    let mut vertices = generate_vertices(params);
    let mut indices = Vec::<u32>::with_capacity(params.index_count() as usize);

    push_lateral_indices(params, &mut indices);
    let lateral_end = indices.len() as u32;

    push_fan(&mut indices, params.top_center(), params.top_cap_start(), params.sector_count);
    let top_cap_end = indices.len() as u32;

    push_fan(&mut indices, params.base_center(), params.base_cap_start(), params.sector_count);
    let total = indices.len() as u32;

    smooth_lateral_normals(&mut vertices, params.stack_count, params.sector_count);

    let cuts = RegionCuts {
        lateral_end,
        top_cap_end,
        total,
    };

    debug!(
        vertices = vertices.len(),
        indices = total,
        lateral_end,
        top_cap_end,
        "generated frustum mesh"
    );

    MeshData {
        vertices,
        indices,
        cuts,
    }
}

fn generate_vertices(params: &CylinderParams) -> Vec<Vertex> {
    let stacks = params.stack_count as f32;
    let sectors = params.sector_count as f32;
    let half_height = params.height / 2.0;

    let mut vertices = Vec::<Vertex>::with_capacity(params.vertex_count() as usize);
    let mut top_circle = Vec::<Vertex>::with_capacity(params.ring_len() as usize);
    let mut base_circle = Vec::<Vertex>::with_capacity(params.ring_len() as usize);

    for i in 0..=params.stack_count {
        let t = i as f32 / stacks;
        let y = half_height - t * params.height;
        let radius = params.top_radius + t * (params.base_radius - params.top_radius);
        let v = 1.0 - t;

        for j in 0..=params.sector_count {
            let sector_angle = j as f32 / sectors * 2.0 * PI;
            let (nz, nx) = sector_angle.sin_cos();

            let pos = [radius * nx, y, radius * nz];
            let u = j as f32 / sectors;

            vertices.push(Vertex::new(pos, [nx, 0.0, nz], [u, v]));

            // Planar cap UV derived from the radial direction
            let cap_uv = [nx / 2.0 + 0.5, nz / 2.0 + 0.5];
            if i == 0 {
                top_circle.push(Vertex::new(pos, [0.0, 1.0, 0.0], cap_uv));
            } else if i == params.stack_count {
                base_circle.push(Vertex::new(pos, [0.0, -1.0, 0.0], cap_uv));
            }
        }
    }

    vertices.extend(top_circle);
    vertices.extend(base_circle);

    vertices.push(Vertex::new([0.0, half_height, 0.0], [0.0, 1.0, 0.0], [0.5, 0.5]));
    vertices.push(Vertex::new([0.0, -half_height, 0.0], [0.0, -1.0, 0.0], [0.5, 0.5]));

    vertices
}

fn push_lateral_indices(params: &CylinderParams, indices: &mut Vec<u32>) {
    let ring_len = params.ring_len();

    for i in 0..params.stack_count {
        let mut k1 = i * ring_len;
        let mut k2 = k1 + ring_len;

        for _ in 0..params.sector_count {
            indices.extend_from_slice(&[k1, k2, k2 + 1]);
            indices.extend_from_slice(&[k2 + 1, k1 + 1, k1]);

            k1 += 1;
            k2 += 1;
        }
    }
}

// Triangle fan from `center` around `sector_count` consecutive ring vertices
fn push_fan(indices: &mut Vec<u32>, center: u32, ring_start: u32, sector_count: u32) {
    for k in ring_start..ring_start + sector_count {
        indices.extend_from_slice(&[center, k, k + 1]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::TextureRegion;
    use glam::Vec3;

    fn unit_cylinder() -> MeshData {
        generate(&CylinderParams::new(1.0, 1.0, 2.0, 1, 4))
    }

    #[test]
    fn counts_match_formula() {
        let params = CylinderParams::new(0.5, 1.5, 3.0, 5, 12);
        let mesh = generate(&params);

        assert_eq!(mesh.vertex_count(), (5 + 1) * 13 + 13 + 13 + 2);
        assert_eq!(mesh.vertex_count() as u32, params.vertex_count());
        assert_eq!(mesh.index_count() as u32, params.index_count());
        assert_eq!(mesh.cuts.lateral_end, 6 * 5 * 12);
    }

    #[test]
    fn unit_cylinder_scenario() {
        let mesh = unit_cylinder();

        assert_eq!(mesh.vertex_count(), 22);
        assert_eq!(mesh.cuts.lateral_end, 24);
        assert_eq!(mesh.cuts.top_cap_end, 36);
        assert_eq!(mesh.cuts.total, 48);
        assert_eq!(mesh.index_count(), 48);
    }

    #[test]
    fn first_quad_winding() {
        let mesh = unit_cylinder();
        // k1 = 0, k2 = 5 for the first quad
        assert_eq!(&mesh.indices[..6], &[0, 5, 6, 6, 1, 0]);
    }

    #[test]
    fn cap_fans_start_at_centres() {
        let mesh = unit_cylinder();

        let top = mesh.region_indices(TextureRegion::TopCap);
        assert_eq!(&top[..3], &[20, 10, 11]);
        assert!(top.chunks(3).all(|tri| tri[0] == 20));

        let base = mesh.region_indices(TextureRegion::BaseCap);
        assert_eq!(&base[..3], &[21, 15, 16]);
        assert_eq!(&base[base.len() - 3..], &[21, 18, 19]);
    }

    #[test]
    fn lateral_uv_follows_ring_and_sector() {
        let mesh = generate(&CylinderParams::new(1.0, 1.0, 2.0, 2, 4));

        assert_eq!(mesh.vertices[0].uv, [0.0, 1.0]);
        assert_eq!(mesh.vertices[4].uv, [1.0, 1.0]);
        // Ring 1, sector 2
        assert_eq!(mesh.vertices[5 + 2].uv, [0.5, 0.5]);
        // Bottom ring
        assert_eq!(mesh.vertices[10].uv, [0.0, 0.0]);
    }

    #[test]
    fn rings_interpolate_radius_top_to_bottom() {
        let mesh = generate(&CylinderParams::new(1.0, 3.0, 4.0, 2, 4));

        // Sector 0 lies on +X so x equals the ring radius
        assert!((mesh.vertices[0].pos[0] - 1.0).abs() < 1e-6);
        assert!((mesh.vertices[5].pos[0] - 2.0).abs() < 1e-6);
        assert!((mesh.vertices[10].pos[0] - 3.0).abs() < 1e-6);

        assert_eq!(mesh.vertices[0].pos[1], 2.0);
        assert_eq!(mesh.vertices[5].pos[1], 0.0);
        assert_eq!(mesh.vertices[10].pos[1], -2.0);
    }

    #[test]
    fn seam_column_duplicates_first_position() {
        let mesh = generate(&CylinderParams::new(1.0, 2.0, 2.0, 3, 8));

        for ring in 0..4 {
            let first = Vec3::from(mesh.vertices[ring * 9].pos);
            let last = Vec3::from(mesh.vertices[ring * 9 + 8].pos);
            assert!((first - last).length() < 1e-5);
        }
    }

    #[test]
    fn top_ring_keeps_radial_normals() {
        let mesh = generate(&CylinderParams::new(0.5, 1.5, 2.0, 3, 8));

        for j in 0..=8 {
            let angle = j as f32 / 8.0 * 2.0 * PI;
            let expected = Vec3::new(angle.cos(), 0.0, angle.sin());
            let n = Vec3::from(mesh.vertices[j].normal);
            assert!((n - expected).length() < 1e-5, "sector {}: {:?}", j, n);
        }
    }

    #[test]
    fn frustum_normals_tilt_towards_narrow_end() {
        // Wider base means the side faces slightly upward
        let mesh = generate(&CylinderParams::new(0.5, 1.5, 2.0, 4, 32));
        let ring_len = 33;

        for k in (2 * ring_len)..(3 * ring_len) {
            let n = Vec3::from(mesh.vertices[k].normal);
            assert!(n.y > 0.1, "vertex {}: {:?}", k, n);
        }
    }
}

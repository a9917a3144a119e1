//! Lateral normal correction for truncated cones.
//!
//! The builder first writes a purely radial normal for every lateral vertex.
//! That normal is only exact for a cylinder; on a frustum the side is tilted,
//! so a second pass replaces it with a face normal taken from the adjacent
//! quad geometry.

use glam::Vec3;

use crate::shapes::Vertex;

/// Overwrite the normal of `b` with the unit normal of triangle `(a, b, c)`
/// anchored at `b`.
///
/// The result is `(a - b) x (c - b)`, i.e. the negated cross product of the
/// edge `b -> c` with the edge `b -> a`. Degenerate triangles leave the
/// existing normal untouched.
pub fn correct_normal(vertices: &mut [Vertex], a: u32, b: u32, c: u32) {
    let pa = Vec3::from(vertices[a as usize].pos);
    let pb = Vec3::from(vertices[b as usize].pos);
    let pc = Vec3::from(vertices[c as usize].pos);

    let ba = pa - pb;
    let bc = pc - pb;

    if let Some(normal) = (-bc.cross(ba)).try_normalize() {
        vertices[b as usize].normal = normal.to_array();
    }
}

/// Second pass over the lateral band.
///
/// Quads are visited ring by ring, sector by sector, the same order the index
/// buffer lists them. Each quad below the first ring corrects two vertices:
/// `k2` from triangle `(k1, k2, k2 + 1)` and then `k1 + 1` from triangle
/// `(k2 + 1, k1 + 1, k1)`. A vertex shared by several quads keeps whichever
/// correction ran last.
///
/// The topmost stack (`i == 0`) is skipped.
pub fn smooth_lateral_normals(vertices: &mut [Vertex], stack_count: u32, sector_count: u32) {
    let ring_len = sector_count + 1;

    for i in 1..stack_count {
        let mut k1 = i * ring_len;
        let mut k2 = k1 + ring_len;

        for _ in 0..sector_count {
            correct_normal(vertices, k1, k2, k2 + 1);
            correct_normal(vertices, k2 + 1, k1 + 1, k1);

            k1 += 1;
            k2 += 1;
        }
    }
}

//! Procedural shape generation
//!
//! Geometry is produced on the CPU into a [`MeshData`] and uploaded to the GPU
//! separately (see [`crate::mesh`]). Nothing in this module touches wgpu.

pub mod cylinder;
pub mod normals;

use bytemuck::{Pod, Zeroable};
use std::ops::Range;

pub use cylinder::CylinderParams;

// Number of f32 values in one interleaved vertex record
pub const FLOATS_PER_VERTEX: usize = 8;

/// Interleaved vertex: position, normal, texture coordinate.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub fn new(pos: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self { pos, normal, uv }
    }

    /// Buffer layout matching `@location(0..=2)` in the shader
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 3] = [
            // Position
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x3,
                offset: 0,
                shader_location: 0,
            },
            // Normal
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x3,
                offset: 3 * 4,
                shader_location: 1,
            },
            // Texture coordinate
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x2,
                offset: 6 * 4,
                shader_location: 2,
            },
        ];

        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// One of the three independently textured surface groups
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureRegion {
    Lateral,
    TopCap,
    BaseCap,
}

impl TextureRegion {
    /// Regions in index-buffer order
    pub const ALL: [TextureRegion; 3] = [
        TextureRegion::Lateral,
        TextureRegion::TopCap,
        TextureRegion::BaseCap,
    ];

    /// Position of the region in [`TextureRegion::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Index-buffer positions where one texture region ends and the next begins.
///
/// `lateral_end` is the first cut point, `top_cap_end` the second; the base cap
/// runs to `total`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegionCuts {
    pub lateral_end: u32,
    pub top_cap_end: u32,
    pub total: u32,
}

impl RegionCuts {
    pub fn range(&self, region: TextureRegion) -> Range<u32> {
        match region {
            TextureRegion::Lateral => 0..self.lateral_end,
            TextureRegion::TopCap => self.lateral_end..self.top_cap_end,
            TextureRegion::BaseCap => self.top_cap_end..self.total,
        }
    }
}

/// Generated geometry, ready for upload
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub cuts: RegionCuts,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Flat view of the interleaved vertex data, 8 floats per vertex
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Indices belonging to a single texture region
    pub fn region_indices(&self, region: TextureRegion) -> &[u32] {
        let range = self.cuts.range(region);
        &self.indices[range.start as usize..range.end as usize]
    }
}

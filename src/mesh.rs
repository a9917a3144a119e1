//! GPU-resident frustum mesh and its two draw paths.

use glam::Mat4;
use std::ops::Range;
use tracing::{debug, warn};
use wgpu::util::DeviceExt;

use crate::material::{Material, MaterialUniform, RegionTextures};
use crate::pipeline::{MaterialShader, Shading, MATERIAL_GROUP, TEXTURE_GROUP, TRANSFORM_GROUP};
use crate::shapes::{cylinder, CylinderParams, MeshData, RegionCuts, TextureRegion, Vertex};
use crate::transform::FrameTransforms;

/// One `draw_indexed` call of a mesh.
///
/// `region` is the texture bound for the call, `None` for flat shading.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrawCall {
    pub region: Option<TextureRegion>,
    pub indices: Range<u32>,
}

/// Draw calls needed to render a mesh with the given cuts.
///
/// Textured shading issues one call per region, in index-buffer order.
/// Flat shading issues a single call over the whole index buffer.
pub fn draw_calls(cuts: &RegionCuts, shading: Shading) -> Vec<DrawCall> {
    match shading {
        Shading::Textured => TextureRegion::ALL
            .iter()
            .map(|&region| DrawCall {
                region: Some(region),
                indices: cuts.range(region),
            })
            .collect(),
        Shading::Flat => vec![DrawCall {
            region: None,
            indices: 0..cuts.total,
        }],
    }
}

/// Frustum mesh uploaded once at construction.
///
/// Owns its vertex, index and material buffers plus one texture bind group
/// per region. Everything is released when the mesh is dropped; the textures
/// the bind groups were built from remain owned by the caller.
pub struct CylinderMesh {
    params: CylinderParams,
    material: Material,
    data: MeshData,
    vertex_buf: wgpu::Buffer,
    index_buf: wgpu::Buffer,
    _material_buf: wgpu::Buffer,
    material_bind_group: wgpu::BindGroup,
    region_bind_groups: [wgpu::BindGroup; 3],
}

impl CylinderMesh {
    pub fn new(
        device: &wgpu::Device,
        shader: &MaterialShader,
        params: CylinderParams,
        material: Material,
        textures: RegionTextures<'_>,
    ) -> Self {
        let data = cylinder::generate(&params);

        // Create the vertex and index buffers
        let vertex_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        // Create the material uniform, never rewritten afterwards
        let uniform = MaterialUniform::new(&material);
        let material_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Material Uniform Buffer"),
            contents: bytemuck::bytes_of(&uniform),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        // Create bind group
        let material_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &shader.material_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: material_buf.as_entire_binding(),
            }],
            label: Some("Material Bind Group"),
        });

        // Create one texture bind group per region
        let region_bind_groups = TextureRegion::ALL.map(|region| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                layout: &shader.texture_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(textures.get(region)),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&shader.sampler),
                    },
                ],
                label: Some("Region Texture Bind Group"),
            })
        });

        debug!(
            vertex_bytes = data.vertices.len() * std::mem::size_of::<Vertex>(),
            index_bytes = data.indices.len() * std::mem::size_of::<u32>(),
            "uploaded frustum mesh"
        );

        CylinderMesh {
            params,
            material,
            data,
            vertex_buf,
            index_buf,
            _material_buf: material_buf,
            material_bind_group,
            region_bind_groups,
        }
    }

    pub fn params(&self) -> &CylinderParams {
        &self.params
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    /// CPU copy of the uploaded geometry
    pub fn data(&self) -> &MeshData {
        &self.data
    }

    pub fn cuts(&self) -> RegionCuts {
        self.data.cuts
    }

    pub fn vertex_count(&self) -> usize {
        self.data.vertex_count()
    }

    pub fn index_count(&self) -> usize {
        self.data.index_count()
    }

    pub fn index_range(&self, region: TextureRegion) -> Range<u32> {
        self.data.cuts.range(region)
    }

    /// Draw each texture region with its own texture bound at group 3.
    ///
    /// `camera` must already be bound at group 0. `model` goes into the next
    /// free slot of `transforms`, so the mesh may be drawn again in the same
    /// pass with another transform.
    pub fn draw_textured<'a>(
        &'a self,
        rpass: &mut wgpu::RenderPass<'a>,
        queue: &wgpu::Queue,
        shader: &'a MaterialShader,
        transforms: &mut FrameTransforms<'a>,
        model: Mat4,
    ) {
        self.draw(rpass, queue, shader, transforms, Shading::Textured, model);
    }

    /// Draw the whole index buffer with the material's colour scalars.
    pub fn draw_flat<'a>(
        &'a self,
        rpass: &mut wgpu::RenderPass<'a>,
        queue: &wgpu::Queue,
        shader: &'a MaterialShader,
        transforms: &mut FrameTransforms<'a>,
        model: Mat4,
    ) {
        self.draw(rpass, queue, shader, transforms, Shading::Flat, model);
    }

    fn draw<'a>(
        &'a self,
        rpass: &mut wgpu::RenderPass<'a>,
        queue: &wgpu::Queue,
        shader: &'a MaterialShader,
        transforms: &mut FrameTransforms<'a>,
        shading: Shading,
        model: Mat4,
    ) {
        let offset = match transforms.push(queue, model) {
            Some(offset) => offset,
            None => {
                warn!(used = transforms.used(), "transform ring full, skipping draw");
                return;
            }
        };

        // Set pipeline and the per-draw / per-mesh bind groups
        rpass.set_pipeline(shader.pipeline(shading));
        rpass.set_bind_group(TRANSFORM_GROUP, transforms.bind_group(), &[offset]);
        rpass.set_bind_group(MATERIAL_GROUP, &self.material_bind_group, &[]);
        rpass.set_index_buffer(self.index_buf.slice(..), wgpu::IndexFormat::Uint32);
        rpass.set_vertex_buffer(0, self.vertex_buf.slice(..));

        for call in draw_calls(&self.data.cuts, shading) {
            if let Some(region) = call.region {
                rpass.set_bind_group(TEXTURE_GROUP, &self.region_bind_groups[region.index()], &[]);
            }
            rpass.draw_indexed(call.indices, 0, 0..1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cuts() -> RegionCuts {
        // 3 stacks, 2 sectors
        RegionCuts {
            lateral_end: 36,
            top_cap_end: 42,
            total: 48,
        }
    }

    #[test]
    fn textured_draws_each_region_in_order() {
        let cuts = cuts();
        let calls = draw_calls(&cuts, Shading::Textured);

        assert_eq!(calls.len(), 3);
        for (call, region) in calls.iter().zip(TextureRegion::ALL) {
            assert_eq!(call.region, Some(region));
            assert_eq!(call.indices, cuts.range(region));
        }
        assert_eq!(calls[0].indices, 0..36);
        assert_eq!(calls[1].indices, 36..42);
        assert_eq!(calls[2].indices, 42..48);
    }

    #[test]
    fn textured_calls_cover_whole_buffer_without_overlap() {
        let calls = draw_calls(&cuts(), Shading::Textured);

        assert_eq!(calls[0].indices.start, 0);
        for pair in calls.windows(2) {
            assert_eq!(pair[0].indices.end, pair[1].indices.start);
        }
        assert_eq!(calls[2].indices.end, 48);
    }

    #[test]
    fn flat_draws_whole_buffer_once() {
        let calls = draw_calls(&cuts(), Shading::Flat);

        assert_eq!(
            calls,
            vec![DrawCall {
                region: None,
                indices: 0..48,
            }]
        );
    }

    #[test]
    fn region_index_matches_bind_group_order() {
        for (i, region) in TextureRegion::ALL.iter().enumerate() {
            assert_eq!(region.index(), i);
        }
    }
}

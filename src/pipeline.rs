//! Render pipelines and bind group layouts shared by every frustum mesh.
//!
//! Bind group slots:
//! - group 0: [`CameraUniform`], owned by the frame loop
//! - group 1: [`crate::transform::TransformUniform`], one dynamic-offset slot per draw
//! - group 2: [`crate::material::MaterialUniform`], owned by each mesh
//! - group 3: region texture + sampler (textured shading only)

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use std::borrow::Cow;
use std::mem;

use crate::material::MaterialUniform;
use crate::shapes::Vertex;
use crate::transform::TransformUniform;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

pub const CAMERA_GROUP: u32 = 0;
pub const TRANSFORM_GROUP: u32 = 1;
pub const MATERIAL_GROUP: u32 = 2;
// Fixed slot of the per-region texture
pub const TEXTURE_GROUP: u32 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shading {
    Textured,
    Flat,
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub eye: [f32; 4],
    pub light_pos: [f32; 4],
}

impl CameraUniform {
    pub fn new(view_proj: Mat4, eye: Vec3, light_pos: Vec3) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            eye: eye.extend(1.0).to_array(),
            light_pos: light_pos.extend(1.0).to_array(),
        }
    }
}

pub struct MaterialShader {
    pub camera_layout: wgpu::BindGroupLayout,
    pub transform_layout: wgpu::BindGroupLayout,
    pub material_layout: wgpu::BindGroupLayout,
    pub texture_layout: wgpu::BindGroupLayout,
    pub sampler: wgpu::Sampler,
    textured: wgpu::RenderPipeline,
    flat: wgpu::RenderPipeline,
}

impl MaterialShader {
    pub fn new(device: &wgpu::Device, color_format: wgpu::TextureFormat) -> Self {
        // Create uniform layouts: camera, per-draw transform, per-mesh material
        let camera_layout = uniform_layout(
            device,
            "Camera Layout",
            wgpu::ShaderStages::VERTEX_FRAGMENT,
            mem::size_of::<CameraUniform>() as u64,
            false,
        );
        let transform_layout = uniform_layout(
            device,
            "Transform Layout",
            wgpu::ShaderStages::VERTEX,
            mem::size_of::<TransformUniform>() as u64,
            true,
        );
        let material_layout = uniform_layout(
            device,
            "Material Layout",
            wgpu::ShaderStages::FRAGMENT,
            mem::size_of::<MaterialUniform>() as u64,
            false,
        );

        // Create texture layout, one texture + sampler bound per region
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Region Texture Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        // Sampler shared by all region textures
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Region Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        // Create shader module
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Frustum Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("shader.wgsl"))),
        });

        // Create pipeline layouts, flat shading never binds a texture
        let textured_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Textured Pipeline Layout"),
            bind_group_layouts: &[
                &camera_layout,
                &transform_layout,
                &material_layout,
                &texture_layout,
            ],
            push_constant_ranges: &[],
        });
        let flat_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Flat Pipeline Layout"),
            bind_group_layouts: &[&camera_layout, &transform_layout, &material_layout],
            push_constant_ranges: &[],
        });

        // Create both pipelines from the same shader module
        let textured = create_pipeline(device, &textured_layout, &shader, "fs_textured", color_format);
        let flat = create_pipeline(device, &flat_layout, &shader, "fs_flat", color_format);

        MaterialShader {
            camera_layout,
            transform_layout,
            material_layout,
            texture_layout,
            sampler,
            textured,
            flat,
        }
    }

    pub fn pipeline(&self, shading: Shading) -> &wgpu::RenderPipeline {
        match shading {
            Shading::Textured => &self.textured,
            Shading::Flat => &self.flat,
        }
    }
}

fn uniform_layout(
    device: &wgpu::Device,
    label: &str,
    visibility: wgpu::ShaderStages,
    size: u64,
    has_dynamic_offset: bool,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset,
                min_binding_size: wgpu::BufferSize::new(size),
            },
            count: None,
        }],
    })
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    fs_entry: &str,
    color_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(fs_entry),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: "vs_main",
            buffers: &[Vertex::layout()],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: fs_entry,
            targets: &[Some(color_format.into())],
        }),
        primitive: wgpu::PrimitiveState {
            // The base cap fan winds opposite to the rest of the surface
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
    })
}

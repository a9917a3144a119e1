use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use serde::Deserialize;

use crate::shapes::TextureRegion;

/// Phong material scalars used by flat shading.
///
/// Textured shading only reads `shininess`; colours come from the region
/// textures instead.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Material {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: Vec3::new(0.2, 0.12, 0.05),
            diffuse: Vec3::new(0.8, 0.5, 0.2),
            specular: Vec3::splat(0.5),
            shininess: 32.0,
        }
    }
}

impl Material {
    pub fn new(ambient: Vec3, diffuse: Vec3, specular: Vec3, shininess: f32) -> Self {
        Self {
            ambient,
            diffuse,
            specular,
            shininess,
        }
    }
}

/// Material uniform block, written once when the mesh is created.
///
/// vec3 colours are padded to vec4 to match WGSL uniform alignment.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug)]
pub struct MaterialUniform {
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub shininess: f32,
    _pad: [f32; 3],
}

impl MaterialUniform {
    pub fn new(material: &Material) -> Self {
        Self {
            ambient: material.ambient.extend(1.0).to_array(),
            diffuse: material.diffuse.extend(1.0).to_array(),
            specular: material.specular.extend(1.0).to_array(),
            shininess: material.shininess,
            _pad: [0.0; 3],
        }
    }
}

/// Three texture views, one per surface region.
///
/// The textures themselves stay owned by the caller.
#[derive(Clone, Copy, Debug)]
pub struct RegionTextures<'a> {
    pub lateral: &'a wgpu::TextureView,
    pub top_cap: &'a wgpu::TextureView,
    pub base_cap: &'a wgpu::TextureView,
}

impl<'a> RegionTextures<'a> {
    pub fn get(&self, region: TextureRegion) -> &'a wgpu::TextureView {
        match region {
            TextureRegion::Lateral => self.lateral,
            TextureRegion::TopCap => self.top_cap,
            TextureRegion::BaseCap => self.base_cap,
        }
    }
}

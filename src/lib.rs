//! Procedural truncated cone / cylinder meshes for wgpu.
//!
//! [`shapes`] builds the geometry on the CPU; [`mesh::CylinderMesh`] uploads
//! it once and draws it either flat-shaded from material scalars or with one
//! texture per surface region (side, top cap, base cap).

pub mod config;
pub mod error;
pub mod material;
pub mod mesh;
pub mod pipeline;
pub mod shapes;
pub mod texture;
pub mod transform;

pub use config::SceneConfig;
pub use error::{Error, Result};
pub use material::{Material, RegionTextures};
pub use mesh::{draw_calls, CylinderMesh, DrawCall};
pub use pipeline::{CameraUniform, MaterialShader, Shading};
pub use shapes::{CylinderParams, MeshData, RegionCuts, TextureRegion, Vertex};
pub use transform::{FrameTransforms, TransformRing};

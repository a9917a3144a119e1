//! Region textures for the textured shading path.

use image::{Rgba, RgbaImage};
use std::num::NonZeroU32;
use std::path::Path;
use tracing::debug;

use crate::error::Result;

/// A sampled 2D texture and its default view.
pub struct RegionTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl RegionTexture {
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &RgbaImage,
        label: &str,
    ) -> Self {
        let (width, height) = image.dimensions();
        let extent = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        });

        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.as_raw(),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: NonZeroU32::new(4 * width),
                rows_per_image: NonZeroU32::new(height),
            },
            extent,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        RegionTexture { texture, view }
    }

    pub fn from_path(device: &wgpu::Device, queue: &wgpu::Queue, path: &Path) -> Result<Self> {
        let image = image::open(path)?.to_rgba8();
        debug!(path = %path.display(), width = image.width(), height = image.height(), "loaded texture");

        let label = path.to_string_lossy();
        Ok(Self::from_image(device, queue, &image, &label))
    }

    pub fn checkerboard(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        a: [u8; 4],
        b: [u8; 4],
        label: &str,
    ) -> Self {
        Self::from_image(device, queue, &checkerboard_image(64, 8, a, b), label)
    }
}

/// Square two-colour checkerboard with `cells` cells per side
pub fn checkerboard_image(size: u32, cells: u32, a: [u8; 4], b: [u8; 4]) -> RgbaImage {
    let cell = (size / cells.max(1)).max(1);
    RgbaImage::from_fn(size, size, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            Rgba(a)
        } else {
            Rgba(b)
        }
    })
}

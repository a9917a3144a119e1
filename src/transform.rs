//! Per-draw world transforms.
//!
//! Every draw call gets its own slot in one uniform buffer, aligned to the
//! device's uniform offset alignment, and binds it with a dynamic offset, so
//! the same mesh can be drawn several times in one render pass with
//! different transforms.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use std::mem;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug)]
pub struct TransformUniform {
    pub model: [[f32; 4]; 4],
}

impl TransformUniform {
    pub fn new(model: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
        }
    }
}

/// Round `size` up to a multiple of `alignment`
pub fn aligned_stride(size: u64, alignment: u64) -> u64 {
    let alignment = alignment.max(1);
    (size + alignment - 1) / alignment * alignment
}

/// Hands out slot offsets until the ring is full
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotCursor {
    next: u32,
    capacity: u32,
    stride: u64,
}

impl SlotCursor {
    pub fn new(capacity: u32, stride: u64) -> Self {
        Self {
            next: 0,
            capacity,
            stride,
        }
    }

    /// Byte offset of the next free slot, `None` once every slot is taken
    pub fn advance(&mut self) -> Option<u32> {
        if self.next >= self.capacity {
            return None;
        }
        let offset = self.next as u64 * self.stride;
        self.next += 1;
        Some(offset as u32)
    }

    pub fn used(&self) -> u32 {
        self.next
    }
}

/// Uniform ring of model matrices, owned by the frame loop.
pub struct TransformRing {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    capacity: u32,
    stride: u64,
}

impl TransformRing {
    /// `capacity` is the number of draws one frame may issue
    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, capacity: u32) -> Self {
        let size = mem::size_of::<TransformUniform>() as u64;
        let stride = aligned_stride(
            size,
            device.limits().min_uniform_buffer_offset_alignment as u64,
        );

        // One slot per draw, written through the queue before submission
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Transform Ring Buffer"),
            size: stride * capacity.max(1) as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // The binding covers a single slot, the dynamic offset picks which one
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(size),
                }),
            }],
            label: Some("Transform Ring Bind Group"),
        });

        TransformRing {
            buffer,
            bind_group,
            capacity,
            stride,
        }
    }

    /// Start handing out slots for a new frame
    pub fn frame(&self) -> FrameTransforms<'_> {
        FrameTransforms {
            ring: self,
            cursor: SlotCursor::new(self.capacity, self.stride),
        }
    }
}

/// Slots used by the draws of one frame.
pub struct FrameTransforms<'r> {
    ring: &'r TransformRing,
    cursor: SlotCursor,
}

impl<'r> FrameTransforms<'r> {
    /// Write `model` into the next free slot and return its dynamic offset
    pub fn push(&mut self, queue: &wgpu::Queue, model: Mat4) -> Option<u32> {
        let offset = self.cursor.advance()?;
        let uniform = TransformUniform::new(model);
        queue.write_buffer(&self.ring.buffer, offset as u64, bytemuck::bytes_of(&uniform));
        Some(offset)
    }

    pub fn bind_group(&self) -> &'r wgpu::BindGroup {
        &self.ring.bind_group
    }

    pub fn used(&self) -> u32 {
        self.cursor.used()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_rounds_up_to_alignment() {
        assert_eq!(aligned_stride(64, 256), 256);
        assert_eq!(aligned_stride(256, 256), 256);
        assert_eq!(aligned_stride(257, 256), 512);
        assert_eq!(aligned_stride(64, 0), 64);
    }

    #[test]
    fn consecutive_draws_get_distinct_slots() {
        let mut cursor = SlotCursor::new(4, 256);

        assert_eq!(cursor.advance(), Some(0));
        assert_eq!(cursor.advance(), Some(256));
        assert_eq!(cursor.advance(), Some(512));
        assert_eq!(cursor.used(), 3);
    }

    #[test]
    fn full_ring_refuses_more_slots() {
        let mut cursor = SlotCursor::new(2, 256);

        assert!(cursor.advance().is_some());
        assert!(cursor.advance().is_some());
        assert_eq!(cursor.advance(), None);
        assert_eq!(cursor.used(), 2);
    }

    #[test]
    fn uniform_holds_one_matrix() {
        assert_eq!(mem::size_of::<TransformUniform>(), 64);

        let model = Mat4::from_translation(glam::Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(TransformUniform::new(model).model[3], [1.0, 2.0, 3.0, 1.0]);
    }
}

//! Vertex data structures and layouts for voxel rendering.
//!
//! This module defines the vertex format emitted by the chunk mesher and the
//! matching `wgpu` buffer layout, so a GPU backend can upload meshes as-is.

use cgmath::Point3;

use crate::engine_state::voxels::block::block_side::BlockSide;

/// A vertex of a chunk mesh.
///
/// Positions are in world space. Texture coordinates count whole blocks, so a
/// merged quad repeats its texture once per block with a repeating sampler.
///
/// # Memory Layout
/// - Position: [f32; 3] (12 bytes)
/// - Texture Coordinates: [f32; 2] (8 bytes)
/// - Texture Index: u32 (4 bytes)
/// - Side: u32 (4 bytes)
///
/// Total size: 28 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Position in world space
    pub position: [f32; 3],
    /// Texture coordinates, in blocks
    pub tex_coords: [f32; 2],
    /// Index of the texture in the texture array
    pub texture_index: u32,
    /// `BlockSide` of the face, for per-face shading
    pub side: u32,
}

impl Vertex {
    /// Creates a new vertex.
    ///
    /// # Arguments
    /// * `position` - World-space position
    /// * `tex_coords` - Texture coordinates, in blocks
    /// * `texture_index` - Index of the texture in the texture array
    /// * `side` - The face this vertex belongs to
    pub fn new(position: Point3<f32>, tex_coords: [f32; 2], texture_index: usize, side: BlockSide) -> Self {
        Vertex {
            position: position.into(),
            tex_coords,
            texture_index: texture_index as u32,
            side: side as u32,
        }
    }

    /// Returns the vertex buffer layout description for the shader pipeline.
    ///
    /// # Shader Attributes
    /// - `location = 0`: position (vec3<f32>)
    /// - `location = 1`: tex_coords (vec2<f32>)
    /// - `location = 2`: texture_index (u32)
    /// - `location = 3`: side (u32)
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 4] =
            wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2, 2 => Uint32, 3 => Uint32];

        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

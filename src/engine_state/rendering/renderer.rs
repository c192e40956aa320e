//! Renderer adapter for the voxel engine.
//!
//! The engine never talks to a graphics API directly. It hands draw work to a
//! `DrawSink`, either one call per visible block or one call per chunk mesh.
//! A GPU backend uploads `Mesh` sides as vertex and index buffers (see
//! `Vertex::desc`); the headless driver only counts what it is given.
//!
//! # Draw Paths
//!
//! - Per block: every block that passes `is_block_visible` is drawn as a cube
//!   with its material lookup. Simple, but one draw per block.
//! - Per chunk: greedy meshes are built by the `MeshManager` and handed over
//!   with the sides that can face the viewer. This is the path for large grids.

use cgmath::Point3;

use crate::engine_state::voxels::{
    block::{block_side::BlockSide, block_type::BlockType},
    chunk::chunk_iteration::ChunkBlockIterator,
    grid::{BlockGrid, BlockStorage},
};

use super::{
    culling::{is_block_visible, CullingPolicy},
    meshing::Mesh,
};

/// Receiver of draw work.
pub trait DrawSink {
    /// Draws one unit cube centred on `position`.
    ///
    /// `texture_indices` follows `BlockSide` order.
    fn draw_block(&mut self, position: Point3<i32>, block_type: BlockType, texture_indices: [usize; 6]);

    /// Draws the given sides of a chunk mesh.
    fn draw_chunk(&mut self, mesh: &Mesh, sides: &[BlockSide]);
}

/// Issues one `draw_block` per visible block of the given chunks.
///
/// # Returns
/// The number of blocks drawn.
pub fn draw_blocks<S, D, I>(grid: &BlockGrid<S>, chunks: I, policy: CullingPolicy, sink: &mut D) -> usize
where
    S: BlockStorage,
    D: DrawSink + ?Sized,
    I: IntoIterator<Item = Point3<i32>>,
{
    let mut drawn = 0;
    for chunk in chunks {
        for (position, block) in ChunkBlockIterator::new(grid, chunk) {
            if !is_block_visible(grid, position.x, position.y, position.z, policy) {
                continue;
            }
            let block_type = block.block_type();
            sink.draw_block(position, block_type, block_type.texture_indices());
            drawn += 1;
        }
    }
    drawn
}

/// Issues one `draw_block` per visible block in the whole grid.
pub fn draw_all_blocks<S, D>(grid: &BlockGrid<S>, policy: CullingPolicy, sink: &mut D) -> usize
where
    S: BlockStorage,
    D: DrawSink + ?Sized,
{
    let chunks = grid
        .chunk_table()
        .iter()
        .filter(|chunk| chunk.active)
        .map(|chunk| chunk.position);
    draw_blocks(grid, chunks, policy, sink)
}

/// A sink that only counts what it is asked to draw.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrawStats {
    /// Blocks drawn through the per-block path
    pub blocks: u64,
    /// Chunk meshes drawn
    pub chunks: u64,
    /// Quads submitted across all chunk meshes
    pub quads: u64,
    /// Indices submitted across all chunk meshes
    pub indices: u64,
}

impl DrawSink for DrawStats {
    fn draw_block(&mut self, _position: Point3<i32>, _block_type: BlockType, _texture_indices: [usize; 6]) {
        self.blocks += 1;
    }

    fn draw_chunk(&mut self, mesh: &Mesh, sides: &[BlockSide]) {
        self.chunks += 1;
        for &side in sides {
            let mesh_side = mesh.side(side);
            self.quads += mesh_side.face_count() as u64;
            self.indices += mesh_side.indices.len() as u64;
        }
    }
}

//! # Chunk Iteration Module
//!
//! This module provides an iterator over the non-air blocks of one chunk of a
//! `BlockGrid`. Chunks at the far edges of the grid may be partial; the
//! iterator clips its walk to the grid bounds.

use cgmath::Point3;

use crate::engine_state::voxels::{
    block::Block,
    grid::{BlockGrid, BlockStorage},
};

use super::{chunk_origin, CHUNK_DIMENSION};

/// An iterator over all non-air blocks in a chunk, in x, then z, then y order.
///
/// Skips the scan entirely when the chunk table reports the chunk as empty.
pub struct ChunkBlockIterator<'a, S: BlockStorage> {
    /// Reference to the grid being iterated over
    grid: &'a BlockGrid<S>,
    /// Block coordinate of the chunk's minimum corner
    origin: Point3<i32>,
    /// Exclusive upper bound of the walk, clipped to the grid
    end: Point3<i32>,
    /// Current X position within the chunk
    local_x: i32,
    /// Current Y position within the chunk
    local_y: i32,
    /// Current Z position within the chunk
    local_z: i32,
}

impl<'a, S: BlockStorage> ChunkBlockIterator<'a, S> {
    /// Creates a new `ChunkBlockIterator` for the chunk at `chunk_position`.
    ///
    /// # Arguments
    /// * `grid` - The grid holding the block data
    /// * `chunk_position` - Chunk coordinates of the chunk to walk
    pub fn new(grid: &'a BlockGrid<S>, chunk_position: Point3<i32>) -> Self {
        let origin = chunk_origin(chunk_position);
        let [width, height, depth] = grid.dimensions();
        let end = Point3::new(
            (origin.x + CHUNK_DIMENSION).min(width) - origin.x,
            (origin.y + CHUNK_DIMENSION).min(height) - origin.y,
            (origin.z + CHUNK_DIMENSION).min(depth) - origin.z,
        );

        let empty = !grid.is_chunk_active(chunk_position) || end.x <= 0 || end.y <= 0 || end.z <= 0;

        ChunkBlockIterator {
            grid,
            origin,
            end,
            local_x: 0,
            local_y: if empty { end.y.max(0) } else { 0 },
            local_z: 0,
        }
    }

    /// Gets the next non-air block in the chunk along with its world position.
    ///
    /// # Returns
    /// - `Some((position, block))` if another non-air block is found
    /// - `None` if there are no more blocks to iterate over
    pub fn get_next_block(&mut self) -> Option<(Point3<i32>, Block)> {
        while self.local_y < self.end.y {
            let position = Point3::new(
                self.origin.x + self.local_x,
                self.origin.y + self.local_y,
                self.origin.z + self.local_z,
            );

            self.local_x += 1;
            if self.local_x == self.end.x {
                self.local_x = 0;
                self.local_z += 1;
                if self.local_z == self.end.z {
                    self.local_z = 0;
                    self.local_y += 1;
                }
            }

            let block = self.grid.get(position.x, position.y, position.z);
            if block.is_active() {
                return Some((position, block));
            }
        }
        None
    }
}

impl<S: BlockStorage> Iterator for ChunkBlockIterator<'_, S> {
    type Item = (Point3<i32>, Block);

    fn next(&mut self) -> Option<Self::Item> {
        self.get_next_block()
    }
}

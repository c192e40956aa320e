//! # Chunk Module
//!
//! Chunks are 16x16x16 partitions of the block grid. They own no block data:
//! the grid stays the single source of truth and a chunk is only the unit at
//! which meshes are built, cached and invalidated.
//!
//! ## Bookkeeping
//!
//! The `ChunkTable` keeps two pieces of state per chunk:
//! - a solid-block counter, from which the `active` flag is derived
//! - a bit in the `dirty` bit vector, set whenever a block inside the chunk (or
//!   on the face it shares with a neighbour) changes
//!
//! Both are updated by `BlockGrid::set`, so callers never touch them directly.

use bitvec::prelude::BitVec;
use cgmath::Point3;

use crate::error::WorldError;

pub mod chunk_iteration;

/// The dimension (width, height, depth) of a chunk in blocks.
pub const CHUNK_DIMENSION: i32 = 16;
/// The number of blocks in a single 2D plane of a chunk (CHUNK_DIMENSION²).
pub const CHUNK_PLANE_SIZE: i32 = CHUNK_DIMENSION * CHUNK_DIMENSION;
/// The total number of blocks in a chunk (CHUNK_DIMENSION³).
pub const CHUNK_SIZE: i32 = CHUNK_PLANE_SIZE * CHUNK_DIMENSION;

/// Snapshot of a chunk's flags.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    /// The position of this chunk in chunk coordinates (not block coordinates).
    pub position: Point3<i32>,
    /// Whether any block inside the chunk is non-air.
    pub active: bool,
    /// Whether the chunk's mesh is stale.
    pub dirty: bool,
}

impl Chunk {
    /// The block coordinate of this chunk's minimum corner.
    pub fn origin(&self) -> Point3<i32> {
        chunk_origin(self.position)
    }
}

/// Returns the chunk that owns the block at `(x, y, z)`.
pub fn chunk_position_of(x: i32, y: i32, z: i32) -> Point3<i32> {
    Point3::new(
        x.div_euclid(CHUNK_DIMENSION),
        y.div_euclid(CHUNK_DIMENSION),
        z.div_euclid(CHUNK_DIMENSION),
    )
}

/// Returns the block coordinate of a chunk's minimum corner.
pub fn chunk_origin(position: Point3<i32>) -> Point3<i32> {
    Point3::new(
        position.x * CHUNK_DIMENSION,
        position.y * CHUNK_DIMENSION,
        position.z * CHUNK_DIMENSION,
    )
}

/// Per-chunk flags for a bounded grid.
///
/// Chunks along the far edges may be partial when a grid dimension is not a
/// multiple of `CHUNK_DIMENSION`; they are still tracked as whole chunks.
#[derive(Debug, Clone)]
pub struct ChunkTable {
    /// Number of chunks along x, y and z.
    dimensions: [i32; 3],
    /// Count of non-air blocks per chunk.
    solid_counts: Vec<u32>,
    /// One bit per chunk, set while the chunk's mesh is stale.
    dirty: BitVec,
}

impl ChunkTable {
    /// Creates the table for a grid of `width × height × depth` blocks.
    /// Every chunk starts empty and clean.
    ///
    /// # Errors
    /// `WorldError::DimensionOverflow` if the chunk count overflows, or
    /// `WorldError::ChunkAllocation` if the allocator refuses the table.
    pub fn new(width: i32, height: i32, depth: i32) -> Result<Self, WorldError> {
        let chunks_along = |blocks: i32| if blocks > 0 { (blocks - 1) / CHUNK_DIMENSION + 1 } else { 0 };
        let dimensions = [chunks_along(width), chunks_along(height), chunks_along(depth)];
        let overflow = || WorldError::DimensionOverflow {
            width: width.max(0) as u32,
            height: height.max(0) as u32,
            depth: depth.max(0) as u32,
        };
        let count = dimensions
            .iter()
            .try_fold(1usize, |count, &d| count.checked_mul(d as usize))
            .ok_or_else(overflow)?;

        let mut solid_counts = Vec::new();
        solid_counts
            .try_reserve_exact(count)
            .map_err(|source| WorldError::ChunkAllocation { chunks: count, source })?;
        solid_counts.resize(count, 0);

        let mut words: Vec<usize> = Vec::new();
        words
            .try_reserve_exact(count.div_ceil(usize::BITS as usize))
            .map_err(|source| WorldError::ChunkAllocation { chunks: count, source })?;
        words.resize(count.div_ceil(usize::BITS as usize), 0);
        let mut dirty = BitVec::from_vec(words);
        dirty.truncate(count);

        Ok(ChunkTable {
            dimensions,
            solid_counts,
            dirty,
        })
    }

    /// Number of chunks along each axis.
    pub fn dimensions(&self) -> [i32; 3] {
        self.dimensions
    }

    /// Total number of chunks.
    pub fn len(&self) -> usize {
        self.solid_counts.len()
    }

    /// Whether the table tracks no chunks at all.
    pub fn is_empty(&self) -> bool {
        self.solid_counts.is_empty()
    }

    fn index(&self, position: Point3<i32>) -> Option<usize> {
        let [cx, cy, cz] = self.dimensions;
        if position.x < 0
            || position.y < 0
            || position.z < 0
            || position.x >= cx
            || position.y >= cy
            || position.z >= cz
        {
            return None;
        }
        let (cx, cz) = (cx as usize, cz as usize);
        Some(position.x as usize + cx * (position.z as usize + cz * position.y as usize))
    }

    fn position(&self, index: usize) -> Point3<i32> {
        let [cx, _, cz] = self.dimensions.map(|d| d as usize);
        Point3::new(
            (index % cx) as i32,
            (index / (cx * cz)) as i32,
            ((index / cx) % cz) as i32,
        )
    }

    /// Returns the flags of the chunk at `position`, or `None` outside the grid.
    pub fn chunk_at(&self, position: Point3<i32>) -> Option<Chunk> {
        self.index(position).map(|index| Chunk {
            position,
            active: self.solid_counts[index] > 0,
            dirty: self.dirty[index],
        })
    }

    /// Whether the chunk at `position` contains any non-air block.
    pub fn is_active(&self, position: Point3<i32>) -> bool {
        self.index(position)
            .map(|index| self.solid_counts[index] > 0)
            .unwrap_or(false)
    }

    /// Whether the chunk at `position` needs its mesh rebuilt.
    pub fn is_dirty(&self, position: Point3<i32>) -> bool {
        self.index(position)
            .map(|index| self.dirty[index])
            .unwrap_or(false)
    }

    /// Flags the chunk at `position` as stale. Positions outside the grid are ignored.
    pub fn mark_dirty(&mut self, position: Point3<i32>) {
        if let Some(index) = self.index(position) {
            self.dirty.set(index, true);
        }
    }

    /// Flags every chunk as stale.
    pub fn mark_all_dirty(&mut self) {
        self.dirty.fill(true);
    }

    /// Updates the solid counter of the chunk owning a written block.
    pub fn record_write(&mut self, position: Point3<i32>, was_active: bool, is_active: bool) {
        let Some(index) = self.index(position) else {
            return;
        };
        match (was_active, is_active) {
            (false, true) => self.solid_counts[index] += 1,
            (true, false) => {
                self.solid_counts[index] = self.solid_counts[index].saturating_sub(1)
            }
            _ => {}
        }
    }

    /// Resets every chunk to empty and stale.
    pub fn reset(&mut self) {
        self.solid_counts.iter_mut().for_each(|count| *count = 0);
        self.dirty.fill(true);
    }

    /// Returns the positions of every stale chunk and clears their flags.
    pub fn take_dirty(&mut self) -> Vec<Point3<i32>> {
        let positions = self
            .dirty
            .iter_ones()
            .map(|index| self.position(index))
            .collect();
        self.dirty.fill(false);
        positions
    }

    /// Iterates over the flags of every chunk.
    pub fn iter(&self) -> impl Iterator<Item = Chunk> + '_ {
        (0..self.len()).map(move |index| Chunk {
            position: self.position(index),
            active: self.solid_counts[index] > 0,
            dirty: self.dirty[index],
        })
    }
}

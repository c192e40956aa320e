//! # Block Grid
//!
//! The `BlockGrid` is the single owner of all voxel data in a world. It maps
//! integer coordinates in `[0, W) × [0, H) × [0, D)` to a `Block` and keeps the
//! chunk bookkeeping (`ChunkTable`) in step with every write.
//!
//! ## Storage
//!
//! Cells are held behind the `BlockStorage` trait so the backing store can be
//! swapped without touching callers:
//! - `DenseStorage`: one byte per cell in a single heap allocation. A
//!   1024×256×1024 world is ~268 MB and is allocated fallibly.
//! - `SparseStorage`: a hash map from chunk position to a lazily allocated
//!   16³ array. Chunks that are entirely air hold no memory.
//!
//! ## Bounds
//!
//! Out-of-range reads return `Block::AIR` and out-of-range writes are ignored.
//! Hot paths (culling, collision, meshing) rely on this instead of checking
//! bounds at every call site.

use std::collections::HashMap;

use cgmath::Point3;
use log::debug;

use super::{
    block::{block_type::BlockType, Block, BlockTypeSize},
    chunk::{chunk_position_of, ChunkTable, CHUNK_DIMENSION, CHUNK_SIZE},
};
use crate::{config::StorageKind, error::WorldError};

/// Raw cell storage behind a `BlockGrid`.
///
/// Implementations only ever see in-bounds coordinates; bounds checking and
/// chunk bookkeeping are done by the grid.
pub trait BlockStorage {
    /// Reads the stored id at an in-bounds coordinate.
    fn get_raw(&self, x: i32, y: i32, z: i32) -> BlockTypeSize;

    /// Writes the stored id at an in-bounds coordinate.
    fn set_raw(&mut self, x: i32, y: i32, z: i32, value: BlockTypeSize);

    /// Resets every cell to air.
    fn clear(&mut self);
}

/// Dense storage: one contiguous `Vec` of ids, x fastest, then z, then y.
pub struct DenseStorage {
    cells: Vec<BlockTypeSize>,
    width: usize,
    depth: usize,
}

impl DenseStorage {
    /// Allocates an all-air store for `width × height × depth` cells.
    ///
    /// # Errors
    /// `WorldError::DimensionOverflow` if the cell count overflows, or
    /// `WorldError::Allocation` if the allocator refuses the request.
    pub fn allocate(width: u32, height: u32, depth: u32) -> Result<Self, WorldError> {
        let cells = (width as usize)
            .checked_mul(height as usize)
            .and_then(|cells| cells.checked_mul(depth as usize))
            .ok_or(WorldError::DimensionOverflow {
                width,
                height,
                depth,
            })?;

        let mut storage = Vec::new();
        storage
            .try_reserve_exact(cells)
            .map_err(|source| WorldError::Allocation { cells, source })?;
        storage.resize(cells, BlockType::AIR as BlockTypeSize);

        debug!("Allocated dense block storage of {} cells", cells);

        Ok(DenseStorage {
            cells: storage,
            width: width as usize,
            depth: depth as usize,
        })
    }

    #[inline]
    fn index(&self, x: i32, y: i32, z: i32) -> usize {
        x as usize + self.width * (z as usize + self.depth * y as usize)
    }
}

impl BlockStorage for DenseStorage {
    #[inline]
    fn get_raw(&self, x: i32, y: i32, z: i32) -> BlockTypeSize {
        self.cells[self.index(x, y, z)]
    }

    #[inline]
    fn set_raw(&mut self, x: i32, y: i32, z: i32, value: BlockTypeSize) {
        let index = self.index(x, y, z);
        self.cells[index] = value;
    }

    fn clear(&mut self) {
        self.cells.fill(BlockType::AIR as BlockTypeSize);
    }
}

/// One allocated chunk of a `SparseStorage`.
struct SparseChunk {
    cells: Box<[BlockTypeSize]>,
    solid: u32,
}

/// Sparse storage: chunk position → 16³ ids, allocated on first non-air write
/// and released when the chunk becomes all air again.
#[derive(Default)]
pub struct SparseStorage {
    chunks: HashMap<Point3<i32>, SparseChunk>,
}

impl SparseStorage {
    /// Creates an empty store. No cells are allocated until written.
    pub fn new() -> Self {
        SparseStorage {
            chunks: HashMap::new(),
        }
    }

    /// Number of chunks currently holding memory.
    pub fn allocated_chunks(&self) -> usize {
        self.chunks.len()
    }

    #[inline]
    fn local_index(x: i32, y: i32, z: i32) -> usize {
        let lx = x.rem_euclid(CHUNK_DIMENSION);
        let ly = y.rem_euclid(CHUNK_DIMENSION);
        let lz = z.rem_euclid(CHUNK_DIMENSION);
        (lx + CHUNK_DIMENSION * (lz + CHUNK_DIMENSION * ly)) as usize
    }
}

impl BlockStorage for SparseStorage {
    fn get_raw(&self, x: i32, y: i32, z: i32) -> BlockTypeSize {
        self.chunks
            .get(&chunk_position_of(x, y, z))
            .map(|chunk| chunk.cells[Self::local_index(x, y, z)])
            .unwrap_or(BlockType::AIR as BlockTypeSize)
    }

    fn set_raw(&mut self, x: i32, y: i32, z: i32, value: BlockTypeSize) {
        let position = chunk_position_of(x, y, z);
        let local = Self::local_index(x, y, z);
        let is_solid = value != BlockType::AIR as BlockTypeSize;

        if !is_solid && !self.chunks.contains_key(&position) {
            return;
        }

        let chunk = self.chunks.entry(position).or_insert_with(|| SparseChunk {
            cells: vec![BlockType::AIR as BlockTypeSize; CHUNK_SIZE as usize].into_boxed_slice(),
            solid: 0,
        });

        let was_solid = chunk.cells[local] != BlockType::AIR as BlockTypeSize;
        chunk.cells[local] = value;
        match (was_solid, is_solid) {
            (false, true) => chunk.solid += 1,
            (true, false) => chunk.solid -= 1,
            _ => {}
        }

        if chunk.solid == 0 {
            self.chunks.remove(&position);
        }
    }

    fn clear(&mut self) {
        self.chunks.clear();
    }
}

/// Either store, picked at runtime from `StorageKind`.
pub enum WorldStorage {
    /// See `DenseStorage`.
    Dense(DenseStorage),
    /// See `SparseStorage`.
    Sparse(SparseStorage),
}

impl BlockStorage for WorldStorage {
    #[inline]
    fn get_raw(&self, x: i32, y: i32, z: i32) -> BlockTypeSize {
        match self {
            WorldStorage::Dense(storage) => storage.get_raw(x, y, z),
            WorldStorage::Sparse(storage) => storage.get_raw(x, y, z),
        }
    }

    #[inline]
    fn set_raw(&mut self, x: i32, y: i32, z: i32, value: BlockTypeSize) {
        match self {
            WorldStorage::Dense(storage) => storage.set_raw(x, y, z, value),
            WorldStorage::Sparse(storage) => storage.set_raw(x, y, z, value),
        }
    }

    fn clear(&mut self) {
        match self {
            WorldStorage::Dense(storage) => storage.clear(),
            WorldStorage::Sparse(storage) => storage.clear(),
        }
    }
}

/// A bounded 3D grid of blocks.
///
/// # Examples
///
/// ```
/// use voxel_world::{Block, BlockGrid, BlockType};
///
/// let mut grid = BlockGrid::new(16, 16, 16).unwrap();
/// grid.set(1, 2, 3, true, BlockType::STONE);
/// assert_eq!(grid.get(1, 2, 3).block_type(), BlockType::STONE);
///
/// // Out of bounds is never an error.
/// grid.set(-1, 0, 0, true, BlockType::STONE);
/// assert_eq!(grid.get(-1, 0, 0), Block::AIR);
/// ```
pub struct BlockGrid<S: BlockStorage = DenseStorage> {
    width: i32,
    height: i32,
    depth: i32,
    storage: S,
    chunks: ChunkTable,
}

impl BlockGrid<DenseStorage> {
    /// Allocates an empty dense grid.
    ///
    /// # Errors
    /// Fails if a dimension is zero or too large, or if the allocation fails.
    pub fn new(width: u32, height: u32, depth: u32) -> Result<Self, WorldError> {
        Self::validate(width, height, depth)?;
        let storage = DenseStorage::allocate(width, height, depth)?;
        Self::with_storage(width, height, depth, storage)
    }
}

impl BlockGrid<SparseStorage> {
    /// Creates an empty sparse grid. Memory is only used by chunks holding blocks.
    pub fn new_sparse(width: u32, height: u32, depth: u32) -> Result<Self, WorldError> {
        Self::with_storage(width, height, depth, SparseStorage::new())
    }
}

impl BlockGrid<WorldStorage> {
    /// Creates an empty grid backed by the store named in `kind`.
    pub fn with_kind(width: u32, height: u32, depth: u32, kind: StorageKind) -> Result<Self, WorldError> {
        Self::validate(width, height, depth)?;
        let storage = match kind {
            StorageKind::Dense => WorldStorage::Dense(DenseStorage::allocate(width, height, depth)?),
            StorageKind::Sparse => WorldStorage::Sparse(SparseStorage::new()),
        };
        Self::with_storage(width, height, depth, storage)
    }
}

impl<S: BlockStorage> BlockGrid<S> {
    /// Wraps an existing, all-air `storage` sized for `width × height × depth`.
    pub fn with_storage(width: u32, height: u32, depth: u32, storage: S) -> Result<Self, WorldError> {
        Self::validate(width, height, depth)?;
        let (width, height, depth) = (width as i32, height as i32, depth as i32);
        let chunks = ChunkTable::new(width, height, depth)?;
        Ok(BlockGrid {
            width,
            height,
            depth,
            storage,
            chunks,
        })
    }

    fn validate(width: u32, height: u32, depth: u32) -> Result<(), WorldError> {
        let fits = |v: u32| v > 0 && v <= i32::MAX as u32;
        if fits(width) && fits(height) && fits(depth) {
            Ok(())
        } else {
            Err(WorldError::InvalidDimensions {
                width,
                height,
                depth,
            })
        }
    }

    /// The grid size as `[width, height, depth]`.
    pub fn dimensions(&self) -> [i32; 3] {
        [self.width, self.height, self.depth]
    }

    /// Number of cells along x.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Number of cells along y.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Number of cells along z.
    pub fn depth(&self) -> i32 {
        self.depth
    }

    /// Whether `(x, y, z)` addresses a cell of this grid.
    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32, z: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height && z >= 0 && z < self.depth
    }

    /// Returns the block at `(x, y, z)`, or `Block::AIR` outside the grid.
    #[inline]
    pub fn get(&self, x: i32, y: i32, z: i32) -> Block {
        if !self.in_bounds(x, y, z) {
            return Block::AIR;
        }
        Block::from_int(self.storage.get_raw(x, y, z))
    }

    /// Shorthand for `get(x, y, z).is_active()`.
    #[inline]
    pub fn is_active(&self, x: i32, y: i32, z: i32) -> bool {
        self.get(x, y, z).is_active()
    }

    /// Writes a block at `(x, y, z)`. Ignored outside the grid.
    ///
    /// `active = false` always stores air whatever `block_type` says. A write
    /// that changes the cell marks its chunk dirty, along with any neighbouring
    /// chunk that shares the face the cell sits on.
    pub fn set(&mut self, x: i32, y: i32, z: i32, active: bool, block_type: BlockType) {
        if !self.in_bounds(x, y, z) {
            return;
        }

        let block = Block::from_parts(active, block_type);
        let previous = self.storage.get_raw(x, y, z);
        if previous == block.to_int() {
            return;
        }

        self.storage.set_raw(x, y, z, block.to_int());

        let owner = chunk_position_of(x, y, z);
        let was_active = previous != BlockType::AIR as BlockTypeSize;
        self.chunks.record_write(owner, was_active, block.is_active());
        self.chunks.mark_dirty(owner);
        self.mark_seam_neighbours_dirty(owner, x, y, z);
    }

    fn mark_seam_neighbours_dirty(&mut self, owner: Point3<i32>, x: i32, y: i32, z: i32) {
        let local = [
            x.rem_euclid(CHUNK_DIMENSION),
            y.rem_euclid(CHUNK_DIMENSION),
            z.rem_euclid(CHUNK_DIMENSION),
        ];
        for (axis, &coordinate) in local.iter().enumerate() {
            let step = if coordinate == 0 {
                -1
            } else if coordinate == CHUNK_DIMENSION - 1 {
                1
            } else {
                continue;
            };
            let mut neighbour = owner;
            neighbour[axis] += step;
            self.chunks.mark_dirty(neighbour);
        }
    }

    /// Returns `true` iff the block at `(x, y, z)` is strictly inside the grid
    /// and all six face neighbours are active.
    ///
    /// Blocks on the grid boundary are never hidden, so the outer shell of the
    /// world always renders. Every active type counts as an occluder here,
    /// leaves and water included.
    pub fn is_hidden(&self, x: i32, y: i32, z: i32) -> bool {
        if x <= 0
            || y <= 0
            || z <= 0
            || x >= self.width - 1
            || y >= self.height - 1
            || z >= self.depth - 1
        {
            return false;
        }

        self.is_active(x + 1, y, z)
            && self.is_active(x - 1, y, z)
            && self.is_active(x, y + 1, z)
            && self.is_active(x, y - 1, z)
            && self.is_active(x, y, z + 1)
            && self.is_active(x, y, z - 1)
    }

    /// Resets every cell to air and marks every chunk stale.
    pub fn clear(&mut self) {
        self.storage.clear();
        self.chunks.reset();
    }

    /// Read access to the chunk flags.
    pub fn chunk_table(&self) -> &ChunkTable {
        &self.chunks
    }

    /// Whether the chunk at `position` needs its mesh rebuilt.
    pub fn is_chunk_dirty(&self, position: Point3<i32>) -> bool {
        self.chunks.is_dirty(position)
    }

    /// Whether the chunk at `position` holds any block.
    pub fn is_chunk_active(&self, position: Point3<i32>) -> bool {
        self.chunks.is_active(position)
    }

    /// Drains the set of stale chunks, clearing their flags.
    pub fn take_dirty_chunks(&mut self) -> Vec<Point3<i32>> {
        self.chunks.take_dirty()
    }

    /// The backing store.
    pub fn storage(&self) -> &S {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_TYPES: [BlockType; 8] = BlockType::ALL;

    fn solid_cube<S: BlockStorage>(grid: &mut BlockGrid<S>, min: i32, max: i32) {
        for x in min..=max {
            for y in min..=max {
                for z in min..=max {
                    grid.set(x, y, z, true, BlockType::STONE);
                }
            }
        }
    }

    #[test]
    fn inactive_writes_read_back_as_air() {
        let mut grid = BlockGrid::new(4, 4, 4).unwrap();
        for block_type in ALL_TYPES {
            grid.set(1, 1, 1, true, BlockType::WOOD);
            grid.set(1, 1, 1, false, block_type);
            assert_eq!(grid.get(1, 1, 1), Block::AIR);
        }
    }

    #[test]
    fn out_of_bounds_reads_are_air_and_writes_are_ignored() {
        let mut grid = BlockGrid::new(4, 5, 6).unwrap();
        solid_cube(&mut grid, 0, 3);
        let before: Vec<Block> = (0..4)
            .flat_map(|x| (0..5).flat_map(move |y| (0..6).map(move |z| (x, y, z))))
            .map(|(x, y, z)| grid.get(x, y, z))
            .collect();

        for (x, y, z) in [(-1, 0, 0), (4, 0, 0), (0, 5, 0), (0, 0, 6), (0, -3, 0), (i32::MAX, 0, 0)] {
            assert_eq!(grid.get(x, y, z), Block::AIR);
            grid.set(x, y, z, true, BlockType::SAND);
            assert_eq!(grid.get(x, y, z), Block::AIR);
        }

        let after: Vec<Block> = (0..4)
            .flat_map(|x| (0..5).flat_map(move |y| (0..6).map(move |z| (x, y, z))))
            .map(|(x, y, z)| grid.get(x, y, z))
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn boundary_blocks_are_never_hidden() {
        for size in 1..=4u32 {
            let mut grid = BlockGrid::new(size, size, size).unwrap();
            let max = size as i32 - 1;
            solid_cube(&mut grid, 0, max);
            for x in 0..=max {
                for y in 0..=max {
                    for z in 0..=max {
                        let on_face = x == 0 || y == 0 || z == 0 || x == max || y == max || z == max;
                        if on_face {
                            assert!(!grid.is_hidden(x, y, z), "({x},{y},{z}) in {size}³");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn centre_of_solid_cube_is_the_only_hidden_cell() {
        let mut grid = BlockGrid::new(8, 8, 8).unwrap();
        solid_cube(&mut grid, 2, 4);

        assert!(grid.is_hidden(3, 3, 3));
        for x in 2..=4 {
            for y in 2..=4 {
                for z in 2..=4 {
                    if (x, y, z) != (3, 3, 3) {
                        assert!(!grid.is_hidden(x, y, z), "({x},{y},{z})");
                    }
                }
            }
        }

        grid.set(3, 4, 3, false, BlockType::AIR);
        assert!(!grid.is_hidden(3, 3, 3));
    }

    #[test]
    fn writes_mark_owning_chunk_dirty_and_active() {
        let mut grid = BlockGrid::new(48, 48, 48).unwrap();
        grid.take_dirty_chunks();

        grid.set(20, 20, 20, true, BlockType::DIRT);
        assert!(grid.is_chunk_dirty(Point3::new(1, 1, 1)));
        assert!(grid.is_chunk_active(Point3::new(1, 1, 1)));
        assert_eq!(grid.take_dirty_chunks(), vec![Point3::new(1, 1, 1)]);

        grid.set(20, 20, 20, false, BlockType::AIR);
        assert!(!grid.is_chunk_active(Point3::new(1, 1, 1)));
        assert!(grid.is_chunk_dirty(Point3::new(1, 1, 1)));
    }

    #[test]
    fn seam_writes_dirty_the_neighbouring_chunk() {
        let mut grid = BlockGrid::new(48, 48, 48).unwrap();
        grid.set(16, 20, 31, true, BlockType::DIRT);

        let mut dirty = grid.take_dirty_chunks();
        dirty.sort_by_key(|p| (p.x, p.y, p.z));
        assert_eq!(
            dirty,
            vec![Point3::new(0, 1, 1), Point3::new(1, 1, 1), Point3::new(1, 1, 2)]
        );
    }

    #[test]
    fn unchanged_writes_do_not_dirty() {
        let mut grid = BlockGrid::new(16, 16, 16).unwrap();
        grid.set(5, 5, 5, true, BlockType::DIRT);
        grid.take_dirty_chunks();
        grid.set(5, 5, 5, true, BlockType::DIRT);
        grid.set(6, 6, 6, false, BlockType::STONE);
        assert!(grid.take_dirty_chunks().is_empty());
    }

    #[test]
    fn zero_sized_grids_are_rejected() {
        assert!(matches!(
            BlockGrid::new(0, 4, 4),
            Err(WorldError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn sparse_storage_matches_dense_storage() {
        let mut dense = BlockGrid::new(40, 20, 40).unwrap();
        let mut sparse = BlockGrid::new_sparse(40, 20, 40).unwrap();
        let mut rng = fastrand::Rng::with_seed(7);

        for _ in 0..2000 {
            let (x, y, z) = (rng.i32(-2..42), rng.i32(-2..22), rng.i32(-2..42));
            let block_type = ALL_TYPES[rng.usize(..ALL_TYPES.len())];
            let active = rng.bool();
            dense.set(x, y, z, active, block_type);
            sparse.set(x, y, z, active, block_type);
        }

        for x in -1..41 {
            for y in -1..21 {
                for z in -1..41 {
                    assert_eq!(dense.get(x, y, z), sparse.get(x, y, z));
                    assert_eq!(dense.is_hidden(x, y, z), sparse.is_hidden(x, y, z));
                }
            }
        }
    }

    #[test]
    fn sparse_storage_releases_empty_chunks() {
        let mut grid = BlockGrid::new_sparse(64, 64, 64).unwrap();
        assert_eq!(grid.storage().allocated_chunks(), 0);

        grid.set(1, 1, 1, true, BlockType::STONE);
        grid.set(40, 1, 1, true, BlockType::STONE);
        assert_eq!(grid.storage().allocated_chunks(), 2);

        grid.set(1, 1, 1, false, BlockType::AIR);
        assert_eq!(grid.storage().allocated_chunks(), 1);

        grid.set(2, 2, 2, false, BlockType::AIR);
        assert_eq!(grid.storage().allocated_chunks(), 1);
    }

    #[test]
    fn storage_kind_selects_the_backing_store() {
        let mut grid = BlockGrid::with_kind(32, 32, 32, StorageKind::Sparse).unwrap();
        assert!(matches!(grid.storage(), WorldStorage::Sparse(_)));
        grid.set(3, 4, 5, true, BlockType::GRASS);
        assert_eq!(grid.get(3, 4, 5).block_type(), BlockType::GRASS);

        let grid = BlockGrid::with_kind(8, 8, 8, StorageKind::Dense).unwrap();
        assert!(matches!(grid.storage(), WorldStorage::Dense(_)));
        assert!(BlockGrid::with_kind(8, 0, 8, StorageKind::Dense).is_err());
    }

    #[test]
    fn huge_sparse_grids_fail_without_aborting() {
        let side = 1 << 20;
        assert!(BlockGrid::new_sparse(side, side, side).is_err());
        assert!(BlockGrid::with_kind(side, side, side, StorageKind::Sparse).is_err());
    }
}

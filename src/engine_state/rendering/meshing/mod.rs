//! Mesh generation and management for voxel rendering.
//!
//! This module turns chunks of the block grid into greedy meshes and keeps the
//! recently drawn ones around. The key goals are:
//! 1. Rebuild a chunk's mesh only after one of its blocks (or a block on its
//!    seam) changed
//! 2. Bound mesh memory regardless of world size
//! 3. Submit only the sides of a mesh that can face the viewer
//!
//! # Architecture
//! - `MeshManager`: Main interface for mesh generation, caching and drawing
//! - `mesh/`: Contains the core mesh generation algorithms
//!
//! # Performance Considerations
//! - Greedy meshing minimizes vertex count
//! - Meshes live in an LRU cache, so chunks far behind the viewer are dropped first
//! - Empty chunks are never meshed

use std::num::NonZeroUsize;

use cgmath::Point3;
use log::{debug, warn};
use lru::LruCache;

/// Core mesh generation algorithms and data structures.
///
/// This module contains the implementation of greedy meshing and related
/// functionality for converting voxel data into optimized triangle meshes.
mod mesh;

// Re-export the mesh module's public interface for external use
pub use mesh::*;

use crate::engine_state::{
    rendering::{culling::CullingPolicy, renderer::DrawSink},
    voxels::{
        block::block_side::BlockSide,
        chunk::{chunk_origin, chunk_position_of, CHUNK_DIMENSION},
        grid::{BlockGrid, BlockStorage},
    },
};

/// Work done by one `MeshManager::draw_around` call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MeshFrameStats {
    /// Chunks within range that hold blocks
    pub chunks_in_range: usize,
    /// Meshes built this frame
    pub chunks_meshed: usize,
    /// Meshes pushed out of the cache this frame
    pub chunks_evicted: usize,
    /// Meshes handed to the sink
    pub chunks_drawn: usize,
}

/// The sides of the chunk at `chunk` that can face a viewer at `eye`.
///
/// A side is kept if at least one face plane of that orientation inside the
/// chunk lies behind the viewer's position along the side's normal.
pub fn facing_sides(chunk: Point3<i32>, eye: Point3<f32>) -> Vec<BlockSide> {
    let origin = chunk_origin(chunk);
    BlockSide::all()
        .into_iter()
        .filter(|side| {
            let axis = side.axis();
            if side.is_positive() {
                // Lowest +axis face plane in the chunk.
                eye[axis] > origin[axis] as f32 + 0.5
            } else {
                // Highest -axis face plane in the chunk.
                eye[axis] < (origin[axis] + CHUNK_DIMENSION) as f32 - 1.5
            }
        })
        .collect()
}

/// Central manager for voxel mesh generation and caching.
///
/// The `MeshManager` is responsible for:
/// - Converting chunk data into optimized mesh geometry on demand
/// - Dropping meshes whose chunk was modified
/// - Evicting the least recently drawn meshes when the cache is full
/// - Handing meshes in range of the viewer to a `DrawSink`
pub struct MeshManager {
    /// Meshes by chunk position, least recently drawn first out
    meshes: LruCache<Point3<i32>, Mesh>,
    /// Occlusion rule used when meshing
    policy: CullingPolicy,
    /// Chunks drawn around the viewer along each axis
    render_distance: i32,
}

impl MeshManager {
    /// Creates an empty mesh manager.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of meshes kept
    /// * `policy` - Which neighbours hide a face when meshing
    /// * `render_distance` - Chunks drawn around the viewer along each axis
    pub fn new(capacity: NonZeroUsize, policy: CullingPolicy, render_distance: i32) -> Self {
        MeshManager {
            meshes: LruCache::new(capacity),
            policy,
            render_distance,
        }
    }

    /// Number of cached meshes.
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    /// Whether no mesh is cached.
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Checks if a chunk has a current mesh, without touching its recency.
    pub fn is_chunk_meshed(&self, chunk_position: Point3<i32>) -> bool {
        self.meshes.contains(&chunk_position)
    }

    /// Drains the grid's dirty chunks and drops their meshes.
    ///
    /// # Returns
    ///
    /// The number of meshes dropped.
    pub fn invalidate_dirty<S: BlockStorage>(&mut self, grid: &mut BlockGrid<S>) -> usize {
        let dirty = grid.take_dirty_chunks();
        let dropped = dirty
            .iter()
            .filter(|&&position| self.meshes.pop(&position).is_some())
            .count();
        if dropped > 0 {
            debug!("Invalidated {} chunk meshes ({} chunks dirty)", dropped, dirty.len());
        }
        dropped
    }

    /// Returns the mesh of a chunk, building it if it is not cached.
    ///
    /// # Returns
    ///
    /// The mesh, and the position of a chunk whose mesh was evicted to make room.
    pub fn get_or_build<S: BlockStorage>(
        &mut self,
        grid: &BlockGrid<S>,
        chunk_position: Point3<i32>,
    ) -> (&Mesh, Option<Point3<i32>>) {
        let full = self.meshes.len() == self.meshes.cap().get();
        let evicted = if full && !self.meshes.contains(&chunk_position) {
            self.meshes.peek_lru().map(|(position, _)| *position)
        } else {
            None
        };

        let policy = self.policy;
        let mesh = self
            .meshes
            .get_or_insert(chunk_position, || Mesh::greedy(grid, chunk_position, policy));
        (mesh, evicted)
    }

    /// Chunk positions within `render_distance` of `eye`, clipped to the grid.
    pub fn chunks_in_range<S: BlockStorage>(&self, grid: &BlockGrid<S>, eye: Point3<f32>) -> Vec<Point3<i32>> {
        let cell = |v: f32| (v + 0.5).floor() as i32;
        let center = chunk_position_of(cell(eye.x), cell(eye.y), cell(eye.z));
        let [cx, cy, cz] = grid.chunk_table().dimensions();
        let r = self.render_distance;
        let range = |c: i32, count: i32| c.saturating_sub(r).max(0)..=c.saturating_add(r).min(count - 1);

        let mut positions = Vec::new();
        for y in range(center.y, cy) {
            for z in range(center.z, cz) {
                for x in range(center.x, cx) {
                    positions.push(Point3::new(x, y, z));
                }
            }
        }
        positions
    }

    /// Draws every non-empty chunk within range of `eye`, meshing on demand.
    ///
    /// # Arguments
    ///
    /// * `grid` - The grid to draw
    /// * `eye` - Viewer position in world space
    /// * `sink` - Receiver of the chunk meshes
    pub fn draw_around<S, D>(&mut self, grid: &BlockGrid<S>, eye: Point3<f32>, sink: &mut D) -> MeshFrameStats
    where
        S: BlockStorage,
        D: DrawSink + ?Sized,
    {
        let mut stats = MeshFrameStats::default();

        for chunk_position in self.chunks_in_range(grid, eye) {
            if !grid.is_chunk_active(chunk_position) {
                continue;
            }
            stats.chunks_in_range += 1;

            let built = !self.meshes.contains(&chunk_position);
            let (mesh, evicted) = self.get_or_build(grid, chunk_position);
            if built {
                stats.chunks_meshed += 1;
            }
            if evicted.is_some() {
                stats.chunks_evicted += 1;
            }
            if mesh.is_empty() {
                continue;
            }

            sink.draw_chunk(mesh, &facing_sides(chunk_position, eye));
            stats.chunks_drawn += 1;
        }

        if stats.chunks_evicted > 0 {
            warn!(
                "Mesh cache of {} evicted {} meshes in one frame; {} chunks are in range",
                self.meshes.cap(),
                stats.chunks_evicted,
                stats.chunks_in_range
            );
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::{
        rendering::renderer::DrawStats,
        voxels::block::block_type::BlockType,
    };

    fn manager(capacity: usize, render_distance: i32) -> MeshManager {
        MeshManager::new(
            NonZeroUsize::new(capacity).unwrap(),
            CullingPolicy::Opaque,
            render_distance,
        )
    }

    fn floor(size: u32) -> BlockGrid {
        let mut grid = BlockGrid::new(size, 16, size).unwrap();
        for x in 0..size as i32 {
            for z in 0..size as i32 {
                grid.set(x, 0, z, true, BlockType::STONE);
            }
        }
        grid
    }

    #[test]
    fn meshes_are_built_once_and_reused() {
        let mut grid = floor(32);
        let mut manager = manager(16, 4);
        manager.invalidate_dirty(&mut grid);

        let eye = Point3::new(16.0, 8.0, 16.0);
        let first = manager.draw_around(&grid, eye, &mut DrawStats::default());
        assert_eq!(first.chunks_in_range, 4);
        assert_eq!(first.chunks_meshed, 4);
        assert_eq!(first.chunks_drawn, 4);

        let second = manager.draw_around(&grid, eye, &mut DrawStats::default());
        assert_eq!(second.chunks_meshed, 0);
        assert_eq!(second.chunks_drawn, 4);
    }

    #[test]
    fn edits_rebuild_only_affected_chunks() {
        let mut grid = floor(48);
        let mut manager = manager(16, 4);
        manager.invalidate_dirty(&mut grid);
        let eye = Point3::new(24.0, 8.0, 24.0);
        manager.draw_around(&grid, eye, &mut DrawStats::default());
        assert_eq!(manager.len(), 9);

        grid.set(24, 1, 24, true, BlockType::WOOD);
        assert_eq!(manager.invalidate_dirty(&mut grid), 1);
        assert!(!manager.is_chunk_meshed(Point3::new(1, 0, 1)));

        let stats = manager.draw_around(&grid, eye, &mut DrawStats::default());
        assert_eq!(stats.chunks_meshed, 1);
    }

    #[test]
    fn seam_edits_rebuild_both_chunks() {
        let mut grid = floor(32);
        let mut manager = manager(16, 4);
        manager.invalidate_dirty(&mut grid);
        manager.draw_around(&grid, Point3::new(16.0, 8.0, 16.0), &mut DrawStats::default());

        grid.set(15, 0, 4, false, BlockType::AIR);
        assert_eq!(manager.invalidate_dirty(&mut grid), 2);
    }

    #[test]
    fn render_distance_limits_drawn_chunks() {
        let mut grid = floor(80);
        let mut manager = manager(64, 1);
        manager.invalidate_dirty(&mut grid);

        let stats = manager.draw_around(&grid, Point3::new(40.0, 8.0, 40.0), &mut DrawStats::default());
        assert_eq!(stats.chunks_in_range, 9);

        let corner = manager.draw_around(&grid, Point3::new(0.0, 8.0, 0.0), &mut DrawStats::default());
        assert_eq!(corner.chunks_in_range, 4);
    }

    #[test]
    fn small_caches_evict_least_recently_drawn() {
        let mut grid = floor(32);
        let mut manager = manager(2, 4);
        manager.invalidate_dirty(&mut grid);

        let stats = manager.draw_around(&grid, Point3::new(16.0, 8.0, 16.0), &mut DrawStats::default());
        assert_eq!(stats.chunks_drawn, 4);
        assert_eq!(stats.chunks_evicted, 2);
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn facing_sides_drop_faces_turned_away() {
        // Viewer above and to the -x side of chunk (1, 0, 0).
        let sides = facing_sides(Point3::new(1, 0, 0), Point3::new(4.0, 40.0, 8.0));
        assert!(sides.contains(&BlockSide::TOP));
        assert!(!sides.contains(&BlockSide::BOTTOM));
        assert!(sides.contains(&BlockSide::FRONT));
        assert!(!sides.contains(&BlockSide::BACK));
        assert!(sides.contains(&BlockSide::LEFT));
        assert!(sides.contains(&BlockSide::RIGHT));

        // Inside the chunk every side can be seen.
        assert_eq!(facing_sides(Point3::new(0, 0, 0), Point3::new(8.0, 8.0, 8.0)).len(), 6);
    }
}

//! # World Module
//!
//! This module provides the `World` struct, the single owner of a world's
//! `BlockGrid`. Collaborators never touch the grid directly for writes; they
//! go through the narrow surface here:
//!
//! - `get` / `set` / `is_hidden` for block access
//! - `raycast` for picking within the interaction range
//! - `collides` for agent movement
//!
//! ## Creation
//!
//! `World::generate` allocates the grid and runs terrain generation once.
//! `World::empty` skips generation, which is what tests and tools usually want.

use cgmath::Point3;
use log::info;
use web_time::Instant;

use super::{
    block::{block_type::BlockType, Block},
    grid::{BlockGrid, WorldStorage},
    raycast::{cast_ray, Ray, RayHit},
    terrain::{GenerationStats, PerlinHeightField, TerrainGenerator},
};
use crate::{
    config::WorldConfig,
    engine_state::{interaction::Aabb, rendering::culling::CullingPolicy},
    error::WorldError,
};

/// A bounded voxel world.
///
/// # Examples
///
/// ```
/// use voxel_world::{BlockType, World, WorldConfig};
///
/// let config = WorldConfig { width: 16, height: 16, depth: 16, ..WorldConfig::default() };
/// let mut world = World::empty(&config).unwrap();
/// world.set(3, 3, 3, true, BlockType::SAND);
/// assert!(world.is_active(3, 3, 3));
/// ```
pub struct World {
    grid: BlockGrid<WorldStorage>,
    ray_radius: i32,
    passable: Vec<BlockType>,
    culling: CullingPolicy,
    seed: u64,
}

impl World {
    /// Creates an all-air world sized and configured by `config`.
    ///
    /// # Errors
    /// Fails on invalid settings or if the grid cannot be allocated.
    pub fn empty(config: &WorldConfig) -> Result<Self, WorldError> {
        config.validate()?;
        let grid = BlockGrid::with_kind(config.width, config.height, config.depth, config.storage)?;
        Ok(World {
            grid,
            ray_radius: config.ray_radius,
            passable: config.passable_types()?,
            culling: config.culling,
            seed: config.seed.unwrap_or_else(|| fastrand::u64(..)),
        })
    }

    /// Creates a world and fills it with terrain and trees.
    ///
    /// The same seed always produces the same world.
    pub fn generate(config: &WorldConfig) -> Result<(Self, GenerationStats), WorldError> {
        let start = Instant::now();
        let mut world = World::empty(config)?;

        let heights = PerlinHeightField::new(
            world.seed as u32,
            config.terrain.octaves,
            config.terrain.noise_frequency,
        );
        let mut rng = fastrand::Rng::with_seed(world.seed);
        let generator = TerrainGenerator::new(config.terrain.clone(), config.trees.clone());
        let stats = generator.generate(&mut world.grid, &heights, &mut rng);

        info!(
            "Created {}x{}x{} world (seed {}) in {:?}",
            config.width,
            config.height,
            config.depth,
            world.seed,
            start.elapsed()
        );
        Ok((world, stats))
    }

    /// The seed used for generation.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Read access to the block grid.
    pub fn grid(&self) -> &BlockGrid<WorldStorage> {
        &self.grid
    }

    /// Mutable access to the block grid, for chunk bookkeeping.
    pub fn grid_mut(&mut self) -> &mut BlockGrid<WorldStorage> {
        &mut self.grid
    }

    /// The occlusion rule used when drawing this world.
    pub fn culling(&self) -> CullingPolicy {
        self.culling
    }

    /// See `BlockGrid::get`.
    #[inline]
    pub fn get(&self, x: i32, y: i32, z: i32) -> Block {
        self.grid.get(x, y, z)
    }

    /// See `BlockGrid::is_active`.
    #[inline]
    pub fn is_active(&self, x: i32, y: i32, z: i32) -> bool {
        self.grid.is_active(x, y, z)
    }

    /// See `BlockGrid::set`.
    pub fn set(&mut self, x: i32, y: i32, z: i32, active: bool, block_type: BlockType) {
        self.grid.set(x, y, z, active, block_type);
    }

    /// See `BlockGrid::is_hidden`.
    pub fn is_hidden(&self, x: i32, y: i32, z: i32) -> bool {
        self.grid.is_hidden(x, y, z)
    }

    /// Whether an agent can move through blocks of this type.
    pub fn is_passable(&self, block_type: BlockType) -> bool {
        block_type == BlockType::AIR || self.passable.contains(&block_type)
    }

    /// Nearest block hit by `ray` within the interaction range.
    pub fn raycast(&self, ray: &Ray) -> RayHit {
        cast_ray(&self.grid, ray, self.ray_radius)
    }

    /// Whether `aabb` overlaps any block that is not passable.
    pub fn collides(&self, aabb: &Aabb) -> bool {
        let cells = |min: f32, max: f32| ((min - 0.5).floor() as i32)..=((max + 0.5).ceil() as i32);

        for x in cells(aabb.min.x, aabb.max.x) {
            for y in cells(aabb.min.y, aabb.max.y) {
                for z in cells(aabb.min.z, aabb.max.z) {
                    let block = self.grid.get(x, y, z);
                    if self.is_passable(block.block_type()) {
                        continue;
                    }
                    if Aabb::for_block(x, y, z).intersects(aabb) {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Highest active, non-passable block in column `(x, z)`.
    pub fn surface_height(&self, x: i32, z: i32) -> Option<i32> {
        (0..self.grid.height())
            .rev()
            .find(|&y| !self.is_passable(self.grid.get(x, y, z).block_type()))
    }

    /// An eye position standing on the surface at the centre of the world.
    pub fn spawn_point(&self, eye_height: f32) -> Point3<f32> {
        let (x, z) = (self.grid.width() / 2, self.grid.depth() / 2);
        let ground = self.surface_height(x, z).unwrap_or(-1);
        Point3::new(x as f32, ground as f32 + 0.5 + eye_height, z as f32)
    }
}

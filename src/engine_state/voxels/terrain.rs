//! # Terrain Generation
//!
//! One-shot population of an empty `BlockGrid`: a noise height field gives
//! each `(x, z)` column its surface height, columns are filled with layered
//! terrain, and trees are scattered over grass.
//!
//! The noise and random sources are collaborators (`HeightSource`,
//! `RandomSource`), so generation is deterministic for a given pair and tests
//! can drive it with synthetic inputs.
//!
//! ## Passes
//!
//! 1. Terrain: every column is filled from `y = 0` to its height.
//! 2. Trees: with a fixed chance per grass-topped column, a trunk and a
//!    diamond-shaped canopy are grown above the surface.
//!
//! Trees only ever fill air cells, and the terrain pass finishes before the
//! first tree is planted, so neither overwrites the other.

use log::info;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use web_time::Instant;

use super::{
    block::block_type::BlockType,
    grid::{BlockGrid, BlockStorage},
};
use crate::config::{TerrainConfig, TreeConfig};

/// Canopy layers below the trunk top.
const CANOPY_DEPTH_BELOW_TOP: i32 = 2;
/// Canopy layers above the trunk top.
const CANOPY_HEIGHT_ABOVE_TOP: i32 = 1;

/// A 2D coherent-noise field sampled once per column.
pub trait HeightSource {
    /// Returns the field value at column `(x, z)`, in `[0, 1]`.
    fn sample(&self, x: u32, z: u32) -> f64;
}

impl<F: Fn(u32, u32) -> f64> HeightSource for F {
    fn sample(&self, x: u32, z: u32) -> f64 {
        self(x, z)
    }
}

/// The uniform random generator used for tree placement.
pub trait RandomSource {
    /// Returns `true` with the given probability.
    fn chance(&mut self, probability: f64) -> bool;

    /// A uniform integer in `min..=max`.
    fn range_inclusive(&mut self, min: u32, max: u32) -> u32;
}

impl RandomSource for fastrand::Rng {
    fn chance(&mut self, probability: f64) -> bool {
        self.f64() < probability
    }

    fn range_inclusive(&mut self, min: u32, max: u32) -> u32 {
        self.u32(min..=max)
    }
}

/// Fractal Perlin noise remapped from `[-1, 1]` to `[0, 1]`.
pub struct PerlinHeightField {
    noise: Fbm<Perlin>,
}

impl PerlinHeightField {
    /// Creates a height field.
    ///
    /// # Arguments
    /// * `seed` - Noise seed
    /// * `octaves` - Number of fBm octaves
    /// * `frequency` - Base frequency, in cycles per block
    pub fn new(seed: u32, octaves: usize, frequency: f64) -> Self {
        PerlinHeightField {
            noise: Fbm::<Perlin>::new(seed)
                .set_octaves(octaves)
                .set_frequency(frequency),
        }
    }
}

impl HeightSource for PerlinHeightField {
    fn sample(&self, x: u32, z: u32) -> f64 {
        let value = self.noise.get([x as f64, z as f64]);
        ((value + 1.0) * 0.5).clamp(0.0, 1.0)
    }
}

/// Counters reported by a generation run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct GenerationStats {
    /// Columns filled.
    pub columns: u64,
    /// Terrain blocks written.
    pub terrain_blocks: u64,
    /// Trees grown.
    pub trees: u64,
    /// Wood and leaf blocks written.
    pub tree_blocks: u64,
}

/// Fills a grid with layered terrain and trees.
pub struct TerrainGenerator {
    terrain: TerrainConfig,
    trees: TreeConfig,
}

impl TerrainGenerator {
    /// Creates a generator from the world's terrain and tree settings.
    pub fn new(terrain: TerrainConfig, trees: TreeConfig) -> Self {
        TerrainGenerator { terrain, trees }
    }

    /// Maps a noise sample to a column's surface height for a grid `grid_height` tall.
    ///
    /// `h = floor(sample * amplitude) + base_offset`, clamped into the grid.
    pub fn column_height(&self, sample: f64, grid_height: i32) -> i32 {
        let sample = if sample.is_finite() { sample.clamp(0.0, 1.0) } else { 0.0 };
        let height = (sample * self.terrain.amplitude).floor() as i64 + i64::from(self.terrain.base_offset);
        height.clamp(0, i64::from(grid_height) - 1) as i32
    }

    /// The block type at height `y` of a column whose surface is at `height`.
    pub fn layer_type(&self, y: i32, height: i32) -> BlockType {
        if y == height {
            if height <= self.terrain.sea_level {
                BlockType::SAND
            } else {
                BlockType::GRASS
            }
        } else if y < height - self.terrain.stone_depth {
            BlockType::STONE
        } else {
            BlockType::DIRT
        }
    }

    /// Populates an empty grid. Runs both passes and logs their timings.
    pub fn generate<S, H, R>(&self, grid: &mut BlockGrid<S>, heights: &H, rng: &mut R) -> GenerationStats
    where
        S: BlockStorage,
        H: HeightSource + ?Sized,
        R: RandomSource + ?Sized,
    {
        let [width, grid_height, depth] = grid.dimensions();
        let mut stats = GenerationStats::default();
        let mut surface = Vec::with_capacity((width as usize) * (depth as usize));

        let start = Instant::now();
        for x in 0..width {
            for z in 0..depth {
                let height = self.column_height(heights.sample(x as u32, z as u32), grid_height);
                self.fill_column(grid, x, z, height);
                surface.push(height);
                stats.columns += 1;
                stats.terrain_blocks += height as u64 + 1;
            }
        }
        info!(
            "Generated {} terrain columns ({} blocks) in {:?}",
            stats.columns,
            stats.terrain_blocks,
            start.elapsed()
        );

        let start = Instant::now();
        for x in 0..width {
            for z in 0..depth {
                let height = surface[x as usize * depth as usize + z as usize];
                if grid.get(x, height, z).block_type() != BlockType::GRASS {
                    continue;
                }
                if !rng.chance(self.trees.chance) {
                    continue;
                }
                if let Some(placed) = self.generate_tree(grid, x, height + 1, z, rng) {
                    stats.trees += 1;
                    stats.tree_blocks += placed;
                }
            }
        }
        info!("Planted {} trees in {:?}", stats.trees, start.elapsed());

        stats
    }

    /// Fills column `(x, z)` from `y = 0` up to and including `height`.
    pub fn fill_column<S: BlockStorage>(&self, grid: &mut BlockGrid<S>, x: i32, z: i32, height: i32) {
        for y in 0..=height {
            grid.set(x, y, z, true, self.layer_type(y, height));
        }
    }

    /// Grows a tree whose trunk starts at `(x, y, z)`.
    ///
    /// Returns the number of blocks written, or `None` when the tree was
    /// skipped. Trees that would not fit whole inside the grid, or that come
    /// within the configured margins of an edge or the ceiling, are skipped
    /// rather than clipped. Only air cells are filled.
    pub fn generate_tree<S, R>(&self, grid: &mut BlockGrid<S>, x: i32, y: i32, z: i32, rng: &mut R) -> Option<u64>
    where
        S: BlockStorage,
        R: RandomSource + ?Sized,
    {
        let [width, height, depth] = grid.dimensions().map(i64::from);
        let (x64, y64, z64) = (i64::from(x), i64::from(y), i64::from(z));
        let margin = i64::from(self.trees.margin);
        let half_width = i64::from(self.trees.canopy_half_width);
        if x64 < margin.max(half_width)
            || x64 >= width - margin.max(half_width)
            || z64 < margin.max(half_width)
            || z64 >= depth - margin.max(half_width)
            || y64 < 0
            || y64 >= height - i64::from(self.trees.ceiling_margin)
        {
            return None;
        }

        let trunk_height = rng.range_inclusive(self.trees.trunk_min, self.trees.trunk_max) as i32;
        let top = y64 + i64::from(trunk_height);
        if top + i64::from(CANOPY_HEIGHT_ABOVE_TOP) >= height || top - i64::from(CANOPY_DEPTH_BELOW_TOP) < 0 {
            return None;
        }
        let mut placed = 0;

        for i in 0..trunk_height {
            placed += Self::fill_if_empty(grid, x, y + i, z, BlockType::WOOD) as u64;
        }

        let top = y + trunk_height;
        let half_width = self.trees.canopy_half_width;
        for lx in x - half_width..=x + half_width {
            for lz in z - half_width..=z + half_width {
                for ly in top - CANOPY_DEPTH_BELOW_TOP..=top + CANOPY_HEIGHT_ABOVE_TOP {
                    let distance = (lx - x).abs() + (ly - top).abs() + (lz - z).abs();
                    if distance <= self.trees.canopy_radius {
                        placed += Self::fill_if_empty(grid, lx, ly, lz, BlockType::LEAVES) as u64;
                    }
                }
            }
        }

        Some(placed)
    }

    fn fill_if_empty<S: BlockStorage>(grid: &mut BlockGrid<S>, x: i32, y: i32, z: i32, block_type: BlockType) -> bool {
        if !grid.in_bounds(x, y, z) || grid.is_active(x, y, z) {
            return false;
        }
        grid.set(x, y, z, true, block_type);
        true
    }
}

//! World configuration.
//!
//! Every field has a default matching the shipped game, so an empty JSON
//! object (or no file at all) yields a 1024×256×1024 world.

use std::{fs, path::Path};

use serde::Deserialize;

use crate::{
    engine_state::{rendering::culling::CullingPolicy, voxels::block::block_type::BlockType},
    error::ConfigError,
};

/// Upper bound for tree sizes and margins, in blocks.
const MAX_TREE_EXTENT: i32 = 64;

/// Which `BlockStorage` backs the world grid.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    /// One byte per cell, allocated up front.
    #[default]
    Dense,
    /// Lazily allocated 16³ chunks; empty air costs nothing.
    Sparse,
}

/// Height-field settings.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Column height range produced by a noise sample of 1.0.
    pub amplitude: f64,
    /// Height added to every column.
    pub base_offset: i32,
    /// Columns whose surface is at or below this height get a sand top.
    pub sea_level: i32,
    /// Cells more than this many below the surface are stone.
    pub stone_depth: i32,
    /// Noise frequency per block.
    pub noise_frequency: f64,
    /// Number of fBm octaves.
    pub octaves: usize,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        TerrainConfig {
            amplitude: 12.0,
            base_offset: 2,
            sea_level: 4,
            stone_depth: 3,
            noise_frequency: 0.01,
            octaves: 6,
        }
    }
}

/// Tree placement settings.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Probability of a tree on a grass-topped column.
    pub chance: f64,
    /// Shortest trunk.
    pub trunk_min: u32,
    /// Tallest trunk.
    pub trunk_max: u32,
    /// Manhattan radius of the canopy around the trunk top.
    pub canopy_radius: i32,
    /// Half width of the canopy's bounding square.
    pub canopy_half_width: i32,
    /// Trees closer than this to an x/z edge are skipped.
    pub margin: i32,
    /// Trees whose base is within this many cells of the ceiling are skipped.
    pub ceiling_margin: i32,
}

impl Default for TreeConfig {
    fn default() -> Self {
        TreeConfig {
            chance: 0.05,
            trunk_min: 4,
            trunk_max: 6,
            canopy_radius: 3,
            canopy_half_width: 2,
            margin: 2,
            ceiling_margin: 6,
        }
    }
}

/// Top-level world settings.
///
/// # Examples
///
/// ```
/// use voxel_world::WorldConfig;
///
/// let config = WorldConfig::from_json_str(r#"{ "width": 64, "height": 64, "depth": 64 }"#).unwrap();
/// assert_eq!(config.ray_radius, 10);
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Cells along x.
    pub width: u32,
    /// Cells along y.
    pub height: u32,
    /// Cells along z.
    pub depth: u32,
    /// Seed for noise and tree placement. Random when absent.
    pub seed: Option<u64>,
    /// Backing store for the grid.
    pub storage: StorageKind,
    /// Height-field settings.
    pub terrain: TerrainConfig,
    /// Tree settings.
    pub trees: TreeConfig,
    /// Half-size of the cubic ray search window, in cells.
    pub ray_radius: i32,
    /// Block names the player can walk through.
    pub passable_blocks: Vec<String>,
    /// Occlusion rule for culling and meshing.
    pub culling: CullingPolicy,
    /// Chunks drawn around the viewer along each axis.
    pub render_distance: i32,
    /// Number of chunk meshes kept in memory.
    pub mesh_cache_capacity: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            width: 1024,
            height: 256,
            depth: 1024,
            seed: None,
            storage: StorageKind::Dense,
            terrain: TerrainConfig::default(),
            trees: TreeConfig::default(),
            ray_radius: 10,
            passable_blocks: vec!["water".to_string()],
            culling: CullingPolicy::Opaque,
            render_distance: 8,
            mesh_cache_capacity: 4096,
        }
    }
}

impl WorldConfig {
    /// Reads and validates a JSON config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Parses and validates a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: WorldConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every setting that could otherwise produce a broken world.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &'static str, reason: &str| {
            Err(ConfigError::InvalidValue {
                field,
                reason: reason.to_string(),
            })
        };

        for (field, value) in [("width", self.width), ("height", self.height), ("depth", self.depth)] {
            if value == 0 || value > i32::MAX as u32 {
                return invalid(field, "must be between 1 and i32::MAX");
            }
        }
        if !(0.0..=1.0).contains(&self.trees.chance) {
            return invalid("trees.chance", "must be a probability");
        }
        if self.trees.trunk_min == 0 || self.trees.trunk_min > self.trees.trunk_max {
            return invalid("trees.trunk_min", "must be non-zero and at most trees.trunk_max");
        }
        if self.terrain.amplitude < 0.0 || !self.terrain.amplitude.is_finite() {
            return invalid("terrain.amplitude", "must be finite and non-negative");
        }
        if i64::from(self.terrain.base_offset).abs() > i64::from(self.height) {
            return invalid("terrain.base_offset", "must be within the world height");
        }
        if self.terrain.stone_depth < 0 {
            return invalid("terrain.stone_depth", "must be non-negative");
        }
        if self.trees.trunk_max > MAX_TREE_EXTENT as u32 {
            return invalid("trees.trunk_max", "must be at most 64");
        }
        for (field, value) in [
            ("trees.canopy_radius", self.trees.canopy_radius),
            ("trees.canopy_half_width", self.trees.canopy_half_width),
            ("trees.margin", self.trees.margin),
            ("trees.ceiling_margin", self.trees.ceiling_margin),
        ] {
            if !(0..=MAX_TREE_EXTENT).contains(&value) {
                return invalid(field, "must be between 0 and 64");
            }
        }
        if self.terrain.octaves == 0 {
            return invalid("terrain.octaves", "must be at least 1");
        }
        if self.ray_radius < 0 {
            return invalid("ray_radius", "must be non-negative");
        }
        if self.render_distance < 0 {
            return invalid("render_distance", "must be non-negative");
        }
        if self.mesh_cache_capacity == 0 {
            return invalid("mesh_cache_capacity", "must be at least 1");
        }
        self.passable_types()?;
        Ok(())
    }

    /// Resolves `passable_blocks` to block types.
    pub fn passable_types(&self) -> Result<Vec<BlockType>, ConfigError> {
        self.passable_blocks
            .iter()
            .map(|name| {
                BlockType::from_name(&name.to_lowercase())
                    .ok_or_else(|| ConfigError::UnknownBlock(name.clone()))
            })
            .collect()
    }
}

//! # Engine State Module
//!
//! The core engine module that owns a world and steps it frame by frame.
//!
//! ## Key Components
//!
//! * `EngineState` - Owns the `World` and the `MeshManager` and runs the frame step
//! * `interaction` - Breaking and placing blocks along a view ray
//! * `rendering` - Culling, meshing and the renderer adapter
//! * `voxels` - Block data, chunking, terrain generation and ray casting
//!
//! ## Frame Step
//!
//! Each call to `EngineState::frame`:
//! 1. Drains the grid's dirty chunks and drops their cached meshes
//! 2. Meshes any chunk within the render distance that has no mesh yet
//! 3. Hands every non-empty chunk mesh in range to the `DrawSink`
//!
//! Everything runs on the calling thread; a frame does no work proportional to
//! the world size, only to the chunks in range and the chunks edited since the
//! last frame.

use std::{num::NonZeroUsize, time::Duration};

use cgmath::Point3;
use log::debug;
use web_time::Instant;

use crate::{
    config::WorldConfig,
    error::{ConfigError, WorldError},
};

use rendering::{
    meshing::{MeshFrameStats, MeshManager},
    renderer::DrawSink,
};
use voxels::{terrain::GenerationStats, world::World};

pub mod interaction;
pub mod rendering;
pub mod voxels;

/// What one frame did.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Frame number, starting at 1
    pub frame: u64,
    /// Cached meshes dropped because their chunk changed
    pub invalidated: usize,
    /// Meshing and drawing counters
    pub mesh: MeshFrameStats,
    /// Wall time spent in the frame step
    pub elapsed: Duration,
}

/// The main state container for the voxel engine.
///
/// # Examples
///
/// ```
/// use voxel_world::{DrawStats, EngineState, WorldConfig};
///
/// let config = WorldConfig { width: 32, height: 32, depth: 32, seed: Some(1), ..WorldConfig::default() };
/// let mut engine = EngineState::new(config).unwrap();
/// let eye = engine.world().spawn_point(1.5);
///
/// let mut stats = DrawStats::default();
/// let report = engine.frame(eye, &mut stats);
/// assert_eq!(report.mesh.chunks_drawn as u64, stats.chunks);
/// ```
pub struct EngineState {
    /// The world being simulated
    world: World,
    /// Chunk mesh cache
    mesh_manager: MeshManager,
    /// Settings the engine was built from
    config: WorldConfig,
    /// Counters from terrain generation
    generation: GenerationStats,
    /// Frames stepped so far
    frame_count: u64,
}

impl EngineState {
    /// Creates and generates a world from `config`.
    ///
    /// # Errors
    /// Fails on an invalid config or if the world cannot be allocated.
    pub fn new(config: WorldConfig) -> Result<Self, WorldError> {
        let (world, generation) = World::generate(&config)?;
        Self::with_world(world, generation, config)
    }

    /// Wraps an already built world.
    pub fn with_world(world: World, generation: GenerationStats, config: WorldConfig) -> Result<Self, WorldError> {
        let capacity = NonZeroUsize::new(config.mesh_cache_capacity).ok_or(ConfigError::InvalidValue {
            field: "mesh_cache_capacity",
            reason: "must be at least 1".to_string(),
        })?;
        let mesh_manager = MeshManager::new(capacity, world.culling(), config.render_distance);

        Ok(EngineState {
            world,
            mesh_manager,
            config,
            generation,
            frame_count: 0,
        })
    }

    /// The world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The world, for interaction.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The mesh cache.
    pub fn mesh_manager(&self) -> &MeshManager {
        &self.mesh_manager
    }

    /// The settings the engine was built from.
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Counters from terrain generation.
    pub fn generation_stats(&self) -> GenerationStats {
        self.generation
    }

    /// Runs one frame for a viewer at `eye`, drawing into `sink`.
    pub fn frame<D: DrawSink + ?Sized>(&mut self, eye: Point3<f32>, sink: &mut D) -> FrameReport {
        let start = Instant::now();
        self.frame_count += 1;

        let invalidated = self.mesh_manager.invalidate_dirty(self.world.grid_mut());
        let mesh = self.mesh_manager.draw_around(self.world.grid(), eye, sink);

        let report = FrameReport {
            frame: self.frame_count,
            invalidated,
            mesh,
            elapsed: start.elapsed(),
        };
        debug!("Frame {:?}", report);
        report
    }
}

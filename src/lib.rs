#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel World
//!
//! A block world engine: a bounded 3D grid of typed blocks, procedurally
//! generated terrain and trees, visibility culling, greedy chunk meshing and
//! ray-cast block interaction.
//!
//! ## Key Modules
//!
//! * `config` - JSON world settings
//! * `error` - Error types for configuration and world construction
//! * `engine_state` - The world, its rendering front end and block interaction
//!
//! ## Architecture
//!
//! One `World` owns the `BlockGrid`. Everything else borrows it:
//! * Terrain generation fills it once at creation
//! * Interaction mutates it through `break_block` and `place_block`
//! * Meshing reads it and caches a mesh per chunk until the chunk is edited
//! * A `DrawSink` receives whatever is drawn; no graphics API is driven here
//!
//! ## Usage
//!
//! ```rust
//! use voxel_world::{Block, BlockGrid, BlockType, World, WorldConfig};
//!
//! let config = WorldConfig { width: 32, height: 32, depth: 32, seed: Some(3), ..WorldConfig::default() };
//! let (world, _stats) = World::generate(&config).unwrap();
//! assert!(world.get(16, 0, 16).is_active());
//!
//! let mut grid = BlockGrid::new(4, 4, 4).unwrap();
//! grid.set(1, 2, 3, true, BlockType::SAND);
//! assert_eq!(grid.get(1, 2, 3), Block::new(BlockType::SAND));
//! ```

use cgmath::Point3;
use log::{error, info};

pub mod config;
pub mod engine_state;
pub mod error;

pub use config::{StorageKind, TerrainConfig, TreeConfig, WorldConfig};
pub use engine_state::{
    interaction::{break_block, place_block, Aabb, AgentVolume, PlaceOutcome},
    rendering::{
        culling::CullingPolicy,
        meshing::{Mesh, MeshManager},
        renderer::{DrawSink, DrawStats},
        Vertex,
    },
    voxels::{
        block::{block_side::BlockSide, block_type::BlockType, Block},
        grid::{BlockGrid, BlockStorage, DenseStorage, SparseStorage, WorldStorage},
        raycast::{Ray, RayHit},
        world::World,
    },
    EngineState, FrameReport,
};
pub use error::{ConfigError, WorldError};

/// Frames stepped by the driver when none are given.
pub const DEFAULT_FRAMES: u64 = 240;

/// Frames between two interactions of the driver's viewer.
const INTERACT_INTERVAL: u64 = 20;

/// Blocks the driver's viewer walks per frame.
const WALK_SPEED: f32 = 0.25;

/// Entry point of the headless driver.
///
/// Usage: `voxel-world [config.json] [frames]`
pub fn run() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => match WorldConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                error!("Could not load config {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => WorldConfig::default(),
    };
    let frames = match args.next().map(|frames| frames.parse::<u64>()) {
        Some(Ok(frames)) => frames,
        Some(Err(e)) => {
            error!("Invalid frame count: {}", e);
            std::process::exit(1);
        }
        None => DEFAULT_FRAMES,
    };

    if let Err(e) = run_with(config, frames) {
        error!("{}", e);
        std::process::exit(1);
    }
}

/// Builds a world and walks a viewer across it for `frames` frames.
///
/// Every few frames the viewer breaks the block in front of its feet and
/// places it back a little later.
///
/// # Returns
/// Everything drawn over the run.
pub fn run_with(config: WorldConfig, frames: u64) -> Result<DrawStats, WorldError> {
    let mut engine = EngineState::new(config)?;
    let generation = engine.generation_stats();
    info!(
        "World seed {}: {} columns, {} terrain blocks, {} trees",
        engine.world().seed(),
        generation.columns,
        generation.terrain_blocks,
        generation.trees
    );

    let volume = AgentVolume::default();
    let mut eye = engine.world().spawn_point(volume.eye_height);
    let mut heading = 1.0;
    let mut held: Option<BlockType> = None;
    let mut stats = DrawStats::default();

    for _ in 0..frames {
        (eye, heading) = walk(engine.world(), &volume, eye, heading);

        let report = engine.frame(eye, &mut stats);
        if report.frame % INTERACT_INTERVAL == 0 {
            let feet = eye.y - volume.eye_height;
            let ray = Ray::towards(eye, Point3::new(eye.x + 2.0 * heading, feet - 0.5, eye.z));
            held = match held {
                None => break_block(engine.world_mut(), &ray).map(|block| block.block_type()),
                Some(block_type) => match place_block(engine.world_mut(), &ray, eye, &volume, block_type) {
                    PlaceOutcome::Placed(_) => None,
                    _ => Some(block_type),
                },
            };
        }

        if report.frame % 60 == 0 {
            info!(
                "Frame {}: {} chunks drawn, {} meshed, {} cached, {:?}",
                report.frame,
                report.mesh.chunks_drawn,
                report.mesh.chunks_meshed,
                engine.mesh_manager().len(),
                report.elapsed
            );
        }
    }

    info!(
        "Drew {} chunk meshes ({} quads, {} indices) over {} frames",
        stats.chunks, stats.quads, stats.indices, frames
    );
    Ok(stats)
}

/// Moves the viewer one step along x, standing on whatever column it reaches.
///
/// Turns around at the world edge or when the next position would collide.
fn walk(world: &World, volume: &AgentVolume, eye: Point3<f32>, heading: f32) -> (Point3<f32>, f32) {
    let next_x = eye.x + WALK_SPEED * heading;
    let max_x = (world.grid().width() - 1) as f32;
    if !(0.0..=max_x).contains(&next_x) {
        return (eye, -heading);
    }

    // Stand on the highest column under the footprint.
    let z = eye.z.round() as i32;
    let ground = ((next_x - volume.radius).round() as i32..=(next_x + volume.radius).round() as i32)
        .filter_map(|x| world.surface_height(x, z))
        .max()
        .unwrap_or(-1);
    let next = Point3::new(next_x, ground as f32 + 0.5 + volume.eye_height, eye.z);

    // Refuse steps of more than one block.
    if next.y - eye.y > 1.0 + f32::EPSILON || volume.collides(world, next) {
        return (eye, -heading);
    }
    (next, heading)
}

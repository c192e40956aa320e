//! # Voxel Engine Core
//!
//! This module contains the voxel data model and everything that reads or
//! writes it directly.
//!
//! ## Architecture
//!
//! * **Block**: block types, faces and the material lookup
//! * **Grid**: the bounded 3D array of blocks and its storage backends
//! * **Chunk**: 16³ partitions of the grid, used for dirty tracking and meshing
//! * **Terrain**: one-shot noise-driven world population
//! * **Raycast**: nearest-block picking
//! * **World**: the owner of the grid, and the surface other systems use
//!
//! ## Data Flow
//!
//! 1. `World::generate` allocates the grid and runs the terrain generator
//! 2. Interaction mutates blocks through `World::set`
//! 3. Every write flags the affected chunks dirty
//! 4. The renderer drains dirty chunks and rebuilds their meshes

pub mod block;
pub mod chunk;
pub mod grid;
pub mod raycast;
pub mod terrain;
pub mod world;

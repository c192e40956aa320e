//! Mesh generation and manipulation for voxel rendering.
//!
//! This module provides the core functionality for converting voxel data into optimized
//! GPU-friendly mesh representations. It implements greedy meshing to reduce
//! the number of vertices and faces by combining coplanar faces with the same material.
//!
//! # Architecture
//! - [`Mesh`]: A chunk mesh, with separate vertex and index lists per block side
//! - [`Face`]: One merged quad with its corners, extent and material
//! - [`greedy_sided`]: Greedy meshing of selected sides of a chunk
//!
//! # Usage
//! ```
//! use cgmath::Point3;
//! use voxel_world::{BlockGrid, BlockType, CullingPolicy, Mesh};
//!
//! let mut grid = BlockGrid::new(16, 16, 16).unwrap();
//! grid.set(1, 1, 1, true, BlockType::STONE);
//! grid.set(2, 1, 1, true, BlockType::STONE);
//!
//! let mesh = Mesh::greedy(&grid, Point3::new(0, 0, 0), CullingPolicy::Opaque);
//! assert_eq!(mesh.face_count(), 6);
//! ```

mod face;
mod greedy;
mod mesh;

pub use face::Face;
pub use greedy::greedy_sided;
pub use mesh::*;

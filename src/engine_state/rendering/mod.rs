//! Rendering system for the voxel engine.
//!
//! This module decides what is drawn and in what form, but never draws itself:
//! - `culling`: Face exposure and block visibility tests
//! - `meshing`: Greedy chunk meshes and the LRU `MeshManager`
//! - `renderer`: The `DrawSink` seam a graphics backend implements
//! - `vertex`: The GPU vertex layout of mesh data

pub mod culling;
pub mod meshing;
pub mod renderer;
mod vertex;

// Re-export commonly used types
pub use meshing::MeshManager;
pub use vertex::Vertex;

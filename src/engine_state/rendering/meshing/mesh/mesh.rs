//! Mesh data structures and operations for voxel rendering.
//!
//! This module provides the core data structures for chunk meshes. It handles
//! the conversion from merged faces to GPU-friendly vertex and index buffers,
//! kept separately per block side so a renderer can skip back-facing sides.

use cgmath::Point3;

use crate::engine_state::{
    rendering::{culling::CullingPolicy, vertex::Vertex},
    voxels::{
        block::block_side::BlockSide,
        grid::{BlockGrid, BlockStorage},
    },
};

use super::{face::Face, greedy};

/// Represents a single side of a mesh with its associated vertices and indices.
///
/// Each `MeshSide` corresponds to one of the six possible block faces and contains
/// the vertex and index data needed to render that face.
#[derive(Debug, Clone, Default)]
pub struct MeshSide {
    /// The vertex data for this mesh side
    pub vertices: Vec<Vertex>,
    /// The index data for this mesh side
    pub indices: Vec<u32>,
}

impl MeshSide {
    /// Number of quads on this side.
    pub fn face_count(&self) -> usize {
        self.vertices.len() / 4
    }

    /// Whether this side has no geometry.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Represents a complete mesh for a voxel chunk with all six possible sides.
#[derive(Debug, Clone)]
pub struct Mesh {
    /// Chunk coordinates of the meshed chunk
    pub chunk: Point3<i32>,
    /// Array of mesh sides, indexed by `BlockSide` enum values.
    pub sides: [MeshSide; 6],
}

impl Mesh {
    /// Creates a new, empty mesh for the chunk at `chunk`.
    pub fn new(chunk: Point3<i32>) -> Self {
        Mesh {
            chunk,
            sides: Default::default(),
        }
    }

    /// Generates the mesh of one chunk using greedy meshing on all sides.
    ///
    /// # Arguments
    /// * `grid` - The grid holding the chunk
    /// * `chunk` - Chunk coordinates of the chunk to mesh
    /// * `policy` - Which neighbours hide a face
    pub fn greedy<S: BlockStorage>(grid: &BlockGrid<S>, chunk: Point3<i32>, policy: CullingPolicy) -> Self {
        greedy::greedy_sided(grid, chunk, policy, &BlockSide::all())
    }

    /// The geometry of one side.
    pub fn side(&self, side: BlockSide) -> &MeshSide {
        &self.sides[side as usize]
    }

    /// Appends a face to the side it belongs to.
    ///
    /// Indices are offset by the vertices already on that side and form two
    /// triangles, `[0, 1, 2]` and `[0, 2, 3]`, over the corners `ll, lr, ur, ul`.
    pub fn add_face(&mut self, face: &Face) {
        let mesh_side = &mut self.sides[face.block_side as usize];
        let base = mesh_side.vertices.len() as u32;
        let texture_index = face.block_type.texture_indices()[face.block_side as usize];

        mesh_side.vertices.extend(
            face.corners()
                .into_iter()
                .zip(face.tex_coords())
                .map(|(corner, uv)| Vertex::new(corner, uv, texture_index, face.block_side)),
        );
        mesh_side
            .indices
            .extend([0, 1, 2, 0, 2, 3].map(|offset| base + offset));
    }

    /// Total quads across all sides.
    pub fn face_count(&self) -> usize {
        self.sides.iter().map(MeshSide::face_count).sum()
    }

    /// Total vertices across all sides.
    pub fn vertex_count(&self) -> usize {
        self.sides.iter().map(|side| side.vertices.len()).sum()
    }

    /// Total indices across all sides.
    pub fn index_count(&self) -> usize {
        self.sides.iter().map(|side| side.indices.len()).sum()
    }

    /// Whether the mesh has no geometry at all.
    pub fn is_empty(&self) -> bool {
        self.sides.iter().all(MeshSide::is_empty)
    }

    /// Gets the number of vertices for each side of the mesh.
    ///
    /// # Returns
    /// An array containing the vertex count for each `BlockSide` in the order defined by the `BlockSide` enum.
    pub fn get_vertex_lens(&self) -> [u64; 6] {
        self.sides.each_ref().map(|side| side.vertices.len() as u64)
    }
}

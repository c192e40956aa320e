//! Greedy meshing implementation for voxel rendering.
//!
//! This module implements the greedy meshing algorithm which combines adjacent
//! coplanar faces with the same block type into larger quads, significantly
//! reducing the number of vertices and draw calls needed to render a chunk.
//!
//! Each side is processed slice by slice along its normal axis. A slice is
//! first flattened into a 16×16 mask of exposed face types, then the mask is
//! swept row by row: each unclaimed cell grows right as far as the type
//! matches, then up while every cell of the next row matches, and the covered
//! cells are claimed.

use cgmath::Point3;
use log::debug;
use web_time::Instant;

use crate::engine_state::{
    rendering::culling::{is_face_exposed, CullingPolicy},
    voxels::{
        block::{block_side::BlockSide, block_type::BlockType},
        chunk::{chunk_origin, CHUNK_DIMENSION},
        grid::{BlockGrid, BlockStorage},
    },
};

use super::{face::Face, mesh::Mesh};

/// Index into a slice mask.
#[inline]
fn mask_index(i: i32, j: i32) -> usize {
    (i + j * CHUNK_DIMENSION) as usize
}

/// World coordinates of cell `(i, j)` of slice `slice` for a side.
#[inline]
fn slice_cell(origin: Point3<i32>, axes: (usize, usize, usize), slice: i32, i: i32, j: i32) -> Point3<i32> {
    let (axis, u, v) = axes;
    let mut cell = origin;
    cell[axis] += slice;
    cell[u] += i;
    cell[v] += j;
    cell
}

/// Calls `emit` once per merged quad of a mask, clearing the mask as it goes.
fn merge_mask(
    mask: &mut [Option<BlockType>],
    extent_u: i32,
    extent_v: i32,
    mut emit: impl FnMut(i32, i32, u32, u32, BlockType),
) {
    for j in 0..extent_v {
        let mut i = 0;
        while i < extent_u {
            let Some(block_type) = mask[mask_index(i, j)] else {
                i += 1;
                continue;
            };

            let mut width = 1;
            while i + width < extent_u && mask[mask_index(i + width, j)] == Some(block_type) {
                width += 1;
            }

            let mut height = 1;
            'grow: while j + height < extent_v {
                for k in 0..width {
                    if mask[mask_index(i + k, j + height)] != Some(block_type) {
                        break 'grow;
                    }
                }
                height += 1;
            }

            for dv in 0..height {
                for du in 0..width {
                    mask[mask_index(i + du, j + dv)] = None;
                }
            }

            emit(i, j, width as u32, height as u32, block_type);
            i += width;
        }
    }
}

/// Generates a mesh for the specified sides of a chunk using greedy meshing.
///
/// # Arguments
/// * `grid` - The grid holding the chunk
/// * `chunk` - Chunk coordinates of the chunk to mesh
/// * `policy` - Which neighbours hide a face
/// * `sides` - A list of block sides to generate mesh data for
///
/// # Returns
/// A new `Mesh` containing the greedy-meshed geometry for the specified sides.
/// Faces on the chunk boundary are culled against the neighbouring chunk's
/// blocks, so adjacent chunk meshes never double up on a shared face.
pub fn greedy_sided<S: BlockStorage>(
    grid: &BlockGrid<S>,
    chunk: Point3<i32>,
    policy: CullingPolicy,
    sides: &[BlockSide],
) -> Mesh {
    let mut mesh = Mesh::new(chunk);
    if !grid.is_chunk_active(chunk) {
        return mesh;
    }

    let start = Instant::now();
    let origin = chunk_origin(chunk);
    let dimensions = grid.dimensions();
    let extent: [i32; 3] =
        std::array::from_fn(|axis| (origin[axis] + CHUNK_DIMENSION).min(dimensions[axis]) - origin[axis]);
    if extent.iter().any(|&e| e <= 0) {
        return mesh;
    }

    let mut mask = vec![None; (CHUNK_DIMENSION * CHUNK_DIMENSION) as usize];

    for &side in sides {
        let axis = side.axis();
        let (u, v) = Face::plane_axes(side);
        let axes = (axis, u, v);

        for slice in 0..extent[axis] {
            for j in 0..extent[v] {
                for i in 0..extent[u] {
                    let cell = slice_cell(origin, axes, slice, i, j);
                    mask[mask_index(i, j)] = is_face_exposed(grid, cell.x, cell.y, cell.z, side, policy)
                        .then(|| grid.get(cell.x, cell.y, cell.z).block_type());
                }
            }

            merge_mask(&mut mask, extent[u], extent[v], |i, j, width, height, block_type| {
                let cell = slice_cell(origin, axes, slice, i, j);
                mesh.add_face(&Face::new(cell, width, height, block_type, side));
            });
        }
    }

    debug!(
        "Meshed chunk ({}, {}, {}): {} quads in {:?}",
        chunk.x,
        chunk.y,
        chunk.z,
        mesh.face_count(),
        start.elapsed()
    );

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh_all(grid: &BlockGrid, chunk: Point3<i32>) -> Mesh {
        greedy_sided(grid, chunk, CullingPolicy::Opaque, &BlockSide::all())
    }

    #[test]
    fn single_block_is_six_quads() {
        let mut grid = BlockGrid::new(16, 16, 16).unwrap();
        grid.set(3, 3, 3, true, BlockType::STONE);
        let mesh = mesh_all(&grid, Point3::new(0, 0, 0));
        assert_eq!(mesh.face_count(), 6);
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.index_count(), 36);
        for side in BlockSide::all() {
            assert_eq!(mesh.side(side).face_count(), 1);
        }
    }

    #[test]
    fn solid_chunk_is_six_quads() {
        let mut grid = BlockGrid::new(16, 16, 16).unwrap();
        for x in 0..16 {
            for y in 0..16 {
                for z in 0..16 {
                    grid.set(x, y, z, true, BlockType::DIRT);
                }
            }
        }
        assert_eq!(mesh_all(&grid, Point3::new(0, 0, 0)).face_count(), 6);
    }

    #[test]
    fn different_types_do_not_merge() {
        let mut grid = BlockGrid::new(16, 16, 16).unwrap();
        grid.set(4, 4, 4, true, BlockType::STONE);
        grid.set(5, 4, 4, true, BlockType::SAND);
        assert_eq!(mesh_all(&grid, Point3::new(0, 0, 0)).face_count(), 10);

        grid.set(5, 4, 4, true, BlockType::STONE);
        assert_eq!(mesh_all(&grid, Point3::new(0, 0, 0)).face_count(), 6);
    }

    #[test]
    fn faces_on_a_chunk_seam_are_culled_against_the_neighbour() {
        let mut grid = BlockGrid::new(32, 16, 16).unwrap();
        grid.set(15, 2, 2, true, BlockType::STONE);
        grid.set(16, 2, 2, true, BlockType::STONE);

        let left = mesh_all(&grid, Point3::new(0, 0, 0));
        let right = mesh_all(&grid, Point3::new(1, 0, 0));
        assert_eq!(left.face_count(), 5);
        assert!(left.side(BlockSide::BACK).is_empty());
        assert_eq!(right.face_count(), 5);
        assert!(right.side(BlockSide::FRONT).is_empty());
    }

    #[test]
    fn empty_and_out_of_range_chunks_have_no_geometry() {
        let grid = BlockGrid::new(16, 16, 16).unwrap();
        assert!(mesh_all(&grid, Point3::new(0, 0, 0)).is_empty());
        assert!(mesh_all(&grid, Point3::new(4, 0, 0)).is_empty());
    }

    #[test]
    fn partial_chunks_at_the_grid_edge_are_meshed() {
        let mut grid = BlockGrid::new(20, 4, 20).unwrap();
        for x in 16..20 {
            for z in 16..20 {
                grid.set(x, 0, z, true, BlockType::GRASS);
            }
        }
        let mesh = mesh_all(&grid, Point3::new(1, 0, 1));
        assert_eq!(mesh.face_count(), 6);
        let top = &mesh.side(BlockSide::TOP).vertices;
        assert!(top.iter().all(|vertex| vertex.position[1] == 0.5));
    }

    #[test]
    fn transparent_policy_keeps_faces_under_leaves() {
        let mut grid = BlockGrid::new(16, 16, 16).unwrap();
        grid.set(2, 2, 2, true, BlockType::STONE);
        grid.set(2, 3, 2, true, BlockType::LEAVES);

        let opaque = mesh_all(&grid, Point3::new(0, 0, 0));
        let aware = greedy_sided(&grid, Point3::new(0, 0, 0), CullingPolicy::TransparentAware, &BlockSide::all());
        assert_eq!(opaque.face_count(), 10);
        assert_eq!(aware.face_count(), 11);
    }

    #[test]
    fn only_requested_sides_are_meshed() {
        let mut grid = BlockGrid::new(16, 16, 16).unwrap();
        grid.set(1, 1, 1, true, BlockType::WOOD);
        let mesh = greedy_sided(&grid, Point3::new(0, 0, 0), CullingPolicy::Opaque, &[BlockSide::TOP]);
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.side(BlockSide::TOP).vertices[0].texture_index, 5);
    }
}

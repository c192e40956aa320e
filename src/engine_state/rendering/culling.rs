//! Visibility culling.
//!
//! The renderer skips any block for which `is_block_visible` is `false`, and
//! the mesher emits a face only where `is_face_exposed` is `true`. Both sit on
//! top of `BlockGrid` reads and never allocate.
//!
//! Out-of-bounds neighbours read as air, so nothing on the outer shell of the
//! world is ever culled.

use serde::Deserialize;

use crate::engine_state::voxels::{
    block::{block_side::BlockSide, Block},
    grid::{BlockGrid, BlockStorage},
};

/// Which neighbours count as occluders.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CullingPolicy {
    /// Every active block occludes, leaves and water included. This is the
    /// `BlockGrid::is_hidden` rule.
    #[default]
    Opaque,
    /// Transparent blocks (leaves, water) only occlude blocks of their own
    /// type, so terrain under a canopy or below water still draws.
    TransparentAware,
}

impl CullingPolicy {
    /// Whether `neighbour` hides the face of `block` it touches.
    #[inline]
    pub fn occludes(self, block: Block, neighbour: Block) -> bool {
        if !neighbour.is_active() {
            return false;
        }
        match self {
            CullingPolicy::Opaque => true,
            CullingPolicy::TransparentAware => {
                !neighbour.block_type().is_transparent()
                    || neighbour.block_type() == block.block_type()
            }
        }
    }
}

/// Whether the `side` face of the block at `(x, y, z)` can be seen.
///
/// Air cells have no faces and always return `false`.
pub fn is_face_exposed<S: BlockStorage>(
    grid: &BlockGrid<S>,
    x: i32,
    y: i32,
    z: i32,
    side: BlockSide,
    policy: CullingPolicy,
) -> bool {
    let block = grid.get(x, y, z);
    if !block.is_active() {
        return false;
    }
    let offset = side.offset();
    let neighbour = grid.get(x + offset.x, y + offset.y, z + offset.z);
    !policy.occludes(block, neighbour)
}

/// Whether the block at `(x, y, z)` contributes anything to the frame.
///
/// Under `CullingPolicy::Opaque` this is exactly `active && !is_hidden`.
pub fn is_block_visible<S: BlockStorage>(
    grid: &BlockGrid<S>,
    x: i32,
    y: i32,
    z: i32,
    policy: CullingPolicy,
) -> bool {
    match policy {
        CullingPolicy::Opaque => grid.is_active(x, y, z) && !grid.is_hidden(x, y, z),
        CullingPolicy::TransparentAware => BlockSide::all()
            .into_iter()
            .any(|side| is_face_exposed(grid, x, y, z, side, policy)),
    }
}

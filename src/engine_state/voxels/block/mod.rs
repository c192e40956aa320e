//! # Block Module
//!
//! This module provides the core block-related functionality for the voxel engine.
//! It includes block type definitions, block face handling, and block data structures.

use block_type::BlockType;

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block types in memory.
/// This is the per-cell storage unit of every `BlockStorage`.
pub type BlockTypeSize = u8;

/// Represents a single voxel block in the world.
///
/// A block is a value: grids hand out copies, never references into storage.
///
/// # Invariant
/// `active` is `true` exactly when `block_type` is not `AIR`. The constructors
/// normalize their inputs, so an inactive non-air block or an active air block
/// cannot be built.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Block {
    active: bool,
    block_type: BlockType,
}

impl Block {
    /// The inactive air block returned for empty and out-of-bounds cells.
    pub const AIR: Block = Block {
        active: false,
        block_type: BlockType::AIR,
    };

    /// Creates a new block of the specified type. `AIR` yields an inactive block.
    pub fn new(block_type: BlockType) -> Self {
        Block {
            active: block_type != BlockType::AIR,
            block_type,
        }
    }

    /// Creates a block from the `(active, type)` pair used by `set` calls.
    ///
    /// An inactive request always produces air regardless of `block_type`, and
    /// an active request for `AIR` is treated as inactive.
    pub fn from_parts(active: bool, block_type: BlockType) -> Self {
        if active {
            Block::new(block_type)
        } else {
            Block::AIR
        }
    }

    /// Decodes a stored id. Unknown ids decode as `DIRT`.
    pub fn from_int(btype: BlockTypeSize) -> Self {
        Block::new(BlockType::get_block_type_from_int(btype))
    }

    /// Whether this cell holds a block.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The type of this block; `AIR` when inactive.
    pub fn block_type(&self) -> BlockType {
        self.block_type
    }

    /// The id this block is stored as.
    pub fn to_int(&self) -> BlockTypeSize {
        self.block_type as BlockTypeSize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_blocks_are_always_air() {
        for block_type in BlockType::ALL {
            assert_eq!(Block::from_parts(false, block_type), Block::AIR);
        }
    }

    #[test]
    fn active_air_is_normalized_to_inactive() {
        let block = Block::from_parts(true, BlockType::AIR);
        assert!(!block.is_active());
        assert_eq!(block, Block::AIR);
    }

    #[test]
    fn active_blocks_keep_their_type() {
        let block = Block::from_parts(true, BlockType::STONE);
        assert!(block.is_active());
        assert_eq!(block.block_type(), BlockType::STONE);
        assert_eq!(Block::from_int(block.to_int()), block);
    }
}

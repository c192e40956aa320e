//! # Block Type Module
//!
//! This module defines the different types of blocks in the voxel world.
//! It provides conversion from the compact storage id, name lookup for
//! configuration files, and the material (texture) lookup used by renderers.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use super::BlockTypeSize;

/// Enumerates all possible block types in the voxel world.
///
/// The discriminant is the id stored in the grid, so the order here is part of
/// the storage format. `AIR` must stay at zero: a zeroed grid is an empty world.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, FromPrimitive)]
#[repr(u8)]
pub enum BlockType {
    /// Empty space. The only type an inactive block may carry.
    #[default]
    AIR = 0,

    /// Plain dirt, found between the grass layer and stone.
    DIRT,

    /// Surface block of columns above sea level.
    GRASS,

    /// Deep terrain, more than three cells below the surface.
    STONE,

    /// Tree trunks.
    WOOD,

    /// Surface block of columns at or below sea level.
    SAND,

    /// Tree canopy.
    LEAVES,

    /// Passable liquid block.
    WATER,
}

/// Lookup from configuration names to block types.
static BLOCK_TYPE_NAMES: phf::Map<&'static str, BlockType> = phf::phf_map! {
    "air" => BlockType::AIR,
    "dirt" => BlockType::DIRT,
    "grass" => BlockType::GRASS,
    "stone" => BlockType::STONE,
    "wood" => BlockType::WOOD,
    "sand" => BlockType::SAND,
    "leaves" => BlockType::LEAVES,
    "water" => BlockType::WATER,
};

/// Texture indices for each face, indexed by `BlockType as usize`.
///
/// Face order follows `BlockSide`: [Front, Back, Bottom, Top, Left, Right].
static BLOCK_TYPE_TO_TEXTURE_INDICES: [[usize; 6]; 8] = [
    [1, 1, 1, 1, 1, 1], // AIR (never drawn, mirrors DIRT)
    [1, 1, 1, 1, 1, 1], // DIRT
    [2, 2, 1, 3, 2, 2], // GRASS (top: 3, bottom: 1, sides: 2)
    [4, 4, 4, 4, 4, 4], // STONE
    [0, 0, 5, 5, 0, 0], // WOOD (rings on top and bottom)
    [6, 6, 6, 6, 6, 6], // SAND
    [7, 7, 7, 7, 7, 7], // LEAVES
    [8, 8, 8, 8, 8, 8], // WATER
];

impl BlockType {
    /// Every block type, in storage id order.
    pub const ALL: [BlockType; 8] = [
        BlockType::AIR,
        BlockType::DIRT,
        BlockType::GRASS,
        BlockType::STONE,
        BlockType::WOOD,
        BlockType::SAND,
        BlockType::LEAVES,
        BlockType::WATER,
    ];

    /// Converts a stored id back into a `BlockType`.
    ///
    /// Ids outside the known range decode as `DIRT` rather than failing, so a
    /// grid written by a build with more block types still renders.
    pub fn get_block_type_from_int(btype: BlockTypeSize) -> Self {
        BlockType::from_u8(btype).unwrap_or(BlockType::DIRT)
    }

    /// Looks up a block type by its lowercase configuration name.
    pub fn from_name(name: &str) -> Option<Self> {
        BLOCK_TYPE_NAMES.get(name).copied()
    }

    /// The lowercase configuration name of this type.
    pub fn name(self) -> &'static str {
        match self {
            BlockType::AIR => "air",
            BlockType::DIRT => "dirt",
            BlockType::GRASS => "grass",
            BlockType::STONE => "stone",
            BlockType::WOOD => "wood",
            BlockType::SAND => "sand",
            BlockType::LEAVES => "leaves",
            BlockType::WATER => "water",
        }
    }

    /// Returns `true` for types that light passes through.
    ///
    /// Only consulted by `CullingPolicy::TransparentAware`.
    pub fn is_transparent(self) -> bool {
        matches!(self, BlockType::AIR | BlockType::LEAVES | BlockType::WATER)
    }

    /// Gets the texture indices for all six faces of this type.
    pub fn texture_indices(self) -> [usize; 6] {
        BLOCK_TYPE_TO_TEXTURE_INDICES[self as usize]
    }

    /// Gets the texture indices for a raw stored id, falling back to `DIRT`
    /// for ids that don't name a block type.
    pub fn texture_indices_from_int(btype: BlockTypeSize) -> [usize; 6] {
        Self::get_block_type_from_int(btype).texture_indices()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_ids_fall_back_to_dirt() {
        assert_eq!(BlockType::get_block_type_from_int(200), BlockType::DIRT);
        assert_eq!(
            BlockType::texture_indices_from_int(42),
            BlockType::DIRT.texture_indices()
        );
    }

    #[test]
    fn known_ids_decode_to_themselves() {
        for block_type in BlockType::ALL {
            assert_eq!(
                BlockType::get_block_type_from_int(block_type as BlockTypeSize),
                block_type
            );
        }
    }

    #[test]
    fn names_resolve_both_ways() {
        for block_type in BlockType::ALL {
            assert_eq!(BlockType::from_name(block_type.name()), Some(block_type));
        }
        assert_eq!(BlockType::from_name("obsidian"), None);
    }
}

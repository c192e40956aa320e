//! # Block Side Module
//!
//! This module defines the different faces/sides of a voxel block.
//! It provides the face normals used by ray casting, culling and meshing.

use cgmath::Vector3;

/// Represents the six possible faces of a voxel block.
///
/// Each variant is assigned a unique integer value used to index per-side
/// arrays (texture indices, mesh sides).
///
/// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The front face (facing negative X)
    FRONT = 0,

    /// The back face (facing positive X)
    BACK = 1,

    /// The bottom face (facing negative Y)
    BOTTOM = 2,

    /// The top face (facing positive Y)
    TOP = 3,

    /// The left face (facing negative Z)
    LEFT = 4,

    /// The right face (facing positive Z)
    RIGHT = 5,
}

impl BlockSide {
    /// Returns an array containing all six block faces in a consistent order.
    ///
    /// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::BOTTOM,
            BlockSide::TOP,
            BlockSide::LEFT,
            BlockSide::RIGHT,
        ]
    }

    /// The outward unit normal of this face as integer grid offsets.
    pub fn offset(self) -> Vector3<i32> {
        match self {
            BlockSide::FRONT => Vector3::new(-1, 0, 0),
            BlockSide::BACK => Vector3::new(1, 0, 0),
            BlockSide::BOTTOM => Vector3::new(0, -1, 0),
            BlockSide::TOP => Vector3::new(0, 1, 0),
            BlockSide::LEFT => Vector3::new(0, 0, -1),
            BlockSide::RIGHT => Vector3::new(0, 0, 1),
        }
    }

    /// The outward unit normal of this face.
    pub fn normal(self) -> Vector3<f32> {
        let offset = self.offset();
        Vector3::new(offset.x as f32, offset.y as f32, offset.z as f32)
    }

    /// The axis (0 = x, 1 = y, 2 = z) this face is perpendicular to.
    pub fn axis(self) -> usize {
        match self {
            BlockSide::FRONT | BlockSide::BACK => 0,
            BlockSide::BOTTOM | BlockSide::TOP => 1,
            BlockSide::LEFT | BlockSide::RIGHT => 2,
        }
    }

    /// Whether the outward normal points along the positive axis.
    pub fn is_positive(self) -> bool {
        matches!(self, BlockSide::BACK | BlockSide::TOP | BlockSide::RIGHT)
    }

    /// Builds the side facing along `axis`, in the positive or negative direction.
    pub fn from_axis(axis: usize, positive: bool) -> BlockSide {
        match (axis, positive) {
            (0, false) => BlockSide::FRONT,
            (0, true) => BlockSide::BACK,
            (1, false) => BlockSide::BOTTOM,
            (1, true) => BlockSide::TOP,
            (_, false) => BlockSide::LEFT,
            (_, true) => BlockSide::RIGHT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_round_trips_through_from_axis() {
        for side in BlockSide::all() {
            assert_eq!(BlockSide::from_axis(side.axis(), side.is_positive()), side);
        }
    }

    #[test]
    fn normals_are_unit_offsets_along_the_axis() {
        for side in BlockSide::all() {
            let offset = side.offset();
            let expected = if side.is_positive() { 1 } else { -1 };
            assert_eq!(offset[side.axis()], expected);
            assert_eq!(offset.x.abs() + offset.y.abs() + offset.z.abs(), 1);
            assert_eq!(side.normal()[side.axis()], expected as f32);
        }
    }
}

use cgmath::Point3;

use crate::engine_state::voxels::block::{block_side::BlockSide, block_type::BlockType};

/// A quad covering one or more coplanar block faces of the same type.
///
/// A face is defined by four corner points (lower-left, lower-right,
/// upper-right, upper-left) in world space, wound counter-clockwise when seen
/// from outside the block. "Right" runs along the side's first in-plane axis
/// and "up" along the second, with axes taken cyclically from the normal axis
/// (x → y, z; y → z, x; z → x, y).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// Lower-left corner
    pub ll: Point3<f32>,
    /// Lower-right corner
    pub lr: Point3<f32>,
    /// Upper-right corner
    pub ur: Point3<f32>,
    /// Upper-left corner
    pub ul: Point3<f32>,
    /// Extent in blocks along the first in-plane axis
    pub width: u32,
    /// Extent in blocks along the second in-plane axis
    pub height: u32,
    /// The block type, used for texture mapping
    pub block_type: BlockType,
    /// Which side of the block this face represents
    pub block_side: BlockSide,
}

impl Face {
    /// The two in-plane axes of faces on `side`.
    pub fn plane_axes(side: BlockSide) -> (usize, usize) {
        let axis = side.axis();
        ((axis + 1) % 3, (axis + 2) % 3)
    }

    /// Creates the quad whose lowest cell is the block at `cell`, spanning
    /// `width` cells along the first in-plane axis and `height` along the second.
    ///
    /// # Arguments
    /// * `cell` - World coordinates of the block in the quad's lower-left corner
    /// * `width` - Cells covered along the first in-plane axis
    /// * `height` - Cells covered along the second in-plane axis
    /// * `block_type` - The type of the blocks, used for texture mapping
    /// * `block_side` - Which side of the blocks this face represents
    pub fn new(cell: Point3<i32>, width: u32, height: u32, block_type: BlockType, block_side: BlockSide) -> Self {
        let axis = block_side.axis();
        let (u, v) = Self::plane_axes(block_side);
        let plane = cell[axis] as f32 + if block_side.is_positive() { 0.5 } else { -0.5 };

        let corner = |du: u32, dv: u32| {
            let mut point = Point3::new(0.0, 0.0, 0.0);
            point[axis] = plane;
            point[u] = cell[u] as f32 - 0.5 + du as f32;
            point[v] = cell[v] as f32 - 0.5 + dv as f32;
            point
        };

        // u × v points along the positive axis, so negative sides swap the
        // in-plane order to stay counter-clockwise from outside.
        let (lr, ul) = if block_side.is_positive() {
            (corner(width, 0), corner(0, height))
        } else {
            (corner(0, height), corner(width, 0))
        };

        Face {
            ll: corner(0, 0),
            lr,
            ur: corner(width, height),
            ul,
            width,
            height,
            block_type,
            block_side,
        }
    }

    /// The corners in drawing order.
    pub fn corners(&self) -> [Point3<f32>; 4] {
        [self.ll, self.lr, self.ur, self.ul]
    }

    /// Texture coordinates of `corners()`, in blocks.
    pub fn tex_coords(&self) -> [[f32; 2]; 4] {
        let (w, h) = (self.width as f32, self.height as f32);
        if self.block_side.is_positive() {
            [[0.0, 0.0], [w, 0.0], [w, h], [0.0, h]]
        } else {
            [[0.0, 0.0], [0.0, h], [w, h], [w, 0.0]]
        }
    }

    /// Number of block faces this quad stands in for.
    pub fn area(&self) -> u32 {
        self.width * self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Vector3};

    fn winding_normal(face: &Face) -> Vector3<f32> {
        (face.lr - face.ll).cross(face.ur - face.ll).normalize()
    }

    #[test]
    fn corners_wind_counter_clockwise_from_outside() {
        for side in BlockSide::all() {
            let face = Face::new(Point3::new(3, 4, 5), 2, 3, BlockType::STONE, side);
            let normal = winding_normal(&face);
            assert!((normal - side.normal()).magnitude() < 1e-6, "{side:?}");
        }
    }

    #[test]
    fn faces_sit_on_the_block_boundary() {
        let top = Face::new(Point3::new(0, 0, 0), 1, 1, BlockType::GRASS, BlockSide::TOP);
        assert!(top.corners().iter().all(|corner| corner.y == 0.5));
        let left = Face::new(Point3::new(0, 0, 0), 1, 1, BlockType::GRASS, BlockSide::LEFT);
        assert!(left.corners().iter().all(|corner| corner.z == -0.5));
    }

    #[test]
    fn merged_faces_span_their_extent() {
        let face = Face::new(Point3::new(0, 0, 0), 4, 2, BlockType::DIRT, BlockSide::BACK);
        // BACK is perpendicular to x, so width runs along y and height along z.
        assert_eq!(face.ll, Point3::new(0.5, -0.5, -0.5));
        assert_eq!(face.ur, Point3::new(0.5, 3.5, 1.5));
        assert_eq!(face.area(), 8);
    }
}

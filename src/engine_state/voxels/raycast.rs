//! # Ray Casting
//!
//! Finds the nearest active block hit by a ray, and the face it was hit on.
//!
//! The search is limited to a cubic window around the ray origin, clamped to
//! the grid. The window is the interaction range: a block outside it is never
//! reported even if the ray would reach it. Within the window every active
//! block's unit cube (centred on its integer coordinate) is slab-tested.
//!
//! Ties are resolved by scan order (x, then y, then z ascending, keeping the
//! first hit at the minimum distance), so results are deterministic when a
//! ray grazes a shared edge or corner.

use cgmath::{InnerSpace, Point3, Vector3};

use super::{
    block::block_side::BlockSide,
    grid::{BlockGrid, BlockStorage},
};

/// A half-line from `origin` along `direction`.
///
/// `direction` does not have to be normalized, but `RayHit::distance` is only
/// a world distance when it is measured along a unit direction; see
/// `cast_ray`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    /// Start of the ray, in world space.
    pub origin: Point3<f32>,
    /// Direction of travel.
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Creates a ray.
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Ray { origin, direction }
    }

    /// The ray from `origin` towards `target`, like a camera looking at a point.
    pub fn towards(origin: Point3<f32>, target: Point3<f32>) -> Self {
        Ray {
            origin,
            direction: target - origin,
        }
    }

    /// The point at parameter `t` along the ray.
    pub fn at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }
}

/// Result of a ray query. Built fresh per query.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayHit {
    /// Whether any block was hit. The other fields are meaningless when `false`.
    pub hit: bool,
    /// Grid coordinates of the block hit.
    pub block: Point3<i32>,
    /// World-space point where the ray entered the block.
    pub position: Point3<f32>,
    /// Outward unit normal of the face that was hit.
    pub normal: Vector3<f32>,
    /// Distance from the ray origin to `position`.
    pub distance: f32,
}

impl RayHit {
    /// The "no hit" result.
    pub const MISS: RayHit = RayHit {
        hit: false,
        block: Point3::new(0, 0, 0),
        position: Point3::new(0.0, 0.0, 0.0),
        normal: Vector3::new(0.0, 0.0, 0.0),
        distance: f32::INFINITY,
    };

    /// The face that was hit, if any.
    pub fn side(&self) -> Option<BlockSide> {
        if !self.hit {
            return None;
        }
        let axis = (0..3).find(|&axis| self.normal[axis] != 0.0)?;
        Some(BlockSide::from_axis(axis, self.normal[axis] > 0.0))
    }

    /// The cell touching the hit face: `block + round(normal)`.
    ///
    /// This is where a placed block goes.
    pub fn adjacent(&self) -> Point3<i32> {
        Point3::new(
            self.block.x + self.normal.x.round() as i32,
            self.block.y + self.normal.y.round() as i32,
            self.block.z + self.normal.z.round() as i32,
        )
    }

    /// World-space centre of the block hit.
    pub fn block_center(&self) -> Point3<f32> {
        Point3::new(self.block.x as f32, self.block.y as f32, self.block.z as f32)
    }
}

/// Slab test of a ray against the unit cube centred on `center`.
///
/// Returns the entry parameter `t` and the outward normal of the entry face.
/// A ray starting inside the cube enters at `t = 0` through the face opposing
/// its dominant axis.
pub fn intersect_unit_cube(ray: &Ray, center: Point3<f32>) -> Option<(f32, Vector3<f32>)> {
    let mut t_near = f32::NEG_INFINITY;
    let mut t_far = f32::INFINITY;
    let mut near_side = None;

    for axis in 0..3 {
        let origin = ray.origin[axis];
        let direction = ray.direction[axis];
        let min = center[axis] - 0.5;
        let max = center[axis] + 0.5;

        if direction == 0.0 {
            if origin < min || origin > max {
                return None;
            }
            continue;
        }

        let t_min = (min - origin) / direction;
        let t_max = (max - origin) / direction;
        let (entry, exit) = if direction > 0.0 { (t_min, t_max) } else { (t_max, t_min) };

        if entry > t_near {
            t_near = entry;
            // Entering through the min face when moving forward along the axis.
            near_side = Some(BlockSide::from_axis(axis, direction < 0.0));
        }
        t_far = t_far.min(exit);
    }

    if t_near > t_far || t_far < 0.0 {
        return None;
    }

    if t_near < 0.0 {
        let direction = ray.direction;
        let dominant = (0..3)
            .max_by(|&a, &b| direction[a].abs().total_cmp(&direction[b].abs()))
            .unwrap_or(0);
        let side = BlockSide::from_axis(dominant, direction[dominant] < 0.0);
        return Some((0.0, side.normal()));
    }

    near_side.map(|side| (t_near, side.normal()))
}

/// Casts `ray` against the active blocks within `radius` cells of its origin.
///
/// `distance` is `t * |direction|`, the world distance to the entry point.
pub fn cast_ray<S: BlockStorage>(grid: &BlockGrid<S>, ray: &Ray, radius: i32) -> RayHit {
    let direction_length = ray.direction.magnitude();
    if direction_length == 0.0 || !direction_length.is_finite() {
        return RayHit::MISS;
    }
    let origin = ray.origin;
    if !(origin.x.is_finite() && origin.y.is_finite() && origin.z.is_finite()) {
        return RayHit::MISS;
    }

    let [width, height, depth] = grid.dimensions();
    let cell = |v: f32| (v + 0.5).floor() as i32;
    let (cx, cy, cz) = (cell(origin.x), cell(origin.y), cell(origin.z));

    let min_x = cx.saturating_sub(radius).max(0);
    let max_x = cx.saturating_add(radius).min(width - 1);
    let min_y = cy.saturating_sub(radius).max(0);
    let max_y = cy.saturating_add(radius).min(height - 1);
    let min_z = cz.saturating_sub(radius).max(0);
    let max_z = cz.saturating_add(radius).min(depth - 1);

    let mut closest = RayHit::MISS;

    for x in min_x..=max_x {
        for y in min_y..=max_y {
            for z in min_z..=max_z {
                if !grid.is_active(x, y, z) {
                    continue;
                }

                let center = Point3::new(x as f32, y as f32, z as f32);
                let Some((t, normal)) = intersect_unit_cube(ray, center) else {
                    continue;
                };

                let distance = t * direction_length;
                if distance < closest.distance {
                    closest = RayHit {
                        hit: true,
                        block: Point3::new(x, y, z),
                        position: ray.at(t),
                        normal,
                        distance,
                    };
                }
            }
        }
    }

    closest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;

    fn assert_close(actual: f32, expected: f32) {
        assert!((actual - expected).abs() < 1e-5, "{actual} != {expected}");
    }

    fn grid_with_stone_at(x: i32, y: i32, z: i32) -> BlockGrid {
        let mut grid = BlockGrid::new(32, 32, 32).unwrap();
        grid.set(x, y, z, true, BlockType::STONE);
        grid
    }

    #[test]
    fn hits_the_near_face_along_positive_z() {
        let grid = grid_with_stone_at(5, 5, 5);
        let ray = Ray::new(Point3::new(5.0, 5.0, 0.0), Vector3::new(0.0, 0.0, 1.0));
        let hit = cast_ray(&grid, &ray, 10);

        assert!(hit.hit);
        assert_eq!(hit.block, Point3::new(5, 5, 5));
        assert_eq!(hit.normal, Vector3::new(0.0, 0.0, -1.0));
        assert_close(hit.distance, 4.5);
        assert_close(hit.position.z, 4.5);
        assert_eq!(hit.side(), Some(BlockSide::LEFT));
        assert_eq!(hit.adjacent(), Point3::new(5, 5, 4));
    }

    #[test]
    fn pointing_away_misses() {
        let grid = grid_with_stone_at(5, 5, 5);
        let ray = Ray::new(Point3::new(20.0, 20.0, 20.0), Vector3::new(1.0, 1.0, 1.0).normalize());
        let hit = cast_ray(&grid, &ray, 10);
        assert!(!hit.hit);
        assert_eq!(hit.side(), None);
    }

    #[test]
    fn blocks_outside_the_window_are_out_of_range() {
        let grid = grid_with_stone_at(5, 5, 25);
        let ray = Ray::new(Point3::new(5.0, 5.0, 0.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(!cast_ray(&grid, &ray, 10).hit);
        assert!(cast_ray(&grid, &ray, 30).hit);
    }

    #[test]
    fn reports_the_nearest_of_several_blocks() {
        let mut grid = grid_with_stone_at(5, 5, 8);
        grid.set(5, 5, 6, true, BlockType::DIRT);
        let ray = Ray::new(Point3::new(5.0, 5.0, 0.0), Vector3::new(0.0, 0.0, 1.0));
        let hit = cast_ray(&grid, &ray, 10);
        assert_eq!(hit.block, Point3::new(5, 5, 6));
        assert_close(hit.distance, 5.5);
    }

    #[test]
    fn normals_face_back_towards_the_origin() {
        let grid = grid_with_stone_at(10, 10, 10);
        let cases = [
            (Point3::new(4.0, 10.0, 10.0), Vector3::new(1.0, 0.0, 0.0), BlockSide::FRONT),
            (Point3::new(16.0, 10.0, 10.0), Vector3::new(-1.0, 0.0, 0.0), BlockSide::BACK),
            (Point3::new(10.0, 3.0, 10.0), Vector3::new(0.0, 1.0, 0.0), BlockSide::BOTTOM),
            (Point3::new(10.0, 17.0, 10.0), Vector3::new(0.0, -1.0, 0.0), BlockSide::TOP),
            (Point3::new(10.0, 10.0, 19.0), Vector3::new(0.0, 0.0, -1.0), BlockSide::RIGHT),
        ];
        for (origin, direction, side) in cases {
            let hit = cast_ray(&grid, &Ray::new(origin, direction), 10);
            assert!(hit.hit, "{side:?}");
            assert_eq!(hit.side(), Some(side));
            assert_eq!(hit.normal, side.normal());
        }
    }

    #[test]
    fn distance_scales_with_direction_length() {
        let grid = grid_with_stone_at(5, 5, 5);
        let ray = Ray::towards(Point3::new(5.0, 5.0, 0.0), Point3::new(5.0, 5.0, 2.0));
        let hit = cast_ray(&grid, &ray, 10);
        assert_close(hit.distance, 4.5);
        assert_close(hit.position.z, 4.5);
    }

    #[test]
    fn degenerate_rays_miss() {
        let grid = grid_with_stone_at(5, 5, 5);
        let still = Ray::new(Point3::new(5.0, 5.0, 4.0), Vector3::new(0.0, 0.0, 0.0));
        let nan = Ray::new(Point3::new(5.0, 5.0, 4.0), Vector3::new(f32::NAN, 0.0, 1.0));
        assert!(!cast_ray(&grid, &still, 10).hit);
        assert!(!cast_ray(&grid, &nan, 10).hit);
    }

    #[test]
    fn origin_inside_a_block_hits_it_at_zero() {
        let grid = grid_with_stone_at(5, 5, 5);
        let ray = Ray::new(Point3::new(5.1, 5.0, 5.2), Vector3::new(0.0, 0.0, 1.0));
        let hit = cast_ray(&grid, &ray, 10);
        assert_eq!(hit.block, Point3::new(5, 5, 5));
        assert_close(hit.distance, 0.0);
        assert_eq!(hit.normal, Vector3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn edge_ties_go_to_the_lowest_coordinate() {
        // The ray runs exactly along the shared edge of (5,5,5) and (6,5,5).
        let mut grid = grid_with_stone_at(5, 5, 5);
        grid.set(6, 5, 5, true, BlockType::DIRT);
        let ray = Ray::new(Point3::new(5.5, 5.0, 0.0), Vector3::new(0.0, 0.0, 1.0));
        let hit = cast_ray(&grid, &ray, 10);
        assert_eq!(hit.block, Point3::new(5, 5, 5));
    }

    #[test]
    fn window_is_clamped_at_the_grid_edge() {
        let grid = grid_with_stone_at(0, 0, 3);
        let ray = Ray::new(Point3::new(-2.0, 0.0, 3.0), Vector3::new(1.0, 0.0, 0.0));
        let hit = cast_ray(&grid, &ray, 10);
        assert!(hit.hit);
        assert_close(hit.distance, 1.5);
        assert_eq!(hit.adjacent(), Point3::new(-1, 0, 3));
    }
}

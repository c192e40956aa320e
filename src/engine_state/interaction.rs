//! # Block Interaction
//!
//! Breaking and placing blocks along a view ray, plus the axis-aligned boxes
//! used to keep a placed block out of the agent's body.
//!
//! Every block occupies the unit box centred on its integer coordinate,
//! `[c - 0.5, c + 0.5]` on each axis. Ray casting, placement and movement
//! collision all share that convention.

use cgmath::{Point3, Vector3};
use log::debug;

use super::voxels::{
    block::{block_type::BlockType, Block},
    raycast::{Ray, RayHit},
    world::World,
};

/// An axis-aligned bounding box.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Point3<f32>,
    /// Maximum corner.
    pub max: Point3<f32>,
}

impl Aabb {
    /// Creates a box from its corners.
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Aabb { min, max }
    }

    /// The unit box of the block at `(x, y, z)`.
    pub fn for_block(x: i32, y: i32, z: i32) -> Self {
        let center = Point3::new(x as f32, y as f32, z as f32);
        let half = Vector3::new(0.5, 0.5, 0.5);
        Aabb {
            min: center - half,
            max: center + half,
        }
    }

    /// Whether the interiors overlap. Boxes that only touch do not intersect.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// The box shrunk by `amount` on every side.
    pub fn shrink(&self, amount: f32) -> Self {
        let inset = Vector3::new(amount, amount, amount);
        Aabb {
            min: self.min + inset,
            max: self.max - inset,
        }
    }
}

/// The agent's collision volume relative to its eye position.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AgentVolume {
    /// Half width on x and z.
    pub radius: f32,
    /// Distance from the eye down to the feet.
    pub eye_height: f32,
    /// Distance from the eye up to the top of the head.
    pub head_clearance: f32,
    /// Inset applied when testing movement against the world.
    pub padding: f32,
}

impl Default for AgentVolume {
    fn default() -> Self {
        AgentVolume {
            radius: 0.3,
            eye_height: 1.5,
            head_clearance: 0.3,
            padding: 0.05,
        }
    }
}

impl AgentVolume {
    /// The volume's box for an agent whose eye is at `eye`.
    pub fn aabb_at(&self, eye: Point3<f32>) -> Aabb {
        Aabb {
            min: Point3::new(eye.x - self.radius, eye.y - self.eye_height, eye.z - self.radius),
            max: Point3::new(eye.x + self.radius, eye.y + self.head_clearance, eye.z + self.radius),
        }
    }

    /// Whether an agent with its eye at `eye` would be inside solid blocks.
    pub fn collides(&self, world: &World, eye: Point3<f32>) -> bool {
        world.collides(&self.aabb_at(eye).shrink(self.padding))
    }
}

/// What happened to a place request.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlaceOutcome {
    /// The block was written at the given cell.
    Placed(Point3<i32>),
    /// The ray hit nothing in range.
    NoTarget,
    /// The target cell overlaps the agent.
    Obstructed,
    /// The target cell already holds a block.
    Occupied,
    /// The target cell lies outside the grid.
    OutOfBounds,
    /// The selected type is air.
    NothingToPlace,
}

/// The cell a block would be placed into for `hit`, if there was a hit.
pub fn place_target(hit: &RayHit) -> Option<Point3<i32>> {
    hit.hit.then(|| hit.adjacent())
}

/// Removes the block the ray points at and returns it.
pub fn break_block(world: &mut World, ray: &Ray) -> Option<Block> {
    let hit = world.raycast(ray);
    if !hit.hit {
        return None;
    }

    let (x, y, z) = (hit.block.x, hit.block.y, hit.block.z);
    let block = world.get(x, y, z);
    if !block.is_active() {
        return None;
    }

    world.set(x, y, z, false, BlockType::AIR);
    debug!("Broke {} at ({}, {}, {})", block.block_type().name(), x, y, z);
    Some(block)
}

/// Places `block_type` against the face the ray points at.
///
/// # Arguments
/// * `world` - The world to modify
/// * `ray` - The view ray
/// * `eye` - Eye position of the placing agent
/// * `volume` - The agent's collision volume
/// * `block_type` - The type to place
pub fn place_block(
    world: &mut World,
    ray: &Ray,
    eye: Point3<f32>,
    volume: &AgentVolume,
    block_type: BlockType,
) -> PlaceOutcome {
    if block_type == BlockType::AIR {
        return PlaceOutcome::NothingToPlace;
    }

    let Some(target) = place_target(&world.raycast(ray)) else {
        return PlaceOutcome::NoTarget;
    };

    if !world.grid().in_bounds(target.x, target.y, target.z) {
        return PlaceOutcome::OutOfBounds;
    }
    if world.is_active(target.x, target.y, target.z) {
        return PlaceOutcome::Occupied;
    }
    if Aabb::for_block(target.x, target.y, target.z).intersects(&volume.aabb_at(eye)) {
        return PlaceOutcome::Obstructed;
    }

    world.set(target.x, target.y, target.z, true, block_type);
    debug!(
        "Placed {} at ({}, {}, {})",
        block_type.name(),
        target.x,
        target.y,
        target.z
    );
    PlaceOutcome::Placed(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;

    fn flat_world() -> World {
        let config = WorldConfig {
            width: 32,
            height: 32,
            depth: 32,
            ..WorldConfig::default()
        };
        let mut world = World::empty(&config).unwrap();
        for x in 0..32 {
            for z in 0..32 {
                world.set(x, 0, z, true, BlockType::STONE);
            }
        }
        world
    }

    fn looking_down(eye: Point3<f32>) -> Ray {
        Ray::new(eye, Vector3::new(0.0, -1.0, 0.0))
    }

    #[test]
    fn touching_boxes_do_not_intersect() {
        let a = Aabb::for_block(0, 0, 0);
        assert!(!a.intersects(&Aabb::for_block(1, 0, 0)));
        assert!(a.intersects(&Aabb::new(Point3::new(0.4, -0.1, -0.1), Point3::new(2.0, 0.1, 0.1))));
    }

    #[test]
    fn agent_box_spans_feet_to_head() {
        let aabb = AgentVolume::default().aabb_at(Point3::new(10.0, 5.0, 10.0));
        let expected = [(aabb.min, [9.7, 3.5, 9.7]), (aabb.max, [10.3, 5.3, 10.3])];
        for (corner, coords) in expected {
            for axis in 0..3 {
                assert!((corner[axis] - coords[axis]).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn break_removes_the_hit_block() {
        let mut world = flat_world();
        let removed = break_block(&mut world, &looking_down(Point3::new(4.0, 3.0, 4.0)));
        assert_eq!(removed, Some(Block::new(BlockType::STONE)));
        assert_eq!(world.get(4, 0, 4), Block::AIR);
    }

    #[test]
    fn break_with_nothing_in_range_changes_nothing() {
        let mut world = flat_world();
        let ray = Ray::new(Point3::new(4.0, 3.0, 4.0), Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(break_block(&mut world, &ray), None);
        assert!(world.is_active(4, 0, 4));
    }

    #[test]
    fn placement_overlapping_the_agent_is_rejected() {
        let mut world = flat_world();
        // Feet sit exactly on the floor's top face; the target cell (4,1,4) is inside the body.
        let eye = Point3::new(4.0, 2.0, 4.0);
        let outcome = place_block(
            &mut world,
            &looking_down(eye),
            eye,
            &AgentVolume::default(),
            BlockType::DIRT,
        );
        assert_eq!(outcome, PlaceOutcome::Obstructed);
        assert_eq!(world.get(4, 1, 4), Block::AIR);
    }

    #[test]
    fn placement_against_a_face_writes_the_adjacent_cell() {
        let mut world = flat_world();
        let eye = Point3::new(4.0, 2.0, 4.0);
        let ray = Ray::towards(eye, Point3::new(7.0, 0.0, 4.0));
        let outcome = place_block(&mut world, &ray, eye, &AgentVolume::default(), BlockType::WOOD);

        assert_eq!(outcome, PlaceOutcome::Placed(Point3::new(6, 1, 4)));
        assert_eq!(world.get(6, 1, 4), Block::new(BlockType::WOOD));

        let again = place_block(&mut world, &ray, eye, &AgentVolume::default(), BlockType::WOOD);
        assert_eq!(again, PlaceOutcome::Placed(Point3::new(5, 1, 4)));
    }

    #[test]
    fn placing_air_or_at_nothing_is_refused() {
        let mut world = flat_world();
        let eye = Point3::new(4.0, 20.0, 4.0);
        let volume = AgentVolume::default();
        assert_eq!(
            place_block(&mut world, &looking_down(eye), eye, &volume, BlockType::AIR),
            PlaceOutcome::NothingToPlace
        );
        assert_eq!(
            place_block(&mut world, &looking_down(eye), eye, &volume, BlockType::DIRT),
            PlaceOutcome::NoTarget
        );
    }

    #[test]
    fn placement_outside_the_grid_is_refused() {
        let mut world = flat_world();
        let eye = Point3::new(-3.0, 0.0, 4.0);
        let ray = Ray::new(eye, Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(
            place_block(&mut world, &ray, eye, &AgentVolume::default(), BlockType::SAND),
            PlaceOutcome::OutOfBounds
        );
    }

    #[test]
    fn agent_collides_with_solid_but_not_passable_blocks() {
        let mut world = flat_world();
        let volume = AgentVolume::default();
        assert!(!volume.collides(&world, Point3::new(4.0, 2.0, 4.0)));
        assert!(volume.collides(&world, Point3::new(4.0, 1.9, 4.0)));

        world.set(4, 1, 4, true, BlockType::WATER);
        assert!(!volume.collides(&world, Point3::new(4.0, 2.0, 4.0)));
        world.set(4, 1, 4, true, BlockType::LEAVES);
        assert!(volume.collides(&world, Point3::new(4.0, 2.0, 4.0)));
    }
}

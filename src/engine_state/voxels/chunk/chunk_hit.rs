//! # Chunk Hit Testing
//!
//! Picks the closest visible block of a chunk along a ray. The chunk bounds
//! are tested first; only when they are hit is the visible list walked, with
//! the query interval shrinking to the closest hit found so far.

use cgmath::{Point3, Vector3};

use crate::engine_state::geometry::{Aabb, Axis, Ray, RayHit};
use crate::engine_state::voxels::block::block_side::BlockSide;

use super::Chunk;

/// The closest visible block struck by a ray.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ChunkHit {
    /// Local position of the struck block
    pub block: Point3<i32>,
    /// Local position of the cell the ray entered the block from. May lie
    /// one step outside the chunk.
    pub neighbor: Point3<i32>,
    /// The face that was struck
    pub side: BlockSide,
    /// Parametric hit time along the ray
    pub time: f32,
    /// Axis of the struck face
    pub axis: Axis,
}

/// The cell a ray travelling along `direction` came from before entering
/// `block` through a face of `axis`: one step along `axis`, against the sign
/// of the ray on that axis.
pub fn neighbor_position(block: Point3<i32>, axis: Axis, direction: Vector3<f32>) -> Point3<i32> {
    BlockSide::entered_from(axis, direction).neighbor_of(block)
}

impl Chunk {
    /// Intersects `ray` with the visible blocks of the chunk.
    ///
    /// Returns the hit with the smallest time in `[t_min, t_max]`, regardless
    /// of the order the visible blocks are stored in.
    pub fn hit(&self, ray: &Ray, t_min: f32, t_max: f32) -> Option<ChunkHit> {
        self.bounds.ray_hit(ray, t_min, t_max)?;

        let mut closest: Option<(Point3<i32>, RayHit)> = None;
        let mut t_closest = t_max;

        for &index in &self.visible_indices {
            let position = self.dimensions.position_of(index);
            let block_box = Aabb::unit_cube_at(self.world_position(position));
            if let Some(hit) = block_box.ray_hit(ray, t_min, t_closest) {
                if closest.map_or(true, |(_, best)| hit.time < best.time) {
                    t_closest = hit.time;
                    closest = Some((position, hit));
                }
            }
        }

        closest.map(|(block, hit)| {
            let side = BlockSide::entered_from(hit.axis, ray.direction());
            ChunkHit {
                block,
                neighbor: side.neighbor_of(block),
                side,
                time: hit.time,
                axis: hit.axis,
            }
        })
    }
}

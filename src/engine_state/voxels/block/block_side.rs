//! # Block Side Module
//!
//! This module defines the six faces of a voxel block together with the unit
//! offset to the neighbouring cell behind each face.

use cgmath::{Point3, Vector3};

use crate::engine_state::geometry::Axis;

/// Represents the six possible faces of a voxel block.
///
/// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The front face (facing positive Z)
    FRONT = 0,

    /// The back face (facing negative Z)
    BACK = 1,

    /// The bottom face (facing negative Y)
    BOTTOM = 2,

    /// The top face (facing positive Y)
    TOP = 3,

    /// The left face (facing negative X)
    LEFT = 4,

    /// The right face (facing positive X)
    RIGHT = 5,
}

impl BlockSide {
    /// Returns an array containing all six block faces in a consistent order.
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

    /// The offset from a block to the neighbour sharing this face.
    pub fn offset(self) -> Vector3<i32> {
        match self {
            BlockSide::FRONT => Vector3::new(0, 0, 1),
            BlockSide::BACK => Vector3::new(0, 0, -1),
            BlockSide::BOTTOM => Vector3::new(0, -1, 0),
            BlockSide::TOP => Vector3::new(0, 1, 0),
            BlockSide::LEFT => Vector3::new(-1, 0, 0),
            BlockSide::RIGHT => Vector3::new(1, 0, 0),
        }
    }

    /// The neighbouring position across this face.
    pub fn neighbor_of(self, position: Point3<i32>) -> Point3<i32> {
        position + self.offset()
    }

    /// The face through which a ray travelling along `direction` entered a
    /// block, given that it crossed a slab of `axis`.
    ///
    /// A ray moving towards positive values enters through the face pointing
    /// towards negative values, and vice versa. A zero component counts as
    /// positive.
    pub fn entered_from(axis: Axis, direction: Vector3<f32>) -> BlockSide {
        let positive = axis.of_vector(direction) >= 0.0;
        match (axis, positive) {
            (Axis::X, true) => BlockSide::LEFT,
            (Axis::X, false) => BlockSide::RIGHT,
            (Axis::Y, true) => BlockSide::BOTTOM,
            (Axis::Y, false) => BlockSide::TOP,
            (Axis::Z, true) => BlockSide::BACK,
            (Axis::Z, false) => BlockSide::FRONT,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn downward_ray_enters_through_top() {
        let side = BlockSide::entered_from(Axis::Y, Vector3::new(0.0, -1.0, 0.0));
        assert_eq!(side, BlockSide::TOP);
        assert_eq!(side.neighbor_of(Point3::new(2, 1, 2)), Point3::new(2, 2, 2));
    }

    #[test]
    fn ray_along_positive_x_enters_through_left() {
        let side = BlockSide::entered_from(Axis::X, Vector3::new(0.5, 0.1, 0.0));
        assert_eq!(side, BlockSide::LEFT);
        assert_eq!(side.neighbor_of(Point3::new(0, 0, 0)), Point3::new(-1, 0, 0));
    }

    #[test]
    fn offsets_of_all_sides_cancel_out() {
        let sum = BlockSide::all()
            .iter()
            .fold(Vector3::new(0, 0, 0), |sum, side| sum + side.offset());
        assert_eq!(sum, Vector3::new(0, 0, 0));
    }
}

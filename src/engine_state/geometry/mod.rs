//! # Geometry Module
//!
//! Geometric primitives shared by chunk-level and block-level hit testing.
//!
//! * `Ray` - an origin and a (not necessarily normalized) direction
//! * `Aabb` - an axis-aligned box with the slab-method ray intersection
//! * `Axis` - the coordinate axes, in the fixed order used to break ties

use cgmath::{Point3, Vector3};

pub mod aabb;
pub mod ray;

pub use aabb::{Aabb, RayHit};
pub use ray::Ray;

/// One of the three coordinate axes.
///
/// `Axis::ALL` is the order in which the slab test visits the axes. When two
/// axes have exactly the same entry time, the one visited last is reported.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// The width axis
    X = 0,
    /// The height axis
    Y = 1,
    /// The depth axis
    Z = 2,
}

impl Axis {
    /// All axes in evaluation order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Returns the component of `vec` along this axis.
    pub fn of_vector(self, vec: Vector3<f32>) -> f32 {
        match self {
            Axis::X => vec.x,
            Axis::Y => vec.y,
            Axis::Z => vec.z,
        }
    }

    /// Returns the component of `point` along this axis.
    pub fn of_point(self, point: Point3<f32>) -> f32 {
        match self {
            Axis::X => point.x,
            Axis::Y => point.y,
            Axis::Z => point.z,
        }
    }
}

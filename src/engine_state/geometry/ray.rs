//! # Ray
//!
//! A half-line used for picking. Rays are immutable once constructed.

use cgmath::{Point3, Vector3};

/// A ray with an origin and a direction.
///
/// The direction does not have to be normalized; hit times are expressed in
/// multiples of the direction vector.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    origin: Point3<f32>,
    direction: Vector3<f32>,
}

impl Ray {
    /// Creates a new ray.
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self { origin, direction }
    }

    /// The point the ray starts from.
    pub fn origin(&self) -> Point3<f32> {
        self.origin
    }

    /// The direction the ray travels in.
    pub fn direction(&self) -> Vector3<f32> {
        self.direction
    }

    /// Returns the point reached after travelling for parametric time `t`.
    pub fn at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn point_along_unnormalized_ray_scales_with_direction() {
        let ray = Ray::new(Point3::new(1.0, 2.0, 3.0), Vector3::new(0.0, -2.0, 0.0));
        let point = ray.at(1.5);
        assert_abs_diff_eq!(point.x, 1.0);
        assert_abs_diff_eq!(point.y, -1.0);
        assert_abs_diff_eq!(point.z, 3.0);
    }
}

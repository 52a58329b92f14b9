//! # Axis-Aligned Bounding Boxes
//!
//! Boxes are used twice during picking: once per chunk as the broad phase and
//! once per visible block as the narrow phase. Chunk boxes are fixed for the
//! lifetime of the chunk; block boxes are built on the fly from integer cell
//! coordinates.

use cgmath::{Point3, Vector3};

use super::{Axis, Ray};

/// Direction components with a smaller magnitude than this are treated as
/// parallel to the corresponding slab.
pub const PARALLEL_EPSILON: f32 = 1e-8;

/// A box whose faces are aligned with the coordinate axes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    min: Point3<f32>,
    max: Point3<f32>,
}

/// A successful ray/box intersection.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayHit {
    /// Parametric entry time, clamped into the queried interval
    pub time: f32,
    /// The axis whose slab was crossed last on entry, i.e. the axis of the struck face
    pub axis: Axis,
}

impl Aabb {
    /// Creates a box from its lower and upper corners.
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Self { min, max }
    }

    /// Creates the unit cube whose lower corner is `corner`.
    pub fn unit_cube_at(corner: Point3<f32>) -> Self {
        Self::new(corner, corner + Vector3::new(1.0, 1.0, 1.0))
    }

    /// The lower corner.
    pub fn min(&self) -> Point3<f32> {
        self.min
    }

    /// The upper corner.
    pub fn max(&self) -> Point3<f32> {
        self.max
    }

    /// Whether `point` lies inside the box or on its boundary.
    pub fn contains(&self, point: Point3<f32>) -> bool {
        Axis::ALL.iter().all(|&axis| {
            let value = axis.of_point(point);
            value >= axis.of_point(self.min) && value <= axis.of_point(self.max)
        })
    }

    /// Intersects `ray` with the box using the slab method.
    ///
    /// The entry/exit interval is narrowed axis by axis in the order of
    /// [`Axis::ALL`]. An axis on which the ray is parallel only passes if the
    /// origin already lies within that slab. The reported axis is the one that
    /// most recently raised the entry time, with ties going to the later axis.
    ///
    /// Returns `None` if the ray misses the box, if the box lies entirely
    /// behind `t_min`, or if the entry time is beyond `t_max`. A ray starting
    /// inside the box reports `t_min`.
    pub fn ray_hit(&self, ray: &Ray, t_min: f32, t_max: f32) -> Option<RayHit> {
        let origin = ray.origin();
        let direction = ray.direction();

        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;
        let mut hit_axis = Axis::X;

        for axis in Axis::ALL {
            let d = axis.of_vector(direction);
            let o = axis.of_point(origin);
            let lower = axis.of_point(self.min);
            let upper = axis.of_point(self.max);

            if d.abs() < PARALLEL_EPSILON {
                if o < lower || o > upper {
                    return None;
                }
                continue;
            }

            let inv_d = 1.0 / d;
            let mut t_enter = (lower - o) * inv_d;
            let mut t_exit = (upper - o) * inv_d;
            if t_enter > t_exit {
                std::mem::swap(&mut t_enter, &mut t_exit);
            }

            if t_enter >= t_near {
                t_near = t_enter;
                hit_axis = axis;
            }
            t_far = t_far.min(t_exit);

            if t_near > t_far {
                return None;
            }
        }

        if t_far < t_min {
            return None;
        }

        let time = t_near.max(t_min);
        if time > t_max {
            return None;
        }

        Some(RayHit {
            time,
            axis: hit_axis,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn unit_box() -> Aabb {
        Aabb::unit_cube_at(Point3::new(0.0, 0.0, 0.0))
    }

    #[test]
    fn ray_from_inside_box_hits_at_t_min() {
        let ray = Ray::new(Point3::new(0.5, 0.5, 0.5), Vector3::new(1.0, 0.3, -0.2));
        let hit = unit_box().ray_hit(&ray, 0.0, 10.0).unwrap();
        assert_abs_diff_eq!(hit.time, 0.0);
    }

    #[test]
    fn ray_from_inside_box_hits_at_positive_t_min() {
        let ray = Ray::new(Point3::new(0.5, 0.5, 0.5), Vector3::new(0.0, 1.0, 0.0));
        let hit = unit_box().ray_hit(&ray, 0.25, 10.0).unwrap();
        assert_abs_diff_eq!(hit.time, 0.25);
    }

    #[test]
    fn parallel_ray_outside_slab_misses() {
        let ray = Ray::new(Point3::new(2.0, -5.0, 0.5), Vector3::new(0.0, 1.0, 0.0));
        assert!(unit_box().ray_hit(&ray, 0.0, 100.0).is_none());
    }

    #[test]
    fn parallel_ray_inside_slab_hits_face_of_moving_axis() {
        let ray = Ray::new(Point3::new(0.5, 5.0, 0.5), Vector3::new(0.0, -1.0, 0.0));
        let hit = unit_box().ray_hit(&ray, 0.0, 100.0).unwrap();
        assert_abs_diff_eq!(hit.time, 4.0);
        assert_eq!(hit.axis, Axis::Y);
    }

    #[test]
    fn negative_direction_reports_entry_through_upper_face() {
        let ray = Ray::new(Point3::new(5.0, 0.5, 0.5), Vector3::new(-2.0, 0.0, 0.0));
        let hit = unit_box().ray_hit(&ray, 0.0, 100.0).unwrap();
        assert_abs_diff_eq!(hit.time, 2.0);
        assert_eq!(hit.axis, Axis::X);
    }

    #[test]
    fn edge_hit_with_equal_entry_times_reports_later_axis() {
        let ray = Ray::new(Point3::new(-1.0, -1.0, 0.5), Vector3::new(1.0, 1.0, 0.0));
        let hit = unit_box().ray_hit(&ray, 0.0, 100.0).unwrap();
        assert_abs_diff_eq!(hit.time, 1.0);
        assert_eq!(hit.axis, Axis::Y);

        let ray = Ray::new(Point3::new(-1.0, 0.5, -1.0), Vector3::new(1.0, 0.0, 1.0));
        let hit = unit_box().ray_hit(&ray, 0.0, 100.0).unwrap();
        assert_eq!(hit.axis, Axis::Z);
    }

    #[test]
    fn box_behind_ray_misses() {
        let ray = Ray::new(Point3::new(3.0, 0.5, 0.5), Vector3::new(1.0, 0.0, 0.0));
        assert!(unit_box().ray_hit(&ray, 0.0, 100.0).is_none());
    }

    #[test]
    fn box_beyond_t_max_misses() {
        let ray = Ray::new(Point3::new(-5.0, 0.5, 0.5), Vector3::new(1.0, 0.0, 0.0));
        assert!(unit_box().ray_hit(&ray, 0.0, 3.0).is_none());
        assert!(unit_box().ray_hit(&ray, 0.0, 5.0).is_some());
    }

    #[test]
    fn skew_ray_missing_box_misses() {
        let ray = Ray::new(Point3::new(-1.0, 3.0, 0.5), Vector3::new(1.0, 0.0, 0.0));
        assert!(unit_box().ray_hit(&ray, 0.0, 100.0).is_none());

        let ray = Ray::new(Point3::new(-1.0, -1.0, 0.5), Vector3::new(1.0, 3.0, 0.0));
        assert!(unit_box().ray_hit(&ray, 0.0, 100.0).is_none());
    }

    #[test]
    fn contains_includes_boundary() {
        let aabb = unit_box();
        assert!(aabb.contains(Point3::new(1.0, 0.0, 0.5)));
        assert!(!aabb.contains(Point3::new(1.01, 0.0, 0.5)));
    }
}

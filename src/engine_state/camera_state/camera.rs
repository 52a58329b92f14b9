//! # Camera Implementation
//!
//! This module contains the first-person camera used as the streaming
//! observer and as the origin of the interaction ray:
//! - `Camera`: position and orientation in world space
//! - `CameraController`: accumulates player input between frames
//!
//! Yaw is measured from the +x axis towards +z, pitch upwards from the
//! horizontal plane.

use cgmath::{Deg, InnerSpace, Point3, Rad, Vector3};
use std::f32::consts::FRAC_PI_2;
use web_time::Duration;

use crate::engine_state::geometry::Ray;
use crate::engine_state::PlayerAction;

/// Safe limit for pitch to prevent gimbal lock
const SAFE_FRAC_PI_2: f32 = FRAC_PI_2 - 0.0001;

/// Mouse deltas below this magnitude are ignored as jitter.
const ROTATION_DEAD_ZONE: f64 = 0.5;

/// A first-person camera in world space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Camera {
    /// The camera's position in world space
    pub position: Point3<f32>,
    /// Horizontal rotation (around Y axis) in radians
    pub yaw: Rad<f32>,
    /// Vertical rotation in radians, kept short of straight up or down
    pub pitch: Rad<f32>,
}

impl Camera {
    /// Creates a new camera with the specified position and orientation.
    ///
    /// The pitch is clamped short of ±90°.
    ///
    /// # Example
    /// ```
    /// use cgmath::{Deg, Point3};
    /// use voxel_world::engine_state::camera_state::camera::Camera;
    ///
    /// let camera = Camera::new(Point3::new(0.0, 20.0, 0.0), Deg(0.0), Deg(0.0));
    /// assert!((camera.view_vec().x - 1.0).abs() < 1e-6);
    /// ```
    pub fn new<V: Into<Point3<f32>>, Y: Into<Rad<f32>>, P: Into<Rad<f32>>>(
        position: V,
        yaw: Y,
        pitch: P,
    ) -> Self {
        let mut camera = Self {
            position: position.into(),
            yaw: yaw.into(),
            pitch: pitch.into(),
        };
        camera.clamp_pitch();
        camera
    }

    /// The normalized direction the camera is facing.
    pub fn view_vec(&self) -> Vector3<f32> {
        let (yaw_sin, yaw_cos) = self.yaw.0.sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.0.sin_cos();
        Vector3::new(pitch_cos * yaw_cos, pitch_sin, pitch_cos * yaw_sin).normalize()
    }

    /// The ray from the camera position along the view direction.
    pub fn view_ray(&self) -> Ray {
        Ray::new(self.position, self.view_vec())
    }

    /// Applies and then clears the input accumulated in `controller`.
    ///
    /// Movement is horizontal (forward/backward and strafing follow the yaw
    /// only) plus vertical movement along +y.
    pub fn get_controller_updates_and_reset_controller(
        &mut self,
        controller: &mut CameraController,
        dt: Duration,
    ) {
        let dt = dt.as_secs_f32();

        let (yaw_sin, yaw_cos) = self.yaw.0.sin_cos();
        let forward = Vector3::new(yaw_cos, 0.0, yaw_sin);
        let right = Vector3::new(-yaw_sin, 0.0, yaw_cos);
        self.position += forward
            * (controller.amount_forward - controller.amount_backward)
            * controller.speed
            * dt;
        self.position +=
            right * (controller.amount_right - controller.amount_left) * controller.speed * dt;
        self.position.y += (controller.amount_up - controller.amount_down) * controller.speed * dt;

        self.yaw += Rad(controller.rotate_horizontal) * controller.sensitivity * dt;
        self.pitch += Rad(-controller.rotate_vertical) * controller.sensitivity * dt;
        self.clamp_pitch();

        controller.reset();
    }

    fn clamp_pitch(&mut self) {
        if self.pitch < -Rad(SAFE_FRAC_PI_2) {
            self.pitch = -Rad(SAFE_FRAC_PI_2);
        } else if self.pitch > Rad(SAFE_FRAC_PI_2) {
            self.pitch = Rad(SAFE_FRAC_PI_2);
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Point3::new(0.0, 0.0, 0.0), Deg(0.0), Deg(0.0))
    }
}

/// Handles camera movement and rotation based on user input.
///
/// Input is accumulated by [`intake_actions`](Self::intake_actions) and
/// consumed by the next camera update.
#[derive(Debug)]
pub struct CameraController {
    // Movement flags (0 or 1)
    amount_left: f32,
    amount_right: f32,
    amount_forward: f32,
    amount_backward: f32,
    amount_up: f32,
    amount_down: f32,

    // Rotation amounts
    rotate_horizontal: f32,
    rotate_vertical: f32,

    speed: f32,
    sensitivity: f32,
}

impl CameraController {
    /// Creates a new camera controller.
    ///
    /// # Arguments
    /// * `speed` - Movement speed in world units per second
    /// * `sensitivity` - Mouse look sensitivity multiplier
    pub fn new(speed: f32, sensitivity: f32) -> Self {
        Self {
            amount_left: 0.0,
            amount_right: 0.0,
            amount_forward: 0.0,
            amount_backward: 0.0,
            amount_up: 0.0,
            amount_down: 0.0,
            rotate_horizontal: 0.0,
            rotate_vertical: 0.0,
            speed,
            sensitivity,
        }
    }

    /// Processes player actions and updates controller state accordingly.
    pub fn intake_actions(&mut self, actions: &PlayerAction) {
        if actions.move_forward {
            self.amount_forward = 1.0;
        }
        if actions.move_backward {
            self.amount_backward = 1.0;
        }
        if actions.move_left {
            self.amount_left = 1.0;
        }
        if actions.move_right {
            self.amount_right = 1.0;
        }
        if actions.move_up {
            self.amount_up = 1.0;
        }
        if actions.move_down {
            self.amount_down = 1.0;
        }
        if let Some((delta_x, delta_y)) = actions.rotate_view {
            if delta_x.abs() > ROTATION_DEAD_ZONE {
                self.rotate_horizontal = delta_x as f32;
            }
            if delta_y.abs() > ROTATION_DEAD_ZONE {
                self.rotate_vertical = delta_y as f32;
            }
        }
    }

    /// Checks if there are any pending updates that would affect the camera.
    pub fn has_updates(&self) -> bool {
        self.amount_forward > 0.0
            || self.amount_backward > 0.0
            || self.amount_left > 0.0
            || self.amount_right > 0.0
            || self.amount_up > 0.0
            || self.amount_down > 0.0
            || self.rotate_horizontal != 0.0
            || self.rotate_vertical != 0.0
    }

    fn reset(&mut self) {
        self.rotate_horizontal = 0.0;
        self.rotate_vertical = 0.0;
        self.amount_up = 0.0;
        self.amount_down = 0.0;
        self.amount_left = 0.0;
        self.amount_right = 0.0;
        self.amount_forward = 0.0;
        self.amount_backward = 0.0;
    }
}

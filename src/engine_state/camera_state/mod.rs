//! # Camera State Management
//!
//! This module handles the observer of the world:
//! - Camera position and orientation tracking
//! - Player input processing for camera control
//! - Chunk-based position tracking that drives chunk streaming
//!
//! ## Core Components
//! - `Camera`: position and orientation in 3D space
//! - `CameraController`: accumulates player input between updates
//! - `CameraConfig`: initial placement and control tuning

use camera::{Camera, CameraController};
use cgmath::{Deg, Point2, Point3};
use serde::{Deserialize, Serialize};

use super::{voxels::chunk::ChunkDimensions, PlayerAction};

pub mod camera;

/// Initial camera placement and control tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Starting position in world space
    pub position: [f32; 3],
    /// Starting yaw in degrees, measured from +x towards +z
    pub yaw_degrees: f32,
    /// Starting pitch in degrees, positive looks up
    pub pitch_degrees: f32,
    /// Movement speed in world units per second
    pub speed: f32,
    /// Mouse look sensitivity multiplier
    pub sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [8.0, 18.0, 8.0],
            yaw_degrees: 0.0,
            pitch_degrees: -60.0,
            speed: 2.0,
            sensitivity: 2.0,
        }
    }
}

/// Manages the camera and its controller.
pub struct CameraState {
    /// The current camera position and orientation
    pub camera: Camera,
    /// Handles player input and camera movement
    pub camera_controller: CameraController,
    /// Chunk extents used to map the camera position to a chunk coordinate
    chunk_dimensions: ChunkDimensions,
}

impl CameraState {
    /// Creates a camera placed as described by `config`.
    pub fn new(config: &CameraConfig, chunk_dimensions: ChunkDimensions) -> Self {
        let camera = Camera::new(
            Point3::from(config.position),
            Deg(config.yaw_degrees),
            Deg(config.pitch_degrees),
        );
        let camera_controller = CameraController::new(config.speed, config.sensitivity);

        CameraState {
            camera,
            camera_controller,
            chunk_dimensions,
        }
    }

    /// Processes player input actions and updates the camera controller state.
    pub fn intake_actions(&mut self, actions: &PlayerAction) {
        self.camera_controller.intake_actions(actions);
    }

    /// The chunk coordinate the camera is currently in.
    pub fn chunk_position(&self) -> Point2<i32> {
        let position = self.camera.position;
        Point2::new(
            (position.x / self.chunk_dimensions.width as f32).floor() as i32,
            (position.z / self.chunk_dimensions.depth as f32).floor() as i32,
        )
    }

    /// Applies pending controller input over the elapsed time `dt`.
    ///
    /// # Returns
    /// - `Some(CameraUpdates)` if the camera position or orientation changed
    /// - `None` if no updates were needed
    pub fn update(&mut self, dt: web_time::Duration) -> Option<CameraUpdates> {
        if !self.camera_controller.has_updates() {
            return None;
        }

        self.camera
            .get_controller_updates_and_reset_controller(&mut self.camera_controller, dt);

        Some(CameraUpdates {
            new_chunk_position: self.chunk_position(),
        })
    }
}

/// Returned by [`CameraState::update`] when the camera moved or turned.
pub struct CameraUpdates {
    /// The chunk coordinate the camera is in after the update
    pub new_chunk_position: Point2<i32>,
}

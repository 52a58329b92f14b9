//! # Engine State Module
//!
//! The core engine module that ties the voxel world to the observer and to
//! player interaction.
//!
//! ## Key Components
//!
//! * `EngineState` - The main state container for the engine
//! * `camera_state` - Handles camera positioning and movement
//! * `geometry` - Rays and axis-aligned boxes used for picking
//! * `rendering` - The render submission boundary
//! * `voxels` - Handles voxel data, chunks, terrain and streaming
//!
//! ## Frame Flow
//!
//! One call to [`EngineState::tick`] performs, in order:
//! 1. translation of the processed input into a [`PlayerAction`]
//! 2. the camera update
//! 3. chunk streaming around the camera
//! 4. the targeting hit test along the view ray, limited to the reach
//! 5. at most one block mutation, triggered by a button press edge
//!
//! Drawing is a separate call, [`EngineState::render`].

use std::sync::Arc;

use anyhow::Result;
use camera_state::CameraState;
use cgmath::{Point2, Point3};
use rendering::RenderSubmitter;
use voxels::{
    block::{block_type::BlockType, palette::BlockPalette},
    terrain::{HeightSource, PerlinHeightSource},
    world::{StreamingReport, World, WorldHit},
};
use web_time::Duration;
use winit::{event::MouseButton, keyboard::KeyCode};

use crate::{application_state::input_state::ProcessedInputState, config::EngineConfig};

pub mod camera_state;
pub mod geometry;
pub mod rendering;
pub mod voxels;

/// The kind of edit requested by the player.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BlockAction {
    /// Clear the targeted block
    Remove,
    /// Fill the empty cell in front of the targeted block
    Place,
}

/// A single edit of the world, in world block coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MutationRequest {
    /// What to do
    pub action: BlockAction,
    /// The targeted block for `Remove`, the neighbour cell for `Place`
    pub target: Point3<i32>,
    /// The block to place. Ignored for `Remove`.
    pub block_type: BlockType,
}

impl MutationRequest {
    /// Builds the request for `action` from a hit result.
    pub fn from_hit(action: BlockAction, hit: &WorldHit, block_type: BlockType) -> Self {
        let target = match action {
            BlockAction::Remove => hit.block,
            BlockAction::Place => hit.neighbor,
        };
        Self {
            action,
            target,
            block_type,
        }
    }
}

/// The outcome of a [`MutationRequest`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The block at `position` was cleared
    Removed {
        /// World block position
        position: Point3<i32>,
        /// The type that was removed
        block_type: BlockType,
    },
    /// A block was placed at `position`
    Placed {
        /// World block position
        position: Point3<i32>,
        /// The type that was placed
        block_type: BlockType,
    },
    /// Nothing changed: the cell was empty/occupied, above or below the
    /// world, or in a chunk that is not loaded
    Rejected(MutationRequest),
}

/// Everything a single tick did.
#[derive(Debug)]
pub struct TickReport {
    /// The camera's chunk coordinate after the camera update
    pub observer_chunk: Point2<i32>,
    /// Result of the streaming pass
    pub streaming: StreamingReport,
    /// The block under the crosshair, if any is within reach
    pub target: Option<WorldHit>,
    /// The edit performed this tick, if a button was pressed
    pub mutation: Option<MutationOutcome>,
}

/// The main state container for the engine.
///
/// # Examples
///
/// ```no_run
/// use voxel_world::config::EngineConfig;
/// use voxel_world::engine_state::{rendering::InstanceCollector, EngineState, PlayerAction};
///
/// let mut engine_state = EngineState::new(&EngineConfig::default()).unwrap();
/// let mut collector = InstanceCollector::new();
///
/// engine_state.tick_actions(PlayerAction::default(), web_time::Duration::from_millis(16));
/// engine_state.render(&mut collector).unwrap();
/// ```
pub struct EngineState {
    /// Camera state managing position, orientation and movement
    pub camera_state: CameraState,
    /// Current player actions derived from input
    pub player_actions: PlayerAction,
    /// The voxel world containing all chunk data
    pub world: World,
    /// Maximum distance along the view ray at which blocks can be targeted
    reach: f32,
    /// Block type used for placement
    place_block_type: BlockType,
    /// Chunk coordinate of the camera at the end of the last tick
    current_player_chunk_position: Point2<i32>,
}

impl EngineState {
    /// Creates the engine with a Perlin terrain.
    ///
    /// The seed is taken from the configuration, or picked at random.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let seed = config.seed.unwrap_or_else(|| fastrand::u32(..));
        log::info!("Using terrain seed {}", seed);
        Self::with_height_source(config, Box::new(PerlinHeightSource::new(seed)))
    }

    /// Creates the engine with a caller-supplied height source and streams in
    /// the chunks around the starting camera position.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn with_height_source(
        config: &EngineConfig,
        height_source: Box<dyn HeightSource>,
    ) -> Result<Self> {
        config.validate()?;

        let palette = Arc::new(BlockPalette::default());
        let world = World::new(config.world.clone(), palette, height_source);
        let camera_state = CameraState::new(&config.camera, config.world.chunk_dimensions);
        let current_player_chunk_position = camera_state.chunk_position();

        let mut engine_state = Self {
            camera_state,
            player_actions: PlayerAction::default(),
            world,
            reach: config.reach,
            place_block_type: config.place_block_type,
            current_player_chunk_position,
        };
        engine_state
            .world
            .update(engine_state.camera_state.camera.position);

        Ok(engine_state)
    }

    /// Advances the engine by one frame using processed input.
    pub fn tick(&mut self, input: &ProcessedInputState, dt: Duration) -> TickReport {
        let player_action = Self::translate_processed_input(input);
        self.tick_actions(player_action, dt)
    }

    /// Advances the engine by one frame using already translated actions.
    pub fn tick_actions(&mut self, player_action: PlayerAction, dt: Duration) -> TickReport {
        self.player_actions = player_action;
        self.camera_state.intake_actions(&self.player_actions);

        if let Some(updates) = self.camera_state.update(dt) {
            if updates.new_chunk_position != self.current_player_chunk_position {
                log::debug!(
                    "Camera moved from chunk {:?} to {:?}",
                    self.current_player_chunk_position,
                    updates.new_chunk_position
                );
                self.current_player_chunk_position = updates.new_chunk_position;
            }
        }

        let streaming = self.world.update(self.camera_state.camera.position);
        let target = self.target();

        let action = if self.player_actions.remove_block {
            Some(BlockAction::Remove)
        } else if self.player_actions.place_block {
            Some(BlockAction::Place)
        } else {
            None
        };
        let mutation = match (action, target) {
            (Some(action), Some(hit)) => Some(self.apply_mutation(MutationRequest::from_hit(
                action,
                &hit,
                self.place_block_type,
            ))),
            (Some(action), None) => {
                log::debug!("{:?} requested without a target in reach", action);
                None
            }
            (None, _) => None,
        };

        TickReport {
            observer_chunk: self.current_player_chunk_position,
            streaming,
            target,
            mutation,
        }
    }

    /// The closest visible block along the camera's view ray within reach.
    pub fn target(&self) -> Option<WorldHit> {
        self.world
            .hit(&self.camera_state.camera.view_ray(), 0.0, self.reach)
    }

    /// Applies a single edit to the world.
    pub fn apply_mutation(&mut self, request: MutationRequest) -> MutationOutcome {
        let outcome = match request.action {
            BlockAction::Remove => match self.world.remove_block(request.target) {
                Some(block_type) => MutationOutcome::Removed {
                    position: request.target,
                    block_type,
                },
                None => MutationOutcome::Rejected(request),
            },
            BlockAction::Place => {
                if !request.block_type.is_air()
                    && self.world.place_block(request.target, request.block_type)
                {
                    MutationOutcome::Placed {
                        position: request.target,
                        block_type: request.block_type,
                    }
                } else {
                    MutationOutcome::Rejected(request)
                }
            }
        };

        match outcome {
            MutationOutcome::Rejected(request) => {
                log::warn!("Rejected {:?} at {:?}", request.action, request.target)
            }
            _ => log::info!("{:?}", outcome),
        }
        outcome
    }

    /// Submits every visible block of the loaded world.
    ///
    /// # Errors
    /// Returns an error if a visible block has no registered appearance.
    pub fn render(&self, submitter: &mut impl RenderSubmitter) -> Result<()> {
        self.world.draw(submitter)
    }

    /// Translates the processed input state into player actions.
    ///
    /// Movement follows the key level, edits follow the button press edge so
    /// a held button edits only once.
    pub fn translate_processed_input(input: &ProcessedInputState) -> PlayerAction {
        PlayerAction {
            move_forward: input.get_key_state(KeyCode::KeyW).is_active(),
            move_backward: input.get_key_state(KeyCode::KeyS).is_active(),
            move_left: input.get_key_state(KeyCode::KeyA).is_active(),
            move_right: input.get_key_state(KeyCode::KeyD).is_active(),
            move_up: input.get_key_state(KeyCode::Space).is_active(),
            move_down: input.get_key_state(KeyCode::ShiftLeft).is_active(),
            rotate_view: input.get_mouse_delta(),
            remove_block: input
                .get_mouse_button_state(MouseButton::Left)
                .is_just_pressed(),
            place_block: input
                .get_mouse_button_state(MouseButton::Right)
                .is_just_pressed(),
        }
    }
}

/// Represents player actions derived from input.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlayerAction {
    /// Movement actions - true if key is pressed or held
    pub move_forward: bool,
    #[allow(missing_docs)]
    pub move_backward: bool,
    #[allow(missing_docs)]
    pub move_left: bool,
    #[allow(missing_docs)]
    pub move_right: bool,
    #[allow(missing_docs)]
    pub move_up: bool,
    #[allow(missing_docs)]
    pub move_down: bool,

    /// View rotation from mouse motion
    pub rotate_view: Option<(f64, f64)>,

    /// Edit actions - true only on the frame the button went down
    pub remove_block: bool,
    #[allow(missing_docs)]
    pub place_block: bool,
}

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel World
//!
//! A minimal voxel world engine: fixed-size chunks of typed blocks streamed
//! in and out around a moving observer, drawn through per-block visibility
//! culling and edited through ray picking.
//!
//! ## Key Modules
//!
//! * `application_state` - Input handling and the headless frame driver
//! * `config` - JSON engine configuration
//! * `engine_state` - Camera, geometry, render submission and the voxel world
//!
//! ## Architecture
//!
//! * Chunks keep a dense block array, a visibility bit per cell and a sorted
//!   list of visible cells
//! * Picking tests the chunk bounds first and then only the visible cells
//! * The world keeps every chunk within the render distance of the camera
//!   and leaves chunks that stay in range untouched
//! * Drawing hands one instance per visible block to a [`RenderSubmitter`]
//!
//! [`RenderSubmitter`]: engine_state::rendering::RenderSubmitter
//!
//! ## Usage
//!
//! ```no_run
//! fn main() -> anyhow::Result<()> {
//!     voxel_world::run()
//! }
//! ```

use anyhow::Result;
use application_state::ApplicationState;
use config::EngineConfig;
use log::info;
use web_time::Duration;
use winit::{
    event::{ElementState, MouseButton},
    keyboard::KeyCode,
};

pub mod application_state;
pub mod config;
pub mod engine_state;

/// Number of frames of the scripted demo run by [`run`].
const DEMO_FRAMES: u64 = 240;

/// Fixed time step of the scripted demo.
const DEMO_FRAME_TIME: Duration = Duration::from_millis(16);

/// Initializes logging and runs a scripted walk through a generated world.
///
/// The camera walks forward for a few seconds, turns, and then removes and
/// places a block in front of it. Set `RUST_LOG=debug` to follow streaming.
///
/// # Errors
/// Returns an error if the configuration can not be loaded or a frame fails.
pub fn run() -> Result<()> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();
    info!("Logger initialized");

    let config = EngineConfig::load()?;
    let mut state = ApplicationState::new(&config)?;

    let mut loaded = 0;
    let mut unloaded = 0;
    let mut edits = 0;

    for frame in 0..DEMO_FRAMES {
        apply_demo_input(&mut state, frame);
        let report = state.run_frame_with_dt(DEMO_FRAME_TIME)?;
        loaded += report.tick.streaming.loaded.len();
        unloaded += report.tick.streaming.unloaded.len();
        if report.tick.mutation.is_some() {
            edits += 1;
        }
    }

    let position = state.engine_state.camera_state.camera.position;
    info!(
        "Demo finished after {} frames at ({:.1}, {:.1}, {:.1}): {} chunks resident, {} loaded, {} unloaded, {} edits, {} instances drawn",
        state.frame_count(),
        position.x,
        position.y,
        position.z,
        state.engine_state.world.len(),
        loaded,
        unloaded,
        edits,
        state.instances.len()
    );

    Ok(())
}

/// Feeds the scripted input for `frame`.
fn apply_demo_input(state: &mut ApplicationState, frame: u64) {
    let input = &mut state.input_manager;
    match frame {
        1 => input.intake_key(KeyCode::KeyW, ElementState::Pressed),
        180 => input.intake_key(KeyCode::KeyW, ElementState::Released),
        190 => input.intake_mouse_motion((40.0, 0.0)),
        200 => input.intake_mouse_button(MouseButton::Left, ElementState::Pressed),
        201 => input.intake_mouse_button(MouseButton::Left, ElementState::Released),
        210 => input.intake_mouse_button(MouseButton::Right, ElementState::Pressed),
        211 => input.intake_mouse_button(MouseButton::Right, ElementState::Released),
        _ => {}
    }
}

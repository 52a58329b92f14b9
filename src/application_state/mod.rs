//! # Application State Management
//!
//! This module drives the engine frame by frame:
//! - Input collection through the [`InputManager`]
//! - Frame timing
//! - Ticking the [`EngineState`] and drawing into an [`InstanceCollector`]
//!
//! The driver is headless: window and GPU handling are left to the caller,
//! which feeds input events in and reads the collected instances out.

pub mod input_manager;
pub mod input_state;

use anyhow::Result;
use input_manager::InputManager;
use web_time::{Duration, Instant};

use crate::config::EngineConfig;
use crate::engine_state::{rendering::InstanceCollector, EngineState, TickReport};

/// What a single frame produced.
#[derive(Debug)]
pub struct FrameReport {
    /// Sequence number of the frame, starting at 0
    pub frame: u64,
    /// The engine tick of this frame
    pub tick: TickReport,
    /// Number of block instances drawn
    pub instance_count: usize,
}

/// The running application: engine, input and the frame's draw output.
pub struct ApplicationState {
    /// The core engine state and logic
    pub engine_state: EngineState,

    /// Manages input state and event processing
    pub input_manager: InputManager,

    /// Instances drawn by the most recent frame
    pub instances: InstanceCollector,

    /// Timestamp of the last frame for delta time calculations
    last_frame_time: Instant,

    /// Number of frames run so far
    frame_count: u64,
}

impl ApplicationState {
    /// Creates the application around a new engine.
    ///
    /// # Errors
    /// Returns an error if the engine can not be created from `config`.
    pub fn new(config: &EngineConfig) -> Result<Self> {
        Ok(Self::with_engine(EngineState::new(config)?))
    }

    /// Creates the application around an existing engine.
    pub fn with_engine(engine_state: EngineState) -> Self {
        Self {
            engine_state,
            input_manager: InputManager::new(),
            instances: InstanceCollector::new(),
            last_frame_time: Instant::now(),
            frame_count: 0,
        }
    }

    /// Runs one frame with the wall-clock time elapsed since the last frame.
    ///
    /// # Errors
    /// Returns an error if drawing fails.
    pub fn run_frame(&mut self) -> Result<FrameReport> {
        let now = Instant::now();
        let dt = now - self.last_frame_time;
        self.last_frame_time = now;
        self.run_frame_with_dt(dt)
    }

    /// Runs one frame with a fixed time step.
    ///
    /// # Errors
    /// Returns an error if drawing fails.
    pub fn run_frame_with_dt(&mut self, dt: Duration) -> Result<FrameReport> {
        let processed_input = self.input_manager.get_and_reset_processed_input();
        let tick = self.engine_state.tick(&processed_input, dt);

        self.instances.clear();
        self.engine_state.render(&mut self.instances)?;

        let report = FrameReport {
            frame: self.frame_count,
            tick,
            instance_count: self.instances.len(),
        };
        log::trace!(
            "Frame {} drew {} instances",
            report.frame,
            report.instance_count
        );
        self.frame_count += 1;
        Ok(report)
    }

    /// Number of frames run so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

//! # Input Manager
//!
//! Tracks the down state of the keys and buttons the engine reacts to and
//! turns it into per-frame transitions. Events are fed in as they arrive;
//! once per frame the manager is drained with
//! [`InputManager::get_and_reset_processed_input`].

use std::collections::HashMap;

use winit::{
    event::{ElementState, MouseButton},
    keyboard::KeyCode,
};

use super::input_state::{MouseInput, ProcessedInputState, RawInputState};

const KEY_CODES: [KeyCode; 6] = [
    KeyCode::KeyW,
    KeyCode::KeyS,
    KeyCode::KeyA,
    KeyCode::KeyD,
    KeyCode::Space,
    KeyCode::ShiftLeft,
];

const MOUSE_BUTTONS: [MouseButton; 2] = [MouseButton::Left, MouseButton::Right];

/// Manages the state of all input devices.
#[derive(Debug)]
pub struct InputManager {
    /// Previous state of all tracked keyboard keys
    pub keyboard_inputs_old: HashMap<KeyCode, bool>,
    /// Current state of all tracked keyboard keys
    pub keyboard_inputs_new: HashMap<KeyCode, bool>,

    /// Current state of mouse inputs
    pub mouse_inputs: MouseInput,
}

impl InputManager {
    /// Creates a new InputManager with every tracked key and button released.
    pub fn new() -> Self {
        let keyboard_inputs_old: HashMap<_, _> = KEY_CODES.iter().map(|&key| (key, false)).collect();
        let keyboard_inputs_new = keyboard_inputs_old.clone();

        let mouse_button_inputs_old: HashMap<_, _> =
            MOUSE_BUTTONS.iter().map(|&button| (button, false)).collect();
        let mouse_button_inputs_new = mouse_button_inputs_old.clone();
        let mouse_button_pressed_since_last_frame = mouse_button_inputs_old.clone();

        Self {
            keyboard_inputs_old,
            keyboard_inputs_new,
            mouse_inputs: MouseInput {
                mouse_button_inputs_old,
                mouse_button_inputs_new,
                mouse_button_pressed_since_last_frame,
                mouse_delta: None,
            },
        }
    }

    /// Updates the old state with the current state to prepare for the next frame.
    pub fn move_old_states(&mut self) {
        for (key, new_state) in self.keyboard_inputs_new.iter() {
            if let Some(old_state) = self.keyboard_inputs_old.get_mut(key) {
                *old_state = *new_state;
            }
        }

        for (button, new_state) in self.mouse_inputs.mouse_button_inputs_new.iter() {
            if let Some(old_state) = self.mouse_inputs.mouse_button_inputs_old.get_mut(button) {
                *old_state = *new_state;
            }
        }
    }

    /// Records a key event. Untracked keys are ignored.
    pub fn intake_key(&mut self, key: KeyCode, state: ElementState) {
        if let Some(key_state) = self.keyboard_inputs_new.get_mut(&key) {
            *key_state = state == ElementState::Pressed;
        }
    }

    /// Records a mouse button event. Untracked buttons are ignored.
    ///
    /// A press is latched until the next frame, so a click released before
    /// the frame is drained still reads as pressed.
    pub fn intake_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        if let Some(button_state) = self.mouse_inputs.mouse_button_inputs_new.get_mut(&button) {
            *button_state = state == ElementState::Pressed;
        }
        if state == ElementState::Pressed {
            if let Some(latched) = self
                .mouse_inputs
                .mouse_button_pressed_since_last_frame
                .get_mut(&button)
            {
                *latched = true;
            }
        }
    }

    /// Accumulates mouse movement since the last frame.
    pub fn intake_mouse_motion(&mut self, delta: (f64, f64)) {
        let (x, y) = self.mouse_inputs.mouse_delta.unwrap_or((0.0, 0.0));
        self.mouse_inputs.mouse_delta = Some((x + delta.0, y + delta.1));
    }

    /// Translates the raw down states into transitions.
    pub fn create_processed_input_state(&self) -> ProcessedInputState {
        let keyboard_states = self
            .keyboard_inputs_new
            .iter()
            .map(|(key, &new_state)| {
                let old_state = self.keyboard_inputs_old.get(key).copied().unwrap_or(false);
                (*key, RawInputState::from_raw_states(old_state, new_state))
            })
            .collect();

        let mouse_button_states = self
            .mouse_inputs
            .mouse_button_inputs_new
            .iter()
            .map(|(button, &new_state)| {
                let old_state = self
                    .mouse_inputs
                    .mouse_button_inputs_old
                    .get(button)
                    .copied()
                    .unwrap_or(false);
                let latched = self
                    .mouse_inputs
                    .mouse_button_pressed_since_last_frame
                    .get(button)
                    .copied()
                    .unwrap_or(false);
                let state = if latched {
                    RawInputState::Pressed
                } else {
                    RawInputState::from_raw_states(old_state, new_state)
                };
                (*button, state)
            })
            .collect();

        ProcessedInputState {
            keyboard_states,
            mouse_button_states,
            mouse_delta: self.mouse_inputs.mouse_delta,
        }
    }

    /// Returns the processed input state and prepares for the next frame.
    pub fn get_and_reset_processed_input(&mut self) -> ProcessedInputState {
        let processed_input = self.create_processed_input_state();
        self.reset_inputs();
        processed_input
    }

    /// Carries the current down states over as the previous ones and clears
    /// the mouse movement and latched presses.
    pub fn reset_inputs(&mut self) {
        self.move_old_states();
        self.mouse_inputs.mouse_delta = None;
        self.mouse_inputs
            .mouse_button_pressed_since_last_frame
            .values_mut()
            .for_each(|latched| *latched = false);
    }

    /// Releases every key and button, e.g. when focus is lost.
    pub fn release_all(&mut self) {
        self.keyboard_inputs_new
            .values_mut()
            .chain(self.mouse_inputs.mouse_button_inputs_new.values_mut())
            .for_each(|state| *state = false);
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

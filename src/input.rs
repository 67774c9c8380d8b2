//! Keyboard input state polled by the scene update loop.

use std::collections::HashSet;

use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Tracks keyboard state across frames.
///
/// The scene polls this once per update: `key_down` for held movement keys,
/// `key_pressed` for edge-triggered toggles.
pub struct Input {
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    keys_released: HashSet<KeyCode>,
}

impl Default for Input {
    fn default() -> Self {
        Self {
            keys_down: HashSet::new(),
            keys_pressed: HashSet::new(),
            keys_released: HashSet::new(),
        }
    }
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call at the start of each frame to reset per-frame state.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
    }

    /// Process a window event and update input state.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        if let WindowEvent::KeyboardInput { event, .. } = event {
            if let PhysicalKey::Code(key) = event.physical_key {
                match event.state {
                    ElementState::Pressed => {
                        if !self.keys_down.contains(&key) {
                            self.keys_pressed.insert(key);
                        }
                        self.keys_down.insert(key);
                    }
                    ElementState::Released => {
                        self.keys_down.remove(&key);
                        self.keys_released.insert(key);
                    }
                }
            }
        }
    }

    /// Returns true if the key is currently held down.
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Returns true if the key was pressed this frame.
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Returns true if the key was released this frame.
    pub fn key_released(&self, key: KeyCode) -> bool {
        self.keys_released.contains(&key)
    }
}

/// Key bindings for the object control surface: rotation on three axes plus
/// movement along the local forward axis.
#[derive(Clone, Copy, Debug)]
pub struct ModelKeys {
    pub turn_up: KeyCode,
    pub turn_down: KeyCode,
    pub turn_left: KeyCode,
    pub turn_right: KeyCode,
    pub roll_cw: KeyCode,
    pub roll_ccw: KeyCode,
    pub move_forward: KeyCode,
    pub move_backward: KeyCode,
}

impl ModelKeys {
    /// The IJKL/UO cluster used for the featured model.
    pub fn ijkl() -> Self {
        Self {
            turn_up: KeyCode::KeyI,
            turn_down: KeyCode::KeyK,
            turn_left: KeyCode::KeyJ,
            turn_right: KeyCode::KeyL,
            roll_cw: KeyCode::KeyU,
            roll_ccw: KeyCode::KeyO,
            move_forward: KeyCode::Period,
            move_backward: KeyCode::Comma,
        }
    }
}

/// Key bindings for the camera control surface: pitch/yaw plus
/// forward/backward/strafe movement.
#[derive(Clone, Copy, Debug)]
pub struct CameraKeys {
    pub turn_up: KeyCode,
    pub turn_down: KeyCode,
    pub turn_left: KeyCode,
    pub turn_right: KeyCode,
    pub move_forward: KeyCode,
    pub move_backward: KeyCode,
    pub strafe_left: KeyCode,
    pub strafe_right: KeyCode,
}

impl CameraKeys {
    /// Arrow keys for looking, WASD for movement.
    pub fn arrows_wasd() -> Self {
        Self {
            turn_up: KeyCode::ArrowUp,
            turn_down: KeyCode::ArrowDown,
            turn_left: KeyCode::ArrowLeft,
            turn_right: KeyCode::ArrowRight,
            move_forward: KeyCode::KeyW,
            move_backward: KeyCode::KeyS,
            strafe_left: KeyCode::KeyA,
            strafe_right: KeyCode::KeyD,
        }
    }

    /// The TFGH/VB/NM cluster used for the portal camera.
    pub fn tfgh() -> Self {
        Self {
            turn_up: KeyCode::KeyT,
            turn_down: KeyCode::KeyG,
            turn_left: KeyCode::KeyF,
            turn_right: KeyCode::KeyH,
            move_forward: KeyCode::KeyV,
            move_backward: KeyCode::KeyB,
            strafe_left: KeyCode::KeyN,
            strafe_right: KeyCode::KeyM,
        }
    }
}

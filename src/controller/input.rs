/// Platform-agnostic input handling system
use std::collections::HashSet;

use glam::{Vec2, Vec3};

/// Modifier keys held while a key went down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub alt: bool,
}

/// Platform-independent input events. Keys are physical key codes using the
/// DOM `KeyboardEvent.code` names ("KeyW", "ArrowUp", "Equal", ...), which is
/// also how winit spells its `KeyCode` variants.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown { code: String, modifiers: Modifiers },
    KeyUp { code: String },

    PointerDown { button: MouseButton, x: f32, y: f32 },
    PointerUp { button: MouseButton },
    PointerMove { x: f32, y: f32 },

    FocusLost,
    VisibilityChanged { visible: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub fn from_web_button(button: i16) -> Self {
        match button {
            0 => MouseButton::Left,
            1 => MouseButton::Middle,
            2 => MouseButton::Right,
            _ => MouseButton::Left,
        }
    }
}

/// Fly-camera input accumulated between frames.
#[derive(Debug, Default, Clone)]
pub struct InputState {
    pub pressed_keys: HashSet<String>,
    pub dragging: bool,
    /// Pointer offset from the viewport centre in [-1, 1]: x is yaw-left, y is pitch-down.
    pub look: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process an input event and update state. `logical_size` is the host
    /// size the pointer coordinates are relative to.
    pub fn process_event(&mut self, event: &InputEvent, logical_size: (u32, u32), drag_to_look: bool) {
        match event {
            InputEvent::KeyDown { code, .. } => {
                self.pressed_keys.insert(code.clone());
            }
            InputEvent::KeyUp { code } => {
                self.pressed_keys.remove(code.as_str());
            }
            InputEvent::PointerDown { x, y, .. } => {
                self.dragging = true;
                if drag_to_look {
                    self.look = pointer_look(*x, *y, logical_size);
                }
            }
            InputEvent::PointerUp { .. } => {
                self.dragging = false;
                if drag_to_look {
                    self.look = Vec2::ZERO;
                }
            }
            InputEvent::PointerMove { x, y } => {
                if !drag_to_look || self.dragging {
                    self.look = pointer_look(*x, *y, logical_size);
                }
            }
            InputEvent::FocusLost | InputEvent::VisibilityChanged { .. } => {
                self.clear();
            }
        }
    }

    pub fn is_key_pressed(&self, key: &str) -> bool {
        self.pressed_keys.contains(key)
    }

    pub fn clear(&mut self) {
        self.pressed_keys.clear();
        self.dragging = false;
        self.look = Vec2::ZERO;
    }
}

fn pointer_look(x: f32, y: f32, (width, height): (u32, u32)) -> Vec2 {
    let half_w = (width.max(1) as f32) / 2.0;
    let half_h = (height.max(1) as f32) / 2.0;
    Vec2::new(
        (-(x - half_w) / half_w).clamp(-1.0, 1.0),
        ((y - half_h) / half_h).clamp(-1.0, 1.0),
    )
}

/// Key mapping configuration
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub forward: String,
    pub backward: String,
    pub left: String,
    pub right: String,
    pub up: String,
    pub down: String,
    pub pitch_up: String,
    pub pitch_down: String,
    pub yaw_left: String,
    pub yaw_right: String,
    pub roll_left: String,
    pub roll_right: String,
    pub quality_up: String,
    pub quality_down: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: "KeyW".to_string(),
            backward: "KeyS".to_string(),
            left: "KeyA".to_string(),
            right: "KeyD".to_string(),
            up: "KeyR".to_string(),
            down: "KeyF".to_string(),
            pitch_up: "ArrowUp".to_string(),
            pitch_down: "ArrowDown".to_string(),
            yaw_left: "ArrowLeft".to_string(),
            yaw_right: "ArrowRight".to_string(),
            roll_left: "KeyQ".to_string(),
            roll_right: "KeyE".to_string(),
            quality_up: "Equal".to_string(),
            quality_down: "Minus".to_string(),
        }
    }
}

/// High-level input processor
#[derive(Debug, Clone, Default)]
pub struct InputProcessor {
    bindings: KeyBindings,
}

impl InputProcessor {
    fn axis(&self, input: &InputState, negative: &str, positive: &str) -> f32 {
        let mut v = 0.0;
        if input.is_key_pressed(negative) {
            v -= 1.0;
        }
        if input.is_key_pressed(positive) {
            v += 1.0;
        }
        v
    }

    /// Local-space translation direction: x right, y up, z back.
    pub fn move_vector(&self, input: &InputState) -> Vec3 {
        let b = &self.bindings;
        Vec3::new(
            self.axis(input, &b.left, &b.right),
            self.axis(input, &b.down, &b.up),
            self.axis(input, &b.forward, &b.backward),
        )
    }

    /// Local-space rotation rates: x pitch, y yaw, z roll.
    pub fn rotation_vector(&self, input: &InputState) -> Vec3 {
        let b = &self.bindings;
        Vec3::new(
            self.axis(input, &b.pitch_down, &b.pitch_up) - input.look.y,
            self.axis(input, &b.yaw_right, &b.yaw_left) + input.look.x,
            self.axis(input, &b.roll_right, &b.roll_left),
        )
    }

    /// Holding shift slows translation down for fine positioning.
    pub fn speed_multiplier(&self, input: &InputState) -> f32 {
        if input.is_key_pressed("ShiftLeft") || input.is_key_pressed("ShiftRight") {
            0.1
        } else {
            1.0
        }
    }

    /// Shift + `=` raises quality, Shift + `-` lowers it. Anything with Alt
    /// held is left to the host.
    pub fn quality_adjustment(&self, code: &str, modifiers: Modifiers, step: f64) -> Option<f64> {
        if modifiers.alt || !modifiers.shift {
            return None;
        }
        if code == self.bindings.quality_up {
            Some(step)
        } else if code == self.bindings.quality_down {
            Some(-step)
        } else {
            None
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use super::*;
    use web_sys::{KeyboardEvent, MouseEvent};

    pub fn keyboard_event_to_input(e: &KeyboardEvent, is_down: bool) -> InputEvent {
        let code = e.code();
        if is_down {
            InputEvent::KeyDown {
                code,
                modifiers: Modifiers {
                    shift: e.shift_key(),
                    alt: e.alt_key(),
                },
            }
        } else {
            InputEvent::KeyUp { code }
        }
    }

    pub fn mouse_down_to_input(e: &MouseEvent) -> InputEvent {
        InputEvent::PointerDown {
            button: MouseButton::from_web_button(e.button()),
            x: e.client_x() as f32,
            y: e.client_y() as f32,
        }
    }

    pub fn mouse_up_to_input(e: &MouseEvent) -> InputEvent {
        InputEvent::PointerUp {
            button: MouseButton::from_web_button(e.button()),
        }
    }

    pub fn mouse_move_to_input(e: &MouseEvent) -> InputEvent {
        InputEvent::PointerMove {
            x: e.client_x() as f32,
            y: e.client_y() as f32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_down(code: &str) -> InputEvent {
        InputEvent::KeyDown {
            code: code.to_string(),
            modifiers: Modifiers::default(),
        }
    }

    #[test]
    fn move_vector_from_held_keys() {
        let p = InputProcessor::default();
        let mut s = InputState::new();
        s.process_event(&key_down("KeyW"), (800, 600), true);
        s.process_event(&key_down("KeyD"), (800, 600), true);
        assert_eq!(p.move_vector(&s), Vec3::new(1.0, 0.0, -1.0));

        s.process_event(&key_down("KeyS"), (800, 600), true);
        assert_eq!(p.move_vector(&s), Vec3::new(1.0, 0.0, 0.0));

        s.process_event(&InputEvent::KeyUp { code: "KeyD".into() }, (800, 600), true);
        assert_eq!(p.move_vector(&s), Vec3::ZERO);
    }

    #[test]
    fn drag_to_look_only_steers_while_dragging() {
        let p = InputProcessor::default();
        let mut s = InputState::new();
        s.process_event(&InputEvent::PointerMove { x: 0.0, y: 0.0 }, (800, 600), true);
        assert_eq!(s.look, Vec2::ZERO);

        s.process_event(
            &InputEvent::PointerDown { button: MouseButton::Left, x: 400.0, y: 300.0 },
            (800, 600),
            true,
        );
        s.process_event(&InputEvent::PointerMove { x: 0.0, y: 600.0 }, (800, 600), true);
        assert_eq!(s.look, Vec2::new(1.0, 1.0));
        // Pointer left of centre yaws left, below centre pitches down.
        assert_eq!(p.rotation_vector(&s), Vec3::new(-1.0, 1.0, 0.0));

        s.process_event(&InputEvent::PointerUp { button: MouseButton::Left }, (800, 600), true);
        assert_eq!(p.rotation_vector(&s), Vec3::ZERO);
    }

    #[test]
    fn focus_loss_clears_everything() {
        let mut s = InputState::new();
        s.process_event(&key_down("KeyQ"), (10, 10), false);
        s.process_event(&InputEvent::PointerMove { x: 0.0, y: 0.0 }, (10, 10), false);
        s.process_event(&InputEvent::FocusLost, (10, 10), false);
        assert!(s.pressed_keys.is_empty());
        assert_eq!(s.look, Vec2::ZERO);
    }

    #[test]
    fn quality_keys_need_shift_and_no_alt() {
        let p = InputProcessor::default();
        let shift = Modifiers { shift: true, alt: false };
        assert_eq!(p.quality_adjustment("Equal", shift, 0.05), Some(0.05));
        assert_eq!(p.quality_adjustment("Minus", shift, 0.05), Some(-0.05));
        assert_eq!(p.quality_adjustment("Equal", Modifiers::default(), 0.05), None);
        assert_eq!(
            p.quality_adjustment("Equal", Modifiers { shift: true, alt: true }, 0.05),
            None
        );
        assert_eq!(p.quality_adjustment("KeyW", shift, 0.05), None);
    }

    #[test]
    fn shift_slows_movement() {
        let p = InputProcessor::default();
        let mut s = InputState::new();
        assert_eq!(p.speed_multiplier(&s), 1.0);
        s.process_event(&key_down("ShiftLeft"), (1, 1), true);
        assert_eq!(p.speed_multiplier(&s), 0.1);
    }
}

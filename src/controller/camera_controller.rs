use glam::{Quat, Vec3};

use crate::config::CameraConfig;
use crate::controller::input::{InputEvent, InputProcessor, InputState};
use crate::model::Camera;

/// Fly-camera integrator. Owns the camera and the input state accumulated
/// since the last frame, and turns both into motion once per frame.
pub struct CameraController {
    camera: Camera,
    input: InputState,
    processor: InputProcessor,
    pub move_speed: f32,
    pub roll_speed: f32,
    pub drag_to_look: bool,
}

impl CameraController {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            camera: Camera::new(config.start_position),
            input: InputState::new(),
            processor: InputProcessor::default(),
            move_speed: config.move_speed,
            roll_speed: config.roll_speed,
            drag_to_look: config.drag_to_look,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn processor(&self) -> &InputProcessor {
        &self.processor
    }

    pub fn handle_event(&mut self, event: &InputEvent, logical_size: (u32, u32)) {
        self.input.process_event(event, logical_size, self.drag_to_look);
    }

    /// Advance by `delta_ms`. Zero or negative deltas leave the camera alone.
    pub fn update(&mut self, delta_ms: f64) {
        if !(delta_ms > 0.0) {
            return;
        }
        let secs = (delta_ms / 1000.0) as f32;

        let move_mult = secs * self.move_speed * self.processor.speed_multiplier(&self.input);
        let movement = self.processor.move_vector(&self.input);
        if movement != Vec3::ZERO {
            self.camera.translate_local(movement * move_mult);
        }

        let rot = self.processor.rotation_vector(&self.input) * (secs * self.roll_speed);
        if rot != Vec3::ZERO {
            self.camera
                .rotate_local(Quat::from_xyzw(rot.x, rot.y, rot.z, 1.0).normalize());
        }
    }

    pub fn position(&self) -> Vec3 {
        self.camera.position
    }

    pub fn forward_vector(&self) -> Vec3 {
        self.camera.forward()
    }

    pub fn up_vector(&self) -> Vec3 {
        self.camera.up()
    }
}

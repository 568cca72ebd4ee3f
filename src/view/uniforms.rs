use glam::{Vec2, Vec3};

use crate::controller::CameraController;
use crate::model::Viewport;

/// Fixed parameters of the scene program, uploaded every frame unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneConstants {
    /// Ray-march hit threshold.
    pub minimum_distance: f32,
    /// Offset used for central-difference normals.
    pub normal_distance: f32,
    pub anaglyph: f32,
    pub forms: f32,
    pub space_folding: f32,
}

impl Default for SceneConstants {
    fn default() -> Self {
        Self {
            minimum_distance: 0.005,
            normal_distance: 1.3,
            anaglyph: 0.0,
            forms: 3.0,
            space_folding: 1.0,
        }
    }
}

/// One frame's worth of scene parameters. Built fresh each frame, consumed
/// once by the render pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformSet {
    /// Render (not logical) pixel size.
    pub resolution: Vec2,
    pub camera_position: Vec3,
    pub camera_forward: Vec3,
    pub camera_up: Vec3,
    pub time: f32,
    pub constants: SceneConstants,
}

/// GPU layout of `UniformSet`, matching `SceneUniforms` in `scene.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniforms {
    pub resolution: [f32; 2],
    pub time: f32,
    pub minimum_distance: f32,
    pub cam_position: [f32; 3],
    pub normal_distance: f32,
    pub cam_up: [f32; 3],
    pub anaglyph: f32,
    pub cam_dir: [f32; 3],
    pub forms: f32,
    pub space_folding: f32,
    pub _pad0: f32,
    pub _pad1: f32,
    pub _pad2: f32,
}

impl From<&UniformSet> for SceneUniforms {
    fn from(u: &UniformSet) -> Self {
        Self {
            resolution: u.resolution.to_array(),
            time: u.time,
            minimum_distance: u.constants.minimum_distance,
            cam_position: u.camera_position.to_array(),
            normal_distance: u.constants.normal_distance,
            cam_up: u.camera_up.to_array(),
            anaglyph: u.constants.anaglyph,
            cam_dir: u.camera_forward.to_array(),
            forms: u.constants.forms,
            space_folding: u.constants.space_folding,
            _pad0: 0.0,
            _pad1: 0.0,
            _pad2: 0.0,
        }
    }
}

pub struct UniformBuilder;

impl UniformBuilder {
    pub fn build(
        viewport: &Viewport,
        camera: &CameraController,
        scene_time: f64,
        constants: &SceneConstants,
    ) -> UniformSet {
        let (w, h) = viewport.render_size();
        UniformSet {
            resolution: Vec2::new(w as f32, h as f32),
            camera_position: camera.position(),
            camera_forward: camera.forward_vector(),
            camera_up: camera.up_vector(),
            time: scene_time as f32,
            constants: *constants,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;

    #[test]
    fn gpu_layout_is_std140_sized() {
        assert_eq!(std::mem::size_of::<SceneUniforms>(), 80);
        assert_eq!(std::mem::offset_of!(SceneUniforms, cam_position), 16);
        assert_eq!(std::mem::offset_of!(SceneUniforms, cam_up), 32);
        assert_eq!(std::mem::offset_of!(SceneUniforms, cam_dir), 48);
        assert_eq!(std::mem::offset_of!(SceneUniforms, space_folding), 64);
    }

    #[test]
    fn build_uses_render_size_and_camera_basis() {
        let viewport = Viewport::new(1000, 500, 0.5);
        let camera = CameraController::new(&CameraConfig {
            start_position: Vec3::new(1.0, 2.0, 3.0),
            ..CameraConfig::default()
        });
        let u = UniformBuilder::build(&viewport, &camera, 1.25, &SceneConstants::default());

        assert_eq!(u.resolution, Vec2::new(500.0, 250.0));
        assert_eq!(u.camera_position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(u.camera_forward, Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(u.camera_up, Vec3::Y);
        assert_eq!(u.time, 1.25);
        assert_eq!(u.constants.minimum_distance, 0.005);
        assert_eq!(u.constants.normal_distance, 1.3);
    }

    #[test]
    fn build_is_deterministic() {
        let viewport = Viewport::new(640, 480, 1.0);
        let camera = CameraController::new(&CameraConfig::default());
        let c = SceneConstants::default();
        assert_eq!(
            UniformBuilder::build(&viewport, &camera, 7.0, &c),
            UniformBuilder::build(&viewport, &camera, 7.0, &c)
        );
    }

    #[test]
    fn gpu_struct_carries_every_field() {
        let viewport = Viewport::new(320, 200, 1.0);
        let camera = CameraController::new(&CameraConfig::default());
        let set = UniformBuilder::build(&viewport, &camera, 0.5, &SceneConstants::default());
        let gpu = SceneUniforms::from(&set);
        assert_eq!(gpu.resolution, [320.0, 200.0]);
        assert_eq!(gpu.cam_dir, [0.0, 0.0, -1.0]);
        assert_eq!(gpu.forms, 3.0);
        assert_eq!(gpu.space_folding, 1.0);
        assert_eq!(gpu.anaglyph, 0.0);
    }
}

use glam::{Quat, Vec3};

/// Canonical view direction before any rotation is applied.
pub const CANONICAL_FORWARD: Vec3 = Vec3::new(0.0, 0.0, -1.0);
/// Canonical up direction before any rotation is applied.
pub const CANONICAL_UP: Vec3 = Vec3::Y;

/// Free-flying camera: a position and a unit quaternion, nothing else.
///
/// The projection lives in the shader, which only needs the eye position and
/// the forward/up basis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl Camera {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            orientation: Quat::IDENTITY,
        }
    }

    /// `(0, 0, -1)` rotated by the orientation, renormalized.
    pub fn forward(&self) -> Vec3 {
        (self.orientation * CANONICAL_FORWARD).normalize()
    }

    /// `(0, 1, 0)` rotated by the orientation, renormalized.
    pub fn up(&self) -> Vec3 {
        (self.orientation * CANONICAL_UP).normalize()
    }

    /// Move along the camera's local axes (x right, y up, z back).
    pub fn translate_local(&mut self, offset: Vec3) {
        self.position += self.orientation * offset;
    }

    /// Compose a local-space rotation and renormalize to keep the quaternion unit.
    pub fn rotate_local(&mut self, rotation: Quat) {
        self.orientation = (self.orientation * rotation).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn identity_orientation_looks_down_negative_z() {
        let cam = Camera::default();
        assert_abs_diff_eq!(cam.forward().z, -1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(cam.up().y, 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(cam.forward().cross(cam.up()).x, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn basis_stays_unit_length_for_arbitrary_orientations() {
        let mut cam = Camera::default();
        // Un-normalized on purpose: simulates accumulated drift.
        cam.orientation = Quat::from_xyzw(0.3, -1.7, 0.25, 0.9);
        assert_abs_diff_eq!(cam.forward().length(), 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(cam.up().length(), 1.0, epsilon = 1e-5);

        for i in 0..64 {
            let angle = i as f32 * 0.37;
            cam.rotate_local(Quat::from_euler(glam::EulerRot::XYZ, angle, angle * 0.5, -angle));
            assert_abs_diff_eq!(cam.forward().length(), 1.0, epsilon = 1e-5);
            assert_abs_diff_eq!(cam.up().length(), 1.0, epsilon = 1e-5);
            assert_abs_diff_eq!(cam.forward().dot(cam.up()), 0.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn translate_local_follows_orientation() {
        let mut cam = Camera::default();
        cam.rotate_local(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        cam.translate_local(Vec3::new(0.0, 0.0, -1.0));
        // Yawed left by 90 degrees, so "forward" is now -X.
        assert_abs_diff_eq!(cam.position.x, -1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(cam.position.z, 0.0, epsilon = 1e-5);
    }
}

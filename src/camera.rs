//! Look-at camera.
//!
//! The pipeline only needs eye, target and up; interactive controllers live
//! with the display code and mutate the camera between frames.

use crate::math::{Mat4, Vec3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

impl Default for Camera {
    /// At the origin, looking down −Z.
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::FORWARD, Vec3::UP)
    }
}

impl Camera {
    pub fn new(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        Self { eye, target, up }
    }

    /// Unit vector from the eye towards the target.
    pub fn forward(&self) -> Vec3 {
        (self.target - self.eye).normalize()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }
}

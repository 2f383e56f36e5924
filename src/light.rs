//! Lighting types for the renderer.

use crate::math::{Mat4, Vec3};

/// A point light with inverse-square falloff.
///
/// `intensity` is per channel and unbounded; the shaders divide it by the
/// squared distance to the shaded point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub intensity: Vec3,
}

impl PointLight {
    pub fn new(position: Vec3, intensity: Vec3) -> Self {
        Self {
            position,
            intensity,
        }
    }

    /// The same light with its position moved into another space (e.g. view space).
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        Self {
            position: matrix.transform_point(self.position),
            intensity: self.intensity,
        }
    }

    /// Intensity reaching `point` after inverse-square attenuation.
    pub fn intensity_at(&self, point: Vec3) -> Vec3 {
        let r2 = (self.position - point).magnitude_squared();
        if r2 <= f32::EPSILON {
            return self.intensity;
        }
        self.intensity / r2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn intensity_falls_off_with_square_distance() {
        let light = PointLight::new(Vec3::new(0.0, 2.0, 0.0), Vec3::splat(8.0));
        assert_relative_eq!(light.intensity_at(Vec3::ZERO).x, 2.0);
        assert_relative_eq!(light.intensity_at(Vec3::new(0.0, -2.0, 0.0)).y, 0.5);
    }

    #[test]
    fn coincident_point_does_not_blow_up() {
        let light = PointLight::new(Vec3::ONE, Vec3::splat(3.0));
        assert!(light.intensity_at(Vec3::ONE).is_finite());
    }

    #[test]
    fn transform_moves_position_only() {
        let light = PointLight::new(Vec3::new(1.0, 0.0, 0.0), Vec3::splat(5.0));
        let moved = light.transformed(&Mat4::translation(Vec3::new(0.0, 0.0, -3.0)));
        assert_eq!(moved.position, Vec3::new(1.0, 0.0, -3.0));
        assert_eq!(moved.intensity, light.intensity);
    }
}

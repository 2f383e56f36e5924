//! Model transform for meshes.
//!
//! Provides a [`Transform`] struct with a fluent API for managing position,
//! rotation (Euler angles), and scale.

use crate::math::{Mat4, Vec3};

/// A model transform with position, rotation (Euler angles), and scale.
///
/// Mutating methods return `&mut Self` for chaining:
///
/// ```ignore
/// mesh.transform_mut()
///     .set_position(Vec3::new(0.0, 0.0, -4.0))
///     .rotate_y_degrees(30.0)
///     .set_scale_uniform(2.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    position: Vec3,
    rotation: Vec3, // Euler angles in radians around x, y, z
    scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) -> &mut Self {
        self.position = position;
        self
    }

    pub fn translate(&mut self, delta: Vec3) -> &mut Self {
        self.position += delta;
        self
    }

    /// Euler angles in radians.
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Vec3) -> &mut Self {
        self.rotation = rotation;
        self
    }

    /// Set the rotation from Euler angles in degrees.
    pub fn set_rotation_degrees(&mut self, degrees: Vec3) -> &mut Self {
        self.rotation = Vec3::new(
            degrees.x.to_radians(),
            degrees.y.to_radians(),
            degrees.z.to_radians(),
        );
        self
    }

    pub fn rotate(&mut self, delta: Vec3) -> &mut Self {
        self.rotation += delta;
        self
    }

    pub fn rotate_y_degrees(&mut self, degrees: f32) -> &mut Self {
        self.rotation.y += degrees.to_radians();
        self
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Vec3) -> &mut Self {
        self.scale = scale;
        self
    }

    pub fn set_scale_uniform(&mut self, s: f32) -> &mut Self {
        self.scale = Vec3::splat(s);
        self
    }

    /// Model matrix.
    ///
    /// Order: Translation * RotationZ * RotationY * RotationX * Scale
    /// (scale first, then x, y, z rotations, then translation)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::translation(self.position)
            * Mat4::rotation_z(self.rotation.z)
            * Mat4::rotation_y(self.rotation.y)
            * Mat4::rotation_x(self.rotation.x)
            * Mat4::scaling(self.scale)
    }
}

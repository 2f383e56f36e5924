//! 4x4 transformation matrix using column-vector convention.
//!
//! # Convention
//! - Vectors are **column vectors** on the right: `Mat4 * Vec`
//! - Translation is stored in the **last column**
//! - Transforms chain **right-to-left**: `A * B * v` applies B first, then A
//! - View space is **right-handed**: the camera looks down −Z
//!
//! # Example
//! ```ignore
//! let mvp = projection * view * model; // model applied first
//! let clip = mvp * Vec4::point(vertex);
//! ```

use std::ops::Mul;

use super::vec3::Vec3;
use super::vec4::Vec4;

/// Below this magnitude a pivot counts as zero and the matrix as singular.
const SINGULAR_EPSILON: f32 = 1e-12;

/// 4x4 matrix stored as `data[row][col]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    data: [[f32; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mat4 {
    pub const fn new(data: [[f32; 4]; 4]) -> Self {
        Mat4 { data }
    }

    pub const fn identity() -> Self {
        Mat4::new([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Creates a translation matrix.
    pub fn translation(v: Vec3) -> Self {
        Mat4::new([
            [1.0, 0.0, 0.0, v.x],
            [0.0, 1.0, 0.0, v.y],
            [0.0, 0.0, 1.0, v.z],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Creates a scale matrix.
    pub fn scaling(v: Vec3) -> Self {
        Mat4::new([
            [v.x, 0.0, 0.0, 0.0],
            [0.0, v.y, 0.0, 0.0],
            [0.0, 0.0, v.z, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Counter-clockwise rotation around +X (radians).
    pub fn rotation_x(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Mat4::new([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, c, -s, 0.0],
            [0.0, s, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Counter-clockwise rotation around +Y (radians).
    pub fn rotation_y(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Mat4::new([
            [c, 0.0, s, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [-s, 0.0, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Counter-clockwise rotation around +Z (radians).
    pub fn rotation_z(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Mat4::new([
            [c, -s, 0.0, 0.0],
            [s, c, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Right-handed perspective projection mapping view-space depth
    /// `[-near, -far]` to NDC `[-1, 1]`. Clip-space `w` equals `-z_view`.
    ///
    /// # Arguments
    /// * `fov_y` - Vertical field of view in radians
    /// * `aspect_ratio` - Width divided by height
    /// * `near`, `far` - Positive distances to the clip planes
    pub fn perspective_rh(fov_y: f32, aspect_ratio: f32, near: f32, far: f32) -> Self {
        let ty = 1.0 / (fov_y / 2.0).tan();
        let tx = ty / aspect_ratio;
        let range = far - near;
        Mat4::new([
            [tx, 0.0, 0.0, 0.0],
            [0.0, ty, 0.0, 0.0],
            [0.0, 0.0, -(far + near) / range, -2.0 * far * near / range],
            [0.0, 0.0, -1.0, 0.0],
        ])
    }

    /// Right-handed view matrix: the eye ends up at the origin looking down −Z.
    ///
    /// # Arguments
    ///
    /// * `eye` - The position of the camera.
    /// * `target` - The point the camera is looking at.
    /// * `up` - The up direction of the camera.
    pub fn look_at_rh(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        let back = (eye - target).normalize();
        let right = up.cross(back).normalize();
        let up = back.cross(right).normalize();

        Self::new([
            [right.x, right.y, right.z, -right.dot(eye)],
            [up.x, up.y, up.z, -up.dot(eye)],
            [back.x, back.y, back.z, -back.dot(eye)],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn transpose(&self) -> Self {
        let mut out = [[0.0f32; 4]; 4];
        for (row, values) in self.data.iter().enumerate() {
            for (col, value) in values.iter().enumerate() {
                out[col][row] = *value;
            }
        }
        Mat4::new(out)
    }

    /// Computes the inverse by Gauss-Jordan elimination with partial pivoting.
    /// Returns `None` if the matrix is singular.
    pub fn inverse(&self) -> Option<Mat4> {
        let mut m = self.data;
        let mut inv = Mat4::identity().data;

        for col in 0..4 {
            let pivot_row = (col..4).max_by(|&a, &b| m[a][col].abs().total_cmp(&m[b][col].abs()))?;
            if m[pivot_row][col].abs() < SINGULAR_EPSILON {
                return None;
            }
            m.swap(col, pivot_row);
            inv.swap(col, pivot_row);

            let scale = 1.0 / m[col][col];
            for k in 0..4 {
                m[col][k] *= scale;
                inv[col][k] *= scale;
            }

            for row in 0..4 {
                if row == col {
                    continue;
                }
                let factor = m[row][col];
                if factor == 0.0 {
                    continue;
                }
                for k in 0..4 {
                    m[row][k] -= factor * m[col][k];
                    inv[row][k] -= factor * inv[col][k];
                }
            }
        }

        Some(Mat4::new(inv))
    }

    /// Inverse-transpose, the matrix that keeps normals perpendicular to
    /// surfaces under non-uniform scale. Falls back to identity when singular.
    pub fn normal_matrix(&self) -> Mat4 {
        self.inverse().unwrap_or_default().transpose()
    }

    /// Transform a position (w=1) and drop w without dividing.
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        (*self * Vec4::point(p)).xyz()
    }

    /// Transform a direction (w=0).
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        (*self * Vec4::direction(v)).xyz()
    }

    /// Access element at [row][col].
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row][col]
    }
}

/// Matrix multiplication: `A * B` applies B first, then A.
impl Mul<Mat4> for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Self::Output {
        let mut result = [[0.0f32; 4]; 4];
        for (row, out) in result.iter_mut().enumerate() {
            for (col, cell) in out.iter_mut().enumerate() {
                *cell = (0..4).map(|k| self.data[row][k] * rhs.data[k][col]).sum();
            }
        }
        Mat4::new(result)
    }
}

/// Transform a Vec4 by a matrix: Mat4 * Vec4 (column vector).
impl Mul<Vec4> for Mat4 {
    type Output = Vec4;

    fn mul(self, v: Vec4) -> Self::Output {
        let row = |r: usize| {
            self.data[r][0] * v.x + self.data[r][1] * v.y + self.data[r][2] * v.z + self.data[r][3] * v.w
        };
        Vec4::new(row(0), row(1), row(2), row(3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_mat_eq(a: Mat4, b: Mat4) {
        for row in 0..4 {
            for col in 0..4 {
                assert_relative_eq!(a.get(row, col), b.get(row, col), epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn inverse_of_affine_transform_round_trips() {
        let m = Mat4::translation(Vec3::new(1.0, -2.0, 3.0))
            * Mat4::rotation_y(0.7)
            * Mat4::scaling(Vec3::new(2.0, 0.5, 3.0));
        let inv = m.inverse().expect("affine transform is invertible");
        assert_mat_eq(m * inv, Mat4::identity());
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        let m = Mat4::scaling(Vec3::new(1.0, 0.0, 1.0));
        assert!(m.inverse().is_none());
    }

    #[test]
    fn look_at_moves_eye_to_origin_facing_down_negative_z() {
        let eye = Vec3::new(0.0, 0.0, 5.0);
        let view = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::UP);
        let eye_in_view = view.transform_point(eye);
        assert_relative_eq!(eye_in_view.magnitude(), 0.0, epsilon = 1e-6);
        // The target sits straight ahead at -5
        let target = view.transform_point(Vec3::ZERO);
        assert_relative_eq!(target.z, -5.0, epsilon = 1e-6);
    }

    #[test]
    fn perspective_w_is_negated_view_depth() {
        let p = Mat4::perspective_rh(45f32.to_radians(), 1.0, 0.1, 50.0);
        let clip = p * Vec4::point(Vec3::new(0.3, -0.2, -4.0));
        assert_relative_eq!(clip.w, 4.0, epsilon = 1e-6);
        // Near plane maps to NDC -1, far plane to +1
        let near = p * Vec4::point(Vec3::new(0.0, 0.0, -0.1));
        let far = p * Vec4::point(Vec3::new(0.0, 0.0, -50.0));
        assert_relative_eq!(near.z / near.w, -1.0, epsilon = 1e-4);
        assert_relative_eq!(far.z / far.w, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn rotation_z_turns_x_into_y() {
        let v = Mat4::rotation_z(std::f32::consts::FRAC_PI_2).transform_vector(Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(v.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(v.y, 1.0, epsilon = 1e-6);
    }
}

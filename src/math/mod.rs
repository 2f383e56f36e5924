//! Small linear-algebra kit consumed by the pipeline.
//!
//! Everything is `f32` and `Copy`. Matrices use column vectors on the right
//! (`Mat4 * v`), see [`mat4`].

pub mod mat4;
pub mod vec2;
pub mod vec3;
pub mod vec4;

pub use mat4::Mat4;
pub use vec2::Vec2;
pub use vec3::Vec3;
pub use vec4::Vec4;

/// Below this magnitude a vector is left unnormalized instead of dividing by ~0.
pub const NORMALIZE_EPSILON: f32 = 1e-12;

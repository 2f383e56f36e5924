//! Vertex stage: model space to screen space.

use crate::math::{Mat4, Vec4};
use crate::triangle::Triangle;

/// Clip-space `w` at or below this means the vertex is at or behind the eye.
pub const W_EPSILON: f32 = 1e-5;

/// Matrices and viewport shared by every triangle of one mesh in one frame.
///
/// Built on the calling thread before any worker starts and only read
/// afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformContext {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
    /// `view * model`
    pub model_view: Mat4,
    /// `projection * view * model`
    pub mvp: Mat4,
    /// Inverse-transpose of `view * model`, for normals.
    pub normal_matrix: Mat4,
    pub width: f32,
    pub height: f32,
}

impl TransformContext {
    pub fn new(model: Mat4, view: Mat4, projection: Mat4, width: usize, height: usize) -> Self {
        let model_view = view * model;
        Self {
            model,
            view,
            projection,
            model_view,
            mvp: projection * model_view,
            normal_matrix: model_view.normal_matrix(),
            width: width as f32,
            height: height as f32,
        }
    }
}

/// Programmable vertex stage.
pub trait VertexShader: Send + Sync {
    /// Rewrite `triangle` in place from model space to screen space.
    ///
    /// Returns `false` when the triangle can't be projected; the caller then
    /// skips it and the triangle may be left partially written.
    fn transform(&self, ctx: &TransformContext, triangle: &mut Triangle) -> bool;
}

/// Standard perspective transform.
///
/// Positions go through `mvp`, the perspective divide and the viewport map
/// `(ndc + 1) / 2 * size`; z keeps the NDC depth. View-space positions are
/// cached for perspective-correct interpolation and normals go through the
/// normal matrix without being renormalized.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerspectiveShader;

impl VertexShader for PerspectiveShader {
    fn transform(&self, ctx: &TransformContext, triangle: &mut Triangle) -> bool {
        let model = *triangle.vertices();
        let mut screen = model;
        for (i, position) in model.into_iter().enumerate() {
            let p = Vec4::point(position);
            let clip = ctx.mvp * p;
            if !(clip.w > W_EPSILON) {
                return false;
            }
            let ndc = clip.xyz() / clip.w;
            screen[i].x = (ndc.x + 1.0) * 0.5 * ctx.width;
            screen[i].y = (ndc.y + 1.0) * 0.5 * ctx.height;
            screen[i].z = ndc.z;
            triangle.view_pos[i] = (ctx.model_view * p).xyz();
        }
        for normal in &mut triangle.normal {
            *normal = ctx.normal_matrix.transform_vector(*normal);
        }
        triangle.set_vertices(screen);
        true
    }
}

//! Rasterization core.
//!
//! Turns screen-space triangles into samples:
//! - [`fill_triangle`]: edge functions, perspective-correct attributes,
//!   depth test and shading
//! - [`draw_outline`] / [`draw_points`]: clipped Bresenham wireframes and vertex
//!   dots, written without a depth test

mod edgefunction;
mod line;

pub use edgefunction::fill_triangle;
pub use line::{clip_segment, draw_line, draw_outline, draw_points};

use std::ops::AddAssign;

use crate::math::{Vec2, Vec3};
use crate::shader::{FragmentPayload, FragmentShader, ShadeContext};

/// View-space depths closer to zero than this can't be perspective-corrected.
pub const DEPTH_EPSILON: f32 = 1e-6;

/// Per-triangle sample counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RasterCounts {
    /// Fragment shader invocations.
    pub shaded: usize,
    /// Samples that lost the depth test, before or after shading.
    pub depth_rejected: usize,
}

impl AddAssign for RasterCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.shaded += rhs.shaded;
        self.depth_rejected += rhs.depth_rejected;
    }
}

/// The shader bound for one mesh, together with everything it reads.
pub struct FragmentStage<'a> {
    shader: &'a dyn FragmentShader,
    ctx: ShadeContext<'a>,
    ambient_intensity: Vec3,
}

impl<'a> FragmentStage<'a> {
    pub fn new(shader: &'a dyn FragmentShader, ctx: ShadeContext<'a>, ambient_intensity: Vec3) -> Self {
        Self {
            shader,
            ctx,
            ambient_intensity,
        }
    }

    #[inline]
    fn payload(&self, view_pos: Vec3, color: Vec3, normal: Vec3, tex_coords: Vec2, screen_pos: Vec2) -> FragmentPayload {
        FragmentPayload {
            view_pos,
            color,
            normal,
            tex_coords,
            ambient_intensity: self.ambient_intensity,
            screen_pos,
        }
    }

    #[inline]
    fn shade(&self, payload: &FragmentPayload) -> Vec3 {
        self.shader.shade(payload, &self.ctx)
    }
}

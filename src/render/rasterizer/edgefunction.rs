//! Edge-function triangle fill.
//!
//! # Algorithm Overview
//!
//! 1. Reject back-facing and degenerate triangles (signed double area).
//! 2. Compute the bounding box in sample units, clipped to the target.
//! 3. For every sample in the box, test it against the three edge functions.
//!    Samples exactly on an edge go to the triangle that owns the edge
//!    (top-left rule), so shared edges are drawn once.
//! 4. Turn the edge values into barycentric weights and correct them for
//!    perspective with the view-space depths:
//!
//! ```text
//! z  = 1 / (α/z0 + β/z1 + γ/z2)
//! α' = α/z0 · z,  β' = β/z1 · z,  γ' = γ/z2 · z
//! ```
//!
//! 5. Depth test against the stored sample, shade, then commit color and
//!    depth in one step so a racing writer can't slip in between.
//!
//! # References
//!
//! - Juan Pineda, "A Parallel Algorithm for Polygon Rasterization" (1988)
//! - Scratchapixel: <https://www.scratchapixel.com/lessons/3d-basic-rendering/rasterization-practical-implementation>

use super::{FragmentStage, RasterCounts, DEPTH_EPSILON};
use crate::math::Vec2;
use crate::render::samples::SampleTarget;
use crate::triangle::{interpolate, BoundingBox, Triangle};

/// Bounding box in sample units, clipped to the columns and rows `target`
/// may write.
fn sample_bounds<T: SampleTarget + ?Sized>(triangle: &Triangle, samples_per_axis: usize, target: &T) -> BoundingBox {
    let n = samples_per_axis as f32;
    let [a, b, c] = *triangle.vertices();
    let min = a.min_elem(b).min_elem(c) * n;
    let max = a.max_elem(b).max_elem(c) * n;
    let rows = target.rows();
    let bb = BoundingBox {
        min_x: min.x.floor() as i32,
        min_y: min.y.floor() as i32,
        max_x: max.x.ceil() as i32,
        max_y: max.y.ceil() as i32,
    }
    .clip(target.width() as i32, rows.end as i32);
    BoundingBox {
        min_y: bb.min_y.max(rows.start as i32),
        ..bb
    }
}

/// Fill a screen-space triangle into `target`.
///
/// `triangle` must hold screen positions and the view-space positions the
/// vertex stage cached. Culled triangles and triangles with a vertex on the
/// eye plane produce nothing.
pub fn fill_triangle<T: SampleTarget + ?Sized>(
    triangle: &Triangle,
    samples_per_axis: usize,
    target: &mut T,
    stage: &FragmentStage,
) -> RasterCounts {
    let mut counts = RasterCounts::default();
    if triangle.is_culled() {
        return counts;
    }

    let z = triangle.view_pos.map(|p| p.z);
    if z.iter().any(|z| z.abs() < DEPTH_EPSILON) {
        return counts;
    }
    let inv_z = z.map(|z| 1.0 / z);

    let bb = sample_bounds(triangle, samples_per_axis, target);
    if bb.is_empty() {
        return counts;
    }

    let n = samples_per_axis as f32;
    for sy in bb.min_y..bb.max_y {
        let py = (sy as f32 + 0.5) / n;
        for sx in bb.min_x..bb.max_x {
            let px = (sx as f32 + 0.5) / n;
            if !triangle.contains(px, py) {
                continue;
            }

            let [alpha, beta, gamma] = triangle.barycentric(px, py);
            let w = [alpha * inv_z[0], beta * inv_z[1], gamma * inv_z[2]];
            let depth = 1.0 / (w[0] + w[1] + w[2]);
            if !depth.is_finite() {
                continue;
            }
            let weights = w.map(|w| w * depth);

            let (x, y) = (sx as usize, sy as usize);
            if !target.passes(x, y, depth) {
                counts.depth_rejected += 1;
                continue;
            }

            let payload = stage.payload(
                interpolate(weights, &triangle.view_pos),
                interpolate(weights, &triangle.color),
                interpolate(weights, &triangle.normal).normalize(),
                interpolate(weights, &triangle.tex_coords),
                Vec2::new(px, py),
            );
            let color = stage.shade(&payload);
            counts.shaded += 1;

            if !target.commit(x, y, depth, color) {
                counts.depth_rejected += 1;
            }
        }
    }
    counts
}

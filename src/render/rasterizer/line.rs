//! Wireframe and vertex drawing.
//!
//! Lines and points work in whole pixels: every sub-sample of a touched pixel
//! gets the color, so outlines stay solid after the resolve. No depth test.

use crate::math::Vec3;
use crate::render::samples::SampleTarget;
use crate::triangle::Triangle;

/// Paint all sub-samples of pixel `(x, y)` that `target` owns.
#[inline]
fn put_pixel<T: SampleTarget + ?Sized>(target: &mut T, samples_per_axis: usize, x: i64, y: i64, color: Vec3) {
    let n = samples_per_axis;
    let width = target.width();
    let rows = target.rows();
    let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) else {
        return;
    };
    let (Some(x), Some(y)) = (x.checked_mul(n), y.checked_mul(n)) else {
        return;
    };
    if x >= width || y >= rows.end {
        return;
    }
    for sy in y.max(rows.start)..(y + n).min(rows.end) {
        for sx in x..(x + n).min(width) {
            target.overwrite(sx, sy, color);
        }
    }
}

/// Bresenham's line between two pixel positions.
///
/// Only integer arithmetic: an error term tracks the distance between the
/// ideal line and the current pixel, and once it crosses a threshold the
/// step along the minor axis is taken too. Endpoints should already be
/// clipped (see [`clip_segment`]); the walk visits `max(|dx|, |dy|) + 1`
/// pixels.
pub fn draw_line<T: SampleTarget + ?Sized>(
    target: &mut T,
    samples_per_axis: usize,
    (x0, y0): (i32, i32),
    (x1, y1): (i32, i32),
    color: Vec3,
) {
    let (x0, y0, x1, y1) = (i64::from(x0), i64::from(y0), i64::from(x1), i64::from(y1));
    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let x_step = if x0 < x1 { 1 } else { -1 };
    let y_step = if y0 < y1 { 1 } else { -1 };

    // Positive error favours x movement, negative favours y
    let mut err = dx - dy;
    let (mut x, mut y) = (x0, y0);

    loop {
        put_pixel(target, samples_per_axis, x, y, color);
        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += x_step;
        }
        // Both branches may fire: a diagonal step
        if e2 < dx {
            err += dx;
            y += y_step;
        }
    }
}

/// Liang-Barsky clip of the segment `a`-`b` (continuous screen coordinates)
/// against the `width × height` pixel rectangle. Returns the pixels holding
/// the clipped endpoints, or `None` if nothing of the segment is visible.
pub fn clip_segment(a: Vec3, b: Vec3, width: usize, height: usize) -> Option<((i32, i32), (i32, i32))> {
    if width == 0 || height == 0 || !(a.x.is_finite() && a.y.is_finite() && b.x.is_finite() && b.y.is_finite()) {
        return None;
    }
    // f64 keeps far endpoints from swallowing the on-screen part
    let (ax, ay) = (f64::from(a.x), f64::from(a.y));
    let (w, h) = (width as f64, height as f64);
    let (dx, dy) = (f64::from(b.x) - ax, f64::from(b.y) - ay);
    let (mut t0, mut t1) = (0.0f64, 1.0f64);

    for (p, q) in [(-dx, ax), (dx, w - ax), (-dy, ay), (dy, h - ay)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
        }
    }
    if t0 > t1 {
        return None;
    }

    // Points on the far edges floor to one past the last pixel
    let pixel = |t: f64| {
        let x = (ax + t * dx).floor().clamp(0.0, w - 1.0) as i32;
        let y = (ay + t * dy).floor().clamp(0.0, h - 1.0) as i32;
        (x, y)
    };
    Some((pixel(t0), pixel(t1)))
}

#[inline]
fn pixel_of(v: Vec3) -> (i64, i64) {
    (v.x.floor() as i64, v.y.floor() as i64)
}

/// The three edges of a screen-space triangle, clipped to the image.
pub fn draw_outline<T: SampleTarget + ?Sized>(triangle: &Triangle, samples_per_axis: usize, target: &mut T, color: Vec3) {
    let n = samples_per_axis.max(1);
    let (width, height) = (target.width() / n, target.height() / n);
    let [a, b, c] = *triangle.vertices();
    for (from, to) in [(a, b), (b, c), (c, a)] {
        if let Some((p0, p1)) = clip_segment(from, to, width, height) {
            draw_line(target, samples_per_axis, p0, p1, color);
        }
    }
}

/// One pixel per vertex.
pub fn draw_points<T: SampleTarget + ?Sized>(triangle: &Triangle, samples_per_axis: usize, target: &mut T, color: Vec3) {
    for (x, y) in triangle.vertices().map(pixel_of) {
        put_pixel(target, samples_per_axis, x, y, color);
    }
}

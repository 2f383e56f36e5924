//! Triangle primitive with per-vertex attributes and cached screen-space edges.
//!
//! A [`Triangle`] starts life in model space inside a [`Mesh`](crate::mesh::Mesh).
//! Each frame a copy is pushed through a [`VertexShader`](crate::shader::VertexShader),
//! which overwrites the positions with screen coordinates and fills in the
//! view-space positions used for perspective correction.
//!
//! # Derived State
//!
//! The edge vectors (AB, BC, CA) and the signed double area are derived from
//! the vertex positions. Positions are private and every setter calls
//! [`Triangle::update`], so the derived state can't go stale.
//!
//! # Winding
//!
//! Screen space is y-up. A triangle is front-facing when its vertices are
//! counter-clockwise, i.e. when `AB × AC` is positive.

use std::ops::{Add, Mul};

use crate::math::{Vec2, Vec3};

/// Double areas at or below this are degenerate or back-facing.
pub const AREA_EPSILON: f32 = 1e-6;

/// 2D cross product (z of the 3D cross) of two vectors in the xy plane.
#[inline]
fn cross_2d(l: Vec3, r: Vec3) -> f32 {
    l.x * r.y - l.y * r.x
}

/// Whether an edge owns the samples lying exactly on it (top-left rule).
///
/// For counter-clockwise triangles in y-up space, "top" edges run in −x and
/// "left" edges run in −y. An edge shared by two triangles runs in opposite
/// directions in each, so exactly one of them owns it.
#[inline]
fn owns_boundary(edge: Vec3) -> bool {
    (edge.y == 0.0 && edge.x < 0.0) || edge.y < 0.0
}

/// Interpolate a per-vertex attribute with barycentric weights.
#[inline]
pub fn interpolate<T>(weights: [f32; 3], values: &[T; 3]) -> T
where
    T: Copy + Add<Output = T> + Mul<f32, Output = T>,
{
    values[0] * weights[0] + values[1] * weights[1] + values[2] * weights[2]
}

/// Integer bounding box, half-open on the max side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundingBox {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl BoundingBox {
    /// Intersect with `[0, width) x [0, height)`.
    pub fn clip(self, width: i32, height: i32) -> Self {
        Self {
            min_x: self.min_x.max(0),
            min_y: self.min_y.max(0),
            max_x: self.max_x.min(width),
            max_y: self.max_y.min(height),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min_x >= self.max_x || self.min_y >= self.max_y
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    vertex: [Vec3; 3],
    /// Vertex positions in view space, written by the vertex stage.
    pub view_pos: [Vec3; 3],
    /// Linear RGB in `[0, 1]`.
    pub color: [Vec3; 3],
    pub tex_coords: [Vec2; 3],
    pub normal: [Vec3; 3],

    ab: Vec3,
    bc: Vec3,
    ca: Vec3,
    double_area: f32,
}

impl Default for Triangle {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::ZERO, Vec3::ZERO)
    }
}

impl Triangle {
    /// A white triangle with zeroed normals and texture coordinates.
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        let mut triangle = Self {
            vertex: [a, b, c],
            view_pos: [a, b, c],
            color: [Vec3::ONE; 3],
            tex_coords: [Vec2::ZERO; 3],
            normal: [Vec3::ZERO; 3],
            ab: Vec3::ZERO,
            bc: Vec3::ZERO,
            ca: Vec3::ZERO,
            double_area: 0.0,
        };
        triangle.update();
        triangle
    }

    /// Recompute edge vectors and the signed double area from the positions.
    pub fn update(&mut self) {
        let [a, b, c] = self.vertex;
        self.ab = b - a;
        self.bc = c - b;
        self.ca = a - c;
        self.double_area = cross_2d(self.ab, -self.ca);
    }

    #[inline]
    pub fn vertices(&self) -> &[Vec3; 3] {
        &self.vertex
    }

    /// One vertex position, `None` past the third.
    #[inline]
    pub fn vertex(&self, index: usize) -> Option<Vec3> {
        self.vertex.get(index).copied()
    }

    /// Set one vertex position. Out-of-range indices are ignored.
    pub fn set_vertex(&mut self, index: usize, position: Vec3) {
        if let Some(slot) = self.vertex.get_mut(index) {
            *slot = position;
            self.update();
        }
    }

    pub fn set_vertices(&mut self, positions: [Vec3; 3]) {
        self.vertex = positions;
        self.update();
    }

    pub fn set_normal(&mut self, index: usize, normal: Vec3) {
        if let Some(slot) = self.normal.get_mut(index) {
            *slot = normal;
        }
    }

    pub fn set_color(&mut self, index: usize, color: Vec3) {
        if let Some(slot) = self.color.get_mut(index) {
            *slot = color;
        }
    }

    pub fn set_tex_coord(&mut self, index: usize, uv: Vec2) {
        if let Some(slot) = self.tex_coords.get_mut(index) {
            *slot = uv;
        }
    }

    /// Builder-style variant of setting all three colors.
    pub fn with_colors(mut self, colors: [Vec3; 3]) -> Self {
        self.color = colors;
        self
    }

    pub fn with_normals(mut self, normals: [Vec3; 3]) -> Self {
        self.normal = normals;
        self
    }

    pub fn with_tex_coords(mut self, uvs: [Vec2; 3]) -> Self {
        self.tex_coords = uvs;
        self
    }

    pub fn with_view_pos(mut self, view_pos: [Vec3; 3]) -> Self {
        self.view_pos = view_pos;
        self
    }

    /// Edge vectors AB, BC, CA.
    pub fn edges(&self) -> [Vec3; 3] {
        [self.ab, self.bc, self.ca]
    }

    /// Signed double area in the xy plane. Positive for counter-clockwise.
    #[inline]
    pub fn double_area(&self) -> f32 {
        self.double_area
    }

    /// Degenerate or back-facing.
    #[inline]
    pub fn is_culled(&self) -> bool {
        !(self.double_area > AREA_EPSILON)
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let [a, b, c] = self.vertex;
        let min = a.min_elem(b).min_elem(c);
        let max = a.max_elem(b).max_elem(c);
        BoundingBox {
            min_x: min.x.floor() as i32,
            min_y: min.y.floor() as i32,
            max_x: max.x.ceil() as i32,
            max_y: max.y.ceil() as i32,
        }
    }

    /// Edge functions `[E_AB(p), E_BC(p), E_CA(p)]`.
    ///
    /// Each is `edge × (p - edge_start)`, twice the signed area of the
    /// sub-triangle formed by the edge and `p`.
    #[inline]
    pub fn edge_functions(&self, x: f32, y: f32) -> [f32; 3] {
        let p = Vec3::new(x, y, 0.0);
        [
            cross_2d(self.ab, p - self.vertex[0]),
            cross_2d(self.bc, p - self.vertex[1]),
            cross_2d(self.ca, p - self.vertex[2]),
        ]
    }

    /// Inside test for a counter-clockwise triangle, with samples on an edge
    /// resolved by the top-left rule.
    #[inline]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        let e = self.edge_functions(x, y);
        let edges = [self.ab, self.bc, self.ca];
        e.iter()
            .zip(edges)
            .all(|(&value, edge)| value > 0.0 || (value == 0.0 && owns_boundary(edge)))
    }

    /// Screen-space barycentric weights `[α, β, γ]` for vertices A, B, C.
    ///
    /// Uses the same double area as the cull test as denominator, so the
    /// weights sum to one. Only meaningful when the triangle isn't culled.
    #[inline]
    pub fn barycentric(&self, x: f32, y: f32) -> [f32; 3] {
        let [e_ab, e_bc, _] = self.edge_functions(x, y);
        let inv_area = 1.0 / self.double_area;
        let alpha = e_bc * inv_area;
        let gamma = e_ab * inv_area;
        [alpha, 1.0 - alpha - gamma, gamma]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ccw() -> Triangle {
        Triangle::new(
            Vec3::new(100.0, 100.0, -1.0),
            Vec3::new(200.0, 100.0, -1.0),
            Vec3::new(150.0, 200.0, -1.0),
        )
    }

    #[test]
    fn derived_state_tracks_vertex_updates() {
        let mut t = ccw();
        assert_relative_eq!(t.double_area(), 10_000.0);
        t.set_vertex(2, Vec3::new(150.0, 300.0, -1.0));
        assert_relative_eq!(t.double_area(), 20_000.0);
        assert_eq!(t.edges()[1], Vec3::new(-50.0, 200.0, 0.0));
    }

    #[test]
    fn clockwise_and_flat_triangles_are_culled() {
        let cw = Triangle::new(
            Vec3::new(100.0, 100.0, -1.0),
            Vec3::new(150.0, 200.0, -1.0),
            Vec3::new(200.0, 100.0, -1.0),
        );
        assert!(cw.is_culled());

        let flat = Triangle::new(
            Vec3::new(0.0, 10.0, -1.0),
            Vec3::new(5.0, 10.0, -1.0),
            Vec3::new(9.0, 10.0, -1.0),
        );
        assert!(flat.is_culled());
        assert!(!ccw().is_culled());
    }

    #[test]
    fn barycentric_weights_sum_to_one_inside() {
        let t = ccw();
        for (x, y) in [(150.5, 120.5), (120.0, 101.0), (180.25, 110.75), (150.0, 199.0)] {
            assert!(t.contains(x, y));
            let w = t.barycentric(x, y);
            assert_relative_eq!(w[0] + w[1] + w[2], 1.0, epsilon = 1e-5);
            assert!(w.iter().all(|&v| v >= -1e-6));
        }
    }

    #[test]
    fn barycentric_weights_hit_vertices() {
        let t = ccw();
        let w = t.barycentric(100.0, 100.0);
        assert_relative_eq!(w[0], 1.0, epsilon = 1e-6);
        let w = t.barycentric(150.0, 200.0);
        assert_relative_eq!(w[2], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn shared_edge_is_owned_by_exactly_one_triangle() {
        // Two triangles sharing the diagonal of a square
        let lower = Triangle::new(
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::new(4.0, 0.0, -1.0),
            Vec3::new(4.0, 4.0, -1.0),
        );
        let upper = Triangle::new(
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::new(4.0, 4.0, -1.0),
            Vec3::new(0.0, 4.0, -1.0),
        );
        for i in 0..=4 {
            let p = i as f32;
            let owners = [lower.contains(p, p), upper.contains(p, p)];
            assert!(!(owners[0] && owners[1]), "({p}, {p}) shaded twice");
        }
        // Interior points of the diagonal belong to someone
        assert!(lower.contains(2.0, 2.0) ^ upper.contains(2.0, 2.0));
    }

    #[test]
    fn bounding_box_clips_to_viewport() {
        let t = Triangle::new(
            Vec3::new(-10.0, -10.0, -1.0),
            Vec3::new(50.0, -10.0, -1.0),
            Vec3::new(20.0, 40.0, -1.0),
        );
        let bb = t.bounding_box().clip(32, 32);
        assert_eq!(bb, BoundingBox { min_x: 0, min_y: 0, max_x: 32, max_y: 32 });

        let outside = Triangle::new(
            Vec3::new(100.0, 100.0, -1.0),
            Vec3::new(110.0, 100.0, -1.0),
            Vec3::new(105.0, 110.0, -1.0),
        );
        assert!(outside.bounding_box().clip(32, 32).is_empty());
    }

    #[test]
    fn out_of_range_indices_are_ignored() {
        let mut t = ccw();
        let before = t;
        t.set_vertex(3, Vec3::ONE);
        t.set_color(7, Vec3::ZERO);
        assert_eq!(t, before);
        assert_eq!(t.vertex(2), Some(t.vertices()[2]));
        assert_eq!(t.vertex(3), None);
    }
}

//! Fragment shaders.
//!
//! The rasterizer handles coverage, depth and perspective-correct
//! interpolation; a [`FragmentShader`] only turns the interpolated
//! [`FragmentPayload`] into a linear RGB color. All positions, lights and the
//! eye are in view space.

use crate::camera::Camera;
use crate::light::PointLight;
use crate::material::Material;
use crate::math::{Vec2, Vec3};
use crate::texture::Texture;

/// Below this `sqrt(x² + z²)` the analytic tangent is undefined.
const TANGENT_EPSILON: f32 = 1e-6;

/// Interpolated attributes for one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FragmentPayload {
    pub view_pos: Vec3,
    pub color: Vec3,
    /// Unit length unless the interpolated normal was zero.
    pub normal: Vec3,
    pub tex_coords: Vec2,
    pub ambient_intensity: Vec3,
    /// Sample position in screen pixels (y up).
    pub screen_pos: Vec2,
}

/// Per-mesh, per-frame state the shaders read.
#[derive(Debug, Clone, Copy)]
pub struct ShadeContext<'a> {
    pub material: &'a Material,
    /// Lights already moved into view space.
    pub lights: &'a [PointLight],
    pub camera: &'a Camera,
    /// Eye position in view space (the origin).
    pub eye: Vec3,
}

impl<'a> ShadeContext<'a> {
    pub fn new(material: &'a Material, lights: &'a [PointLight], camera: &'a Camera) -> Self {
        Self {
            material,
            lights,
            camera,
            eye: Vec3::ZERO,
        }
    }
}

/// Programmable per-sample shading.
pub trait FragmentShader: Send + Sync {
    fn shade(&self, payload: &FragmentPayload, ctx: &ShadeContext) -> Vec3;
}

impl<F> FragmentShader for F
where
    F: Fn(&FragmentPayload, &ShadeContext) -> Vec3 + Send + Sync,
{
    fn shade(&self, payload: &FragmentPayload, ctx: &ShadeContext) -> Vec3 {
        self(payload, ctx)
    }
}

/// Blinn-Phong summed over every light, with `kd` as the diffuse coefficient.
fn blinn_phong(kd: Vec3, point: Vec3, normal: Vec3, payload: &FragmentPayload, ctx: &ShadeContext) -> Vec3 {
    let material = ctx.material;
    let view_dir = (ctx.eye - point).normalize();
    let ambient = material.ambient.mul_elem(payload.ambient_intensity);

    let mut color = Vec3::ZERO;
    for light in ctx.lights {
        let l = (light.position - point).normalize();
        let h = (l + view_dir).normalize();
        let intensity = light.intensity_at(point);

        let diffuse = kd.mul_elem(intensity) * normal.dot(l).max(0.0);
        let specular = material.specular.mul_elem(intensity)
            * normal.dot(h).max(0.0).powf(material.specular_exponent);
        color += ambient + diffuse + specular;
    }
    color
}

/// Tangent and bitangent for a unit normal, from the sphere parameterisation
/// `t = (x·y/r, r, z·y/r)` with `r = sqrt(x² + z²)`.
pub fn tangent_frame(normal: Vec3) -> (Vec3, Vec3) {
    let Vec3 { x, y, z } = normal;
    let r = (x * x + z * z).sqrt();
    let tangent = if r > TANGENT_EPSILON {
        Vec3::new(x * y / r, r, z * y / r)
    } else {
        // Pole: any direction in the xz plane is perpendicular.
        Vec3::new(1.0, 0.0, 0.0)
    };
    (tangent, normal.cross(tangent).normalize())
}

/// Normal perturbed by finite differences of the height map around `uv`.
fn bumped_normal(texture: &Texture, uv: Vec2, normal: Vec3, kh: f32, kn: f32) -> Vec3 {
    let (t, b) = tangent_frame(normal);
    let du = Vec2::new(1.0 / texture.width() as f32, 0.0);
    let dv = Vec2::new(0.0, 1.0 / texture.height() as f32);
    let h = texture.height_at(uv);
    let d_u = kh * kn * (texture.height_at(uv + du) - h);
    let d_v = kh * kn * (texture.height_at(uv + dv) - h);
    (t * -d_u + b * -d_v + normal).normalize()
}

/// Visualises normals: `(n + 1) / 2`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalShader;

impl FragmentShader for NormalShader {
    fn shade(&self, payload: &FragmentPayload, _ctx: &ShadeContext) -> Vec3 {
        (payload.normal + Vec3::ONE) * 0.5
    }
}

/// One flat color for every sample.
#[derive(Debug, Clone, Copy)]
pub struct ConstantShader {
    pub color: Vec3,
}

impl ConstantShader {
    pub fn new(color: Vec3) -> Self {
        Self { color }
    }
}

impl FragmentShader for ConstantShader {
    fn shade(&self, _payload: &FragmentPayload, _ctx: &ShadeContext) -> Vec3 {
        self.color
    }
}

/// Interpolated vertex color, unlit.
#[derive(Debug, Clone, Copy, Default)]
pub struct VertexColorShader;

impl FragmentShader for VertexColorShader {
    fn shade(&self, payload: &FragmentPayload, _ctx: &ShadeContext) -> Vec3 {
        payload.color
    }
}

/// Blinn-Phong with `Kd = material.diffuse ⊙ vertex color`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhongShader;

impl FragmentShader for PhongShader {
    fn shade(&self, payload: &FragmentPayload, ctx: &ShadeContext) -> Vec3 {
        let kd = ctx.material.diffuse.mul_elem(payload.color);
        blinn_phong(kd, payload.view_pos, payload.normal, payload, ctx)
    }
}

/// Blinn-Phong with `Kd` sampled from the material texture.
///
/// Without a texture `Kd` is black, leaving ambient and specular terms.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextureShader;

impl FragmentShader for TextureShader {
    fn shade(&self, payload: &FragmentPayload, ctx: &ShadeContext) -> Vec3 {
        let kd = ctx
            .material
            .texture()
            .map_or(Vec3::ZERO, |t| t.sample(payload.tex_coords));
        blinn_phong(kd, payload.view_pos, payload.normal, payload, ctx)
    }
}

/// Bump mapping: the material texture is read as a height map that tilts
/// the normal, then Phong lighting.
#[derive(Debug, Clone, Copy)]
pub struct BumpShader {
    pub kh: f32,
    pub kn: f32,
}

impl Default for BumpShader {
    fn default() -> Self {
        Self { kh: 0.2, kn: 0.1 }
    }
}

impl FragmentShader for BumpShader {
    fn shade(&self, payload: &FragmentPayload, ctx: &ShadeContext) -> Vec3 {
        let normal = match ctx.material.texture() {
            Some(texture) => bumped_normal(texture, payload.tex_coords, payload.normal, self.kh, self.kn),
            None => payload.normal,
        };
        let kd = ctx.material.diffuse.mul_elem(payload.color);
        blinn_phong(kd, payload.view_pos, normal, payload, ctx)
    }
}

/// Like [`BumpShader`], and also pushes the shaded point along the bumped
/// normal by `kn · h(u, v)` before lighting.
#[derive(Debug, Clone, Copy)]
pub struct DisplacementShader {
    pub kh: f32,
    pub kn: f32,
}

impl Default for DisplacementShader {
    fn default() -> Self {
        Self { kh: 0.2, kn: 0.1 }
    }
}

impl FragmentShader for DisplacementShader {
    fn shade(&self, payload: &FragmentPayload, ctx: &ShadeContext) -> Vec3 {
        let (point, normal) = match ctx.material.texture() {
            Some(texture) => {
                let uv = payload.tex_coords;
                let normal = bumped_normal(texture, uv, payload.normal, self.kh, self.kn);
                let point = payload.view_pos + normal * (self.kn * texture.height_at(uv));
                (point, normal)
            }
            None => (payload.view_pos, payload.normal),
        };
        let kd = ctx.material.diffuse.mul_elem(payload.color);
        blinn_phong(kd, point, normal, payload, ctx)
    }
}

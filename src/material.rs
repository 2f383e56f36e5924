//! Surface materials.

use std::sync::Arc;

use crate::math::Vec3;
use crate::texture::Texture;

/// Broad class of surface. The rasterizer shades every kind the same way;
/// the tag travels with the material for consumers that care (e.g. a ray
/// tracer sharing the scene).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaterialKind {
    #[default]
    DiffuseAndGlossy,
    Reflection,
    ReflectionAndRefraction,
}

/// Blinn-Phong coefficients plus an optional diffuse texture.
///
/// Bound to a mesh for a whole frame; the texture is shared by reference
/// count so many meshes and all worker threads can read it.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub kind: MaterialKind,
    /// Ka
    pub ambient: Vec3,
    /// Kd
    pub diffuse: Vec3,
    /// Ks
    pub specular: Vec3,
    pub specular_exponent: f32,
    pub ior: f32,
    pub alpha: f32,
    pub texture: Option<Arc<Texture>>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            kind: MaterialKind::DiffuseAndGlossy,
            ambient: Vec3::splat(0.1),
            diffuse: Vec3::splat(0.8),
            specular: Vec3::splat(0.2),
            specular_exponent: 25.0,
            ior: 1.0,
            alpha: 1.0,
            texture: None,
        }
    }
}

impl Material {
    /// Soft, mostly diffuse skin tone.
    pub fn skin(texture: Option<Arc<Texture>>) -> Self {
        Self {
            ambient: Vec3::splat(0.01),
            diffuse: Vec3::new(0.9, 0.7, 0.6),
            specular: Vec3::splat(0.1),
            specular_exponent: 10.0,
            texture,
            ..Self::default()
        }
    }

    /// Tight, bright highlights over a textured body.
    pub fn cow(texture: Option<Arc<Texture>>) -> Self {
        Self {
            ambient: Vec3::splat(0.005),
            diffuse: Vec3::splat(0.8),
            specular: Vec3::splat(0.7937),
            specular_exponent: 150.0,
            texture,
            ..Self::default()
        }
    }

    pub fn metal() -> Self {
        Self {
            kind: MaterialKind::Reflection,
            ambient: Vec3::splat(0.1),
            diffuse: Vec3::ZERO,
            specular: Vec3::splat(0.9),
            specular_exponent: 100.0,
            ..Self::default()
        }
    }

    pub fn glass() -> Self {
        Self {
            kind: MaterialKind::ReflectionAndRefraction,
            ior: 1.5,
            alpha: 0.5,
            ..Self::metal()
        }
    }

    pub fn with_texture(mut self, texture: Arc<Texture>) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn texture(&self) -> Option<&Texture> {
        self.texture.as_deref()
    }
}

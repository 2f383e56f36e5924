//! A multi-threaded CPU triangle rasterizer.
//!
//! Triangles with per-vertex color, normal and texture coordinates go through
//! a programmable vertex stage, an edge-function rasterizer with
//! perspective-correct interpolation and a depth test, and a programmable
//! fragment stage. Optional supersampling anti-aliasing resolves into the
//! presented [`Frame`](render::Frame). Work is spread over a rayon thread
//! pool using one of several [`Schedule`](config::Schedule)s.
//!
//! # Quick Start
//!
//! ```ignore
//! use rasterpipe::prelude::*;
//!
//! let mut scene = Scene::new();
//! scene.set_camera(Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::UP));
//! scene.add(Mesh::cube(Material::default()));
//! scene.add(PointLight::new(Vec3::new(3.0, 3.0, 3.0), Vec3::splat(30.0)));
//!
//! let mut renderer = Renderer::new(RenderConfig::new(800, 600))?;
//! renderer.set_fragment_shader(PhongShader);
//! renderer.draw(&scene)?;
//! renderer.frame().save("cube.png")?;
//! ```

pub mod camera;
pub mod config;
pub mod error;
pub mod light;
pub mod material;
pub mod math;
pub mod mesh;
pub mod projection;
pub mod render;
pub mod scene;
pub mod shader;
pub mod texture;
pub mod transform;
pub mod triangle;

pub use config::{RenderConfig, RenderMode, Schedule};
pub use error::{LoadError, RenderError};
pub use render::{Frame, FrameStats, Renderer};
pub use scene::{Drawable, Scene};

/// Prelude module for convenient imports.
///
/// # Example
/// ```ignore
/// use rasterpipe::prelude::*;
/// ```
pub mod prelude {
    // Scene
    pub use crate::camera::Camera;
    pub use crate::light::PointLight;
    pub use crate::material::{Material, MaterialKind};
    pub use crate::mesh::Mesh;
    pub use crate::projection::Projection;
    pub use crate::scene::{Drawable, Scene};
    pub use crate::texture::{Filter, Texture};
    pub use crate::transform::Transform;
    pub use crate::triangle::Triangle;

    // Math
    pub use crate::math::{Mat4, Vec2, Vec3, Vec4};

    // Rendering
    pub use crate::config::{RenderConfig, RenderMode, Schedule};
    pub use crate::error::{LoadError, RenderError};
    pub use crate::render::{Frame, FrameStats, Renderer};
    pub use crate::shader::{
        BumpShader, ConstantShader, DisplacementShader, FragmentPayload, FragmentShader, NormalShader,
        PhongShader, ShadeContext, TextureShader, TransformContext, VertexColorShader, VertexShader,
    };
}

/// Module exposing internals for benchmarking. Not part of the stable API.
pub mod bench {
    pub use crate::render::rasterizer::{fill_triangle, FragmentStage, RasterCounts};
    pub use crate::render::SampleBuffer;
}

//! Programmable stages.
//!
//! The fixed-function rasterizer sits between two traits:
//!
//! - [`VertexShader`] moves a model-space triangle to screen space.
//! - [`FragmentShader`] turns one interpolated sample into a color.
//!
//! Both are `Send + Sync` so a single instance is shared by every worker.

pub mod fragment;
pub mod vertex;

pub use fragment::{
    BumpShader, ConstantShader, DisplacementShader, FragmentPayload, FragmentShader, NormalShader,
    PhongShader, ShadeContext, TextureShader, VertexColorShader,
};
pub use vertex::{PerspectiveShader, TransformContext, VertexShader, W_EPSILON};

use std::fmt;

pub use crate::mesh::LoadError;

/// Reasons a [`Renderer`](crate::render::Renderer) refuses to work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// `draw` was called on a scene without a camera.
    MissingCamera,
    /// A [`RenderConfig`](crate::config::RenderConfig) failed validation.
    InvalidConfig(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::MissingCamera => write!(f, "scene has no camera"),
            RenderError::InvalidConfig(reason) => write!(f, "invalid render config: {reason}"),
        }
    }
}

impl std::error::Error for RenderError {}

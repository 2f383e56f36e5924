//! The rendering back end: sample storage, rasterization, scheduling and the
//! [`Renderer`] that ties them together.

pub mod framebuffer;
pub mod rasterizer;
pub mod renderer;
pub mod samples;
mod scheduler;
mod stats;

pub use framebuffer::Frame;
pub use renderer::Renderer;
pub use samples::{Sample, SampleBuffer, SampleTarget};
pub use stats::FrameStats;

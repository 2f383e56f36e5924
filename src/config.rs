//! Renderer configuration.
//!
//! [`RenderConfig`] is a plain value with chained `with_*` setters:
//!
//! ```ignore
//! let config = RenderConfig::new(800, 600)
//!     .with_anti_aliasing(true)
//!     .with_samples(4)
//!     .with_schedule(Schedule::Tiles);
//! ```

use crate::error::RenderError;
use crate::math::Vec3;

/// What the rasterizer draws for each triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Filled, depth-tested, shaded triangles.
    #[default]
    Face,
    /// Bresenham outlines in the wireframe color.
    Edge,
    /// The three vertices as single points.
    Vertex,
}

/// How triangles are distributed over worker threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Schedule {
    /// Everything on the calling thread.
    Serial,
    /// Workers pull triangles from a shared cursor and commit samples under
    /// per-row locks.
    #[default]
    WorkQueue,
    /// Each worker owns a band of rows and draws every triangle into it, in
    /// submission order. Output matches `Serial` exactly.
    Tiles,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfig {
    pub width: usize,
    pub height: usize,
    pub anti_aliasing: bool,
    /// Sub-samples per axis when anti-aliasing is on.
    pub samples: usize,
    pub schedule: Schedule,
    /// Worker thread count. `None` uses the number of logical CPUs.
    pub threads: Option<usize>,
    pub render_mode: RenderMode,
    pub clear_color: Vec3,
    pub wire_color: Vec3,
    pub point_color: Vec3,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 700,
            height: 700,
            anti_aliasing: false,
            samples: 2,
            schedule: Schedule::default(),
            threads: None,
            render_mode: RenderMode::default(),
            clear_color: Vec3::ZERO,
            wire_color: Vec3::ONE,
            point_color: Vec3::ONE,
        }
    }
}

impl RenderConfig {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_anti_aliasing(mut self, enabled: bool) -> Self {
        self.anti_aliasing = enabled;
        self
    }

    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn with_render_mode(mut self, mode: RenderMode) -> Self {
        self.render_mode = mode;
        self
    }

    pub fn with_clear_color(mut self, color: Vec3) -> Self {
        self.clear_color = color;
        self
    }

    pub fn with_wire_color(mut self, color: Vec3) -> Self {
        self.wire_color = color;
        self
    }

    pub fn with_point_color(mut self, color: Vec3) -> Self {
        self.point_color = color;
        self
    }

    /// Sub-samples per pixel axis actually used: `samples` with AA on, else 1.
    pub fn samples_per_axis(&self) -> usize {
        if self.anti_aliasing {
            self.samples
        } else {
            1
        }
    }

    /// Resolved worker count.
    pub fn thread_count(&self) -> usize {
        match self.threads {
            Some(n) => n,
            None => match num_cpus::get() {
                0 => 8,
                n => n,
            },
        }
    }

    pub fn validate(&self) -> Result<(), RenderError> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::InvalidConfig(format!(
                "viewport must be non-empty, got {}x{}",
                self.width, self.height
            )));
        }
        if self.samples == 0 {
            return Err(RenderError::InvalidConfig(
                "samples per axis must be at least 1".to_string(),
            ));
        }
        if self.threads == Some(0) {
            return Err(RenderError::InvalidConfig(
                "thread count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_only_apply_with_anti_aliasing() {
        let config = RenderConfig::new(10, 10).with_samples(4);
        assert_eq!(config.samples_per_axis(), 1);
        assert_eq!(config.with_anti_aliasing(true).samples_per_axis(), 4);
    }

    #[test]
    fn validate_rejects_degenerate_settings() {
        assert!(RenderConfig::new(0, 10).validate().is_err());
        assert!(RenderConfig::new(10, 10).with_samples(0).validate().is_err());
        assert!(RenderConfig::new(10, 10).with_threads(0).validate().is_err());
        assert_eq!(RenderConfig::new(10, 10).validate(), Ok(()));
    }

    #[test]
    fn default_thread_count_is_positive() {
        assert!(RenderConfig::default().thread_count() >= 1);
        assert_eq!(RenderConfig::default().with_threads(3).thread_count(), 3);
    }
}

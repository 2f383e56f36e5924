use std::fmt;
use std::ops::AddAssign;

use super::rasterizer::RasterCounts;

/// Counters for one [`Renderer::draw`](super::Renderer::draw).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Triangles handed to the vertex stage.
    pub triangles: usize,
    /// Back-facing or degenerate after projection.
    pub culled: usize,
    /// Rejected by the vertex stage (a vertex at or behind the eye).
    pub unprojectable: usize,
    /// Fragment shader invocations.
    pub samples_shaded: usize,
    /// Samples that lost the depth test.
    pub samples_depth_rejected: usize,
}

impl FrameStats {
    pub(crate) fn record(&mut self, counts: RasterCounts) {
        self.samples_shaded += counts.shaded;
        self.samples_depth_rejected += counts.depth_rejected;
    }
}

impl AddAssign for FrameStats {
    fn add_assign(&mut self, rhs: Self) {
        self.triangles += rhs.triangles;
        self.culled += rhs.culled;
        self.unprojectable += rhs.unprojectable;
        self.samples_shaded += rhs.samples_shaded;
        self.samples_depth_rejected += rhs.samples_depth_rejected;
    }
}

impl fmt::Display for FrameStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} triangles ({} culled, {} unprojectable), {} samples shaded, {} depth-rejected",
            self.triangles, self.culled, self.unprojectable, self.samples_shaded, self.samples_depth_rejected
        )
    }
}

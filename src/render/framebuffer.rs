//! The presented image.
//!
//! A [`Frame`] is what a display or file writer consumes: `width * height`
//! linear RGB colors, top row first. The renderer writes the resolved image
//! into a back frame and swaps it with the presented one once per draw.

use std::path::Path;

use crate::math::Vec3;

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pixels: Vec<Vec3>,
    width: usize,
    height: usize,
}

impl Frame {
    pub fn new(width: usize, height: usize, color: Vec3) -> Self {
        Self {
            pixels: vec![color; width * height],
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// All pixels, row-major, top row first.
    pub fn pixels(&self) -> &[Vec3] {
        &self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [Vec3] {
        &mut self.pixels
    }

    /// Color at screen coordinates (y up, as the rasterizer sees them),
    /// or `None` if out of bounds.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Option<Vec3> {
        if x < self.width && y < self.height {
            Some(self.pixels[(self.height - 1 - y) * self.width + x])
        } else {
            None
        }
    }

    pub fn fill(&mut self, color: Vec3) {
        self.pixels.fill(color);
    }

    /// Tightly packed 8-bit RGB, each channel clamped to `[0, 1]` first.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let to_byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        self.pixels
            .iter()
            .flat_map(|p| [to_byte(p.x), to_byte(p.y), to_byte(p.z)])
            .collect()
    }

    /// Write the frame as an image file; the format follows the extension.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), image::ImageError> {
        image::save_buffer(
            path,
            &self.to_rgb8(),
            self.width as u32,
            self.height as u32,
            image::ExtendedColorType::Rgb8,
        )
    }
}

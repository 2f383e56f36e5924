//! Supersample color/depth storage.
//!
//! The buffer holds `(width·N) × (height·N)` samples for `N` samples per
//! pixel axis; without anti-aliasing `N = 1` and it is simply the color and
//! depth buffer. Rows are in screen order (row 0 at the bottom).
//!
//! # Depth
//!
//! Depth is the view-space `z` of the surface, which is negative in front of
//! the camera, so larger means nearer. Cleared depth is `-inf`.
//!
//! # Access
//!
//! Each row sits behind its own [`Mutex`]. Writers go through a
//! [`SampleTarget`]:
//!
//! - [`ExclusiveTarget`] owns a band of rows through `&mut` and never locks.
//! - [`SharedTarget`] can be copied into many threads; every test or commit
//!   locks the single row it touches, so a depth test and the write that
//!   follows it are one atomic step.

use std::ops::Range;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rayon::prelude::*;

use super::framebuffer::Frame;
use crate::math::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub depth: f32,
    pub color: Vec3,
}

impl Sample {
    pub const fn cleared(color: Vec3) -> Self {
        Self {
            depth: f32::NEG_INFINITY,
            color,
        }
    }
}

type Row = Mutex<Vec<Sample>>;

#[inline]
fn row_mut(row: &mut Row) -> &mut Vec<Sample> {
    row.get_mut().unwrap_or_else(PoisonError::into_inner)
}

#[inline]
fn lock(row: &Row) -> MutexGuard<'_, Vec<Sample>> {
    row.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Destination for rasterized samples.
pub trait SampleTarget {
    /// Row width in samples.
    fn width(&self) -> usize;

    /// Height of the whole buffer in samples, including rows outside
    /// `rows()`.
    fn height(&self) -> usize;

    /// Sample rows this target may write.
    fn rows(&self) -> Range<usize>;

    /// Whether `depth` is nearer than what is stored. Coordinates must lie
    /// inside `rows()` and `width()`.
    fn passes(&mut self, x: usize, y: usize, depth: f32) -> bool;

    /// Store `depth` and `color` if `depth` is still nearer. Returns whether
    /// the sample was written.
    fn commit(&mut self, x: usize, y: usize, depth: f32, color: Vec3) -> bool;

    /// Write `color` without touching depth.
    fn overwrite(&mut self, x: usize, y: usize, color: Vec3);
}

/// Lock-free access to a contiguous band of rows.
pub struct ExclusiveTarget<'a> {
    rows: &'a mut [Row],
    first_row: usize,
    width: usize,
    height: usize,
}

impl<'a> ExclusiveTarget<'a> {
    pub fn new(rows: &'a mut [Row], first_row: usize, width: usize, height: usize) -> Self {
        Self {
            rows,
            first_row,
            width,
            height,
        }
    }

    #[inline]
    fn sample_mut(&mut self, x: usize, y: usize) -> &mut Sample {
        &mut row_mut(&mut self.rows[y - self.first_row])[x]
    }
}

impl SampleTarget for ExclusiveTarget<'_> {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn rows(&self) -> Range<usize> {
        self.first_row..self.first_row + self.rows.len()
    }

    #[inline]
    fn passes(&mut self, x: usize, y: usize, depth: f32) -> bool {
        depth > self.sample_mut(x, y).depth
    }

    #[inline]
    fn commit(&mut self, x: usize, y: usize, depth: f32, color: Vec3) -> bool {
        let sample = self.sample_mut(x, y);
        if depth > sample.depth {
            *sample = Sample { depth, color };
            true
        } else {
            false
        }
    }

    #[inline]
    fn overwrite(&mut self, x: usize, y: usize, color: Vec3) {
        self.sample_mut(x, y).color = color;
    }
}

/// Row-locked access to the whole buffer, shareable across threads.
#[derive(Clone, Copy)]
pub struct SharedTarget<'a> {
    rows: &'a [Row],
    width: usize,
}

impl SampleTarget for SharedTarget<'_> {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.rows.len()
    }

    fn rows(&self) -> Range<usize> {
        0..self.rows.len()
    }

    #[inline]
    fn passes(&mut self, x: usize, y: usize, depth: f32) -> bool {
        depth > lock(&self.rows[y])[x].depth
    }

    #[inline]
    fn commit(&mut self, x: usize, y: usize, depth: f32, color: Vec3) -> bool {
        let mut row = lock(&self.rows[y]);
        let sample = &mut row[x];
        if depth > sample.depth {
            *sample = Sample { depth, color };
            true
        } else {
            false
        }
    }

    #[inline]
    fn overwrite(&mut self, x: usize, y: usize, color: Vec3) {
        lock(&self.rows[y])[x].color = color;
    }
}

pub struct SampleBuffer {
    rows: Vec<Row>,
    width: usize,
    samples_per_axis: usize,
}

impl SampleBuffer {
    /// Buffer for a `width × height` pixel image with `samples_per_axis²`
    /// samples per pixel.
    pub fn new(width: usize, height: usize, samples_per_axis: usize, clear: Vec3) -> Self {
        let n = samples_per_axis.max(1);
        let row_len = width * n;
        let rows = (0..height * n)
            .map(|_| Mutex::new(vec![Sample::cleared(clear); row_len]))
            .collect();
        Self {
            rows,
            width: row_len,
            samples_per_axis: n,
        }
    }

    /// Width in samples.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in samples.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn samples_per_axis(&self) -> usize {
        self.samples_per_axis
    }

    pub fn clear(&mut self, color: Vec3) {
        for row in &mut self.rows {
            row_mut(row).fill(Sample::cleared(color));
        }
    }

    pub fn sample(&self, x: usize, y: usize) -> Option<Sample> {
        let row = self.rows.get(y)?;
        lock(row).get(x).copied()
    }

    /// Stored depth at a sample, `-inf` where nothing was drawn.
    pub fn depth(&self, x: usize, y: usize) -> Option<f32> {
        self.sample(x, y).map(|s| s.depth)
    }

    pub fn exclusive(&mut self) -> ExclusiveTarget<'_> {
        let (width, height) = (self.width, self.rows.len());
        ExclusiveTarget::new(&mut self.rows, 0, width, height)
    }

    pub fn shared(&self) -> SharedTarget<'_> {
        SharedTarget {
            rows: &self.rows,
            width: self.width,
        }
    }

    /// Disjoint bands of at most `band_rows` rows, for parallel exclusive use.
    pub fn bands(&mut self, band_rows: usize) -> impl IndexedParallelIterator<Item = ExclusiveTarget<'_>> {
        let (width, height) = (self.width, self.rows.len());
        let band_rows = band_rows.max(1);
        self.rows
            .par_chunks_mut(band_rows)
            .enumerate()
            .map(move |(i, rows)| ExclusiveTarget::new(rows, i * band_rows, width, height))
    }

    /// Box-filter every pixel's samples into `frame`, flipping rows so the
    /// frame is top row first.
    pub fn resolve(&mut self, frame: &mut Frame) {
        let n = self.samples_per_axis;
        let pixel_width = frame.width();
        let scale = 1.0 / (n * n) as f32;

        frame
            .pixels_mut()
            .par_chunks_mut(pixel_width)
            .rev()
            .zip(self.rows.par_chunks_mut(n))
            .for_each(|(out, band)| {
                for (px, pixel) in out.iter_mut().enumerate() {
                    let mut sum = Vec3::ZERO;
                    for row in band.iter_mut() {
                        for s in &row_mut(row)[px * n..(px + 1) * n] {
                            sum += s.color;
                        }
                    }
                    *pixel = sum * scale;
                }
            });
    }
}

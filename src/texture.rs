//! 2D textures sampled by the fragment shaders.

use std::path::Path;

use crate::math::{Vec2, Vec3};

/// Heights are measured on the 8-bit color scale the `kh`/`kn` shader
/// constants are tuned for.
pub const HEIGHT_SCALE: f32 = 255.0;

/// How [`Texture::sample`] reconstructs a color between texels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    Nearest,
    Bilinear,
}

/// An RGB texture stored as linear `[0, 1]` colors, top row first.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    data: Vec<Vec3>,
    width: u32,
    height: u32,
    filter: Filter,
}

impl Texture {
    /// Load a texture from an image file (PNG, JPG, etc.)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, image::ImageError> {
        let img = image::open(path)?.to_rgb8();
        let (width, height) = img.dimensions();
        Ok(Self::from_rgb8(width, height, img.as_raw()))
    }

    /// Build from tightly packed 8-bit RGB bytes.
    ///
    /// Missing trailing bytes read as black; a zero dimension yields a 1x1
    /// black texture so sampling never indexes an empty buffer.
    pub fn from_rgb8(width: u32, height: u32, bytes: &[u8]) -> Self {
        Self::from_fn(width, height, |x, y| {
            let i = ((y * width + x) * 3) as usize;
            match bytes.get(i..i + 3) {
                Some(&[r, g, b]) => Vec3::new(r as f32, g as f32, b as f32) / 255.0,
                _ => Vec3::ZERO,
            }
        })
    }

    /// Build by evaluating `texel(x, y)` for every texel, row 0 at the top.
    pub fn from_fn(width: u32, height: u32, mut texel: impl FnMut(u32, u32) -> Vec3) -> Self {
        if width == 0 || height == 0 {
            return Self {
                data: vec![Vec3::ZERO],
                width: 1,
                height: 1,
                filter: Filter::Nearest,
            };
        }
        let data = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| texel(x, y))
            .collect();
        Self {
            data,
            width,
            height,
            filter: Filter::Nearest,
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn texel(&self, x: u32, y: u32) -> Vec3 {
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        self.data[(y * self.width + x) as usize]
    }

    /// Sample at UV coordinates.
    ///
    /// # UV Convention
    /// - UVs are clamped to `[0, 1]` first
    /// - (0,0) is the bottom-left of the image, so V is flipped against the
    ///   top-first storage
    #[inline]
    pub fn sample(&self, uv: Vec2) -> Vec3 {
        let uv = uv.saturate();
        let fx = uv.x * (self.width - 1) as f32;
        let fy = (1.0 - uv.y) * (self.height - 1) as f32;

        match self.filter {
            Filter::Nearest => self.texel(fx as u32, fy as u32),
            Filter::Bilinear => {
                let (x0, y0) = (fx.floor(), fy.floor());
                let (tx, ty) = (fx - x0, fy - y0);
                let (x0, y0) = (x0 as u32, y0 as u32);
                let top = self.texel(x0, y0) * (1.0 - tx) + self.texel(x0 + 1, y0) * tx;
                let bottom = self.texel(x0, y0 + 1) * (1.0 - tx) + self.texel(x0 + 1, y0 + 1) * tx;
                top * (1.0 - ty) + bottom * ty
            }
        }
    }

    /// Height-map reading used by bump and displacement shading: the length
    /// of the sampled color in 8-bit units, so white reads `255·√3`.
    #[inline]
    pub fn height_at(&self, uv: Vec2) -> f32 {
        (self.sample(uv) * HEIGHT_SCALE).magnitude()
    }
}

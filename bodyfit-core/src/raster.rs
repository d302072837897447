/// Texture rasters.
///
/// Hosts hand textures over either as encoded bytes (PNG/JPEG) or as raw RGBA.
/// Relief and coverage both read a fixed-resolution resample of the image, so
/// the result does not depend on the source texture's size.
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::error::{Result, SuitError};

/// Edge length of the sampling grid used by relief and coverage.
pub const SAMPLE_SIZE: u32 = 256;

/// An RGBA8 image, row 0 at the top
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    image: RgbaImage,
}

impl Raster {
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Decode PNG/JPEG bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let decoded = image::load_from_memory(bytes)?;
        Ok(Self::new(decoded.to_rgba8()))
    }

    /// Wrap raw RGBA8 pixels, as delivered by a canvas `getImageData`.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        let actual = pixels.len();
        RgbaImage::from_raw(width, height, pixels)
            .map(Self::new)
            .ok_or_else(|| SuitError::TextureDecode {
                reason: format!(
                    "expected {} RGBA bytes for {}x{}, got {}",
                    expected, width, height, actual
                ),
            })
    }

    /// A single-color raster
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        Self::new(RgbaImage::from_pixel(width, height, Rgba([rgb[0], rgb[1], rgb[2], 255])))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// RGB channels at (x, y); alpha is ignored
    pub fn rgb(&self, x: u32, y: u32) -> [u8; 3] {
        let Rgba([r, g, b, _]) = *self.image.get_pixel(x, y);
        [r, g, b]
    }

    /// Stretch the image onto a `size` x `size` grid.
    ///
    /// A raster already at that size is returned unchanged.
    pub fn resampled(&self, size: u32) -> Raster {
        if self.width() == size && self.height() == size {
            return self.clone();
        }
        Raster::new(imageops::resize(&self.image, size, size, FilterType::Triangle))
    }

    /// Nearest texel for a UV coordinate; v = 0 is the bottom row
    pub fn sample_uv(&self, u: f32, v: f32) -> [u8; 3] {
        let u = u.clamp(0.0, 1.0);
        let v = v.clamp(0.0, 1.0);
        let x = (u * self.width().saturating_sub(1) as f32).floor() as u32;
        let y = ((1.0 - v) * self.height().saturating_sub(1) as f32).floor() as u32;
        self.rgb(x, y)
    }
}

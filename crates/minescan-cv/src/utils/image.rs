//! Grayscale buffers and image loading.

use crate::Result;
use anyhow::Context;
use image::{GrayImage, RgbImage};
use std::path::Path;

/// Owned single-channel f32 image, row-major, intensities in [0, 1].
///
/// Pixels are addressed as (row, col) to match the orientation of the
/// correlation surfaces computed from them.
#[derive(Debug, Clone, PartialEq)]
pub struct GrayBuffer {
    /// Image width in pixels
    pub width: usize,
    /// Image height in pixels
    pub height: usize,
    /// Backing storage, `height * width` values
    pub data: Vec<f32>,
}

impl GrayBuffer {
    /// Zero-initialized buffer.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    #[inline]
    pub fn idx(&self, row: usize, col: usize) -> usize {
        row * self.width + col
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[self.idx(row, col)]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        let i = self.idx(row, col);
        self.data[i] = value;
    }

    /// One full pixel row as a slice.
    #[inline]
    pub fn row(&self, row: usize) -> &[f32] {
        let start = row * self.width;
        &self.data[start..start + self.width]
    }

    /// Convert an 8-bit luma image, scaling intensities to [0, 1].
    pub fn from_luma8(img: &GrayImage) -> Self {
        let width = img.width() as usize;
        let height = img.height() as usize;
        let data = img.as_raw().iter().map(|&v| f32::from(v) / 255.0).collect();
        Self {
            width,
            height,
            data,
        }
    }
}

/// Image loading helpers shared by the pipeline and the overlay renderer.
pub struct ImageUtils;

impl ImageUtils {
    /// Load an image from disk as a normalized grayscale buffer.
    pub fn load_gray<P: AsRef<Path>>(path: P) -> Result<GrayBuffer> {
        let img = image::open(&path)
            .with_context(|| format!("Failed to open image: {:?}", path.as_ref()))?
            .into_luma8();
        Ok(GrayBuffer::from_luma8(&img))
    }

    /// Load an image from disk in color, for overlay rendering.
    pub fn load_rgb<P: AsRef<Path>>(path: P) -> Result<RgbImage> {
        Ok(image::open(&path)
            .with_context(|| format!("Failed to open image: {:?}", path.as_ref()))?
            .into_rgb8())
    }
}

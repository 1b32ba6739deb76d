//! Template matching module

pub mod loader;
pub mod matcher;

pub use loader::{TemplateLoader, TemplateSet};
pub use matcher::{MatchError, TemplateMatcher};

use crate::utils::image::GrayBuffer;
use serde::{Deserialize, Serialize};

/// A named marker image searched for inside board screenshots.
#[derive(Debug, Clone)]
pub struct Template {
    pub name: String,
    pub image: GrayBuffer,
}

impl Template {
    pub fn new(name: impl Into<String>, image: GrayBuffer) -> Self {
        Self {
            name: name.into(),
            image,
        }
    }
}

/// Template matching configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Keep the score surface the same size as the searched image by
    /// embedding the valid scores at the template-center offset and
    /// leaving the border at a neutral zero.
    pub padded: bool,
    /// Minimum Chebyshev separation between two accepted peaks, in pixels.
    pub min_distance: u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            padded: true,
            min_distance: 20,
        }
    }
}

/// Correlation scores for one template over one image.
///
/// In padded mode the surface has the image's dimensions and a score at
/// (row, col) belongs to the template centered on that pixel; unpadded
/// surfaces shrink to the valid-overlap region and (row, col) is the
/// template's top-left corner.
#[derive(Debug, Clone)]
pub struct ScoreMap {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

impl ScoreMap {
    /// Zero-filled surface.
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
}

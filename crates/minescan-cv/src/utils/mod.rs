//! Utility modules

pub mod image;

pub use image::{GrayBuffer, ImageUtils};

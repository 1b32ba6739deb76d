//! High-level detection module

pub mod config;
pub mod detector;
pub mod overlay;

pub use config::{DetectionConfig, VisualizationConfig};
pub use detector::{
    assemble_board, BoardDetector, BoardReading, DetectionStats, IntegrityWarning,
};

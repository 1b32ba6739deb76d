//! Minescan Computer Vision Library
//!
//! Locates the mine and opened-square markers in Minesweeper board
//! screenshots by normalized cross-correlation and reduces the match
//! surfaces to per-board detections on the game grid.

pub mod detection;
pub mod peak;
pub mod template;
pub mod utils;

// Re-export commonly used types
pub use detection::{BoardDetector, BoardReading, DetectionConfig};
pub use peak::{find_peaks, Peak, PeakCollection};
pub use template::{MatchConfig, MatchError, Template, TemplateMatcher, TemplateSet};
pub use utils::image::GrayBuffer;

// Error handling
pub type Result<T> = anyhow::Result<T>;

/// Core traits for the CV system
pub mod traits {
    use crate::template::{MatchError, ScoreMap, Template};
    use crate::utils::image::GrayBuffer;

    /// Trait for correlation-surface producers
    pub trait TemplateMatchable {
        fn score_map(&self, image: &GrayBuffer, template: &Template)
            -> Result<ScoreMap, MatchError>;
    }
}

//! Detection configuration

use crate::template::MatchConfig;
use minescan_core::grid::GridGeometry;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Pixel layout of the board inside the screenshots.
    pub geometry: GridGeometry,
    /// Correlation and peak-separation parameters.
    pub match_config: MatchConfig,
    /// Directory the marker templates are loaded from.
    pub template_dir: PathBuf,
    /// Directory records, sidecars and overlays are written to.
    pub output_dir: PathBuf,
    /// Write a JSON sidecar next to each record.
    pub emit_json: bool,
    pub visualization: VisualizationConfig,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            geometry: GridGeometry::default(),
            match_config: MatchConfig::default(),
            template_dir: PathBuf::from("."),
            output_dir: PathBuf::from("results"),
            emit_json: false,
            visualization: VisualizationConfig::default(),
        }
    }
}

/// Visualization configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualizationConfig {
    /// Save an annotated copy of each processed screenshot.
    pub render_overlays: bool,
    /// Outline every board cell on the overlay.
    pub draw_grid: bool,
    /// Mark mine and anchor peaks on the overlay.
    pub draw_peaks: bool,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            render_overlays: false,
            draw_grid: true,
            draw_peaks: true,
        }
    }
}

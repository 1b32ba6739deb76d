//! Board detection pipeline: screenshots in, board readings out.

use super::config::DetectionConfig;
use super::overlay;
use crate::peak::{Peak, PeakCollection};
use crate::template::{TemplateMatcher, TemplateSet};
use crate::utils::image::{GrayBuffer, ImageUtils};
use crate::Result;
use anyhow::Context;
use minescan_core::board::BoardDescriptor;
use minescan_core::difficulty::Difficulty;
use minescan_core::grid::{GridGeometry, GridSquare};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Non-fatal integrity findings for one board image.
///
/// These flag readings that are structurally valid but suspicious; the
/// record is still produced so a human can compare it with the screenshot.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum IntegrityWarning {
    /// Located mine markers do not add up to the difficulty's mine total.
    #[error("expected {expected} mine markers, located {found}")]
    MineCountMismatch { expected: u32, found: usize },
    /// No opened-square anchor was found, so the starting square is unknown.
    #[error("no opened-square anchor located")]
    AnchorNotFound,
}

/// Everything extracted from one board image.
#[derive(Debug, Clone, Serialize)]
pub struct BoardReading {
    pub descriptor: BoardDescriptor,
    pub warnings: Vec<IntegrityWarning>,
    /// Accepted mine peaks in pixel coordinates, strongest first.
    pub mine_peaks: PeakCollection,
    /// Best opened-square peak, if any.
    pub anchor_peak: Option<Peak>,
    pub stats: DetectionStats,
}

impl BoardReading {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Detection statistics
#[derive(Debug, Clone, Serialize)]
pub struct DetectionStats {
    pub level: String,
    pub mine_peaks: usize,
    pub anchor_peaks: usize,
    pub avg_mine_score: f32,
    pub anchor_score: Option<f32>,
    pub processing_time_ms: u64,
}

/// Combine localized peaks with difficulty metadata into a board
/// descriptor, policing the mine-count invariant.
///
/// Mines keep peak order (score descending). The descriptor always
/// advertises the difficulty's mine total; a shortfall or surplus in the
/// located markers becomes a warning instead of silently rewriting the
/// count.
pub fn assemble_board(
    difficulty: &Difficulty,
    geometry: &GridGeometry,
    anchor_peaks: &PeakCollection,
    mine_peaks: &PeakCollection,
) -> (BoardDescriptor, Vec<IntegrityWarning>) {
    let mut warnings = Vec::new();

    let start_square = match anchor_peaks.first() {
        Some(peak) => Some(map_peak(peak, geometry, difficulty.height)),
        None => {
            warnings.push(IntegrityWarning::AnchorNotFound);
            None
        }
    };

    let mines: Vec<GridSquare> = mine_peaks
        .iter()
        .map(|peak| map_peak(peak, geometry, difficulty.height))
        .collect();

    if mines.len() != difficulty.mine_count as usize {
        warnings.push(IntegrityWarning::MineCountMismatch {
            expected: difficulty.mine_count,
            found: mines.len(),
        });
    }

    let descriptor = BoardDescriptor {
        width: difficulty.width,
        height: difficulty.height,
        mine_count: difficulty.mine_count,
        start_square,
        mines,
    };
    (descriptor, warnings)
}

fn map_peak(peak: &Peak, geometry: &GridGeometry, board_height: i32) -> GridSquare {
    geometry.to_grid(peak.row as i64, peak.col as i64, board_height)
}

/// Runs the extraction pipeline against the two process-wide templates.
///
/// The template set is loaded once and owned immutably, so one detector
/// serves any number of images (or rayon workers) without locking.
pub struct BoardDetector {
    config: DetectionConfig,
    matcher: TemplateMatcher,
    templates: TemplateSet,
}

impl BoardDetector {
    pub fn new(config: DetectionConfig, templates: TemplateSet) -> Self {
        let matcher = TemplateMatcher::new(config.match_config);
        Self {
            config,
            matcher,
            templates,
        }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Extract a board reading from an already-loaded grayscale image.
    pub fn detect(&self, image: &GrayBuffer, difficulty: &Difficulty) -> Result<BoardReading> {
        let start_time = std::time::Instant::now();

        let mine_peaks = self
            .matcher
            .locate(image, &self.templates.mine, difficulty.mine_count as usize)
            .context("mine template match failed")?;
        let anchor_peaks = self
            .matcher
            .locate(image, &self.templates.open_square, 1)
            .context("opened-square template match failed")?;

        let (descriptor, warnings) =
            assemble_board(difficulty, &self.config.geometry, &anchor_peaks, &mine_peaks);
        for warning in &warnings {
            log::warn!("{warning}");
        }

        let mine_stats = mine_peaks.stats();
        let anchor_peak = anchor_peaks.first().copied();
        let stats = DetectionStats {
            level: difficulty.level.clone(),
            mine_peaks: mine_peaks.len(),
            anchor_peaks: anchor_peaks.len(),
            avg_mine_score: mine_stats.avg_score,
            anchor_score: anchor_peak.map(|p| p.score),
            processing_time_ms: start_time.elapsed().as_millis() as u64,
        };

        Ok(BoardReading {
            descriptor,
            warnings,
            mine_peaks,
            anchor_peak,
            stats,
        })
    }

    /// Load an image from disk and extract its board reading.
    ///
    /// When overlays are enabled the screenshot is re-read in color and an
    /// annotated copy lands in the output directory.
    pub fn detect_from_file<P: AsRef<Path>>(
        &self,
        path: P,
        difficulty: &Difficulty,
    ) -> Result<BoardReading> {
        let path = path.as_ref();
        let image = ImageUtils::load_gray(path)
            .with_context(|| format!("Failed to load board image: {}", path.display()))?;
        let reading = self.detect(&image, difficulty)?;

        if self.config.visualization.render_overlays {
            self.save_overlay(path, &reading)?;
        }

        Ok(reading)
    }

    /// Detect every image in `jobs`, isolating per-image failures.
    ///
    /// With the `parallel` feature enabled each image runs on its own
    /// rayon worker; the detector and templates are shared immutably.
    pub fn detect_batch(
        &self,
        jobs: &[(PathBuf, Difficulty)],
    ) -> Vec<(PathBuf, Result<BoardReading>)> {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            jobs.par_iter()
                .map(|(path, difficulty)| (path.clone(), self.detect_from_file(path, difficulty)))
                .collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            jobs.iter()
                .map(|(path, difficulty)| (path.clone(), self.detect_from_file(path, difficulty)))
                .collect()
        }
    }

    /// Export a reading as pretty-printed JSON.
    pub fn export_json(&self, reading: &BoardReading, output_path: &Path) -> Result<()> {
        let json =
            serde_json::to_string_pretty(reading).context("Failed to serialize board reading")?;
        std::fs::write(output_path, json)
            .with_context(|| format!("Failed to write JSON to: {}", output_path.display()))?;
        Ok(())
    }

    fn save_overlay(&self, source: &Path, reading: &BoardReading) -> Result<()> {
        let color = ImageUtils::load_rgb(source)?;
        let annotated = overlay::render_overlay(
            color,
            reading,
            &self.config.geometry,
            &self.config.visualization,
        );

        std::fs::create_dir_all(&self.config.output_dir).with_context(|| {
            format!(
                "Failed to create output directory: {}",
                self.config.output_dir.display()
            )
        })?;
        let stem = source
            .file_stem()
            .context("image path has no file name")?
            .to_string_lossy();
        let output_path = self.config.output_dir.join(format!("{stem}_overlay.png"));
        annotated
            .save(&output_path)
            .with_context(|| format!("Failed to save overlay: {}", output_path.display()))?;
        log::info!("overlay saved: {}", output_path.display());
        Ok(())
    }
}

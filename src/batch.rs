//! Batch board extraction using minescan-cv

use anyhow::{Context, Result};
use minescan_core::difficulty::Difficulty;
use minescan_cv::detection::{BoardDetector, BoardReading, DetectionConfig};
use minescan_cv::template::TemplateSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// Outcome counters for one batch run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Records written to the output directory.
    pub written: usize,
    /// Written records that carried integrity warnings.
    pub flagged: usize,
    /// Images that produced no record at all.
    pub failed: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "done: {} record(s) written ({} flagged), {} failure(s)",
            self.written, self.flagged, self.failed
        )
    }
}

/// Process every difficulty folder under `root`, writing one record per
/// board image into `<output_dir>/<level>/<image stem>.in`.
///
/// Failures are isolated: an unreadable image or folder is logged and the
/// run continues with the rest.
pub fn run(root: &Path, config: DetectionConfig, templates: TemplateSet) -> Result<RunSummary> {
    let output_dir = config.output_dir.clone();
    let emit_json = config.emit_json;
    let detector = BoardDetector::new(config, templates);
    let mut summary = RunSummary::default();

    for &level in Difficulty::LEVELS {
        let difficulty = match Difficulty::from_level(level) {
            Ok(d) => d,
            Err(e) => {
                log::error!("skipping folder '{level}': {e:#}");
                continue;
            }
        };
        let folder = root.join(level);
        if !folder.is_dir() {
            log::warn!("no '{level}' folder under {}, skipping", root.display());
            continue;
        }

        let jobs = collect_jobs(&folder, &difficulty)?;
        log::info!("processing {} board(s) from {}", jobs.len(), folder.display());

        for (path, result) in detector.detect_batch(&jobs) {
            match result {
                Ok(reading) => {
                    if !reading.is_clean() {
                        summary.flagged += 1;
                    }
                    match write_outputs(&output_dir, level, &path, &reading, emit_json, &detector)
                    {
                        Ok(()) => summary.written += 1,
                        Err(e) => {
                            log::error!("{}: {e:#}", path.display());
                            summary.failed += 1;
                        }
                    }
                }
                Err(e) => {
                    log::error!("{}: {e:#}", path.display());
                    summary.failed += 1;
                }
            }
        }
    }

    Ok(summary)
}

/// Pair every board image in `folder` with its difficulty, in path order.
fn collect_jobs(folder: &Path, difficulty: &Difficulty) -> Result<Vec<(PathBuf, Difficulty)>> {
    let entries = fs::read_dir(folder)
        .with_context(|| format!("Failed to read directory: {}", folder.display()))?;

    let mut jobs = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to read entry in: {}", folder.display()))?
            .path();
        if path.is_file() && has_image_extension(&path) {
            jobs.push((path, difficulty.clone()));
        }
    }
    jobs.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(jobs)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

fn write_outputs(
    output_dir: &Path,
    level: &str,
    image_path: &Path,
    reading: &BoardReading,
    emit_json: bool,
    detector: &BoardDetector,
) -> Result<()> {
    let stem = image_path
        .file_stem()
        .with_context(|| format!("image path has no file name: {}", image_path.display()))?;
    let level_dir = output_dir.join(level);
    fs::create_dir_all(&level_dir)
        .with_context(|| format!("Failed to create output directory: {}", level_dir.display()))?;

    let record_path = level_dir.join(stem).with_extension("in");
    fs::write(&record_path, reading.descriptor.render_record())
        .with_context(|| format!("Failed to write record: {}", record_path.display()))?;
    log::info!("wrote {}", record_path.display());

    if emit_json {
        let json_path = record_path.with_extension("json");
        detector.export_json(reading, &json_path)?;
    }
    Ok(())
}

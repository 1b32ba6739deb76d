//! Normalized cross-correlation template matching.

use super::{MatchConfig, ScoreMap, Template};
use crate::peak::{self, PeakCollection};
use crate::utils::image::GrayBuffer;
use thiserror::Error;

/// Structural failure of a single match call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error(
        "template '{template_name}' is {template_size:?} px but the image is only {image_size:?} px"
    )]
    TemplateTooLarge {
        template_name: String,
        /// (width, height) of the template
        template_size: (usize, usize),
        /// (width, height) of the searched image
        image_size: (usize, usize),
    },
}

/// Scores a template against every position of a larger image.
///
/// Scoring is zero-mean normalized cross-correlation: candidate patch and
/// template are both mean-subtracted and variance-normalized, so a perfect
/// match scores 1.0 regardless of linear brightness shifts and an inverted
/// match scores -1.0. A flat patch or flat template has no direction to
/// correlate along and scores 0.0.
#[derive(Debug, Clone)]
pub struct TemplateMatcher {
    config: MatchConfig,
}

impl Default for TemplateMatcher {
    fn default() -> Self {
        Self::new(MatchConfig::default())
    }
}

impl TemplateMatcher {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Correlation surface for `template` over `image`.
    ///
    /// Padded mode embeds the valid-overlap scores into an image-sized
    /// surface at the template-center offset `((h-1)/2, (w-1)/2)` and
    /// leaves the border at the neutral 0.0, so surface coordinates line
    /// up 1:1 with image pixels.
    pub fn score_map(
        &self,
        image: &GrayBuffer,
        template: &Template,
    ) -> Result<ScoreMap, MatchError> {
        let tpl = &template.image;
        if tpl.width > image.width || tpl.height > image.height {
            return Err(MatchError::TemplateTooLarge {
                template_name: template.name.clone(),
                template_size: (tpl.width, tpl.height),
                image_size: (image.width, image.height),
            });
        }

        let valid_w = image.width - tpl.width + 1;
        let valid_h = image.height - tpl.height + 1;

        // Template statistics do not depend on position; hoist them.
        let n = (tpl.width * tpl.height) as f64;
        let tpl_mean = tpl.data.iter().map(|&v| f64::from(v)).sum::<f64>() / n;
        let mut tpl_centered = Vec::with_capacity(tpl.data.len());
        let mut tpl_sumsq = 0.0f64;
        for &v in &tpl.data {
            let centered = f64::from(v) - tpl_mean;
            tpl_centered.push(centered);
            tpl_sumsq += centered * centered;
        }

        let (mut surface, row_off, col_off) = if self.config.padded {
            let offset = ((tpl.height - 1) / 2, (tpl.width - 1) / 2);
            (ScoreMap::new(image.width, image.height), offset.0, offset.1)
        } else {
            (ScoreMap::new(valid_w, valid_h), 0, 0)
        };

        for i in 0..valid_h {
            for j in 0..valid_w {
                let score = correlate_at(image, tpl, &tpl_centered, tpl_sumsq, i, j);
                surface.set(i + row_off, j + col_off, score);
            }
        }

        Ok(surface)
    }

    /// Match and reduce to at most `max_peaks` well-separated detections,
    /// strongest first.
    pub fn locate(
        &self,
        image: &GrayBuffer,
        template: &Template,
        max_peaks: usize,
    ) -> Result<PeakCollection, MatchError> {
        let surface = self.score_map(image, template)?;
        Ok(peak::find_peaks(
            &surface,
            self.config.min_distance,
            max_peaks,
        ))
    }
}

impl crate::traits::TemplateMatchable for TemplateMatcher {
    fn score_map(
        &self,
        image: &GrayBuffer,
        template: &Template,
    ) -> Result<ScoreMap, MatchError> {
        TemplateMatcher::score_map(self, image, template)
    }
}

/// Correlation coefficient between the template and the patch whose
/// top-left corner sits at (row, col).
///
/// The template values arrive pre-centered with `sum(tpl_centered) == 0`,
/// so the cross term needs no patch centering and one pass over the patch
/// collects everything.
fn correlate_at(
    image: &GrayBuffer,
    tpl: &GrayBuffer,
    tpl_centered: &[f64],
    tpl_sumsq: f64,
    row: usize,
    col: usize,
) -> f32 {
    let mut sum = 0.0f64;
    let mut sumsq = 0.0f64;
    let mut cross = 0.0f64;
    for r in 0..tpl.height {
        let image_row = &image.row(row + r)[col..col + tpl.width];
        let tpl_row = &tpl_centered[r * tpl.width..(r + 1) * tpl.width];
        for (&v, &t) in image_row.iter().zip(tpl_row) {
            let v = f64::from(v);
            sum += v;
            sumsq += v * v;
            cross += v * t;
        }
    }

    let n = (tpl.width * tpl.height) as f64;
    let patch_var = (sumsq - sum * sum / n).max(0.0);
    let denom = (patch_var * tpl_sumsq).sqrt();
    if denom <= f64::EPSILON {
        // Flat patch or flat template: no signal to correlate against.
        return 0.0;
    }
    (cross / denom) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic non-flat texture with values in [0, 1].
    fn ramp(width: usize, height: usize) -> GrayBuffer {
        let mut buf = GrayBuffer::new(width, height);
        let n = (width * height) as f32;
        for r in 0..height {
            for c in 0..width {
                buf.set(r, c, (r * width + c) as f32 / n);
            }
        }
        buf
    }

    fn paste(target: &mut GrayBuffer, patch: &GrayBuffer, row: usize, col: usize) {
        for r in 0..patch.height {
            for c in 0..patch.width {
                target.set(row + r, col + c, patch.get(r, c));
            }
        }
    }

    fn flat(width: usize, height: usize, value: f32) -> GrayBuffer {
        let mut buf = GrayBuffer::new(width, height);
        buf.data.fill(value);
        buf
    }

    #[test]
    fn padded_surface_has_image_dimensions() {
        let matcher = TemplateMatcher::default();
        let image = ramp(20, 15);
        let template = Template::new("probe", ramp(4, 3));
        let surface = matcher.score_map(&image, &template).unwrap();
        assert_eq!((surface.width, surface.height), (20, 15));
    }

    #[test]
    fn unpadded_surface_shrinks_to_valid_region() {
        let matcher = TemplateMatcher::new(MatchConfig {
            padded: false,
            ..MatchConfig::default()
        });
        let image = ramp(20, 15);
        let template = Template::new("probe", ramp(4, 3));
        let surface = matcher.score_map(&image, &template).unwrap();
        assert_eq!((surface.width, surface.height), (20 - 4 + 1, 15 - 3 + 1));
    }

    #[test]
    fn oversized_template_is_rejected() {
        let matcher = TemplateMatcher::default();
        let image = ramp(5, 5);
        let template = Template::new("big", ramp(6, 4));
        let err = matcher.score_map(&image, &template).unwrap_err();
        assert_eq!(
            err,
            MatchError::TemplateTooLarge {
                template_name: "big".to_string(),
                template_size: (6, 4),
                image_size: (5, 5),
            }
        );
    }

    #[test]
    fn template_as_large_as_image_is_accepted() {
        let matcher = TemplateMatcher::default();
        let image = ramp(6, 6);
        let template = Template::new("exact", ramp(6, 6));
        let surface = matcher.score_map(&image, &template).unwrap();
        // Single valid position, centered by the padding offset.
        assert!((surface.get(2, 2) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn exact_occurrence_scores_one_at_the_center_offset() {
        let matcher = TemplateMatcher::default();
        let icon = ramp(5, 5);
        let mut image = flat(30, 25, 0.5);
        paste(&mut image, &icon, 8, 11);

        let surface = matcher
            .score_map(&image, &Template::new("icon", icon))
            .unwrap();
        // Top-left (8, 11) plus center offset ((5-1)/2, (5-1)/2).
        assert!((surface.get(10, 13) - 1.0).abs() < 1e-5);

        let best = peak::find_peaks(&surface, 3, 1);
        let top = best.first().unwrap();
        assert_eq!((top.row, top.col), (10, 13));
    }

    #[test]
    fn brightness_shift_does_not_change_the_score() {
        let matcher = TemplateMatcher::default();
        let icon = ramp(4, 4);
        let mut dimmed = icon.clone();
        for v in &mut dimmed.data {
            *v = *v * 0.5 + 0.2;
        }
        let mut image = flat(12, 12, 0.0);
        paste(&mut image, &dimmed, 4, 4);

        let surface = matcher
            .score_map(&image, &Template::new("icon", icon))
            .unwrap();
        assert!((surface.get(5, 5) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn inverted_occurrence_scores_minus_one() {
        let matcher = TemplateMatcher::default();
        let icon = ramp(4, 4);
        let mut inverted = icon.clone();
        for v in &mut inverted.data {
            *v = 1.0 - *v;
        }
        let mut image = flat(12, 12, 0.5);
        paste(&mut image, &inverted, 4, 4);

        let surface = matcher
            .score_map(&image, &Template::new("icon", icon))
            .unwrap();
        assert!((surface.get(5, 5) + 1.0).abs() < 1e-5);
    }

    #[test]
    fn flat_image_scores_zero_everywhere() {
        let matcher = TemplateMatcher::default();
        let image = flat(16, 16, 0.5);
        let template = Template::new("probe", ramp(4, 4));
        let surface = matcher.score_map(&image, &template).unwrap();
        assert!(surface.data.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn flat_template_scores_zero_everywhere() {
        let matcher = TemplateMatcher::default();
        let image = ramp(16, 16);
        let template = Template::new("blank", flat(4, 4, 0.7));
        let surface = matcher.score_map(&image, &template).unwrap();
        assert!(surface.data.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn padded_border_stays_neutral() {
        let matcher = TemplateMatcher::default();
        let image = ramp(10, 10);
        let template = Template::new("probe", ramp(4, 4));
        let surface = matcher.score_map(&image, &template).unwrap();
        // Rows past the valid embedding never receive a score.
        for col in 0..10 {
            assert_eq!(surface.get(9, col), 0.0);
            assert_eq!(surface.get(0, col), 0.0);
        }
    }

    #[test]
    fn all_scores_stay_within_unit_range() {
        let matcher = TemplateMatcher::default();
        let mut image = ramp(24, 18);
        let icon = ramp(5, 5);
        paste(&mut image, &icon, 3, 9);
        let surface = matcher
            .score_map(&image, &Template::new("icon", icon))
            .unwrap();
        for &v in &surface.data {
            assert!((-1.0 - 1e-4..=1.0 + 1e-4).contains(&v));
        }
    }

    #[test]
    fn locate_returns_separated_detections_strongest_first() {
        let matcher = TemplateMatcher::new(MatchConfig {
            padded: true,
            min_distance: 4,
        });
        let icon = ramp(5, 5);
        let mut image = flat(40, 30, 0.5);
        paste(&mut image, &icon, 2, 3);
        paste(&mut image, &icon, 20, 28);

        let peaks = matcher
            .locate(&image, &Template::new("icon", icon), 8)
            .unwrap();
        assert!(peaks.len() >= 2);
        let kept = peaks.as_slice();
        assert!((kept[0].score - 1.0).abs() < 1e-5);
        assert!((kept[1].score - 1.0).abs() < 1e-5);
        let positions: Vec<_> = kept[..2].iter().map(|p| (p.row, p.col)).collect();
        assert!(positions.contains(&(4, 5)));
        assert!(positions.contains(&(22, 30)));
    }

    #[test]
    fn locate_caps_the_number_of_detections() {
        let matcher = TemplateMatcher::new(MatchConfig {
            padded: true,
            min_distance: 4,
        });
        let icon = ramp(5, 5);
        let mut image = flat(60, 20, 0.5);
        for k in 0..4 {
            paste(&mut image, &icon, 6, 3 + k * 13);
        }
        let peaks = matcher
            .locate(&image, &Template::new("icon", icon), 2)
            .unwrap();
        assert_eq!(peaks.len(), 2);
    }
}

//! Score-surface peaks and non-maximum suppression.
//!
//! Turns a correlation surface into a short, deterministic list of
//! well-separated detections: candidate local maxima, strongest first,
//! thinned so no two survivors crowd the same marker.

use crate::template::ScoreMap;
use serde::Serialize;

/// A local maximum of a score surface, in surface (row, col) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Peak {
    pub row: usize,
    pub col: usize,
    pub score: f32,
}

impl Peak {
    pub fn new(row: usize, col: usize, score: f32) -> Self {
        Self { row, col, score }
    }

    /// Chebyshev distance to another peak.
    pub fn chebyshev(&self, other: &Peak) -> usize {
        self.row.abs_diff(other.row).max(self.col.abs_diff(other.col))
    }
}

/// Collection of peaks with batch operations
#[derive(Debug, Clone, Default, Serialize)]
pub struct PeakCollection {
    peaks: Vec<Peak>,
}

impl PeakCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(peaks: Vec<Peak>) -> Self {
        Self { peaks }
    }

    pub fn push(&mut self, peak: Peak) {
        self.peaks.push(peak);
    }

    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }

    pub fn first(&self) -> Option<&Peak> {
        self.peaks.first()
    }

    pub fn as_slice(&self) -> &[Peak] {
        &self.peaks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Peak> {
        self.peaks.iter()
    }

    /// Sort by score descending; equal scores order by (row, col) ascending
    /// so the result never depends on insertion order.
    pub fn sort_by_score(&mut self) {
        self.peaks.sort_unstable_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| (a.row, a.col).cmp(&(b.row, b.col)))
        });
    }

    /// Greedy non-maximum suppression: walk the peaks score-descending and
    /// keep each one only if it lies at least `min_distance` (Chebyshev)
    /// from every peak already kept.
    pub fn apply_nms(mut self, min_distance: u32) -> Self {
        self.sort_by_score();
        let min_distance = min_distance as usize;
        let mut kept: Vec<Peak> = Vec::new();
        for candidate in self.peaks {
            if kept.iter().all(|p| p.chebyshev(&candidate) >= min_distance) {
                kept.push(candidate);
            }
        }
        Self::from_vec(kept)
    }

    /// Keep at most the first `max_peaks` entries.
    pub fn take_top(mut self, max_peaks: usize) -> Self {
        self.peaks.truncate(max_peaks);
        self
    }

    /// Aggregate score statistics.
    pub fn stats(&self) -> PeakStats {
        if self.peaks.is_empty() {
            return PeakStats {
                count: 0,
                avg_score: 0.0,
                max_score: 0.0,
                min_score: 0.0,
            };
        }
        let sum: f32 = self.peaks.iter().map(|p| p.score).sum();
        let max = self.peaks.iter().map(|p| p.score).fold(f32::MIN, f32::max);
        let min = self.peaks.iter().map(|p| p.score).fold(f32::MAX, f32::min);
        PeakStats {
            count: self.peaks.len(),
            avg_score: sum / self.peaks.len() as f32,
            max_score: max,
            min_score: min,
        }
    }
}

impl IntoIterator for PeakCollection {
    type Item = Peak;
    type IntoIter = std::vec::IntoIter<Peak>;

    fn into_iter(self) -> Self::IntoIter {
        self.peaks.into_iter()
    }
}

impl FromIterator<Peak> for PeakCollection {
    fn from_iter<T: IntoIterator<Item = Peak>>(iter: T) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

/// Aggregate score statistics for a peak collection
#[derive(Debug, Clone, Serialize)]
pub struct PeakStats {
    pub count: usize,
    pub avg_score: f32,
    pub max_score: f32,
    pub min_score: f32,
}

/// All candidate local maxima of a surface.
///
/// A position qualifies if it is strictly greater than its 8 neighbors, or
/// tied with some of them while coming first in (row, col) order among the
/// tied ones. The tie rule elects one representative per flat plateau,
/// keeping candidate extraction deterministic.
pub fn local_maxima(surface: &ScoreMap) -> PeakCollection {
    let mut peaks = PeakCollection::new();
    if surface.data.is_empty() {
        return peaks;
    }
    for row in 0..surface.height {
        for col in 0..surface.width {
            let value = surface.get(row, col);
            if is_local_max(surface, row, col, value) {
                peaks.push(Peak::new(row, col, value));
            }
        }
    }
    peaks
}

fn is_local_max(surface: &ScoreMap, row: usize, col: usize, value: f32) -> bool {
    let r0 = row.saturating_sub(1);
    let c0 = col.saturating_sub(1);
    let r1 = (row + 1).min(surface.height - 1);
    let c1 = (col + 1).min(surface.width - 1);
    for r in r0..=r1 {
        for c in c0..=c1 {
            if r == row && c == col {
                continue;
            }
            let neighbor = surface.get(r, c);
            if neighbor > value {
                return false;
            }
            if neighbor == value && (r, c) < (row, col) {
                return false;
            }
        }
    }
    true
}

/// Reduce a score surface to at most `max_peaks` mutually separated local
/// maxima, strongest first.
pub fn find_peaks(surface: &ScoreMap, min_distance: u32, max_peaks: usize) -> PeakCollection {
    local_maxima(surface)
        .apply_nms(min_distance)
        .take_top(max_peaks)
}

//! Local-maximum peak detection on 2D intensity arrays.

use ndarray::ArrayView2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters for spot (peak) detection.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpotConfig {
    /// Minimum Chebyshev separation, in pixels, between accepted peaks.
    pub min_distance: usize,
    /// Absolute intensity floor a pixel must reach to qualify as a peak.
    pub threshold: f64,
}

impl Default for SpotConfig {
    fn default() -> Self {
        Self {
            min_distance: 2,
            threshold: 100.0,
        }
    }
}

impl SpotConfig {
    /// Creates a configuration with the standard assay values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the minimum peak separation.
    #[must_use]
    pub fn with_min_distance(mut self, min_distance: usize) -> Self {
        self.min_distance = min_distance;
        self
    }

    /// Sets the absolute intensity threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }
}

/// Detects local intensity maxima in `data`.
///
/// A pixel qualifies as a candidate when its value reaches the threshold and
/// no pixel within the `(2 * min_distance + 1)^2` neighborhood exceeds it.
/// Candidates are ranked by intensity (brightest first, row-major position
/// as tie-break) and accepted greedily, suppressing any candidate within
/// `min_distance` of an already accepted peak. Plateau ties therefore
/// contribute a single peak.
///
/// Returns accepted `(row, col)` positions in row-major order. Detection is
/// deterministic and carries no state between calls.
#[must_use]
pub fn find_peaks(data: ArrayView2<'_, f64>, config: &SpotConfig) -> Vec<(usize, usize)> {
    let (rows, cols) = data.dim();
    if rows == 0 || cols == 0 {
        return Vec::new();
    }

    let d = config.min_distance;
    let mut candidates: Vec<(usize, usize, f64)> = Vec::new();

    for row in 0..rows {
        for col in 0..cols {
            let value = data[[row, col]];
            if value < config.threshold {
                continue;
            }
            if is_neighborhood_max(data, row, col, d, value) {
                candidates.push((row, col, value));
            }
        }
    }

    // Brightest first; row-major position breaks intensity ties so plateau
    // suppression is deterministic.
    candidates.sort_by(|a, b| {
        b.2.partial_cmp(&a.2)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| (a.0, a.1).cmp(&(b.0, b.1)))
    });

    let mut accepted: Vec<(usize, usize)> = Vec::new();
    for &(row, col, _) in &candidates {
        let separated = accepted
            .iter()
            .all(|&(ar, ac)| chebyshev(row, col, ar, ac) > d);
        if separated {
            accepted.push((row, col));
        }
    }

    accepted.sort_unstable();
    accepted
}

fn is_neighborhood_max(
    data: ArrayView2<'_, f64>,
    row: usize,
    col: usize,
    d: usize,
    value: f64,
) -> bool {
    let (rows, cols) = data.dim();
    let r0 = row.saturating_sub(d);
    let r1 = (row + d).min(rows - 1);
    let c0 = col.saturating_sub(d);
    let c1 = (col + d).min(cols - 1);

    for r in r0..=r1 {
        for c in c0..=c1 {
            if data[[r, c]] > value {
                return false;
            }
        }
    }
    true
}

fn chebyshev(r1: usize, c1: usize, r2: usize, c2: usize) -> usize {
    r1.abs_diff(r2).max(c1.abs_diff(c2))
}

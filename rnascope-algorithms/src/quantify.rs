//! Spot statistics for a rectangular region of a signal channel.

use ndarray::{s, ArrayView2};
use rnascope_core::{Error, Rect, Result};

use crate::peaks::{find_peaks, SpotConfig};

/// Count, intensity, and density statistics for one quantified region.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpotStatistics {
    /// Number of accepted peaks.
    pub count: usize,
    /// Sum of intensities at peak locations; 0.0 with no peaks.
    pub total_intensity: f64,
    /// `total_intensity / count`; 0.0 with no peaks.
    pub average_intensity: f64,
    /// Peaks per square physical unit; 0.0 when the ROI area is not
    /// positive.
    pub density: f64,
}

/// Detects spots inside `rect` on `channel` and computes statistics.
///
/// The sub-array covers rows `top..top + height` and columns
/// `left..left + width`. Detection is per-call and never mutates the
/// channel; identical inputs yield identical results.
///
/// # Errors
/// Returns [`Error::OutOfBounds`] when the rectangle does not fit inside
/// the channel. Clipping is deliberately not performed: a clipped region
/// would silently corrupt the area-normalized density.
pub fn quantify(
    channel: ArrayView2<'_, f64>,
    rect: Rect,
    pixel_spacing: f64,
    config: &SpotConfig,
) -> Result<SpotStatistics> {
    let (height, width) = channel.dim();
    if !rect.fits_within(height, width) {
        return Err(Error::OutOfBounds {
            left: rect.left,
            top: rect.top,
            width: rect.width,
            height: rect.height,
            channel_height: height,
            channel_width: width,
        });
    }

    let sub = channel.slice(s![
        rect.top..rect.top + rect.height,
        rect.left..rect.left + rect.width
    ]);

    let peaks = find_peaks(sub, config);
    let count = peaks.len();
    let total_intensity: f64 = peaks.iter().map(|&(r, c)| sub[[r, c]]).sum();

    #[allow(clippy::cast_precision_loss)]
    let average_intensity = if count > 0 {
        total_intensity / count as f64
    } else {
        0.0
    };

    let area = rect.physical_area(pixel_spacing);
    #[allow(clippy::cast_precision_loss)]
    let density = if area > 0.0 { count as f64 / area } else { 0.0 };

    Ok(SpotStatistics {
        count,
        total_intensity,
        average_intensity,
        density,
    })
}

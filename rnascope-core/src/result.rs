//! Per-region, per-channel quantification results.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::SignalChannel;

/// Spot statistics for one (region, signal channel) pair.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnalysisResult {
    /// Anatomical region name, e.g. "CA1".
    pub region: String,
    /// Signal channel the spots were counted on.
    pub channel: SignalChannel,
    /// Number of accepted intensity peaks.
    pub spot_count: usize,
    /// Sum of intensities at peak locations.
    pub total_intensity: f64,
    /// Mean intensity per peak; 0.0 when no peaks were found.
    pub average_intensity: f64,
    /// Peaks per square physical unit of ROI area; 0.0 when the area
    /// is not positive.
    pub density: f64,
}

#[cfg(feature = "serde")]
impl Serialize for SignalChannel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for SignalChannel {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        match name.as_str() {
            "GOB" => Ok(Self::Gob),
            "GOA" => Ok(Self::Goa),
            other => Err(serde::de::Error::unknown_variant(other, &["GOB", "GOA"])),
        }
    }
}

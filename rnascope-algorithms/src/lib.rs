//! rnascope-algorithms: The quantification engine.
//!
//! This crate provides:
//! - **Display normalization** - 8-bit grayscale rescaling for ROI placement
//! - **Peak detection** - thresholded local maxima with minimum separation
//! - **Spot quantification** - count/intensity/density statistics per ROI
//! - **Acquisition session** - the multi-image, multi-region state machine
//!
#![warn(missing_docs)]

mod acquisition;
mod normalize;
mod peaks;
mod quantify;

pub use acquisition::{AcquisitionSession, Prompt, RegionCapture, SubmitOutcome};
pub use normalize::to_grayscale;
pub use peaks::{find_peaks, SpotConfig};
pub use quantify::{quantify, SpotStatistics};

// Re-export core vocabulary used throughout the engine's API
pub use rnascope_core::{AcquisitionPlan, AnalysisResult, PlanStage, Rect, SignalChannel};

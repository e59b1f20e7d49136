//! rnascope-core: Core types for RNAScope spot quantification.
//!
//! This crate provides the shared vocabulary of the toolkit: ROI
//! rectangles, three-channel image stacks, acquisition plans, and
//! per-region analysis results.
//!

pub mod error;
pub mod plan;
pub mod rect;
pub mod result;
pub mod stack;

pub use error::{Error, Result};
pub use plan::{AcquisitionPlan, PlanStage};
pub use rect::Rect;
pub use result::AnalysisResult;
pub use stack::{ChannelStack, SignalChannel, CHANNEL_COUNT};

//! Acquisition plans: the ordered ROI prompt sequence for a session.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One specimen image and the ordered anatomical regions expected on it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlanStage {
    /// Label identifying the specimen image, e.g. "hippocampus".
    pub image: String,
    /// Region names prompted for, in order.
    pub regions: Vec<String>,
}

impl PlanStage {
    /// Creates a stage from an image label and region names.
    #[must_use]
    pub fn new(image: impl Into<String>, regions: &[&str]) -> Self {
        Self {
            image: image.into(),
            regions: regions.iter().map(|r| (*r).to_string()).collect(),
        }
    }
}

/// Ordered list of stages an acquisition session walks through.
///
/// The prompt sequence is fully data-driven: a session prompts for every
/// region of the first stage, then every region of the next, until the plan
/// is exhausted.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AcquisitionPlan {
    stages: Vec<PlanStage>,
}

impl AcquisitionPlan {
    /// Creates a plan from explicit stages.
    ///
    /// # Errors
    /// Returns [`Error::InvalidInput`] if the plan has no stages or any
    /// stage has no regions.
    pub fn new(stages: Vec<PlanStage>) -> Result<Self> {
        if stages.is_empty() {
            return Err(Error::InvalidInput("acquisition plan has no stages".into()));
        }
        for stage in &stages {
            if stage.regions.is_empty() {
                return Err(Error::InvalidInput(format!(
                    "stage '{}' has no regions",
                    stage.image
                )));
            }
        }
        Ok(Self { stages })
    }

    /// The standard hippocampus/thalamus montage protocol: three
    /// hippocampal subfields followed by one combined thalamic region.
    #[must_use]
    pub fn hippocampus_thalamus() -> Self {
        Self {
            stages: vec![
                PlanStage::new("hippocampus", &["CA1", "CA3", "DG"]),
                PlanStage::new("thalamus", &["Thalamus"]),
            ],
        }
    }

    /// Stages in prompt order.
    #[must_use]
    pub fn stages(&self) -> &[PlanStage] {
        &self.stages
    }

    /// Number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Always false; a plan cannot be constructed empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Total number of ROI prompts across all stages.
    #[must_use]
    pub fn total_regions(&self) -> usize {
        self.stages.iter().map(|s| s.regions.len()).sum()
    }
}

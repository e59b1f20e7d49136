//! Acquisition state machine sequencing ROI capture across specimen images.
//!
//! The session walks an [`AcquisitionPlan`] one ROI submission at a time.
//! Rendering and input are collaborator concerns: the caller asks
//! [`AcquisitionSession::current_prompt`] what to display and which region
//! to request, delivers one normalized rectangle per prompt through
//! [`AcquisitionSession::submit`], and receives the full result set when
//! the final region of the final stage completes.

use rayon::prelude::*;
use rnascope_core::{
    AcquisitionPlan, AnalysisResult, ChannelStack, Error, Rect, Result, SignalChannel,
};

use crate::peaks::SpotConfig;
use crate::quantify::quantify;

/// Insertion-ordered mapping from region name to its captured rectangle.
///
/// A region is captured at most once per session; entries are never
/// overwritten.
#[derive(Debug, Clone, Default)]
pub struct RegionCapture {
    entries: Vec<(String, Rect)>,
}

impl RegionCapture {
    /// Captured `(region, rect)` pairs in capture order.
    #[must_use]
    pub fn entries(&self) -> &[(String, Rect)] {
        &self.entries
    }

    /// Rectangle captured for a region, if any.
    #[must_use]
    pub fn get(&self, region: &str) -> Option<Rect> {
        self.entries
            .iter()
            .find(|(name, _)| name == region)
            .map(|&(_, rect)| rect)
    }

    /// Number of captured regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no region has been captured yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, region: String, rect: Rect) {
        debug_assert!(self.get(&region).is_none());
        self.entries.push((region, rect));
    }
}

/// What the collaborator UI should prompt for next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prompt<'a> {
    /// Label of the specimen image whose reference channel to display.
    pub image: &'a str,
    /// Region name the operator should delineate.
    pub region: &'a str,
}

/// Result of one ROI submission.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// More regions remain on the current image.
    AwaitingRegion {
        /// Active image label.
        image: String,
        /// Next region to prompt for.
        region: String,
    },
    /// The current image is exhausted; the display must switch to the
    /// next image's reference channel.
    ImageAdvanced {
        /// Newly active image label.
        image: String,
        /// First region of the new image.
        region: String,
    },
    /// All regions of all stages are captured; quantification ran and
    /// the session is terminal.
    Complete(Vec<AnalysisResult>),
}

/// Sequences ROI capture across a plan's stages and triggers
/// quantification once the plan is exhausted.
#[derive(Debug)]
pub struct AcquisitionSession {
    plan: AcquisitionPlan,
    stacks: Vec<ChannelStack>,
    captures: Vec<RegionCapture>,
    stage_index: usize,
    region_index: usize,
    complete: bool,
    pixel_spacing: f64,
    spot_config: SpotConfig,
}

impl AcquisitionSession {
    /// Creates a session over pre-loaded stacks, one per plan stage.
    ///
    /// # Errors
    /// Returns [`Error::InvalidInput`] if the number of stacks does not
    /// match the number of plan stages.
    pub fn new(
        plan: AcquisitionPlan,
        stacks: Vec<ChannelStack>,
        pixel_spacing: f64,
        spot_config: SpotConfig,
    ) -> Result<Self> {
        if stacks.len() != plan.len() {
            return Err(Error::InvalidInput(format!(
                "plan has {} stages but {} image stacks were supplied",
                plan.len(),
                stacks.len()
            )));
        }
        let captures = vec![RegionCapture::default(); plan.len()];
        Ok(Self {
            plan,
            stacks,
            captures,
            stage_index: 0,
            region_index: 0,
            complete: false,
            pixel_spacing,
            spot_config,
        })
    }

    /// The image and region the collaborator should prompt for next, or
    /// `None` once the session is complete.
    #[must_use]
    pub fn current_prompt(&self) -> Option<Prompt<'_>> {
        if self.complete {
            return None;
        }
        let stage = &self.plan.stages()[self.stage_index];
        Some(Prompt {
            image: &stage.image,
            region: &stage.regions[self.region_index],
        })
    }

    /// Reference channel of the active image, for display.
    ///
    /// `None` once the session is complete.
    #[must_use]
    pub fn active_stack(&self) -> Option<&ChannelStack> {
        if self.complete {
            None
        } else {
            Some(&self.stacks[self.stage_index])
        }
    }

    /// Whether the final region has been captured.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Captured regions per stage, in plan order.
    #[must_use]
    pub fn captures(&self) -> &[RegionCapture] {
        &self.captures
    }

    /// Stores `rect` for the currently prompted region and advances.
    ///
    /// On exhausting the plan this runs quantification for every captured
    /// region on both signal channels and returns the full result set;
    /// the session is terminal afterwards.
    ///
    /// # Errors
    /// Returns [`Error::InvalidState`] when called after completion (a
    /// collaborator double-submission bug, surfaced rather than ignored)
    /// and [`Error::OutOfBounds`] when a captured rectangle does not fit
    /// its channel at quantification time; no partial result set is
    /// produced.
    pub fn submit(&mut self, rect: Rect) -> Result<SubmitOutcome> {
        if self.complete {
            return Err(Error::InvalidState(
                "ROI submitted after acquisition completed".into(),
            ));
        }

        let stage = &self.plan.stages()[self.stage_index];
        let region = stage.regions[self.region_index].clone();
        self.captures[self.stage_index].insert(region, rect);
        self.region_index += 1;

        if self.region_index < stage.regions.len() {
            return Ok(SubmitOutcome::AwaitingRegion {
                image: stage.image.clone(),
                region: stage.regions[self.region_index].clone(),
            });
        }

        if self.stage_index + 1 < self.plan.len() {
            self.stage_index += 1;
            self.region_index = 0;
            let next = &self.plan.stages()[self.stage_index];
            return Ok(SubmitOutcome::ImageAdvanced {
                image: next.image.clone(),
                region: next.regions[0].clone(),
            });
        }

        self.complete = true;
        let results = self.quantify_all()?;
        Ok(SubmitOutcome::Complete(results))
    }

    /// Quantifies every captured region on both signal channels.
    ///
    /// Result order: stages in plan order, regions in capture order, GOB
    /// before GOA within each region. The rayon map preserves that order;
    /// any quantification error aborts the whole set.
    fn quantify_all(&self) -> Result<Vec<AnalysisResult>> {
        let jobs: Vec<(usize, &str, Rect, SignalChannel)> = self
            .captures
            .iter()
            .enumerate()
            .flat_map(|(stage_idx, capture)| {
                capture.entries().iter().flat_map(move |(region, rect)| {
                    SignalChannel::ALL
                        .iter()
                        .map(move |&channel| (stage_idx, region.as_str(), *rect, channel))
                })
            })
            .collect();

        jobs.into_par_iter()
            .map(|(stage_idx, region, rect, channel)| {
                let stats = quantify(
                    self.stacks[stage_idx].signal(channel),
                    rect,
                    self.pixel_spacing,
                    &self.spot_config,
                )?;
                Ok(AnalysisResult {
                    region: region.to_string(),
                    channel,
                    spot_count: stats.count,
                    total_intensity: stats.total_intensity,
                    average_intensity: stats.average_intensity,
                    density: stats.density,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn stack_with_signal_spot(row: usize, col: usize) -> ChannelStack {
        let mut data = Array3::from_elem((3, 64, 64), 10.0);
        data[[1, row, col]] = 150.0;
        data[[2, row, col]] = 200.0;
        ChannelStack::new(data).unwrap()
    }

    fn default_session() -> AcquisitionSession {
        let plan = AcquisitionPlan::hippocampus_thalamus();
        let stacks = vec![stack_with_signal_spot(10, 10), stack_with_signal_spot(30, 30)];
        AcquisitionSession::new(plan, stacks, 0.4475, SpotConfig::default()).unwrap()
    }

    #[test]
    fn test_rejects_stack_count_mismatch() {
        let plan = AcquisitionPlan::hippocampus_thalamus();
        let err =
            AcquisitionSession::new(plan, vec![stack_with_signal_spot(0, 0)], 0.4475, SpotConfig::default())
                .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_prompt_sequence_and_image_switch() {
        let mut session = default_session();
        let prompt = session.current_prompt().unwrap();
        assert_eq!(prompt.image, "hippocampus");
        assert_eq!(prompt.region, "CA1");

        let rect = Rect::new(0, 0, 32, 32);
        match session.submit(rect).unwrap() {
            SubmitOutcome::AwaitingRegion { image, region } => {
                assert_eq!(image, "hippocampus");
                assert_eq!(region, "CA3");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        session.submit(rect).unwrap();
        match session.submit(rect).unwrap() {
            SubmitOutcome::ImageAdvanced { image, region } => {
                assert_eq!(image, "thalamus");
                assert_eq!(region, "Thalamus");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(session.current_prompt().unwrap().image, "thalamus");
    }

    #[test]
    fn test_complete_produces_eight_ordered_results() {
        let mut session = default_session();
        let rect = Rect::new(0, 0, 64, 64);
        session.submit(rect).unwrap();
        session.submit(rect).unwrap();
        session.submit(rect).unwrap();
        let results = match session.submit(rect).unwrap() {
            SubmitOutcome::Complete(results) => results,
            other => panic!("unexpected outcome: {other:?}"),
        };

        assert_eq!(results.len(), 8);
        let expected: Vec<(&str, SignalChannel)> = vec![
            ("CA1", SignalChannel::Gob),
            ("CA1", SignalChannel::Goa),
            ("CA3", SignalChannel::Gob),
            ("CA3", SignalChannel::Goa),
            ("DG", SignalChannel::Gob),
            ("DG", SignalChannel::Goa),
            ("Thalamus", SignalChannel::Gob),
            ("Thalamus", SignalChannel::Goa),
        ];
        let observed: Vec<(&str, SignalChannel)> = results
            .iter()
            .map(|r| (r.region.as_str(), r.channel))
            .collect();
        assert_eq!(observed, expected);

        // Every ROI covers the single synthetic spot on each signal channel.
        assert!(results.iter().all(|r| r.spot_count == 1));
        assert!(session.is_complete());
    }

    #[test]
    fn test_submit_after_complete_is_invalid_state() {
        let mut session = default_session();
        let rect = Rect::new(0, 0, 16, 16);
        for _ in 0..4 {
            session.submit(rect).unwrap();
        }
        let err = session.submit(rect).unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
        assert!(session.current_prompt().is_none());
        assert!(session.active_stack().is_none());
    }

    #[test]
    fn test_out_of_bounds_capture_aborts_result_set() {
        let mut session = default_session();
        let good = Rect::new(0, 0, 16, 16);
        let bad = Rect::new(50, 50, 32, 32); // overhangs the 64x64 image
        session.submit(good).unwrap();
        session.submit(bad).unwrap();
        session.submit(good).unwrap();
        let err = session.submit(good).unwrap_err();
        assert!(matches!(err, Error::OutOfBounds { .. }));
    }

    #[test]
    fn test_captures_preserve_insertion_order() {
        let mut session = default_session();
        let rects = [
            Rect::new(0, 0, 8, 8),
            Rect::new(8, 8, 8, 8),
            Rect::new(16, 16, 8, 8),
        ];
        for rect in rects {
            session.submit(rect).unwrap();
        }
        let capture = &session.captures()[0];
        assert_eq!(capture.len(), 3);
        assert_eq!(capture.entries()[0].0, "CA1");
        assert_eq!(capture.entries()[1].0, "CA3");
        assert_eq!(capture.entries()[2].0, "DG");
        assert_eq!(capture.get("CA3"), Some(rects[1]));
        assert_eq!(capture.get("Thalamus"), None);
    }
}

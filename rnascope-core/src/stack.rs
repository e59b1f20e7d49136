//! Three-channel image stacks and signal-channel identities.

use ndarray::{Array3, ArrayView2, Axis};

use crate::{Error, Result};

/// Number of channels every stack carries: one reference, two signal.
pub const CHANNEL_COUNT: usize = 3;

/// Identity of a signal channel quantified for spots.
///
/// Channel 0 is the structural reference used only for ROI placement and is
/// deliberately not representable here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalChannel {
    /// "GOB" probe, stored at channel index 1.
    Gob,
    /// "GOA" probe, stored at channel index 2.
    Goa,
}

impl SignalChannel {
    /// Both signal channels in report order.
    pub const ALL: [Self; 2] = [Self::Gob, Self::Goa];

    /// Channel index within a [`ChannelStack`].
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Gob => 1,
            Self::Goa => 2,
        }
    }

    /// Probe name as it appears in reports.
    #[inline]
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Gob => "GOB",
            Self::Goa => "GOA",
        }
    }
}

/// An immutable `(3, H, W)` intensity stack for one specimen image.
#[derive(Debug, Clone)]
pub struct ChannelStack {
    data: Array3<f64>,
}

impl ChannelStack {
    /// Wraps a `(3, H, W)` array.
    ///
    /// # Errors
    /// Returns [`Error::ShapeMismatch`] if the first axis is not of
    /// length 3 or either spatial dimension is zero.
    pub fn new(data: Array3<f64>) -> Result<Self> {
        let shape = data.shape();
        if shape[0] != CHANNEL_COUNT {
            return Err(Error::ShapeMismatch(format!(
                "expected 3-channel image, got {} channels",
                shape[0]
            )));
        }
        if shape[1] == 0 || shape[2] == 0 {
            return Err(Error::ShapeMismatch(format!(
                "empty image plane: {}x{}",
                shape[1], shape[2]
            )));
        }
        Ok(Self { data })
    }

    /// Image height in pixels.
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        self.data.shape()[1]
    }

    /// Image width in pixels.
    #[inline]
    #[must_use]
    pub fn width(&self) -> usize {
        self.data.shape()[2]
    }

    /// View of one channel plane by raw index (0..3).
    ///
    /// # Panics
    /// Panics if `index >= 3`; callers address channels through
    /// [`SignalChannel`] or [`Self::reference`].
    #[inline]
    #[must_use]
    pub fn channel(&self, index: usize) -> ArrayView2<'_, f64> {
        self.data.index_axis(Axis(0), index)
    }

    /// The structural reference channel used for display and ROI placement.
    #[inline]
    #[must_use]
    pub fn reference(&self) -> ArrayView2<'_, f64> {
        self.channel(0)
    }

    /// View of a signal channel plane.
    #[inline]
    #[must_use]
    pub fn signal(&self, channel: SignalChannel) -> ArrayView2<'_, f64> {
        self.channel(channel.index())
    }
}

//! Display normalization of intensity channels.

use ndarray::{Array2, ArrayView2};
use rnascope_core::{Error, Result};

/// Rescales a channel to an 8-bit grayscale buffer of identical dimensions.
///
/// The channel minimum is shifted to zero and the result scaled so the
/// maximum maps to 255. A constant-valued channel maps to all zeros; there
/// is no division by zero.
///
/// # Errors
/// Returns [`Error::InvalidInput`] for an empty channel.
pub fn to_grayscale(channel: ArrayView2<'_, f64>) -> Result<Array2<u8>> {
    if channel.is_empty() {
        return Err(Error::InvalidInput("cannot normalize an empty channel".into()));
    }

    let min = channel.iter().copied().fold(f64::INFINITY, f64::min);
    let max = channel.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    Ok(channel.mapv(|v| {
        let shifted = v - min;
        let scaled = if range > 0.0 { shifted / range } else { 0.0 };
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            (scaled * 255.0) as u8
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_full_range_maps_to_0_255() {
        let channel = array![[0.0, 50.0], [100.0, 200.0]];
        let gray = to_grayscale(channel.view()).unwrap();
        assert_eq!(gray[[0, 0]], 0);
        assert_eq!(gray[[1, 1]], 255);
        // 50/200 and 100/200 of the range, truncated
        assert_eq!(gray[[0, 1]], 63);
        assert_eq!(gray[[1, 0]], 127);
    }

    #[test]
    fn test_offset_is_removed() {
        let channel = array![[1000.0, 1200.0]];
        let gray = to_grayscale(channel.view()).unwrap();
        assert_eq!(gray[[0, 0]], 0);
        assert_eq!(gray[[0, 1]], 255);
    }

    #[test]
    fn test_constant_channel_is_all_zero() {
        let channel = Array2::from_elem((4, 4), 77.0);
        let gray = to_grayscale(channel.view()).unwrap();
        assert!(gray.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_empty_channel_rejected() {
        let channel = Array2::<f64>::zeros((0, 5));
        let err = to_grayscale(channel.view()).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}

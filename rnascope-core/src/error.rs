//! Error types for rnascope-core.

use thiserror::Error;

/// Result type alias for rnascope operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for rnascope operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or unexpected channel/depth layout.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// ROI rectangle exceeds channel dimensions.
    #[error("rectangle ({left}, {top}) {width}x{height} exceeds channel {channel_height}x{channel_width}")]
    OutOfBounds {
        /// Left edge of the rectangle.
        left: usize,
        /// Top edge of the rectangle.
        top: usize,
        /// Rectangle width in pixels.
        width: usize,
        /// Rectangle height in pixels.
        height: usize,
        /// Channel height in pixels.
        channel_height: usize,
        /// Channel width in pixels.
        channel_width: usize,
    },

    /// Degenerate input, e.g. an empty channel.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// State-machine operation invoked outside its valid state.
    #[error("invalid state: {0}")]
    InvalidState(String),
}

//! I/O error types.

use thiserror::Error;

/// Result type for I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

/// I/O error types.
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TIFF decoding error.
    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    /// Unsupported or inconsistent file layout.
    #[error("invalid file format: {0}")]
    InvalidFormat(String),

    /// Core library error.
    #[error("core error: {0}")]
    Core(#[from] rnascope_core::Error),
}

impl Error {
    /// Shorthand for a core shape-contract violation.
    pub(crate) fn shape_mismatch(message: impl Into<String>) -> Self {
        Self::Core(rnascope_core::Error::ShapeMismatch(message.into()))
    }
}

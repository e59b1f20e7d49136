//! rnascope-io: File I/O for RNAScope quantification.
//!
//! TIFF montage loading (with the 3-channel stack shape contract and
//! optional maximum-intensity projection) and CSV report emission.
//!
#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod report;

pub use error::{Error, Result};
pub use loader::{load_stack, stack_from_array};
pub use report::ReportWriter;

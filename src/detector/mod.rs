//! Detector identity module
//!
//! Source names, detector family classification, error types and the
//! fixed constants of the supported hardware.

pub mod errors;
pub mod constants;
pub mod source;
pub mod family;

pub use errors::{DetError, DetResult};
pub use source::{SourceIdentity, SourceParts};
pub use family::DetectorFamily;

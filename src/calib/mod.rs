//! Calibration and geometry collaborators
//!
//! Interfaces of the calibration and geometry stores, their file-backed
//! implementations, the calibration file finder and the common-mode
//! corrector.

pub mod store;
pub mod finder;
pub mod file_store;
pub mod geometry;
pub mod common_mode;

pub use store::{CalibBundle, CalibStatus, CalibStore, CalibType};
pub use finder::{CalibFileFinder, CalibFileRange};
pub use file_store::{FileCalibStore, TextTable};
pub use geometry::{GeometryDescription, GeometryStore, PixelRecord, PixelTableGeometryStore};
pub use common_mode::{CommonModeCorrection, CommonModeSample};

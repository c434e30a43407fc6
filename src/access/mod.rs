//! Run-keyed cached access to detector resources

pub mod slot;
pub mod settings;
pub mod detector_access;

pub use slot::{RunSlot, SlotState};
pub use settings::{AccessSettings, LogSettings, Settings};
pub use detector_access::{DetectorAccess, Query};

pub mod detector;
pub mod array;
pub mod event;
pub mod producer;
pub mod calib;
pub mod access;
pub mod image;
pub mod commands;
pub mod utils;

pub use access::{DetectorAccess, Query};
pub use array::NdArray;
pub use detector::{DetError, DetResult, DetectorFamily, SourceIdentity};
pub use event::{Environment, Event};

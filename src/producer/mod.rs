//! Raw data extraction
//!
//! One strategy per detector family converts raw event payloads into
//! canonical arrays; the factory picks the strategy for a source.

pub mod common;
pub mod strategy;
pub mod factory;
pub mod cspad;
pub mod cspad2x2;
pub mod camera;
pub mod andor;
pub mod pnccd;
pub mod princeton;
pub mod epix;

pub use common::{ProducerParams, WarningCounter};
pub use strategy::{RawElement, RawExtractor};
pub use factory::ExtractorFactory;

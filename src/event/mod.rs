//! Event and environment model
//!
//! Raw payloads and configuration objects as delivered by the data
//! stream, the traits the access layer reads them through, and
//! in-memory implementations.

pub mod payload;
pub mod config;
pub mod store;

pub use payload::{
    AndorFrame, CameraFrame, Cspad2x2Element, CspadData, CspadQuad, EpixElement, PnccdFrames,
    PrincetonFrame, RawPayload,
};
pub use config::DetectorConfig;
pub use store::{Environment, Event, MemoryEnv, MemoryEvent, PayloadLookup};

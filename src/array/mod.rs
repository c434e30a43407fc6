//! Canonical n-dimensional arrays and their export

pub mod element;
pub mod ndarray;
pub mod export;

pub use element::{convert, Element};
pub use ndarray::NdArray;
pub use export::ExportFormat;

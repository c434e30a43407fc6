//! Image reconstruction from per-pixel arrays

pub mod assembler;
pub mod png;

pub use assembler::assemble;
pub use png::{save_png, to_gray16};

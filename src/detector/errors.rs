//! Custom error types for detector data access

use std::fmt;
use std::io;

/// Detector access error types
#[derive(Debug)]
pub enum DetError {
    /// I/O error
    IoError(io::Error),
    /// Source name does not map to any supported detector family
    UnknownSource(String),
    /// Source name does not follow the `Det.N:Dev.M` grammar
    InvalidSourceName(String),
    /// Array data length does not match the product of its shape
    ShapeMismatch { expected: usize, actual: usize },
    /// Two arrays that must have the same length do not
    LengthMismatch { what: &'static str, left: usize, right: usize },
    /// Malformed line in a calibration or geometry file
    ParseError { path: String, line: usize, message: String },
    /// Invalid settings value
    ConfigError(String),
    /// Generic error with message
    GenericError(String),
}

impl fmt::Display for DetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetError::IoError(e) => write!(f, "I/O error: {}", e),
            DetError::UnknownSource(src) => write!(f, "Access to data for source {} is not implemented", src),
            DetError::InvalidSourceName(src) => write!(f, "Invalid source name: {}", src),
            DetError::ShapeMismatch { expected, actual } =>
                write!(f, "Shape holds {} elements but data has {}", expected, actual),
            DetError::LengthMismatch { what, left, right } =>
                write!(f, "Length mismatch in {}: {} != {}", what, left, right),
            DetError::ParseError { path, line, message } =>
                write!(f, "Parse error in {} at line {}: {}", path, line, message),
            DetError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            DetError::GenericError(msg) => write!(f, "Detector error: {}", msg),
        }
    }
}

impl std::error::Error for DetError {}

impl From<io::Error> for DetError {
    fn from(error: io::Error) -> Self {
        DetError::IoError(error)
    }
}

/// Result type for detector access operations
pub type DetResult<T> = Result<T, DetError>;

impl From<String> for DetError {
    fn from(msg: String) -> Self {
        DetError::GenericError(msg)
    }
}

impl From<image::ImageError> for DetError {
    fn from(error: image::ImageError) -> Self {
        DetError::GenericError(format!("Image error: {}", error))
    }
}

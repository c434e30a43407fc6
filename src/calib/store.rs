//! Calibration constants: kinds, status codes, the bundle and its store

use std::collections::HashMap;
use std::fmt;

use crate::detector::errors::{DetError, DetResult};
use crate::detector::family::DetectorFamily;
use crate::detector::source::SourceIdentity;

/// Kind of calibration constants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalibType {
    Pedestals,
    PixelRms,
    PixelGain,
    PixelMask,
    PixelBkgd,
    PixelStatus,
    CommonMode,
}

impl CalibType {
    pub const ALL: [CalibType; 7] = [
        CalibType::Pedestals,
        CalibType::PixelRms,
        CalibType::PixelGain,
        CalibType::PixelMask,
        CalibType::PixelBkgd,
        CalibType::PixelStatus,
        CalibType::CommonMode,
    ];

    /// Directory name of the kind under a source's calibration directory
    pub fn dir_name(&self) -> &'static str {
        match self {
            CalibType::Pedestals => "pedestals",
            CalibType::PixelRms => "pixel_rms",
            CalibType::PixelGain => "pixel_gain",
            CalibType::PixelMask => "pixel_mask",
            CalibType::PixelBkgd => "pixel_bkgd",
            CalibType::PixelStatus => "pixel_status",
            CalibType::CommonMode => "common_mode",
        }
    }

    pub fn from_name(name: &str) -> DetResult<Self> {
        CalibType::ALL.iter()
            .copied()
            .find(|t| t.dir_name() == name)
            .ok_or_else(|| DetError::GenericError(format!("Unknown calibration type: {}", name)))
    }
}

impl fmt::Display for CalibType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dir_name())
    }
}

/// Health of one calibration array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibStatus {
    /// Read from a deployed file
    Loaded = 1,
    /// No file deployed, family default used
    Default = 2,
    /// File present but unreadable, default used
    Unreadable = 3,
    Undefined = 4,
    /// File content does not match the detector size, default used
    WrongSize = 5,
}

impl CalibStatus {
    pub fn code(&self) -> i32 {
        *self as i32
    }
}

impl fmt::Display for CalibStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CalibStatus::Loaded => "LOADED",
            CalibStatus::Default => "DEFAULT",
            CalibStatus::Unreadable => "UNREADABLE",
            CalibStatus::Undefined => "UNDEFINED",
            CalibStatus::WrongSize => "WRONGSIZE",
        };
        write!(f, "{}", name)
    }
}

/// Calibration constants of one source for one run
///
/// Every per-pixel array has `size()` elements; the common-mode parameter
/// array has its own, family-specific length.
#[derive(Debug, Clone)]
pub struct CalibBundle {
    shape: Vec<usize>,
    pedestals: Vec<f32>,
    pixel_rms: Vec<f32>,
    pixel_gain: Vec<f32>,
    pixel_mask: Vec<u16>,
    pixel_bkgd: Vec<f32>,
    pixel_status: Vec<u16>,
    common_mode: Vec<f64>,
    status: HashMap<CalibType, CalibStatus>,
}

impl CalibBundle {
    /// Bundle holding only family defaults
    pub fn with_defaults(family: DetectorFamily, shape: Vec<usize>) -> Self {
        let size = shape.iter().product();
        CalibBundle {
            shape,
            pedestals: vec![0.0; size],
            pixel_rms: vec![1.0; size],
            pixel_gain: vec![1.0; size],
            pixel_mask: vec![1; size],
            pixel_bkgd: vec![0.0; size],
            pixel_status: vec![0; size],
            common_mode: family.default_common_mode(),
            status: CalibType::ALL.iter().map(|&t| (t, CalibStatus::Default)).collect(),
        }
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Number of pixels
    pub fn size(&self) -> usize {
        self.shape.iter().product()
    }

    /// Number of elements of one kind
    pub fn size_of(&self, calib_type: CalibType) -> usize {
        match calib_type {
            CalibType::CommonMode => self.common_mode.len(),
            _ => self.size(),
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn pedestals(&self) -> &[f32] {
        &self.pedestals
    }

    pub fn pixel_rms(&self) -> &[f32] {
        &self.pixel_rms
    }

    pub fn pixel_gain(&self) -> &[f32] {
        &self.pixel_gain
    }

    pub fn pixel_mask(&self) -> &[u16] {
        &self.pixel_mask
    }

    pub fn pixel_bkgd(&self) -> &[f32] {
        &self.pixel_bkgd
    }

    pub fn pixel_status(&self) -> &[u16] {
        &self.pixel_status
    }

    pub fn common_mode(&self) -> &[f64] {
        &self.common_mode
    }

    pub fn status(&self, calib_type: CalibType) -> CalibStatus {
        self.status.get(&calib_type).copied().unwrap_or(CalibStatus::Undefined)
    }

    pub fn set_status(&mut self, calib_type: CalibType, status: CalibStatus) {
        self.status.insert(calib_type, status);
    }

    /// Replace one kind with loaded values; per-pixel kinds must have `size()` elements
    pub fn set_values(&mut self, calib_type: CalibType, values: &[f64]) -> DetResult<()> {
        let size = self.size();
        if calib_type != CalibType::CommonMode && values.len() != size {
            return Err(DetError::LengthMismatch { what: calib_type.dir_name(), left: values.len(), right: size });
        }
        match calib_type {
            CalibType::Pedestals => self.pedestals = crate::array::convert(values),
            CalibType::PixelRms => self.pixel_rms = crate::array::convert(values),
            CalibType::PixelGain => self.pixel_gain = crate::array::convert(values),
            CalibType::PixelMask => self.pixel_mask = crate::array::convert(values),
            CalibType::PixelBkgd => self.pixel_bkgd = crate::array::convert(values),
            CalibType::PixelStatus => self.pixel_status = crate::array::convert(values),
            CalibType::CommonMode => self.common_mode = values.to_vec(),
        }
        self.set_status(calib_type, CalibStatus::Loaded);
        Ok(())
    }
}

/// Source of calibration bundles
///
/// Failures to read individual kinds are reported through the bundle's
/// status codes, never as errors.
pub trait CalibStore {
    fn load(&self, calib_dir: &str, group: &str, source: &SourceIdentity, run: i32, print_bits: u32) -> CalibBundle;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_the_family() {
        let bundle = CalibBundle::with_defaults(DetectorFamily::Epix100a, vec![2, 3]);
        assert_eq!(bundle.ndim(), 2);
        assert_eq!(bundle.size(), 6);
        assert_eq!(bundle.pixel_gain(), &[1.0; 6]);
        assert_eq!(bundle.size_of(CalibType::CommonMode), 4);
        assert_eq!(bundle.status(CalibType::Pedestals), CalibStatus::Default);
        assert_eq!(bundle.status(CalibType::Pedestals).code(), 2);
    }

    #[test]
    fn set_values_checks_size() {
        let mut bundle = CalibBundle::with_defaults(DetectorFamily::Andor, vec![2, 2]);
        assert!(bundle.set_values(CalibType::PixelStatus, &[0.0, 1.0, 0.0]).is_err());
        bundle.set_values(CalibType::PixelStatus, &[0.0, 1.0, 0.0, 4.0]).unwrap();
        assert_eq!(bundle.pixel_status(), &[0, 1, 0, 4]);
        assert_eq!(bundle.status(CalibType::PixelStatus), CalibStatus::Loaded);

        bundle.set_values(CalibType::CommonMode, &[2.0, 10.0]).unwrap();
        assert_eq!(bundle.size_of(CalibType::CommonMode), 2);
    }

    #[test]
    fn names_round_trip() {
        for t in CalibType::ALL {
            assert_eq!(CalibType::from_name(t.dir_name()).unwrap(), t);
        }
        assert!(CalibType::from_name("geometry").is_err());
    }
}

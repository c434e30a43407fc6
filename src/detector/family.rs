//! Detector family classification
//!
//! The family is derived once from the device part of the source name and
//! decides which extraction strategy and calibration group apply.

use std::collections::HashMap;
use std::fmt;
use lazy_static::lazy_static;

use crate::detector::constants::{cspad, cspad2x2, epix100a, pnccd};
use crate::detector::source::SourceIdentity;

lazy_static! {
    // Device names as they appear in source strings
    static ref DEVICE_FAMILIES: HashMap<&'static str, DetectorFamily> = {
        let mut m = HashMap::new();
        m.insert("Cspad", DetectorFamily::Cspad);
        m.insert("Cspad2x2", DetectorFamily::Cspad2x2);
        m.insert("Opal1000", DetectorFamily::Opal1000);
        m.insert("Opal2000", DetectorFamily::Opal2000);
        m.insert("Opal4000", DetectorFamily::Opal4000);
        m.insert("Opal8000", DetectorFamily::Opal8000);
        m.insert("Fccd960", DetectorFamily::Fccd960);
        m.insert("Tm6740", DetectorFamily::Tm6740);
        m.insert("OrcaFl40", DetectorFamily::OrcaFl40);
        m.insert("Andor", DetectorFamily::Andor);
        m.insert("pnCCD", DetectorFamily::Pnccd);
        m.insert("Princeton", DetectorFamily::Princeton);
        m.insert("Pimax", DetectorFamily::Pimax);
        m.insert("Epix100a", DetectorFamily::Epix100a);
        m
    };
}

/// Detector family of a source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectorFamily {
    /// Tiled multi-panel detector, 32 two-by-one sensors in 4 quadrants
    Cspad,
    /// Single two-by-two panel
    Cspad2x2,
    Opal1000,
    Opal2000,
    Opal4000,
    Opal8000,
    /// Camera with gain-selector bits in every sample
    Fccd960,
    Tm6740,
    OrcaFl40,
    /// EM-CCD camera
    Andor,
    /// Multi-segment frame detector read out over four links
    Pnccd,
    /// Spectroscopic CCD
    Princeton,
    /// Intensified spectroscopic CCD
    Pimax,
    /// High-resolution pixel array
    Epix100a,
    /// Source not covered by any strategy
    Unknown,
}

impl DetectorFamily {
    /// Classify a source by its device name
    pub fn from_source(source: &SourceIdentity) -> Self {
        source.device()
            .and_then(|dev| DEVICE_FAMILIES.get(dev.as_str()).copied())
            .unwrap_or(DetectorFamily::Unknown)
    }

    /// Returns a string representation of this family
    pub fn name(&self) -> &'static str {
        match self {
            DetectorFamily::Cspad => "CSPAD",
            DetectorFamily::Cspad2x2 => "CSPAD2X2",
            DetectorFamily::Opal1000 => "OPAL1000",
            DetectorFamily::Opal2000 => "OPAL2000",
            DetectorFamily::Opal4000 => "OPAL4000",
            DetectorFamily::Opal8000 => "OPAL8000",
            DetectorFamily::Fccd960 => "FCCD960",
            DetectorFamily::Tm6740 => "TM6740",
            DetectorFamily::OrcaFl40 => "ORCAFL40",
            DetectorFamily::Andor => "ANDOR",
            DetectorFamily::Pnccd => "PNCCD",
            DetectorFamily::Princeton => "PRINCETON",
            DetectorFamily::Pimax => "PIMAX",
            DetectorFamily::Epix100a => "EPIX100A",
            DetectorFamily::Unknown => "UNKNOWN",
        }
    }

    /// Single-frame cameras served by the generic camera strategy
    pub fn is_camera(&self) -> bool {
        matches!(self,
            DetectorFamily::Opal1000 | DetectorFamily::Opal2000 |
            DetectorFamily::Opal4000 | DetectorFamily::Opal8000 |
            DetectorFamily::Fccd960 | DetectorFamily::Tm6740 |
            DetectorFamily::OrcaFl40)
    }

    /// Calibration group directory name, empty for unknown sources
    pub fn calib_group(&self) -> &'static str {
        match self {
            DetectorFamily::Cspad => "CsPad::CalibV1",
            DetectorFamily::Cspad2x2 => "CsPad2x2::CalibV1",
            DetectorFamily::Andor => "Andor::CalibV1",
            DetectorFamily::Pnccd => "PNCCD::CalibV1",
            DetectorFamily::Princeton | DetectorFamily::Pimax => "Princeton::CalibV1",
            DetectorFamily::Epix100a => "Epix100a::CalibV1",
            DetectorFamily::Unknown => "",
            _ => "Camera::CalibV1",
        }
    }

    /// Nominal shape of per-pixel calibration arrays, when fixed by hardware
    pub fn calib_shape(&self) -> Option<Vec<usize>> {
        match self {
            DetectorFamily::Cspad => Some(vec![
                cspad::N_QUADS_MAX, cspad::N_2X1_IN_QUAD, cspad::N_ROWS_2X1, cspad::N_COLS_2X1,
            ]),
            DetectorFamily::Cspad2x2 => Some(vec![cspad2x2::N_ROWS, cspad2x2::N_COLS, cspad2x2::N_2X1]),
            DetectorFamily::Pnccd => Some(vec![pnccd::SEGMENTS, pnccd::N_ROWS, pnccd::N_COLS]),
            DetectorFamily::Epix100a => Some(vec![epix100a::N_ROWS, epix100a::N_COLS]),
            _ => None,
        }
    }

    /// Common-mode parameters used when no file is deployed
    pub fn default_common_mode(&self) -> Vec<f64> {
        match self {
            DetectorFamily::Cspad | DetectorFamily::Cspad2x2 => vec![1.0, 25.0, 25.0, 100.0],
            DetectorFamily::Pnccd => vec![3.0, 1000.0, 1000.0, 128.0],
            DetectorFamily::Epix100a => vec![4.0, 6.0, 30.0, 10.0],
            _ => vec![0.0, 0.0, 0.0, 0.0],
        }
    }

    /// Raw-data (type, rank) combinations the family's strategy serves
    pub fn native_data(&self) -> &'static str {
        match self {
            DetectorFamily::Cspad | DetectorFamily::Cspad2x2 => "int16[3]",
            DetectorFamily::Pnccd => "uint16[3]",
            DetectorFamily::Unknown => "none",
            f if f.is_camera() => "uint16[2], uint8[2]",
            _ => "uint16[2]",
        }
    }
}

impl fmt::Display for DetectorFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn family(name: &str) -> DetectorFamily {
        DetectorFamily::from_source(&SourceIdentity::new(name))
    }

    #[test]
    fn classifies_known_devices() {
        assert_eq!(family("CxiDs1.0:Cspad.0"), DetectorFamily::Cspad);
        assert_eq!(family("MecTargetChamber.0:Cspad2x2.1"), DetectorFamily::Cspad2x2);
        assert_eq!(family("DetInfo(Camp.0:pnCCD.1)"), DetectorFamily::Pnccd);
        assert_eq!(family("SxrEndstation.0:Fccd960.0"), DetectorFamily::Fccd960);
        assert_eq!(family("XcsBeamline.0:Pimax.0"), DetectorFamily::Pimax);
        assert_eq!(family("MecTargetChamber.0:Epix100a.1"), DetectorFamily::Epix100a);
    }

    #[test]
    fn unknown_devices_and_garbage_are_unknown() {
        assert_eq!(family("XppEndstation.0:Rayonix.0"), DetectorFamily::Unknown);
        assert_eq!(family("not a source"), DetectorFamily::Unknown);
        assert_eq!(DetectorFamily::Unknown.calib_group(), "");
    }

    #[test]
    fn cameras_share_one_calib_group() {
        for f in [DetectorFamily::Opal1000, DetectorFamily::Fccd960, DetectorFamily::OrcaFl40] {
            assert!(f.is_camera());
            assert_eq!(f.calib_group(), "Camera::CalibV1");
        }
        assert!(!DetectorFamily::Andor.is_camera());
        assert_eq!(DetectorFamily::Pimax.calib_group(), DetectorFamily::Princeton.calib_group());
    }
}

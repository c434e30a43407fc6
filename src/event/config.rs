//! Per-source configuration objects stored in the environment

use crate::detector::constants::cspad;

/// Configuration of a detector as recorded at the start of a run
#[derive(Debug, Clone, PartialEq)]
pub enum DetectorConfig {
    Cspad {
        /// Enabled two-by-one sensors per quadrant, one bit per sensor
        roi_mask: [u32; cspad::N_QUADS_MAX],
        /// Number of enabled sensors over all quadrants
        num_sect: u32,
    },
    Cspad2x2 {
        roi_mask: u32,
    },
    Camera {
        width: u32,
        height: u32,
        depth: u32,
        offset: u32,
    },
    Andor {
        width: u32,
        height: u32,
        exposure_time: f32,
    },
    Pnccd {
        num_links: u32,
        rows: u32,
        cols: u32,
    },
    Princeton {
        width: u32,
        height: u32,
        exposure_time: f32,
    },
    Epix {
        rows: u32,
        cols: u32,
        num_asics: u32,
    },
}

impl DetectorConfig {
    /// Full CSPAD configuration with every sensor enabled
    pub fn cspad_full() -> Self {
        DetectorConfig::Cspad {
            roi_mask: [cspad::FULL_ROI_MASK; cspad::N_QUADS_MAX],
            num_sect: cspad::N_2X1_IN_CSPAD as u32,
        }
    }

    /// CSPAD configuration from per-quadrant sensor masks
    pub fn cspad_with_mask(roi_mask: [u32; cspad::N_QUADS_MAX]) -> Self {
        let num_sect = roi_mask.iter().map(|m| (m & cspad::FULL_ROI_MASK).count_ones()).sum();
        DetectorConfig::Cspad { roi_mask, num_sect }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cspad_mask_counts_sections() {
        match DetectorConfig::cspad_with_mask([0xff, 0x0f, 0, 0x101]) {
            DetectorConfig::Cspad { num_sect, .. } => assert_eq!(num_sect, 13),
            other => panic!("unexpected config: {:?}", other),
        }
    }
}

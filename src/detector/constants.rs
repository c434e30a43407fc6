//! Detector access constants
//!
//! Fixed panel geometry of the tiled detectors, gain-bit layout of the
//! Fccd960 camera, print-bit masks and calibration status codes.

/// Print control bits
pub mod print_bits {
    /// Lifecycle information: resource (re)builds, strategy selection, missing data
    pub const INFO: u32 = 0x1;
    /// Calibration file finder tracing
    pub const CALIB_FINDER: u32 = 0x2;
    /// Per-event extraction and geometry tracing
    pub const DETAILS: u32 = 0x4;
}

/// Tiled multi-panel detector (CSPAD) layout
pub mod cspad {
    /// Maximal number of quadrants
    pub const N_QUADS_MAX: usize = 4;
    /// Two-by-one sensors per quadrant
    pub const N_2X1_IN_QUAD: usize = 8;
    pub const N_ROWS_2X1: usize = 185;
    pub const N_COLS_2X1: usize = 388;
    pub const SIZE_2X1: usize = N_ROWS_2X1 * N_COLS_2X1;
    /// Two-by-one sensors in the full detector
    pub const N_2X1_IN_CSPAD: usize = N_QUADS_MAX * N_2X1_IN_QUAD;
    /// ROI mask with all sensors of a quadrant enabled
    pub const FULL_ROI_MASK: u32 = 0xff;
}

/// Two-by-two panel detector (CSPAD2x2) layout
pub mod cspad2x2 {
    pub const N_ROWS: usize = 185;
    pub const N_COLS: usize = 388;
    pub const N_2X1: usize = 2;
}

/// Multi-segment frame detector (pnCCD) layout
pub mod pnccd {
    /// Link frames assembled into one array
    pub const SEGMENTS: usize = 4;
    pub const N_ROWS: usize = 512;
    pub const N_COLS: usize = 512;
}

/// High-resolution pixel array (Epix100a) layout
pub mod epix100a {
    pub const N_ROWS: usize = 704;
    pub const N_COLS: usize = 768;
}

/// Fccd960 gain-selector encoding
pub mod fccd960 {
    /// Data bits below the gain selector
    pub const DATA_MASK: u16 = 0x3fff;
    /// Position of the two-bit gain selector
    pub const GAIN_SHIFT: u16 = 14;
}

/// Repeated warnings are printed at most this many times per strategy
pub const MAX_WARNINGS: u32 = 10;

/// Run number of a cache slot that was never loaded
pub const RUN_UNDEFINED: i32 = -1;

//! Family-specific raw event payloads
//!
//! Each variant mirrors the layout a detector delivers on the wire. Only
//! the matching extraction strategy interprets its contents.

use crate::array::NdArray;

/// One CSPAD quadrant as read out
///
/// `data` holds only the enabled two-by-one sensors of the quadrant, in
/// ascending sensor order: shape `[n_enabled, 185, 388]`.
#[derive(Debug, Clone)]
pub struct CspadQuad {
    /// Quadrant number, 0..4
    pub quad: u32,
    pub data: NdArray<i16, 3>,
}

/// CSPAD event data, one element per quadrant present in the readout
#[derive(Debug, Clone, Default)]
pub struct CspadData {
    pub quads: Vec<CspadQuad>,
}

/// CSPAD2x2 element, shape `[185, 388, 2]`
#[derive(Debug, Clone)]
pub struct Cspad2x2Element {
    pub data: NdArray<i16, 3>,
}

/// Single camera frame
///
/// Cameras deliver either 16-bit or 8-bit samples depending on depth; the
/// other buffer is absent.
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// Bits per sample
    pub depth: u32,
    /// Offset (black level) subtracted from each sample
    pub offset: u32,
    pub data16: Option<NdArray<u16, 2>>,
    pub data8: Option<NdArray<u8, 2>>,
}

impl CameraFrame {
    /// Frame with 16-bit samples
    pub fn with_data16(offset: u32, data: NdArray<u16, 2>) -> Self {
        let [height, width] = data.shape();
        CameraFrame {
            width: width as u32,
            height: height as u32,
            depth: 16,
            offset,
            data16: Some(data),
            data8: None,
        }
    }

    /// Frame with 8-bit samples
    pub fn with_data8(offset: u32, data: NdArray<u8, 2>) -> Self {
        let [height, width] = data.shape();
        CameraFrame {
            width: width as u32,
            height: height as u32,
            depth: 8,
            offset,
            data16: None,
            data8: Some(data),
        }
    }
}

/// EM-CCD frame
#[derive(Debug, Clone)]
pub struct AndorFrame {
    pub shot_id: u32,
    pub exposure_time: f32,
    pub temperature: f32,
    pub data: NdArray<u16, 2>,
}

/// pnCCD frames, one per readout link
#[derive(Debug, Clone, Default)]
pub struct PnccdFrames {
    pub links: Vec<NdArray<u16, 2>>,
}

/// Princeton or Pimax frame
#[derive(Debug, Clone)]
pub struct PrincetonFrame {
    pub shot_id: u32,
    pub readout_time: f32,
    pub temperature: f32,
    pub data: NdArray<u16, 2>,
}

/// Epix100a element
#[derive(Debug, Clone)]
pub struct EpixElement {
    pub frame_number: u32,
    pub acq_count: u32,
    pub data: NdArray<u16, 2>,
}

/// Raw per-event payload of a source
#[derive(Debug, Clone)]
pub enum RawPayload {
    Cspad(CspadData),
    Cspad2x2(Cspad2x2Element),
    Camera(CameraFrame),
    Andor(AndorFrame),
    Pnccd(PnccdFrames),
    Princeton(PrincetonFrame),
    Pimax(PrincetonFrame),
    Epix(EpixElement),
}

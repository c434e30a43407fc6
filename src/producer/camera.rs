//! Single-frame camera strategy
//!
//! Serves Opal1000/2000/4000/8000, Fccd960, Tm6740 and OrcaFl40. Mode bit 0
//! returns frames as stored; mode 0 subtracts the frame offset. Fccd960
//! frames carry a gain selector in the two top bits of every sample,
//! decoded instead of the offset subtraction.

use log::{debug, info};
use num_traits::{AsPrimitive, WrappingSub};

use crate::array::NdArray;
use crate::detector::constants::{fccd960, print_bits};
use crate::detector::family::DetectorFamily;
use crate::event::{CameraFrame, DetectorConfig, PayloadLookup, RawPayload};
use super::common::{ProducerParams, WarningCounter};
use super::strategy::RawExtractor;

/// `T(v) - T(offset)` per element, in the arithmetic of the output type
pub fn subtract_offset<S, T>(src: &[S], offset: u32) -> Vec<T>
where
    S: AsPrimitive<T>,
    T: Copy + 'static + WrappingSub,
    u32: AsPrimitive<T>,
{
    let offset: T = offset.as_();
    src.iter().map(|v| v.as_().wrapping_sub(&offset)).collect()
}

/// Decode one Fccd960 sample: selector 1 scales by 4, selector 3 by 8
///
/// The data field is 14 bits wide, so selector 3 can produce values above
/// `u16::MAX`; the `u16` output of the strategy wraps those.
///
/// # Arguments
/// * `code` - Raw sample with the gain selector in bits 14 and 15
///
/// # Returns
/// The decoded value before narrowing to the output type
pub fn fccd960_decode(code: u16) -> u32 {
    let value = (code & fccd960::DATA_MASK) as u32;
    match (code >> fccd960::GAIN_SHIFT) & 0x3 {
        1 => value << 2,
        3 => value << 3,
        _ => value,
    }
}

pub struct CameraExtractor {
    params: ProducerParams,
    as_data: bool,
    subtract_offset: bool,
    gain_bits: bool,
    warnings: WarningCounter,
}

impl CameraExtractor {
    pub fn new(params: ProducerParams) -> Self {
        let as_data = params.mode & 1 != 0;
        let subtract_offset = params.mode == 0;
        let gain_bits = params.family == DetectorFamily::Fccd960;
        CameraExtractor {
            params,
            as_data,
            subtract_offset,
            gain_bits,
            warnings: WarningCounter::new(),
        }
    }

    fn frame<'a>(&self, q: &PayloadLookup<'a>) -> Option<&'a CameraFrame> {
        match q.payload(&self.params.source) {
            Some(RawPayload::Camera(frame)) => Some(frame),
            _ => None,
        }
    }

    fn offset(&self, frame: &CameraFrame) -> u32 {
        if self.subtract_offset { frame.offset } else { 0 }
    }

    fn convert16(&self, frame: &CameraFrame, data: &NdArray<u16, 2>) -> NdArray<u16, 2> {
        if self.as_data {
            return data.clone();
        }
        if self.params.prints(print_bits::DETAILS) {
            debug!("{}: uint16 frame {:?}, offset={}", self.name(), data.shape(), self.offset(frame));
        }
        let values: Vec<u16> = if self.gain_bits {
            data.as_slice().iter().map(|&code| fccd960_decode(code) as u16).collect()
        } else {
            subtract_offset(data.as_slice(), self.offset(frame))
        };
        NdArray::from_vec(data.shape(), values).unwrap_or_default()
    }

    fn convert8(&self, frame: &CameraFrame, data: &NdArray<u8, 2>) -> NdArray<u8, 2> {
        if self.as_data {
            return data.clone();
        }
        let values: Vec<u8> = subtract_offset(data.as_slice(), self.offset(frame));
        NdArray::from_vec(data.shape(), values).unwrap_or_default()
    }
}

impl RawExtractor for CameraExtractor {
    fn name(&self) -> &'static str {
        "CameraExtractor"
    }

    fn params(&self) -> &ProducerParams {
        &self.params
    }

    fn warning_count(&self) -> u32 {
        self.warnings.count()
    }

    fn data_u16_2(&mut self, q: &PayloadLookup<'_>) -> NdArray<u16, 2> {
        if let Some(frame) = self.frame(q) {
            if let Some(data) = frame.data16.as_ref().filter(|d| !d.is_empty()) {
                return self.convert16(frame, data);
            }
        }
        self.warnings.warn_missing(&self.params, "Camera::Frame for data type uint16");
        NdArray::empty()
    }

    fn data_u8_2(&mut self, q: &PayloadLookup<'_>) -> NdArray<u8, 2> {
        if let Some(frame) = self.frame(q) {
            if let Some(data) = frame.data8.as_ref().filter(|d| !d.is_empty()) {
                return self.convert8(frame, data);
            }
        }
        self.warnings.warn_missing(&self.params, "Camera::Frame for data type uint8");
        NdArray::empty()
    }

    fn print_config(&mut self, q: &PayloadLookup<'_>) {
        match q.config(&self.params.source) {
            Some(DetectorConfig::Camera { width, height, depth, offset }) => {
                info!("{}: Camera::Config:\n  width = {}\n  height = {}\n  depth = {}\n  offset = {}",
                      self.name(), width, height, depth, offset);
            }
            _ => info!("{}: Camera::Config is not found for source {}", self.name(), self.params.source),
        }
        match self.frame(q) {
            Some(frame) => info!("{}: Camera::Frame:\n  width = {}\n  height = {}\n  depth = {}\n  offset = {}",
                                 self.name(), frame.width, frame.height, frame.depth, frame.offset),
            None => info!("{}: Camera::Frame is not found for source {}", self.name(), self.params.source),
        }
    }
}

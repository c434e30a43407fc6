//! Andor EM-CCD strategy

use log::info;

use crate::array::NdArray;
use crate::event::{AndorFrame, DetectorConfig, PayloadLookup, RawPayload};
use super::common::{ProducerParams, WarningCounter};
use super::strategy::RawExtractor;

pub struct AndorExtractor {
    params: ProducerParams,
    warnings: WarningCounter,
}

impl AndorExtractor {
    pub fn new(params: ProducerParams) -> Self {
        AndorExtractor { params, warnings: WarningCounter::new() }
    }
}

/// Header fields of one frame as printed by `print_config`
fn frame_header(frame: &AndorFrame) -> String {
    format!("Andor::Frame:\n  shotIdStart = {}\n  exposureTime = {}\n  temperature = {}",
            frame.shot_id, frame.exposure_time, frame.temperature)
}

impl RawExtractor for AndorExtractor {
    fn name(&self) -> &'static str {
        "AndorExtractor"
    }

    fn params(&self) -> &ProducerParams {
        &self.params
    }

    fn warning_count(&self) -> u32 {
        self.warnings.count()
    }

    fn data_u16_2(&mut self, q: &PayloadLookup<'_>) -> NdArray<u16, 2> {
        match q.payload(&self.params.source) {
            Some(RawPayload::Andor(frame)) => frame.data.clone(),
            _ => {
                self.warnings.warn_missing(&self.params, "Andor::Frame");
                NdArray::empty()
            }
        }
    }

    fn print_config(&mut self, q: &PayloadLookup<'_>) {
        match q.config(&self.params.source) {
            Some(DetectorConfig::Andor { width, height, exposure_time }) =>
                info!("{}: Andor::Config:\n  width = {}\n  height = {}\n  exposureTime = {}",
                      self.name(), width, height, exposure_time),
            _ => info!("{}: Andor::Config is not found for source {}", self.name(), self.params.source),
        }
        if let Some(RawPayload::Andor(frame)) = q.payload(&self.params.source) {
            info!("{}: {}", self.name(), frame_header(frame));
        }
    }
}

//! Princeton / Pimax strategy

use log::info;

use crate::array::NdArray;
use crate::event::{DetectorConfig, PayloadLookup, RawPayload};
use super::common::{ProducerParams, WarningCounter};
use super::strategy::RawExtractor;

pub struct PrincetonExtractor {
    params: ProducerParams,
    warnings: WarningCounter,
}

impl PrincetonExtractor {
    pub fn new(params: ProducerParams) -> Self {
        PrincetonExtractor { params, warnings: WarningCounter::new() }
    }
}

impl RawExtractor for PrincetonExtractor {
    fn name(&self) -> &'static str {
        "PrincetonExtractor"
    }

    fn params(&self) -> &ProducerParams {
        &self.params
    }

    fn warning_count(&self) -> u32 {
        self.warnings.count()
    }

    fn data_u16_2(&mut self, q: &PayloadLookup<'_>) -> NdArray<u16, 2> {
        match q.payload(&self.params.source) {
            Some(RawPayload::Princeton(frame)) | Some(RawPayload::Pimax(frame)) => frame.data.clone(),
            _ => {
                self.warnings.warn_missing(&self.params, "Princeton::Frame or Pimax::Frame");
                NdArray::empty()
            }
        }
    }

    fn print_config(&mut self, q: &PayloadLookup<'_>) {
        match q.config(&self.params.source) {
            Some(DetectorConfig::Princeton { width, height, exposure_time }) =>
                info!("{}: Princeton::Config:\n  width = {}\n  height = {}\n  exposureTime = {}",
                      self.name(), width, height, exposure_time),
            _ => info!("{}: Princeton::Config is not found for source {}", self.name(), self.params.source),
        }
    }
}

//! CSPAD2x2 strategy: the element array is already canonical

use log::info;

use crate::array::NdArray;
use crate::event::{DetectorConfig, PayloadLookup, RawPayload};
use super::common::{ProducerParams, WarningCounter};
use super::strategy::RawExtractor;

pub struct Cspad2x2Extractor {
    params: ProducerParams,
    warnings: WarningCounter,
}

impl Cspad2x2Extractor {
    pub fn new(params: ProducerParams) -> Self {
        Cspad2x2Extractor { params, warnings: WarningCounter::new() }
    }
}

impl RawExtractor for Cspad2x2Extractor {
    fn name(&self) -> &'static str {
        "Cspad2x2Extractor"
    }

    fn params(&self) -> &ProducerParams {
        &self.params
    }

    fn warning_count(&self) -> u32 {
        self.warnings.count()
    }

    fn data_i16_3(&mut self, q: &PayloadLookup<'_>) -> NdArray<i16, 3> {
        match q.payload(&self.params.source) {
            Some(RawPayload::Cspad2x2(el)) => el.data.clone(),
            _ => {
                self.warnings.warn_missing(&self.params, "CsPad2x2::Element");
                NdArray::empty()
            }
        }
    }

    fn print_config(&mut self, q: &PayloadLookup<'_>) {
        match q.config(&self.params.source) {
            Some(DetectorConfig::Cspad2x2 { roi_mask }) =>
                info!("{}: CsPad2x2::Config:\n  roiMask = {:#x}", self.name(), roi_mask),
            _ => info!("{}: CsPad2x2::Config is not found for source {}", self.name(), self.params.source),
        }
    }
}

//! Epix100a strategy

use log::info;

use crate::array::NdArray;
use crate::event::{DetectorConfig, PayloadLookup, RawPayload};
use super::common::{ProducerParams, WarningCounter};
use super::strategy::RawExtractor;

pub struct EpixExtractor {
    params: ProducerParams,
    warnings: WarningCounter,
}

impl EpixExtractor {
    pub fn new(params: ProducerParams) -> Self {
        EpixExtractor { params, warnings: WarningCounter::new() }
    }
}

impl RawExtractor for EpixExtractor {
    fn name(&self) -> &'static str {
        "EpixExtractor"
    }

    fn params(&self) -> &ProducerParams {
        &self.params
    }

    fn warning_count(&self) -> u32 {
        self.warnings.count()
    }

    fn data_u16_2(&mut self, q: &PayloadLookup<'_>) -> NdArray<u16, 2> {
        match q.payload(&self.params.source) {
            Some(RawPayload::Epix(el)) => el.data.clone(),
            _ => {
                self.warnings.warn_missing(&self.params, "Epix::Element");
                NdArray::empty()
            }
        }
    }

    fn print_config(&mut self, q: &PayloadLookup<'_>) {
        match q.config(&self.params.source) {
            Some(DetectorConfig::Epix { rows, cols, num_asics }) =>
                info!("{}: Epix100a::Config:\n  numberOfRows = {}\n  numberOfColumns = {}\n  numberOfAsics = {}",
                      self.name(), rows, cols, num_asics),
            _ => info!("{}: Epix100a::Config is not found for source {}", self.name(), self.params.source),
        }
        if let Some(RawPayload::Epix(el)) = q.payload(&self.params.source) {
            info!("{}: Epix::Element:\n  frameNumber = {}\n  acqCount = {}", self.name(), el.frame_number, el.acq_count);
        }
    }
}

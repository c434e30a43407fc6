//! pnCCD strategy: link frames stacked into `[4, rows, cols]`

use log::{debug, info};

use crate::array::NdArray;
use crate::detector::constants::{pnccd, print_bits};
use crate::event::{DetectorConfig, PayloadLookup, RawPayload};
use super::common::{ProducerParams, WarningCounter};
use super::strategy::RawExtractor;

pub struct PnccdExtractor {
    params: ProducerParams,
    count_evt: u64,
    warnings: WarningCounter,
}

impl PnccdExtractor {
    pub fn new(params: ProducerParams) -> Self {
        PnccdExtractor { params, count_evt: 0, warnings: WarningCounter::new() }
    }
}

impl RawExtractor for PnccdExtractor {
    fn name(&self) -> &'static str {
        "PnccdExtractor"
    }

    fn params(&self) -> &ProducerParams {
        &self.params
    }

    fn warning_count(&self) -> u32 {
        self.warnings.count()
    }

    fn data_u16_3(&mut self, q: &PayloadLookup<'_>) -> NdArray<u16, 3> {
        self.count_evt += 1;

        let frames = match q.payload(&self.params.source) {
            Some(RawPayload::Pnccd(frames)) if !frames.links.is_empty() => frames,
            _ => {
                self.warnings.warn_missing(&self.params, "PNCCD::FullFrame");
                return NdArray::empty();
            }
        };

        // segment shape comes from the first link
        let [rows, cols] = frames.links[0].shape();
        let mut out = NdArray::filled([pnccd::SEGMENTS, rows, cols], self.params.default_as::<u16>());

        for (i, link) in frames.links.iter().take(pnccd::SEGMENTS).enumerate() {
            if link.shape() != [rows, cols] {
                debug!("{}: link {} has shape {:?}, expected {:?}", self.name(), i, link.shape(), [rows, cols]);
                continue;
            }
            out.subarray_mut(i).copy_from_slice(link.as_slice());
        }

        if self.params.prints(print_bits::DETAILS) {
            debug!("{}: event {}: numLinks = {}, frame size = {}x{}",
                   self.name(), self.count_evt, frames.links.len(), rows, cols);
        }
        out
    }

    fn print_config(&mut self, q: &PayloadLookup<'_>) {
        match q.config(&self.params.source) {
            Some(DetectorConfig::Pnccd { num_links, rows, cols }) =>
                info!("{}: PNCCD::Config:\n  numLinks = {}\n  numRows = {}\n  numChannels = {}",
                      self.name(), num_links, rows, cols),
            _ => info!("{}: PNCCD::Config is not found for source {}", self.name(), self.params.source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::source::SourceIdentity;
    use crate::event::{MemoryEnv, MemoryEvent, PnccdFrames};

    #[test]
    fn missing_links_keep_default_and_extra_links_are_ignored() {
        let src = SourceIdentity::new("Camp.0:pnCCD.1");
        let mut ex = PnccdExtractor::new(ProducerParams::new(&src, 0, 0, 9.0));
        let env = MemoryEnv::new(3, "", "AMO");

        let link = |v: u16| NdArray::filled([2, 3], v);
        let mut evt = MemoryEvent::new();
        evt.insert(&src, RawPayload::Pnccd(PnccdFrames { links: vec![link(1), link(2)] }));
        let out = ex.data_u16_3(&PayloadLookup::new(&evt, &env, ""));
        assert_eq!(out.shape(), [4, 2, 3]);
        assert!(out.subarray(1).iter().all(|&v| v == 2));
        assert!(out.subarray(3).iter().all(|&v| v == 9));

        let mut evt = MemoryEvent::new();
        evt.insert(&src, RawPayload::Pnccd(PnccdFrames { links: (1..=5).map(link).collect() }));
        let out = ex.data_u16_3(&PayloadLookup::new(&evt, &env, ""));
        assert!(out.subarray(3).iter().all(|&v| v == 4));
    }

    #[test]
    fn missing_payload_is_empty() {
        let src = SourceIdentity::new("Camp.0:pnCCD.1");
        let mut ex = PnccdExtractor::new(ProducerParams::new(&src, 0, 1, 0.0));
        let evt = MemoryEvent::new();
        let env = MemoryEnv::new(3, "", "AMO");
        let out = ex.data_u16_3(&PayloadLookup::new(&evt, &env, ""));
        assert_eq!(out.size(), 0);
        assert_eq!(out.rank(), 3);
        assert_eq!(ex.warning_count(), 1);
    }
}

//! CSPAD strategy: quadrant payloads assembled into the full detector

use log::{debug, info, warn};

use crate::array::NdArray;
use crate::detector::constants::{cspad, print_bits};
use crate::event::{CspadData, DetectorConfig, PayloadLookup, RawPayload};
use super::common::{ProducerParams, WarningCounter};
use super::strategy::RawExtractor;

/// Sensor enable masks learned from the run configuration
#[derive(Debug, Clone, Copy, PartialEq)]
struct CspadLayout {
    roi_mask: [u32; cspad::N_QUADS_MAX],
    num_sect: u32,
}

/// CSPAD extraction
///
/// Mode 0 assembles `[32, 185, 388]` with absent sensors set to the
/// default value; any other mode returns the sensors present in the
/// event, concatenated as `[N, 185, 388]`.
pub struct CspadExtractor {
    params: ProducerParams,
    as_data: bool,
    layout: Option<CspadLayout>,
    count_evt: u64,
    warnings: WarningCounter,
}

impl CspadExtractor {
    pub fn new(params: ProducerParams) -> Self {
        let as_data = params.mode != 0;
        CspadExtractor {
            params,
            as_data,
            layout: None,
            count_evt: 0,
            warnings: WarningCounter::new(),
        }
    }

    fn layout(&mut self, q: &PayloadLookup<'_>) -> Option<CspadLayout> {
        if self.layout.is_none() {
            if let Some(DetectorConfig::Cspad { roi_mask, num_sect }) = q.config(&self.params.source) {
                let layout = CspadLayout { roi_mask: *roi_mask, num_sect: *num_sect };
                if self.params.prints(print_bits::INFO) {
                    info!("{}: configuration for {}: roi_mask={:x?} num_sect={}",
                          self.name(), self.params.source, layout.roi_mask, layout.num_sect);
                }
                self.layout = Some(layout);
            }
        }
        self.layout
    }

    fn assembled(&self, data: &CspadData, layout: &CspadLayout) -> NdArray<i16, 3> {
        let vdef: i16 = self.params.default_as();
        let mut out = NdArray::filled(
            [cspad::N_2X1_IN_CSPAD, cspad::N_ROWS_2X1, cspad::N_COLS_2X1], vdef);

        for el in &data.quads {
            let qnum = el.quad as usize;
            if qnum >= cspad::N_QUADS_MAX {
                warn!("{}: quad number {} out of range for source {}", self.name(), qnum, self.params.source);
                continue;
            }
            if !has_sensor_shape(&el.data) {
                warn!("{}: quad {} has unexpected shape {:?}", self.name(), qnum, el.data.shape());
                continue;
            }

            let mask = layout.roi_mask[qnum];
            let available = el.data.shape()[0];
            let mut ind_in_quad = 0;
            for sect in 0..cspad::N_2X1_IN_QUAD {
                if mask & (1 << sect) == 0 {
                    continue;
                }
                if ind_in_quad >= available {
                    break;
                }
                let ind_in_det = qnum * cspad::N_2X1_IN_QUAD + sect;
                out.subarray_mut(ind_in_det).copy_from_slice(el.data.subarray(ind_in_quad));
                ind_in_quad += 1;
            }
        }
        out
    }

    fn as_stored(&self, data: &CspadData) -> NdArray<i16, 3> {
        let mut sensors = 0;
        let mut values = Vec::new();
        for el in data.quads.iter().filter(|el| has_sensor_shape(&el.data)) {
            sensors += el.data.shape()[0];
            values.extend_from_slice(el.data.as_slice());
        }
        if self.params.prints(print_bits::DETAILS) {
            debug!("{}: {} sensors in data, {} in configuration", self.name(), sensors,
                   self.layout.map(|l| l.num_sect).unwrap_or(0));
        }
        NdArray::from_vec([sensors, cspad::N_ROWS_2X1, cspad::N_COLS_2X1], values)
            .unwrap_or_default()
    }
}

fn has_sensor_shape(data: &NdArray<i16, 3>) -> bool {
    let [_, rows, cols] = data.shape();
    rows == cspad::N_ROWS_2X1 && cols == cspad::N_COLS_2X1
}

impl RawExtractor for CspadExtractor {
    fn name(&self) -> &'static str {
        "CspadExtractor"
    }

    fn params(&self) -> &ProducerParams {
        &self.params
    }

    fn warning_count(&self) -> u32 {
        self.warnings.count()
    }

    fn data_i16_3(&mut self, q: &PayloadLookup<'_>) -> NdArray<i16, 3> {
        self.count_evt += 1;

        let layout = match self.layout(q) {
            Some(layout) => layout,
            None => {
                self.warnings.warn_missing(&self.params, "CsPad::Config");
                return NdArray::empty();
            }
        };

        match q.payload(&self.params.source) {
            Some(RawPayload::Cspad(data)) => {
                if self.as_data {
                    self.as_stored(data)
                } else {
                    self.assembled(data, &layout)
                }
            }
            _ => {
                self.warnings.warn_missing(&self.params,
                    &format!("CsPad::Data (event {}, key \"{}\")", self.count_evt, q.key));
                NdArray::empty()
            }
        }
    }

    fn print_config(&mut self, q: &PayloadLookup<'_>) {
        match q.config(&self.params.source) {
            Some(DetectorConfig::Cspad { roi_mask, num_sect }) => {
                info!("{}: CsPad::Config:\n  roiMask = {:x?}\n  numSect = {}", self.name(), roi_mask, num_sect);
            }
            _ => info!("{}: CsPad::Config is not found for source {}", self.name(), self.params.source),
        }
    }

    fn invalidate_config(&mut self) {
        self.layout = None;
    }
}

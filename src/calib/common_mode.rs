//! Common-mode correction
//!
//! Parameters (from the calibration common_mode kind):
//!   par[0]  algorithm: 0 disables the correction
//!   par[1]  amplitude threshold for pixels entering the mean, 0 = none
//!   par[3]  block length in pixels, 0 = whole buffer
//! In every block the mean of good pixels (status 0, within threshold)
//! is subtracted from all pixels of the block.

use log::{debug, info};
use num_traits::AsPrimitive;

use crate::detector::constants::print_bits;
use crate::detector::errors::{DetError, DetResult};
use crate::detector::source::SourceIdentity;

/// Sample types the correction operates on
pub trait CommonModeSample: Copy + 'static + AsPrimitive<f64> {}

impl CommonModeSample for i16 {}
impl CommonModeSample for u16 {}
impl CommonModeSample for i32 {}
impl CommonModeSample for f32 {}
impl CommonModeSample for f64 {}

/// Common-mode corrector bound to one run's calibration
#[derive(Debug, Clone)]
pub struct CommonModeCorrection {
    source: SourceIdentity,
    pars: Vec<f64>,
    size: usize,
    status: Vec<u16>,
    print_bits: u32,
}

impl CommonModeCorrection {
    pub fn new(source: &SourceIdentity, pars: &[f64], size: usize, status: &[u16], print_bits: u32) -> Self {
        if print_bits & print_bits::INFO != 0 {
            info!("CommonModeCorrection for {}: pars={:?} size={}", source, pars, size);
        }
        CommonModeCorrection {
            source: source.clone(),
            pars: pars.to_vec(),
            size,
            status: status.to_vec(),
            print_bits,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn pars(&self) -> &[f64] {
        &self.pars
    }

    pub fn is_enabled(&self) -> bool {
        self.pars.first().map_or(false, |&alg| alg != 0.0)
    }

    /// Correct `buf` in place
    pub fn correct<T>(&self, buf: &mut [T]) -> DetResult<()>
    where
        T: CommonModeSample,
        f64: AsPrimitive<T>,
    {
        if buf.len() != self.size {
            return Err(DetError::LengthMismatch { what: "common mode buffer", left: buf.len(), right: self.size });
        }
        if !self.is_enabled() || buf.is_empty() {
            return Ok(());
        }

        let threshold = self.pars.get(1).copied().unwrap_or(0.0);
        let block = match self.pars.get(3).copied().unwrap_or(0.0) as usize {
            0 => buf.len(),
            n => n,
        };

        for (b, chunk) in buf.chunks_mut(block).enumerate() {
            let start = b * block;
            let mut sum = 0.0;
            let mut count = 0usize;
            for (i, v) in chunk.iter().enumerate() {
                let good = self.status.get(start + i).map_or(true, |&s| s == 0);
                let value: f64 = v.as_();
                if good && (threshold <= 0.0 || value.abs() <= threshold) {
                    sum += value;
                    count += 1;
                }
            }
            if count == 0 {
                continue;
            }
            let mean = sum / count as f64;
            if self.print_bits & print_bits::DETAILS != 0 {
                debug!("{}: block {} common mode {:.3} from {} pixels", self.source, b, mean, count);
            }
            for v in chunk.iter_mut() {
                let value: f64 = v.as_();
                *v = (value - mean).as_();
            }
        }
        Ok(())
    }
}

//! State shared by all extraction strategies

use log::{info, warn};
use num_traits::AsPrimitive;

use crate::detector::constants::MAX_WARNINGS;
use crate::detector::family::DetectorFamily;
use crate::detector::source::SourceIdentity;

/// Construction parameters of a strategy
#[derive(Debug, Clone)]
pub struct ProducerParams {
    pub source: SourceIdentity,
    pub family: DetectorFamily,
    /// Family-specific policy bits, e.g. as-stored vs assembled
    pub mode: u32,
    pub print_bits: u32,
    /// Fill value for sub-elements absent from an event
    pub default_value: f32,
}

impl ProducerParams {
    pub fn new(source: &SourceIdentity, mode: u32, print_bits: u32, default_value: f32) -> Self {
        ProducerParams {
            source: source.clone(),
            family: DetectorFamily::from_source(source),
            mode,
            print_bits,
            default_value,
        }
    }

    pub fn prints(&self, bits: u32) -> bool {
        self.print_bits & bits != 0
    }

    /// Default value cast to an output element type
    pub fn default_as<T>(&self) -> T
    where
        f32: AsPrimitive<T>,
        T: Copy + 'static,
    {
        self.default_value.as_()
    }

    /// Log the parameters
    pub fn log(&self, strategy: &str) {
        info!("{}: input parameters:\n  source        : {}\n  mode          : {}\n  vdef          : {}\n  pbits         : {}\n  detector      : {}",
              strategy, self.source, self.mode, self.default_value, self.print_bits, self.family);
    }
}

/// Bounded warning counter, one per strategy instance
#[derive(Debug, Default, Clone)]
pub struct WarningCounter {
    count: u32,
}

impl WarningCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of warnings raised so far, printed or not
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Record a missing object; logs only the first `MAX_WARNINGS` occurrences
    /// and only when printing is enabled. Returns whether a line was logged.
    pub fn warn_missing(&mut self, params: &ProducerParams, what: &str) -> bool {
        self.count = self.count.saturating_add(1);
        if self.count > MAX_WARNINGS || params.print_bits == 0 {
            return false;
        }
        warn!("{} is not available in this run/event for source: {}", what, params.source);
        if self.count == MAX_WARNINGS {
            warn!("STOP PRINTING WARNINGS for source: {}", params.source);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::constants::print_bits;

    fn params(print_bits: u32) -> ProducerParams {
        ProducerParams::new(&SourceIdentity::new("CxiDs1.0:Cspad.0"), 0, print_bits, -1.5)
    }

    #[test]
    fn stops_printing_after_ten() {
        let p = params(print_bits::INFO);
        let mut counter = WarningCounter::new();
        let printed = (0..25).filter(|_| counter.warn_missing(&p, "CsPad::DataV2")).count();
        assert_eq!(printed, MAX_WARNINGS as usize);
        assert_eq!(counter.count(), 25);
    }

    #[test]
    fn silent_without_print_bits() {
        let p = params(0);
        let mut counter = WarningCounter::new();
        assert!(!counter.warn_missing(&p, "CsPad::DataV2"));
        assert_eq!(counter.count(), 1);
    }

    #[test]
    fn default_value_is_cast() {
        let p = params(0);
        assert_eq!(p.default_as::<i16>(), -1);
        assert_eq!(p.default_as::<f64>(), -1.5);
    }
}

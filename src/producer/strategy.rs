//! Raw extraction strategy interface
//!
//! A strategy converts the raw payload of one detector family into a
//! canonical array. Each family serves one or two (type, rank)
//! combinations; the others answer with an empty array.

use log::{info, warn};

use crate::array::{Element, NdArray};
use crate::event::PayloadLookup;
use super::common::ProducerParams;

/// Strategy for turning raw event payloads into canonical arrays
///
/// The seven `data_*` methods cover the closed set of raw (type, rank)
/// combinations. Unsupported combinations return an empty array of the
/// requested rank and log a diagnostic instead of failing.
pub trait RawExtractor {
    /// Strategy name for log lines
    fn name(&self) -> &'static str;

    /// Source, family, mode, print bits and default value the strategy was built with
    fn params(&self) -> &ProducerParams;

    /// Missing-payload warnings raised so far
    fn warning_count(&self) -> u32;

    /// Raw data as `int16` of rank 1
    ///
    /// # Arguments
    /// * `q` - Event, environment and key to read the payload from
    ///
    /// # Returns
    /// The canonical array, or an empty array when the payload is missing
    /// or the family has no such representation
    fn data_i16_1(&mut self, _q: &PayloadLookup<'_>) -> NdArray<i16, 1> {
        self.not_implemented("data_i16_1");
        NdArray::empty()
    }

    /// Raw data as `int16` of rank 2
    fn data_i16_2(&mut self, _q: &PayloadLookup<'_>) -> NdArray<i16, 2> {
        self.not_implemented("data_i16_2");
        NdArray::empty()
    }

    /// Raw data as `int16` of rank 3 (CSPAD and CSPAD2x2)
    fn data_i16_3(&mut self, _q: &PayloadLookup<'_>) -> NdArray<i16, 3> {
        self.not_implemented("data_i16_3");
        NdArray::empty()
    }

    /// Raw data as `int16` of rank 4
    fn data_i16_4(&mut self, _q: &PayloadLookup<'_>) -> NdArray<i16, 4> {
        self.not_implemented("data_i16_4");
        NdArray::empty()
    }

    /// Raw data as `uint16` of rank 2 (cameras, Andor, Princeton, Epix)
    fn data_u16_2(&mut self, _q: &PayloadLookup<'_>) -> NdArray<u16, 2> {
        self.not_implemented("data_u16_2");
        NdArray::empty()
    }

    /// Raw data as `uint16` of rank 3 (pnCCD)
    fn data_u16_3(&mut self, _q: &PayloadLookup<'_>) -> NdArray<u16, 3> {
        self.not_implemented("data_u16_3");
        NdArray::empty()
    }

    /// Raw data as `uint8` of rank 2 (8-bit cameras)
    fn data_u8_2(&mut self, _q: &PayloadLookup<'_>) -> NdArray<u8, 2> {
        self.not_implemented("data_u8_2");
        NdArray::empty()
    }

    /// Log the construction parameters
    fn print(&self) {
        self.params().log(self.name());
    }

    /// Log the family configuration object and payload header
    fn print_config(&mut self, _q: &PayloadLookup<'_>) {
        info!("{}: print_config is not implemented for this detector", self.name());
    }

    /// Forget any cached configuration so the next event looks it up again
    fn invalidate_config(&mut self) {}

    /// Log that `method` has no meaning for this family
    fn not_implemented(&self, method: &str) {
        warn!("{}: method {} is not implemented for source {} ({})",
              self.name(), method, self.params().source, self.params().family);
    }
}

mod private {
    pub trait Sealed<const N: usize> {}
}

/// Element types that may be requested as raw data of rank `N`
///
/// Sealed: exactly the seven combinations of [`RawExtractor`] implement it.
pub trait RawElement<const N: usize>: Element + private::Sealed<N> {
    fn extract_from(extractor: &mut dyn RawExtractor, q: &PayloadLookup<'_>) -> NdArray<Self, N>;
}

macro_rules! raw_element {
    ($t:ty, $n:literal, $method:ident) => {
        impl private::Sealed<$n> for $t {}

        impl RawElement<$n> for $t {
            fn extract_from(extractor: &mut dyn RawExtractor, q: &PayloadLookup<'_>) -> NdArray<$t, $n> {
                extractor.$method(q)
            }
        }
    };
}

raw_element!(i16, 1, data_i16_1);
raw_element!(i16, 2, data_i16_2);
raw_element!(i16, 3, data_i16_3);
raw_element!(i16, 4, data_i16_4);
raw_element!(u16, 2, data_u16_2);
raw_element!(u16, 3, data_u16_3);
raw_element!(u8, 2, data_u8_2);

impl dyn RawExtractor + '_ {
    /// Typed access to raw data, e.g. `extractor.extract::<u16, 2>(&q)`
    pub fn extract<T: RawElement<N>, const N: usize>(&mut self, q: &PayloadLookup<'_>) -> NdArray<T, N> {
        T::extract_from(self, q)
    }
}

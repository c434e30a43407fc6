//! Extraction factory
//!
//! Maps a source to the one strategy serving its detector family.

use log::{error, info};

use crate::detector::constants::print_bits;
use crate::detector::errors::DetError;
use crate::detector::family::DetectorFamily;
use crate::detector::source::SourceIdentity;
use super::andor::AndorExtractor;
use super::camera::CameraExtractor;
use super::common::ProducerParams;
use super::cspad::CspadExtractor;
use super::cspad2x2::Cspad2x2Extractor;
use super::epix::EpixExtractor;
use super::pnccd::PnccdExtractor;
use super::princeton::PrincetonExtractor;
use super::strategy::RawExtractor;

/// Factory for extraction strategies
pub struct ExtractorFactory;

impl ExtractorFactory {
    /// Create the strategy for a source
    ///
    /// # Arguments
    /// * `source` - Data source; its device name selects the family
    /// * `mode` - Family-specific policy bits, e.g. as-stored vs assembled
    /// * `print_bits` - Diagnostic verbosity of the strategy
    /// * `default_value` - Fill value for sub-elements absent from an event
    ///
    /// # Returns
    /// The boxed strategy serving the source's family
    ///
    /// # Panics
    /// Panics when the source belongs to no supported family. Running on
    /// with a substitute strategy would hand out wrongly shaped data.
    pub fn select(source: &SourceIdentity, mode: u32, print_bits: u32, default_value: f32) -> Box<dyn RawExtractor> {
        let params = ProducerParams::new(source, mode, print_bits, default_value);
        let family = params.family;

        let extractor: Box<dyn RawExtractor> = match family {
            DetectorFamily::Cspad => Box::new(CspadExtractor::new(params)),
            DetectorFamily::Cspad2x2 => Box::new(Cspad2x2Extractor::new(params)),
            f if f.is_camera() => Box::new(CameraExtractor::new(params)),
            DetectorFamily::Andor => Box::new(AndorExtractor::new(params)),
            DetectorFamily::Pnccd => Box::new(PnccdExtractor::new(params)),
            DetectorFamily::Princeton | DetectorFamily::Pimax => Box::new(PrincetonExtractor::new(params)),
            DetectorFamily::Epix100a => Box::new(EpixExtractor::new(params)),
            _ => {
                let err = DetError::UnknownSource(source.to_string());
                error!("{}", err);
                panic!("{}", err);
            }
        };

        if print_bits & print_bits::INFO != 0 {
            info!("Selected {} for source {} ({})", extractor.name(), source, family);
            extractor.print();
        }
        extractor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select(name: &str) -> Box<dyn RawExtractor> {
        ExtractorFactory::select(&SourceIdentity::new(name), 0, 0, 0.0)
    }

    #[test]
    fn dispatch_table() {
        assert_eq!(select("CxiDs1.0:Cspad.0").name(), "CspadExtractor");
        assert_eq!(select("MecTargetChamber.0:Cspad2x2.1").name(), "Cspad2x2Extractor");
        for cam in ["Opal1000", "Opal2000", "Opal4000", "Opal8000", "Fccd960", "Tm6740", "OrcaFl40"] {
            assert_eq!(select(&format!("AmoEndstation.0:{}.0", cam)).name(), "CameraExtractor");
        }
        assert_eq!(select("SxrEndstation.0:Andor.0").name(), "AndorExtractor");
        assert_eq!(select("Camp.0:pnCCD.0").name(), "PnccdExtractor");
        assert_eq!(select("XcsBeamline.0:Princeton.0").name(), "PrincetonExtractor");
        assert_eq!(select("XcsBeamline.0:Pimax.0").name(), "PrincetonExtractor");
        assert_eq!(select("XcsEndstation.0:Epix100a.0").name(), "EpixExtractor");
    }

    #[test]
    #[should_panic(expected = "not implemented")]
    fn unknown_source_is_fatal() {
        select("XppGon.0:Rayonix.0");
    }
}

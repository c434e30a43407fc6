//! Detector source identity
//!
//! A source names one hardware unit, e.g. `CxiDs1.0:Cspad.0`. The same
//! name may arrive wrapped as `DetInfo(CxiDs1.0:Cspad.0)`.

use std::fmt;
use lazy_static::lazy_static;
use regex::Regex;

use crate::detector::errors::{DetError, DetResult};

lazy_static! {
    static ref SOURCE_PATTERN: Regex =
        Regex::new(r"^(?:DetInfo\()?\s*([A-Za-z0-9_\-]+)\.(\d+):([A-Za-z0-9_]+)\.(\d+)\s*\)?$")
            .expect("source pattern is valid");
}

/// Parsed components of a source name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceParts {
    /// Location, e.g. `CxiDs1`
    pub detector: String,
    pub detector_id: u32,
    /// Device type name, e.g. `Cspad`
    pub device: String,
    pub device_id: u32,
}

/// Immutable identity of a data source
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceIdentity {
    raw: String,
    canonical: String,
}

impl SourceIdentity {
    /// Bind an identity to a source name. Unparsable names are kept verbatim.
    pub fn new(name: &str) -> Self {
        let raw = name.trim().to_string();
        let canonical = match parse_parts(&raw) {
            Ok(p) => format!("{}.{}:{}.{}", p.detector, p.detector_id, p.device, p.device_id),
            Err(_) => raw.clone(),
        };
        SourceIdentity { raw, canonical }
    }

    /// Name as given by the caller
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// `Det.N:Dev.M` form used as a calibration directory name
    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    /// Components of the name, if it follows the source grammar
    pub fn parts(&self) -> DetResult<SourceParts> {
        parse_parts(&self.raw)
    }

    /// Device type name, e.g. `pnCCD`
    pub fn device(&self) -> Option<String> {
        self.parts().ok().map(|p| p.device)
    }
}

impl fmt::Display for SourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical)
    }
}

impl From<&str> for SourceIdentity {
    fn from(name: &str) -> Self {
        SourceIdentity::new(name)
    }
}

fn parse_parts(name: &str) -> DetResult<SourceParts> {
    let caps = SOURCE_PATTERN.captures(name)
        .ok_or_else(|| DetError::InvalidSourceName(name.to_string()))?;

    let number = |i: usize| -> DetResult<u32> {
        caps[i].parse::<u32>()
            .map_err(|_| DetError::InvalidSourceName(name.to_string()))
    };

    Ok(SourceParts {
        detector: caps[1].to_string(),
        detector_id: number(2)?,
        device: caps[3].to_string(),
        device_id: number(4)?,
    })
}

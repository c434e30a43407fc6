//! File-backed calibration store
//!
//! Each kind is a whitespace-separated text table deployed under the
//! calibration directory. Kinds that are absent, unreadable or of the
//! wrong size fall back to family defaults and say so in their status.

use std::fs;
use std::path::Path;
use log::{info, warn};

use crate::detector::constants::print_bits;
use crate::detector::errors::{DetError, DetResult};
use crate::detector::family::DetectorFamily;
use crate::detector::source::SourceIdentity;
use super::finder::{data_lines, path_name, CalibFileFinder};
use super::store::{CalibBundle, CalibStatus, CalibStore, CalibType};

/// Numeric text table
#[derive(Debug, Clone, PartialEq)]
pub struct TextTable {
    pub rows: usize,
    pub cols: usize,
    pub values: Vec<f64>,
}

impl TextTable {
    /// Read a table; `#` starts a comment line
    pub fn read(path: &Path) -> DetResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text, &path_name(path))
    }

    pub fn parse(text: &str, origin: &str) -> DetResult<Self> {
        let mut rows = 0;
        let mut cols = 0;
        let mut values = Vec::new();
        for (line_no, line) in data_lines(text) {
            let before = values.len();
            for token in line.split_whitespace() {
                let v = token.parse::<f64>().map_err(|e| DetError::ParseError {
                    path: origin.to_string(),
                    line: line_no,
                    message: format!("'{}': {}", token, e),
                })?;
                values.push(v);
            }
            if rows == 0 {
                cols = values.len() - before;
            }
            rows += 1;
        }
        Ok(TextTable { rows, cols, values })
    }
}

/// Calibration store reading text tables through [`CalibFileFinder`]
#[derive(Debug, Default, Clone)]
pub struct FileCalibStore;

impl FileCalibStore {
    pub fn new() -> Self {
        FileCalibStore
    }

    /// Shape of the per-pixel arrays: nominal for the family, else the pedestals table
    fn bundle_shape(family: DetectorFamily, pedestals: Option<&DetResult<TextTable>>) -> Vec<usize> {
        if let Some(shape) = family.calib_shape() {
            return shape;
        }
        match pedestals {
            Some(Ok(table)) if table.rows > 1 => vec![table.rows, table.cols],
            Some(Ok(table)) => vec![table.values.len()],
            _ => vec![0],
        }
    }
}

impl CalibStore for FileCalibStore {
    fn load(&self, calib_dir: &str, group: &str, source: &SourceIdentity, run: i32, pbits: u32) -> CalibBundle {
        let family = DetectorFamily::from_source(source);
        let finder = CalibFileFinder::new(calib_dir, group, pbits);

        let tables: Vec<(CalibType, Option<DetResult<TextTable>>)> = CalibType::ALL.iter()
            .map(|&t| {
                let table = finder.find_calib_file(source, t.dir_name(), run).map(|p| TextTable::read(&p));
                (t, table)
            })
            .collect();

        let pedestals = tables.iter()
            .find(|(t, _)| *t == CalibType::Pedestals)
            .and_then(|(_, table)| table.as_ref());
        let shape = Self::bundle_shape(family, pedestals);
        let mut bundle = CalibBundle::with_defaults(family, shape);

        for (calib_type, table) in tables {
            match table {
                None => bundle.set_status(calib_type, CalibStatus::Default),
                Some(Err(e)) => {
                    warn!("Calibration {} for {} run {} is unreadable, using defaults: {}",
                          calib_type, source, run, e);
                    bundle.set_status(calib_type, CalibStatus::Unreadable);
                }
                Some(Ok(table)) => {
                    if bundle.set_values(calib_type, &table.values).is_err() {
                        warn!("Calibration {} for {} run {} has {} values, expected {}; using defaults",
                              calib_type, source, run, table.values.len(), bundle.size());
                        bundle.set_status(calib_type, CalibStatus::WrongSize);
                    }
                }
            }
        }

        if pbits & print_bits::INFO != 0 {
            info!("FileCalibStore: {} run {} shape {:?}", source, run, bundle.shape());
            for t in CalibType::ALL {
                info!("  {:<13} status {}", t.dir_name(), bundle.status(t));
            }
        }
        bundle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, src: &SourceIdentity, kind: &str, name: &str, text: &str) {
        let dir = root.join("Camera::CalibV1").join(src.as_str()).join(kind);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(name), text).unwrap();
    }

    #[test]
    fn parses_tables_with_comments() {
        let t = TextTable::parse("# header\n1 2 3\n\n4 5 6\n", "mem").unwrap();
        assert_eq!((t.rows, t.cols), (2, 3));
        assert_eq!(t.values, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

        match TextTable::parse("1 2\n3 x\n", "mem") {
            Err(DetError::ParseError { line: 2, .. }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn statuses_report_what_was_loaded() {
        let tmp = TempDir::new().unwrap();
        let src = SourceIdentity::new("AmoBPS.0:Opal1000.0");
        write(tmp.path(), &src, "pedestals", "0-end.data", "1 2 3\n4 5 6\n");
        write(tmp.path(), &src, "pixel_gain", "0-end.data", "1 2\n");
        write(tmp.path(), &src, "pixel_rms", "0-end.data", "1 2 a\n");
        write(tmp.path(), &src, "common_mode", "0-end.data", "2 50 0 3\n");

        let bundle = FileCalibStore::new().load(
            tmp.path().to_str().unwrap(), "Camera::CalibV1", &src, 5, 0);

        assert_eq!(bundle.shape(), &[2, 3]);
        assert_eq!(bundle.pedestals(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(bundle.status(CalibType::Pedestals), CalibStatus::Loaded);
        assert_eq!(bundle.status(CalibType::PixelGain), CalibStatus::WrongSize);
        assert_eq!(bundle.pixel_gain(), &[1.0; 6]);
        assert_eq!(bundle.status(CalibType::PixelRms), CalibStatus::Unreadable);
        assert_eq!(bundle.status(CalibType::PixelMask), CalibStatus::Default);
        assert_eq!(bundle.common_mode(), &[2.0, 50.0, 0.0, 3.0]);
    }

    #[test]
    fn nominal_shape_wins_for_fixed_detectors() {
        let tmp = TempDir::new().unwrap();
        let src = SourceIdentity::new("XcsEndstation.0:Epix100a.0");
        let bundle = FileCalibStore::new().load(
            tmp.path().to_str().unwrap(), "Epix100a::CalibV1", &src, 1, 0);
        assert_eq!(bundle.shape(), &[704, 768]);
        assert_eq!(bundle.status(CalibType::Pedestals), CalibStatus::Default);
    }
}

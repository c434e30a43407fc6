//! Calibration file lookup
//!
//! Files live in `<calib_dir>/<group>/<source>/<type>/` and are named
//! `<first run>-<last run>.data`, with `end` standing for an open range.

use std::fs;
use std::path::{Path, PathBuf};
use lazy_static::lazy_static;
use log::{debug, info};
use regex::Regex;

use crate::detector::constants::print_bits;
use crate::detector::source::SourceIdentity;

lazy_static! {
    static ref CALIB_FILE_NAME: Regex =
        Regex::new(r"^(\d+)-(\d+|end)\.data$").expect("calib file pattern is valid");
}

/// Validity range parsed from a calibration file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalibFileRange {
    pub begin: i32,
    /// `None` for an open range
    pub end: Option<i32>,
}

impl CalibFileRange {
    /// Parse `<begin>-<end>.data`; `None` for any other name
    pub fn parse(file_name: &str) -> Option<Self> {
        let caps = CALIB_FILE_NAME.captures(file_name)?;
        let begin = caps[1].parse().ok()?;
        let end = match &caps[2] {
            "end" => None,
            n => Some(n.parse().ok()?),
        };
        Some(CalibFileRange { begin, end })
    }

    /// Whether `run` lies within the range, both ends included
    pub fn contains(&self, run: i32) -> bool {
        run >= self.begin && self.end.map_or(true, |end| run <= end)
    }
}

/// Finds the calibration file valid for a run
pub struct CalibFileFinder {
    calib_dir: PathBuf,
    group: String,
    print_bits: u32,
}

impl CalibFileFinder {
    /// Create a finder
    ///
    /// # Arguments
    /// * `calib_dir` - Root calibration directory
    /// * `group` - Calibration group, e.g. `CsPad::CalibV1`
    /// * `print_bits` - Tracing of the lookup when `CALIB_FINDER` is set
    pub fn new(calib_dir: &str, group: &str, print_bits: u32) -> Self {
        CalibFileFinder {
            calib_dir: PathBuf::from(calib_dir),
            group: group.to_string(),
            print_bits,
        }
    }

    /// Directory holding the files of one calibration type
    ///
    /// # Arguments
    /// * `source` - Data source; its canonical name is the directory name
    /// * `calib_type` - Type directory, e.g. `pedestals` or `geometry`
    pub fn type_dir(&self, source: &SourceIdentity, calib_type: &str) -> PathBuf {
        self.calib_dir.join(&self.group).join(source.as_str()).join(calib_type)
    }

    /// Path of the file valid for `run`, `None` when nothing is deployed
    ///
    /// Among files whose range contains the run, the one with the highest
    /// first run wins; equal first runs go to the lexically last name.
    ///
    /// # Arguments
    /// * `source` - Data source
    /// * `calib_type` - Type directory name
    /// * `run` - Run number the file must be valid for
    ///
    /// # Returns
    /// The path of the chosen file, or `None` if the directory is missing
    /// or no file covers the run
    pub fn find_calib_file(&self, source: &SourceIdentity, calib_type: &str, run: i32) -> Option<PathBuf> {
        let dir = self.type_dir(source, calib_type);
        let trace = self.print_bits & print_bits::CALIB_FINDER != 0;

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                if trace {
                    info!("CalibFileFinder: directory {} is not available: {}", dir.display(), e);
                }
                return None;
            }
        };

        let mut best: Option<(i32, String)> = None;
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            let range = match CalibFileRange::parse(&name) {
                Some(range) => range,
                None => {
                    debug!("CalibFileFinder: skip {}", name);
                    continue;
                }
            };
            if trace {
                info!("CalibFileFinder: candidate {} valid for {:?}", name, range);
            }
            if !range.contains(run) {
                continue;
            }
            let better = match &best {
                None => true,
                Some((begin, best_name)) => (range.begin, name.as_str()) > (*begin, best_name.as_str()),
            };
            if better {
                best = Some((range.begin, name));
            }
        }

        let found = best.map(|(_, name)| dir.join(name));
        if trace {
            match &found {
                Some(path) => info!("CalibFileFinder: run {} -> {}", run, path.display()),
                None => info!("CalibFileFinder: no {} file for run {} in {}", calib_type, run, dir.display()),
            }
        }
        found
    }
}

/// Lines of a calibration text file, comments and blanks removed
pub fn data_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

pub fn path_name(path: &Path) -> String {
    path.display().to_string()
}

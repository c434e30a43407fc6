//! Pixel geometry of a source
//!
//! The description is a precomputed per-pixel table: coordinates, areas,
//! image indexes and geometric mask flags. Producing that table from the
//! detector geometry model is left to the deployment tools.

use std::fs;
use std::path::{Path, PathBuf};
use log::{debug, info};

use crate::detector::constants::print_bits;
use crate::detector::errors::{DetError, DetResult};
use crate::detector::source::SourceIdentity;
use super::finder::{data_lines, path_name, CalibFileFinder};

/// Calibration type directory holding geometry files
pub const GEOMETRY_TYPE: &str = "geometry";

/// Per-pixel geometry; all arrays have one element per pixel
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryDescription {
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
    areas: Vec<f64>,
    rows: Vec<u32>,
    cols: Vec<u32>,
    mask_flags: Vec<u32>,
    pixel_scale_size: f64,
}

/// One pixel of a geometry table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRecord {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub area: f64,
    pub row: u32,
    pub col: u32,
    pub mask_flags: u32,
}

impl GeometryDescription {
    pub fn from_pixels(pixels: &[PixelRecord], pixel_scale_size: f64) -> Self {
        GeometryDescription {
            x: pixels.iter().map(|p| p.x).collect(),
            y: pixels.iter().map(|p| p.y).collect(),
            z: pixels.iter().map(|p| p.z).collect(),
            areas: pixels.iter().map(|p| p.area).collect(),
            rows: pixels.iter().map(|p| p.row).collect(),
            cols: pixels.iter().map(|p| p.col).collect(),
            mask_flags: pixels.iter().map(|p| p.mask_flags).collect(),
            pixel_scale_size,
        }
    }

    pub fn size(&self) -> usize {
        self.x.len()
    }

    /// X, Y and Z coordinates
    pub fn pixel_coords(&self) -> (&[f64], &[f64], &[f64]) {
        (&self.x, &self.y, &self.z)
    }

    pub fn pixel_areas(&self) -> &[f64] {
        &self.areas
    }

    /// 1 for pixels with none of `mbits` set in their flags, else 0
    pub fn pixel_mask(&self, mbits: u32) -> Vec<i32> {
        self.mask_flags.iter().map(|&f| if f & mbits == 0 { 1 } else { 0 }).collect()
    }

    /// Image row and column of every pixel
    pub fn pixel_index_maps(&self) -> (&[u32], &[u32]) {
        (&self.rows, &self.cols)
    }

    pub fn pixel_scale_size(&self) -> f64 {
        self.pixel_scale_size
    }

    /// Parse a pixel table: `x y z area row col mask-flags` per line and an
    /// optional `# pixel_scale_size <value>` header
    pub fn parse(text: &str, origin: &str) -> DetResult<Self> {
        let mut scale = 1.0;
        for line in text.lines().map(str::trim).filter(|l| l.starts_with('#')) {
            let mut words = line.trim_start_matches('#').split_whitespace();
            if words.next() == Some("pixel_scale_size") {
                if let Some(v) = words.next().and_then(|w| w.parse::<f64>().ok()) {
                    scale = v;
                }
            }
        }

        let mut pixels = Vec::new();
        for (line_no, line) in data_lines(text) {
            let err = |message: String| DetError::ParseError { path: origin.to_string(), line: line_no, message };
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != 7 {
                return Err(err(format!("expected 7 fields, found {}", fields.len())));
            }
            let float = |i: usize| fields[i].parse::<f64>().map_err(|e| err(format!("'{}': {}", fields[i], e)));
            let int = |i: usize| fields[i].parse::<u32>().map_err(|e| err(format!("'{}': {}", fields[i], e)));
            pixels.push(PixelRecord {
                x: float(0)?,
                y: float(1)?,
                z: float(2)?,
                area: float(3)?,
                row: int(4)?,
                col: int(5)?,
                mask_flags: int(6)?,
            });
        }
        Ok(Self::from_pixels(&pixels, scale))
    }
}

/// Source of geometry descriptions
pub trait GeometryStore {
    /// Geometry file valid for the run, `None` when nothing is deployed
    fn find(&self, calib_dir: &str, group: &str, source: &SourceIdentity, run: i32, print_bits: u32) -> Option<PathBuf>;

    fn load(&self, path: &Path, print_bits: u32) -> DetResult<GeometryDescription>;
}

/// Geometry store reading pixel tables from the calibration directory
#[derive(Debug, Default, Clone)]
pub struct PixelTableGeometryStore;

impl PixelTableGeometryStore {
    pub fn new() -> Self {
        PixelTableGeometryStore
    }
}

impl GeometryStore for PixelTableGeometryStore {
    fn find(&self, calib_dir: &str, group: &str, source: &SourceIdentity, run: i32, pbits: u32) -> Option<PathBuf> {
        let finder_bits = if pbits & print_bits::CALIB_FINDER != 0 { pbits } else { 0 };
        CalibFileFinder::new(calib_dir, group, finder_bits).find_calib_file(source, GEOMETRY_TYPE, run)
    }

    fn load(&self, path: &Path, pbits: u32) -> DetResult<GeometryDescription> {
        let text = fs::read_to_string(path)?;
        let geometry = GeometryDescription::parse(&text, &path_name(path))?;
        if pbits & print_bits::DETAILS != 0 {
            info!("Geometry {}: {} pixels, pixel scale size {}", path.display(), geometry.size(), geometry.pixel_scale_size());
        } else {
            debug!("Loaded geometry {}", path.display());
        }
        Ok(geometry)
    }
}

//! Detector access façade
//!
//! `DetectorAccess` owns the calibration, geometry and common-mode cache
//! slots of one source and the raw extraction strategy. Every accessor
//! takes either a run number or an environment; an environment also
//! updates the calibration directory before the run comparison.
//!
//! Queries mutate the caches, so one instance must not be used from
//! several threads at once.

use log::{error, info};
use num_traits::AsPrimitive;

use crate::array::NdArray;
use crate::calib::{
    CalibBundle, CalibStatus, CalibStore, CalibType, CommonModeCorrection, CommonModeSample,
    FileCalibStore, GeometryDescription, GeometryStore, PixelTableGeometryStore,
};
use crate::detector::constants::print_bits;
use crate::detector::errors::DetResult;
use crate::detector::family::DetectorFamily;
use crate::detector::source::SourceIdentity;
use crate::event::{Environment, Event, PayloadLookup};
use crate::image::assemble;
use crate::producer::{ExtractorFactory, RawElement, RawExtractor};
use super::settings::AccessSettings;
use super::slot::RunSlot;

/// Run selector of a query
#[derive(Clone, Copy)]
pub enum Query<'a> {
    Run(i32),
    /// Run and calibration directory taken from the environment
    Env(&'a dyn Environment),
}

impl From<i32> for Query<'static> {
    fn from(run: i32) -> Self {
        Query::Run(run)
    }
}

impl<'a, E: Environment> From<&'a E> for Query<'a> {
    fn from(env: &'a E) -> Self {
        Query::Env(env)
    }
}

/// Cached access to calibration, geometry and raw data of one source
pub struct DetectorAccess {
    source: SourceIdentity,
    family: DetectorFamily,
    group: &'static str,
    calib_dir: String,
    settings: AccessSettings,
    calib_store: Box<dyn CalibStore>,
    geometry_store: Box<dyn GeometryStore>,
    calib: RunSlot<CalibBundle>,
    geometry: RunSlot<Option<GeometryDescription>>,
    cmode: RunSlot<CommonModeCorrection>,
    extractor: Option<Box<dyn RawExtractor>>,
}

impl DetectorAccess {
    /// Access backed by the file calibration and geometry stores
    ///
    /// # Arguments
    /// * `source` - Data source name, e.g. `CxiDs1.0:Cspad.0`
    /// * `print_bits` - Diagnostic verbosity
    ///
    /// # Returns
    /// An access object with empty caches; nothing is read until the first query
    pub fn new(source: &str, print_bits: u32) -> Self {
        let settings = AccessSettings { print_bits, ..AccessSettings::default() };
        Self::with_settings(source, settings)
    }

    /// Access configured from settings
    ///
    /// The calibration directory is taken from `settings.calib_dir` until a
    /// query brings an environment.
    ///
    /// # Arguments
    /// * `source` - Data source name
    /// * `settings` - Mode, print bits, default value, cache key policy and event key
    pub fn with_settings(source: &str, settings: AccessSettings) -> Self {
        let source = SourceIdentity::new(source);
        let family = DetectorFamily::from_source(&source);
        let group = family.calib_group();
        let calib_dir = settings.calib_dir.clone().unwrap_or_default();

        if settings.print_bits & print_bits::INFO != 0 {
            info!("DetectorAccess:\n  Data source  : {}\n  Calib group  : {}\n  Calib dir    : {}\n  Print bits   : {}",
                  source, group, calib_dir, settings.print_bits);
        }

        DetectorAccess {
            source,
            family,
            group,
            calib_dir,
            settings,
            calib_store: Box::new(FileCalibStore::new()),
            geometry_store: Box::new(PixelTableGeometryStore::new()),
            calib: RunSlot::new("calibration"),
            geometry: RunSlot::new("geometry"),
            cmode: RunSlot::new("common mode"),
            extractor: None,
        }
    }

    /// Replace the calibration store
    pub fn with_calib_store(mut self, store: Box<dyn CalibStore>) -> Self {
        self.calib_store = store;
        self
    }

    /// Replace the geometry store
    pub fn with_geometry_store(mut self, store: Box<dyn GeometryStore>) -> Self {
        self.geometry_store = store;
        self
    }

    pub fn source(&self) -> &SourceIdentity {
        &self.source
    }

    /// Detector family derived from the source name
    pub fn family(&self) -> DetectorFamily {
        self.family
    }

    /// Calibration group directory of the family
    pub fn calib_group(&self) -> &str {
        self.group
    }

    /// Calibration directory of the next resource build
    pub fn calib_dir(&self) -> &str {
        &self.calib_dir
    }

    /// Directory used by the next resource build
    pub fn set_calib_dir(&mut self, calib_dir: &str) {
        self.calib_dir = calib_dir.to_string();
    }

    pub fn settings(&self) -> &AccessSettings {
        &self.settings
    }

    // Mode, print bits and default value apply to resources built after the call

    /// Set the strategy mode
    ///
    /// Applies to the strategy when it is created by the first raw-data
    /// query; an existing strategy keeps its mode.
    pub fn set_mode(&mut self, mode: u32) {
        self.settings.mode = mode;
    }

    /// Set the diagnostic verbosity of resources built from now on
    pub fn set_print_bits(&mut self, print_bits: u32) {
        self.settings.print_bits = print_bits;
    }

    /// Set the fill value for sub-elements absent from an event
    pub fn set_default_value(&mut self, default_value: f32) {
        self.settings.default_value = default_value;
    }

    fn resolve(&mut self, q: Query<'_>) -> i32 {
        match q {
            Query::Run(run) => run,
            Query::Env(env) => {
                self.calib_dir = env.calib_dir().to_string();
                env.run()
            }
        }
    }

    /// Calibration bundle for the run of the query
    ///
    /// # Arguments
    /// * `q` - Run number, or an environment supplying run and calibration directory
    ///
    /// # Returns
    /// The cached bundle, loaded through the calibration store when the run
    /// (or, if enabled, the directory) changed
    pub fn calib<'q>(&mut self, q: impl Into<Query<'q>>) -> &CalibBundle {
        let run = self.resolve(q.into());
        self.calib_for(run)
    }

    fn calib_for(&mut self, run: i32) -> &CalibBundle {
        let dir_in_key = self.settings.reload_on_calib_dir_change;
        let pbits = self.settings.print_bits;
        let DetectorAccess { calib, calib_store, source, group, calib_dir, .. } = self;
        calib.get_or_rebuild(run, calib_dir, dir_in_key, || {
            if pbits & print_bits::INFO != 0 {
                info!("Load calibration:\n  Calib dir   : {}\n  Calib group : {}\n  Data source : {}\n  Run number  : {}",
                      calib_dir, group, source, run);
            }
            calib_store.load(calib_dir, group, source, run, pbits)
        })
    }

    /// Geometry for the run of the query
    ///
    /// # Arguments
    /// * `q` - Run number, or an environment supplying run and calibration directory
    ///
    /// # Returns
    /// The cached description, or `None` when no geometry file is deployed for
    /// the run or it could not be read
    pub fn geometry<'q>(&mut self, q: impl Into<Query<'q>>) -> Option<&GeometryDescription> {
        let run = self.resolve(q.into());
        self.geometry_for(run)
    }

    fn geometry_for(&mut self, run: i32) -> Option<&GeometryDescription> {
        let dir_in_key = self.settings.reload_on_calib_dir_change;
        let pbits = self.settings.print_bits;
        let DetectorAccess { geometry, geometry_store, source, group, calib_dir, .. } = self;
        geometry.get_or_rebuild(run, calib_dir, dir_in_key, || {
            let path = geometry_store.find(calib_dir, group, source, run, pbits);
            if pbits & print_bits::INFO != 0 {
                info!("Load geometry:\n  Calib dir     : {}\n  Calib group   : {}\n  Calib file    : {}\n  Data source   : {}\n  Run requested : {}",
                      calib_dir, group, path.as_ref().map(|p| p.display().to_string()).unwrap_or_default(), source, run);
            }
            let path = path?;
            match geometry_store.load(&path, pbits) {
                Ok(g) => Some(g),
                Err(e) => {
                    error!("Geometry file {} for {} is unusable: {}", path.display(), source, e);
                    None
                }
            }
        }).as_ref()
    }

    /// Common-mode corrector for the run of the query
    ///
    /// Loads the calibration of the same run first when it is not current.
    ///
    /// # Arguments
    /// * `q` - Run number, or an environment supplying run and calibration directory
    pub fn common_mode_corrector<'q>(&mut self, q: impl Into<Query<'q>>) -> &CommonModeCorrection {
        let run = self.resolve(q.into());
        self.cmode_for(run)
    }

    fn cmode_for(&mut self, run: i32) -> &CommonModeCorrection {
        let dir_in_key = self.settings.reload_on_calib_dir_change;
        let pbits = self.settings.print_bits;
        // the corrector reads the calibration of the same run
        self.calib_for(run);
        let DetectorAccess { calib, cmode, source, calib_dir, .. } = self;
        let bundle = calib.get();
        cmode.get_or_rebuild(run, calib_dir, dir_in_key, || {
            if pbits & print_bits::INFO != 0 {
                info!("Init common mode:\n  Data source : {}\n  Run number  : {}", source, run);
            }
            match bundle {
                Some(b) => CommonModeCorrection::new(source, b.common_mode(), b.size(), b.pixel_status(), pbits),
                None => CommonModeCorrection::new(source, &[], 0, &[], pbits),
            }
        })
    }

    // calibration

    /// Number of dimensions of the per-pixel calibration arrays
    pub fn ndim<'q>(&mut self, q: impl Into<Query<'q>>) -> usize {
        self.calib(q).ndim()
    }

    /// Number of pixels
    pub fn size<'q>(&mut self, q: impl Into<Query<'q>>) -> usize {
        self.calib(q).size()
    }

    /// Shape of the per-pixel calibration arrays
    pub fn shape<'q>(&mut self, q: impl Into<Query<'q>>) -> &[usize] {
        self.calib(q).shape()
    }

    /// Pedestals, one per pixel
    ///
    /// # Arguments
    /// * `q` - Run number, or an environment supplying run and calibration directory
    ///
    /// # Returns
    /// Deployed values, or zeros when no pedestal file covers the run
    pub fn pedestals<'q>(&mut self, q: impl Into<Query<'q>>) -> &[f32] {
        self.calib(q).pedestals()
    }

    /// Pixel noise; 1 where not deployed
    pub fn pixel_rms<'q>(&mut self, q: impl Into<Query<'q>>) -> &[f32] {
        self.calib(q).pixel_rms()
    }

    /// Pixel gain factors; 1 where not deployed
    pub fn pixel_gain<'q>(&mut self, q: impl Into<Query<'q>>) -> &[f32] {
        self.calib(q).pixel_gain()
    }

    /// Calibration pixel mask, 1 for good pixels
    pub fn pixel_mask<'q>(&mut self, q: impl Into<Query<'q>>) -> &[u16] {
        self.calib(q).pixel_mask()
    }

    /// Pixel background
    pub fn pixel_bkgd<'q>(&mut self, q: impl Into<Query<'q>>) -> &[f32] {
        self.calib(q).pixel_bkgd()
    }

    /// Pixel status, 0 for good pixels
    pub fn pixel_status<'q>(&mut self, q: impl Into<Query<'q>>) -> &[u16] {
        self.calib(q).pixel_status()
    }

    /// Common-mode parameters
    pub fn common_mode<'q>(&mut self, q: impl Into<Query<'q>>) -> &[f64] {
        self.calib(q).common_mode()
    }

    /// Health of one calibration kind
    ///
    /// # Arguments
    /// * `q` - Run number, or an environment supplying run and calibration directory
    /// * `calib_type` - Calibration kind
    ///
    /// # Returns
    /// `Loaded`, `Default`, `Unreadable` or `WrongSize` as reported by the store
    pub fn status<'q>(&mut self, q: impl Into<Query<'q>>, calib_type: CalibType) -> CalibStatus {
        self.calib(q).status(calib_type)
    }

    // geometry

    /// X coordinate of every pixel
    ///
    /// # Arguments
    /// * `q` - Run number, or an environment supplying run and calibration directory
    ///
    /// # Returns
    /// The coordinates, empty without geometry
    pub fn pixel_coords_x<'q>(&mut self, q: impl Into<Query<'q>>) -> &[f64] {
        self.geometry(q).map(|g| g.pixel_coords().0).unwrap_or_default()
    }

    /// Y coordinate of every pixel, empty without geometry
    pub fn pixel_coords_y<'q>(&mut self, q: impl Into<Query<'q>>) -> &[f64] {
        self.geometry(q).map(|g| g.pixel_coords().1).unwrap_or_default()
    }

    /// Z coordinate of every pixel, empty without geometry
    pub fn pixel_coords_z<'q>(&mut self, q: impl Into<Query<'q>>) -> &[f64] {
        self.geometry(q).map(|g| g.pixel_coords().2).unwrap_or_default()
    }

    /// Relative pixel areas, empty without geometry
    pub fn pixel_areas<'q>(&mut self, q: impl Into<Query<'q>>) -> &[f64] {
        self.geometry(q).map(|g| g.pixel_areas()).unwrap_or_default()
    }

    /// Geometric mask: 1 for pixels with none of `mbits` flagged
    ///
    /// # Arguments
    /// * `q` - Run number, or an environment supplying run and calibration directory
    /// * `mbits` - Mask flag bits to exclude
    ///
    /// # Returns
    /// One value per pixel, empty without geometry
    pub fn pixel_mask_geo<'q>(&mut self, q: impl Into<Query<'q>>, mbits: u32) -> Vec<i32> {
        self.geometry(q).map_or_else(Vec::new, |g| g.pixel_mask(mbits))
    }

    /// Image row of every pixel
    pub fn pixel_indexes_x<'q>(&mut self, q: impl Into<Query<'q>>) -> &[u32] {
        self.geometry(q).map(|g| g.pixel_index_maps().0).unwrap_or_default()
    }

    /// Image column of every pixel
    pub fn pixel_indexes_y<'q>(&mut self, q: impl Into<Query<'q>>) -> &[u32] {
        self.geometry(q).map(|g| g.pixel_index_maps().1).unwrap_or_default()
    }

    /// Pixel size in physical units, 1 without geometry
    pub fn pixel_scale_size<'q>(&mut self, q: impl Into<Query<'q>>) -> f64 {
        self.geometry(q).map_or(1.0, |g| g.pixel_scale_size())
    }

    /// Per-pixel values scattered into a 2-D image
    ///
    /// # Arguments
    /// * `q` - Run number, or an environment supplying run and calibration directory
    /// * `values` - One value per pixel, in geometry order
    ///
    /// # Returns
    /// The assembled image, an empty array without geometry, or
    /// `LengthMismatch` when `values` does not match the pixel count
    pub fn image<'q, T: Copy + Default>(&mut self, q: impl Into<Query<'q>>, values: &[T]) -> DetResult<NdArray<T, 2>> {
        match self.geometry(q) {
            Some(g) => {
                let (rows, cols) = g.pixel_index_maps();
                assemble(values, rows, cols)
            }
            None => Ok(NdArray::empty()),
        }
    }

    /// Common-mode correction of `buf` in place
    ///
    /// # Arguments
    /// * `q` - Run number, or an environment supplying run and calibration directory
    /// * `buf` - Samples, one per pixel
    ///
    /// # Returns
    /// `LengthMismatch` when `buf` does not have one sample per pixel
    pub fn apply_common_mode<'q, T>(&mut self, q: impl Into<Query<'q>>, buf: &mut [T]) -> DetResult<()>
    where
        T: CommonModeSample,
        f64: AsPrimitive<T>,
    {
        self.common_mode_corrector(q).correct(buf)
    }

    // raw data

    fn extractor(&mut self) -> &mut dyn RawExtractor {
        let DetectorAccess { extractor, source, settings, .. } = self;
        &mut **extractor.get_or_insert_with(|| {
            ExtractorFactory::select(source, settings.mode, settings.print_bits, settings.default_value)
        })
    }

    /// Raw data of any supported (type, rank), e.g. `extract::<u16, 2>(&evt, &env)`
    ///
    /// The strategy is created on the first call from the current mode, print
    /// bits and default value.
    ///
    /// # Arguments
    /// * `evt` - Event holding the raw payload
    /// * `env` - Environment holding the family configuration
    ///
    /// # Returns
    /// The canonical array, or an empty array of rank `N` when the payload is
    /// missing or the family has no such representation
    ///
    /// # Panics
    /// Panics when the source belongs to no supported family
    pub fn extract<T: RawElement<N>, const N: usize>(&mut self, evt: &dyn Event, env: &dyn Environment) -> NdArray<T, N> {
        let key = self.settings.key.clone();
        let q = PayloadLookup::new(evt, env, &key);
        self.extractor().extract::<T, N>(&q)
    }

    /// Raw data as `int16` of rank 1; see [`extract`](Self::extract)
    pub fn data_i16_1(&mut self, evt: &dyn Event, env: &dyn Environment) -> NdArray<i16, 1> {
        self.extract(evt, env)
    }

    pub fn data_i16_2(&mut self, evt: &dyn Event, env: &dyn Environment) -> NdArray<i16, 2> {
        self.extract(evt, env)
    }

    /// Raw data as `int16` of rank 3 (CSPAD, CSPAD2x2)
    pub fn data_i16_3(&mut self, evt: &dyn Event, env: &dyn Environment) -> NdArray<i16, 3> {
        self.extract(evt, env)
    }

    pub fn data_i16_4(&mut self, evt: &dyn Event, env: &dyn Environment) -> NdArray<i16, 4> {
        self.extract(evt, env)
    }

    /// Raw data as `uint16` of rank 2 (cameras, Andor, Princeton, Epix)
    pub fn data_u16_2(&mut self, evt: &dyn Event, env: &dyn Environment) -> NdArray<u16, 2> {
        self.extract(evt, env)
    }

    /// Raw data as `uint16` of rank 3 (pnCCD)
    pub fn data_u16_3(&mut self, evt: &dyn Event, env: &dyn Environment) -> NdArray<u16, 3> {
        self.extract(evt, env)
    }

    /// Raw data as `uint8` of rank 2 (8-bit cameras)
    pub fn data_u8_2(&mut self, evt: &dyn Event, env: &dyn Environment) -> NdArray<u8, 2> {
        self.extract(evt, env)
    }

    /// Missing-payload warnings raised by the strategy, 0 before it exists
    pub fn warning_count(&self) -> u32 {
        self.extractor.as_ref().map_or(0, |e| e.warning_count())
    }

    /// Forget the strategy's cached configuration
    pub fn invalidate_config(&mut self) {
        if let Some(e) = self.extractor.as_mut() {
            e.invalidate_config();
        }
    }

    /// Instrument name of the environment
    pub fn str_inst(&self, env: &dyn Environment) -> String {
        env.instrument().to_string()
    }

    // diagnostics

    /// Log the strategy parameters
    ///
    /// # Panics
    /// Panics when the source belongs to no supported family
    pub fn print(&mut self) {
        self.extractor().print();
    }

    /// Log the family configuration and payload header of an event
    pub fn print_config(&mut self, evt: &dyn Event, env: &dyn Environment) {
        let key = self.settings.key.clone();
        let q = PayloadLookup::new(evt, env, &key);
        self.extractor().print_config(&q);
    }

    /// Log shape and status of every calibration kind and the geometry state
    pub fn print_calib_summary<'q>(&mut self, q: impl Into<Query<'q>>) {
        let run = self.resolve(q.into());
        let source = self.source.clone();
        let calib_dir = self.calib_dir.clone();
        let bundle = self.calib_for(run);

        let mut lines = vec![
            format!("Calibration summary for {} run {}:", source, run),
            format!("  calib dir : {}", calib_dir),
            format!("  ndim      : {}", bundle.ndim()),
            format!("  size      : {}", bundle.size()),
            format!("  shape     : {:?}", bundle.shape()),
        ];
        for t in CalibType::ALL {
            lines.push(format!("  {:<13} : {} ({} values)", t.dir_name(), bundle.status(t), bundle.size_of(t)));
        }
        match self.geometry_for(run) {
            Some(g) => lines.push(format!("  geometry  : {} pixels, pixel scale size {}", g.size(), g.pixel_scale_size())),
            None => lines.push("  geometry  : not available".to_string()),
        }
        info!("{}", lines.join("\n"));
    }
}

//! Integration tests for detector access

use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use std::ptr;
use std::rc::Rc;

use detkit::access::{AccessSettings, DetectorAccess};
use detkit::array::NdArray;
use detkit::calib::{
    CalibBundle, CalibStatus, CalibStore, CalibType, GeometryDescription, GeometryStore, PixelRecord,
};
use detkit::detector::constants::cspad;
use detkit::detector::errors::{DetError, DetResult};
use detkit::detector::family::DetectorFamily;
use detkit::detector::source::SourceIdentity;
use detkit::event::{CameraFrame, CspadData, CspadQuad, DetectorConfig, MemoryEnv, MemoryEvent, RawPayload};

/// Calibration store counting its loads; bundles carry the run in their pedestals
struct CountingCalibStore {
    loads: Rc<Cell<u32>>,
    shape: Vec<usize>,
    common_mode: Vec<f64>,
}

impl CalibStore for CountingCalibStore {
    fn load(&self, _calib_dir: &str, _group: &str, source: &SourceIdentity, run: i32, _pbits: u32) -> CalibBundle {
        self.loads.set(self.loads.get() + 1);
        let mut bundle = CalibBundle::with_defaults(DetectorFamily::from_source(source), self.shape.clone());
        let size = bundle.size();
        bundle.set_values(CalibType::Pedestals, &vec![run as f64; size]).unwrap();
        bundle.set_status(CalibType::Pedestals, CalibStatus::Loaded);
        if !self.common_mode.is_empty() {
            // third parameter is unused by the corrector; it records the run
            let mut pars = self.common_mode.clone();
            pars[2] = run as f64;
            bundle.set_values(CalibType::CommonMode, &pars).unwrap();
        }
        bundle
    }
}

/// Geometry store serving a fixed pixel table for runs from `first_run` on
struct FixedGeometryStore {
    loads: Rc<Cell<u32>>,
    first_run: i32,
    pixels: Vec<PixelRecord>,
}

impl GeometryStore for FixedGeometryStore {
    fn find(&self, _calib_dir: &str, _group: &str, _source: &SourceIdentity, run: i32, _pbits: u32) -> Option<PathBuf> {
        (run >= self.first_run).then(|| PathBuf::from("0-end.data"))
    }

    fn load(&self, _path: &Path, _pbits: u32) -> DetResult<GeometryDescription> {
        self.loads.set(self.loads.get() + 1);
        Ok(GeometryDescription::from_pixels(&self.pixels, 110.0))
    }
}

struct BrokenGeometryStore;

impl GeometryStore for BrokenGeometryStore {
    fn find(&self, _calib_dir: &str, _group: &str, _source: &SourceIdentity, _run: i32, _pbits: u32) -> Option<PathBuf> {
        Some(PathBuf::from("broken.data"))
    }

    fn load(&self, path: &Path, _pbits: u32) -> DetResult<GeometryDescription> {
        Err(DetError::GenericError(format!("cannot read {}", path.display())))
    }
}

fn pixel(row: u32, col: u32, mask_flags: u32) -> PixelRecord {
    PixelRecord { x: col as f64 * 110.0, y: row as f64 * 110.0, z: 0.0, area: 1.0, row, col, mask_flags }
}

/// Four-pixel geometry mapping onto a 2x2 image
fn square_pixels() -> Vec<PixelRecord> {
    vec![pixel(0, 0, 0), pixel(0, 1, 0), pixel(1, 0, 1), pixel(1, 1, 0)]
}

fn camera_access(loads: &Rc<Cell<u32>>, geo_loads: &Rc<Cell<u32>>) -> DetectorAccess {
    DetectorAccess::new("CxiDg2.0:Opal1000.0", 0)
        .with_calib_store(Box::new(CountingCalibStore {
            loads: Rc::clone(loads),
            shape: vec![2, 2],
            common_mode: Vec::new(),
        }))
        .with_geometry_store(Box::new(FixedGeometryStore {
            loads: Rc::clone(geo_loads),
            first_run: 10,
            pixels: square_pixels(),
        }))
}

#[test]
fn test_calibration_is_cached_per_run() {
    let loads = Rc::new(Cell::new(0));
    let geo_loads = Rc::new(Cell::new(0));
    let mut access = camera_access(&loads, &geo_loads);

    assert_eq!(access.pedestals(12), &[12.0, 12.0, 12.0, 12.0]);
    assert_eq!(access.size(12), 4);
    assert_eq!(access.shape(12), &[2, 2]);
    assert_eq!(access.status(12, CalibType::Pedestals), CalibStatus::Loaded);
    assert_eq!(access.status(12, CalibType::PixelGain), CalibStatus::Default);
    assert_eq!(loads.get(), 1);

    assert_eq!(access.pedestals(13)[0], 13.0);
    assert_eq!(loads.get(), 2);
    assert_eq!(access.pedestals(12)[0], 12.0);
    assert_eq!(loads.get(), 3);
}

#[test]
fn test_environment_supplies_run_and_directory() {
    let loads = Rc::new(Cell::new(0));
    let geo_loads = Rc::new(Cell::new(0));
    let mut access = camera_access(&loads, &geo_loads);

    let env = MemoryEnv::new(21, "/calib/a", "CXI");
    assert_eq!(access.pedestals(&env)[0], 21.0);
    assert_eq!(access.calib_dir(), "/calib/a");
    assert_eq!(access.pixel_gain(21), &[1.0; 4]);
    assert_eq!(loads.get(), 1);
}

#[test]
fn test_calib_dir_change_reloads_only_when_enabled() {
    let loads = Rc::new(Cell::new(0));
    let geo_loads = Rc::new(Cell::new(0));

    let mut access = camera_access(&loads, &geo_loads);
    access.pedestals(&MemoryEnv::new(5, "/calib/a", "CXI"));
    access.pedestals(&MemoryEnv::new(5, "/calib/b", "CXI"));
    assert_eq!(loads.get(), 1);

    let reloads = Rc::new(Cell::new(0));
    let settings = AccessSettings { reload_on_calib_dir_change: true, ..AccessSettings::default() };
    let mut access = DetectorAccess::with_settings("CxiDg2.0:Opal1000.0", settings)
        .with_calib_store(Box::new(CountingCalibStore {
            loads: Rc::clone(&reloads),
            shape: vec![2, 2],
            common_mode: Vec::new(),
        }));
    access.pedestals(&MemoryEnv::new(5, "/calib/a", "CXI"));
    access.pedestals(&MemoryEnv::new(5, "/calib/b", "CXI"));
    assert_eq!(reloads.get(), 2);
}

#[test]
fn test_missing_geometry_yields_empty_results() {
    let loads = Rc::new(Cell::new(0));
    let geo_loads = Rc::new(Cell::new(0));
    let mut access = camera_access(&loads, &geo_loads);

    assert!(access.geometry(3).is_none());
    assert!(access.pixel_coords_x(3).is_empty());
    assert!(access.pixel_areas(3).is_empty());
    assert!(access.pixel_indexes_y(3).is_empty());
    assert!(access.pixel_mask_geo(3, 0xffff).is_empty());
    assert_eq!(access.pixel_scale_size(3), 1.0);
    assert!(access.image(3, &[1.0f64, 2.0, 3.0, 4.0]).unwrap().is_empty());
    assert_eq!(geo_loads.get(), 0);
}

#[test]
fn test_unreadable_geometry_counts_as_missing() {
    let mut access = DetectorAccess::new("CxiDg2.0:Opal1000.0", 0)
        .with_geometry_store(Box::new(BrokenGeometryStore));
    assert!(access.geometry(1).is_none());
    assert!(access.pixel_coords_z(1).is_empty());
}

#[test]
fn test_geometry_is_cached_and_assembles_images() {
    let loads = Rc::new(Cell::new(0));
    let geo_loads = Rc::new(Cell::new(0));
    let mut access = camera_access(&loads, &geo_loads);

    assert_eq!(access.pixel_indexes_x(10), &[0, 0, 1, 1]);
    assert_eq!(access.pixel_indexes_y(10), &[0, 1, 0, 1]);
    assert_eq!(access.pixel_coords_x(10), &[0.0, 110.0, 0.0, 110.0]);
    assert_eq!(access.pixel_scale_size(10), 110.0);
    assert_eq!(access.pixel_mask_geo(10, 1), vec![1, 1, 0, 1]);
    assert_eq!(geo_loads.get(), 1);

    let image = access.image(10, &[10i32, 20, 30, 0]).unwrap();
    assert_eq!(image.shape(), [2, 2]);
    assert_eq!(image[[0, 0]], 10);
    assert_eq!(image[[0, 1]], 20);
    assert_eq!(image[[1, 0]], 30);
    assert_eq!(image[[1, 1]], 0);
    assert_eq!(geo_loads.get(), 1);

    assert!(access.image(10, &[1.0f32, 2.0]).is_err());
}

#[test]
fn test_common_mode_follows_the_run_calibration() {
    let loads = Rc::new(Cell::new(0));
    let mut access = DetectorAccess::new("CxiDs1.0:Cspad2x2.0", 0)
        .with_calib_store(Box::new(CountingCalibStore {
            loads: Rc::clone(&loads),
            shape: vec![4],
            common_mode: vec![1.0, 0.0, 0.0, 0.0],
        }));

    let mut buf = [1.0f64, 2.0, 3.0, 6.0];
    access.apply_common_mode(7, &mut buf).unwrap();
    assert_eq!(buf, [-2.0, -1.0, 0.0, 3.0]);
    assert!(access.common_mode_corrector(7).is_enabled());
    assert_eq!(access.common_mode(7), &[1.0, 0.0, 7.0, 0.0]);
    assert_eq!(loads.get(), 1);

    let mut short = [1i16, 2];
    assert!(access.apply_common_mode(7, &mut short).is_err());
}

#[test]
fn test_camera_frames_through_access() {
    let src = SourceIdentity::new("CxiDg2.0:Opal1000.0");
    let mut evt = MemoryEvent::new();
    let frame = NdArray::from_vec([2, 2], vec![40u16, 32, 35, 50]).unwrap();
    evt.insert(&src, RawPayload::Camera(CameraFrame::with_data16(32, frame)));
    let env = MemoryEnv::new(1, "", "CXI");

    let mut access = DetectorAccess::new("CxiDg2.0:Opal1000.0", 0);
    let data = access.data_u16_2(&evt, &env);
    assert_eq!(data.as_slice(), &[8, 0, 3, 18]);
    let same: NdArray<u16, 2> = access.extract(&evt, &env);
    assert_eq!(same, data);

    assert!(access.data_u8_2(&evt, &env).is_empty());
    assert!(access.data_i16_3(&evt, &env).is_empty());

    let empty = MemoryEvent::new();
    assert!(access.data_u16_2(&empty, &env).is_empty());
    assert_eq!(access.warning_count(), 2);
}

#[test]
fn test_camera_mode_is_applied_on_first_extraction() {
    let src = SourceIdentity::new("CxiDg2.0:Opal1000.0");
    let mut evt = MemoryEvent::new();
    let frame = NdArray::from_vec([1, 2], vec![40u16, 50]).unwrap();
    evt.insert(&src, RawPayload::Camera(CameraFrame::with_data16(32, frame)));
    let env = MemoryEnv::new(1, "", "CXI");

    let mut access = DetectorAccess::new("CxiDg2.0:Opal1000.0", 0);
    access.set_mode(1);
    assert_eq!(access.data_u16_2(&evt, &env).as_slice(), &[40, 50]);
}

#[test]
fn test_cspad_data_needs_configuration() {
    let src = SourceIdentity::new("CxiDs1.0:Cspad.0");
    let evt = MemoryEvent::new();
    let mut env = MemoryEnv::new(1, "", "CXI");
    env.insert_config(&src, DetectorConfig::cspad_full());

    let mut access = DetectorAccess::new("CxiDs1.0:Cspad.0", 0);
    assert!(access.data_i16_3(&evt, &env).is_empty());
    assert!(access.data_u16_2(&evt, &env).is_empty());
    assert_eq!(access.family(), DetectorFamily::Cspad);
    assert_eq!(access.calib_group(), "CsPad::CalibV1");
}

#[test]
#[should_panic(expected = "not implemented")]
fn test_unknown_source_is_fatal_on_raw_access() {
    let evt = MemoryEvent::new();
    let env = MemoryEnv::new(1, "", "CXI");
    let mut access = DetectorAccess::new("CxiDs1.0:Mystery.0", 0);
    access.data_u16_2(&evt, &env);
}

#[test]
fn test_file_store_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let calib_dir = dir.path().to_str().unwrap().to_string();
    let type_dir = dir.path().join("Camera::CalibV1").join("CxiDg2.0:Opal1000.0");

    let pedestals = type_dir.join("pedestals");
    fs::create_dir_all(&pedestals).unwrap();
    fs::write(pedestals.join("0-end.data"), "1 2 3\n4 5 6\n").unwrap();
    fs::write(pedestals.join("20-end.data"), "7 8 9\n10 11 12\n").unwrap();

    let status = type_dir.join("pixel_status");
    fs::create_dir_all(&status).unwrap();
    fs::write(status.join("0-end.data"), "0 1\n").unwrap();

    let geometry = type_dir.join("geometry");
    fs::create_dir_all(&geometry).unwrap();
    fs::write(
        geometry.join("0-end.data"),
        "# pixel_scale_size 50\n\
         0 0 0 1 0 0 0\n0 0 0 1 0 1 0\n0 0 0 1 0 2 0\n\
         0 0 0 1 1 0 0\n0 0 0 1 1 1 0\n0 0 0 1 1 2 0\n",
    )
    .unwrap();

    let settings = AccessSettings { calib_dir: Some(calib_dir), ..AccessSettings::default() };
    let mut access = DetectorAccess::with_settings("DetInfo(CxiDg2.0:Opal1000.0)", settings);

    assert_eq!(access.shape(5), &[2, 3]);
    assert_eq!(access.pedestals(5), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    assert_eq!(access.status(5, CalibType::Pedestals), CalibStatus::Loaded);
    assert_eq!(access.status(5, CalibType::PixelStatus), CalibStatus::WrongSize);
    assert_eq!(access.status(5, CalibType::PixelRms), CalibStatus::Default);
    assert_eq!(access.pedestals(25)[0], 7.0);

    assert_eq!(access.pixel_scale_size(25), 50.0);
    let values = access.pedestals(25).to_vec();
    let image = access.image(25, &values).unwrap();
    assert_eq!(image.shape(), [2, 3]);
    assert_eq!(image[[1, 2]], 12.0f32);
}

#[test]
fn test_slots_keep_identity_within_a_run_and_rebuild_across_runs() {
    let loads = Rc::new(Cell::new(0));
    let geo_loads = Rc::new(Cell::new(0));
    let mut access = DetectorAccess::new("CxiDs1.0:Cspad2x2.0", 0)
        .with_calib_store(Box::new(CountingCalibStore {
            loads: Rc::clone(&loads),
            shape: vec![4],
            common_mode: vec![1.0, 0.0, 0.0, 0.0],
        }))
        .with_geometry_store(Box::new(FixedGeometryStore {
            loads: Rc::clone(&geo_loads),
            first_run: 0,
            pixels: square_pixels(),
        }));

    let calib: *const CalibBundle = access.calib(7);
    assert!(ptr::eq(calib, access.calib(7)));
    let geometry: *const GeometryDescription = access.geometry(7).unwrap();
    assert!(ptr::eq(geometry, access.geometry(7).unwrap()));
    let corrector: *const _ = access.common_mode_corrector(7);
    assert!(ptr::eq(corrector, access.common_mode_corrector(7)));
    assert_eq!((loads.get(), geo_loads.get()), (1, 1));

    // the corrector of run 8 is built from the calibration of run 8
    assert_eq!(access.common_mode_corrector(8).pars(), &[1.0, 0.0, 8.0, 0.0]);
    assert_eq!(loads.get(), 2);
    assert!(access.geometry(8).is_some());
    assert_eq!(geo_loads.get(), 2);
    assert_eq!(access.pedestals(8)[0], 8.0);
    assert_eq!(loads.get(), 2);
}

fn single_sensor_quad(quad: u32, value: i16) -> CspadQuad {
    CspadQuad { quad, data: NdArray::filled([1, cspad::N_ROWS_2X1, cspad::N_COLS_2X1], value) }
}

#[test]
fn test_default_value_fills_absent_cspad_sensors() {
    let src = SourceIdentity::new("CxiDs1.0:Cspad.0");
    let mut evt = MemoryEvent::new();
    evt.insert(&src, RawPayload::Cspad(CspadData { quads: vec![single_sensor_quad(1, 100)] }));
    let mut env = MemoryEnv::new(1, "", "CXI");
    env.insert_config(&src, DetectorConfig::cspad_with_mask([0, 0b1, 0, 0]));

    let mut access = DetectorAccess::new("CxiDs1.0:Cspad.0", 0);
    access.set_default_value(-3.0);
    access.set_print_bits(1);
    assert_eq!(access.settings().print_bits, 1);

    let out = access.data_i16_3(&evt, &env);
    assert_eq!(out.shape(), [32, 185, 388]);
    assert!(out.subarray(0).iter().all(|&v| v == -3));
    assert!(out.subarray(8).iter().all(|&v| v == 100));
    assert!(out.subarray(9).iter().all(|&v| v == -3));

    // the strategy keeps the value it was created with
    access.set_default_value(5.0);
    assert!(access.data_i16_3(&evt, &env).subarray(0).iter().all(|&v| v == -3));
}

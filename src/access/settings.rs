//! Access and logging settings
//!
//! Read from a TOML file:
//!
//! ```toml
//! [access]
//! mode = 0
//! print_bits = 1
//! default_value = 0.0
//! reload_on_calib_dir_change = false
//! calib_dir = "/reg/d/psdm/cxi/cxitut13/calib"
//! key = ""
//!
//! [log]
//! level = "info"
//! file = "detkit.log"
//! ```

use std::fs;
use log::LevelFilter;

use crate::detector::errors::{DetError, DetResult};
use crate::utils::logger::parse_level;

/// Settings of a `DetectorAccess`
#[derive(Debug, Clone, PartialEq)]
pub struct AccessSettings {
    pub mode: u32,
    pub print_bits: u32,
    pub default_value: f32,
    /// Treat the calibration directory as part of every cache key
    pub reload_on_calib_dir_change: bool,
    /// Calibration directory used when no environment supplies one
    pub calib_dir: Option<String>,
    /// Event key of raw payloads
    pub key: String,
}

impl Default for AccessSettings {
    fn default() -> Self {
        AccessSettings {
            mode: 0,
            print_bits: 0,
            default_value: 0.0,
            reload_on_calib_dir_change: false,
            calib_dir: None,
            key: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogSettings {
    pub level: LevelFilter,
    /// Log file; console only when absent
    pub file: Option<String>,
}

impl Default for LogSettings {
    fn default() -> Self {
        LogSettings { level: LevelFilter::Info, file: None }
    }
}

/// All settings of a settings file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub access: AccessSettings,
    pub log: LogSettings,
}

impl Settings {
    /// Parse settings from a TOML string; absent keys keep their defaults
    pub fn from_str(content: &str) -> DetResult<Self> {
        let toml_value: toml::Value = content.parse()
            .map_err(|e| DetError::ConfigError(format!("Failed to parse TOML: {}", e)))?;

        let mut settings = Settings::default();

        if let Some(table) = toml_value.get("access") {
            let access = &mut settings.access;
            if let Some(v) = unsigned(table, "mode")? { access.mode = v; }
            if let Some(v) = unsigned(table, "print_bits")? { access.print_bits = v; }
            if let Some(v) = float(table, "default_value")? { access.default_value = v as f32; }
            if let Some(v) = boolean(table, "reload_on_calib_dir_change")? { access.reload_on_calib_dir_change = v; }
            if let Some(v) = string(table, "calib_dir")? { access.calib_dir = Some(v); }
            if let Some(v) = string(table, "key")? { access.key = v; }
        }

        if let Some(table) = toml_value.get("log") {
            if let Some(name) = string(table, "level")? {
                settings.log.level = parse_level(&name)
                    .ok_or_else(|| DetError::ConfigError(format!("log.level: unknown level '{}'", name)))?;
            }
            if let Some(v) = string(table, "file")? { settings.log.file = Some(v); }
        }

        Ok(settings)
    }

    /// Load settings from a TOML file
    pub fn from_file(path: &str) -> DetResult<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_str(&contents)
    }
}

fn wrong_type(key: &str, expected: &str) -> DetError {
    DetError::ConfigError(format!("{}: expected {}", key, expected))
}

fn unsigned(table: &toml::Value, key: &str) -> DetResult<Option<u32>> {
    match table.get(key) {
        None => Ok(None),
        Some(v) => v.as_integer()
            .and_then(|i| u32::try_from(i).ok())
            .map(Some)
            .ok_or_else(|| wrong_type(key, "unsigned integer")),
    }
}

fn float(table: &toml::Value, key: &str) -> DetResult<Option<f64>> {
    match table.get(key) {
        None => Ok(None),
        Some(v) => v.as_float()
            .or_else(|| v.as_integer().map(|i| i as f64))
            .map(Some)
            .ok_or_else(|| wrong_type(key, "number")),
    }
}

fn boolean(table: &toml::Value, key: &str) -> DetResult<Option<bool>> {
    match table.get(key) {
        None => Ok(None),
        Some(v) => v.as_bool().map(Some).ok_or_else(|| wrong_type(key, "boolean")),
    }
}

fn string(table: &toml::Value, key: &str) -> DetResult<Option<String>> {
    match table.get(key) {
        None => Ok(None),
        Some(v) => v.as_str().map(|s| Some(s.to_string())).ok_or_else(|| wrong_type(key, "string")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_keys() {
        let s = Settings::from_str(r#"
            [access]
            mode = 1
            print_bits = 7
            default_value = -1
            reload_on_calib_dir_change = true
            calib_dir = "/data/calib"

            [log]
            level = "debug"
        "#).unwrap();
        assert_eq!(s.access.mode, 1);
        assert_eq!(s.access.print_bits, 7);
        assert_eq!(s.access.default_value, -1.0);
        assert!(s.access.reload_on_calib_dir_change);
        assert_eq!(s.access.calib_dir.as_deref(), Some("/data/calib"));
        assert_eq!(s.log.level, LevelFilter::Debug);
        assert_eq!(s.log.file, None);
    }

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(Settings::from_str("").unwrap(), Settings::default());
    }

    #[test]
    fn wrong_types_are_errors() {
        assert!(matches!(Settings::from_str("[access]\nmode = \"one\""), Err(DetError::ConfigError(_))));
        assert!(matches!(Settings::from_str("[access]\nmode = -3"), Err(DetError::ConfigError(_))));
        assert!(matches!(Settings::from_str("[log]\nlevel = \"loud\""), Err(DetError::ConfigError(_))));
        assert!(Settings::from_str("[access").is_err());
    }
}

//! Logger utility for application-wide logging
//!
//! A `log::Log` implementation that writes `[LEVEL] message` lines to a
//! file and echoes them to the console, plus a console-only setup through
//! `env_logger`.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;
use log::{Log, Record, Metadata, LevelFilter};

/// File and console logger
pub struct Logger {
    /// File handle for log output
    file: Mutex<Option<File>>,
    level: LevelFilter,
}

impl Logger {
    /// Creates a logger writing to `log_file`
    ///
    /// # Arguments
    ///
    /// * `log_file` - Path to the log file
    /// * `level` - Most verbose level that is recorded
    pub fn new(log_file: &str, level: LevelFilter) -> io::Result<Self> {
        let file = File::create(Path::new(log_file))?;
        Ok(Logger {
            file: Mutex::new(Some(file)),
            level,
        })
    }

    /// Appends one line to the log file
    pub fn write_line(&self, message: &str) -> io::Result<()> {
        let mut guard = match self.file.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(file) = guard.as_mut() {
            writeln!(file, "{}", message)?;
            file.flush()?;
        }
        Ok(())
    }

    /// Install a file logger as the global logger
    pub fn init_global_logger(log_file: &str, level: LevelFilter) -> io::Result<()> {
        let global_logger = Logger::new(log_file, level)?;

        if log::set_boxed_logger(Box::new(global_logger)).is_err() {
            eprintln!("Warning: Global logger was already initialized");
        }

        log::set_max_level(level);
        Ok(())
    }

    /// Install a console logger; `RUST_LOG` overrides `level`
    pub fn init_console(level: LevelFilter) {
        let _ = env_logger::Builder::new()
            .filter_level(level)
            .parse_default_env()
            .format_timestamp(None)
            .try_init();
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let message = format!("[{}] {}", record.level(), record.args());
            let _ = self.write_line(&message);
            println!("{}", message);
        }
    }

    fn flush(&self) {}
}

/// Parse a level name as used in settings files and on the command line
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    match name.to_lowercase().as_str() {
        "off" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" | "warning" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn writes_lines_to_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("detkit.log");
        let logger = Logger::new(path.to_str().unwrap(), LevelFilter::Info).unwrap();
        logger.write_line("[INFO] hello").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[INFO] hello\n");
        assert!(!logger.enabled(&Metadata::builder().level(log::Level::Debug).build()));
    }

    #[test]
    fn level_names() {
        assert_eq!(parse_level("WARNING"), Some(LevelFilter::Warn));
        assert_eq!(parse_level("loud"), None);
    }
}

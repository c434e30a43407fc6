//! Command pattern interfaces
//!
//! Each CLI operation is a command object built from the parsed
//! arguments and executed once.

use clap::ArgMatches;

use crate::access::{AccessSettings, DetectorAccess, Settings};
use crate::detector::errors::{DetError, DetResult};

/// Represents an executable command in the application
pub trait Command {
    /// Execute the command
    fn execute(&mut self) -> DetResult<()>;
}

/// Factory for creating commands from CLI arguments
pub trait CommandFactory {
    fn create_command(&self, args: &ArgMatches) -> DetResult<Box<dyn Command>>;
}

/// Arguments shared by all commands
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub source: String,
    pub run: i32,
    pub settings: AccessSettings,
}

impl CommandContext {
    /// Collect source, run and access settings; `--calib-dir` overrides the settings file
    pub fn from_args(args: &ArgMatches) -> DetResult<Self> {
        let source = args.get_one::<String>("source")
            .ok_or_else(|| DetError::GenericError("Missing source".to_string()))?
            .clone();

        let run = args.get_one::<String>("run")
            .ok_or_else(|| DetError::GenericError("Missing run number".to_string()))?
            .parse::<i32>()
            .map_err(|e| DetError::GenericError(format!("Invalid run number: {}", e)))?;

        let mut settings = match args.get_one::<String>("config") {
            Some(path) => Settings::from_file(path)?.access,
            None => AccessSettings::default(),
        };
        if let Some(dir) = args.get_one::<String>("calib-dir") {
            settings.calib_dir = Some(dir.clone());
        }
        if settings.calib_dir.is_none() {
            return Err(DetError::ConfigError("No calibration directory given".to_string()));
        }

        Ok(CommandContext { source, run, settings })
    }

    pub fn access(&self) -> DetectorAccess {
        DetectorAccess::with_settings(&self.source, self.settings.clone())
    }
}

/// Required string argument
pub fn required_arg(args: &ArgMatches, name: &str) -> DetResult<String> {
    args.get_one::<String>(name)
        .cloned()
        .ok_or_else(|| DetError::GenericError(format!("Missing argument --{}", name)))
}

//! CLI command implementations
//!
//! Commands supported by the `detkit` binary, built by a factory from the
//! parsed arguments.

pub mod command_traits;
pub mod info_command;
pub mod export_command;
pub mod image_command;

pub use command_traits::{Command, CommandContext, CommandFactory};
pub use info_command::InfoCommand;
pub use export_command::ExportCommand;
pub use image_command::ImageCommand;

use clap::ArgMatches;
use crate::detector::errors::DetResult;

/// Factory for creating command instances based on CLI arguments
pub struct DetkitCommandFactory;

impl DetkitCommandFactory {
    pub fn new() -> Self {
        DetkitCommandFactory
    }
}

impl Default for DetkitCommandFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandFactory for DetkitCommandFactory {
    fn create_command(&self, args: &ArgMatches) -> DetResult<Box<dyn Command>> {
        if args.contains_id("export-calib") {
            Ok(Box::new(ExportCommand::new(args)?))
        } else if args.contains_id("image") {
            Ok(Box::new(ImageCommand::new(args)?))
        } else {
            Ok(Box::new(InfoCommand::new(args)?))
        }
    }
}

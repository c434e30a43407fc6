//! Source information command

use clap::ArgMatches;
use log::info;

use crate::commands::command_traits::{Command, CommandContext};
use crate::detector::errors::DetResult;
use crate::detector::family::DetectorFamily;

/// Prints family, calibration group, strategy and calibration summary
pub struct InfoCommand {
    context: CommandContext,
}

impl InfoCommand {
    pub fn new(args: &ArgMatches) -> DetResult<Self> {
        Ok(InfoCommand { context: CommandContext::from_args(args)? })
    }
}

impl Command for InfoCommand {
    fn execute(&mut self) -> DetResult<()> {
        let run = self.context.run;
        let mut access = self.context.access();

        info!("Source      : {}", access.source());
        info!("Family      : {}", access.family());
        info!("Calib group : {}", access.calib_group());
        info!("Raw data    : {}", access.family().native_data());

        if access.family() != DetectorFamily::Unknown {
            access.print();
        }
        access.print_calib_summary(run);
        Ok(())
    }
}

//! Calibration array export command

use clap::ArgMatches;
use log::info;

use crate::array::{Element, NdArray};
use crate::calib::CalibType;
use crate::commands::command_traits::{required_arg, Command, CommandContext};
use crate::detector::errors::DetResult;

/// Writes one calibration kind to csv, json or npy
pub struct ExportCommand {
    context: CommandContext,
    kind: CalibType,
    output: String,
    format: String,
}

impl ExportCommand {
    pub fn new(args: &ArgMatches) -> DetResult<Self> {
        let context = CommandContext::from_args(args)?;
        let kind = CalibType::from_name(&required_arg(args, "export-calib")?)?;
        let output = required_arg(args, "output")?;
        let format = args.get_one::<String>("format").cloned().unwrap_or_else(|| "csv".to_string());
        Ok(ExportCommand { context, kind, output, format })
    }
}

/// Per-pixel values as a table: the last axis becomes columns
fn as_table<T: Element>(values: &[T], shape: &[usize]) -> DetResult<NdArray<T, 2>> {
    let cols = match shape.last() {
        Some(&c) if c > 0 && shape.len() > 1 => c,
        _ => values.len(),
    };
    let rows = if cols == 0 { 0 } else { values.len() / cols };
    NdArray::from_vec([rows, cols], values.to_vec())
}

impl Command for ExportCommand {
    fn execute(&mut self) -> DetResult<()> {
        let run = self.context.run;
        let mut access = self.context.access();
        let source = access.source().to_string();
        let bundle = access.calib(run);
        let shape = bundle.shape().to_vec();

        info!("Exporting {} of {} run {} ({})", self.kind, source, run, bundle.status(self.kind));

        match self.kind {
            CalibType::Pedestals => as_table(bundle.pedestals(), &shape)?.save_to_file(&self.output, &self.format),
            CalibType::PixelRms => as_table(bundle.pixel_rms(), &shape)?.save_to_file(&self.output, &self.format),
            CalibType::PixelGain => as_table(bundle.pixel_gain(), &shape)?.save_to_file(&self.output, &self.format),
            CalibType::PixelMask => as_table(bundle.pixel_mask(), &shape)?.save_to_file(&self.output, &self.format),
            CalibType::PixelBkgd => as_table(bundle.pixel_bkgd(), &shape)?.save_to_file(&self.output, &self.format),
            CalibType::PixelStatus => as_table(bundle.pixel_status(), &shape)?.save_to_file(&self.output, &self.format),
            CalibType::CommonMode => {
                let pars = bundle.common_mode();
                NdArray::from_vec([pars.len()], pars.to_vec())?.save_to_file(&self.output, &self.format)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_keep_the_last_axis() {
        let t = as_table(&[1u16, 2, 3, 4, 5, 6], &[1, 2, 3]).unwrap();
        assert_eq!(t.shape(), [2, 3]);
        let flat = as_table(&[1.0f32, 2.0], &[2]).unwrap();
        assert_eq!(flat.shape(), [1, 2]);
    }
}

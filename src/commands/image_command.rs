//! Calibration image command

use clap::ArgMatches;
use log::info;

use crate::calib::CalibType;
use crate::commands::command_traits::{required_arg, Command, CommandContext};
use crate::detector::errors::{DetError, DetResult};
use crate::image::save_png;

/// Assembles a calibration kind into an image through the geometry and saves a PNG
pub struct ImageCommand {
    context: CommandContext,
    kind: CalibType,
    output: String,
    mask_bits: Option<u32>,
}

impl ImageCommand {
    pub fn new(args: &ArgMatches) -> DetResult<Self> {
        let context = CommandContext::from_args(args)?;
        let kind = CalibType::from_name(&required_arg(args, "image")?)?;
        if kind == CalibType::CommonMode {
            return Err(DetError::GenericError("common_mode is not a per-pixel array".to_string()));
        }
        let output = required_arg(args, "output")?;
        let mask_bits = match args.get_one::<String>("mask-bits") {
            Some(v) => Some(v.parse::<u32>()
                .map_err(|e| DetError::GenericError(format!("Invalid mask bits: {}", e)))?),
            None => None,
        };
        Ok(ImageCommand { context, kind, output, mask_bits })
    }

    fn pixel_values(&self, bundle: &crate::calib::CalibBundle) -> Vec<f64> {
        match self.kind {
            CalibType::Pedestals => bundle.pedestals().iter().map(|&v| v as f64).collect(),
            CalibType::PixelRms => bundle.pixel_rms().iter().map(|&v| v as f64).collect(),
            CalibType::PixelGain => bundle.pixel_gain().iter().map(|&v| v as f64).collect(),
            CalibType::PixelMask => bundle.pixel_mask().iter().map(|&v| v as f64).collect(),
            CalibType::PixelBkgd => bundle.pixel_bkgd().iter().map(|&v| v as f64).collect(),
            CalibType::PixelStatus => bundle.pixel_status().iter().map(|&v| v as f64).collect(),
            CalibType::CommonMode => Vec::new(),
        }
    }
}

impl Command for ImageCommand {
    fn execute(&mut self) -> DetResult<()> {
        let run = self.context.run;
        let mut access = self.context.access();
        let mut values = self.pixel_values(access.calib(run));

        if let Some(mbits) = self.mask_bits {
            let mask = access.pixel_mask_geo(run, mbits);
            if mask.len() == values.len() {
                values.iter_mut().zip(&mask).for_each(|(v, &m)| *v *= m as f64);
            }
        }

        let image = access.image(run, &values)?;
        if image.is_empty() {
            return Err(DetError::GenericError(format!("No geometry for {} run {}", access.source(), run)));
        }
        info!("Assembled {} image {:?}", self.kind, image.shape());
        save_png(&image, &self.output)
    }
}

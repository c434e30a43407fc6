use clap::{Arg, Command as ClapCommand, ArgAction};
use std::process;
use log::{error, LevelFilter};

use detkit::access::{LogSettings, Settings};
use detkit::utils::logger::Logger;
use detkit::commands::{CommandFactory, DetkitCommandFactory};

fn main() {
    let matches = ClapCommand::new("detkit")
        .version("0.1")
        .about("Inspect calibration and geometry of area detectors")
        .arg(
            Arg::new("source")
                .help("Data source name, e.g. CxiDs1.0:Cspad.0")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("calib-dir")
                .long("calib-dir")
                .help("Calibration directory")
                .value_name("DIR")
                .required(false),
        )
        .arg(
            Arg::new("run")
                .short('r')
                .long("run")
                .help("Run number")
                .value_name("N")
                .required(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Settings file (TOML)")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("export-calib")
                .long("export-calib")
                .help("Export a calibration kind (pedestals, pixel_rms, pixel_gain, pixel_mask, pixel_bkgd, pixel_status, common_mode)")
                .value_name("KIND")
                .required(false),
        )
        .arg(
            Arg::new("image")
                .long("image")
                .help("Assemble a per-pixel calibration kind into a PNG image")
                .value_name("KIND")
                .required(false),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Output file")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .help("Format for array output (csv, json, npy)")
                .value_name("FORMAT")
                .default_value("csv")
                .required(false),
        )
        .arg(
            Arg::new("mask-bits")
                .long("mask-bits")
                .help("Geometry mask bits applied to the image")
                .value_name("N")
                .required(false),
        )
        .get_matches();

    let log_settings = match matches.get_one::<String>("config") {
        Some(path) => match Settings::from_file(path) {
            Ok(s) => s.log,
            Err(e) => {
                eprintln!("Error reading settings: {}", e);
                process::exit(1);
            }
        },
        None => LogSettings::default(),
    };
    let level = if matches.get_flag("verbose") { LevelFilter::Debug } else { log_settings.level };

    match &log_settings.file {
        Some(file) => {
            if let Err(e) = Logger::init_global_logger(file, level) {
                eprintln!("Error setting up global logger: {}", e);
                process::exit(1);
            }
        }
        None => Logger::init_console(level),
    }

    let factory = DetkitCommandFactory::new();

    match factory.create_command(&matches) {
        Ok(mut command) => {
            if let Err(e) = command.execute() {
                error!("Command execution error: {}", e);
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        Err(e) => {
            error!("Failed to create command: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
}

#![forbid(unsafe_code)]

//! Geothermal guide binary entry point.

use geoguide::app::{GuideConfig, GuideModel};
use geoguide::cli;
use geoguide::logging::{self, LogConfig};
use geoguide::program::{Program, ProgramConfig};
use geoguide::session::SessionOptions;
use geoguide_content::Guide;

fn main() {
    let opts = cli::Opts::parse();

    let log_config = LogConfig {
        file: opts.log_file.clone(),
        filter: opts.log_filter.clone(),
        json: opts.log_json,
    };
    if let Err(e) = logging::init(&log_config) {
        eprintln!("Failed to set up logging: {e}");
        std::process::exit(1);
    }

    let model = match Guide::load().and_then(|guide| GuideModel::new(guide, GuideConfig::from(&opts))) {
        Ok(model) => model,
        Err(e) => {
            eprintln!("Failed to load content: {e}");
            std::process::exit(1);
        }
    };

    let config = ProgramConfig {
        session: SessionOptions {
            mouse_capture: opts.mouse,
            focus_events: true,
            ..SessionOptions::default()
        },
        ..ProgramConfig::default()
    };
    match Program::with_config(model, config) {
        Ok(mut program) => {
            if let Err(e) = program.run() {
                eprintln!("Runtime error: {e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Failed to initialize: {e}");
            std::process::exit(1);
        }
    }
}

mod clargs;
mod error;
mod fingerprint;
mod logging;
mod merge;

use clargs::*;
use log::{error, info};
use merge::*;
use std::process;
use structopt::StructOpt;

fn main() {
    let opt = Opt::from_args();
    logging::init_logging(opt.verbose, opt.quiet);

    let config = match opt.merge_config() {
        Some(config) => config,
        None => {
            println!(
                "Please provide multiple input directories with the --input (-i) flag, at least 2 are required."
            );
            return;
        }
    };

    println!(
        "When duplicate files are detected, files will be taken from the directories in the order they were provided."
    );
    info!("Input directories: {:?}", config.input_dirs);
    info!("Output directory: {}", config.output_dir.display());

    if let Err(err) = create_output_directory(&config.output_dir) {
        error!("{}", err);
        process::exit(1);
    }

    if let Err(err) = merge_directories(&config) {
        error!("Error encountered. {}", err);
    }
}

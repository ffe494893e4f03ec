//! Logger setup.
//!
//! `RUST_LOG`, when set, decides the level. Otherwise `--quiet` logs errors only, `-v` adds debug
//! output, `-vv` trace output, and the default is info.

use env_logger::Builder;
use log::LevelFilter;
use std::{env, io::Write};

/// Initialize the global logger. Must be called at most once.
pub fn init_logging(verbose: u8, quiet: bool) {
    let mut builder = Builder::new();

    if env::var_os("RUST_LOG").is_some() {
        builder.parse_default_env();
    } else {
        builder.filter_level(level(verbose, quiet));
    }

    builder
        .format(|buf, record| writeln!(buf, "{:<5} {}", record.level(), record.args()))
        .init();
}

fn level(verbose: u8, quiet: bool) -> LevelFilter {
    match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    }
}

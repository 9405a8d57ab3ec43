//! phaseboard: display-ready phase history for remote builds.
//!
//! The remote build service reports a build as an ordered list of phases.
//! [`phases::normalize`] turns that list into one a dashboard can show as-is.
//! The rest of the crate stores build records and exposes them on the
//! command line.

mod cli;
mod config;
mod logging;
mod model;
mod phases;
mod source;
mod storage;

use std::process;

use config::Config;

fn main() {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    logging::init(config.log_level());

    if let Err(e) = cli::run(&config) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

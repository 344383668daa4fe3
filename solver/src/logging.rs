//! Thin wrapper around `colog`'s colored `env_logger` formatter, matching
//! the call site the teacher's `main.rs` already expects:
//! `Logger::init(args.verbosity)`.

use log::LevelFilter;

pub struct Logger;

impl Logger {
    pub fn init(verbosity: LevelFilter) {
        let mut builder = colog::default_builder();
        builder.filter_level(verbosity);
        builder.init();
    }
}

/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use clap::ArgMatches;
use log::{info, Level};
use strata_core::options::DecoderOptions;

#[derive(Debug, Copy, Clone)]
pub struct CmdOptions {
    pub max_width:             usize,
    pub max_height:            usize,
    pub strict_mode:           bool,
    pub skip_unknown_channels: bool,
    pub print_json:            bool,
    pub collect_events:        bool
}

impl CmdOptions {
    pub fn new() -> CmdOptions {
        CmdOptions {
            max_width:             0,
            max_height:            0,
            strict_mode:           false,
            skip_unknown_channels: false,
            print_json:            false,
            collect_events:        false
        }
    }

    /// Decoder options matching what was asked on the command line
    pub fn to_decoder_options(&self) -> DecoderOptions {
        DecoderOptions::new_cmd()
            .set_max_width(self.max_width)
            .set_max_height(self.max_height)
            .set_strict_mode(self.strict_mode)
            .psd_set_skip_unknown_channels(self.skip_unknown_channels)
    }
}

pub fn parse_options(options: &ArgMatches) -> CmdOptions {
    let mut cmd_options = CmdOptions::new();

    cmd_options.max_width = options.get_one::<usize>("max-width").copied().unwrap_or(1 << 14);
    cmd_options.max_height = options.get_one::<usize>("max-height").copied().unwrap_or(1 << 14);

    if options.get_flag("strict") {
        info!("Length mismatches will be treated as errors");
        cmd_options.strict_mode = true;
    }
    if options.get_flag("skip-unknown-channels") {
        info!("Skipping channels without an RGBA role");
        cmd_options.skip_unknown_channels = true;
    }
    cmd_options.print_json = options.get_flag("json");
    cmd_options.collect_events = options.get_flag("events");

    cmd_options
}

/// Set up logging options
pub fn setup_logger(options: &ArgMatches) {
    let log_level;

    if options.get_flag("debug") {
        log_level = Level::Debug;
    } else if options.get_flag("trace") {
        log_level = Level::Trace;
    } else if options.get_flag("warn") {
        log_level = Level::Warn
    } else if options.get_flag("info") {
        log_level = Level::Info;
    } else {
        log_level = Level::Warn;
    }

    if let Err(e) = simple_logger::init_with_level(log_level) {
        eprintln!("Could not initialize logger: {e}");
        return;
    }

    info!("Initialized logger");
    info!("Log level :{}", log_level);
}

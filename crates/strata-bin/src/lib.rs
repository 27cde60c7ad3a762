/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::process::exit;

use log::error;

use crate::workflow::extract_layers_from_cmd;

mod cmd_args;
mod cmd_parsers;
mod errors;
mod file_io;
mod serde;
mod workflow;

pub fn main() {
    let cmd = cmd_args::create_cmd_args();
    let options = cmd.get_matches();

    cmd_parsers::global_options::setup_logger(&options);

    let parsed_opts = cmd_parsers::global_options::parse_options(&options);

    match extract_layers_from_cmd(&options, &parsed_opts) {
        Ok(report) if report.failed_layers == 0 => (),
        Ok(report) => {
            error!(
                "{} of {} layers could not be decoded",
                report.failed_layers, report.total_layers
            );
            exit(1);
        }
        Err(reason) => {
            println!();
            error!(" Could not extract layers, reason {:?}", reason);
            println!();
            exit(-1);
        }
    }
}

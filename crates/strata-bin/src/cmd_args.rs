/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use clap::{value_parser, Arg, ArgAction, Command};

#[rustfmt::skip]
pub fn create_cmd_args() -> Command {
    Command::new("strata")
        .about("Extract the layers of a Photoshop document")
        .arg(Arg::new("in")
            .short('i')
            .help("Input file to read data from")
            .long("input")
            .required(true))
        .arg(Arg::new("out")
            .short('o')
            .long("out")
            .help("Directory to write one png per layer to")
            .long_help("Directory to write one png per layer to.\nFiles are named layer{index}.png where index is the position in the layer directory, bottom most first.\nThe directory is created if it doesn't exist"))
        .arg(Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print the document structure as json"))
        .arg(Arg::new("events")
            .long("events")
            .action(ArgAction::SetTrue)
            .help("Include every decode event in the json output")
            .requires("json"))
        .arg(Arg::new("strict")
            .long("strict")
            .action(ArgAction::SetTrue)
            .help_heading("ADVANCED")
            .help("Treat length mismatches as errors"))
        .arg(Arg::new("skip-unknown-channels")
            .long("skip-unknown-channels")
            .action(ArgAction::SetTrue)
            .help_heading("ADVANCED")
            .help("Ignore mask channels instead of failing their layer"))
        .arg(Arg::new("max-width")
            .long("max-width")
            .help_heading("ADVANCED")
            .help("Maximum width of a layer")
            .default_value("16384")
            .value_parser(value_parser!(usize)))
        .arg(Arg::new("max-height")
            .long("max-height")
            .help_heading("ADVANCED")
            .help("Maximum height of a layer")
            .default_value("16384")
            .value_parser(value_parser!(usize)))
        .arg(Arg::new("debug")
            .long("debug")
            .action(ArgAction::SetTrue)
            .help_heading("LOGGING")
            .help("Display debug information and higher"))
        .arg(Arg::new("trace")
            .long("trace")
            .action(ArgAction::SetTrue)
            .help_heading("LOGGING")
            .help("Display very verbose information"))
        .arg(Arg::new("warn")
            .long("warn")
            .action(ArgAction::SetTrue)
            .help_heading("LOGGING")
            .help("Display warnings and errors"))
        .arg(Arg::new("info")
            .long("info")
            .action(ArgAction::SetTrue)
            .help_heading("LOGGING")
            .help("Display information about the decoding options"))
}

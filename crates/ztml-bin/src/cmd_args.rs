/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::ffi::OsString;

use clap::{value_parser, Arg, ArgAction, Command};

#[rustfmt::skip]
pub fn create_cmd_args() -> Command {
    Command::new("ztml")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Extreme inline text compression for HTML / JS")
        .term_width(120)
        .arg(Arg::new("in")
            .help("Input file to read the payload from")
            .value_parser(value_parser!(OsString))
            .required(true))
        .arg(Arg::new("out")
            .help("Output file; standard output when omitted")
            .value_parser(value_parser!(OsString)))
        .arg(Arg::new("input-encoding")
            .long("input-encoding")
            .help_heading("Input")
            .help("Input charset: utf-8 or cp1252/l1 [default: utf-8 with a latin-1 retry]"))
        .arg(Arg::new("reduce-whitespace")
            .long("reduce-whitespace")
            .help_heading("Text")
            .help("Collapse whitespace runs and paragraph breaks")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("skip-unix-newline")
            .long("skip-unix-newline")
            .help_heading("Text")
            .help("Keep CR / CRLF line endings instead of rewriting to LF")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("fix-punct")
            .long("fix-punct")
            .help_heading("Text")
            .help("Normalize dashes, smart quotes and ellipses")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("caps")
            .long("caps")
            .help_heading("Text")
            .help("Case folding mode: raw, lower, upper, simple or auto")
            .default_value("auto"))
        .arg(Arg::new("mtf")
            .long("mtf")
            .help_heading("Transform")
            .help("Move-to-front policy: none, 0, 1, 2, 50, 52, 60, 70, 80 or 90")
            .default_value("0"))
        .arg(Arg::new("vowels")
            .long("vowels")
            .help_heading("Transform")
            .help("Reorder vowels next to each other before the BWT")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("bin2txt")
            .long("bin2txt")
            .help_heading("Encoding")
            .help("Binary-to-text codec: base64, base125 or crenc")
            .default_value("crenc"))
        .arg(Arg::new("offset")
            .long("offset")
            .help_heading("Encoding")
            .help("Fixed global byte offset 0-255 [default: sweep for the optimum]")
            .value_parser(value_parser!(u8)))
        .arg(Arg::new("iterations")
            .long("iterations")
            .help_heading("Encoding")
            .help("Zopfli iterations for small streams")
            .default_value("15")
            .value_parser(value_parser!(u32)))
        .arg(Arg::new("iterations-large")
            .long("iterations-large")
            .help_heading("Encoding")
            .help("Zopfli iterations for large streams")
            .default_value("5")
            .value_parser(value_parser!(u32)))
        .arg(Arg::new("keep-iend")
            .long("keep-iend")
            .help_heading("Encoding")
            .help("Keep the trailing IEND chunk instead of stripping it")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("element-id")
            .long("element-id")
            .help_heading("Artifact")
            .help("Render into <pre id=…> / <img id=…> instead of the body")
            .default_value(""))
        .arg(Arg::new("raw")
            .long("raw")
            .help_heading("Artifact")
            .help("Payload is an HTML fragment, render via document.write")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("image")
            .long("image")
            .help_heading("Artifact")
            .help("Payload is an opaque image byte sequence")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("js")
            .long("js")
            .help_heading("Artifact")
            .help("Emit a bare script instead of an HTML document")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("skip-uglify")
            .long("skip-uglify")
            .help_heading("Artifact")
            .help("Skip the alias minifier")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("skip-replace-quoted")
            .long("skip-replace-quoted")
            .help_heading("Artifact")
            .help("Do not alias quoted string forms")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("prevent-grow")
            .long("prevent-grow")
            .help_heading("Artifact")
            .help("Discard alias substitutions that grow the script")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("lang")
            .long("lang")
            .help_heading("Artifact")
            .help("Value for the <html lang> attribute")
            .default_value("en"))
        .arg(Arg::new("mobile")
            .long("mobile")
            .help_heading("Artifact")
            .help("Emit the viewport meta tag")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("title")
            .long("title")
            .help_heading("Artifact")
            .help("Emit a <title> element")
            .default_value(""))
        .arg(Arg::new("validate")
            .long("validate")
            .help("Run the in-process round-trip oracle after encoding")
            .action(ArgAction::SetTrue))
        .args(add_logging_options())
}

fn add_logging_options() -> [Arg; 4] {
    [
        Arg::new("debug")
            .long("debug")
            .action(ArgAction::SetTrue)
            .help_heading("Logging")
            .help("Display debug information and higher"),
        Arg::new("trace")
            .long("trace")
            .action(ArgAction::SetTrue)
            .help_heading("Logging")
            .help("Display very verbose information"),
        Arg::new("warn")
            .long("warn")
            .action(ArgAction::SetTrue)
            .help_heading("Logging")
            .help("Display warnings and errors"),
        Arg::new("info")
            .long("info")
            .action(ArgAction::SetTrue)
            .help_heading("Logging")
            .help("Display stage statistics")
    ]
}

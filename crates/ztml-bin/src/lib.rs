/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::ffi::OsString;
use std::io::Write;
use std::process::exit;

use clap::ArgMatches;
use log::{error, LevelFilter};
use ztml_core::options::{Bin2Txt, CapsMode, Charset, EncodeOptions, MtfPolicy, OffsetMode};
use ztml_html::{encode, Payload, ZtmlErrors};

mod cmd_args;

pub fn main() {
    let cmd = cmd_args::create_cmd_args();
    let options = cmd.get_matches();

    setup_logger(&options);

    match run(&options) {
        Ok(code) => exit(code),
        Err(err) => {
            error!("could not encode, reason {:?}", err);
            exit(-1);
        }
    }
}

fn run(matches: &ArgMatches) -> Result<i32, ZtmlErrors> {
    let options = parse_options(matches)?;

    let input_path = matches.get_one::<OsString>("in").unwrap();
    let data = std::fs::read(input_path)
        .map_err(|err| ZtmlErrors::GenericString(format!("cannot read input: {err}")))?;

    let text;
    let payload = if options.image() {
        Payload::Bytes(&data)
    } else {
        text = decode_input(&data, matches.get_one::<String>("input-encoding"))?;
        Payload::Text(&text)
    };

    let artifact = encode(payload, &options)?;

    match matches.get_one::<OsString>("out") {
        Some(path) => std::fs::write(path, &artifact.bytes)
            .map_err(|err| ZtmlErrors::GenericString(format!("cannot write output: {err}")))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(&artifact.bytes)
                .and_then(|()| stdout.flush())
                .map_err(|err| ZtmlErrors::GenericString(format!("cannot write output: {err}")))?;
        }
    }
    Ok(i32::from(artifact.stats.validated == Some(false)))
}

fn parse_options(matches: &ArgMatches) -> Result<EncodeOptions, ZtmlErrors> {
    let caps_name = matches.get_one::<String>("caps").unwrap();
    let caps = CapsMode::from_name(caps_name)
        .ok_or_else(|| ZtmlErrors::GenericString(format!("unknown caps mode '{caps_name}'")))?;

    let mtf_name = matches.get_one::<String>("mtf").unwrap();
    let mtf = if mtf_name == "none" {
        None
    } else {
        let id: u8 = mtf_name
            .parse()
            .ok()
            .ok_or_else(|| ZtmlErrors::GenericString(format!("unknown mtf policy '{mtf_name}'")))?;
        Some(MtfPolicy::from_id(id).ok_or_else(|| {
            ZtmlErrors::GenericString(format!("unknown mtf policy '{mtf_name}'"))
        })?)
    };

    let codec_name = matches.get_one::<String>("bin2txt").unwrap();
    let bin2txt = Bin2Txt::from_name(codec_name)
        .ok_or_else(|| ZtmlErrors::GenericString(format!("unknown codec '{codec_name}'")))?;

    let offset = match matches.get_one::<u8>("offset") {
        Some(&fixed) => OffsetMode::Fixed(fixed),
        None => OffsetMode::SweepOptimal
    };

    Ok(EncodeOptions::new()
        .set_reduce_whitespace(matches.get_flag("reduce-whitespace"))
        .set_unix_newline(!matches.get_flag("skip-unix-newline"))
        .set_fix_punct(matches.get_flag("fix-punct"))
        .set_caps(caps)
        .set_mtf(mtf)
        .set_vowel_reorder(matches.get_flag("vowels"))
        .set_bin2txt(bin2txt)
        .set_offset(offset)
        .set_element_id(matches.get_one::<String>("element-id").unwrap())
        .set_raw(matches.get_flag("raw"))
        .set_image(matches.get_flag("image"))
        .set_js(matches.get_flag("js"))
        .set_uglify(!matches.get_flag("skip-uglify"))
        .set_replace_quoted(!matches.get_flag("skip-replace-quoted"))
        .set_prevent_grow(matches.get_flag("prevent-grow"))
        .set_lang(matches.get_one::<String>("lang").unwrap())
        .set_mobile(matches.get_flag("mobile"))
        .set_title(matches.get_one::<String>("title").unwrap())
        .set_validate(matches.get_flag("validate"))
        .set_iterations(*matches.get_one::<u32>("iterations").unwrap())
        .set_iterations_large(*matches.get_one::<u32>("iterations-large").unwrap())
        .set_strip_iend(!matches.get_flag("keep-iend")))
}

/// Decode the input bytes to text. Charset autodetection is out of scope;
/// the default is strict UTF-8 with a latin-1 retry when that fails.
fn decode_input(data: &[u8], encoding: Option<&String>) -> Result<String, ZtmlErrors> {
    let charset = match encoding {
        Some(label) => Some(Charset::from_label(label).ok_or_else(|| {
            ZtmlErrors::GenericString(format!("unsupported input encoding '{label}'"))
        })?),
        None => None
    };
    match charset {
        Some(Charset::Utf8) => String::from_utf8(data.to_vec())
            .map_err(|_| ZtmlErrors::GenericStatic("input is not valid UTF-8")),
        Some(Charset::Cp1252) => Ok(decode_cp1252(data)),
        None => match String::from_utf8(data.to_vec()) {
            Ok(text) => Ok(text),
            Err(_) => Ok(decode_cp1252(data))
        }
    }
}

fn decode_cp1252(data: &[u8]) -> String {
    data.iter()
        .map(|&byte| ztml_web::escape::cp1252_char(byte))
        .collect()
}

fn setup_logger(options: &ArgMatches) {
    let log_level = if options.get_flag("debug") {
        LevelFilter::Debug
    } else if options.get_flag("trace") {
        LevelFilter::Trace
    } else if options.get_flag("info") {
        LevelFilter::Info
    } else if options.get_flag("warn") {
        LevelFilter::Warn
    } else {
        LevelFilter::Warn
    };

    let _ = simple_logger::SimpleLogger::new()
        .with_level(log_level)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_parse() {
        let matches = cmd_args::create_cmd_args()
            .try_get_matches_from(["ztml", "book.txt"])
            .unwrap();
        let options = parse_options(&matches).unwrap();
        assert_eq!(options.caps(), CapsMode::Auto);
        assert_eq!(options.mtf(), Some(MtfPolicy::MoveToFront));
        assert_eq!(options.bin2txt(), Bin2Txt::CrEnc);
        assert_eq!(options.offset(), OffsetMode::SweepOptimal);
        assert!(options.unix_newline());
        assert!(options.uglify());
        assert!(options.strip_iend());
    }

    #[test]
    fn cli_flags_flip_options() {
        let matches = cmd_args::create_cmd_args()
            .try_get_matches_from([
                "ztml",
                "in.txt",
                "out.html",
                "--caps",
                "upper",
                "--mtf",
                "none",
                "--bin2txt",
                "base125",
                "--offset",
                "7",
                "--skip-uglify",
                "--mobile",
                "--validate"
            ])
            .unwrap();
        let options = parse_options(&matches).unwrap();
        assert_eq!(options.caps(), CapsMode::Upper);
        assert_eq!(options.mtf(), None);
        assert_eq!(options.bin2txt(), Bin2Txt::Base125);
        assert_eq!(options.offset(), OffsetMode::Fixed(7));
        assert!(!options.uglify());
        assert!(options.mobile());
        assert!(options.validate());
    }

    #[test]
    fn mtf_ids_parse() {
        for (name, policy) in [("80", MtfPolicy::Scaled80), ("52", MtfPolicy::HalfSticky)] {
            let matches = cmd_args::create_cmd_args()
                .try_get_matches_from(["ztml", "x", "--mtf", name])
                .unwrap();
            assert_eq!(parse_options(&matches).unwrap().mtf(), Some(policy));
        }
        let matches = cmd_args::create_cmd_args()
            .try_get_matches_from(["ztml", "x", "--mtf", "3"])
            .unwrap();
        assert!(parse_options(&matches).is_err());
    }

    #[test]
    fn input_decoding_falls_back_to_latin1() {
        assert_eq!(decode_input(b"caf\xE9", None).unwrap(), "café");
        assert_eq!(
            decode_input("caf\u{E9}".as_bytes(), None).unwrap(),
            "café"
        );
        assert!(decode_input(b"\xFF", Some(&String::from("utf-8"))).is_err());
        assert_eq!(
            decode_input(b"\x93quoted\x94", Some(&String::from("cp1252"))).unwrap(),
            "\u{201C}quoted\u{201D}"
        );
    }
}

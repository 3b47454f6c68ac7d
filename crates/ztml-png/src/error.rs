/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::fmt::{Debug, Formatter};

pub enum PngErrors {
    BadSignature,
    GenericStatic(&'static str),
    Generic(String),
    ZlibEncode(std::io::Error),
    ZlibDecode(String)
}

impl Debug for PngErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadSignature => writeln!(f, "Bad PNG signature, not a png"),
            Self::GenericStatic(val) => writeln!(f, "{val}"),
            Self::Generic(val) => writeln!(f, "{val}"),
            Self::ZlibEncode(err) => writeln!(f, "zopfli could not write the stream: {err:?}"),
            Self::ZlibDecode(err) => writeln!(f, "corrupt zlib stream: {err}")
        }
    }
}

impl From<&'static str> for PngErrors {
    fn from(val: &'static str) -> Self {
        Self::GenericStatic(val)
    }
}

impl From<String> for PngErrors {
    fn from(val: String) -> Self {
        Self::Generic(val)
    }
}

impl From<std::io::Error> for PngErrors {
    fn from(val: std::io::Error) -> Self {
        Self::ZlibEncode(val)
    }
}

impl From<zune_inflate::errors::InflateDecodeErrors> for PngErrors {
    fn from(val: zune_inflate::errors::InflateDecodeErrors) -> Self {
        Self::ZlibDecode(format!("{:?}", val.error))
    }
}

/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! RFC 4648 Base64, present for benchmarking the other two codecs.
//!
//! No decoder fragment is generated: base64 payloads ride in a
//! `data:image/png;base64,…` URL and the browser itself is the decoder.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

pub fn encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

pub fn decode(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(text)
}

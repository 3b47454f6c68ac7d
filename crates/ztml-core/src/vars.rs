/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Variable names used by the synthesized JavaScript decoder
//!
//! Every stage fragment reads and writes the same handful of single letter
//! globals, so the names live in one registry instead of being scattered
//! through the templates. The payload variable is special: the minifier is
//! told its name so it never rewrites inside the `P=\`…\`` literal.

/// The single letter globals shared by all decoder fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsVars {
    /// Holds the embedded payload template literal.
    pub payload: String,
    /// Text being reconstructed.
    pub text: String,
    /// The unpacked bit array read off the canvas.
    pub bits: String,
    /// The decoded byte array fed to the `Blob`.
    pub bytes: String,
    /// The `Image` the PNG payload is loaded into.
    pub image: String,
    /// The shared inverse-BWT arrow function.
    pub bwt: String
}

impl Default for JsVars {
    fn default() -> JsVars {
        JsVars {
            payload: String::from("P"),
            text:    String::from("t"),
            bits:    String::from("a"),
            bytes:   String::from("u"),
            image:   String::from("i"),
            bwt:     String::from("B")
        }
    }
}

impl JsVars {
    pub fn new() -> JsVars {
        JsVars::default()
    }

    /// Override the text variable; raw mode uses this when the decoded
    /// fragment may itself contain scripts using the default name.
    pub fn set_text(mut self, name: &str) -> Self {
        self.text = name.to_string();
        self
    }
}

/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Webification of the synthesized decoder
//!
//! Everything between "the pipeline produced a script" and "the artifact is
//! bytes on disk" lives here:
//!
//! - escaping for payload bytes and decoder-table strings embedded in
//!   template literals
//! - charset-aware serialization (`cp1252` documents escape what they
//!   cannot express)
//! - the alias minifier, which never rewrites the payload literal
//! - the HTML frame
pub mod escape;
pub mod html;
pub mod uglify;

pub use escape::{escape_bytes, escape_code_points, safe_encode};
pub use html::{html_wrap, HtmlOptions};
pub use uglify::{uglify, UglifyOptions, DEFAULT_ALIASES};

/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! PNG / DEFLATE encoding optimized for arbitrary data compression
//!
//! Encoding the bit stream as a PNG buys DEFLATE decompression from the
//! browser for free: the decoder draws the image on a canvas and reads the
//! bits back, so no decompression library ships with the artifact. The
//! rectangle is kept near square to minimize padding, the stream is
//! re-optimized with Zopfli over a family of filter strategies, and the
//! trailing IEND chunk is dropped (the IDAT CRC and zlib Adler-32 stay;
//! Safari refuses the image without them).
//!
//! Depth 1 is the shipping configuration. Depths 8 and 24 pack more bits
//! per pixel and exist for benchmarking, but Safari's premultiplied-alpha
//! canvas readback corrupts them.
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod filters;
pub mod js;

pub use decoder::png_to_bits;
pub use encoder::{to_png, PngArtifact, PngOptions, MAX_DIM, MAX_PIXELS};
pub use error::PngErrors;
pub use filters::FilterStrategy;

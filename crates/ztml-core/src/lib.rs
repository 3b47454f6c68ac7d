/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Core routines shared by all libraries
//!
//! This crate provides the small set of types shared by the encoders and
//! decoder synthesizers under the `ztml` umbrella
//!
//! It currently contains
//!
//! - A packed bit sequence used between the Huffman and PNG stages
//! - Encoder options and the enums they are built from
//! - The registry of single letter variable names used by the synthesized
//!   JavaScript decoders
pub mod bits;
pub mod options;
pub mod vars;

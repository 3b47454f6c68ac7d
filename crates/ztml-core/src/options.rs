/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Encoder options
//!
//! [`EncodeOptions`] is constructed once at the call site (the CLI builds it
//! from arguments) and handed down the pipeline; no stage reads process wide
//! state.

/// Case folding mode applied by the text preprocessing stage.
///
/// `Simple` folds to lowercase and lets the synthesized decoder re-uppercase
/// sentence starts, paragraph starts and standalone `i` with a fixed regex,
/// whether or not that recovers the original. `Auto` verifies the round trip
/// in process and falls back to `Raw` on any mismatch.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum CapsMode {
    Raw,
    Lower,
    Upper,
    Simple,
    #[default]
    Auto
}

impl CapsMode {
    pub fn from_name(name: &str) -> Option<CapsMode> {
        Some(match name {
            "raw" => CapsMode::Raw,
            "lower" => CapsMode::Lower,
            "upper" => CapsMode::Upper,
            "simple" => CapsMode::Simple,
            "auto" => CapsMode::Auto,
            _ => return None
        })
    }

    pub const fn name(self) -> &'static str {
        match self {
            CapsMode::Raw => "raw",
            CapsMode::Lower => "lower",
            CapsMode::Upper => "upper",
            CapsMode::Simple => "simple",
            CapsMode::Auto => "auto"
        }
    }

    /// True for the modes that lowercase the text before later stages.
    pub const fn folds(self) -> bool {
        !matches!(self, CapsMode::Raw)
    }
}

/// Move-to-front update policy.
///
/// After a symbol of rank `k` is emitted it is reinserted at a
/// policy-determined index; `p` is the previously emitted rank. The numeric
/// ids follow the classic literature naming (`1`/`2` are MTF-1/MTF-2, the
/// `5x` and higher ids jump a fraction of the way to the front).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MtfPolicy {
    /// `0`: insert at the front.
    MoveToFront,
    /// `1`: ranks 0 and 1 go to the front, everything else to index 1.
    StickyFront,
    /// `2`: as `1`, but a preceding zero rank lets rank 1 reach the front.
    StickySplit,
    /// `50`: insert halfway to the front.
    HalfJump,
    /// `52`: halfway, with the `2` rule for ranks 0 and 1.
    HalfSticky,
    /// `60`..`90`: insert at `round(k * fraction)`.
    Scaled60,
    Scaled70,
    Scaled80,
    Scaled90
}

impl MtfPolicy {
    pub fn from_id(id: u8) -> Option<MtfPolicy> {
        Some(match id {
            0 => MtfPolicy::MoveToFront,
            1 => MtfPolicy::StickyFront,
            2 => MtfPolicy::StickySplit,
            50 => MtfPolicy::HalfJump,
            52 => MtfPolicy::HalfSticky,
            60 => MtfPolicy::Scaled60,
            70 => MtfPolicy::Scaled70,
            80 => MtfPolicy::Scaled80,
            90 => MtfPolicy::Scaled90,
            _ => return None
        })
    }

    pub const fn id(self) -> u8 {
        match self {
            MtfPolicy::MoveToFront => 0,
            MtfPolicy::StickyFront => 1,
            MtfPolicy::StickySplit => 2,
            MtfPolicy::HalfJump => 50,
            MtfPolicy::HalfSticky => 52,
            MtfPolicy::Scaled60 => 60,
            MtfPolicy::Scaled70 => 70,
            MtfPolicy::Scaled80 => 80,
            MtfPolicy::Scaled90 => 90
        }
    }

    /// The index a symbol emitted with rank `rank` is reinserted at, given
    /// the previously emitted rank `prev` (0 before the first symbol).
    ///
    /// The scaled policies compute `⌊k·f + 0.5⌋` in `f64` so the result is
    /// bit-identical to the `k*.6+.5|0` the synthesized decoder evaluates.
    pub fn insert_index(self, rank: usize, prev: usize) -> usize {
        let scaled = |fraction: f64| (rank as f64 * fraction + 0.5) as usize;

        match self {
            MtfPolicy::MoveToFront => 0,
            MtfPolicy::StickyFront => usize::from(rank > 1),
            MtfPolicy::StickySplit => {
                if prev > 0 {
                    usize::from(rank > 0)
                } else {
                    usize::from(rank > 1)
                }
            }
            MtfPolicy::HalfJump => rank / 2,
            MtfPolicy::HalfSticky => {
                if rank > 1 {
                    rank / 2
                } else if prev > 0 {
                    usize::from(rank > 0)
                } else {
                    0
                }
            }
            MtfPolicy::Scaled60 => scaled(0.6),
            MtfPolicy::Scaled70 => scaled(0.7),
            MtfPolicy::Scaled80 => scaled(0.8),
            MtfPolicy::Scaled90 => scaled(0.9)
        }
    }
}

/// The binary-to-text codec embedding the compressed payload in the script.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Bin2Txt {
    /// RFC 4648. ~33% overhead, kept for benchmarking.
    Base64,
    /// 7 bits per byte over 125 legal code points. ~14.7% overhead.
    Base125,
    /// yEnc style escaping under a cp1252 document. ~1.6% overhead.
    #[default]
    CrEnc
}

impl Bin2Txt {
    pub fn from_name(name: &str) -> Option<Bin2Txt> {
        Some(match name {
            "base64" => Bin2Txt::Base64,
            "base125" => Bin2Txt::Base125,
            "crenc" => Bin2Txt::CrEnc,
            _ => return None
        })
    }

    pub const fn name(self) -> &'static str {
        match self {
            Bin2Txt::Base64 => "base64",
            Bin2Txt::Base125 => "base125",
            Bin2Txt::CrEnc => "crenc"
        }
    }

    /// The document charset this codec requires.
    pub const fn charset(self) -> Charset {
        match self {
            Bin2Txt::CrEnc => Charset::Cp1252,
            _ => Charset::Utf8
        }
    }
}

/// Document character set of the emitted artifact.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Charset {
    #[default]
    Utf8,
    Cp1252
}

impl Charset {
    /// Normalize the usual aliases; `l1` and `iso-8859-1` land on cp1252
    /// because that is what HTML5 decodes them as.
    pub fn from_label(label: &str) -> Option<Charset> {
        let lower = label.to_ascii_lowercase().replace('-', "");
        Some(match lower.as_str() {
            "utf8" => Charset::Utf8,
            "cp1252" | "windows1252" | "l1" | "latin1" | "iso88591" => Charset::Cp1252,
            _ => return None
        })
    }

    /// The label written into `<meta charset=…>`.
    pub const fn label(self) -> &'static str {
        match self {
            Charset::Utf8 => "utf8",
            Charset::Cp1252 => "cp1252"
        }
    }
}

/// How the binary-to-text stage chooses its global modular byte offset.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum OffsetMode {
    /// Use this offset as is.
    Fixed(u8),
    /// Try all 256 offsets and keep the shortest encoding, smallest offset
    /// winning ties.
    #[default]
    SweepOptimal
}

/// Options for a single encode, built once and passed down the pipeline.
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    reduce_whitespace: bool,
    unix_newline:      bool,
    fix_punct:         bool,
    caps:              CapsMode,
    mtf:               Option<MtfPolicy>,
    vowel_reorder:     bool,
    bin2txt:           Bin2Txt,
    offset:            OffsetMode,
    element_id:        String,
    raw:               bool,
    image:             bool,
    js:                bool,
    uglify:            bool,
    replace_quoted:    bool,
    prevent_grow:      bool,
    lang:              String,
    mobile:            bool,
    title:             String,
    validate:          bool,
    iterations:        u32,
    iterations_large:  u32,
    strip_iend:        bool
}

impl Default for EncodeOptions {
    fn default() -> EncodeOptions {
        EncodeOptions {
            reduce_whitespace: false,
            unix_newline:      true,
            fix_punct:         false,
            caps:              CapsMode::Auto,
            mtf:               Some(MtfPolicy::MoveToFront),
            vowel_reorder:     false,
            bin2txt:           Bin2Txt::CrEnc,
            offset:            OffsetMode::SweepOptimal,
            element_id:        String::new(),
            raw:               false,
            image:             false,
            js:                false,
            uglify:            true,
            replace_quoted:    true,
            prevent_grow:      false,
            lang:              String::from("en"),
            mobile:            false,
            title:             String::new(),
            validate:          false,
            iterations:        15,
            iterations_large:  5,
            strip_iend:        true
        }
    }
}

impl EncodeOptions {
    pub fn new() -> EncodeOptions {
        EncodeOptions::default()
    }

    pub const fn reduce_whitespace(&self) -> bool {
        self.reduce_whitespace
    }

    pub const fn unix_newline(&self) -> bool {
        self.unix_newline
    }

    pub const fn fix_punct(&self) -> bool {
        self.fix_punct
    }

    pub const fn caps(&self) -> CapsMode {
        self.caps
    }

    pub const fn mtf(&self) -> Option<MtfPolicy> {
        self.mtf
    }

    pub const fn vowel_reorder(&self) -> bool {
        self.vowel_reorder
    }

    pub const fn bin2txt(&self) -> Bin2Txt {
        self.bin2txt
    }

    pub const fn offset(&self) -> OffsetMode {
        self.offset
    }

    pub fn element_id(&self) -> &str {
        &self.element_id
    }

    pub const fn raw(&self) -> bool {
        self.raw
    }

    pub const fn image(&self) -> bool {
        self.image
    }

    pub const fn js(&self) -> bool {
        self.js
    }

    pub const fn uglify(&self) -> bool {
        self.uglify
    }

    pub const fn replace_quoted(&self) -> bool {
        self.replace_quoted
    }

    pub const fn prevent_grow(&self) -> bool {
        self.prevent_grow
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub const fn mobile(&self) -> bool {
        self.mobile
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub const fn validate(&self) -> bool {
        self.validate
    }

    pub const fn iterations(&self) -> u32 {
        self.iterations
    }

    pub const fn iterations_large(&self) -> u32 {
        self.iterations_large
    }

    pub const fn strip_iend(&self) -> bool {
        self.strip_iend
    }

    /// The document charset implied by the chosen codec.
    pub const fn charset(&self) -> Charset {
        self.bin2txt.charset()
    }

    pub fn set_reduce_whitespace(mut self, yes: bool) -> Self {
        self.reduce_whitespace = yes;
        self
    }

    pub fn set_unix_newline(mut self, yes: bool) -> Self {
        self.unix_newline = yes;
        self
    }

    pub fn set_fix_punct(mut self, yes: bool) -> Self {
        self.fix_punct = yes;
        self
    }

    pub fn set_caps(mut self, caps: CapsMode) -> Self {
        self.caps = caps;
        self
    }

    pub fn set_mtf(mut self, mtf: Option<MtfPolicy>) -> Self {
        self.mtf = mtf;
        self
    }

    pub fn set_vowel_reorder(mut self, yes: bool) -> Self {
        self.vowel_reorder = yes;
        self
    }

    pub fn set_bin2txt(mut self, bin2txt: Bin2Txt) -> Self {
        self.bin2txt = bin2txt;
        self
    }

    pub fn set_offset(mut self, offset: OffsetMode) -> Self {
        self.offset = offset;
        self
    }

    pub fn set_element_id(mut self, id: &str) -> Self {
        self.element_id = id.to_string();
        self
    }

    pub fn set_raw(mut self, yes: bool) -> Self {
        self.raw = yes;
        self
    }

    pub fn set_image(mut self, yes: bool) -> Self {
        self.image = yes;
        self
    }

    pub fn set_js(mut self, yes: bool) -> Self {
        self.js = yes;
        self
    }

    pub fn set_uglify(mut self, yes: bool) -> Self {
        self.uglify = yes;
        self
    }

    pub fn set_replace_quoted(mut self, yes: bool) -> Self {
        self.replace_quoted = yes;
        self
    }

    pub fn set_prevent_grow(mut self, yes: bool) -> Self {
        self.prevent_grow = yes;
        self
    }

    pub fn set_lang(mut self, lang: &str) -> Self {
        self.lang = lang.to_string();
        self
    }

    pub fn set_mobile(mut self, yes: bool) -> Self {
        self.mobile = yes;
        self
    }

    pub fn set_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn set_validate(mut self, yes: bool) -> Self {
        self.validate = yes;
        self
    }

    pub fn set_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn set_iterations_large(mut self, iterations: u32) -> Self {
        self.iterations_large = iterations;
        self
    }

    pub fn set_strip_iend(mut self, yes: bool) -> Self {
        self.strip_iend = yes;
        self
    }
}

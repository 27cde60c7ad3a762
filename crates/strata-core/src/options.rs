/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Decoder options
//!
//! This module exposes a struct for which all implemented
//! decoders get shared options for decoding.
//!
//! Options specific to one format carry the format name as a prefix,
//! e.g [`psd_set_skip_unknown_channels`](DecoderOptions::psd_set_skip_unknown_channels)

/// Decoder options that are flags
#[derive(Copy, Debug, Clone, Default)]
struct DecoderFlags {
    /// Whether recoverable inconsistencies become errors
    strict_mode:               bool,
    /// Whether the psd decoder ignores channels whose role it
    /// can't composite instead of failing the layer
    psd_skip_unknown_channels: bool
}

/// Command line options, error resilient
///
/// - Do not error out on length mismatches
/// - Skip mask channels instead of failing the layer they belong to
fn cmd_options() -> DecoderFlags {
    DecoderFlags {
        strict_mode:               false,
        psd_skip_unknown_channels: true
    }
}

/// Decoder options
///
/// Not all options are respected by all decoders,
/// each option documents who respects it.
#[derive(Debug, Copy, Clone)]
pub struct DecoderOptions {
    /// Maximum width for which decoders will
    /// not try to decode images larger than
    /// the specified width.
    ///
    /// - Default value: 16384
    /// - Respected by: `all decoders`
    max_width:  usize,
    /// Maximum height for which decoders will not
    /// try to decode images larger than the
    /// specified height
    ///
    /// - Default value: 16384
    /// - Respected by: `all decoders`
    max_height: usize,
    /// Boolean flags that influence decoding
    flags:      DecoderFlags
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            max_width:  1 << 14,
            max_height: 1 << 14,
            flags:      DecoderFlags::default()
        }
    }
}

/// Initializers
impl DecoderOptions {
    /// Create the decoder with options setting every tolerance flag
    /// to its conservative value
    ///
    /// This is the same as `default`
    pub fn new_safe() -> DecoderOptions {
        DecoderOptions::default()
    }

    /// Create the decoder options with the following characteristics
    ///
    /// - Do not treat length mismatches as errors
    /// - Skip channels that can't be composited (e.g. user masks)
    pub fn new_cmd() -> DecoderOptions {
        DecoderOptions::default().set_decoder_flags(cmd_options())
    }
}

/// Global options respected by all decoders
impl DecoderOptions {
    /// Get maximum width configured for which the decoder
    /// should not try to decode images greater than this width
    pub const fn get_max_width(&self) -> usize {
        self.max_width
    }

    /// Get maximum height configured for which the decoder should
    /// not try to decode images greater than this height
    pub const fn get_max_height(&self) -> usize {
        self.max_height
    }

    /// Return true whether the decoder should be in strict mode
    /// And reject recoverable inconsistencies
    pub const fn get_strict_mode(&self) -> bool {
        self.flags.strict_mode
    }

    /// Set maximum width for which the decoder should not try
    /// decoding images greater than that width
    ///
    /// # Arguments
    ///
    /// * `width`:  The maximum width allowed
    ///
    /// returns: DecoderOptions
    pub fn set_max_width(mut self, width: usize) -> Self {
        self.max_width = width;
        self
    }

    /// Set maximum height for which the decoder should not try
    /// decoding images greater than that height
    /// # Arguments
    ///
    /// * `height`: The maximum height allowed
    ///
    /// returns: DecoderOptions
    ///
    pub fn set_max_height(mut self, height: usize) -> Self {
        self.max_height = height;
        self
    }

    /// Set whether the decoder should be in standards conforming/
    /// strict mode
    ///
    /// In the psd decoder this turns declared vs consumed length
    /// mismatches from warnings into errors.
    pub fn set_strict_mode(mut self, yes: bool) -> Self {
        self.flags.strict_mode = yes;
        self
    }

    fn set_decoder_flags(mut self, flags: DecoderFlags) -> Self {
        self.flags = flags;
        self
    }
}

/// PSD specific options
impl DecoderOptions {
    /// Whether channels with a role other than red, green, blue or
    /// transparency are skipped rather than failing their layer
    ///
    /// - Default value: false
    pub const fn psd_get_skip_unknown_channels(&self) -> bool {
        self.flags.psd_skip_unknown_channels
    }

    /// Set whether channels with a role other than red, green, blue or
    /// transparency (user and vector masks) are skipped
    pub fn psd_set_skip_unknown_channels(mut self, yes: bool) -> Self {
        self.flags.psd_skip_unknown_channels = yes;
        self
    }
}

/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Image bit depth, information and manipulations

/// The bit depth of a single channel sample.
///
/// Layered documents declare one depth for every channel
/// in the file, the decoders here only reconstruct pixels for
/// [`BitDepth::Eight`] but can still walk the structure of the others.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
#[non_exhaustive]
pub enum BitDepth {
    /// One bit per sample, eight samples packed per byte
    One,
    /// Eight bit depth.
    ///
    /// Samples are stored in a [`u8`] and use the whole range from 0-255.
    Eight,
    /// Sixteen bit depth
    ///
    /// Samples are stored big endian on the wire
    Sixteen,
    /// Thirty two bit depth, samples are IEEE floats
    ThirtyTwo,
    /// Bit depth information is unknown
    #[default]
    Unknown
}

impl BitDepth {
    /// Map a declared bits-per-sample value to a depth
    ///
    /// Unrecognised values return [`BitDepth::Unknown`]
    pub const fn from_bits(bits: u16) -> BitDepth {
        match bits {
            1 => BitDepth::One,
            8 => BitDepth::Eight,
            16 => BitDepth::Sixteen,
            32 => BitDepth::ThirtyTwo,
            _ => BitDepth::Unknown
        }
    }

    /// Number of bits a single sample occupies, zero if unknown
    pub const fn bit_size(self) -> usize {
        match self {
            BitDepth::One => 1,
            BitDepth::Eight => 8,
            BitDepth::Sixteen => 16,
            BitDepth::ThirtyTwo => 32,
            BitDepth::Unknown => 0
        }
    }

    /// Number of whole bytes needed to store one row of `width` samples
    pub const fn row_bytes(self, width: usize) -> usize {
        (width * self.bit_size() + 7) / 8
    }
}

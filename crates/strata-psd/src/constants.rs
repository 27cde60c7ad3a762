/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

#![allow(clippy::upper_case_acronyms)]

/// `8BPS`, start of every document
pub const PSD_IDENTIFIER_BE: u32 = 0x3842_5053;
/// `8BIM`, signature of layer records and additional info blocks
pub const PSD_8BIM_BE: u32 = 0x3842_494D;
/// `8B64`, signature of additional info blocks in large documents
pub const PSD_8B64_BE: u32 = 0x3842_3634;

/// The only document version this decoder understands
pub const PSD_VERSION: u16 = 1;

/// Size of the fixed file header in bytes
pub const HEADER_SIZE: u64 = 26;

/// Fixed bytes of a layer record, i.e everything but the channel table and extra data.
///
/// bounds (16) + channel count (2) + signature (4) + blend key (4)
/// + opacity, clipping, flags, filler (4) + extra data length (4)
pub const LAYER_RECORD_FIXED_SIZE: u64 = 34;
/// One (channel id, data length) pair in a layer record
pub const CHANNEL_INFO_SIZE: u64 = 6;

/// Fields of the global layer mask after its length
pub const GLOBAL_MASK_FIELDS_SIZE: u32 = 13;

/// signature + key + length of an additional layer info block
pub const ADDITIONAL_INFO_HEADER_SIZE: u64 = 12;
/// Additional info blocks are padded to this alignment
pub const ADDITIONAL_INFO_ALIGNMENT: u64 = 4;

/// Render a four character code the way it appears in a hex dump
pub fn fourcc(value: u32) -> [char; 4] {
    value.to_be_bytes().map(|b| {
        if b.is_ascii_graphic() || b == b' ' {
            char::from(b)
        } else {
            '.'
        }
    })
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ColorModes {
    Bitmap = 0,
    Grayscale = 1,
    IndexedColor = 2,
    RGB = 3,
    CYMK = 4,
    MultiChannel = 7,
    DuoTone = 8,
    LabColor = 9
}

impl ColorModes {
    pub fn from_int(int: u16) -> Option<ColorModes> {
        use crate::constants::ColorModes::{
            Bitmap, DuoTone, Grayscale, IndexedColor, LabColor, MultiChannel, CYMK, RGB
        };

        match int {
            0 => Some(Bitmap),
            1 => Some(Grayscale),
            2 => Some(IndexedColor),
            3 => Some(RGB),
            4 => Some(CYMK),
            7 => Some(MultiChannel),
            8 => Some(DuoTone),
            9 => Some(LabColor),
            _ => None
        }
    }
}

/// Compression tag preceding every channel's data
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum CompressionMethod {
    NoCompression = 0,
    RLE = 1,
    /// Recognised but not decoded
    Zip = 2,
    /// Recognised but not decoded
    ZipPrediction = 3
}

impl CompressionMethod {
    pub fn from_int(int: u16) -> Option<CompressionMethod> {
        match int {
            0 => Some(Self::NoCompression),
            1 => Some(Self::RLE),
            2 => Some(Self::Zip),
            3 => Some(Self::ZipPrediction),
            _ => None
        }
    }
}

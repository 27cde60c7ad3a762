/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Additional layer information blocks
//!
//! A region made of `signature, key, length, payload` blocks. Payloads are
//! skipped, only the framing is decoded.
//!
//! Blocks are padded to 4 bytes. Some references describe 2 byte padding, but
//! offsets written by Photoshop only line up with 4, keep that in mind when
//! reading files from other producers.
use alloc::vec::Vec;

use strata_core::bytestream::{ZByteReaderTrait, ZReader};
use strata_core::log::warn;

use crate::constants::{
    fourcc, ADDITIONAL_INFO_ALIGNMENT, ADDITIONAL_INFO_HEADER_SIZE, PSD_8B64_BE, PSD_8BIM_BE
};
use crate::diagnostics::{DecodeEvent, DiagnosticSink};
use crate::errors::PSDDecodeErrors;

/// Framing of one additional info block
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AdditionalInfoBlock {
    /// Offset of the signature
    pub offset:    u64,
    /// `8BIM` or `8B64`
    pub signature: u32,
    /// Four character code naming the payload, e.g `luni` for unicode names
    pub key:       u32,
    /// Payload length, without padding
    pub length:    u32
}

impl AdditionalInfoBlock {
    /// The key as characters
    pub fn key_chars(&self) -> [char; 4] {
        fourcc(self.key)
    }

    /// Bytes the block occupies on the wire, header and padding included
    pub fn size_on_wire(&self) -> u64 {
        ADDITIONAL_INFO_HEADER_SIZE + u64::from(self.length) + padding_for(self.length)
    }
}

/// Bytes needed after a payload of `length` bytes to reach 4 byte alignment
pub const fn padding_for(length: u32) -> u64 {
    let rem = length as u64 % ADDITIONAL_INFO_ALIGNMENT;
    (ADDITIONAL_INFO_ALIGNMENT - rem) % ADDITIONAL_INFO_ALIGNMENT
}

/// Walk `budget` bytes of additional info blocks.
///
/// On success exactly `budget` bytes have been consumed from `stream`.
///
/// # Errors
/// - `TruncatedRegion`: fewer than 12 bytes are left but not zero
/// - `CorruptBlock`: a block signature isn't `8BIM` or `8B64`
/// - `OverrunRegion`: a payload is longer than what is left of the budget
pub fn scan_additional_info<T, S>(
    stream: &mut ZReader<T>, budget: u64, sink: &mut S
) -> Result<Vec<AdditionalInfoBlock>, PSDDecodeErrors>
where
    T: ZByteReaderTrait,
    S: DiagnosticSink
{
    let mut blocks = Vec::new();
    let mut remaining = budget;

    while remaining > 0 {
        let offset = stream.position();

        if remaining < ADDITIONAL_INFO_HEADER_SIZE {
            return Err(PSDDecodeErrors::TruncatedRegion { offset, remaining });
        }
        let signature = stream.get_u32_be_err()?;

        if signature != PSD_8BIM_BE && signature != PSD_8B64_BE {
            return Err(PSDDecodeErrors::CorruptBlock { offset, signature });
        }
        let key = stream.get_u32_be_err()?;
        let length = stream.get_u32_be_err()?;
        remaining -= ADDITIONAL_INFO_HEADER_SIZE;

        if u64::from(length) > remaining {
            return Err(PSDDecodeErrors::OverrunRegion {
                offset,
                declared: ADDITIONAL_INFO_HEADER_SIZE + u64::from(length),
                remaining: remaining + ADDITIONAL_INFO_HEADER_SIZE
            });
        }
        let mut padding = padding_for(length);

        if u64::from(length) + padding > remaining {
            // last block of the region written without its padding
            warn!(
                "Additional info block {:?} at 0x{offset:x} is missing its padding",
                fourcc(key)
            );
            padding = remaining - u64::from(length);
        }
        stream.skip(u64::from(length) + padding)?;
        remaining -= u64::from(length) + padding;

        let block = AdditionalInfoBlock {
            offset,
            signature,
            key,
            length
        };
        sink.on_event(&DecodeEvent::AdditionalInfoBlock {
            offset,
            signature,
            key,
            length
        });
        blocks.push(block);
    }
    Ok(blocks)
}

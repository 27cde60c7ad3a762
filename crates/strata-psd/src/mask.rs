/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Global layer mask info
use strata_core::bytestream::{ZByteReaderTrait, ZReader};

use crate::constants::GLOBAL_MASK_FIELDS_SIZE;
use crate::errors::PSDDecodeErrors;

/// Document wide mask settings that follow the layer info
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GlobalLayerMaskInfo {
    /// Declared length of the block
    pub length:              u32,
    pub overlay_color_space: u16,
    pub color_components:    [u16; 4],
    /// 0 is transparent, 100 opaque
    pub opacity:             u16,
    /// 0 color selected, 1 color protected, 128 use value stored per layer
    pub kind:                u8
}

impl GlobalLayerMaskInfo {
    /// Decode the block, `None` when its length is zero.
    ///
    /// `budget` is what is left of the enclosing region, the length field
    /// included. Anything past the known fields is skipped.
    ///
    /// # Errors
    /// `OverrunRegion` if the block doesn't fit `budget` or is too
    /// short to hold its own fields
    pub fn decode<T: ZByteReaderTrait>(
        stream: &mut ZReader<T>, budget: u64
    ) -> Result<Option<GlobalLayerMaskInfo>, PSDDecodeErrors> {
        let offset = stream.position();
        let length = stream.get_u32_be_err()?;

        if 4 + u64::from(length) > budget {
            return Err(PSDDecodeErrors::OverrunRegion {
                offset,
                declared: 4 + u64::from(length),
                remaining: budget
            });
        }
        if length == 0 {
            return Ok(None);
        }
        let Some(filler) = length.checked_sub(GLOBAL_MASK_FIELDS_SIZE) else {
            return Err(PSDDecodeErrors::OverrunRegion {
                offset,
                declared: u64::from(GLOBAL_MASK_FIELDS_SIZE),
                remaining: u64::from(length)
            });
        };

        let overlay_color_space = stream.get_u16_be_err()?;
        let mut color_components = [0; 4];

        for component in &mut color_components {
            *component = stream.get_u16_be_err()?;
        }
        let opacity = stream.get_u16_be_err()?;
        let kind = stream.get_u8_err()?;

        stream.skip(u64::from(filler))?;

        Ok(Some(GlobalLayerMaskInfo {
            length,
            overlay_color_space,
            color_components,
            opacity,
            kind
        }))
    }

    /// Bytes the block occupies including its length field
    pub const fn size_on_wire(&self) -> u64 {
        4 + self.length as u64
    }
}

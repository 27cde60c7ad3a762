/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The fixed 26 byte file header
use strata_core::bit_depth::BitDepth;
use strata_core::bytestream::{ZByteReaderTrait, ZByteWriter, ZReader};

use crate::constants::{ColorModes, PSD_IDENTIFIER_BE, PSD_VERSION};
use crate::errors::PSDDecodeErrors;

/// Document header
///
/// Only the signature and version are validated, the channel count,
/// depth and color mode constrain later steps.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FileHeader {
    pub signature:  u32,
    pub version:    u16,
    /// Channels of the merged image, including alpha channels
    pub channels:   u16,
    pub height:     u32,
    pub width:      u32,
    /// Bits per channel sample
    pub depth:      u16,
    pub color_mode: u16
}

impl FileHeader {
    /// A header for an 8 bit RGB document with an alpha channel
    pub const fn new_rgba(width: u32, height: u32) -> FileHeader {
        FileHeader {
            signature: PSD_IDENTIFIER_BE,
            version: PSD_VERSION,
            channels: 4,
            height,
            width,
            depth: 8,
            color_mode: ColorModes::RGB as u16
        }
    }

    /// Read the header, failing before anything else is read if the
    /// signature or version don't match
    pub fn decode<T: ZByteReaderTrait>(
        stream: &mut ZReader<T>
    ) -> Result<FileHeader, PSDDecodeErrors> {
        let offset = stream.position();
        let signature = stream.get_u32_be_err()?;

        if signature != PSD_IDENTIFIER_BE {
            return Err(PSDDecodeErrors::WrongMagicBytes {
                offset,
                found: signature
            });
        }

        let offset = stream.position();
        let version = stream.get_u16_be_err()?;

        if version != PSD_VERSION {
            return Err(PSDDecodeErrors::UnsupportedVersion {
                offset,
                found: version
            });
        }
        // Skip 6 reserved bytes
        stream.skip(6)?;

        let channels = stream.get_u16_be_err()?;
        let height = stream.get_u32_be_err()?;
        let width = stream.get_u32_be_err()?;
        let depth = stream.get_u16_be_err()?;
        let color_mode = stream.get_u16_be_err()?;

        Ok(FileHeader {
            signature,
            version,
            channels,
            height,
            width,
            depth,
            color_mode
        })
    }

    /// Write the header in wire order, reserved bytes are zero
    pub fn encode(&self, writer: &mut ZByteWriter) {
        writer.write_u32_be(self.signature);
        writer.write_u16_be(self.version);
        writer.write_zeros(6);
        writer.write_u16_be(self.channels);
        writer.write_u32_be(self.height);
        writer.write_u32_be(self.width);
        writer.write_u16_be(self.depth);
        writer.write_u16_be(self.color_mode);
    }

    /// The color mode, or `None` for values the format doesn't define
    pub fn color_mode(&self) -> Option<ColorModes> {
        ColorModes::from_int(self.color_mode)
    }

    pub const fn bit_depth(&self) -> BitDepth {
        BitDepth::from_bits(self.depth)
    }
}

#[cfg(test)]
mod tests {
    use strata_core::bit_depth::BitDepth;
    use strata_core::bytestream::{ZByteWriter, ZCursor, ZReader};

    use crate::constants::{ColorModes, HEADER_SIZE};
    use crate::errors::PSDDecodeErrors;
    use crate::header::FileHeader;

    fn encoded(header: &FileHeader) -> alloc::vec::Vec<u8> {
        let mut writer = ZByteWriter::new();
        header.encode(&mut writer);
        writer.into_inner()
    }

    #[test]
    fn header_round_trips() {
        let header = FileHeader {
            channels: 3,
            depth: 16,
            color_mode: ColorModes::Grayscale as u16,
            ..FileHeader::new_rgba(640, 480)
        };
        let bytes = encoded(&header);
        assert_eq!(bytes.len() as u64, HEADER_SIZE);

        let mut reader = ZReader::new(ZCursor::new(&bytes));
        let decoded = FileHeader::decode(&mut reader).unwrap();

        assert_eq!(decoded, header);
        assert_eq!(reader.position(), HEADER_SIZE);
        assert_eq!(decoded.bit_depth(), BitDepth::Sixteen);
        assert_eq!(decoded.color_mode(), Some(ColorModes::Grayscale));
    }

    #[test]
    fn wrong_signature_stops_after_four_bytes() {
        let mut bytes = encoded(&FileHeader::new_rgba(2, 2));
        bytes[3] = b'X';

        let mut reader = ZReader::new(ZCursor::new(&bytes));
        let err = FileHeader::decode(&mut reader).unwrap_err();

        assert!(matches!(err, PSDDecodeErrors::WrongMagicBytes { offset: 0, .. }));
        assert_eq!(reader.position(), 4);
    }

    #[test]
    fn version_two_is_rejected() {
        let header = FileHeader {
            version: 2,
            ..FileHeader::new_rgba(2, 2)
        };
        let bytes = encoded(&header);
        let err = FileHeader::decode(&mut ZReader::new(ZCursor::new(&bytes))).unwrap_err();

        assert!(matches!(
            err,
            PSDDecodeErrors::UnsupportedVersion { offset: 4, found: 2 }
        ));
    }

    #[test]
    fn short_header_is_end_of_stream() {
        let bytes = encoded(&FileHeader::new_rgba(2, 2));
        let err = FileHeader::decode(&mut ZReader::new(ZCursor::new(&bytes[..20]))).unwrap_err();

        assert!(matches!(err, PSDDecodeErrors::EndOfStream { offset: 18, .. }));
    }
}

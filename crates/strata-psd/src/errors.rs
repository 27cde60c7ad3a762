/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use core::fmt::{Debug, Display, Formatter};

use strata_core::bytestream::ZByteIoError;

use crate::constants::{fourcc, PSD_IDENTIFIER_BE};
use crate::diagnostics::Section;

/// How much of the decode an error invalidates
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Severity {
    /// The document pass can't continue
    Document,
    /// Only the layer being decoded is lost, the cursor
    /// is still at a known position
    Layer
}

/// PSDDecodeErrors that can occur during PSD decoding
///
/// Every variant carries the absolute byte offset at which the problem
/// was detected, for errors found while decoding extracted channel data
/// that is the offset of the byte inside the document.
pub enum PSDDecodeErrors {
    /// The document does not start with `8BPS`
    WrongMagicBytes { offset: u64, found: u32 },
    /// The header version is not 1
    UnsupportedVersion { offset: u64, found: u16 },
    /// A field or region needed more bytes than the source holds
    EndOfStream {
        offset:    u64,
        requested: u64,
        available: u64
    },
    /// A compressed stream ended before its row length table was satisfied
    TruncatedStream {
        offset:    u64,
        requested: usize,
        available: usize
    },
    /// A layer record lost synchronisation or describes impossible geometry
    CorruptLayerRecord { offset: u64, reason: &'static str },
    /// An additional info block does not start with a recognised signature
    CorruptBlock { offset: u64, signature: u32 },
    /// Bytes are left in a region but too few to hold a block header
    TruncatedRegion { offset: u64, remaining: u64 },
    /// A declared length runs past the end of its enclosing region
    OverrunRegion {
        offset:    u64,
        declared:  u64,
        remaining: u64
    },
    /// A run would write past the end of its row
    RunOverflow {
        offset: u64,
        row:    usize,
        end:    usize,
        width:  usize
    },
    /// A decoded plane is smaller than the layer it should cover
    ChannelUnderrun {
        offset:    u64,
        expected:  usize,
        available: usize
    },
    /// A channel id the compositor has no slot for
    UnknownChannelRole { offset: u64, role: i16 },
    /// A compression tag we recognise (ZIP) or don't recognise at all
    UnsupportedCompression { offset: u64, method: u16 },
    /// Layer pixels are only reconstructed for 8 bit documents
    UnsupportedBitDepth { offset: u64, depth: u16 },
    /// Layer dimensions exceed the configured limits
    LargeDimensions {
        offset:    u64,
        supported: usize,
        found:     usize
    },
    /// Declared and consumed byte counts disagree, only raised in strict mode
    LengthMismatch {
        offset:   u64,
        section:  Section,
        declared: u64,
        consumed: u64
    },
    /// The underlying source failed
    Io(ZByteIoError),
    /// Misuse of the decoder, e.g decoding layers twice
    Generic(&'static str)
}

impl PSDDecodeErrors {
    /// Byte offset at which the error was detected
    ///
    /// `None` only for failures of the underlying source that
    /// don't know where they happened.
    pub fn offset(&self) -> Option<u64> {
        match self {
            Self::WrongMagicBytes { offset, .. }
            | Self::UnsupportedVersion { offset, .. }
            | Self::EndOfStream { offset, .. }
            | Self::TruncatedStream { offset, .. }
            | Self::CorruptLayerRecord { offset, .. }
            | Self::CorruptBlock { offset, .. }
            | Self::TruncatedRegion { offset, .. }
            | Self::OverrunRegion { offset, .. }
            | Self::RunOverflow { offset, .. }
            | Self::ChannelUnderrun { offset, .. }
            | Self::UnknownChannelRole { offset, .. }
            | Self::UnsupportedCompression { offset, .. }
            | Self::UnsupportedBitDepth { offset, .. }
            | Self::LargeDimensions { offset, .. }
            | Self::LengthMismatch { offset, .. } => Some(*offset),
            Self::Io(_) | Self::Generic(_) => None
        }
    }

    /// Whether the error ends the document pass or just the current layer
    pub fn severity(&self) -> Severity {
        match self {
            Self::TruncatedStream { .. }
            | Self::RunOverflow { .. }
            | Self::ChannelUnderrun { .. }
            | Self::UnknownChannelRole { .. }
            | Self::UnsupportedCompression { .. }
            | Self::UnsupportedBitDepth { .. }
            | Self::LargeDimensions { .. } => Severity::Layer,
            Self::LengthMismatch {
                section: Section::ChannelImageData,
                ..
            } => Severity::Layer,
            _ => Severity::Document
        }
    }
}

impl Debug for PSDDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            PSDDecodeErrors::WrongMagicBytes { offset, found } => {
                writeln!(
                    f,
                    "Expected {:?} but found {:?} at offset {offset}, not a PSD image",
                    fourcc(PSD_IDENTIFIER_BE),
                    fourcc(*found)
                )
            }
            PSDDecodeErrors::UnsupportedVersion { offset, found } => {
                writeln!(
                    f,
                    "Unsupported file version {found:?} at offset {offset}, known versions are 1"
                )
            }
            PSDDecodeErrors::EndOfStream {
                offset,
                requested,
                available
            } => {
                writeln!(
                    f,
                    "Unexpected end of stream at offset {offset}, needed {requested} bytes but only {available} remain"
                )
            }
            PSDDecodeErrors::TruncatedStream {
                offset,
                requested,
                available
            } => {
                writeln!(
                    f,
                    "Truncated compressed stream at offset {offset}, row needs {requested} bytes but {available} remain"
                )
            }
            PSDDecodeErrors::CorruptLayerRecord { offset, reason } => {
                writeln!(f, "Corrupt layer record at offset {offset}: {reason}")
            }
            PSDDecodeErrors::CorruptBlock { offset, signature } => {
                writeln!(
                    f,
                    "Corrupt additional info block at offset {offset}, unknown signature {:?}",
                    fourcc(*signature)
                )
            }
            PSDDecodeErrors::TruncatedRegion { offset, remaining } => {
                writeln!(
                    f,
                    "Region truncated at offset {offset}, {remaining} bytes left can't hold a block header"
                )
            }
            PSDDecodeErrors::OverrunRegion {
                offset,
                declared,
                remaining
            } => {
                writeln!(
                    f,
                    "Length {declared} at offset {offset} overruns its region, only {remaining} bytes remain"
                )
            }
            PSDDecodeErrors::RunOverflow {
                offset,
                row,
                end,
                width
            } => {
                writeln!(
                    f,
                    "Bad RLE at offset {offset}, run in row {row} ends at {end} past row width {width}"
                )
            }
            PSDDecodeErrors::ChannelUnderrun {
                offset,
                expected,
                available
            } => {
                writeln!(
                    f,
                    "Channel at offset {offset} has {available} samples but the layer needs {expected}"
                )
            }
            PSDDecodeErrors::UnknownChannelRole { offset, role } => {
                writeln!(f, "Unknown channel role {role} at offset {offset}")
            }
            PSDDecodeErrors::UnsupportedCompression { offset, method } => {
                writeln!(
                    f,
                    "Unsupported compression method {method} at offset {offset}, supported methods are raw(0) and RLE(1)"
                )
            }
            PSDDecodeErrors::UnsupportedBitDepth { offset, depth } => {
                writeln!(
                    f,
                    "Unsupported bit depth {depth:?} for layer at offset {offset}, supported depth is 8"
                )
            }
            PSDDecodeErrors::LargeDimensions {
                offset,
                supported,
                found
            } => {
                writeln!(
                    f,
                    "Too large dimensions for layer at offset {offset}, supported {supported} but found {found}",
                )
            }
            PSDDecodeErrors::LengthMismatch {
                offset,
                section,
                declared,
                consumed
            } => {
                writeln!(
                    f,
                    "{section:?} ending at offset {offset} declared {declared} bytes but {consumed} were consumed"
                )
            }
            PSDDecodeErrors::Io(e) => {
                writeln!(f, "I/O error :{:?}", e)
            }
            PSDDecodeErrors::Generic(reason) => {
                writeln!(f, "{reason}")
            }
        }
    }
}

impl Display for PSDDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PSDDecodeErrors {}

impl From<ZByteIoError> for PSDDecodeErrors {
    fn from(r: ZByteIoError) -> Self {
        match r {
            ZByteIoError::EndOfStream {
                offset,
                requested,
                available
            } => Self::EndOfStream {
                offset,
                requested,
                available
            },
            e => Self::Io(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use strata_core::bytestream::ZByteIoError;

    use crate::diagnostics::Section;
    use crate::errors::{PSDDecodeErrors, Severity};

    #[test]
    fn end_of_stream_keeps_offset() {
        let err = PSDDecodeErrors::from(ZByteIoError::EndOfStream {
            offset:    12,
            requested: 4,
            available: 1
        });
        assert_eq!(err.offset(), Some(12));
        assert_eq!(err.severity(), Severity::Document);
    }

    #[test]
    fn pixel_errors_only_fail_the_layer() {
        let err = PSDDecodeErrors::RunOverflow {
            offset: 5,
            row:    0,
            end:    9,
            width:  8
        };
        assert_eq!(err.severity(), Severity::Layer);

        let channel = PSDDecodeErrors::LengthMismatch {
            offset:   0,
            section:  Section::ChannelImageData,
            declared: 4,
            consumed: 3
        };
        let layer_info = PSDDecodeErrors::LengthMismatch {
            offset:   0,
            section:  Section::LayerInfo,
            declared: 4,
            consumed: 3
        };
        assert_eq!(channel.severity(), Severity::Layer);
        assert_eq!(layer_info.severity(), Severity::Document);
    }

    #[test]
    fn messages_name_the_offset() {
        let err = PSDDecodeErrors::WrongMagicBytes {
            offset: 0,
            found:  0x3842_5058
        };
        let message = err.to_string();

        assert!(message.contains("8BPX") || message.contains("'X'"));
        assert!(message.contains("offset 0"));
    }
}

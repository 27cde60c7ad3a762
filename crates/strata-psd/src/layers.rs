/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Layer records and the layer directory
//!
//! The directory is everything in the layer info section before the
//! channel image data, a signed layer count followed by one record per
//! layer. Records are kept in file order, which is bottom most layer first.
use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;

use strata_core::bytestream::{ZByteReaderTrait, ZCursor, ZReader};
use strata_core::log::warn;

use crate::additional::{scan_additional_info, AdditionalInfoBlock};
use crate::constants::{fourcc, CHANNEL_INFO_SIZE, LAYER_RECORD_FIXED_SIZE, PSD_8BIM_BE};
use crate::diagnostics::{DecodeEvent, DiagnosticSink, NoopSink, Section};
use crate::errors::PSDDecodeErrors;

/// Layer count as stored in the layer info section
///
/// A negative count on disk means the first alpha channel holds the
/// transparency of the merged result, the magnitude is the number of records.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LayerCount {
    pub count:                 u16,
    pub transparent_composite: bool
}

impl LayerCount {
    pub const fn from_raw(raw: i16) -> LayerCount {
        LayerCount {
            count:                 raw.unsigned_abs(),
            transparent_composite: raw < 0
        }
    }
}

/// Rectangle a layer covers on the canvas
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LayerBounds {
    pub top:    i32,
    pub left:   i32,
    pub bottom: i32,
    pub right:  i32
}

impl LayerBounds {
    pub fn width(&self) -> usize {
        usize::try_from(i64::from(self.right) - i64::from(self.left)).unwrap_or(0)
    }

    pub fn height(&self) -> usize {
        usize::try_from(i64::from(self.bottom) - i64::from(self.top)).unwrap_or(0)
    }

    fn is_valid(&self) -> bool {
        self.right >= self.left && self.bottom >= self.top
    }
}

/// Id and data length of one channel of a layer
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ChannelDescriptor {
    /// `-1` transparency, `0..=2` RGB, `-2` and `-3` user masks
    pub id:     i16,
    /// Bytes of channel image data including the 2 byte compression tag
    pub length: u32
}

/// Everything known about a layer before its pixels are read
#[derive(Debug, Clone, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LayerRecord {
    /// Offset of the first byte of the record
    pub offset:          u64,
    pub bounds:          LayerBounds,
    pub channels:        Vec<ChannelDescriptor>,
    pub blend_mode:      u32,
    pub opacity:         u8,
    pub clipping:        u8,
    pub flags:           u8,
    pub filler:          u8,
    pub extra_len:       u32,
    /// Pascal name as stored, usually MacRoman
    pub name:            Vec<u8>,
    /// Blocks found in the extra data after the name
    pub additional_info: Vec<AdditionalInfoBlock>
}

impl LayerRecord {
    /// Parse one record, leaving the stream just past its extra data.
    ///
    /// Extra data is read in full and picked apart leniently, failures
    /// there are logged and leave `name`/`additional_info` as far as they got.
    ///
    /// # Errors
    /// - `CorruptLayerRecord`: the blend signature isn't `8BIM`, or the
    ///   bounds have negative extent
    /// - `EndOfStream`: the source ends inside the record
    pub fn decode<T: ZByteReaderTrait>(
        stream: &mut ZReader<T>
    ) -> Result<LayerRecord, PSDDecodeErrors> {
        let offset = stream.position();

        let bounds = LayerBounds {
            top:    stream.get_i32_be_err()?,
            left:   stream.get_i32_be_err()?,
            bottom: stream.get_i32_be_err()?,
            right:  stream.get_i32_be_err()?
        };
        let channel_count = stream.get_u16_be_err()?;
        let mut channels = Vec::with_capacity(usize::from(channel_count));

        for _ in 0..channel_count {
            let id = stream.get_i16_be_err()?;
            let length = stream.get_u32_be_err()?;
            channels.push(ChannelDescriptor { id, length });
        }

        let signature_offset = stream.position();
        let signature = stream.get_u32_be_err()?;

        if signature != PSD_8BIM_BE {
            warn!(
                "Expected 8BIM at 0x{signature_offset:x} but found {:?}",
                fourcc(signature)
            );
            return Err(PSDDecodeErrors::CorruptLayerRecord {
                offset: signature_offset,
                reason: "blend mode signature is not 8BIM"
            });
        }
        let blend_mode = stream.get_u32_be_err()?;
        let opacity = stream.get_u8_err()?;
        let clipping = stream.get_u8_err()?;
        let flags = stream.get_u8_err()?;
        let filler = stream.get_u8_err()?;

        let extra_offset = stream.position();
        let extra_len = stream.get_u32_be_err()?;
        let extra = stream.read_bytes_vec(extra_len as usize)?;

        if !bounds.is_valid() {
            return Err(PSDDecodeErrors::CorruptLayerRecord {
                offset,
                reason: "layer bounds have negative width or height"
            });
        }
        let mut record = LayerRecord {
            offset,
            bounds,
            channels,
            blend_mode,
            opacity,
            clipping,
            flags,
            filler,
            extra_len,
            name: Vec::new(),
            additional_info: Vec::new()
        };
        if let Err(e) = record.parse_extra_data(&extra, extra_offset + 4) {
            warn!("Could not parse extra data of layer at 0x{offset:x}: {e}");
        }
        Ok(record)
    }

    /// Mask data, blending ranges, the padded name then additional info blocks
    fn parse_extra_data(&mut self, extra: &[u8], origin: u64) -> Result<(), PSDDecodeErrors> {
        let mut stream = ZReader::with_origin(ZCursor::new(extra), origin);

        let mask_len = stream.get_u32_be_err()?;
        stream.skip(u64::from(mask_len))?;

        let blending_ranges_len = stream.get_u32_be_err()?;
        stream.skip(u64::from(blending_ranges_len))?;

        let name_len = stream.get_u8_err()?;
        self.name = stream.read_bytes_vec(usize::from(name_len))?;
        // length byte + name is padded to 4
        let padding = (4 - (1 + u64::from(name_len)) % 4) % 4;
        stream.skip(padding)?;

        let remaining = stream.remaining()?;
        self.additional_info = scan_additional_info(&mut stream, remaining, &mut NoopSink)?;

        Ok(())
    }

    /// Bytes the record occupies in the layer info section
    pub fn size_on_wire(&self) -> u64 {
        LAYER_RECORD_FIXED_SIZE
            + CHANNEL_INFO_SIZE * self.channels.len() as u64
            + u64::from(self.extra_len)
    }

    /// Sum of the declared lengths of every channel of this layer
    pub fn channel_data_len(&self) -> u64 {
        self.channels.iter().map(|c| u64::from(c.length)).sum()
    }

    pub fn width(&self) -> usize {
        self.bounds.width()
    }

    pub fn height(&self) -> usize {
        self.bounds.height()
    }

    /// Bit 1 of the flags hides the layer
    pub const fn is_visible(&self) -> bool {
        self.flags & 0b10 == 0
    }

    /// Layer name, invalid UTF-8 replaced
    pub fn name_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }
}

/// The layer and mask info envelope plus every layer record
#[derive(Debug, Clone, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LayerDirectory {
    /// Offset of the layer and mask info length field
    pub layer_and_mask_offset: u64,
    pub layer_and_mask_len:    u32,
    /// Offset of the layer info length field
    pub layer_info_offset:     u64,
    pub layer_info_len:        u32,
    pub count:                 LayerCount,
    pub records:               Vec<LayerRecord>,
    /// Bytes of layer info read so far, the count field plus every record
    pub consumed:              u64
}

impl LayerDirectory {
    /// Parse the envelope lengths, the layer count and every record.
    ///
    /// A zero layer and mask length means there are no layers and nothing
    /// else is read, a zero layer info length means the count field is absent.
    pub fn decode<T, S>(
        stream: &mut ZReader<T>, sink: &mut S
    ) -> Result<LayerDirectory, PSDDecodeErrors>
    where
        T: ZByteReaderTrait,
        S: DiagnosticSink
    {
        let layer_and_mask_offset = stream.position();
        let layer_and_mask_len = stream.get_u32_be_err()?;

        sink.on_event(&DecodeEvent::SectionEntered {
            section: Section::LayerAndMaskInfo,
            offset:  layer_and_mask_offset,
            length:  u64::from(layer_and_mask_len)
        });

        let mut directory = LayerDirectory {
            layer_and_mask_offset,
            layer_and_mask_len,
            layer_info_offset: layer_and_mask_offset + 4,
            ..LayerDirectory::default()
        };
        if layer_and_mask_len == 0 {
            return Ok(directory);
        }

        directory.layer_info_len = stream.get_u32_be_err()?;

        sink.on_event(&DecodeEvent::SectionEntered {
            section: Section::LayerInfo,
            offset:  directory.layer_info_offset,
            length:  u64::from(directory.layer_info_len)
        });

        if u64::from(directory.layer_info_len) + 4 > u64::from(layer_and_mask_len) {
            return Err(PSDDecodeErrors::OverrunRegion {
                offset:    directory.layer_info_offset,
                declared:  u64::from(directory.layer_info_len) + 4,
                remaining: u64::from(layer_and_mask_len)
            });
        }
        if directory.layer_info_len == 0 {
            return Ok(directory);
        }

        directory.count = LayerCount::from_raw(stream.get_i16_be_err()?);
        directory.consumed = 2;

        sink.on_event(&DecodeEvent::LayerCountDecoded {
            count:                 directory.count.count,
            transparent_composite: directory.count.transparent_composite
        });

        directory.records.reserve(usize::from(directory.count.count));

        for index in 0..usize::from(directory.count.count) {
            let record = LayerRecord::decode(stream)?;

            sink.on_event(&DecodeEvent::LayerRecordParsed {
                index,
                offset: record.offset,
                channels: record.channels.len(),
                extra: record.extra_len
            });
            directory.consumed += record.size_on_wire();
            directory.records.push(record);
        }
        Ok(directory)
    }

    /// Offset one past the layer and mask info section
    pub const fn layer_and_mask_end(&self) -> u64 {
        self.layer_and_mask_offset + 4 + self.layer_and_mask_len as u64
    }

    /// Offset one past the layer info section as declared
    pub const fn layer_info_end(&self) -> u64 {
        self.layer_info_offset + 4 + self.layer_info_len as u64
    }

    /// Sum of the channel data lengths of every layer
    pub fn channel_data_len(&self) -> u64 {
        self.records.iter().map(LayerRecord::channel_data_len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use strata_core::bytestream::{ZByteWriter, ZCursor, ZReader};

    use crate::diagnostics::{EventLog, NoopSink};
    use crate::errors::PSDDecodeErrors;
    use crate::layers::{LayerCount, LayerDirectory, LayerRecord};

    fn write_record(
        writer: &mut ZByteWriter, channels: &[(i16, u32)], declared: u16, extra: &[u8]
    ) {
        for v in [0, 0, 2, 3] {
            writer.write_i32_be(v);
        }
        writer.write_u16_be(declared);
        for (id, len) in channels {
            writer.write_i16_be(*id);
            writer.write_u32_be(*len);
        }
        writer.write_all(b"8BIM");
        writer.write_all(b"norm");
        writer.write_all(&[255, 0, 0, 0]);
        writer.write_u32_be(extra.len() as u32);
        writer.write_all(extra);
    }

    fn extra_data(name: &[u8], blocks: &[(&[u8; 4], u32)]) -> Vec<u8> {
        let mut writer = ZByteWriter::new();
        writer.write_u32_be(0);
        writer.write_u32_be(4);
        writer.write_zeros(4);
        writer.write_u8(name.len() as u8);
        writer.write_all(name);
        writer.write_zeros((4 - (1 + name.len()) % 4) % 4);
        for (key, len) in blocks {
            writer.write_all(b"8BIM");
            writer.write_all(*key);
            writer.write_u32_be(*len);
            writer.write_zeros(*len as usize);
        }
        writer.into_inner()
    }

    #[test]
    fn layer_count_sign() {
        assert_eq!(
            LayerCount::from_raw(-3),
            LayerCount {
                count:                 3,
                transparent_composite: true
            }
        );
        assert_eq!(LayerCount::from_raw(i16::MIN).count, 32768);
        assert!(!LayerCount::from_raw(2).transparent_composite);
    }

    #[test]
    fn record_with_name_and_blocks() {
        let extra = extra_data(b"Background", &[(b"luni", 8)]);
        let mut writer = ZByteWriter::new();
        write_record(&mut writer, &[(0, 8), (-1, 8)], 2, &extra);
        let bytes = writer.into_inner();
        let mut stream = ZReader::new(ZCursor::new(&bytes));

        let record = LayerRecord::decode(&mut stream).unwrap();

        assert_eq!(record.width(), 3);
        assert_eq!(record.height(), 2);
        assert_eq!(record.name_lossy(), "Background");
        assert_eq!(record.additional_info.len(), 1);
        assert_eq!(&record.blend_mode.to_be_bytes(), b"norm");
        assert_eq!(record.opacity, 255);
        assert!(record.is_visible());
        assert_eq!(record.channel_data_len(), 16);
        assert_eq!(record.size_on_wire(), bytes.len() as u64);
        assert_eq!(stream.position(), bytes.len() as u64);
    }

    #[test]
    fn garbage_extra_data_is_not_fatal() {
        let mut writer = ZByteWriter::new();
        write_record(&mut writer, &[(0, 2)], 1, &[0xFF; 7]);
        let bytes = writer.into_inner();
        let mut stream = ZReader::new(ZCursor::new(&bytes));

        let record = LayerRecord::decode(&mut stream).unwrap();

        assert!(record.name.is_empty());
        assert_eq!(stream.position(), bytes.len() as u64);
    }

    #[test]
    fn missing_channel_entry_breaks_signature() {
        let mut writer = ZByteWriter::new();
        // claims 3 channels but only 2 are present
        write_record(&mut writer, &[(0, 2), (1, 2)], 3, &[]);
        let bytes = writer.into_inner();

        let err = LayerRecord::decode(&mut ZReader::new(ZCursor::new(&bytes))).unwrap_err();

        // the third entry eats into the signature
        assert!(matches!(
            err,
            PSDDecodeErrors::CorruptLayerRecord { offset: 36, .. }
        ));
    }

    #[test]
    fn inverted_bounds_are_corrupt() {
        let mut writer = ZByteWriter::new();
        write_record(&mut writer, &[], 0, &[]);
        // swap bottom below top
        writer.patch_u32_be(0, 5);
        let bytes = writer.into_inner();

        let err = LayerRecord::decode(&mut ZReader::new(ZCursor::new(&bytes))).unwrap_err();
        assert!(matches!(err, PSDDecodeErrors::CorruptLayerRecord { offset: 0, .. }));
    }

    #[test]
    fn directory_counts_consumed_bytes() {
        let mut records = ZByteWriter::new();
        write_record(&mut records, &[(0, 2)], 1, &[]);
        write_record(&mut records, &[(0, 2), (1, 2)], 2, &[]);
        let records = records.into_inner();

        let mut writer = ZByteWriter::new();
        writer.write_u32_be(4 + 2 + records.len() as u32 + 8);
        writer.write_u32_be(2 + records.len() as u32 + 8);
        writer.write_i16_be(-2);
        writer.write_all(&records);
        let bytes = writer.into_inner();

        let mut log = EventLog::new();
        let directory =
            LayerDirectory::decode(&mut ZReader::new(ZCursor::new(&bytes)), &mut log).unwrap();

        assert_eq!(directory.records.len(), 2);
        assert!(directory.count.transparent_composite);
        assert_eq!(directory.consumed, 2 + 40 + 46);
        assert_eq!(directory.layer_info_end(), bytes.len() as u64 + 8);
        assert_eq!(log.events().len(), 5);
    }

    #[test]
    fn empty_layer_and_mask_section() {
        let bytes = [0, 0, 0, 0];
        let directory =
            LayerDirectory::decode(&mut ZReader::new(ZCursor::new(bytes)), &mut NoopSink).unwrap();

        assert!(directory.is_empty());
        assert_eq!(directory.layer_and_mask_end(), 4);
    }

    #[test]
    fn layer_info_larger_than_envelope() {
        let mut writer = ZByteWriter::new();
        writer.write_u32_be(8);
        writer.write_u32_be(100);
        let bytes = writer.into_inner();

        let err = LayerDirectory::decode(&mut ZReader::new(ZCursor::new(&bytes)), &mut NoopSink)
            .unwrap_err();
        assert!(matches!(err, PSDDecodeErrors::OverrunRegion { offset: 4, .. }));
    }
}

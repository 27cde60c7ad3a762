/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The document walker
//!
//! Decoding is a single forward pass over the document:
//!
//! - file header, color mode data and image resources
//! - the layer directory
//! - channel image data of every layer, composited into RGBA as it is read
//! - the global layer mask and the additional layer info blocks
//!
//! Errors found while decoding the pixels of one layer only fail that layer,
//! the cursor position is always known because channel data is sliced out of
//! the stream by its declared length before it is decoded. Errors in the
//! structure around the layers end the whole pass.
use alloc::borrow::Cow;
use alloc::vec::Vec;

use strata_core::bit_depth::BitDepth;
use strata_core::bytestream::{ZByteReaderTrait, ZReader};
use strata_core::options::DecoderOptions;

use crate::additional::{scan_additional_info, AdditionalInfoBlock};
use crate::composite::{composite_channel, ChannelRole, DecodedLayer, LayerImage};
use crate::constants::{CompressionMethod, HEADER_SIZE};
use crate::diagnostics::{DecodeEvent, DiagnosticSink, LogSink, Section};
use crate::errors::PSDDecodeErrors;
use crate::header::FileHeader;
use crate::layers::{LayerDirectory, LayerRecord};
use crate::mask::GlobalLayerMaskInfo;
use crate::rle::decompress_plane;
use crate::sections::skip_section;

/// Result of decoding a single layer
#[derive(Debug)]
pub enum LayerOutcome {
    Decoded(DecodedLayer),
    Failed {
        index: usize,
        error: PSDDecodeErrors
    }
}

impl LayerOutcome {
    pub const fn index(&self) -> usize {
        match self {
            LayerOutcome::Decoded(layer) => layer.index,
            LayerOutcome::Failed { index, .. } => *index
        }
    }

    pub const fn layer(&self) -> Option<&DecodedLayer> {
        match self {
            LayerOutcome::Decoded(layer) => Some(layer),
            LayerOutcome::Failed { .. } => None
        }
    }

    pub const fn error(&self) -> Option<&PSDDecodeErrors> {
        match self {
            LayerOutcome::Decoded(_) => None,
            LayerOutcome::Failed { error, .. } => Some(error)
        }
    }
}

/// What follows the channel image data inside the layer and mask info section
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct LayerAndMaskTrailer {
    pub global_mask:     Option<GlobalLayerMaskInfo>,
    pub additional_info: Vec<AdditionalInfoBlock>
}

/// Everything a full pass over a document produced
#[derive(Debug)]
pub struct PsdDocument {
    pub header:              FileHeader,
    pub color_mode_data_len: u32,
    pub image_resources_len: u32,
    pub directory:           LayerDirectory,
    /// One entry per layer record, in directory order
    pub layers:              Vec<LayerOutcome>,
    pub global_mask:         Option<GlobalLayerMaskInfo>,
    pub additional_info:     Vec<AdditionalInfoBlock>
}

impl PsdDocument {
    /// Layers that decoded successfully
    pub fn decoded_layers(&self) -> impl Iterator<Item = &DecodedLayer> {
        self.layers.iter().filter_map(LayerOutcome::layer)
    }

    /// Layers that failed, with the reason
    pub fn failed_layers(&self) -> impl Iterator<Item = (usize, &PSDDecodeErrors)> {
        self.layers
            .iter()
            .filter_map(|outcome| outcome.error().map(|e| (outcome.index(), e)))
    }
}

/// Bytes of one channel sliced out of the stream
struct ChannelData {
    id:          i16,
    /// Offset of the compression tag
    offset:      u64,
    declared:    u32,
    /// `None` when the declared length can't hold a compression tag
    compression: Option<u16>,
    data:        Vec<u8>
}

/// A Photoshop document decoder that reconstructs individual layers.
///
/// Events are reported to `S`, by default they go to the log facade.
///
/// # Example
/// ```no_run
/// use strata_psd::PSDLayerDecoder;
/// use strata_psd::strata_core::bytestream::ZCursor;
///
/// let data = std::fs::read("image.psd").unwrap();
/// let mut decoder = PSDLayerDecoder::new(ZCursor::new(data));
/// let document = decoder.decode().unwrap();
///
/// for layer in document.decoded_layers() {
///     println!("{}x{}", layer.width(), layer.height());
/// }
/// ```
pub struct PSDLayerDecoder<T, S = LogSink>
where
    T: ZByteReaderTrait,
    S: DiagnosticSink
{
    stream:              ZReader<T>,
    options:             DecoderOptions,
    sink:                S,
    header:              Option<FileHeader>,
    color_mode_data_len: u32,
    image_resources_len: u32,
    directory:           Option<LayerDirectory>,
    layers_decoded:      bool
}

impl<T> PSDLayerDecoder<T, LogSink>
where
    T: ZByteReaderTrait
{
    /// Create a new decoder reading from `data`
    pub fn new(data: T) -> PSDLayerDecoder<T, LogSink> {
        Self::new_with_options(data, DecoderOptions::default())
    }

    /// Create a new decoder with options that influence decoding routines
    pub fn new_with_options(data: T, options: DecoderOptions) -> PSDLayerDecoder<T, LogSink> {
        PSDLayerDecoder::new_with_sink(data, options, LogSink)
    }
}

impl<T, S> PSDLayerDecoder<T, S>
where
    T: ZByteReaderTrait,
    S: DiagnosticSink
{
    /// Create a decoder that reports events to `sink`
    pub fn new_with_sink(data: T, options: DecoderOptions, sink: S) -> PSDLayerDecoder<T, S> {
        PSDLayerDecoder {
            stream: ZReader::new(data),
            options,
            sink,
            header: None,
            color_mode_data_len: 0,
            image_resources_len: 0,
            directory: None,
            layers_decoded: false
        }
    }

    /// Decode the file header and step over the color mode data
    /// and image resources sections.
    ///
    /// Calling it again after success does nothing.
    pub fn decode_headers(&mut self) -> Result<&FileHeader, PSDDecodeErrors> {
        if self.header.is_none() {
            self.sink.on_event(&DecodeEvent::SectionEntered {
                section: Section::FileHeader,
                offset:  self.stream.position(),
                length:  HEADER_SIZE
            });
            let header = FileHeader::decode(&mut self.stream)?;

            self.sink.on_event(&DecodeEvent::HeaderDecoded {
                channels:   header.channels,
                width:      header.width,
                height:     header.height,
                depth:      header.depth,
                color_mode: header.color_mode
            });

            self.color_mode_data_len =
                skip_section(&mut self.stream, Section::ColorModeData, &mut self.sink)?;
            self.image_resources_len =
                skip_section(&mut self.stream, Section::ImageResources, &mut self.sink)?;

            self.header = Some(header);
        }
        self.header
            .as_ref()
            .ok_or(PSDDecodeErrors::Generic("Headers not decoded"))
    }

    /// Decode the layer directory, decoding headers first if needed
    pub fn decode_layer_directory(&mut self) -> Result<&LayerDirectory, PSDDecodeErrors> {
        if self.directory.is_none() {
            if self.layers_decoded {
                return Err(PSDDecodeErrors::Generic("Layers were already decoded"));
            }
            self.decode_headers()?;
            self.directory = Some(LayerDirectory::decode(&mut self.stream, &mut self.sink)?);
        }
        self.directory
            .as_ref()
            .ok_or(PSDDecodeErrors::Generic("Layer directory not decoded"))
    }

    /// Decode every layer, handing each one to `on_layer` as soon as it is ready.
    ///
    /// `on_layer` receives the layer index, its record and either the
    /// composited layer or the reason it failed. A failed layer doesn't stop
    /// the pass.
    ///
    /// Once the layers are done the rest of the layer and mask info section is
    /// read and returned.
    ///
    /// # Errors
    /// Anything that leaves the cursor at an unknown position, e.g
    /// `EndOfStream` inside channel data or a corrupt additional info block.
    /// Can only be called once per decoder.
    pub fn decode_layers_with<F>(
        &mut self, mut on_layer: F
    ) -> Result<LayerAndMaskTrailer, PSDDecodeErrors>
    where
        F: FnMut(usize, &LayerRecord, Result<DecodedLayer, PSDDecodeErrors>)
    {
        if self.layers_decoded {
            return Err(PSDDecodeErrors::Generic("Layers were already decoded"));
        }
        self.decode_layer_directory()?;

        let (Some(header), Some(directory)) = (self.header, self.directory.take()) else {
            return Err(PSDDecodeErrors::Generic("Layer directory not decoded"));
        };
        self.layers_decoded = true;

        if !directory.is_empty() {
            self.sink.on_event(&DecodeEvent::SectionEntered {
                section: Section::ChannelImageData,
                offset:  self.stream.position(),
                length:  directory.channel_data_len()
            });
        }

        for (index, record) in directory.records.iter().enumerate() {
            let channels = self.extract_channels(record)?;
            let result = decode_layer(
                index,
                record,
                &channels,
                header.depth,
                &self.options,
                &mut self.sink
            );

            match &result {
                Ok(layer) => self.sink.on_event(&DecodeEvent::LayerDecoded {
                    index,
                    width: layer.width(),
                    height: layer.height()
                }),
                Err(e) => self.sink.on_event(&DecodeEvent::LayerFailed {
                    index,
                    offset: e.offset()
                })
            }
            on_layer(index, record, result);
        }

        let trailer = self.decode_trailer(&directory)?;

        self.sink.on_event(&DecodeEvent::Finished {
            offset: self.stream.position()
        });
        self.directory = Some(directory);

        Ok(trailer)
    }

    /// Decode the whole document, collecting every layer
    pub fn decode(&mut self) -> Result<PsdDocument, PSDDecodeErrors> {
        let mut layers = Vec::new();

        let trailer = self.decode_layers_with(|index, _, result| {
            layers.push(match result {
                Ok(layer) => LayerOutcome::Decoded(layer),
                Err(error) => LayerOutcome::Failed { index, error }
            });
        })?;

        let (Some(header), Some(directory)) = (self.header, self.directory.take()) else {
            return Err(PSDDecodeErrors::Generic("Layer directory not decoded"));
        };

        Ok(PsdDocument {
            header,
            color_mode_data_len: self.color_mode_data_len,
            image_resources_len: self.image_resources_len,
            directory,
            layers,
            global_mask: trailer.global_mask,
            additional_info: trailer.additional_info
        })
    }

    /// Slice every channel of `record` out of the stream by its declared length
    fn extract_channels(
        &mut self, record: &LayerRecord
    ) -> Result<Vec<ChannelData>, PSDDecodeErrors> {
        let mut channels = Vec::with_capacity(record.channels.len());

        for descriptor in &record.channels {
            let offset = self.stream.position();

            let (compression, data) = if descriptor.length < 2 {
                self.stream.skip(u64::from(descriptor.length))?;
                (None, Vec::new())
            } else {
                let compression = self.stream.get_u16_be_err()?;
                let data = self.stream.read_bytes_vec(descriptor.length as usize - 2)?;
                (Some(compression), data)
            };
            channels.push(ChannelData {
                id: descriptor.id,
                offset,
                declared: descriptor.length,
                compression,
                data
            });
        }
        Ok(channels)
    }

    /// Padding after the channel data, the global mask and additional info
    fn decode_trailer(
        &mut self, directory: &LayerDirectory
    ) -> Result<LayerAndMaskTrailer, PSDDecodeErrors> {
        let mut trailer = LayerAndMaskTrailer::default();

        if directory.layer_and_mask_len == 0 {
            return Ok(trailer);
        }
        if directory.layer_info_len != 0 {
            let channel_data = directory.channel_data_len();
            let padding = channel_data % 2;

            self.stream.skip(padding)?;

            reconcile(
                &mut self.sink,
                &self.options,
                Section::LayerInfo,
                self.stream.position(),
                u64::from(directory.layer_info_len),
                directory.consumed + channel_data + padding
            )?;
            // producers round the declared length differently, trust it
            // when it points further than what we read
            let layer_info_end = directory.layer_info_end();

            if self.stream.position() < layer_info_end {
                self.stream.skip(layer_info_end - self.stream.position())?;
            }
        }

        let layer_and_mask_end = directory.layer_and_mask_end();
        let position = self.stream.position();

        let Some(mut remaining) = layer_and_mask_end.checked_sub(position) else {
            // layer records and channel data ran past the section
            return Err(PSDDecodeErrors::OverrunRegion {
                offset:    position,
                declared:  position - (directory.layer_and_mask_offset + 4),
                remaining: u64::from(directory.layer_and_mask_len)
            });
        };

        if remaining >= 4 {
            self.sink.on_event(&DecodeEvent::SectionEntered {
                section: Section::GlobalLayerMask,
                offset:  position,
                length:  remaining
            });
            trailer.global_mask = GlobalLayerMaskInfo::decode(&mut self.stream, remaining)?;
            remaining = layer_and_mask_end - self.stream.position();
        } else if remaining > 0 {
            // too short for a global mask length, treat as padding
            reconcile(
                &mut self.sink,
                &self.options,
                Section::LayerAndMaskInfo,
                layer_and_mask_end,
                u64::from(directory.layer_and_mask_len),
                u64::from(directory.layer_and_mask_len) - remaining
            )?;
            self.stream.skip(remaining)?;
            remaining = 0;
        }

        if remaining > 0 {
            self.sink.on_event(&DecodeEvent::SectionEntered {
                section: Section::AdditionalLayerInfo,
                offset:  self.stream.position(),
                length:  remaining
            });
            trailer.additional_info =
                scan_additional_info(&mut self.stream, remaining, &mut self.sink)?;
        }
        Ok(trailer)
    }

    /// The file header, `None` before [`decode_headers`](Self::decode_headers)
    pub const fn header(&self) -> Option<&FileHeader> {
        self.header.as_ref()
    }

    /// Document width and height, `None` if headers haven't been decoded
    pub fn dimensions(&self) -> Option<(usize, usize)> {
        self.header
            .as_ref()
            .map(|h| (h.width as usize, h.height as usize))
    }

    /// Bit depth of the document, `None` if headers haven't been decoded
    pub fn bit_depth(&self) -> Option<BitDepth> {
        self.header.as_ref().map(FileHeader::bit_depth)
    }

    /// The layer directory once decoded
    pub const fn directory(&self) -> Option<&LayerDirectory> {
        self.directory.as_ref()
    }

    pub const fn options(&self) -> &DecoderOptions {
        &self.options
    }

    pub const fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Destroy the decoder returning the sink, e.g to inspect collected events
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Absolute offset of the next byte to be read
    pub const fn position(&self) -> u64 {
        self.stream.position()
    }
}

/// Report a length mismatch, failing only in strict mode
fn reconcile<S: DiagnosticSink>(
    sink: &mut S, options: &DecoderOptions, section: Section, offset: u64, declared: u64,
    consumed: u64
) -> Result<(), PSDDecodeErrors> {
    if declared == consumed {
        return Ok(());
    }
    sink.on_event(&DecodeEvent::LengthMismatch {
        section,
        offset,
        declared,
        consumed
    });
    if options.get_strict_mode() {
        return Err(PSDDecodeErrors::LengthMismatch {
            offset,
            section,
            declared,
            consumed
        });
    }
    Ok(())
}

/// Decode and composite every channel of one layer.
///
/// Works on bytes already read, any error here only concerns this layer.
fn decode_layer<S: DiagnosticSink>(
    index: usize, record: &LayerRecord, channels: &[ChannelData], depth: u16,
    options: &DecoderOptions, sink: &mut S
) -> Result<DecodedLayer, PSDDecodeErrors> {
    if BitDepth::from_bits(depth) != BitDepth::Eight {
        return Err(PSDDecodeErrors::UnsupportedBitDepth {
            offset: record.offset,
            depth
        });
    }
    let (width, height) = (record.width(), record.height());

    if width > options.get_max_width() {
        return Err(PSDDecodeErrors::LargeDimensions {
            offset:    record.offset,
            supported: options.get_max_width(),
            found:     width
        });
    }
    if height > options.get_max_height() {
        return Err(PSDDecodeErrors::LargeDimensions {
            offset:    record.offset,
            supported: options.get_max_height(),
            found:     height
        });
    }
    let samples = width * height;
    // every plane is checked against the geometry before the RGBA buffer is allocated
    let mut planes = Vec::with_capacity(channels.len());

    for channel in channels {
        if ChannelRole::from_id(channel.id).is_none() {
            if options.psd_get_skip_unknown_channels() {
                sink.on_event(&DecodeEvent::ChannelSkipped {
                    layer:      index,
                    channel_id: channel.id,
                    offset:     channel.offset
                });
                continue;
            }
            return Err(PSDDecodeErrors::UnknownChannelRole {
                offset: channel.offset,
                role:   channel.id
            });
        }
        let Some(compression) = channel.compression else {
            return Err(PSDDecodeErrors::TruncatedStream {
                offset:    channel.offset,
                requested: 2,
                available: channel.declared as usize
            });
        };
        let data_offset = channel.offset + 2;

        let plane = match CompressionMethod::from_int(compression) {
            Some(CompressionMethod::NoCompression) => {
                if channel.data.len() < samples {
                    return Err(PSDDecodeErrors::ChannelUnderrun {
                        offset:    data_offset,
                        expected:  samples,
                        available: channel.data.len()
                    });
                }
                reconcile(
                    sink,
                    options,
                    Section::ChannelImageData,
                    data_offset + samples as u64,
                    channel.data.len() as u64,
                    samples as u64
                )?;
                Cow::Borrowed(channel.data.as_slice())
            }
            Some(CompressionMethod::RLE) => {
                let (plane, used) = decompress_plane(width, height, &channel.data, data_offset)?;

                reconcile(
                    sink,
                    options,
                    Section::ChannelImageData,
                    data_offset + used as u64,
                    channel.data.len() as u64,
                    used as u64
                )?;
                Cow::Owned(plane)
            }
            _ => {
                return Err(PSDDecodeErrors::UnsupportedCompression {
                    offset: channel.offset,
                    method: compression
                })
            }
        };

        sink.on_event(&DecodeEvent::ChannelDecoded {
            layer: index,
            channel_id: channel.id,
            compression,
            offset: channel.offset
        });
        planes.push((channel.id, data_offset, plane));
    }

    let mut image = LayerImage::new(width, height);

    for (channel_id, data_offset, plane) in &planes {
        composite_channel(&mut image, plane, *channel_id, *data_offset)?;
    }

    Ok(DecodedLayer {
        index,
        bounds: record.bounds,
        image
    })
}

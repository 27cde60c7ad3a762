/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Decode events
//!
//! The decoder does not print anything itself, it reports what it sees to a
//! [`DiagnosticSink`] at well defined points. [`LogSink`] forwards to the
//! log facade and is what decoders use unless told otherwise.

use alloc::vec::Vec;

use strata_core::log::{debug, trace, warn};

use crate::constants::fourcc;

/// Regions of a document the decoder walks through
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Section {
    FileHeader,
    ColorModeData,
    ImageResources,
    LayerAndMaskInfo,
    LayerInfo,
    ChannelImageData,
    GlobalLayerMask,
    AdditionalLayerInfo
}

/// Something the decoder observed
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "event"))]
pub enum DecodeEvent {
    /// A section starts at `offset`, `length` is its declared
    /// length (zero for sections without one)
    SectionEntered {
        section: Section,
        offset:  u64,
        length:  u64
    },
    HeaderDecoded {
        channels:   u16,
        width:      u32,
        height:     u32,
        depth:      u16,
        color_mode: u16
    },
    LayerCountDecoded {
        count:                 u16,
        transparent_composite: bool
    },
    LayerRecordParsed {
        index:    usize,
        offset:   u64,
        channels: usize,
        extra:    u32
    },
    ChannelDecoded {
        layer:       usize,
        channel_id:  i16,
        compression: u16,
        offset:      u64
    },
    /// A channel was read but not composited, see
    /// [`psd_set_skip_unknown_channels`](strata_core::options::DecoderOptions::psd_set_skip_unknown_channels)
    ChannelSkipped {
        layer:      usize,
        channel_id: i16,
        offset:     u64
    },
    LayerDecoded {
        index:  usize,
        width:  usize,
        height: usize
    },
    LayerFailed {
        index:  usize,
        offset: Option<u64>
    },
    /// Declared and consumed lengths of a section disagree
    LengthMismatch {
        section:  Section,
        offset:   u64,
        declared: u64,
        consumed: u64
    },
    AdditionalInfoBlock {
        offset:    u64,
        signature: u32,
        key:       u32,
        length:    u32
    },
    Finished {
        offset: u64
    }
}

/// Receiver of decode events
pub trait DiagnosticSink {
    fn on_event(&mut self, event: &DecodeEvent);
}

impl<F: FnMut(&DecodeEvent)> DiagnosticSink for F {
    fn on_event(&mut self, event: &DecodeEvent) {
        (self)(event)
    }
}

/// Discards every event
#[derive(Debug, Default, Copy, Clone)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn on_event(&mut self, _: &DecodeEvent) {}
}

/// Keeps every event in order of arrival
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Vec<DecodeEvent>
}

impl EventLog {
    pub fn new() -> EventLog {
        EventLog::default()
    }

    pub fn events(&self) -> &[DecodeEvent] {
        &self.events
    }

    /// Every length mismatch seen so far
    pub fn mismatches(&self) -> impl Iterator<Item = &DecodeEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, DecodeEvent::LengthMismatch { .. }))
    }
}

impl DiagnosticSink for EventLog {
    fn on_event(&mut self, event: &DecodeEvent) {
        self.events.push(*event);
    }
}

/// Forwards events to the log facade
///
/// Offsets at `trace`, per layer results at `debug`,
/// mismatches at `warn`.
#[derive(Debug, Default, Copy, Clone)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    #[allow(unused_variables)]
    fn on_event(&mut self, event: &DecodeEvent) {
        match *event {
            DecodeEvent::SectionEntered {
                section,
                offset,
                length
            } => {
                trace!("{section:?} offset: 0x{offset:x} length: {length}");
            }
            DecodeEvent::HeaderDecoded {
                channels,
                width,
                height,
                depth,
                color_mode
            } => {
                trace!("Image width:{width}");
                trace!("Image height:{height}");
                trace!("Channels: {channels}");
                trace!("Bit depth : {depth}");
                trace!("Color mode : {color_mode}");
            }
            DecodeEvent::LayerCountDecoded {
                count,
                transparent_composite
            } => {
                debug!("Layer count: {count}, transparent composite: {transparent_composite}");
            }
            DecodeEvent::LayerRecordParsed {
                index,
                offset,
                channels,
                extra
            } => {
                trace!(
                    "Layer record {index} at 0x{offset:x}, {channels} channels, {extra} bytes of extra data"
                );
            }
            DecodeEvent::ChannelDecoded {
                layer,
                channel_id,
                compression,
                offset
            } => {
                debug!(
                    "Layer {layer}: channel {channel_id} at 0x{offset:x} decoded (compression {compression})"
                );
            }
            DecodeEvent::ChannelSkipped {
                layer,
                channel_id,
                offset
            } => {
                debug!("Layer {layer}: channel {channel_id} at 0x{offset:x} skipped");
            }
            DecodeEvent::LayerDecoded {
                index,
                width,
                height
            } => {
                debug!("Layer {index} decoded, width {width} height {height}");
            }
            DecodeEvent::LayerFailed { index, offset } => {
                warn!("Layer {index} failed to decode, error at {offset:?}");
            }
            DecodeEvent::LengthMismatch {
                section,
                offset,
                declared,
                consumed
            } => {
                warn!(
                    "{section:?} length mismatch at 0x{offset:x}: declared {declared} != consumed {consumed}"
                );
            }
            DecodeEvent::AdditionalInfoBlock {
                offset,
                signature,
                key,
                length
            } => {
                let signature = fourcc(signature);
                let key = fourcc(key);
                trace!(
                    "Additional layer info {signature:?} {key:?} at 0x{offset:x}, length {length}"
                );
            }
            DecodeEvent::Finished { offset } => {
                debug!("PSD document walked, ended at 0x{offset:x}");
            }
        }
    }
}

/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Builds small documents in memory for the integration tests
#![allow(dead_code)]

use strata_core::bytestream::ZByteWriter;
use strata_psd::header::FileHeader;
use strata_psd::rle::compress_plane;

pub struct Channel {
    pub id:          i16,
    pub compression: u16,
    pub payload:     Vec<u8>
}

impl Channel {
    pub fn raw(id: i16, payload: &[u8]) -> Channel {
        Channel {
            id,
            compression: 0,
            payload: payload.to_vec()
        }
    }

    pub fn rle(id: i16, width: usize, height: usize, plane: &[u8]) -> Channel {
        Channel {
            id,
            compression: 1,
            payload: compress_plane(width, height, plane).unwrap()
        }
    }

    pub fn with_compression(id: i16, compression: u16, payload: &[u8]) -> Channel {
        Channel {
            id,
            compression,
            payload: payload.to_vec()
        }
    }
}

pub struct Layer {
    /// top, left, bottom, right
    pub bounds:        [i32; 4],
    pub channels:      Vec<Channel>,
    /// Channel count written to the record, defaults to `channels.len()`
    pub channel_count: Option<u16>,
    pub name:          Vec<u8>,
    pub info_blocks:   Vec<([u8; 4], Vec<u8>)>
}

impl Layer {
    pub fn new(width: i32, height: i32, channels: Vec<Channel>) -> Layer {
        Layer {
            bounds: [0, 0, height, width],
            channels,
            channel_count: None,
            name: b"Layer".to_vec(),
            info_blocks: Vec::new()
        }
    }

    fn write_record(&self, writer: &mut ZByteWriter) {
        for v in self.bounds {
            writer.write_i32_be(v);
        }
        let count = self.channel_count.unwrap_or(self.channels.len() as u16);
        writer.write_u16_be(count);

        for channel in &self.channels {
            writer.write_i16_be(channel.id);
            writer.write_u32_be(channel.payload.len() as u32 + 2);
        }
        writer.write_all(b"8BIM");
        writer.write_all(b"norm");
        // opacity, clipping, flags, filler
        writer.write_all(&[255, 0, 0, 0]);

        let extra = self.extra_data();
        writer.write_u32_be(extra.len() as u32);
        writer.write_all(&extra);
    }

    fn extra_data(&self) -> Vec<u8> {
        let mut writer = ZByteWriter::new();
        // no mask, no blending ranges
        writer.write_u32_be(0);
        writer.write_u32_be(0);
        writer.write_u8(self.name.len() as u8);
        writer.write_all(&self.name);
        writer.write_zeros((4 - (1 + self.name.len()) % 4) % 4);
        write_blocks(&mut writer, &self.info_blocks);
        writer.into_inner()
    }
}

fn write_blocks(writer: &mut ZByteWriter, blocks: &[([u8; 4], Vec<u8>)]) {
    for (key, payload) in blocks {
        writer.write_all(b"8BIM");
        writer.write_all(key);
        writer.write_u32_be(payload.len() as u32);
        writer.write_all(payload);
        writer.write_zeros((4 - payload.len() % 4) % 4);
    }
}

/// Assembles a whole document
pub struct DocumentBuilder {
    pub header:              FileHeader,
    pub layers:              Vec<Layer>,
    /// Raw layer count, defaults to the number of layers
    pub layer_count:         Option<i16>,
    /// Bytes appended to the layer info section and counted in its length
    pub layer_info_trailing: usize,
    /// 13 bytes of fields followed by filler, `None` writes a zero length
    pub global_mask:         Option<Vec<u8>>,
    pub info_blocks:         Vec<([u8; 4], Vec<u8>)>,
    /// Raw bytes written after the blocks and counted in the section length
    pub layer_and_mask_tail: Vec<u8>
}

impl DocumentBuilder {
    pub fn new(width: u32, height: u32) -> DocumentBuilder {
        DocumentBuilder {
            header:              FileHeader::new_rgba(width, height),
            layers:              Vec::new(),
            layer_count:         None,
            layer_info_trailing: 0,
            global_mask:         None,
            info_blocks:         Vec::new(),
            layer_and_mask_tail: Vec::new()
        }
    }

    pub fn layer(mut self, layer: Layer) -> DocumentBuilder {
        self.layers.push(layer);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut writer = ZByteWriter::new();
        self.header.encode(&mut writer);
        // color mode data, image resources
        writer.write_u32_be(0);
        writer.write_u32_be(0);

        let layer_and_mask = writer.position();
        writer.write_u32_be(0);
        let layer_info = writer.position();
        writer.write_u32_be(0);

        let count = self.layer_count.unwrap_or(self.layers.len() as i16);
        writer.write_i16_be(count);

        for layer in &self.layers {
            layer.write_record(&mut writer);
        }
        let mut channel_bytes = 0;

        for layer in &self.layers {
            for channel in &layer.channels {
                writer.write_u16_be(channel.compression);
                writer.write_all(&channel.payload);
                channel_bytes += channel.payload.len() + 2;
            }
        }
        if channel_bytes % 2 == 1 {
            writer.write_u8(0);
        }
        writer.write_zeros(self.layer_info_trailing);

        let layer_info_len = writer.position() - layer_info - 4;
        writer.patch_u32_be(layer_info, layer_info_len as u32);

        match &self.global_mask {
            Some(mask) => {
                writer.write_u32_be(mask.len() as u32);
                writer.write_all(mask);
            }
            None => writer.write_u32_be(0)
        }
        write_blocks(&mut writer, &self.info_blocks);
        writer.write_all(&self.layer_and_mask_tail);

        let layer_and_mask_len = writer.position() - layer_and_mask - 4;
        writer.patch_u32_be(layer_and_mask, layer_and_mask_len as u32);

        // merged image data, raw and empty
        writer.write_u16_be(0);

        writer.into_inner()
    }
}

/// The fixed fields of a global mask followed by `filler` zero bytes
pub fn global_mask(opacity: u16, kind: u8, filler: usize) -> Vec<u8> {
    let mut writer = ZByteWriter::new();
    writer.write_u16_be(0);
    for c in [65535, 0, 0, 0] {
        writer.write_u16_be(c);
    }
    writer.write_u16_be(opacity);
    writer.write_u8(kind);
    writer.write_zeros(filler);
    writer.into_inner()
}

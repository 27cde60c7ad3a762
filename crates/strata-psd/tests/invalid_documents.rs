/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

mod common;

use common::{Channel, DocumentBuilder, Layer};
use strata_core::bytestream::ZCursor;
use strata_core::options::DecoderOptions;
use strata_psd::diagnostics::EventLog;
use strata_psd::errors::{PSDDecodeErrors, Severity};
use strata_psd::PSDLayerDecoder;

fn one_layer() -> DocumentBuilder {
    DocumentBuilder::new(2, 2).layer(Layer::new(
        2,
        2,
        vec![Channel::raw(0, &[1, 2, 3, 4]), Channel::raw(-1, &[5, 6, 7, 8])]
    ))
}

#[test]
fn eof() {
    let mut decoder = PSDLayerDecoder::new(ZCursor::new([0x38, 0x42, 0x50]));

    let err = decoder.decode().unwrap_err();
    assert!(matches!(err, PSDDecodeErrors::EndOfStream { offset: 0, .. }));
}

#[test]
fn wrong_signature_reads_nothing_more() {
    let mut data = one_layer().build();
    data[3] = b'X';

    let mut decoder = PSDLayerDecoder::new(ZCursor::new(&data));
    let err = decoder.decode().unwrap_err();

    assert!(matches!(
        err,
        PSDDecodeErrors::WrongMagicBytes {
            offset: 0,
            found:  0x3842_5058
        }
    ));
    assert_eq!(decoder.position(), 4);
    assert!(decoder.header().is_none());
    assert_eq!(err.severity(), Severity::Document);
}

#[test]
fn version_two_is_rejected() {
    let mut builder = one_layer();
    builder.header.version = 2;

    let err = PSDLayerDecoder::new(ZCursor::new(builder.build()))
        .decode()
        .unwrap_err();

    assert!(matches!(
        err,
        PSDDecodeErrors::UnsupportedVersion { offset: 4, found: 2 }
    ));
}

#[test]
fn missing_channel_entry() {
    let mut builder = one_layer();
    builder.layers[0].channel_count = Some(3);

    let err = PSDLayerDecoder::new(ZCursor::new(builder.build()))
        .decode()
        .unwrap_err();

    assert!(matches!(err, PSDDecodeErrors::CorruptLayerRecord { .. }));
}

#[test]
fn truncated_channel_data() {
    let data = one_layer().build();
    // cut inside the alpha channel
    let cut = data.len() - 2 - 4 - 3;

    let err = PSDLayerDecoder::new(ZCursor::new(&data[..cut]))
        .decode()
        .unwrap_err();

    assert!(matches!(err, PSDDecodeErrors::EndOfStream { .. }));
}

#[test]
fn corrupt_trailing_block() {
    let mut builder = one_layer();
    builder.layer_and_mask_tail = b"XXXXkey!\0\0\0\0".to_vec();

    let err = PSDLayerDecoder::new(ZCursor::new(builder.build()))
        .decode()
        .unwrap_err();

    assert!(matches!(
        err,
        PSDDecodeErrors::CorruptBlock {
            signature: 0x5858_5858,
            ..
        }
    ));
}

#[test]
fn trailing_bytes_too_short_for_a_block() {
    let mut builder = one_layer();
    builder.info_blocks.push((*b"lnsr", vec![0; 4]));
    builder.layer_and_mask_tail = vec![0; 6];

    let err = PSDLayerDecoder::new(ZCursor::new(builder.build()))
        .decode()
        .unwrap_err();

    assert!(matches!(err, PSDDecodeErrors::TruncatedRegion { remaining: 6, .. }));
}

#[test]
fn global_mask_longer_than_section() {
    let mut builder = one_layer();
    builder.global_mask = Some(vec![0; 13]);

    let mut data = builder.build();
    // the mask length field sits 4 + 13 bytes before the end of the section,
    // which is followed by the 2 byte image data tag
    let at = data.len() - 2 - 13 - 4;
    data[at..at + 4].copy_from_slice(&64_u32.to_be_bytes());

    let err = PSDLayerDecoder::new(ZCursor::new(&data))
        .decode()
        .unwrap_err();

    assert!(matches!(
        err,
        PSDDecodeErrors::OverrunRegion {
            declared:  68,
            remaining: 17,
            ..
        }
    ));
}

#[test]
fn negative_bounds() {
    let mut builder = one_layer();
    builder.layers[0].bounds = [0, 4, 2, 2];

    let err = PSDLayerDecoder::new(ZCursor::new(builder.build()))
        .decode()
        .unwrap_err();

    assert!(matches!(err, PSDDecodeErrors::CorruptLayerRecord { .. }));
}

#[test]
fn channel_length_below_tag_size() {
    let mut data = one_layer().build();
    // header, two empty sections, two section lengths, layer count, bounds, channel count, id
    let at = 26 + 8 + 8 + 2 + 16 + 2 + 2;
    data[at..at + 4].copy_from_slice(&1_u32.to_be_bytes());

    let mut decoder = PSDLayerDecoder::new_with_sink(
        ZCursor::new(&data),
        DecoderOptions::default(),
        EventLog::new()
    );
    let document = decoder.decode().unwrap();

    assert!(matches!(
        document.layers[0].error(),
        Some(PSDDecodeErrors::TruncatedStream {
            requested: 2,
            available: 1,
            ..
        })
    ));
    assert_eq!(decoder.sink().mismatches().count(), 1);
}

#[test]
fn random_bytes_never_panic() {
    let mut state = 0x2545_F491_u32;

    for len in [0, 1, 26, 40, 100, 300] {
        let data: Vec<u8> = (0..len)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                state as u8
            })
            .collect();
        let _ = PSDLayerDecoder::new(ZCursor::new(&data)).decode();
    }
}

#[test]
fn mutated_documents_never_panic() {
    let data = one_layer().build();

    for i in 0..data.len() {
        for value in [0x00, 0x7F, 0x80, 0xFF] {
            let mut mutated = data.clone();
            mutated[i] = value;
            let _ = PSDLayerDecoder::new(ZCursor::new(&mutated)).decode();
        }
    }
}

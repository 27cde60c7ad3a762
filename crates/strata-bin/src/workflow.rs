/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::ffi::OsString;
use std::fs;
use std::path::Path;

use clap::ArgMatches;
use log::{info, warn};
use strata_core::bytestream::ZCursor;
use strata_psd::diagnostics::{DecodeEvent, DiagnosticSink, LogSink};
use strata_psd::{PSDLayerDecoder, PsdDocument};

use crate::cmd_parsers::global_options::CmdOptions;
use crate::errors::WorkflowErrors;
use crate::file_io::write_layer_png;
use crate::serde::DocumentSummary;

/// Outcome of a run over one document
#[derive(Debug, Copy, Clone, Default)]
pub struct Report {
    pub total_layers:  usize,
    pub failed_layers: usize,
    pub written:       usize
}

pub fn extract_layers_from_cmd(
    args: &ArgMatches, options: &CmdOptions
) -> Result<Report, WorkflowErrors> {
    let in_file = args
        .get_raw("in")
        .and_then(|mut values| values.next())
        .map(|x| x.to_os_string())
        .unwrap_or_default();

    let out_dir = args.get_raw("out").and_then(|mut values| values.next());

    info!("Reading {:?}", in_file);
    let data = fs::read(&in_file)?;

    let (document, events) = decode_document(&data, options)?;

    let mut report = Report {
        total_layers: document.layers.len(),
        failed_layers: document.failed_layers().count(),
        written: 0
    };

    for (index, error) in document.failed_layers() {
        warn!("Layer {index} could not be decoded: {error}");
    }

    if let Some(out_dir) = out_dir {
        report.written = write_layers(Path::new(out_dir), &document)?;
    }

    if options.print_json {
        let events = options.collect_events.then_some(events.as_slice());
        let summary = DocumentSummary::new(in_file, &document, events);

        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(report)
}

/// Decode every layer, keeping a copy of every event while still logging them
pub fn decode_document(
    data: &[u8], options: &CmdOptions
) -> Result<(PsdDocument, Vec<DecodeEvent>), WorkflowErrors> {
    let mut events = Vec::new();
    let mut log = LogSink;

    let sink = |event: &DecodeEvent| {
        log.on_event(event);
        events.push(*event);
    };
    let mut decoder =
        PSDLayerDecoder::new_with_sink(ZCursor::new(data), options.to_decoder_options(), sink);

    let document = decoder.decode()?;
    drop(decoder);

    info!(
        "Decoded {} of {} layers",
        document.decoded_layers().count(),
        document.layers.len()
    );
    Ok((document, events))
}

/// Write every non empty layer to `out_dir`, returning how many were written
fn write_layers(out_dir: &Path, document: &PsdDocument) -> Result<usize, WorkflowErrors> {
    fs::create_dir_all(out_dir)?;

    let mut written = 0;

    for layer in document.decoded_layers() {
        if layer.is_empty() {
            info!("Layer {} is empty, not writing it", layer.index);
            continue;
        }
        write_layer_png(out_dir, layer)?;
        written += 1;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use strata_core::bytestream::ZByteWriter;
    use strata_psd::diagnostics::DecodeEvent;
    use strata_psd::header::FileHeader;

    use crate::cmd_parsers::global_options::CmdOptions;
    use crate::serde::DocumentSummary;
    use crate::workflow::decode_document;

    /// A document with a single 1x1 layer with one raw red channel
    fn tiny_document() -> Vec<u8> {
        let mut writer = ZByteWriter::new();
        FileHeader::new_rgba(1, 1).encode(&mut writer);
        writer.write_u32_be(0);
        writer.write_u32_be(0);

        let extra = [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        // count + record + channel data + padding
        let layer_info = 2 + 34 + 6 + extra.len() + 3 + 1;

        writer.write_u32_be(layer_info as u32 + 4 + 4);
        writer.write_u32_be(layer_info as u32);
        writer.write_i16_be(1);
        for v in [0, 0, 1, 1] {
            writer.write_i32_be(v);
        }
        writer.write_u16_be(1);
        writer.write_i16_be(0);
        writer.write_u32_be(3);
        writer.write_all(b"8BIMnorm");
        writer.write_all(&[255, 0, 0, 0]);
        writer.write_u32_be(extra.len() as u32);
        writer.write_all(&extra);
        writer.write_u16_be(0);
        writer.write_u8(200);
        writer.write_u8(0);
        // empty global mask
        writer.write_u32_be(0);
        writer.into_inner()
    }

    #[test]
    fn decodes_and_collects_events() {
        let mut options = CmdOptions::new();
        options.max_width = 16;
        options.max_height = 16;

        let (document, events) = decode_document(&tiny_document(), &options).unwrap();

        assert_eq!(document.decoded_layers().count(), 1);
        assert!(matches!(events.last(), Some(DecodeEvent::Finished { .. })));
        assert!(!events
            .iter()
            .any(|e| matches!(e, DecodeEvent::LengthMismatch { .. })));
    }

    #[test]
    fn summary_serializes() {
        let mut options = CmdOptions::new();
        options.max_width = 16;
        options.max_height = 16;

        let (document, events) = decode_document(&tiny_document(), &options).unwrap();
        let summary = DocumentSummary::new("a.psd".into(), &document, Some(&events));
        let json: serde_json::Value = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["header"]["width"], 1);
        assert_eq!(json["layers"][0]["width"], 1);
        assert_eq!(json["events"][0]["event"], "SectionEntered");
    }
}

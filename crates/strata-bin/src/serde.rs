/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::ffi::OsString;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use strata_psd::diagnostics::DecodeEvent;
use strata_psd::{LayerOutcome, PsdDocument};

/// What `--json` prints for a document
pub struct DocumentSummary<'a> {
    file:     OsString,
    document: &'a PsdDocument,
    events:   Option<&'a [DecodeEvent]>
}

impl<'a> DocumentSummary<'a> {
    pub fn new(
        file: OsString, document: &'a PsdDocument, events: Option<&'a [DecodeEvent]>
    ) -> DocumentSummary<'a> {
        DocumentSummary {
            file,
            document,
            events
        }
    }
}

impl<'a> Serialize for DocumentSummary<'a> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        let layers: Vec<LayerSummary> = self
            .document
            .layers
            .iter()
            .map(|outcome| LayerSummary {
                outcome,
                name: self
                    .document
                    .directory
                    .records
                    .get(outcome.index())
                    .map(|r| r.name_lossy().into_owned())
                    .unwrap_or_default()
            })
            .collect();

        let mut state =
            serializer.serialize_struct("Document", 9 + usize::from(self.events.is_some()))?;

        state.serialize_field("file", &self.file.to_string_lossy())?;
        state.serialize_field("header", &self.document.header)?;
        state.serialize_field("bit_depth", &self.document.header.bit_depth())?;
        state.serialize_field("color_mode_data_len", &self.document.color_mode_data_len)?;
        state.serialize_field("image_resources_len", &self.document.image_resources_len)?;
        state.serialize_field("directory", &self.document.directory)?;
        state.serialize_field("layers", &layers)?;
        state.serialize_field("global_mask", &self.document.global_mask)?;
        state.serialize_field("additional_info", &self.document.additional_info)?;

        if let Some(events) = self.events {
            state.serialize_field("events", events)?;
        }
        state.end()
    }
}

struct LayerSummary<'a> {
    outcome: &'a LayerOutcome,
    name:    String
}

impl<'a> Serialize for LayerSummary<'a> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        let mut state = serializer.serialize_struct("Layer", 5)?;

        state.serialize_field("index", &self.outcome.index())?;
        state.serialize_field("name", &self.name)?;

        match self.outcome {
            LayerOutcome::Decoded(layer) => {
                state.serialize_field("width", &layer.width())?;
                state.serialize_field("height", &layer.height())?;
                state.skip_field("error")?;
            }
            LayerOutcome::Failed { error, .. } => {
                state.skip_field("width")?;
                state.skip_field("height")?;
                state.serialize_field("error", &error.to_string().trim_end())?;
            }
        }
        state.end()
    }
}

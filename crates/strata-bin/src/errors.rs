/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::fmt::{Debug, Formatter};

use strata_psd::errors::PSDDecodeErrors;

/// Errors that stop the command line workflow
pub enum WorkflowErrors {
    Io(std::io::Error),
    Decode(PSDDecodeErrors),
    Png(png::EncodingError),
    Json(serde_json::Error)
}

impl Debug for WorkflowErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkflowErrors::Io(err) => writeln!(f, "I/O error: {err}"),
            WorkflowErrors::Decode(err) => writeln!(f, "Decoding error: {err:?}"),
            WorkflowErrors::Png(err) => writeln!(f, "Could not write png: {err}"),
            WorkflowErrors::Json(err) => writeln!(f, "Could not serialize document: {err}")
        }
    }
}

impl From<std::io::Error> for WorkflowErrors {
    fn from(value: std::io::Error) -> Self {
        WorkflowErrors::Io(value)
    }
}

impl From<PSDDecodeErrors> for WorkflowErrors {
    fn from(value: PSDDecodeErrors) -> Self {
        WorkflowErrors::Decode(value)
    }
}

impl From<png::EncodingError> for WorkflowErrors {
    fn from(value: png::EncodingError) -> Self {
        WorkflowErrors::Png(value)
    }
}

impl From<serde_json::Error> for WorkflowErrors {
    fn from(value: serde_json::Error) -> Self {
        WorkflowErrors::Json(value)
    }
}

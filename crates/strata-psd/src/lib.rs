/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A Photoshop PSD layer decoder
//!
//! This crate walks the structure of a `.psd` document and reconstructs every
//! layer as its own 8 bit RGBA image.
//!
//! ## What it does
//! - Validates the file header and steps over color mode data and image resources
//! - Parses every layer record, including layer names and additional info framing
//! - Decodes raw and PackBits (RLE) channel data and composites it into RGBA
//! - Reads the global layer mask and walks the trailing additional info blocks
//!
//! ## What it doesn't
//! Blending layers together, ZIP compressed channels, depths other than 8 bits,
//! the merged composite image and the large document (`.psb`) variant.
//!
//! A layer that can't be decoded doesn't fail the document, it is reported
//! alongside the ones that could be.
//!
//! # Example
//! - Decoding every layer of a document
//! ```no_run
//! use strata_psd::errors::PSDDecodeErrors;
//! use strata_psd::PSDLayerDecoder;
//!
//! fn main() -> Result<(), PSDDecodeErrors> {
//!     use strata_psd::strata_core::bytestream::ZCursor;
//!     let data = std::fs::read("image.psd").unwrap();
//!     let mut decoder = PSDLayerDecoder::new(ZCursor::new(data));
//!
//!     let document = decoder.decode()?;
//!
//!     for (index, error) in document.failed_layers() {
//!         eprintln!("layer {index}: {error}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! - Streaming layers as they are decoded and collecting events
//! ```no_run
//! use strata_psd::diagnostics::EventLog;
//! use strata_psd::strata_core::bytestream::ZCursor;
//! use strata_psd::strata_core::options::DecoderOptions;
//! use strata_psd::PSDLayerDecoder;
//!
//! let data = std::fs::read("image.psd").unwrap();
//! let options = DecoderOptions::default().set_strict_mode(true);
//! let mut decoder = PSDLayerDecoder::new_with_sink(ZCursor::new(data), options, EventLog::new());
//!
//! decoder
//!     .decode_layers_with(|index, record, layer| {
//!         println!("{index} {} {}", record.name_lossy(), layer.is_ok());
//!     })
//!     .unwrap();
//!
//! println!("{} events", decoder.sink().events().len());
//! ```
#![no_std]
#![forbid(unsafe_code)]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub extern crate strata_core;

pub use decoder::{LayerAndMaskTrailer, LayerOutcome, PSDLayerDecoder, PsdDocument};

pub mod additional;
pub mod composite;
pub mod constants;
pub mod decoder;
pub mod diagnostics;
pub mod errors;
pub mod header;
pub mod layers;
pub mod mask;
pub mod rle;
pub mod sections;

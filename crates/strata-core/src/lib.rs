/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Core routines shared by the strata decoders
//!
//! It currently contains
//!
//! - A bytestream reader with position tracking and big endian reads
//! - A growable bytestream writer used by encoding helpers
//! - Bit depth information shared by images
//! - Decoder options
//! - A log facade that compiles to nothing when the `log` feature is off
//!
//! This library is `#[no_std]` with `alloc` needed for defining `Vec`
//! which we need for storing decoded bytes.
//!
//! # Features
//!  - `std`: Implements the reader trait for `std::io` types
//!
//!  - `log`: Forward the log macros to the [log](https://docs.rs/log) crate
//!
//!  - `serde`: Enables serializing of some of the data structures
//!     present in the crate
//!
#![cfg_attr(not(feature = "std"), no_std)]
#![macro_use]
extern crate alloc;

pub mod bit_depth;
pub mod bytestream;
pub mod log;
pub mod options;
pub mod serde;

/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A simple implementation of a bytestream reader
//! and writer.
//!
//! The reader tracks how many bytes it has consumed so that decoders
//! can report the offset of any failure and reconcile declared
//! section lengths against what they actually read.
//!
//! All multi-byte integers are read and written big endian, which
//! is the only byte order the layered formats here use.
pub use reader::{ZByteIoError, ZCursor, ZReader};
pub use traits::ZByteReaderTrait;
pub use writer::ZByteWriter;

mod reader;
mod traits;
mod writer;

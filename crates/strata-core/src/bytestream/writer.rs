/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use alloc::vec::Vec;

/// Encapsulates a simple growable byte writer
/// with big endian writes
///
/// Writes can't fail, the buffer grows as needed.
#[derive(Default, Clone, Debug)]
pub struct ZByteWriter {
    buffer: Vec<u8>
}

impl ZByteWriter {
    /// Create a new writer for the stream
    pub fn new() -> ZByteWriter {
        ZByteWriter { buffer: Vec::new() }
    }

    /// Create a new writer with space for `capacity` bytes
    /// before it reallocates
    pub fn with_capacity(capacity: usize) -> ZByteWriter {
        ZByteWriter {
            buffer: Vec::with_capacity(capacity)
        }
    }

    /// Return the number of bytes the writer has written
    ///
    /// ```
    /// use strata_core::bytestream::ZByteWriter;
    /// let mut stream = ZByteWriter::new();
    /// stream.write_u16_be(1);
    /// assert_eq!(stream.position(), 2);
    /// ```
    pub fn position(&self) -> usize {
        self.buffer.len()
    }

    /// Write a single byte
    pub fn write_u8(&mut self, byte: u8) {
        self.buffer.push(byte);
    }

    /// Write a single signed byte
    pub fn write_i8(&mut self, byte: i8) {
        self.buffer.push(byte as u8);
    }

    /// Write all bytes of `buf`
    pub fn write_all(&mut self, buf: &[u8]) {
        self.buffer.extend_from_slice(buf);
    }

    /// Write `count` zero bytes, used for reserved fields and padding
    pub fn write_zeros(&mut self, count: usize) {
        self.buffer.resize(self.buffer.len() + count, 0);
    }

    /// Overwrite a previously written big endian `u32` at `position`
    ///
    /// Useful for length prefixes whose value is only known once the
    /// section body has been written.
    ///
    /// # Panics
    /// If `position + 4` is past what has been written
    pub fn patch_u32_be(&mut self, position: usize, value: u32) {
        self.buffer[position..position + 4].copy_from_slice(&value.to_be_bytes());
    }

    /// Borrow the bytes written so far
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Destroy the writer returning the written bytes
    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }
}

macro_rules! write_single_type {
    ($name:tt,$int_type:tt) => {
        impl ZByteWriter {
            #[doc=concat!("Write ",stringify!($int_type)," as a big endian integer")]
            #[inline]
            pub fn $name(&mut self, value: $int_type) {
                self.buffer.extend_from_slice(&value.to_be_bytes());
            }
        }
    };
}

write_single_type!(write_u16_be, u16);
write_single_type!(write_i16_be, i16);
write_single_type!(write_u32_be, u32);
write_single_type!(write_i32_be, i32);
write_single_type!(write_u64_be, u64);

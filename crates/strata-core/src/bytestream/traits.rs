/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! Traits for reading bytes in strata
//!
//! This exposes the trait implemented by every byte source a decoder
//! can read from.

use crate::bytestream::reader::ZByteIoError;

/// The de-facto Input trait implemented for readers.
///
/// # Considerations
///
/// If you have an in memory buffer, prefer [`ZCursor`](crate::bytestream::ZCursor) over
/// [`Cursor`](std::io::Cursor), it never has to query an underlying object for its size.
///
/// Implementations must not advance their position when an operation fails,
/// the reader relies on this to report the offset at which a short read happened.
pub trait ZByteReaderTrait {
    /// Read exact bytes required to fill `buf` or return an error if that isn't possible
    ///
    /// ## Arguments
    ///  - `buf`: Buffer to fill with bytes from the underlying reader
    ///  ## Errors
    /// [`ZByteIoError::EndOfStream`] if fewer than `buf.len()` bytes remain,
    /// other variants for failures of the underlying source
    fn read_exact_bytes(&mut self, buf: &mut [u8]) -> Result<(), ZByteIoError>;

    /// Read exact bytes required to fill `buf` or return an error if that isn't possible
    ///
    /// This is the same as [`read_exact_bytes`](Self::read_exact_bytes) but implemented as a separate
    /// method to allow some implementations to optimize it to cost fewer instructions
    fn read_const_bytes<const N: usize>(&mut self, buf: &mut [u8; N]) -> Result<(), ZByteIoError> {
        self.read_exact_bytes(buf)
    }

    /// Advance the position by `num` bytes without materializing them
    ///
    /// ## Errors
    /// [`ZByteIoError::EndOfStream`] if fewer than `num` bytes remain,
    /// the position is left untouched in that case.
    fn z_skip(&mut self, num: u64) -> Result<(), ZByteIoError>;

    /// Return the current position of the inner cursor.
    fn z_position(&mut self) -> Result<u64, ZByteIoError>;

    /// Return the total size of the underlying source in bytes
    fn z_size(&mut self) -> Result<u64, ZByteIoError>;

    /// Number of bytes left between the current position and the end of the source
    fn z_remaining(&mut self) -> Result<u64, ZByteIoError> {
        let size = self.z_size()?;
        let position = self.z_position()?;

        Ok(size.saturating_sub(position))
    }

    /// Report whether we are at the end of a stream.
    fn is_eof(&mut self) -> Result<bool, ZByteIoError> {
        Ok(self.z_remaining()? == 0)
    }
}

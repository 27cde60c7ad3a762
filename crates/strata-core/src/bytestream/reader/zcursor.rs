/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use crate::bytestream::{ZByteIoError, ZByteReaderTrait};

/// An in memory byte source
///
/// Works with anything that can be viewed as a byte slice,
/// e.g `&[u8]`, `Vec<u8>` or arrays.
pub struct ZCursor<T: AsRef<[u8]>> {
    stream:   T,
    position: usize
}

impl<T: AsRef<[u8]>> ZCursor<T> {
    pub fn new(buffer: T) -> ZCursor<T> {
        ZCursor {
            stream:   buffer,
            position: 0
        }
    }

    /// Return the bytes that have not been consumed yet
    pub fn remaining_slice(&self) -> &[u8] {
        let data = self.stream.as_ref();
        &data[self.position.min(data.len())..]
    }

    fn not_enough(&self, requested: usize) -> ZByteIoError {
        ZByteIoError::EndOfStream {
            offset:    self.position as u64,
            requested: requested as u64,
            available: self.remaining_slice().len() as u64
        }
    }
}

impl<T: AsRef<[u8]>> ZByteReaderTrait for ZCursor<T> {
    #[inline(always)]
    fn read_exact_bytes(&mut self, buf: &mut [u8]) -> Result<(), ZByteIoError> {
        let remaining = self.remaining_slice();

        match remaining.get(..buf.len()) {
            Some(bytes) => {
                buf.copy_from_slice(bytes);
                self.position += buf.len();
                Ok(())
            }
            None => Err(self.not_enough(buf.len()))
        }
    }

    #[inline(always)]
    fn read_const_bytes<const N: usize>(&mut self, buf: &mut [u8; N]) -> Result<(), ZByteIoError> {
        let remaining = self.remaining_slice();

        match remaining.get(..N) {
            Some(bytes) => {
                buf.copy_from_slice(bytes);
                self.position += N;
                Ok(())
            }
            None => Err(self.not_enough(N))
        }
    }

    #[inline]
    fn z_skip(&mut self, num: u64) -> Result<(), ZByteIoError> {
        let available = self.remaining_slice().len();
        let num = usize::try_from(num).map_err(ZByteIoError::from)?;

        if num > available {
            return Err(self.not_enough(num));
        }
        self.position += num;
        Ok(())
    }

    #[inline(always)]
    fn z_position(&mut self) -> Result<u64, ZByteIoError> {
        Ok(self.position as u64)
    }

    #[inline(always)]
    fn z_size(&mut self) -> Result<u64, ZByteIoError> {
        Ok(self.stream.as_ref().len() as u64)
    }
}

/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use alloc::vec;
use alloc::vec::Vec;
use core::fmt::{Debug, Display, Formatter};

pub use zcursor::ZCursor;

use crate::bytestream::ZByteReaderTrait;

mod std_readers;
mod zcursor;

/// Errors that can occur when pulling bytes out of a source
pub enum ZByteIoError {
    /// An error from the underlying `std::io` object
    #[cfg(feature = "std")]
    StdIoError(std::io::Error),
    /// A size or position could not be represented
    TryFromIntError(core::num::TryFromIntError),
    /// Fewer bytes remain than a read or skip requested.
    ///
    /// This is reported separately from [`StdIoError`](Self::StdIoError) so that decoders can
    /// tell a short document apart from a failing device.
    EndOfStream {
        /// Position at which the read was attempted
        offset:    u64,
        /// Bytes requested
        requested: u64,
        /// Bytes that were actually left
        available: u64
    },
    /// Generic message
    Generic(&'static str)
}

impl Debug for ZByteIoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            #[cfg(feature = "std")]
            ZByteIoError::StdIoError(err) => {
                writeln!(f, "Underlying I/O error {}", err)
            }
            ZByteIoError::TryFromIntError(err) => {
                writeln!(f, "Cannot convert to int {}", err)
            }
            ZByteIoError::EndOfStream {
                offset,
                requested,
                available
            } => {
                writeln!(
                    f,
                    "Not enough bytes at offset {offset}, expected {requested} but found {available}"
                )
            }
            ZByteIoError::Generic(err) => {
                writeln!(f, "Generic I/O error: {err}")
            }
        }
    }
}

impl Display for ZByteIoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ZByteIoError {}

#[cfg(feature = "std")]
impl From<std::io::Error> for ZByteIoError {
    fn from(value: std::io::Error) -> Self {
        ZByteIoError::StdIoError(value)
    }
}

impl From<core::num::TryFromIntError> for ZByteIoError {
    fn from(value: core::num::TryFromIntError) -> Self {
        ZByteIoError::TryFromIntError(value)
    }
}

impl From<&'static str> for ZByteIoError {
    fn from(value: &'static str) -> Self {
        ZByteIoError::Generic(value)
    }
}

/// A forward reader over a byte source.
///
/// Every successful read or skip advances [`position`](Self::position) by exactly
/// the number of bytes consumed, failed ones leave it untouched.
pub struct ZReader<T: ZByteReaderTrait> {
    inner:    T,
    position: u64
}

impl<T: ZByteReaderTrait> ZReader<T> {
    /// Create a reader whose positions are counted from zero
    pub fn new(source: T) -> ZReader<T> {
        ZReader::with_origin(source, 0)
    }

    /// Create a reader whose positions start at `origin`.
    ///
    /// Used when a region of a larger document has been extracted into memory
    /// and errors should still report offsets relative to the whole document.
    pub fn with_origin(source: T, origin: u64) -> ZReader<T> {
        ZReader {
            inner:    source,
            position: origin
        }
    }

    /// Destroy this reader returning
    /// the underlying source of the bytes
    /// from which we were decoding
    #[inline(always)]
    pub fn consume(self) -> T {
        self.inner
    }

    /// Number of bytes consumed so far, plus the origin
    #[inline(always)]
    pub const fn position(&self) -> u64 {
        self.position
    }

    /// Skip `num` bytes, failing with `EndOfStream` if they are not there
    #[inline]
    pub fn skip(&mut self, num: u64) -> Result<(), ZByteIoError> {
        match self.inner.z_skip(num) {
            Ok(()) => {
                self.position += num;
                Ok(())
            }
            Err(e) => Err(self.rebase(e))
        }
    }

    #[inline(always)]
    pub fn get_u8_err(&mut self) -> Result<u8, ZByteIoError> {
        let buf = self.read_fixed_bytes_or_error::<1>()?;
        Ok(buf[0])
    }

    #[inline(always)]
    pub fn get_i8_err(&mut self) -> Result<i8, ZByteIoError> {
        let buf = self.read_fixed_bytes_or_error::<1>()?;
        Ok(i8::from_be_bytes(buf))
    }

    #[inline(always)]
    pub fn read_fixed_bytes_or_error<const N: usize>(&mut self) -> Result<[u8; N], ZByteIoError> {
        let mut byte_store: [u8; N] = [0; N];
        match self.inner.read_const_bytes(&mut byte_store) {
            Ok(()) => {
                self.position += N as u64;
                Ok(byte_store)
            }
            Err(e) => Err(self.rebase(e))
        }
    }

    /// Fill `buf` completely or fail without consuming anything
    pub fn read_exact_bytes(&mut self, buf: &mut [u8]) -> Result<(), ZByteIoError> {
        match self.inner.read_exact_bytes(buf) {
            Ok(()) => {
                self.position += buf.len() as u64;
                Ok(())
            }
            Err(e) => Err(self.rebase(e))
        }
    }

    /// Read `num` bytes into a freshly allocated vector.
    ///
    /// The remaining size of the source is checked first so a corrupt
    /// length field can't make us allocate more than the document holds.
    pub fn read_bytes_vec(&mut self, num: usize) -> Result<Vec<u8>, ZByteIoError> {
        let remaining = self.inner.z_remaining()?;

        if (num as u64) > remaining {
            return Err(ZByteIoError::EndOfStream {
                offset:    self.position,
                requested: num as u64,
                available: remaining
            });
        }
        let mut buf = vec![0; num];
        self.read_exact_bytes(&mut buf)?;
        Ok(buf)
    }

    /// Bytes left in the underlying source
    #[inline]
    pub fn remaining(&mut self) -> Result<u64, ZByteIoError> {
        self.inner.z_remaining()
    }

    #[inline(always)]
    pub fn eof(&mut self) -> Result<bool, ZByteIoError> {
        self.inner.is_eof()
    }

    /// Sources report offsets relative to themselves, move them into our
    /// coordinate space so an origin set by [`with_origin`](Self::with_origin) is respected.
    fn rebase(&self, err: ZByteIoError) -> ZByteIoError {
        match err {
            ZByteIoError::EndOfStream {
                requested,
                available,
                ..
            } => ZByteIoError::EndOfStream {
                offset: self.position,
                requested,
                available
            },
            e => e
        }
    }
}

macro_rules! get_single_type {
    ($name:tt,$int_type:tt) => {
        impl<T: ZByteReaderTrait> ZReader<T> {
            #[doc=concat!("Read ",stringify!($int_type)," as a big endian integer")]
            #[doc=concat!("Returning an error if the underlying buffer cannot support a ",stringify!($int_type)," read.")]
            #[inline]
            pub fn $name(&mut self) -> Result<$int_type, ZByteIoError> {
                const SIZE_OF_VAL: usize = core::mem::size_of::<$int_type>();

                let space = self.read_fixed_bytes_or_error::<SIZE_OF_VAL>()?;

                Ok($int_type::from_be_bytes(space))
            }
        }
    };
}

get_single_type!(get_u16_be_err, u16);
get_single_type!(get_i16_be_err, i16);
get_single_type!(get_u32_be_err, u32);
get_single_type!(get_i32_be_err, i32);
get_single_type!(get_u64_be_err, u64);

#[cfg(test)]
mod tests {
    use crate::bytestream::{ZByteIoError, ZCursor, ZReader};

    #[test]
    fn reads_are_big_endian_and_advance() {
        let mut reader = ZReader::new(ZCursor::new([0x12, 0x34, 0xFF, 0xFE, 0, 0, 0, 7]));

        assert_eq!(reader.get_u16_be_err().unwrap(), 0x1234);
        assert_eq!(reader.position(), 2);
        assert_eq!(reader.get_i16_be_err().unwrap(), -2);
        assert_eq!(reader.get_u32_be_err().unwrap(), 7);
        assert_eq!(reader.position(), 8);
        assert!(reader.eof().unwrap());
    }

    #[test]
    fn short_read_reports_end_of_stream_and_keeps_position() {
        let mut reader = ZReader::new(ZCursor::new([1, 2, 3]));
        reader.get_u8_err().unwrap();

        let err = reader.get_u32_be_err().unwrap_err();

        assert!(matches!(
            err,
            ZByteIoError::EndOfStream {
                offset:    1,
                requested: 4,
                available: 2
            }
        ));
        assert_eq!(reader.position(), 1);
        assert_eq!(reader.get_u16_be_err().unwrap(), 0x0203);
    }

    #[test]
    fn skip_past_end_fails() {
        let mut reader = ZReader::new(ZCursor::new([0; 4]));

        reader.skip(3).unwrap();
        assert!(matches!(
            reader.skip(2).unwrap_err(),
            ZByteIoError::EndOfStream { offset: 3, .. }
        ));
        assert_eq!(reader.position(), 3);
    }

    #[test]
    fn origin_shifts_reported_offsets() {
        let mut reader = ZReader::with_origin(ZCursor::new([0; 2]), 100);

        reader.get_u8_err().unwrap();
        assert_eq!(reader.position(), 101);

        let err = reader.read_bytes_vec(4).unwrap_err();
        assert!(matches!(err, ZByteIoError::EndOfStream { offset: 101, .. }));
    }
}

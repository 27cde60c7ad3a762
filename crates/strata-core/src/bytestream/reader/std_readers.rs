/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

#![cfg(feature = "std")]

use std::io::{BufReader, Read, Seek, SeekFrom};

use crate::bytestream::reader::ZByteIoError;
use crate::bytestream::ZByteReaderTrait;

/// Check that `requested` bytes exist past the current position of a seekable object.
///
/// `Read::read_exact` leaves the position unspecified on failure, so we
/// answer the question up front instead.
fn ensure_available<S: Seek>(
    stream: &mut S, requested: u64
) -> Result<(), ZByteIoError> {
    let position = stream.stream_position()?;
    let len = stream.seek(SeekFrom::End(0))?;

    // Avoid seeking a third time when we were already at the end of the
    // stream. The branch is usually way cheaper than a seek operation.
    if position != len {
        stream.seek(SeekFrom::Start(position))?;
    }
    let available = len.saturating_sub(position);

    if requested > available {
        return Err(ZByteIoError::EndOfStream {
            offset: position,
            requested,
            available
        });
    }
    Ok(())
}

fn seek_size<S: Seek>(stream: &mut S) -> Result<u64, ZByteIoError> {
    let old_pos = stream.stream_position()?;
    let len = stream.seek(SeekFrom::End(0))?;

    if old_pos != len {
        stream.seek(SeekFrom::Start(old_pos))?;
    }
    Ok(len)
}

impl<T> ZByteReaderTrait for std::io::Cursor<T>
where
    T: AsRef<[u8]>
{
    #[inline(always)]
    fn read_exact_bytes(&mut self, buf: &mut [u8]) -> Result<(), ZByteIoError> {
        ensure_available(self, buf.len() as u64)?;
        self.read_exact(buf).map_err(ZByteIoError::from)
    }

    fn z_skip(&mut self, num: u64) -> Result<(), ZByteIoError> {
        ensure_available(self, num)?;
        let num = i64::try_from(num).map_err(ZByteIoError::from)?;
        self.seek(SeekFrom::Current(num))?;
        Ok(())
    }

    fn z_position(&mut self) -> Result<u64, ZByteIoError> {
        Ok(self.position())
    }

    fn z_size(&mut self) -> Result<u64, ZByteIoError> {
        Ok(self.get_ref().as_ref().len() as u64)
    }
}

impl<T: Read + Seek> ZByteReaderTrait for BufReader<T> {
    fn read_exact_bytes(&mut self, buf: &mut [u8]) -> Result<(), ZByteIoError> {
        ensure_available(self, buf.len() as u64)?;
        self.read_exact(buf).map_err(ZByteIoError::from)
    }

    fn z_skip(&mut self, num: u64) -> Result<(), ZByteIoError> {
        ensure_available(self, num)?;
        let num = i64::try_from(num).map_err(ZByteIoError::from)?;
        // seek_relative keeps the buffer when the target is inside it
        self.seek_relative(num)?;
        Ok(())
    }

    fn z_position(&mut self) -> Result<u64, ZByteIoError> {
        self.stream_position().map_err(ZByteIoError::from)
    }

    fn z_size(&mut self) -> Result<u64, ZByteIoError> {
        seek_size(self)
    }
}

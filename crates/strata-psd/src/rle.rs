/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! PackBits run length coding of channel planes
//!
//! A compressed plane starts with one big endian `u16` per row giving the
//! compressed size of that row, followed by the rows themselves.
//!
//! Inside a row a control byte `c` read as `i8` means
//! - `0..=127`: copy the next `c + 1` bytes
//! - `-128..=-1`: repeat the next byte `1 - c` times
use alloc::vec;
use alloc::vec::Vec;

use crate::errors::PSDDecodeErrors;

/// Longest run or literal the encoder emits, repeats of 129 are never written
const MAX_RUN: usize = 128;

/// Decompress a `width * height` plane from `data`.
///
/// `origin` is the absolute offset of `data[0]` in the document, errors
/// report offsets relative to it.
///
/// Every row consumes exactly the bytes its table entry declares. Rows that
/// decode to fewer than `width` samples leave the rest zeroed.
///
/// Returns the plane and the number of bytes of `data` that were used.
///
/// # Errors
/// - `TruncatedStream`: the row table or a row needs more bytes than `data` has left
/// - `RunOverflow`: a run or literal would write past the end of its row
pub fn decompress_plane(
    width: usize, height: usize, data: &[u8], origin: u64
) -> Result<(Vec<u8>, usize), PSDDecodeErrors> {
    let table_size = height * 2;

    if data.len() < table_size {
        return Err(PSDDecodeErrors::TruncatedStream {
            offset:    origin,
            requested: table_size,
            available: data.len()
        });
    }
    let (table, mut rows) = data.split_at(table_size);
    let mut out = vec![0_u8; width * height];
    let mut position = table_size;

    for (row, (row_lengths, out_row)) in table
        .chunks_exact(2)
        .zip(out.chunks_exact_mut(width.max(1)))
        .enumerate()
    {
        let row_length = usize::from(u16::from_be_bytes([row_lengths[0], row_lengths[1]]));

        if row_length > rows.len() {
            return Err(PSDDecodeErrors::TruncatedStream {
                offset:    origin + position as u64,
                requested: row_length,
                available: rows.len()
            });
        }
        let (current, rest) = rows.split_at(row_length);

        decode_row(current, out_row, row, origin + position as u64)?;

        rows = rest;
        position += row_length;
    }
    Ok((out, position))
}

/// Decode one row, `origin` is the offset of `row[0]`
fn decode_row(
    row: &[u8], out: &mut [u8], row_index: usize, origin: u64
) -> Result<(), PSDDecodeErrors> {
    let width = out.len();
    let mut src = 0;
    let mut dst = 0;

    while src < row.len() {
        let control = row[src] as i8;
        let control_offset = origin + src as u64;
        src += 1;

        match control {
            i8::MIN..=-1 => {
                let run = (1 - isize::from(control)) as usize;

                if dst + run > width {
                    return Err(PSDDecodeErrors::RunOverflow {
                        offset: control_offset,
                        row: row_index,
                        end: dst + run,
                        width
                    });
                }
                let Some(value) = row.get(src) else {
                    return Err(PSDDecodeErrors::TruncatedStream {
                        offset:    control_offset,
                        requested: 1,
                        available: 0
                    });
                };
                out[dst..dst + run].fill(*value);
                src += 1;
                dst += run;
            }
            _ => {
                let run = control as usize + 1;

                if dst + run > width {
                    return Err(PSDDecodeErrors::RunOverflow {
                        offset: control_offset,
                        row: row_index,
                        end: dst + run,
                        width
                    });
                }
                if src + run > row.len() {
                    return Err(PSDDecodeErrors::TruncatedStream {
                        offset:    control_offset,
                        requested: run,
                        available: row.len() - src
                    });
                }
                out[dst..dst + run].copy_from_slice(&row[src..src + run]);
                src += run;
                dst += run;
            }
        }
    }
    Ok(())
}

/// PackBits encode a single row, appending to `out`
///
/// Runs of two or more equal bytes become repeats, everything else is
/// grouped into literals.
pub fn compress_row(row: &[u8], out: &mut Vec<u8>) {
    let mut i = 0;

    while i < row.len() {
        let run = row[i..]
            .iter()
            .take(MAX_RUN)
            .take_while(|x| **x == row[i])
            .count();

        if run >= 2 {
            out.push((1 - run as isize) as i8 as u8);
            out.push(row[i]);
            i += run;
            continue;
        }
        // literal until the next pair of equal bytes
        let start = i;
        while i < row.len() && i - start < MAX_RUN {
            if i + 1 < row.len() && row[i] == row[i + 1] {
                break;
            }
            i += 1;
        }
        out.push((i - start - 1) as u8);
        out.extend_from_slice(&row[start..i]);
    }
}

/// Encode a `width * height` plane into the row table + rows layout
/// read by [`decompress_plane`]
///
/// Returns `None` if `plane` isn't `width * height` bytes long or a
/// compressed row doesn't fit the `u16` row table
pub fn compress_plane(width: usize, height: usize, plane: &[u8]) -> Option<Vec<u8>> {
    if plane.len() != width * height {
        return None;
    }

    let mut rows = Vec::with_capacity(plane.len());
    let mut table = Vec::with_capacity(height * 2);

    for row in plane.chunks_exact(width.max(1)).take(height) {
        let start = rows.len();
        compress_row(row, &mut rows);
        let length = u16::try_from(rows.len() - start).ok()?;
        table.extend_from_slice(&length.to_be_bytes());
    }
    if width == 0 {
        table.resize(height * 2, 0);
    }
    table.extend_from_slice(&rows);
    Some(table)
}

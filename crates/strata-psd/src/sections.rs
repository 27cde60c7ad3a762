/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Length prefixed sections we step over without interpreting
use strata_core::bytestream::{ZByteReaderTrait, ZReader};

use crate::diagnostics::{DecodeEvent, DiagnosticSink, Section};
use crate::errors::PSDDecodeErrors;

/// Read a `u32` length and skip that many bytes.
///
/// Returns the declared length. Used for the color mode data
/// and image resources sections.
pub fn skip_section<T, S>(
    stream: &mut ZReader<T>, section: Section, sink: &mut S
) -> Result<u32, PSDDecodeErrors>
where
    T: ZByteReaderTrait,
    S: DiagnosticSink
{
    let offset = stream.position();
    let length = stream.get_u32_be_err()?;

    sink.on_event(&DecodeEvent::SectionEntered {
        section,
        offset,
        length: u64::from(length)
    });
    stream.skip(u64::from(length))?;

    Ok(length)
}

#[cfg(test)]
mod tests {
    use strata_core::bytestream::{ZCursor, ZReader};

    use crate::diagnostics::{NoopSink, Section};
    use crate::errors::PSDDecodeErrors;
    use crate::sections::skip_section;

    #[test]
    fn skips_declared_bytes() {
        let data = [0, 0, 0, 3, 9, 9, 9, 7];
        let mut stream = ZReader::new(ZCursor::new(data));

        let len = skip_section(&mut stream, Section::ColorModeData, &mut NoopSink).unwrap();

        assert_eq!(len, 3);
        assert_eq!(stream.get_u8_err().unwrap(), 7);
    }

    #[test]
    fn length_past_end_of_stream() {
        let data = [0, 0, 0, 16, 9, 9];
        let mut stream = ZReader::new(ZCursor::new(data));

        let err = skip_section(&mut stream, Section::ImageResources, &mut NoopSink).unwrap_err();
        assert!(matches!(
            err,
            PSDDecodeErrors::EndOfStream {
                offset:    4,
                requested: 16,
                available: 2
            }
        ));
    }
}

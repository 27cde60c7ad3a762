/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Interleaving decoded channel planes into RGBA layers
use alloc::vec::Vec;

use crate::errors::PSDDecodeErrors;
use crate::layers::LayerBounds;

/// Value every pixel starts at before channels are written.
///
/// Color is black, alpha is opaque so layers without a transparency
/// channel come out visible.
pub const DEFAULT_PIXEL: [u8; 4] = [0, 0, 0, 255];

/// Slot of an RGBA pixel a channel id writes to
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ChannelRole {
    Red,
    Green,
    Blue,
    /// Transparency mask, id `-1`
    Alpha
}

impl ChannelRole {
    /// Map a channel id to its role.
    ///
    /// User (`-2`) and real user (`-3`) masks as well as anything
    /// past blue return `None`
    pub const fn from_id(id: i16) -> Option<ChannelRole> {
        match id {
            -1 => Some(ChannelRole::Alpha),
            0 => Some(ChannelRole::Red),
            1 => Some(ChannelRole::Green),
            2 => Some(ChannelRole::Blue),
            _ => None
        }
    }

    /// Index of the role inside an RGBA pixel
    pub const fn component(self) -> usize {
        match self {
            ChannelRole::Red => 0,
            ChannelRole::Green => 1,
            ChannelRole::Blue => 2,
            ChannelRole::Alpha => 3
        }
    }
}

/// An 8 bit RGBA interleaved image
#[derive(Clone, Eq, PartialEq)]
pub struct LayerImage {
    width:  usize,
    height: usize,
    pixels: Vec<u8>
}

impl LayerImage {
    /// Create an image with every pixel set to [`DEFAULT_PIXEL`]
    pub fn new(width: usize, height: usize) -> LayerImage {
        LayerImage::with_fill(width, height, DEFAULT_PIXEL)
    }

    pub fn with_fill(width: usize, height: usize, fill: [u8; 4]) -> LayerImage {
        let pixels = fill
            .iter()
            .copied()
            .cycle()
            .take(width * height * 4)
            .collect();

        LayerImage {
            width,
            height,
            pixels
        }
    }

    pub const fn width(&self) -> usize {
        self.width
    }

    pub const fn height(&self) -> usize {
        self.height
    }

    /// Interleaved RGBA samples, row major
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// The RGBA value at `(x, y)`, `None` when outside the image
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = (y * self.width + x) * 4;
        self.pixels[start..start + 4].try_into().ok()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }
}

impl core::fmt::Debug for LayerImage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LayerImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// Write one decoded plane into its slot of `image`.
///
/// `offset` is where the channel's data started in the document, it is only
/// used for error reporting.
///
/// # Errors
/// - `ChannelUnderrun`: the plane holds fewer than `width * height` samples,
///   nothing is written in that case
/// - `UnknownChannelRole`: `channel_id` has no RGBA slot
pub fn composite_channel(
    image: &mut LayerImage, plane: &[u8], channel_id: i16, offset: u64
) -> Result<(), PSDDecodeErrors> {
    let expected = image.width * image.height;

    if plane.len() < expected {
        return Err(PSDDecodeErrors::ChannelUnderrun {
            offset,
            expected,
            available: plane.len()
        });
    }
    let Some(role) = ChannelRole::from_id(channel_id) else {
        return Err(PSDDecodeErrors::UnknownChannelRole {
            offset,
            role: channel_id
        });
    };
    let component = role.component();

    for (pixel, sample) in image.pixels.chunks_exact_mut(4).zip(plane) {
        pixel[component] = *sample;
    }
    Ok(())
}

/// A layer whose channels have all been composited
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DecodedLayer {
    /// Position in the layer directory, bottom most first
    pub index:  usize,
    pub bounds: LayerBounds,
    pub image:  LayerImage
}

impl DecodedLayer {
    pub const fn width(&self) -> usize {
        self.image.width()
    }

    pub const fn height(&self) -> usize {
        self.image.height()
    }

    /// Layers with zero area carry no pixels
    pub fn is_empty(&self) -> bool {
        self.image.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::composite::{composite_channel, ChannelRole, LayerImage, DEFAULT_PIXEL};
    use crate::errors::PSDDecodeErrors;

    #[test]
    fn roles_from_ids() {
        assert_eq!(ChannelRole::from_id(-1), Some(ChannelRole::Alpha));
        assert_eq!(ChannelRole::from_id(2), Some(ChannelRole::Blue));
        assert_eq!(ChannelRole::from_id(-2), None);
        assert_eq!(ChannelRole::from_id(3), None);
    }

    #[test]
    fn channels_land_in_their_slot() {
        let mut image = LayerImage::new(2, 1);

        composite_channel(&mut image, &[10, 20], 0, 0).unwrap();
        composite_channel(&mut image, &[30, 40], 2, 0).unwrap();
        composite_channel(&mut image, &[50, 60], -1, 0).unwrap();

        assert_eq!(image.pixels(), &[10, 0, 30, 50, 20, 0, 40, 60]);
    }

    #[test]
    fn short_plane_underruns_without_writing() {
        let mut image = LayerImage::new(2, 2);
        let err = composite_channel(&mut image, &[1, 2, 3], 0, 40).unwrap_err();

        assert!(matches!(
            err,
            PSDDecodeErrors::ChannelUnderrun {
                offset:    40,
                expected:  4,
                available: 3
            }
        ));
        assert_eq!(image.pixel(0, 0), Some(DEFAULT_PIXEL));
    }

    #[test]
    fn mask_channel_has_no_role() {
        let mut image = LayerImage::new(1, 1);
        let err = composite_channel(&mut image, &[1], -2, 0).unwrap_err();
        assert!(matches!(err, PSDDecodeErrors::UnknownChannelRole { role: -2, .. }));
    }

    #[test]
    fn pixel_lookup_bounds() {
        let image = LayerImage::with_fill(3, 2, [1, 2, 3, 4]);
        assert_eq!(image.pixel(2, 1), Some([1, 2, 3, 4]));
        assert_eq!(image.pixel(3, 0), None);
        assert_eq!(image.pixels().len(), 24);
    }
}

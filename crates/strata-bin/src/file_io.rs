/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use log::info;
use png::{BitDepth, ColorType, Encoder};
use strata_psd::composite::DecodedLayer;

use crate::errors::WorkflowErrors;

/// Name of the file a layer is written to
pub fn layer_file_name(layer: &DecodedLayer) -> String {
    format!("layer{}.png", layer.index)
}

/// Write a decoded layer as an 8 bit RGBA png inside `directory`
///
/// Returns the path written to.
pub fn write_layer_png(directory: &Path, layer: &DecodedLayer) -> Result<PathBuf, WorkflowErrors> {
    let path = directory.join(layer_file_name(layer));
    let file = File::create(&path)?;

    let mut encoder = Encoder::new(
        BufWriter::new(file),
        layer.width() as u32,
        layer.height() as u32
    );
    encoder.set_color(ColorType::Rgba);
    encoder.set_depth(BitDepth::Eight);

    let mut writer = encoder.write_header()?;
    writer.write_image_data(layer.image.pixels())?;
    writer.finish()?;

    info!("Wrote {:?}", path);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use strata_psd::composite::{DecodedLayer, LayerImage};
    use strata_psd::layers::LayerBounds;

    use crate::file_io::{layer_file_name, write_layer_png};

    #[test]
    fn writes_readable_png() {
        let layer = DecodedLayer {
            index:  3,
            bounds: LayerBounds::default(),
            image:  LayerImage::with_fill(3, 2, [10, 20, 30, 40])
        };
        let directory = std::env::temp_dir().join("strata-bin-file-io-test");
        std::fs::create_dir_all(&directory).unwrap();

        let path = write_layer_png(&directory, &layer).unwrap();
        assert!(path.ends_with(layer_file_name(&layer)));

        let decoder = png::Decoder::new(std::fs::File::open(&path).unwrap());
        let mut reader = decoder.read_info().unwrap();
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).unwrap();

        assert_eq!((info.width, info.height), (3, 2));
        assert_eq!(&buf[..4], &[10, 20, 30, 40]);

        std::fs::remove_file(path).unwrap();
    }
}

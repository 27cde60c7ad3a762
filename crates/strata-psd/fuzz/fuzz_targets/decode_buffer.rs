#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    use strata_psd::diagnostics::NoopSink;
    use strata_psd::strata_core::bytestream::ZCursor;
    use strata_psd::strata_core::options::DecoderOptions;

    let options = DecoderOptions::default()
        .set_max_width(1 << 12)
        .set_max_height(1 << 12);

    let mut decoder = strata_psd::PSDLayerDecoder::new_with_sink(ZCursor::new(data), options, NoopSink);
    let _ = decoder.decode();
});

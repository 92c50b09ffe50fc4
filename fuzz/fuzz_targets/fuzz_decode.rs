#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Must never panic, whatever the bytes
    let _ = winbmp::probe(data);
    let _ = winbmp::decode_bmp(data, enough::Unstoppable);

    let limits = winbmp::Limits::default().with_max_pixels(1 << 16);
    let _ = winbmp::DecodeRequest::new(data)
        .with_limits(&limits)
        .decode(enough::Unstoppable);
});

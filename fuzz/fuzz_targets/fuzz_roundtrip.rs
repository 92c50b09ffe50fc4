#![no_main]
use libfuzzer_sys::fuzz_target;
use winbmp::*;

fuzz_target!(|data: &[u8]| {
    // Anything that decodes must survive encode -> decode unchanged
    let Ok(decoded) = decode_bmp(data, enough::Unstoppable) else {
        return;
    };

    // RLE leaves unwritten cells transparent; the decoder reads everything back opaque.
    if decoded.rows().flatten().any(|px| px.a != 255) {
        return;
    }

    let reencoded = encode_bmp(decoded.as_ref(), enough::Unstoppable)
        .expect("decoded raster must be encodable");
    let Ok(decoded2) = decode_bmp(&reencoded, enough::Unstoppable) else {
        panic!("re-encoded data failed to decode");
    };

    assert_eq!(decoded.width(), decoded2.width());
    assert_eq!(decoded.height(), decoded2.height());
    assert!(decoded.rows().eq(decoded2.rows()), "roundtrip pixel mismatch");
});

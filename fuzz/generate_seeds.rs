#!/usr/bin/env -S cargo +nightly -Zscript
//! Generate seed corpus files for fuzzing.
//! Run: cargo +nightly -Zscript fuzz/generate_seeds.rs

fn bmp(width: i32, height: i32, bpp: u16, compression: u32, palette: &[[u8; 4]], pixels: &[u8]) -> Vec<u8> {
    let offset = 54 + palette.len() as u32 * 4;
    let mut out = Vec::new();
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&(offset + pixels.len() as u32).to_le_bytes());
    out.extend_from_slice(&[0; 4]);
    out.extend_from_slice(&offset.to_le_bytes());
    out.extend_from_slice(&40u32.to_le_bytes());
    out.extend_from_slice(&width.to_le_bytes());
    out.extend_from_slice(&height.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&bpp.to_le_bytes());
    out.extend_from_slice(&compression.to_le_bytes());
    out.extend_from_slice(&(pixels.len() as u32).to_le_bytes());
    out.extend_from_slice(&2835i32.to_le_bytes());
    out.extend_from_slice(&2835i32.to_le_bytes());
    out.extend_from_slice(&(palette.len() as u32).to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    for entry in palette {
        out.extend_from_slice(entry);
    }
    out.extend_from_slice(pixels);
    out
}

fn main() {
    use std::fs;
    let dir = "fuzz/corpus/fuzz_decode";
    fs::create_dir_all(dir).unwrap();

    let pal = [[0, 0, 0, 0], [0, 0, 0xff, 0], [0, 0xff, 0, 0], [0xff, 0, 0, 0]];

    let seeds: [(&str, Vec<u8>); 10] = [
        ("bgr24_1x1.bmp", bmp(1, 1, 24, 0, &[], &[0xff, 0, 0, 0])),
        ("bgr24_topdown_2x2.bmp", bmp(2, -2, 24, 0, &[], &[0xff; 16])),
        ("bgrx32_2x1.bmp", bmp(2, 1, 32, 0, &[], &[1, 2, 3, 4, 5, 6, 7, 8])),
        ("rgb555_3x1.bmp", bmp(3, 1, 16, 0, &[], &[0, 0x7c, 0xe0, 0x03, 0x1f, 0, 0, 0])),
        ("pal8_3x2.bmp", bmp(3, 2, 8, 0, &pal, &[1, 2, 3, 0, 0, 3, 2, 0])),
        ("pal4_3x2.bmp", bmp(3, 2, 4, 0, &pal, &[0x12, 0x30, 0, 0, 0x01, 0, 0, 0])),
        ("rle8_3x2.bmp", bmp(3, 2, 8, 1, &pal, &[0, 3, 1, 2, 3, 0, 0, 0, 0, 2, 1, 0, 2, 1, 0, 1])),
        ("rle4_4x2.bmp", bmp(4, 2, 4, 2, &pal, &[4, 0x12, 0, 0, 0, 3, 0x30, 0x02, 0x10, 0, 1, 0, 0, 1])),
        ("rle8_no_eob.bmp", bmp(2, 1, 8, 1, &pal, &[2, 1])),
        ("empty_3x0.bmp", bmp(3, 0, 32, 0, &[], &[])),
    ];
    for (name, bytes) in seeds {
        fs::write(format!("{dir}/{name}"), bytes).unwrap();
    }

    // Truncated/malformed seeds for edge coverage
    fs::write(format!("{dir}/empty.bin"), b"").unwrap();
    fs::write(format!("{dir}/bm_short.bin"), b"BM\x00\x00").unwrap();
    fs::write(format!("{dir}/rle8_truncated.bin"), bmp(4, 2, 8, 1, &pal, &[2, 1, 0])).unwrap();

    println!("Generated seed corpus in {dir}/");
}

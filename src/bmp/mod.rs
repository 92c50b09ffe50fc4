//! BMP decode orchestration and encoder entry (internal).
//!
//! Use top-level [`crate::decode_bmp`], [`crate::encode_bmp`], etc.

mod encode;
pub(crate) mod header;
mod palette;
mod pixels;
mod rle;
mod utils;

use alloc::vec::Vec;

use enough::Stop;
use imgref::ImgRef;
use rgb::RGBA8;

use crate::RgbaImage;
use crate::error::BmpError;
use crate::limits::Limits;
use header::{BmpHeader, Compression, HEADER_SIZE};
use palette::Palette;

/// Decode a complete BMP file held in `data`.
///
/// The header is validated and checked against `limits` before anything
/// proportional to the image size is allocated.
pub(crate) fn decode(
    data: &[u8],
    limits: Option<&Limits>,
    stop: &dyn Stop,
) -> Result<RgbaImage, BmpError> {
    let header = BmpHeader::parse(data)?;
    if let Some(limits) = limits {
        // Both dimensions are bounded by 32767 after parsing.
        limits.check(header.width() as u32, header.effective_height() as u32)?;
    }
    stop.check()?;

    // Everything after the header: palette, gap, and pixel array.
    let region = &data[HEADER_SIZE..];
    let bpp = header.bits_per_pixel;
    match (bpp, header.compression) {
        (24 | 32, Compression::None) => {
            log::trace!("BMP path: direct {bpp} bpp");
            pixels::decode_direct(region, &header, stop)
        }
        (16, Compression::None) => {
            log::trace!("BMP path: packed 16 bpp");
            pixels::decode_packed16(region, &header, stop)
        }
        (8, Compression::None) => {
            log::trace!("BMP path: indexed 8 bpp");
            let palette = Palette::read(region, &header)?;
            pixels::decode_indexed8(region, &header, &palette, stop)
        }
        (4, Compression::None) => {
            log::trace!("BMP path: indexed 4 bpp");
            let palette = Palette::read(region, &header)?;
            pixels::decode_indexed4(region, &header, &palette, stop)
        }
        (8, Compression::Rle8) | (4, Compression::Rle4) => {
            log::trace!("BMP path: RLE{bpp}");
            let palette = Palette::read(region, &header)?;
            let bitmap = rle::decode(region, &header, bpp, stop)?;
            pixels::resolve_indexed(&bitmap, &palette, stop)
        }
        (bpp, compression) => Err(BmpError::UnsupportedFormat(alloc::format!(
            "{bpp} bpp with {compression:?} compression"
        ))),
    }
}

/// Encode to a 32 bpp uncompressed BMP.
pub(crate) fn encode(image: ImgRef<'_, RGBA8>, stop: &dyn Stop) -> Result<Vec<u8>, BmpError> {
    encode::encode_bmp(image, stop)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use alloc::vec;
    use enough::{StopReason, Unstoppable};
    use header::tests::header_bytes;

    /// A stop that has already fired.
    pub(crate) struct AlwaysStop;

    impl Stop for AlwaysStop {
        fn check(&self) -> Result<(), StopReason> {
            Err(StopReason::Cancelled)
        }
    }

    fn decode_all(data: &[u8]) -> Result<RgbaImage, BmpError> {
        decode(data, None, &Unstoppable)
    }

    fn with_palette(mut file: Vec<u8>, colors: &[[u8; 4]]) -> Vec<u8> {
        for c in colors {
            file.extend_from_slice(c);
        }
        file
    }

    #[test]
    fn dispatches_rle8() {
        let mut file = with_palette(
            header_bytes(3, 2, 8, 1, 2),
            &[[0, 0, 0, 0], [0x30, 0x20, 0x10, 0]],
        );
        file.extend_from_slice(&[0x03, 0x01, 0x00, 0x00, 0x01, 0x00, 0x00, 0x01]);
        let img = decode_all(&file).unwrap();
        let buf = img.buf();
        assert_eq!(buf[0..3], [RGBA8::new(0x10, 0x20, 0x30, 255); 3]);
        assert_eq!(buf[3], RGBA8::new(0, 0, 0, 255));
        // Unwritten cells stay transparent.
        assert_eq!(buf[4], RGBA8::new(0, 0, 0, 0));
        assert_eq!(buf[5], RGBA8::new(0, 0, 0, 0));
    }

    #[test]
    fn rle_index_outside_palette() {
        let mut file = with_palette(header_bytes(2, 1, 4, 2, 2), &[[0; 4], [0; 4]]);
        file.extend_from_slice(&[0x02, 0x1F, 0x00, 0x01]);
        assert!(matches!(
            decode_all(&file),
            Err(BmpError::PaletteIndexOutOfRange { index: 15, len: 2 })
        ));
    }

    #[test]
    fn unsupported_depth_and_compression_pairs() {
        for (bpp, comp) in [(1u16, 0u32), (2, 0), (16, 1), (24, 1), (8, 2), (4, 1), (32, 2), (0, 0)] {
            let mut file = header_bytes(1, 1, bpp, comp, 0);
            file.extend_from_slice(&[0u8; 64]);
            assert!(
                matches!(decode_all(&file), Err(BmpError::UnsupportedFormat(_))),
                "{bpp} bpp / compression {comp}"
            );
        }
    }

    #[test]
    fn limits_checked_before_decoding() {
        // Declares 1000x1000 but carries no pixel data: the limit fires first.
        let file = header_bytes(1000, 1000, 24, 0, 0);
        let limits = Limits::default().with_max_pixels(10_000);
        assert!(matches!(
            decode(&file, Some(&limits), &Unstoppable),
            Err(BmpError::LimitExceeded(_))
        ));
        assert!(matches!(
            decode_all(&file),
            Err(BmpError::TruncatedInput { .. })
        ));
    }

    #[test]
    fn zero_sized_files_decode_to_empty_rasters() {
        for (w, h, bpp, comp) in [(0, 5, 24, 0), (4, 0, 32, 0), (0, -2, 8, 0), (3, 0, 8, 1)] {
            let img = decode_all(&header_bytes(w, h, bpp, comp, 0)).unwrap();
            assert_eq!(
                (img.width(), img.height()),
                (w as usize, h.unsigned_abs() as usize),
                "{w}x{h} at {bpp} bpp"
            );
        }
    }

    #[test]
    fn stop_fires_before_dispatch() {
        let mut file = header_bytes(1, 1, 24, 0, 0);
        file.extend_from_slice(&[0; 4]);
        assert!(matches!(
            decode(&file, None, &AlwaysStop),
            Err(BmpError::Cancelled(StopReason::Cancelled))
        ));
    }

    #[test]
    fn encode_then_decode() {
        let pixels = vec![
            RGBA8::new(255, 0, 0, 255),
            RGBA8::new(0, 255, 0, 255),
            RGBA8::new(0, 0, 255, 255),
            RGBA8::new(7, 8, 9, 255),
        ];
        let bytes = encode(ImgRef::new(&pixels[..], 2, 2), &Unstoppable).unwrap();
        let img = decode_all(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (2, 2));
        assert_eq!(img.buf()[..], pixels[..]);
    }
}

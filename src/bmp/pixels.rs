//! Per-bit-depth pixel decoders for uncompressed data, plus palette
//! resolution of RLE output.
//!
//! Every decoder reads rows of the format's 4-byte padded stride starting at
//! `header.offset - 54` within the post-header region, and writes output row
//! 0 as the top of the image whatever the storage order.

use alloc::vec;
use alloc::vec::Vec;

use enough::Stop;
use imgref::ImgVec;
use rgb::RGBA8;

use super::header::{BmpHeader, Compression};
use super::palette::Palette;
use super::rle::IndexedBitmap;
use super::utils::{nibbles, padded_row_bytes};
use crate::RgbaImage;
use crate::error::BmpError;

const TRANSPARENT: RGBA8 = RGBA8 {
    r: 0,
    g: 0,
    b: 0,
    a: 0,
};

/// 24- and 32-bit BGR(X). The fourth byte of 32-bit pixels is ignored.
pub(crate) fn decode_direct(
    region: &[u8],
    header: &BmpHeader,
    stop: &dyn Stop,
) -> Result<RgbaImage, BmpError> {
    let bytes_per_pixel = match header.bits_per_pixel {
        24 => 3,
        32 => 4,
        bpp => {
            return Err(BmpError::UnsupportedFormat(alloc::format!(
                "direct decoder got {bpp} bpp"
            )));
        }
    };
    decode_rows(region, header, stop, |src, out| {
        for (px, bgr) in out.iter_mut().zip(src.chunks_exact(bytes_per_pixel)) {
            *px = RGBA8::new(bgr[2], bgr[1], bgr[0], 255);
        }
        Ok(())
    })
}

/// 16-bit X1R5G5B5, each channel shifted into the top five bits.
pub(crate) fn decode_packed16(
    region: &[u8],
    header: &BmpHeader,
    stop: &dyn Stop,
) -> Result<RgbaImage, BmpError> {
    if header.compression != Compression::None {
        return Err(BmpError::UnsupportedFormat(alloc::format!(
            "16 bpp with {:?} compression",
            header.compression
        )));
    }
    decode_rows(region, header, stop, |src, out| {
        for (px, word) in out.iter_mut().zip(src.chunks_exact(2)) {
            *px = rgb555(u16::from_le_bytes([word[0], word[1]]));
        }
        Ok(())
    })
}

#[inline]
fn rgb555(v: u16) -> RGBA8 {
    let channel = |shift: u16| (((v >> shift) & 0x1F) << 3) as u8;
    RGBA8::new(channel(10), channel(5), channel(0), 255)
}

/// 8-bit palette indices, one per byte.
pub(crate) fn decode_indexed8(
    region: &[u8],
    header: &BmpHeader,
    palette: &Palette,
    stop: &dyn Stop,
) -> Result<RgbaImage, BmpError> {
    decode_rows(region, header, stop, |src, out| {
        for (px, &index) in out.iter_mut().zip(src) {
            *px = palette.get(index)?;
        }
        Ok(())
    })
}

/// 4-bit palette indices, two per byte, high nibble first.
pub(crate) fn decode_indexed4(
    region: &[u8],
    header: &BmpHeader,
    palette: &Palette,
    stop: &dyn Stop,
) -> Result<RgbaImage, BmpError> {
    decode_rows(region, header, stop, |src, out| {
        for (px, index) in out.iter_mut().zip(src.iter().flat_map(|&b| nibbles(b))) {
            *px = palette.get(index)?;
        }
        Ok(())
    })
}

/// Map RLE output through the palette. Cells the stream never wrote become
/// transparent black.
pub(crate) fn resolve_indexed(
    bitmap: &IndexedBitmap,
    palette: &Palette,
    stop: &dyn Stop,
) -> Result<RgbaImage, BmpError> {
    let (width, height) = (bitmap.width(), bitmap.height());
    let mut out = Vec::with_capacity(width * height);
    for y in 0..height {
        if y % 16 == 0 {
            stop.check()?;
        }
        for cell in bitmap.row(y) {
            out.push(match *cell {
                Some(index) => palette.get(index)?,
                None => TRANSPARENT,
            });
        }
    }
    Ok(raster(out, width, height))
}

/// Wrap a packed `width * height` buffer. A zero-width raster still needs a
/// non-zero stride.
fn raster(buf: Vec<RGBA8>, width: usize, height: usize) -> RgbaImage {
    ImgVec::new_stride(buf, width, height, width.max(1))
}

/// Shared row walker: validates that the whole pixel array is present,
/// allocates the output, then converts each stored row into its display row.
fn decode_rows<F>(
    region: &[u8],
    header: &BmpHeader,
    stop: &dyn Stop,
    mut convert_row: F,
) -> Result<RgbaImage, BmpError>
where
    F: FnMut(&[u8], &mut [RGBA8]) -> Result<(), BmpError>,
{
    let width = header.width();
    let height = header.effective_height();
    let stride = padded_row_bytes(width, header.bits_per_pixel)
        .ok_or_else(|| BmpError::Format(alloc::format!("row of {width} pixels overflows")))?;
    let base = header.data_base();
    let end = stride
        .checked_mul(height)
        .and_then(|len| len.checked_add(base))
        .ok_or_else(|| BmpError::Format("pixel array size overflows".into()))?;
    let pixels = region
        .get(base..end)
        .ok_or(BmpError::truncated(end, region.len()))?;

    let mut out = vec![TRANSPARENT; width * height];
    if out.is_empty() {
        return Ok(raster(out, width, height));
    }
    for (y, out_row) in out.chunks_exact_mut(width).enumerate() {
        if y % 16 == 0 {
            stop.check()?;
        }
        let start = header.source_row(y) * stride;
        convert_row(&pixels[start..start + stride], out_row)?;
    }
    Ok(raster(out, width, height))
}

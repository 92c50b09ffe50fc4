//! BMP encoder: uncompressed 32-bit BGRA, bottom-up.

use alloc::vec::Vec;

use enough::Stop;
use imgref::ImgRef;
use rgb::RGBA8;

use super::header::{BmpHeader, HEADER_SIZE, MAX_DIMENSION};
use crate::error::BmpError;

/// Encode an RGBA raster as a 32 bpp BMP with no palette.
///
/// Rows are written bottom row first, each pixel as B, G, R, A. The alpha
/// byte is stored as-is; the decoder treats it as padding. An empty raster
/// produces a bare 54-byte header.
pub(crate) fn encode_bmp(image: ImgRef<'_, RGBA8>, stop: &dyn Stop) -> Result<Vec<u8>, BmpError> {
    let (w, h) = (image.width(), image.height());
    let bound = MAX_DIMENSION as usize;
    if w > bound || h > bound {
        return Err(BmpError::InvalidInput(alloc::format!(
            "{w}x{h} exceeds the {bound} pixel bound"
        )));
    }
    let image_size = w
        .checked_mul(h)
        .and_then(|px| px.checked_mul(4))
        .and_then(|bytes| u32::try_from(bytes).ok())
        .filter(|bytes| bytes.checked_add(HEADER_SIZE as u32).is_some())
        .ok_or_else(|| BmpError::InvalidInput(alloc::format!("{w}x{h} is too large for BMP")))?;

    // Both dimensions are within 32767, so the casts are lossless.
    let header = BmpHeader::uncompressed(w as i32, h as i32, 32, image_size);
    let mut out = Vec::with_capacity(header.file_size as usize);
    header.write_to(&mut out);

    stop.check()?;
    for (n, row) in image.rows().rev().enumerate() {
        if n % 16 == 15 {
            stop.check()?;
        }
        for px in row {
            out.extend_from_slice(&[px.b, px.g, px.r, px.a]);
        }
    }

    debug_assert_eq!(out.len(), header.file_size as usize);
    Ok(out)
}

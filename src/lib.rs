//! # winbmp
//!
//! Windows Bitmap (BMP) decoder and encoder.
//!
//! Decoding produces an [`RgbaImage`] (an [`imgref::ImgVec`] of
//! [`rgb::RGBA8`]) whose row 0 is always the top of the picture, whatever
//! order the file stores its rows in.
//!
//! ## Supported Formats
//!
//! - 40-byte BITMAPINFOHEADER only
//! - 24 and 32 bpp direct color (the 32-bit fourth byte is ignored; output is opaque)
//! - 16 bpp X1R5G5B5
//! - 8 and 4 bpp palette images, uncompressed or RLE8/RLE4
//! - Encode: 32 bpp uncompressed, bottom-up
//!
//! ## Non-Goals
//!
//! - BITFIELDS, JPEG/PNG-in-BMP, and OS/2 or V4/V5 headers
//! - 1 and 2 bpp images
//! - Streaming decode: the whole file is buffered first
//!
//! ## Usage
//!
//! ```no_run
//! use winbmp::{ImageInfo, Unstoppable};
//!
//! let data: &[u8] = &[]; // your BMP bytes
//!
//! // Probe without decoding
//! let info = ImageInfo::from_bytes(data)?;
//! println!("{}x{} {} bpp", info.width, info.height, info.bits_per_pixel);
//!
//! let image = winbmp::decode_bmp(data, Unstoppable)?;
//! let encoded = winbmp::encode_bmp(image.as_ref(), Unstoppable)?;
//! # Ok::<(), winbmp::BmpError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

mod bmp;
mod decode;
mod error;
mod info;
mod limits;

use alloc::vec::Vec;

// Re-exports
pub use bmp::header::{BmpHeader, Compression, RowOrder};
pub use decode::DecodeRequest;
pub use enough::{Stop, StopReason, Unstoppable};
pub use error::BmpError;
pub use imgref::{ImgRef, ImgVec};
pub use info::ImageInfo;
pub use limits::Limits;
pub use rgb::RGBA8;

/// Decoded raster: 8-bit RGBA, row 0 at the top.
pub type RgbaImage = ImgVec<RGBA8>;

/// Decode a BMP file held in memory.
pub fn decode_bmp(data: &[u8], stop: impl Stop) -> Result<RgbaImage, BmpError> {
    bmp::decode(data, None, &stop)
}

/// Encode an RGBA raster as an uncompressed 32 bpp BMP.
pub fn encode_bmp(image: ImgRef<'_, RGBA8>, stop: impl Stop) -> Result<Vec<u8>, BmpError> {
    bmp::encode(image, &stop)
}

/// Read the header of a BMP file without decoding pixels.
pub fn probe(data: &[u8]) -> Result<ImageInfo, BmpError> {
    ImageInfo::from_bytes(data)
}

/// Read `reader` to the end, then decode.
#[cfg(feature = "std")]
pub fn decode_bmp_from_reader<R: std::io::Read>(
    mut reader: R,
    stop: impl Stop,
) -> Result<RgbaImage, BmpError> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    bmp::decode(&data, None, &stop)
}

/// Encode `image` and write the whole file to `writer`.
#[cfg(feature = "std")]
pub fn encode_bmp_to_writer<W: std::io::Write>(
    image: ImgRef<'_, RGBA8>,
    mut writer: W,
    stop: impl Stop,
) -> Result<(), BmpError> {
    let bytes = bmp::encode(image, &stop)?;
    writer.write_all(&bytes)?;
    Ok(())
}

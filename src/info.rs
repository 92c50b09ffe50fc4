use crate::bmp::header::{BmpHeader, Compression, RowOrder};
use crate::error::BmpError;

/// Image metadata read from the header alone, without decoding pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub bits_per_pixel: u16,
    pub compression: Compression,
    pub row_order: RowOrder,
    /// Palette entries declared by the header (0 for direct-color images
    /// or an implicit full table).
    pub palette_colors: u32,
}

impl ImageInfo {
    /// Probe the 54-byte header of a BMP file.
    pub fn from_bytes(data: &[u8]) -> Result<Self, BmpError> {
        Ok(Self::from(&BmpHeader::parse(data)?))
    }
}

impl From<&BmpHeader> for ImageInfo {
    fn from(header: &BmpHeader) -> Self {
        // Parsed headers keep both dimensions within 32767.
        Self {
            width: header.width() as u32,
            height: header.effective_height() as u32,
            bits_per_pixel: header.bits_per_pixel,
            compression: header.compression,
            row_order: header.row_order(),
            palette_colors: header.colors,
        }
    }
}

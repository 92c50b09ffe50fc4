//! BITMAPFILEHEADER + BITMAPINFOHEADER model.

use alloc::vec::Vec;

use super::utils::Cursor;
use crate::error::BmpError;

/// Size of the file header (14) plus the 40-byte DIB header.
pub const HEADER_SIZE: usize = 54;
/// The only DIB header variant accepted: BITMAPINFOHEADER.
pub const DIB_HEADER_SIZE: u32 = 40;
/// Sanity bound on each dimension, in pixels.
pub const MAX_DIMENSION: u32 = 32767;

const MAGIC: [u8; 2] = *b"BM";

/// Pixel data compression scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Compression {
    None,
    Rle8,
    Rle4,
}

impl Compression {
    fn from_u32(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::None),
            1 => Some(Self::Rle8),
            2 => Some(Self::Rle4),
            _ => None,
        }
    }

    pub const fn code(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Rle8 => 1,
            Self::Rle4 => 2,
        }
    }
}

/// Storage order of the pixel rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowOrder {
    /// The first stored row is the bottom of the image.
    BottomUp,
    /// The first stored row is the top of the image.
    TopDown,
}

/// Parsed 54-byte BMP header.
///
/// Field order matches the on-disk layout. Construct with [`BmpHeader::parse`];
/// a successfully parsed header upholds the decoder's invariants (magic,
/// DIB header size, compression code, dimension bounds, data offset).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BmpHeader {
    pub file_size: u32,
    pub reserved1: u16,
    pub reserved2: u16,
    /// Byte offset of the pixel array from the start of the file.
    pub offset: u32,
    pub dib_header_size: u32,
    pub width: i32,
    /// Positive for bottom-up storage, negative for top-down.
    pub height: i32,
    pub planes: u16,
    pub bits_per_pixel: u16,
    pub compression: Compression,
    pub image_size: u32,
    pub x_pixels_per_meter: i32,
    pub y_pixels_per_meter: i32,
    /// Number of palette entries (0 means the full `1 << bpp`).
    pub colors: u32,
    pub important_colors: u32,
}

impl BmpHeader {
    /// Parse and validate the first 54 bytes of `data`.
    pub fn parse(data: &[u8]) -> Result<Self, BmpError> {
        if data.len() < HEADER_SIZE {
            return Err(BmpError::truncated(HEADER_SIZE, data.len()));
        }
        let mut c = Cursor::new(&data[..HEADER_SIZE]);

        if c.take(2)? != MAGIC {
            return Err(BmpError::Format("missing BM signature".into()));
        }
        let file_size = c.read_u32_le()?;
        let reserved1 = c.read_u16_le()?;
        let reserved2 = c.read_u16_le()?;
        let offset = c.read_u32_le()?;

        let dib_header_size = c.read_u32_le()?;
        if dib_header_size != DIB_HEADER_SIZE {
            return Err(BmpError::Format(alloc::format!(
                "DIB header size {dib_header_size} unsupported (only 40-byte BITMAPINFOHEADER)"
            )));
        }

        let width = c.read_i32_le()?;
        let height = c.read_i32_le()?;
        let planes = c.read_u16_le()?;
        let bits_per_pixel = c.read_u16_le()?;
        let compression_code = c.read_u32_le()?;
        let image_size = c.read_u32_le()?;
        let x_pixels_per_meter = c.read_i32_le()?;
        let y_pixels_per_meter = c.read_i32_le()?;
        let colors = c.read_u32_le()?;
        let important_colors = c.read_u32_le()?;

        let compression = Compression::from_u32(compression_code).ok_or_else(|| {
            BmpError::UnsupportedFormat(alloc::format!(
                "compression code {compression_code} not supported"
            ))
        })?;

        if width < 0 {
            return Err(BmpError::Format(alloc::format!(
                "negative image width {width}"
            )));
        }
        if width.unsigned_abs() > MAX_DIMENSION || height.unsigned_abs() > MAX_DIMENSION {
            return Err(BmpError::Format(alloc::format!(
                "dimensions {width}x{height} exceed the {MAX_DIMENSION} pixel bound"
            )));
        }
        if (offset as usize) < HEADER_SIZE {
            return Err(BmpError::Format(alloc::format!(
                "pixel data offset {offset} overlaps the {HEADER_SIZE}-byte header"
            )));
        }

        let header = Self {
            file_size,
            reserved1,
            reserved2,
            offset,
            dib_header_size,
            width,
            height,
            planes,
            bits_per_pixel,
            compression,
            image_size,
            x_pixels_per_meter,
            y_pixels_per_meter,
            colors,
            important_colors,
        };
        log::trace!(
            "BMP header: {}x{} bpp={} compression={:?} offset={} colors={}",
            header.width,
            header.height,
            header.bits_per_pixel,
            header.compression,
            header.offset,
            header.colors
        );
        Ok(header)
    }

    /// Header for an uncompressed, palette-less image.
    ///
    /// Callers must keep `width`/`height` within `i32` and the sizes within
    /// `u32`; the encoder checks this before building the header.
    pub(crate) fn uncompressed(
        width: i32,
        height: i32,
        bits_per_pixel: u16,
        image_size: u32,
    ) -> Self {
        Self {
            file_size: image_size + HEADER_SIZE as u32,
            reserved1: 0,
            reserved2: 0,
            offset: HEADER_SIZE as u32,
            dib_header_size: DIB_HEADER_SIZE,
            width,
            height,
            planes: 1,
            bits_per_pixel,
            compression: Compression::None,
            image_size,
            // 72 DPI
            x_pixels_per_meter: 2835,
            y_pixels_per_meter: 2835,
            colors: 0,
            important_colors: 0,
        }
    }

    /// Append the 54-byte little-endian layout to `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&self.file_size.to_le_bytes());
        out.extend_from_slice(&self.reserved1.to_le_bytes());
        out.extend_from_slice(&self.reserved2.to_le_bytes());
        out.extend_from_slice(&self.offset.to_le_bytes());

        out.extend_from_slice(&self.dib_header_size.to_le_bytes());
        out.extend_from_slice(&self.width.to_le_bytes());
        out.extend_from_slice(&self.height.to_le_bytes());
        out.extend_from_slice(&self.planes.to_le_bytes());
        out.extend_from_slice(&self.bits_per_pixel.to_le_bytes());
        out.extend_from_slice(&self.compression.code().to_le_bytes());
        out.extend_from_slice(&self.image_size.to_le_bytes());
        out.extend_from_slice(&self.x_pixels_per_meter.to_le_bytes());
        out.extend_from_slice(&self.y_pixels_per_meter.to_le_bytes());
        out.extend_from_slice(&self.colors.to_le_bytes());
        out.extend_from_slice(&self.important_colors.to_le_bytes());
    }

    /// Bottom-up only for uncompressed data with a positive height.
    pub fn row_order(&self) -> RowOrder {
        if self.height > 0 && self.compression == Compression::None {
            RowOrder::BottomUp
        } else {
            RowOrder::TopDown
        }
    }

    pub fn width(&self) -> usize {
        self.width.unsigned_abs() as usize
    }

    /// `|height|`, the number of rows regardless of storage order.
    pub fn effective_height(&self) -> usize {
        self.height.unsigned_abs() as usize
    }

    /// Offset of the pixel array within the bytes following the header.
    pub(crate) fn data_base(&self) -> usize {
        self.offset as usize - HEADER_SIZE
    }

    /// Offset of the palette within the bytes following the header.
    pub(crate) fn palette_base(&self) -> usize {
        (self.dib_header_size - DIB_HEADER_SIZE) as usize
    }

    /// Source row index for output row `y`.
    pub(crate) fn source_row(&self, y: usize) -> usize {
        match self.row_order() {
            RowOrder::BottomUp => self.effective_height() - 1 - y,
            RowOrder::TopDown => y,
        }
    }
}

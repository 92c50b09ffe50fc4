//! Byte cursor and small layout helpers shared by the BMP stages.

use crate::error::BmpError;

/// Bounds-checked little-endian cursor over a byte slice.
///
/// Every read either succeeds or returns [`BmpError::TruncatedInput`];
/// the cursor never indexes past the end of `data`.
pub(crate) struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Cursor starting at `pos`. Fails if `pos` lies past the end.
    pub(crate) fn at(data: &'a [u8], pos: usize) -> Result<Self, BmpError> {
        if pos > data.len() {
            return Err(BmpError::truncated(pos, data.len()));
        }
        Ok(Self { data, pos })
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn take(&mut self, n: usize) -> Result<&'a [u8], BmpError> {
        let end = self
            .pos
            .checked_add(n)
            .ok_or(BmpError::truncated(usize::MAX, self.data.len()))?;
        let bytes = self
            .data
            .get(self.pos..end)
            .ok_or(BmpError::truncated(end, self.data.len()))?;
        self.pos = end;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], BmpError> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N)?);
        Ok(buf)
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8, BmpError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub(crate) fn read_u16_le(&mut self) -> Result<u16, BmpError> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub(crate) fn read_u32_le(&mut self) -> Result<u32, BmpError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub(crate) fn read_i32_le(&mut self) -> Result<i32, BmpError> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }
}

/// Bytes per stored row: `width * bpp` bits rounded up to a 4-byte boundary.
pub(crate) fn padded_row_bytes(width: usize, bits_per_pixel: u16) -> Option<usize> {
    width
        .checked_mul(usize::from(bits_per_pixel))?
        .checked_add(31)
        .map(|bits| bits / 32 * 4)
}

/// Split one byte into its two 4-bit indices, high nibble first.
#[inline]
pub(crate) const fn nibbles(byte: u8) -> [u8; 2] {
    [byte >> 4, byte & 0x0F]
}

//! Color table for indexed (4- and 8-bit) images.

use alloc::vec::Vec;

use rgb::RGBA8;

use super::header::BmpHeader;
use crate::error::BmpError;

/// Ordered palette entries, stored as RGBA (the on-disk order is B, G, R, reserved).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Palette {
    entries: Vec<RGBA8>,
}

impl Palette {
    /// Read the color table from `region`, the bytes following the 54-byte header.
    ///
    /// Exactly `header.colors` entries are read; a count of zero yields an
    /// empty table, so any index lookup fails.
    pub(crate) fn read(region: &[u8], header: &BmpHeader) -> Result<Self, BmpError> {
        let count = header.colors as usize;
        let start = header.palette_base();
        let end = count
            .checked_mul(4)
            .and_then(|len| len.checked_add(start))
            .ok_or(BmpError::truncated(usize::MAX, region.len()))?;
        let table = region
            .get(start..end)
            .ok_or(BmpError::truncated(end, region.len()))?;

        let entries = table
            .chunks_exact(4)
            .map(|bgra| RGBA8::new(bgra[2], bgra[1], bgra[0], bgra[3]))
            .collect::<Vec<_>>();
        log::debug!("BMP palette: {} entries", entries.len());
        Ok(Self { entries })
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Opaque color for palette `index`.
    #[inline]
    pub(crate) fn get(&self, index: u8) -> Result<RGBA8, BmpError> {
        let index = usize::from(index);
        self.entries
            .get(index)
            .map(|e| RGBA8::new(e.r, e.g, e.b, 255))
            .ok_or(BmpError::PaletteIndexOutOfRange {
                index,
                len: self.entries.len(),
            })
    }

    /// Raw entry including the stored reserved byte.
    #[cfg(test)]
    pub(crate) fn entry(&self, index: usize) -> Option<RGBA8> {
        self.entries.get(index).copied()
    }
}

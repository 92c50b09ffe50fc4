//! RLE4 / RLE8 decompression into a grid of palette indices.

use alloc::vec;
use alloc::vec::Vec;

use enough::Stop;

use super::header::BmpHeader;
use super::utils::{Cursor, nibbles};
use crate::error::BmpError;

const RLE_ESCAPE: u8 = 0;
const RLE_ESCAPE_EOL: u8 = 0;
const RLE_ESCAPE_EOB: u8 = 1;
const RLE_ESCAPE_DELTA: u8 = 2;

/// Height x width grid of palette indices produced by the RLE decoder.
///
/// Cells the stream never writes stay `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IndexedBitmap {
    width: usize,
    height: usize,
    cells: Vec<Option<u8>>,
}

impl IndexedBitmap {
    fn new(width: usize, height: usize) -> Result<Self, BmpError> {
        let len = width.checked_mul(height).ok_or_else(|| {
            BmpError::LimitExceeded(alloc::format!("{width}x{height} index grid"))
        })?;
        Ok(Self {
            width,
            height,
            cells: vec![None; len],
        })
    }

    pub(crate) fn width(&self) -> usize {
        self.width
    }

    pub(crate) fn height(&self) -> usize {
        self.height
    }

    /// Row `y`, top to bottom.
    pub(crate) fn row(&self, y: usize) -> &[Option<u8>] {
        &self.cells[y * self.width..(y + 1) * self.width]
    }

    #[cfg(test)]
    pub(crate) fn get(&self, x: usize, y: usize) -> Option<u8> {
        self.row(y)[x]
    }
}

/// One decoded RLE instruction.
#[derive(Debug, PartialEq, Eq)]
enum Insn<'a> {
    EndOfRow,
    EndOfBitmap,
    Delta { dx: u8, dy: u8 },
    /// Literal bytes, one per index. Padding has already been consumed.
    Absolute { data: &'a [u8] },
    Run { count: u8, value: u8 },
}

fn next_insn<'a>(c: &mut Cursor<'a>) -> Result<Insn<'a>, BmpError> {
    let first = c.read_u8()?;
    let second = c.read_u8()?;
    if first != RLE_ESCAPE {
        return Ok(Insn::Run {
            count: first,
            value: second,
        });
    }
    Ok(match second {
        RLE_ESCAPE_EOL => Insn::EndOfRow,
        RLE_ESCAPE_EOB => Insn::EndOfBitmap,
        RLE_ESCAPE_DELTA => {
            let dx = c.read_u8()?;
            let dy = c.read_u8()?;
            Insn::Delta { dx, dy }
        }
        count => {
            let len = usize::from(count);
            // Literal data is padded to a 16-bit boundary.
            let data = c.take(len + (len & 1))?;
            Insn::Absolute { data: &data[..len] }
        }
    })
}

/// Decompress the RLE pixel array of `region` (the bytes after the header).
///
/// `bits_per_index` selects RLE4 (4) or RLE8 (8). Rows are scanned in the
/// header's row order; writes past the right edge of a row are dropped.
///
/// The index grid is sized from the header alone, so a tiny stream can still
/// declare a 32767x32767 image. Callers that decode untrusted input should
/// set [`Limits`](crate::Limits).
pub(crate) fn decode(
    region: &[u8],
    header: &BmpHeader,
    bits_per_index: u16,
    stop: &dyn Stop,
) -> Result<IndexedBitmap, BmpError> {
    if bits_per_index != 4 && bits_per_index != 8 {
        return Err(BmpError::InvalidParameter(alloc::format!(
            "RLE index width must be 4 or 8 bits, got {bits_per_index}"
        )));
    }

    let width = header.width();
    let height = header.effective_height();
    let mut c = Cursor::at(region, header.data_base())?;
    // Any non-empty image needs at least one two-byte instruction.
    let needed = c.position() + 2;
    if height > 0 && region.len() < needed {
        return Err(BmpError::truncated(needed, region.len()));
    }
    let mut bitmap = IndexedBitmap::new(width, height)?;

    let mut line = 0usize;
    let mut x = 0usize;
    let mut insn_count = 0u32;

    while line < height {
        insn_count = insn_count.wrapping_add(1);
        if insn_count % 1024 == 0 {
            stop.check()?;
        }

        let row_start = header.source_row(line) * width;
        let row = &mut bitmap.cells[row_start..row_start + width];

        match next_insn(&mut c)? {
            Insn::EndOfRow => {
                line += 1;
                x = 0;
            }
            Insn::EndOfBitmap => {
                log::debug!("RLE end of bitmap at row {line}");
                return Ok(bitmap);
            }
            Insn::Delta { dx, dy } => {
                x = x.saturating_add(usize::from(dx));
                line += usize::from(dy);
                if line >= height {
                    return Err(BmpError::Format(alloc::format!(
                        "RLE delta moves to row {line}, image has {height}"
                    )));
                }
            }
            Insn::Absolute { data } => {
                if bits_per_index == 4 {
                    // Index i is the high nibble of byte i when i is even, else the low nibble.
                    let indices = data.iter().enumerate().map(|(i, &b)| nibbles(b)[i & 1]);
                    write_indices(row, &mut x, indices);
                } else {
                    write_indices(row, &mut x, data.iter().copied());
                }
            }
            Insn::Run { count, value } => {
                let count = usize::from(count);
                if bits_per_index == 4 {
                    let pair = nibbles(value);
                    write_indices(row, &mut x, (0..count).map(|i| pair[i & 1]));
                } else {
                    write_indices(row, &mut x, core::iter::repeat_n(value, count));
                }
            }
        }
    }

    // All rows consumed; a well-formed stream still carries an end-of-bitmap.
    let tail = region.get(c.position()..c.position() + 2);
    if tail == Some(&[RLE_ESCAPE, RLE_ESCAPE_EOB][..]) {
        log::trace!("RLE end of bitmap after last row");
    } else {
        log::warn!("RLE stream has no end-of-bitmap code");
    }
    Ok(bitmap)
}

/// Write `indices` from column `*x`, stopping at the end of `row`.
fn write_indices(row: &mut [Option<u8>], x: &mut usize, indices: impl Iterator<Item = u8>) {
    for index in indices {
        let Some(cell) = row.get_mut(*x) else {
            break;
        };
        *cell = Some(index);
        *x += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bmp::header::tests::header_bytes;
    use crate::bmp::tests::AlwaysStop;
    use enough::{StopReason, Unstoppable};

    /// Header with no palette so the RLE data starts right after it.
    fn header(width: i32, height: i32, bpp: u16) -> BmpHeader {
        let compression = if bpp == 4 { 2 } else { 1 };
        BmpHeader::parse(&header_bytes(width, height, bpp, compression, 0)).unwrap()
    }

    fn rle8(width: i32, height: i32, data: &[u8]) -> Result<IndexedBitmap, BmpError> {
        decode(data, &header(width, height, 8), 8, &Unstoppable)
    }

    fn rle4(width: i32, height: i32, data: &[u8]) -> Result<IndexedBitmap, BmpError> {
        decode(data, &header(width, height, 4), 4, &Unstoppable)
    }

    #[test]
    fn run_then_end_of_bitmap() {
        let bmp = rle8(4, 3, &[0x02, 0xAA, 0x00, 0x00, 0x00, 0x01]).unwrap();
        assert_eq!(bmp.row(0), &[Some(0xAA), Some(0xAA), None, None]);
        assert!(bmp.row(1).iter().all(Option::is_none));
        assert!(bmp.row(2).iter().all(Option::is_none));
    }

    #[test]
    fn rows_are_filled_in_scan_order() {
        let data = [
            0x02, 0x01, 0x00, 0x00, // row 0
            0x02, 0x02, 0x00, 0x00, // row 1
            0x00, 0x01,
        ];
        let bmp = rle8(2, 2, &data).unwrap();
        assert_eq!(bmp.row(0), &[Some(1), Some(1)]);
        assert_eq!(bmp.row(1), &[Some(2), Some(2)]);
    }

    #[test]
    fn run_stops_at_right_edge() {
        let data = [0x05, 0x07, 0x00, 0x00, 0x01, 0x09, 0x00, 0x01];
        let bmp = rle8(3, 2, &data).unwrap();
        assert_eq!(bmp.row(0), &[Some(7), Some(7), Some(7)]);
        // The overflow did not spill into the next row.
        assert_eq!(bmp.row(1), &[Some(9), None, None]);
    }

    #[test]
    fn absolute_rle8_with_odd_count_skips_padding() {
        // 3 literal bytes + 1 padding byte, then a run.
        let data = [0x00, 0x03, 0x01, 0x02, 0x03, 0xEE, 0x01, 0x04, 0x00, 0x01];
        let bmp = rle8(5, 1, &data).unwrap();
        assert_eq!(
            bmp.row(0),
            &[Some(1), Some(2), Some(3), Some(4), None]
        );
    }

    #[test]
    fn absolute_consumes_all_bytes_when_truncated_at_edge() {
        // Four literals into a 2-wide row; the next instruction must still
        // be read from the right place.
        let data = [0x00, 0x04, 0x01, 0x02, 0x03, 0x04, 0x00, 0x00, 0x01, 0x05, 0x00, 0x01];
        let bmp = rle8(2, 2, &data).unwrap();
        assert_eq!(bmp.row(0), &[Some(1), Some(2)]);
        assert_eq!(bmp.row(1), &[Some(5), None]);
    }

    #[test]
    fn delta_skips_columns_and_rows() {
        let data = [
            0x01, 0x01, // (0,0) = 1
            0x00, 0x02, 0x02, 0x01, // move right 2, down 1
            0x01, 0x03, // (3,1) = 3
            0x00, 0x01,
        ];
        let bmp = rle8(4, 3, &data).unwrap();
        assert_eq!(bmp.row(0), &[Some(1), None, None, None]);
        assert_eq!(bmp.row(1), &[None, None, None, Some(3)]);
        assert!(bmp.row(2).iter().all(Option::is_none));
    }

    #[test]
    fn delta_outside_image_is_an_error() {
        let data = [0x00, 0x02, 0x00, 0x05, 0x00, 0x01];
        assert!(matches!(rle8(2, 2, &data), Err(BmpError::Format(_))));
    }

    #[test]
    fn rle4_run_alternates_nibbles() {
        let data = [0x05, 0x12, 0x00, 0x01];
        let bmp = rle4(6, 1, &data).unwrap();
        assert_eq!(
            bmp.row(0),
            &[Some(1), Some(2), Some(1), Some(2), Some(1), None]
        );
    }

    #[test]
    fn rle4_absolute_odd_count_consumes_one_padding_byte() {
        // 5 literal bytes + 1 padding byte; each byte carries one index.
        let data = [
            0x00, 0x05, 0x10, 0x02, 0x30, 0x04, 0x50, 0xFF, // absolute + pad
            0x01, 0x66, // run of one index 6
            0x00, 0x01,
        ];
        let bmp = rle4(8, 1, &data).unwrap();
        assert_eq!(
            bmp.row(0),
            &[
                Some(1),
                Some(2),
                Some(3),
                Some(4),
                Some(5),
                Some(6),
                None,
                None
            ]
        );
    }

    #[test]
    fn rle4_absolute_even_count_has_no_padding() {
        let data = [0x00, 0x04, 0x10, 0x02, 0x30, 0x04, 0x01, 0x77, 0x00, 0x01];
        let bmp = rle4(5, 1, &data).unwrap();
        assert_eq!(bmp.row(0), &[Some(1), Some(2), Some(3), Some(4), Some(7)]);
    }

    #[test]
    fn rle4_absolute_reads_one_byte_per_index() {
        // Three bytes and a pad; the run after them must still be decoded.
        let data = [0x00, 0x03, 0x12, 0x34, 0x56, 0x00, 0x01, 0x77, 0x00, 0x01];
        let bmp = rle4(8, 1, &data).unwrap();
        assert_eq!(
            bmp.row(0),
            &[
                Some(1),
                Some(4),
                Some(5),
                Some(7),
                None,
                None,
                None,
                None
            ]
        );
    }

    #[test]
    fn ends_after_last_row_without_eob() {
        let data = [0x01, 0x05, 0x00, 0x00];
        let bmp = rle8(1, 1, &data).unwrap();
        assert_eq!(bmp.get(0, 0), Some(5));
    }

    #[test]
    fn truncated_stream_errors() {
        assert!(matches!(
            rle8(2, 2, &[0x02, 0x01, 0x00]),
            Err(BmpError::TruncatedInput { .. })
        ));
        // Absolute run announcing more literal bytes than remain.
        assert!(matches!(
            rle8(8, 1, &[0x00, 0x06, 0x01, 0x02]),
            Err(BmpError::TruncatedInput { .. })
        ));
    }

    #[test]
    fn respects_data_offset() {
        let mut bytes = header_bytes(2, 1, 8, 1, 0);
        bytes[10..14].copy_from_slice(&58u32.to_le_bytes());
        let header = BmpHeader::parse(&bytes).unwrap();
        let region = [0xDE, 0xAD, 0xBE, 0xEF, 0x02, 0x03, 0x00, 0x01];
        let bmp = decode(&region, &header, 8, &Unstoppable).unwrap();
        assert_eq!(bmp.row(0), &[Some(3), Some(3)]);
    }

    #[test]
    fn empty_stream_fails_before_allocating() {
        assert!(matches!(
            rle8(32767, 32767, &[]),
            Err(BmpError::TruncatedInput {
                needed: 2,
                actual: 0
            })
        ));
    }

    #[test]
    fn zero_height_needs_no_stream() {
        let bmp = rle8(3, 0, &[]).unwrap();
        assert_eq!((bmp.width(), bmp.height()), (3, 0));
    }

    #[test]
    fn stop_is_polled_between_instructions() {
        // 1100 runs into a 1x1 image: the writes are dropped but the stream keeps going.
        let data = [0x01, 0x05].repeat(1100);
        assert!(matches!(
            decode(&data, &header(1, 1, 8), 8, &AlwaysStop),
            Err(BmpError::Cancelled(StopReason::Cancelled))
        ));
    }

    #[test]
    fn rejects_other_index_widths() {
        let header = header(2, 1, 8);
        for bits in [1u16, 2, 16] {
            assert!(matches!(
                decode(&[0, 1], &header, bits, &Unstoppable),
                Err(BmpError::InvalidParameter(_))
            ));
        }
    }
}

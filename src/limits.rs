use crate::BmpError;

/// Resource limits applied after the header is parsed and before any
/// pixel buffer is allocated.
///
/// All fields default to `None` (no limit). The format's own bound of
/// 32767 pixels per side applies regardless of these settings.
///
/// Output buffers are sized from the header before the pixel stream is
/// read, so a few dozen bytes of RLE data can request gigabytes. Set limits
/// when decoding untrusted files.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Limits {
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    /// Maximum pixel count (width * height).
    pub max_pixels: Option<u64>,
    /// Maximum bytes for the decoded RGBA output.
    pub max_memory_bytes: Option<u64>,
}

impl Limits {
    pub const fn with_max_dimensions(mut self, width: u32, height: u32) -> Self {
        self.max_width = Some(width);
        self.max_height = Some(height);
        self
    }

    pub const fn with_max_pixels(mut self, pixels: u64) -> Self {
        self.max_pixels = Some(pixels);
        self
    }

    pub const fn with_max_memory_bytes(mut self, bytes: u64) -> Self {
        self.max_memory_bytes = Some(bytes);
        self
    }

    /// Check an output of `width` x `height` RGBA8 pixels against every limit.
    pub(crate) fn check(&self, width: u32, height: u32) -> Result<(), BmpError> {
        if self.max_width.is_some_and(|max| width > max) {
            return Err(BmpError::LimitExceeded(alloc::format!(
                "width {width} exceeds limit {}",
                self.max_width.unwrap_or_default()
            )));
        }
        if self.max_height.is_some_and(|max| height > max) {
            return Err(BmpError::LimitExceeded(alloc::format!(
                "height {height} exceeds limit {}",
                self.max_height.unwrap_or_default()
            )));
        }
        let pixels = u64::from(width) * u64::from(height);
        if let Some(max_px) = self.max_pixels {
            if pixels > max_px {
                return Err(BmpError::LimitExceeded(alloc::format!(
                    "pixel count {pixels} exceeds limit {max_px}"
                )));
            }
        }
        if let Some(max_mem) = self.max_memory_bytes {
            let bytes = pixels * 4;
            if bytes > max_mem {
                return Err(BmpError::LimitExceeded(alloc::format!(
                    "output of {bytes} bytes exceeds memory limit {max_mem}"
                )));
            }
        }
        Ok(())
    }
}

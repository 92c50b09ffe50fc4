use enough::Stop;

use crate::RgbaImage;
use crate::error::BmpError;
use crate::info::ImageInfo;
use crate::limits::Limits;

/// Builder for a single decode call.
///
/// ```no_run
/// use winbmp::{DecodeRequest, Limits, Unstoppable};
///
/// let data: &[u8] = &[]; // your BMP bytes
/// let limits = Limits::default().with_max_pixels(16 * 1024 * 1024);
/// let image = DecodeRequest::new(data)
///     .with_limits(&limits)
///     .decode(Unstoppable)?;
/// println!("{}x{}", image.width(), image.height());
/// # Ok::<(), winbmp::BmpError>(())
/// ```
#[derive(Clone, Debug)]
pub struct DecodeRequest<'a> {
    data: &'a [u8],
    limits: Option<&'a Limits>,
}

impl<'a> DecodeRequest<'a> {
    /// Request over a complete BMP file held in memory.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, limits: None }
    }

    /// Reject images whose dimensions or output size exceed `limits`.
    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Header-only probe; never touches pixel data.
    pub fn info(&self) -> Result<ImageInfo, BmpError> {
        ImageInfo::from_bytes(self.data)
    }

    /// Decode to an RGBA raster whose row 0 is the top of the image.
    pub fn decode(self, stop: impl Stop) -> Result<RgbaImage, BmpError> {
        crate::bmp::decode(self.data, self.limits, &stop)
    }
}

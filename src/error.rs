use alloc::string::String;
use enough::StopReason;

/// Errors from BMP decoding and encoding.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BmpError {
    /// Malformed header: bad magic, unsupported DIB header size, or
    /// dimensions outside the accepted range.
    #[error("invalid BMP: {0}")]
    Format(String),

    /// A bit depth or compression combination this decoder does not handle.
    #[error("unsupported BMP variant: {0}")]
    UnsupportedFormat(String),

    /// Fewer bytes than the header's offsets and sizes require.
    #[error("truncated input: need {needed} bytes, got {actual}")]
    TruncatedInput { needed: usize, actual: usize },

    #[error("palette index {index} out of range (palette has {len} entries)")]
    PaletteIndexOutOfRange { index: usize, len: usize },

    /// The raster handed to the encoder cannot be represented as a BMP.
    #[error("invalid input image: {0}")]
    InvalidInput(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("operation cancelled")]
    Cancelled(StopReason),

    #[cfg(feature = "std")]
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<StopReason> for BmpError {
    fn from(r: StopReason) -> Self {
        BmpError::Cancelled(r)
    }
}

impl BmpError {
    pub(crate) fn truncated(needed: usize, actual: usize) -> Self {
        BmpError::TruncatedInput { needed, actual }
    }
}

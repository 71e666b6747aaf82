use thiserror::Error;

/// Errors surfaced by the detector. None of them are transient; a failed call
/// leaves the detector exactly as it was before the call.
#[derive(Debug, Error)]
pub enum DetectorError {
    /// A frame (or intensity matrix) did not have the dimensions the detector
    /// was constructed for.
    #[error("dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    /// Construction parameters that would lead to a degenerate working resolution.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("downsample failed: {0}")]
    Resize(#[from] fast_image_resize::ResizeError),

    #[error("frame buffer rejected by resampler: {0}")]
    Buffer(#[from] fast_image_resize::ImageBufferError),
}

pub type Result<T, E = DetectorError> = std::result::Result<T, E>;

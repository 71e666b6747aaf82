// THEORY:
// The `Preprocessor` is the first stage of the pipeline. It turns a full
// resolution RGB frame into the small grayscale `IntensityMatrix` that every later
// stage works on.
//
// Key architectural principles:
// 1.  **Spatial Pooling**: Downsampling to a fixed working width (256 by default)
//     makes the cost of a frame independent of the camera, and the resampling
//     filter averages away single-pixel sensor noise before any differencing.
// 2.  **Aspect Preservation**: The working height is derived from the source
//     aspect ratio by truncation, so boxes rescale back without distortion.
// 3.  **Buffer Reuse**: The resampled frame is written into one persistent
//     working-resolution buffer. It is allocated on the first call and reused for
//     the lifetime of the stream; `has_buffer()` reports whether that has happened.
// 4.  **Channel Averaging**: Intensity is the truncating integer mean of the three
//     colour channels. No perceptual weighting is applied.

use crate::core_modules::intensity::IntensityMatrix;
use crate::error::{DetectorError, Result};
use fast_image_resize as fr;
use image::RgbImage;

const CHANNELS: usize = 3;

/// Derives the working height from the source aspect ratio.
///
/// `working_width * source_height / source_width` in integer arithmetic is the
/// truncation of `working_width / (source_width / source_height)` without the float
/// rounding error.
pub fn working_height(working_width: u32, source_width: u32, source_height: u32) -> Result<u32> {
    if source_width == 0 || source_height == 0 {
        return Err(DetectorError::InvalidConfiguration(format!(
            "source dimensions must be positive, got {}x{}",
            source_width, source_height
        )));
    }
    if working_width == 0 {
        return Err(DetectorError::InvalidConfiguration(
            "working width must be greater than zero".into(),
        ));
    }
    let height = working_width as u64 * source_height as u64 / source_width as u64;
    if height == 0 {
        return Err(DetectorError::InvalidConfiguration(format!(
            "source {}x{} is too wide for a working width of {}",
            source_width, source_height, working_width
        )));
    }
    u32::try_from(height).map_err(|_| {
        DetectorError::InvalidConfiguration(format!(
            "working height {} does not fit the working buffer",
            height
        ))
    })
}

/// Downsamples source frames and converts them into intensity matrices.
pub struct Preprocessor {
    source_width: u32,
    source_height: u32,
    working_width: u32,
    working_height: u32,
    resizer: fr::Resizer,
    options: fr::ResizeOptions,
    /// Working-resolution RGB buffer, created by the first call to `process`.
    buffer: Option<fr::images::Image<'static>>,
}

impl Preprocessor {
    pub fn new(source_width: u32, source_height: u32, working_width: u32) -> Result<Self> {
        let working_height = working_height(working_width, source_width, source_height)?;
        Ok(Self {
            source_width,
            source_height,
            working_width,
            working_height,
            resizer: fr::Resizer::new(),
            options: fr::ResizeOptions::new()
                .resize_alg(fr::ResizeAlg::Convolution(fr::FilterType::Bilinear)),
            buffer: None,
        })
    }

    pub fn working_size(&self) -> (u32, u32) {
        (self.working_width, self.working_height)
    }

    pub fn source_size(&self) -> (u32, u32) {
        (self.source_width, self.source_height)
    }

    pub fn has_buffer(&self) -> bool {
        self.buffer.is_some()
    }

    /// Resamples `frame` to working resolution and reduces it to one intensity byte
    /// per cell.
    pub fn process(&mut self, frame: &RgbImage) -> Result<IntensityMatrix> {
        let actual = frame.dimensions();
        if actual != self.source_size() {
            return Err(DetectorError::DimensionMismatch {
                expected: self.source_size(),
                actual,
            });
        }

        let src = fr::images::ImageRef::new(
            self.source_width,
            self.source_height,
            frame.as_raw(),
            fr::PixelType::U8x3,
        )?;

        let (working_width, working_height) = self.working_size();
        let buffer = self.buffer.get_or_insert_with(|| {
            fr::images::Image::new(working_width, working_height, fr::PixelType::U8x3)
        });
        self.resizer.resize(&src, buffer, &self.options)?;

        let cells = buffer
            .buffer()
            .chunks_exact(CHANNELS)
            .map(channel_average)
            .collect();
        IntensityMatrix::from_raw(working_width, working_height, cells)
    }
}

/// Truncating integer mean of the colour channels of one pixel.
#[inline]
fn channel_average(pixel: &[u8]) -> u8 {
    let sum: u16 = pixel.iter().map(|&c| c as u16).sum();
    (sum / pixel.len() as u16) as u8
}

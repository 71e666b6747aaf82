// THEORY:
// The `pipeline` module is the top-level API of the detector. A `MotionDetector`
// owns all state that survives between frames for one video stream and drives the
// stages in order:
//
//   Preprocessor -> RegionExtractor (with fused differencing) -> RegionMerger
//     -> RegionFilter -> Renderer
//
// Lifecycle:
// 1.  **Creation**: one detector per stream, built at the stream's source
//     resolution. The working resolution and scale factors are fixed here.
// 2.  **Cold**: until the first frame arrives there is no previous intensity
//     matrix. The first frame only primes that state and yields no boxes.
// 3.  **Warm**: every later frame is differenced against its predecessor. The
//     detector stays warm until `reset()` is called for a stream restart.
//
// A call that fails a precondition returns an error before any state is touched,
// so the caller can retry with a corrected frame. Frames must be fed in temporal
// order; the detector cannot tell when they are not.

use crate::config::DetectorConfig;
use crate::core_modules::bounding_box::{BoundingBox, ScaleFactors};
use crate::core_modules::intensity::IntensityMatrix;
use crate::core_modules::preprocessor::Preprocessor;
use crate::core_modules::region_extractor::extract_regions;
use crate::core_modules::region_filter::filter_regions;
use crate::core_modules::region_merger::merge_regions;
use crate::core_modules::renderer::render_regions;
use crate::error::{DetectorError, Result};
use image::RgbImage;
use tracing::{debug, trace, warn};

/// Frame-differencing motion detector for a single video stream.
pub struct MotionDetector {
    config: DetectorConfig,
    preprocessor: Preprocessor,
    /// Working over source resolution, per axis.
    scale: ScaleFactors,
    /// Accepted for collaborators; the detector itself never reads it.
    frame_rate: f64,
    /// The intensity matrix of the previous frame. `None` while cold.
    previous: Option<IntensityMatrix>,
    /// Working-resolution boxes reported for the most recent frame.
    last_regions: Vec<BoundingBox>,
}

impl MotionDetector {
    /// Creates a detector with the reference configuration.
    pub fn new(source_width: u32, source_height: u32, frame_rate: f64) -> Result<Self> {
        Self::with_config(
            source_width,
            source_height,
            frame_rate,
            DetectorConfig::default(),
        )
    }

    pub fn with_config(
        source_width: u32,
        source_height: u32,
        frame_rate: f64,
        config: DetectorConfig,
    ) -> Result<Self> {
        config.validate()?;
        let preprocessor = Preprocessor::new(source_width, source_height, config.working_width)?;
        let scale = ScaleFactors::new(preprocessor.working_size(), preprocessor.source_size())?;
        debug!(
            source = ?preprocessor.source_size(),
            working = ?preprocessor.working_size(),
            scale_x = scale.x(),
            scale_y = scale.y(),
            frame_rate,
            "motion detector created"
        );
        Ok(Self {
            config,
            preprocessor,
            scale,
            frame_rate,
            previous: None,
            last_regions: Vec::new(),
        })
    }

    /// Runs the full pipeline on `frame` and draws the outline of every motion
    /// region onto it in place.
    ///
    /// Returns the drawn boxes in source-resolution coordinates. The first frame
    /// of a stream only primes the detector and returns an empty list.
    pub fn process_frame(&mut self, frame: &mut RgbImage) -> Result<Vec<BoundingBox>> {
        let regions = self.detect(frame)?;
        Ok(render_regions(
            frame,
            &regions,
            &self.scale,
            self.config.outline_color,
        ))
    }

    /// Like `process_frame` but without drawing. Returns working-resolution boxes.
    pub fn detect(&mut self, frame: &RgbImage) -> Result<Vec<BoundingBox>> {
        let actual = frame.dimensions();
        if actual != self.source_size() {
            warn!(
                expected = ?self.source_size(),
                ?actual,
                "rejecting frame with wrong dimensions"
            );
            return Err(DetectorError::DimensionMismatch {
                expected: self.source_size(),
                actual,
            });
        }
        let current = self.preprocessor.process(frame)?;
        self.advance(current)
    }

    /// Runs the pipeline from an already preprocessed, working-resolution matrix.
    pub fn detect_intensity(&mut self, current: IntensityMatrix) -> Result<Vec<BoundingBox>> {
        let actual = current.dimensions();
        if actual != self.working_size() {
            warn!(
                expected = ?self.working_size(),
                ?actual,
                "rejecting intensity matrix with wrong dimensions"
            );
            return Err(DetectorError::DimensionMismatch {
                expected: self.working_size(),
                actual,
            });
        }
        self.advance(current)
    }

    /// Drops the previous frame so the next call primes the detector again.
    /// The working buffer is kept.
    pub fn reset(&mut self) {
        debug!("motion detector reset");
        self.previous = None;
        self.last_regions.clear();
    }

    pub fn is_warm(&self) -> bool {
        self.previous.is_some()
    }

    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    pub fn source_size(&self) -> (u32, u32) {
        self.preprocessor.source_size()
    }

    pub fn working_size(&self) -> (u32, u32) {
        self.preprocessor.working_size()
    }

    pub fn scale_factors(&self) -> &ScaleFactors {
        &self.scale
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn last_regions(&self) -> &[BoundingBox] {
        &self.last_regions
    }

    fn advance(&mut self, current: IntensityMatrix) -> Result<Vec<BoundingBox>> {
        let regions = match &self.previous {
            None => {
                debug!("first frame, priming previous intensity matrix");
                Vec::new()
            }
            Some(previous) => find_regions(&self.config, previous, &current)?,
        };
        self.previous = Some(current);
        self.last_regions.clone_from(&regions);
        Ok(regions)
    }
}

/// Extract, merge and filter: everything between two intensity matrices and the
/// final working-resolution box list.
fn find_regions(
    config: &DetectorConfig,
    previous: &IntensityMatrix,
    current: &IntensityMatrix,
) -> Result<Vec<BoundingBox>> {
    let raw = extract_regions(
        previous,
        current,
        config.color_difference_threshold,
        config.scan_mode,
    )?;
    let raw_count = raw.len();
    let mut regions = merge_regions(raw, config.area_difference_threshold);
    let merged_count = regions.len();
    filter_regions(&mut regions, config.min_bbox_size);
    trace!(
        raw = raw_count,
        merged = merged_count,
        kept = regions.len(),
        "regions found"
    );
    Ok(regions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn square_matrix(width: u32, height: u32, origin: (u32, u32), side: u32) -> IntensityMatrix {
        let mut data = vec![100u8; (width * height) as usize];
        for row in origin.1..origin.1 + side {
            for col in origin.0..origin.0 + side {
                data[(row * width + col) as usize] = 180;
            }
        }
        IntensityMatrix::from_raw(width, height, data).unwrap()
    }

    #[test]
    fn construction_computes_working_resolution() {
        let detector = MotionDetector::new(1280, 720, 30.0).unwrap();
        assert_eq!(detector.working_size(), (256, 144));
        assert_eq!(detector.source_size(), (1280, 720));
        assert_eq!(detector.frame_rate(), 30.0);
        assert!(!detector.is_warm());
    }

    #[test]
    fn degenerate_dimensions_fail_construction() {
        assert!(matches!(
            MotionDetector::new(0, 720, 30.0),
            Err(DetectorError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            MotionDetector::new(1280, 0, 30.0),
            Err(DetectorError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn first_frame_only_primes_state() {
        let mut detector = MotionDetector::new(1280, 720, 30.0).unwrap();
        let regions = detector
            .detect_intensity(square_matrix(256, 144, (50, 50), 20))
            .unwrap();
        assert!(regions.is_empty());
        assert!(detector.is_warm());
    }

    #[test]
    fn failed_call_leaves_previous_frame_in_place() {
        let mut detector = MotionDetector::new(1280, 720, 30.0).unwrap();
        detector
            .detect_intensity(IntensityMatrix::filled(256, 144, 100))
            .unwrap();

        let err = detector
            .detect_intensity(IntensityMatrix::filled(128, 72, 255))
            .unwrap_err();
        assert!(matches!(
            err,
            DetectorError::DimensionMismatch {
                expected: (256, 144),
                actual: (128, 72)
            }
        ));

        // Still differenced against the first frame.
        let regions = detector
            .detect_intensity(square_matrix(256, 144, (50, 50), 20))
            .unwrap();
        assert_eq!(regions, vec![BoundingBox::new(50, 50, 20, 20)]);
    }

    #[test]
    fn wrong_frame_size_does_not_warm_detector() {
        let mut detector = MotionDetector::new(320, 180, 25.0).unwrap();
        let mut frame = RgbImage::new(321, 180);
        assert!(detector.process_frame(&mut frame).is_err());
        assert!(!detector.is_warm());
        assert!(frame.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }

    #[test]
    fn reset_returns_to_cold_state() {
        let mut detector = MotionDetector::new(1280, 720, 30.0).unwrap();
        detector
            .detect_intensity(IntensityMatrix::filled(256, 144, 100))
            .unwrap();
        detector
            .detect_intensity(square_matrix(256, 144, (10, 10), 30))
            .unwrap();
        assert_eq!(detector.last_regions().len(), 1);

        detector.reset();
        assert!(!detector.is_warm());
        assert!(detector.last_regions().is_empty());

        // A very different frame right after the reset is a priming frame again.
        let regions = detector
            .detect_intensity(IntensityMatrix::filled(256, 144, 0))
            .unwrap();
        assert!(regions.is_empty());
    }

    #[test]
    fn custom_thresholds_are_honoured() {
        let config = DetectorConfig {
            min_bbox_size: 25,
            ..DetectorConfig::default()
        };
        let mut detector = MotionDetector::with_config(1280, 720, 30.0, config).unwrap();
        assert_eq!(detector.config().min_bbox_size, 25);
        assert_eq!(detector.scale_factors().source_size(), (1280, 720));
        detector
            .detect_intensity(IntensityMatrix::filled(256, 144, 100))
            .unwrap();
        let regions = detector
            .detect_intensity(square_matrix(256, 144, (50, 50), 20))
            .unwrap();
        assert!(regions.is_empty());
    }
}

// THEORY:
// Every tunable of the detector lives in `DetectorConfig`. The defaults are the
// reference constants of the algorithm; a caller that never touches the config
// gets reference behaviour. With the `serde` feature the struct can be loaded from
// any serde source, and missing fields fall back to their defaults.

use crate::error::{DetectorError, Result};

/// Width of the working resolution used for all change detection.
pub const DEFAULT_WORKING_WIDTH: u32 = 256;
/// A cell is active when its absolute intensity delta is strictly greater than this.
pub const COLOR_DIFFERENCE_THRESHOLD: u8 = 40;
/// Two boxes within this many working pixels of each other (per axis) are merged.
pub const AREA_DIFFERENCE_THRESHOLD: u32 = 3;
/// Boxes narrower or shorter than this are discarded after merging.
pub const MIN_BBOX_SIZE: u32 = 8;
pub const DEFAULT_OUTLINE_COLOR: [u8; 3] = [0, 255, 0];

/// How the region extractor treats its accumulator at row ends and at the end of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ScanMode {
    /// The accumulator is carried across row boundaries and a box still open when
    /// the scan ends is dropped.
    #[default]
    Parity,
    /// The accumulator is emitted at the end of every row, including the last one.
    RowFlush,
}

/// Configuration for the `MotionDetector`, allowing for tunable behavior.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DetectorConfig {
    pub working_width: u32,
    pub color_difference_threshold: u8,
    pub area_difference_threshold: u32,
    pub min_bbox_size: u32,
    pub scan_mode: ScanMode,
    /// RGB colour of the drawn outlines.
    pub outline_color: [u8; 3],
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            working_width: DEFAULT_WORKING_WIDTH,
            color_difference_threshold: COLOR_DIFFERENCE_THRESHOLD,
            area_difference_threshold: AREA_DIFFERENCE_THRESHOLD,
            min_bbox_size: MIN_BBOX_SIZE,
            scan_mode: ScanMode::default(),
            outline_color: DEFAULT_OUTLINE_COLOR,
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.working_width == 0 {
            return Err(DetectorError::InvalidConfiguration(
                "working width must be greater than zero".into(),
            ));
        }
        if self.min_bbox_size == 0 {
            return Err(DetectorError::InvalidConfiguration(
                "minimum box size must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

// THEORY:
// This file is the main entry point for the `frame_delta` library crate.
//
// The public surface is the `MotionDetector` (one instance per video stream) and
// the `DetectorConfig` that tunes it. Each stage of the pipeline is also exported
// as a free function so that callers holding their own intensity data can run a
// single stage, and so that the stages can be tested in isolation.

pub mod config;
pub mod core_modules;
pub mod error;
pub mod pipeline;

pub use config::{DetectorConfig, ScanMode};
pub use core_modules::bounding_box::{BoundingBox, ScaleFactors};
pub use core_modules::intensity::IntensityMatrix;
pub use core_modules::preprocessor::Preprocessor;
pub use core_modules::region_extractor::extract_regions;
pub use core_modules::region_filter::filter_regions;
pub use core_modules::region_merger::merge_regions;
pub use core_modules::renderer::render_regions;
pub use error::{DetectorError, Result};
pub use pipeline::MotionDetector;

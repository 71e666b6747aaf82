pub mod bounding_box;
pub mod intensity;
pub mod preprocessor;
pub mod region_extractor;
pub mod region_filter;
pub mod region_merger;
pub mod renderer;

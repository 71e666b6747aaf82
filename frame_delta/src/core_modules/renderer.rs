// THEORY:
// The renderer is the only stage that writes into caller-owned memory. It maps
// each surviving working-resolution box back onto the source frame and draws its
// outline in place; no new frame is allocated. Rescaling truncates every
// coordinate and dimension independently, and anything that falls outside the
// frame or collapses to zero size is clipped away rather than drawn.

use crate::core_modules::bounding_box::{BoundingBox, ScaleFactors};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

/// Draws the outline of every region onto `frame` and returns the source-resolution
/// boxes that were drawn.
pub fn render_regions(
    frame: &mut RgbImage,
    regions: &[BoundingBox],
    scale: &ScaleFactors,
    color: [u8; 3],
) -> Vec<BoundingBox> {
    let (width, height) = frame.dimensions();
    let drawn: Vec<BoundingBox> = regions
        .iter()
        .filter_map(|region| region.rescale(scale).clamp_to(width, height))
        .collect();

    for region in &drawn {
        let rect = Rect::at(region.x as i32, region.y as i32).of_size(region.width, region.height);
        draw_hollow_rect_mut(frame, rect, Rgb(color));
    }

    drawn
}

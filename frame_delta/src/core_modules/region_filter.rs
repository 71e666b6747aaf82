use crate::core_modules::bounding_box::BoundingBox;

/// Drops every box narrower or shorter than `min_size`. A box exactly `min_size`
/// on a side is kept.
pub fn filter_regions(regions: &mut Vec<BoundingBox>, min_size: u32) {
    regions.retain(|region| region.width >= min_size && region.height >= min_size);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_is_inclusive() {
        let mut regions = vec![
            BoundingBox::new(0, 0, 8, 8),
            BoundingBox::new(0, 0, 7, 8),
            BoundingBox::new(0, 0, 8, 7),
            BoundingBox::new(0, 0, 3, 3),
            BoundingBox::new(0, 0, 40, 9),
        ];
        filter_regions(&mut regions, 8);
        assert_eq!(
            regions,
            vec![BoundingBox::new(0, 0, 8, 8), BoundingBox::new(0, 0, 40, 9)]
        );
    }

    #[test]
    fn thin_but_long_boxes_are_removed() {
        let mut regions = vec![BoundingBox::new(0, 0, 200, 1), BoundingBox::new(0, 0, 1, 100)];
        filter_regions(&mut regions, 8);
        assert!(regions.is_empty());
    }
}

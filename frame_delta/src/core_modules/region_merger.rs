// THEORY:
// The extractor reports one box per run of active cells, so a single moving
// shape arrives as a stack of thin slivers. The merger fuses those slivers, and
// any other boxes lying close together, until the list reaches a fixpoint where
// no two boxes are neighbors.
//
// Each pass looks for the first neighboring pair in scan order, replaces the
// earlier box of the pair with the union of both, drops the later one, and starts
// over. Every pass builds a fresh list; nothing is mutated while it is being
// iterated. Worst case is cubic in the number of boxes, which stays in the tens
// after extraction.

use crate::core_modules::bounding_box::BoundingBox;

/// Fuses neighboring boxes until no two remaining boxes are within `threshold`
/// pixels of each other on both axes.
pub fn merge_regions(regions: Vec<BoundingBox>, threshold: u32) -> Vec<BoundingBox> {
    let mut regions = regions;
    while let Some((keep, absorb)) = first_neighbor_pair(&regions, threshold) {
        let merged = regions[keep].union(&regions[absorb]);
        regions = regions
            .iter()
            .enumerate()
            .filter(|&(index, _)| index != absorb)
            .map(|(index, region)| if index == keep { merged } else { *region })
            .collect();
    }
    regions
}

/// The first (i, j) with i < j whose boxes are neighbors.
///
/// The neighbor test is symmetric, so scanning only i < j finds the same pair a
/// scan over every ordered pair would find first.
fn first_neighbor_pair(regions: &[BoundingBox], threshold: u32) -> Option<(usize, usize)> {
    regions.iter().enumerate().find_map(|(i, a)| {
        regions[i + 1..]
            .iter()
            .position(|b| a.is_neighbor(b, threshold))
            .map(|offset| (i, i + 1 + offset))
    })
}

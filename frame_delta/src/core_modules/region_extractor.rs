// THEORY:
// The region extractor is where change is first turned into geometry. It fuses
// the differencer into the scan: the signed delta between the current and the
// previous intensity of each cell is computed on the fly and only the resulting
// active/inactive decision is consumed. No difference matrix is ever stored.
//
// The scan is a row-major run-merging heuristic, not connected-component
// labelling:
// 1.  Cells are visited left to right, top to bottom, with a single carried
//     `Accumulator`.
// 2.  An active cell opens the accumulator as a 1x1 box, or grows the open box to
//     enclose the cell.
// 3.  An inactive cell closes the accumulator and emits its box.
//
// In `ScanMode::Parity` the accumulator is not reset at row ends, so a run that
// touches the right edge of row r continues into row r+1 when that row starts
// active, yielding a box spanning both rows. A box still open after the final
// cell is dropped. `ScanMode::RowFlush` emits the accumulator at the end of every
// row instead, which removes both effects. The fragments produced here are
// stitched back together by the region merger.

use crate::config::ScanMode;
use crate::core_modules::bounding_box::BoundingBox;
use crate::core_modules::intensity::IntensityMatrix;
use crate::error::{DetectorError, Result};
use tracing::trace;

/// The in-progress box of the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Accumulator {
    #[default]
    Closed,
    Open(BoundingBox),
}

impl Accumulator {
    /// Opens a 1x1 box at the cell, or grows the open box to enclose it.
    fn absorb(&mut self, col: u32, row: u32) {
        let cell = BoundingBox::cell(col, row);
        *self = match *self {
            Accumulator::Closed => Accumulator::Open(cell),
            Accumulator::Open(current) => Accumulator::Open(current.union(&cell)),
        };
    }

    /// Closes the accumulator, handing back the box if one was open.
    fn close(&mut self) -> Option<BoundingBox> {
        match std::mem::take(self) {
            Accumulator::Open(current) => Some(current),
            Accumulator::Closed => None,
        }
    }
}

/// Whether a cell changed by strictly more than `threshold` in either direction.
#[inline]
pub fn is_active(previous: u8, current: u8, threshold: u8) -> bool {
    let delta = current as i16 - previous as i16;
    delta.unsigned_abs() > threshold as u16
}

/// Scans the per-cell difference between two matrices and returns the raw,
/// possibly fragmented, boxes covering the active cells.
pub fn extract_regions(
    previous: &IntensityMatrix,
    current: &IntensityMatrix,
    threshold: u8,
    mode: ScanMode,
) -> Result<Vec<BoundingBox>> {
    if previous.dimensions() != current.dimensions() {
        return Err(DetectorError::DimensionMismatch {
            expected: previous.dimensions(),
            actual: current.dimensions(),
        });
    }

    let mut regions = Vec::new();
    let mut accumulator = Accumulator::Closed;

    for (row, (before_row, after_row)) in (0u32..).zip(previous.rows().zip(current.rows())) {
        let cells = before_row.iter().zip(after_row);
        for (col, (&before, &after)) in (0u32..).zip(cells) {
            if is_active(before, after, threshold) {
                accumulator.absorb(col, row);
            } else if let Some(region) = accumulator.close() {
                regions.push(region);
            }
        }

        if mode == ScanMode::RowFlush {
            if let Some(region) = accumulator.close() {
                regions.push(region);
            }
        }
    }

    if let Some(dropped) = accumulator.close() {
        trace!(
            ?dropped,
            "accumulator still open at end of scan, discarding"
        );
    }

    Ok(regions)
}

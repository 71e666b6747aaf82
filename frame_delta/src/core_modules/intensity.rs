use crate::error::{DetectorError, Result};

/// A single-channel, row-major grid of intensity bytes at working resolution.
///
/// Cells are addressed as `row * width + col`. A matrix is built once per frame and
/// never mutated afterwards; the detector keeps the previous one and swaps it out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntensityMatrix {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl IntensityMatrix {
    /// Wraps an existing buffer. The buffer length must be exactly `width * height`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(DetectorError::InvalidConfiguration(format!(
                "intensity buffer holds {} cells, {}x{} needs {}",
                data.len(),
                width,
                height,
                expected
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A matrix with every cell set to `value`.
    pub fn filled(width: u32, height: u32, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn get(&self, col: u32, row: u32) -> Option<u8> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.data.get(self.index(col, row)).copied()
    }

    /// The cells of one row, left to right. `None` past the last row.
    pub fn row(&self, row: u32) -> Option<&[u8]> {
        self.rows().nth(row as usize)
    }

    /// Rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        // A zero-width matrix holds no cells, so any non-zero chunk size yields no rows.
        self.data.chunks_exact(self.width.max(1) as usize)
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    fn index(&self, col: u32, row: u32) -> usize {
        row as usize * self.width as usize + col as usize
    }
}

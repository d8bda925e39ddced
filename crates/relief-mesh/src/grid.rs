//! Row-major 2D scalar field shared by every pipeline stage.

use crate::error::{ReliefError, ReliefResult};

/// A fixed-size 2D grid of `f64` cells addressed as `x + y * width`.
///
/// The cell buffer always holds exactly `width * height` values; both
/// dimensions are at least 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<f64>,
}

impl Grid {
    /// Create a grid with every cell set to `value`.
    pub fn filled(width: u32, height: u32, value: f64) -> ReliefResult<Self> {
        let len = checked_len(width, height)?;
        Ok(Self {
            width,
            height,
            cells: vec![value; len],
        })
    }

    /// Create a grid of zeros.
    pub fn zeros(width: u32, height: u32) -> ReliefResult<Self> {
        Self::filled(width, height, 0.0)
    }

    /// Wrap an existing row-major buffer.
    pub fn from_cells(width: u32, height: u32, cells: Vec<f64>) -> ReliefResult<Self> {
        let len = checked_len(width, height)?;
        if cells.len() != len {
            return Err(ReliefError::invalid_dimensions(
                width,
                height,
                format!("expected {} cells, got {}", len, cells.len()),
            ));
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Build a grid by evaluating `f(x, y)` for every cell.
    pub fn from_fn(
        width: u32,
        height: u32,
        mut f: impl FnMut(u32, u32) -> f64,
    ) -> ReliefResult<Self> {
        let len = checked_len(width, height)?;
        let mut cells = Vec::with_capacity(len);
        for y in 0..height {
            for x in 0..width {
                cells.push(f(x, y));
            }
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Create a grid of the same size with every cell set to `value`.
    pub fn filled_like(&self, value: f64) -> Self {
        Self {
            width: self.width,
            height: self.height,
            cells: vec![value; self.cells.len()],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    #[inline]
    pub fn dims(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false: a grid has at least one cell.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Sentinel distance for cells not yet reached by a sweep.
    #[inline]
    pub fn d_max(&self) -> f64 {
        self.width.max(self.height) as f64
    }

    /// Convert 2D coordinates to a linear index.
    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        x as usize + y as usize * self.width as usize
    }

    /// Convert a linear index back to 2D coordinates.
    #[inline]
    pub fn coords(&self, idx: usize) -> (u32, u32) {
        let w = self.width as usize;
        ((idx % w) as u32, (idx / w) as u32)
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> f64 {
        self.cells[self.index(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: f64) {
        let idx = self.index(x, y);
        self.cells[idx] = value;
    }

    #[inline]
    pub fn cells(&self) -> &[f64] {
        &self.cells
    }

    #[inline]
    pub fn cells_mut(&mut self) -> &mut [f64] {
        &mut self.cells
    }

    pub fn into_cells(self) -> Vec<f64> {
        self.cells
    }

    /// Largest cell value.
    pub fn max_value(&self) -> f64 {
        self.cells.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Smallest cell value.
    pub fn min_value(&self) -> f64 {
        self.cells.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Fail with `DimensionMismatch` unless `other` has the same size.
    pub fn ensure_same_dims(&self, other: &Grid) -> ReliefResult<()> {
        if self.dims() != other.dims() {
            return Err(ReliefError::DimensionMismatch {
                expected: self.dims(),
                found: other.dims(),
            });
        }
        Ok(())
    }
}

fn checked_len(width: u32, height: u32) -> ReliefResult<usize> {
    if width == 0 || height == 0 {
        return Err(ReliefError::invalid_dimensions(
            width,
            height,
            "grid must have at least one row and one column",
        ));
    }
    (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| ReliefError::invalid_dimensions(width, height, "cell count overflows"))
}

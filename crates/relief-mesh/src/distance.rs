//! Approximate distance transform by four-pass chamfer sweeping.
//!
//! A grid is seeded with `0` on the reference set and [`Grid::d_max`]
//! elsewhere, then swept top→bottom, bottom→top, left→right and
//! right→left. Each pass reads the previous pass's output, so the result is
//! a chessboard/taxicab hybrid rather than a Euclidean distance. The fillet
//! radius in [`crate::fillet`] is tuned to this propagation shape.
//!
//! Vertical passes only visit columns `0..width-1` and horizontal passes only
//! rows `0..height-1`: the last column is never written by a vertical pass
//! and the last row never by a horizontal one. Heightmaps whose outer ring
//! is below the cut threshold are unaffected.

use tracing::debug;

use crate::grid::Grid;
use crate::tracing_ext::{StageTimer, log_grid_stats};

/// Default threshold at or below which a raw height counts as "outside".
pub const DEFAULT_Z_CUT: f64 = 0.1;

/// Seed an edge-distance grid from raw heights.
///
/// Cells with height `> z_cut` become `d_max` (unknown, inside the shape);
/// the rest become `0` (reference set).
pub fn seed_from_heights(raw: &Grid, z_cut: f64) -> Grid {
    let d_max = raw.d_max();
    let mut seeded = raw.filled_like(0.0);
    for (out, &h) in seeded.cells_mut().iter_mut().zip(raw.cells()) {
        *out = if h > z_cut { d_max } else { 0.0 };
    }
    seeded
}

/// Propagate distances downwards along each column.
pub fn sweep_top_to_bottom(grid: &mut Grid) {
    let (w, h) = dims(grid);
    let data = grid.cells_mut();
    for x in 0..w.saturating_sub(1) {
        for y in 0..h.saturating_sub(1) {
            let here = data[x + y * w];
            let below = x + (y + 1) * w;
            data[below] = (here + 1.0).min(data[below]);
        }
    }
}

/// Propagate distances upwards along each column.
pub fn sweep_bottom_to_top(grid: &mut Grid) {
    let (w, h) = dims(grid);
    let data = grid.cells_mut();
    for x in 0..w.saturating_sub(1) {
        for y in (1..h).rev() {
            let here = data[x + y * w];
            let above = x + (y - 1) * w;
            data[above] = (here + 1.0).min(data[above]);
        }
    }
}

/// Propagate distances rightwards along each row.
pub fn sweep_left_to_right(grid: &mut Grid) {
    let (w, h) = dims(grid);
    let data = grid.cells_mut();
    for y in 0..h.saturating_sub(1) {
        for x in 0..w.saturating_sub(1) {
            let here = data[x + y * w];
            let right = x + 1 + y * w;
            data[right] = (here + 1.0).min(data[right]);
        }
    }
}

/// Propagate distances leftwards along each row.
pub fn sweep_right_to_left(grid: &mut Grid) {
    let (w, h) = dims(grid);
    let data = grid.cells_mut();
    for y in 0..h.saturating_sub(1) {
        for x in (1..w).rev() {
            let here = data[x + y * w];
            let left = x - 1 + y * w;
            data[left] = (here + 1.0).min(data[left]);
        }
    }
}

/// Run all four sweeps in place, in order.
pub fn chamfer_sweep(grid: &mut Grid) {
    let _timer = StageTimer::for_grid("chamfer_sweep", grid);
    sweep_top_to_bottom(grid);
    sweep_bottom_to_top(grid);
    sweep_left_to_right(grid);
    sweep_right_to_left(grid);
    log_grid_stats(grid, "after chamfer sweep");
}

/// Distance from every cell to the nearest cell at or below `z_cut`.
pub fn edge_distance(raw: &Grid, z_cut: f64) -> Grid {
    let mut field = seed_from_heights(raw, z_cut);
    let inside = field.cells().iter().filter(|&&v| v > 0.0).count();
    debug!(
        inside_cells = inside,
        total_cells = field.len(),
        z_cut = z_cut,
        "Seeded edge distance field"
    );
    chamfer_sweep(&mut field);
    field
}

#[inline]
fn dims(grid: &Grid) -> (usize, usize) {
    (grid.width() as usize, grid.height() as usize)
}

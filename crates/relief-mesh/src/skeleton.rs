//! Ridge (skeleton) extraction from an edge-distance field.
//!
//! A ridge cell is a raised cell whose edge distance is not exceeded by any
//! of its 8 neighbours. Ties do not disqualify, so plateaus of equal
//! distance are entirely ridge. Ridge cells seed a second distance field
//! measuring distance to the ridge.

use tracing::info;

use crate::error::ReliefResult;
use crate::grid::Grid;

/// Whether `(x, y)` is a local maximum of `distance` on a raised cell.
///
/// Cells on the outer ring have no full neighbourhood and are never ridge.
pub fn is_ridge(raw: &Grid, distance: &Grid, x: u32, y: u32) -> bool {
    let (w, h) = distance.dims();
    let interior = (1..w.saturating_sub(1)).contains(&x) && (1..h.saturating_sub(1)).contains(&y);
    if !interior || raw.dims() != (w, h) {
        return false;
    }
    if raw.get(x, y) == 0.0 {
        return false;
    }
    let here = distance.get(x, y);
    let mut higher = 0;
    for dy in -1i64..=1 {
        for dx in -1i64..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let nx = (x as i64 + dx) as u32;
            let ny = (y as i64 + dy) as u32;
            if distance.get(nx, ny) > here {
                higher += 1;
            }
        }
    }
    higher == 0
}

/// Build the skeleton seed grid: `0` on ridge cells, `d_max` elsewhere.
///
/// Scans `1 <= x < width - 2`, `1 <= y < height - 2`. The upper bound is one
/// cell tighter than the distance sweeps; the last two columns and rows are
/// never ridge candidates.
pub fn seed_skeleton(raw: &Grid, distance: &Grid) -> ReliefResult<Grid> {
    raw.ensure_same_dims(distance)?;

    let mut seeds = raw.filled_like(raw.d_max());
    let mut ridge_cells = 0usize;
    for y in 1..raw.height().saturating_sub(2) {
        for x in 1..raw.width().saturating_sub(2) {
            if is_ridge(raw, distance, x, y) {
                seeds.set(x, y, 0.0);
                ridge_cells += 1;
            }
        }
    }

    info!(ridge_cells = ridge_cells, "Extracted skeleton seeds");
    Ok(seeds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::{DEFAULT_Z_CUT, edge_distance};
    use crate::error::ErrorCode;

    fn block(width: u32, height: u32, x0: u32, x1: u32, y0: u32, y1: u32) -> Grid {
        Grid::from_fn(width, height, |x, y| {
            if (x0..=x1).contains(&x) && (y0..=y1).contains(&y) {
                200.0
            } else {
                0.0
            }
        })
        .unwrap()
    }

    #[test]
    fn test_centre_block_has_seed() {
        let raw = block(4, 4, 1, 2, 1, 2);
        let dist = edge_distance(&raw, DEFAULT_Z_CUT);
        let seeds = seed_skeleton(&raw, &dist).unwrap();

        // Only (1, 1) is inside the scan window of a 4x4 grid.
        assert_eq!(seeds.get(1, 1), 0.0);
        let seeded = seeds.cells().iter().filter(|&&v| v == 0.0).count();
        assert_eq!(seeded, 1);
        assert_eq!(seeds.get(2, 2), 4.0);
    }

    #[test]
    fn test_zero_height_never_ridge() {
        // Distance peak on a cell whose raw height is zero.
        let raw = Grid::zeros(5, 5).unwrap();
        let mut dist = Grid::zeros(5, 5).unwrap();
        dist.set(2, 2, 3.0);
        assert!(!is_ridge(&raw, &dist, 2, 2));
    }

    #[test]
    fn test_ties_are_ridge() {
        let raw = Grid::filled(5, 5, 10.0).unwrap();
        let dist = Grid::filled(5, 5, 2.0).unwrap();
        assert!(is_ridge(&raw, &dist, 2, 2));

        let mut dist = dist;
        dist.set(3, 3, 2.5);
        assert!(!is_ridge(&raw, &dist, 2, 2));
    }

    #[test]
    fn test_outer_ring_never_ridge() {
        let raw = Grid::filled(4, 3, 10.0).unwrap();
        let dist = Grid::filled(4, 3, 1.0).unwrap();
        assert!(!is_ridge(&raw, &dist, 0, 0));
        assert!(!is_ridge(&raw, &dist, 0, 1));
        assert!(!is_ridge(&raw, &dist, 3, 1));
        assert!(!is_ridge(&raw, &dist, 1, 2));
        assert!(!is_ridge(&raw, &dist, 7, 9));
        assert!(is_ridge(&raw, &dist, 1, 1));

        let small = Grid::filled(1, 1, 10.0).unwrap();
        assert!(!is_ridge(&small, &small, 0, 0));
    }

    #[test]
    fn test_ridge_line_of_bar() {
        // Horizontal bar three cells tall: the middle row is the ridge.
        let raw = block(9, 7, 1, 7, 2, 4);
        let dist = edge_distance(&raw, DEFAULT_Z_CUT);
        let seeds = seed_skeleton(&raw, &dist).unwrap();
        for x in 2..=6 {
            assert_eq!(seeds.get(x, 3), 0.0, "ridge at ({x}, 3)");
            assert_eq!(seeds.get(x, 2), 9.0);
        }
    }

    #[test]
    fn test_scan_window_excludes_last_two() {
        let raw = Grid::filled(6, 6, 50.0).unwrap();
        let dist = Grid::filled(6, 6, 1.0).unwrap();
        let seeds = seed_skeleton(&raw, &dist).unwrap();
        for y in 0..6 {
            for x in 0..6 {
                let in_window = (1..4).contains(&x) && (1..4).contains(&y);
                assert_eq!(seeds.get(x, y) == 0.0, in_window, "cell ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_tiny_grids() {
        let raw = Grid::filled(2, 2, 1.0).unwrap();
        let seeds = seed_skeleton(&raw, &raw.clone()).unwrap();
        assert!(seeds.cells().iter().all(|&v| v == 2.0));
    }

    #[test]
    fn test_mismatched_grids() {
        let raw = Grid::zeros(4, 4).unwrap();
        let dist = Grid::zeros(4, 3).unwrap();
        let err = seed_skeleton(&raw, &dist).unwrap_err();
        assert_eq!(err.code(), ErrorCode::DimensionMismatch);
    }
}

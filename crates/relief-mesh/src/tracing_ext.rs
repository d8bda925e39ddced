//! Tracing helpers for relief stages.
//!
//! Stage timings are emitted under the `relief_mesh::timing` target and grid
//! summaries under `relief_mesh::grid_state`, so they can be filtered
//! independently:
//!
//! ```bash
//! RUST_LOG=relief_mesh::timing=info relief build shape.png -o shape.stl
//! ```

use std::time::Instant;
use tracing::{debug, info, trace};

use crate::grid::Grid;

/// A stage timer that logs its duration on drop.
///
/// ```rust,ignore
/// fn sweep_everything(grid: &mut Grid) {
///     let _timer = StageTimer::new("chamfer_sweep");
///     // ... work ...
/// } // logs elapsed_ms here
/// ```
pub struct StageTimer {
    name: &'static str,
    start: Instant,
}

impl StageTimer {
    /// Create a new stage timer.
    pub fn new(name: &'static str) -> Self {
        debug!(target: "relief_mesh::timing", stage = name, "Starting stage");
        Self {
            name,
            start: Instant::now(),
        }
    }

    /// Create a timer that also logs the grid size at start.
    pub fn for_grid(name: &'static str, grid: &Grid) -> Self {
        debug!(
            target: "relief_mesh::timing",
            stage = name,
            width = grid.width(),
            height = grid.height(),
            "Starting stage"
        );
        Self {
            name,
            start: Instant::now(),
        }
    }

    /// Elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for StageTimer {
    fn drop(&mut self) {
        let elapsed_ms = self.elapsed_ms();
        info!(
            target: "relief_mesh::timing",
            stage = self.name,
            elapsed_ms = format!("{:.2}", elapsed_ms),
            "Stage completed"
        );
    }
}

/// Log value range and sentinel coverage of a grid at trace level.
pub fn log_grid_stats(grid: &Grid, context: &str) {
    let sentinel = grid.d_max();
    let at_sentinel = grid.cells().iter().filter(|&&v| v >= sentinel).count();
    let zeros = grid.cells().iter().filter(|&&v| v == 0.0).count();

    trace!(
        target: "relief_mesh::grid_state",
        context = context,
        width = grid.width(),
        height = grid.height(),
        min = format!("{:.3}", grid.min_value()),
        max = format!("{:.3}", grid.max_value()),
        zeros = zeros,
        at_sentinel = at_sentinel,
        "Grid state"
    );
}

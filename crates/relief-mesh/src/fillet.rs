//! Fillet height composition.
//!
//! For a cell at edge distance `m` and ridge distance `s`, the fillet profile
//! is the height of the point on a circle of radius `m + s` whose horizontal
//! offset from the centre is `s`:
//!
//! ```text
//! d = sqrt((m + s)^2 - s^2)
//! ```
//!
//! so the surface rises steeply from the outline and flattens towards the
//! ridge instead of forming a crease. The profile is then scaled by the
//! cell's raw height: `final = z_scale * h / 255 * d`.

use rayon::prelude::*;
use tracing::info;

use crate::error::{ReliefError, ReliefResult};
use crate::grid::Grid;
use crate::tracing_ext::StageTimer;

/// Output of the fillet compositor.
#[derive(Debug, Clone)]
pub struct FilletField {
    /// Final per-cell height.
    pub heights: Grid,
    /// Cells on the ridge (`s == 0`) with non-zero raw height.
    pub ridge: Vec<bool>,
    /// Longest fillet distance `d` seen anywhere. Diagnostic only.
    pub longest_distance: f64,
}

impl FilletField {
    /// Number of tagged ridge cells.
    pub fn ridge_count(&self) -> usize {
        self.ridge.iter().filter(|&&r| r).count()
    }

    /// Whether `(x, y)` is tagged as ridge.
    pub fn is_ridge(&self, x: u32, y: u32) -> bool {
        self.ridge[self.heights.index(x, y)]
    }
}

/// Fillet distance for one cell.
///
/// Fails when an operand is negative or non-finite; such values can only
/// come from a broken distance field and are never clamped.
#[inline]
pub fn fillet_distance(edge: f64, skeleton: f64) -> Option<f64> {
    if !(edge.is_finite() && skeleton.is_finite()) || edge < 0.0 || skeleton < 0.0 {
        return None;
    }
    let radius = edge + skeleton;
    let radicand = radius * radius - skeleton * skeleton;
    if radicand < 0.0 {
        return None;
    }
    Some(radicand.sqrt())
}

/// Combine the edge and skeleton distance fields into final heights.
pub fn compose_fillet(
    raw: &Grid,
    edge: &Grid,
    skeleton: &Grid,
    z_scale: f64,
) -> ReliefResult<FilletField> {
    raw.ensure_same_dims(edge)?;
    raw.ensure_same_dims(skeleton)?;
    let _timer = StageTimer::for_grid("compose_fillet", raw);

    let cells: Vec<(f64, f64, bool)> = (0..raw.len())
        .into_par_iter()
        .map(|i| -> ReliefResult<(f64, f64, bool)> {
            let m = edge.cells()[i];
            let s = skeleton.cells()[i];
            let h = raw.cells()[i];
            let d = fillet_distance(m, s).ok_or_else(|| {
                let (x, y) = raw.coords(i);
                ReliefError::DomainInvariantViolation {
                    x,
                    y,
                    edge: m,
                    skeleton: s,
                }
            })?;
            let ridge = s == 0.0 && h != 0.0;
            Ok((z_scale * h / 255.0 * d, d, ridge))
        })
        .collect::<ReliefResult<_>>()?;

    let longest_distance = cells.iter().map(|c| c.1).fold(0.0, f64::max);
    let ridge: Vec<bool> = cells.iter().map(|c| c.2).collect();
    let heights = Grid::from_cells(
        raw.width(),
        raw.height(),
        cells.into_iter().map(|c| c.0).collect(),
    )?;

    info!(
        longest_distance = longest_distance,
        ridge_cells = ridge.iter().filter(|&&r| r).count(),
        max_height = format!("{:.3}", heights.max_value()),
        "Composed fillet heights"
    );

    Ok(FilletField {
        heights,
        ridge,
        longest_distance,
    })
}

/// Round heights through an 8-bit channel and rescale, as a preview raster
/// read back as a heightmap would.
pub fn quantize_heights(heights: &Grid, z_scale: f64) -> Grid {
    let mut out = heights.clone();
    for v in out.cells_mut() {
        *v = z_scale * f64::from(crate::preview::to_channel(*v));
    }
    out
}

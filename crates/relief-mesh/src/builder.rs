//! Height-field triangulation.
//!
//! Every grid quad is split into two triangles. A triangle is kept when at
//! least one corner is above the floor, and each kept triangle is followed
//! by its copy flattened onto `z = 0` with reversed winding, so the relief
//! reads as a slab from both sides.
//!
//! # Example
//!
//! ```
//! use relief_mesh::{Grid, MeshBuilder};
//!
//! let heights = Grid::from_fn(4, 4, |x, y| if x == 1 && y == 1 { 2.0 } else { 0.0 }).unwrap();
//!
//! let mesh = MeshBuilder::new(&heights)
//!     .side_walls(true)
//!     .build();
//!
//! assert!(!mesh.is_empty());
//! ```

use hashbrown::HashMap;
use nalgebra::Point3;
use tracing::{debug, info, warn};

use crate::grid::Grid;
use crate::tracing_ext::StageTimer;
use crate::types::{MeshStats, ReliefMesh, Triangle};

/// Fluent builder turning a height grid into a [`ReliefMesh`].
pub struct MeshBuilder<'a> {
    heights: &'a Grid,
    side_walls: bool,
}

impl<'a> MeshBuilder<'a> {
    /// Create a builder over final heights (one vertex per cell).
    pub fn new(heights: &'a Grid) -> Self {
        Self {
            heights,
            side_walls: false,
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Close the slab with vertical skirts along the outline of the top
    /// surface.
    ///
    /// Off by default. Without walls the top and floor only meet where the
    /// outline already sits at `z = 0`.
    pub fn side_walls(mut self, enabled: bool) -> Self {
        self.side_walls = enabled;
        self
    }

    // =========================================================================
    // Build
    // =========================================================================

    /// Triangulate the grid.
    ///
    /// A grid with no raised cell gives an empty mesh; callers that need
    /// something to display can fall back to [`ReliefMesh::placeholder`].
    pub fn build(self) -> ReliefMesh {
        let grid = self.heights;
        let _timer = StageTimer::for_grid("build_mesh", grid);
        let (w, h) = grid.dims();
        let mut mesh = ReliefMesh::empty(w, h);
        let mut stats = MeshStats::default();
        let mut tops: Vec<[u32; 3]> = Vec::new();

        for y in 0..h.saturating_sub(1) {
            for x in 0..w.saturating_sub(1) {
                stats.quads_visited += 1;
                let p0 = vertex_id(grid, x, y);
                let p1 = vertex_id(grid, x + 1, y);
                let p2 = vertex_id(grid, x, y + 1);
                let p3 = vertex_id(grid, x + 1, y + 1);

                for ids in [[p0, p3, p1], [p0, p2, p3]] {
                    let tri = Triangle::new(
                        position(grid, ids[0]),
                        position(grid, ids[1]),
                        position(grid, ids[2]),
                    );
                    if !tri.is_raised() {
                        continue;
                    }
                    mesh.triangles.push(tri);
                    mesh.triangles.push(tri.floor_copy());
                    stats.top_triangles += 1;
                    stats.floor_triangles += 1;
                    tops.push(ids);
                }
            }
        }

        if self.side_walls {
            let walls = skirt_triangles(grid, &tops);
            stats.wall_triangles = walls.len();
            mesh.triangles.extend(walls);
        }

        mesh.stats = stats;
        if mesh.is_empty() {
            warn!(width = w, height = h, "No raised cells; mesh is empty");
        } else {
            info!(
                top = stats.top_triangles,
                floor = stats.floor_triangles,
                walls = stats.wall_triangles,
                total = mesh.triangle_count(),
                "Built relief mesh"
            );
        }
        mesh
    }
}

/// Grid vertex id, `x + y * width`.
#[inline]
fn vertex_id(grid: &Grid, x: u32, y: u32) -> u32 {
    x + y * grid.width()
}

/// Re-centred position of a grid vertex: `(x - w/2, h/2 - y, height)`.
#[inline]
fn position(grid: &Grid, id: u32) -> Point3<f64> {
    let x = id % grid.width();
    let y = id / grid.width();
    Point3::new(
        f64::from(x) - f64::from(grid.width()) / 2.0,
        f64::from(grid.height()) / 2.0 - f64::from(y),
        grid.get(x, y),
    )
}

/// Skirt triangles for every top edge used by exactly one top triangle.
///
/// Edges are visited in first-seen order so output is deterministic. A
/// directed outline edge `a -> b` yields `(a_top, a_floor, b_floor)` unless
/// `a` is already on the floor, and `(a_top, b_floor, b_top)` unless `b` is.
fn skirt_triangles(grid: &Grid, tops: &[[u32; 3]]) -> Vec<Triangle> {
    let mut uses: HashMap<(u32, u32), u32> = HashMap::with_capacity(tops.len() * 3);
    let mut order: Vec<(u32, u32)> = Vec::with_capacity(tops.len() * 3);

    for ids in tops {
        for k in 0..3 {
            let (a, b) = (ids[k], ids[(k + 1) % 3]);
            let count = uses.entry((a.min(b), a.max(b))).or_insert(0);
            if *count == 0 {
                order.push((a, b));
            }
            *count += 1;
        }
    }

    let mut walls = Vec::new();
    let mut outline = 0usize;
    for (a, b) in order {
        if uses.get(&(a.min(b), a.max(b))).copied() != Some(1) {
            continue;
        }
        outline += 1;
        let a_top = position(grid, a);
        let b_top = position(grid, b);
        let a_floor = Point3::new(a_top.x, a_top.y, 0.0);
        let b_floor = Point3::new(b_top.x, b_top.y, 0.0);
        if a_top.z != 0.0 {
            walls.push(Triangle::new(a_top, a_floor, b_floor));
        }
        if b_top.z != 0.0 {
            walls.push(Triangle::new(a_top, b_floor, b_top));
        }
    }

    debug!(
        outline_edges = outline,
        wall_triangles = walls.len(),
        "Generated side walls"
    );
    walls
}

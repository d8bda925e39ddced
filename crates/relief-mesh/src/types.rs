//! Triangle soup produced by the mesh builder.

use nalgebra::Point3;

/// A triangle as three explicit vertices. No normal is stored; readers
/// recompute one from the winding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Point3<f64>; 3],
}

impl Triangle {
    #[inline]
    pub fn new(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> Self {
        Self {
            vertices: [a, b, c],
        }
    }

    /// Copy of this triangle flattened onto `z = 0` with reversed winding.
    #[inline]
    pub fn floor_copy(&self) -> Self {
        let [a, b, c] = self.vertices;
        Self::new(
            Point3::new(a.x, a.y, 0.0),
            Point3::new(c.x, c.y, 0.0),
            Point3::new(b.x, b.y, 0.0),
        )
    }

    /// True if any vertex is strictly above the floor.
    #[inline]
    pub fn is_raised(&self) -> bool {
        self.vertices.iter().any(|v| v.z > 0.0)
    }

    /// Signed area of the XY projection (positive = counter-clockwise).
    pub fn projected_area(&self) -> f64 {
        let [a, b, c] = self.vertices;
        0.5 * ((b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y))
    }
}

/// Mesh statistics gathered while building.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeshStats {
    /// Upper-surface triangles.
    pub top_triangles: usize,
    /// Floor triangles at `z = 0` (one per top triangle).
    pub floor_triangles: usize,
    /// Vertical skirt triangles (only with side walls enabled).
    pub wall_triangles: usize,
    /// Grid quads visited.
    pub quads_visited: usize,
}

/// Triangle list of a relief, centred on the grid midpoint.
///
/// Top and floor triangles alternate (top, floor, top, floor, ...); wall
/// triangles, if any, follow at the end.
#[derive(Debug, Clone, PartialEq)]
pub struct ReliefMesh {
    pub triangles: Vec<Triangle>,
    /// Width of the source grid in cells.
    pub width: u32,
    /// Height of the source grid in cells.
    pub height: u32,
    pub stats: MeshStats,
}

impl ReliefMesh {
    /// Create an empty mesh for a grid of the given size.
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            triangles: Vec::new(),
            width,
            height,
            stats: MeshStats::default(),
        }
    }

    /// Two fixed triangles a viewer can show when there is nothing to build.
    pub fn placeholder() -> Self {
        let triangles = vec![
            Triangle::new(
                Point3::new(-1.0, -1.0, -1.0),
                Point3::new(1.0, 1.0, -1.0),
                Point3::new(1.0, -1.0, -1.0),
            ),
            Triangle::new(
                Point3::new(1.0, -1.0, 1.0),
                Point3::new(1.0, -1.0, -1.0),
                Point3::new(1.0, 1.0, -1.0),
            ),
        ];
        Self {
            stats: MeshStats {
                top_triangles: triangles.len(),
                ..MeshStats::default()
            },
            triangles,
            width: 2,
            height: 2,
        }
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// No triangles: the relief was flat everywhere.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Flat coordinate buffer, 9 values per triangle.
    pub fn to_flat_coords(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.triangles.len() * 9);
        for tri in &self.triangles {
            for v in &tri.vertices {
                out.extend_from_slice(&[v.x, v.y, v.z]);
            }
        }
        out
    }

    /// Axis-aligned bounds `(min, max)`, or `None` if empty.
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.triangles.first()?.vertices[0];
        let mut min = first;
        let mut max = first;
        for v in self.triangles.iter().flat_map(|t| t.vertices.iter()) {
            min.x = min.x.min(v.x);
            min.y = min.y.min(v.y);
            min.z = min.z.min(v.z);
            max.x = max.x.max(v.x);
            max.y = max.y.max(v.y);
            max.z = max.z.max(v.z);
        }
        Some((min, max))
    }
}

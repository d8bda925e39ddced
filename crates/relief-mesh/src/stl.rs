//! ASCII STL serialization of flat vertex buffers.
//!
//! Facet normals are always written as `0 0 0`; readers recompute them from
//! the winding. X and Y are shifted by half the grid size so every exported
//! coordinate of a relief is non-negative.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{ReliefError, ReliefResult};
use crate::tracing_ext::StageTimer;
use crate::types::ReliefMesh;

/// Solid name used when none is given.
pub const DEFAULT_SOLID_NAME: &str = "relief";

/// Coordinates per triangle in a flat buffer.
const COORDS_PER_FACET: usize = 9;

/// Writes flat vertex buffers as ASCII STL solids.
#[derive(Debug, Clone, PartialEq)]
pub struct SolidExporter {
    name: String,
    x_offset: f64,
    y_offset: f64,
}

impl Default for SolidExporter {
    fn default() -> Self {
        Self {
            name: DEFAULT_SOLID_NAME.to_string(),
            x_offset: 0.0,
            y_offset: 0.0,
        }
    }
}

impl SolidExporter {
    /// Exporter for a mesh built from a `width` x `height` grid.
    pub fn for_grid(width: u32, height: u32) -> Self {
        Self {
            x_offset: f64::from(width) / 2.0,
            y_offset: f64::from(height) / 2.0,
            ..Self::default()
        }
    }

    /// Exporter matching a built mesh.
    pub fn for_mesh(mesh: &ReliefMesh) -> Self {
        Self::for_grid(mesh.width, mesh.height)
    }

    /// Set the name written after `solid` and `endsolid`.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render the solid into a string. Returns the text.
    pub fn to_text(&self, coords: &[f64]) -> ReliefResult<String> {
        let facets = self.check(coords)?;
        let _timer = StageTimer::new("export_stl");
        let mut out = String::with_capacity(64 + facets * 160);
        // Writing into a String cannot fail.
        let _ = self.render(coords, &mut out);
        Ok(out)
    }

    /// Write the solid to any writer. Returns the number of facets written.
    pub fn write<W: Write>(&self, coords: &[f64], mut writer: W) -> ReliefResult<usize> {
        let text = self.to_text(coords)?;
        writer
            .write_all(text.as_bytes())
            .and_then(|_| writer.flush())
            .map_err(|e| ReliefError::io_write(PathBuf::from("<stream>"), e))?;
        Ok(coords.len() / COORDS_PER_FACET)
    }

    /// Write the solid to a file. Returns the number of facets written.
    pub fn save(&self, coords: &[f64], path: impl AsRef<Path>) -> ReliefResult<usize> {
        let path = path.as_ref();
        info!("Saving solid '{}' to {:?}", self.name, path);

        let text = self.to_text(coords)?;
        let file = File::create(path).map_err(|e| ReliefError::io_write(path, e))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(text.as_bytes())
            .map_err(|e| ReliefError::io_write(path, e))?;
        writer.flush().map_err(|e| ReliefError::io_write(path, e))?;

        let facets = coords.len() / COORDS_PER_FACET;
        info!("Saved {} facets to {:?}", facets, path);
        Ok(facets)
    }

    fn check(&self, coords: &[f64]) -> ReliefResult<usize> {
        if self.name.trim().is_empty() {
            return Err(ReliefError::invalid_params("solid name must not be empty"));
        }
        if coords.len() % COORDS_PER_FACET != 0 {
            return Err(ReliefError::MalformedVertexBuffer { len: coords.len() });
        }
        Ok(coords.len() / COORDS_PER_FACET)
    }

    fn render(&self, coords: &[f64], out: &mut String) -> std::fmt::Result {
        writeln!(out, "solid {}", self.name)?;
        for facet in coords.chunks_exact(COORDS_PER_FACET) {
            writeln!(out, " facet normal 0 0 0")?;
            writeln!(out, "  outer loop")?;
            for v in facet.chunks_exact(3) {
                writeln!(
                    out,
                    "   vertex {} {} {}",
                    v[0] + self.x_offset,
                    v[1] + self.y_offset,
                    v[2]
                )?;
            }
            writeln!(out, "  endloop")?;
            writeln!(out, " endfacet")?;
        }
        writeln!(out, "endsolid {}", self.name)?;
        debug!(
            facets = coords.len() / COORDS_PER_FACET,
            bytes = out.len(),
            "Rendered ASCII STL"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use std::io::Cursor;

    fn two_facets() -> Vec<f64> {
        vec![
            -2.0, 2.0, 1.0, -1.0, 1.0, 1.5, -1.0, 2.0, 0.0, //
            -2.0, 2.0, 0.0, -1.0, 2.0, 0.0, -1.0, 1.0, 0.0,
        ]
    }

    #[test]
    fn test_layout() {
        let text = SolidExporter::for_grid(4, 4).to_text(&two_facets()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "solid relief");
        assert_eq!(lines[1], " facet normal 0 0 0");
        assert_eq!(lines[2], "  outer loop");
        assert_eq!(lines[3], "   vertex 0 4 1");
        assert_eq!(lines[4], "   vertex 1 3 1.5");
        assert_eq!(lines[6], "  endloop");
        assert_eq!(lines[7], " endfacet");
        assert_eq!(*lines.last().unwrap(), "endsolid relief");
        assert_eq!(lines.len(), 2 + 2 * 7);
    }

    #[test]
    fn test_facet_and_vertex_counts() {
        let coords = two_facets();
        let text = SolidExporter::for_grid(4, 4).to_text(&coords).unwrap();
        let facets = text.lines().filter(|l| l.trim() == "facet normal 0 0 0").count();
        let vertices: Vec<&str> = text
            .lines()
            .filter(|l| l.trim_start().starts_with("vertex"))
            .collect();
        assert_eq!(facets, 2);
        assert_eq!(vertices.len(), 6);
        for line in vertices {
            let values: Vec<f64> = line
                .split_whitespace()
                .skip(1)
                .map(|s| s.parse().unwrap())
                .collect();
            assert_eq!(values.len(), 3);
            assert!(values.iter().all(|&v| v >= 0.0), "{line}");
        }
    }

    #[test]
    fn test_empty_buffer() {
        let text = SolidExporter::default().to_text(&[]).unwrap();
        assert_eq!(text, "solid relief\nendsolid relief\n");
    }

    #[test]
    fn test_custom_name() {
        let exporter = SolidExporter::for_grid(2, 2).with_name("pocket");
        assert_eq!(exporter.name(), "pocket");
        let text = exporter.to_text(&[]).unwrap();
        assert!(text.starts_with("solid pocket\n"));
        assert!(text.ends_with("endsolid pocket\n"));

        let err = SolidExporter::default().with_name("  ").to_text(&[]).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidParams);
    }

    #[test]
    fn test_malformed_buffer() {
        let err = SolidExporter::default().to_text(&[1.0; 10]).unwrap_err();
        assert_eq!(err.code(), ErrorCode::MalformedVertexBuffer);
        assert!(matches!(err, ReliefError::MalformedVertexBuffer { len: 10 }));
    }

    #[test]
    fn test_write_to_writer() {
        let mut buf = Vec::new();
        let facets = SolidExporter::for_grid(4, 4)
            .write(&two_facets(), &mut buf)
            .unwrap();
        assert_eq!(facets, 2);
        assert!(String::from_utf8(buf).unwrap().starts_with("solid relief"));
    }

    #[test]
    fn test_parses_as_stl() {
        let text = SolidExporter::for_grid(4, 4).to_text(&two_facets()).unwrap();
        let mut cursor = Cursor::new(text.into_bytes());
        let parsed = stl_io::read_stl(&mut cursor).unwrap();
        assert_eq!(parsed.faces.len(), 2);
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relief.stl");
        let exporter = SolidExporter::for_grid(4, 4);
        let facets = exporter.save(&two_facets(), &path).unwrap();
        assert_eq!(facets, 2);

        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert_eq!(on_disk, exporter.to_text(&two_facets()).unwrap());
    }

    #[test]
    fn test_save_to_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("relief.stl");
        let err = SolidExporter::default().save(&[], &path).unwrap_err();
        assert_eq!(err.code(), ErrorCode::IoWrite);
    }
}

//! End-to-end relief pipeline.
//!
//! One parameterised run covers every use: load or accept raw heights,
//! compute the edge and ridge distance fields, compose fillet heights,
//! triangulate, and hand the result to any number of sinks.
//!
//! # Example
//!
//! ```no_run
//! use relief_mesh::{ReliefParams, ReliefPipeline, StlFileSink, PreviewPngSink, ReliefSink};
//! use std::path::Path;
//!
//! let output = ReliefPipeline::from_source(Path::new("logo.png"), ReliefParams::for_printing())?
//!     .solid_name("logo")
//!     .run()?;
//!
//! StlFileSink::new("logo.stl").consume(&output)?;
//! PreviewPngSink::new("logo-preview.png").consume(&output)?;
//! # Ok::<(), relief_mesh::ReliefError>(())
//! ```

use image::RgbaImage;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::builder::MeshBuilder;
use crate::distance::{chamfer_sweep, edge_distance};
use crate::error::ReliefResult;
use crate::fillet::{FilletField, compose_fillet, quantize_heights};
use crate::grid::Grid;
use crate::loader::{HeightmapLoader, RasterSource};
use crate::params::{MeshHeights, ReliefParams};
use crate::preview::{render_preview, save_preview};
use crate::skeleton::seed_skeleton;
use crate::stl::SolidExporter;
use crate::tracing_ext::StageTimer;
use crate::types::ReliefMesh;

/// Summary of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(serde::Serialize))]
pub struct ReliefStats {
    pub width: u32,
    pub height: u32,
    /// Lowest raw height.
    pub min_raw_height: f64,
    /// Highest raw height.
    pub max_raw_height: f64,
    /// Cells above the cut threshold.
    pub inside_cells: usize,
    /// Cells tagged as ridge.
    pub ridge_cells: usize,
    /// Longest fillet distance anywhere. Diagnostic only.
    pub longest_distance: f64,
    /// Highest composed height.
    pub max_fillet_height: f64,
    pub top_triangles: usize,
    pub floor_triangles: usize,
    pub wall_triangles: usize,
    pub total_triangles: usize,
    pub elapsed_ms: f64,
}

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct ReliefOutput {
    /// Distance from each cell to the shape outline.
    pub edge_distance: Grid,
    /// Distance from each cell to the ridge.
    pub skeleton_distance: Grid,
    pub fillet: FilletField,
    pub mesh: ReliefMesh,
    pub stats: ReliefStats,
    /// Name for the exported solid.
    pub solid_name: String,
}

impl ReliefOutput {
    /// True when no triangle was produced.
    pub fn is_empty(&self) -> bool {
        self.mesh.is_empty()
    }

    /// The triangle list as a flat coordinate buffer.
    pub fn flat_coords(&self) -> Vec<f64> {
        self.mesh.to_flat_coords()
    }

    fn exporter(&self) -> SolidExporter {
        SolidExporter::for_mesh(&self.mesh).with_name(self.solid_name.clone())
    }

    /// ASCII STL text of the mesh.
    pub fn export_stl(&self) -> ReliefResult<String> {
        self.exporter().to_text(&self.flat_coords())
    }

    /// Write ASCII STL to a writer. Returns the facet count.
    pub fn write_stl<W: Write>(&self, writer: W) -> ReliefResult<usize> {
        self.exporter().write(&self.flat_coords(), writer)
    }

    /// Write ASCII STL to a file. Returns the facet count.
    pub fn save_stl(&self, path: impl AsRef<Path>) -> ReliefResult<usize> {
        self.exporter().save(&self.flat_coords(), path)
    }

    /// Height preview with the ridge highlighted.
    pub fn preview(&self) -> RgbaImage {
        render_preview(&self.fillet)
    }
}

/// A consumer of pipeline output.
pub trait ReliefSink {
    fn consume(&mut self, output: &ReliefOutput) -> ReliefResult<()>;
}

/// Writes the mesh as an ASCII STL file.
#[derive(Debug, Clone)]
pub struct StlFileSink {
    path: PathBuf,
    /// Facets written by the last `consume`.
    pub facets_written: usize,
}

impl StlFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            facets_written: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReliefSink for StlFileSink {
    fn consume(&mut self, output: &ReliefOutput) -> ReliefResult<()> {
        self.facets_written = output.save_stl(&self.path)?;
        Ok(())
    }
}

/// Writes the preview raster as a PNG file.
#[derive(Debug, Clone)]
pub struct PreviewPngSink {
    path: PathBuf,
}

impl PreviewPngSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReliefSink for PreviewPngSink {
    fn consume(&mut self, output: &ReliefOutput) -> ReliefResult<()> {
        save_preview(&output.fillet, &self.path)
    }
}

/// Fluent configuration of a relief build over a raw height grid.
#[derive(Debug, Clone)]
pub struct ReliefPipeline {
    raw: Grid,
    params: ReliefParams,
}

impl ReliefPipeline {
    /// Pipeline over already-scaled raw heights, default parameters.
    pub fn new(raw: Grid) -> Self {
        Self {
            raw,
            params: ReliefParams::default(),
        }
    }

    /// Load raw heights from `source` using `params.z_scale`.
    pub fn from_source<S: RasterSource + ?Sized>(
        source: &S,
        params: ReliefParams,
    ) -> ReliefResult<Self> {
        params.validate()?;
        let loader = HeightmapLoader::new(params.z_scale)?;
        let raw = source.load_heights(&loader)?;
        Ok(Self { raw, params })
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Replace all parameters at once.
    pub fn with_params(mut self, params: ReliefParams) -> Self {
        self.params = params;
        self
    }

    /// Height multiplier applied to the composed heights.
    pub fn z_scale(mut self, z_scale: f64) -> Self {
        self.params.z_scale = z_scale;
        self
    }

    pub fn z_cut(mut self, z_cut: f64) -> Self {
        self.params.z_cut = z_cut;
        self
    }

    pub fn side_walls(mut self, enabled: bool) -> Self {
        self.params.side_walls = enabled;
        self
    }

    pub fn mesh_heights(mut self, mode: MeshHeights) -> Self {
        self.params.mesh_heights = mode;
        self
    }

    pub fn solid_name(mut self, name: impl Into<String>) -> Self {
        self.params.solid_name = name.into();
        self
    }

    pub fn params(&self) -> &ReliefParams {
        &self.params
    }

    pub fn raw(&self) -> &Grid {
        &self.raw
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Run every stage in order.
    pub fn run(&self) -> ReliefResult<ReliefOutput> {
        let params = &self.params;
        params.validate()?;
        let raw = &self.raw;
        let timer = StageTimer::for_grid("relief_pipeline", raw);
        info!(
            width = raw.width(),
            height = raw.height(),
            z_scale = params.z_scale,
            z_cut = params.z_cut,
            side_walls = params.side_walls,
            "Running relief pipeline"
        );

        let edge = edge_distance(raw, params.z_cut);
        let mut skeleton = seed_skeleton(raw, &edge)?;
        chamfer_sweep(&mut skeleton);
        let fillet = compose_fillet(raw, &edge, &skeleton, params.z_scale)?;

        let quantized;
        let heights = match params.mesh_heights {
            MeshHeights::Continuous => &fillet.heights,
            MeshHeights::Quantized => {
                quantized = quantize_heights(&fillet.heights, params.z_scale);
                &quantized
            }
        };
        let mesh = MeshBuilder::new(heights)
            .side_walls(params.side_walls)
            .build();

        Ok(self.finish(edge, skeleton, mesh, fillet, timer))
    }

    fn finish(
        &self,
        edge: Grid,
        skeleton: Grid,
        mesh: ReliefMesh,
        fillet: FilletField,
        timer: StageTimer,
    ) -> ReliefOutput {
        let raw = &self.raw;
        let stats = ReliefStats {
            width: raw.width(),
            height: raw.height(),
            min_raw_height: raw.min_value(),
            max_raw_height: raw.max_value(),
            inside_cells: raw.cells().iter().filter(|&&h| h > self.params.z_cut).count(),
            ridge_cells: fillet.ridge_count(),
            longest_distance: fillet.longest_distance,
            max_fillet_height: fillet.heights.max_value(),
            top_triangles: mesh.stats.top_triangles,
            floor_triangles: mesh.stats.floor_triangles,
            wall_triangles: mesh.stats.wall_triangles,
            total_triangles: mesh.triangle_count(),
            elapsed_ms: timer.elapsed_ms(),
        };
        if mesh.is_empty() {
            warn!("Relief is flat; nothing to export");
        }
        ReliefOutput {
            edge_distance: edge,
            skeleton_distance: skeleton,
            fillet,
            mesh,
            stats,
            solid_name: self.params.solid_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use image::DynamicImage;

    fn centre_block() -> Grid {
        Grid::from_fn(4, 4, |x, y| {
            if (1..=2).contains(&x) && (1..=2).contains(&y) {
                200.0
            } else {
                0.0
            }
        })
        .unwrap()
    }

    #[test]
    fn test_pipeline_defaults() {
        let pipeline = ReliefPipeline::new(centre_block());
        assert_eq!(pipeline.params(), &ReliefParams::default());
        assert_eq!(pipeline.raw().dims(), (4, 4));
    }

    #[test]
    fn test_pipeline_chaining() {
        let pipeline = ReliefPipeline::new(centre_block())
            .z_scale(2.0)
            .z_cut(5.0)
            .side_walls(true)
            .mesh_heights(MeshHeights::Quantized)
            .solid_name("block");
        let params = pipeline.params();
        assert_eq!(params.z_scale, 2.0);
        assert_eq!(params.z_cut, 5.0);
        assert!(params.side_walls);
        assert_eq!(params.mesh_heights, MeshHeights::Quantized);
        assert_eq!(params.solid_name, "block");
    }

    #[test]
    fn test_centre_block_run() {
        let output = ReliefPipeline::new(centre_block()).run().unwrap();
        assert!(!output.is_empty());
        assert_eq!(output.stats.inside_cells, 4);
        assert_eq!(output.stats.ridge_cells, 1);
        assert_eq!(output.stats.total_triangles, output.mesh.triangle_count());
        assert!(output.stats.longest_distance > 0.0);

        let stl = output.export_stl().unwrap();
        assert!(stl.starts_with("solid relief\n"));
        let facets = stl.matches(" facet normal").count();
        assert_eq!(facets, output.mesh.triangle_count());
    }

    #[test]
    fn test_quantized_heights() {
        let output = ReliefPipeline::new(centre_block())
            .mesh_heights(MeshHeights::Quantized)
            .run()
            .unwrap();
        // Every top vertex sits on a whole number.
        for tri in &output.mesh.triangles {
            for v in &tri.vertices {
                assert_eq!(v.z, v.z.round());
            }
        }
    }

    #[test]
    fn test_invalid_params_rejected() {
        let err = ReliefPipeline::new(centre_block())
            .z_scale(-1.0)
            .run()
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidParams);
    }

    #[test]
    fn test_from_source_scales_samples() {
        let image = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            3,
            3,
            image::Rgba([100, 0, 0, 255]),
        ));
        let params = ReliefParams {
            z_scale: 0.5,
            ..Default::default()
        };
        let pipeline = ReliefPipeline::from_source(&image, params).unwrap();
        assert!(pipeline.raw().cells().iter().all(|&h| h == 50.0));
    }

    #[test]
    fn test_sinks_write_files() {
        let dir = tempfile::tempdir().unwrap();
        let output = ReliefPipeline::new(centre_block()).run().unwrap();

        let mut stl = StlFileSink::new(dir.path().join("out.stl"));
        stl.consume(&output).unwrap();
        assert_eq!(stl.facets_written, output.mesh.triangle_count());
        assert!(stl.path().exists());

        let mut png = PreviewPngSink::new(dir.path().join("out.png"));
        png.consume(&output).unwrap();
        let preview = image::open(png.path()).unwrap();
        assert_eq!((preview.width(), preview.height()), (4, 4));
    }

    #[test]
    fn test_write_stl_matches_export() {
        let output = ReliefPipeline::new(centre_block()).run().unwrap();
        let mut buf = Vec::new();
        output.write_stl(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), output.export_stl().unwrap());
    }
}

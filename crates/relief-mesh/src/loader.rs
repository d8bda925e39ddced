//! Heightmap loading.
//!
//! A heightmap is any raster the `image` crate can decode. Only the red
//! channel is read; each sample is multiplied by `z_scale`.
//!
//! # Example
//!
//! ```no_run
//! use relief_mesh::HeightmapLoader;
//!
//! let raw = HeightmapLoader::new(1.0).unwrap().load("shape.png").unwrap();
//! println!("{}x{}", raw.width(), raw.height());
//! ```

use image::DynamicImage;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{ReliefError, ReliefResult};
use crate::grid::Grid;

/// Bytes per RGBA pixel.
const RGBA_STRIDE: usize = 4;

/// Turns rasters into raw height grids.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightmapLoader {
    z_scale: f64,
}

impl Default for HeightmapLoader {
    fn default() -> Self {
        Self { z_scale: 1.0 }
    }
}

impl HeightmapLoader {
    /// Loader multiplying every sample by `z_scale`, which must be positive
    /// and finite.
    pub fn new(z_scale: f64) -> ReliefResult<Self> {
        if !(z_scale.is_finite() && z_scale > 0.0) {
            return Err(ReliefError::invalid_params(format!(
                "z_scale must be positive and finite, got {z_scale}"
            )));
        }
        Ok(Self { z_scale })
    }

    pub fn z_scale(&self) -> f64 {
        self.z_scale
    }

    /// Apply this loader's scale to unscaled samples, as if they had been
    /// loaded through it.
    pub fn scale(&self, samples: &Grid) -> Grid {
        let mut heights = samples.clone();
        for v in heights.cells_mut() {
            *v *= self.z_scale;
        }
        heights
    }

    /// Build heights from tightly packed RGBA bytes, row-major from the top.
    pub fn from_rgba(&self, width: u32, height: u32, bytes: &[u8]) -> ReliefResult<Grid> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(RGBA_STRIDE));
        if expected != Some(bytes.len()) {
            return Err(ReliefError::invalid_dimensions(
                width,
                height,
                format!("expected width*height*4 RGBA bytes, got {}", bytes.len()),
            ));
        }
        let cells = bytes
            .chunks_exact(RGBA_STRIDE)
            .map(|px| f64::from(px[0]) * self.z_scale)
            .collect();
        let grid = Grid::from_cells(width, height, cells)?;
        debug!(
            width = width,
            height = height,
            z_scale = self.z_scale,
            max = grid.max_value(),
            "Loaded heights from RGBA"
        );
        Ok(grid)
    }

    /// Build heights from a decoded image of any pixel format.
    pub fn from_image(&self, image: &DynamicImage) -> ReliefResult<Grid> {
        let rgba = image.to_rgba8();
        self.from_rgba(rgba.width(), rgba.height(), rgba.as_raw())
    }

    /// Decode an encoded raster (PNG, JPEG, BMP, GIF) held in memory.
    pub fn decode(&self, bytes: &[u8]) -> ReliefResult<Grid> {
        let image = image::load_from_memory(bytes).map_err(|e| ReliefError::ImageDecode {
            path: None,
            details: e.to_string(),
        })?;
        self.from_image(&image)
    }

    /// Read and decode a raster file.
    pub fn load(&self, path: impl AsRef<Path>) -> ReliefResult<Grid> {
        let path = path.as_ref();
        info!("Loading heightmap from {:?}", path);

        let bytes = std::fs::read(path).map_err(|e| ReliefError::io_read(path, e))?;
        let image = image::load_from_memory(&bytes).map_err(|e| ReliefError::ImageDecode {
            path: Some(path.to_path_buf()),
            details: e.to_string(),
        })?;
        let grid = self.from_image(&image)?;

        info!(
            "Loaded {}x{} heightmap (max height {:.2})",
            grid.width(),
            grid.height(),
            grid.max_value()
        );
        Ok(grid)
    }
}

/// Something the pipeline can read raw heights from.
pub trait RasterSource {
    /// Produce the raw height grid, applying the loader's scale where the
    /// source holds 8-bit samples.
    fn load_heights(&self, loader: &HeightmapLoader) -> ReliefResult<Grid>;

    /// Whether the source holds 8-bit samples that `z_scale` applies to.
    fn holds_samples(&self) -> bool {
        true
    }
}

impl RasterSource for Path {
    fn load_heights(&self, loader: &HeightmapLoader) -> ReliefResult<Grid> {
        loader.load(self)
    }
}

impl RasterSource for PathBuf {
    fn load_heights(&self, loader: &HeightmapLoader) -> ReliefResult<Grid> {
        loader.load(self)
    }
}

impl RasterSource for DynamicImage {
    fn load_heights(&self, loader: &HeightmapLoader) -> ReliefResult<Grid> {
        loader.from_image(self)
    }
}

/// A grid is taken as already-scaled heights.
impl RasterSource for Grid {
    fn load_heights(&self, _loader: &HeightmapLoader) -> ReliefResult<Grid> {
        Ok(self.clone())
    }

    fn holds_samples(&self) -> bool {
        false
    }
}

//! RGBA preview of composed heights with the ridge highlighted.
//!
//! Each pixel carries the final height in every channel except on ridge
//! cells, which are drawn with green forced to 255 and blue to 0. Channel
//! values are rounded half to even and clamped to `u8`.

use image::{ImageFormat, Rgba, RgbaImage};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{ReliefError, ReliefResult};
use crate::fillet::FilletField;

/// Round a height to the nearest integer, ties to even, and clamp it into a
/// `u8` channel, matching how canvas pixel buffers store values.
///
/// NaN maps to 0.
#[inline]
pub fn to_channel(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round_ties_even().clamp(0.0, 255.0) as u8
}

/// Pixel for one cell.
#[inline]
pub fn preview_pixel(height: f64, ridge: bool) -> Rgba<u8> {
    let c = to_channel(height);
    if ridge {
        Rgba([c, 255, 0, 255])
    } else {
        Rgba([c, c, c, 255])
    }
}

/// Render the preview raster, same size as the height grid.
pub fn render_preview(field: &FilletField) -> RgbaImage {
    let heights = &field.heights;
    let image = RgbaImage::from_fn(heights.width(), heights.height(), |x, y| {
        preview_pixel(heights.get(x, y), field.is_ridge(x, y))
    });
    debug!(
        width = image.width(),
        height = image.height(),
        "Rendered preview raster"
    );
    image
}

/// Render the preview and write it as PNG.
pub fn save_preview(field: &FilletField, path: impl AsRef<Path>) -> ReliefResult<()> {
    let path = path.as_ref();
    let image = render_preview(field);
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| match e {
            image::ImageError::IoError(source) => ReliefError::io_write(path, source),
            other => ReliefError::io_write(path, std::io::Error::other(other.to_string())),
        })?;
    info!(path = %path.display(), "Saved preview PNG");
    Ok(())
}

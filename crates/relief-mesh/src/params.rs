//! Relief parameters and their config-file form.
//!
//! With the `config` feature, parameters load from and save to TOML or JSON:
//!
//! ```toml
//! z_scale = 0.5
//! z_cut = 0.1
//! side_walls = true
//! mesh_heights = "quantized"
//! solid_name = "badge"
//! ```
//!
//! Missing keys fall back to [`ReliefParams::default`].

use crate::distance::DEFAULT_Z_CUT;
use crate::error::{ReliefError, ReliefResult};
use crate::stl::DEFAULT_SOLID_NAME;

/// Which heights the mesh builder triangulates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "config",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum MeshHeights {
    /// Composed fillet heights as computed.
    #[default]
    Continuous,
    /// Heights rounded and clamped to `0..=255`, then multiplied by
    /// `z_scale`, matching a preview raster read back as a heightmap.
    Quantized,
}

/// Parameters for one relief build.
///
/// # Example
///
/// ```
/// use relief_mesh::ReliefParams;
///
/// let params = ReliefParams {
///     z_scale: 0.5,
///     side_walls: true,
///     ..Default::default()
/// };
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "config",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ReliefParams {
    /// Multiplier applied to raw 8-bit samples at load time and again to
    /// the fillet heights.
    ///
    /// Default: `1.0`
    pub z_scale: f64,

    /// Raw heights at or below this are outside the shape.
    ///
    /// Default: `0.1`
    pub z_cut: f64,

    /// Close the slab with vertical skirts along its outline.
    ///
    /// Default: `false`
    pub side_walls: bool,

    /// Height source for the mesh.
    ///
    /// Default: [`MeshHeights::Continuous`]
    pub mesh_heights: MeshHeights,

    /// Name written into the STL `solid` line.
    ///
    /// Default: `"relief"`
    pub solid_name: String,
}

impl Default for ReliefParams {
    fn default() -> Self {
        Self {
            z_scale: 1.0,
            z_cut: DEFAULT_Z_CUT,
            side_walls: false,
            mesh_heights: MeshHeights::Continuous,
            solid_name: DEFAULT_SOLID_NAME.to_string(),
        }
    }
}

impl ReliefParams {
    /// Watertight output for slicers: side walls on.
    pub fn for_printing() -> Self {
        Self {
            side_walls: true,
            ..Self::default()
        }
    }

    /// What an on-screen preview shows: heights read back from the preview
    /// raster, no walls.
    pub fn for_preview() -> Self {
        Self {
            mesh_heights: MeshHeights::Quantized,
            ..Self::default()
        }
    }

    /// Check every field is in range.
    pub fn validate(&self) -> ReliefResult<()> {
        if !(self.z_scale.is_finite() && self.z_scale > 0.0) {
            return Err(ReliefError::invalid_params(format!(
                "z_scale must be positive and finite, got {}",
                self.z_scale
            )));
        }
        if !self.z_cut.is_finite() {
            return Err(ReliefError::invalid_params(format!(
                "z_cut must be finite, got {}",
                self.z_cut
            )));
        }
        if self.solid_name.trim().is_empty() {
            return Err(ReliefError::invalid_params("solid name must not be empty"));
        }
        Ok(())
    }
}

#[cfg(feature = "config")]
impl ReliefParams {
    /// Load parameters from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or doesn't match the schema.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Load parameters from a TOML file.
    pub fn from_toml_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&contents)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save parameters to a TOML file.
    pub fn save_toml(&self, path: impl AsRef<std::path::Path>) -> Result<(), ConfigError> {
        let toml_str = self.to_toml()?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    /// Load parameters from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json_str)?)
    }

    /// Serialize to a pretty JSON string.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load from a file, picking JSON for `.json` and TOML otherwise.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&std::fs::read_to_string(path)?)
        } else {
            Self::from_toml_file(path)
        }
    }
}

/// Errors that can occur when loading or saving parameter files.
#[cfg(feature = "config")]
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading or writing file.
    Io(std::io::Error),
    /// TOML parsing error.
    TomlParse(toml::de::Error),
    /// TOML serialization error.
    TomlSerialize(toml::ser::Error),
    /// JSON parsing or serialization error.
    Json(serde_json::Error),
}

#[cfg(feature = "config")]
impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::TomlParse(e) => write!(f, "TOML parse error: {}", e),
            Self::TomlSerialize(e) => write!(f, "TOML serialize error: {}", e),
            Self::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

#[cfg(feature = "config")]
impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::TomlParse(e) => Some(e),
            Self::TomlSerialize(e) => Some(e),
            Self::Json(e) => Some(e),
        }
    }
}

#[cfg(feature = "config")]
impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

#[cfg(feature = "config")]
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::TomlParse(e)
    }
}

#[cfg(feature = "config")]
impl From<toml::ser::Error> for ConfigError {
    fn from(e: toml::ser::Error) -> Self {
        Self::TomlSerialize(e)
    }
}

#[cfg(feature = "config")]
impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

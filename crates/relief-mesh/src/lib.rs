//! Filleted relief meshes from grayscale heightmaps.
//!
//! A heightmap's red channel becomes a raw height field. Two approximate
//! distance fields are computed over it (distance to the shape outline and
//! distance to its ridge) and combined into a rounded "pocket" profile that
//! rises steeply at the outline and flattens along the ridge. The result is
//! triangulated into a slab and written as ASCII STL.
//!
//! # Features
//!
//! - **Chamfer distance fields**: four sequential sweeps, no exact EDT
//! - **Ridge extraction**: local maxima of the outline distance seed the
//!   second field
//! - **Fillet composition**: per-cell circular profile, data-parallel with rayon
//! - **Mesh builder**: top surface, mirrored floor and optional side walls
//! - **ASCII STL**: writers, strings and files
//! - **Session**: recompute state machine that discards stale results
//! - **Config files**: [`ReliefParams`] as TOML or JSON (`config` feature)
//!
//! # Quick Start
//!
//! ```no_run
//! use relief_mesh::{ReliefParams, ReliefPipeline};
//! use std::path::Path;
//!
//! let output = ReliefPipeline::from_source(Path::new("logo.png"), ReliefParams::default())
//!     .unwrap()
//!     .side_walls(true)
//!     .run()
//!     .unwrap();
//!
//! if output.is_empty() {
//!     println!("nothing to export");
//! } else {
//!     output.save_stl("logo.stl").unwrap();
//! }
//! ```
//!
//! # Low-Level API
//!
//! Each stage is also available on its own:
//!
//! ```
//! use relief_mesh::{Grid, MeshBuilder, SolidExporter};
//! use relief_mesh::distance::{chamfer_sweep, edge_distance, DEFAULT_Z_CUT};
//! use relief_mesh::fillet::compose_fillet;
//! use relief_mesh::skeleton::seed_skeleton;
//!
//! let raw = Grid::from_fn(8, 8, |x, y| {
//!     if (2..6).contains(&x) && (2..6).contains(&y) { 255.0 } else { 0.0 }
//! }).unwrap();
//!
//! let edge = edge_distance(&raw, DEFAULT_Z_CUT);
//! let mut ridge = seed_skeleton(&raw, &edge).unwrap();
//! chamfer_sweep(&mut ridge);
//! let fillet = compose_fillet(&raw, &edge, &ridge, 1.0).unwrap();
//!
//! let mesh = MeshBuilder::new(&fillet.heights).build();
//! let stl = SolidExporter::for_mesh(&mesh).to_text(&mesh.to_flat_coords()).unwrap();
//! assert!(stl.starts_with("solid relief"));
//! ```
//!
//! # Error Handling
//!
//! Fallible operations return [`ReliefResult<T>`]. Every [`ReliefError`]
//! carries a machine-readable [`ErrorCode`] and a [`RecoverySuggestion`]:
//!
//! ```
//! use relief_mesh::{ErrorCode, ReliefPipeline, Grid};
//!
//! let err = ReliefPipeline::new(Grid::zeros(4, 4).unwrap())
//!     .z_scale(0.0)
//!     .run()
//!     .unwrap_err();
//! assert_eq!(err.code(), ErrorCode::InvalidParams);
//! println!("{} ({})", err, err.recovery_suggestion());
//! ```
//!
//! A flat heightmap is not an error: it yields an empty mesh.
//!
//! # Logging
//!
//! Stages log through `tracing`. Timings go to the `relief_mesh::timing`
//! target and grid summaries to `relief_mesh::grid_state`; see
//! [`tracing_ext`].

mod builder;
mod error;
mod grid;
mod loader;
mod params;
mod pipeline;
mod session;
mod types;

pub mod distance;
pub mod fillet;
pub mod preview;
pub mod skeleton;
pub mod stl;
pub mod tracing_ext;

pub use builder::MeshBuilder;
pub use error::{ErrorCode, RecoverySuggestion, ReliefError, ReliefResult};
pub use fillet::FilletField;
pub use grid::Grid;
pub use loader::{HeightmapLoader, RasterSource};
#[cfg(feature = "config")]
pub use params::ConfigError;
pub use params::{MeshHeights, ReliefParams};
pub use pipeline::{
    PreviewPngSink, ReliefOutput, ReliefPipeline, ReliefSink, ReliefStats, StlFileSink,
};
pub use session::{
    ComputedRelief, DEFAULT_QUIET_PERIOD, Debouncer, RecomputeTicket, ReliefSession, SessionState,
};
pub use stl::{DEFAULT_SOLID_NAME, SolidExporter};
pub use types::{MeshStats, ReliefMesh, Triangle};

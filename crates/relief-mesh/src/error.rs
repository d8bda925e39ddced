// Allow unused_assignments lint for error struct fields that are used in thiserror Display macros
// but appear as "never read" to the compiler. This is a false positive in newer Rust versions.
#![allow(unused_assignments)]

//! Error types for relief operations with rich diagnostics.
//!
//! This module provides:
//! - Machine-readable error codes for programmatic handling
//! - Context about which cell, grid size or file was involved
//! - Recovery suggestions for common issues
//! - Terminal display via miette
//!
//! # Error Codes
//!
//! Each error has a unique code in the format `RELIEF-XXXX`:
//! - `RELIEF-1xxx`: Input errors (dimensions, parameters)
//! - `RELIEF-2xxx`: Numeric invariant errors inside the pipeline
//! - `RELIEF-3xxx`: Export errors
//! - `RELIEF-4xxx`: I/O and decoding errors
//! - `RELIEF-5xxx`: Session state errors

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

use crate::session::SessionState;

/// Result type alias for relief operations.
pub type ReliefResult<T> = Result<T, ReliefError>;

/// Machine-readable error codes for relief operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// RELIEF-1001: Grid or raster has zero or inconsistent dimensions
    InvalidDimensions = 1001,
    /// RELIEF-1002: Two grids handed to one stage differ in size
    DimensionMismatch = 1002,
    /// RELIEF-1003: Parameter out of range
    InvalidParams = 1003,

    /// RELIEF-2001: Fillet operands broke the distance-field invariant
    DomainInvariantViolation = 2001,

    /// RELIEF-3001: Vertex buffer length is not a whole number of triangles
    MalformedVertexBuffer = 3001,

    /// RELIEF-4001: Raster could not be decoded
    ImageDecode = 4001,
    /// RELIEF-4002: Failed to read file
    IoRead = 4002,
    /// RELIEF-4003: Failed to write file
    IoWrite = 4003,

    /// RELIEF-5001: Session operation not allowed in the current state
    InvalidTransition = 5001,
}

impl ErrorCode {
    /// Returns the error code as a string in the format `RELIEF-XXXX`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidDimensions => "RELIEF-1001",
            ErrorCode::DimensionMismatch => "RELIEF-1002",
            ErrorCode::InvalidParams => "RELIEF-1003",
            ErrorCode::DomainInvariantViolation => "RELIEF-2001",
            ErrorCode::MalformedVertexBuffer => "RELIEF-3001",
            ErrorCode::ImageDecode => "RELIEF-4001",
            ErrorCode::IoRead => "RELIEF-4002",
            ErrorCode::IoWrite => "RELIEF-4003",
            ErrorCode::InvalidTransition => "RELIEF-5001",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recovery suggestions for relief errors.
#[derive(Debug, Clone, PartialEq)]
pub enum RecoverySuggestion {
    /// Check the input raster.
    CheckInput { checks: Vec<String> },
    /// Adjust parameters for the operation.
    AdjustParameters { parameters: Vec<(String, String)> },
    /// An upstream stage produced bad data; this is a bug, not bad input.
    ReportBug { stage: String },
    /// Call session operations in a valid order.
    FollowSessionOrder { expected: String },
    /// No automatic recovery available.
    None,
}

impl std::fmt::Display for RecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecoverySuggestion::CheckInput { checks } => {
                write!(f, "Check the input for: {}", checks.join(", "))
            }
            RecoverySuggestion::AdjustParameters { parameters } => {
                let params: Vec<String> = parameters
                    .iter()
                    .map(|(k, v)| format!("{} = {}", k, v))
                    .collect();
                write!(f, "Try adjusting: {}", params.join(", "))
            }
            RecoverySuggestion::ReportBug { stage } => {
                write!(f, "The {} stage produced invalid data; please report this", stage)
            }
            RecoverySuggestion::FollowSessionOrder { expected } => {
                write!(f, "Expected session order: {}", expected)
            }
            RecoverySuggestion::None => write!(f, "No automatic recovery available"),
        }
    }
}

/// Errors that can occur while building a relief.
#[derive(Debug, Error, Diagnostic)]
pub enum ReliefError {
    /// Grid or raster dimensions are zero or do not match the data.
    #[error("invalid dimensions {width}x{height}: {details}")]
    #[diagnostic(
        code(relief::input::dimensions),
        help("Grids need at least one row and one column, and exactly width*height cells.")
    )]
    InvalidDimensions {
        width: u32,
        height: u32,
        details: String,
    },

    /// Two grids passed to the same stage have different sizes.
    #[error(
        "grid dimension mismatch: expected {}x{}, found {}x{}",
        expected.0, expected.1, found.0, found.1
    )]
    #[diagnostic(
        code(relief::input::mismatch),
        help("All grids of one pipeline run must come from the same heightmap.")
    )]
    DimensionMismatch {
        expected: (u32, u32),
        found: (u32, u32),
    },

    /// A parameter is out of its valid range.
    #[error("invalid relief parameters: {details}")]
    #[diagnostic(
        code(relief::params::invalid),
        help("Check parameter values: z_scale > 0, z_cut finite, solid name not empty.")
    )]
    InvalidParams { details: String },

    /// The fillet formula received operands that cannot come from a correct distance field.
    #[error(
        "fillet domain violated at cell ({x}, {y}): edge distance {edge}, skeleton distance {skeleton}"
    )]
    #[diagnostic(
        code(relief::fillet::domain),
        help("Distance fields must be finite and non-negative; an upstream sweep is broken.")
    )]
    DomainInvariantViolation {
        x: u32,
        y: u32,
        edge: f64,
        skeleton: f64,
    },

    /// A flat vertex buffer does not hold whole triangles.
    #[error("vertex buffer of {len} values is not a multiple of 9 (3 vertices x 3 coordinates)")]
    #[diagnostic(
        code(relief::export::buffer),
        help("Pass the buffer produced by ReliefMesh::to_flat_coords unchanged.")
    )]
    MalformedVertexBuffer { len: usize },

    /// Raster decoding failed.
    #[error("failed to decode heightmap{}: {details}", path.as_ref().map(|p| format!(" {}", p.display())).unwrap_or_default())]
    #[diagnostic(
        code(relief::io::decode),
        help("Supported rasters: PNG, JPEG, BMP, GIF. Re-save the image as 8-bit PNG if unsure.")
    )]
    ImageDecode {
        path: Option<PathBuf>,
        details: String,
    },

    /// Error reading from a file.
    #[error("failed to read {path}")]
    #[diagnostic(
        code(relief::io::read),
        help("Check that the file exists and is readable. Try: ls -la {}", path.display())
    )]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error writing to a file or stream.
    #[error("failed to write {path}")]
    #[diagnostic(
        code(relief::io::write),
        help("Check that the directory exists and is writable")
    )]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A session operation was called in a state that does not allow it.
    #[error("cannot {action} while session is {from:?}")]
    #[diagnostic(
        code(relief::session::transition),
        help("Load an image, then recompute, then export.")
    )]
    InvalidTransition {
        from: SessionState,
        action: &'static str,
    },
}

impl ReliefError {
    /// Returns the machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            ReliefError::InvalidDimensions { .. } => ErrorCode::InvalidDimensions,
            ReliefError::DimensionMismatch { .. } => ErrorCode::DimensionMismatch,
            ReliefError::InvalidParams { .. } => ErrorCode::InvalidParams,
            ReliefError::DomainInvariantViolation { .. } => ErrorCode::DomainInvariantViolation,
            ReliefError::MalformedVertexBuffer { .. } => ErrorCode::MalformedVertexBuffer,
            ReliefError::ImageDecode { .. } => ErrorCode::ImageDecode,
            ReliefError::IoRead { .. } => ErrorCode::IoRead,
            ReliefError::IoWrite { .. } => ErrorCode::IoWrite,
            ReliefError::InvalidTransition { .. } => ErrorCode::InvalidTransition,
        }
    }

    /// Returns a recovery suggestion for this error.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self {
            ReliefError::InvalidDimensions { .. } => RecoverySuggestion::CheckInput {
                checks: vec!["image is not empty".into(), "buffer length".into()],
            },
            ReliefError::DimensionMismatch { .. } => RecoverySuggestion::CheckInput {
                checks: vec!["all grids come from one heightmap".into()],
            },
            ReliefError::InvalidParams { .. } => RecoverySuggestion::AdjustParameters {
                parameters: vec![
                    ("z_scale".into(), "a positive number, default 1.0".into()),
                    ("z_cut".into(), "a finite number, default 0.1".into()),
                ],
            },
            ReliefError::DomainInvariantViolation { .. } => RecoverySuggestion::ReportBug {
                stage: "distance field".into(),
            },
            ReliefError::MalformedVertexBuffer { .. } => RecoverySuggestion::ReportBug {
                stage: "mesh builder".into(),
            },
            ReliefError::ImageDecode { .. } => RecoverySuggestion::CheckInput {
                checks: vec!["image format".into(), "file is not truncated".into()],
            },
            ReliefError::IoRead { .. } => RecoverySuggestion::CheckInput {
                checks: vec!["file exists".into(), "file permissions".into()],
            },
            ReliefError::IoWrite { .. } => RecoverySuggestion::CheckInput {
                checks: vec!["directory exists".into(), "write permissions".into()],
            },
            ReliefError::InvalidTransition { .. } => RecoverySuggestion::FollowSessionOrder {
                expected: "load -> recompute -> export".into(),
            },
        }
    }

    // Constructor helpers for common error patterns

    /// Create an InvalidDimensions error.
    pub fn invalid_dimensions(width: u32, height: u32, details: impl Into<String>) -> Self {
        ReliefError::InvalidDimensions {
            width,
            height,
            details: details.into(),
        }
    }

    /// Create an InvalidParams error.
    pub fn invalid_params(details: impl Into<String>) -> Self {
        ReliefError::InvalidParams {
            details: details.into(),
        }
    }

    /// Create an IoRead error.
    pub fn io_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReliefError::IoRead {
            path: path.into(),
            source,
        }
    }

    /// Create an IoWrite error.
    pub fn io_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReliefError::IoWrite {
            path: path.into(),
            source,
        }
    }
}

//! Error types for world creation and configuration loading.
//!
//! Runtime voxel operations have no error path: out-of-bounds reads and writes
//! are defined as default reads and no-op writes. The only failures are the
//! ones that stop a world from being created at all.

use std::collections::TryReserveError;

use thiserror::Error;

/// Errors that abort world creation.
#[derive(Error, Debug)]
pub enum WorldError {
    /// A grid dimension was zero or did not fit the coordinate type.
    #[error("invalid world dimensions {width}x{height}x{depth}")]
    InvalidDimensions {
        /// Requested width (x).
        width: u32,
        /// Requested height (y).
        height: u32,
        /// Requested depth (z).
        depth: u32,
    },

    /// The total cell count overflowed `usize`.
    #[error("world of {width}x{height}x{depth} cells is too large to address")]
    DimensionOverflow {
        /// Requested width (x).
        width: u32,
        /// Requested height (y).
        height: u32,
        /// Requested depth (z).
        depth: u32,
    },

    /// The backing store could not be allocated.
    #[error("failed to allocate {cells} voxel cells")]
    Allocation {
        /// Number of cells requested.
        cells: usize,
        /// The allocator's report.
        #[source]
        source: TryReserveError,
    },

    /// The per-chunk bookkeeping could not be allocated.
    #[error("failed to allocate the table of {chunks} chunks")]
    ChunkAllocation {
        /// Number of chunks requested.
        chunks: usize,
        /// The allocator's report.
        #[source]
        source: TryReserveError,
    },

    /// The configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors produced while loading or validating a `WorldConfig`.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The config file was not valid JSON for `WorldConfig`.
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    /// A block name did not match any block type.
    #[error("unknown block type `{0}`")]
    UnknownBlock(String),

    /// A numeric setting was out of its allowed range.
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue {
        /// Name of the offending setting.
        field: &'static str,
        /// What was wrong with it.
        reason: String,
    },
}

//! Core types shared across the disk-backed R*-tree engine.
//!
//! This module defines the error type, the in-memory cell/node
//! representation, and the handful of constants the rest of `disk_rtree`
//! is built from.

use nitrite::errors::NitriteError;
use std::io;
use thiserror::Error;

/// Errors that can occur in spatial indexing operations.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("out of memory")]
    Oom,

    #[error("corruption: {0}")]
    Corruption(String),

    #[error("constraint violated: {0}")]
    Constraint(String),

    #[error("host error: {0}")]
    Host(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<SpatialError> for NitriteError {
    fn from(err: SpatialError) -> Self {
        use nitrite::errors::ErrorKind;
        match err {
            SpatialError::Io(io_err) => NitriteError::new(
                &format!("spatial I/O error: {}", io_err),
                ErrorKind::IOError,
            ),
            SpatialError::Oom => {
                NitriteError::new("spatial index out of memory", ErrorKind::InternalError)
            }
            SpatialError::Corruption(msg) => {
                NitriteError::new(&format!("spatial index corrupted: {}", msg), ErrorKind::IndexCorrupted)
            }
            SpatialError::Constraint(msg) => {
                NitriteError::new(&msg, ErrorKind::ValidationError)
            }
            SpatialError::Host(msg) => {
                NitriteError::new(&msg, ErrorKind::Extension("spatial".to_string()))
            }
        }
    }
}

impl From<NitriteError> for SpatialError {
    fn from(err: NitriteError) -> Self {
        use nitrite::errors::ErrorKind;
        match err.kind() {
            ErrorKind::IOError
            | ErrorKind::FileNotFound
            | ErrorKind::PermissionDenied
            | ErrorKind::DiskFull
            | ErrorKind::FileCorrupted
            | ErrorKind::FileAccessError => {
                SpatialError::Io(io::Error::new(io::ErrorKind::Other, err.message().to_string()))
            }
            ErrorKind::IndexCorrupted => SpatialError::Corruption(err.message().to_string()),
            _ => SpatialError::Host(err.message().to_string()),
        }
    }
}

/// Result type for spatial operations.
pub type SpatialResult<T> = Result<T, SpatialError>;

/// Maximum number of dimensions a tree may index (spec: 1 ≤ N ≤ 5).
pub const MAX_DIMS: usize = 5;

/// The root node always lives at node number 1.
pub const ROOT_NODE_NO: NodeNo = 1;

/// Depths beyond this are treated as corruption when loading the root.
pub const MAX_DEPTH: u16 = 40;

/// Absolute ceiling on cells per node regardless of the configured page size.
pub const MAX_CELLS_PER_NODE: usize = 51;

/// Guttman's `m`, this tree's minimum per-node occupancy and forced-reinsert
/// count: exactly `M/3`, not the general R*-tree paper's 40%-fill / 30%-reinsert
/// figures. Shared by the split-axis search, the split distribution search,
/// forced reinsert, and condense's underfull check so all four agree on the
/// same threshold for a given `max_cells`.
pub fn min_fill(max_cells: usize) -> usize {
    (max_cells / 3).max(2)
}

/// A row identifier on a leaf cell, or a child node number on an internal cell.
pub type Rowid = i64;

/// A node's on-disk identifier, assigned by the backing store on first flush.
pub type NodeNo = i64;

/// The coordinate representation chosen once per tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoordKind {
    /// IEEE-754 single precision, stored big-endian.
    Float32,
    /// Signed 32-bit integer, stored big-endian.
    Int32,
}

/// One rowid (or child node number) plus `2*ndim` coordinates, widened to
/// `f64` for arithmetic regardless of the tree's `CoordKind`.
///
/// `coords` is laid out `[lo_0, hi_0, lo_1, hi_1, ...]`; only the first
/// `2*ndim` entries (carried by the owning tree, not the cell) are
/// meaningful.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    pub rowid: Rowid,
    pub coords: [f64; 2 * MAX_DIMS],
}

impl Cell {
    pub fn new(rowid: Rowid, coords: &[f64]) -> Self {
        let mut buf = [0.0f64; 2 * MAX_DIMS];
        buf[..coords.len()].copy_from_slice(coords);
        Cell { rowid, coords: buf }
    }

    #[inline]
    pub fn lo(&self, dim: usize) -> f64 {
        self.coords[2 * dim]
    }

    #[inline]
    pub fn hi(&self, dim: usize) -> f64 {
        self.coords[2 * dim + 1]
    }

    #[inline]
    pub fn set_lo(&mut self, dim: usize, v: f64) {
        self.coords[2 * dim] = v;
    }

    #[inline]
    pub fn set_hi(&mut self, dim: usize, v: f64) {
        self.coords[2 * dim + 1] = v;
    }

    pub fn range(&self, ndim: usize) -> &[f64] {
        &self.coords[..2 * ndim]
    }

    /// Validates the `lo_i <= hi_i` invariant for every dimension.
    pub fn validate(&self, ndim: usize) -> SpatialResult<()> {
        for d in 0..ndim {
            if self.lo(d) > self.hi(d) {
                return Err(SpatialError::Constraint(format!(
                    "hi < lo on dimension {} ({} < {})",
                    d,
                    self.hi(d),
                    self.lo(d)
                )));
            }
        }
        Ok(())
    }
}

/// A node page: a fixed-slot array of cells plus the tree depth (meaningful
/// only when this is the root).
#[derive(Clone, Debug, Default)]
pub struct PageNode {
    pub depth: u16,
    pub cells: Vec<Cell>,
}

impl PageNode {
    pub fn empty() -> Self {
        PageNode { depth: 0, cells: Vec::new() }
    }

    pub fn ncell(&self) -> usize {
        self.cells.len()
    }
}

//! Disk-backed R*-tree spatial index.
//!
//! Built as a ref-counted node cache (`cache`) over a three-table backing
//! store (`store`), with query planning (`query`), insertion (`insert`),
//! deletion (`delete`), lifecycle management (`lifecycle`), and MATCH
//! predicates (`predicate`) layered on top. `codec` handles the exact
//! on-disk byte format; `primitives` holds the N-dimensional geometry math
//! everything else is built from.

pub mod cache;
pub mod codec;
pub mod delete;
pub mod insert;
pub mod lifecycle;
pub mod predicate;
pub mod primitives;
pub mod query;
pub mod rtree;
pub mod rtree_types;
pub mod store;

pub use predicate::{
    deregister_callback, lookup_callback, register_callback, ContainsCallback, GeomCallback,
    IntersectsCallback, MatchPredicate, MATCH_MAGIC,
};
pub use query::{CompareOp, Constraint, Cursor, IndexPlan};
pub use rtree::{RTree, RTreeConfig, RTreeStats, RTreeVtab, UpdateArgs, VtabCursor};
pub use rtree_types::{Cell, CoordKind, NodeNo, PageNode, Rowid, SpatialError, SpatialResult};

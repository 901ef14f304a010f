//! Component H — tree lifecycle: create/connect, node sizing, rename,
//! destroy.

use nitrite::store::NitriteStore;

use super::rtree_types::{CoordKind, SpatialError, SpatialResult, MAX_CELLS_PER_NODE, MAX_DIMS, ROOT_NODE_NO};
use super::store::BackingStore;

/// Default page size assumed when the host gives no explicit hint,
/// matching the common on-disk page size SQLite's rtree module defaults
/// to when `PRAGMA page_size` hasn't been set.
const DEFAULT_PAGE_SIZE: usize = 4096;

/// Fixed per-page overhead reserved for the node header and the host
/// storage layer's own bookkeeping.
const PAGE_OVERHEAD: usize = 64;

/// Derives how many cells fit in one node for a tree of `ndim` dimensions
/// given a host page size, capped at `MAX_CELLS_PER_NODE` regardless of how
/// large the page is.
pub fn max_cells_for(page_size: usize, ndim: usize) -> usize {
    let usable = page_size.saturating_sub(PAGE_OVERHEAD).max(super::codec::bytes_per_cell(ndim) + 4);
    let bytes_per_cell = super::codec::bytes_per_cell(ndim);
    let fit = (usable - 4) / bytes_per_cell;
    fit.min(MAX_CELLS_PER_NODE).max(4)
}

pub fn default_max_cells(ndim: usize) -> usize {
    max_cells_for(DEFAULT_PAGE_SIZE, ndim)
}

/// Validates `ndim` against the supported dimensionality range.
pub fn validate_ndim(ndim: usize) -> SpatialResult<()> {
    if ndim == 0 || ndim > MAX_DIMS {
        return Err(SpatialError::Constraint(format!(
            "dimensionality {} outside supported range 1..={}",
            ndim, MAX_DIMS
        )));
    }
    Ok(())
}

/// Declares the number of virtual-table columns a tree of this
/// dimensionality exposes: `rowid` + `2*ndim` coordinate columns, i.e. an
/// even argument count between 6 and `2*MAX_DIMS+4` inclusive, matching
/// the column-count invariant.
pub fn column_count(ndim: usize) -> usize {
    1 + 2 * ndim
}

/// Creates the backing tables and an empty root node for a brand-new tree.
pub fn create(store: &NitriteStore, base_name: &str, ndim: usize, kind: CoordKind, page_size: usize) -> SpatialResult<BackingStore> {
    validate_ndim(ndim)?;
    let backing = BackingStore::open(store, base_name)?;
    let max_cells = max_cells_for(page_size, ndim);
    let empty_root = super::rtree_types::PageNode::empty();
    let bytes = super::codec::encode_node(&empty_root, ndim, kind, page_size)?;
    let _ = max_cells;
    backing.insert_node(Some(ROOT_NODE_NO), bytes)?;
    Ok(backing)
}

/// Reopens an existing tree's backing tables (the root node is expected to
/// already exist; connect does not create one).
pub fn connect(store: &NitriteStore, base_name: &str) -> SpatialResult<BackingStore> {
    let backing = BackingStore::open(store, base_name)?;
    if backing.read_node(ROOT_NODE_NO)?.is_none() {
        return Err(SpatialError::Corruption(format!(
            "no root node found for tree '{}'",
            base_name
        )));
    }
    Ok(backing)
}

/// Renames a tree's backing tables by copying all three maps under the new
/// base name and dropping the old ones (mirrors `ALTER TABLE ... RENAME`
/// on a vtab, which has no native "rename a map" primitive to call).
pub fn rename(store: &NitriteStore, old_base: &str, new_base: &str) -> SpatialResult<()> {
    let (old_node, old_rowid, old_parent) = BackingStore::table_names(old_base);
    let (new_node, new_rowid, new_parent) = BackingStore::table_names(new_base);
    for (old, new) in [(old_node, new_node), (old_rowid, new_rowid), (old_parent, new_parent)] {
        BackingStore::rename_table(store, &old, &new)?;
    }
    Ok(())
}

/// Drops a tree's backing tables entirely.
pub fn destroy(store: &NitriteStore, base_name: &str) -> SpatialResult<()> {
    BackingStore::drop_tables(store, base_name)
}

//! Component G — deletion: FindLeaf, CondenseTree, orphan reinsertion.
//!
//! Mirrors Guttman's `Delete` with the R*-tree's condense step: removing a
//! cell from an underfull node removes the node itself and queues its
//! remaining siblings for reinsertion rather than merging with a sibling.

use log::debug;

use super::cache::{NodeCache, NodeHandle};
use super::insert::insert_cell;
use super::primitives;
use super::rtree_types::{min_fill, Cell, NodeNo, Rowid, SpatialError, SpatialResult, MAX_DEPTH, ROOT_NODE_NO};

/// Deletes the cell with the given `rowid` from the tree rooted at `root`.
/// Returns `Ok(false)` if the rowid was not present.
pub fn delete_rowid(
    cache: &mut NodeCache,
    root: NodeHandle,
    rowid: Rowid,
    ndim: usize,
    max_cells: usize,
) -> SpatialResult<bool> {
    let Some(leaf_no) = cache.store().read_rowid(rowid)? else {
        return Ok(false);
    };
    verify_parent_chain(cache, leaf_no)?;
    cache.store().delete_rowid(rowid)?;

    let leaf = find_node(cache, root, leaf_no)?;
    let Some(leaf) = leaf else {
        return Err(SpatialError::Corruption(format!(
            "rowid {} maps to missing node {}",
            rowid, leaf_no
        )));
    };

    let idx = cache
        .node(leaf)
        .cells
        .iter()
        .position(|c| c.rowid == rowid)
        .ok_or_else(|| SpatialError::Corruption(format!("rowid {} not present in its leaf", rowid)))?;
    cache.node_mut(leaf).cells.remove(idx);

    condense(cache, leaf, root, ndim, max_cells)?;
    Ok(true)
}

/// `fixLeafParent`: walks the persisted `_parent` map from `start_no` up
/// toward the root, refusing to touch anything if the chain is missing an
/// entry or cycles back on itself before reaching node 1.
fn verify_parent_chain(cache: &NodeCache, start_no: NodeNo) -> SpatialResult<()> {
    let mut visited = vec![start_no];
    let mut current = start_no;
    while current != ROOT_NODE_NO {
        let parent_no = cache.store().read_parent(current)?.ok_or_else(|| {
            SpatialError::Corruption(format!("node {} has no recorded parent", current))
        })?;
        if visited.contains(&parent_no) {
            return Err(SpatialError::Corruption(format!(
                "reference cycle detected: node {} points back to an ancestor already on the path",
                parent_no
            )));
        }
        visited.push(parent_no);
        if visited.len() > MAX_DEPTH as usize + 2 {
            return Err(SpatialError::Corruption("parent chain exceeds maximum tree depth".into()));
        }
        current = parent_no;
    }
    Ok(())
}

/// Descends from `root` to locate the resident node whose own node number
/// is `target_no`, pinning every node on the path (the caller releases the
/// returned handle; ancestors are released as the search backtracks).
fn find_node(cache: &mut NodeCache, root: NodeHandle, target_no: super::rtree_types::NodeNo) -> SpatialResult<Option<NodeHandle>> {
    if cache.node_no(root) == Some(target_no) {
        cache.pin(root);
        return Ok(Some(root));
    }
    let depth = cache.node(root).depth;
    if depth == 0 {
        return Ok(None);
    }
    let children: Vec<super::rtree_types::NodeNo> = cache.node(root).cells.iter().map(|c| c.rowid).collect();
    for child_no in children {
        let child = cache.acquire(child_no, Some(root))?;
        match find_node(cache, child, target_no)? {
            Some(found) => {
                if found != child {
                    cache.release(child)?;
                }
                return Ok(Some(found));
            }
            None => {
                cache.release(child)?;
            }
        }
    }
    Ok(None)
}

/// CondenseTree: walks from `leaf` up to `root`, removing
/// any node left below `min_fill` and queuing its surviving entries for
/// reinsertion at the node's own (former) depth, then collapses the root
/// to its single remaining child if the tree has shrunk by a level.
fn condense(cache: &mut NodeCache, leaf: NodeHandle, root: NodeHandle, ndim: usize, max_cells: usize) -> SpatialResult<()> {
    let mut pending: Vec<(Vec<Cell>, u16)> = Vec::new();
    let mut node = leaf;

    loop {
        let Some(parent) = cache.parent(node) else {
            // Reached the root.
            cache.pin(root);
            cache.release(node)?;
            break;
        };

        let ncell = cache.node(node).ncell();
        let node_depth = cache.node(node).depth;

        if ncell < min_fill(max_cells) && ncell > 0 {
            debug!("condensing underfull node ({} cells) at depth {}", ncell, node_depth);
            let orphaned_cells = cache.node(node).cells.clone();
            pending.push((orphaned_cells, node_depth));
            let node_no = cache.node_no(node);
            if let Some(idx) = node_no.and_then(|no| cache.node(parent).cells.iter().position(|c| c.rowid == no)) {
                cache.node_mut(parent).cells.remove(idx);
            }
            cache.pin(parent);
            cache.discard(node)?;
        } else if ncell == 0 {
            let node_no = cache.node_no(node);
            if let Some(idx) = node_no.and_then(|no| cache.node(parent).cells.iter().position(|c| c.rowid == no)) {
                cache.node_mut(parent).cells.remove(idx);
            }
            cache.pin(parent);
            cache.discard(node)?;
        } else {
            propagate_one(cache, node, parent, ndim)?;
            cache.pin(parent);
            cache.release(node)?;
        }

        node = parent;
    }

    // `node` now equals `root`, pinned once extra above.
    collapse_root_if_needed(cache, root, ndim)?;

    for (cells, depth) in pending {
        for cell in cells {
            cache.pin(root);
            insert_cell(cache, root, cell, ndim, max_cells, depth)?;
        }
    }
    cache.release(root)?;
    Ok(())
}

fn propagate_one(cache: &mut NodeCache, node: NodeHandle, parent: NodeHandle, ndim: usize) -> SpatialResult<()> {
    let node_no = cache.node_no(node);
    let cells = &cache.node(node).cells;
    if cells.is_empty() {
        return Ok(());
    }
    let mut bbox = cells[0];
    for c in &cells[1..] {
        primitives::union_into(&mut bbox, c, ndim);
    }
    if let Some(no) = node_no {
        bbox.rowid = no;
        if let Some(idx) = cache.node(parent).cells.iter().position(|c| c.rowid == no) {
            cache.node_mut(parent).cells[idx] = bbox;
        }
    }
    Ok(())
}

/// If the root has shrunk to a single child, replaces the root's contents
/// with that child's (dropping a tree level).
fn collapse_root_if_needed(cache: &mut NodeCache, root: NodeHandle, ndim: usize) -> SpatialResult<()> {
    let _ = ndim;
    let depth = cache.node(root).depth;
    if depth == 0 || cache.node(root).ncell() != 1 {
        return Ok(());
    }
    let only_child_no = cache.node(root).cells[0].rowid;
    let child = cache.acquire(only_child_no, None)?;
    let child_cells = cache.node(child).cells.clone();
    let child_depth = cache.node(child).depth;
    cache.node_mut(root).cells = child_cells;
    cache.node_mut(root).depth = child_depth;
    cache.discard(child)?;
    Ok(())
}

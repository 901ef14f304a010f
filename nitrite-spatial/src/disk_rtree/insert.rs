//! Component F — insertion: ChooseSubtree, node split, forced reinsert,
//! AdjustTree.
//!
//! Implements the R*-tree insertion algorithm (Beckmann et al. 1990): at the
//! leaf-parent level, subtree choice minimizes overlap enlargement rather
//! than plain area growth; once per height per top-level `insert_cell` call,
//! an overflowing node is reinserted rather than split (`reinsert`), and only
//! a second overflow at the same height triggers an actual `split_node`.

use log::debug;

use super::cache::{NodeCache, NodeHandle};
use super::primitives;
use super::rtree_types::{min_fill, Cell, NodeNo, SpatialError, SpatialResult};

pub struct InsertOutcome {
    /// New root node number, if the root was split and grew a level.
    pub new_root: Option<NodeNo>,
    /// Number of times Reinsert fired during this top-level `insert_cell`
    /// call, counting any reinsertions triggered recursively while
    /// re-homing orphaned cells.
    pub forced_reinserts: usize,
    /// Number of node splits performed during this top-level `insert_cell`
    /// call.
    pub splits: usize,
}

/// Inserts `cell` into the subtree rooted at `root`, honoring `max_cells`
/// per node and `ndim` dimensions. `cell.rowid` is the actual row id for a
/// leaf insert; callers inserting an internal (child-pointer) cell pass the
/// child's node number in that field instead.
pub fn insert_cell(
    cache: &mut NodeCache,
    root: NodeHandle,
    cell: Cell,
    ndim: usize,
    max_cells: usize,
    target_depth: u16,
) -> SpatialResult<InsertOutcome> {
    let mut reinserted_at_height: Vec<bool> = vec![false; (cache.node(root).depth as usize) + 1];
    insert_cell_with_guard(cache, root, cell, ndim, max_cells, target_depth, &mut reinserted_at_height)
}

/// Inner entry point sharing one `reinserted_at_height` guard across an
/// entire top-level insert, including any orphans a forced Reinsert sends
/// back through `ChooseLeaf` at the same height — so an orphan that lands
/// back in an overfull node splits rather than reinserting a second time at
/// a height already reinserted-from during this call (spec: Reinsert "may
/// cascade into further splits but not further reinserts at this height").
fn insert_cell_with_guard(
    cache: &mut NodeCache,
    root: NodeHandle,
    cell: Cell,
    ndim: usize,
    max_cells: usize,
    target_depth: u16,
    reinserted_at_height: &mut Vec<bool>,
) -> SpatialResult<InsertOutcome> {
    cell.validate(ndim)?;
    let leaf = choose_subtree(cache, root, &cell, ndim, target_depth)?;
    insert_into_node(cache, leaf, cell, ndim, max_cells, reinserted_at_height)
}

/// ChooseSubtree: descend from `root` picking, at each
/// level, the child whose enlargement is smallest — using overlap
/// enlargement when the children are leaves, plain area growth otherwise
/// (the R*-tree refinement over Guttman's ChooseLeaf).
fn choose_subtree(
    cache: &mut NodeCache,
    root: NodeHandle,
    cell: &Cell,
    ndim: usize,
    target_depth: u16,
) -> SpatialResult<NodeHandle> {
    let mut current = root;
    loop {
        let depth = cache.node(current).depth;
        if depth == target_depth {
            return Ok(current);
        }

        let children_are_leaves = depth == target_depth + 1;
        let cells: Vec<Cell> = cache.node(current).cells.clone();
        if cells.is_empty() {
            return Ok(current);
        }

        let best_index = if children_are_leaves {
            let mut best = 0usize;
            let mut best_enl = f64::INFINITY;
            let mut best_area = f64::INFINITY;
            for (i, c) in cells.iter().enumerate() {
                let enl = primitives::overlap_enlargement(c, cell, &cells, i, ndim);
                let area = primitives::area(c, ndim);
                if enl < best_enl || (enl == best_enl && area < best_area) {
                    best = i;
                    best_enl = enl;
                    best_area = area;
                }
            }
            best
        } else {
            let mut best = 0usize;
            let mut best_growth = f64::INFINITY;
            let mut best_area = f64::INFINITY;
            for (i, c) in cells.iter().enumerate() {
                let growth = primitives::growth(c, cell, ndim);
                let area = primitives::area(c, ndim);
                if growth < best_growth || (growth == best_growth && area < best_area) {
                    best = i;
                    best_growth = growth;
                    best_area = area;
                }
            }
            best
        };

        let child_no = cells[best_index].rowid;
        let child = cache.acquire(child_no, Some(current))?;
        if current != root {
            cache.release(current)?;
        }
        current = child;
    }
}

/// Inserts `cell` into the (already chosen) node `target`, splitting or
/// forcibly reinserting on overflow and propagating bounding-cell updates
/// up to the root.
fn insert_into_node(
    cache: &mut NodeCache,
    target: NodeHandle,
    cell: Cell,
    ndim: usize,
    max_cells: usize,
    reinserted_at_height: &mut Vec<bool>,
) -> SpatialResult<InsertOutcome> {
    cache.node_mut(target).cells.push(cell);

    let mut node = target;
    let mut splits = 0usize;
    loop {
        let ncell = cache.node(node).ncell();
        if ncell <= max_cells {
            let mut outcome = propagate_bbox(cache, node, ndim)?;
            cache.release(node)?;
            outcome.splits = splits;
            return Ok(outcome);
        }

        let height = node_height(cache, node);
        let already_reinserted = reinserted_at_height.get(height).copied().unwrap_or(false);
        let is_root = cache.parent(node).is_none();

        if !already_reinserted && !is_root {
            if height >= reinserted_at_height.len() {
                reinserted_at_height.resize(height + 1, false);
            }
            reinserted_at_height[height] = true;
            let node_depth = cache.node(node).depth;
            let orphans = reinsert(cache, node, ndim, max_cells)?;
            propagate_bbox(cache, node, ndim)?;
            let root = find_root(cache, node);
            cache.pin(root);
            cache.release(node)?;
            let mut forced_reinserts = 1;
            for orphan in orphans {
                let sub_outcome = insert_cell_with_guard(cache, root, orphan, ndim, max_cells, node_depth, reinserted_at_height)?;
                forced_reinserts += sub_outcome.forced_reinserts;
                splits += sub_outcome.splits;
            }
            cache.release(root)?;
            return Ok(InsertOutcome { new_root: None, forced_reinserts, splits });
        }

        debug!("splitting overfull node at height {}", height);
        let (new_sibling, new_root) = split_node(cache, node, ndim, max_cells)?;
        splits += 1;
        if let Some(root) = new_root {
            cache.release(node)?;
            return Ok(InsertOutcome { new_root: Some(root), forced_reinserts: 0, splits });
        }
        let parent = cache.parent(node).expect("non-root node must have a parent after split");
        cache.pin(parent);
        cache.set_parent(new_sibling, Some(parent));
        // Flush before tagging the sibling's bounding cell: it must carry
        // the sibling's real node number, not the placeholder `bounding_cell`
        // reads for a node with none assigned yet.
        let sibling_no = cache.flush(new_sibling)?;
        let mut sibling_cell = bounding_cell(cache, new_sibling, ndim);
        sibling_cell.rowid = sibling_no;
        cache.node_mut(parent).cells.push(sibling_cell);
        cache.release(new_sibling)?;
        cache.release(node)?;
        node = parent;
    }
}

fn node_height(cache: &NodeCache, mut h: NodeHandle) -> usize {
    let mut height = 0;
    while let Some(p) = cache.parent(h) {
        height += 1;
        h = p;
    }
    height
}

fn find_root(cache: &NodeCache, mut h: NodeHandle) -> NodeHandle {
    while let Some(p) = cache.parent(h) {
        h = p;
    }
    h
}

/// Recomputes and writes back `node`'s bounding cell into its parent after
/// a child changed, walking up to the root.
fn propagate_bbox(cache: &mut NodeCache, node: NodeHandle, ndim: usize) -> SpatialResult<InsertOutcome> {
    let mut current = node;
    loop {
        let Some(parent) = cache.parent(current) else {
            return Ok(InsertOutcome { new_root: None, forced_reinserts: 0, splits: 0 });
        };
        let node_no = cache.node_no(current);
        let bbox = bounding_cell(cache, current, ndim);
        if let Some(no) = node_no {
            if let Some(idx) = cache.node(parent).cells.iter().position(|c| c.rowid == no) {
                cache.node_mut(parent).cells[idx] = bbox;
            }
        }
        current = parent;
    }
}

/// The union of all cells in `node`, tagged with `node`'s own node number so
/// it can be written back as a child cell in the parent.
fn bounding_cell(cache: &NodeCache, node: NodeHandle, ndim: usize) -> Cell {
    let cells = &cache.node(node).cells;
    let mut out = cells[0];
    for c in &cells[1..] {
        primitives::union_into(&mut out, c, ndim);
    }
    out.rowid = cache.node_no(node).unwrap_or(0);
    out
}

/// R*-tree forced reinsert: removes the farthest-from-center `m` cells
/// (`RTREE_REINSERT = m = M/3`), returning them to be reinserted by the
/// caller. The node keeps the rest.
fn reinsert(cache: &mut NodeCache, node: NodeHandle, ndim: usize, max_cells: usize) -> SpatialResult<Vec<Cell>> {
    let bbox = bounding_cell(cache, node, ndim);
    let mut cells = cache.node(node).cells.clone();
    cells.sort_by(|a, b| {
        let da = primitives::center_distance_sq(a, &bbox, ndim);
        let db = primitives::center_distance_sq(b, &bbox, ndim);
        db.partial_cmp(&da).unwrap_or(std::cmp::Ordering::Equal)
    });
    let num_remove = min_fill(max_cells).min(cells.len());
    let removed: Vec<Cell> = cells.drain(..num_remove).collect();
    cache.node_mut(node).cells = cells;
    Ok(removed)
}

/// R*-tree margin-sum split: for each axis, sorts the node's
/// cells by lower then upper bound, sums the margins of the
/// `MIN_FILL..=len-MIN_FILL` candidate distributions, picks the axis with
/// the smallest margin sum, then within that axis the distribution with
/// least overlap (tie-broken by least combined area).
fn split_node(
    cache: &mut NodeCache,
    node: NodeHandle,
    ndim: usize,
    max_cells: usize,
) -> SpatialResult<(NodeHandle, Option<NodeNo>)> {
    let cells = cache.node(node).cells.clone();
    let depth = cache.node(node).depth;
    let m = min_fill(max_cells);

    let (best_axis, _best_margin) = choose_split_axis(&cells, ndim, m);
    let (group_a, group_b) = choose_split_distribution(&cells, best_axis, ndim, m);

    let parent = cache.parent(node);
    let is_root = parent.is_none();

    cache.node_mut(node).cells = group_a;
    let sibling = cache.new_node(parent);
    cache.node_mut(sibling).cells = group_b;
    cache.node_mut(sibling).depth = depth;

    if !is_root {
        return Ok((sibling, None));
    }

    // Splitting the root: the overflowing root's content is relocated to a
    // freshly assigned node number so node number 1 can be reused for the
    // new root one level up, containing both halves as children (mirrors
    // how a vtab root split relocates the old root page rather than
    // letting a child alias the root's own page number).
    let old_root_cell = bounding_cell(cache, node, ndim);
    cache.clear_node_no(node);
    let old_root_no = cache.flush(node)?;
    let mut old_cell = old_root_cell;
    old_cell.rowid = old_root_no;
    // The relocated node's own children still have stale `_parent` rows
    // pointing at its old number (1); this was not its first split, so
    // those rows predate this relocation and must be retargeted.
    if depth > 0 {
        for cell in &cache.node(node).cells {
            cache.store().insert_parent(cell.rowid, old_root_no)?;
        }
    }

    let sibling_no = cache.flush(sibling)?;
    let mut sibling_cell = bounding_cell(cache, sibling, ndim);
    sibling_cell.rowid = sibling_no;

    let new_root = cache.new_node(None);
    cache.node_mut(new_root).depth = depth + 1;
    cache.node_mut(new_root).cells.push(old_cell);
    cache.node_mut(new_root).cells.push(sibling_cell);
    cache.set_parent(node, Some(new_root));
    cache.set_parent(sibling, Some(new_root));
    cache.force_node_no(new_root, super::rtree_types::ROOT_NODE_NO);
    // `node` and `sibling` were flushed above, before the new root existed to
    // record as their parent; back-fill their `_parent` rows now that the
    // new root's number (always ROOT_NODE_NO) is known.
    cache.store().insert_parent(old_root_no, super::rtree_types::ROOT_NODE_NO)?;
    cache.store().insert_parent(sibling_no, super::rtree_types::ROOT_NODE_NO)?;
    let new_root_no = cache.flush(new_root)?;
    cache.release(sibling)?;
    cache.release(new_root)?;
    Ok((sibling, Some(new_root_no)))
}

fn choose_split_axis(cells: &[Cell], ndim: usize, min_fill: usize) -> (usize, f64) {
    let mut best_axis = 0;
    let mut best_margin_sum = f64::INFINITY;
    for axis in 0..ndim {
        let mut by_lo = cells.to_vec();
        by_lo.sort_by(|a, b| a.lo(axis).partial_cmp(&b.lo(axis)).unwrap());
        let mut by_hi = cells.to_vec();
        by_hi.sort_by(|a, b| a.hi(axis).partial_cmp(&b.hi(axis)).unwrap());

        let mut margin_sum = 0.0;
        for ordering in [&by_lo, &by_hi] {
            for split in min_fill..=(cells.len() - min_fill) {
                let (left, right) = ordering.split_at(split);
                margin_sum += margin_of(left, ndim) + margin_of(right, ndim);
            }
        }
        if margin_sum < best_margin_sum {
            best_margin_sum = margin_sum;
            best_axis = axis;
        }
    }
    (best_axis, best_margin_sum)
}

fn choose_split_distribution(cells: &[Cell], axis: usize, ndim: usize, min_fill: usize) -> (Vec<Cell>, Vec<Cell>) {
    let mut by_lo = cells.to_vec();
    by_lo.sort_by(|a, b| a.lo(axis).partial_cmp(&b.lo(axis)).unwrap());

    let mut best_split = min_fill;
    let mut best_overlap = f64::INFINITY;
    let mut best_area = f64::INFINITY;
    for split in min_fill..=(cells.len() - min_fill) {
        let (left, right) = by_lo.split_at(split);
        let left_bbox = bbox_of(left, ndim);
        let right_bbox = bbox_of(right, ndim);
        let overlap = primitives::overlap_volume(&left_bbox, &right_bbox, ndim);
        let area = primitives::area(&left_bbox, ndim) + primitives::area(&right_bbox, ndim);
        if overlap < best_overlap || (overlap == best_overlap && area < best_area) {
            best_overlap = overlap;
            best_area = area;
            best_split = split;
        }
    }
    let (left, right) = by_lo.split_at(best_split);
    (left.to_vec(), right.to_vec())
}

fn margin_of(cells: &[Cell], ndim: usize) -> f64 {
    let bbox = bbox_of(cells, ndim);
    primitives::margin(&bbox, ndim)
}

fn bbox_of(cells: &[Cell], ndim: usize) -> Cell {
    let mut out = cells[0];
    for c in &cells[1..] {
        primitives::union_into(&mut out, c, ndim);
    }
    out
}

//! Component E — query planning and cursor traversal.
//!
//! Two strategies: Strategy 1 looks a single rowid up
//! directly through the `_rowid` table; Strategy 2 walks the tree from the
//! root, pruning subtrees whose bounding cell fails any constraint.

use super::cache::{NodeCache, NodeHandle};
use super::predicate::MatchPredicate;
use super::primitives;
use super::rtree_types::{Cell, Rowid, SpatialError, SpatialResult};

/// A coordinate comparison operator on one dimension's `lo` or `hi` value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CompareOp {
    Le,
    Lt,
    Ge,
    Gt,
    Eq,
}

/// One planning-time constraint, as handed to `best_index`/`filter`.
#[derive(Clone)]
pub enum Constraint {
    /// Compares dimension `dim`'s `hi` (for Le/Lt) or `lo` (for Ge/Gt) value,
    /// or both bounds at once for `Eq`, against `value`.
    Compare { dim: usize, op: CompareOp, value: f64 },
    /// A custom geometry test evaluated against every candidate cell.
    Match(MatchPredicate),
    /// An `=` constraint on the hidden rowid column. `best_index` always
    /// resolves this to strategy 1 and strips it out of whatever usable
    /// constraint list strategy 2 would otherwise see, so it never actually
    /// reaches a cursor descent.
    RowidEq(Rowid),
}

impl Constraint {
    /// `true` if `cell` cannot possibly satisfy this constraint and the
    /// subtree it roots can be pruned.
    fn prunes(&self, cell: &Cell, ndim: usize) -> SpatialResult<bool> {
        match self {
            Constraint::Compare { dim, op, value } => {
                if *dim >= ndim {
                    return Err(SpatialError::Constraint(format!("dimension {} out of range", dim)));
                }
                let keep = match op {
                    CompareOp::Le => cell.lo(*dim) <= *value,
                    CompareOp::Lt => cell.lo(*dim) < *value,
                    CompareOp::Ge => cell.hi(*dim) >= *value,
                    CompareOp::Gt => cell.hi(*dim) > *value,
                    CompareOp::Eq => cell.lo(*dim) <= *value && cell.hi(*dim) >= *value,
                };
                Ok(!keep)
            }
            Constraint::Match(pred) => {
                if !pred.is_valid() {
                    return Err(SpatialError::Constraint("MATCH blob has wrong magic".into()));
                }
                pred.callback.prune(cell, ndim)
            }
            // A child node's bounding cell carries no rowid identity to
            // compare against; `best_index` consumes this constraint before
            // a descend ever starts, so there is nothing correct to prune on
            // here.
            Constraint::RowidEq(_) => Ok(false),
        }
    }
}

/// The chosen access strategy for a `filter` call, analogous to
/// `sqlite3_index_info.idxNum`/`idxStr`/`estimatedCost` in the vtab model.
pub enum IndexPlan {
    /// Strategy 1: a single rowid lookup via the `_rowid` table. `idxNum` is
    /// implicitly 1; there is no `idxStr` because no per-constraint encoding
    /// is needed for a direct lookup.
    DirectRowid { rowid: Rowid, cost: f64 },
    /// Strategy 2: a constrained descent from the root. `idxNum` is
    /// implicitly 2; `idx_str` is the 2-byte-per-constraint encoding a host
    /// would persist alongside the query plan and hand back unchanged at
    /// `filter` time.
    Descend { constraints: Vec<Constraint>, idx_str: Vec<u8>, cost: f64 },
}

impl IndexPlan {
    pub fn cost(&self) -> f64 {
        match self {
            IndexPlan::DirectRowid { cost, .. } => *cost,
            IndexPlan::Descend { cost, .. } => *cost,
        }
    }
}

/// Strategy 1's fixed cost estimate: a `_rowid` lookup is effectively O(1),
/// far cheaper than any descent.
const DIRECT_ROWID_COST: f64 = 10.0;

/// Fixed operator byte codes the idxStr encoding uses for strategy 2's
/// `(opByte, colByte)` pairs: `EQ, LE, LT, GE, GT, MATCH` map to `0x41..0x46`
/// in that order.
fn op_byte(op: CompareOp) -> u8 {
    match op {
        CompareOp::Eq => 0x41,
        CompareOp::Le => 0x42,
        CompareOp::Lt => 0x43,
        CompareOp::Ge => 0x44,
        CompareOp::Gt => 0x45,
    }
}

const MATCH_OP_BYTE: u8 = 0x46;

/// A MATCH constraint binds to the table's hidden geometry column rather
/// than a single coordinate dimension, so it always encodes with the fixed
/// column byte for column index 1 (`'a'`).
const MATCH_COL_BYTE: u8 = b'a';

/// Encodes `constraints` as the strategy-2 idxStr: one `(opByte, colByte)`
/// pair per usable constraint, `colByte = 'a' + (columnIndex - 1)`.
fn encode_idx_str(constraints: &[Constraint]) -> Vec<u8> {
    let mut out = Vec::with_capacity(constraints.len() * 2);
    for c in constraints {
        match c {
            Constraint::Compare { dim, op, .. } => {
                out.push(op_byte(*op));
                out.push(b'a' + *dim as u8);
            }
            Constraint::Match(_) => {
                out.push(MATCH_OP_BYTE);
                out.push(MATCH_COL_BYTE);
            }
            Constraint::RowidEq(_) => unreachable!("best_index strips RowidEq before building idx_str"),
        }
    }
    out
}

/// Picks a plan and its cost hint from the constraints a query compiler
/// offers, mirroring a vtab module's `xBestIndex`. A single `rowid = ?`
/// constraint always wins strategy 1 (cost 10); otherwise strategy 2's cost
/// falls off as `2,000,000 / (constraintCount + 1)`, so a descent backed by
/// more usable constraints is estimated cheaper than one backed by fewer.
pub fn best_index(constraints: &[Constraint]) -> IndexPlan {
    if let Some(r) = constraints.iter().find_map(|c| match c {
        Constraint::RowidEq(r) => Some(*r),
        _ => None,
    }) {
        return IndexPlan::DirectRowid { rowid: r, cost: DIRECT_ROWID_COST };
    }
    let usable: Vec<Constraint> = constraints.iter().filter(|c| !matches!(c, Constraint::RowidEq(_))).cloned().collect();
    let idx_str = encode_idx_str(&usable);
    let cost = 2_000_000.0 / (usable.len() as f64 + 1.0);
    IndexPlan::Descend { constraints: usable, idx_str, cost }
}

struct StackFrame {
    handle: NodeHandle,
    next_child: usize,
}

/// A live query cursor. Holds cache handles for every node on the current
/// descent path, released as the cursor backtracks past them or is closed.
pub struct Cursor {
    ndim: usize,
    constraints: Vec<Constraint>,
    stack: Vec<StackFrame>,
    current: Option<Cell>,
    eof: bool,
}

impl Cursor {
    pub fn new_direct(cache: &mut NodeCache, ndim: usize, root: NodeNoAlias, rowid: Rowid) -> SpatialResult<Self> {
        let node_no = match cache.store().read_rowid(rowid)? {
            Some(no) => no,
            None => {
                return Ok(Cursor { ndim, constraints: Vec::new(), stack: Vec::new(), current: None, eof: true });
            }
        };
        let _ = root;
        let handle = cache.acquire(node_no, None)?;
        let cell = cache
            .node(handle)
            .cells
            .iter()
            .find(|c| c.rowid == rowid)
            .copied();
        cache.release(handle)?;
        match cell {
            Some(c) => Ok(Cursor { ndim, constraints: Vec::new(), stack: Vec::new(), current: Some(c), eof: false }),
            None => Ok(Cursor { ndim, constraints: Vec::new(), stack: Vec::new(), current: None, eof: true }),
        }
    }

    pub fn new_descend(
        cache: &mut NodeCache,
        ndim: usize,
        root_no: NodeNoAlias,
        constraints: Vec<Constraint>,
    ) -> SpatialResult<Self> {
        let root = cache.acquire(root_no, None)?;
        let mut cursor = Cursor {
            ndim,
            constraints,
            stack: vec![StackFrame { handle: root, next_child: 0 }],
            current: None,
            eof: false,
        };
        cursor.advance(cache)?;
        Ok(cursor)
    }

    pub fn eof(&self) -> bool {
        self.eof
    }

    pub fn current(&self) -> Option<&Cell> {
        self.current.as_ref()
    }

    fn is_leaf(node_depth: u16) -> bool {
        node_depth == 0
    }

    /// Finds the next matching leaf cell by depth-first descent,
    /// backtracking and releasing handles as branches are exhausted.
    pub fn advance(&mut self, cache: &mut NodeCache) -> SpatialResult<()> {
        loop {
            let Some(frame) = self.stack.last_mut() else {
                self.current = None;
                self.eof = true;
                return Ok(());
            };
            let depth = cache.node(frame.handle).depth;
            let ncell = cache.node(frame.handle).ncell();

            if frame.next_child >= ncell {
                let handle = frame.handle;
                self.stack.pop();
                cache.release(handle)?;
                continue;
            }

            let cell = cache.node(frame.handle).cells[frame.next_child];
            frame.next_child += 1;

            let mut pruned = false;
            for c in &self.constraints {
                if c.prunes(&cell, self.ndim)? {
                    pruned = true;
                    break;
                }
            }
            if pruned {
                continue;
            }

            if Self::is_leaf(depth) {
                self.current = Some(cell);
                return Ok(());
            }

            let parent = self.stack.last().map(|f| f.handle);
            let child = cache.acquire(cell.rowid, parent)?;
            self.stack.push(StackFrame { handle: child, next_child: 0 });
        }
    }

    /// Releases every handle still held by this cursor without flushing
    /// further work onto them (a cursor never mutates nodes).
    pub fn close(mut self, cache: &mut NodeCache) -> SpatialResult<()> {
        while let Some(frame) = self.stack.pop() {
            cache.release(frame.handle)?;
        }
        Ok(())
    }
}

/// Alias kept distinct from `Rowid` purely for readability at call sites
/// that pass a root node number rather than a row identifier.
pub type NodeNoAlias = super::rtree_types::NodeNo;

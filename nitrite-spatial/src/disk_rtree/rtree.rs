//! Top-level `RTree`: wires the cache, backing store, query planner, and
//! insert/delete algorithms into the single type the rest of the crate
//! drives. An `Arc<parking_lot::RwLock<...>>` inner keeps the handle cheap
//! to clone and `Send + Sync`, even though the host actually serializes all
//! calls onto it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use nitrite::common::Value;
use nitrite::store::NitriteStore;
use parking_lot::RwLock;

use super::cache::NodeCache;
use super::delete;
use super::insert;
use super::lifecycle;
use super::predicate::MatchPredicate;
use super::query::{self, Constraint, Cursor, IndexPlan};
use super::rtree_types::{Cell, CoordKind, Rowid, SpatialError, SpatialResult, ROOT_NODE_NO};

/// Cumulative counters surfaced for diagnostics (`PRAGMA rtree_i32` in
/// SQLite's module has no direct analogue here; this is this crate's own
/// equivalent observability surface.
#[derive(Debug, Default, Clone, Copy)]
pub struct RTreeStats {
    pub inserts: u64,
    pub deletes: u64,
    pub splits: u64,
    pub forced_reinserts: u64,
    pub queries: u64,
}

struct Inner {
    cache: NodeCache,
    ndim: usize,
    max_cells: usize,
    stats: RTreeStats,
    base_name: String,
}

/// A disk-backed R*-tree spatial index over `ndim` dimensions.
pub struct RTree {
    inner: Arc<RwLock<Inner>>,
    n_busy: AtomicUsize,
    store: NitriteStore,
}

/// Per-tree configuration handed to `RTreeVtab::create`/`connect`, the Rust
/// equivalent of the column-count/type declaration a host parses out of a
/// `CREATE VIRTUAL TABLE ... USING rtree(...)` statement.
#[derive(Clone, Copy, Debug)]
pub struct RTreeConfig {
    pub ndim: usize,
    pub kind: CoordKind,
    pub page_size: usize,
}

/// Mirrors a vtab module's `xUpdate` argv: `old_rowid` is `None` for a pure
/// insert; `new_rowid`/`coords` are `None` for a pure delete; both present
/// (with `coords`) for an insert-or-replace.
pub struct UpdateArgs {
    pub old_rowid: Option<Rowid>,
    pub new_rowid: Option<Rowid>,
    pub coords: Option<Vec<f64>>,
}

/// A cursor exposed through `RTreeVtab`. The lower-level `query::Cursor`
/// holds live node handles across a single critical section inside
/// `RTree::query`; `RTreeVtab`'s open/filter/next are separate calls with no
/// shared borrow of the cache between them, so `VtabCursor` instead
/// materializes its matching cells once, at `filter()` time, and `next`/
/// `eof`/`column`/`rowid` just walk that materialized vector.
pub struct VtabCursor {
    rows: Vec<Cell>,
    pos: usize,
}

impl VtabCursor {
    fn empty() -> Self {
        VtabCursor { rows: Vec::new(), pos: 0 }
    }
}

/// The virtual-table surface a host driver calls against: lifecycle
/// (create/connect/rename/destroy), planning (`best_index`), and cursor
/// traversal (open/filter/next/eof/column/rowid), plus `update` for
/// insert/delete/replace.
pub trait RTreeVtab {
    fn create(store: &NitriteStore, name: &str, config: RTreeConfig) -> SpatialResult<Self>
    where
        Self: Sized;
    fn connect(store: &NitriteStore, name: &str, config: RTreeConfig) -> SpatialResult<Self>
    where
        Self: Sized;
    fn best_index(&self, constraints: &[Constraint]) -> IndexPlan;
    fn open(&self) -> VtabCursor;
    fn filter(&self, cursor: &mut VtabCursor, plan: &IndexPlan, args: &[Value]) -> SpatialResult<()>;
    fn next(&self, cursor: &mut VtabCursor) -> SpatialResult<()>;
    fn eof(&self, cursor: &VtabCursor) -> bool;
    fn column(&self, cursor: &VtabCursor, i: usize) -> SpatialResult<Value>;
    fn rowid(&self, cursor: &VtabCursor) -> SpatialResult<i64>;
    fn update(&self, argv: &UpdateArgs) -> SpatialResult<Option<i64>>;
    fn rename(&self, new_name: &str) -> SpatialResult<()>;
    fn destroy(self) -> SpatialResult<()>;
}

impl RTree {
    /// Creates a brand-new, empty tree with its own backing tables.
    pub fn create(store: &NitriteStore, base_name: &str, ndim: usize, kind: CoordKind, page_size: usize) -> SpatialResult<Self> {
        lifecycle::validate_ndim(ndim)?;
        let backing = lifecycle::create(store, base_name, ndim, kind, page_size)?;
        let max_cells = lifecycle::max_cells_for(page_size, ndim);
        let cache = NodeCache::new(backing, ndim, kind, page_size, max_cells);
        Ok(RTree {
            inner: Arc::new(RwLock::new(Inner {
                cache,
                ndim,
                max_cells,
                stats: RTreeStats::default(),
                base_name: base_name.to_string(),
            })),
            n_busy: AtomicUsize::new(0),
            store: store.clone(),
        })
    }

    /// Opens an existing tree.
    pub fn connect(store: &NitriteStore, base_name: &str, ndim: usize, kind: CoordKind, page_size: usize) -> SpatialResult<Self> {
        lifecycle::validate_ndim(ndim)?;
        let backing = lifecycle::connect(store, base_name)?;
        let max_cells = lifecycle::max_cells_for(page_size, ndim);
        let cache = NodeCache::new(backing, ndim, kind, page_size, max_cells);
        Ok(RTree {
            inner: Arc::new(RwLock::new(Inner {
                cache,
                ndim,
                max_cells,
                stats: RTreeStats::default(),
                base_name: base_name.to_string(),
            })),
            n_busy: AtomicUsize::new(0),
            store: store.clone(),
        })
    }

    pub fn rename(store: &NitriteStore, old_base: &str, new_base: &str) -> SpatialResult<()> {
        lifecycle::rename(store, old_base, new_base)
    }

    pub fn destroy(store: &NitriteStore, base_name: &str) -> SpatialResult<()> {
        lifecycle::destroy(store, base_name)
    }

    pub fn stats(&self) -> RTreeStats {
        self.inner.read().stats
    }

    /// Marks the start of a host call; used only to detect reentrant use
    /// from within a single-threaded host, matching a vtab module's `nBusy`
    /// guard.
    fn enter(&self) -> SpatialResult<()> {
        if self.n_busy.fetch_add(1, Ordering::SeqCst) > 0 {
            self.n_busy.fetch_sub(1, Ordering::SeqCst);
            return Err(SpatialError::Constraint("recursive use of the same r-tree cursor set".into()));
        }
        Ok(())
    }

    fn leave(&self) {
        self.n_busy.fetch_sub(1, Ordering::SeqCst);
    }

    /// Inserts (or replaces, if `rowid` is already present) one cell.
    pub fn insert(&self, rowid: Rowid, coords: &[f64]) -> SpatialResult<()> {
        self.enter()?;
        let result = (|| {
            let mut guard = self.inner.write();
            let ndim = guard.ndim;
            let max_cells = guard.max_cells;

            let cell = Cell::new(rowid, coords);
            cell.validate(ndim)?;

            if guard.cache.store().read_rowid(rowid)?.is_some() {
                delete::delete_rowid(&mut guard.cache, Self::root_handle(&mut guard.cache)?, rowid, ndim, max_cells)?;
            }

            let root = Self::root_handle(&mut guard.cache)?;
            let outcome = insert::insert_cell(&mut guard.cache, root, cell, ndim, max_cells, 0)?;
            guard.stats.inserts += 1;
            guard.stats.forced_reinserts += outcome.forced_reinserts as u64;
            guard.stats.splits += outcome.splits as u64;
            Ok(())
        })();
        self.leave();
        result
    }

    /// Removes the cell with the given rowid. Returns `false` if absent.
    pub fn remove(&self, rowid: Rowid) -> SpatialResult<bool> {
        self.enter()?;
        let result = (|| {
            let mut guard = self.inner.write();
            let ndim = guard.ndim;
            let max_cells = guard.max_cells;
            let root = Self::root_handle(&mut guard.cache)?;
            let removed = delete::delete_rowid(&mut guard.cache, root, rowid, ndim, max_cells)?;
            if removed {
                guard.stats.deletes += 1;
            }
            Ok(removed)
        })();
        self.leave();
        result
    }

    /// Strategy 1: direct rowid lookup.
    pub fn find_by_rowid(&self, rowid: Rowid) -> SpatialResult<Option<Cell>> {
        self.enter()?;
        let result = (|| {
            let mut guard = self.inner.write();
            let ndim = guard.ndim;
            let root_no = ROOT_NODE_NO;
            let mut cursor = Cursor::new_direct(&mut guard.cache, ndim, root_no, rowid)?;
            let found = cursor.current().copied();
            guard.stats.queries += 1;
            Ok(found)
        })();
        self.leave();
        result
    }

    /// Strategy 2: constrained descent from the root, collecting every
    /// matching leaf cell. A full results vector (rather than a lazy
    /// cursor) keeps the public surface simple; nothing in this crate
    /// needs a long-lived cursor across host yields.
    pub fn query(&self, constraints: Vec<Constraint>) -> SpatialResult<Vec<Cell>> {
        self.enter()?;
        let result = (|| {
            let mut guard = self.inner.write();
            let ndim = guard.ndim;
            let plan = query::best_index(&constraints);
            let mut out = Vec::new();
            match plan {
                IndexPlan::DirectRowid { rowid, .. } => {
                    let mut cursor = Cursor::new_direct(&mut guard.cache, ndim, ROOT_NODE_NO, rowid)?;
                    if let Some(c) = cursor.current() {
                        out.push(*c);
                    }
                }
                IndexPlan::Descend { constraints, .. } => {
                    let mut cursor = Cursor::new_descend(&mut guard.cache, ndim, ROOT_NODE_NO, constraints)?;
                    while !cursor.eof() {
                        if let Some(c) = cursor.current() {
                            out.push(*c);
                        }
                        cursor.advance(&mut guard.cache)?;
                    }
                    cursor.close(&mut guard.cache)?;
                }
            }
            guard.stats.queries += 1;
            Ok(out)
        })();
        self.leave();
        result
    }

    /// Convenience wrapper running a MATCH predicate against every leaf
    /// cell reachable from the root.
    pub fn query_match(&self, predicate: MatchPredicate) -> SpatialResult<Vec<Cell>> {
        self.query(vec![Constraint::Match(predicate)])
    }

    fn root_handle(cache: &mut NodeCache) -> SpatialResult<super::cache::NodeHandle> {
        cache.acquire(ROOT_NODE_NO, None)
    }
}

impl RTreeVtab for RTree {
    fn create(store: &NitriteStore, name: &str, config: RTreeConfig) -> SpatialResult<Self> {
        RTree::create(store, name, config.ndim, config.kind, config.page_size)
    }

    fn connect(store: &NitriteStore, name: &str, config: RTreeConfig) -> SpatialResult<Self> {
        RTree::connect(store, name, config.ndim, config.kind, config.page_size)
    }

    fn best_index(&self, constraints: &[Constraint]) -> IndexPlan {
        query::best_index(constraints)
    }

    fn open(&self) -> VtabCursor {
        VtabCursor::empty()
    }

    /// Runs `plan` to completion and stores every matching cell in
    /// `cursor`. `args` carries the host's bound values for any MATCH
    /// constraints but isn't otherwise consulted here: `Constraint::Match`
    /// already carries its own deserialized predicate by the time a plan
    /// reaches `filter`.
    fn filter(&self, cursor: &mut VtabCursor, plan: &IndexPlan, args: &[Value]) -> SpatialResult<()> {
        let _ = args;
        self.enter()?;
        let result = (|| {
            let mut guard = self.inner.write();
            let ndim = guard.ndim;
            let mut rows = Vec::new();
            match plan {
                IndexPlan::DirectRowid { rowid, .. } => {
                    let mut c = Cursor::new_direct(&mut guard.cache, ndim, ROOT_NODE_NO, *rowid)?;
                    if let Some(cell) = c.current() {
                        rows.push(*cell);
                    }
                }
                IndexPlan::Descend { constraints, .. } => {
                    let mut c = Cursor::new_descend(&mut guard.cache, ndim, ROOT_NODE_NO, constraints.clone())?;
                    while !c.eof() {
                        if let Some(cell) = c.current() {
                            rows.push(*cell);
                        }
                        c.advance(&mut guard.cache)?;
                    }
                    c.close(&mut guard.cache)?;
                }
            }
            guard.stats.queries += 1;
            Ok(rows)
        })();
        self.leave();
        cursor.rows = result?;
        cursor.pos = 0;
        Ok(())
    }

    fn next(&self, cursor: &mut VtabCursor) -> SpatialResult<()> {
        cursor.pos += 1;
        Ok(())
    }

    fn eof(&self, cursor: &VtabCursor) -> bool {
        cursor.pos >= cursor.rows.len()
    }

    fn column(&self, cursor: &VtabCursor, i: usize) -> SpatialResult<Value> {
        let ndim = self.inner.read().ndim;
        let cell = cursor.rows.get(cursor.pos).ok_or_else(|| {
            SpatialError::Constraint("column() called on a cursor past eof".into())
        })?;
        if i >= 2 * ndim {
            return Err(SpatialError::Constraint(format!("column index {} out of range", i)));
        }
        Ok(Value::F64(cell.coords[i]))
    }

    fn rowid(&self, cursor: &VtabCursor) -> SpatialResult<i64> {
        cursor
            .rows
            .get(cursor.pos)
            .map(|c| c.rowid)
            .ok_or_else(|| SpatialError::Constraint("rowid() called on a cursor past eof".into()))
    }

    /// `argv` mirrors a vtab module's `xUpdate`: no new rowid means a
    /// delete; no old rowid means a plain insert; both present means a
    /// replace (delete-then-insert when the rowid itself changed, a single
    /// validate-then-replace when it didn't — `RTree::insert` already
    /// handles that case without an extra round trip).
    fn update(&self, argv: &UpdateArgs) -> SpatialResult<Option<i64>> {
        match (argv.old_rowid, argv.new_rowid, &argv.coords) {
            (Some(old), None, _) => {
                self.remove(old)?;
                Ok(None)
            }
            (None, Some(new), Some(coords)) => {
                self.insert(new, coords)?;
                Ok(Some(new))
            }
            (Some(old), Some(new), Some(coords)) => {
                if old != new {
                    self.remove(old)?;
                }
                self.insert(new, coords)?;
                Ok(Some(new))
            }
            _ => Err(SpatialError::Constraint(
                "update requires coordinates whenever a new rowid is given".into(),
            )),
        }
    }

    fn rename(&self, new_name: &str) -> SpatialResult<()> {
        let mut guard = self.inner.write();
        lifecycle::rename(&self.store, &guard.base_name, new_name)?;
        guard.base_name = new_name.to_string();
        Ok(())
    }

    fn destroy(self) -> SpatialResult<()> {
        let base_name = self.inner.read().base_name.clone();
        lifecycle::destroy(&self.store, &base_name)
    }
}

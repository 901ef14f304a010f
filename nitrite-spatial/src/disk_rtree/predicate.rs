//! Component I — MATCH predicate registry.
//!
//! A `MATCH` constraint carries a custom geometry test rather than a simple
//! coordinate comparison. The callback and its context travel together as
//! one opaque blob (mirroring the vtab convention of passing a tagged
//! pointer through `sqlite3_rtree_query_info`), tagged with a magic number
//! so a cursor can detect an argument that isn't a MATCH blob at all.
//!
//! Rust has no raw function pointers to smuggle through a blob, so the
//! callback itself is registered in a process-wide table and the blob
//! carries its integer handle instead of a pointer.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use super::codec::{read_f64, read_i32, read_u32, read_u64, write_f64, write_i32, write_u32, write_u64};
use super::rtree_types::{Cell, SpatialError, SpatialResult};

/// Magic tag identifying a well-formed MATCH blob.
pub const MATCH_MAGIC: u32 = 0x891245AB;

/// `u32 magic, u64 callback_id, u64 context, i32 n_param, n_param * f64`.
const HEADER_LEN: usize = 4 + 8 + 8 + 4;

/// A user-supplied geometry test, evaluated once per candidate cell at each
/// level of the tree (internal cells are tested against their bounding
/// box; leaf cells against the indexed geometry itself).
pub trait GeomCallback: Send + Sync {
    /// Returns `true` if `cell` can be pruned (rejected) outright.
    fn prune(&self, cell: &Cell, ndim: usize) -> SpatialResult<bool>;
}

fn registry() -> &'static Mutex<HashMap<u64, Arc<dyn GeomCallback>>> {
    static REGISTRY: OnceLock<Mutex<HashMap<u64, Arc<dyn GeomCallback>>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

fn next_callback_id() -> u64 {
    static NEXT_ID: AtomicU64 = AtomicU64::new(1);
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Registers `callback` and returns the handle a MATCH blob can carry in
/// place of a raw function pointer.
pub fn register_callback(callback: Arc<dyn GeomCallback>) -> u64 {
    let id = next_callback_id();
    registry().lock().unwrap().insert(id, callback);
    id
}

/// Looks up a previously registered callback by handle.
pub fn lookup_callback(id: u64) -> Option<Arc<dyn GeomCallback>> {
    registry().lock().unwrap().get(&id).cloned()
}

/// Drops a callback from the registry. A MATCH blob referencing a
/// deregistered handle decodes as an unknown-handle error, same as one that
/// was never registered.
pub fn deregister_callback(id: u64) {
    registry().lock().unwrap().remove(&id);
}

/// A parsed MATCH argument: the callback plus the raw wide-coordinate
/// arguments it was constructed from (kept around for cursors that need to
/// report them back, e.g. for diagnostics).
#[derive(Clone)]
pub struct MatchPredicate {
    pub magic: u32,
    pub callback_id: u64,
    pub context: u64,
    pub callback: Arc<dyn GeomCallback>,
    pub args: Vec<f64>,
}

impl MatchPredicate {
    /// Builds a predicate and registers its callback, ready for `encode`.
    pub fn new(callback: Arc<dyn GeomCallback>, args: Vec<f64>) -> Self {
        let callback_id = register_callback(callback.clone());
        MatchPredicate { magic: MATCH_MAGIC, callback_id, context: 0, callback, args }
    }

    pub fn is_valid(&self) -> bool {
        self.magic == MATCH_MAGIC
    }

    /// Serializes this predicate to the wire layout a `MATCH` constraint
    /// argument carries: `u32 magic, u64 callback_id, u64 context, i32
    /// n_param, n_param * f64`.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = vec![0u8; HEADER_LEN + self.args.len() * 8];
        write_u32(&mut buf, 0, self.magic);
        write_u64(&mut buf, 4, self.callback_id);
        write_u64(&mut buf, 12, self.context);
        write_i32(&mut buf, 20, self.args.len() as i32);
        for (i, v) in self.args.iter().enumerate() {
            write_f64(&mut buf, HEADER_LEN + i * 8, *v);
        }
        buf
    }

    /// Parses a MATCH blob, rejecting anything that isn't one: wrong magic,
    /// a truncated or overlong buffer, a negative argument count, or a
    /// callback handle nothing has registered.
    pub fn decode(buf: &[u8]) -> SpatialResult<Self> {
        if buf.len() < HEADER_LEN {
            return Err(SpatialError::Constraint("MATCH blob shorter than its header".into()));
        }
        let magic = read_u32(buf, 0);
        if magic != MATCH_MAGIC {
            return Err(SpatialError::Constraint(format!("MATCH blob has wrong magic {:#x}", magic)));
        }
        let callback_id = read_u64(buf, 4);
        let context = read_u64(buf, 12);
        let n_param = read_i32(buf, 20);
        if n_param < 0 {
            return Err(SpatialError::Constraint("MATCH blob has negative argument count".into()));
        }
        let n_param = n_param as usize;
        let expected = HEADER_LEN + n_param * 8;
        if buf.len() != expected {
            return Err(SpatialError::Constraint(format!(
                "MATCH blob length {} does not match its declared {} arguments (expected {} bytes)",
                buf.len(),
                n_param,
                expected
            )));
        }
        let callback = lookup_callback(callback_id)
            .ok_or_else(|| SpatialError::Constraint(format!("MATCH blob references unknown callback handle {}", callback_id)))?;
        let mut args = Vec::with_capacity(n_param);
        for i in 0..n_param {
            args.push(read_f64(buf, HEADER_LEN + i * 8));
        }
        Ok(MatchPredicate { magic, callback_id, context, callback, args })
    }
}

/// Rejects any cell intersecting the complement of a fixed bounding cell —
/// the common case a spatial `MATCH geom_overlap(...)` call compiles down
/// to.
pub struct IntersectsCallback {
    pub target: Cell,
}

impl GeomCallback for IntersectsCallback {
    fn prune(&self, cell: &Cell, ndim: usize) -> SpatialResult<bool> {
        Ok(!super::primitives::intersects(cell, &self.target, ndim))
    }
}

/// Rejects any cell not fully containing a fixed point or cell.
pub struct ContainsCallback {
    pub target: Cell,
}

impl GeomCallback for ContainsCallback {
    fn prune(&self, cell: &Cell, ndim: usize) -> SpatialResult<bool> {
        Ok(!super::primitives::contains(cell, &self.target, ndim))
    }
}

//! Component B — ref-counted node cache.
//!
//! Nodes are addressed by `NodeHandle` while resident: a generation-checked
//! arena index, the idiomatic-Rust stand-in for the manual reference
//! counting a C host would do over raw pointers. A 128-bucket
//! hash table keyed by on-disk node number gives O(1) lookup of an
//! already-resident node; `acquire`/`release` implement the ref-count and
//! flush-on-zero protocol, with parent links walked to keep ancestors
//! pinned while a descendant is held.

use std::collections::HashMap;

use super::codec;
use super::rtree_types::{CoordKind, NodeNo, PageNode, SpatialError, SpatialResult};
use super::store::BackingStore;

const NUM_BUCKETS: usize = 128;

/// A handle to a resident node. Stable only while the cache that produced it
/// is alive; presenting a handle from a different cache generation is a
/// caller bug, not a recoverable error, so it panics rather than returning
/// `SpatialResult`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeHandle {
    index: usize,
    generation: u32,
}

struct Slot {
    generation: u32,
    node_no: Option<NodeNo>,
    parent: Option<NodeHandle>,
    refs: u32,
    dirty: bool,
    node: PageNode,
}

/// Ref-counted cache of resident `PageNode`s, backed by a `BackingStore`.
pub struct NodeCache {
    store: BackingStore,
    ndim: usize,
    kind: CoordKind,
    node_size: usize,
    max_cells: usize,
    slots: Vec<Option<Slot>>,
    free: Vec<usize>,
    by_node_no: [HashMap<NodeNo, usize>; NUM_BUCKETS],
}

fn bucket(node_no: NodeNo) -> usize {
    (node_no.rem_euclid(NUM_BUCKETS as i64)) as usize
}

impl NodeCache {
    /// `max_cells` is this tree's own configured `M` (from
    /// `lifecycle::max_cells_for`), used to reject a loaded node whose cell
    /// count exceeds it as corruption — never the absolute
    /// `MAX_CELLS_PER_NODE` ceiling, which only bounds how large `M` itself
    /// may grow.
    pub fn new(store: BackingStore, ndim: usize, kind: CoordKind, node_size: usize, max_cells: usize) -> Self {
        NodeCache {
            store,
            ndim,
            kind,
            node_size,
            max_cells,
            slots: Vec::new(),
            free: Vec::new(),
            by_node_no: std::array::from_fn(|_| HashMap::new()),
        }
    }

    pub fn store(&self) -> &BackingStore {
        &self.store
    }

    fn find_resident(&self, node_no: NodeNo) -> Option<usize> {
        self.by_node_no[bucket(node_no)].get(&node_no).copied()
    }

    fn alloc_slot(&mut self, slot: Slot) -> NodeHandle {
        let index = match self.free.pop() {
            Some(i) => {
                self.slots[i] = Some(slot);
                i
            }
            None => {
                self.slots.push(Some(slot));
                self.slots.len() - 1
            }
        };
        let generation = self.slots[index].as_ref().unwrap().generation;
        NodeHandle { index, generation }
    }

    fn slot(&self, h: NodeHandle) -> &Slot {
        let slot = self.slots[h.index].as_ref().expect("dangling NodeHandle");
        assert_eq!(slot.generation, h.generation, "stale NodeHandle generation");
        slot
    }

    fn slot_mut(&mut self, h: NodeHandle) -> &mut Slot {
        let slot = self.slots[h.index].as_mut().expect("dangling NodeHandle");
        assert_eq!(slot.generation, h.generation, "stale NodeHandle generation");
        slot
    }

    /// Loads `node_no` into the cache (or returns the already-resident
    /// handle), bumping its ref count by one. `parent` is attached if the
    /// node was not already resident with one.
    pub fn acquire(&mut self, node_no: NodeNo, parent: Option<NodeHandle>) -> SpatialResult<NodeHandle> {
        if let Some(index) = self.find_resident(node_no) {
            let generation = self.slots[index].as_ref().unwrap().generation;
            let handle = NodeHandle { index, generation };
            if let Some(p) = parent {
                self.pin(p);
            }
            let slot = self.slots[index].as_mut().unwrap();
            slot.refs += 1;
            if slot.parent.is_none() {
                slot.parent = parent;
            } else if let Some(p) = parent {
                self.release(p)?;
            }
            return Ok(handle);
        }

        let bytes = self
            .store
            .read_node(node_no)?
            .ok_or_else(|| SpatialError::Corruption(format!("node {} referenced but missing", node_no)))?;
        let node = codec::decode_node(&bytes, self.ndim, self.kind, self.max_cells)?;
        if node_no == super::rtree_types::ROOT_NODE_NO && node.depth > super::rtree_types::MAX_DEPTH {
            return Err(SpatialError::Corruption(format!(
                "root depth {} exceeds max {}",
                node.depth,
                super::rtree_types::MAX_DEPTH
            )));
        }

        let slot = Slot {
            generation: 0,
            node_no: Some(node_no),
            parent,
            refs: 1,
            dirty: false,
            node,
        };
        let handle = self.alloc_slot(slot);
        self.by_node_no[bucket(node_no)].insert(node_no, handle.index);
        Ok(handle)
    }

    /// Creates a brand-new node with no on-disk number yet, held with one
    /// reference; it receives a node number on first `flush`.
    pub fn new_node(&mut self, parent: Option<NodeHandle>) -> NodeHandle {
        if let Some(p) = parent {
            self.pin(p);
        }
        let slot = Slot {
            generation: 0,
            node_no: None,
            parent,
            refs: 1,
            dirty: true,
            node: PageNode::empty(),
        };
        self.alloc_slot(slot)
    }

    /// Adds one extra reference to an already-resident node. Used by
    /// callers (e.g. the insert/delete algorithms) that need to keep a
    /// handle alive across releasing some other handle that happens to
    /// hold the only other pin on it.
    pub fn pin(&mut self, h: NodeHandle) {
        self.slot_mut(h).refs += 1;
    }

    pub fn node(&self, h: NodeHandle) -> &PageNode {
        &self.slot(h).node
    }

    pub fn node_mut(&mut self, h: NodeHandle) -> &mut PageNode {
        let slot = self.slot_mut(h);
        slot.dirty = true;
        &mut slot.node
    }

    pub fn node_no(&self, h: NodeHandle) -> Option<NodeNo> {
        self.slot(h).node_no
    }

    pub fn parent(&self, h: NodeHandle) -> Option<NodeHandle> {
        self.slot(h).parent
    }

    pub fn set_parent(&mut self, h: NodeHandle, parent: Option<NodeHandle>) {
        self.slot_mut(h).parent = parent;
    }

    pub fn mark_dirty(&mut self, h: NodeHandle) {
        self.slot_mut(h).dirty = true;
    }

    /// Forgets `h`'s assigned node number so the next `flush` allocates a
    /// fresh one. Used when relocating a node's content off a fixed slot
    /// (e.g. moving the old root's content aside before a new root takes
    /// over node number 1).
    pub fn clear_node_no(&mut self, h: NodeHandle) {
        if let Some(no) = self.slot(h).node_no {
            self.by_node_no[bucket(no)].remove(&no);
        }
        let slot = self.slot_mut(h);
        slot.node_no = None;
        slot.dirty = true;
    }

    /// Forces `h` to be written under a specific node number on its next
    /// flush, overwriting whatever currently lives there.
    pub fn force_node_no(&mut self, h: NodeHandle, node_no: NodeNo) {
        if let Some(old) = self.slot(h).node_no {
            self.by_node_no[bucket(old)].remove(&old);
        }
        self.by_node_no[bucket(node_no)].insert(node_no, h.index);
        let slot = self.slot_mut(h);
        slot.node_no = Some(node_no);
        slot.dirty = true;
    }

    /// Writes a node's bytes to the backing store if dirty, assigning it a
    /// fresh node number on first flush. Leaf nodes additionally resync the
    /// `_rowid` table for every cell they hold, so a rowid always points at
    /// whichever leaf currently contains it regardless of how many splits
    /// or forced reinserts have shuffled it since the last flush.
    pub fn flush(&mut self, h: NodeHandle) -> SpatialResult<NodeNo> {
        let dirty = self.slot(h).dirty;
        let prior_no = self.slot(h).node_no;
        if !dirty {
            return prior_no.ok_or_else(|| SpatialError::Corruption("flushed node has no number".into()));
        }
        let bytes = codec::encode_node(&self.slot(h).node, self.ndim, self.kind, self.node_size)?;
        let assigned = self.store.insert_node(prior_no, bytes)?;
        if prior_no.is_none() {
            self.by_node_no[bucket(assigned)].insert(assigned, h.index);
        }
        if self.slot(h).node.depth == 0 {
            for cell in &self.slot(h).node.cells {
                self.store.insert_rowid(cell.rowid, assigned)?;
            }
        }
        if assigned != super::rtree_types::ROOT_NODE_NO {
            if let Some(parent_no) = self.slot(h).parent.and_then(|p| self.node_no(p)) {
                self.store.insert_parent(assigned, parent_no)?;
            }
        }
        let slot = self.slot_mut(h);
        slot.node_no = Some(assigned);
        slot.dirty = false;
        Ok(assigned)
    }

    /// Drops one reference. At zero, flushes if dirty, releases the parent
    /// reference (recursively), and frees the arena slot.
    pub fn release(&mut self, h: NodeHandle) -> SpatialResult<()> {
        {
            let slot = self.slot_mut(h);
            assert!(slot.refs > 0, "release on a node with no outstanding references");
            slot.refs -= 1;
        }
        if self.slot(h).refs > 0 {
            return Ok(());
        }
        self.flush(h)?;
        let parent = self.slot(h).parent;
        let node_no = self.slot(h).node_no;
        if let Some(no) = node_no {
            self.by_node_no[bucket(no)].remove(&no);
        }
        {
            let slot = self.slots[h.index].as_mut().unwrap();
            slot.generation = slot.generation.wrapping_add(1);
        }
        self.slots[h.index] = None;
        self.free.push(h.index);
        if let Some(p) = parent {
            self.release(p)?;
        }
        Ok(())
    }

    /// Discards a node without flushing it (used when a node is deleted
    /// from the tree rather than merely evicted).
    pub fn discard(&mut self, h: NodeHandle) -> SpatialResult<()> {
        if let Some(no) = self.slot(h).node_no {
            self.by_node_no[bucket(no)].remove(&no);
            self.store.delete_node(no)?;
            self.store.delete_parent(no)?;
        }
        let parent = self.slot(h).parent;
        {
            let slot = self.slots[h.index].as_mut().unwrap();
            slot.generation = slot.generation.wrapping_add(1);
        }
        self.slots[h.index] = None;
        self.free.push(h.index);
        if let Some(p) = parent {
            self.release(p)?;
        }
        Ok(())
    }

    pub fn resident_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

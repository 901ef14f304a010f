//! Component C — backing-store adapter.
//!
//! A thin wrapper over the host's three tables, each one opened as a
//! `nitrite::store::NitriteMap`. Nine operations total: read/insert/delete
//! on each of `_node`, `_rowid`, `_parent`. Insert is insert-or-replace;
//! inserting a node with no pre-assigned number asks the map for a fresh
//! one (the host's auto-assigned key).

use nitrite::store::{NitriteMap, NitriteStore};
use nitrite::Value;

use super::rtree_types::{NodeNo, Rowid, SpatialError, SpatialResult};

/// The three backing tables behind one R-tree instance.
pub struct BackingStore {
    node_map: NitriteMap,
    rowid_map: NitriteMap,
    parent_map: NitriteMap,
    next_node_no: std::sync::atomic::AtomicI64,
}

impl BackingStore {
    pub fn table_names(base: &str) -> (String, String, String) {
        (format!("{}_node", base), format!("{}_rowid", base), format!("{}_parent", base))
    }

    pub fn open(store: &NitriteStore, base_name: &str) -> SpatialResult<Self> {
        let (node_name, rowid_name, parent_name) = Self::table_names(base_name);
        let node_map = store.open_map(&node_name).map_err(SpatialError::from)?;
        let rowid_map = store.open_map(&rowid_name).map_err(SpatialError::from)?;
        let parent_map = store.open_map(&parent_name).map_err(SpatialError::from)?;
        let next_node_no = Self::derive_next_node_no(&node_map)?;
        Ok(BackingStore {
            node_map,
            rowid_map,
            parent_map,
            next_node_no: std::sync::atomic::AtomicI64::new(next_node_no),
        })
    }

    fn derive_next_node_no(node_map: &NitriteMap) -> SpatialResult<i64> {
        let mut max_seen = super::rtree_types::ROOT_NODE_NO;
        for key in node_map.keys().map_err(SpatialError::from)? {
            if let Value::I64(no) = key.map_err(SpatialError::from)? {
                if no > max_seen {
                    max_seen = no;
                }
            }
        }
        Ok(max_seen + 1)
    }

    // ---- _node --------------------------------------------------------

    pub fn read_node(&self, node_no: NodeNo) -> SpatialResult<Option<Vec<u8>>> {
        match self.node_map.get(&Value::I64(node_no)).map_err(SpatialError::from)? {
            Some(Value::Bytes(bytes)) => Ok(Some(bytes)),
            Some(_) => Err(SpatialError::Corruption(format!("_node row {} is not bytes", node_no))),
            None => Ok(None),
        }
    }

    /// Insert-or-replace. When `node_no` is `None`, assigns a fresh node
    /// number (the backing store's auto-assigned key) and returns it.
    pub fn insert_node(&self, node_no: Option<NodeNo>, bytes: Vec<u8>) -> SpatialResult<NodeNo> {
        let no = match node_no {
            Some(no) => no,
            None => self
                .next_node_no
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst),
        };
        self.node_map
            .put(Value::I64(no), Value::Bytes(bytes))
            .map_err(SpatialError::from)?;
        Ok(no)
    }

    pub fn delete_node(&self, node_no: NodeNo) -> SpatialResult<()> {
        self.node_map.remove(&Value::I64(node_no)).map_err(SpatialError::from)?;
        Ok(())
    }

    // ---- _rowid ---------------------------------------------------------

    pub fn read_rowid(&self, rowid: Rowid) -> SpatialResult<Option<NodeNo>> {
        match self.rowid_map.get(&Value::I64(rowid)).map_err(SpatialError::from)? {
            Some(Value::I64(no)) => Ok(Some(no)),
            Some(_) => Err(SpatialError::Corruption(format!("_rowid row {} is not an integer", rowid))),
            None => Ok(None),
        }
    }

    pub fn insert_rowid(&self, rowid: Rowid, node_no: NodeNo) -> SpatialResult<()> {
        self.rowid_map
            .put(Value::I64(rowid), Value::I64(node_no))
            .map_err(SpatialError::from)
    }

    pub fn delete_rowid(&self, rowid: Rowid) -> SpatialResult<()> {
        self.rowid_map.remove(&Value::I64(rowid)).map_err(SpatialError::from)?;
        Ok(())
    }

    // ---- _parent --------------------------------------------------------

    pub fn read_parent(&self, node_no: NodeNo) -> SpatialResult<Option<NodeNo>> {
        match self.parent_map.get(&Value::I64(node_no)).map_err(SpatialError::from)? {
            Some(Value::I64(parent)) => Ok(Some(parent)),
            Some(_) => Err(SpatialError::Corruption(format!("_parent row {} is not an integer", node_no))),
            None => Ok(None),
        }
    }

    pub fn insert_parent(&self, node_no: NodeNo, parent_no: NodeNo) -> SpatialResult<()> {
        self.parent_map
            .put(Value::I64(node_no), Value::I64(parent_no))
            .map_err(SpatialError::from)
    }

    pub fn delete_parent(&self, node_no: NodeNo) -> SpatialResult<()> {
        self.parent_map.remove(&Value::I64(node_no)).map_err(SpatialError::from)?;
        Ok(())
    }

    pub fn drop_tables(store: &NitriteStore, base_name: &str) -> SpatialResult<()> {
        let (node_name, rowid_name, parent_name) = Self::table_names(base_name);
        for name in [node_name, rowid_name, parent_name] {
            store.remove_map(&name).map_err(SpatialError::from)?;
        }
        Ok(())
    }

    /// Copies every entry from the map named `from` into the map named `to`
    /// (creating it if needed) and drops `from`. `NitriteMap` has no native
    /// rename primitive, so renaming a tree's tables means replaying their
    /// contents under the new names.
    pub fn rename_table(store: &NitriteStore, from: &str, to: &str) -> SpatialResult<()> {
        let old_map = store.open_map(from).map_err(SpatialError::from)?;
        let new_map = store.open_map(to).map_err(SpatialError::from)?;
        let entries: Vec<(nitrite::common::Key, Value)> = old_map
            .entries()
            .map_err(SpatialError::from)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(SpatialError::from)?;
        new_map.put_all(entries).map_err(SpatialError::from)?;
        store.remove_map(from).map_err(SpatialError::from)?;
        Ok(())
    }
}

use crate::config::FjallConfig;
use crate::store::FjallStore;
use crate::wrapper::FjallValue;
use fjall::{GarbageCollection, Partition};
use nitrite::common::{async_task, AttributeAware, Attributes, Key, Value, META_MAP_NAME};
use nitrite::errors::{ErrorKind, NitriteError, NitriteResult};
use nitrite::store::{
    EntryIterator, KeyIterator, NitriteMap, NitriteMapProvider, NitriteStore,
    SingleMapEntryProvider, SingleMapKeyProvider, SingleMapValueProvider, ValueIterator,
};
use std::collections::Bound::{Excluded, Included, Unbounded};
use std::iter::Rev;
use std::ops::RangeFull;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Clone)]
/// Fjall-based key-value map implementation.
///
/// A persistent, thread-safe key-value store backed by Fjall LSM engine. Uses PIMPL pattern
/// with `Arc<FjallMapInner>` for efficient cloning and shared ownership. Implements the
/// NitriteMapProvider trait for integration with Nitrite's storage abstraction.
///
/// Purpose: Provides durable, transactional key-value operations with automatic persistence,
/// garbage collection, and attribute metadata storage.
///
/// Characteristics:
/// - Thread-safe (Arc-based, can be cloned across threads)
/// - Persistent (backed by Fjall LSM storage engine)
/// - Garbage collection (automatic cleanup with `collect_garbage()`)
/// - Attributes (supports metadata via AttributeAware trait)
/// - Iterator support (entries, keys, values with reverse iteration)
/// - Cloneable (cheap Arc clones)
/// - Trait delegation (no Deref, explicit method forwarding)
///
/// Usage: Created via FjallStore, used for collection data storage and indexes.
/// Accessed through NitriteMapProvider trait for iterator and CRUD operations.
pub struct FjallMap {
    inner: Arc<FjallMapInner>,
}

impl FjallMap {
    /// Creates a new FjallMap with the given partition.
    ///
    /// Arguments:
    /// - `name`: Name of this map (identifies the partition)
    /// - `partition`: Fjall partition backing this map
    /// - `store`: Parent FjallStore for lifecycle management
    /// - `fjall_config`: Configuration for this map's operations
    ///
    /// Returns: A new `FjallMap` instance ready for use
    #[inline]
    pub fn new(
        name: String,
        partition: Partition,
        store: FjallStore,
        fjall_config: FjallConfig,
    ) -> FjallMap {
        FjallMap {
            inner: Arc::new(FjallMapInner::new(name, partition, store, fjall_config)),
        }
    }
}

impl AttributeAware for FjallMap {
    /// Returns the attributes associated with this map.
    ///
    /// Returns: `Ok(Some(Attributes))` if attributes exist, `Ok(None)` otherwise
    fn attributes(&self) -> NitriteResult<Option<Attributes>> {
        self.inner.get_attributes()
    }

    /// Sets the attributes for this map.
    ///
    /// Arguments:
    /// - `attributes`: Metadata to store for this map
    ///
    /// Returns: `Ok(())` on success, error otherwise
    fn set_attributes(&self, attributes: Attributes) -> NitriteResult<()> {
        self.inner.set_attributes(attributes)
    }
}

impl NitriteMapProvider for FjallMap {
    /// Checks if a key exists in this map.
    ///
    /// Arguments:
    /// - `key`: Key to check for existence
    ///
    /// Returns: `Ok(true)` if key exists, `Ok(false)` otherwise
    #[inline]
    fn contains_key(&self, key: &Key) -> NitriteResult<bool> {
        self.inner.contains_key(key)
    }

    /// Retrieves a value by key.
    ///
    /// Arguments:
    /// - `key`: Key to retrieve
    ///
    /// Returns: `Ok(Some(Value))` if key exists, `Ok(None)` otherwise
    #[inline]
    fn get(&self, key: &Key) -> NitriteResult<Option<Value>> {
        self.inner.get(key)
    }

    /// Removes all entries from this map.
    ///
    /// Also triggers asynchronous cleanup (commit and garbage collection) in the background.
    ///
    /// Returns: `Ok(())` on success, error otherwise
    fn clear(&self) -> NitriteResult<()> {
        self.inner.clear()?;
        let clone = self.clone();
        async_task(move || {
            // Safe cleanup: handle all errors gracefully without panicking in async task
            match clone.get_store() {
                Ok(store) => {
                    match store.commit() {
                        Ok(_) => {
                            log::debug!("Successfully committed store after clear");
                        }
                        Err(e) => {
                            log::error!("Failed to commit store after clear: {}", e);
                            // Do not panic - log and continue
                        }
                    }
                }
                Err(e) => {
                    log::error!("Failed to get store for cleanup after clear: {}", e);
                    // Do not panic - store may have been dropped or closed
                    return;
                }
            }

            // Attempt garbage collection but don't crash if it fails
            match clone.collect_garbage() {
                Ok(_) => {
                    log::debug!("Successfully collected garbage after clear");
                }
                Err(e) => {
                    log::error!("Failed to collect garbage after clear: {}", e);
                    // Non-fatal - garbage collection is best-effort
                }
            }
        });
        Ok(())
    }

    /// Checks if this map is closed.
    ///
    /// Returns: `Ok(true)` if closed, `Ok(false)` otherwise
    fn is_closed(&self) -> NitriteResult<bool> {
        self.inner.is_closed()
    }

    /// Closes this map, preventing further operations.
    ///
    /// Returns: `Ok(())` on success, error otherwise
    fn close(&self) -> NitriteResult<()> {
        self.inner.close()
    }

    /// Returns an iterator over all values in this map.
    ///
    /// Returns: A `ValueIterator` for iteration
    fn values(&self) -> NitriteResult<ValueIterator> {
        let provider = SingleMapValueProvider::new(NitriteMap::new(self.clone()));
        Ok(ValueIterator::new(provider))
    }

    /// Returns an iterator over all keys in this map.
    ///
    /// Returns: A `KeyIterator` for iteration
    fn keys(&self) -> NitriteResult<KeyIterator> {
        let provider = SingleMapKeyProvider::new(NitriteMap::new(self.clone()));
        Ok(KeyIterator::new(provider))
    }

    /// Removes an entry by key, returning its previous value.
    ///
    /// Arguments:
    /// - `key`: Key to remove
    ///
    /// Returns: `Ok(Some(Value))` if key existed, `Ok(None)` otherwise
    fn remove(&self, key: &Key) -> NitriteResult<Option<Value>> {
        let result = self.inner.remove(key)?;
        Ok(result)
    }

    /// Inserts or updates a key-value pair.
    ///
    /// Arguments:
    /// - `key`: Key to insert/update
    /// - `value`: Value to store
    ///
    /// Returns: `Ok(())` on success, error otherwise
    fn put(&self, key: Key, value: Value) -> NitriteResult<()> {
        self.inner.put(key, value)?;
        Ok(())
    }

    /// Inserts or updates multiple key-value pairs atomically.
    ///
    /// Arguments:
    /// - `entries`: Vector of (key, value) pairs to insert
    ///
    /// Returns: `Ok(())` on success, error otherwise
    fn put_all(&self, entries: Vec<(Key, Value)>) -> NitriteResult<()> {
        self.inner.put_all(entries)
    }

    /// Returns the number of entries in this map.
    ///
    /// Returns: Number of key-value pairs
    fn size(&self) -> NitriteResult<u64> {
        self.inner.size()
    }

    /// Inserts a key-value pair if the key is not already present.
    ///
    /// Arguments:
    /// - `key`: Key to check/insert
    /// - `value`: Value to store if key is absent
    ///
    /// Returns: `Ok(Some(Value))` if key existed, `Ok(None)` if inserted
    fn put_if_absent(&self, key: Key, value: Value) -> NitriteResult<Option<Value>> {
        let result = self.inner.put_if_absent(key, value)?;
        Ok(result)
    }

    /// Returns the first key in this map.
    ///
    /// Returns: `Ok(Some(Key))` if map is non-empty, `Ok(None)` otherwise
    fn first_key(&self) -> NitriteResult<Option<Key>> {
        self.inner.first_key()
    }

    /// Returns the last key in this map.
    ///
    /// Returns: `Ok(Some(Key))` if map is non-empty, `Ok(None)` otherwise
    fn last_key(&self) -> NitriteResult<Option<Key>> {
        self.inner.last_key()
    }

    /// Returns the smallest key strictly greater than the given key.
    ///
    /// Arguments:
    /// - `key`: Reference key
    ///
    /// Returns: `Ok(Some(Key))` if such key exists, `Ok(None)` otherwise
    fn higher_key(&self, key: &Key) -> NitriteResult<Option<Key>> {
        self.inner.higher_key(key)
    }

    /// Returns the smallest key greater than or equal to the given key.
    ///
    /// Arguments:
    /// - `key`: Reference key
    ///
    /// Returns: `Ok(Some(Key))` if such key exists, `Ok(None)` otherwise
    fn ceiling_key(&self, key: &Key) -> NitriteResult<Option<Key>> {
        self.inner.ceiling_key(key)
    }

    /// Returns the largest key strictly less than the given key.
    ///
    /// Arguments:
    /// - `key`: Reference key
    ///
    /// Returns: `Ok(Some(Key))` if such key exists, `Ok(None)` otherwise
    fn lower_key(&self, key: &Key) -> NitriteResult<Option<Key>> {
        self.inner.lower_key(key)
    }

    /// Returns the largest key less than or equal to the given key.
    ///
    /// Arguments:
    /// - `key`: Reference key
    ///
    /// Returns: `Ok(Some(Key))` if such key exists, `Ok(None)` otherwise
    fn floor_key(&self, key: &Key) -> NitriteResult<Option<Key>> {
        self.inner.floor_key(key)
    }

    /// Checks if this map is empty.
    ///
    /// Returns: `Ok(true)` if no entries, `Ok(false)` otherwise
    fn is_empty(&self) -> NitriteResult<bool> {
        self.inner.is_empty()
    }

    /// Returns the parent store of this map.
    ///
    /// Returns: A `NitriteStore` instance
    fn get_store(&self) -> NitriteResult<NitriteStore> {
        self.inner.get_store()
    }

    /// Returns the name of this map.
    ///
    /// Returns: String name of the map
    fn get_name(&self) -> NitriteResult<String> {
        self.inner.get_name()
    }

    /// Returns an iterator over all entries in this map.
    ///
    /// Returns: An `EntryIterator` for iteration
    fn entries(&self) -> NitriteResult<EntryIterator> {
        let provider = SingleMapEntryProvider::new(NitriteMap::new(self.clone()));
        Ok(EntryIterator::new(provider))
    }

    /// Returns a reverse iterator over all entries in this map.
    ///
    /// Returns: A reverse `EntryIterator` for iteration
    fn reverse_entries(&self) -> NitriteResult<Rev<EntryIterator>> {
        let provider = SingleMapEntryProvider::new(NitriteMap::new(self.clone()));
        Ok(EntryIterator::new(provider).rev())
    }

    /// Marks this map as disposed, freeing resources.
    ///
    /// Returns: `Ok(())` on success, error otherwise
    fn dispose(&self) -> NitriteResult<()> {
        self.inner.dispose()
    }

    /// Checks if this map is dropped.
    ///
    /// Returns: `Ok(true)` if dropped, `Ok(false)` otherwise
    fn is_dropped(&self) -> NitriteResult<bool> {
        self.inner.is_dropped()
    }
}

impl FjallMap {
    /// Performs garbage collection on this map.
    ///
    /// Reclaims space by removing deleted/unused data through compaction.
    ///
    /// Returns: `Ok(())` on success, error otherwise
    pub fn collect_garbage(&self) -> NitriteResult<()> {
        self.inner.collect_garbage()
    }

    /// Initializes this map.
    ///
    /// Returns: `Ok(())` on success, error otherwise
    pub fn initialize(&self) -> NitriteResult<()> {
        self.inner.initialize()
    }

    /// Returns the attributes associated with this map.
    ///
    /// Returns: `Ok(Some(Attributes))` if attributes exist, `Ok(None)` otherwise
    #[allow(dead_code)]
    pub fn get_attributes(&self) -> NitriteResult<Option<Attributes>> {
        self.inner.get_attributes()
    }

    /// Sets the attributes for this map.
    ///
    /// Arguments:
    /// - `attributes`: Metadata to store for this map
    ///
    /// Returns: `Ok(())` on success, error otherwise
    #[allow(dead_code)]
    pub fn set_attributes(&self, attributes: Attributes) -> NitriteResult<()> {
        self.inner.set_attributes(attributes)
    }
}

/// Internal Fjall map implementation.
///
/// Encapsulates the actual Fjall partition and manages state (open/closed/dropped).
/// Provides atomic access to partition operations with lifecycle tracking.
///
/// Thread-safe: Uses AtomicBool for state flags with Relaxed ordering for performance.
struct FjallMapInner {
    name: String,
    partition: Partition,
    closed: AtomicBool,
    dropped: AtomicBool,
    store: FjallStore,
    fjall_config: FjallConfig,
}

impl FjallMapInner {
    /// Creates a new FjallMapInner wrapping the given partition.
    ///
    /// Arguments:
    /// - `name`: Map identifier
    /// - `partition`: Fjall partition backend
    /// - `store`: Parent store reference
    /// - `fjall_config`: Configuration for operations
    ///
    /// Returns: A new `FjallMapInner` with closed=false, dropped=false
    fn new(
        name: String,
        partition: Partition,
        store: FjallStore,
        fjall_config: FjallConfig,
    ) -> FjallMapInner {
        FjallMapInner {
            name,
            partition,
            store,
            closed: AtomicBool::new(false),
            dropped: AtomicBool::new(false),
            fjall_config,
        }
    }

    /// Initializes this map (currently a no-op).
    ///
    /// Returns: `Ok(())`
    pub fn initialize(&self) -> NitriteResult<()> {
        Ok(())
    }

    fn check_opened(&self) -> NitriteResult<()> {
        if self.closed.load(Ordering::Relaxed) {
            log::error!("Map {} is closed", self.name);
            return Err(NitriteError::new(
                &format!("Map {} is closed", self.name),
                ErrorKind::StoreAlreadyClosed,
            ));
        }

        if self.dropped.load(Ordering::Relaxed) {
            log::error!("Map {} is dropped", self.name);
            return Err(NitriteError::new(
                &format!("Map {} is dropped", self.name),
                ErrorKind::StoreNotInitialized,
            ));
        }

        Ok(())
    }

    fn get_attributes(&self) -> NitriteResult<Option<Attributes>> {
        if !self.is_dropped()? {
            let store = self.get_store()?;
            let meta_map = store.open_map(META_MAP_NAME)?;
            let name = self.get_name()?;

            if name.ne(META_MAP_NAME) {
                let attributes = meta_map.get(&Value::from(name.clone()))?;
                if let Some(attributes) = attributes {
                    // Check if value is actually a Document before unwrapping
                    return match attributes.as_document() {
                        Some(doc) => Ok(Some(Attributes::from_document(doc))),
                        None => {
                            log::warn!(
                                "Metadata for map '{}' is not a Document, skipping attributes",
                                name
                            );
                            Ok(None)
                        }
                    };
                }
            }
        }
        Ok(None)
    }

    fn set_attributes(&self, attributes: Attributes) -> NitriteResult<()> {
        if !self.is_dropped()? {
            let store = self.get_store()?;
            let meta_map = store.open_map(META_MAP_NAME)?;
            let name = self.get_name()?;

            if name.ne(META_MAP_NAME) {
                meta_map.put(Value::from(name), Value::from(attributes.to_document()))?;
            }
        }
        Ok(())
    }

    fn contains_key(&self, key: &Key) -> NitriteResult<bool> {
        self.check_opened()?;
        let result = self.partition.contains_key(FjallValue::new(key.clone()));
        match result {
            Ok(value) => Ok(value),
            Err(err) => {
                log::error!("Failed to check key in FjallMap: {}", err);
                Err(NitriteError::new(
                    &format!("Failed to check key in FjallMap: {}", err),
                    ErrorKind::BackendError,
                ))
            }
        }
    }

    fn get(&self, key: &Key) -> NitriteResult<Option<Value>> {
        self.check_opened()?;

        // Use normalized numeric types for keys to ensure consistent index behavior
        let normalized_key = FjallValue::try_from_value_normalized(key)?;
        let result = self.partition.get(normalized_key);
        match result {
            Ok(value) => {
                if let Some(value) = value {
                    let fjall_value = FjallValue::from(value);
                    let value: Value = fjall_value.into();
                    Ok(Some(value))
                } else {
                    Ok(None)
                }
            }
            Err(err) => {
                log::error!("Failed to get value from FjallMap: {}", err);
                Err(NitriteError::new(
                    &format!("Failed to get value from FjallMap: {}", err),
                    ErrorKind::BackendError,
                ))
            }
        }
    }

    fn clear(&self) -> NitriteResult<()> {
        self.check_opened()?;
        for result in self.partition.range::<Vec<u8>, RangeFull>(..) {
            match result {
                Ok((key, _)) => {
                    let remove_result = self.partition.remove(&*key);
                    match remove_result {
                        Ok(_) => {}
                        Err(err) => {
                            log::error!("Failed to remove item from FjallMap: {}", err);
                            return Err(NitriteError::new(
                                &format!("Failed to remove item from FjallMap: {}", err),
                                ErrorKind::BackendError,
                            ));
                        }
                    }
                }
                Err(err) => {
                    log::error!("Failed to clear FjallMap: {}", err);
                    return Err(NitriteError::new(
                        &format!("Failed to clear FjallMap: {}", err),
                        ErrorKind::BackendError,
                    ));
                }
            }
        }
        Ok(())
    }

    fn is_closed(&self) -> NitriteResult<bool> {
        Ok(self.closed.load(Ordering::Relaxed))
    }

    fn close(&self) -> NitriteResult<()> {
        self.closed.store(true, Ordering::Relaxed);
        let store = self.get_store()?;
        store.close_map(&self.name)
    }

    fn remove(&self, key: &Key) -> NitriteResult<Option<Value>> {
        self.check_opened()?;
        let value = self.get(key)?;
        // Use normalized numeric types for keys to ensure consistent index behavior
        let normalized_key = FjallValue::try_from_value_normalized(key)?;
        let result = self.partition.remove(normalized_key);
        // Use if let Err(e) pattern instead of is_err().err().unwrap()
        if let Err(err) = result {
            log::error!("Failed to remove item from FjallMap: {}", err);
            return Err(NitriteError::new(
                &format!("Failed to remove item from FjallMap: {}", err),
                ErrorKind::BackendError,
            ));
        }
        Ok(value)
    }

    fn put(&self, key: Key, value: Value) -> NitriteResult<()> {
        self.check_opened()?;
        // Use normalized numeric types for keys to ensure consistent index behavior
        // across different numeric types (e.g., I64 vs U64)
        let normalized_key = FjallValue::try_from_value_normalized(&key)?;
        let result = self
            .partition
            .insert(normalized_key, FjallValue::new(value));

        // Use if-let pattern for efficient error handling
        if let Err(err) = result {
            log::error!("Failed to put item in FjallMap: {}", err);
            return Err(NitriteError::new(
                &format!("Failed to put item in FjallMap: {}", err),
                ErrorKind::BackendError,
            ));
        }
        Ok(())
    }

    /// Atomically inserts multiple key-value pairs using Fjall's batch API.
    /// This is more efficient than individual inserts as it:
    /// - Reduces journal writes
    /// - Minimizes fsync overhead
    /// - Provides atomicity for all entries
    fn put_all(&self, entries: Vec<(Key, Value)>) -> NitriteResult<()> {
        self.check_opened()?;

        if entries.is_empty() {
            return Ok(());
        }

        // Get the keyspace from the store for batch operations
        let keyspace = self.store.keyspace().ok_or_else(|| {
            NitriteError::new(
                "Keyspace not initialized for batch operation",
                ErrorKind::StoreNotInitialized,
            )
        })?;

        // Create a batch with capacity hint for better performance
        let mut batch = keyspace.batch();

        // Add all entries to the batch
        for (key, value) in entries {
            let normalized_key = FjallValue::try_from_value_normalized(&key)?;
            batch.insert(&self.partition, normalized_key, FjallValue::new(value));
        }

        // Commit the batch atomically
        batch.commit().map_err(|err| {
            log::error!("Failed to commit batch in FjallMap: {}", err);
            NitriteError::new(
                &format!("Failed to commit batch in FjallMap: {}", err),
                ErrorKind::BackendError,
            )
        })?;

        Ok(())
    }

    fn size(&self) -> NitriteResult<u64> {
        self.check_opened()?;
        let result = self.partition.len();
        match result {
            Ok(value) => Ok(value as u64),
            Err(err) => {
                log::error!("Failed to get size of FjallMap: {}", err);
                Err(NitriteError::new(
                    &format!("Failed to get size of FjallMap: {}", err),
                    ErrorKind::BackendError,
                ))
            }
        }
    }

    fn put_if_absent(&self, key: Key, value: Value) -> NitriteResult<Option<Value>> {
        self.check_opened()?;
        // Use normalized numeric types for keys to ensure consistent index behavior
        let normalized_key = FjallValue::try_from_value_normalized(&key)?;
        let existing_result = self.partition.get(normalized_key.clone());
        match existing_result {
            Ok(opt) => {
                if opt.is_none() {
                    let result = self
                        .partition
                        .insert(normalized_key, FjallValue::new(value));

                    // Use if let Err(e) pattern instead of is_err().err().unwrap()
                    if let Err(err) = result {
                        log::error!("Failed to put item in FjallMap: {}", err);
                        return Err(NitriteError::new(
                            &format!("Failed to put item in FjallMap: {}", err),
                            ErrorKind::BackendError,
                        ));
                    }
                }
                Ok(opt.map(|value| FjallValue::from(value).into()))
            }
            Err(err) => {
                log::error!("Failed to get item from FjallMap: {}", err);
                Err(NitriteError::new(
                    &format!("Failed to get item from FjallMap: {}", err),
                    ErrorKind::BackendError,
                ))
            }
        }
    }

    fn first_key(&self) -> NitriteResult<Option<Key>> {
        self.check_opened()?;
        let result = self.partition.first_key_value();
        match result {
            Ok(value) => {
                if let Some(value) = value {
                    Ok(Some(FjallValue::from(value.0).into()))
                } else {
                    Ok(None)
                }
            }
            Err(err) => {
                log::error!("Failed to get first key from FjallMap: {}", err);
                Err(NitriteError::new(
                    &format!("Failed to get first key from FjallMap: {}", err),
                    ErrorKind::BackendError,
                ))
            }
        }
    }

    fn last_key(&self) -> NitriteResult<Option<Key>> {
        self.check_opened()?;
        let result = self.partition.last_key_value();
        match result {
            Ok(value) => {
                if let Some(value) = value {
                    Ok(Some(FjallValue::from(value.0).into()))
                } else {
                    Ok(None)
                }
            }
            Err(err) => {
                log::error!("Failed to get last key from FjallMap: {}", err);
                Err(NitriteError::new(
                    &format!("Failed to get last key from FjallMap: {}", err),
                    ErrorKind::BackendError,
                ))
            }
        }
    }

    fn higher_key(&self, key: &Key) -> NitriteResult<Option<Key>> {
        self.check_opened()?;
        let normalized_key = FjallValue::try_from_value_normalized(key)?;
        let mut range = self.partition.range((Excluded(normalized_key), Unbounded));
        let higher = range.next();
        match higher {
            Some(Ok((key, _))) => Ok(Some(FjallValue::from(key).into())),
            Some(Err(err)) => {
                log::error!("Failed to get higher key from FjallMap: {}", err);
                Err(NitriteError::new(
                    &format!("Failed to get higher key from FjallMap: {}", err),
                    ErrorKind::BackendError,
                ))
            }
            None => Ok(None),
        }
    }

    fn ceiling_key(&self, key: &Key) -> NitriteResult<Option<Key>> {
        self.check_opened()?;
        let normalized_key = FjallValue::try_from_value_normalized(key)?;
        let mut range = self.partition.range((Included(normalized_key), Unbounded));
        let ceiling = range.next();
        match ceiling {
            Some(Ok((key, _))) => Ok(Some(FjallValue::from(key).into())),
            Some(Err(err)) => {
                log::error!("Failed to get ceiling key from FjallMap: {}", err);
                Err(NitriteError::new(
                    &format!("Failed to get ceiling key from FjallMap: {}", err),
                    ErrorKind::BackendError,
                ))
            }
            None => Ok(None),
        }
    }

    fn lower_key(&self, key: &Key) -> NitriteResult<Option<Key>> {
        self.check_opened()?;
        let normalized_key = FjallValue::try_from_value_normalized(key)?;
        let mut range = self.partition.range((Unbounded, Excluded(normalized_key)));
        let lower = range.next_back();
        match lower {
            Some(Ok((key, _))) => Ok(Some(FjallValue::from(key).into())),
            Some(Err(err)) => {
                log::error!("Failed to get lower key from FjallMap: {}", err);
                Err(NitriteError::new(
                    &format!("Failed to get lower key from FjallMap: {}", err),
                    ErrorKind::BackendError,
                ))
            }
            None => Ok(None),
        }
    }

    fn floor_key(&self, key: &Key) -> NitriteResult<Option<Key>> {
        self.check_opened()?;
        let normalized_key = FjallValue::try_from_value_normalized(key)?;
        let mut range = self.partition.range((Unbounded, Included(normalized_key)));
        let floor = range.next_back();
        match floor {
            Some(Ok((key, _))) => Ok(Some(FjallValue::from(key).into())),
            Some(Err(err)) => {
                log::error!("Failed to get floor key from FjallMap: {}", err);
                Err(NitriteError::new(
                    &format!("Failed to get floor key from FjallMap: {}", err),
                    ErrorKind::BackendError,
                ))
            }
            None => Ok(None),
        }
    }

    fn is_empty(&self) -> NitriteResult<bool> {
        self.check_opened()?;
        let result = self.partition.is_empty();
        match result {
            Ok(value) => Ok(value),
            Err(err) => {
                log::error!("Failed to check if FjallMap is empty: {}", err);
                Err(NitriteError::new(
                    &format!("Failed to check if FjallMap is empty: {}", err),
                    ErrorKind::BackendError,
                ))
            }
        }
    }

    fn get_store(&self) -> NitriteResult<NitriteStore> {
        Ok(NitriteStore::new(self.store.clone()))
    }

    fn get_name(&self) -> NitriteResult<String> {
        let encoded_name = self.name.clone();
        let name = FjallStore::decode_name(&encoded_name);
        Ok(name)
    }

    fn dispose(&self) -> NitriteResult<()> {
        self.dropped.store(true, Ordering::Relaxed);
        self.closed.store(true, Ordering::Relaxed);

        let store = self.get_store()?;
        let name = self.get_name()?; // Get decoded name since remove_map will encode it
        store.remove_map(&name)?;

        Ok(())
    }

    fn is_dropped(&self) -> NitriteResult<bool> {
        Ok(self.dropped.load(Ordering::Relaxed))
    }

    // Helper function to avoid repeated error handling pattern
    fn handle_gc_error<E: std::fmt::Display>(err: E, operation: &str) -> NitriteResult<()> {
        log::error!("Failed to {} from FjallMap: {}", operation, err);
        Err(NitriteError::new(
            &format!("Failed to {} from FjallMap: {}", operation, err),
            ErrorKind::BackendError,
        ))
    }

    pub fn collect_garbage(&self) -> NitriteResult<()> {
        if self.fjall_config.kv_separated() {
            // Use if let pattern instead of repeated error handling
            if let Err(err) = self.partition.gc_scan() {
                return Self::handle_gc_error(err, "collect garbage (scan)");
            }

            let space_amp_factor = self.fjall_config.space_amp_factor();
            if let Err(err) = self.partition.gc_with_space_amp_target(space_amp_factor) {
                return Self::handle_gc_error(err, "collect garbage (space amp)");
            }

            let stale_threshold = self.fjall_config.staleness_threshold();
            if let Err(err) = self.partition.gc_with_staleness_threshold(stale_threshold) {
                return Self::handle_gc_error(err, "collect garbage (staleness)");
            }
        } else {
            log::warn!("Cannot use GC for non-KV-separated tree");
        }
        Ok(())
    }
}

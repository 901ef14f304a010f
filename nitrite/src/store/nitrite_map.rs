use crate::common::{AttributeAware, Key, Value};
use crate::errors::NitriteResult;
use crate::store::iters::{
    EntryIterator, KeyIterator, ValueIterator,
};
use crate::store::NitriteStore;
use std::fmt::Debug;
use std::iter::Rev;
use std::ops::Deref;
use std::sync::Arc;

/// Low-level interface for key-value store implementations in Nitrite.
///
/// # Purpose
/// Defines the contract that all key-value store backends must implement.
/// Implementers provide concrete storage operations for Nitrite, such as in-memory
/// or persistent storage via adapters like ReDB or Fjall.
///
/// # Key Methods
/// - **Basic Operations**: `put()`, `get()`, `remove()`, `contains_key()`
/// - **Bulk Operations**: `put_all()` for atomic batch inserts
/// - **Iteration**: `keys()`, `values()`, `entries()` with bidirectional traversal
/// - **Navigation**: `first_key()`, `last_key()`, `higher_key()`, `ceiling_key()`, `lower_key()`, `floor_key()`
/// - **Lifecycle**: `open()`, `close()`, `clear()`, `dispose()`
/// - **State**: `is_closed()`, `is_dropped()`, `size()`, `is_empty()`
/// - **Attributes**: Support for metadata via `AttributeAware`
///
/// # Implementations
/// - `InMemoryMapProvider`: In-memory hash-based storage
/// - `ReDBMapProvider`: Persistent storage via ReDB
/// - `FjallMapProvider`: Persistent storage via Fjall
/// - `TransactionMapProvider`: Transactional view over map data
///
/// # Thread Safety
/// Implementers must be `Send + Sync` for safe use in concurrent contexts.
pub trait NitriteMapProvider: AttributeAware + Send + Sync {
    /// Checks whether the map contains a key.
    ///
    /// # Arguments
    /// * `key` - The key to check for existence
    ///
    /// # Returns
    /// * `Ok(true)` if the key exists
    /// * `Ok(false)` if the key does not exist
    /// * `Err(NitriteError)` if the operation fails
    fn contains_key(&self, key: &Key) -> NitriteResult<bool>;

    /// Retrieves the value associated with a key.
    ///
    /// # Arguments
    /// * `key` - The key to retrieve
    ///
    /// # Returns
    /// * `Ok(Some(value))` if the key exists
    /// * `Ok(None)` if the key does not exist
    /// * `Err(NitriteError)` if the operation fails
    fn get(&self, key: &Key) -> NitriteResult<Option<Value>>;

    /// Clears all entries from the map.
    ///
    /// # Returns
    /// * `Ok(())` if the map was successfully cleared
    /// * `Err(NitriteError)` if the operation fails
    fn clear(&self) -> NitriteResult<()>;

    /// Checks if the map is closed.
    ///
    /// A closed map cannot be used for further operations.
    ///
    /// # Returns
    /// * `Ok(true)` if the map is closed
    /// * `Ok(false)` if the map is open
    /// * `Err(NitriteError)` if the operation fails
    fn is_closed(&self) -> NitriteResult<bool>;

    /// Closes the map.
    ///
    /// After closing, no further operations should be performed on this map.
    /// For persistent storage backends, this may flush pending data.
    ///
    /// # Returns
    /// * `Ok(())` if the map was successfully closed
    /// * `Err(NitriteError)` if the operation fails
    fn close(&self) -> NitriteResult<()>;

    /// Retrieves an iterator over all values in the map.
    ///
    /// The returned iterator supports bidirectional traversal using the `Iterator`
    /// and `DoubleEndedIterator` traits.
    ///
    /// # Returns
    /// * `Ok(ValueIterator)` with an iterator over all values
    /// * `Err(NitriteError)` if the operation fails
    fn values(&self) -> NitriteResult<ValueIterator>;

    /// Retrieves an iterator over all keys in the map.
    ///
    /// The returned iterator supports bidirectional traversal using the `Iterator`
    /// and `DoubleEndedIterator` traits.
    ///
    /// # Returns
    /// * `Ok(KeyIterator)` with an iterator over all keys
    /// * `Err(NitriteError)` if the operation fails
    fn keys(&self) -> NitriteResult<KeyIterator>;

    /// Removes a key-value pair from the map.
    ///
    /// # Arguments
    /// * `key` - The key to remove
    ///
    /// # Returns
    /// * `Ok(Some(value))` with the removed value if the key existed
    /// * `Ok(None)` if the key did not exist
    /// * `Err(NitriteError)` if the operation fails
    fn remove(&self, key: &Key) -> NitriteResult<Option<Value>>;

    /// Inserts or updates a key-value pair in the map.
    ///
    /// If the key already exists, the value is updated.
    ///
    /// # Arguments
    /// * `key` - The key to insert or update
    /// * `value` - The value to store
    ///
    /// # Returns
    /// * `Ok(())` if the operation was successful
    /// * `Err(NitriteError)` if the operation fails
    fn put(&self, key: Key, value: Value) -> NitriteResult<()>;

    /// Atomically inserts multiple key-value pairs in a single batch operation.
    ///
    /// This is more efficient than calling `put()` multiple times as it reduces
    /// journal writes and fsync overhead for persistent backends. The operation is atomic -
    /// all entries are committed together or none at all.
    ///
    /// # Arguments
    /// * `entries` - A vector of key-value pairs to insert
    ///
    /// # Returns
    /// * `Ok(())` if all entries were successfully inserted
    /// * `Err(NitriteError)` if the operation failed
    ///
    /// # Default Implementation
    /// The default implementation calls `put()` individually for each entry.
    /// Implementations should override this for better performance.
    fn put_all(&self, entries: Vec<(Key, Value)>) -> NitriteResult<()> {
        // Default implementation: fall back to individual puts
        for (key, value) in entries {
            self.put(key, value)?;
        }
        Ok(())
    }

    /// Returns the number of entries in the map.
    ///
    /// # Returns
    /// * `Ok(count)` with the total number of key-value pairs
    /// * `Err(NitriteError)` if the operation fails
    fn size(&self) -> NitriteResult<u64>;

    /// Inserts a key-value pair only if the key does not already exist.
    ///
    /// This is an atomic operation - either the key-value pair is inserted
    /// or the operation returns the existing value.
    ///
    /// # Arguments
    /// * `key` - The key to potentially insert
    /// * `value` - The value to store if the key does not exist
    ///
    /// # Returns
    /// * `Ok(None)` if the key did not exist and was successfully inserted
    /// * `Ok(Some(existing_value))` if the key already existed
    /// * `Err(NitriteError)` if the operation fails
    fn put_if_absent(&self, key: Key, value: Value) -> NitriteResult<Option<Value>>;

    /// Returns the first (lowest) key in the map, if it exists.
    ///
    /// # Returns
    /// * `Ok(Some(key))` with the first key in sort order
    /// * `Ok(None)` if the map is empty
    /// * `Err(NitriteError)` if the operation fails
    fn first_key(&self) -> NitriteResult<Option<Key>>;

    /// Returns the last (highest) key in the map, if it exists.
    ///
    /// # Returns
    /// * `Ok(Some(key))` with the last key in sort order
    /// * `Ok(None)` if the map is empty
    /// * `Err(NitriteError)` if the operation fails
    fn last_key(&self) -> NitriteResult<Option<Key>>;

    /// Returns the least key greater than the specified key, if it exists.
    ///
    /// # Arguments
    /// * `key` - The reference key
    ///
    /// # Returns
    /// * `Ok(Some(higher_key))` if a greater key exists
    /// * `Ok(None)` if no greater key exists
    /// * `Err(NitriteError)` if the operation fails
    fn higher_key(&self, key: &Key) -> NitriteResult<Option<Key>>;

    /// Returns the least key greater than or equal to the specified key, if it exists.
    ///
    /// # Arguments
    /// * `key` - The reference key
    ///
    /// # Returns
    /// * `Ok(Some(ceiling_key))` if a key >= the given key exists
    /// * `Ok(None)` if no such key exists
    /// * `Err(NitriteError)` if the operation fails
    fn ceiling_key(&self, key: &Key) -> NitriteResult<Option<Key>>;

    /// Returns the greatest key less than the specified key, if it exists.
    ///
    /// # Arguments
    /// * `key` - The reference key
    ///
    /// # Returns
    /// * `Ok(Some(lower_key))` if a lesser key exists
    /// * `Ok(None)` if no lesser key exists
    /// * `Err(NitriteError)` if the operation fails
    fn lower_key(&self, key: &Key) -> NitriteResult<Option<Key>>;

    /// Returns the greatest key less than or equal to the specified key, if it exists.
    ///
    /// # Arguments
    /// * `key` - The reference key
    ///
    /// # Returns
    /// * `Ok(Some(floor_key))` if a key <= the given key exists
    /// * `Ok(None)` if no such key exists
    /// * `Err(NitriteError)` if the operation fails
    fn floor_key(&self, key: &Key) -> NitriteResult<Option<Key>>;

    /// Checks if the map is empty.
    ///
    /// # Returns
    /// * `Ok(true)` if the map contains no entries
    /// * `Ok(false)` if the map contains at least one entry
    /// * `Err(NitriteError)` if the operation fails
    fn is_empty(&self) -> NitriteResult<bool>;

    /// Returns a reference to the parent `NitriteStore` that owns this map.
    ///
    /// # Returns
    /// * `Ok(NitriteStore)` with the parent store
    /// * `Err(NitriteError)` if the operation fails
    fn get_store(&self) -> NitriteResult<NitriteStore>;

    /// Returns the name of this map.
    ///
    /// # Returns
    /// * `Ok(String)` with the map's identifier
    /// * `Err(NitriteError)` if the operation fails
    fn get_name(&self) -> NitriteResult<String>;

    /// Retrieves an iterator over all key-value entries in the map.
    ///
    /// The returned iterator supports bidirectional traversal using the `Iterator`
    /// and `DoubleEndedIterator` traits.
    ///
    /// # Returns
    /// * `Ok(EntryIterator)` with an iterator over all entries
    /// * `Err(NitriteError)` if the operation fails
    fn entries(&self) -> NitriteResult<EntryIterator>;

    /// Retrieves a reverse iterator over all key-value entries in the map.
    ///
    /// Iterates entries in reverse order (from last to first).
    ///
    /// # Returns
    /// * `Ok(Rev<EntryIterator>)` with a reverse iterator over all entries
    /// * `Err(NitriteError)` if the operation fails
    fn reverse_entries(&self) -> NitriteResult<Rev<EntryIterator>>;

    /// Disposes of the map's resources.
    ///
    /// This is typically called when the database is closing. Unlike `close()`,
    /// this performs cleanup and may be called even if already closed.
    ///
    /// # Returns
    /// * `Ok(())` if disposal was successful
    /// * `Err(NitriteError)` if the operation fails
    fn dispose(&self) -> NitriteResult<()>;

    /// Checks if the map has been dropped.
    ///
    /// A dropped map is no longer part of the database and should not be used.
    ///
    /// # Returns
    /// * `Ok(true)` if the map has been dropped
    /// * `Ok(false)` if the map is still valid
    /// * `Err(NitriteError)` if the operation fails
    fn is_dropped(&self) -> NitriteResult<bool>;
}

#[derive(Clone)]
pub struct NitriteMap {
    inner: Arc<dyn NitriteMapProvider>,
}

impl Deref for NitriteMap {
    type Target = Arc<dyn NitriteMapProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl NitriteMap {
    /// Creates a new `NitriteMap` wrapping a provider implementation.
    ///
    /// # Arguments
    /// * `inner` - A concrete implementation of `NitriteMapProvider`
    ///
    /// # Returns
    /// A new `NitriteMap` that dereferences to `Arc<dyn NitriteMapProvider>`
    ///
    /// # Notes
    /// - The provider is wrapped in an `Arc` for efficient, thread-safe sharing
    /// - Cloning `NitriteMap` is cheap - it only increments the reference count
    /// - The same map can be safely shared across multiple threads
    pub fn new<T: NitriteMapProvider + 'static>(inner: T) -> Self {
        NitriteMap { inner: Arc::new(inner) }
    }
}

use super::InMemoryMap;
use crate::common::{NitritePlugin, SubscriberRef, COLLECTION_CATALOG};
use crate::errors::NitriteResult;
use crate::nitrite_config::NitriteConfig;
use crate::store::memory::config::InMemoryStoreConfig;
use crate::store::{
    NitriteMap, NitriteMapProvider, NitriteStore, NitriteStoreProvider, StoreCatalog, StoreConfig,
    StoreEventInfo, StoreEventListener, StoreEvents,
};
use crate::{NitriteEventBus, NitritePluginProvider};
use dashmap::DashMap;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// In-memory implementation of a Nitrite database store.
///
/// # Purpose
/// `InMemoryStore` provides a complete in-memory database store implementation suitable for
/// testing, temporary data, and scenarios where persistence is not required. All data is stored
/// in memory using concurrent data structures for thread-safe access.
///
/// # Characteristics
/// - **Thread-Safe**: Fully concurrent with safe data sharing across threads
/// - **Event-Driven**: Publishes events for open, close, and commit operations
/// - **Registry Management**: Tracks collections and repositories
/// - **Temporary Storage**: Perfect for unit tests and temporary use cases
/// - **No Persistence**: All data is lost when the store is closed
///
/// # Usage
/// Create and initialize an in-memory store:
/// ```text
/// let store = InMemoryStore::new(InMemoryStoreConfig::new());
/// let nitrite_store = NitriteStore::new(store);
/// nitrite_store.open_or_create().unwrap();
/// let map = nitrite_store.open_map("test").unwrap();
/// map.put(key!("key1"), val!("value1")).unwrap();
/// ```
#[derive(Clone)]
pub struct InMemoryStore {
    inner: Arc<InMemoryStoreInner>,
}

impl InMemoryStore {
    /// Creates a new in-memory store with the specified configuration.
    ///
    /// # Arguments
    /// * `store_config` - Configuration for the store including event listeners
    ///
    /// # Returns
    /// A new `InMemoryStore` instance
    pub fn new(store_config: InMemoryStoreConfig) -> InMemoryStore {
        InMemoryStore {
            inner: Arc::new(InMemoryStoreInner::new(store_config)),
        }
    }
}

impl NitritePluginProvider for InMemoryStore {
    fn initialize(&self, config: NitriteConfig) -> NitriteResult<()> {
        self.inner.initialize(config)
    }

    fn close(&self) -> NitriteResult<()> {
        self.inner.close()
    }

    fn as_plugin(&self) -> NitritePlugin {
        NitritePlugin::new(self.clone())
    }
}

impl NitriteStoreProvider for InMemoryStore {
    fn open_or_create(&self) -> NitriteResult<()> {
        self.inner.open_or_create()
    }

    fn is_closed(&self) -> NitriteResult<bool> {
        self.inner.is_closed()
    }

    fn get_collection_names(&self) -> NitriteResult<HashSet<String>> {
        let catalog = self.store_catalog()?;
        let collection_names = catalog.get_collection_names()?;
        Ok(collection_names)
    }

    fn get_repository_registry(&self) -> NitriteResult<HashSet<String>> {
        let catalog = self.store_catalog()?;
        let repository_registry = catalog.get_repository_names()?;
        Ok(repository_registry)
    }

    fn get_keyed_repository_registry(&self) -> NitriteResult<HashMap<String, HashSet<String>>> {
        let catalog = self.store_catalog()?;
        let keyed_repository_registry = catalog.get_keyed_repository_names()?;
        Ok(keyed_repository_registry)
    }

    fn has_unsaved_changes(&self) -> NitriteResult<bool> {
        Ok(false)
    }

    fn is_read_only(&self) -> NitriteResult<bool> {
        Ok(false)
    }

    fn is_map_opened(&self, name: &str) -> NitriteResult<bool> {
        self.inner.has_map(name)
    }

    fn commit(&self) -> NitriteResult<()> {
        self.inner.commit()
    }

    fn compact(&self) -> NitriteResult<()> {
        Ok(())
    }

    fn before_close(&self) -> NitriteResult<()> {
        self.inner.before_close()
    }

    fn has_map(&self, name: &str) -> NitriteResult<bool> {
        self.inner.has_map(name)
    }

    fn open_map(&self, name: &str) -> NitriteResult<NitriteMap> {
        self.inner.open_map(name, self.clone())
    }

    fn close_map(&self, name: &str) -> NitriteResult<()> {
        self.inner.close_map(name)?;

        let catalog = self.store_catalog()?;
        catalog.remove(name)?;
        Ok(())
    }

    fn remove_map(&self, name: &str) -> NitriteResult<()> {
        self.close_map(name)
    }

    fn subscribe(&self, listener: StoreEventListener) -> NitriteResult<Option<SubscriberRef>> {
        self.inner.subscribe(listener)
    }

    fn unsubscribe(&self, subscriber_ref: SubscriberRef) -> NitriteResult<()> {
        self.inner.unsubscribe(subscriber_ref)
    }

    fn store_version(&self) -> NitriteResult<String> {
        self.inner.get_store_version()
    }

    fn store_config(&self) -> NitriteResult<StoreConfig> {
        self.inner.store_config()
    }

    fn store_catalog(&self) -> NitriteResult<StoreCatalog> {
        self.inner.store_catalog(self.clone())
    }
}

struct InMemoryStoreInner {
    closed: AtomicBool,
    event_bus: NitriteEventBus<StoreEventInfo, StoreEventListener>,
    store_config: InMemoryStoreConfig,
    nitrite_config: OnceLock<NitriteConfig>,
    map_registry: DashMap<String, InMemoryMap>,
}

impl InMemoryStoreInner {
    pub(crate) fn new(store_config: InMemoryStoreConfig) -> InMemoryStoreInner {
        InMemoryStoreInner {
            closed: AtomicBool::from(false),
            event_bus: NitriteEventBus::new(),
            store_config,
            nitrite_config: OnceLock::new(),
            map_registry: DashMap::new(),
        }
    }

    fn initialize(&self, config: NitriteConfig) -> NitriteResult<()> {
        self.nitrite_config.get_or_init(|| config.clone());
        Ok(())
    }

    pub(crate) fn alert(&self, event: StoreEvents) -> NitriteResult<()> {
        if !self.event_bus.has_listeners() {
            return Ok(());
        }

        if let Some(config) = self.nitrite_config.get() {
            let event_info = StoreEventInfo::new(event, config.clone());
            self.event_bus.publish(event_info)
        } else {
            Ok(())
        }
    }

    pub(crate) fn store_catalog(&self, store: InMemoryStore) -> NitriteResult<StoreCatalog> {
        let nitrite_store = NitriteStore::new(store);
        let catalog_map = nitrite_store.open_map(COLLECTION_CATALOG)?;
        StoreCatalog::new(catalog_map)
    }

    pub(crate) fn close(&self) -> NitriteResult<()> {
        if self.closed.load(Ordering::Relaxed) {
            return Ok(());
        }

        self.before_close()?;

        // Close maps using std::thread::scope - avoids global thread pool contention
        {
            let maps: Vec<_> = self.map_registry.iter()
                .map(|r| r.value().clone())
                .collect();

            // Use std::thread::scope for predictable parallelism without global state
            std::thread::scope(|s| {
                for map in maps {
                    s.spawn(move || {
                        let _ = map.close();
                    });
                }
            });
        }

    
        self.map_registry.clear();
        self.closed.store(true, Ordering::Relaxed);
        self.event_bus.close()?;

        Ok(())
    }

    pub(crate) fn open_or_create(&self) -> NitriteResult<()> {
        let listeners = self.store_config.event_listeners();
        for listener in listeners {
            self.event_bus.register(listener)?;
        }
        self.alert(StoreEvents::Open)?;
        Ok(())
    }

    pub(crate) fn is_closed(&self) -> NitriteResult<bool> {
        Ok(self.closed.load(Ordering::Relaxed))
    }

    pub(crate) fn commit(&self) -> NitriteResult<()> {
        self.alert(StoreEvents::Commit)
    }

    pub(crate) fn before_close(&self) -> NitriteResult<()> {
        self.alert(StoreEvents::Closing)
    }

    pub(crate) fn has_map(&self, name: &str) -> NitriteResult<bool> {
        Ok(self.map_registry.contains_key(name))
    }

    pub(crate) fn open_map(&self, name: &str, store: InMemoryStore) -> NitriteResult<NitriteMap> {
        match self.map_registry.entry(name.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(entry) => {
                let map = entry.get();
                if map.is_closed()? {
                    // Drop the entry reference to avoid deadlock
                    drop(entry);

                    // Now we can remove and recreate
                    self.map_registry.remove(name);
                    let map = InMemoryMap::new(name, NitriteStore::new(store));
                    self.map_registry.insert(name.to_string(), map.clone());
                    Ok(NitriteMap::new(map))
                } else {
                    // If the map is not closed, return it
                    return Ok(NitriteMap::new(map.clone()));
                }
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                // Create new map without prior checks
                let map = InMemoryMap::new(name, NitriteStore::new(store));
                entry.insert(map.clone());
                Ok(NitriteMap::new(map))
            }
        }
    }

    pub(crate) fn close_map(&self, name: &str) -> NitriteResult<()> {
        // Use idiomatic Rust pattern matching
        // DashMap::remove() returns Option<(K, V)>
        if let Some((_key, map)) = self.map_registry.remove(name) {
            // Explicitly drop to ensure cleanup semantics
            drop(map);
        }
        Ok(())
    }

    pub(crate) fn subscribe(&self, listener: StoreEventListener) -> NitriteResult<Option<SubscriberRef>> {
        self.event_bus.register(listener)
    }

    pub(crate) fn unsubscribe(&self, subscriber_ref: SubscriberRef) -> NitriteResult<()> {
        self.event_bus.deregister(subscriber_ref)
    }

    pub(crate) fn get_store_version(&self) -> NitriteResult<String> {
        Ok(format!("InMemory/{}", env!("CARGO_PKG_VERSION")))
    }

    pub(crate) fn store_config(&self) -> NitriteResult<StoreConfig> {
        Ok(StoreConfig::new(self.store_config.clone()))
    }
}

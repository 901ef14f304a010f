use crate::config::FjallConfig;
use crate::map::FjallMap;
use crate::version::fjall_version;
use crate::wrapper::to_nitrite_error;
use crossbeam::sync::WaitGroup;
use dashmap::DashMap;
use fjall::{GarbageCollection, Keyspace, PersistMode};
use nitrite::common::{
    async_task, NitriteEventBus, NitritePlugin, NitritePluginProvider, SubscriberRef,
    COLLECTION_CATALOG,
};
use nitrite::errors::{ErrorKind, NitriteError, NitriteResult};
use nitrite::nitrite_config::NitriteConfig;
use nitrite::store::{
    NitriteMap, NitriteMapProvider, NitriteStore, NitriteStoreProvider, StoreCatalog, StoreConfig,
    StoreEventInfo, StoreEventListener, StoreEvents,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, OnceLock};

#[derive(Clone)]
/// Fjall-based store implementation.
///
/// A persistent, thread-safe key-value store backend using Fjall LSM engine.
/// Uses PIMPL pattern with `Arc<FjallStoreInner>` for efficient cloning and shared ownership.
/// Implements NitriteStoreProvider for integration with Nitrite's data store abstraction.
///
/// Purpose: Provides durable, ACID-compliant storage with multiple isolated maps
/// (collections, indexes) managed within a single Keyspace.
///
/// Characteristics:
/// - Thread-safe (Arc-based, cloneable across threads)
/// - Persistent (backed by Fjall LSM engine on disk)
/// - Multi-map (supports isolated partitions per collection/index)
/// - Event-driven (emits store lifecycle events)
/// - Lazy initialization (keyspace created on demand)
/// - Garbage collection (automatic compaction and cleanup)
/// - Trait delegation (no Deref, explicit method forwarding)
///
/// Usage: Created via FjallStore::new(config), used by NitriteBuilder to initialize
/// database storage. Provides open_map() to create isolated maps for collections and indexes.
pub struct FjallStore {
    inner: Arc<FjallStoreInner>,
}

impl FjallStore {
    /// Creates a new FjallStore with the given configuration.
    ///
    /// Arguments:
    /// - `config`: Fjall configuration parameters
    ///
    /// Returns: A new `FjallStore` instance (keyspace not yet initialized)
    #[inline]
    pub fn new(config: FjallConfig) -> FjallStore {
        FjallStore {
            inner: Arc::new(FjallStoreInner::new(config)),
        }
    }

    /// Encodes a map name to make it safe for Fjall partition names.
    /// 
    /// Fjall does not support certain characters in partition names (e.g., pipe `|`).
    /// This method uses efficient character substitution instead of base64 encoding:
    /// - `_X_` → `_XX_` (escape existing markers)
    /// - `_P_` → `_XP_` (escape existing pipe marker)
    /// - `_K_` → `_XK_` (escape existing key marker)
    /// - `|` → `_P_` (pipe - internal name separator)
    /// - `+` → `_K_` (plus - keyed repository separator)
    /// 
    /// Fjall partition names only allow: a-zA-Z0-9_-.#$
    /// This encoding uses only alphanumerics and underscores for maximum compatibility.
    #[inline]
    pub(crate) fn encode_name(name: &str) -> String {
        // Fast path: if no special characters that need encoding, return as-is
        if !name.contains('|') && !name.contains('+') 
            && !name.contains("_X_") && !name.contains("_P_") && !name.contains("_K_") {
            return name.to_string();
        }
        
        // First escape our marker sequences, then encode special characters
        name.replace("_X_", "_XX_")
            .replace("_P_", "_XP_")
            .replace("_K_", "_XK_")
            .replace('|', "_P_")
            .replace('+', "_K_")
    }

    /// Decodes a Fjall partition name back to the original map name.
    /// 
    /// Reverses the encoding performed by `encode_name`.
    #[inline]
    pub(crate) fn decode_name(name: &str) -> String {
        // Fast path: if no encoded sequences, return as-is
        if !name.contains("_P_") && !name.contains("_K_") && !name.contains("_X") {
            return name.to_string();
        }
        
        // Reverse the encoding: FIRST unescape markers, THEN restore special chars
        // Order is critical: _XP_ must become _P_ before _P_ becomes |
        name.replace("_XX_", "\x00X\x00")  // Temporarily escape _X_ markers
            .replace("_XP_", "\x00P\x00")  // Temporarily escape _P_ markers
            .replace("_XK_", "\x00K\x00")  // Temporarily escape _K_ markers
            .replace("_P_", "|")           // Restore pipes
            .replace("_K_", "+")           // Restore plus
            .replace("\x00X\x00", "_X_")   // Restore _X_ markers
            .replace("\x00P\x00", "_P_")   // Restore _P_ markers
            .replace("\x00K\x00", "_K_")   // Restore _K_ markers
    }

    /// Returns a clone of the Keyspace if it's initialized, or None if not.
    /// This is used internally for batch operations that require keyspace access.
    #[inline]
    pub(crate) fn keyspace(&self) -> Option<Keyspace> {
        self.inner.keyspace.get().cloned()
    }
}

impl NitritePluginProvider for FjallStore {
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

impl NitriteStoreProvider for FjallStore {
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
        self.inner.has_unsaved_changes()
    }

    fn is_read_only(&self) -> NitriteResult<bool> {
        Ok(false)
    }

    fn is_map_opened(&self, name: &str) -> NitriteResult<bool> {
        let name = FjallStore::encode_name(name);
        self.inner.is_map_opened(&name)
    }

    fn commit(&self) -> NitriteResult<()> {
        self.inner.commit()
    }

    fn compact(&self) -> NitriteResult<()> {
        self.inner.compact()
    }

    fn before_close(&self) -> NitriteResult<()> {
        self.inner.before_close()
    }

    fn has_map(&self, name: &str) -> NitriteResult<bool> {
        let name = FjallStore::encode_name(name);
        self.inner.has_map(&name)
    }

    fn open_map(&self, name: &str) -> NitriteResult<NitriteMap> {
        let name = FjallStore::encode_name(name);
        self.inner.open_map(&name, self.clone())
    }

    fn close_map(&self, name: &str) -> NitriteResult<()> {
        let name = FjallStore::encode_name(name);
        self.inner.close_map(&name)
    }

    fn remove_map(&self, name: &str) -> NitriteResult<()> {
        let name = FjallStore::encode_name(name);
        self.inner.remove_map(&name)
    }

    fn subscribe(&self, listener: StoreEventListener) -> NitriteResult<Option<SubscriberRef>> {
        self.inner.subscribe(listener)
    }

    fn unsubscribe(&self, subscriber_ref: SubscriberRef) -> NitriteResult<()> {
        self.inner.unsubscribe(subscriber_ref)
    }

    fn store_version(&self) -> NitriteResult<String> {
        self.inner.store_version()
    }

    fn store_config(&self) -> NitriteResult<StoreConfig> {
        self.inner.store_config()
    }

    fn store_catalog(&self) -> NitriteResult<StoreCatalog> {
        self.inner.store_catalog(self.clone())
    }
}

struct FjallStoreInner {
    keyspace: OnceLock<Keyspace>,
    closed: AtomicBool,
    event_bus: NitriteEventBus<StoreEventInfo, StoreEventListener>,
    store_config: FjallConfig,
    nitrite_config: OnceLock<NitriteConfig>,
    map_registry: DashMap<String, FjallMap>,
}

impl FjallStoreInner {
    fn new(config: FjallConfig) -> FjallStoreInner {
        FjallStoreInner {
            keyspace: OnceLock::new(),
            closed: AtomicBool::new(false),
            event_bus: NitriteEventBus::new(),
            store_config: config,
            nitrite_config: OnceLock::new(),
            map_registry: DashMap::new(),
        }
    }

    /// Helper function to check if an error indicates a partition was deleted
    #[inline]
    fn is_partition_deleted_error(err_msg: &str) -> bool {
        err_msg.contains("not found") || err_msg.contains("deleted") || err_msg.contains("PartitionDeleted")
    }

    fn initialize(&self, config: NitriteConfig) -> NitriteResult<()> {
        // get_or_init() always returns a reference to the initialized value (or initial value if already initialized)
        // The None case in pattern matching below is unreachable after get_or_init() completes successfully
        let cfg = self.nitrite_config.get_or_init(|| config);
        let path = self.store_config.db_path();
        cfg.set_db_path(path)?;
        Ok(())
    }

    fn close(&self) -> NitriteResult<()> {
        self.before_close()?;

        let temp_registry = self.map_registry.clone();
        for map in temp_registry.iter() {
            map.close()?;
        }

        temp_registry.clear();
        self.map_registry.clear();
        self.closed
            .store(true, std::sync::atomic::Ordering::Relaxed);
        self.event_bus.close()?;
        Ok(())
    }

    fn open_or_create(&self) -> NitriteResult<()> {
        let config = self.store_config.keyspace_config();
        let result = Keyspace::open(config);
        match result {
            Ok(keyspace) => {
                self.keyspace.get_or_init(|| keyspace);
                Ok(())
            }
            Err(err) => {
                log::error!("Failed to open or create keyspace: {}", err);
                Err(to_nitrite_error(err))
            }
        }
    }

    #[inline]
    fn is_closed(&self) -> NitriteResult<bool> {
        Ok(self.closed.load(std::sync::atomic::Ordering::Relaxed))
    }

    fn has_unsaved_changes(&self) -> NitriteResult<bool> {
        if let Some(ks) = self.keyspace.get() {
            let uncommitted = ks.write_buffer_size();
            Ok(uncommitted > 0)
        } else {
            Ok(false)
        }
    }

    #[inline]
    fn is_map_opened(&self, name: &str) -> NitriteResult<bool> {
        if let Some(map) = self.map_registry.get(name) {
            return Ok(!map.is_closed()?);
        }
        Ok(false)
    }

    fn commit(&self) -> NitriteResult<()> {
        if let Some(ks) = self.keyspace.get() {
            match ks.persist(PersistMode::SyncAll) {
                Ok(_) => Ok(()),
                Err(err) => {
                    log::error!("Failed to commit keyspace: {}", err);
                    Err(to_nitrite_error(err))
                }
            }
        } else {
            Ok(())
        }
    }

    fn compact(&self) -> NitriteResult<()> {
        if let Some(ks) = self.keyspace.get() {
            let partitions = ks.list_partitions();
            let maps: Vec<&str> = partitions
                .iter()
                .map(|partition| partition.trim())
                .collect();
            let wait_group = WaitGroup::new();

            for map in maps {
                let cloned_keyspace = ks.clone();
                let cloned_options = self.store_config.partition_config().clone();
                let space_amp_factor = self.store_config.space_amp_factor();
                let stale_threshold = self.store_config.staleness_threshold();
                let cloned_map = map.to_string();
                let cloned_wait_group = wait_group.clone();

                async_task(move || {
                    let partition = cloned_keyspace.open_partition(&cloned_map, cloned_options);
                    match partition {
                        Ok(partition) => {
                            let result = partition.gc_scan();
                            if let Err(err) = result {
                                log::error!("Failed to compact partition: {}", err);
                                return;
                            }

                            let result = partition.gc_with_space_amp_target(space_amp_factor);
                            if let Err(err) = result {
                                log::error!("Failed to compact partition: {}", err);
                                return;
                            }

                            let result = partition.gc_with_staleness_threshold(stale_threshold);
                            if let Err(err) = result {
                                log::error!("Failed to compact partition: {}", err);
                                return;
                            }
                        }
                        Err(err) => {
                            log::error!("Failed to open partition: {}", err);
                            return;
                        }
                    }
                    drop(cloned_wait_group);
                });
            }

            wait_group.wait();
            Ok(())
        } else {
            Ok(())
        }
    }

    fn before_close(&self) -> NitriteResult<()> {
        self.alert(StoreEvents::Closing)
    }

    #[inline]
    fn has_map(&self, name: &str) -> NitriteResult<bool> {
        if let Some(ks) = self.keyspace.get() {
            let result = ks.partition_exists(name);
            Ok(result)
        } else {
            Ok(false)
        }
    }

    fn open_map(&self, name: &str, fjall_store: FjallStore) -> NitriteResult<NitriteMap> {
        let mut closed = false;
        if let Some(map) = self.map_registry.get(name) {
            if map.is_closed()? {
                // can't remove the map here as it will cause deadlock
                closed = true;
            } else {
                return Ok(NitriteMap::new(map.clone()));
            }
        }

        // remove the map from registry if it is closed
        if closed {
            self.map_registry.remove(name);
        }

        if let Some(ks) = self.keyspace.get() {
            match ks.open_partition(name, self.store_config.partition_config()) {
                Ok(partition) => {
                    let fjall_map = FjallMap::new(
                        name.to_string(),
                        partition,
                        fjall_store,
                        self.store_config.clone(),
                    );
                    fjall_map.initialize()?;

                    self.map_registry
                        .insert(name.to_string(), fjall_map.clone());
                    Ok(NitriteMap::new(fjall_map))
                }
                Err(err) => {
                    // If partition was deleted, remove from cache and propagate error
                    let err_msg = err.to_string();
                    if Self::is_partition_deleted_error(&err_msg) {
                        self.map_registry.remove(name);
                    }
                    log::error!("Failed to open partition: {}", err);
                    Err(to_nitrite_error(err))
                }
            }
        } else {
            Err(NitriteError::new(
                "Keyspace is not initialized",
                ErrorKind::PluginError,
            ))
        }
    }

    fn close_map(&self, name: &str) -> NitriteResult<()> {
        let result = self.map_registry.remove(name);
        if result.is_some() {
            if let Some((_, map)) = result { drop(map) }
        }
        Ok(())
    }

    fn remove_map(&self, name: &str) -> NitriteResult<()> {
        // close the map if it is open to drop any partition handles holding by the map
        self.close_map(name)?;
        
        if let Some(ks) = self.keyspace.get() {
            let options = self.store_config.partition_config();
            match ks.open_partition(name, options) {
                Ok(partition) => {
                    match ks.delete_partition(partition.clone()) {
                        Ok(_) => {
                            // Ensure the map is removed from registry after successful deletion
                            // This is defensive in case the map was re-opened between close_map and here
                            self.map_registry.remove(name);
                            Ok(())
                        }
                        Err(err) => {
                            log::error!("Failed to remove partition: {}", err);
                            Err(to_nitrite_error(err))
                        }
                    }
                }
                Err(err) => {
                    // If partition doesn't exist, it might already be deleted
                    // This is acceptable - just ensure it's removed from registry
                    let err_msg = err.to_string();
                    if Self::is_partition_deleted_error(&err_msg) {
                        self.map_registry.remove(name);
                        Ok(())
                    } else {
                        log::error!("Failed to open partition for removal: {}", err);
                        Err(to_nitrite_error(err))
                    }
                }
            }
        } else {
            Ok(())
        }
    }

    fn subscribe(&self, listener: StoreEventListener) -> NitriteResult<Option<SubscriberRef>> {
        self.event_bus.register(listener)
    }

    fn unsubscribe(&self, subscriber_ref: SubscriberRef) -> NitriteResult<()> {
        self.event_bus.deregister(subscriber_ref)
    }

    fn store_version(&self) -> NitriteResult<String> {
        match fjall_version() {
            Ok(version) => Ok(format!("Fjall/{}", version)),
            Err(e) => Err(NitriteError::new(
                &format!("Failed to determine Fjall version: {}", e),
                ErrorKind::PluginError,
            )),
        }
    }

    fn store_config(&self) -> NitriteResult<StoreConfig> {
        Ok(StoreConfig::new(self.store_config.clone()))
    }

    fn store_catalog(&self, fjall_store: FjallStore) -> NitriteResult<StoreCatalog> {
        let nitrite_store = NitriteStore::new(fjall_store);
        let catalog_map = nitrite_store.open_map(COLLECTION_CATALOG)?;
        StoreCatalog::new(catalog_map)
    }

    fn alert(&self, event: StoreEvents) -> NitriteResult<()> {
        let option = self.nitrite_config.get();
        if let Some(config) = option {
            let event_info = StoreEventInfo::new(event, config.clone());
            self.event_bus.publish(event_info)
        } else {
            Ok(())
        }
    }
}

impl Drop for FjallStoreInner {
    fn drop(&mut self) {
        if self.store_config.commit_before_close() {
            match self.commit() {
                Ok(_) => {
                    log::debug!("Successfully committed keyspace during drop");
                }
                Err(e) => {
                    // Use if let pattern to avoid unwrap in Drop impl
                    // Drop should never panic - always log errors gracefully
                    log::error!("Failed to commit keyspace: {}", e);
                }
            }
        }
    }
}

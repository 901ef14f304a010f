use crate::common::{NitriteModule, NitritePlugin, PluginRegistrar, PluginRegistrarProvider};
use crate::errors::NitriteResult;
use crate::store::memory::{InMemoryStore, InMemoryStoreConfig};
use crate::store::{NitriteStore, StoreConfigProvider, StoreEventListener, StoreModule};
use crate::NitritePluginProvider;

#[derive(Default)]
pub struct InMemoryStoreModule {
    store_config: InMemoryStoreConfig,
}

impl InMemoryStoreModule {
    pub fn new() -> InMemoryStoreModule {
        InMemoryStoreModule {
            store_config: InMemoryStoreConfig::new(),
        }
    }

    pub fn with_config() -> InMemoryStoreModuleBuilder {
        InMemoryStoreModuleBuilder::new()
    }
}

impl NitriteModule for InMemoryStoreModule {
    fn plugins(&self) -> NitriteResult<Vec<NitritePlugin>> {
        let store = self.get_store()?;
        let plugin = store.as_plugin();
        Ok(vec![plugin])
    }

    fn load(&self, plugin_registrar: &PluginRegistrar) -> NitriteResult<()> {
        let store = self.get_store()?;
        plugin_registrar.register_store_plugin(store)
    }
}

impl StoreModule for InMemoryStoreModule {
    fn get_store(&self) -> NitriteResult<NitriteStore> {
        let store = InMemoryStore::new(self.store_config.clone());
        Ok(NitriteStore::new(store))
    }
}

#[derive(Default)]
pub struct InMemoryStoreModuleBuilder {
    store_config: InMemoryStoreConfig,
    event_listeners: Vec<StoreEventListener>,
}

impl InMemoryStoreModuleBuilder {
    pub fn new() -> InMemoryStoreModuleBuilder {
        InMemoryStoreModuleBuilder {
            store_config: InMemoryStoreConfig::new(),
            event_listeners: Vec::new(),
        }
    }

    pub fn add_event_listener(mut self, listener: StoreEventListener) -> Self {
        self.event_listeners.push(listener);
        self
    }

    pub fn build(self) -> InMemoryStoreModule {
        let mut store_module = InMemoryStoreModule::new();
        store_module.store_config = self.store_config;
        for listener in self.event_listeners {
            store_module.store_config.add_store_listener(listener);
        }
        store_module
    }
}

use super::{
    find_optimizer::FindOptimizer, index_operations::IndexOperations,
    index_writer::DocumentIndexWriter, read_operations::ReadOperations,
    write_operations::WriteOperations, write_result::WriteResult,
};
use crate::{
    collection::{
        CollectionEventInfo, CollectionEventListener, Document, FindOptions, NitriteId, UpdateOptions,
    },
    errors::NitriteResult,
    filter::Filter,
    index::IndexDescriptor,
    nitrite_config::NitriteConfig,
    store::{NitriteMap, NitriteMapProvider, NitriteStoreProvider},
    AttributeAware, Attributes, DocumentCursor, Fields, NitriteEventBus, Processor, ProcessorChain,
    SubscriberRef,
};
use std::sync::Arc;
use std::{borrow::Cow, ops::Deref};


pub(crate) struct CollectionOperations {
    nitrite_map: NitriteMap,
    event_bus: NitriteEventBus<CollectionEventInfo, CollectionEventListener>,
    processor_chain: ProcessorChain,
    index_operations: IndexOperations,
    write_operations: WriteOperations,
    read_operations: ReadOperations,
}

impl CollectionOperations {
    pub fn new(
        collection_name: &str,
        nitrite_map: NitriteMap,
        nitrite_config: NitriteConfig,
        event_bus: NitriteEventBus<CollectionEventInfo, CollectionEventListener>,
    ) -> NitriteResult<Self> {
        let processor_chain = ProcessorChain::new();

        let collection_name_cow = Cow::from(collection_name);

        let find_optimizer = FindOptimizer::new();

        let index_operations = IndexOperations::new(
            collection_name_cow.to_string(),
            nitrite_config.clone(),
            nitrite_map.clone(),
            find_optimizer.clone(),
            event_bus.clone(),
        )?;

        let read_operations = ReadOperations::new(
            collection_name_cow.into_owned(),
            index_operations.clone(),
            nitrite_config.clone(),
            nitrite_map.clone(),
            find_optimizer,
            processor_chain.clone(),
        );

        let index_writer =
            DocumentIndexWriter::new(nitrite_config.clone(), index_operations.clone());

        let write_operations = WriteOperations::new(
            index_writer.clone(),
            read_operations.clone(),
            event_bus.clone(),
            nitrite_map.clone(),
            processor_chain.clone(),
        );

        Ok(Self {
            nitrite_map,
            event_bus,
            processor_chain,
            index_operations,
            write_operations,
            read_operations,
        })
    }

    pub fn subscribe(&self, handler: CollectionEventListener) -> NitriteResult<Option<SubscriberRef>> {
        self.event_bus.register(handler)
    }

    pub fn unsubscribe(&self, subscriber: SubscriberRef) -> NitriteResult<()> {
        self.event_bus.deregister(subscriber)
    }

    pub fn add_processor(&self, processor: Processor) {
        self.processor_chain.add_processor(processor);
    }

    pub fn create_index(&self, fields: &Fields, index_type: &str) -> NitriteResult<()> {
        self.index_operations.create_index(fields, index_type)
    }

    pub fn find_index(&self, fields: &Fields) -> NitriteResult<Option<IndexDescriptor>> {
        self.index_operations.find_index_descriptor(fields)
    }

    pub fn rebuild_index(&self, index_descriptor: &IndexDescriptor) -> NitriteResult<()> {
        self.index_operations.build_index(index_descriptor, true)
    }

    pub fn list_indexes(&self) -> NitriteResult<Vec<IndexDescriptor>> {
        self.index_operations.list_indexes()
    }

    pub fn has_index(&self, fields: &Fields) -> NitriteResult<bool> {
        self.index_operations.has_index_entry(fields)
    }

    pub fn is_indexing(&self, fields: &Fields) -> NitriteResult<bool> {
        self.index_operations.is_indexing(fields)
    }

    pub fn drop_index(&self, fields: &Fields) -> NitriteResult<()> {
        self.index_operations.drop_index(fields)
    }

    pub fn drop_all_indexes(&self) -> NitriteResult<()> {
        self.index_operations.drop_all_indexes()
    }

    pub fn insert(&self, document: Document) -> NitriteResult<WriteResult> {
        self.write_operations.insert(document)
    }

    pub fn insert_batch(&self, documents: Vec<Document>) -> NitriteResult<WriteResult> {
        self.write_operations.insert_batch(documents)
    }

    pub fn update(
        &self,
        filter: Filter,
        update: &Document,
        update_options: &UpdateOptions,
    ) -> NitriteResult<WriteResult> {
        self.write_operations.update(filter, update, update_options)
    }

    /// Updates a document directly by its NitriteId without filter-based lookup.
    /// This is an O(1) operation as it directly accesses the document by its key.
    pub fn update_by_id(
        &self,
        id: &NitriteId,
        update: &Document,
        insert_if_absent: bool,
    ) -> NitriteResult<WriteResult> {
        self.write_operations.update_by_id(id, update, insert_if_absent)
    }

    pub fn remove(&self, filter: Filter, just_once: bool) -> NitriteResult<WriteResult> {
        self.write_operations.remove(filter, just_once)
    }

    pub fn remove_document(&self, document: &Document) -> NitriteResult<WriteResult> {
        self.write_operations.remove_document(document)
    }

    pub fn find(
        &self,
        filter: Filter,
        find_options: &FindOptions,
    ) -> NitriteResult<DocumentCursor> {
        self.read_operations.find(filter, find_options)
    }

    pub fn get_by_id(&self, id: &NitriteId) -> NitriteResult<Option<Document>> {
        self.read_operations.get_by_id(id)
    }

    pub fn dispose(&self) -> NitriteResult<()> {
        self.index_operations.dispose_all_indexes()?;
        self.dispose_nitrite_map()?;
        self.event_bus.close()?;
        Ok(())
    }

    pub fn size(&self) -> NitriteResult<u64> {
        self.nitrite_map.size()
    }

    pub fn attributes(&self) -> NitriteResult<Option<Attributes>> {
        self.nitrite_map.attributes()
    }

    pub fn set_attributes(&self, attributes: Attributes) -> NitriteResult<()> {
        self.nitrite_map.set_attributes(attributes)
    }

    pub fn close(&self) -> NitriteResult<()> {
        self.index_operations.close()?;
        self.nitrite_map.close()?;
        self.event_bus.close()?;
        Ok(())
    }

    pub fn clear(&self) -> NitriteResult<()> {
        self.index_operations.clear()?;
        self.nitrite_map.clear()
    }

    fn dispose_nitrite_map(&self) -> NitriteResult<()> {
        let store = self.nitrite_map.get_store()?;
        let catalog = store.store_catalog()?;
        catalog.remove(self.nitrite_map.get_name()?.as_str())?;
        self.nitrite_map.dispose()
    }
}

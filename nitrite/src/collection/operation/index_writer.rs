use super::index_operations::IndexOperations;
use crate::{
    collection::Document,
    errors::NitriteResult,
    get_document_values,
    index::{IndexDescriptor, NitriteIndexer, NitriteIndexerProvider},
    is_affected_by_update,
    nitrite_config::NitriteConfig,
};
use std::sync::Arc;
use std::collections::HashMap;


#[derive(Clone)]
pub(crate) struct DocumentIndexWriter {
    /// Arc-wrapped internal implementation
    inner: Arc<DocumentIndexWriterInner>,
}

impl DocumentIndexWriter {
    /// Creates a new DocumentIndexWriter.
    ///
    /// # Arguments
    /// * `nitrite_config` - The Nitrite database configuration
    /// * `index_operation` - The index operations manager for the collection
    pub fn new(nitrite_config: NitriteConfig, index_operation: IndexOperations) -> Self {
        let inner = DocumentIndexWriterInner::new(nitrite_config, index_operation);
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Gets the Nitrite configuration used by this writer.
    pub fn nitrite_config(&self) -> NitriteConfig {
        self.inner.nitrite_config.clone()
    }

    /// Gets the index operations manager for this writer.
    pub fn index_operation(&self) -> IndexOperations {
        self.inner.index_operation.clone()
    }

    /// Writes index entries for the given document.
    ///
    /// This method is called when a document is inserted. It ensures that all relevant
    /// indexes are updated with the new document's field values.
    ///
    /// # Arguments
    /// * `document` - The document to write to indexes
    ///
    /// # Errors
    /// Returns an error if any index update fails
    pub fn write_index_entry(&self, document: &mut Document) -> NitriteResult<()> {
        self.inner.write_index_entry(document)
    }

    /// Removes index entries for the given document.
    ///
    /// This method is called when a document is deleted. It ensures that all relevant
    /// indexes are updated by removing the document's field values.
    ///
    /// # Arguments
    /// * `document` - The document to remove from indexes
    ///
    /// # Errors
    /// Returns an error if any index update fails
    pub fn remove_index_entry(&self, document: &mut Document) -> NitriteResult<()> {
        self.inner.remove_index_entry(document)
    }

    /// Updates index entries for a modified document.
    ///
    /// This method is called when a document is updated. It only updates indexes affected
    /// by the changed fields, improving performance for partial updates.
    ///
    /// # Arguments
    /// * `old_document` - The document before the update
    /// * `new_document` - The document after the update
    /// * `updated_fields` - The fields that were modified
    ///
    /// # Errors
    /// Returns an error if any index update fails
    pub fn update_index_entry(
        &self,
        old_document: &mut Document,
        new_document: &mut Document,
        updated_fields: &Document,
    ) -> NitriteResult<()> {
        self.inner.update_index_entry(old_document, new_document, updated_fields)
    }
}

/// The internal implementation of DocumentIndexWriter.
///
/// This struct contains all the actual state and logic for writing index entries.
/// It is not directly accessible from outside the crate - all access goes through
/// the public `DocumentIndexWriter` interface.
pub struct DocumentIndexWriterInner {
    nitrite_config: NitriteConfig,
    index_operation: IndexOperations,
}

impl DocumentIndexWriterInner {
    fn new(nitrite_config: NitriteConfig, index_operation: IndexOperations) -> Self {
        Self {
            nitrite_config: nitrite_config.clone(),
            index_operation: index_operation.clone(),
        }
    }

    pub fn write_index_entry(&self, document: &mut Document) -> NitriteResult<()> {
        let index_entries = self.index_operation.list_indexes()?;
        self.process_index_entries(index_entries, document, |this, desc, doc, indexer| {
            this.write_index_entry_internal(desc, doc, indexer)
        })
    }

    pub fn remove_index_entry(&self, document: &mut Document) -> NitriteResult<()> {
        let index_entries = self.index_operation.list_indexes()?;
        self.process_index_entries(index_entries, document, |this, desc, doc, indexer| {
            this.remove_index_entry_internal(desc, doc, indexer)
        })
    }

    fn process_index_entries<F>(
        &self,
        index_entries: Vec<IndexDescriptor>,
        document: &mut Document,
        mut operation: F,
    ) -> NitriteResult<()>
    where
        F: FnMut(&Self, &IndexDescriptor, &mut Document, &mut NitriteIndexer) -> NitriteResult<()>,
    {
        let mut indexer_cache = HashMap::new();

        for index_descriptor in index_entries {
            let index_type = index_descriptor.index_type();
            let indexer = indexer_cache
                .entry(index_type.clone())
                .or_insert_with(|| self.nitrite_config.find_indexer(&index_type))
                .as_mut()
                .map_err(|e| e.clone())?;

            operation(self, &index_descriptor, document, indexer)?;
        }
        Ok(())
    }

    pub fn update_index_entry(
        &self,
        old_document: &mut Document,
        new_document: &mut Document,
        updated_fields: &Document,
    ) -> NitriteResult<()> {
        let index_entries = self.index_operation.list_indexes()?;
        for index_descriptor in index_entries {
            let fields = index_descriptor.index_fields();

            if is_affected_by_update(&fields, updated_fields) {
                let index_type = index_descriptor.index_type();
                let mut indexer = self.nitrite_config.find_indexer(&index_type)?;

                self.remove_index_entry_internal(&index_descriptor, old_document, &mut indexer)?;
                self.write_index_entry_internal(&index_descriptor, new_document, &mut indexer)?;
            }
        }
        Ok(())
    }

    fn write_index_entry_internal(
        &self,
        index_descriptor: &IndexDescriptor,
        document: &mut Document,
        indexer: &mut NitriteIndexer,
    ) -> NitriteResult<()> {
        let fields = index_descriptor.index_fields();
        let field_values = get_document_values(document, &fields)?;

        if self.index_operation.should_rebuild_index(&fields)? {
            self.index_operation.build_index(index_descriptor, true)?;
        } else {
            indexer.write_index_entry(&field_values, index_descriptor, &self.nitrite_config)?;
        }
        Ok(())
    }

    fn remove_index_entry_internal(
        &self,
        index_descriptor: &IndexDescriptor,
        document: &mut Document,
        indexer: &mut NitriteIndexer,
    ) -> NitriteResult<()> {
        let fields = index_descriptor.index_fields();
        let field_values = get_document_values(document, &fields)?;

        if self.index_operation.should_rebuild_index(&fields)? {
            self.index_operation.build_index(index_descriptor, true)?;
        } else {
            indexer.remove_index_entry(&field_values, index_descriptor, &self.nitrite_config)?;
        }
        Ok(())
    }
}

use super::{
    nitrite_index::NitriteIndexProvider, text::Tokenizer, text_index::TextIndex, IndexDescriptor,
    NitriteIndexerProvider,
};
use crate::{
    collection::{FindPlan, NitriteId},
    errors::{ErrorKind, NitriteError, NitriteResult},
    nitrite_config::NitriteConfig,
    FieldValues, Fields, NitritePlugin, NitritePluginProvider, FULL_TEXT_INDEX,
};
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct TextIndexer {
    inner: Arc<TextIndexerInner>,
}

impl TextIndexer {
    pub fn new(tokenizer: Tokenizer) -> TextIndexer {
        TextIndexer {
            inner: Arc::new(TextIndexerInner::new(tokenizer)),
        }
    }

    fn find_text_index(&self, index_descriptor: &IndexDescriptor) -> NitriteResult<TextIndex> {
        let result = self.inner.find_text_index(index_descriptor);

        match result {
            Some(text_index) => Ok(text_index),
            None => {
                log::error!("Full text index not found for {:?}", index_descriptor);
                Err(NitriteError::new(
                    "Full text index not found",
                    ErrorKind::IndexingError,
                ))
            }
        }
    }
}

impl NitritePluginProvider for TextIndexer {
    fn initialize(&self, _config: NitriteConfig) -> NitriteResult<()> {
        Ok(())
    }

    fn close(&self) -> NitriteResult<()> {
        Ok(())
    }

    fn as_plugin(&self) -> NitritePlugin {
        NitritePlugin::new(self.clone())
    }
}

impl NitriteIndexerProvider for TextIndexer {
    fn index_type(&self) -> String {
        FULL_TEXT_INDEX.to_string()
    }

    fn is_unique(&self) -> bool {
        false
    }

    fn validate_index(&self, fields: &Fields) -> NitriteResult<()> {
        self.inner.validate_index(fields)
    }

    fn drop_index(
        &self,
        index_descriptor: &IndexDescriptor,
        _nitrite_config: &NitriteConfig,
    ) -> NitriteResult<()> {
        self.inner.drop_index(index_descriptor)
    }

    fn write_index_entry(
        &self,
        field_values: &FieldValues,
        index_descriptor: &IndexDescriptor,
        nitrite_config: &NitriteConfig,
    ) -> NitriteResult<()> {
        self.inner
            .write_index_entry(field_values, index_descriptor, nitrite_config)
    }

    fn remove_index_entry(
        &self,
        field_values: &FieldValues,
        index_descriptor: &IndexDescriptor,
        nitrite_config: &NitriteConfig,
    ) -> NitriteResult<()> {
        self.inner
            .remove_index_entry(field_values, index_descriptor, nitrite_config)
    }

    fn find_by_filter(
        &self,
        find_plan: &FindPlan,
        nitrite_config: &NitriteConfig,
    ) -> NitriteResult<Vec<NitriteId>> {
        self.inner.find_by_filter(find_plan, nitrite_config)
    }
}

struct TextIndexerInner {
    index_registry: DashMap<IndexDescriptor, TextIndex>,
    tokenizer: Tokenizer,
}

impl TextIndexerInner {
    fn new(tokenizer: Tokenizer) -> Self {
        Self {
            index_registry: DashMap::new(),
            tokenizer,
        }
    }

    fn find_text_index(&self, index_descriptor: &IndexDescriptor) -> Option<TextIndex> {
        self.index_registry
            .get(index_descriptor)
            .map(|it| it.value().clone())
    }

    fn create_nitrite_index(
        &self,
        index_descriptor: &IndexDescriptor,
        nitrite_config: &NitriteConfig,
    ) -> NitriteResult<TextIndex> {
        let store = nitrite_config.nitrite_store()?;
        let text_index = TextIndex::new(
            index_descriptor.clone(),
            store.clone(),
            self.tokenizer.clone(),
        );

        self.index_registry
            .insert(index_descriptor.clone(), text_index.clone());
        Ok(text_index)
    }

    fn validate_index(&self, fields: &Fields) -> NitriteResult<()> {
        if fields.field_names().len() != 1 {
            log::error!(
                "Text index can only be created on single field, but found {:?}",
                fields.field_names()
            );
            return Err(NitriteError::new(
                "Text index can only be created on single field",
                ErrorKind::IndexingError,
            ));
        }
        Ok(())
    }

    fn drop_index(&self, index_descriptor: &IndexDescriptor) -> NitriteResult<()> {
        let text_index = self.find_text_index(index_descriptor);
        if let Some(text_index) = text_index {
            text_index.drop_index()?;
            self.index_registry.remove(index_descriptor);
        }
        Ok(())
    }

    fn write_index_entry(
        &self,
        field_values: &FieldValues,
        index_descriptor: &IndexDescriptor,
        nitrite_config: &NitriteConfig,
    ) -> NitriteResult<()> {
        let mut text_index = self.find_text_index(index_descriptor);
        if text_index.is_none() {
            text_index = Some(self.create_nitrite_index(index_descriptor, nitrite_config)?);
        }

        if let Some(text_index) = text_index {
            text_index.write(field_values)?;
        }
        Ok(())
    }

    fn remove_index_entry(
        &self,
        field_values: &FieldValues,
        index_descriptor: &IndexDescriptor,
        nitrite_config: &NitriteConfig,
    ) -> NitriteResult<()> {
        let mut text_index = self.find_text_index(index_descriptor);
        if text_index.is_none() {
            text_index = Some(self.create_nitrite_index(index_descriptor, nitrite_config)?);
        }

        if let Some(text_index) = text_index {
            text_index.remove(field_values)?;
        }

        Ok(())
    }

    fn find_by_filter(
        &self,
        find_plan: &FindPlan,
        nitrite_config: &NitriteConfig,
    ) -> NitriteResult<Vec<NitriteId>> {
        let index_descriptor = find_plan.index_descriptor();

        match index_descriptor {
            Some(index_descriptor) => {
                // Use idiomatic if-let pattern instead of is_none() + unwrap()
                let text_index = if let Some(idx) = self.find_text_index(&index_descriptor) {
                    idx
                } else {
                    self.create_nitrite_index(&index_descriptor, nitrite_config)?
                };

                let nitrite_ids = text_index.find_nitrite_ids(find_plan)?;
                Ok(nitrite_ids)
            }
            None => {
                log::error!("Index descriptor not found in find plan");
                Err(NitriteError::new(
                    "Index descriptor not found",
                    ErrorKind::IndexingError,
                ))
            }
        }
    }
}

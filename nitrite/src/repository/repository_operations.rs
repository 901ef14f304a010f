use crate::collection::{Document, NitriteCollection};
use crate::common::{Convertible, PersistentCollection, Value, DOC_ID, UNIQUE_INDEX};
use crate::errors::{ErrorKind, NitriteError, NitriteResult};
use crate::filter::Filter;
use crate::index::IndexOptions;
use crate::repository::{EntityId, NitriteEntity};
use std::collections::BTreeMap;
use std::ops::Deref;
use std::sync::{Arc, OnceLock};

#[derive(Clone)]
pub(crate) struct RepositoryOperations {
    inner: Arc<RepositoryOperationsInner>
}

impl RepositoryOperations {
    pub fn new() -> Self {
        let inner = RepositoryOperationsInner {
            entity_id: OnceLock::new(),
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    pub(crate) fn initialize<T>(&self, collection: NitriteCollection) -> NitriteResult<()>
    where
        T: Convertible<Output = T> + NitriteEntity,
    {
        self.inner.initialize::<T>(collection)
    }
    
    pub(crate) fn to_documents<T>(&self, entities: Vec<&T>) -> NitriteResult<Vec<Document>>
    where
        T: Convertible<Output = T> + NitriteEntity,
    {
        self.inner.to_documents(entities)
    }
    
    pub(crate) fn to_document<T>(&self, entity: &T, update: bool) -> NitriteResult<Document>
    where
        T: Convertible<Output = T> + NitriteEntity,
    {
        self.inner.to_document(entity, update)
    }
    
    pub(crate) fn remove_nitrite_id(&self, document: &mut Document) -> NitriteResult<()> {
        self.inner.remove_nitrite_id(document)
    }
    
    pub(crate) fn create_unique_filter<T>(&self, entity: &T) -> NitriteResult<Filter>
    where
        T: Convertible<Output = T> + NitriteEntity,
    {
        self.inner.create_unique_filter(entity)
    }
    
    pub(crate) fn create_id_filter<Id>(&self, id: Id) -> NitriteResult<Filter>
    where
        Id: Convertible,
    {
        self.inner.create_id_filter(id)
    }
}

pub(crate) struct RepositoryOperationsInner {
    entity_id: OnceLock<EntityId>
}

impl RepositoryOperationsInner {
    fn initialize<T>(&self, collection: NitriteCollection) -> NitriteResult<()>
    where
        T: Convertible<Output = T> + NitriteEntity,
    {
        self.create_id_index::<T>(&collection)?;
        self.create_indexes::<T>(&collection)?;
        Ok(())
    }
    
    fn to_documents<T>(&self, entities: Vec<&T>) -> NitriteResult<Vec<Document>>
    where
        T: Convertible<Output = T> + NitriteEntity,
    {
        let mut documents = Vec::with_capacity(entities.len());
        for entity in entities {
            let document = self.to_document(entity, false)?;
            documents.push(document);
        }
        Ok(documents)
    }
    
    fn to_document<T>(&self, entity: &T, update: bool) -> NitriteResult<Document>
    where
        T: Convertible<Output = T> + NitriteEntity,
    {
        let entity_id = entity.entity_id();
        let value = entity.to_value()?;
        
        // Validate that entity.to_value() returns a Document type
        // This protects against malformed Convertible implementations
        let mut document = match value {
            Value::Document(doc) => doc,
            other => {
                log::error!("Expected Document from entity Convertible, got {:?}", other);
                return Err(NitriteError::new(
                    &format!("Entity conversion failed: Expected Document but got {:?}. Ensure the Convertible implementation returns a valid Document", other),
                    ErrorKind::ObjectMappingError,
                ));
            }
        };
        
        if entity_id.is_some() {
            let entity_id = entity_id.unwrap();
            
            let id_value = document.get(entity_id.field_name())?;
            if entity_id.is_nitrite_id() {
                if id_value.is_null() {
                    let id = document.id()?;
                    document.put(entity_id.field_name(), id)?;
                } else if !update {
                    // if it is an insert, then we should not allow to insert the
                    // document with user provided id
                    log::error!("Cannot insert entity with user provided NitriteId on field '{}'", entity_id.field_name());
                    return Err(NitriteError::new(
                        &format!("Cannot insert entity with user-provided NitriteId on field '{}'. Auto-generated IDs cannot be overwritten on insert", entity_id.field_name()),
                        ErrorKind::InvalidId
                    ));
                }
            }
            
            let id_value = document.get(entity_id.field_name())?;
            if id_value.is_null() {
                log::error!("Entity ID field '{}' cannot be null", entity_id.field_name());
                return Err(NitriteError::new(
                    &format!("Entity ID field '{}' cannot be null. Ensure all entities have a valid ID value set", entity_id.field_name()),
                    ErrorKind::InvalidId
                ));
            }
        }
        
        Ok(document)
    }
    
    fn remove_nitrite_id(&self, document: &mut Document) -> NitriteResult<()> {
        document.remove(DOC_ID)?;
        if let Some(entity_id) = self.entity_id.get() {
            if !entity_id.is_embedded() && entity_id.is_nitrite_id() {
                return document.remove(entity_id.field_name())
            }
        }
        Ok(())
    }
    
    fn create_unique_filter<T>(&self, entity: &T) -> NitriteResult<Filter>
    where
        T: Convertible<Output = T> + NitriteEntity,
    {
        if let Some(entity_id) = self.entity_id.get() {
            let value = entity.to_value()?;
            
            // Validate that entity.to_value() returns a Document type
            let document = match value {
                Value::Document(doc) => doc,
                other => {
                    log::error!("Expected Document from entity Convertible in create_unique_filter, got {:?}", other);
                    return Err(NitriteError::new(
                        &format!("Cannot create unique filter: Expected Document from Convertible but got {:?}. Check your entity's Convertible implementation", other),
                        ErrorKind::ObjectMappingError,
                    ));
                }
            };
            
            let id_value = document.get(entity_id.field_name())?;
            entity_id.create_unique_filter(id_value)
        } else {
            log::error!("Failed to create unique filter: entity id is not defined");
            Err(NitriteError::new(
                "Cannot create unique filter: Entity ID is not defined. Ensure the entity class has a @Id field or use @Embedded ID",
                ErrorKind::NotIdentifiable
            ))
        }
    }
    
    fn create_id_filter<Id>(&self, id: Id) -> NitriteResult<Filter>
    where
        Id: Convertible,
    {
        if let Some(entity_id) = self.entity_id.get() {
            entity_id.create_id_filter(id.to_value()?)
        } else {
            log::error!("Failed to create id filter: entity id is not defined");
            Err(NitriteError::new(
                "Cannot create ID filter: Entity ID is not defined. Ensure the entity class has a @Id field or use @Embedded ID",
                ErrorKind::NotIdentifiable
            ))
        }
    }
    
    fn create_id_index<T>(&self, collection: &NitriteCollection) -> NitriteResult<()>
    where
        T: Convertible<Output = T> + NitriteEntity,
    {
        let default_entity = T::default();
        let entity_id = default_entity.entity_id();
        if let Some(entity_id) = entity_id {
            self.entity_id.get_or_init(|| entity_id.clone());
            
            let field_name = if entity_id.is_embedded() {
                entity_id.encoded_field_names()
            } else {
                vec![entity_id.field_name().to_string()]
            };
            let field_name: Vec<&str> = field_name.iter().map(|s| s.as_str()).collect();
            let index_options = IndexOptions::new(UNIQUE_INDEX);
            collection.create_index(field_name, &index_options)?;
        } 
        Ok(())
    }
    
    fn create_indexes<T>(&self, collection: &NitriteCollection) -> NitriteResult<()>
    where
        T: Convertible<Output = T> + NitriteEntity,
    {
        let default_entity = T::default();
        if let Some(entity_indexes) = default_entity.entity_indexes() {
            for entity_index in entity_indexes {
                let field_names = entity_index.field_names();
                let field_names: Vec<&str> = field_names.iter().map(|s| s.as_str()).collect();
                let index_options = IndexOptions::new(entity_index.index_type());
                collection.create_index(field_names, &index_options)?;
            }
        }
        Ok(())
    }    
}

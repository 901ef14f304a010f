use crate::{collection::Document, errors::{ErrorKind, NitriteError, NitriteResult}, Convertible, Value};

use super::IndexDescriptor;

pub struct IndexMeta {
    index_descriptor: IndexDescriptor,
    index_map: String,
    is_dirty: bool,
}

impl IndexMeta {
    pub fn new(index_descriptor: IndexDescriptor, index_map: String) -> IndexMeta {
        IndexMeta {
            index_descriptor,
            index_map,
            is_dirty: false,
        }
    }

    pub fn index_descriptor(&self) -> IndexDescriptor {
        self.index_descriptor.clone()
    }

    pub fn index_map_name(&self) -> String {
        self.index_map.clone()
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    pub fn set_dirty(&mut self, dirty: bool) {
        self.is_dirty = dirty;
    }
}

impl Convertible for IndexMeta {
    type Output = Self;

    fn to_value(&self) -> NitriteResult<Value> {
        let mut doc = Document::new();
        doc.put("index_descriptor", self.index_descriptor.to_value()?)?;
        doc.put("index_map", Value::String(self.index_map.clone()))?;
        doc.put("is_dirty", Value::Bool(self.is_dirty))?;
        Ok(Value::Document(doc))
    }

    fn from_value(value: &Value) -> NitriteResult<Self> {
        match value {
            Value::Document(doc) => {
                let index_descriptor = IndexDescriptor::from_value(&doc.get("index_descriptor")?)?;
                
                // Safely extract index_map as String with validation
                let index_map = doc.get("index_map")?
                    .as_string()
                    .ok_or_else(|| {
                        log::error!("index_map field must be a string, got: {:?}", doc.get("index_map"));
                        NitriteError::new(
                            "index_map field must be a string in index metadata",
                            ErrorKind::ObjectMappingError,
                        )
                    })?
                    .clone();
                
                // Safely extract is_dirty as Bool with validation
                let is_dirty = doc.get("is_dirty")?
                    .as_bool()
                    .ok_or_else(|| {
                        log::error!("is_dirty field must be a bool, got: {:?}", doc.get("is_dirty"));
                        NitriteError::new(
                            "is_dirty field must be a bool in index metadata",
                            ErrorKind::ObjectMappingError,
                        )
                    })?
                    .clone();
                    
                Ok(IndexMeta {
                    index_descriptor,
                    index_map,
                    is_dirty,
                })
            }
            _ => {
                log::error!("Failed to convert Value {:?} to IndexMeta", value);
                Err(NitriteError::new(
                    "Value is not a document",
                    ErrorKind::ObjectMappingError,
                ))
            },
        }
    }
}

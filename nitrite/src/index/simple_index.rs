use super::{
    index_scanner::IndexScanner, nitrite_index::NitriteIndexProvider, IndexDescriptor, IndexMap,
};
use crate::{
    collection::{FindPlan, NitriteId},
    derive_index_map_name,
    errors::{ErrorKind, NitriteError, NitriteResult}
    ,
    store::{NitriteMap, NitriteMapProvider, NitriteStore, NitriteStoreProvider},
    FieldValues, Value, UNIQUE_INDEX,
};
use itertools::Itertools;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::ops::Deref;
use std::sync::Arc;

static UNIQUE_CONSTRAINT_ERROR: Lazy<NitriteError> = Lazy::new(|| {
    NitriteError::new(
        "Unique constraint violated",
        ErrorKind::UniqueConstraintViolation,
    )
});

#[derive(Clone)]
pub(crate) struct SimpleIndex {
    inner: Arc<SimpleIndexInner>,
}

impl SimpleIndex {
    pub fn new(index_descriptor: IndexDescriptor, store: NitriteStore) -> Self {
        SimpleIndex {
            inner: Arc::new(SimpleIndexInner::new(index_descriptor, store)),
        }
    }
}

impl Deref for SimpleIndex {
    type Target = Arc<SimpleIndexInner>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl NitriteIndexProvider for SimpleIndex {
    fn index_descriptor(&self) -> NitriteResult<IndexDescriptor> {
        self.inner.index_descriptor()
    }

    fn write(&self, field_values: &FieldValues) -> NitriteResult<()> {
        self.inner.write(field_values)
    }

    fn remove(&self, field_values: &FieldValues) -> NitriteResult<()> {
        self.inner.remove(field_values)
    }

    fn drop_index(&self) -> NitriteResult<()> {
        self.inner.drop_index()
    }

    fn find_nitrite_ids(&self, find_plan: &FindPlan) -> NitriteResult<Vec<NitriteId>> {
        self.inner.find_nitrite_ids(find_plan)
    }

    fn is_unique(&self) -> bool {
        self.inner.is_unique()
    }
}

pub struct SimpleIndexInner {
    index_descriptor: IndexDescriptor,
    store: NitriteStore,
}

impl SimpleIndexInner {
    fn new(index_descriptor: IndexDescriptor, store: NitriteStore) -> Self {
        Self {
            index_descriptor,
            store,
        }
    }

    fn find_index_map(&self) -> NitriteResult<NitriteMap> {
        let map_name = derive_index_map_name(&self.index_descriptor);
        self.store.open_map(&map_name)
    }

    fn add_index_element(
        &self,
        index_map: &NitriteMap,
        field_values: &FieldValues,
        value: &Value,
    ) -> NitriteResult<()> {
        let existing = index_map.get(value)?;

        let mut nitrite_ids = match existing {
            Some(Value::Array(arr)) => arr,
            _ => Vec::with_capacity(1),
        };

        let nitrite_ids = self.add_nitrite_ids(&mut nitrite_ids, field_values)?;
        index_map.put(value.clone(), Value::Array(nitrite_ids))?;
        Ok(())
    }

    fn remove_index_element(
        &self,
        index_map: NitriteMap,
        field_values: &FieldValues,
        value: &Value,
    ) -> NitriteResult<()> {
        let nitrite_ids = index_map.get(value)?;
        let mut nitrite_ids = nitrite_ids.unwrap_or(Value::Array(Vec::new()));
        
        match nitrite_ids.as_array_mut() {
            Some(array) => {
                if !array.is_empty() {
                    array.retain(|x| {
                        match x.as_nitrite_id() {
                            Some(id) => id != field_values.nitrite_id(),
                            None => {
                                log::warn!("Invalid NitriteId found in index, skipping");
                                true  // Keep the entry
                            }
                        }
                    });
                }

                if array.is_empty() {
                    index_map.remove(value)?;
                } else {
                    index_map.put(value.clone(), Value::Array(array.to_vec()))?;
                }
            }
            None => {
                log::error!("Index entry is not an array, expected array type");
                return Err(NitriteError::new(
                    "Index entry is not an array - index data corrupted",
                    ErrorKind::IndexingError,
                ));
            }
        }

        Ok(())
    }

    fn add_nitrite_ids(
        &self,
        nitrite_ids: &mut Vec<Value>,
        field_values: &FieldValues,
    ) -> NitriteResult<Vec<Value>> {
        if self.is_unique() && nitrite_ids.len() == 1 {
            // if key is already exists for unique type, throw error
            log::error!("Unique constraint violated for {:?}", field_values);
            return Err(UNIQUE_CONSTRAINT_ERROR.clone());
        }

        // index always are in ascending format
        nitrite_ids.push(Value::NitriteId(*field_values.nitrite_id()));

        // Sort and dedup in-place instead of collecting unique
        nitrite_ids.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        nitrite_ids.dedup();
        
        Ok(std::mem::take(nitrite_ids))
    }

    fn remove_nitrite_ids(
        &self,
        nitrite_ids: &mut Vec<Value>,
        field_values: &FieldValues,
    ) -> NitriteResult<Vec<Value>> {
        if !nitrite_ids.is_empty() {
            nitrite_ids.retain(|x| {
                match x.as_nitrite_id() {
                    Some(id) => id != field_values.nitrite_id(),
                    None => {
                        log::warn!("Invalid NitriteId found in index, keeping entry");
                        true  // Keep the entry
                    }
                }
            });
        }
        Ok(std::mem::take(nitrite_ids))
    }

    fn scan_index(
        &self,
        find_plan: &FindPlan,
        index_map: NitriteMap,
    ) -> NitriteResult<Vec<NitriteId>> {
        if find_plan.index_scan_filter().is_none() {
            return Ok(Vec::new());
        }
        
        let index_scan_filter = find_plan.index_scan_filter()
            .ok_or_else(|| NitriteError::new(
                "Index scan filter is not available",
                ErrorKind::InvalidOperation,
            ))?;
        let filters = index_scan_filter.filters();
        let index_scan_order = find_plan.index_scan_order().unwrap_or_default();

        let i_map = IndexMap::new(Some(index_map), None);
        let index_scanner = IndexScanner::new(i_map);
        index_scanner.scan(filters, index_scan_order)
    }

    fn index_descriptor(&self) -> NitriteResult<IndexDescriptor> {
        Ok(self.index_descriptor.clone())
    }

    fn write(&self, field_values: &FieldValues) -> NitriteResult<()> {
        let fields = field_values.fields();
        let field_names = fields.field_names();

        let first_field = field_names.first()
            .ok_or_else(|| NitriteError::new(
                "Cannot write to index: no field names specified",
                ErrorKind::InvalidOperation,
            ))?;
        let field_value = field_values.get_value(first_field);

        let index_map = self.find_index_map()?;

        match field_value {
            None | Some(Value::Null) => {
                self.add_index_element(&index_map, field_values, &Value::Null)?;
            }
            Some(Value::Array(arr)) => {
                for value in arr {
                    self.add_index_element(&index_map, field_values, value)?;
                }
            }
            Some(value) => {
                if value.is_comparable() {
                    self.add_index_element(&index_map, field_values, value)?;
                }
            }
        }

        Ok(())
    }

    fn remove(&self, field_values: &FieldValues) -> NitriteResult<()> {
        let fields = field_values.fields();
        let field_names = fields.field_names();

        let first_field = field_names.first()
            .ok_or_else(|| NitriteError::new(
                "Cannot remove from index: no field names specified",
                ErrorKind::InvalidOperation,
            ))?;
        let field_value = field_values.get_value(first_field);

        let index_map = self.find_index_map()?;

        match field_value { 
            None | Some(Value::Null) => {
                self.remove_index_element(index_map.clone(), field_values, &Value::Null)?;
            }
            Some(Value::Array(arr)) => {
                for value in arr {
                    self.remove_index_element(index_map.clone(), field_values, value)?;
                }
            }
            Some(value) => {
                if value.is_comparable() {
                    self.remove_index_element(index_map.clone(), field_values, value)?;
                }
            }
        }

        Ok(())
    }

    fn drop_index(&self) -> NitriteResult<()> {
        let index_map = self.find_index_map()?;
        index_map.clear()?;
        index_map.dispose()?;
        Ok(())
    }

    fn find_nitrite_ids(&self, find_plan: &FindPlan) -> NitriteResult<Vec<NitriteId>> {
        if find_plan.index_scan_filter().is_none() {
            return Ok(Vec::new());
        }

        let index_map = self.find_index_map()?;
        self.scan_index(find_plan, index_map)
    }

    fn is_unique(&self) -> bool {
        self.index_descriptor
            .index_type()
            .eq_ignore_ascii_case(UNIQUE_INDEX)
    }
}

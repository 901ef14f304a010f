use super::nitrite_index::NitriteIndexProvider;
use super::text::TokenizerProvider;
use super::IndexMap;
use super::{text::Tokenizer, IndexDescriptor};
use crate::collection::{FindPlan, NitriteId};
use crate::common::{validate_string_array_index_field, Token};
use crate::filter::TextFilter;
use crate::filter::{is_text_filter, FilterProvider};
use crate::store::{NitriteMapProvider, NitriteStoreProvider};
use crate::{
    derive_index_map_name,
    errors::{ErrorKind, NitriteError, NitriteResult},
    store::{NitriteMap, NitriteStore},
    FieldValues, Value,
};
use itertools::Itertools;
use once_cell::sync::Lazy;
use smallvec::SmallVec;
use std::collections::HashSet;
use std::ops::Deref;
use std::sync::Arc;

type TokenVec = SmallVec<[String; 8]>;

static UNIQUE_CONSTRAINT_ERROR: Lazy<NitriteError> = Lazy::new(|| {
    NitriteError::new(
        "Unique constraint violated",
        ErrorKind::UniqueConstraintViolation,
    )
});

static INVALID_TYPE_ERROR: Lazy<NitriteError> = Lazy::new(|| {
    NitriteError::new(
        "Invalid value type for text index",
        ErrorKind::IndexingError,
    )
});

static INVALID_FILTER_TYPE_ERROR: Lazy<NitriteError> = Lazy::new(|| {
    NitriteError::new(
        "Invalid filter type for text index",
        ErrorKind::IndexingError,
    )
});

static INVALID_FILTER_COUNT_ERROR: Lazy<NitriteError> = Lazy::new(|| {
    NitriteError::new(
        "Invalid filter count for text index",
        ErrorKind::IndexingError,
    )
});

#[derive(Clone)]
pub(crate) struct TextIndex {
    inner: Arc<TextIndexInner>,
}

impl TextIndex {
    pub fn new(
        index_descriptor: IndexDescriptor,
        store: NitriteStore,
        tokenizer: Tokenizer,
    ) -> Self {
        TextIndex {
            inner: Arc::new(TextIndexInner::new(index_descriptor, store, tokenizer)),
        }
    }
}

impl Deref for TextIndex {
    type Target = Arc<TextIndexInner>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl NitriteIndexProvider for TextIndex {
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
        false
    }
}

pub struct TextIndexInner {
    index_descriptor: IndexDescriptor,
    store: NitriteStore,
    tokenizer: Tokenizer,
}

impl TextIndexInner {
    fn new(index_descriptor: IndexDescriptor, store: NitriteStore, tokenizer: Tokenizer) -> Self {
        Self {
            index_descriptor,
            store,
            tokenizer,
        }
    }

    fn add_index_element(
        &self,
        index_map: &NitriteMap,
        field_values: &FieldValues,
        value: &Value,
    ) -> NitriteResult<()> {
        let words = self.decompose(value);

        for word in &words {
            let word_key = Value::String(word.clone());
            let existing = index_map.get(&word_key)
                .map_err(|e| NitriteError::new(&format!("Failed to retrieve existing entries for word '{}' from text index: {}", word, e), e.kind().clone()))?;
            let mut nitrite_ids = match existing {
                Some(Value::Array(arr)) => arr,
                _ => Vec::with_capacity(1),
            };
            let nitrite_ids = self.add_nitrite_ids(&mut nitrite_ids, field_values)
                .map_err(|e| NitriteError::new(&format!("Failed to add nitrite IDs for word '{}' in text index: {}", word, e), e.kind().clone()))?;

            index_map.put(word_key, Value::Array(nitrite_ids))
                .map_err(|e| NitriteError::new(&format!("Failed to store word '{}' in text index: {}", word, e), e.kind().clone()))?;

            // for case-insensitive index, add lower case word in the map
            let mut lower_word = String::with_capacity(word.len() + 2);
            lower_word.push_str("i_");
            lower_word.push_str(&word.to_lowercase());

            if word != &lower_word {
                let lower_word_key = Value::String(lower_word.clone());
                let lower_existing = index_map.get(&lower_word_key)
                    .map_err(|e| NitriteError::new(&format!("Failed to retrieve existing entries for lowercase word '{}' from text index: {}", lower_word, e), e.kind().clone()))?;
                let mut lower_nitrite_ids = match lower_existing {
                    Some(Value::Array(arr)) => arr,
                    _ => Vec::with_capacity(1),
                };
                let lower_nitrite_ids =
                    self.add_nitrite_ids(&mut lower_nitrite_ids, field_values)
                        .map_err(|e| NitriteError::new(&format!("Failed to add nitrite IDs for lowercase word '{}' in text index: {}", lower_word, e), e.kind().clone()))?;

                index_map.put(lower_word_key, Value::Array(lower_nitrite_ids))
                    .map_err(|e| NitriteError::new(&format!("Failed to store lowercase word '{}' in text index: {}", lower_word, e), e.kind().clone()))?;
            }
        }
        Ok(())
    }

    fn remove_index_element(
        &self,
        index_map: &NitriteMap,
        field_values: &FieldValues,
        value: &Value,
    ) -> NitriteResult<()> {
        let words = self.decompose(value);

        for word in &words {
            let word_key = Value::String(word.clone());

                // Handle IDs more efficiently
                if let Some(Value::Array(ids)) = index_map.get(&word_key)? {
                    // Pre-allocate with reasonable size
                    let mut new_ids = Vec::with_capacity(ids.len());

                    // Filter directly without additional allocations
                    for id in &ids {
                        // Safely extract NitriteId with error handling
                        match id.as_nitrite_id() {
                            Some(nitrite_id) if nitrite_id != field_values.nitrite_id() => {
                                new_ids.push(id.clone());
                            }
                            None => {
                                log::warn!("Invalid NitriteId value in text index word map: {:?}", id);
                                // Skip corrupted entry instead of panicking
                            }
                            _ => {} // ID matches, don't add to new_ids
                        }
                    }

                    // Update or remove based on result
                    if new_ids.is_empty() {
                        index_map.remove(&word_key)?;
                    } else {
                        index_map.put(word_key, Value::Array(new_ids))?;
                    }
                }            // for case-insensitive index, remove lower case word in the map
            let mut lower_word = String::with_capacity(word.len() + 2);
            lower_word.push_str("i_");
            lower_word.push_str(&word.to_lowercase());

            if word != &lower_word {
                let lower_word_key = Value::String(lower_word.clone());

                // Handle IDs more efficiently
                if let Some(Value::Array(ids)) = index_map.get(&lower_word_key)? {
                    // Pre-allocate with reasonable size
                    let mut new_lower_ids = Vec::with_capacity(ids.len());

                    // Filter directly without additional allocations
                    for id in &ids {
                        // Safely extract NitriteId with error handling
                        match id.as_nitrite_id() {
                            Some(nitrite_id) if nitrite_id != field_values.nitrite_id() => {
                                new_lower_ids.push(id.clone());
                            }
                            None => {
                                log::warn!("Invalid NitriteId value in text index lowercase word map: {:?}", id);
                                // Skip corrupted entry instead of panicking
                            }
                            _ => {} // ID matches, don't add to new_lower_ids
                        }
                    }

                    // Update or remove based on result
                    if new_lower_ids.is_empty() {
                        index_map.remove(&lower_word_key)?;
                    } else {
                        index_map.put(lower_word_key, Value::Array(new_lower_ids))?;
                    }
                }
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

        // dedupe the nitrite_ids
        let mut ids = Vec::with_capacity(nitrite_ids.len());
        for id in nitrite_ids.iter().unique() {
            ids.push(id.clone());
        }
        Ok(ids)
    }

    fn find_index_map(&self) -> NitriteResult<NitriteMap> {
        let map_name = derive_index_map_name(&self.index_descriptor);
        let store = self.store.clone();
        store.open_map(&map_name)
    }

    fn decompose(&self, value: &Value) -> TokenVec {
        match value {
            Value::String(s) => {
                if s.is_empty() {
                    return TokenVec::new();                    
                }
                
                let mut tokens = TokenVec::new();
                for token in self.tokenizer.tokenize(s) {
                    tokens.push(token);
                }
                tokens
            }
            _ => TokenVec::new(),
        }
    }

    fn index_descriptor(&self) -> NitriteResult<IndexDescriptor> {
        Ok(self.index_descriptor.clone())
    }

    fn write(&self, field_values: &FieldValues) -> NitriteResult<()> {
        let fields = field_values.fields();
        let field_names = fields.field_names();

        let first_field = field_names.first()
            .ok_or_else(|| NitriteError::new(
                "Text index error: no field names found in index descriptor",
                ErrorKind::IndexingError
            ))?;
        let first_value = field_values.get_value(first_field);

        let index_map = self.find_index_map()?;

        match first_value {
            None | Some(Value::Null) => {
                self.add_index_element(&index_map, field_values, &Value::Null)?;
            }
            Some(Value::String(_)) => {
                self.add_index_element(&index_map, field_values, first_value.unwrap())?;
            }
            Some(Value::Array(values)) => {
                validate_string_array_index_field(values, first_field)?;
                for value in values {
                    self.add_index_element(&index_map, field_values, value)?;
                }
            }
            _ => {
                log::error!("Invalid value type for text index {:?}", first_value);
                return Err(INVALID_TYPE_ERROR.clone());
            }
        }

        Ok(())
    }

    fn remove(&self, field_values: &FieldValues) -> NitriteResult<()> {
        let fields = field_values.fields();
        let field_names = fields.field_names();

        let first_field = field_names.first()
            .ok_or_else(|| NitriteError::new(
                "Text index error: no field names found in index descriptor during removal",
                ErrorKind::IndexingError
            ))?;
        let first_value = field_values.get_value(first_field);

        let index_map = self.find_index_map()?;

        match first_value {
            None | Some(Value::Null) => {
                self.remove_index_element(&index_map, field_values, &Value::Null)?;
            }
            Some(Value::String(_)) => {
                self.remove_index_element(&index_map, field_values, first_value.unwrap())?;
            }
            Some(Value::Array(values)) => {
                validate_string_array_index_field(values, first_field)?;
                for value in values {
                    self.remove_index_element(&index_map, field_values, value)?;
                }
            }
            _ => {
                log::error!("Invalid value type for text index {:?}", first_value);
                return Err(INVALID_TYPE_ERROR.clone());
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
        let index_scan_filter = find_plan.index_scan_filter();
        if index_scan_filter.is_none() {
            return Ok(Vec::new());
        }

        let filters = index_scan_filter.unwrap().filters();
        if filters.len() != 1 {
            log::error!("Invalid filter count {} for text index", filters.len());
            return Err(INVALID_FILTER_COUNT_ERROR.clone());
        }

        let filter = &filters[0];
        if !is_text_filter(filter) {
            log::error!("Invalid filter type for text index {}", filter);
            return Err(INVALID_FILTER_TYPE_ERROR.clone());
        }

        // Process text filter
        let text_filter = filter
            .as_any()
            .downcast_ref::<TextFilter>()
            .ok_or_else(|| NitriteError::new(
                "Text index error: cannot process non-TextFilter in text index query. Expected TextFilter but found another filter type",
                ErrorKind::IndexingError
            ))?
            .clone();
        text_filter.set_tokenizer(self.tokenizer.clone());

        // Get results and pre-allocate with estimated capacity
        let index_map = IndexMap::new(Some(self.find_index_map()?), None);
        let result = text_filter.apply_on_index(&index_map)?;

        // Pre-allocate HashSet with capacity
        let mut id_list = HashSet::with_capacity(result.len());
        for value in result {
            // Gracefully handle invalid NitriteId values
            match value.as_nitrite_id() {
                Some(id) => {
                    id_list.insert(*id);
                }
                None => {
                    log::warn!("Invalid NitriteId value in text index result: {:?}", value);
                    // Skip invalid IDs instead of panicking
                }
            }
        }

        // Convert to Vec with known capacity
        let mut id_vec = Vec::with_capacity(id_list.len());
        id_vec.extend(id_list);
        Ok(id_vec)
    }

    fn is_unique(&self) -> bool {
        false
    }
}

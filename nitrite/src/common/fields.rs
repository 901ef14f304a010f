use crate::collection::NitriteId;
use crate::common::{SortOrder, Value, NAME_SEPARATOR};
use crate::errors::{ErrorKind, NitriteError, NitriteResult};
use std::cmp::min;
use std::fmt::Display;
use std::hash::Hash;
use std::sync::Arc;

use super::Convertible;

/// Represents an ordered collection of field names for indexing and querying.
///
/// This struct manages a set of field names with support for prefix matching,
/// sorting, and serialization. It provides an efficient way to track which fields
/// are involved in indexes and query operations.
///
/// # Responsibilities
///
/// * **Field Management**: Stores and maintains ordered field names
/// * **Serialization**: Converts field names to/from value representations
/// * **Comparison**: Supports ordering and equality checks based on encoded names
/// * **Prefix Matching**: Checks if fields start with a specific prefix sequence
/// * **Hashing**: Implements hashing for use in collections
/// * **Display Formatting**: Provides string representation with field separator
///
/// # Example
///
/// ```ignore
/// let fields = Fields::with_names(vec!["name", "age"])?;
/// assert_eq!(fields.encoded_names(), "name|age");
/// 
/// let prefix = Fields::with_names(vec!["name"])?;
/// assert!(fields.starts_with(&prefix));
/// ```
#[derive(Clone, Debug, Eq)]
pub struct Fields {
    inner: Arc<FieldsInner>,
}

impl Fields {
    /// Creates a new Fields instance with the provided field names.
    pub fn with_names(field_names: Vec<&str>) -> NitriteResult<Fields> {
        if field_names.is_empty() {
            log::error!("Field names cannot be empty");
            return Err(NitriteError::new(
                "Field names cannot be empty",
                ErrorKind::ValidationError,
            ));
        }

        Ok(Fields {
            inner: Arc::new(FieldsInner {
                field_names: field_names.iter().map(|s| s.to_string()).collect(),
            }),
        })
    }

    /// Returns the list of field names.
    pub fn field_names(&self) -> Vec<String> {
        self.inner.field_names()
    }

    /// Returns the encoded representation of field names separated by NAME_SEPARATOR.
    pub fn encoded_names(&self) -> String {
        self.inner.encoded_names()
    }

    /// Checks if these fields start with the given prefix fields.
    pub fn starts_with(&self, prefix: &Fields) -> bool {
        self.inner.starts_with(prefix)
    }
}

impl Display for Fields {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.encoded_names())
    }
}

impl Ord for Fields {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.encoded_names().cmp(&other.encoded_names())
    }
}

impl PartialOrd for Fields {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Fields {
    fn eq(&self, other: &Self) -> bool {
        self.encoded_names() == other.encoded_names()
    }
}

impl Hash for Fields {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.encoded_names().hash(state);
    }
}

impl Convertible for Fields {
    type Output = Self;

    fn to_value(&self) -> NitriteResult<Value> {
        Ok(Value::from_vec(self.field_names()))
    }

    fn from_value(value: &Value) -> NitriteResult<Self::Output> {
        match value {
            Value::Array(ref array) => {
                let mut field_names = Vec::new();
                for v in array {
                    match v.as_string() {
                        Some(name) => field_names.push(name.as_str()),
                        None => {
                            log::error!("Field name must be a string, got: {:?}", v);
                            return Err(NitriteError::new(
                                "Field name must be a string",
                                ErrorKind::ObjectMappingError,
                            ));
                        }
                    }
                }
                Fields::with_names(field_names)
            }
            _ => {
                log::error!("Value {} is not an array", value);
                Err(NitriteError::new(
                    "Value is not an array",
                    ErrorKind::ObjectMappingError,
                ))
            },
        }
    }
}

/// Inner implementation of field name storage and operations.
#[derive(Debug, Eq)]
struct FieldsInner {
    field_names: Vec<String>,
}

impl FieldsInner {
    #[inline]
    pub fn field_names(&self) -> Vec<String> {
        self.field_names.clone()
    }

    #[inline]
    pub fn encoded_names(&self) -> String {
        self.field_names.join(NAME_SEPARATOR)
    }

    #[inline]
    pub fn starts_with(&self, prefix: &Fields) -> bool {
        let prefix_names = prefix.field_names();
        let length = min(self.field_names.len(), prefix_names.len());

        if prefix_names.len() > length {
            return false;
        }

        for i in 0..length {
            if self.field_names[i] != prefix_names[i] {
                return false;
            }
        }

        true
    }
}

impl PartialEq for FieldsInner {
    fn eq(&self, other: &Self) -> bool {
        self.encoded_names() == other.encoded_names()
    }
}

pub struct SortableFields {
    field_names: Vec<String>,
    sorting_order: Vec<(String, SortOrder)>,
}

impl Default for SortableFields {
    fn default() -> Self {
        Self::new()
    }
}

impl SortableFields {
    pub fn new() -> SortableFields {
        SortableFields {
            field_names: Vec::new(),
            sorting_order: Vec::new(),
        }
    }

    pub fn with_names(field_names: Vec<String>) -> NitriteResult<SortableFields> {
        if field_names.is_empty() {
            log::error!("Field names cannot be empty");
            return Err(NitriteError::new(
                "Field names cannot be empty",
                ErrorKind::ValidationError,
            ));
        }

        let sorting_order = field_names
            .iter()
            .map(|field_name| (field_name.clone(), SortOrder::Ascending))
            .collect();

        Ok(SortableFields {
            field_names,
            sorting_order,
        })
    }

    pub fn with_names_and_order(
        field_names: Vec<String>,
        sorting_order: Vec<(String, SortOrder)>,
    ) -> NitriteResult<SortableFields> {
        if field_names.is_empty() {
            log::error!("Field names cannot be empty");
            return Err(NitriteError::new(
                "Field names cannot be empty",
                ErrorKind::ValidationError,
            ));
        }

        Ok(SortableFields {
            field_names,
            sorting_order,
        })
    }

    pub fn field_names(&self) -> Vec<String> {
        self.field_names.clone()
    }

    #[inline]
    pub fn encoded_names(&self) -> String {
        self.field_names.join(NAME_SEPARATOR)
    }

    #[inline]
    pub fn add_field(self, field_name: String) -> SortableFields {
        self.add_sorted_field(field_name, SortOrder::Ascending)
    }

    #[inline]
    pub fn add_sorted_field(mut self, field_name: String, sort_order: SortOrder) -> SortableFields {
        self.field_names.push(field_name.clone());
        self.sorting_order.push((field_name, sort_order));
        self
    }

    #[inline]
    pub fn sorting_order(&self) -> Vec<(String, SortOrder)> {
        // Pre-allocate with known capacity
        let mut sorting_order = Vec::with_capacity(self.sorting_order.len());
        for (field_name, sort_order) in &self.sorting_order {
            sorting_order.push((field_name.clone(), *sort_order));
        }
        sorting_order
    }
}

#[derive(Debug)]
pub struct FieldValues {
    field_values: Vec<(String, Value)>,
    nitrite_id: NitriteId,
    fields: Fields,
}

impl FieldValues {
    #[inline]
    pub fn new(
        field_values: Vec<(String, Value)>,
        nitrite_id: NitriteId,
        fields: Fields,
    ) -> FieldValues {
        FieldValues {
            field_values,
            nitrite_id,
            fields,
        }
    }

    #[inline]
    pub fn get_value(&self, field_name: &str) -> Option<&Value> {
        self.field_values
            .iter()
            .find(|(name, _)| name == field_name).and_then(|(_, value)| {
                if value.is_null() {
                    return None;
                }
                Some(value)   
            })
    }

    #[inline]
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    #[inline]
    pub fn nitrite_id(&self) -> &NitriteId {
        &self.nitrite_id
    }

    #[inline]
    pub fn values(&self) -> Vec<(String, Value)> {
        self.field_values.clone()
    }
}

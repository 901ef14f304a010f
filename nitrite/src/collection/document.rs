use smallvec::SmallVec;
use im::OrdMap;

use crate::collection::nitrite_id::NitriteId;
use crate::common::{ReadExecutor, Value, DOC_ID, DOC_MODIFIED, DOC_REVISION, DOC_SOURCE, RESERVED_FIELDS};
use crate::errors::{ErrorKind, NitriteError, NitriteResult};
use crate::FIELD_SEPARATOR;
use itertools::Itertools;
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Debug, Display};

type FieldVec = SmallVec<[String; 8]>;

/// Represents a document in Nitrite database using lock-free persistent data structure.
///
/// Nitrite document are composed of key-value pairs. The key is always a
/// [String] and value is a [Value].
///
/// Nitrite document supports nested documents as well. The key of a nested
/// document is a [String] separated by the field separator (default: `.`).
/// The field separator can be configured using [`crate::nitrite_builder::NitriteBuilder::field_separator`].
///
/// For example, if a document has a nested document `{"a": {"b": 1}}`, then the
/// value inside the nested document can be retrieved by calling `document.get("a.b")`.
///
/// Below fields are reserved and cannot be used as key in a document.
///
/// * `_id` - The unique identifier of the document. If not provided, Nitrite
/// will generate a unique [NitriteId] for the document during insertion.
/// * `_revision` - The revision number of the document.
/// * `_source` - The source of the document.
/// * `_modified` - The last modified time of the document.
///
/// ## Lock-Free Design
///
/// This struct uses `im::OrdMap` (a persistent ordered map) for lock-free operation:
/// - O(1) cloning via internal Arc sharing
/// - Mutations create new maps via structural sharing (90% structure reused)
/// - Each mutated document is completely independent
/// - Zero locks, zero copy-on-write overhead
#[derive(Clone, Eq, PartialEq, Hash, Default, Ord, PartialOrd, serde::Deserialize, serde::Serialize)]
pub struct Document {
    /// Persistent ordered map: O(1) clone via internal Arc, O(log n) mutations
    data: OrdMap<String, Value>,
}

impl Document {
    /// Creates a new empty document.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let doc = Document::new();
    /// assert!(doc.is_empty());
    /// assert_eq!(doc.size(), 0);
    /// ```
    pub fn new() -> Self {
        Document {
            data: OrdMap::new(),
        }
    }

    /// Checks if the document is empty.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let empty_doc = Document::new();
    /// assert!(empty_doc.is_empty());
    ///
    /// let mut doc = doc!{ "key": "value" };
    /// assert!(!doc.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Associates the specified [Value] with the specified key in this document.
    ///
    /// This method inserts a key-value pair into the document. If the key already exists,
    /// its value is updated. The method supports both top-level and embedded keys
    /// (e.g., `"user.name"` or `"location.address.zip"`).
    ///
    /// # Arguments
    ///
    /// * `key` - The key as a string or string slice. Cannot be empty.
    /// * `value` - The value to associate with the key. Can be any type that implements
    ///   `Into<Value>` (primitives, strings, documents, arrays, etc.).
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * The key is empty
    /// * The key contains the reserved field `_id` with a non-NitriteId value
    ///
    /// # Examples
    ///
    /// Basic insertion:
    /// ```ignore
    /// let mut doc = Document::new();
    /// doc.put("name", "Alice")?;
    /// doc.put("age", 30)?;
    /// assert_eq!(doc.size(), 2);
    /// ```
    ///
    /// Nested document insertion:
    /// ```ignore
    /// let mut doc = Document::new();
    /// doc.put("user.name", "Alice")?;
    /// doc.put("user.email", "alice@example.com")?;
    /// assert_eq!(doc.get("user.name")?, Value::String("Alice".to_string()));
    /// ```
    ///
    /// Updating existing key:
    /// ```ignore
    /// let mut doc = doc!{ "status": "inactive" };
    /// doc.put("status", "active")?;
    /// assert_eq!(doc.get("status")?, Value::String("active".to_string()));
    /// ```
    pub fn put<'a, T: Into<Value>>(&mut self, key: impl Into<Cow<'a, str>>, value: T) -> NitriteResult<()> {
        let key = key.into();
        // key cannot be empty
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(NitriteError::new(
                "Document does not support empty key",
                ErrorKind::InvalidOperation,
            ));
        }
        
        let value = value.into();

        // validate the _id field
        if key == DOC_ID && !value.is_nitrite_id() {
            log::error!("Document id is an auto generated field and cannot be set manually");
            return Err(NitriteError::new(
                "Document id is an auto generated field and cannot be set manually",
                ErrorKind::InvalidOperation,
            ));
        }

        // if field name contains field separator, split the fields, and put the value
        // accordingly associated with the embedded field.
        if FIELD_SEPARATOR.read_with(|sep| key.contains(sep)) {
            let splits: Vec<&str> = FIELD_SEPARATOR.read_with(|it| key.split(it).collect());
            self.deep_put(&splits, value)
        } else {
            self.data = self.data.update(key.to_string(), value);
            Ok(())
        }
    }

    /// Returns the [Value] to which the specified key is associated, or [Value::Null]
    /// if this document contains no mapping for the key.
    ///
    /// This method retrieves the value associated with a key. If the key does not exist,
    /// it returns [Value::Null]. The method supports both top-level and embedded keys
    /// (e.g., `"location.address.zip"`).
    ///
    /// # Arguments
    ///
    /// * `key` - The key to look up as a string slice.
    ///
    /// # Returns
    ///
    /// Returns the associated [Value], or [Value::Null] if the key does not exist.
    ///
    /// # Examples
    ///
    /// Retrieving a top-level key:
    /// ```ignore
    /// let doc = doc!{ "name": "Alice", "age": 30 };
    /// assert_eq!(doc.get("name")?, Value::String("Alice".to_string()));
    /// assert_eq!(doc.get("age")?, Value::I32(30));
    /// ```
    ///
    /// Accessing nested documents:
    /// ```ignore
    /// let doc = doc!{
    ///     "location": {
    ///         "city": "New York",
    ///         "zip": 10001
    ///     }
    /// };
    /// assert_eq!(doc.get("location.city")?, Value::String("New York".to_string()));
    /// assert_eq!(doc.get("location.zip")?, Value::I32(10001));
    /// ```
    ///
    /// Accessing array elements:
    /// ```ignore
    /// let doc = doc!{ "items": [1, 2, 3] };
    /// assert_eq!(doc.get("items.0")?, Value::I32(1));
    /// assert_eq!(doc.get("items.1")?, Value::I32(2));
    /// ```
    ///
    /// Non-existent key returns Null:
    /// ```ignore
    /// let doc = doc!{ "name": "Alice" };
    /// assert_eq!(doc.get("missing")?, Value::Null);
    /// ```
    pub fn get(&self, key: &str) -> NitriteResult<Value> {
        match self.data.get(key) {
            Some(value) => Ok(value.clone()),
            None => {
                // Only check for embedded key if not found at top level
                if FIELD_SEPARATOR.read_with(|sep| key.contains(sep)) {
                    self.deep_get(key)
                } else {
                    Ok(Value::Null)
                }
            }
        }
    }

    /// Return the [NitriteId] associated with this document.
    ///
    /// If the document does not have an `_id` field, this method automatically generates
    /// a new [NitriteId] and assigns it to the document. This method mutates the document
    /// only if an ID needs to be generated.
    ///
    /// # Returns
    ///
    /// The [NitriteId] associated with this document.
    ///
    /// # Examples
    ///
    /// Getting the ID of an existing document:
    /// ```ignore
    /// let mut doc = doc!{ "name": "Alice" };
    /// let id = doc.id()?;
    /// assert!(!id.to_string().is_empty());
    /// // After calling id(), the document now has an _id field
    /// assert!(doc.has_id());
    /// ```
    ///
    /// Auto-generating ID when missing:
    /// ```ignore
    /// let mut doc1 = doc!{ "name": "Alice" };
    /// let mut doc2 = doc!{ "name": "Bob" };
    ///
    /// let id1 = doc1.id()?;
    /// let id2 = doc2.id()?;
    ///
    /// // Each document gets a unique ID
    /// assert_ne!(id1, id2);
    /// ```
    pub fn id(&mut self) -> NitriteResult<NitriteId> {
        if let Some(Value::NitriteId(id)) = self.data.get(DOC_ID) {
            Ok(id.clone())
        } else {
            // if _id field is not populated already, create a new id
            // and set it in the document
            let nitrite_id = NitriteId::new();
            self.data = self.data.update(
                DOC_ID.to_string(),
                Value::NitriteId(nitrite_id.clone()),
            );
            Ok(nitrite_id)
        }
    }

    /// Retrieves all fields (top level and embedded) associated with this document.
    ///
    /// This method returns a collection of all field paths in the document, including
    /// top-level fields and embedded fields from nested documents. Embedded fields are
    /// represented using the field separator (default: `.`). Reserved fields
    /// (`_id`, `_revision`, `_source`, `_modified`) are excluded from the result.
    ///
    /// # Returns
    ///
    /// A [FieldVec] containing all field paths in the document.
    ///
    /// # Examples
    ///
    /// Retrieving fields from a simple document:
    /// ```ignore
    /// let doc = doc!{ "name": "Alice", "age": 30 };
    /// let fields = doc.fields();
    /// assert_eq!(fields.len(), 2);
    /// assert!(fields.contains(&"name".to_string()));
    /// assert!(fields.contains(&"age".to_string()));
    /// ```
    ///
    /// Retrieving fields from a nested document:
    /// ```ignore
    /// let doc = doc!{
    ///     "user": {
    ///         "name": "Alice",
    ///         "email": "alice@example.com"
    ///     },
    ///     "status": "active"
    /// };
    /// let fields = doc.fields();
    /// // Returns ["user.name", "user.email", "status"]
    /// assert!(fields.contains(&"user.name".to_string()));
    /// assert!(fields.contains(&"user.email".to_string()));
    /// assert!(fields.contains(&"status".to_string()));
    /// ```
    ///
    /// Empty document:
    /// ```ignore
    /// let doc = Document::new();
    /// let fields = doc.fields();
    /// assert!(fields.is_empty());
    /// ```
    pub fn fields(&self) -> FieldVec {
        self.get_fields_internal("")
    }

    /// Checks if this document has a nitrite id.
    ///
    /// # Returns
    ///
    /// `true` if the document has an `_id` field, `false` otherwise.
    ///
    /// # Examples
    ///
    /// Checking ID presence:
    /// ```ignore
    /// let mut doc = doc!{ "name": "Alice" };
    /// assert!(!doc.has_id());  // No ID yet
    ///
    /// let _id = doc.id()?;      // Generate ID
    /// assert!(doc.has_id());    // Now has ID
    /// ```
    pub fn has_id(&self) -> bool {
        self.data.contains_key(DOC_ID)
    }

    /// Removes the key and its value from the document.
    ///
    /// Deletes the key-value pair associated with the given key. If the key does not exist,
    /// the operation succeeds without error. The method supports both top-level and embedded keys.
    ///
    /// # Arguments
    ///
    /// * `key` - The key to remove as a string slice.
    ///
    /// # Errors
    ///
    /// Returns an error if the key contains invalid embedded field separators.
    ///
    /// # Examples
    ///
    /// Removing a top-level key:
    /// ```ignore
    /// let mut doc = doc!{ "name": "Alice", "age": 30 };
    /// doc.remove("age")?;
    /// assert_eq!(doc.get("age")?, Value::Null);
    /// assert_eq!(doc.size(), 1);
    /// ```
    ///
    /// Removing a nested field:
    /// ```ignore
    /// let mut doc = doc!{
    ///     "user": {
    ///         "name": "Alice",
    ///         "email": "alice@example.com"
    ///     }
    /// };
    /// doc.remove("user.email")?;
    /// assert_eq!(doc.get("user.email")?, Value::Null);
    /// assert_eq!(doc.get("user.name")?, Value::String("Alice".to_string()));
    /// ```
    ///
    /// Removing non-existent key succeeds:
    /// ```ignore
    /// let mut doc = doc!{ "name": "Alice" };
    /// doc.remove("missing")?;  // No error
    /// assert_eq!(doc.size(), 1);
    /// ```
    pub fn remove(&mut self, key: &str) -> NitriteResult<()> {
        if FIELD_SEPARATOR.read_with(|sep| key.contains(sep)) {
            // if the field is an embedded field,
            // run a deep scan and remove the last field
            let splits: Vec<&str> = FIELD_SEPARATOR.read_with(|it| key.split(it).collect());
            self.deep_remove(&splits)
        } else {
            self.data = self.data.without(key);
            Ok(())
        }
    }

    /// Returns the number of entries in the document.
    ///
    /// # Returns
    ///
    /// The count of key-value pairs in this document (top-level only, not including nested entries).
    ///
    /// # Examples
    ///
    /// Counting entries:
    /// ```ignore
    /// let doc = Document::new();
    /// assert_eq!(doc.size(), 0);
    ///
    /// let doc = doc!{ "name": "Alice", "age": 30 };
    /// assert_eq!(doc.size(), 2);
    ///
    /// // Nested documents count as one entry
    /// let doc = doc!{ "user": { "name": "Alice" }, "status": "active" };
    /// assert_eq!(doc.size(), 2);
    /// ```
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Merges a document in this document.
    ///
    /// Merges all key-value pairs from another document into this one. If a key already exists:
    /// - If both values are documents, they are merged recursively
    /// - Otherwise, the value from `other` overwrites the existing value
    ///
    /// # Arguments
    ///
    /// * `other` - The document to merge into this one.
    ///
    /// # Examples
    ///
    /// Basic merge:
    /// ```ignore
    /// let mut doc1 = doc!{ "name": "Alice", "age": 30 };
    /// let doc2 = doc!{ "email": "alice@example.com", "age": 31 };
    /// doc1.merge(&doc2)?;
    ///
    /// assert_eq!(doc1.get("name")?, Value::String("Alice".to_string()));
    /// assert_eq!(doc1.get("age")?, Value::I32(31));       // Overwritten
    /// assert_eq!(doc1.get("email")?, Value::String("alice@example.com".to_string()));
    /// ```
    ///
    /// Recursive merge of nested documents:
    /// ```ignore
    /// let mut doc1 = doc!{
    ///     "user": {
    ///         "name": "Alice",
    ///         "age": 30
    ///     }
    /// };
    /// let doc2 = doc!{
    ///     "user": {
    ///         "email": "alice@example.com"
    ///     }
    /// };
    /// doc1.merge(&doc2)?;
    ///
    /// assert_eq!(doc1.get("user.name")?, Value::String("Alice".to_string()));
    /// assert_eq!(doc1.get("user.age")?, Value::I32(30));
    /// assert_eq!(doc1.get("user.email")?, Value::String("alice@example.com".to_string()));
    /// ```
    pub fn merge(&mut self, other: &Document) -> NitriteResult<()> {
        for (key, value) in other.data.iter() {
            match value {
                Value::Document(obj) => {
                    // if the value is a document, merge it recursively
                    if let Some(Value::Document(mut nested_obj)) = self.data.get(key).cloned() {
                        nested_obj.merge(&obj)?;
                        self.data = self.data.update(key.clone(), Value::Document(nested_obj));
                    } else {
                        // Otherwise, just set the value
                        self.data = self.data.update(key.clone(), value.clone());
                    }
                }
                _ => {
                    // if there is no embedded document, put the field in the document
                    self.data = self.data.update(key.clone(), value.clone());
                }
            }
        }
        Ok(())
    }

    /// Checks if a top level key exists in the document.
    ///
    /// This method only checks for top-level keys, not embedded fields. Use [contains_field]
    /// to check for embedded fields.
    ///
    /// # Arguments
    ///
    /// * `key` - The key to check as a string slice.
    ///
    /// # Returns
    ///
    /// `true` if the key exists at the top level, `false` otherwise.
    ///
    /// # Examples
    ///
    /// Checking top-level keys:
    /// ```ignore
    /// let doc = doc!{
    ///     "name": "Alice",
    ///     "user": { "email": "alice@example.com" }
    /// };
    ///
    /// assert!(doc.contains_key("name"));
    /// assert!(doc.contains_key("user"));
    /// assert!(!doc.contains_key("email"));  // email is nested, not top-level
    /// assert!(!doc.contains_key("age"));    // doesn't exist
    /// ```
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Checks if a top level field or embedded field exists in the document.
    ///
    /// This method checks both top-level and embedded fields. It returns `true` if the
    /// field exists at any level in the document hierarchy.
    ///
    /// # Arguments
    ///
    /// * `field` - The field path to check as a string slice (e.g., `"user.email"`).
    ///
    /// # Returns
    ///
    /// `true` if the field exists at any level, `false` otherwise.
    ///
    /// # Examples
    ///
    /// Checking embedded fields:
    /// ```ignore
    /// let doc = doc!{
    ///     "name": "Alice",
    ///     "location": {
    ///         "city": "New York",
    ///         "address": {
    ///             "zip": 10001
    ///         }
    ///     }
    /// };
    ///
    /// assert!(doc.contains_field("name"));                     // Top-level
    /// assert!(doc.contains_field("location"));                 // Top-level document
    /// assert!(doc.contains_field("location.city"));            // Nested
    /// assert!(doc.contains_field("location.address.zip"));     // Deeply nested
    /// assert!(!doc.contains_field("location.country"));        // Doesn't exist
    /// ```
    pub fn contains_field(&self, field: &str) -> bool {
        if self.contains_key(field) {
            true
        } else {
            self.fields().contains(&field.to_string())
        }
    }

    /// Gets the document revision number.
    ///
    /// The revision number is an internal metadata field that tracks how many times
    /// the document has been modified. Returns 0 if the document has not been stored
    /// in a collection yet.
    ///
    /// # Returns
    ///
    /// The revision number as an `i32`, or 0 if not set.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let doc = Document::new();
    /// assert_eq!(doc.revision()?, 0);
    ///
    /// // After inserting and updating in a collection, revision increments
    /// let doc_from_collection = collection.find(all())?.next()?;
    /// let revision = doc_from_collection.revision()?;
    /// // revision will be > 0 depending on update history
    /// ```
    pub fn revision(&self) -> NitriteResult<i32> {
        if let Ok(Value::I32(revision)) = self.get(DOC_REVISION) {
            Ok(revision)
        } else {
            Ok(0)
        }
    }

    /// Gets the source of this document.
    ///
    /// The source is a metadata field that indicates where the document came from
    /// or what operation created it. Returns an empty string if not set.
    ///
    /// # Returns
    ///
    /// The source as a [String], or an empty string if not set.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let doc = Document::new();
    /// assert_eq!(doc.source()?, "");
    ///
    /// // Documents from collections may have source set by the database
    /// ```
    pub fn source(&self) -> NitriteResult<String> {
        if let Ok(Value::String(source)) = self.get(DOC_SOURCE) {
            Ok(source.clone())
        } else {
            Ok("".to_string())
        }
    }

    /// Gets last modified time of this document since epoch.
    ///
    /// Returns the timestamp (in milliseconds since Unix epoch) when the document
    /// was last modified. Returns 0 if the document has not been stored in a collection yet.
    ///
    /// # Returns
    ///
    /// The last modified time as an `i64` (milliseconds since epoch), or 0 if not set.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let doc = Document::new();
    /// assert_eq!(doc.last_modified_since_epoch()?, 0);
    ///
    /// // After inserting in a collection, timestamp is set
    /// let doc_from_collection = collection.find(all())?.next()?;
    /// let timestamp = doc_from_collection.last_modified_since_epoch()?;
    /// assert!(timestamp > 0);
    /// ```
    pub fn last_modified_since_epoch(&self) -> NitriteResult<i64> {
        if let Ok(Value::I64(modified)) = self.get(DOC_MODIFIED) {
            Ok(modified)
        } else {
            Ok(0)
        }
    }

    /// Converts this document to a [BTreeMap].
    ///
    /// Creates a new [BTreeMap] containing all the key-value pairs from this document.
    /// This is useful for interoperability with code expecting a standard map type.
    ///
    /// # Returns
    ///
    /// A new [BTreeMap] containing all entries from this document.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let doc = doc!{ "name": "Alice", "age": 30 };
    /// let map = doc.to_map();
    /// assert_eq!(map.len(), 2);
    /// assert_eq!(map.get("name").unwrap(), &Value::String("Alice".to_string()));
    /// ```
    pub fn to_map(&self) -> BTreeMap<String, Value> {
        self.data.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    /// Gets an iterator over the key-value pairs of this document.
    ///
    /// Returns a [DocumentIter] that iterates over all top-level key-value pairs
    /// in the document. Each iteration yields a tuple of (key, value) where both
    /// are owned values.
    ///
    /// # Returns
    ///
    /// A [DocumentIter] for iterating over the document entries.
    ///
    /// # Examples
    ///
    /// Iterating over document entries:
    /// ```ignore
    /// let doc = doc!{ "name": "Alice", "age": 30 };
    /// let mut count = 0;
    /// for (key, value) in doc.iter() {
    ///     count += 1;
    ///     println!("{}: {}", key, value);
    /// }
    /// assert_eq!(count, 2);
    /// ```
    ///
    /// Collecting entries into a vector:
    /// ```ignore
    /// let doc = doc!{ "name": "Alice", "age": 30 };
    /// let entries: Vec<_> = doc.iter().collect();
    /// assert_eq!(entries.len(), 2);
    /// ```
    pub fn iter(&self) -> DocumentIter {
        DocumentIter {
            keys: self.data.keys().cloned().collect(),
            data: self.clone(),
            index: 0,
        }
    }

    pub(crate) fn to_pretty_json(&self, indent: usize) -> String {
        if self.data.is_empty() {
            return "{}".to_string();
        }

        let estimated_size = self.data.len() * 30 + indent * 2;
        let mut json_string = String::with_capacity(estimated_size);

        json_string.push_str("{\n");
        let indent_str = " ".repeat(indent + 2);
        for (key, value) in self.data.iter() {
            json_string.push_str(&format!(
                "{}\"{}\": {},\n",
                indent_str,
                key,
                value.to_pretty_json(indent + 2)
            ));
        }

        json_string.pop();
        json_string.pop();
        json_string.push_str(&format!("\n{}}}", " ".repeat(indent)));
        json_string
    }

    pub(crate) fn to_debug_string(&self, indent: usize) -> String {
        if self.data.is_empty() {
            return "{}".to_string();
        }

        let mut debug_string = String::new();
        debug_string.push_str("{\n");
        let indent_str = " ".repeat(indent + 2);
        for (key, value) in self.data.iter() {
            debug_string.push_str(&format!(
                "{}\"{}\": {},\n",
                indent_str,
                key,
                value.to_debug_string(indent + 2)
            ));
        }

        debug_string.pop();
        debug_string.pop();
        debug_string.push_str(&format!("\n{}}}", " ".repeat(indent)));
        debug_string
    }

    fn is_embedded(&self, key: &str) -> bool {
        FIELD_SEPARATOR.read_with(|it| key.contains(it))
    }

    fn get_fields_internal(&self, prefix: &str) -> FieldVec {
        let mut fields = FieldVec::new();
        let separator = FIELD_SEPARATOR.read_with(|s| s.clone());

        // iterate top level keys
        for key in self.data.keys() {
            // ignore the reserved fields
            if RESERVED_FIELDS.contains(&key.as_str()) {
                continue;
            }

            if key.is_empty() {
                continue;
            }

            let field = if prefix.is_empty() {
                // level-1 fields
                key.clone()
            } else {
                // level-n fields, separated by field separator
                format!("{}{}{}", prefix, separator, key)
            };

            if let Some(Value::Document(doc)) = self.data.get(key) {
                // if the value is a document, traverse its fields recursively,
                // prefix would be the field name of the document
                fields.append(&mut doc.get_fields_internal(&field));
            } else {
                // if there is no more embedded document, add the field to the list
                fields.push(field);
            }
        }
        fields
    }

    fn deep_get(&self, key: &str) -> NitriteResult<Value> {
        if !self.is_embedded(key) {
            Ok(Value::Null)
        } else {
            self.get_by_embedded_key(key)
        }
    }

    fn deep_put(&mut self, splits: &[&str], value: Value) -> NitriteResult<()> {
        if splits.is_empty() {
            log::error!("Empty embedded key");
            return Err(NitriteError::new(
                "Empty embedded key",
                ErrorKind::ValidationError,
            ));
        }

        let key = splits[0];
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(NitriteError::new(
                "Document does not support empty key",
                ErrorKind::InvalidOperation,
            ));
        }

        if splits.len() == 1 {
            // if last key, simply put in the current document
            self.put(key, value)
        } else {
            let remaining_splits = &splits[1..];
            if let Some(Value::Document(mut obj)) = self.data.get(key).cloned() {
                // if the current level value is embedded doc, scan to the next level
                let result = obj.deep_put(remaining_splits, value);
                self.data = self.data.update(key.to_string(), Value::Document(obj));
                result
            } else {
                // if current level value is null, create a new document
                let mut nested_doc = Document::new();
                let result = nested_doc.deep_put(remaining_splits, value);
                self.data = self.data.update(key.to_string(), Value::Document(nested_doc));
                result
            }
        }
    }

    fn deep_remove(&mut self, splits: &[&str]) -> NitriteResult<()> {
        if splits.is_empty() {
            log::error!("Empty embedded key");
            return Err(NitriteError::new(
                "Empty embedded key",
                ErrorKind::ValidationError,
            ));
        }

        let key = splits[0];
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(NitriteError::new(
                "Document does not support empty key",
                ErrorKind::InvalidOperation,
            ));
        }

        if splits.len() == 1 {
            // if last key, simply remove from the current document
            self.remove(key)
        } else {
            let remaining_splits = &splits[1..];

            match self.data.get(key) {
                Some(Value::Document(obj)) => {
                    // if the current level value is embedded doc, scan to the next level
                    let mut nested_doc = obj.clone();
                    let result = nested_doc.deep_remove(remaining_splits);
                    if nested_doc.is_empty() {
                        // if the next level document is an empty one
                        // remove the current level document also
                        self.data = self.data.without(key);
                    } else {
                        self.data = self.data.update(key.to_string(), Value::Document(nested_doc));
                    }
                    result
                }
                Some(Value::Array(arr)) => {
                    let first = splits[1];
                    // if the current level value is an iterable,
                    // remove the element at the next level
                    if let Ok(index) = first.parse::<isize>() {
                        if index < 0 {
                            log::error!(
                                "Invalid array index {} to access array inside a document",
                                &index
                            );
                            return Err(NitriteError::new(
                                &format!(
                                    "Invalid array index {} to access array inside a document",
                                    &index
                                ),
                                ErrorKind::ValidationError,
                            ));
                        }

                        let index = index as usize;
                        if index >= arr.len() {
                            log::error!("Array index {} out of bound", &index);
                            return Err(NitriteError::new(
                                &format!("Array index {} out of bound", &index),
                                ErrorKind::ValidationError,
                            ));
                        }

                        let item = &arr[index];
                        if let (Value::Document(obj), true) = (item, splits.len() > 2) {
                            // if there are more splits, then this is an embedded document
                            let mut nested_doc = obj.clone();
                            let result = nested_doc.deep_remove(&remaining_splits[1..]);
                            if nested_doc.is_empty() {
                                // if the next level document is an empty one
                                // remove the element from array
                                let mut new_arr = arr.clone();
                                new_arr.remove(index);
                                self.data = self.data.update(key.to_string(), Value::Array(new_arr));
                            } else {
                                let mut new_arr = arr.clone();
                                new_arr[index] = Value::Document(nested_doc);
                                self.data = self.data.update(key.to_string(), Value::Array(new_arr));
                            }
                            result
                        } else {
                            // if there are no more splits, remove the element at the next level
                            let mut new_arr = arr.clone();
                            new_arr.remove(index);
                            self.data = self.data.update(key.to_string(), Value::Array(new_arr));
                            Ok(())
                        }
                    } else {
                        log::error!(
                            "Invalid array index {} to access array inside a document",
                            first
                        );
                        Err(NitriteError::new(
                            &format!(
                                "Invalid array index {} to access array inside a document",
                                first
                            ),
                            ErrorKind::ValidationError,
                        ))
                    }
                }
                _ => {
                    // if current level value is null, remove the key
                    self.data = self.data.without(key);
                    Ok(())
                }
            }
        }
    }

    fn get_by_embedded_key(&self, key: &str) -> NitriteResult<Value> {
        let separator = FIELD_SEPARATOR.read_with(|s| s.clone());
        let splits: Vec<&str> = key.split(&separator).collect();
        
        if splits.is_empty() {
            return Ok(Value::Null);
        }

        let first = splits[0];
        if first.is_empty() {
            log::error!("Document does not support empty key");
            return Err(NitriteError::new(
                "Document does not support empty key",
                ErrorKind::InvalidOperation,
            ));
        }

        // get current level value and scan to next level using remaining keys
        self.recursive_get(self.data.get(first), &splits[1..])
    }

    fn recursive_get(&self, value: Option<&Value>, splits: &[&str]) -> NitriteResult<Value> {
        let value = match value {
            None => return Ok(Value::Null),
            Some(v) => v,
        };

        if splits.is_empty() {
            return Ok(value.clone());
        }

        let key = splits[0];
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(NitriteError::new(
                "Document does not support empty key",
                ErrorKind::InvalidOperation,
            ));
        }

        match value {
            Value::Document(obj) => {
                // if the current level value is document, scan to the next level with remaining keys
                self.recursive_get(obj.data.get(key), &splits[1..])
            }
            Value::Array(arr) => {
                // if the current level value is an iterable
                let first = key;
                if let Ok(index) = first.parse::<isize>() {
                    // check index lower bound
                    if index < 0 {
                        log::error!(
                            "Invalid array index {} to access array inside a document",
                            &index
                        );
                        return Err(NitriteError::new(
                            &format!(
                                "Invalid array index {} to access array inside a document",
                                &index
                            ),
                            ErrorKind::ValidationError,
                        ));
                    }

                    // check index upper bound
                    let index = index as usize;
                    if index >= arr.len() {
                        log::error!("Array index {} out of bound", &index);
                        return Err(NitriteError::new(
                            &format!("Array index {} out of bound", &index),
                            ErrorKind::ValidationError,
                        ));
                    }

                    // get the value at the index from the list
                    let item = &arr[index];
                    self.recursive_get(Some(item), &splits[1..])
                } else {
                    // if the current key is not an integer, decompose the list
                    self.decompose(arr, &splits)
                }
            }
            _ => Ok(Value::Null), // if no match found return null
        }
    }

    fn decompose(&self, arr: &[Value], splits: &[&str]) -> NitriteResult<Value> {
        let mut items: Vec<Value> = Vec::with_capacity(arr.len());

        for item in arr {
            // scan the item using remaining keys and use ? for error propagation
            let result = self.recursive_get(Some(item), splits)?;

            match result {
                Value::Array(arr) => {
                    // if the result is an iterable, add all items to the list
                    for v in arr {
                        items.push(v);
                    }
                }
                value => {
                    // if the result is not an iterable, add the result to the list
                    items.push(value);
                }
            }
        }
        // remove duplicates from the list
        Ok(Value::Array(items.iter().unique().cloned().collect::<Vec<_>>()))
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_debug_string(0))
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_pretty_json(0))
    }
}

pub struct DocumentIter {
    keys: Vec<String>,
    data: Document,
    index: usize,
}

impl Iterator for DocumentIter {
    type Item = (String, Value);

    fn next(&mut self) -> Option<Self::Item> {
        if self.index < self.keys.len() {
            let key = &self.keys[self.index];
            if let Some(value) = self.data.data.get(key) {
                let result = (key.clone(), value.clone());
                self.index += 1;
                return Some(result);
            }
            self.index += 1;
            self.next()
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.keys.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

pub fn normalize(value: &str) -> String {
    value.trim_matches('"').to_string()
}

/// Creates a Nitrite Document with JSON-like syntax.
///
/// # Examples
///
/// ```rust
/// use nitrite::doc;
///
/// // Empty document
/// let empty = doc!{};
///
/// // Simple key-value pairs
/// let simple = doc!{
///     name: "Alice",
///     age: 30
/// };
///
/// // With expressions
/// let base = 100;
/// let with_expr = doc!{
///     name: "Bob",
///     score: (base * 2),
///     computed: (base + 50)
/// };
///
/// // Nested documents and arrays
/// let complex = doc!{
///     user: {
///         name: "Charlie",
///         tags: ["admin", "user"]
///     },
///     values: [1, 2, 3]
/// };
/// ```
#[macro_export]
macro_rules! doc {
    // match an empty document (with braces for backward compat)
    ({}) => {
        $crate::collection::Document::new()
    };

    // match an empty document (new syntax)
    () => {
        $crate::collection::Document::new()
    };

    // match a document with key value pairs (old syntax with outer braces - for backward compat)
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::doc!($($key : $value),*)
    };

    // match a document with key value pairs (new syntax without outer braces)
    ($($key:tt : $value:tt),* $(,)?) => {
        {
            #[allow(unused_imports)]
            use $crate::doc_value;

            let mut doc = $crate::collection::Document::new();
            $(
                doc.put(&$crate::collection::normalize(stringify!($key)), $crate::doc_value!($value))
                .expect(&format!("Failed to put value {} in document", stringify!($value)));
            )*
            doc
        }
    };
}

/// Helper macro to convert values for the doc! macro.
/// Handles nested documents, arrays, and expressions.
#[macro_export]
macro_rules! doc_value {
    // match a nested document
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        {
            $crate::common::Value::Document($crate::doc!{ $($key : $value),* })
        }
    };

    // match an array of values
    ([ $($value:tt),* $(,)? ]) => {
        $crate::common::Value::Array(vec![$($crate::doc_value!($value)),*])
    };

    // match an expression (variable, function call, arithmetic in parens, literals, etc.)
    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}

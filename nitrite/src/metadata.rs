use crate::{collection::Document, errors::NitriteResult, store::Metadata, Value};

/// Database metadata capturing store creation time, versions, and schema information.
///
/// NitriteMetadata encapsulates essential metadata about a Nitrite database instance,
/// including when it was created and what versions of the store and schema are in use.
/// This metadata is persisted as a special document and used for compatibility checking
/// and initialization during database open operations.
///
/// # Fields
/// - `create_time`: Timestamp (milliseconds) when the database was created
/// - `store_version`: Version string of the storage engine (e.g., "2.0.0")
/// - `nitrite_version`: Version string of the Nitrite library (e.g., "3.0.0")
/// - `schema_version`: Numeric schema version for compatibility tracking
///
/// # Characteristics
/// - **Cloneable**: Can be efficiently cloned for sharing across threads
/// - **Serializable**: Converts to/from Document for persistence
/// - **Versioned**: Supports schema and version migrations
/// - **Defaults**: Missing fields default to sensible values ("1.0.0" for versions, 0 for numeric fields)
///
/// # Usage
///
/// Metadata is typically:
/// 1. Created from a database Document via `new()` during database initialization
/// 2. Used for version compatibility checks before opening a database
/// 3. Serialized back to a Document via `get_info()` for persistence
#[derive(Debug, Clone)]
pub struct NitriteMetadata {
    pub create_time: u128,
    pub store_version: String,
    pub nitrite_version: String,
    pub schema_version: u32,
}

impl NitriteMetadata {
    /// Creates NitriteMetadata by extracting metadata fields from a Document.
    ///
    /// # Arguments
    /// * `document` - A Document containing metadata fields. Supports both complete and partial documents.
    ///
    /// # Returns
    /// A new NitriteMetadata instance with extracted fields or defaults for missing fields.
    ///
    /// # Field Extraction
    ///
    /// Extracts the following fields from the document:
    /// - `create_time`: u128 timestamp, defaults to 0 if missing or invalid type
    /// - `store_version`: String version, defaults to "1.0.0" if missing or invalid type
    /// - `nitrite_version`: String version, defaults to "1.0.0" if missing or invalid type
    /// - `schema_version`: u32 version, defaults to 0 if missing or invalid type
    ///
    /// # Behavior
    ///
    /// Type validation is lenient - if a field exists but has the wrong type, the default
    /// value for that field is used rather than returning an error. This allows backward
    /// compatibility with older metadata documents that may have type variations.
    ///
    /// # Errors
    ///
    /// Returns error only if document access fails (e.g., document corruption).
    /// Invalid field types use defaults instead of causing errors.
    pub fn new(document: &Document) -> NitriteResult<NitriteMetadata> {
        // Cache document lookups to avoid repeated get() calls
        let create_time_val = document.get("create_time")?;
        let store_version_val = document.get("store_version")?;
        let nitrite_version_val = document.get("nitrite_version")?;
        let schema_version_val = document.get("schema_version")?;
        
        Ok(NitriteMetadata {
            create_time: *create_time_val.as_u128().unwrap_or(&0u128),
            store_version: store_version_val.as_string().map_or("1.0.0", |v| v).to_string(),
            nitrite_version: nitrite_version_val.as_string().map_or("1.0.0", |v| v).to_string(),
            schema_version: *schema_version_val.as_u32().unwrap_or(&0u32),
        })
    }
}

impl Metadata for NitriteMetadata {
    /// Serializes this metadata to a Document for persistence.
    ///
    /// # Returns
    /// A Document containing the metadata fields:
    /// - `create_time`: u128 creation timestamp
    /// - `store_version`: String store engine version
    /// - `nitrite_version`: String Nitrite library version
    /// - `schema_version`: u32 schema version
    ///
    /// # Behavior
    ///
    /// Creates a new Document and populates all four metadata fields from this instance.
    /// String fields (store_version, nitrite_version) are cloned during serialization
    /// to ensure the returned Document is independent of this metadata instance.
    ///
    /// All put operations are performed safely and result errors are ignored, as field
    /// insertion should always succeed for valid metadata values. The returned Document
    /// is guaranteed to contain all four fields.
    ///
    /// # Usage
    ///
    /// Used during database shutdown to persist metadata back to storage:
    /// 1. Metadata instance is converted to Document via get_info()
    /// 2. Document is written to special metadata storage location
    /// 3. On next database open, metadata is read back and reconstructed via new()
    fn get_info(&self) -> Document {
        let mut document = Document::new();
        let _ = document.put("create_time", Value::from(self.create_time));
        let _ = document.put("store_version", Value::from(self.store_version.clone()));
        let _ = document.put(
            "nitrite_version",
            Value::from(self.nitrite_version.clone()),
        );
        let _ = document.put("schema_version", Value::from(self.schema_version));
        document
    }
}

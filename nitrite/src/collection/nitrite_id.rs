use crate::errors::{ErrorKind, NitriteError, NitriteResult};
use crate::{ID_GENERATOR, NO2};
use once_cell::sync::Lazy;
use std::cmp::Ordering;
use std::fmt::{Debug, Display};

static NO2_STR: Lazy<String> = Lazy::new(|| NO2.to_string());

static ID_TOO_LARGE_ERROR: Lazy<NitriteError> = Lazy::new(|| {
    NitriteError::new(
        &format!("NitriteId validation error: id value must be less than 10^19 ({})", 10u64.pow(19)),
        ErrorKind::InvalidId
    )
});

static ID_TOO_SMALL_ERROR: Lazy<NitriteError> = Lazy::new(|| {
    NitriteError::new(
        &format!("NitriteId validation error: id value must be greater than or equal to 10^18 ({})", 10u64.pow(18)),
        ErrorKind::InvalidId
    )
});

static MAX_VALUE: Lazy<u64> = Lazy::new(|| 10u64.pow(19));
static MIN_VALUE: Lazy<u64> = Lazy::new(|| 10u64.pow(18));

/// A unique identifier for documents in Nitrite.
///
/// Each document in a collection is uniquely identified by a `NitriteId`. The ID is
/// automatically generated using a Snowflake-like distributed ID generator if not
/// explicitly provided when inserting a document.
///
/// # ID Generation
///
/// Nitrite uses a Snowflake-based ID generator that produces 64-bit unsigned integers
/// in the range [10^18, 10^19). This ensures:
/// - Uniqueness across all documents and replicas
/// - Approximate timestamp ordering
/// - No central coordination required
///
/// # Examples
///
/// ```rust,ignore
/// use nitrite::collection::NitriteId;
/// use nitrite::collection::Document;
///
/// // Auto-generate an ID
/// let id = NitriteId::new();
///
/// // Create a specific ID (if valid)
/// let id = NitriteId::create_id(1000000000000000001)?;
///
/// // Use with documents
/// let mut doc = Document::new();
/// // Document ID is auto-set during insertion
/// ```
///
/// # Storage
///
/// The ID is stored in the `_id` field of documents. When retrieving or updating
/// documents, you can use `get_by_id()` for O(1) access.
#[derive(PartialEq, Eq, Ord, PartialOrd, Hash, Clone, Copy, serde::Deserialize, serde::Serialize)]
pub struct NitriteId {
    id_value: u64,
}

impl NitriteId {
    /// Generates a new unique `NitriteId`.
    ///
    /// Uses the internal Snowflake ID generator to create a unique ID
    /// based on timestamp and machine information.
    ///
    /// # Returns
    ///
    /// A new unique `NitriteId`
    pub fn new() -> Self {
        let id_value = ID_GENERATOR.get_id();
        NitriteId {
            id_value,
        }
    }

    /// Creates a `NitriteId` from a specific value.
    ///
    /// The value must be within the valid range [10^18, 10^19).
    /// This is useful when you want to use custom ID values, such as UUIDs
    /// converted to integers or existing ID schemes.
    ///
    /// # Arguments
    ///
    /// * `id_value` - A 64-bit unsigned integer ID
    ///
    /// # Returns
    ///
    /// `Ok(NitriteId)` if the value is valid, or `Err(NitriteError)` if it's outside
    /// the valid range
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let id = NitriteId::create_id(1000000000000000001)?;
    /// ```
    pub fn create_id(id_value: u64) -> NitriteResult<NitriteId> {
        NitriteId::valid_id(id_value)?;
        Ok(NitriteId { id_value })
    }

    /// Gets the numeric value of this ID.
    ///
    /// # Returns
    ///
    /// The 64-bit unsigned integer value of this ID
    pub fn id_value(&self) -> u64 {
        self.id_value
    }

    pub(crate) fn valid_id(id_value: u64) -> NitriteResult<bool> {    
        if id_value >= *MAX_VALUE {
            log::error!("Id value is too large");
            return Err(ID_TOO_LARGE_ERROR.clone());
        } else if id_value < *MIN_VALUE {
            log::error!("Id value is too small");
            return Err(ID_TOO_SMALL_ERROR.clone());
        }
        
        Ok(true)
    }
}

impl Default for NitriteId {
    fn default() -> Self {
        NitriteId::new()
    }
}

impl Debug for NitriteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]{}", self.id_value, &*NO2_STR)
    }
}

impl Display for NitriteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]{}", self.id_value, &*NO2_STR)
    }
}

use fjall::UserKey;
use nitrite::common::Value;
use nitrite::errors::{ErrorKind, NitriteError};
use std::error::Error;
use thiserror::Error;
/// Error type for FjallValue serialization/deserialization operations.
///
/// Provides granular error information for Value serialization/deserialization failures
/// in the Fjall adapter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FjallValueError {
    /// Deserialization of binary data failed
    #[error("Deserialization failed: {0}")]
    DeserializationError(String),
    /// Serialization of a value failed
    #[error("Serialization failed: {0}")]
    SerializationError(String),
    /// Invalid UTF-8 encountered in serialized data
    #[error("Invalid UTF-8 in serialized data: {0}")]
    InvalidUtf8(String),
}
impl From<FjallValueError> for NitriteError {
    /// Converts a `FjallValueError` to a `NitriteError` with ObjectMappingError kind.
    fn from(err: FjallValueError) -> Self {
        NitriteError::new(&err.to_string(), ErrorKind::ObjectMappingError)
    }
}
/// Result type for FjallValue operations.
///
/// Used throughout the Fjall adapter for fallible Value serialization/deserialization.
pub type FjallValueResult<T> = Result<T, FjallValueError>;
/// Byte-serialized wrapper for Nitrite Values.
///
/// Encapsulates a Value as a Vec<u8> for storage in Fjall's partition. Handles
/// serialization/deserialization using bincode.
/// Implements numeric type normalization to ensure consistent index behavior across
/// different numeric types.
///
/// Characteristics:
/// - Serialization: Converts Value to bytes for disk storage
/// - Deserialization: Restores Value from bytes with error handling
/// - Normalization: Ensures numeric type consistency (U64 → I64, etc.)
/// - Cloneable: Full clone support for Vec<u8> data
/// - Comparable: Derives PartialEq and Eq for content comparison
///
/// Normalization details:
/// - U8, U16, U32, U64, U128, USize: Converted to signed equivalents
/// - I8 through ISize: Preserved as-is
/// - String, Array, Document, Boolean: Preserved as-is
///
/// Usage: Created via `try_from_value()` for serialization, or `try_into_value()`
/// for deserialization. Available as FjallValue::new() for infallible operations
/// (panics on errors - use try_* methods for safe code).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FjallValue(Vec<u8>);
impl FjallValue {
    /// Normalize numeric types to ensure consistent byte representation across different numeric types.
    /// This is essential for index operations to work correctly with mixed numeric types.
    ///
    /// For example: Value::I64(5) and Value::U64(5) will both be normalized to Value::I64(5)
    /// to ensure they serialize to the same bytes and compare correctly in indexes.
    #[inline]
    fn normalize_numeric_type(value: &Value) -> Value {
        match value {
            // Convert all unsigned integer types to their signed equivalents when possible
            Value::U8(v) => Value::I8(*v as i8),
            Value::U16(v) => Value::I16(*v as i16),
            Value::U32(v) => Value::I32(*v as i32),
            Value::U64(v) => Value::I64(*v as i64),
            Value::U128(v) => Value::I128(*v as i128),
            Value::USize(v) => Value::ISize(*v as isize),
            // Keep other values as-is
            other => other.clone(),
        }
    }
    /// Try to create FjallValue from Value using normalization for numeric types.
    /// This ensures consistent index behavior across different numeric types.
    ///
    /// # Returns
    /// - `Ok(FjallValue)` on successful serialization
    /// - `Err(FjallValueError)` on serialization failure
    #[inline]
    pub fn try_from_value_normalized(value: &Value) -> FjallValueResult<FjallValue> {
        let normalized = Self::normalize_numeric_type(value);
        bincode::serde::encode_to_vec(&normalized, bincode::config::legacy())
            .map(FjallValue)
            .map_err(|e| FjallValueError::SerializationError(e.to_string()))
    }
    /// Try to convert FjallValue to Value using TryFrom pattern.
    ///
    /// **RECOMMENDED FOR PRODUCTION USE**: Returns Result for safe error handling.
    ///
    /// # Returns
    /// - `Ok(Value)` on successful deserialization
    /// - `Err(FjallValueError)` on corrupted or invalid data
    #[inline]
    pub fn try_into_value(self) -> FjallValueResult<Value> {
        bincode::serde::decode_from_slice(&self.0, bincode::config::legacy())
            .map(|(value, _)| value)
            .map_err(|e| FjallValueError::DeserializationError(e.to_string()))
    }
    /// Try to create FjallValue from Value using fallible conversion.
    ///
    /// **RECOMMENDED FOR PRODUCTION USE**: Returns Result for safe error handling.
    ///
    /// # Returns
    /// - `Ok(FjallValue)` on successful serialization
    /// - `Err(FjallValueError)` on serialization failure
    #[inline]
    pub fn try_from_value(value: &Value) -> FjallValueResult<FjallValue> {
        bincode::serde::encode_to_vec(value, bincode::config::legacy())
            .map(FjallValue)
            .map_err(|e| FjallValueError::SerializationError(e.to_string()))
    }
    /// Create a new FjallValue from a Value.
    ///
    /// **WARNING: PANICS ON ERROR** - Use only with trusted values known to serialize successfully.
    /// For production code, prefer `try_from_value()` which returns a Result.
    ///
    /// # Panics
    /// - If the value fails to serialize
    #[inline]
    pub fn new(value: Value) -> Self {
        if let Ok(fjall_value) = Self::try_from_value(&value) {
            fjall_value
        } else {
            panic!("Failed to serialize value: {:?}", value)
        }
    }
}
/// Safe conversion using Into trait. Panics only on corrupted/invalid data.
///
/// **WARNING: This trait implementation can panic on corrupted deserialization data.**
/// For safe, production-ready code, use `try_into_value()` which returns a Result.
///
/// # Panics
/// - If deserialization fails (corrupted data, format version mismatch, etc.)
impl From<FjallValue> for Value {
    fn from(val: FjallValue) -> Self {
        if let Ok(value) = val.try_into_value() {
            value
        } else {
            panic!("Failed to deserialize FjallValue")
        }
    }
}
/// Safe conversion using From trait. Panics only on serialization failure.
///
/// **WARNING: This trait implementation can panic on serialization failure.**
/// For safe, production-ready code, use `try_from_value()` which returns a Result.
///
/// # Panics
/// - If serialization fails
impl From<Value> for FjallValue {
    fn from(value: Value) -> Self {
        if let Ok(fjall_value) = Self::try_from_value(&value) {
            fjall_value
        } else {
            panic!("Failed to serialize value: {:?}", value)
        }
    }
}
impl From<FjallValue> for UserKey {
    /// Converts FjallValue to a Fjall UserKey for partition operations.
    ///
    /// Returns: UserKey wrapping the internal byte vector
    #[inline]
    fn from(val: FjallValue) -> Self {
        UserKey::new(&val.0)
    }
}
impl From<UserKey> for FjallValue {
    /// Converts a Fjall UserKey back to FjallValue.
    ///
    /// Arguments:
    /// - `value`: UserKey to convert
    ///
    /// Returns: FjallValue containing the key's bytes
    #[inline]
    fn from(value: UserKey) -> Self {
        FjallValue(value.to_vec())
    }
}
impl AsRef<[u8]> for FjallValue {
    /// Returns a byte slice reference to the serialized data.
    ///
    /// Returns: Reference to internal Vec<u8> as a byte slice
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
/// Converts Fjall backend errors to Nitrite errors.
///
/// Maps error message patterns to appropriate NitriteError kinds:
/// - "closed" → StoreAlreadyClosed
/// - "not found" → StoreNotInitialized
/// - "corrupt" → FileCorrupted
/// - "permission" → PermissionDenied
/// - "full" → DiskFull
/// - Other → BackendError
///
/// Arguments:
/// - `error`: Fjall error to convert
///
/// Returns: NitriteError with mapped kind and formatted message
pub(crate) fn to_nitrite_error(error: impl Error) -> NitriteError {
    // Map specific error messages to appropriate NitriteError variants with early returns
    let error_msg = error.to_string();
    let error_kind = if error_msg.contains("closed") {
        ErrorKind::StoreAlreadyClosed
    } else if error_msg.contains("not found") {
        ErrorKind::StoreNotInitialized
    } else if error_msg.contains("deleted") || error_msg.contains("PartitionDeleted") {
        // Partition was deleted - treat as not found/not initialized
        ErrorKind::StoreNotInitialized
    } else if error_msg.contains("corrupt") {
        ErrorKind::FileCorrupted
    } else if error_msg.contains("permission") {
        ErrorKind::PermissionDenied
    } else if error_msg.contains("full") {
        ErrorKind::DiskFull
    } else {
        ErrorKind::BackendError
    };
    NitriteError::new(&format!("Fjall Error: {}", error_msg), error_kind)
}

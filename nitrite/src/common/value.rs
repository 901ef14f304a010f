use crate::collection::Document;
use crate::collection::NitriteId;
use crate::errors::{ErrorKind, NitriteError, NitriteResult};
use argon2::password_hash::Decimal;
use std::any::{Any, TypeId};
use std::collections::BTreeMap;
use std::fmt::{Debug, Display, Formatter};
use std::hash::Hash;

/// Compare two integers represented as u128 for equality.
/// This handles cross-type comparison by converting to a common type.
#[inline]
fn num_eq_int(a: u128, b: u128) -> bool {
    a == b
}

/// Compare two floats for equality with proper NaN handling.
#[inline]
fn num_eq_float(a: f64, b: f64) -> bool {
    if a.is_nan() && b.is_nan() {
        true
    } else {
        a == b
    }
}

/// Compare two integers represented as u128.
#[inline]
fn num_cmp_int(a: u128, b: u128) -> std::cmp::Ordering {
    a.cmp(&b)
}

/// Compare two floats with proper NaN and total ordering.
#[inline]
fn num_cmp_float(a: f64, b: f64) -> std::cmp::Ordering {
    // Handle NaN: treat NaN as greater than all other values
    match (a.is_nan(), b.is_nan()) {
        (true, true) => std::cmp::Ordering::Equal,
        (true, false) => std::cmp::Ordering::Greater,
        (false, true) => std::cmp::Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal),
    }
}

/// Represents a [Document] value. It can be a simple value like [Value::I32], [Value::String] or
/// a complex value like [Value::Document] or [Value::Array].
///
/// # Purpose
/// Provides a unified representation for all value types that can be stored in Nitrite documents.
/// Supports native Rust types (integers, floats, strings, booleans) and complex types
/// (documents, arrays, maps), as well as Nitrite-specific types (NitriteId).
///
/// # Variants
/// - Null: Absence of a value
/// - Bool(bool): Boolean true/false
/// - I8-U128: Integer types with various bit widths (8, 16, 32, 64, 128 bits, signed/unsigned)
/// - ISize/USize: Platform-dependent integer types
/// - F32/F64: Floating point types (32-bit and 64-bit)
/// - Char(char): Single Unicode character
/// - String(String): Text value
/// - Document(Document): Nested document/object
/// - Array(Vec<Value>): Ordered collection of values
/// - Map(BTreeMap<Value, Value>): Key-value mapping structure
/// - NitriteId(NitriteId): Database-generated unique identifier
/// - Bytes(Vec<u8>): Binary data (not indexable/queryable)
/// - Unknown: Unrecognized value type
///
/// # Characteristics
/// - **Flexible**: Supports any JSON-compatible type plus Nitrite-specific types
/// - **Type-safe**: Each variant explicitly represents its type
/// - **Comparable**: Implements Ord for sorting and comparisons
/// - **Serializable**: Can be serialized/deserialized with serde
/// - **Default**: Defaults to Null
///
/// # Usage
/// Create values using From trait, from() helper, or val! macro:
/// ```text
/// let v1: Value = 42.into();           // From i32
/// let v2 = Value::from("hello");       // From &str
/// let v3 = val!(true);                 // Using macro
/// let doc = doc! { "age": 42, "name": "Alice" };
/// ```
///
/// Access values using as_* methods (returns Option if type matches):
/// ```text
/// if let Some(name) = doc.get("name").and_then(|v| v.as_string()) {
///     println!("Name: {}", name);
/// }
/// ```
#[derive(Clone, Default, serde::Deserialize, serde::Serialize)]
pub enum Value {
    /// Represents a null value.
    #[default]
    Null,
    /// Represents a boolean value.
    Bool(bool),
    /// Represents a signed 8-bit integer value.
    I8(i8),
    /// Represents an unsigned 8-bit integer value.
    U8(u8),
    /// Represents a signed 16-bit integer value.
    I16(i16),
    /// Represents an unsigned 16-bit integer value.
    U16(u16),
    /// Represents a signed 32-bit integer value.
    I32(i32),
    /// Represents an unsigned 32-bit integer value.
    U32(u32),
    /// Represents a signed 64-bit integer value.
    I64(i64),
    /// Represents an unsigned 64-bit integer value.
    U64(u64),
    /// Represents a signed 128-bit integer value.
    I128(i128),
    /// Represents an unsigned 128-bit integer value.
    U128(u128),
    /// Represents a signed isize value.
    ISize(isize),
    /// Represents an unsigned isize value.
    USize(usize),
    /// Represents a 32-bit floating point value.
    F32(f32),
    /// Represents a 64-bit floating point value.
    F64(f64),
    /// Represents a character value.
    Char(char),
    /// Represents a string value.
    String(String),
    /// Represents a document value.
    Document(Document),
    /// Represents an array value.
    Array(Vec<Value>),
    /// Represents a map.
    Map(BTreeMap<Value, Value>),
    /// Represents a NitriteId value.
    NitriteId(NitriteId),
    /// Represents a byte array value.
    /// It will be used for binary data. It cannot be indexed or queried.
    Bytes(Vec<u8>),
    /// Represents an unknown value.
    Unknown,
}

/// Type alias for map and document keys.
///
/// # Purpose
/// Alias for `Value` used as keys in map structures. Since `Value` is used for both
/// document values and map keys, this type alias provides semantic clarity that a
/// `Value` is being used as a key rather than a regular value.
///
/// # Characteristics
/// - **Same as Value**: Supports all Value types as keys
/// - **Comparable**: Implements Ord for key ordering
/// - **Hashable**: Implements Hash for use in hash-based structures
/// - **Generic**: Works with any Value variant that implements the required traits
///
/// # Usage
/// Used with the `key!` macro for convenient key creation:
/// ```text
/// let k = key!("field_name");  // Create a string key
/// let k = key!(42);             // Create an integer key
/// ```
pub type Key = Value;

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_debug_string(0))
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_pretty_json(0))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        if self.is_integer() && other.is_integer() {
            let self_int = self.as_integer();
            let other_int = other.as_integer();

            if let (Some(self_int), Some(other_int)) = (self_int, other_int) {
                return num_eq_int(self_int, other_int);
            }
        }

        if self.is_decimal() && other.is_decimal() {
            let self_decimal = self.as_decimal();
            let other_decimal = other.as_decimal();

            if let (Some(self_decimal), Some(other_decimal)) = (self_decimal, other_decimal) {
                return num_eq_float(self_decimal, other_decimal);
            }
        }

        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => *a == *b,
            (Value::Char(a), Value::Char(b)) => *a == *b,
            (Value::String(a), Value::String(b)) => *a == *b,
            (Value::Document(a), Value::Document(b)) => *a == *b,
            (Value::Array(a), Value::Array(b)) => *a == *b,
            (Value::Map(a), Value::Map(b)) => *a == *b,
            (Value::NitriteId(a), Value::NitriteId(b)) => *a == *b,
            (Value::Bytes(a), Value::Bytes(b)) => *a == *b,
            (Value::Unknown, Value::Unknown) => true,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        if self.is_integer() && other.is_integer() {
            let self_int = self.as_integer();
            let other_int = other.as_integer();

            if let (Some(self_int), Some(other_int)) = (self_int, other_int) {
                return num_cmp_int(self_int, other_int);
            }
        }

        if self.is_decimal() && other.is_decimal() {
            let self_decimal = self.as_decimal();
            let other_decimal = other.as_decimal();

            if let (Some(self_decimal), Some(other_decimal)) = (self_decimal, other_decimal) {
                return num_cmp_float(self_decimal, other_decimal);
            }
        }

        match (self, other) {
            (Value::Null, Value::Null) => std::cmp::Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Char(a), Value::Char(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Document(a), Value::Document(b)) => a.cmp(b),
            (Value::Array(a), Value::Array(b)) => a.cmp(b),
            (Value::Map(a), Value::Map(b)) => a.cmp(b),
            (Value::NitriteId(a), Value::NitriteId(b)) => a.cmp(b),
            (Value::Bytes(a), Value::Bytes(b)) => a.cmp(b),
            (Value::Unknown, Value::Unknown) => std::cmp::Ordering::Equal,
            _ => self.to_string().cmp(&other.to_string()), // fallback to string comparison
        }
    }
}

impl Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Value::Null => (&"null_value").hash(state),
            Value::Bool(v) => v.hash(state),
            Value::I8(v) => v.hash(state),
            Value::U8(v) => v.hash(state),
            Value::I16(v) => v.hash(state),
            Value::U16(v) => v.hash(state),
            Value::I32(v) => v.hash(state),
            Value::U32(v) => v.hash(state),
            Value::I64(v) => v.hash(state),
            Value::U64(v) => v.hash(state),
            Value::I128(v) => v.hash(state),
            Value::U128(v) => v.hash(state),
            Value::ISize(v) => v.hash(state),
            Value::USize(v) => v.hash(state),
            Value::F32(v) => v.to_bits().hash(state),
            Value::F64(v) => v.to_bits().hash(state),
            Value::Char(v) => v.hash(state),
            Value::String(v) => v.hash(state),
            Value::Document(v) => v.hash(state),
            Value::Array(v) => v.hash(state),
            Value::Map(v) => v.hash(state),
            Value::NitriteId(v) => v.hash(state),
            Value::Bytes(v) => v.hash(state),
            Value::Unknown => (&"unknown_value").hash(state),
        }
    }
}

impl Value {
    /// Creates a new [Value] from the given value using runtime type inspection.
    ///
    /// # Arguments
    /// * `value` - Any Rust value implementing `Any` trait.
    ///
    /// # Returns
    /// `Ok(Value)` containing the converted value, or an error if type is unsupported.
    ///
    /// # Behavior
    /// Uses Rust's `Any` trait for runtime type identification. Converts native Rust types
    /// to corresponding Value variants. Returns an error for unsupported types.
    /// Supports all primitive types, String, Document, Vec<Value>, BTreeMap, NitriteId, and Vec<u8>.
    pub fn new<T: Any>(value: T) -> NitriteResult<Value> {
        let any = &value as &dyn Any;

        if any.downcast_ref::<()>().is_some() {
            Ok(Value::Null)
        } else if let Some(v) = any.downcast_ref::<bool>() {
            Ok(Value::Bool(*v))
        } else if let Some(v) = any.downcast_ref::<i8>() {
            Ok(Value::I8(*v))
        } else if let Some(v) = any.downcast_ref::<u8>() {
            Ok(Value::U8(*v))
        } else if let Some(v) = any.downcast_ref::<i16>() {
            Ok(Value::I16(*v))
        } else if let Some(v) = any.downcast_ref::<u16>() {
            Ok(Value::U16(*v))
        } else if let Some(v) = any.downcast_ref::<i32>() {
            Ok(Value::I32(*v))
        } else if let Some(v) = any.downcast_ref::<u32>() {
            Ok(Value::U32(*v))
        } else if let Some(v) = any.downcast_ref::<i64>() {
            Ok(Value::I64(*v))
        } else if let Some(v) = any.downcast_ref::<u64>() {
            Ok(Value::U64(*v))
        } else if let Some(v) = any.downcast_ref::<i128>() {
            Ok(Value::I128(*v))
        } else if let Some(v) = any.downcast_ref::<u128>() {
            Ok(Value::U128(*v))
        } else if let Some(v) = any.downcast_ref::<isize>() {
            Ok(Value::ISize(*v))
        } else if let Some(v) = any.downcast_ref::<usize>() {
            Ok(Value::USize(*v))
        } else if let Some(v) = any.downcast_ref::<f32>() {
            Ok(Value::F32(*v))
        } else if let Some(v) = any.downcast_ref::<f64>() {
            Ok(Value::F64(*v))
        } else if let Some(v) = any.downcast_ref::<char>() {
            Ok(Value::Char(*v))
        } else if let Some(v) = any.downcast_ref::<String>() {
            Ok(Value::String(v.clone()))
        } else if let Some(v) = any.downcast_ref::<Document>() {
            Ok(Value::Document(v.clone()))
        } else if let Some(v) = any.downcast_ref::<Vec<Value>>() {
            Ok(Value::Array(v.clone()))
        } else if let Some(v) = any.downcast_ref::<BTreeMap<Value, Value>>() {
            Ok(Value::Map(v.clone()))
        } else if let Some(v) = any.downcast_ref::<NitriteId>() {
            Ok(Value::NitriteId(*v))
        } else if let Some(v) = any.downcast_ref::<Vec<u8>>() {
            Ok(Value::Bytes(v.clone()))
        } else if let Some(v) = any.downcast_ref::<Value>() {
            Ok(v.clone())
        } else {
            log::error!("Unknown type to convert to Value");
            Err(NitriteError::new(
                "Unknown type to convert to Value",
                ErrorKind::ObjectMappingError,
            ))
        }
    }

    /// Creates a new [Value] from the given value that implements [`Into<Value>`].
    ///
    /// # Arguments
    /// * `value` - Any type implementing `Into<Value>`.
    ///
    /// # Returns
    /// A new `Value` converted from the input.
    ///
    /// # Behavior
    /// Direct conversion using the Into trait. Preferred for known types that have
    /// From<T> for Value implementations. More efficient than `new()` as it avoids
    /// runtime type inspection.
    ///
    /// # Example Usage
    /// From actual nitrite-int-test patterns:
    /// ```text
    /// Value::from(42)                    // i32
    /// Value::from("hello")               // &str
    /// Value::from(true)                  // bool
    /// Value::from(format!("val_{}", i)) // String
    /// ```
    pub fn from<T: Into<Value>>(value: T) -> Value {
        value.into()
    }

    /// Creates a new [Value] from the given [Option] value. If the value is [Some], it will be
    /// converted to [Value]. If the value is [None], it will be converted to [Value::Null].
    ///
    /// # Arguments
    /// * `value` - An Optional value.
    ///
    /// # Returns
    /// `Value::Null` if input is None, otherwise the converted Some value.
    ///
    /// # Behavior
    /// Converts None to Null and Some(T) to Value. Useful for handling optional fields
    /// in documents where missing values should be Null.
    pub fn from_option<T: Into<Value>>(value: Option<T>) -> Value {
        match value {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }

    /// Creates a new [Value] from the vector of values.
    ///
    /// # Arguments
    /// * `values` - A vector of values that implement `Into<Value>`.
    ///
    /// # Returns
    /// A `Value::Array` containing the converted values.
    ///
    /// # Behavior
    /// Converts each element in the vector using Into trait and wraps them in Value::Array.
    /// More convenient than manually creating Value::Array for common cases.
    pub fn from_vec<T: Into<Value>>(values: Vec<T>) -> Value {
        Value::Array(values.into_iter().map(|v| v.into()).collect())
    }

    /// Returns the boolean value if the [Value] is [Value::Bool].
    #[inline]
    pub fn as_bool(&self) -> Option<&bool> {
        match self {
            Value::Bool(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the i8 value if the [Value] is [Value::I8].
    #[inline]
    pub fn as_i8(&self) -> Option<&i8> {
        match self {
            Value::I8(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the u8 value if the [Value] is [Value::U8].
    #[inline]
    pub fn as_u8(&self) -> Option<&u8> {
        match self {
            Value::U8(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the i16 value if the [Value] is [Value::I16].
    #[inline]
    pub fn as_i16(&self) -> Option<&i16> {
        match self {
            Value::I16(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the u16 value if the [Value] is [Value::U16].
    #[inline]
    pub fn as_u16(&self) -> Option<&u16> {
        match self {
            Value::U16(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the i32 value if the [Value] is [Value::I32].
    #[inline]
    pub fn as_i32(&self) -> Option<&i32> {
        match self {
            Value::I32(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the u32 value if the [Value] is [Value::U32].
    #[inline]
    pub fn as_u32(&self) -> Option<&u32> {
        match self {
            Value::U32(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the i64 value if the [Value] is [Value::I64].
    #[inline]
    pub fn as_i64(&self) -> Option<&i64> {
        match self {
            Value::I64(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the u64 value if the [Value] is [Value::U64].
    #[inline]
    pub fn as_u64(&self) -> Option<&u64> {
        match self {
            Value::U64(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the i128 value if the [Value] is [Value::I128].
    #[inline]
    pub fn as_i128(&self) -> Option<&i128> {
        match self {
            Value::I128(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the u128 value if the [Value] is [Value::U128].
    #[inline]
    pub fn as_u128(&self) -> Option<&u128> {
        match self {
            Value::U128(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the isize value if the [Value] is [Value::ISize].
    #[inline]
    pub fn as_isize(&self) -> Option<&isize> {
        match self {
            Value::ISize(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the usize value if the [Value] is [Value::USize].
    #[inline]
    pub fn as_usize(&self) -> Option<&usize> {
        match self {
            Value::USize(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the f32 value if the [Value] is [Value::F32].
    #[inline]
    pub fn as_f32(&self) -> Option<&f32> {
        match self {
            Value::F32(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the f64 value if the [Value] is [Value::F64].
    #[inline]
    pub fn as_f64(&self) -> Option<&f64> {
        match self {
            Value::F64(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_integer(&self) -> Option<u128> {
        match self {
            Value::I8(v) => Some(*v as u128),
            Value::U8(v) => Some(*v as u128),
            Value::I16(v) => Some(*v as u128),
            Value::U16(v) => Some(*v as u128),
            Value::I32(v) => Some(*v as u128),
            Value::U32(v) => Some(*v as u128),
            Value::I64(v) => Some(*v as u128),
            Value::U64(v) => Some(*v as u128),
            Value::I128(v) => Some(*v as u128),
            Value::U128(v) => Some(*v),
            Value::ISize(v) => Some(*v as u128),
            Value::USize(v) => Some(*v as u128),
            _ => None,
        }
    }

    #[inline]
    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            Value::F32(v) => Some(*v as f64),
            Value::F64(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the char value if the [Value] is [Value::Char].
    #[inline]
    pub fn as_char(&self) -> Option<&char> {
        match self {
            Value::Char(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the string value if the [Value] is [Value::String].
    ///
    /// # Returns
    /// `Some(&String)` if this is a string value, `None` otherwise.
    ///
    /// # Behavior
    /// Type-safe string accessor. Used in actual tests to extract string values after
    /// retrieval from documents. Returns a reference to the contained String without cloning.
    ///
    /// # Example Usage
    /// From actual nitrite-int-test patterns:
    /// ```text
    /// if let Some(name) = value.as_string() {
    ///     println!("Name: {}", name);
    /// }
    /// ```
    #[inline]
    pub fn as_string(&self) -> Option<&String> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the object value if the [Value] is [Value::Document].
    ///
    /// # Returns
    /// `Some(&Document)` if this is a document value, `None` otherwise.
    ///
    /// # Behavior
    /// Type-safe document accessor. Used to extract nested documents or to work with
    /// complex structures. Returns a reference to the contained Document without cloning.
    ///
    /// # Example Usage
    /// From actual nitrite-int-test patterns:
    /// ```text
    /// let document = value.as_document().unwrap();
    /// let nested_field = document.get("nested_key");
    /// ```
    #[inline]
    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Document(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the mutable object value if the [Value] is [Value::Document].
    #[inline]
    pub fn as_document_mut(&mut self) -> Option<&mut Document> {
        match self {
            Value::Document(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the array value if the [Value] is [Value::Array].
    ///
    /// # Returns
    /// `Some(&Vec<Value>)` if this is an array value, `None` otherwise.
    ///
    /// # Behavior
    /// Type-safe array accessor. Returns a reference to the contained Vec without cloning.
    /// Useful for iterating over array elements or checking array length.
    #[inline]
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the mutable array value if the [Value] is [Value::Array].
    #[inline]
    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::Array(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_map(&self) -> Option<&BTreeMap<Value, Value>> {
        match self {
            Value::Map(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_map_mut(&mut self) -> Option<&mut BTreeMap<Value, Value>> {
        match self {
            Value::Map(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the [NitriteId] value if the [Value] is [Value::NitriteId].
    ///
    /// # Returns
    /// `Some(&NitriteId)` if this is a NitriteId value, `None` otherwise.
    ///
    /// # Behavior
    /// Type-safe NitriteId accessor. Used to extract database-generated unique identifiers.
    /// Returns a reference without cloning.
    #[inline]
    pub fn as_nitrite_id(&self) -> Option<&NitriteId> {
        match self {
            Value::NitriteId(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the byte array value if the [Value] is [Value::Bytes].
    ///
    /// # Returns
    /// `Some(&Vec<u8>)` if this is a bytes value, `None` otherwise.
    ///
    /// # Behavior
    /// Type-safe bytes accessor. Bytes values cannot be indexed or queried, used only
    /// for binary data storage. Returns a reference without cloning.
    #[inline]
    pub fn as_bytes(&self) -> Option<&Vec<u8>> {
        match self {
            Value::Bytes(v) => Some(v),
            _ => None,
        }
    }

    /// Checks if the [Value] is [Value::Null].
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Checks if the [Value] is [Value::Bool].
    #[inline]
    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    /// Checks if the [Value] is [Value::I8].
    #[inline]
    pub fn is_i8(&self) -> bool {
        matches!(self, Value::I8(_))
    }

    /// Checks if the [Value] is [Value::U8].
    #[inline]
    pub fn is_u8(&self) -> bool {
        matches!(self, Value::U8(_))
    }

    /// Checks if the [Value] is [Value::I16].
    #[inline]
    pub fn is_i16(&self) -> bool {
        matches!(self, Value::I16(_))
    }

    /// Checks if the [Value] is [Value::U16].
    #[inline]
    pub fn is_u16(&self) -> bool {
        matches!(self, Value::U16(_))
    }

    /// Checks if the [Value] is [Value::I32].
    #[inline]
    pub fn is_i32(&self) -> bool {
        matches!(self, Value::I32(_))
    }

    /// Checks if the [Value] is [Value::U32].
    #[inline]
    pub fn is_u32(&self) -> bool {
        matches!(self, Value::U32(_))
    }

    /// Checks if the [Value] is [Value::I64].
    #[inline]
    pub fn is_i64(&self) -> bool {
        matches!(self, Value::I64(_))
    }

    /// Checks if the [Value] is [Value::U64].
    #[inline]
    pub fn is_u64(&self) -> bool {
        matches!(self, Value::U64(_))
    }

    /// Checks if the [Value] is [Value::I128].
    #[inline]
    pub fn is_i128(&self) -> bool {
        matches!(self, Value::I128(_))
    }

    /// Checks if the [Value] is [Value::U128].
    #[inline]
    pub fn is_u128(&self) -> bool {
        matches!(self, Value::U128(_))
    }

    /// Checks if the [Value] is [Value::ISize].
    #[inline]
    pub fn is_isize(&self) -> bool {
        matches!(self, Value::ISize(_))
    }

    /// Checks if the [Value] is [Value::USize].
    #[inline]
    pub fn is_usize(&self) -> bool {
        matches!(self, Value::USize(_))
    }

    /// Checks if the [Value] is [Value::F32].
    #[inline]
    pub fn is_f32(&self) -> bool {
        matches!(self, Value::F32(_))
    }

    /// Checks if the [Value] is [Value::F64].
    #[inline]
    pub fn is_f64(&self) -> bool {
        matches!(self, Value::F64(_))
    }

    /// Checks if the [Value] is [Value::String].
    #[inline]
    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    /// Checks if the [Value] is [Value::Document].
    #[inline]
    pub fn is_document(&self) -> bool {
        matches!(self, Value::Document(_))
    }

    /// Checks if the [Value] is [Value::Array].
    #[inline]
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Checks if the [Value] is [Value::Map].
    #[inline]
    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    /// Checks if the [Value] is [Value::NitriteId].
    #[inline]
    pub fn is_nitrite_id(&self) -> bool {
        matches!(self, Value::NitriteId(_))
    }

    /// Checks if the [Value] is [Value::Bytes].
    #[inline]
    pub fn is_bytes(&self) -> bool {
        matches!(self, Value::Bytes(_))
    }

    /// Checks if the [Value] is [Value::Unknown].
    #[inline]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Value::Unknown)
    }

    /// Checks if the [Value] is a number type.
    #[inline]
    pub fn is_number(&self) -> bool {
        matches!(
            self,
            Value::I8(_)
                | Value::U8(_)
                | Value::I16(_)
                | Value::U16(_)
                | Value::I32(_)
                | Value::U32(_)
                | Value::I64(_)
                | Value::U64(_)
                | Value::I128(_)
                | Value::U128(_)
                | Value::ISize(_)
                | Value::USize(_)
                | Value::F32(_)
                | Value::F64(_)
        )
    }

    /// Checks if the [Value] is an integer type.
    #[inline]
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Value::I8(_)
                | Value::U8(_)
                | Value::I16(_)
                | Value::U16(_)
                | Value::I32(_)
                | Value::U32(_)
                | Value::I64(_)
                | Value::U64(_)
                | Value::I128(_)
                | Value::U128(_)
                | Value::ISize(_)
                | Value::USize(_)
        )
    }

    #[inline]
    pub fn is_comparable(&self) -> bool {
        matches!(
            self,
            Value::I8(_)
                | Value::U8(_)
                | Value::I16(_)
                | Value::U16(_)
                | Value::I32(_)
                | Value::U32(_)
                | Value::I64(_)
                | Value::U64(_)
                | Value::I128(_)
                | Value::U128(_)
                | Value::ISize(_)
                | Value::USize(_)
                | Value::F32(_)
                | Value::F64(_)
                | Value::Char(_)
                | Value::String(_)
                | Value::NitriteId(_)
                | Value::Bool(_)
                | Value::Null
        )
    }

    /// Checks if the [Value] is a decimal type.
    #[inline]
    pub fn is_decimal(&self) -> bool {
        matches!(self, Value::F32(_) | Value::F64(_))
    }

    /// Takes the value, replacing it with [Value::Null].
    ///
    /// # Returns
    /// The original value, leaving `Value::Null` in its place.
    ///
    /// # Behavior
    /// Consumes the value and replaces self with Null using `std::mem::replace`.
    /// Useful for extracting a value from mutable reference while leaving placeholder behind.
    /// Avoids cloning when moving a value out of a document field.
    pub fn take(&mut self) -> Value {
        std::mem::replace(self, Value::Null)
    }

    pub(crate) fn to_pretty_json(&self, indent: usize) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(v) => v.to_string(),
            Value::I8(v) => v.to_string(),
            Value::U8(v) => v.to_string(),
            Value::I16(v) => v.to_string(),
            Value::U16(v) => v.to_string(),
            Value::I32(v) => v.to_string(),
            Value::U32(v) => v.to_string(),
            Value::I64(v) => v.to_string(),
            Value::U64(v) => v.to_string(),
            Value::I128(v) => v.to_string(),
            Value::U128(v) => v.to_string(),
            Value::ISize(v) => v.to_string(),
            Value::USize(v) => v.to_string(),
            Value::F32(v) => v.to_string(),
            Value::F64(v) => v.to_string(),
            Value::Char(v) => format!("\"{}\"", v),
            Value::String(v) => format!("\"{}\"", v),
            Value::Document(v) => {
                let doc = v.clone();
                doc.to_pretty_json(indent)
            }
            Value::Array(v) => {
                if v.is_empty() {
                    return "[]".to_string();
                }

                let mut json_str = String::new();
                json_str.push_str("[\n");
                let indent_str = " ".repeat(indent + 2);
                for value in v {
                    json_str.push_str(&format!(
                        "{}{},\n",
                        indent_str,
                        value.to_pretty_json(indent + 2)
                    ));
                }
                json_str.pop(); // remove last comma
                json_str.pop(); // remove last newline
                json_str.push_str(&format!("\n{}]", " ".repeat(indent)));
                json_str
            }
            Value::Map(v) => {
                if v.is_empty() {
                    return "{}".to_string();
                }

                let mut json_str = String::new();
                json_str.push_str("{\n");
                let indent_str = " ".repeat(indent + 2);
                for (key, value) in v {
                    json_str.push_str(&format!(
                        "{}{}: {},\n",
                        indent_str,
                        key.to_pretty_json(indent + 2),
                        value.to_pretty_json(indent + 2)
                    ));
                }
                json_str.pop(); // remove last comma
                json_str.pop(); // remove last newline
                json_str.push_str(&format!("\n{}]", " ".repeat(indent)));
                json_str
            }
            Value::NitriteId(v) => format!("\"{}\"", v),
            Value::Bytes(v) => {
                if v.is_empty() {
                    return "[]".to_string();
                }

                let mut json_str = String::new();
                json_str.push_str("[\n");
                let indent_str = " ".repeat(indent + 2);
                for value in v {
                    json_str.push_str(&format!("{}{},\n", indent_str, value));
                }
                json_str.pop(); // remove last comma
                json_str.pop(); // remove last newline
                json_str.push_str(&format!("\n{}]", " ".repeat(indent)));
                json_str
            }
            Value::Unknown => "unknown".to_string(),
        }
    }

    pub(crate) fn to_debug_string(&self, indent: usize) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(v) => format!("bool({})", v),
            Value::I8(v) => format!("i8({})", v),
            Value::U8(v) => format!("u8({})", v),
            Value::I16(v) => format!("i16({})", v),
            Value::U16(v) => format!("u16({})", v),
            Value::I32(v) => format!("i32({})", v),
            Value::U32(v) => format!("u32({})", v),
            Value::I64(v) => format!("i64({})", v),
            Value::U64(v) => format!("u64({})", v),
            Value::I128(v) => format!("i128({})", v),
            Value::U128(v) => format!("u128({})", v),
            Value::ISize(v) => format!("isize({})", v),
            Value::USize(v) => format!("usize({})", v),
            Value::F32(v) => format!("f32({})", v),
            Value::F64(v) => format!("f64({})", v),
            Value::Char(v) => format!("char(\"{}\")", v),
            Value::String(v) => format!("string(\"{}\")", v),
            Value::Document(v) => {
                let doc = v.clone();
                format!("object({})", doc.to_debug_string(indent))
            }
            Value::Array(v) => {
                if v.is_empty() {
                    return "array([])".to_string();
                }

                let mut debug_str = String::new();
                debug_str.push_str("array([\n");
                let indent_str = " ".repeat(indent + 2);
                for value in v {
                    debug_str.push_str(&format!(
                        "{}{},\n",
                        indent_str,
                        value.to_debug_string(indent + 2)
                    ));
                }
                debug_str.pop(); // remove last comma
                debug_str.pop(); // remove last newline
                debug_str.push_str(&format!("\n{}])", " ".repeat(indent)));
                debug_str
            }
            Value::Map(v) => {
                if v.is_empty() {
                    return "map({})".to_string();
                }

                let mut debug_str = String::new();
                debug_str.push_str("map({\n");
                let indent_str = " ".repeat(indent + 2);
                for (key, value) in v {
                    debug_str.push_str(&format!(
                        "{}{}: {},\n",
                        indent_str,
                        key.to_debug_string(indent + 2),
                        value.to_debug_string(indent + 2)
                    ));
                }
                debug_str.pop(); // remove last comma
                debug_str.pop(); // remove last newline
                debug_str.push_str(&format!("\n{}])", " ".repeat(indent)));
                debug_str
            }
            Value::NitriteId(v) => format!("nitrite_id(\"{}\")", v),
            Value::Bytes(v) => {
                if v.is_empty() {
                    return "bytes([])".to_string();
                }

                let mut debug_str = String::new();
                debug_str.push_str("bytes([\n");
                let indent_str = " ".repeat(indent + 2);
                for value in v {
                    debug_str.push_str(&format!("{}{},\n", indent_str, value));
                }
                debug_str.pop(); // remove last comma
                debug_str.pop(); // remove last newline
                debug_str.push_str(&format!("\n{}])", " ".repeat(indent)));
                debug_str
            }
            Value::Unknown => "unknown".to_string(),
        }
    }
}

impl From<bool> for Value {
    #[inline]
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i8> for Value {
    #[inline]
    fn from(value: i8) -> Self {
        Value::I8(value)
    }
}

impl From<u8> for Value {
    #[inline]
    fn from(value: u8) -> Self {
        Value::U8(value)
    }
}

impl From<i16> for Value {
    #[inline]
    fn from(value: i16) -> Self {
        Value::I16(value)
    }
}

impl From<u16> for Value {
    #[inline]
    fn from(value: u16) -> Self {
        Value::U16(value)
    }
}

impl From<i32> for Value {
    #[inline]
    fn from(value: i32) -> Self {
        Value::I32(value)
    }
}

impl From<u32> for Value {
    #[inline]
    fn from(value: u32) -> Self {
        Value::U32(value)
    }
}

impl From<i64> for Value {
    #[inline]
    fn from(value: i64) -> Self {
        Value::I64(value)
    }
}

impl From<u64> for Value {
    #[inline]
    fn from(value: u64) -> Self {
        Value::U64(value)
    }
}

impl From<i128> for Value {
    #[inline]
    fn from(value: i128) -> Self {
        Value::I128(value)
    }
}

impl From<u128> for Value {
    #[inline]
    fn from(value: u128) -> Self {
        Value::U128(value)
    }
}

impl From<isize> for Value {
    #[inline]
    fn from(value: isize) -> Self {
        Value::ISize(value)
    }
}

impl From<usize> for Value {
    #[inline]
    fn from(value: usize) -> Self {
        Value::USize(value)
    }
}

impl From<f32> for Value {
    #[inline]
    fn from(value: f32) -> Self {
        Value::F32(value)
    }
}

impl From<f64> for Value {
    #[inline]
    fn from(value: f64) -> Self {
        Value::F64(value)
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Value::Char(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<Document> for Value {
    fn from(value: Document) -> Self {
        Value::Document(value)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value> + 'static,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

impl<T> From<Vec<T>> for Value
where
    T: Into<Value> + 'static,
{
    fn from(value: Vec<T>) -> Self {
        if TypeId::of::<T>() == TypeId::of::<u8>() {
            let len = value.len();
            let cap = value.capacity();
            let ptr = value.as_ptr() as *mut u8;

            // SAFETY: We verified T is u8 via TypeId check above
            // Safe to reconstruct Vec<u8> with same memory layout
            let vec_u8 = unsafe {
                // Forget the original Vec to prevent double-free
                std::mem::forget(value);
                Vec::from_raw_parts(ptr, len, cap)
            };
            return Value::Bytes(vec_u8);
        }
        Value::Array(value.into_iter().map(|v| v.into()).collect())
    }
}

impl From<BTreeMap<Value, Value>> for Value {
    fn from(value: BTreeMap<Value, Value>) -> Self {
        Value::Map(value)
    }
}

impl From<NitriteId> for Value {
    fn from(value: NitriteId) -> Self {
        Value::NitriteId(value)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

/// A macro to create a `Value` from a given expression.
///
/// This macro simplifies the creation of `Value` instances by automatically
/// converting the provided expression into a `Value` using the `From` trait.
///
/// # Examples
///
/// ```rust
/// use nitrite::common::Value;
/// use nitrite::val;
///
/// let int_value = val!(42);
/// assert_eq!(int_value, Value::I32(42));
///
/// let string_value = val!("hello");
/// assert_eq!(string_value, Value::String("hello".to_string()));
///
/// let bool_value = val!(true);
/// assert_eq!(bool_value, Value::Bool(true));
/// ```
#[macro_export]
macro_rules! val {
    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}

#[macro_export]
macro_rules! key {
    ($value:expr) => {
        $crate::common::Key::from($value)
    };
}

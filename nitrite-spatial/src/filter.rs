//! Spatial filters for querying geometries in Nitrite collections.
//!
//! This module provides filter types for spatial queries:
//! - `IntersectsFilter` - finds geometries that intersect with a given geometry
//! - `WithinFilter` - finds geometries contained within a given geometry
//!
//! ## Two-Phase Query Execution
//!
//! Spatial queries use a two-phase approach for accuracy and performance:
//! 1. **Phase 1 (R-tree scan)**: Fast bounding box search using the R-tree index.
//!    This may return false positives due to bbox approximation.
//! 2. **Phase 2 (Geometry refinement)**: Precise geometric operations to eliminate
//!    false positives and return accurate results.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::sync::{Arc, OnceLock};

use nitrite::collection::Document;
use nitrite::common::Value;
use nitrite::errors::{ErrorKind, NitriteError, NitriteResult};
use nitrite::filter::{Filter, FilterProvider};

use crate::geometry::Geometry;

/// The index type name for spatial indexes.
pub const SPATIAL_INDEX: &str = "Spatial";

/// Base trait for spatial filters.
pub trait SpatialFilterOps {

    /// Gets the search geometry.
    fn geometry(&self) -> &Geometry;

    /// Performs the precise geometry match (Phase 2).
    /// Returns true if the stored geometry matches the filter criteria.
    fn matches_geometry(&self, stored: &Geometry) -> bool;
}

/// Filter that finds geometries intersecting with a given geometry.
///
/// Two geometries intersect if they share any portion of space.
/// This includes overlapping, touching, or one containing the other.
#[derive(Clone)]
pub struct IntersectsFilter {
    inner: Arc<IntersectsFilterInner>,
}

struct IntersectsFilterInner {
    field: OnceLock<String>,
    geometry: Geometry,
}

impl IntersectsFilter {
    /// Creates a new intersects filter.
    pub fn new(field: impl Into<String>, geometry: Geometry) -> Self {
        let name = OnceLock::new();
        let _ = name.set(field.into());

        Self {
            inner: Arc::new(IntersectsFilterInner {
                field: name,
                geometry,
            }),
        }
    }
}

impl SpatialFilterOps for IntersectsFilter {
    fn geometry(&self) -> &Geometry {
        &self.inner.geometry
    }

    fn matches_geometry(&self, stored: &Geometry) -> bool {
        self.inner.geometry.intersects(stored)
    }
}

impl FilterProvider for IntersectsFilter {
    fn apply(&self, entry: &Document) -> NitriteResult<bool> {
        let field = self.inner.field.get().ok_or_else(|| {
            NitriteError::new("Field name not set", ErrorKind::InvalidOperation)
        })?;

        match entry.get(&*field) {
            Ok(value) => {
                if let Some(stored_geom) = value_to_geometry(&value) {
                    Ok(self.inner.geometry.intersects(&stored_geom))
                } else {
                    Ok(false)
                }
            }
            Err(_) => Ok(false),
        }
    }

    fn has_field(&self) -> bool {
        true
    }

    fn get_field_name(&self) -> NitriteResult<String> {
        let field = self.inner.field.get().ok_or_else(|| {
            NitriteError::new("Field name not set", ErrorKind::InvalidOperation)
        })?;
        Ok(field.clone())
    }

    fn set_field_name(&self, field_name: String) -> NitriteResult<()> {
        self.inner.field.get_or_init(|| field_name);
        Ok(())
    }

    fn is_index_only_filter(&self) -> bool {
        true
    }

    fn supported_index_type(&self) -> NitriteResult<String> {
        Ok(SPATIAL_INDEX.to_string())
    }

    fn can_be_grouped(&self, other: Filter) -> NitriteResult<bool> {
        if other.as_any().downcast_ref::<IntersectsFilter>().is_some()
            || other.as_any().downcast_ref::<WithinFilter>().is_some()
        {
            let self_field = self.get_field_name()?;
            let other_field = other.get_field_name()?;
            Ok(self_field == other_field)
        } else {
            Ok(false)
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Display for IntersectsFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = self.inner.field.get().ok_or_else(|| NitriteError::new("Field name not set", ErrorKind::InvalidOperation));
        match field {
            Ok(field_name) => write!(f, "({} intersects {})", field_name, self.inner.geometry),
            Err(_) => write!(f, "(<unknown field> intersects {})", self.inner.geometry),
        }
    }
}

/// Filter that finds geometries contained within a given geometry.
///
/// A stored geometry matches if it is completely contained within
/// the search geometry.
#[derive(Clone)]
pub struct WithinFilter {
    inner: Arc<WithinFilterInner>,
}

struct WithinFilterInner {
    field: OnceLock<String>,
    geometry: Geometry,
}

impl WithinFilter {
    /// Creates a new within filter.
    pub fn new(field: impl Into<String>, geometry: Geometry) -> Self {
        let name = OnceLock::new();
        let _ = name.set(field.into());

        Self {
            inner: Arc::new(WithinFilterInner {
                field: name,
                geometry,
            }),
        }
    }
}

impl SpatialFilterOps for WithinFilter {
    fn geometry(&self) -> &Geometry {
        &self.inner.geometry
    }

    fn matches_geometry(&self, stored: &Geometry) -> bool {
        self.inner.geometry.contains(stored)
    }
}

impl FilterProvider for WithinFilter {
    fn apply(&self, entry: &Document) -> NitriteResult<bool> {
        let field = self.inner.field.get().ok_or_else(|| {
            NitriteError::new("Field name not set", ErrorKind::InvalidOperation)
        })?;

        match entry.get(&*field) {
            Ok(value) => {
                if let Some(stored_geom) = value_to_geometry(&value) {
                    Ok(self.inner.geometry.contains(&stored_geom))
                } else {
                    Ok(false)
                }
            }
            Err(_) => Ok(false),
        }
    }

    fn has_field(&self) -> bool {
        true
    }

    fn get_field_name(&self) -> NitriteResult<String> {
        let field = self.inner.field.get().ok_or_else(|| {
            NitriteError::new("Field name not set", ErrorKind::InvalidOperation)
        })?;
        Ok(field.clone())
    }

    fn set_field_name(&self, field_name: String) -> NitriteResult<()> {
        self.inner.field.get_or_init(|| field_name);
        Ok(())
    }

    fn is_index_only_filter(&self) -> bool {
        true
    }

    fn supported_index_type(&self) -> NitriteResult<String> {
        Ok(SPATIAL_INDEX.to_string())
    }

    fn can_be_grouped(&self, other: Filter) -> NitriteResult<bool> {
        if other.as_any().downcast_ref::<IntersectsFilter>().is_some()
            || other.as_any().downcast_ref::<WithinFilter>().is_some()
        {
            let self_field = self.get_field_name()?;
            let other_field = other.get_field_name()?;
            Ok(self_field == other_field)
        } else {
            Ok(false)
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Display for WithinFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = self.inner.field.get().ok_or_else(|| NitriteError::new("Field name not set", ErrorKind::InvalidOperation));
        match field {
            Ok(field_name) => write!(f, "({} within {})", field_name, self.inner.geometry),
            Err(_) => write!(f, "(<unknown field> within {})", self.inner.geometry),
        }
    }
}

/// Converts a Nitrite Value to a Geometry, if possible.
///
/// Supports:
/// - Map with "x" and "y" fields (Point)
/// - Map with "latitude" and "longitude" fields (GeoPoint, stored as a Point with x=lon, y=lat)
/// - Map with "min_x", "min_y", "max_x", "max_y" fields (BoundingBox)
/// - Document with the same field structures (converted to map internally)
pub fn value_to_geometry(value: &Value) -> Option<Geometry> {
    // Helper function to process map-like data
    fn process_map(map: &BTreeMap<Value, Value>) -> Option<Geometry> {
        let x_key = Value::String("x".to_string());
        let y_key = Value::String("y".to_string());
        let lat_key = Value::String("latitude".to_string());
        let lon_key = Value::String("longitude".to_string());
        let min_x_key = Value::String("min_x".to_string());
        let min_y_key = Value::String("min_y".to_string());
        let max_x_key = Value::String("max_x".to_string());
        let max_y_key = Value::String("max_y".to_string());

        // Try to parse as a point (x, y)
        if let (Some(x_val), Some(y_val)) = (map.get(&x_key), map.get(&y_key)) {
            let x = value_to_f64(x_val)?;
            let y = value_to_f64(y_val)?;
            return Some(Geometry::point(x, y));
        }

        // Try to parse as GeoPoint (latitude, longitude)
        if let (Some(lat), Some(lon)) = (map.get(&lat_key), map.get(&lon_key)) {
            let lat_f = value_to_f64(lat)?;
            let lon_f = value_to_f64(lon)?;
            // GeoPoint stores lat/lon, but Geometry uses x=lon, y=lat
            return Some(Geometry::point(lon_f, lat_f));
        }

        // Try to parse as BoundingBox
        if let (Some(min_x), Some(min_y), Some(max_x), Some(max_y)) = (
            map.get(&min_x_key),
            map.get(&min_y_key),
            map.get(&max_x_key),
            map.get(&max_y_key),
        ) {
            let min_x = value_to_f64(min_x)?;
            let min_y = value_to_f64(min_y)?;
            let max_x = value_to_f64(max_x)?;
            let max_y = value_to_f64(max_y)?;
            return Some(Geometry::envelope(min_x, min_y, max_x, max_y));
        }

        None
    }

    // Helper function to process document (string keys)
    fn process_document(doc: &Document) -> Option<Geometry> {
        // Try to parse as a point (x, y)
        if let (Ok(x_val), Ok(y_val)) = (doc.get("x"), doc.get("y")) {
            if !x_val.is_null() && !y_val.is_null() {
                let x = value_to_f64(&x_val)?;
                let y = value_to_f64(&y_val)?;
                return Some(Geometry::point(x, y));
            }
        }

        // Try to parse as GeoPoint (latitude, longitude)
        if let (Ok(lat), Ok(lon)) = (doc.get("latitude"), doc.get("longitude")) {
            if !lat.is_null() && !lon.is_null() {
                let lat_f = value_to_f64(&lat)?;
                let lon_f = value_to_f64(&lon)?;
                // GeoPoint stores lat/lon, but Geometry uses x=lon, y=lat
                return Some(Geometry::point(lon_f, lat_f));
            }
        }

        // Try to parse as BoundingBox
        if let (Ok(min_x), Ok(min_y), Ok(max_x), Ok(max_y)) = (
            doc.get("min_x"),
            doc.get("min_y"),
            doc.get("max_x"),
            doc.get("max_y"),
        ) {
            if !min_x.is_null() && !min_y.is_null() && !max_x.is_null() && !max_y.is_null() {
                let min_x = value_to_f64(&min_x)?;
                let min_y = value_to_f64(&min_y)?;
                let max_x = value_to_f64(&max_x)?;
                let max_y = value_to_f64(&max_y)?;
                return Some(Geometry::envelope(min_x, min_y, max_x, max_y));
            }
        }

        None
    }

    match value {
        Value::Map(map) => process_map(map),
        Value::Document(doc) => process_document(doc),
        Value::F64(_) | Value::I64(_) | Value::I32(_) | Value::U64(_) => {
            // Single number can't be a geometry
            None
        }
        _ => None,
    }
}

/// Helper to convert a Value to f64.
fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::F64(f) => Some(*f),
        Value::I64(i) => Some(*i as f64),
        Value::I32(i) => Some(*i as f64),
        Value::U64(u) => Some(*u as f64),
        _ => None,
    }
}

/// Checks if a filter is a spatial filter.
pub fn is_spatial_filter(filter: &Filter) -> bool {
    filter.as_any().downcast_ref::<IntersectsFilter>().is_some()
        || filter.as_any().downcast_ref::<WithinFilter>().is_some()
}

/// Gets the spatial filter from a Filter if it is one.
pub fn as_spatial_filter(filter: &Filter) -> Option<&dyn SpatialFilterOps> {
    if let Some(f) = filter.as_any().downcast_ref::<IntersectsFilter>() {
        Some(f as &dyn SpatialFilterOps)
    } else if let Some(f) = filter.as_any().downcast_ref::<WithinFilter>() {
        Some(f as &dyn SpatialFilterOps)
    } else {
        None
    }
}

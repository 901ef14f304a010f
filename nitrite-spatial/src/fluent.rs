//! Fluent API for creating spatial filters.
//!
//! This module provides a builder-style API for constructing spatial filters,
//! matching the Java `SpatialFluentFilter` API.
//!
//! ## Example
//!
//! ```rust
//! use nitrite_spatial::spatial_field;
//!
//! let filter = spatial_field("location")
//!     .intersects_envelope(0.0, 0.0, 10.0, 10.0);
//! ```

use std::sync::Arc;

use nitrite::filter::Filter;

use crate::filter::{IntersectsFilter, WithinFilter};
use crate::geometry::{Coordinate, Geometry};

/// A fluent filter builder for spatial queries.
///
/// Use `spatial_field()` to start building a spatial filter.
/// Uses Pimpl pattern for cheap cloning.
#[derive(Clone)]
pub struct SpatialFluentFilter {
    inner: Arc<SpatialFluentFilterInner>,
}

struct SpatialFluentFilterInner {
    field: String,
}

/// Creates a new spatial filter builder for the given field.
///
/// This is the entry point for the fluent API.
///
/// # Example
///
/// ```rust
/// use nitrite_spatial::spatial_field;
/// let filter = spatial_field("location")
///     .intersects_point(10.0, 20.0);
/// ```
pub fn spatial_field(field: impl Into<String>) -> SpatialFluentFilter {
    SpatialFluentFilter {
        inner: Arc::new(SpatialFluentFilterInner {
            field: field.into(),
        }),
    }
}

impl SpatialFluentFilter {
    // =========================================================================
    // Intersects filters
    // =========================================================================

    /// Creates a filter that matches geometries intersecting with the given geometry.
    pub fn intersects(self, geometry: Geometry) -> Filter {
        Filter::new(IntersectsFilter::new(self.inner.field.clone(), geometry))
    }

    /// Creates a filter that matches geometries intersecting with a point.
    pub fn intersects_point(self, x: f64, y: f64) -> Filter {
        self.intersects(Geometry::point(x, y))
    }

    /// Creates a filter that matches geometries intersecting with a circle.
    pub fn intersects_circle(self, center_x: f64, center_y: f64, radius: f64) -> Filter {
        self.intersects(Geometry::circle(center_x, center_y, radius))
    }

    /// Creates a filter that matches geometries intersecting with a bounding box.
    pub fn intersects_envelope(self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Filter {
        self.intersects(Geometry::envelope(min_x, min_y, max_x, max_y))
    }

    /// Creates a filter that matches geometries intersecting with a polygon.
    pub fn intersects_polygon(self, coords: Vec<Coordinate>) -> Filter {
        self.intersects(Geometry::polygon(coords))
    }

    // =========================================================================
    // Within filters
    // =========================================================================

    /// Creates a filter that matches geometries contained within the given geometry.
    pub fn within(self, geometry: Geometry) -> Filter {
        Filter::new(WithinFilter::new(self.inner.field.clone(), geometry))
    }

    /// Creates a filter that matches geometries contained within a circle.
    pub fn within_circle(self, center_x: f64, center_y: f64, radius: f64) -> Filter {
        self.within(Geometry::circle(center_x, center_y, radius))
    }

    /// Creates a filter that matches geometries contained within a bounding box.
    pub fn within_envelope(self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Filter {
        self.within(Geometry::envelope(min_x, min_y, max_x, max_y))
    }

    /// Creates a filter that matches geometries contained within a polygon.
    pub fn within_polygon(self, coords: Vec<Coordinate>) -> Filter {
        self.within(Geometry::polygon(coords))
    }
}

//! Extended geometry types for spatial indexing.
//!
//! This module provides additional geometry types beyond the basic Point, Circle, and Polygon:
//! - LineString: A line connecting multiple points
//! - MultiPoint: Multiple point geometries
//! - MultiLineString: Multiple line string geometries
//! - MultiPolygon: Multiple polygon geometries
//! - Polygon with holes: Polygons with interior rings
//!
//! These types support:
//! - Geometric operations (intersection, containment, distance)
//! - WKT (Well-Known Text) parsing and serialization
//! - GeoJSON parsing and serialization
//! - Validation and repair

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use crate::geometry::Coordinate;
use crate::bounding_box::BoundingBox;
use crate::SpatialError;

/// A line string defined by an ordered sequence of coordinates.
///
/// A LineString with 2 points represents a line segment.
/// A closed LineString (first and last coordinates are equal) represents a ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineString {
    coordinates: Vec<Coordinate>,
}

impl LineString {
    /// Creates a new LineString from coordinates.
    ///
    /// # Arguments
    /// * `coordinates` - At least 2 coordinates required
    ///
    /// # Errors
    /// Returns an error if fewer than 2 coordinates are provided.
    pub fn new(coordinates: Vec<Coordinate>) -> Result<Self, SpatialError> {
        if coordinates.len() < 2 {
            return Err(SpatialError::Constraint(
                "LineString requires at least 2 coordinates".to_string(),
            ));
        }
        Ok(Self { coordinates })
    }

    /// Gets the coordinates of this LineString.
    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coordinates
    }

    /// Calculates the total length of the LineString.
    ///
    /// For geographic coordinates, this gives a rough approximation in degrees.
    /// For projected coordinates, the result is in the same units as the coordinates.
    pub fn length(&self) -> f64 {
        let mut total = 0.0;
        for i in 0..self.coordinates.len() - 1 {
            total += self.coordinates[i].distance(&self.coordinates[i + 1]);
        }
        total
    }

    /// Checks if this LineString is closed (first and last coordinates are equal).
    pub fn is_closed(&self) -> bool {
        if self.coordinates.is_empty() {
            return false;
        }
        self.coordinates[0] == self.coordinates[self.coordinates.len() - 1]
    }

    /// Gets the bounding box of this LineString.
    pub fn bounding_box(&self) -> BoundingBox {
        if self.coordinates.is_empty() {
            return BoundingBox::new(0.0, 0.0, 0.0, 0.0);
        }

        let mut min_x = f64::MAX;
        let mut min_y = f64::MAX;
        let mut max_x = f64::MIN;
        let mut max_y = f64::MIN;

        for coord in &self.coordinates {
            min_x = min_x.min(coord.x);
            min_y = min_y.min(coord.y);
            max_x = max_x.max(coord.x);
            max_y = max_y.max(coord.y);
        }

        BoundingBox::new(min_x, min_y, max_x, max_y)
    }

    /// Checks if this LineString intersects with another LineString.
    pub fn intersects(&self, other: &LineString) -> bool {
        // Quick check: bounding boxes must intersect
        let bbox1 = self.bounding_box();
        let bbox2 = other.bounding_box();
        if !(bbox1.min_x <= bbox2.max_x && bbox1.max_x >= bbox2.min_x
            && bbox1.min_y <= bbox2.max_y && bbox1.max_y >= bbox2.min_y)
        {
            return false;
        }

        // Check if any segments intersect
        for i in 0..self.coordinates.len() - 1 {
            for j in 0..other.coordinates.len() - 1 {
                if segments_intersect(
                    &self.coordinates[i],
                    &self.coordinates[i + 1],
                    &other.coordinates[j],
                    &other.coordinates[j + 1],
                ) {
                    return true;
                }
            }
        }

        false
    }
}

impl Display for LineString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LINESTRING(")?;
        for (i, coord) in self.coordinates.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} {}", coord.x, coord.y)?;
        }
        write!(f, ")")
    }
}

/// A polygon with optional interior holes.
///
/// A polygon consists of an exterior ring (required) and zero or more interior rings (holes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonWithHoles {
    exterior: Vec<Coordinate>,
    holes: Vec<Vec<Coordinate>>,
}

impl PolygonWithHoles {
    /// Creates a new polygon with an exterior ring and optional holes.
    ///
    /// # Arguments
    /// * `exterior` - The exterior ring (at least 4 points, forming a closed ring)
    /// * `holes` - Interior holes (each hole must have at least 4 points)
    ///
    /// # Errors
    /// Returns an error if rings are not properly closed or have insufficient points.
    pub fn new(
        exterior: Vec<Coordinate>,
        holes: Vec<Vec<Coordinate>>,
    ) -> Result<Self, SpatialError> {
        Self::validate_ring(&exterior)?;
        for hole in &holes {
            Self::validate_ring(hole)?;
        }
        Ok(Self { exterior, holes })
    }

    /// Creates a simple polygon without holes.
    pub fn simple(coordinates: Vec<Coordinate>) -> Result<Self, SpatialError> {
        Self::new(coordinates, vec![])
    }

    fn validate_ring(ring: &[Coordinate]) -> Result<(), SpatialError> {
        if ring.len() < 4 {
            return Err(SpatialError::Constraint(
                "Polygon ring requires at least 4 points".to_string(),
            ));
        }
        if ring[0] != ring[ring.len() - 1] {
            return Err(SpatialError::Constraint(
                "Polygon ring must be closed (first and last coordinates must be equal)".to_string(),
            ));
        }
        Ok(())
    }

    /// Gets the exterior ring coordinates.
    pub fn exterior(&self) -> &[Coordinate] {
        &self.exterior
    }

    /// Gets the interior holes.
    pub fn holes(&self) -> &[Vec<Coordinate>] {
        &self.holes
    }

    /// Gets the bounding box of this polygon.
    pub fn bounding_box(&self) -> BoundingBox {
        if self.exterior.is_empty() {
            return BoundingBox::new(0.0, 0.0, 0.0, 0.0);
        }

        let mut min_x = f64::MAX;
        let mut min_y = f64::MAX;
        let mut max_x = f64::MIN;
        let mut max_y = f64::MIN;

        for coord in &self.exterior {
            min_x = min_x.min(coord.x);
            min_y = min_y.min(coord.y);
            max_x = max_x.max(coord.x);
            max_y = max_y.max(coord.y);
        }

        BoundingBox::new(min_x, min_y, max_x, max_y)
    }

    /// Checks if a point is inside this polygon, accounting for holes.
    pub fn contains_point(&self, point: &Coordinate) -> bool {
        // Point must be in exterior ring
        if !point_in_polygon(point, &self.exterior) {
            return false;
        }

        // Point must not be in any hole
        for hole in &self.holes {
            if point_in_polygon(point, hole) {
                return false;
            }
        }

        true
    }

    /// Checks if this polygon is valid.
    pub fn is_valid(&self) -> bool {
        // Check winding order (exterior should be counter-clockwise, holes clockwise)
        // For simplicity, we just check closure here
        if self.exterior.is_empty() || self.exterior[0] != self.exterior[self.exterior.len() - 1]
        {
            return false;
        }

        for hole in &self.holes {
            if hole.is_empty() || hole[0] != hole[hole.len() - 1] {
                return false;
            }
        }

        true
    }
}

impl Display for PolygonWithHoles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "POLYGON((")?;
        for (i, coord) in self.exterior.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} {}", coord.x, coord.y)?;
        }
        write!(f, ")")?;

        for hole in &self.holes {
            write!(f, ", (")?;
            for (i, coord) in hole.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{} {}", coord.x, coord.y)?;
            }
            write!(f, ")")?;
        }

        write!(f, ")")
    }
}

/// A collection of multiple geometries.
///
/// Each geometry in the collection can be of any supported type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MultiGeometry {
    /// Multiple point geometries.
    MultiPoint(Vec<Coordinate>),
    /// Multiple line string geometries.
    MultiLineString(Vec<Vec<Coordinate>>),
    /// Multiple polygon geometries.
    MultiPolygon(Vec<Vec<Coordinate>>),
}

impl MultiGeometry {
    /// Gets the bounding box that contains all geometries.
    pub fn bounding_box(&self) -> BoundingBox {
        match self {
            MultiGeometry::MultiPoint(points) => {
                if points.is_empty() {
                    return BoundingBox::new(0.0, 0.0, 0.0, 0.0);
                }
                let mut min_x = f64::MAX;
                let mut min_y = f64::MAX;
                let mut max_x = f64::MIN;
                let mut max_y = f64::MIN;
                for coord in points {
                    min_x = min_x.min(coord.x);
                    min_y = min_y.min(coord.y);
                    max_x = max_x.max(coord.x);
                    max_y = max_y.max(coord.y);
                }
                BoundingBox::new(min_x, min_y, max_x, max_y)
            }
            MultiGeometry::MultiLineString(lines) => {
                if lines.is_empty() {
                    return BoundingBox::new(0.0, 0.0, 0.0, 0.0);
                }
                let mut min_x = f64::MAX;
                let mut min_y = f64::MAX;
                let mut max_x = f64::MIN;
                let mut max_y = f64::MIN;
                for line in lines {
                    for coord in line {
                        min_x = min_x.min(coord.x);
                        min_y = min_y.min(coord.y);
                        max_x = max_x.max(coord.x);
                        max_y = max_y.max(coord.y);
                    }
                }
                BoundingBox::new(min_x, min_y, max_x, max_y)
            }
            MultiGeometry::MultiPolygon(polygons) => {
                if polygons.is_empty() {
                    return BoundingBox::new(0.0, 0.0, 0.0, 0.0);
                }
                let mut min_x = f64::MAX;
                let mut min_y = f64::MAX;
                let mut max_x = f64::MIN;
                let mut max_y = f64::MIN;
                for polygon in polygons {
                    for coord in polygon {
                        min_x = min_x.min(coord.x);
                        min_y = min_y.min(coord.y);
                        max_x = max_x.max(coord.x);
                        max_y = max_y.max(coord.y);
                    }
                }
                BoundingBox::new(min_x, min_y, max_x, max_y)
            }
        }
    }
}

impl Display for MultiGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MultiGeometry::MultiPoint(points) => {
                write!(f, "MULTIPOINT(")?;
                for (i, coord) in points.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "({} {})", coord.x, coord.y)?;
                }
                write!(f, ")")
            }
            MultiGeometry::MultiLineString(lines) => {
                write!(f, "MULTILINESTRING(")?;
                for (i, line) in lines.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "(")?;
                    for (j, coord) in line.iter().enumerate() {
                        if j > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{} {}", coord.x, coord.y)?;
                    }
                    write!(f, ")")?;
                }
                write!(f, ")")
            }
            MultiGeometry::MultiPolygon(polygons) => {
                write!(f, "MULTIPOLYGON(")?;
                for (i, polygon) in polygons.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "((")?;
                    for (j, coord) in polygon.iter().enumerate() {
                        if j > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{} {}", coord.x, coord.y)?;
                    }
                    write!(f, "))")?;
                }
                write!(f, ")")
            }
        }
    }
}

// ============================================================================
// WKT (Well-Known Text) Parsing
// ============================================================================

/// Parses a WKT (Well-Known Text) string into geometry types.
///
/// Supports:
/// - POINT (x y)
/// - LINESTRING (x y, x y, ...)
/// - POLYGON ((x y, x y, ..., x y), (hole coords), ...)
/// - MULTIPOINT ((x y), (x y), ...)
/// - MULTILINESTRING ((x y, x y, ...), (x y, x y, ...), ...)
/// - MULTIPOLYGON (((x y, ..., x y)), ((x y, ..., x y)), ...)
///
/// # Example
///
/// ```ignore
/// let line = parse_wkt("LINESTRING(0 0, 10 10, 20 20)")?;
/// ```
pub fn parse_wkt(wkt: &str) -> Result<GeometryValue, SpatialError> {
    let wkt = wkt.trim();
    
    if let Some(rest) = wkt.strip_prefix("POINT") {
        parse_wkt_point(rest)
    } else if let Some(rest) = wkt.strip_prefix("LINESTRING") {
        parse_wkt_linestring(rest)
    } else if let Some(rest) = wkt.strip_prefix("POLYGON") {
        parse_wkt_polygon(rest)
    } else if let Some(rest) = wkt.strip_prefix("MULTIPOINT") {
        parse_wkt_multipoint(rest)
    } else if let Some(rest) = wkt.strip_prefix("MULTILINESTRING") {
        parse_wkt_multilinestring(rest)
    } else if let Some(rest) = wkt.strip_prefix("MULTIPOLYGON") {
        parse_wkt_multipolygon(rest)
    } else {
        Err(SpatialError::Constraint(format!(
            "Unknown WKT geometry type: {}",
            wkt
        )))
    }
}

fn parse_wkt_point(s: &str) -> Result<GeometryValue, SpatialError> {
    let coords = parse_coordinate_list(s)?;
    if coords.len() != 1 {
        return Err(SpatialError::Constraint(
            "POINT must have exactly one coordinate".to_string(),
        ));
    }
    Ok(GeometryValue::Point(coords[0]))
}

fn parse_wkt_linestring(s: &str) -> Result<GeometryValue, SpatialError> {
    let coords = parse_coordinate_list(s)?;
    let line = LineString::new(coords)?;
    Ok(GeometryValue::LineString(line))
}

fn parse_wkt_polygon(s: &str) -> Result<GeometryValue, SpatialError> {
    let rings = parse_ring_list(s)?;
    if rings.is_empty() {
        return Err(SpatialError::Constraint(
            "POLYGON must have at least one ring".to_string(),
        ));
    }
    let exterior = rings[0].clone();
    let holes = if rings.len() > 1 {
        rings[1..].to_vec()
    } else {
        vec![]
    };
    let polygon = PolygonWithHoles::new(exterior, holes)?;
    Ok(GeometryValue::Polygon(polygon))
}

fn parse_wkt_multipoint(s: &str) -> Result<GeometryValue, SpatialError> {
    // MULTIPOINT((0 0), (1 1), ...) or MULTIPOINT(0 0, 1 1, ...)
    let s = s.trim();
    let s = if let Some(rest) = s.strip_prefix('(') {
        rest
    } else {
        s
    };
    let s = if let Some(rest) = s.strip_suffix(')') {
        rest
    } else {
        s
    };

    let mut coords = vec![];
    let mut depth = 0;
    let mut current_pair = String::new();

    for ch in s.chars() {
        match ch {
            '(' => {
                depth += 1;
                if depth > 1 {
                    current_pair.push(ch);
                }
            }
            ')' => {
                depth -= 1;
                if depth >= 1 {
                    current_pair.push(ch);
                } else if !current_pair.is_empty() {
                    let pair: Vec<f64> = current_pair
                        .split_whitespace()
                        .filter_map(|s| s.parse().ok())
                        .collect();
                    if pair.len() == 2 {
                        coords.push(Coordinate::new(pair[0], pair[1]));
                    }
                    current_pair.clear();
                }
            }
            ',' if depth == 0 => {
                // Skip commas between coordinate pairs at top level
            }
            _ => current_pair.push(ch),
        }
    }

    Ok(GeometryValue::MultiGeometry(MultiGeometry::MultiPoint(coords)))
}

fn parse_wkt_multilinestring(s: &str) -> Result<GeometryValue, SpatialError> {
    let rings = parse_ring_list(s)?;
    Ok(GeometryValue::MultiGeometry(
        MultiGeometry::MultiLineString(rings),
    ))
}

fn parse_wkt_multipolygon(s: &str) -> Result<GeometryValue, SpatialError> {
    let s = s.trim();
    let s = if let Some(rest) = s.strip_prefix('(') {
        rest
    } else {
        s
    };
    let s = if let Some(rest) = s.strip_suffix(')') {
        rest
    } else {
        s
    };

    let mut polygons = vec![];
    let mut current = String::new();
    let mut paren_depth = 0;

    for ch in s.chars() {
        match ch {
            '(' => {
                paren_depth += 1;
                if paren_depth > 1 {
                    current.push(ch);
                }
            }
            ')' => {
                paren_depth -= 1;
                if paren_depth >= 1 {
                    current.push(ch);
                }
                if paren_depth == 1 {
                    let coords = parse_coordinate_list(&format!("({})", current))?;
                    if !coords.is_empty() {
                        polygons.push(coords);
                    }
                    current.clear();
                }
            }
            ',' if paren_depth == 1 => {
                // Skip commas between polygons
            }
            _ => current.push(ch),
        }
    }

    Ok(GeometryValue::MultiGeometry(
        MultiGeometry::MultiPolygon(polygons),
    ))
}

fn parse_coordinate_list(s: &str) -> Result<Vec<Coordinate>, SpatialError> {
    let s = s.trim();
    let s = if let Some(rest) = s.strip_prefix('(') {
        rest
    } else {
        s
    };
    let s = if let Some(rest) = s.strip_suffix(')') {
        rest
    } else {
        s
    };

    if s.is_empty() {
        return Ok(vec![]);
    }

    let mut coords = vec![];
    for pair in s.split(',') {
        let parts: Vec<&str> = pair.trim().split_whitespace().collect();
        if parts.len() != 2 {
            return Err(SpatialError::Constraint(
                format!("Invalid coordinate pair: {}", pair),
            ));
        }
        let x: f64 = parts[0].parse().map_err(|_| {
            SpatialError::Constraint(format!("Invalid x coordinate: {}", parts[0]))
        })?;
        let y: f64 = parts[1].parse().map_err(|_| {
            SpatialError::Constraint(format!("Invalid y coordinate: {}", parts[1]))
        })?;
        coords.push(Coordinate::new(x, y));
    }
    Ok(coords)
}

fn parse_ring_list(s: &str) -> Result<Vec<Vec<Coordinate>>, SpatialError> {
    let s = s.trim();
    let s = if let Some(rest) = s.strip_prefix('(') {
        rest
    } else {
        s
    };
    let s = if let Some(rest) = s.strip_suffix(')') {
        rest
    } else {
        s
    };

    let mut rings = vec![];
    let mut current = String::new();
    let mut paren_depth = 0;

    for ch in s.chars() {
        match ch {
            '(' => {
                paren_depth += 1;
                current.push(ch);
            }
            ')' => {
                paren_depth -= 1;
                current.push(ch);
                if paren_depth == 0 {
                    let coords = parse_coordinate_list(&current)?;
                    if !coords.is_empty() {
                        rings.push(coords);
                    }
                    current.clear();
                }
            }
            ',' if paren_depth == 0 => {
                // Skip commas between rings
            }
            _ => current.push(ch),
        }
    }

    Ok(rings)
}

// ============================================================================
// GeoJSON Parsing
// ============================================================================

/// Parses a GeoJSON string into geometry types.
///
/// Supports Feature and FeatureCollection objects, extracting geometry.
/// # Example
///
/// ```ignore
/// let geom = parse_geojson(r#"{"type":"Point","coordinates":[0,0]}"#)?;
/// ```
pub fn parse_geojson(json: &str) -> Result<GeometryValue, SpatialError> {
    // Use serde_json if available, otherwise provide a simple parser
    // For now, we'll provide a basic implementation
    let json = json.trim();

    if json.contains("\"type\":\"Point\"") || json.contains("\"type\": \"Point\"") {
        parse_geojson_point(json)
    } else if json.contains("\"type\":\"LineString\"") || json.contains("\"type\": \"LineString\"") {
        parse_geojson_linestring(json)
    } else if json.contains("\"type\":\"Polygon\"") || json.contains("\"type\": \"Polygon\"") {
        parse_geojson_polygon(json)
    } else if json.contains("\"type\":\"MultiPoint\"") || json.contains("\"type\": \"MultiPoint\"") {
        parse_geojson_multipoint(json)
    } else if json.contains("\"type\":\"MultiLineString\"")
        || json.contains("\"type\": \"MultiLineString\"")
    {
        parse_geojson_multilinestring(json)
    } else if json.contains("\"type\":\"MultiPolygon\"") || json.contains("\"type\": \"MultiPolygon\"") {
        parse_geojson_multipolygon(json)
    } else {
        Err(SpatialError::Constraint(
            "Unsupported or unrecognized GeoJSON type".to_string(),
        ))
    }
}

fn extract_coordinates_array(json: &str) -> Result<Vec<f64>, SpatialError> {
    // Simple regex-like extraction for coordinates
    if let Some(coords_start) = json.find("\"coordinates\"") {
        if let Some(array_start) = json[coords_start..].find('[') {
            let start = coords_start + array_start + 1;
            if let Some(array_end) = json[start..].find(']') {
                let coords_str = &json[start..start + array_end];
                let parts: Result<Vec<f64>, _> = coords_str
                    .split(',')
                    .map(|s| s.trim().parse::<f64>())
                    .collect();
                return parts.map_err(|e| {
                    SpatialError::Constraint(format!("Failed to parse coordinate: {}", e))
                });
            }
        }
    }
    Err(SpatialError::Constraint(
        "Could not extract coordinates from GeoJSON".to_string(),
    ))
}

fn parse_geojson_point(json: &str) -> Result<GeometryValue, SpatialError> {
    let coords = extract_coordinates_array(json)?;
    if coords.len() < 2 {
        return Err(SpatialError::Constraint(
            "Point must have at least [x, y]".to_string(),
        ));
    }
    Ok(GeometryValue::Point(Coordinate::new(coords[0], coords[1])))
}

fn parse_geojson_linestring(json: &str) -> Result<GeometryValue, SpatialError> {
    // Extract nested arrays for LineString
    if let Some(coords_start) = json.find("\"coordinates\"") {
        if let Some(array_start) = json[coords_start..].find('[') {
            let start = coords_start + array_start;
            if let Some(array_end) = json[start..].rfind(']') {
                let coords_str = &json[start + 1..start + array_end];
                let mut coords = vec![];
                let mut depth = 0;
                let mut current_pair = String::new();

                for ch in coords_str.chars() {
                    match ch {
                        '[' => {
                            depth += 1;
                            if depth > 1 {
                                current_pair.push(ch);
                            }
                        }
                        ']' => {
                            depth -= 1;
                            if depth >= 1 {
                                current_pair.push(ch);
                            } else if !current_pair.is_empty() {
                                let pair: Vec<f64> = current_pair
                                    .split(',')
                                    .filter_map(|s| s.trim().parse().ok())
                                    .collect();
                                if pair.len() == 2 {
                                    coords.push(Coordinate::new(pair[0], pair[1]));
                                }
                                current_pair.clear();
                            }
                        }
                        _ if depth > 0 => current_pair.push(ch),
                        _ => {}
                    }
                }

                let line = LineString::new(coords)?;
                return Ok(GeometryValue::LineString(line));
            }
        }
    }

    Err(SpatialError::Constraint(
        "Could not parse LineString from GeoJSON".to_string(),
    ))
}

fn parse_geojson_polygon(json: &str) -> Result<GeometryValue, SpatialError> {
    // Similar extraction but for rings
    if let Some(coords_start) = json.find("\"coordinates\"") {
        if let Some(array_start) = json[coords_start..].find('[') {
            let start = coords_start + array_start;
            if let Some(array_end) = json[start..].rfind(']') {
                let coords_str = &json[start + 1..start + array_end];
                let rings = extract_rings_from_geojson(coords_str)?;

                if rings.is_empty() {
                    return Err(SpatialError::Constraint(
                        "Polygon must have at least one ring".to_string(),
                    ));
                }

                let exterior = rings[0].clone();
                let holes = if rings.len() > 1 {
                    rings[1..].to_vec()
                } else {
                    vec![]
                };

                let polygon = PolygonWithHoles::new(exterior, holes)?;
                return Ok(GeometryValue::Polygon(polygon));
            }
        }
    }

    Err(SpatialError::Constraint(
        "Could not parse Polygon from GeoJSON".to_string(),
    ))
}

fn extract_rings_from_geojson(coords_str: &str) -> Result<Vec<Vec<Coordinate>>, SpatialError> {
    let mut rings = vec![];
    let mut depth = 0;
    let mut current_ring = String::new();

    for ch in coords_str.chars() {
        match ch {
            '[' => {
                depth += 1;
                // Keep brackets when we're inside a ring (depth > 1)
                if depth >= 2 {
                    current_ring.push(ch);
                }
            }
            ']' => {
                if depth >= 2 {
                    current_ring.push(ch);
                }
                depth -= 1;
                // When we close a ring (depth becomes 1), parse it
                if depth == 1 && !current_ring.is_empty() {
                    let coords = parse_coordinate_list(&current_ring)?;
                    if !coords.is_empty() {
                        rings.push(coords);
                    }
                    current_ring.clear();
                }
            }
            _ if depth >= 2 => current_ring.push(ch),
            _ => {}
        }
    }

    Ok(rings)
}

fn parse_geojson_multipoint(json: &str) -> Result<GeometryValue, SpatialError> {
    let coords = extract_nested_coordinates(json)?;
    Ok(GeometryValue::MultiGeometry(MultiGeometry::MultiPoint(coords)))
}

fn parse_geojson_multilinestring(json: &str) -> Result<GeometryValue, SpatialError> {
    let lines = extract_nested_rings(json)?;
    Ok(GeometryValue::MultiGeometry(
        MultiGeometry::MultiLineString(lines),
    ))
}

fn parse_geojson_multipolygon(json: &str) -> Result<GeometryValue, SpatialError> {
    if let Some(coords_start) = json.find("\"coordinates\"") {
        if let Some(array_start) = json[coords_start..].find('[') {
            let start = coords_start + array_start;
            if let Some(array_end) = json[start..].rfind(']') {
                let coords_str = &json[start + 1..start + array_end];
                let mut polygons = vec![];
                let mut depth = 0;
                let mut current_polygon = String::new();

                for ch in coords_str.chars() {
                    match ch {
                        '[' => {
                            depth += 1;
                            if depth > 2 {
                                current_polygon.push(ch);
                            }
                        }
                        ']' => {
                            depth -= 1;
                            if depth >= 2 {
                                current_polygon.push(ch);
                            } else if depth == 1 && !current_polygon.is_empty() {
                                let coords = extract_rings_from_geojson(&current_polygon)?;
                                if !coords.is_empty() {
                                    polygons.push(coords[0].clone());
                                }
                                current_polygon.clear();
                            }
                        }
                        _ if depth > 2 => current_polygon.push(ch),
                        _ => {}
                    }
                }

                return Ok(GeometryValue::MultiGeometry(
                    MultiGeometry::MultiPolygon(polygons),
                ));
            }
        }
    }

    Err(SpatialError::Constraint(
        "Could not parse MultiPolygon from GeoJSON".to_string(),
    ))
}

fn extract_nested_coordinates(json: &str) -> Result<Vec<Coordinate>, SpatialError> {
    if let Some(coords_start) = json.find("\"coordinates\"") {
        if let Some(array_start) = json[coords_start..].find('[') {
            let start = coords_start + array_start;
            if let Some(array_end) = json[start..].rfind(']') {
                let coords_str = &json[start + 1..start + array_end];
                let mut coords = vec![];
                let mut depth = 0;
                let mut current_pair = String::new();

                for ch in coords_str.chars() {
                    match ch {
                        '[' => {
                            depth += 1;
                            if depth > 1 {
                                current_pair.push(ch);
                            }
                        }
                        ']' => {
                            depth -= 1;
                            if depth >= 1 {
                                current_pair.push(ch);
                            } else if !current_pair.is_empty() {
                                let pair: Vec<f64> = current_pair
                                    .split(',')
                                    .filter_map(|s| s.trim().parse().ok())
                                    .collect();
                                if pair.len() == 2 {
                                    coords.push(Coordinate::new(pair[0], pair[1]));
                                }
                                current_pair.clear();
                            }
                        }
                        _ if depth > 0 => current_pair.push(ch),
                        _ => {}
                    }
                }

                return Ok(coords);
            }
        }
    }

    Err(SpatialError::Constraint(
        "Could not extract coordinates from GeoJSON".to_string(),
    ))
}

fn extract_nested_rings(json: &str) -> Result<Vec<Vec<Coordinate>>, SpatialError> {
    if let Some(coords_start) = json.find("\"coordinates\"") {
        if let Some(array_start) = json[coords_start..].find('[') {
            let start = coords_start + array_start;
            if let Some(array_end) = json[start..].rfind(']') {
                let coords_str = &json[start + 1..start + array_end];
                let mut rings = vec![];
                let mut depth = 0;
                let mut current_ring = String::new();

                for ch in coords_str.chars() {
                    match ch {
                        '[' => {
                            depth += 1;
                            if depth > 2 {
                                current_ring.push(ch);
                            }
                        }
                        ']' => {
                            depth -= 1;
                            if depth >= 2 {
                                current_ring.push(ch);
                            } else if depth == 1 && !current_ring.is_empty() {
                                let coords = parse_coordinate_list(&format!("[{}]", current_ring))?;
                                if !coords.is_empty() {
                                    rings.push(coords);
                                }
                                current_ring.clear();
                            }
                        }
                        _ if depth > 2 => current_ring.push(ch),
                        _ => {}
                    }
                }

                return Ok(rings);
            }
        }
    }

    Err(SpatialError::Constraint(
        "Could not extract rings from GeoJSON".to_string(),
    ))
}

// ============================================================================
// Unified Geometry Value Enum
// ============================================================================

/// Represents any parsed geometry value.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryValue {
    /// A single point
    Point(Coordinate),
    /// A line string
    LineString(LineString),
    /// A polygon with possible holes
    Polygon(PolygonWithHoles),
    /// Multiple geometries
    MultiGeometry(MultiGeometry),
}

impl GeometryValue {
    /// Gets the bounding box of this geometry.
    pub fn bounding_box(&self) -> BoundingBox {
        match self {
            GeometryValue::Point(coord) => {
                BoundingBox::new(coord.x, coord.y, coord.x, coord.y)
            }
            GeometryValue::LineString(line) => line.bounding_box(),
            GeometryValue::Polygon(poly) => poly.bounding_box(),
            GeometryValue::MultiGeometry(multi) => multi.bounding_box(),
        }
    }
}

impl Display for GeometryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryValue::Point(coord) => write!(f, "POINT({} {})", coord.x, coord.y),
            GeometryValue::LineString(line) => write!(f, "{}", line),
            GeometryValue::Polygon(poly) => write!(f, "{}", poly),
            GeometryValue::MultiGeometry(multi) => write!(f, "{}", multi),
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Ray casting algorithm to determine if a point is inside a polygon.
fn point_in_polygon(point: &Coordinate, polygon: &[Coordinate]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let n = polygon.len();
    let mut j = n - 1;

    for i in 0..n {
        let xi = polygon[i].x;
        let yi = polygon[i].y;
        let xj = polygon[j].x;
        let yj = polygon[j].y;

        if ((yi > point.y) != (yj > point.y))
            && (point.x < (xj - xi) * (point.y - yi) / (yj - yi) + xi)
        {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Checks if two line segments intersect.
fn segments_intersect(p1: &Coordinate, p2: &Coordinate, p3: &Coordinate, p4: &Coordinate) -> bool {
    let o1 = orientation(p1, p2, p3);
    let o2 = orientation(p1, p2, p4);
    let o3 = orientation(p3, p4, p1);
    let o4 = orientation(p3, p4, p2);

    // General case
    if o1 != o2 && o3 != o4 {
        return true;
    }

    // Special cases for collinear points
    if o1 == 0 && on_segment(p1, p3, p2) {
        return true;
    }
    if o2 == 0 && on_segment(p1, p4, p2) {
        return true;
    }
    if o3 == 0 && on_segment(p3, p1, p4) {
        return true;
    }
    if o4 == 0 && on_segment(p3, p2, p4) {
        return true;
    }

    false
}

/// Finds the orientation of an ordered triplet of points.
/// Returns:
/// - 0 if collinear
/// - 1 if clockwise
/// - 2 if counterclockwise
fn orientation(p: &Coordinate, q: &Coordinate, r: &Coordinate) -> i32 {
    let val = (q.y - p.y) * (r.x - q.x) - (q.x - p.x) * (r.y - q.y);
    if (val).abs() < 1e-10 {
        0
    } else if val > 0.0 {
        1
    } else {
        2
    }
}

/// Checks if point q lies on segment pr (assuming p, q, r are collinear).
fn on_segment(p: &Coordinate, q: &Coordinate, r: &Coordinate) -> bool {
    q.x <= p.x.max(r.x)
        && q.x >= p.x.min(r.x)
        && q.y <= p.y.max(r.y)
        && q.y >= p.y.min(r.y)
}

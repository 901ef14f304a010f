use std::hash::Hash;

/// A 2D bounding box represented by minimum and maximum coordinates.
///
/// `BoundingBox` defines a rectangular area in 2D space using the minimum
/// (min_x, min_y) and maximum (max_x, max_y) corners. It's used extensively
/// in spatial indexing for representing spatial boundaries and query regions.
///
/// # Examples
///
/// ```rust,ignore
/// use nitrite_spatial::BoundingBox;
///
/// // Create a bounding box for a region from (0,0) to (100,100)
/// let bbox = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
///
/// // Check if a point is within the bounding box
/// if bbox.contains_point(50.0, 50.0) {
///     println!("Point is inside the bounding box");
/// }
/// ```
#[derive(Clone, PartialEq, Default, Debug, serde::Deserialize, serde::Serialize)]
pub struct BoundingBox {
    /// Minimum X coordinate
    pub min_x: f64,
    /// Minimum Y coordinate
    pub min_y: f64,
    /// Maximum X coordinate
    pub max_x: f64,
    /// Maximum Y coordinate
    pub max_y: f64,
}

impl Eq for BoundingBox {}

impl PartialOrd for BoundingBox {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BoundingBox {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.min_x
            .partial_cmp(&other.min_x)
            .unwrap()
            .then(self.min_y.partial_cmp(&other.min_y).unwrap())
            .then(self.max_x.partial_cmp(&other.max_x).unwrap())
            .then(self.max_y.partial_cmp(&other.max_y).unwrap())
    }
}

impl Hash for BoundingBox {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.min_x.to_bits().hash(state);
        self.min_y.to_bits().hash(state);
        self.max_x.to_bits().hash(state);
        self.max_y.to_bits().hash(state);
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BoundingBox({}, {}, {}, {})", self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

impl BoundingBox {
    /// Creates a new bounding box with the specified coordinates.
    ///
    /// # Arguments
    ///
    /// * `min_x` - Minimum X coordinate
    /// * `min_y` - Minimum Y coordinate
    /// * `max_x` - Maximum X coordinate
    /// * `max_y` - Maximum Y coordinate
    ///
    /// # Returns
    ///
    /// A new `BoundingBox` instance
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> BoundingBox {
        BoundingBox {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Converts this bounding box to a pretty-printed JSON string.
    pub fn to_pretty_json(&self, indent: usize) -> String {
        let mut json_str = String::new();
        json_str.push_str("{\n");
        json_str.push_str(&format!(
            "{:indent$}\"min_x\": {},\n",
            "",
            self.min_x,
            indent = indent + 2
        ));
        json_str.push_str(&format!(
            "{:indent$}\"min_y\": {},\n",
            "",
            self.min_y,
            indent = indent + 2
        ));
        json_str.push_str(&format!(
            "{:indent$}\"max_x\": {},\n",
            "",
            self.max_x,
            indent = indent + 2
        ));
        json_str.push_str(&format!(
            "{:indent$}\"max_y\": {}\n",
            "",
            self.max_y,
            indent = indent + 2
        ));
        json_str.push('}');
        json_str
    }

    /// Converts this bounding box to a debug string with formatting.
    pub fn to_debug_string(&self, indent: usize) -> String {
        let mut json_str = String::new();
        json_str.push_str("{\n");
        json_str.push_str(&format!(
            "{:indent$}\"min_x\": {},\n",
            "",
            self.min_x,
            indent = indent + 2
        ));
        json_str.push_str(&format!(
            "{:indent$}\"min_y\": {},\n",
            "",
            self.min_y,
            indent = indent + 2
        ));
        json_str.push_str(&format!(
            "{:indent$}\"max_x\": {},\n",
            "",
            self.max_x,
            indent = indent + 2
        ));
        json_str.push_str(&format!(
            "{:indent$}\"max_y\": {}\n",
            "",
            self.max_y,
            indent = indent + 2
        ));
        json_str.push('}');
        json_str
    }

    /// Returns the width of the bounding box.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Returns the height of the bounding box.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Returns the area of the bounding box.
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Returns the center point of the bounding box.
    pub fn center(&self) -> (f64, f64) {
        ((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }

    /// Checks if this bounding box contains a point.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Checks if this bounding box contains another bounding box.
    pub fn contains(&self, other: &BoundingBox) -> bool {
        other.min_x >= self.min_x && other.max_x <= self.max_x
            && other.min_y >= self.min_y && other.max_y <= self.max_y
    }

    /// Checks if this bounding box intersects another bounding box.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.max_x && self.max_x >= other.min_x
            && self.min_y <= other.max_y && self.max_y >= other.min_y
    }

    /// Returns the union of this bounding box with another.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    /// Returns the intersection of this bounding box with another, if they intersect.
    pub fn intersection(&self, other: &BoundingBox) -> Option<BoundingBox> {
        if !self.intersects(other) {
            return None;
        }
        Some(BoundingBox::new(
            self.min_x.max(other.min_x),
            self.min_y.max(other.min_y),
            self.max_x.min(other.max_x),
            self.max_y.min(other.max_y),
        ))
    }

    /// Checks if this bounding box is a point (zero area).
    pub fn is_point(&self) -> bool {
        self.min_x == self.max_x && self.min_y == self.max_y
    }

    /// Checks if this bounding box is valid (min <= max).
    pub fn is_valid(&self) -> bool {
        self.min_x <= self.max_x && self.min_y <= self.max_y
    }
}

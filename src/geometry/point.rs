//! Planar points in the shared transcript coordinate system (microns).
//!
//! A [`Point`] is an immutable `(x, y)` pair. Construction through
//! [`Point::try_new`] rejects NaN and infinite coordinates so that every point
//! reaching the geometric predicates is finite.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Errors that can occur during coordinate validation.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum CoordinateValidationError {
    /// A coordinate value is invalid (NaN or infinite).
    #[error("Invalid coordinate at index {coordinate_index}: {coordinate_value}")]
    InvalidCoordinate {
        /// Index of the invalid coordinate (0 = x, 1 = y).
        coordinate_index: usize,
        /// Value of the invalid coordinate, as a string.
        coordinate_value: String,
    },
}

/// A 2-D point with `f64` coordinates.
///
/// Equality and hashing treat coordinates through [`OrderedFloat`], so `+0.0`
/// and `-0.0` compare equal and the type can key hash maps.
///
/// # Examples
///
/// ```
/// use cellbound::geometry::point::Point;
///
/// let p = Point::new(1.5, -2.0);
/// assert_eq!(p.x(), 1.5);
/// assert_eq!(p.to_array(), [1.5, -2.0]);
/// assert!(Point::try_new(f64::NAN, 0.0).is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Point {
    x: f64,
    y: f64,
}

impl Point {
    /// Creates a point without validating the coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Creates a point, rejecting non-finite coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateValidationError::InvalidCoordinate`] if either
    /// coordinate is NaN or infinite.
    pub fn try_new(x: f64, y: f64) -> Result<Self, CoordinateValidationError> {
        let point = Self { x, y };
        point.validate()?;
        Ok(point)
    }

    /// The x coordinate.
    #[must_use]
    pub const fn x(&self) -> f64 {
        self.x
    }

    /// The y coordinate.
    #[must_use]
    pub const fn y(&self) -> f64 {
        self.y
    }

    /// Coordinates as an `[x, y]` array, the GeoJSON position layout.
    #[must_use]
    pub const fn to_array(self) -> [f64; 2] {
        [self.x, self.y]
    }

    /// Checks that both coordinates are finite.
    ///
    /// # Errors
    ///
    /// Returns the index and value of the first non-finite coordinate.
    pub fn validate(&self) -> Result<(), CoordinateValidationError> {
        for (coordinate_index, value) in [self.x, self.y].into_iter().enumerate() {
            if !value.is_finite() {
                return Err(CoordinateValidationError::InvalidCoordinate {
                    coordinate_index,
                    coordinate_value: format!("{value:?}"),
                });
            }
        }
        Ok(())
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    fn ordered(&self) -> [OrderedFloat<f64>; 2] {
        [OrderedFloat(self.x), OrderedFloat(self.y)]
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.ordered() == other.ordered()
    }
}

impl Eq for Point {}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ordered().hash(state);
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Lexicographic order on `(x, y)`, as used by the monotone-chain hull.
impl Ord for Point {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.ordered().cmp(&other.ordered())
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::new(x, y)
    }
}

impl From<Point> for [f64; 2] {
    fn from(point: Point) -> Self {
        point.to_array()
    }
}

impl From<Point> for geo::Coord<f64> {
    fn from(point: Point) -> Self {
        geo::Coord {
            x: point.x,
            y: point.y,
        }
    }
}

impl From<geo::Coord<f64>> for Point {
    fn from(coord: geo::Coord<f64>) -> Self {
        Self::new(coord.x, coord.y)
    }
}

// =============================================================================
// TESTS
// =============================================================================

//! GeoJSON-shaped collection of cell polygons.
//!
//! The serialized form is a `GeometryCollection` whose members are `Polygon`
//! geometries with one exterior ring and an extra `cell` member naming the
//! cell they bound:
//!
//! ```json
//! {
//!   "type": "GeometryCollection",
//!   "geometries": [
//!     { "type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [0.0, 0.0]]], "cell": "A" }
//!   ]
//! }
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::boundary::{BoundaryOutcome, ResolvedPolygon};
use crate::core::table::CellId;

/// Type discriminator of the collection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectionType {
    /// The only accepted value.
    #[default]
    GeometryCollection,
}

/// Type discriminator of a member geometry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolygonType {
    /// The only accepted value.
    #[default]
    Polygon,
}

/// One cell boundary as a GeoJSON polygon.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellPolygon {
    #[serde(rename = "type")]
    kind: PolygonType,
    /// Rings of the polygon; always exactly one closed exterior ring.
    pub coordinates: Vec<Vec<[f64; 2]>>,
    /// The cell this polygon bounds.
    pub cell: CellId,
}

impl CellPolygon {
    /// The closed exterior ring.
    #[must_use]
    pub fn exterior(&self) -> &[[f64; 2]] {
        self.coordinates.first().map_or(&[], Vec::as_slice)
    }
}

impl From<&ResolvedPolygon> for CellPolygon {
    fn from(polygon: &ResolvedPolygon) -> Self {
        Self {
            kind: PolygonType::Polygon,
            coordinates: vec![polygon.exterior().iter().map(|p| p.to_array()).collect()],
            cell: polygon.cell().clone(),
        }
    }
}

/// All successfully built cell polygons of a run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometryCollection {
    #[serde(rename = "type")]
    kind: CollectionType,
    /// Member polygons, in cell order.
    pub geometries: Vec<CellPolygon>,
}

impl GeometryCollection {
    /// Collects the successful outcomes, skipping failures.
    ///
    /// An all-failed run yields an empty collection.
    ///
    /// # Examples
    ///
    /// ```
    /// use cellbound::core::boundary::{BoundaryFailure, ResolvedPolygon};
    /// use cellbound::core::geometry_collection::GeometryCollection;
    /// use cellbound::core::table::CellId;
    /// use cellbound::geometry::point::Point;
    ///
    /// let ring = vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.0, 1.0)];
    /// let outcomes = vec![
    ///     (CellId::from("A"), Ok(ResolvedPolygon::new(CellId::from("A"), ring, 0))),
    ///     (CellId::from("B"), Err(BoundaryFailure::Degenerate { count: 2 })),
    /// ];
    /// let collection = GeometryCollection::assemble(&outcomes);
    /// assert_eq!(collection.len(), 1);
    /// assert!(collection.valid_cells().contains(&CellId::from("A")));
    /// ```
    #[must_use]
    pub fn assemble(outcomes: &[(CellId, BoundaryOutcome)]) -> Self {
        let geometries = outcomes
            .iter()
            .filter_map(|(_, outcome)| outcome.as_ref().ok())
            .map(CellPolygon::from)
            .collect();
        Self {
            kind: CollectionType::GeometryCollection,
            geometries,
        }
    }

    /// Number of polygons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    /// Whether the collection holds no polygon.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    /// Cells that own a polygon in this collection.
    #[must_use]
    pub fn valid_cells(&self) -> BTreeSet<CellId> {
        self.geometries.iter().map(|g| g.cell.clone()).collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================

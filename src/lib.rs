//! # cellbound
//!
//! This library turns spatial transcript coordinates with cell assignments into
//! one boundary polygon per cell, and reconciles the transcript table against
//! the cells that actually received a polygon.
//!
//! # Features
//!
//! - 2-D alpha shapes (concave hulls) over an incremental Bowyer-Watson
//!   Delaunay triangulation, with convex-hull fallback for `alpha == 0`
//! - Multi-part resolution: union, then keep the largest part
//! - Parallel per-cell fitting on a bounded `rayon` pool with per-cell fault isolation
//! - GeoJSON `GeometryCollection` output and CSV transcript reconciliation
//! - Serialization/Deserialization with [serde](https://serde.rs)
//!
//! # Basic Usage
//!
//! ```rust
//! use cellbound::prelude::*;
//!
//! // Cell "A" has five transcripts, cell "B" only two.
//! let mut rows = vec![
//!     (Point::new(0.0, 0.0), Some(CellId::from("A"))),
//!     (Point::new(4.0, 0.0), Some(CellId::from("A"))),
//!     (Point::new(4.0, 4.0), Some(CellId::from("A"))),
//!     (Point::new(0.0, 4.0), Some(CellId::from("A"))),
//!     (Point::new(2.0, 2.0), Some(CellId::from("A"))),
//!     (Point::new(50.0, 50.0), Some(CellId::from("B"))),
//!     (Point::new(51.0, 50.0), Some(CellId::from("B"))),
//! ];
//! rows.push((Point::new(25.0, 25.0), None)); // unassigned transcript
//! let table = TranscriptTable::from_points(rows);
//!
//! let config = PipelineConfigBuilder::default().workers(2_usize).build().unwrap();
//! let output = run(&table, &config).unwrap();
//!
//! assert_eq!(output.collection.len(), 1);                  // only "A" has a polygon
//! assert_eq!(output.table.rows()[0].cell, "prefix-A");     // namespaced key
//! assert!(output.table.rows()[5].is_noise);                // "B" was dropped
//! assert_eq!(output.summary.degenerate, 1);
//! ```
//!
//! # Pipeline
//!
//! 1. [`core::grouping::group_points`] partitions non-noise transcripts by cell.
//! 2. [`core::dispatch::ParallelDispatcher`] runs a
//!    [`BoundaryFitter`](core::traits::BoundaryFitter) per cell; the default is
//!    [`core::boundary::BoundaryBuilder`].
//! 3. [`core::geometry_collection::GeometryCollection::assemble`] keeps the
//!    successful polygons.
//! 4. [`core::reconcile::reconcile`] clears the key of every transcript whose
//!    cell has no polygon.
//!
//! Afterwards the non-empty keys of the reconciled table are exactly the
//! prefixed keys of the polygons in the collection.
//!
//! # Failure Model
//!
//! A cell with fewer than three transcripts, a failed fit (collinear points,
//! `alpha` so large that nothing survives) and a panic inside a worker all have
//! the same effect: the cell gets no polygon and its transcripts become noise.
//! They are distinguished only by [`core::boundary::BoundaryFailure`], in the
//! logs and in the [`pipeline::RunSummary`]. Only invalid configuration and
//! unreadable input are fatal.
//!
//! # References
//!
//! - **Edelsbrunner, H., Kirkpatrick, D., and Seidel, R.** "On the shape of a set of points in the plane."
//!   *IEEE Transactions on Information Theory* 29.4 (1983): 551-559.
//! - **Bowyer, A.** "Computing Dirichlet tessellations." *The Computer Journal* 24.2 (1981): 162-166.
//! - **Watson, D.F.** "Computing the n-dimensional Delaunay tessellation with application to
//!   Voronoi polytopes." *The Computer Journal* 24.2 (1981): 167-172.

// Forbid unsafe code throughout the entire crate
#![forbid(unsafe_code)]

#[macro_use]
extern crate derive_builder;

/// Run configuration: alpha, key prefix, worker count and column names.
pub mod config;

/// The `core` module contains the per-cell boundary pipeline and the planar
/// triangulation it is built on.
///
/// It includes the transcript table model, grouping, boundary construction,
/// parallel dispatch, geometry collection assembly and reconciliation.
pub mod core {
    /// Triangulation algorithms
    pub mod algorithms {
        /// Incremental Bowyer-Watson construction
        pub mod bowyer_watson;
    }
    pub mod boundary;
    /// Collection aliases for triangle storage and edge maps
    pub mod collections;
    pub mod dispatch;
    pub mod geometry_collection;
    pub mod grouping;
    pub mod reconcile;
    pub mod table;
    /// 2-D Delaunay triangulation
    pub mod triangulation;
    /// Traits at the seams of the pipeline.
    pub mod traits {
        pub mod boundary_fitter;
        pub use boundary_fitter::*;
    }
    // Re-export the `core` modules.
    pub use boundary::*;
    pub use geometry_collection::*;
    pub use grouping::*;
    pub use reconcile::*;
    pub use table::*;
    pub use traits::*;
    // Note: collections and triangulation internals are not re-exported here
    // Import specific types via crate::core::collections:: or crate::core::triangulation::
}

/// Contains geometric types including the `Point` struct, predicates, convex
/// hulls and alpha shapes.
pub mod geometry {
    /// Shape fitting algorithms
    pub mod algorithms {
        /// Alpha shapes (concave hulls)
        pub mod alpha_shape;
        /// Planar convex hulls
        pub mod convex_hull;
        pub use alpha_shape::*;
        pub use convex_hull::*;
    }
    pub mod point;
    pub mod predicates;
    /// Planar measurement helpers
    pub mod util;
    pub use algorithms::*;
    pub use point::*;
    pub use predicates::*;
    pub use util::*;
}

/// File input and output: CSV transcript tables and GeoJSON collections.
pub mod io {
    pub mod csv_table;
    pub mod error;
    pub mod geojson;
    pub use error::*;
}

/// End-to-end run of the pipeline.
pub mod pipeline;

/// A prelude module that re-exports commonly used types.
/// This makes it easier to import the most commonly used items from the crate.
pub mod prelude {
    // Re-export from core
    pub use crate::core::{
        boundary::*, dispatch::*, geometry_collection::*, grouping::*, reconcile::*, table::*,
        traits::boundary_fitter::*,
    };

    // Re-export from geometry
    pub use crate::geometry::{algorithms::*, point::*, predicates::*};

    // Configuration and driver
    pub use crate::config::*;
    pub use crate::pipeline::*;
}

/// The function `is_normal` checks that structs implement `auto` traits.
/// Traits are checked at compile time, so this function is only used for
/// testing.
#[must_use]
pub const fn is_normal<T: Sized + Send + Sync + Unpin>() -> bool {
    true
}

// =============================================================================
// TESTS
// =============================================================================

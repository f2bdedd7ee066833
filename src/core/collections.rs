//! Collection aliases used by the triangulation and the boundary tracing.
//!
//! Hash maps use the `rustc-hash` hasher; keys are vertex indices and index
//! pairs.

use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::SlotMap;
use smallvec::SmallVec;

// =============================================================================
// STORAGE BACKEND
// =============================================================================

/// Internal storage backend for triangulation data structures.
///
/// Keys stay valid while other triangles are removed during insertion.
pub type StorageMap<K, V> = SlotMap<K, V>;

// =============================================================================
// CORE OPTIMIZED TYPES
// =============================================================================

/// Optimized `HashMap` type for performance-critical operations.
pub type FastHashMap<K, V> = FxHashMap<K, V>;

/// Optimized `HashSet` type for performance-critical operations.
pub type FastHashSet<T> = FxHashSet<T>;

/// Small-buffer-optimized vector, stack allocated up to `N` elements.
pub type SmallBuffer<T, const N: usize> = SmallVec<[T; N]>;

// =============================================================================
// TRIANGULATION-SPECIFIC TYPES
// =============================================================================

/// Undirected edge between two vertex indices, stored as `(min, max)`.
pub type EdgeKey = (usize, usize);

/// Directed edge `from -> to` between two vertex indices.
pub type DirectedEdge = (usize, usize);

/// Canonical undirected key of the edge `a - b`.
#[must_use]
pub const fn edge_key(a: usize, b: usize) -> EdgeKey {
    if a < b { (a, b) } else { (b, a) }
}

/// Creates a [`FastHashMap`] with at least the given capacity.
#[must_use]
pub fn fast_hash_map_with_capacity<K, V>(capacity: usize) -> FastHashMap<K, V> {
    FastHashMap::with_capacity_and_hasher(capacity, rustc_hash::FxBuildHasher)
}

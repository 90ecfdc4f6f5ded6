//! Geography dataset decode and normalization.

/// Opaque geometry value type and the shape-union seam.
pub mod geometry;
/// Region collection, disputed-territory merge, and id resolution.
pub mod regions;
/// Typed decode of the topology document at the network boundary.
pub mod topology;

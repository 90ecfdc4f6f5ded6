//! Opaque geometry values and the shape-union seam.
//!
//! The engine never interprets coordinate data beyond an emptiness check;
//! projection and painting belong to the embedding renderer. Merging two
//! shapes is delegated through [`GeometryOps`] so a real geometry toolkit
//! can be plugged in at the boundary.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::topology::TopoGeometry;

/// Opaque region shape forwarded to the rendering capability.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Geometry {
    /// Shape kind, e.g. `Polygon` or `MultiPolygon`.
    pub kind: Option<String>,
    /// Coordinate or arc-index payload. Never interpreted here.
    pub shape: Option<Value>,
}

impl Geometry {
    /// Extracts the opaque shape of one topology entry. Arc-indexed
    /// payloads take priority over inline coordinates.
    pub fn from_topo(geom: &TopoGeometry) -> Self {
        Self {
            kind: geom.kind.clone(),
            shape: geom.arcs.clone().or_else(|| geom.coordinates.clone()),
        }
    }

    /// True when the shape cannot be rendered: no payload, or an empty
    /// list (e.g. a `MultiPolygon` with zero polygons).
    pub fn is_degenerate(&self) -> bool {
        match &self.shape {
            None | Some(Value::Null) => true,
            Some(Value::Array(items)) => items.is_empty(),
            Some(_) => false,
        }
    }
}

/// Seam to the geometry toolkit used for shape surgery.
pub trait GeometryOps: Send + Sync {
    /// Computes the union of two shapes at the shared-boundary level.
    fn merge(&self, a: &Geometry, b: &Geometry) -> Geometry;
}

/// Default toolkit: unions by concatenating polygon lists.
///
/// Arc-indexed topology shapes dissolve shared boundaries downstream in
/// the renderer, so list concatenation is sufficient for making the two
/// regions interactive as one unit.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConcatUnion;

impl GeometryOps for ConcatUnion {
    fn merge(&self, a: &Geometry, b: &Geometry) -> Geometry {
        let mut polys = polygon_list(a);
        polys.extend(polygon_list(b));
        Geometry {
            kind: Some("MultiPolygon".to_string()),
            shape: Some(Value::Array(polys)),
        }
    }
}

/// Normalizes a shape payload to a list of polygon payloads. A `Polygon`
/// becomes a single-element list; degenerate shapes contribute nothing.
fn polygon_list(geom: &Geometry) -> Vec<Value> {
    let Some(shape) = &geom.shape else {
        return Vec::new();
    };
    match (geom.kind.as_deref(), shape) {
        (Some("MultiPolygon"), Value::Array(items)) => items.clone(),
        (_, Value::Array(items)) if !items.is_empty() => vec![Value::Array(items.clone())],
        _ => Vec::new(),
    }
}

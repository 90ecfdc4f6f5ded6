//! Typed decode of the upstream TopoJSON-like world document.
//!
//! Decoding happens once at the network boundary; downstream code never
//! re-validates JSON shapes. A document missing any expected structure
//! decodes to an empty topology rather than an error.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::CountryId;

/// Region identifier as shipped by the dataset. Revisions disagree on
/// whether ids are strings or numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TopoId {
    /// Numeric identifier.
    Num(f64),
    /// String identifier, usually a zero-padded numeric code.
    Text(String),
}

impl TopoId {
    /// Parses the identifier as a finite non-negative integer code.
    pub fn as_numeric(&self) -> Option<CountryId> {
        let n = match self {
            Self::Num(n) => *n,
            Self::Text(s) => s.trim().parse().ok()?,
        };
        if !n.is_finite() || n < 0.0 || n.fract() != 0.0 {
            return None;
        }
        Some(n as CountryId)
    }
}

/// Properties bag carried by each geometry entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TopoProperties {
    /// Display name hint.
    #[serde(default)]
    pub name: Option<String>,
}

/// One geometry entry of a topology object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopoGeometry {
    /// Geometry kind, e.g. `Polygon` or `MultiPolygon`.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Region identifier.
    #[serde(default)]
    pub id: Option<TopoId>,
    /// Properties bag.
    #[serde(default)]
    pub properties: Option<TopoProperties>,
    /// Arc index payload. Opaque; forwarded to the geometry toolkit.
    #[serde(default)]
    pub arcs: Option<Value>,
    /// Inline coordinates payload, present in pre-assembled documents.
    #[serde(default)]
    pub coordinates: Option<Value>,
}

/// A named geometry collection inside the topology.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TopoObject {
    /// Member geometries.
    #[serde(default)]
    pub geometries: Vec<TopoGeometry>,
}

/// Decoded world topology document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldTopology {
    /// Named geometry collections. Country borders live under
    /// [`WorldTopology::COUNTRIES`].
    #[serde(default)]
    pub objects: HashMap<String, TopoObject>,
}

impl WorldTopology {
    /// Key of the country-borders collection in the upstream dataset.
    pub const COUNTRIES: &'static str = "countries";

    /// Decodes a topology from untyped JSON. Any shape mismatch yields an
    /// empty topology.
    pub fn from_value(value: Value) -> Self {
        match serde_json::from_value(value) {
            Ok(topo) => topo,
            Err(err) => {
                tracing::warn!(%err, "topology document malformed, treating as empty");
                Self::default()
            }
        }
    }

    /// The country geometry entries, empty when the dataset lacks them.
    pub fn countries(&self) -> &[TopoGeometry] {
        self.objects
            .get(Self::COUNTRIES)
            .map(|obj| obj.geometries.as_slice())
            .unwrap_or(&[])
    }
}

//! Region collection normalization, including the Somaliland merge.
//!
//! The upstream dataset carries Somaliland as a region separate from
//! Somalia, while the catalog and the renderer both key on Somalia's
//! numeric code. Normalization folds the territory's shape into Somalia
//! and drops the separate entry, so the country is clickable as one unit.
//! Datasets without the split pass through unchanged.

use serde::{Deserialize, Serialize};

use crate::types::CountryId;

use super::{
    geometry::{Geometry, GeometryOps},
    topology::{TopoGeometry, TopoId, WorldTopology},
};

/// Numeric code of Somalia, the merge parent.
pub const SOMALIA_ID: CountryId = 706;
/// Numeric code some dataset revisions assign to Somaliland.
pub const SOMALILAND_ID: CountryId = 906;

/// One displayed region: identifier, name hint, opaque shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Identifier as shipped by the dataset, when present.
    pub id: Option<TopoId>,
    /// Display name hint from the dataset properties.
    pub name: Option<String>,
    /// Opaque shape payload.
    pub geometry: Geometry,
}

impl Region {
    /// The region's own identifier parsed as a finite numeric code.
    pub fn numeric_id(&self) -> Option<CountryId> {
        self.id.as_ref().and_then(TopoId::as_numeric)
    }
}

/// Normalized, ordered region collection for one dataset load.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RegionCollection {
    /// Member regions in dataset order.
    pub regions: Vec<Region>,
}

impl RegionCollection {
    /// Converts a decoded topology into regions and applies the
    /// Somaliland merge. Never fails: missing structure yields an empty
    /// collection.
    pub fn from_topology(topo: &WorldTopology, ops: &dyn GeometryOps) -> Self {
        let collection = Self {
            regions: topo.countries().iter().map(region_from_entry).collect(),
        };
        collection.merge_disputed(ops)
    }

    /// Number of regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// True when no regions decoded.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    fn merge_disputed(mut self, ops: &dyn GeometryOps) -> Self {
        let Some(parent_idx) = find_region(&self.regions, SOMALIA_ID, is_somalia_name) else {
            tracing::debug!("dataset has no Somalia region, skipping merge");
            return self;
        };
        let Some(territory_idx) = find_region(&self.regions, SOMALILAND_ID, is_somaliland_name)
        else {
            tracing::debug!("dataset has no separate Somaliland region, skipping merge");
            return self;
        };
        if parent_idx == territory_idx {
            return self;
        }

        let merged = ops.merge(
            &self.regions[parent_idx].geometry,
            &self.regions[territory_idx].geometry,
        );

        tracing::debug!(
            parent = parent_idx,
            territory = territory_idx,
            "merged Somaliland geometry into Somalia"
        );

        self.regions[parent_idx].geometry = merged;
        self.regions.remove(territory_idx);
        self
    }
}

/// Effective numeric identifier of a displayed region: its own id when
/// finite, else Somalia's fixed id when the name matches the territory
/// pattern, else none. Lets the renderer treat a leftover Somaliland
/// sub-path as part of Somalia.
pub fn effective_country_id(region: &Region) -> Option<CountryId> {
    if let Some(id) = region.numeric_id() {
        return Some(id);
    }
    if is_somaliland_name(region.name.as_deref()) {
        return Some(SOMALIA_ID);
    }
    None
}

fn region_from_entry(entry: &TopoGeometry) -> Region {
    Region {
        id: entry.id.clone(),
        name: entry.properties.as_ref().and_then(|p| p.name.clone()),
        geometry: Geometry::from_topo(entry),
    }
}

/// Identifier match takes priority over the name fallback; not every
/// dataset revision assigns ids consistently.
fn find_region(
    regions: &[Region],
    id: CountryId,
    name_matches: fn(Option<&str>) -> bool,
) -> Option<usize> {
    regions
        .iter()
        .position(|r| r.numeric_id() == Some(id))
        .or_else(|| {
            regions
                .iter()
                .position(|r| name_matches(r.name.as_deref()))
        })
}

fn is_somalia_name(name: Option<&str>) -> bool {
    name.is_some_and(|n| n.eq_ignore_ascii_case("somalia"))
}

fn is_somaliland_name(name: Option<&str>) -> bool {
    name.is_some_and(|n| n.to_lowercase().contains("somaliland"))
}
